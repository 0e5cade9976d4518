//! Season and episode extraction from TV file names.
//!
//! Conventions recognised, tried in this order (case-insensitive):
//! - `S01E02`, `s01.e02`, `S3 E22`, with `E03`, `-E03`, `&E03` suffixes for multi-episode files
//! - `1x02`, with `-03` or `& 1x03` suffixes
//! - `season 1 episode 2`
//! - `1 02` and `1-02`
//! - `102` and `1002` at the start of the name or between dots or spaces

use crate::core::pattern::{self, Token};
use crate::models::config::MediaDirConfig;
use crate::models::media::SearchResult;
use regex::Regex;
use std::path::Path;

/// Season and episode numbers parsed from a name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedFileName {
    /// Text preceding the season and episode markers, unnormalized.
    pub term: String,
    pub season: u32,
    /// Episode numbers; several for multi-episode files.
    pub episodes: Vec<u32>,
}

impl ParsedFileName {
    fn new(term: &str, season: u32, episodes: Vec<u32>) -> Self {
        Self {
            term: term.to_string(),
            season,
            episodes,
        }
    }

    /// First episode number.
    pub fn episode(&self) -> u32 {
        self.episodes.first().copied().unwrap_or_default()
    }
}

#[derive(Clone, Copy)]
enum Continuation {
    Marker,
    Cross,
    None,
}

const PATTERNS: &[(&str, Continuation)] = &[
    (r"(?i)^(.*?)s(\d{1,2})[\s.]*e(\d{1,3})", Continuation::Marker),
    (r"(?i)^(|.*?\D)(\d{1,2})x(\d{2,3})(?:\D|$)", Continuation::Cross),
    (
        r"(?i)^(.*?)season[\s._]*(\d{1,2})[\s._]*episode[\s._]*(\d{1,3})(?:\D|$)",
        Continuation::None,
    ),
    (r"^(|.*?\D)(\d{1,2})[ -](\d{2})(?:\D|$)", Continuation::None),
    (r"^()(\d{1,2})(\d{2})(?:[. _]|$)", Continuation::None),
    (r"^(.*?[. _])(\d{1,2})(\d{2})(?:[. _]|$)", Continuation::None),
];

/// Parse season and episode numbers from a file or directory name.
pub fn parse_name(name: &str) -> Option<ParsedFileName> {
    for (expr, continuation) in PATTERNS {
        let re = match Regex::new(expr) {
            Ok(re) => re,
            Err(e) => {
                tracing::error!("Bad episode expression {}: {}", expr, e);
                continue;
            }
        };
        let caps = match re.captures(name) {
            Some(caps) => caps,
            None => continue,
        };
        let term = caps.get(1).map(|m| m.as_str()).unwrap_or("");
        let season: u32 = match caps.get(2).and_then(|m| m.as_str().parse().ok()) {
            Some(season) => season,
            None => continue,
        };
        let first: u32 = match caps.get(3).and_then(|m| m.as_str().parse().ok()) {
            Some(episode) => episode,
            None => continue,
        };
        let end = caps.get(3).map(|m| m.end()).unwrap_or(name.len());
        let last = last_episode(&name[end..], *continuation).filter(|last| *last > first);
        let episodes = match last {
            Some(last) => (first..=last).collect(),
            None => vec![first],
        };
        return Some(ParsedFileName::new(term, season, episodes));
    }
    None
}

/// Follow multi-episode suffixes, returning the last episode number.
fn last_episode(rest: &str, continuation: Continuation) -> Option<u32> {
    let expr = match continuation {
        Continuation::Marker => r"(?i)^[\s.]*[-&+]?[\s.]*e(\d{1,3})",
        Continuation::Cross => r"(?i)^(?:-|\s*[-&+]\s*\d{1,2}x)(\d{2,3})(?:\D|$)",
        Continuation::None => return None,
    };
    let re = Regex::new(expr).ok()?;
    let mut rest = rest;
    let mut last = None;
    while let Some(caps) = re.captures(rest) {
        last = caps.get(1).and_then(|m| m.as_str().parse().ok());
        let end = caps.get(1).map(|m| m.end()).unwrap_or(rest.len());
        rest = &rest[end..];
    }
    last
}

/// Work out the season and episodes of a file.
///
/// Numbers already on the search result win, then the file name, then the
/// directory's rename pattern.
pub fn parse_for_file(
    config: &MediaDirConfig,
    file: &Path,
    result: Option<&SearchResult>,
) -> Option<ParsedFileName> {
    if let Some(result) = result {
        if let (Some(season), Some(episodes)) = (result.season, result.episodes.as_ref()) {
            if !episodes.is_empty() {
                return Some(ParsedFileName::new("", season, episodes.clone()));
            }
        }
    }

    let name = file
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    if let Some(parsed) = parse_name(&name) {
        return Some(parsed);
    }

    let relative = file.strip_prefix(&config.media_dir).ok()?;
    let values = config.pattern.match_path(relative)?;
    let season = pattern::number(&values, Token::Season)?;
    let episode = pattern::number(&values, Token::Episode)?;
    let term = values.get(&Token::ShowName).cloned().unwrap_or_default();
    Some(ParsedFileName::new(&term, season, vec![episode]))
}
