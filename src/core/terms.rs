//! Name normalization helpers shared by the search strategies.
//!
//! These turn release-style names (`The.Movie.2009.DVDRip.XviD-GRP`) into
//! search terms: separator handling, release junk ("strip tokens"), part
//! numbers and years.

use crate::{Error, Result};
use regex::Regex;
use std::path::Path;

/// Release junk removed from names unless a directory configures its own list.
///
/// Entries are case-insensitive regular expressions matched against whole words.
pub const DEFAULT_STRIP_TOKENS: &[&str] = &[
    "dvdrip", "xvid", "proper", "ac3", "blueray", "ntsc", "divx", "limited", "unrated", "repack",
    "subbed", "4k", "2160p", "1080p", "720p", "480p", "uhd", "bluray", "blu-ray", "bdrip",
    "brrip", "dvdscr", "hdtv", "web-dl", "webdl", "webrip", "hdrip", "hevc", "x265", "h265",
    "x264", "h264", "remux", "dts", "truehd", "atmos", "aac", "10bit",
];

/// Earliest year accepted as a release year.
pub const MIN_YEAR: u32 = 1880;

/// Latest year accepted as a release year.
pub const MAX_YEAR: u32 = 2100;

/// Compiled strip tokens of a media directory.
#[derive(Debug, Clone)]
pub struct StripTokens {
    words: Vec<Regex>,
    inline: Vec<Regex>,
}

impl StripTokens {
    /// Compile a list of tokens.
    pub fn compile<S: AsRef<str>>(tokens: &[S]) -> Result<Self> {
        let mut words = Vec::with_capacity(tokens.len());
        let mut inline = Vec::with_capacity(tokens.len());
        for token in tokens {
            let token = token.as_ref();
            if token.trim().is_empty() {
                return Err(Error::other("empty strip token"));
            }
            words.push(Regex::new(&format!(r"(?i)^(?:{})$", token))?);
            inline.push(Regex::new(&format!(r"(?i)\b(?:{})\b", token))?);
        }
        Ok(Self { words, inline })
    }

    /// Compile [`DEFAULT_STRIP_TOKENS`].
    pub fn defaults() -> Result<Self> {
        Self::compile(DEFAULT_STRIP_TOKENS)
    }

    /// Whether a single word is release junk.
    pub fn matches_word(&self, word: &str) -> bool {
        self.words.iter().any(|re| re.is_match(word))
    }

    /// Remove every strip token occurring in the text.
    pub fn strip(&self, text: &str) -> String {
        let mut out = text.to_string();
        for re in &self.inline {
            out = re.replace_all(&out, "").into_owned();
        }
        out
    }

    /// Whether a piece of a name carries no title information.
    ///
    /// An empty side is junk. Otherwise every word must be a strip token; a
    /// trailing `-GROUP` release-group suffix is ignored.
    pub fn is_junk(&self, side: &str) -> bool {
        let side = replace_with_spaces(side);
        let side = match side.rfind('-') {
            Some(pos) if !side[pos + 1..].trim().is_empty() && !side[pos + 1..].contains(' ') => {
                &side[..pos]
            }
            _ => side.as_str(),
        };
        side.split(|c: char| c.is_whitespace() || c == '[' || c == ']' || c == '(' || c == ')')
            .map(|w| w.trim_matches(|c: char| c == '-' || c == ','))
            .filter(|w| !w.is_empty())
            .all(|w| self.matches_word(w))
    }
}

/// Replace dots with spaces, keeping dots next to a space (`Dr. Who`).
pub fn replace_dots(name: &str) -> String {
    let chars: Vec<char> = name.chars().collect();
    chars
        .iter()
        .enumerate()
        .map(|(i, &c)| {
            if c != '.' {
                return c;
            }
            let prev_space = i > 0 && chars[i - 1] == ' ';
            let next_space = chars.get(i + 1) == Some(&' ');
            if prev_space || next_space {
                '.'
            } else {
                ' '
            }
        })
        .collect()
}

/// Replace dots and underscores with spaces.
pub fn replace_with_spaces(name: &str) -> String {
    replace_dots(&name.replace('_', " "))
}

/// Replace hyphens used as separators, keeping those inside words or numbers.
pub fn replace_hyphens(name: &str) -> String {
    let chars: Vec<char> = name.chars().collect();
    chars
        .iter()
        .enumerate()
        .map(|(i, &c)| {
            if c != '-' {
                return c;
            }
            let prev = if i > 0 { chars.get(i - 1) } else { None };
            let next = chars.get(i + 1);
            match (prev, next) {
                (Some(p), Some(n)) if p.is_ascii_digit() && n.is_ascii_digit() => '-',
                (Some(p), Some(n)) if p.is_alphabetic() && n.is_alphabetic() => '-',
                _ => ' ',
            }
        })
        .collect()
}

/// Collapse runs of whitespace into single spaces and trim.
pub fn collapse_spaces(name: &str) -> String {
    name.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Separators to spaces, then whitespace collapsed.
pub fn normalize(name: &str) -> String {
    collapse_spaces(&replace_hyphens(&replace_with_spaces(name)))
}

/// Remove a leading `[www.site.com] -` tag.
pub fn strip_web_address(name: &str) -> String {
    match Regex::new(r"(?i)^\[ *www\..*\.com *\] *- *") {
        Ok(re) => re.replace(name, "").into_owned(),
        Err(_) => name.to_string(),
    }
}

/// Trim whitespace and separator rubbish from both ends.
pub fn trim_rubbish(name: &str) -> String {
    name.trim_matches(|c: char| c.is_whitespace() || "-_,;:.".contains(c))
        .to_string()
}

/// Remove characters that providers reject in search terms.
pub fn remove_unwanted_characters(term: &str) -> String {
    let cleaned: String = term
        .chars()
        .filter(|c| !":;!?\"*|<>".contains(*c))
        .collect();
    collapse_spaces(&cleaned)
}

/// Split a trailing part marker (`Part 2`, `pt2`, `cd.1`, `disc-3`) off a name.
pub fn extract_part(name: &str) -> (String, Option<u32>) {
    let re = match Regex::new(r"(?i)(?:^|[\s._-]+)(?:part|pt|cd|disc|disk)[\s._-]*(\d+)$") {
        Ok(re) => re,
        Err(_) => return (name.to_string(), None),
    };
    match re.captures(name) {
        Some(caps) => {
            let part = caps.get(1).and_then(|m| m.as_str().parse().ok());
            let start = caps.get(0).map(|m| m.start()).unwrap_or(name.len());
            (name[..start].to_string(), part)
        }
        None => (name.to_string(), None),
    }
}

/// Part number given by a `CD<n>` parent folder.
pub fn cd_folder_part(file: &Path) -> Option<u32> {
    let parent = file.parent()?.file_name()?.to_string_lossy().to_string();
    let re = Regex::new(r"(?i)^cd(\d+)$").ok()?;
    re.captures(&parent)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// Part number of a file: a `CD<n>` parent folder wins, else the file name.
pub fn part_for_file(file: &Path) -> Option<u32> {
    cd_folder_part(file).or_else(|| extract_part(&file_stem(file)).1)
}

/// Whether a number is plausible as a release year.
pub fn is_valid_year(year: u32) -> bool {
    (MIN_YEAR..=MAX_YEAR).contains(&year)
}

/// File name without its extension. Directories keep their full name.
pub fn file_stem(path: &Path) -> String {
    if path.is_dir() {
        return file_name(path);
    }
    path.file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default()
}

/// Final component of a path.
pub fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default()
}
