//! Search strategies.
//!
//! Each strategy turns a media file into [`SearchDetails`] or declines. The
//! TV and film chains try their strategies in order and stop at the first
//! match; see [`tv_strategies`] and [`film_strategies`].

use crate::core::episode;
use crate::core::nfo;
use crate::core::pattern::{self, Token};
use crate::core::terms::{self, StripTokens};
use crate::models::config::MediaDirConfig;
use crate::models::media::SearchDetails;
use crate::services::source::{with_deadline, FetchContext, MetadataSource};
use async_trait::async_trait;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

/// Minimum number of placeholders for a pattern to be trusted for reverse matching.
pub const MIN_PATTERN_COMPLEXITY: usize = 4;

/// Everything a strategy may consult besides the file itself.
pub struct StrategyContext<'a> {
    pub config: &'a MediaDirConfig,
    pub watch_dirs: &'a [PathBuf],
    pub sources: &'a [Arc<dyn MetadataSource>],
    /// Source able to fetch a film by IMDB id.
    pub imdb_source_id: &'a str,
    pub fetch_timeout: Duration,
}

impl<'a> StrategyContext<'a> {
    /// Context without watch directories or sources.
    pub fn new(config: &'a MediaDirConfig) -> Self {
        Self {
            config,
            watch_dirs: &[],
            sources: &[],
            imdb_source_id: "imdb",
            fetch_timeout: Duration::from_secs(30),
        }
    }

    /// Root of the media directory.
    pub fn root(&self) -> &Path {
        &self.config.media_dir
    }
}

/// Derives a search term from a media file.
#[async_trait]
pub trait SearchStrategy: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Search details for the file, or `None` when the strategy does not apply.
    async fn get_search(&self, file: &Path, ctx: &StrategyContext<'_>) -> Option<SearchDetails>;
}

/// Strategies for TV show directories, in the order they are tried.
pub fn tv_strategies() -> Vec<Box<dyn SearchStrategy>> {
    vec![
        Box::new(ReversePatternStrategy::new(Token::ShowName, true)),
        Box::new(NfoDirectoryStrategy),
        Box::new(EpisodeFileNameStrategy),
        Box::new(ParentDirectoryStrategy),
    ]
}

/// Strategies for film directories, in the order they are tried.
pub fn film_strategies() -> Vec<Box<dyn SearchStrategy>> {
    vec![
        Box::new(ReversePatternStrategy::new(Token::Title, true)),
        Box::new(FilmNfoStrategy),
        Box::new(YearBracketStrategy),
        Box::new(ExactNameStrategy),
    ]
}

/// Reads the term back out of a file already named with the directory's pattern.
pub struct ReversePatternStrategy {
    term_token: Token,
    complexity_check: bool,
}

impl ReversePatternStrategy {
    pub fn new(term_token: Token, complexity_check: bool) -> Self {
        Self {
            term_token,
            complexity_check,
        }
    }
}

#[async_trait]
impl SearchStrategy for ReversePatternStrategy {
    fn name(&self) -> &'static str {
        "reverse-pattern"
    }

    async fn get_search(&self, file: &Path, ctx: &StrategyContext<'_>) -> Option<SearchDetails> {
        let template = &ctx.config.pattern;
        if self.complexity_check && template.placeholder_count() < MIN_PATTERN_COMPLEXITY {
            return None;
        }
        let relative = file.strip_prefix(ctx.root()).ok()?;
        let values = template.match_path(relative)?;
        let term = values.get(&self.term_token)?;
        let details = SearchDetails::new(
            term.as_str(),
            values.get(&Token::Year).cloned(),
            pattern::number(&values, Token::Part),
        )?;
        Some(details.with_episode(
            pattern::number(&values, Token::Season),
            pattern::number(&values, Token::Episode).map(|e| vec![e]),
        ))
    }
}

/// Season and episode heuristics applied to a file or directory name.
pub fn episode_details(path: &Path, strip_tokens: &StripTokens) -> Option<SearchDetails> {
    let name = if path.is_dir() {
        terms::strip_web_address(&terms::file_name(path))
    } else {
        terms::file_stem(path)
    };
    let name = terms::normalize(&name);
    let parsed = episode::parse_name(&name)?;
    let term = terms::collapse_spaces(&strip_tokens.strip(&parsed.term));
    let term = terms::trim_rubbish(&term);
    let details = SearchDetails::new(term, None, None)?;
    Some(details.with_episode(Some(parsed.season), Some(parsed.episodes)))
}

/// Applies the episode heuristics to the directory holding the file's NFO.
pub struct NfoDirectoryStrategy;

#[async_trait]
impl SearchStrategy for NfoDirectoryStrategy {
    fn name(&self) -> &'static str {
        "nfo-directory"
    }

    async fn get_search(&self, file: &Path, ctx: &StrategyContext<'_>) -> Option<SearchDetails> {
        let nfo = nfo::find_nfo_file(file, ctx.root(), ctx.watch_dirs)?;
        episode_details(nfo.parent()?, &ctx.config.strip_tokens)
    }
}

/// Season and episode markers in the file name; the text before them is the show.
pub struct EpisodeFileNameStrategy;

#[async_trait]
impl SearchStrategy for EpisodeFileNameStrategy {
    fn name(&self) -> &'static str {
        "episode-file-name"
    }

    async fn get_search(&self, file: &Path, ctx: &StrategyContext<'_>) -> Option<SearchDetails> {
        episode_details(file, &ctx.config.strip_tokens)
    }
}

/// Last resort for TV: the parent directory names the show.
pub struct ParentDirectoryStrategy;

#[async_trait]
impl SearchStrategy for ParentDirectoryStrategy {
    fn name(&self) -> &'static str {
        "parent-directory"
    }

    async fn get_search(&self, file: &Path, _ctx: &StrategyContext<'_>) -> Option<SearchDetails> {
        let name = terms::file_name(file.parent()?);
        let details = SearchDetails::new(name, None, None)?;
        Some(details.with_episode(Some(1), None))
    }
}

/// Looks the film up by the IMDB id found in a nearby NFO file.
pub struct FilmNfoStrategy;

impl FilmNfoStrategy {
    fn part(nfo: &Path, file: &Path) -> Option<u32> {
        if file.parent() != nfo.parent() {
            if let Some(part) = terms::cd_folder_part(file) {
                return Some(part);
            }
        }
        terms::extract_part(&terms::file_stem(file)).1
    }
}

#[async_trait]
impl SearchStrategy for FilmNfoStrategy {
    fn name(&self) -> &'static str {
        "film-nfo"
    }

    async fn get_search(&self, file: &Path, ctx: &StrategyContext<'_>) -> Option<SearchDetails> {
        let nfo = nfo::find_nfo_file(file, ctx.root(), ctx.watch_dirs)?;
        let imdb_id = nfo::imdb_id_from_file(&nfo)?;
        let source = match ctx.sources.iter().find(|s| s.id() == ctx.imdb_source_id) {
            Some(source) => source,
            None => {
                tracing::debug!(
                    "NFO {} names {} but source '{}' is not available",
                    nfo.display(),
                    imdb_id,
                    ctx.imdb_source_id
                );
                return None;
            }
        };

        tracing::info!("Looking up film details for {} from its NFO", file.display());
        let url = format!("https://www.imdb.com/title/{}/", imdb_id);
        let fetch = FetchContext::with_timeout(ctx.fetch_timeout);
        let call = source.get_film(&fetch, &imdb_id, &url, file);
        let film = match with_deadline(source.id(), &fetch, call).await {
            Ok(film) => film?,
            Err(e) => {
                tracing::error!(
                    "Unable to look up NFO details for {} from source '{}': {}",
                    file.display(),
                    source.id(),
                    e
                );
                return None;
            }
        };

        SearchDetails::new(film.title.as_str(), film.year(), Self::part(&nfo, file))
    }
}

/// Film names with a year: whichever side of the year is not release junk is the title.
pub fn year_bracket_details(file: &Path, strip_tokens: &StripTokens) -> Option<SearchDetails> {
    let name = terms::file_stem(file);
    let re = Regex::new(r"^(.+)[. (\[](\d{4})[. )\]](.*)$").ok()?;
    let caps = re.captures(&name)?;
    let start = caps.get(1).map(|m| m.as_str()).unwrap_or("");
    let year = caps.get(2).map(|m| m.as_str())?;
    let end = caps.get(3).map(|m| m.as_str()).unwrap_or("");

    if !year.parse::<u32>().map(terms::is_valid_year).unwrap_or(false) {
        return None;
    }

    let term = if strip_tokens.is_junk(start) {
        end
    } else if strip_tokens.is_junk(end) {
        start
    } else {
        return None;
    };
    let term = terms::trim_rubbish(&terms::normalize(term));
    SearchDetails::new(term, Some(year.to_string()), None)
}

/// See [`year_bracket_details`].
pub struct YearBracketStrategy;

#[async_trait]
impl SearchStrategy for YearBracketStrategy {
    fn name(&self) -> &'static str {
        "year-bracket"
    }

    async fn get_search(&self, file: &Path, ctx: &StrategyContext<'_>) -> Option<SearchDetails> {
        year_bracket_details(file, &ctx.config.strip_tokens)
    }
}

/// The whole cleaned-up file name is the title.
pub fn exact_name_details(file: &Path, strip_tokens: &StripTokens) -> Option<SearchDetails> {
    let mut name = terms::file_stem(file);

    let mut year = None;
    if let Ok(re) = Regex::new(r"^(.+)[\(\[](\d{4})[\)\]](.*)$") {
        if let Some(caps) = re.captures(&name) {
            let found = caps.get(2).map(|m| m.as_str().to_string());
            if found
                .as_deref()
                .and_then(|y| y.parse::<u32>().ok())
                .map(terms::is_valid_year)
                .unwrap_or(false)
            {
                year = found;
                name = format!(
                    "{}{}",
                    caps.get(1).map(|m| m.as_str()).unwrap_or(""),
                    caps.get(3).map(|m| m.as_str()).unwrap_or("")
                );
            }
        }
    }

    let (rest, name_part) = terms::extract_part(&name);
    let part = terms::cd_folder_part(file).or(name_part);

    // Everything up to the first hyphen is a release group.
    let rest = match Regex::new(r"^.*?-(.+)$") {
        Ok(re) => re.replace(&rest, "$1").into_owned(),
        Err(_) => rest,
    };

    let term = strip_tokens.strip(&rest);
    let term = terms::trim_rubbish(&terms::normalize(&term));
    SearchDetails::new(term, year, part)
}

/// See [`exact_name_details`].
pub struct ExactNameStrategy;

#[async_trait]
impl SearchStrategy for ExactNameStrategy {
    fn name(&self) -> &'static str {
        "exact-name"
    }

    async fn get_search(&self, file: &Path, ctx: &StrategyContext<'_>) -> Option<SearchDetails> {
        exact_name_details(file, &ctx.config.strip_tokens)
    }
}
