//! Film or TV episode? Used for directories that mix both.

use crate::core::episode;
use crate::core::media_dir::MediaDirectory;
use crate::core::strategy::{self, FilmNfoStrategy, SearchStrategy};
use crate::core::terms::{self, StripTokens};
use crate::models::media::Mode;
use std::path::Path;

/// Outcome of [`classify`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    Mode(Mode),
    /// Sample clips are never identified.
    Discard,
}

/// Decide whether a file is a film or a TV episode.
///
/// Film evidence (an NFO naming the film, a year in the name) is checked
/// first. Files under a `sample` directory are discarded. Anything the
/// episode parser cannot read as season and episode is a film; the rest are
/// TV episodes.
pub async fn classify(
    file: &Path,
    film_dir: Option<&MediaDirectory>,
    tv_dir: Option<&MediaDirectory>,
) -> Classification {
    if let Some(dir) = film_dir {
        let ctx = dir.strategy_context();
        if let Some(details) = FilmNfoStrategy.get_search(file, &ctx).await {
            if details.year.is_some() {
                tracing::debug!("{} is a film according to its NFO", file.display());
                return Classification::Mode(Mode::Film);
            }
        }
    }

    match StripTokens::defaults() {
        Ok(tokens) => {
            if strategy::year_bracket_details(file, &tokens).is_some() {
                tracing::debug!("{} has a release year, treating as film", file.display());
                return Classification::Mode(Mode::Film);
            }
        }
        Err(e) => tracing::error!("Unable to compile default strip tokens: {}", e),
    }

    if is_in_sample_dir(file) {
        tracing::debug!("Discarding sample {}", file.display());
        return Classification::Discard;
    }

    let parsed = match tv_dir {
        Some(dir) => episode::parse_for_file(dir.config(), file, None),
        None => episode::parse_name(&terms::file_name(file)),
    };
    match parsed {
        Some(_) => Classification::Mode(Mode::TvShow),
        None => Classification::Mode(Mode::Film),
    }
}

fn is_in_sample_dir(file: &Path) -> bool {
    file.parent()
        .and_then(|p| p.file_name())
        .map(|n| n.to_string_lossy().eq_ignore_ascii_case("sample"))
        .unwrap_or(false)
}
