//! Metadata source capability.
//!
//! A source fetches show, season, episode and film records from a provider
//! (a scraper, an HTTP API). Provider adapters live outside this crate; they
//! plug in by implementing [`MetadataSource`].

use crate::models::media::{Episode, Film, Mode, SearchResult, Season, Show};
use crate::{Error, Result};
use async_trait::async_trait;
use std::future::Future;
use std::path::Path;
use std::time::Duration;
use tokio::time::Instant;

/// Per-call context handed to a source.
#[derive(Debug, Clone, Copy)]
pub struct FetchContext {
    /// The call is abandoned once this instant passes.
    pub deadline: Instant,
}

impl FetchContext {
    /// Context whose deadline is `timeout` from now.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            deadline: Instant::now() + timeout,
        }
    }

    /// Time left before the deadline.
    pub fn remaining(&self) -> Duration {
        self.deadline.saturating_duration_since(Instant::now())
    }
}

/// A metadata provider.
///
/// Lookups return `Ok(None)` when the provider does not know the entity and
/// `Err` only for transport or parse failures.
#[async_trait]
pub trait MetadataSource: Send + Sync {
    /// Unique id of the source, as recorded in [`SearchResult::source_id`].
    fn id(&self) -> &str;

    async fn get_show(
        &self,
        ctx: &FetchContext,
        show_id: &str,
        url: &str,
        file: &Path,
    ) -> Result<Option<Show>>;

    async fn get_season(
        &self,
        ctx: &FetchContext,
        show: &Show,
        season_number: u32,
    ) -> Result<Option<Season>>;

    async fn get_episode(
        &self,
        ctx: &FetchContext,
        season: &Season,
        episode_number: u32,
        file: &Path,
    ) -> Result<Option<Episode>>;

    async fn get_film(
        &self,
        ctx: &FetchContext,
        film_id: &str,
        url: &str,
        file: &Path,
    ) -> Result<Option<Film>>;

    /// Search the provider for a show or film by name.
    async fn search_media(
        &self,
        ctx: &FetchContext,
        term: &str,
        year: Option<&str>,
        mode: Mode,
        part: Option<u32>,
    ) -> Result<Option<SearchResult>>;
}

/// Run a source call, failing with [`Error::SourceTimeout`] once the deadline passes.
pub async fn with_deadline<T, F>(source_id: &str, ctx: &FetchContext, call: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match tokio::time::timeout_at(ctx.deadline, call).await {
        Ok(result) => result,
        Err(_) => Err(Error::SourceTimeout {
            source_id: source_id.to_string(),
        }),
    }
}
