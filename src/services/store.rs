//! Metadata store capability.
//!
//! Stores cache what sources return, keyed by `(source_id, provider_id)`.
//! Caching the same record twice must leave the store unchanged.

use crate::models::media::{Episode, Film, Mode, SearchResult, Season, Show};
use crate::Result;
use async_trait::async_trait;
use std::path::Path;

/// A metadata cache.
///
/// Every call names the media directory root and the file being processed,
/// so stores that keep per-directory or per-file data can use them.
#[async_trait]
pub trait MetadataStore: Send + Sync {
    /// Unique id of the store, used in logs.
    fn id(&self) -> &str;

    async fn get_show(
        &self,
        root: &Path,
        file: &Path,
        source_id: &str,
        show_id: &str,
    ) -> Result<Option<Show>>;

    async fn get_season(
        &self,
        root: &Path,
        file: &Path,
        show: &Show,
        season_number: u32,
    ) -> Result<Option<Season>>;

    async fn get_episode(
        &self,
        root: &Path,
        file: &Path,
        season: &Season,
        episode_number: u32,
    ) -> Result<Option<Episode>>;

    async fn get_film(
        &self,
        root: &Path,
        file: &Path,
        source_id: &str,
        film_id: &str,
    ) -> Result<Option<Film>>;

    /// Episode previously cached for this file.
    async fn get_episode_for_file(&self, root: &Path, file: &Path) -> Result<Option<Episode>>;

    /// Film previously cached for this file.
    async fn get_film_for_file(&self, root: &Path, file: &Path) -> Result<Option<Film>>;

    async fn cache_show(&self, root: &Path, file: &Path, show: &Show) -> Result<()>;

    async fn cache_season(&self, root: &Path, file: &Path, season: &Season) -> Result<()>;

    /// Cache an episode and associate it with the file.
    async fn cache_episode(&self, root: &Path, file: &Path, episode: &Episode) -> Result<()>;

    /// Cache a film and record the file as the given part of it.
    async fn cache_film(
        &self,
        root: &Path,
        file: &Path,
        film: &Film,
        part: Option<u32>,
    ) -> Result<()>;

    /// Look up a show or film by name among cached records.
    async fn search_media(
        &self,
        root: &Path,
        file: &Path,
        term: &str,
        year: Option<&str>,
        mode: Mode,
        part: Option<u32>,
    ) -> Result<Option<SearchResult>>;

    /// A file moved: carry its associations over to the new location.
    async fn renamed_file(&self, root: &Path, old: &Path, new: &Path) -> Result<()>;
}
