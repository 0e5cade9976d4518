//! JSON file metadata store.
//!
//! Holds the same records as [`MemoryStore`](super::memory_store::MemoryStore)
//! and rewrites the whole file after every change: the new content is written
//! next to the target and renamed over it.

use crate::models::media::{Episode, Film, Mode, SearchResult, Season, Show};
use crate::services::memory_store::StoreState;
use crate::services::store::MetadataStore;
use crate::{Error, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;

/// Store persisted as pretty-printed JSON.
pub struct JsonFileStore {
    id: String,
    path: PathBuf,
    state: RwLock<StoreState>,
}

impl JsonFileStore {
    /// Open the store, loading existing records if the file exists.
    pub fn open<S: Into<String>>(id: S, path: &Path) -> Result<Self> {
        let id = id.into();
        let state = if path.exists() {
            let content = std::fs::read_to_string(path)?;
            serde_json::from_str(&content)
                .map_err(|e| Error::store_failed(&id, format!("{}: {}", path.display(), e)))?
        } else {
            StoreState::default()
        };
        tracing::debug!("Opened store '{}' at {}", id, path.display());
        Ok(Self {
            id,
            path: path.to_path_buf(),
            state: RwLock::new(state),
        })
    }

    /// Location of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Copy of the current records.
    pub async fn snapshot(&self) -> StoreState {
        self.state.read().await.clone()
    }

    /// Apply a change and persist the result while holding the write lock.
    async fn update<F>(&self, change: F) -> Result<()>
    where
        F: FnOnce(&mut StoreState) + Send,
    {
        let mut state = self.state.write().await;
        let mut next = state.clone();
        change(&mut next);
        if next == *state {
            return Ok(());
        }
        self.persist(&next).await?;
        *state = next;
        Ok(())
    }

    async fn persist(&self, state: &StoreState) -> Result<()> {
        let content = serde_json::to_string_pretty(state)?;
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .map_err(|e| self.io_error(e))?;
            }
        }
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, content)
            .await
            .map_err(|e| self.io_error(e))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| self.io_error(e))?;
        Ok(())
    }

    fn io_error(&self, e: std::io::Error) -> Error {
        Error::store_failed(&self.id, format!("{}: {}", self.path.display(), e))
    }
}

#[async_trait]
impl MetadataStore for JsonFileStore {
    fn id(&self) -> &str {
        &self.id
    }

    async fn get_show(
        &self,
        _root: &Path,
        _file: &Path,
        source_id: &str,
        show_id: &str,
    ) -> Result<Option<Show>> {
        Ok(self.state.read().await.show(source_id, show_id))
    }

    async fn get_season(
        &self,
        _root: &Path,
        _file: &Path,
        show: &Show,
        season_number: u32,
    ) -> Result<Option<Season>> {
        Ok(self.state.read().await.season(show, season_number))
    }

    async fn get_episode(
        &self,
        _root: &Path,
        _file: &Path,
        season: &Season,
        episode_number: u32,
    ) -> Result<Option<Episode>> {
        Ok(self.state.read().await.episode(season, episode_number))
    }

    async fn get_film(
        &self,
        _root: &Path,
        _file: &Path,
        source_id: &str,
        film_id: &str,
    ) -> Result<Option<Film>> {
        Ok(self.state.read().await.film(source_id, film_id))
    }

    async fn get_episode_for_file(&self, _root: &Path, file: &Path) -> Result<Option<Episode>> {
        Ok(self.state.read().await.episode_for_file(file))
    }

    async fn get_film_for_file(&self, _root: &Path, file: &Path) -> Result<Option<Film>> {
        Ok(self.state.read().await.film_for_file(file))
    }

    async fn cache_show(&self, _root: &Path, _file: &Path, show: &Show) -> Result<()> {
        self.update(|state| state.cache_show(show)).await
    }

    async fn cache_season(&self, _root: &Path, _file: &Path, season: &Season) -> Result<()> {
        self.update(|state| state.cache_season(season)).await
    }

    async fn cache_episode(&self, _root: &Path, file: &Path, episode: &Episode) -> Result<()> {
        self.update(|state| state.cache_episode(file, episode)).await
    }

    async fn cache_film(
        &self,
        _root: &Path,
        file: &Path,
        film: &Film,
        part: Option<u32>,
    ) -> Result<()> {
        self.update(|state| state.cache_film(file, film, part)).await
    }

    async fn search_media(
        &self,
        _root: &Path,
        file: &Path,
        term: &str,
        year: Option<&str>,
        mode: Mode,
        part: Option<u32>,
    ) -> Result<Option<SearchResult>> {
        Ok(self.state.read().await.search(file, term, year, mode, part))
    }

    async fn renamed_file(&self, _root: &Path, old: &Path, new: &Path) -> Result<()> {
        self.update(|state| state.renamed(old, new)).await
    }
}
