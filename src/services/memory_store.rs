//! In-process metadata store.

use crate::models::media::{Episode, Film, Mode, SearchResult, Season, Show};
use crate::services::store::MetadataStore;
use crate::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tokio::sync::RwLock;

/// What a file was identified as.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FileEntry {
    Episode { key: String },
    Film { key: String, part: Option<u32> },
}

/// Cached records. Ordered maps keep serialized snapshots deterministic.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoreState {
    #[serde(default)]
    pub shows: BTreeMap<String, Show>,
    #[serde(default)]
    pub seasons: BTreeMap<String, Season>,
    #[serde(default)]
    pub episodes: BTreeMap<String, Episode>,
    #[serde(default)]
    pub films: BTreeMap<String, Film>,
    /// File location to cached entity.
    #[serde(default)]
    pub files: BTreeMap<String, FileEntry>,
}

fn show_key(source_id: &str, show_id: &str) -> String {
    format!("{}/{}", source_id, show_id)
}

fn season_key(source_id: &str, show_id: &str, season: u32) -> String {
    format!("{}/{}/{}", source_id, show_id, season)
}

fn episode_key(source_id: &str, show_id: &str, season: u32, episode: u32) -> String {
    format!("{}/{}/{}/{}", source_id, show_id, season, episode)
}

fn film_key(source_id: &str, film_id: &str) -> String {
    format!("{}/{}", source_id, film_id)
}

fn file_key(file: &Path) -> String {
    file.to_string_lossy().replace('\\', "/")
}

impl StoreState {
    pub fn show(&self, source_id: &str, show_id: &str) -> Option<Show> {
        self.shows.get(&show_key(source_id, show_id)).cloned()
    }

    pub fn season(&self, show: &Show, season_number: u32) -> Option<Season> {
        self.seasons
            .get(&season_key(&show.source_id, &show.show_id, season_number))
            .cloned()
    }

    pub fn episode(&self, season: &Season, episode_number: u32) -> Option<Episode> {
        let key = episode_key(
            &season.source_id,
            &season.show_id,
            season.season_number,
            episode_number,
        );
        self.episodes.get(&key).cloned()
    }

    pub fn film(&self, source_id: &str, film_id: &str) -> Option<Film> {
        self.films.get(&film_key(source_id, film_id)).cloned()
    }

    pub fn episode_for_file(&self, file: &Path) -> Option<Episode> {
        match self.files.get(&file_key(file))? {
            FileEntry::Episode { key } => self.episodes.get(key).cloned(),
            FileEntry::Film { .. } => None,
        }
    }

    pub fn film_for_file(&self, file: &Path) -> Option<Film> {
        match self.files.get(&file_key(file))? {
            FileEntry::Film { key, .. } => self.films.get(key).cloned(),
            FileEntry::Episode { .. } => None,
        }
    }

    pub fn cache_show(&mut self, show: &Show) {
        self.shows
            .insert(show_key(&show.source_id, &show.show_id), show.clone());
    }

    pub fn cache_season(&mut self, season: &Season) {
        let key = season_key(&season.source_id, &season.show_id, season.season_number);
        self.seasons.insert(key, season.clone());
    }

    pub fn cache_episode(&mut self, file: &Path, episode: &Episode) {
        let key = episode_key(
            &episode.source_id,
            &episode.show_id,
            episode.season_number,
            episode.episode_number,
        );
        self.episodes.insert(key.clone(), episode.clone());
        self.files.insert(file_key(file), FileEntry::Episode { key });
    }

    /// Upsert the film, merging its file list with what is already cached.
    pub fn cache_film(&mut self, file: &Path, film: &Film, part: Option<u32>) {
        let key = film_key(&film.source_id, &film.id);
        let mut merged = film.clone();
        if let Some(existing) = self.films.get(&key) {
            for known in &existing.files {
                if !merged.has_file(&known.location) {
                    merged.files.push(known.clone());
                }
            }
        }
        merged.add_file(file, part);
        merged.files.sort_by(|a, b| a.location.cmp(&b.location));
        self.films.insert(key.clone(), merged);
        self.files
            .insert(file_key(file), FileEntry::Film { key, part });
    }

    /// Identity of a cached show or film, by file first, then by name.
    pub fn search(
        &self,
        file: &Path,
        term: &str,
        year: Option<&str>,
        mode: Mode,
        part: Option<u32>,
    ) -> Option<SearchResult> {
        if let Some(result) = self.search_by_file(file, mode, part) {
            return Some(result);
        }
        match mode {
            Mode::TvShow => self
                .shows
                .values()
                .find(|s| s.name.eq_ignore_ascii_case(term.trim()))
                .map(show_result),
            Mode::Film => self
                .films
                .values()
                .find(|f| {
                    f.title.eq_ignore_ascii_case(term.trim())
                        && (year.is_none() || f.year().is_none() || f.year().as_deref() == year)
                })
                .map(|film| film_result(film, part)),
        }
    }

    fn search_by_file(&self, file: &Path, mode: Mode, part: Option<u32>) -> Option<SearchResult> {
        match (self.files.get(&file_key(file))?, mode) {
            (FileEntry::Episode { key }, Mode::TvShow) => {
                let episode = self.episodes.get(key)?;
                let show = self.show(&episode.source_id, &episode.show_id)?;
                let mut result = show_result(&show);
                result.season = Some(episode.season_number);
                result.episodes = Some(vec![episode.episode_number]);
                Some(result)
            }
            (FileEntry::Film { key, part: cached }, Mode::Film) => {
                let film = self.films.get(key)?;
                Some(film_result(film, cached.or(part)))
            }
            _ => None,
        }
    }

    /// Move a file's associations to its new location.
    pub fn renamed(&mut self, old: &Path, new: &Path) {
        let entry = match self.files.remove(&file_key(old)) {
            Some(entry) => entry,
            None => return,
        };
        if let FileEntry::Film { key, .. } = &entry {
            if let Some(film) = self.films.get_mut(key) {
                for known in film.files.iter_mut() {
                    if known.location == old {
                        known.location = new.to_path_buf();
                    }
                }
                film.files.sort_by(|a, b| a.location.cmp(&b.location));
            }
        }
        self.files.insert(file_key(new), entry);
    }
}

fn show_result(show: &Show) -> SearchResult {
    let mut result = SearchResult::new(
        show.show_id.as_str(),
        show.source_id.as_str(),
        show.url.clone().unwrap_or_default(),
        None,
        Mode::TvShow,
    );
    result.title = Some(show.name.clone());
    result
}

fn film_result(film: &Film, part: Option<u32>) -> SearchResult {
    let mut result = SearchResult::new(
        film.id.as_str(),
        film.source_id.as_str(),
        film.url.clone().unwrap_or_default(),
        part,
        Mode::Film,
    );
    result.title = Some(film.title.clone());
    result
}

/// Store keeping everything in memory.
pub struct MemoryStore {
    id: String,
    state: RwLock<StoreState>,
}

impl MemoryStore {
    pub fn new<S: Into<String>>(id: S) -> Self {
        Self::with_state(id, StoreState::default())
    }

    /// Store starting from existing records.
    pub fn with_state<S: Into<String>>(id: S, state: StoreState) -> Self {
        Self {
            id: id.into(),
            state: RwLock::new(state),
        }
    }

    /// Copy of the current records.
    pub async fn snapshot(&self) -> StoreState {
        self.state.read().await.clone()
    }
}

#[async_trait]
impl MetadataStore for MemoryStore {
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
        self.state.write().await.cache_show(show);
        Ok(())
    }

    async fn cache_season(&self, _root: &Path, _file: &Path, season: &Season) -> Result<()> {
        self.state.write().await.cache_season(season);
        Ok(())
    }

    async fn cache_episode(&self, _root: &Path, file: &Path, episode: &Episode) -> Result<()> {
        self.state.write().await.cache_episode(file, episode);
        Ok(())
    }

    async fn cache_film(
        &self,
        _root: &Path,
        file: &Path,
        film: &Film,
        part: Option<u32>,
    ) -> Result<()> {
        self.state.write().await.cache_film(file, film, part);
        Ok(())
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
        self.state.write().await.renamed(old, new);
        Ok(())
    }
}
