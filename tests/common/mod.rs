//! Shared fixtures for the integration tests: scripted sources and stores
//! that count how often they are called.

#![allow(dead_code)]

use async_trait::async_trait;
use media_identifier::models::media::{Episode, Film, Mode, SearchResult, Season, Show};
use media_identifier::services::memory_store::{MemoryStore, StoreState};
use media_identifier::services::source::{FetchContext, MetadataSource};
use media_identifier::services::store::MetadataStore;
use media_identifier::{Error, Result};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

// ========== SOURCES ==========

/// Source answering from a fixed set of shows and films.
#[derive(Default)]
pub struct FakeSource {
    id: String,
    shows: Vec<Show>,
    films: Vec<Film>,
    delay: Option<Duration>,
    fail: bool,
    calls: AtomicUsize,
}

impl FakeSource {
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            ..Default::default()
        }
    }

    pub fn with_show(mut self, show: Show) -> Self {
        self.shows.push(show);
        self
    }

    pub fn with_film(mut self, film: Film) -> Self {
        self.films.push(film);
        self
    }

    /// Every call sleeps this long before answering.
    pub fn slow(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Every call fails.
    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    async fn enter(&self) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail {
            return Err(Error::source_failed(&self.id, "provider unavailable"));
        }
        Ok(())
    }

    fn show(&self, show_id: &str) -> Option<&Show> {
        self.shows.iter().find(|s| s.show_id == show_id)
    }
}

#[async_trait]
impl MetadataSource for FakeSource {
    fn id(&self) -> &str {
        &self.id
    }

    async fn get_show(
        &self,
        _ctx: &FetchContext,
        show_id: &str,
        _url: &str,
        _file: &Path,
    ) -> Result<Option<Show>> {
        self.enter().await?;
        Ok(self.show(show_id).cloned())
    }

    async fn get_season(
        &self,
        _ctx: &FetchContext,
        show: &Show,
        season_number: u32,
    ) -> Result<Option<Season>> {
        self.enter().await?;
        Ok(self.show(&show.show_id).map(|s| Season::of(s, season_number)))
    }

    async fn get_episode(
        &self,
        _ctx: &FetchContext,
        season: &Season,
        episode_number: u32,
        _file: &Path,
    ) -> Result<Option<Episode>> {
        self.enter().await?;
        Ok(self.show(&season.show_id).map(|_| {
            Episode::of(season, episode_number, format!("Episode {}", episode_number))
        }))
    }

    async fn get_film(
        &self,
        _ctx: &FetchContext,
        film_id: &str,
        _url: &str,
        _file: &Path,
    ) -> Result<Option<Film>> {
        self.enter().await?;
        Ok(self.films.iter().find(|f| f.id == film_id).cloned())
    }

    async fn search_media(
        &self,
        _ctx: &FetchContext,
        term: &str,
        _year: Option<&str>,
        mode: Mode,
        part: Option<u32>,
    ) -> Result<Option<SearchResult>> {
        self.enter().await?;
        let found = match mode {
            Mode::TvShow => self
                .shows
                .iter()
                .find(|s| s.name.eq_ignore_ascii_case(term))
                .map(|s| (s.show_id.clone(), s.url.clone())),
            Mode::Film => self
                .films
                .iter()
                .find(|f| f.title.eq_ignore_ascii_case(term))
                .map(|f| (f.id.clone(), f.url.clone())),
        };
        Ok(found.map(|(id, url)| {
            SearchResult::new(id, self.id.as_str(), url.unwrap_or_default(), part, mode)
        }))
    }
}

// ========== STORES ==========

/// Memory store counting reads and writes.
pub struct CountingStore {
    inner: MemoryStore,
    reads: AtomicUsize,
    writes: AtomicUsize,
}

impl CountingStore {
    pub fn new(id: &str) -> Self {
        Self {
            inner: MemoryStore::new(id),
            reads: AtomicUsize::new(0),
            writes: AtomicUsize::new(0),
        }
    }

    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub async fn snapshot(&self) -> StoreState {
        self.inner.snapshot().await
    }

    fn read(&self) {
        self.reads.fetch_add(1, Ordering::SeqCst);
    }

    fn write(&self) {
        self.writes.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl MetadataStore for CountingStore {
    fn id(&self) -> &str {
        self.inner.id()
    }

    async fn get_show(
        &self,
        root: &Path,
        file: &Path,
        source_id: &str,
        show_id: &str,
    ) -> Result<Option<Show>> {
        self.read();
        self.inner.get_show(root, file, source_id, show_id).await
    }

    async fn get_season(
        &self,
        root: &Path,
        file: &Path,
        show: &Show,
        season_number: u32,
    ) -> Result<Option<Season>> {
        self.read();
        self.inner.get_season(root, file, show, season_number).await
    }

    async fn get_episode(
        &self,
        root: &Path,
        file: &Path,
        season: &Season,
        episode_number: u32,
    ) -> Result<Option<Episode>> {
        self.read();
        self.inner.get_episode(root, file, season, episode_number).await
    }

    async fn get_film(
        &self,
        root: &Path,
        file: &Path,
        source_id: &str,
        film_id: &str,
    ) -> Result<Option<Film>> {
        self.read();
        self.inner.get_film(root, file, source_id, film_id).await
    }

    async fn get_episode_for_file(&self, root: &Path, file: &Path) -> Result<Option<Episode>> {
        self.read();
        self.inner.get_episode_for_file(root, file).await
    }

    async fn get_film_for_file(&self, root: &Path, file: &Path) -> Result<Option<Film>> {
        self.read();
        self.inner.get_film_for_file(root, file).await
    }

    async fn cache_show(&self, root: &Path, file: &Path, show: &Show) -> Result<()> {
        self.write();
        self.inner.cache_show(root, file, show).await
    }

    async fn cache_season(&self, root: &Path, file: &Path, season: &Season) -> Result<()> {
        self.write();
        self.inner.cache_season(root, file, season).await
    }

    async fn cache_episode(&self, root: &Path, file: &Path, episode: &Episode) -> Result<()> {
        self.write();
        self.inner.cache_episode(root, file, episode).await
    }

    async fn cache_film(
        &self,
        root: &Path,
        file: &Path,
        film: &Film,
        part: Option<u32>,
    ) -> Result<()> {
        self.write();
        self.inner.cache_film(root, file, film, part).await
    }

    async fn search_media(
        &self,
        root: &Path,
        file: &Path,
        term: &str,
        year: Option<&str>,
        mode: Mode,
        part: Option<u32>,
    ) -> Result<Option<SearchResult>> {
        self.read();
        self.inner
            .search_media(root, file, term, year, mode, part)
            .await
    }

    async fn renamed_file(&self, root: &Path, old: &Path, new: &Path) -> Result<()> {
        self.write();
        self.inner.renamed_file(root, old, new).await
    }
}

/// Store failing every call.
pub struct BrokenStore;

fn broken<T>() -> Result<T> {
    Err(Error::store_failed("broken", "disk on fire"))
}

#[async_trait]
impl MetadataStore for BrokenStore {
    fn id(&self) -> &str {
        "broken"
    }

    async fn get_show(&self, _: &Path, _: &Path, _: &str, _: &str) -> Result<Option<Show>> {
        broken()
    }

    async fn get_season(&self, _: &Path, _: &Path, _: &Show, _: u32) -> Result<Option<Season>> {
        broken()
    }

    async fn get_episode(&self, _: &Path, _: &Path, _: &Season, _: u32) -> Result<Option<Episode>> {
        broken()
    }

    async fn get_film(&self, _: &Path, _: &Path, _: &str, _: &str) -> Result<Option<Film>> {
        broken()
    }

    async fn get_episode_for_file(&self, _: &Path, _: &Path) -> Result<Option<Episode>> {
        broken()
    }

    async fn get_film_for_file(&self, _: &Path, _: &Path) -> Result<Option<Film>> {
        broken()
    }

    async fn cache_show(&self, _: &Path, _: &Path, _: &Show) -> Result<()> {
        broken()
    }

    async fn cache_season(&self, _: &Path, _: &Path, _: &Season) -> Result<()> {
        broken()
    }

    async fn cache_episode(&self, _: &Path, _: &Path, _: &Episode) -> Result<()> {
        broken()
    }

    async fn cache_film(&self, _: &Path, _: &Path, _: &Film, _: Option<u32>) -> Result<()> {
        broken()
    }

    async fn search_media(
        &self,
        _: &Path,
        _: &Path,
        _: &str,
        _: Option<&str>,
        _: Mode,
        _: Option<u32>,
    ) -> Result<Option<SearchResult>> {
        broken()
    }

    async fn renamed_file(&self, _: &Path, _: &Path, _: &Path) -> Result<()> {
        broken()
    }
}

// ========== FIXTURES ==========

pub fn heroes() -> Show {
    Show {
        source_id: "tvdb".to_string(),
        show_id: "79501".to_string(),
        name: "Heroes".to_string(),
        url: Some("http://thetvdb.com/?tab=series&id=79501".to_string()),
        ..Default::default()
    }
}

pub fn matrix() -> Film {
    Film {
        source_id: "imdb".to_string(),
        id: "tt0133093".to_string(),
        title: "The Matrix".to_string(),
        date: chrono::NaiveDate::from_ymd_opt(1999, 3, 31),
        url: Some("https://www.imdb.com/title/tt0133093/".to_string()),
        ..Default::default()
    }
}
