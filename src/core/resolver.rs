//! Store-then-source resolution of show, season, episode and film records.
//!
//! For every entity the resolver:
//! 1. asks each store in order (skipped when refreshing; store read errors are
//!    logged and the next store is asked),
//! 2. asks the sources whose id matches the record's source id (any source when
//!    the id is empty), each call bounded by the fetch deadline,
//! 3. writes what a source returned back into every store.
//!
//! A source failure ends resolution of the file. Writes for one show or film
//! are serialized through [`KeyedLocks`].

use crate::models::media::{Episode, Film, SearchResult, Season, Show};
use crate::services::source::{with_deadline, FetchContext, MetadataSource};
use crate::services::store::MetadataStore;
use std::collections::HashMap;
use std::future::Future;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::OwnedMutexGuard;

/// Identity whose updates are serialized.
///
/// Seasons and episodes share the key of their show.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EntityKey {
    Show { source_id: String, id: String },
    Film { source_id: String, id: String },
}

impl EntityKey {
    pub fn show(source_id: &str, id: &str) -> Self {
        EntityKey::Show {
            source_id: source_id.to_string(),
            id: id.to_string(),
        }
    }

    pub fn film(source_id: &str, id: &str) -> Self {
        EntityKey::Film {
            source_id: source_id.to_string(),
            id: id.to_string(),
        }
    }
}

/// One async mutex per entity key.
#[derive(Debug, Default)]
pub struct KeyedLocks {
    locks: Mutex<HashMap<EntityKey, Arc<tokio::sync::Mutex<()>>>>,
}

impl KeyedLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to the key.
    pub async fn lock(&self, key: EntityKey) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = match self.locks.lock() {
                Ok(locks) => locks,
                Err(poisoned) => poisoned.into_inner(),
            };
            if locks.len() > 1024 {
                locks.retain(|_, lock| Arc::strong_count(lock) > 1);
            }
            locks.entry(key).or_default().clone()
        };
        lock.lock_owned().await
    }
}

/// Store-then-source resolver for one media directory.
pub struct Resolver {
    stores: Vec<Arc<dyn MetadataStore>>,
    sources: Vec<Arc<dyn MetadataSource>>,
    fetch_timeout: Duration,
    locks: KeyedLocks,
}

enum Outcome<T> {
    Stored(T),
    Fetched(T),
}

impl Resolver {
    pub fn new(
        stores: Vec<Arc<dyn MetadataStore>>,
        sources: Vec<Arc<dyn MetadataSource>>,
        fetch_timeout: Duration,
    ) -> Self {
        Self {
            stores,
            sources,
            fetch_timeout,
            locks: KeyedLocks::new(),
        }
    }

    pub fn stores(&self) -> &[Arc<dyn MetadataStore>] {
        &self.stores
    }

    pub fn sources(&self) -> &[Arc<dyn MetadataSource>] {
        &self.sources
    }

    pub fn fetch_timeout(&self) -> Duration {
        self.fetch_timeout
    }

    fn matching_sources(&self, source_id: &str) -> Vec<&Arc<dyn MetadataSource>> {
        self.sources
            .iter()
            .filter(|s| source_id.is_empty() || s.id() == source_id)
            .collect()
    }

    /// Ask the matching sources in order; the first record wins.
    ///
    /// Returns `Err(())` when a source failed, after logging it.
    async fn fetch<'a, T, F, Fut>(
        &'a self,
        file: &Path,
        what: &str,
        source_id: &str,
        call: F,
    ) -> std::result::Result<Option<T>, ()>
    where
        F: Fn(&'a Arc<dyn MetadataSource>, FetchContext) -> Fut,
        Fut: Future<Output = crate::Result<Option<T>>>,
    {
        let sources = self.matching_sources(source_id);
        if sources.is_empty() {
            tracing::warn!(
                "No source '{}' available to fetch {} for {}",
                source_id,
                what,
                file.display()
            );
            return Ok(None);
        }
        for source in sources {
            let ctx = FetchContext::with_timeout(self.fetch_timeout);
            tracing::info!(
                "Fetching {} from source '{}' for {}",
                what,
                source.id(),
                file.display()
            );
            match with_deadline(source.id(), &ctx, call(source, ctx)).await {
                Ok(Some(record)) => return Ok(Some(record)),
                Ok(None) => continue,
                Err(e) => {
                    tracing::error!(
                        "Unable to fetch {} for {} from source '{}': {}",
                        what,
                        file.display(),
                        source.id(),
                        e
                    );
                    return Err(());
                }
            }
        }
        Ok(None)
    }

    fn log_store_error(&self, store: &dyn MetadataStore, file: &Path, e: crate::Error) {
        tracing::error!(
            "Store '{}' failed for {}: {}",
            store.id(),
            file.display(),
            e
        );
    }

    /// Resolve a show.
    pub async fn get_show(
        &self,
        root: &Path,
        file: &Path,
        source_id: &str,
        show_id: &str,
        url: &str,
        refresh: bool,
    ) -> Option<Show> {
        let _guard = self.locks.lock(EntityKey::show(source_id, show_id)).await;

        if !refresh {
            for store in &self.stores {
                match store.get_show(root, file, source_id, show_id).await {
                    Ok(Some(show)) => return Some(show),
                    Ok(None) => {}
                    Err(e) => self.log_store_error(store.as_ref(), file, e),
                }
            }
        }

        let show = self
            .fetch(file, "show", source_id, |source, ctx| async move {
                source.get_show(&ctx, show_id, url, file).await
            })
            .await
            .ok()??;

        for store in &self.stores {
            if let Err(e) = store.cache_show(root, file, &show).await {
                self.log_store_error(store.as_ref(), file, e);
            }
        }
        Some(show)
    }

    /// Resolve a season of a show.
    pub async fn get_season(
        &self,
        root: &Path,
        file: &Path,
        show: &Show,
        season_number: u32,
        refresh: bool,
    ) -> Option<Season> {
        let _guard = self
            .locks
            .lock(EntityKey::show(&show.source_id, &show.show_id))
            .await;

        if !refresh {
            for store in &self.stores {
                match store.get_season(root, file, show, season_number).await {
                    Ok(Some(season)) => return Some(season),
                    Ok(None) => {}
                    Err(e) => self.log_store_error(store.as_ref(), file, e),
                }
            }
        }

        let season = self
            .fetch(file, "season", &show.source_id, |source, ctx| async move {
                source.get_season(&ctx, show, season_number).await
            })
            .await
            .ok()??;

        for store in &self.stores {
            if let Err(e) = store.cache_season(root, file, &season).await {
                self.log_store_error(store.as_ref(), file, e);
            }
        }
        Some(season)
    }

    /// Resolve an episode of a season and associate it with the file.
    pub async fn get_episode(
        &self,
        root: &Path,
        file: &Path,
        season: &Season,
        episode_number: u32,
        refresh: bool,
    ) -> Option<Episode> {
        let _guard = self
            .locks
            .lock(EntityKey::show(&season.source_id, &season.show_id))
            .await;

        if !refresh {
            for store in &self.stores {
                match store.get_episode(root, file, season, episode_number).await {
                    Ok(Some(episode)) => return Some(episode),
                    Ok(None) => {}
                    Err(e) => self.log_store_error(store.as_ref(), file, e),
                }
            }
        }

        let episode = self
            .fetch(file, "episode", &season.source_id, |source, ctx| async move {
                source.get_episode(&ctx, season, episode_number, file).await
            })
            .await
            .ok()??;

        for store in &self.stores {
            if let Err(e) = store.cache_episode(root, file, &episode).await {
                self.log_store_error(store.as_ref(), file, e);
            }
        }
        Some(episode)
    }

    async fn lookup_film(
        &self,
        root: &Path,
        file: &Path,
        result: &SearchResult,
        refresh: bool,
    ) -> Option<Outcome<Film>> {
        if !refresh {
            for store in &self.stores {
                match store.get_film(root, file, &result.source_id, &result.id).await {
                    Ok(Some(film)) => return Some(Outcome::Stored(film)),
                    Ok(None) => {}
                    Err(e) => self.log_store_error(store.as_ref(), file, e),
                }
            }
        }

        let id = result.id.as_str();
        let url = result.url.as_str();
        let mut film = self
            .fetch(file, "film", &result.source_id, |source, ctx| async move {
                source.get_film(&ctx, id, url, file).await
            })
            .await
            .ok()??;

        for store in &self.stores {
            if let Err(e) = store.cache_film(root, file, &film, result.part).await {
                self.log_store_error(store.as_ref(), file, e);
            }
        }
        film.add_file(file, result.part);
        Some(Outcome::Fetched(film))
    }

    /// Resolve a film without recording the file against it.
    pub async fn get_film(
        &self,
        root: &Path,
        file: &Path,
        result: &SearchResult,
        refresh: bool,
    ) -> Option<Film> {
        let _guard = self
            .locks
            .lock(EntityKey::film(&result.source_id, &result.id))
            .await;
        match self.lookup_film(root, file, result, refresh).await? {
            Outcome::Stored(film) | Outcome::Fetched(film) => Some(film),
        }
    }

    /// Resolve show, season and episode for a TV file.
    pub async fn resolve_episode(
        &self,
        root: &Path,
        file: &Path,
        result: &SearchResult,
        season_number: u32,
        episode_number: u32,
        refresh: bool,
    ) -> Option<Episode> {
        let show = self
            .get_show(root, file, &result.source_id, &result.id, &result.url, refresh)
            .await?;
        let season = self
            .get_season(root, file, &show, season_number, refresh)
            .await?;
        self.get_episode(root, file, &season, episode_number, refresh)
            .await
    }

    /// Resolve a film and keep its part list consistent across stores.
    ///
    /// A film found in a store that does not list this file gets the file
    /// recorded. When this file's part is higher than every part known so far,
    /// the other files are re-cached so each of them sees the new part count.
    pub async fn resolve_film(
        &self,
        root: &Path,
        file: &Path,
        result: &SearchResult,
        refresh: bool,
    ) -> Option<Film> {
        let _guard = self
            .locks
            .lock(EntityKey::film(&result.source_id, &result.id))
            .await;

        let mut film = match self.lookup_film(root, file, result, refresh).await? {
            Outcome::Fetched(film) => film,
            Outcome::Stored(mut film) => {
                if !film.has_file(file) {
                    film.add_file(file, result.part);
                    for store in &self.stores {
                        if let Err(e) = store.cache_film(root, file, &film, result.part).await {
                            self.log_store_error(store.as_ref(), file, e);
                        }
                    }
                }
                film
            }
        };

        let previous_max = film
            .files
            .iter()
            .filter(|f| f.location != file)
            .filter_map(|f| f.part)
            .max();
        if let (Some(part), Some(max)) = (result.part, previous_max) {
            if part > max {
                tracing::debug!(
                    "Part {} of '{}' exceeds known parts ({}), updating other files",
                    part,
                    film.title,
                    max
                );
                let others: Vec<_> = film
                    .files
                    .iter()
                    .filter(|f| f.location != file)
                    .cloned()
                    .collect();
                for other in others {
                    for store in &self.stores {
                        if let Err(e) = store
                            .cache_film(root, &other.location, &film, other.part)
                            .await
                        {
                            self.log_store_error(store.as_ref(), &other.location, e);
                        }
                    }
                }
            }
        }

        film.files.sort_by(|a, b| a.location.cmp(&b.location));
        Some(film)
    }
}
