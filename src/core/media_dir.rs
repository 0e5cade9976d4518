//! A configured media directory: its rename pattern, strategy chain and resolver.

use crate::core::episode;
use crate::core::resolver::Resolver;
use crate::core::searcher::{MediaSearcher, TermResolver};
use crate::core::strategy::StrategyContext;
use crate::core::terms;
use crate::models::config::{AppConfig, MediaDirConfig, MediaDirSettings, StoreSettings};
use crate::models::media::{Episode, Film, Mode, SearchResult};
use crate::services::json_store::JsonFileStore;
use crate::services::memory_store::MemoryStore;
use crate::services::source::{with_deadline, FetchContext, MetadataSource};
use crate::services::store::MetadataStore;
use crate::Result;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

pub struct MediaDirectory {
    config: MediaDirConfig,
    resolver: Resolver,
    watch_dirs: Vec<PathBuf>,
    imdb_source_id: String,
    searcher: MediaSearcher,
}

impl MediaDirectory {
    pub fn new(
        config: MediaDirConfig,
        resolver: Resolver,
        watch_dirs: Vec<PathBuf>,
        imdb_source_id: &str,
    ) -> Self {
        let searcher = MediaSearcher::for_mode(config.mode);
        Self {
            config,
            resolver,
            watch_dirs,
            imdb_source_id: imdb_source_id.to_string(),
            searcher,
        }
    }

    /// Build a directory from its settings, opening the configured stores.
    pub fn from_settings(
        settings: &MediaDirSettings,
        app: &AppConfig,
        sources: Vec<Arc<dyn MetadataSource>>,
    ) -> Result<Self> {
        let config = settings.compile()?;
        let stores = open_stores(settings)?;
        let resolver = Resolver::new(stores, sources, app.fetch_timeout());
        Ok(Self::new(
            config,
            resolver,
            app.watch_dirs.clone(),
            &app.imdb_source_id,
        ))
    }

    pub fn config(&self) -> &MediaDirConfig {
        &self.config
    }

    pub fn root(&self) -> &Path {
        &self.config.media_dir
    }

    pub fn mode(&self) -> Mode {
        self.config.mode
    }

    pub fn resolver(&self) -> &Resolver {
        &self.resolver
    }

    pub fn searcher(&self) -> &MediaSearcher {
        &self.searcher
    }

    /// Whether the file lives under this directory.
    pub fn contains(&self, file: &Path) -> bool {
        file.starts_with(&self.config.media_dir)
    }

    /// Whether the file is a media file this directory handles.
    pub fn accepts(&self, file: &Path) -> bool {
        self.config.accepts_extension(file) && !self.config.is_ignored(file)
    }

    pub fn strategy_context(&self) -> StrategyContext<'_> {
        StrategyContext {
            config: &self.config,
            watch_dirs: &self.watch_dirs,
            sources: self.resolver.sources(),
            imdb_source_id: &self.imdb_source_id,
            fetch_timeout: self.resolver.fetch_timeout(),
        }
    }

    /// Run the strategy chain and resolve the term to a provider identity.
    pub async fn search_for_video_id(
        &self,
        file: &Path,
        use_sources: bool,
    ) -> Result<Option<SearchResult>> {
        let ctx = self.strategy_context();
        self.searcher.search(file, &ctx, self, use_sources).await
    }

    /// Identify a TV episode file.
    ///
    /// `refresh` skips the stores' file index. Cached records are bypassed
    /// only when sources may be asked, since nothing else could replace them.
    pub async fn identify_episode(
        &self,
        file: &Path,
        refresh: bool,
        use_sources: bool,
    ) -> Result<Option<Episode>> {
        if !refresh {
            for store in self.resolver.stores() {
                match store.get_episode_for_file(self.root(), file).await {
                    Ok(Some(episode)) => return Ok(Some(episode)),
                    Ok(None) => {}
                    Err(e) => tracing::error!(
                        "Store '{}' failed for {}: {}",
                        store.id(),
                        file.display(),
                        e
                    ),
                }
            }
        }

        let result = match self.search_for_video_id(file, use_sources).await? {
            Some(result) => result,
            None => return Ok(None),
        };
        let parsed = match episode::parse_for_file(&self.config, file, Some(&result)) {
            Some(parsed) => parsed,
            None => {
                tracing::debug!(
                    "Unable to work out season and episode of {}",
                    file.display()
                );
                return Ok(None);
            }
        };

        Ok(self
            .resolver
            .resolve_episode(
                self.root(),
                file,
                &result,
                parsed.season,
                parsed.episode(),
                refresh && use_sources,
            )
            .await)
    }

    /// Identify a film file. `refresh` behaves as for [`Self::identify_episode`].
    pub async fn identify_film(
        &self,
        file: &Path,
        refresh: bool,
        use_sources: bool,
    ) -> Result<Option<Film>> {
        if !refresh {
            for store in self.resolver.stores() {
                match store.get_film_for_file(self.root(), file).await {
                    Ok(Some(film)) => return Ok(Some(film)),
                    Ok(None) => {}
                    Err(e) => tracing::error!(
                        "Store '{}' failed for {}: {}",
                        store.id(),
                        file.display(),
                        e
                    ),
                }
            }
        }

        let result = match self.search_for_video_id(file, use_sources).await? {
            Some(result) => result,
            None => return Ok(None),
        };
        Ok(self
            .resolver
            .resolve_film(self.root(), file, &result, refresh && use_sources)
            .await)
    }

    /// Tell every store that a file moved.
    pub async fn renamed_file(&self, old: &Path, new: &Path) {
        for store in self.resolver.stores() {
            if let Err(e) = store.renamed_file(self.root(), old, new).await {
                tracing::error!(
                    "Store '{}' failed to record rename of {} to {}: {}",
                    store.id(),
                    old.display(),
                    new.display(),
                    e
                );
            }
        }
    }
}

impl std::fmt::Debug for MediaDirectory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MediaDirectory")
            .field("root", &self.root())
            .field("mode", &self.mode())
            .finish()
    }
}

#[async_trait]
impl TermResolver for MediaDirectory {
    async fn resolve_term(
        &self,
        file: &Path,
        term: &str,
        year: Option<&str>,
        mode: Mode,
        part: Option<u32>,
        use_sources: bool,
    ) -> Result<Option<SearchResult>> {
        let term = terms::remove_unwanted_characters(term);

        for store in self.resolver.stores() {
            if let Some(result) = store
                .search_media(self.root(), file, &term, year, mode, part)
                .await?
            {
                tracing::debug!("Store '{}' knows '{}' as {}", store.id(), term, result);
                return Ok(Some(result));
            }
        }

        if !use_sources {
            return Ok(None);
        }

        for source in self.resolver.sources() {
            let ctx = FetchContext::with_timeout(self.resolver.fetch_timeout());
            tracing::info!("Searching source '{}' for '{}'", source.id(), term);
            let call = source.search_media(&ctx, &term, year, mode, part);
            if let Some(result) = with_deadline(source.id(), &ctx, call).await? {
                return Ok(Some(result));
            }
        }
        Ok(None)
    }
}

fn open_stores(settings: &MediaDirSettings) -> Result<Vec<Arc<dyn MetadataStore>>> {
    let mut stores: Vec<Arc<dyn MetadataStore>> = Vec::with_capacity(settings.stores.len());
    for store in &settings.stores {
        match store {
            StoreSettings::Memory => stores.push(Arc::new(MemoryStore::new("memory"))),
            StoreSettings::Json { .. } => {
                if let Some(path) = store.json_file(&settings.path) {
                    stores.push(Arc::new(JsonFileStore::open("json", &path)?));
                }
            }
        }
    }
    Ok(stores)
}

/// Directory backed by the given stores and sources, used by tests and embedders.
pub fn with_collaborators(
    config: MediaDirConfig,
    stores: Vec<Arc<dyn MetadataStore>>,
    sources: Vec<Arc<dyn MetadataSource>>,
    fetch_timeout: Duration,
) -> MediaDirectory {
    let resolver = Resolver::new(stores, sources, fetch_timeout);
    MediaDirectory::new(config, resolver, Vec::new(), "imdb")
}
