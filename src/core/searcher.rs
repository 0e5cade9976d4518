//! Strategy chain driver.

use crate::core::strategy::{film_strategies, tv_strategies, SearchStrategy, StrategyContext};
use crate::models::media::{Mode, SearchDetails, SearchResult};
use crate::Result;
use async_trait::async_trait;
use std::path::Path;

/// Turns a search term into a provider identity.
#[async_trait]
pub trait TermResolver: Send + Sync {
    /// Look the term up in the stores, then (when `use_sources`) the sources.
    async fn resolve_term(
        &self,
        file: &Path,
        term: &str,
        year: Option<&str>,
        mode: Mode,
        part: Option<u32>,
        use_sources: bool,
    ) -> Result<Option<SearchResult>>;
}

/// Runs a chain of search strategies for one mode.
pub struct MediaSearcher {
    mode: Mode,
    strategies: Vec<Box<dyn SearchStrategy>>,
}

impl MediaSearcher {
    pub fn new(mode: Mode, strategies: Vec<Box<dyn SearchStrategy>>) -> Self {
        Self { mode, strategies }
    }

    /// Searcher with the TV show strategy chain.
    pub fn tv() -> Self {
        Self::new(Mode::TvShow, tv_strategies())
    }

    /// Searcher with the film strategy chain.
    pub fn film() -> Self {
        Self::new(Mode::Film, film_strategies())
    }

    /// Searcher for the given mode.
    pub fn for_mode(mode: Mode) -> Self {
        match mode {
            Mode::TvShow => Self::tv(),
            Mode::Film => Self::film(),
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Names of the strategies, in the order they are tried.
    pub fn strategy_names(&self) -> Vec<&'static str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    /// Search details from the first strategy that matches.
    pub async fn find_details(
        &self,
        file: &Path,
        ctx: &StrategyContext<'_>,
    ) -> Option<SearchDetails> {
        for strategy in &self.strategies {
            match strategy.get_search(file, ctx).await {
                Some(details) => {
                    tracing::debug!(
                        "Strategy '{}' matched {}: term '{}'",
                        strategy.name(),
                        file.display(),
                        details.term
                    );
                    return Some(details);
                }
                None => {
                    tracing::debug!(
                        "Strategy '{}' did not match {}",
                        strategy.name(),
                        file.display()
                    );
                }
            }
        }
        None
    }

    /// Identify a file.
    ///
    /// Only the first matching strategy is used: when its term resolves to
    /// nothing, later strategies are not tried.
    pub async fn search(
        &self,
        file: &Path,
        ctx: &StrategyContext<'_>,
        resolver: &dyn TermResolver,
        use_sources: bool,
    ) -> Result<Option<SearchResult>> {
        let details = match self.find_details(file, ctx).await {
            Some(details) => details,
            None => {
                tracing::debug!("No search term found for {}", file.display());
                return Ok(None);
            }
        };

        let result = resolver
            .resolve_term(
                file,
                &details.term,
                details.year.as_deref(),
                self.mode,
                details.part,
                use_sources,
            )
            .await?;

        Ok(result.map(|mut result| {
            if details.season.is_some() {
                result.season = details.season;
            }
            if details.episodes.is_some() {
                result.episodes = details.episodes.clone();
            }
            result
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::config::MediaDirConfig;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    struct Fixed {
        name: &'static str,
        term: Option<&'static str>,
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl SearchStrategy for Fixed {
        fn name(&self) -> &'static str {
            self.name
        }

        async fn get_search(
            &self,
            _file: &Path,
            _ctx: &StrategyContext<'_>,
        ) -> Option<SearchDetails> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let details = SearchDetails::new(self.term?, None, None)?;
            Some(details.with_episode(Some(2), Some(vec![5, 6])))
        }
    }

    #[derive(Default)]
    struct Recorder {
        terms: Mutex<Vec<String>>,
        answer: bool,
    }

    #[async_trait]
    impl TermResolver for Recorder {
        async fn resolve_term(
            &self,
            _file: &Path,
            term: &str,
            _year: Option<&str>,
            mode: Mode,
            part: Option<u32>,
            _use_sources: bool,
        ) -> Result<Option<SearchResult>> {
            self.terms.lock().unwrap().push(term.to_string());
            if !self.answer {
                return Ok(None);
            }
            Ok(Some(SearchResult::new("1", "tvdb", "http://tvdb/1", part, mode)))
        }
    }

    fn chain(first: Option<&'static str>, counters: &[Arc<AtomicUsize>; 3]) -> MediaSearcher {
        MediaSearcher::new(
            Mode::TvShow,
            vec![
                Box::new(Fixed {
                    name: "a",
                    term: first,
                    calls: counters[0].clone(),
                }),
                Box::new(Fixed {
                    name: "b",
                    term: Some("second"),
                    calls: counters[1].clone(),
                }),
                Box::new(Fixed {
                    name: "c",
                    term: Some("third"),
                    calls: counters[2].clone(),
                }),
            ],
        )
    }

    #[tokio::test]
    async fn test_first_match_is_decisive() {
        let config =
            MediaDirConfig::new(Path::new("/tv"), Mode::TvShow, "%n/%s/%e - %t.%x").unwrap();
        let ctx = StrategyContext::new(&config);
        let counters = [
            Arc::new(AtomicUsize::new(0)),
            Arc::new(AtomicUsize::new(0)),
            Arc::new(AtomicUsize::new(0)),
        ];
        let searcher = chain(None, &counters);
        let resolver = Recorder::default();

        let result = searcher
            .search(Path::new("/tv/x.avi"), &ctx, &resolver, false)
            .await
            .unwrap();

        assert!(result.is_none());
        assert_eq!(counters[0].load(Ordering::SeqCst), 1);
        assert_eq!(counters[1].load(Ordering::SeqCst), 1);
        assert_eq!(counters[2].load(Ordering::SeqCst), 0);
        assert_eq!(*resolver.terms.lock().unwrap(), vec!["second".to_string()]);
    }

    #[tokio::test]
    async fn test_episode_numbers_copied_onto_result() {
        let config =
            MediaDirConfig::new(Path::new("/tv"), Mode::TvShow, "%n/%s/%e - %t.%x").unwrap();
        let ctx = StrategyContext::new(&config);
        let counters = [
            Arc::new(AtomicUsize::new(0)),
            Arc::new(AtomicUsize::new(0)),
            Arc::new(AtomicUsize::new(0)),
        ];
        let searcher = chain(Some("first"), &counters);
        let resolver = Recorder {
            answer: true,
            ..Default::default()
        };

        let result = searcher
            .search(Path::new("/tv/x.avi"), &ctx, &resolver, false)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(result.season, Some(2));
        assert_eq!(result.episodes, Some(vec![5, 6]));
        assert_eq!(counters[1].load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_default_chains() {
        assert_eq!(
            MediaSearcher::tv().strategy_names(),
            vec!["reverse-pattern", "nfo-directory", "episode-file-name", "parent-directory"]
        );
        assert_eq!(
            MediaSearcher::film().strategy_names(),
            vec!["reverse-pattern", "film-nfo", "year-bracket", "exact-name"]
        );
    }
}
