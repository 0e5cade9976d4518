//! Integration tests for identifying files end to end.
//!
//! Tests cover:
//! - Strategy chains picking search terms from real-world names
//! - Media directories resolving terms through stores, then sources
//! - Library lookups for files outside any media directory
//! - JSON store persistence across runs

mod common;

use common::{heroes, matrix, CountingStore, FakeSource};
use media_identifier::core::library::{Identified, MediaLibrary};
use media_identifier::core::media_dir::{with_collaborators, MediaDirectory};
use media_identifier::core::searcher::MediaSearcher;
use media_identifier::core::strategy::StrategyContext;
use media_identifier::models::config::{AppConfig, MediaDirConfig, MediaDirSettings};
use media_identifier::models::media::Mode;
use media_identifier::services::json_store::JsonFileStore;
use media_identifier::services::source::MetadataSource;
use media_identifier::services::store::MetadataStore;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

fn film_dir(store: &Arc<CountingStore>, source: &Arc<FakeSource>) -> MediaDirectory {
    let config =
        MediaDirConfig::new(Path::new("/media/films"), Mode::Film, "%t{ (%y)}{ Part %p}.%x")
            .unwrap();
    with_collaborators(
        config,
        vec![store.clone() as Arc<dyn MetadataStore>],
        vec![source.clone() as Arc<dyn MetadataSource>],
        Duration::from_secs(5),
    )
}

fn tv_dir(store: &Arc<CountingStore>, source: &Arc<FakeSource>) -> MediaDirectory {
    let config =
        MediaDirConfig::new(Path::new("/media/tv"), Mode::TvShow, "%n/Season %s/%e - %t.%x")
            .unwrap();
    with_collaborators(
        config,
        vec![store.clone() as Arc<dyn MetadataStore>],
        vec![source.clone() as Arc<dyn MetadataSource>],
        Duration::from_secs(5),
    )
}

// ========== STRATEGY CHAINS ==========

#[tokio::test]
async fn test_episode_name_with_foreign_pattern() {
    let config =
        MediaDirConfig::new(Path::new("/media/tv"), Mode::TvShow, "%s x %e - %t.%x").unwrap();
    let ctx = StrategyContext::new(&config);

    let details = MediaSearcher::tv()
        .find_details(Path::new("/media/tv/Eureka.S01E02.720p.mkv"), &ctx)
        .await
        .unwrap();

    assert_eq!(details.term, "Eureka");
    assert_eq!(details.season, Some(1));
    assert_eq!(details.episodes, Some(vec![2]));
}

#[tokio::test]
async fn test_film_names() {
    let config = MediaDirConfig::new(Path::new("/media/films"), Mode::Film, "%t.%x").unwrap();
    let ctx = StrategyContext::new(&config);
    let searcher = MediaSearcher::film();

    let details = searcher
        .find_details(Path::new("/media/films/The Matrix (1999).mkv"), &ctx)
        .await
        .unwrap();
    assert_eq!(details.term, "The Matrix");
    assert_eq!(details.year.as_deref(), Some("1999"));

    let details = searcher
        .find_details(Path::new("/media/films/CD2/Movie Part.avi"), &ctx)
        .await
        .unwrap();
    assert_eq!(details.part, Some(2));

    let details = searcher
        .find_details(
            Path::new("/media/films/Blade.Runner.1982.Final.Cut.1080p.BluRay.x264.mkv"),
            &ctx,
        )
        .await;
    // "Final Cut" is not release junk, so the year split is ambiguous and the
    // whole name is used.
    assert_eq!(
        details.map(|d| d.term),
        Some("Blade Runner 1982 Final Cut".to_string())
    );
}

#[tokio::test]
async fn test_tv_multi_episode_file() {
    let config = MediaDirConfig::new(
        Path::new("/media/tv"),
        Mode::TvShow,
        "%n/Season %s/%e - %t.%x",
    )
    .unwrap();
    let ctx = StrategyContext::new(&config);

    let details = MediaSearcher::tv()
        .find_details(Path::new("/media/tv/incoming/The.Office.S02E01E02.HDTV.avi"), &ctx)
        .await
        .unwrap();

    assert_eq!(details.term, "The Office");
    assert_eq!(details.season, Some(2));
    assert_eq!(details.episodes, Some(vec![1, 2]));
}

// ========== MEDIA DIRECTORIES ==========

#[tokio::test]
async fn test_identify_film_through_source_then_store() {
    let store = Arc::new(CountingStore::new("memory"));
    let imdb = Arc::new(FakeSource::new("imdb").with_film(matrix()));
    let dir = film_dir(&store, &imdb);
    let file = Path::new("/media/films/The Matrix (1999).avi");

    let film = dir.identify_film(file, false, true).await.unwrap().unwrap();
    assert_eq!(film.id, "tt0133093");
    assert!(film.has_file(file));
    // Search, then fetch.
    assert_eq!(imdb.calls(), 2);

    let again = dir.identify_film(file, false, true).await.unwrap().unwrap();
    assert_eq!(again.id, film.id);
    assert_eq!(imdb.calls(), 2);
}

#[tokio::test]
async fn test_identify_without_sources_uses_stores_only() {
    let store = Arc::new(CountingStore::new("memory"));
    let imdb = Arc::new(FakeSource::new("imdb").with_film(matrix()));
    let dir = film_dir(&store, &imdb);

    let film = dir
        .identify_film(Path::new("/media/films/The Matrix (1999).avi"), false, false)
        .await
        .unwrap();

    assert!(film.is_none());
    assert_eq!(imdb.calls(), 0);
}

#[tokio::test]
async fn test_identify_episode_through_source() {
    let store = Arc::new(CountingStore::new("memory"));
    let tvdb = Arc::new(FakeSource::new("tvdb").with_show(heroes()));
    let dir = tv_dir(&store, &tvdb);
    let file = Path::new("/media/tv/Heroes/Season 1/02 - Collision.avi");

    let episode = dir.identify_episode(file, false, true).await.unwrap().unwrap();

    assert_eq!(episode.show_id, "79501");
    assert_eq!(episode.season_number, 1);
    assert_eq!(episode.episode_number, 2);
    // Search, show, season, episode.
    assert_eq!(tvdb.calls(), 4);
    assert_eq!(
        store.snapshot().await.episode_for_file(file),
        Some(episode.clone())
    );

    // A second file of the same show finds it by name in the store.
    let next = Path::new("/media/tv/Heroes/Season 1/03 - One Giant Leap.avi");
    let episode = dir.identify_episode(next, false, true).await.unwrap().unwrap();
    assert_eq!(episode.episode_number, 3);
    // Only the new episode was fetched.
    assert_eq!(tvdb.calls(), 5);
}

#[tokio::test]
async fn test_source_error_during_search_propagates() {
    let store = Arc::new(CountingStore::new("memory"));
    let tvdb = Arc::new(FakeSource::new("tvdb").failing());
    let dir = tv_dir(&store, &tvdb);

    let result = dir
        .identify_episode(Path::new("/media/tv/Heroes/Season 1/02 - Collision.avi"), false, true)
        .await;

    assert!(matches!(result, Err(e) if e.is_source_error()));
}

// ========== LIBRARY ==========

#[tokio::test]
async fn test_library_classifies_loose_files() {
    let film_store = Arc::new(CountingStore::new("films"));
    let tv_store = Arc::new(CountingStore::new("tv"));
    let imdb = Arc::new(FakeSource::new("imdb").with_film(matrix()));
    let tvdb = Arc::new(FakeSource::new("tvdb").with_show(heroes()));
    let library = MediaLibrary::new(vec![
        film_dir(&film_store, &imdb),
        tv_dir(&tv_store, &tvdb),
    ]);

    assert_eq!(library.dirs()[0].mode(), Mode::TvShow);

    let found = library
        .lookup_media(Path::new("/downloads/The Matrix (1999).avi"), false, true)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(found.dir.mode(), Mode::Film);
    assert!(matches!(found.identified, Identified::Film(ref f) if f.title == "The Matrix"));

    let found = library
        .lookup_media(Path::new("/downloads/Heroes.S01E02.avi"), false, true)
        .await
        .unwrap()
        .unwrap();
    assert!(matches!(found.identified, Identified::Episode(ref e) if e.episode_number == 2));

    let sample = library
        .lookup_media(Path::new("/downloads/Heroes/Sample/heroes.s01e02.avi"), false, true)
        .await
        .unwrap();
    assert!(sample.is_none());
}

// ========== PERSISTENCE ==========

#[tokio::test]
async fn test_json_store_remembers_identification() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path().join("films");
    fs::create_dir_all(&root).unwrap();
    let file = root.join("The Matrix (1999).avi");
    fs::write(&file, "fake video").unwrap();

    let settings = MediaDirSettings::new(&root, Mode::Film);
    let imdb = Arc::new(FakeSource::new("imdb").with_film(matrix()));
    let dir = MediaDirectory::from_settings(
        &settings,
        &AppConfig::default(),
        vec![imdb.clone() as Arc<dyn MetadataSource>],
    )
    .unwrap();
    dir.identify_film(&file, false, true).await.unwrap().unwrap();

    let store = JsonFileStore::open("json", &root.join(".media_identifier.json")).unwrap();
    let cached = store.get_film_for_file(&root, &file).await.unwrap().unwrap();
    assert_eq!(cached.title, "The Matrix");

    // A fresh directory without sources still knows the file.
    let offline =
        MediaDirectory::from_settings(&settings, &AppConfig::default(), Vec::new()).unwrap();
    let film = offline.identify_film(&file, false, false).await.unwrap();
    assert_eq!(film.map(|f| f.id), Some("tt0133093".to_string()));
}
