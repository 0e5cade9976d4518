//! Lookups across every configured media directory.

use crate::core::disambiguator::{self, Classification};
use crate::core::media_dir::MediaDirectory;
use crate::models::config::AppConfig;
use crate::models::media::{Episode, Film, Mode};
use crate::services::source::MetadataSource;
use crate::Result;
use std::path::Path;
use std::sync::Arc;

/// What a file was identified as.
#[derive(Debug, Clone, PartialEq)]
pub enum Identified {
    Episode(Episode),
    Film(Film),
}

/// A file's identity and the directory that produced it.
#[derive(Debug, Clone)]
pub struct MediaMatch<'a> {
    pub dir: &'a MediaDirectory,
    pub identified: Identified,
}

/// All media directories, TV directories first.
pub struct MediaLibrary {
    dirs: Vec<MediaDirectory>,
}

impl MediaLibrary {
    pub fn new(mut dirs: Vec<MediaDirectory>) -> Self {
        // Stable: keeps the configured order within each mode.
        dirs.sort_by_key(|d| match d.mode() {
            Mode::TvShow => 0,
            Mode::Film => 1,
        });
        Self { dirs }
    }

    /// Build every configured directory. A directory whose settings are
    /// invalid is logged and left out.
    pub fn from_config(app: &AppConfig, sources: Vec<Arc<dyn MetadataSource>>) -> Self {
        let mut dirs = Vec::with_capacity(app.media_dirs.len());
        for settings in &app.media_dirs {
            match MediaDirectory::from_settings(settings, app, sources.clone()) {
                Ok(dir) => {
                    tracing::debug!(
                        "Media directory {} ({})",
                        settings.path.display(),
                        settings.mode
                    );
                    dirs.push(dir)
                }
                Err(e) => tracing::error!(
                    "Skipping media directory {}: {}",
                    settings.path.display(),
                    e
                ),
            }
        }
        Self::new(dirs)
    }

    pub fn dirs(&self) -> &[MediaDirectory] {
        &self.dirs
    }

    pub fn is_empty(&self) -> bool {
        self.dirs.is_empty()
    }

    /// The directory a file lives in, if any.
    pub fn media_dir_for(&self, file: &Path) -> Option<&MediaDirectory> {
        self.dirs.iter().find(|d| d.contains(file))
    }

    /// First directory of the given mode.
    pub fn first_of(&self, mode: Mode) -> Option<&MediaDirectory> {
        self.dirs.iter().find(|d| d.mode() == mode)
    }

    /// Classify a file found outside any media directory.
    pub async fn classify(&self, file: &Path) -> Classification {
        disambiguator::classify(file, self.first_of(Mode::Film), self.first_of(Mode::TvShow)).await
    }

    /// Identify a file.
    ///
    /// A file inside a media directory is identified with that directory's
    /// mode. Any other file is classified first and identified with the first
    /// directory of the chosen mode.
    pub async fn lookup_media(
        &self,
        file: &Path,
        refresh: bool,
        use_sources: bool,
    ) -> Result<Option<MediaMatch<'_>>> {
        let dir = match self.media_dir_for(file) {
            Some(dir) => dir,
            None => match self.classify(file).await {
                Classification::Discard => return Ok(None),
                Classification::Mode(mode) => match self.first_of(mode) {
                    Some(dir) => dir,
                    None => {
                        tracing::warn!(
                            "No {} directory configured for {}",
                            mode,
                            file.display()
                        );
                        return Ok(None);
                    }
                },
            },
        };

        if dir.config().is_ignored(file) {
            tracing::debug!("Ignoring {}", file.display());
            return Ok(None);
        }

        let identified = match dir.mode() {
            Mode::TvShow => dir
                .identify_episode(file, refresh, use_sources)
                .await?
                .map(Identified::Episode),
            Mode::Film => dir
                .identify_film(file, refresh, use_sources)
                .await?
                .map(Identified::Film),
        };
        Ok(identified.map(|identified| MediaMatch { dir, identified }))
    }
}
