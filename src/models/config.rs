//! Configuration model.

use crate::core::pattern::PatternTemplate;
use crate::core::scanner::VIDEO_EXTENSIONS;
use crate::core::terms::StripTokens;
use crate::models::media::Mode;
use crate::{Error, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default rename pattern for TV show directories.
pub const DEFAULT_TV_PATTERN: &str = "%n/Season %s/%e - %t.%x";

/// Default rename pattern for film directories.
pub const DEFAULT_FILM_PATTERN: &str = "%t{ (%y)}{ Part %p}.%x";

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Media directories, looked up in the order given (TV directories first at lookup time).
    #[serde(default)]
    pub media_dirs: Vec<MediaDirSettings>,
    /// Watched download directories. NFO discovery never climbs into these.
    #[serde(default)]
    pub watch_dirs: Vec<PathBuf>,
    /// Deadline for a single source call, in seconds.
    #[serde(default = "default_fetch_timeout")]
    pub fetch_timeout_secs: u64,
    /// Id of the source able to fetch films by IMDB id.
    #[serde(default = "default_imdb_source")]
    pub imdb_source_id: String,
    /// Number of files identified in parallel.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
}

/// Settings of one media directory, as written in the configuration file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaDirSettings {
    /// Root of the media directory.
    pub path: PathBuf,
    /// What the directory holds.
    pub mode: Mode,
    /// Rename pattern, relative to the root. Defaults depend on the mode.
    #[serde(default)]
    pub pattern: Option<String>,
    /// Release junk removed from names. Defaults to [`crate::core::terms::DEFAULT_STRIP_TOKENS`].
    #[serde(default)]
    pub strip_tokens: Option<Vec<String>>,
    /// Regular expressions; matching paths are never identified.
    #[serde(default)]
    pub ignore_patterns: Vec<String>,
    /// Media file extensions. Defaults to the scanner's video extensions.
    #[serde(default)]
    pub extensions: Option<Vec<String>>,
    /// Stores consulted (and written back to) in order.
    #[serde(default = "default_stores")]
    pub stores: Vec<StoreSettings>,
}

/// Store backing a media directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StoreSettings {
    /// In-process store, lost on exit.
    Memory,
    /// JSON file store. Defaults to `.media_identifier.json` in the media directory.
    Json {
        #[serde(default)]
        file: Option<PathBuf>,
    },
}

impl StoreSettings {
    /// Location of a JSON store for the given media directory.
    pub fn json_file(&self, media_dir: &Path) -> Option<PathBuf> {
        match self {
            StoreSettings::Memory => None,
            StoreSettings::Json { file } => Some(
                file.clone()
                    .unwrap_or_else(|| media_dir.join(".media_identifier.json")),
            ),
        }
    }
}

fn default_fetch_timeout() -> u64 {
    30
}

fn default_imdb_source() -> String {
    "imdb".to_string()
}

fn default_concurrency() -> usize {
    4
}

fn default_stores() -> Vec<StoreSettings> {
    vec![StoreSettings::Json { file: None }]
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            media_dirs: Vec::new(),
            watch_dirs: Vec::new(),
            fetch_timeout_secs: default_fetch_timeout(),
            imdb_source_id: default_imdb_source(),
            concurrency: default_concurrency(),
        }
    }
}

impl AppConfig {
    /// Deadline applied to every source call.
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs.max(1))
    }
}

impl MediaDirSettings {
    /// Settings with defaults for everything but the root and mode.
    pub fn new(path: &Path, mode: Mode) -> Self {
        Self {
            path: path.to_path_buf(),
            mode,
            pattern: None,
            strip_tokens: None,
            ignore_patterns: Vec::new(),
            extensions: None,
            stores: default_stores(),
        }
    }

    /// Validate and compile the settings.
    pub fn compile(&self) -> Result<MediaDirConfig> {
        let pattern = self.pattern.as_deref().unwrap_or(match self.mode {
            Mode::TvShow => DEFAULT_TV_PATTERN,
            Mode::Film => DEFAULT_FILM_PATTERN,
        });
        let pattern =
            PatternTemplate::parse(pattern).map_err(|e| Error::config(&self.path, e.to_string()))?;

        let strip_tokens = match &self.strip_tokens {
            Some(tokens) => StripTokens::compile(tokens),
            None => StripTokens::defaults(),
        }
        .map_err(|e| Error::config(&self.path, e.to_string()))?;

        let ignore_patterns = self
            .ignore_patterns
            .iter()
            .map(|p| {
                Regex::new(&format!("^(?:{})$", p)).map_err(|e| {
                    Error::config(&self.path, format!("ignore pattern '{}': {}", p, e))
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let extensions = match &self.extensions {
            Some(exts) if exts.is_empty() => {
                return Err(Error::config(&self.path, "no media extensions configured"));
            }
            Some(exts) => exts
                .iter()
                .map(|e| e.trim_start_matches('.').to_lowercase())
                .collect(),
            None => VIDEO_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
        };

        Ok(MediaDirConfig {
            media_dir: self.path.clone(),
            mode: self.mode,
            pattern,
            strip_tokens,
            ignore_patterns,
            extensions,
        })
    }
}

/// Compiled, validated configuration of a media directory.
///
/// The pattern is fixed for the lifetime of the value.
#[derive(Debug, Clone)]
pub struct MediaDirConfig {
    pub media_dir: PathBuf,
    pub mode: Mode,
    pub pattern: PatternTemplate,
    pub strip_tokens: StripTokens,
    pub ignore_patterns: Vec<Regex>,
    pub extensions: Vec<String>,
}

impl MediaDirConfig {
    /// Compile a configuration with default tokens, extensions and no ignores.
    pub fn new(media_dir: &Path, mode: Mode, pattern: &str) -> Result<Self> {
        let mut settings = MediaDirSettings::new(media_dir, mode);
        settings.pattern = Some(pattern.to_string());
        settings.compile()
    }

    /// Whether the path matches one of the ignore patterns.
    pub fn is_ignored(&self, path: &Path) -> bool {
        let path = path.to_string_lossy().replace('\\', "/");
        self.ignore_patterns.iter().any(|re| re.is_match(&path))
    }

    /// Whether the file has one of the configured media extensions.
    pub fn accepts_extension(&self, path: &Path) -> bool {
        path.extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .map(|e| self.extensions.iter().any(|x| *x == e))
            .unwrap_or(false)
    }
}

/// Get the configuration directory path.
pub fn dirs_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("media_identifier")
}

/// Load configuration from the default location.
///
/// A missing file yields the default configuration.
pub fn load_config() -> Result<AppConfig> {
    let config_path = dirs_config_path().join("config.toml");
    if !config_path.exists() {
        tracing::debug!("No configuration at {}, using defaults", config_path.display());
        return Ok(AppConfig::default());
    }
    load_config_from(&config_path)
}

/// Load configuration from an explicit file.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    if !path.exists() {
        return Err(Error::PathNotFound(path.display().to_string()));
    }
    let content = std::fs::read_to_string(path)?;
    let config: AppConfig = toml::from_str(&content)?;
    tracing::debug!(
        "Loaded configuration from {} ({} media directories)",
        path.display(),
        config.media_dirs.len()
    );
    Ok(config)
}
