//! Media-related data models.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Media mode of a directory or a lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    TvShow,
    Film,
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Mode::TvShow => write!(f, "tv_show"),
            Mode::Film => write!(f, "film"),
        }
    }
}

impl std::str::FromStr for Mode {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s.to_lowercase().as_str() {
            "tv" | "tv_show" | "tvshow" | "show" => Ok(Mode::TvShow),
            "film" | "movie" | "films" | "movies" => Ok(Mode::Film),
            other => Err(crate::Error::other(format!("Unknown mode: {}", other))),
        }
    }
}

/// Search term derived from a file by a search strategy.
///
/// The term is never empty: use [`SearchDetails::new`], which refuses blank terms.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchDetails {
    /// Title or show name to search for.
    pub term: String,
    /// Year, when the name carried one.
    pub year: Option<String>,
    /// Part number of a multi-part film.
    pub part: Option<u32>,
    /// Season number (TV only).
    pub season: Option<u32>,
    /// Episode numbers (TV only, more than one for multi-episode files).
    pub episodes: Option<Vec<u32>>,
}

impl SearchDetails {
    /// Create search details, returning `None` when the term is blank.
    pub fn new<S: Into<String>>(term: S, year: Option<String>, part: Option<u32>) -> Option<Self> {
        let term = term.into();
        if term.trim().is_empty() {
            return None;
        }
        Some(Self {
            term,
            year,
            part,
            season: None,
            episodes: None,
        })
    }

    /// Attach season and episode numbers.
    pub fn with_episode(mut self, season: Option<u32>, episodes: Option<Vec<u32>>) -> Self {
        self.season = season;
        self.episodes = episodes.filter(|e| !e.is_empty());
        self
    }
}

/// A resolved, provider-scoped identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    /// Provider id of the show or film.
    pub id: String,
    /// Id of the source that knows this entity.
    pub source_id: String,
    /// Provider URL of the entity.
    pub url: String,
    /// Title reported by the provider, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Part number of a multi-part film.
    pub part: Option<u32>,
    /// Media mode.
    pub mode: Mode,
    /// Season number, when known.
    pub season: Option<u32>,
    /// Episode numbers, when known.
    pub episodes: Option<Vec<u32>>,
}

impl SearchResult {
    /// Create a new search result.
    pub fn new<I, S, U>(id: I, source_id: S, url: U, part: Option<u32>, mode: Mode) -> Self
    where
        I: Into<String>,
        S: Into<String>,
        U: Into<String>,
    {
        Self {
            id: id.into(),
            source_id: source_id.into(),
            url: url.into(),
            title: None,
            part,
            mode,
            season: None,
            episodes: None,
        }
    }

    /// First episode number, if any.
    pub fn episode(&self) -> Option<u32> {
        self.episodes.as_ref().and_then(|e| e.first().copied())
    }
}

impl std::fmt::Display for SearchResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{} ({})", self.source_id, self.id, self.mode)?;
        if let Some(part) = self.part {
            write!(f, " part {}", part)?;
        }
        if let (Some(season), Some(episode)) = (self.season, self.episode()) {
            write!(f, " s{:02}e{:02}", season, episode)?;
        }
        Ok(())
    }
}

/// TV show metadata.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Show {
    /// Source that provided the show.
    pub source_id: String,
    /// Provider id of the show.
    pub show_id: String,
    /// Show name.
    pub name: String,
    /// Provider URL.
    pub url: Option<String>,
    /// Short summary.
    pub short_summary: Option<String>,
    /// Long summary.
    pub long_summary: Option<String>,
    /// Poster URL.
    pub image_url: Option<String>,
    /// Genres.
    #[serde(default)]
    pub genres: Vec<String>,
    /// Network or studio.
    pub studio: Option<String>,
}

/// TV season metadata.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Season {
    pub source_id: String,
    pub show_id: String,
    pub season_number: u32,
    pub url: Option<String>,
}

impl Season {
    /// Create a season belonging to the given show.
    pub fn of(show: &Show, season_number: u32) -> Self {
        Self {
            source_id: show.source_id.clone(),
            show_id: show.show_id.clone(),
            season_number,
            url: None,
        }
    }
}

/// TV episode metadata.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Episode {
    pub source_id: String,
    pub show_id: String,
    pub season_number: u32,
    pub episode_number: u32,
    /// Provider id of the episode.
    pub episode_id: Option<String>,
    pub title: String,
    pub summary: Option<String>,
    /// First air date.
    pub date: Option<NaiveDate>,
    pub url: Option<String>,
    pub image_url: Option<String>,
}

impl Episode {
    /// Create an episode belonging to the given season.
    pub fn of<S: Into<String>>(season: &Season, episode_number: u32, title: S) -> Self {
        Self {
            source_id: season.source_id.clone(),
            show_id: season.show_id.clone(),
            season_number: season.season_number,
            episode_number,
            title: title.into(),
            ..Default::default()
        }
    }
}

/// One physical file backing a film (several for multi-part films).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoFile {
    /// Location of the file.
    pub location: PathBuf,
    /// Part number, if the film is split.
    pub part: Option<u32>,
}

impl VideoFile {
    pub fn new(location: &Path, part: Option<u32>) -> Self {
        Self {
            location: location.to_path_buf(),
            part,
        }
    }
}

/// Film metadata.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Film {
    pub source_id: String,
    /// Provider id of the film.
    pub id: String,
    pub title: String,
    /// Release date.
    pub date: Option<NaiveDate>,
    pub url: Option<String>,
    pub summary: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default)]
    pub directors: Vec<String>,
    pub image_url: Option<String>,
    pub country: Option<String>,
    /// User rating (0-10).
    pub rating: Option<f32>,
    /// Files known to back this film.
    #[serde(default)]
    pub files: Vec<VideoFile>,
}

impl Film {
    /// Release year as a string, if the release date is known.
    pub fn year(&self) -> Option<String> {
        self.date.map(|d| d.year().to_string())
    }

    /// Highest part number among the known files.
    pub fn total_parts(&self) -> Option<u32> {
        self.files.iter().filter_map(|f| f.part).max()
    }

    /// Whether the given file is already recorded for this film.
    pub fn has_file(&self, location: &Path) -> bool {
        self.files.iter().any(|f| f.location == location)
    }

    /// Record a file, replacing the part number of an existing entry.
    pub fn add_file(&mut self, location: &Path, part: Option<u32>) {
        match self.files.iter_mut().find(|f| f.location == location) {
            Some(existing) => {
                if part.is_some() {
                    existing.part = part;
                }
            }
            None => self.files.push(VideoFile::new(location, part)),
        }
    }
}
