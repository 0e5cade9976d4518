//! Directory scanner module.
//!
//! Scans directories recursively for media files, separating samples and
//! files matched by a media directory's ignore patterns.

use crate::models::config::MediaDirConfig;
use crate::Result;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Default media file extensions.
pub const VIDEO_EXTENSIONS: &[&str] = &[
    // Common formats
    "mkv", "mp4", "avi", "mov", "wmv", // Additional formats
    "m4v", "ts", "m2ts", "flv", "webm", // Less common but supported
    "mpg", "mpeg", "vob", "ogv", "ogm", "divx", "xvid", "3gp", "3g2", "mts", "rm", "rmvb", "asf",
    "f4v",
];

/// Result of scanning a directory.
#[derive(Debug, Default)]
pub struct ScanResult {
    /// Media files found (excluding samples and ignored files).
    pub videos: Vec<PathBuf>,
    /// Sample files found.
    pub samples: Vec<PathBuf>,
    /// Media files matched by an ignore pattern.
    pub ignored: Vec<PathBuf>,
    /// Total files scanned.
    pub total_files_scanned: usize,
    /// Total directories scanned.
    pub total_dirs_scanned: usize,
}

impl ScanResult {
    /// Get total media file count (including samples and ignored files).
    pub fn total_videos(&self) -> usize {
        self.videos.len() + self.samples.len() + self.ignored.len()
    }
}

/// Check if a file extension is a video format.
pub fn is_video_extension(ext: &str) -> bool {
    let ext_lower = ext.to_lowercase();
    VIDEO_EXTENSIONS.contains(&ext_lower.as_str())
}

/// Check if a path component indicates a sample.
/// Matches "sample", "samples", or paths containing "sample" folder.
pub fn is_sample_path(path: &Path) -> bool {
    for component in path.components() {
        if let std::path::Component::Normal(name) = component {
            let name_lower = name.to_string_lossy().to_lowercase();
            if name_lower == "sample" || name_lower == "samples" {
                return true;
            }
        }
    }
    false
}

/// Check if a filename indicates a sample file.
/// Matches filenames containing "sample" (case-insensitive).
pub fn is_sample_filename(filename: &str) -> bool {
    let lower = filename.to_lowercase();
    lower.contains("sample") && !lower.contains("sampler")
}

/// Scan a directory for files with one of the default video extensions.
pub fn scan_directory(path: &Path) -> Result<ScanResult> {
    scan(
        path,
        |file| {
            file.extension()
                .map(|e| is_video_extension(&e.to_string_lossy()))
                .unwrap_or(false)
        },
        |_| false,
    )
}

/// Scan a media directory with its configured extensions and ignore patterns.
pub fn scan_media_dir(config: &MediaDirConfig) -> Result<ScanResult> {
    scan(
        &config.media_dir,
        |file| config.accepts_extension(file),
        |file| config.is_ignored(file),
    )
}

fn scan<A, I>(path: &Path, accepts: A, ignored: I) -> Result<ScanResult>
where
    A: Fn(&Path) -> bool,
    I: Fn(&Path) -> bool,
{
    // Validate path exists and is a directory
    if !path.exists() {
        return Err(crate::Error::PathNotFound(path.display().to_string()));
    }
    if !path.is_dir() {
        return Err(crate::Error::NotADirectory(path.display().to_string()));
    }

    let mut result = ScanResult::default();

    for entry in WalkDir::new(path)
        .follow_links(false)
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let entry_path = entry.path();

        if entry.file_type().is_dir() {
            result.total_dirs_scanned += 1;
            continue;
        }
        if !entry.file_type().is_file() {
            continue;
        }
        result.total_files_scanned += 1;

        if !accepts(entry_path) {
            continue;
        }

        let relative = entry_path.strip_prefix(path).unwrap_or(entry_path);
        let filename = entry_path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();

        if ignored(entry_path) {
            tracing::debug!("Ignored: {}", entry_path.display());
            result.ignored.push(entry_path.to_path_buf());
        } else if is_sample_path(relative) || is_sample_filename(&filename) {
            tracing::debug!("Sample: {}", entry_path.display());
            result.samples.push(entry_path.to_path_buf());
        } else {
            result.videos.push(entry_path.to_path_buf());
        }
    }

    // Sort results for consistent output
    result.videos.sort();
    result.samples.sort();
    result.ignored.sort();

    tracing::info!(
        "Scanned {} files in {} directories: {} videos, {} samples, {} ignored",
        result.total_files_scanned,
        result.total_dirs_scanned,
        result.videos.len(),
        result.samples.len(),
        result.ignored.len()
    );

    Ok(result)
}
