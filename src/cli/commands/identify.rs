//! Identify command implementation.
//!
//! Identifies files against the stores of the configured media directories.
//! No metadata sources are attached, so only records already cached are found.

use crate::core::library::{Identified, MediaLibrary};
use crate::core::scanner;
use crate::models::config::{self, AppConfig};
use crate::Result;
use colored::Colorize;
use futures::stream::{self, StreamExt};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};

/// Identify a file or every media file under a directory.
pub async fn identify(config_path: Option<&Path>, refresh: bool, path: &Path) -> Result<()> {
    let app: AppConfig = match config_path {
        Some(config_path) => config::load_config_from(config_path)?,
        None => config::load_config()?,
    };

    let library = MediaLibrary::from_config(&app, Vec::new());
    if library.is_empty() {
        println!("{}", "⚠️  No media directories configured".yellow());
        return Ok(());
    }

    if !path.exists() {
        return Err(crate::Error::PathNotFound(path.display().to_string()));
    }

    let files = if path.is_file() {
        vec![path.to_path_buf()]
    } else {
        println!("📁 Scanning directory: {}", path.display());
        scanner::scan_directory(path)?.videos
    };

    if files.is_empty() {
        println!("No video files found.");
        return Ok(());
    }

    println!("Found {} video files to identify", files.len());
    println!();

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .map_err(|e| crate::Error::other(e.to_string()))?
            .progress_chars("█▓░"),
    );

    let library = &library;
    let pb_ref = &pb;
    let mut results: Vec<(PathBuf, Result<Option<String>>)> = stream::iter(files)
        .map(|file| async move {
            let outcome = library
                .lookup_media(&file, refresh, false)
                .await
                .map(|found| found.map(|m| describe(&m.identified)));
            pb_ref.inc(1);
            (file, outcome)
        })
        .buffer_unordered(app.concurrency.max(1))
        .collect()
        .await;

    pb.finish_with_message("Done!");
    println!();

    results.sort_by(|a, b| a.0.cmp(&b.0));

    let mut identified = 0;
    let mut unknown = 0;
    let mut failed = 0;
    for (file, outcome) in &results {
        match outcome {
            Ok(Some(description)) => {
                identified += 1;
                println!("  {} {} → {}", "✓".green(), file.display(), description);
            }
            Ok(None) => {
                unknown += 1;
                println!("  {} {}", "?".yellow(), file.display());
            }
            Err(e) => {
                failed += 1;
                println!("  {} {} - {}", "✗".red(), file.display(), e);
            }
        }
    }
    println!();

    println!("{}", "📊 Identification Summary".bold().green());
    println!("  {} {}", "Identified:".bold(), identified);
    println!("  {} {}", "Unknown:".bold(), unknown);
    println!("  {} {}", "Failed:".bold(), failed);

    Ok(())
}

fn describe(identified: &Identified) -> String {
    match identified {
        Identified::Episode(episode) => format!(
            "{}:{} S{:02}E{:02} - {}",
            episode.source_id,
            episode.show_id,
            episode.season_number,
            episode.episode_number,
            episode.title
        ),
        Identified::Film(film) => {
            let mut description = film.title.clone();
            if let Some(year) = film.year() {
                description.push_str(&format!(" ({})", year));
            }
            if let Some(parts) = film.total_parts() {
                description.push_str(&format!(" [{} parts]", parts));
            }
            description
        }
    }
}
