//! Search command implementation.
//!
//! Runs a strategy chain over a file and shows the search term it derives.

use crate::core::searcher::MediaSearcher;
use crate::core::strategy::StrategyContext;
use crate::models::config::MediaDirSettings;
use crate::models::media::Mode;
use crate::Result;
use colored::Colorize;
use std::path::Path;

/// Print the search details of a file.
pub async fn search(
    mode: Mode,
    pattern: Option<&str>,
    root: Option<&Path>,
    file: &Path,
) -> Result<()> {
    let root = root
        .or_else(|| file.parent())
        .unwrap_or_else(|| Path::new("."));
    let mut settings = MediaDirSettings::new(root, mode);
    settings.pattern = pattern.map(|p| p.to_string());
    let config = settings.compile()?;

    let searcher = MediaSearcher::for_mode(mode);
    let ctx = StrategyContext::new(&config);

    println!(
        "{} {} ({})",
        "🔍 Searching".bold().cyan(),
        file.display(),
        mode
    );
    println!("  {} {}", "Pattern:".bold(), config.pattern);
    println!();

    match searcher.find_details(file, &ctx).await {
        Some(details) => {
            println!("  {} {}", "Term:".bold(), details.term.green());
            if let Some(year) = &details.year {
                println!("  {} {}", "Year:".bold(), year);
            }
            if let Some(part) = details.part {
                println!("  {} {}", "Part:".bold(), part);
            }
            if let Some(season) = details.season {
                println!("  {} {}", "Season:".bold(), season);
            }
            if let Some(episodes) = &details.episodes {
                let episodes: Vec<String> = episodes.iter().map(|e| e.to_string()).collect();
                println!("  {} {}", "Episodes:".bold(), episodes.join(", "));
            }
        }
        None => println!("{}", "No strategy produced a search term".yellow()),
    }

    Ok(())
}
