//! Classify command implementation.

use crate::core::disambiguator::{self, Classification};
use crate::models::media::Mode;
use crate::Result;
use colored::Colorize;
use std::path::Path;

/// Print whether a file looks like a film or a TV episode.
pub async fn classify(file: &Path) -> Result<()> {
    let label = match disambiguator::classify(file, None, None).await {
        Classification::Mode(Mode::Film) => "🎬 film".green(),
        Classification::Mode(Mode::TvShow) => "📺 TV episode".cyan(),
        Classification::Discard => "🗑️  sample, discarded".yellow(),
    };
    println!("{}: {}", file.display(), label.bold());
    Ok(())
}
