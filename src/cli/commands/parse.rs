//! Parse command implementation.
//!
//! Reverse-parses a file name with a rename pattern.

use crate::core::pattern::PatternTemplate;
use crate::Result;
use colored::Colorize;
use std::path::Path;

/// Print the token values a pattern reads back out of a file name.
pub fn parse(pattern: &str, root: Option<&Path>, file: &Path) -> Result<()> {
    let template = PatternTemplate::parse(pattern)?;
    let relative = match root {
        Some(root) => file.strip_prefix(root).map_err(|_| {
            crate::Error::other(format!(
                "{} is not under {}",
                file.display(),
                root.display()
            ))
        })?,
        None => file,
    };

    println!("{} {}", "Pattern:".bold(), template);
    println!("{} {}", "File:".bold(), relative.display());
    println!();

    match template.match_path(relative) {
        Some(values) => {
            println!("{}", "✅ Matched".green().bold());
            for (token, value) in &values {
                println!("  {:<10} {}", format!("{}:", token).bold(), value);
            }
        }
        None => println!("{}", "❌ The file does not fit the pattern".yellow()),
    }

    Ok(())
}
