//! Media Identifier CLI
//!
//! A command-line tool that works out which film or TV episode a media file is.

use clap::Parser;
use media_identifier::cli::{
    args::{Cli, Commands},
    commands::{classify, identify, parse, search},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse command line arguments
    let cli = Cli::parse();

    // Initialize logging
    init_logging(cli.verbose);

    // Run the appropriate command
    match cli.command {
        Commands::Parse { pattern, root, file } => {
            parse::parse(&pattern, root.as_deref(), &file)?;
        }

        Commands::Search {
            mode,
            pattern,
            root,
            file,
        } => {
            search::search(mode, pattern.as_deref(), root.as_deref(), &file).await?;
        }

        Commands::Classify { file } => {
            classify::classify(&file).await?;
        }

        Commands::Identify {
            config,
            refresh,
            path,
        } => {
            identify::identify(config.as_deref(), refresh, &path).await?;
        }
    }

    Ok(())
}

/// Initialize the logging system.
fn init_logging(verbose: bool) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = if verbose {
        EnvFilter::new("media_identifier=debug")
    } else {
        EnvFilter::new("media_identifier=info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).without_time())
        .with(filter)
        .init();
}
