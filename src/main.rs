//! Site-Clone main entry point
//!
//! This is the command-line interface for the Site-Clone static website cloner.

use anyhow::Context;
use clap::{Parser, Subcommand};
use site_clone::config::{load_config_or_default, Config, OutputFormat};
use site_clone::crawler::Cloner;
use site_clone::output::print_report;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Site-Clone: a static website cloner
///
/// Site-Clone discovers the same-origin pages linked from a seed URL,
/// downloads their stylesheets, scripts, and images, rewrites every reference
/// to a local layout, and packages the result as a directory or zip archive.
#[derive(Parser, Debug)]
#[command(name = "site-clone")]
#[command(version)]
#[command(about = "A static website cloner", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(short, long, value_name = "CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose", global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Clone a site and package it
    Clone {
        /// Seed URL of the site
        url: String,

        /// Directory the clone is written into (overrides the config file)
        #[arg(short, long, value_name = "DIR")]
        output: Option<PathBuf>,

        /// Packaging format (overrides the config file)
        #[arg(short, long, value_enum)]
        format: Option<OutputFormat>,

        /// Print the report as JSON instead of a summary
        #[arg(long)]
        json: bool,
    },

    /// Show which pages would be cloned without scraping them
    Discover {
        /// Seed URL of the site
        url: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let config = match load_config_or_default(cli.config.as_deref()) {
        Ok(config) => {
            if let Some(path) = &cli.config {
                tracing::info!("Configuration loaded from: {}", path.display());
            }
            config
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    match cli.command {
        Command::Clone {
            url,
            output,
            format,
            json,
        } => handle_clone(config, &url, output, format, json).await,
        Command::Discover { url } => handle_discover(config, &url).await,
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("site_clone=info,warn"),
            1 => EnvFilter::new("site_clone=debug,info"),
            2 => EnvFilter::new("site_clone=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Handles the clone command: runs the full job into the chosen packager
async fn handle_clone(
    mut config: Config,
    url: &str,
    output: Option<PathBuf>,
    format: Option<OutputFormat>,
    json: bool,
) -> anyhow::Result<()> {
    if let Some(output) = output {
        config.output.directory = output;
    }
    if let Some(format) = format {
        config.output.format = format;
    }

    let output_dir = config.output.directory.clone();
    let format = config.output.format;

    let cloner = Cloner::new(config).context("Failed to set up cloner")?;
    let report = cloner
        .clone_into(url, format, &output_dir)
        .await
        .with_context(|| format!("Failed to clone {}", url))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }

    Ok(())
}

/// Handles the discover command: prints the crawl set and dropped links
async fn handle_discover(config: Config, url: &str) -> anyhow::Result<()> {
    let cloner = Cloner::new(config).context("Failed to set up cloner")?;
    let discovery = cloner
        .discover(url)
        .await
        .with_context(|| format!("Failed to discover links from {}", url))?;

    println!("=== Crawl Set ({} pages) ===\n", discovery.crawl_set.len());
    for page in discovery.crawl_set.iter() {
        println!("  {}", page);
    }

    if !discovery.dropped.is_empty() {
        println!("\nDropped ({}):", discovery.dropped.len());
        for issue in &discovery.dropped {
            println!("  - {}", issue);
        }
    }

    Ok(())
}
