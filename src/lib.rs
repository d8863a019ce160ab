//! apodcache - Astronomy Picture of the Day with a content-addressed cache
//!
//! Fetches NASA's Astronomy Picture of the Day, keeps every distinct image
//! exactly once in a local cache (identity by SHA-256 of the bytes), and hands
//! the cached file to the desktop background command.

pub mod apod;
pub mod cache;
pub mod cli;
pub mod config;
pub mod desktop;
pub mod error;
pub mod logging;
pub mod output;
pub mod progress;

use std::io::Write;
use std::sync::Arc;

use anyhow::{Context, Result};

use crate::apod::ApodClient;
use crate::cache::ImageCache;
use crate::cli::{Cli, Commands, ListArgs, OutputFormat, ShowArgs};
use crate::config::Config;
use crate::desktop::{BackgroundSetter, CommandBackgroundSetter, PrintPath};
use crate::error::ExitCode;
use crate::output::{CsvOutput, JsonEntry, JsonOutput};
use crate::progress::Progress;

/// Run the application for parsed command-line arguments.
///
/// # Errors
///
/// Any failure is returned to the caller unchanged in kind, so that
/// [`ExitCode::for_error`] can map it to an exit status.
pub fn run_app(cli: Cli) -> Result<ExitCode> {
    logging::init_logging(cli.verbose, cli.quiet);

    let mut config = match &cli.config {
        Some(path) => Config::try_load_from_path(path)
            .with_context(|| format!("Failed to load config file {}", path.display()))?,
        None => Config::load(),
    };
    config.merge_cli(&cli);
    log::debug!("Effective configuration: {:?}", redacted(&config));

    match &cli.command {
        Some(Commands::List(args)) => list_entries(&config, args),
        Some(Commands::Show(args)) => show_entry(&config, args),
        None => add_apod(&cli, &config),
    }
}

fn add_apod(cli: &Cli, config: &Config) -> Result<ExitCode> {
    // Reject bad dates before touching the cache or the network.
    let date = apod::parse_apod_date(cli.date.as_deref(), apod::date::today())?;

    let progress = Arc::new(Progress::new(cli.quiet));
    let cache = open_cache(config)?.with_progress(progress);

    let id = cache
        .add(date)
        .with_context(|| format!("Failed to add the APOD for {} to the cache", date))?;
    let meta = cache.get_metadata(id)?;
    log::info!("APOD #{}: {}", id, meta.title);

    if cli.no_background {
        log::debug!("Leaving desktop background unchanged");
        return Ok(ExitCode::Success);
    }

    let setter: Box<dyn BackgroundSetter> = match &config.background_command {
        Some(template) => Box::new(CommandBackgroundSetter::new(template.clone())),
        None => Box::new(PrintPath),
    };
    setter
        .set_background(&meta.file_path)
        .context("Failed to set the desktop background")?;

    Ok(ExitCode::Success)
}

fn list_entries(config: &Config, args: &ListArgs) -> Result<ExitCode> {
    let cache = open_cache(config)?;
    let entries = cache.entries()?;
    let mut stdout = std::io::stdout().lock();

    match args.output {
        OutputFormat::Text => output::write_titles(&mut stdout, &entries)?,
        OutputFormat::Json => JsonOutput::new(&entries).write_to(&mut stdout)?,
        OutputFormat::Csv => CsvOutput::new(&entries).write_to(&mut stdout)?,
    }
    stdout.flush()?;
    Ok(ExitCode::Success)
}

fn show_entry(config: &Config, args: &ShowArgs) -> Result<ExitCode> {
    let cache = open_cache(config)?;
    let meta = cache.get_metadata(args.id)?;
    let mut stdout = std::io::stdout().lock();

    match args.output {
        OutputFormat::Json => {
            output::json::write_json(&mut stdout, &JsonEntry::from_metadata(args.id, &meta))?;
        }
        OutputFormat::Text | OutputFormat::Csv => {
            output::write_metadata(&mut stdout, args.id, &meta)?;
        }
    }
    stdout.flush()?;
    Ok(ExitCode::Success)
}

fn open_cache(config: &Config) -> Result<ImageCache<ApodClient>> {
    let parent = config.cache_parent()?;
    let client = ApodClient::new(&config.api_url, &config.api_key, config.timeout())
        .context("Failed to build HTTP client")?;
    ImageCache::open(&parent, client)
        .with_context(|| format!("Failed to initialize image cache under {}", parent.display()))
}

/// Configuration with the API key masked, for logging.
fn redacted(config: &Config) -> Config {
    let mut shown = config.clone();
    if shown.api_key != apod::client::DEMO_API_KEY {
        shown.api_key = "***".to_string();
    }
    shown
}
