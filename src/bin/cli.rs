//! Newswatch CLI
//!
//! Local execution entry point.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use newswatch::{
    error::{AppError, Result},
    models::{Config, Extraction},
    pipeline::{self, Watcher},
    services::{Extractor, HttpTranslator, Translator, WebhookNotifier},
    storage,
    utils::HttpFetcher,
};

/// Newswatch - press release watcher
#[derive(Parser, Debug)]
#[command(
    name = "newswatch",
    version,
    about = "Watch news pages and notify on new items"
)]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "config/newswatch.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Watch all sites on the configured interval until Ctrl-C
    Run,

    /// Run a single tick over all sites and exit
    Once,

    /// Fetch and extract without notifying or storing anything
    Check {
        /// Only check the site with this name
        #[arg(long)]
        site: Option<String>,
    },

    /// Validate the configuration file
    Validate,
}

/// Initialize logging based on verbosity flag and configured level.
fn init_logging(verbose: bool, configured: Option<&str>) {
    let level = if verbose {
        "debug"
    } else {
        configured.unwrap_or("info")
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match Config::load(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            init_logging(cli.verbose, None);
            log::error!("Failed to load {}: {}", cli.config.display(), e);
            return Err(e);
        }
    };
    init_logging(cli.verbose, Some(&config.logging.level));

    log::info!(
        "Loaded {} sites from {}",
        config.sites.len(),
        cli.config.display()
    );

    match cli.command {
        Command::Validate => {
            log::info!("✓ Config OK");
            for site in &config.sites {
                log::info!(
                    "  {} -> {} ({} date formats)",
                    site.name,
                    site.base_url,
                    site.date_formats.len()
                );
            }
        }

        Command::Check { site } => {
            let sites: Vec<_> = config
                .sites
                .iter()
                .filter(|s| site.as_deref().is_none_or(|name| s.name == name))
                .collect();
            if sites.is_empty() {
                return Err(AppError::config(format!(
                    "No site named '{}'",
                    site.unwrap_or_default()
                )));
            }

            let fetcher = HttpFetcher::new(&config.crawler)?;
            let extractor = Extractor::new(config.cutoff_time());
            let timeout = Duration::from_secs(config.crawler.timeout_secs);

            for site in sites {
                match pipeline::check_site(&fetcher, &extractor, site, timeout).await {
                    Ok(Extraction::Item(item)) => println!(
                        "[{}] {} | {} | {}",
                        site.name,
                        item.published_at.format("%Y-%m-%d"),
                        item.title,
                        item.endpoint
                    ),
                    Ok(Extraction::Stale { published_at }) => println!(
                        "[{}] stale (newest {})",
                        site.name,
                        published_at.format("%Y-%m-%d")
                    ),
                    Err(e) => println!("[{}] error: {}", site.name, e),
                }
            }
        }

        Command::Once => {
            let watcher = build_watcher(Arc::new(config)).await?;
            let summary = watcher.run_once().await;
            log::info!("Done! {} notified", summary.notified);
        }

        Command::Run => {
            let period = Duration::from_secs(config.schedule.interval_secs);
            let watcher = build_watcher(Arc::new(config)).await?;

            log::info!("Watching every {}s, press Ctrl-C to stop", period.as_secs());
            let shutdown = async {
                if let Err(e) = tokio::signal::ctrl_c().await {
                    log::error!("Failed to listen for Ctrl-C: {}", e);
                }
            };
            pipeline::run_scheduled(&watcher, period, shutdown).await;
        }
    }

    Ok(())
}

/// Wire the production collaborators. Any failure here aborts startup.
async fn build_watcher(config: Arc<Config>) -> Result<Watcher> {
    let fetcher = Arc::new(HttpFetcher::new(&config.crawler)?);
    let notifier = Arc::new(WebhookNotifier::new(&config.notifier)?);

    let store = storage::open_store(&config.store).await?;

    let translator: Option<Arc<dyn Translator>> = if config.translator.enabled {
        Some(Arc::new(HttpTranslator::new(&config.translator)?))
    } else {
        None
    };

    Ok(Watcher::new(config, fetcher, store, notifier, translator))
}
