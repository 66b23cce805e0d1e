use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use seatwatch::config::Config;
use seatwatch::notifications::{DecisionEngine, JsonStateStore, WebhookChannel};
use seatwatch::notifications::channels::webhook::WebhookConfig;
use seatwatch::parser::RowExtractor;
use seatwatch::subscriptions::Subscriptions;
use seatwatch::watch::{HttpSource, Watcher};

#[derive(Parser)]
#[command(
    name = "seatwatch",
    version,
    about = "Course section availability watcher with notification deduplication",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to a TOML config file; environment variables are used otherwise
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log format (text, json)
    #[arg(long, global = true, default_value = "text")]
    log_format: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a saved results page and print the extracted records
    Parse {
        /// HTML file to parse
        file: PathBuf,

        /// Override the result-row selector
        #[arg(long)]
        selector: Option<String>,
    },

    /// Run one check cycle over the tracked sections
    Check {
        /// Check against a saved HTML file instead of fetching
        #[arg(long)]
        file: Option<PathBuf>,

        /// Check specific labels instead of the subscription list
        #[arg(short, long)]
        label: Vec<String>,
    },

    /// Check tracked sections repeatedly until interrupted
    Watch {
        /// Seconds between cycles (overrides config)
        #[arg(short, long)]
        interval: Option<u64>,
    },

    /// Track a section for a subscriber
    Track {
        /// Subject code, e.g. CS
        subject: String,
        /// Course number, e.g. 4349
        number: String,
        /// Section suffix, e.g. 003
        section: String,
        /// Subscriber identifier
        #[arg(short, long, default_value = "local")]
        user: String,
    },

    /// Stop tracking a section for a subscriber
    Untrack {
        /// Subject code, e.g. CS
        subject: String,
        /// Course number, e.g. 4349
        number: String,
        /// Section suffix, e.g. 003
        section: String,
        /// Subscriber identifier
        #[arg(short, long, default_value = "local")]
        user: String,
    },

    /// List tracked sections
    List {
        /// Limit to one subscriber's sections
        #[arg(short, long)]
        user: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_tracing(&cli.log_format, cli.verbose)?;

    let config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::from_env()?,
    };
    config.validate()?;

    match cli.command {
        Commands::Parse { file, selector } => {
            parse(&config, &file, selector.as_deref())?;
        }

        Commands::Check { file, label } => {
            let outcomes = check(&config, file.as_deref(), &label).await?;
            for outcome in &outcomes {
                println!(
                    "{}: {} ({})",
                    outcome.label,
                    if outcome.is_open { "open" } else { "closed" },
                    if outcome.notified { "notified" } else { "no notification" }
                );
            }
        }

        Commands::Watch { interval } => {
            watch(&config, interval).await?;
        }

        Commands::Track {
            subject,
            number,
            section,
            user,
        } => {
            let label = section_label(&subject, &number, &section);
            let mut subs = Subscriptions::load(&config.storage.subscriptions_path)?;
            if subs.track(&label, &user) {
                subs.save()?;
                println!("Now tracking {label}");
            } else {
                println!("Already tracking {label}");
            }
        }

        Commands::Untrack {
            subject,
            number,
            section,
            user,
        } => {
            let label = section_label(&subject, &number, &section);
            let mut subs = Subscriptions::load(&config.storage.subscriptions_path)?;
            if subs.untrack(&label, &user) {
                subs.save()?;
                println!("Stopped tracking {label}");
            } else {
                println!("Was not tracking {label}");
            }
        }

        Commands::List { user } => {
            let subs = Subscriptions::load(&config.storage.subscriptions_path)?;
            let labels = match user {
                Some(user) => subs.tracked_by(&user),
                None => subs.labels(),
            };
            if labels.is_empty() {
                println!("No tracked sections");
            } else {
                for label in labels {
                    println!("{label}");
                }
            }
        }
    }

    Ok(())
}

fn setup_tracing(format: &str, verbose: bool) -> Result<()> {
    let env_filter = if verbose {
        tracing_subscriber::EnvFilter::new("seatwatch=debug,info")
    } else {
        tracing_subscriber::EnvFilter::new("seatwatch=info,warn")
    };

    match format {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
    }

    Ok(())
}

fn section_label(subject: &str, number: &str, section: &str) -> String {
    format!("{} {number}.{section}", subject.to_uppercase())
}

fn parse(config: &Config, file: &PathBuf, selector: Option<&str>) -> Result<()> {
    let html = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;

    let selector = selector.unwrap_or(&config.watcher.row_selector);
    let extractor = RowExtractor::new(selector)?;

    let records = extractor.records(&html);
    tracing::info!(rows = records.len(), "Parsed results page");
    for record in &records {
        println!("{}", serde_json::to_string(record)?);
    }
    Ok(())
}

fn build_watcher(config: &Config, labels_hint: usize) -> Result<Watcher> {
    let extractor = RowExtractor::new(&config.watcher.row_selector)?;
    let engine = DecisionEngine::with_cooldown_minutes(config.delivery.cooldown_minutes);
    let store = JsonStateStore::open(&config.storage.state_path)?;

    let mut watcher = Watcher::new(extractor, engine, Box::new(store));
    if let Some(url) = &config.delivery.webhook_url {
        let webhook = WebhookChannel::new(
            WebhookConfig::new(url)
                .with_timeout(config.delivery.timeout_secs)
                .with_max_retries(config.delivery.max_retries),
        )?;
        watcher.add_channel(Box::new(webhook));
    } else if labels_hint > 0 {
        tracing::warn!("No webhook configured; alerts will only be logged");
    }

    Ok(watcher)
}

fn tracked_labels(config: &Config, overrides: &[String]) -> Result<Vec<String>> {
    if !overrides.is_empty() {
        return Ok(overrides.to_vec());
    }
    let subs = Subscriptions::load(&config.storage.subscriptions_path)?;
    Ok(subs.labels())
}

async fn check(
    config: &Config,
    file: Option<&std::path::Path>,
    label_overrides: &[String],
) -> Result<Vec<seatwatch::watch::CheckOutcome>> {
    let labels = tracked_labels(config, label_overrides)?;
    if labels.is_empty() {
        tracing::warn!("Nothing to check; track a section first");
        return Ok(Vec::new());
    }

    let watcher = build_watcher(config, labels.len())?;

    match file {
        Some(path) => {
            let html = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            watcher.check_document(&html, &labels).await
        }
        None => {
            let source = HttpSource::new(&config.watcher.results_url, config.request_timeout())?;
            Ok(watcher.run_cycle(&source, &labels).await)
        }
    }
}

async fn watch(config: &Config, interval_override: Option<u64>) -> Result<()> {
    let interval = interval_override
        .map(std::time::Duration::from_secs)
        .unwrap_or_else(|| config.check_interval());

    tracing::info!(interval_secs = interval.as_secs(), "Starting watch loop");

    let mut ticker = tokio::time::interval(interval);
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let outcomes = check(config, None, &[]).await?;
                let notified = outcomes.iter().filter(|o| o.notified).count();
                tracing::info!(
                    checked = outcomes.len(),
                    notified,
                    "Check cycle complete"
                );
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Interrupted, shutting down");
                return Ok(());
            }
        }
    }
}
