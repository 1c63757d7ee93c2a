//! realmwatch daemon entrypoint.
//!
//! Thin driver around `realmwatch_core`: resolve config and the webhook
//! parameter, construct the collaborators once, then run one evaluation
//! cycle per interval. A failed cycle is logged and retried on the next
//! firing; it never takes the daemon down.

use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use realmwatch_core::{
    run_cycle, EnvParameters, FileStateStore, HttpFetcher, ParameterSource, WatchConfig,
    WebhookNotifier, WEBHOOK_PARAM,
};

#[derive(Parser)]
#[command(name = "realmwatch-daemon")]
#[command(about = "Single-subject last-seen activity tracker")]
#[command(version)]
struct Cli {
    /// Path to a TOML config file (default: ~/.realmwatch/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Run a single evaluation cycle and exit (for external schedulers)
    #[arg(long)]
    once: bool,

    /// Override the polling interval in minutes
    #[arg(long, value_name = "MINS")]
    interval_mins: Option<u64>,
}

fn main() {
    init_logging();
    let cli = Cli::parse();

    let mut config = match WatchConfig::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(err) => {
            error!(error = %err, "Failed to load configuration");
            std::process::exit(1);
        }
    };
    if let Some(mins) = cli.interval_mins {
        config.interval_mins = mins.max(1);
    }

    let parameters = EnvParameters::new();
    let webhook_url = match parameters.get(WEBHOOK_PARAM) {
        Ok(url) => url,
        Err(err) => {
            error!(error = %err, "Failed to resolve webhook parameter");
            std::process::exit(1);
        }
    };

    let fetcher = match HttpFetcher::new() {
        Ok(fetcher) => fetcher,
        Err(err) => {
            error!(error = %err, "Failed to build HTTP client");
            std::process::exit(1);
        }
    };
    let notifier = match WebhookNotifier::new(webhook_url, config.contacts.clone()) {
        Ok(notifier) => notifier,
        Err(err) => {
            error!(error = %err, "Failed to build webhook client");
            std::process::exit(1);
        }
    };
    let store = FileStateStore::new(config.state_path.clone());

    info!(
        subject = %config.subject,
        profile_url = %config.profile_url,
        state_path = %config.state_path.display(),
        interval_mins = config.interval_mins,
        once = cli.once,
        "realmwatch daemon started"
    );

    let interval = Duration::from_secs(config.interval_mins * 60);
    loop {
        match run_cycle(&config, &fetcher, &store, &notifier) {
            Ok(outcome) => info!(subject = %config.subject, ?outcome, "Cycle complete"),
            Err(err) => warn!(subject = %config.subject, error = %err, "Cycle failed"),
        }

        if cli.once {
            break;
        }
        thread::sleep(interval);
    }
}

fn init_logging() {
    let debug_enabled = std::env::var("REALMWATCH_DEBUG_LOG")
        .map(|value| matches!(value.as_str(), "1" | "true" | "TRUE" | "yes" | "YES"))
        .unwrap_or(false);
    let filter = if debug_enabled {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();
}
