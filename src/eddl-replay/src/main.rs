//! EDDL replay — drives the data layer interceptor from recorded queue traffic.
//!
//! Seeds the queue with a backlog (entries pushed before initialization),
//! installs the interceptor, then replays live push calls from a JSON Lines
//! file. Every tracking call is written to stdout as one JSON object.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context as _;
use clap::Parser;
use eddl_core::config::AppConfig;
use eddl_core::event_bus::{LogSink, TrackingSink};
use eddl_core::types::{NormalizedEvent, TrackingCall};
use eddl_data_layer::{InstallOutcome, PageScope};
use serde_json::Value;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "eddl-replay")]
#[command(about = "Replay Event-Driven Data Layer traffic through the interceptor")]
#[command(version)]
struct Cli {
    /// Config file (TOML or JSON); environment variables still apply on top
    #[arg(long, env = "EDDL_CONFIG")]
    config: Option<PathBuf>,

    /// JSON array of entries already on the queue before initialization
    #[arg(long)]
    backlog: Option<PathBuf>,

    /// JSON Lines file of live push calls; a line holding an array is one
    /// multi-entry push
    #[arg(long)]
    events: Option<PathBuf>,

    /// Data layer name (overrides config)
    #[arg(long)]
    name: Option<String>,

    /// Tracking name prefix (overrides config)
    #[arg(long)]
    event_prefix: Option<String>,

    /// Emit logs as JSON
    #[arg(long, default_value_t = false)]
    json_logs: bool,

    /// Log tracking calls instead of printing them
    #[arg(long, default_value_t = false)]
    log_only: bool,
}

/// Prints each tracking call as a JSON line.
struct StdoutSink;

impl TrackingSink for StdoutSink {
    fn track(&self, name: &str, payload: &NormalizedEvent) {
        let call = TrackingCall {
            name: name.to_string(),
            payload: payload.clone(),
        };
        match serde_json::to_string(&call) {
            Ok(line) => println!("{line}"),
            Err(e) => warn!(error = %e, tracking_name = name, "failed to encode tracking call"),
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let loaded = match &cli.config {
        Some(path) => AppConfig::load_from(path),
        None => AppConfig::load(),
    };
    let filter = loaded
        .as_ref()
        .map(|c| c.logging.filter.clone())
        .unwrap_or_else(|_| AppConfig::default().logging.filter);
    let json_logs = cli.json_logs || loaded.as_ref().map(|c| c.logging.json).unwrap_or(false);

    // Initialize tracing
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| filter.into());
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr);
    if json_logs {
        subscriber.json().init();
    } else {
        subscriber.init();
    }

    let mut config = loaded.unwrap_or_else(|e| {
        warn!(error = %e, "Failed to load config, using defaults");
        AppConfig::default()
    });

    // Apply CLI overrides
    if let Some(name) = cli.name {
        config.data_layer.name = name;
    }
    if let Some(prefix) = cli.event_prefix {
        config.data_layer.event_prefix = prefix;
    }
    config.data_layer.validate()?;

    info!(
        data_layer = %config.data_layer.name,
        event_prefix = %config.data_layer.event_prefix,
        "Configuration loaded"
    );

    let sink: Arc<dyn TrackingSink> = if cli.log_only {
        Arc::new(LogSink)
    } else {
        Arc::new(StdoutSink)
    };

    let mut scope = PageScope::new();
    let name = config.data_layer.name.clone();

    if let Some(path) = &cli.backlog {
        let backlog = read_backlog(path)?;
        info!(count = backlog.len(), "seeding data layer backlog");
        scope.data_layer(&name).push(backlog);
    }

    if let InstallOutcome::Installed { drained } =
        scope.install_data_layer(config.data_layer.clone(), sink)
    {
        info!(drained, "data layer ready");
    }

    if let Some(path) = &cli.events {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading events file {}", path.display()))?;
        let layer = scope.data_layer(&name);
        for (lineno, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            match serde_json::from_str::<Value>(line) {
                Ok(Value::Array(entries)) => layer.push(entries),
                Ok(entry) => layer.push_one(entry),
                Err(e) => warn!(line = lineno + 1, error = %e, "skipping unreadable line"),
            }
        }
    }

    if let Some(dispatcher) = scope.get(&name).and_then(|layer| layer.dispatcher()) {
        let metrics = dispatcher.metrics();
        info!(
            dispatched = metrics.dispatched,
            page_loads = metrics.page_loads,
            others = metrics.others,
            skipped = metrics.skipped,
            "replay complete"
        );
    }

    Ok(())
}

fn read_backlog(path: &Path) -> anyhow::Result<Vec<Value>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading backlog file {}", path.display()))?;
    match serde_json::from_str::<Value>(&text)
        .with_context(|| format!("parsing backlog file {}", path.display()))?
    {
        Value::Array(entries) => Ok(entries),
        other => Ok(vec![other]),
    }
}
