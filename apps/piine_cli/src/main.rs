use std::{io, path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use clap::Parser;
use piine_core::{AppController, AppEvent, SessionSnapshot, StaticHost, ViewPort};
use serde::Serialize;
use tokio::sync::broadcast::error::TryRecvError;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod config;
mod console_view;

use config::load_settings;
use console_view::ConsoleView;

/// Plays a trigger script against the piine controller.
#[derive(Parser, Debug)]
#[command(name = "piine")]
struct Args {
    /// TOML settings file (defaults to ./piine.toml when present).
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    seed: Option<u64>,
    /// Element id to leave off the simulated host surface. Repeatable.
    #[arg(long = "missing", value_name = "ELEMENT_ID")]
    missing: Vec<String>,
    /// Print the final report as JSON instead of the console view.
    #[arg(long)]
    json: bool,
}

#[derive(Serialize)]
struct RunReport {
    snapshot: SessionSnapshot,
    events: Vec<AppEvent>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let mut settings = load_settings(args.config.as_deref())?;
    if args.seed.is_some() {
        settings.rng_seed = args.seed;
    }
    settings.json_output |= args.json;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&settings.log_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let script = settings.compiled_script()?;
    let host = StaticHost::new(
        settings
            .host_elements
            .iter()
            .filter(|id| !args.missing.contains(*id))
            .cloned(),
    );
    let json_output = settings.json_output;
    let seed = settings.rng_seed;

    let app = piine_core::instance_or_init(move || {
        let view: Box<dyn ViewPort> = if json_output {
            Box::new(ConsoleView::new(io::sink()))
        } else {
            Box::new(ConsoleView::new(io::stdout()))
        };
        match seed {
            Some(seed) => AppController::with_seed(Arc::new(host), view, seed),
            None => AppController::new(Arc::new(host), view),
        }
    });
    let mut events = app.subscribe_events();

    for step in script {
        tokio::time::sleep(step.delay).await;
        info!(trigger = %step.trigger, "firing trigger");
        if let Err(err) = app.trigger(step.trigger) {
            if err.is_recoverable() {
                info!(%err, "script outlived the controller");
            } else {
                warn!(%err, "controller stopped before the script finished");
            }
            break;
        }
    }

    let idle = app
        .wait_for_idle()
        .await
        .context("controller stopped unexpectedly")?;
    if !idle.disposed {
        app.unload()?;
    }
    app.closed().await;

    let mut seen = Vec::new();
    loop {
        match events.try_recv() {
            Ok(event) => seen.push(event),
            Err(TryRecvError::Lagged(skipped)) => warn!(skipped, "event log truncated"),
            Err(TryRecvError::Empty | TryRecvError::Closed) => break,
        }
    }

    let report = RunReport {
        snapshot: app.snapshot(),
        events: seen,
    };
    if json_output {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!(
            "participants={} ovations={} ticks={} events={}",
            report.snapshot.participant_count,
            report.snapshot.completed_ovations,
            report.snapshot.ovation_ticks,
            report.events.len()
        );
    }

    Ok(())
}
