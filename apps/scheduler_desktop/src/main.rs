mod backend_bridge;
mod ui;

use anyhow::{anyhow, Context};
use clap::Parser;
use client_core::{
    config::{load_settings, normalize_base_url},
    ViewCommand, ViewEvent,
};
use crossbeam_channel::bounded;
use eframe::egui;
use tracing_subscriber::EnvFilter;

use crate::ui::SchedulerApp;

#[derive(Parser, Debug)]
#[command(about = "Desktop calendar and table view for clinic appointments")]
struct Args {
    /// Base address of the scheduling REST service, e.g. http://localhost:8081/api
    #[arg(long)]
    api_base_url: Option<String>,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let settings = load_settings();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(settings.log_filter.as_str()));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let raw_base_url = args
        .api_base_url
        .as_deref()
        .unwrap_or(settings.api_base_url.as_str());
    let api_base_url = normalize_base_url(raw_base_url)?;
    tracing::info!(api_base_url = %api_base_url, "starting clinic scheduler");

    let (cmd_tx, cmd_rx) = bounded::<ViewCommand>(256);
    let (event_tx, event_rx) = bounded::<ViewEvent>(2048);
    let worker = backend_bridge::runtime::launch(&api_base_url, cmd_rx, event_tx)
        .context("failed to start the background worker")?;

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Clinic Scheduler")
            .with_inner_size([1280.0, 800.0])
            .with_min_inner_size([900.0, 600.0]),
        ..Default::default()
    };
    eframe::run_native(
        "Clinic Scheduler",
        options,
        Box::new(move |_cc| Ok(Box::new(SchedulerApp::new(cmd_tx, event_rx, api_base_url)))),
    )
    .map_err(|err| anyhow!("desktop shell failed: {err}"))?;

    if worker.join().is_err() {
        tracing::error!("background worker panicked");
    }
    Ok(())
}
