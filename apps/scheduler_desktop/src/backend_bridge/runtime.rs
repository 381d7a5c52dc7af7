//! Runtime bridge between the view command queue and worker event intake.

use std::{sync::Arc, thread::JoinHandle};

use client_core::{spawn_view_worker, HttpSchedulingApi, SchedulingApi, ViewCommand, ViewEvent};
use crossbeam_channel::{Receiver, Sender};

/// Builds the HTTP collaborator client for `api_base_url` and starts the
/// worker that serves the view's commands.
pub fn launch(
    api_base_url: &str,
    cmd_rx: Receiver<ViewCommand>,
    event_tx: Sender<ViewEvent>,
) -> std::io::Result<JoinHandle<()>> {
    let api: Arc<dyn SchedulingApi> = Arc::new(HttpSchedulingApi::new(api_base_url));
    let handle = spawn_view_worker(api, cmd_rx, event_tx)?;
    tracing::debug!(api_base_url, "view worker thread started");
    Ok(handle)
}
