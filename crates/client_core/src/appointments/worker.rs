//! Background worker that runs collaborator requests off the UI thread.
//!
//! The view pushes [`ViewCommand`]s into a channel; the worker executes each
//! one as its own task on a tokio runtime and answers with a [`ViewEvent`]
//! echoing the command's generation.

use std::{
    sync::Arc,
    thread::{self, JoinHandle},
};

use crossbeam_channel::{Receiver, Sender, TrySendError};
use shared::{
    domain::{Appointment, AppointmentId, DoctorSummary, PatientSummary},
    error::ApiError,
};
use tracing::{debug, error, info, warn};

use crate::{
    appointments::edit_session::{SaveRequest, SaveTarget},
    SchedulingApi,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewCommand {
    /// `seq` orders overlapping refreshes within one generation.
    LoadAppointments { generation: u64, seq: u64 },
    LoadDoctors { generation: u64 },
    LoadPatients { generation: u64 },
    Save { generation: u64, request: SaveRequest },
    Delete { generation: u64, id: AppointmentId },
    Shutdown,
}

impl ViewCommand {
    pub fn name(&self) -> &'static str {
        match self {
            Self::LoadAppointments { .. } => "load_appointments",
            Self::LoadDoctors { .. } => "load_doctors",
            Self::LoadPatients { .. } => "load_patients",
            Self::Save { .. } => "save_appointment",
            Self::Delete { .. } => "delete_appointment",
            Self::Shutdown => "shutdown",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ViewEvent {
    pub generation: u64,
    pub outcome: ViewOutcome,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ViewOutcome {
    AppointmentsLoaded { seq: u64, list: Vec<Appointment> },
    AppointmentsFailed { seq: u64, error: ApiError },
    DoctorsLoaded(Vec<DoctorSummary>),
    DoctorsFailed(ApiError),
    PatientsLoaded(Vec<PatientSummary>),
    PatientsFailed(ApiError),
    Saved { ticket: u64, appointment: Appointment },
    SaveFailed { ticket: u64, error: ApiError },
    Deleted { id: AppointmentId },
    DeleteFailed { id: AppointmentId, error: ApiError },
}

/// Starts the worker thread. It stops when every command sender is dropped or
/// on [`ViewCommand::Shutdown`]; requests still in flight are abandoned.
pub fn spawn_view_worker(
    api: Arc<dyn SchedulingApi>,
    cmd_rx: Receiver<ViewCommand>,
    event_tx: Sender<ViewEvent>,
) -> std::io::Result<JoinHandle<()>> {
    thread::Builder::new()
        .name("view-worker".to_string())
        .spawn(move || {
            let runtime = match tokio::runtime::Builder::new_multi_thread()
                .enable_all()
                .build()
            {
                Ok(runtime) => runtime,
                Err(err) => {
                    error!("failed to build view worker runtime: {err}");
                    return;
                }
            };

            runtime.block_on(async move {
                info!("view worker ready");
                while let Ok(cmd) = cmd_rx.recv() {
                    if matches!(cmd, ViewCommand::Shutdown) {
                        break;
                    }
                    let api = Arc::clone(&api);
                    let event_tx = event_tx.clone();
                    tokio::spawn(async move {
                        if let Some(event) = execute(api.as_ref(), cmd).await {
                            deliver(&event_tx, event);
                        }
                    });
                }
                info!("view worker stopping");
            });
        })
}

async fn execute(api: &dyn SchedulingApi, cmd: ViewCommand) -> Option<ViewEvent> {
    let name = cmd.name();
    debug!(command = name, "executing view command");

    let (generation, outcome) = match cmd {
        ViewCommand::LoadAppointments { generation, seq } => {
            let outcome = match api.list_appointments().await {
                Ok(list) => ViewOutcome::AppointmentsLoaded { seq, list },
                Err(err) => {
                    warn!(seq, "failed to fetch appointments: {err}");
                    ViewOutcome::AppointmentsFailed {
                        seq,
                        error: (&err).into(),
                    }
                }
            };
            (generation, outcome)
        }
        ViewCommand::LoadDoctors { generation } => {
            let outcome = match api.list_doctors().await {
                Ok(list) => ViewOutcome::DoctorsLoaded(list),
                Err(err) => {
                    warn!("failed to fetch doctors: {err}");
                    ViewOutcome::DoctorsFailed((&err).into())
                }
            };
            (generation, outcome)
        }
        ViewCommand::LoadPatients { generation } => {
            let outcome = match api.list_patients().await {
                Ok(list) => ViewOutcome::PatientsLoaded(list),
                Err(err) => {
                    warn!("failed to fetch patients: {err}");
                    ViewOutcome::PatientsFailed((&err).into())
                }
            };
            (generation, outcome)
        }
        ViewCommand::Save {
            generation,
            request,
        } => {
            let result = match request.target {
                SaveTarget::Create => api.create_appointment(&request.payload).await,
                SaveTarget::Update(id) => api.update_appointment(id, &request.payload).await,
            };
            let outcome = match result {
                Ok(appointment) => ViewOutcome::Saved {
                    ticket: request.ticket,
                    appointment,
                },
                Err(err) => {
                    warn!(save_target = ?request.target, "failed to save appointment: {err}");
                    ViewOutcome::SaveFailed {
                        ticket: request.ticket,
                        error: (&err).into(),
                    }
                }
            };
            (generation, outcome)
        }
        ViewCommand::Delete { generation, id } => {
            let outcome = match api.delete_appointment(id).await {
                Ok(()) => ViewOutcome::Deleted { id },
                Err(err) => {
                    warn!(appointment_id = id.0, "failed to delete appointment: {err}");
                    ViewOutcome::DeleteFailed {
                        id,
                        error: (&err).into(),
                    }
                }
            };
            (generation, outcome)
        }
        ViewCommand::Shutdown => return None,
    };

    Some(ViewEvent {
        generation,
        outcome,
    })
}

fn deliver(event_tx: &Sender<ViewEvent>, event: ViewEvent) {
    match event_tx.try_send(event) {
        Ok(()) => {}
        Err(TrySendError::Full(event)) => {
            warn!(generation = event.generation, "view event queue is full; dropping event");
        }
        Err(TrySendError::Disconnected(_)) => {
            debug!("view event receiver is gone; dropping event");
        }
    }
}

#[cfg(test)]
#[path = "../tests/worker_tests.rs"]
mod tests;
