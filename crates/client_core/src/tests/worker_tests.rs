use super::*;
use std::{
    sync::{
        atomic::{AtomicUsize, Ordering},
        Mutex,
    },
    time::Duration,
};

use async_trait::async_trait;
use shared::{
    domain::{DoctorId, PatientId},
    error::{ApiException, ErrorCode},
    protocol::AppointmentPayload,
};

use crate::{error::ClientError, AppointmentView, ClientResult, FetchResource};

#[derive(Default)]
struct FakeApi {
    appointments: Vec<Appointment>,
    fail_doctors: bool,
    /// Per-call `(delay, response)` for `list_appointments`; calls past the
    /// end fall back to `appointments`.
    list_script: Mutex<Vec<(Duration, Vec<Appointment>)>>,
    list_calls: AtomicUsize,
}

fn status_error(status: u16, message: &str) -> ClientError {
    ClientError::Status {
        status,
        source: ApiException::new(ErrorCode::from_status(status), message),
    }
}

fn appointment(id: i64, when: &str) -> Appointment {
    Appointment {
        id: AppointmentId(id),
        doctor_id: DoctorId(1),
        patient_id: PatientId(3),
        appointment_date_time: shared::protocol::local_date_time::parse(when).expect("timestamp"),
    }
}

fn saved_from(id: i64, payload: &AppointmentPayload) -> Appointment {
    Appointment {
        id: AppointmentId(id),
        doctor_id: payload.doctor_id,
        patient_id: payload.patient_id,
        appointment_date_time: shared::protocol::local_date_time::parse(
            &payload.appointment_date_time,
        )
        .expect("timestamp"),
    }
}

#[async_trait]
impl SchedulingApi for FakeApi {
    async fn list_appointments(&self) -> ClientResult<Vec<Appointment>> {
        let call = self.list_calls.fetch_add(1, Ordering::SeqCst);
        let scripted = self.list_script.lock().expect("script lock").get(call).cloned();
        match scripted {
            Some((delay, list)) => {
                tokio::time::sleep(delay).await;
                Ok(list)
            }
            None => Ok(self.appointments.clone()),
        }
    }

    async fn create_appointment(&self, payload: &AppointmentPayload) -> ClientResult<Appointment> {
        Ok(saved_from(100, payload))
    }

    async fn update_appointment(
        &self,
        id: AppointmentId,
        payload: &AppointmentPayload,
    ) -> ClientResult<Appointment> {
        if id.0 == 500 {
            return Err(status_error(500, "boom"));
        }
        Ok(saved_from(id.0, payload))
    }

    async fn delete_appointment(&self, id: AppointmentId) -> ClientResult<()> {
        if id.0 == 404 {
            return Err(status_error(404, "no such appointment"));
        }
        Ok(())
    }

    async fn list_doctors(&self) -> ClientResult<Vec<DoctorSummary>> {
        if self.fail_doctors {
            return Err(status_error(503, "doctors unavailable"));
        }
        Ok(Vec::new())
    }

    async fn list_patients(&self) -> ClientResult<Vec<PatientSummary>> {
        Ok(vec![PatientSummary {
            id: PatientId(3),
            name: "Ann".to_string(),
            email: None,
            phone: None,
        }])
    }
}

struct Harness {
    cmd_tx: Sender<ViewCommand>,
    event_rx: Receiver<ViewEvent>,
    handle: JoinHandle<()>,
}

fn start(api: FakeApi) -> Harness {
    let (cmd_tx, cmd_rx) = crossbeam_channel::bounded(16);
    let (event_tx, event_rx) = crossbeam_channel::bounded(16);
    let handle = spawn_view_worker(Arc::new(api), cmd_rx, event_tx).expect("spawn worker");
    Harness {
        cmd_tx,
        event_rx,
        handle,
    }
}

impl Harness {
    fn run(&self, cmd: ViewCommand) -> ViewEvent {
        self.cmd_tx.send(cmd).expect("send command");
        self.event_rx
            .recv_timeout(Duration::from_secs(5))
            .expect("worker reply")
    }
}

fn payload() -> AppointmentPayload {
    AppointmentPayload {
        doctor_id: DoctorId(2),
        patient_id: PatientId(5),
        appointment_date_time: "2024-03-10T14:30:00".to_string(),
    }
}

#[test]
fn load_echoes_generation() {
    let harness = start(FakeApi {
        appointments: vec![appointment(7, "2024-05-01T10:00:00")],
        ..FakeApi::default()
    });

    let event = harness.run(ViewCommand::LoadAppointments {
        generation: 4,
        seq: 2,
    });

    assert_eq!(event.generation, 4);
    assert_eq!(
        event.outcome,
        ViewOutcome::AppointmentsLoaded {
            seq: 2,
            list: vec![appointment(7, "2024-05-01T10:00:00")],
        }
    );
}

#[test]
fn slow_initial_load_does_not_overwrite_later_refresh() {
    let first = vec![appointment(1, "2024-05-01T10:00:00")];
    let second = vec![
        appointment(1, "2024-05-01T10:00:00"),
        appointment(100, "2024-05-02T11:00:00"),
    ];
    let harness = start(FakeApi {
        list_script: Mutex::new(vec![
            (Duration::from_millis(300), first),
            (Duration::ZERO, second),
        ]),
        ..FakeApi::default()
    });
    let mut view = AppointmentView::new(harness.cmd_tx.clone());

    view.mount();
    std::thread::sleep(Duration::from_millis(50));
    view.refresh();

    // Two appointment loads plus doctors and patients.
    let mut rejected = Vec::new();
    for _ in 0..4 {
        let event = harness
            .event_rx
            .recv_timeout(Duration::from_secs(5))
            .expect("worker reply");
        let outcome = event.outcome.clone();
        if !view.apply(event) {
            rejected.push(outcome);
        }
    }

    let ids: Vec<i64> = view.appointments().iter().map(|a| a.id.0).collect();
    assert_eq!(ids, vec![1, 100]);
    assert!(!view.is_loading(FetchResource::Appointments));
    assert!(matches!(
        rejected.as_slice(),
        [ViewOutcome::AppointmentsLoaded { seq: 1, .. }]
    ));
}

#[test]
fn doctor_failure_is_reported_alone() {
    let harness = start(FakeApi {
        fail_doctors: true,
        ..FakeApi::default()
    });

    let doctors = harness.run(ViewCommand::LoadDoctors { generation: 1 });
    let patients = harness.run(ViewCommand::LoadPatients { generation: 1 });

    match doctors.outcome {
        ViewOutcome::DoctorsFailed(error) => {
            assert_eq!(error.code, ErrorCode::Internal);
            assert_eq!(error.message, "doctors unavailable");
        }
        other => panic!("unexpected outcome: {other:?}"),
    }
    assert!(matches!(patients.outcome, ViewOutcome::PatientsLoaded(ref list) if list.len() == 1));
}

#[test]
fn save_routes_by_target_and_keeps_ticket() {
    let harness = start(FakeApi::default());

    let created = harness.run(ViewCommand::Save {
        generation: 2,
        request: SaveRequest {
            ticket: 5,
            target: SaveTarget::Create,
            payload: payload(),
        },
    });
    match created.outcome {
        ViewOutcome::Saved {
            ticket,
            appointment,
        } => {
            assert_eq!(ticket, 5);
            assert_eq!(appointment.id, AppointmentId(100));
        }
        other => panic!("unexpected outcome: {other:?}"),
    }

    let failed = harness.run(ViewCommand::Save {
        generation: 2,
        request: SaveRequest {
            ticket: 6,
            target: SaveTarget::Update(AppointmentId(500)),
            payload: payload(),
        },
    });
    assert!(matches!(
        failed.outcome,
        ViewOutcome::SaveFailed { ticket: 6, .. }
    ));
}

#[test]
fn delete_reports_success_and_failure() {
    let harness = start(FakeApi::default());

    let ok = harness.run(ViewCommand::Delete {
        generation: 1,
        id: AppointmentId(7),
    });
    assert_eq!(
        ok.outcome,
        ViewOutcome::Deleted {
            id: AppointmentId(7)
        }
    );

    let missing = harness.run(ViewCommand::Delete {
        generation: 1,
        id: AppointmentId(404),
    });
    match missing.outcome {
        ViewOutcome::DeleteFailed { id, error } => {
            assert_eq!(id, AppointmentId(404));
            assert_eq!(error.code, ErrorCode::NotFound);
        }
        other => panic!("unexpected outcome: {other:?}"),
    }
}

#[test]
fn shutdown_stops_worker() {
    let harness = start(FakeApi::default());

    harness.cmd_tx.send(ViewCommand::Shutdown).expect("send");

    harness.handle.join().expect("worker exits");
}

#[test]
fn dropping_sender_stops_worker() {
    let Harness {
        cmd_tx,
        event_rx: _event_rx,
        handle,
    } = start(FakeApi::default());

    drop(cmd_tx);

    handle.join().expect("worker exits");
}
