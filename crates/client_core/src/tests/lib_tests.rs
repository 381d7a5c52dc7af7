use super::*;
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};
use shared::domain::{DoctorId, PatientId};
use tokio::{net::TcpListener, sync::Mutex};

type RecordedRequest = (&'static str, Option<i64>, Value);

#[derive(Clone, Default)]
struct ServerState {
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

async fn list_appointments() -> Json<Value> {
    Json(json!([
        {"id": 7, "doctorId": 1, "patientId": 3, "appointmentDateTime": "2024-05-01T10:00:00"},
        {"id": 8, "doctorId": 2, "patientId": 4, "appointmentDateTime": "2024-05-02T09:30"}
    ]))
}

async fn create_appointment(
    State(state): State<ServerState>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    state.requests.lock().await.push(("POST", None, body.clone()));
    let mut created = body;
    created["id"] = json!(99);
    (StatusCode::CREATED, Json(created))
}

async fn update_appointment(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(body): Json<Value>,
) -> Json<Value> {
    state.requests.lock().await.push(("PUT", Some(id), body.clone()));
    let mut updated = body;
    updated["id"] = json!(id);
    Json(updated)
}

async fn delete_appointment(State(state): State<ServerState>, Path(id): Path<i64>) -> StatusCode {
    state.requests.lock().await.push(("DELETE", Some(id), Value::Null));
    if id == 404 {
        StatusCode::NOT_FOUND
    } else {
        StatusCode::NO_CONTENT
    }
}

async fn list_doctors() -> Json<Value> {
    Json(json!([
        {"id": 1, "name": "Dr. Grey", "specialization": "Surgery", "email": "grey@clinic.test"},
        {"id": 2, "name": "Dr. House"}
    ]))
}

async fn list_patients() -> Json<Value> {
    Json(json!([{"id": 3, "name": "Ann Perkins", "phone": "555-0100"}]))
}

async fn spawn_server(app: Router) -> anyhow::Result<String> {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    Ok(format!("http://{addr}/api"))
}

async fn spawn_scheduling_server() -> anyhow::Result<(String, ServerState)> {
    let state = ServerState::default();
    let app = Router::new()
        .route(
            "/api/appointments",
            get(list_appointments).post(create_appointment),
        )
        .route(
            "/api/appointments/:id",
            axum::routing::put(update_appointment).delete(delete_appointment),
        )
        .route("/api/doctors", get(list_doctors))
        .route("/api/patients", get(list_patients))
        .with_state(state.clone());
    let base_url = spawn_server(app).await?;
    Ok((base_url, state))
}

fn payload() -> AppointmentPayload {
    AppointmentPayload {
        doctor_id: DoctorId(2),
        patient_id: PatientId(5),
        appointment_date_time: "2024-03-10T14:30:00".to_string(),
    }
}

#[test]
fn base_url_trailing_slash_is_trimmed() {
    let api = HttpSchedulingApi::new("http://localhost:8081/api/");
    assert_eq!(api.base_url(), "http://localhost:8081/api");
    assert_eq!(api.url("doctors"), "http://localhost:8081/api/doctors");
}

#[tokio::test]
async fn lists_appointments_with_local_timestamps() {
    let (base_url, _) = spawn_scheduling_server().await.expect("spawn server");
    let api = HttpSchedulingApi::new(base_url);

    let appointments = api.list_appointments().await.expect("list");

    assert_eq!(appointments.len(), 2);
    assert_eq!(appointments[0].id, AppointmentId(7));
    assert_eq!(appointments[0].doctor_id, DoctorId(1));
    assert_eq!(appointments[0].patient_id, PatientId(3));
    assert_eq!(
        appointments[1].appointment_date_time,
        shared::protocol::local_date_time::parse("2024-05-02T09:30:00").expect("timestamp")
    );
}

#[tokio::test]
async fn create_posts_camel_case_payload() {
    let (base_url, state) = spawn_scheduling_server().await.expect("spawn server");
    let api = HttpSchedulingApi::new(base_url);

    let created = api.create_appointment(&payload()).await.expect("create");

    assert_eq!(created.id, AppointmentId(99));
    let requests = state.requests.lock().await.clone();
    assert_eq!(
        requests,
        vec![(
            "POST",
            None,
            json!({"doctorId": 2, "patientId": 5, "appointmentDateTime": "2024-03-10T14:30:00"})
        )]
    );
}

#[tokio::test]
async fn update_targets_appointment_id() {
    let (base_url, state) = spawn_scheduling_server().await.expect("spawn server");
    let api = HttpSchedulingApi::new(base_url);

    let updated = api
        .update_appointment(AppointmentId(7), &payload())
        .await
        .expect("update");

    assert_eq!(updated.id, AppointmentId(7));
    let requests = state.requests.lock().await.clone();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].0, "PUT");
    assert_eq!(requests[0].1, Some(7));
}

#[tokio::test]
async fn delete_ignores_empty_success_body() {
    let (base_url, state) = spawn_scheduling_server().await.expect("spawn server");
    let api = HttpSchedulingApi::new(base_url);

    api.delete_appointment(AppointmentId(7))
        .await
        .expect("delete");

    let requests = state.requests.lock().await.clone();
    assert_eq!(requests, vec![("DELETE", Some(7), Value::Null)]);
}

#[tokio::test]
async fn delete_of_missing_appointment_is_classified_not_found() {
    let (base_url, _) = spawn_scheduling_server().await.expect("spawn server");
    let api = HttpSchedulingApi::new(base_url);

    let err = api
        .delete_appointment(AppointmentId(404))
        .await
        .expect_err("missing appointment");

    assert_eq!(err.code(), ErrorCode::NotFound);
    match err {
        ClientError::Status { status, source } => {
            assert_eq!(status, 404);
            assert_eq!(source.message, "Not Found");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn reference_lists_tolerate_missing_optional_fields() {
    let (base_url, _) = spawn_scheduling_server().await.expect("spawn server");
    let api = HttpSchedulingApi::new(base_url);

    let doctors = api.list_doctors().await.expect("doctors");
    let patients = api.list_patients().await.expect("patients");

    assert_eq!(doctors.len(), 2);
    assert_eq!(doctors[0].specialization.as_deref(), Some("Surgery"));
    assert_eq!(doctors[1].specialization, None);
    assert_eq!(patients[0].name, "Ann Perkins");
    assert_eq!(patients[0].email, None);
}

#[tokio::test]
async fn rejected_save_keeps_collaborator_message() {
    let app = Router::new().route(
        "/api/appointments",
        axum::routing::post(|| async {
            (
                StatusCode::CONFLICT,
                "Doctor already has an appointment at this time",
            )
        }),
    );
    let base_url = spawn_server(app).await.expect("spawn server");
    let api = HttpSchedulingApi::new(base_url);

    let err = api
        .create_appointment(&payload())
        .await
        .expect_err("conflict");

    assert_eq!(err.code(), ErrorCode::Conflict);
    let api_error: shared::error::ApiError = (&err).into();
    assert_eq!(
        api_error.message,
        "Doctor already has an appointment at this time"
    );
}

#[tokio::test]
async fn malformed_body_is_a_decode_error() {
    let app = Router::new().route("/api/appointments", get(|| async { "not json" }));
    let base_url = spawn_server(app).await.expect("spawn server");
    let api = HttpSchedulingApi::new(base_url);

    let err = api.list_appointments().await.expect_err("decode failure");

    assert!(matches!(err, ClientError::Decode { .. }), "{err:?}");
}

#[tokio::test]
async fn unreachable_collaborator_is_a_transport_error() {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);
    let api = HttpSchedulingApi::new(format!("http://{addr}/api"));

    let err = api.list_patients().await.expect_err("connection refused");

    assert_eq!(err.code(), ErrorCode::Transport);
    assert!(matches!(err, ClientError::Transport { .. }));
}
