//! Read-only projections of the canonical appointment list.
//!
//! Everything here is a pure function of its inputs. The view recomputes the
//! projections whenever canonical state or the table sort changes.

use std::cmp::Ordering;

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use shared::domain::{Appointment, AppointmentId};

use crate::sort::SortState;

/// Every calendar event is drawn as a fixed half-hour box; the collaborator
/// records no appointment length.
pub const SLOT_MINUTES: i64 = 30;
pub const SLOTS_PER_DAY: usize = (24 * 60 / SLOT_MINUTES) as usize;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarEvent {
    pub id: AppointmentId,
    pub title: String,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub resource: Appointment,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TableSortKey {
    PatientId,
    DoctorId,
    #[default]
    AppointmentDateTime,
}

impl TableSortKey {
    pub const ALL: [TableSortKey; 3] = [
        TableSortKey::PatientId,
        TableSortKey::DoctorId,
        TableSortKey::AppointmentDateTime,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::PatientId => "Patient ID",
            Self::DoctorId => "Doctor ID",
            Self::AppointmentDateTime => "Date",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewMode {
    #[default]
    Calendar,
    Table,
}

impl ViewMode {
    pub fn toggled(self) -> Self {
        match self {
            Self::Calendar => Self::Table,
            Self::Table => Self::Calendar,
        }
    }
}

pub fn event_title(appointment: &Appointment) -> String {
    format!(
        "Patient {} with Doctor {}",
        appointment.patient_id, appointment.doctor_id
    )
}

pub fn calendar_event(appointment: &Appointment) -> CalendarEvent {
    let start = appointment.appointment_date_time;
    let end = start
        .checked_add_signed(Duration::minutes(SLOT_MINUTES))
        .unwrap_or(NaiveDateTime::MAX);
    CalendarEvent {
        id: appointment.id,
        title: event_title(appointment),
        start,
        end,
        resource: *appointment,
    }
}

/// One event per appointment. Concurrent appointments overlap; nothing is merged.
pub fn calendar_events(appointments: &[Appointment]) -> Vec<CalendarEvent> {
    appointments.iter().map(calendar_event).collect()
}

fn compare_by(key: TableSortKey, a: &Appointment, b: &Appointment) -> Ordering {
    match key {
        TableSortKey::PatientId => a.patient_id.cmp(&b.patient_id),
        TableSortKey::DoctorId => a.doctor_id.cmp(&b.doctor_id),
        TableSortKey::AppointmentDateTime => a.appointment_date_time.cmp(&b.appointment_date_time),
    }
}

/// A reordered copy of `appointments`; ties carry no ordering guarantee.
pub fn sorted_table(appointments: &[Appointment], sort: &SortState<TableSortKey>) -> Vec<Appointment> {
    let key = sort.key();
    let direction = sort.direction();
    let mut rows = appointments.to_vec();
    rows.sort_by(|a, b| direction.apply(compare_by(key, a, b)));
    rows
}

/// Monday of the week containing `date`.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.weekday().num_days_from_monday()))
}

/// Events starting within `[week_start, week_start + 7 days)`, in start order.
pub fn events_in_week(events: &[CalendarEvent], week_start: NaiveDate) -> Vec<&CalendarEvent> {
    let Some(from) = week_start.and_hms_opt(0, 0, 0) else {
        return Vec::new();
    };
    let until = from + Duration::days(7);
    let mut hits: Vec<&CalendarEvent> = events
        .iter()
        .filter(|event| event.start >= from && event.start < until)
        .collect();
    hits.sort_by_key(|event| event.start);
    hits
}

/// Index of the half-hour slot `time` falls in, counted from midnight.
pub fn slot_index(time: NaiveTime) -> usize {
    (time.num_seconds_from_midnight() as usize) / (SLOT_MINUTES as usize * 60)
}

pub fn slot_start(index: usize) -> Option<NaiveTime> {
    if index >= SLOTS_PER_DAY {
        return None;
    }
    let minutes = index as u32 * SLOT_MINUTES as u32;
    NaiveTime::from_hms_opt(minutes / 60, minutes % 60, 0)
}

pub fn display_date(value: NaiveDateTime) -> String {
    value.format("%Y-%m-%d").to_string()
}

pub fn display_time(value: NaiveDateTime) -> String {
    value.format("%H:%M").to_string()
}
