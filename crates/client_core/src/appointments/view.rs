//! Single owner of appointment view state.
//!
//! Canonical data (appointments, doctors, patients) only changes in
//! [`AppointmentView::apply`]; the calendar events and table rows are derived
//! from it by [`AppointmentView::recompute`] and never edited on their own.

use std::collections::HashSet;

use crossbeam_channel::{Sender, TrySendError};
use shared::domain::{Appointment, AppointmentId, DoctorSummary, PatientSummary};
use tracing::{debug, info, warn};

use crate::{
    appointments::{
        edit_session::{EditForm, EditSession},
        projection::{calendar_events, sorted_table, CalendarEvent, TableSortKey, ViewMode},
        worker::{ViewCommand, ViewEvent, ViewOutcome},
    },
    directory::{filter_and_sort, DoctorSortKey, PatientSortKey},
    error::{FetchResource, ViewError},
    sort::{SortDirection, SortState},
};

pub struct AppointmentView {
    cmd_tx: Sender<ViewCommand>,
    generation: u64,
    live: bool,
    /// Latest appointment refresh issued, and the latest one that resolved.
    appointments_requested: u64,
    appointments_resolved: u64,

    appointments: Vec<Appointment>,
    doctors: Vec<DoctorSummary>,
    patients: Vec<PatientSummary>,

    table_sort: SortState<TableSortKey>,
    view_mode: ViewMode,
    events: Vec<CalendarEvent>,
    table: Vec<Appointment>,

    session: EditSession,
    notices: Vec<ViewError>,
    loading: HashSet<FetchResource>,
    pending_deletes: HashSet<AppointmentId>,
}

impl AppointmentView {
    pub fn new(cmd_tx: Sender<ViewCommand>) -> Self {
        Self {
            cmd_tx,
            generation: 0,
            live: false,
            appointments_requested: 0,
            appointments_resolved: 0,
            appointments: Vec::new(),
            doctors: Vec::new(),
            patients: Vec::new(),
            table_sort: SortState::default(),
            view_mode: ViewMode::default(),
            events: Vec::new(),
            table: Vec::new(),
            session: EditSession::default(),
            notices: Vec::new(),
            loading: HashSet::new(),
            pending_deletes: HashSet::new(),
        }
    }

    /// Starts a new lifetime and issues the three independent initial loads.
    /// Remounting a live view abandons the previous lifetime, dialog included.
    pub fn mount(&mut self) {
        self.generation += 1;
        self.live = true;
        self.session.close();
        self.loading.clear();
        self.pending_deletes.clear();
        info!(generation = self.generation, "appointment view mounted");
        self.refresh();
        self.load_reference_data();
    }

    /// Re-fetches the whole appointment collection.
    pub fn refresh(&mut self) {
        if !self.live {
            return;
        }
        let generation = self.generation;
        let seq = self.appointments_requested + 1;
        if self.dispatch(ViewCommand::LoadAppointments { generation, seq }) {
            self.appointments_requested = seq;
            self.loading.insert(FetchResource::Appointments);
        }
    }

    pub fn load_reference_data(&mut self) {
        if !self.live {
            return;
        }
        let generation = self.generation;
        if self.dispatch(ViewCommand::LoadDoctors { generation }) {
            self.loading.insert(FetchResource::Doctors);
        }
        if self.dispatch(ViewCommand::LoadPatients { generation }) {
            self.loading.insert(FetchResource::Patients);
        }
    }

    /// Ends the current lifetime. Responses still in flight are ignored when they land.
    pub fn teardown(&mut self) {
        if !self.live {
            return;
        }
        self.live = false;
        self.generation += 1;
        self.session.close();
        self.loading.clear();
        self.pending_deletes.clear();
        info!("appointment view torn down");
    }

    /// Folds one worker event into state. Returns `false` when the event was
    /// stale and dropped untouched.
    pub fn apply(&mut self, event: ViewEvent) -> bool {
        if !self.live || event.generation != self.generation {
            debug!(
                event_generation = event.generation,
                current_generation = self.generation,
                live = self.live,
                "discarding stale view event"
            );
            return false;
        }

        match event.outcome {
            ViewOutcome::AppointmentsLoaded { seq, list } => {
                if !self.resolve_appointments(seq) {
                    return false;
                }
                self.appointments = dedupe_appointments(list);
                info!(count = self.appointments.len(), seq, "appointments loaded");
                self.recompute();
            }
            ViewOutcome::AppointmentsFailed { seq, error } => {
                if !self.resolve_appointments(seq) {
                    return false;
                }
                self.push_fetch_failure(FetchResource::Appointments, error.message);
            }
            ViewOutcome::DoctorsLoaded(list) => {
                self.loading.remove(&FetchResource::Doctors);
                info!(count = list.len(), "doctors loaded");
                self.doctors = list;
            }
            ViewOutcome::DoctorsFailed(error) => {
                self.loading.remove(&FetchResource::Doctors);
                self.push_fetch_failure(FetchResource::Doctors, error.message);
            }
            ViewOutcome::PatientsLoaded(list) => {
                self.loading.remove(&FetchResource::Patients);
                info!(count = list.len(), "patients loaded");
                self.patients = list;
            }
            ViewOutcome::PatientsFailed(error) => {
                self.loading.remove(&FetchResource::Patients);
                self.push_fetch_failure(FetchResource::Patients, error.message);
            }
            ViewOutcome::Saved {
                ticket,
                appointment,
            } => {
                info!(appointment_id = appointment.id.0, "appointment saved");
                // The collaborator changed either way, so re-fetch even for a superseded ticket.
                self.refresh();
                if !self.session.complete_save(ticket) {
                    debug!(ticket, "save outcome for a superseded dialog session");
                }
            }
            ViewOutcome::SaveFailed { ticket, error } => {
                let failure = ViewError::Save {
                    detail: error.message,
                };
                if !self.session.fail_save(ticket, failure.clone()) {
                    self.notices.push(failure);
                }
            }
            ViewOutcome::Deleted { id } => {
                self.pending_deletes.remove(&id);
                self.appointments.retain(|appointment| appointment.id != id);
                info!(appointment_id = id.0, "appointment deleted");
                self.recompute();
            }
            ViewOutcome::DeleteFailed { id, error } => {
                self.pending_deletes.remove(&id);
                self.notices.push(ViewError::Delete {
                    detail: error.message,
                });
            }
        }
        true
    }

    pub fn open_for_create(&mut self) {
        self.session.open_for_create();
    }

    pub fn open_for_edit(&mut self, appointment: &Appointment) {
        self.session.open_for_edit(appointment);
    }

    pub fn cancel_edit(&mut self) {
        self.session.cancel();
    }

    pub fn edit_form_mut(&mut self) -> &mut EditForm {
        self.session.form_mut()
    }

    /// Validates the dialog and dispatches the create/update call.
    pub fn submit(&mut self) {
        let Some(request) = self.session.submit() else {
            return;
        };
        let ticket = request.ticket;
        let cmd = ViewCommand::Save {
            generation: self.generation,
            request,
        };
        if let Err(reason) = self.try_dispatch(cmd) {
            self.session
                .fail_save(ticket, ViewError::Save { detail: reason });
        }
    }

    /// Asks the collaborator to delete `id`; the row is removed locally once it succeeds.
    pub fn delete_appointment(&mut self, id: AppointmentId) {
        if !self.live || self.pending_deletes.contains(&id) {
            return;
        }
        let generation = self.generation;
        if self.dispatch(ViewCommand::Delete { generation, id }) {
            self.pending_deletes.insert(id);
        }
    }

    pub fn set_view_mode(&mut self, mode: ViewMode) {
        self.view_mode = mode;
    }

    pub fn toggle_view_mode(&mut self) {
        self.view_mode = self.view_mode.toggled();
    }

    pub fn select_sort_key(&mut self, key: TableSortKey) {
        self.table_sort.select(key);
        self.recompute();
    }

    pub fn set_sort_direction(&mut self, direction: SortDirection) {
        self.table_sort.set_direction(direction);
        self.recompute();
    }

    pub fn dismiss_notice(&mut self, index: usize) {
        if index < self.notices.len() {
            self.notices.remove(index);
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_mounted(&self) -> bool {
        self.live
    }

    pub fn appointments(&self) -> &[Appointment] {
        &self.appointments
    }

    pub fn doctors(&self) -> &[DoctorSummary] {
        &self.doctors
    }

    pub fn patients(&self) -> &[PatientSummary] {
        &self.patients
    }

    /// Doctor choices for the dialog selector, by name ascending.
    pub fn doctor_options(&self) -> Vec<&DoctorSummary> {
        filter_and_sort(&self.doctors, "", &SortState::new(DoctorSortKey::Name))
    }

    /// Patient choices for the dialog selector, by name ascending.
    pub fn patient_options(&self) -> Vec<&PatientSummary> {
        filter_and_sort(&self.patients, "", &SortState::new(PatientSortKey::Name))
    }

    pub fn calendar_events(&self) -> &[CalendarEvent] {
        &self.events
    }

    pub fn table_rows(&self) -> &[Appointment] {
        &self.table
    }

    pub fn table_sort(&self) -> &SortState<TableSortKey> {
        &self.table_sort
    }

    pub fn view_mode(&self) -> ViewMode {
        self.view_mode
    }

    pub fn session(&self) -> &EditSession {
        &self.session
    }

    pub fn notices(&self) -> &[ViewError] {
        &self.notices
    }

    pub fn is_loading(&self, resource: FetchResource) -> bool {
        self.loading.contains(&resource)
    }

    pub fn is_deleting(&self, id: AppointmentId) -> bool {
        self.pending_deletes.contains(&id)
    }

    /// Marks refresh `seq` as resolved. Returns `false` when a later refresh
    /// already resolved, so the older snapshot must not be applied.
    fn resolve_appointments(&mut self, seq: u64) -> bool {
        if seq <= self.appointments_resolved {
            debug!(
                seq,
                resolved = self.appointments_resolved,
                "discarding out-of-order appointment response"
            );
            return false;
        }
        self.appointments_resolved = seq;
        if seq >= self.appointments_requested {
            self.loading.remove(&FetchResource::Appointments);
        }
        true
    }

    fn recompute(&mut self) {
        self.events = calendar_events(&self.appointments);
        self.table = sorted_table(&self.appointments, &self.table_sort);
    }

    fn push_fetch_failure(&mut self, resource: FetchResource, detail: String) {
        warn!(resource = resource.label(), "fetch failed: {detail}");
        self.notices.push(ViewError::Fetch { resource, detail });
    }

    fn try_dispatch(&self, cmd: ViewCommand) -> Result<(), String> {
        let name = cmd.name();
        match self.cmd_tx.try_send(cmd) {
            Ok(()) => {
                debug!(command = name, generation = self.generation, "queued view command");
                Ok(())
            }
            Err(TrySendError::Full(_)) => {
                warn!(command = name, "view command queue is full");
                Err("Command queue is full; please retry".to_string())
            }
            Err(TrySendError::Disconnected(_)) => {
                warn!(command = name, "view worker disconnected");
                Err("Background worker disconnected; restart the application".to_string())
            }
        }
    }

    fn dispatch(&mut self, cmd: ViewCommand) -> bool {
        match self.try_dispatch(cmd) {
            Ok(()) => true,
            Err(reason) => {
                self.notices.push(ViewError::Dispatch(reason));
                false
            }
        }
    }
}

/// Keeps the first appointment seen for each id.
fn dedupe_appointments(list: Vec<Appointment>) -> Vec<Appointment> {
    let mut seen = HashSet::with_capacity(list.len());
    let mut unique = Vec::with_capacity(list.len());
    for appointment in list {
        if seen.insert(appointment.id) {
            unique.push(appointment);
        } else {
            warn!(
                appointment_id = appointment.id.0,
                "duplicate appointment id in collaborator response; keeping the first"
            );
        }
    }
    unique
}

#[cfg(test)]
#[path = "../tests/view_tests.rs"]
mod tests;
