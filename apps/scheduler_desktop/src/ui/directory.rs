//! Read-only doctor and patient lists with search and sortable columns.

use client_core::{
    directory::{filter_and_sort, DoctorSortKey, PatientSortKey},
    sort::SortState,
    AppointmentView, FetchResource,
};
use eframe::egui;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DirectoryTab {
    #[default]
    Doctors,
    Patients,
}

#[derive(Default)]
pub struct DirectoryState {
    tab: DirectoryTab,
    doctor_query: String,
    patient_query: String,
    doctor_sort: SortState<DoctorSortKey>,
    patient_sort: SortState<PatientSortKey>,
}

pub fn show(ui: &mut egui::Ui, state: &mut DirectoryState, view: &AppointmentView) {
    ui.horizontal(|ui| {
        ui.selectable_value(&mut state.tab, DirectoryTab::Doctors, "Doctors");
        ui.selectable_value(&mut state.tab, DirectoryTab::Patients, "Patients");
    });
    ui.separator();

    match state.tab {
        DirectoryTab::Doctors => show_doctors(ui, state, view),
        DirectoryTab::Patients => show_patients(ui, state, view),
    }
}

fn show_doctors(ui: &mut egui::Ui, state: &mut DirectoryState, view: &AppointmentView) {
    ui.add(
        egui::TextEdit::singleline(&mut state.doctor_query)
            .hint_text("Search by name, specialization, email or phone"),
    );
    if view.is_loading(FetchResource::Doctors) {
        ui.spinner();
    }

    let rows = filter_and_sort(view.doctors(), &state.doctor_query, &state.doctor_sort);
    let mut clicked = None;
    egui::ScrollArea::vertical()
        .id_salt("doctor_directory_scroll")
        .show(ui, |ui| {
            egui::Grid::new("doctor_directory")
                .num_columns(DoctorSortKey::ALL.len())
                .striped(true)
                .show(ui, |ui| {
                    for key in DoctorSortKey::ALL {
                        if header(ui, key.label(), state.doctor_sort.indicator(key)) {
                            clicked = Some(key);
                        }
                    }
                    ui.end_row();

                    for doctor in &rows {
                        ui.label(&doctor.name);
                        ui.label(doctor.specialization.as_deref().unwrap_or("-"));
                        ui.label(doctor.email.as_deref().unwrap_or("-"));
                        ui.label(doctor.phone.as_deref().unwrap_or("-"));
                        ui.end_row();
                    }
                });
        });

    if let Some(key) = clicked {
        state.doctor_sort.select(key);
    }
}

fn show_patients(ui: &mut egui::Ui, state: &mut DirectoryState, view: &AppointmentView) {
    ui.add(egui::TextEdit::singleline(&mut state.patient_query).hint_text("Search by name"));
    if view.is_loading(FetchResource::Patients) {
        ui.spinner();
    }

    let rows = filter_and_sort(view.patients(), &state.patient_query, &state.patient_sort);
    let mut clicked = None;
    egui::ScrollArea::vertical()
        .id_salt("patient_directory_scroll")
        .show(ui, |ui| {
            egui::Grid::new("patient_directory")
                .num_columns(PatientSortKey::ALL.len())
                .striped(true)
                .show(ui, |ui| {
                    for key in PatientSortKey::ALL {
                        if header(ui, key.label(), state.patient_sort.indicator(key)) {
                            clicked = Some(key);
                        }
                    }
                    ui.end_row();

                    for patient in &rows {
                        ui.label(&patient.name);
                        ui.label(patient.email.as_deref().unwrap_or("-"));
                        ui.label(patient.phone.as_deref().unwrap_or("-"));
                        ui.end_row();
                    }
                });
        });

    if let Some(key) = clicked {
        state.patient_sort.select(key);
    }
}

fn header(ui: &mut egui::Ui, label: &str, indicator: &str) -> bool {
    let text = format!("{label} {indicator}");
    ui.button(egui::RichText::new(text.trim_end()).strong())
        .clicked()
}
