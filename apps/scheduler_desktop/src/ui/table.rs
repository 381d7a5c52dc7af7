use client_core::{
    appointments::projection::{display_date, display_time},
    sort::{SortDirection, SortState},
    AppointmentView, TableSortKey,
};
use eframe::egui;
use shared::domain::{Appointment, AppointmentId, DoctorId, PatientId};

pub enum TableAction {
    SelectSort(TableSortKey),
    SetDirection(SortDirection),
    Edit(Appointment),
    Delete(AppointmentId),
}

pub fn show(ui: &mut egui::Ui, view: &AppointmentView) -> Option<TableAction> {
    let mut action = None;
    let sort = view.table_sort();

    ui.horizontal(|ui| {
        ui.label("Sort by");
        let mut key = sort.key();
        egui::ComboBox::from_id_salt("table_sort_key")
            .selected_text(key.label())
            .show_ui(ui, |ui| {
                for candidate in TableSortKey::ALL {
                    ui.selectable_value(&mut key, candidate, candidate.label());
                }
            });
        if key != sort.key() {
            action = Some(TableAction::SelectSort(key));
        }

        let mut direction = sort.direction();
        ui.selectable_value(&mut direction, SortDirection::Ascending, "Asc");
        ui.selectable_value(&mut direction, SortDirection::Descending, "Desc");
        if direction != sort.direction() {
            action = Some(TableAction::SetDirection(direction));
        }
    });
    ui.separator();

    if view.table_rows().is_empty() {
        ui.label("No appointments.");
        return action;
    }

    egui::ScrollArea::vertical().show(ui, |ui| {
        egui::Grid::new("appointments_table")
            .num_columns(5)
            .striped(true)
            .spacing([24.0, 6.0])
            .show(ui, |ui| {
                for key in TableSortKey::ALL {
                    if sort_header(ui, sort, key) {
                        action = Some(TableAction::SelectSort(key));
                    }
                }
                ui.label(egui::RichText::new("Time").strong());
                ui.label(egui::RichText::new("Actions").strong());
                ui.end_row();

                for appointment in view.table_rows() {
                    ui.label(patient_label(view, appointment.patient_id));
                    ui.label(doctor_label(view, appointment.doctor_id));
                    ui.label(display_date(appointment.appointment_date_time));
                    ui.label(display_time(appointment.appointment_date_time));
                    ui.horizontal(|ui| {
                        if ui.button("Edit").clicked() {
                            action = Some(TableAction::Edit(*appointment));
                        }
                        let deleting = view.is_deleting(appointment.id);
                        let label = if deleting { "Deleting…" } else { "Delete" };
                        if ui.add_enabled(!deleting, egui::Button::new(label)).clicked() {
                            action = Some(TableAction::Delete(appointment.id));
                        }
                    });
                    ui.end_row();
                }
            });
    });

    action
}

fn sort_header(ui: &mut egui::Ui, sort: &SortState<TableSortKey>, key: TableSortKey) -> bool {
    let text = format!("{} {}", key.label(), sort.indicator(key));
    ui.button(egui::RichText::new(text.trim_end()).strong())
        .clicked()
}

fn patient_label(view: &AppointmentView, id: PatientId) -> String {
    match view.patients().iter().find(|patient| patient.id == id) {
        Some(patient) => format!("{id} · {}", patient.name),
        None => id.to_string(),
    }
}

fn doctor_label(view: &AppointmentView, id: DoctorId) -> String {
    match view.doctors().iter().find(|doctor| doctor.id == id) {
        Some(doctor) => format!("{id} · {}", doctor.name),
        None => id.to_string(),
    }
}
