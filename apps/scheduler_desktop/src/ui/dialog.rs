//! Create/edit appointment window.

use client_core::{AppointmentView, SaveTarget};
use eframe::egui;

pub enum DialogAction {
    Submit,
    Cancel,
}

struct SelectorOption {
    id: String,
    label: String,
}

pub fn show(ctx: &egui::Context, view: &mut AppointmentView) -> Option<DialogAction> {
    let session = view.session();
    let target = session.target()?;
    let submitting = session.is_submitting();
    let inline_error = session.error().map(|err| match err.detail() {
        "" => err.to_string(),
        detail if err.to_string() == detail => detail.to_string(),
        detail => format!("{err}: {detail}"),
    });

    let doctors: Vec<SelectorOption> = view
        .doctor_options()
        .into_iter()
        .map(|doctor| SelectorOption {
            id: doctor.id.to_string(),
            label: doctor.name.clone(),
        })
        .collect();
    let patients: Vec<SelectorOption> = view
        .patient_options()
        .into_iter()
        .map(|patient| SelectorOption {
            id: patient.id.to_string(),
            label: patient.name.clone(),
        })
        .collect();

    let title = match target {
        SaveTarget::Create => "New appointment",
        SaveTarget::Update(_) => "Edit appointment",
    };

    let mut action = None;
    let mut open = true;
    egui::Window::new(title)
        .collapsible(false)
        .resizable(false)
        .open(&mut open)
        .anchor(egui::Align2::CENTER_CENTER, egui::vec2(0.0, 0.0))
        .show(ctx, |ui| {
            let form = view.edit_form_mut();

            ui.add_enabled_ui(!submitting, |ui| {
                egui::Grid::new("appointment_form")
                    .num_columns(2)
                    .spacing([12.0, 8.0])
                    .show(ui, |ui| {
                        ui.label("Doctor");
                        selector(ui, "doctor_selector", &mut form.doctor_id, &doctors);
                        ui.end_row();

                        ui.label("Patient");
                        selector(ui, "patient_selector", &mut form.patient_id, &patients);
                        ui.end_row();

                        ui.label("Date");
                        ui.add(egui::TextEdit::singleline(&mut form.date).hint_text("YYYY-MM-DD"));
                        ui.end_row();

                        ui.label("Time");
                        ui.add(egui::TextEdit::singleline(&mut form.time).hint_text("HH:MM"));
                        ui.end_row();
                    });
            });

            if let Some(message) = &inline_error {
                ui.colored_label(ui.visuals().error_fg_color, message);
            }

            ui.separator();
            ui.horizontal(|ui| {
                let save_label = if submitting { "Saving…" } else { "Save" };
                if ui
                    .add_enabled(!submitting, egui::Button::new(save_label))
                    .clicked()
                {
                    action = Some(DialogAction::Submit);
                }
                if ui.button("Cancel").clicked() {
                    action = Some(DialogAction::Cancel);
                }
                if submitting {
                    ui.spinner();
                }
            });
        });

    if !open {
        action = Some(DialogAction::Cancel);
    }
    action
}

/// Picks an id from `options`; ids not in the list stay editable as free text.
fn selector(ui: &mut egui::Ui, id_salt: &str, value: &mut String, options: &[SelectorOption]) {
    let selected_text = options
        .iter()
        .find(|option| option.id == *value)
        .map(|option| format!("{} ({})", option.label, option.id))
        .unwrap_or_else(|| {
            if value.is_empty() {
                "Select…".to_string()
            } else {
                value.clone()
            }
        });

    ui.horizontal(|ui| {
        egui::ComboBox::from_id_salt(id_salt)
            .selected_text(selected_text)
            .width(220.0)
            .show_ui(ui, |ui| {
                for option in options {
                    ui.selectable_value(
                        value,
                        option.id.clone(),
                        format!("{} ({})", option.label, option.id),
                    );
                }
            });
        ui.add(
            egui::TextEdit::singleline(value)
                .hint_text("id")
                .desired_width(48.0),
        );
    });
}
