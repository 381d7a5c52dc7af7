use chrono::Local;
use client_core::{AppointmentView, FetchResource, ViewCommand, ViewEvent, ViewMode};
use crossbeam_channel::{Receiver, Sender, TryRecvError};
use eframe::egui;

use crate::ui::{
    calendar::{self, CalendarAction, CalendarState},
    dialog::{self, DialogAction},
    directory::{self, DirectoryState},
    table::{self, TableAction},
};

pub struct SchedulerApp {
    view: AppointmentView,
    cmd_tx: Sender<ViewCommand>,
    event_rx: Receiver<ViewEvent>,
    api_base_url: String,
    calendar: CalendarState,
    directory: DirectoryState,
    directory_open: bool,
    worker_lost: bool,
}

impl SchedulerApp {
    pub fn new(
        cmd_tx: Sender<ViewCommand>,
        event_rx: Receiver<ViewEvent>,
        api_base_url: String,
    ) -> Self {
        let mut view = AppointmentView::new(cmd_tx.clone());
        view.mount();
        Self {
            view,
            cmd_tx,
            event_rx,
            api_base_url,
            calendar: CalendarState::new(Local::now().date_naive()),
            directory: DirectoryState::default(),
            directory_open: true,
            worker_lost: false,
        }
    }

    fn process_view_events(&mut self) {
        loop {
            match self.event_rx.try_recv() {
                Ok(event) => {
                    self.view.apply(event);
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    if !self.worker_lost {
                        tracing::error!("view worker event channel disconnected");
                        self.worker_lost = true;
                    }
                    break;
                }
            }
        }
    }

    fn show_top_bar(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("scheduler_top_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.heading("Appointments");
                ui.separator();

                let mut mode = self.view.view_mode();
                ui.selectable_value(&mut mode, ViewMode::Calendar, "Calendar");
                ui.selectable_value(&mut mode, ViewMode::Table, "Table");
                if mode != self.view.view_mode() {
                    self.view.set_view_mode(mode);
                }
                ui.separator();

                if ui.button("New appointment").clicked() {
                    self.view.open_for_create();
                }
                if ui.button("Refresh").clicked() {
                    self.view.refresh();
                }
                if self.view.is_loading(FetchResource::Appointments) {
                    ui.spinner();
                }

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    ui.toggle_value(&mut self.directory_open, "Directory");
                    ui.small(&self.api_base_url);
                });
            });
        });
    }

    fn show_status_banner(&mut self, ui: &mut egui::Ui) {
        if self.worker_lost {
            show_banner(ui, "Background worker stopped; restart the application.");
        }

        let mut dismissed = None;
        for (index, notice) in self.view.notices().iter().enumerate() {
            let message = match notice.detail() {
                "" => notice.to_string(),
                detail => format!("{notice}: {detail}"),
            };
            if show_dismissible_banner(ui, &message) {
                dismissed = Some(index);
            }
            ui.add_space(4.0);
        }
        if let Some(index) = dismissed {
            self.view.dismiss_notice(index);
        }
    }

    fn show_central(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default().show(ctx, |ui| {
            self.show_status_banner(ui);

            match self.view.view_mode() {
                ViewMode::Calendar => {
                    if let Some(CalendarAction::OpenCreate) =
                        calendar::show(ui, &mut self.calendar, self.view.calendar_events())
                    {
                        self.view.open_for_create();
                    }
                }
                ViewMode::Table => match table::show(ui, &self.view) {
                    Some(TableAction::SelectSort(key)) => self.view.select_sort_key(key),
                    Some(TableAction::SetDirection(direction)) => {
                        self.view.set_sort_direction(direction)
                    }
                    Some(TableAction::Edit(appointment)) => self.view.open_for_edit(&appointment),
                    Some(TableAction::Delete(id)) => self.view.delete_appointment(id),
                    None => {}
                },
            }
        });
    }
}

fn show_banner(ui: &mut egui::Ui, message: &str) {
    banner_frame().show(ui, |ui| {
        ui.label(egui::RichText::new(message).color(egui::Color32::WHITE));
    });
}

fn show_dismissible_banner(ui: &mut egui::Ui, message: &str) -> bool {
    let mut dismissed = false;
    banner_frame().show(ui, |ui| {
        ui.horizontal_wrapped(|ui| {
            ui.label(egui::RichText::new(message).color(egui::Color32::WHITE));
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui.button("Dismiss").clicked() {
                    dismissed = true;
                }
            });
        });
    });
    dismissed
}

fn banner_frame() -> egui::Frame {
    egui::Frame::NONE
        .fill(egui::Color32::from_rgb(111, 53, 53))
        .stroke(egui::Stroke::new(
            1.0,
            egui::Color32::from_rgb(175, 96, 96),
        ))
        .corner_radius(8.0)
        .inner_margin(egui::Margin::symmetric(10, 8))
}

impl eframe::App for SchedulerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.process_view_events();

        self.show_top_bar(ctx);

        if self.directory_open {
            egui::SidePanel::right("directory_panel")
                .resizable(true)
                .default_width(360.0)
                .show(ctx, |ui| {
                    directory::show(ui, &mut self.directory, &self.view);
                });
        }

        self.show_central(ctx);

        match dialog::show(ctx, &mut self.view) {
            Some(DialogAction::Submit) => self.view.submit(),
            Some(DialogAction::Cancel) => self.view.cancel_edit(),
            None => {}
        }

        ctx.request_repaint_after(std::time::Duration::from_millis(100));
    }
}

impl Drop for SchedulerApp {
    fn drop(&mut self) {
        self.view.teardown();
        let _ = self.cmd_tx.try_send(ViewCommand::Shutdown);
    }
}
