//! Week grid: one column per day, one row per half-hour slot.

use std::ops::Range;

use chrono::{Datelike, Duration, Local, NaiveDate};
use client_core::{
    appointments::projection::{events_in_week, slot_index, slot_start, week_start, SLOTS_PER_DAY},
    CalendarEvent,
};
use eframe::egui;

/// 07:00 to 19:00 is always shown; the range widens to fit earlier or later events.
const DEFAULT_FIRST_SLOT: usize = 14;
const DEFAULT_END_SLOT: usize = 38;

const DAY_COLUMN_WIDTH: f32 = 140.0;
const SLOT_ROW_HEIGHT: f32 = 22.0;

pub enum CalendarAction {
    OpenCreate,
}

pub struct CalendarState {
    week_start: NaiveDate,
}

impl CalendarState {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            week_start: week_start(today),
        }
    }

    pub fn week_start(&self) -> NaiveDate {
        self.week_start
    }

    pub fn previous_week(&mut self) {
        self.week_start -= Duration::days(7);
    }

    pub fn next_week(&mut self) {
        self.week_start += Duration::days(7);
    }

    pub fn go_to(&mut self, date: NaiveDate) {
        self.week_start = week_start(date);
    }
}

pub fn visible_slot_range(events: &[&CalendarEvent]) -> Range<usize> {
    let mut first = DEFAULT_FIRST_SLOT;
    let mut end = DEFAULT_END_SLOT;
    for event in events {
        let slot = slot_index(event.start.time());
        first = first.min(slot);
        end = end.max(slot + 1);
    }
    first..end.min(SLOTS_PER_DAY)
}

pub fn show(
    ui: &mut egui::Ui,
    state: &mut CalendarState,
    events: &[CalendarEvent],
) -> Option<CalendarAction> {
    let mut action = None;

    ui.horizontal(|ui| {
        if ui.button("◀ Previous").clicked() {
            state.previous_week();
        }
        if ui.button("Today").clicked() {
            state.go_to(Local::now().date_naive());
        }
        if ui.button("Next ▶").clicked() {
            state.next_week();
        }
        let last_day = state.week_start() + Duration::days(6);
        ui.label(
            egui::RichText::new(format!(
                "{} to {}",
                state.week_start().format("%b %-d"),
                last_day.format("%b %-d, %Y")
            ))
            .strong(),
        );
    });
    ui.separator();

    let week = events_in_week(events, state.week_start());
    let days: Vec<NaiveDate> = (0..7)
        .map(|offset| state.week_start() + Duration::days(offset))
        .collect();
    let today = Local::now().date_naive();

    egui::ScrollArea::both().show(ui, |ui| {
        egui::Grid::new("calendar_week_grid")
            .num_columns(8)
            .min_col_width(DAY_COLUMN_WIDTH)
            .min_row_height(SLOT_ROW_HEIGHT)
            .striped(true)
            .show(ui, |ui| {
                ui.label("");
                for day in &days {
                    let text = egui::RichText::new(day.format("%a %-d").to_string()).strong();
                    if *day == today {
                        ui.label(text.underline());
                    } else {
                        ui.label(text);
                    }
                }
                ui.end_row();

                for slot in visible_slot_range(&week) {
                    match slot_start(slot) {
                        Some(time) => ui.label(time.format("%H:%M").to_string()),
                        None => ui.label(""),
                    };

                    for day in &days {
                        let in_cell = cell_events(&week, *day, slot);

                        if in_cell.is_empty() {
                            let (_, response) = ui.allocate_exact_size(
                                egui::vec2(DAY_COLUMN_WIDTH, SLOT_ROW_HEIGHT),
                                egui::Sense::click(),
                            );
                            if response
                                .on_hover_text("Click to create an appointment")
                                .clicked()
                            {
                                action = Some(CalendarAction::OpenCreate);
                            }
                        } else {
                            ui.horizontal(|ui| {
                                ui.vertical(|ui| {
                                    for event in in_cell {
                                        show_event(ui, event);
                                    }
                                });
                                if ui
                                    .small_button("+")
                                    .on_hover_text("Create another appointment in this slot")
                                    .clicked()
                                {
                                    action = Some(CalendarAction::OpenCreate);
                                }
                            });
                        }
                    }
                    ui.end_row();
                }
            });
    });

    action
}

/// Events starting in the given day and half-hour slot, in list order.
fn cell_events<'a>(
    week: &[&'a CalendarEvent],
    day: NaiveDate,
    slot: usize,
) -> Vec<&'a CalendarEvent> {
    week.iter()
        .copied()
        .filter(|event| event.start.date() == day && slot_index(event.start.time()) == slot)
        .collect()
}

fn show_event(ui: &mut egui::Ui, event: &CalendarEvent) {
    let fill = ui.visuals().selection.bg_fill;
    egui::Frame::NONE
        .fill(fill)
        .corner_radius(4.0)
        .inner_margin(egui::Margin::symmetric(6, 2))
        .show(ui, |ui| {
            ui.label(egui::RichText::new(&event.title).small());
        })
        .response
        .on_hover_text(format!(
            "{}\n{} to {} on {}",
            event.title,
            event.start.format("%H:%M"),
            event.end.format("%H:%M"),
            event.start.date().weekday()
        ));
}
