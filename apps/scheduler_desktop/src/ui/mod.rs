//! UI layer: app shell, calendar and table presentations, edit dialog, directory panel.

pub mod app;
pub mod calendar;
pub mod dialog;
pub mod directory;
pub mod table;

pub use app::SchedulerApp;
