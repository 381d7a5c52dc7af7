//! Appointment calendar/table view: projections, dialog session, state owner and worker.

pub mod edit_session;
pub mod projection;
pub mod view;
pub mod worker;
