//! Bridge between the UI thread and the background worker.

pub mod runtime;
