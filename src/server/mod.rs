//! HTTP API exposing the workbook translator

pub mod api;

pub use api::{router, run_server, AppState};
