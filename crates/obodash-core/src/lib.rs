// Public fallible APIs in this crate share one concrete error contract (`DashError`).
// Repeating per-function `# Errors` boilerplate obscures behavior more than it clarifies.
#![allow(
    clippy::missing_errors_doc,
    reason = "crate-wide fallible API uses one explicit error type; per-item boilerplate would duplicate contract"
)]

pub mod checks;
pub mod client;
pub mod config;
pub mod engine;
pub mod error;
pub mod fetch;
pub mod gate;
pub(crate) mod host_tools;
pub mod models;
pub mod pipeline;
pub mod registry;
pub mod render;
pub mod score;
pub mod store;
pub mod summarize;
pub mod summary;
pub mod usage;

pub use client::Dashboard;
pub use error::{DashError, Result};
