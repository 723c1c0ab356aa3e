//! REST surface for survey management.
//!
//! # Responsibility
//! - Expose survey CRUD under `/api/survey` as JSON over HTTP.
//! - Bridge async request handling onto the synchronous core store.

pub mod api;
pub mod config;
pub mod state;

pub use api::{router, serve};
pub use config::{ConfigError, ServerConfig};
pub use state::AppState;
