//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define CRUD contracts over survey-shaped tables.
//! - Isolate SQLite query details from service orchestration.
//!
//! # Invariants
//! - Repository APIs return semantic errors (`NotFound`, `Conflict`,
//!   `Cancelled`) in addition to DB transport errors.
//! - Every returned record is an owned, detached copy.

pub mod survey_repo;
