//! Survey domain model.
//!
//! # Responsibility
//! - Define the records stored by core (`Survey`, `SurveyTemplate`).
//! - Define the creation payload (`SurveyData`) and the shared read contract.
//! - Provide the field diff utility that drives partial updates.
//!
//! # Invariants
//! - Every stored record is identified by a stable, non-nil `SurveyId`.
//! - Identity is never part of a record's writable field set.

pub mod diff;
pub mod survey;
pub mod template;
