//! Core domain logic for the survey service.
//! This crate is the single source of truth for survey persistence rules.

pub mod cancel;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use cancel::{ensure_active, Cancelled};
pub use logging::{
    default_log_level, init_logging, init_stderr_logging, logging_status, LogTarget,
};
pub use model::diff::{apply_fields, compare, compare_fields, writable_fields, Diffable};
pub use model::survey::{EntityError, Survey, SurveyData, SurveyId, SurveyRecord};
pub use model::template::SurveyTemplate;
pub use repo::survey_repo::{
    RepoError, RepoResult, SqliteSurveyRepository, SqliteSurveyTemplateRepository,
    SurveyRepository, SurveyTable,
};
pub use service::survey_service::SurveyService;
pub use tokio_util::sync::CancellationToken;

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
