//! Survey use-case service.
//!
//! # Responsibility
//! - Provide stable CRUD entry points for survey callers.
//! - Drive partial updates through the field diff utility.
//!
//! # Invariants
//! - Service APIs never bypass repository persistence contracts.
//! - Partial updates write only the fields that actually changed.

use crate::model::diff::compare_fields;
use crate::model::survey::{Survey, SurveyData, SurveyId};
use crate::repo::survey_repo::{RepoError, RepoResult, SurveyRepository};
use log::info;
use tokio_util::sync::CancellationToken;

/// Use-case service wrapper for survey CRUD operations.
pub struct SurveyService<R: SurveyRepository<Survey>> {
    repo: R,
}

impl<R: SurveyRepository<Survey>> SurveyService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Creates a survey with a freshly generated identity.
    pub fn add_new_survey(
        &self,
        data: SurveyData,
        cancel: &CancellationToken,
    ) -> RepoResult<Survey> {
        let survey = self.repo.add(&Survey::new(data), cancel)?;
        info!(
            "event=survey_created module=service status=ok survey_id={}",
            survey.survey_id()
        );
        Ok(survey)
    }

    /// Replaces name and description of an existing survey.
    ///
    /// Returns repository-level not-found errors unchanged.
    pub fn update_survey(&self, survey: &Survey, cancel: &CancellationToken) -> RepoResult<()> {
        self.repo.update(survey, cancel)
    }

    /// Updates only the listed fields that differ from stored state.
    ///
    /// # Contract
    /// - Returns the names of the fields that were written, in caller order.
    /// - Issues no write when nothing changed.
    /// - Returns `NotFound` when no survey has the candidate's identity.
    pub fn update_survey_fields(
        &self,
        survey: &Survey,
        fields: &[&str],
        cancel: &CancellationToken,
    ) -> RepoResult<Vec<&'static str>> {
        let id = survey.survey_id();
        let stored = self
            .repo
            .get(id, cancel)?
            .ok_or(RepoError::NotFound(id))?;

        let changed = compare_fields(&stored, survey, fields);
        if changed.is_empty() {
            return Ok(changed);
        }

        self.repo.update_fields(survey, &changed, cancel)?;
        info!(
            "event=survey_updated module=service status=ok survey_id={id} fields={}",
            changed.join(",")
        );
        Ok(changed)
    }

    /// Deletes a survey by identity; absent identities are ignored.
    pub fn delete_survey(&self, id: SurveyId, cancel: &CancellationToken) -> RepoResult<()> {
        self.repo.delete(id, cancel)
    }

    /// Gets one survey by identity.
    pub fn get_survey(
        &self,
        id: SurveyId,
        cancel: &CancellationToken,
    ) -> RepoResult<Option<Survey>> {
        self.repo.get(id, cancel)
    }

    /// Lists every survey ordered by identity.
    pub fn get_surveys(&self, cancel: &CancellationToken) -> RepoResult<Vec<Survey>> {
        self.repo.list(cancel)
    }
}
