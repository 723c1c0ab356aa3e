//! Survey record and creation payload.
//!
//! # Responsibility
//! - Define the canonical survey record persisted by core.
//! - Provide explicit conversions between survey-shaped records.
//!
//! # Invariants
//! - `survey_id` is assigned once and never changes for the record lifetime.
//! - The nil UUID is never a valid survey identity.
//! - Only `name` and `description` are writable through the diff utility.

use crate::model::diff::impl_diffable;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier shared by surveys and survey templates.
pub type SurveyId = Uuid;

/// Errors raised by record constructors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntityError {
    /// A required argument was missing or empty.
    InvalidArgument(&'static str),
}

impl Display for EntityError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidArgument(message) => write!(f, "invalid argument: {message}"),
        }
    }
}

impl Error for EntityError {}

/// Read contract implemented by every survey-shaped record.
///
/// Lets one record be materialized as another stored shape without the
/// storage layer depending on the caller's concrete type.
pub trait SurveyRecord {
    fn survey_id(&self) -> SurveyId;
    fn name(&self) -> &str;
    fn description(&self) -> &str;
}

/// Creation payload for a survey that has no identity yet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SurveyData {
    pub name: String,
    pub description: String,
}

impl SurveyData {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
        }
    }
}

/// Canonical survey record.
///
/// Serialized as `{ surveyId, name, description }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Survey {
    survey_id: SurveyId,
    pub name: String,
    pub description: String,
}

impl_diffable!(Survey { name, description });

impl Survey {
    /// Creates a survey from a creation payload with a generated identity.
    pub fn new(data: SurveyData) -> Self {
        Self {
            survey_id: Uuid::new_v4(),
            name: data.name,
            description: data.description,
        }
    }

    /// Creates a survey with a caller-provided identity.
    ///
    /// # Errors
    /// - `EntityError::InvalidArgument` when `survey_id` is nil.
    pub fn with_id(
        survey_id: SurveyId,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> Result<Self, EntityError> {
        let survey = Self {
            survey_id,
            name: name.into(),
            description: description.into(),
        };
        survey.validate()?;
        Ok(survey)
    }

    /// Copies every field of any survey-shaped record.
    pub fn from_record(record: &impl SurveyRecord) -> Self {
        Self {
            survey_id: record.survey_id(),
            name: record.name().to_string(),
            description: record.description().to_string(),
        }
    }

    pub fn survey_id(&self) -> SurveyId {
        self.survey_id
    }

    /// Returns the writable payload of this survey.
    pub fn data(&self) -> SurveyData {
        SurveyData::new(self.name.clone(), self.description.clone())
    }

    /// Checks record invariants that serde cannot express.
    pub fn validate(&self) -> Result<(), EntityError> {
        if self.survey_id.is_nil() {
            return Err(EntityError::InvalidArgument("survey id must not be nil"));
        }
        Ok(())
    }
}

impl SurveyRecord for Survey {
    fn survey_id(&self) -> SurveyId {
        self.survey_id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }
}

impl From<SurveyData> for Survey {
    fn from(value: SurveyData) -> Self {
        Self::new(value)
    }
}

impl From<&Survey> for SurveyData {
    fn from(value: &Survey) -> Self {
        value.data()
    }
}

#[cfg(test)]
mod tests {
    use super::{EntityError, Survey, SurveyData, SurveyRecord};
    use crate::model::diff::{compare, writable_fields};
    use uuid::Uuid;

    #[test]
    fn new_assigns_fresh_non_nil_identity() {
        let first = Survey::new(SurveyData::new("Q1", "d1"));
        let second = Survey::new(SurveyData::new("Q1", "d1"));
        assert!(!first.survey_id().is_nil());
        assert_ne!(first.survey_id(), second.survey_id());
        assert_eq!(first.data(), second.data());
    }

    #[test]
    fn with_id_rejects_nil_identity() {
        let err = Survey::with_id(Uuid::nil(), "name", "description").unwrap_err();
        assert!(matches!(err, EntityError::InvalidArgument(_)));
    }

    #[test]
    fn identity_is_not_writable() {
        assert_eq!(writable_fields::<Survey>(), vec!["name", "description"]);

        let reference = Survey::with_id(Uuid::new_v4(), "same", "same").unwrap();
        let candidate = Survey::with_id(Uuid::new_v4(), "same", "same").unwrap();
        assert!(compare(&reference, &candidate).is_empty());
    }

    #[test]
    fn from_record_copies_every_field() {
        let source = Survey::with_id(Uuid::new_v4(), "copy me", "fully").unwrap();
        let copy = Survey::from_record(&source);
        assert_eq!(copy, source);
        assert_eq!(SurveyRecord::name(&copy), "copy me");
    }
}
