//! Survey template record.
//!
//! Structurally identical to `Survey` but persisted in its own table.

use crate::model::diff::impl_diffable;
use crate::model::survey::{EntityError, Survey, SurveyId, SurveyRecord};
use serde::{Deserialize, Serialize};

/// Reusable survey skeleton.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SurveyTemplate {
    survey_id: SurveyId,
    pub name: String,
    pub description: String,
}

impl_diffable!(SurveyTemplate { name, description });

impl SurveyTemplate {
    /// Creates a template with a caller-provided identity.
    ///
    /// # Errors
    /// - `EntityError::InvalidArgument` when `survey_id` is nil.
    pub fn with_id(
        survey_id: SurveyId,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> Result<Self, EntityError> {
        if survey_id.is_nil() {
            return Err(EntityError::InvalidArgument(
                "survey template id must not be nil",
            ));
        }
        Ok(Self {
            survey_id,
            name: name.into(),
            description: description.into(),
        })
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
}

impl SurveyRecord for SurveyTemplate {
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

impl From<SurveyTemplate> for Survey {
    fn from(value: SurveyTemplate) -> Self {
        Survey::from_record(&value)
    }
}

impl From<Survey> for SurveyTemplate {
    fn from(value: Survey) -> Self {
        SurveyTemplate::from_record(&value)
    }
}

#[cfg(test)]
mod tests {
    use super::SurveyTemplate;
    use crate::model::survey::{Survey, SurveyRecord};
    use uuid::Uuid;

    #[test]
    fn conversions_preserve_identity_and_fields() {
        let template = SurveyTemplate::with_id(Uuid::new_v4(), "weekly", "pulse").unwrap();
        let survey = Survey::from(template.clone());
        assert_eq!(survey.survey_id(), template.survey_id());
        assert_eq!(survey.name, "weekly");
        assert_eq!(survey.description, "pulse");

        let back = SurveyTemplate::from(survey);
        assert_eq!(back, template);
    }

    #[test]
    fn with_id_rejects_nil_identity() {
        assert!(SurveyTemplate::with_id(Uuid::nil(), "a", "b").is_err());
    }

    #[test]
    fn read_contract_matches_fields() {
        let template = SurveyTemplate::with_id(Uuid::new_v4(), "n", "d").unwrap();
        assert_eq!(SurveyRecord::description(&template), "d");
    }
}
