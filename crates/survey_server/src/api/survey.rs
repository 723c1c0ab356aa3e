//! Survey CRUD handlers.
//!
//! # Contract
//! - `GET /api/survey` lists every survey as `{ "surveys": [...] }`.
//! - `GET /api/survey/{id}` returns one survey or `404`.
//! - `POST /api/survey` creates a survey from `{ name, description }`.
//! - `PUT /api/survey/{id}` writes the changed fields and returns `204`.
//! - `DELETE /api/survey/{id}` returns `204` whether or not the survey existed.

use crate::api::error::ApiError;
use crate::api::extract::JsonBody;
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use survey_core::{writable_fields, Survey, SurveyData, SurveyId};
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize)]
pub struct SurveysResponse {
    pub surveys: Vec<Survey>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/survey", get(list_surveys).post(create_survey))
        .route("/api/survey/", get(list_surveys))
        .route(
            "/api/survey/{survey_id}",
            get(get_survey).put(update_survey).delete(delete_survey),
        )
}

pub async fn list_surveys(
    State(state): State<AppState>,
) -> Result<Json<SurveysResponse>, ApiError> {
    let surveys = state
        .with_service(|service, cancel| service.get_surveys(cancel))
        .await?;
    Ok(Json(SurveysResponse { surveys }))
}

pub async fn get_survey(
    State(state): State<AppState>,
    Path(survey_id): Path<String>,
) -> Result<Json<Survey>, ApiError> {
    let id = parse_survey_id(&survey_id)?;
    state
        .with_service(move |service, cancel| service.get_survey(id, cancel))
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("survey not found: {id}")))
}

pub async fn create_survey(
    State(state): State<AppState>,
    JsonBody(data): JsonBody<SurveyData>,
) -> Result<(StatusCode, Json<Survey>), ApiError> {
    let survey = state
        .with_service(move |service, cancel| service.add_new_survey(data, cancel))
        .await?;
    Ok((StatusCode::CREATED, Json(survey)))
}

pub async fn update_survey(
    State(state): State<AppState>,
    Path(survey_id): Path<String>,
    JsonBody(survey): JsonBody<Survey>,
) -> Result<StatusCode, ApiError> {
    let id = parse_survey_id(&survey_id)?;
    if survey.survey_id() != id {
        return Err(ApiError::BadRequest(format!(
            "body surveyId {} does not match path id {id}",
            survey.survey_id()
        )));
    }

    state
        .with_service(move |service, cancel| {
            service.update_survey_fields(&survey, &writable_fields::<Survey>(), cancel)
        })
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete_survey(
    State(state): State<AppState>,
    Path(survey_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = parse_survey_id(&survey_id)?;
    state
        .with_service(move |service, cancel| service.delete_survey(id, cancel))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

fn parse_survey_id(value: &str) -> Result<SurveyId, ApiError> {
    let id = Uuid::parse_str(value)
        .map_err(|_| ApiError::BadRequest(format!("invalid survey id `{value}`")))?;
    if id.is_nil() {
        return Err(ApiError::BadRequest("survey id must not be nil".to_string()));
    }
    Ok(id)
}
