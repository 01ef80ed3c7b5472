use actix_web::{web, HttpResponse};

use crate::api::failure;
use crate::models::{CreateSurveyRequest, Survey, SurveyWithInvitations, UpdateSurveyRequest};
use crate::services::survey_service;
use crate::state::AppState;

/// POST /api/surveys - New survey, status `setup`
#[utoipa::path(
    post,
    path = "/api/surveys",
    tag = "Surveys",
    request_body = CreateSurveyRequest,
    responses(
        (status = 201, description = "Survey created", body = Survey),
        (status = 400, description = "Validation error"),
        (status = 404, description = "User not found")
    )
)]
pub async fn create_survey(
    state: web::Data<AppState>,
    body: web::Json<CreateSurveyRequest>,
) -> HttpResponse {
    log::info!("📋 POST /surveys");

    match survey_service::create_survey(state.store.as_ref(), body.into_inner()).await {
        Ok(survey) => HttpResponse::Created().json(serde_json::json!({
            "success": true,
            "survey": survey
        })),
        Err(e) => failure("Failed to create survey", e),
    }
}

/// GET /api/surveys/{id} - Survey with its invitations
#[utoipa::path(
    get,
    path = "/api/surveys/{id}",
    tag = "Surveys",
    params(("id" = String, Path, description = "Survey id")),
    responses(
        (status = 200, description = "Survey with invitations", body = SurveyWithInvitations),
        (status = 404, description = "Survey not found")
    )
)]
pub async fn get_survey(state: web::Data<AppState>, path: web::Path<String>) -> HttpResponse {
    let survey_id = path.into_inner();

    match survey_service::get_survey_with_invitations(state.store.as_ref(), &survey_id).await {
        Ok(survey) => HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "survey": survey
        })),
        Err(e) => failure("Failed to fetch survey", e),
    }
}

/// PUT /api/surveys/{id} - Edit title, focus areas, mentor or self-assessment
#[utoipa::path(
    put,
    path = "/api/surveys/{id}",
    tag = "Surveys",
    params(("id" = String, Path, description = "Survey id")),
    request_body = UpdateSurveyRequest,
    responses(
        (status = 200, description = "Updated survey", body = Survey),
        (status = 400, description = "Validation error or survey already completed"),
        (status = 404, description = "Survey not found")
    )
)]
pub async fn update_survey(
    state: web::Data<AppState>,
    path: web::Path<String>,
    body: web::Json<UpdateSurveyRequest>,
) -> HttpResponse {
    let survey_id = path.into_inner();
    log::info!("📝 PUT /surveys/{}", survey_id);

    match survey_service::update_survey(state.store.as_ref(), &survey_id, body.into_inner()).await
    {
        Ok(survey) => HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "survey": survey
        })),
        Err(e) => failure("Failed to update survey", e),
    }
}
