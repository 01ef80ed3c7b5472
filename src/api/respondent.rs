// Respondent flow. The path token is the respondent's only credential and is
// never written to the logs.

use actix_web::{web, HttpResponse};

use crate::api::failure;
use crate::models::{AnswerReceipt, SubmitAnswerRequest};
use crate::services::survey_service;
use crate::state::AppState;

/// GET /api/survey/{token} - Survey title, subject and ordered questions
#[utoipa::path(
    get,
    path = "/api/survey/{token}",
    tag = "Respondent",
    params(("token" = String, Path, description = "Invitation token")),
    responses(
        (status = 200, description = "Invitation status, survey title, subject name, focus areas and questions"),
        (status = 404, description = "Unknown token")
    )
)]
pub async fn get_survey_for_respondent(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> HttpResponse {
    let token = path.into_inner();

    match survey_service::respondent_view(state.store.as_ref(), &token).await {
        Ok(view) => HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "survey": view
        })),
        Err(e) => failure("Failed to open survey", e),
    }
}

/// POST /api/survey/{token}/responses - Record one answer
#[utoipa::path(
    post,
    path = "/api/survey/{token}/responses",
    tag = "Respondent",
    params(("token" = String, Path, description = "Invitation token")),
    request_body = SubmitAnswerRequest,
    responses(
        (status = 201, description = "Answer recorded", body = AnswerReceipt),
        (status = 400, description = "Unknown question, invalid answer or invitation already completed"),
        (status = 404, description = "Unknown token")
    )
)]
pub async fn submit_response(
    state: web::Data<AppState>,
    path: web::Path<String>,
    body: web::Json<SubmitAnswerRequest>,
) -> HttpResponse {
    let token = path.into_inner();
    let request = body.into_inner();
    log::info!("📨 POST /survey/:token/responses ({})", request.question_id);

    match survey_service::submit_answer(state.store.as_ref(), &token, request).await {
        Ok(receipt) => {
            state.metrics.response_recorded();
            HttpResponse::Created().json(serde_json::json!({
                "success": true,
                "response": receipt
            }))
        }
        Err(e) => failure("Failed to record response", e),
    }
}

/// POST /api/survey/{token}/complete - Finish the survey for this respondent
#[utoipa::path(
    post,
    path = "/api/survey/{token}/complete",
    tag = "Respondent",
    params(("token" = String, Path, description = "Invitation token")),
    responses(
        (status = 200, description = "Invitation completed (idempotent)"),
        (status = 404, description = "Unknown token")
    )
)]
pub async fn complete_survey(state: web::Data<AppState>, path: web::Path<String>) -> HttpResponse {
    let token = path.into_inner();
    log::info!("🏁 POST /survey/:token/complete");

    match survey_service::complete_by_token(state.store.as_ref(), &token).await {
        Ok((invitation, changed)) => {
            if changed {
                state.metrics.invitation_completed();
            }
            HttpResponse::Ok().json(serde_json::json!({
                "success": true,
                "status": invitation.status,
                "completedAt": invitation.completed_at
            }))
        }
        Err(e) => failure("Failed to complete survey", e),
    }
}
