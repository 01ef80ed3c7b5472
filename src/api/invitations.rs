use actix_web::{web, HttpResponse};

use crate::api::failure;
use crate::models::{Invitation, NewInvitation};
use crate::services::{mail_service, survey_service};
use crate::state::AppState;
use crate::utils::error::AppError;

/// POST /api/surveys/{id}/invitations - Bulk-create invitations (1-10 contacts)
#[utoipa::path(
    post,
    path = "/api/surveys/{id}/invitations",
    tag = "Invitations",
    params(("id" = String, Path, description = "Survey id")),
    request_body = [NewInvitation],
    responses(
        (status = 201, description = "Invitations created", body = [Invitation]),
        (status = 400, description = "Invalid contacts or survey already completed"),
        (status = 404, description = "Survey not found")
    )
)]
pub async fn create_invitations(
    state: web::Data<AppState>,
    path: web::Path<String>,
    body: web::Json<Vec<NewInvitation>>,
) -> HttpResponse {
    let survey_id = path.into_inner();
    let contacts = body.into_inner();
    log::info!("✉️  POST /surveys/{}/invitations ({} contacts)", survey_id, contacts.len());

    match survey_service::add_invitations(state.store.as_ref(), &survey_id, contacts).await {
        Ok(invitations) => HttpResponse::Created().json(serde_json::json!({
            "success": true,
            "total": invitations.len(),
            "invitations": invitations
        })),
        Err(e) => failure("Failed to create invitations", e),
    }
}

/// POST /api/surveys/{id}/send-invitations - Email every pending invitation
#[utoipa::path(
    post,
    path = "/api/surveys/{id}/send-invitations",
    tag = "Invitations",
    params(("id" = String, Path, description = "Survey id")),
    responses(
        (status = 200, description = "Count of sent and failed emails"),
        (status = 404, description = "Survey not found")
    )
)]
pub async fn send_invitations(state: web::Data<AppState>, path: web::Path<String>) -> HttpResponse {
    let survey_id = path.into_inner();
    log::info!("📧 POST /surveys/{}/send-invitations", survey_id);

    match mail_service::send_survey_invitations(
        state.store.as_ref(),
        state.mailer.as_ref(),
        &state.base_url,
        &survey_id,
    )
    .await
    {
        Ok(summary) => {
            state.metrics.emails(summary.sent, summary.failed);
            HttpResponse::Ok().json(serde_json::json!({
                "success": true,
                "sent": summary.sent,
                "failed": summary.failed
            }))
        }
        Err(e) => failure("Failed to send invitations", e),
    }
}

/// POST /api/invitations/{id}/remind - Reminder for a non-completed invitation
#[utoipa::path(
    post,
    path = "/api/invitations/{id}/remind",
    tag = "Invitations",
    params(("id" = String, Path, description = "Invitation id")),
    responses(
        (status = 200, description = "Reminder sent"),
        (status = 400, description = "Invitation already completed"),
        (status = 404, description = "Invitation not found"),
        (status = 500, description = "Mailer failure")
    )
)]
pub async fn send_reminder(state: web::Data<AppState>, path: web::Path<String>) -> HttpResponse {
    let invitation_id = path.into_inner();
    log::info!("🔔 POST /invitations/{}/remind", invitation_id);

    match mail_service::send_reminder(
        state.store.as_ref(),
        state.mailer.as_ref(),
        &state.base_url,
        &invitation_id,
    )
    .await
    {
        Ok(()) => {
            state.metrics.emails(1, 0);
            HttpResponse::Ok().json(serde_json::json!({
                "success": true,
                "message": "Reminder sent"
            }))
        }
        Err(e) => {
            if matches!(e, AppError::Upstream(_)) {
                state.metrics.emails(0, 1);
            }
            failure("Failed to send reminder", e)
        }
    }
}
