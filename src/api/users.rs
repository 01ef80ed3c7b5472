use actix_web::{web, HttpResponse};

use crate::api::failure;
use crate::models::{CreateUserRequest, Survey, User};
use crate::services::survey_service;
use crate::state::AppState;

/// POST /api/users - Get-or-create the subject by email
#[utoipa::path(
    post,
    path = "/api/users",
    tag = "Users",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User created", body = User),
        (status = 200, description = "Existing user with this email", body = User),
        (status = 400, description = "Invalid name or email")
    )
)]
pub async fn create_user(
    state: web::Data<AppState>,
    body: web::Json<CreateUserRequest>,
) -> HttpResponse {
    log::info!("👤 POST /users");

    match survey_service::get_or_create_user(state.store.as_ref(), body.into_inner()).await {
        Ok((user, created)) => {
            let mut response = if created {
                HttpResponse::Created()
            } else {
                HttpResponse::Ok()
            };
            response.json(serde_json::json!({
                "success": true,
                "user": user,
                "created": created
            }))
        }
        Err(e) => failure("Failed to create user", e),
    }
}

/// GET /api/users/{id}
#[utoipa::path(
    get,
    path = "/api/users/{id}",
    tag = "Users",
    params(("id" = String, Path, description = "User id")),
    responses(
        (status = 200, description = "User", body = User),
        (status = 404, description = "User not found")
    )
)]
pub async fn get_user(state: web::Data<AppState>, path: web::Path<String>) -> HttpResponse {
    let user_id = path.into_inner();

    match survey_service::get_user(state.store.as_ref(), &user_id).await {
        Ok(user) => HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "user": user
        })),
        Err(e) => failure("Failed to fetch user", e),
    }
}

/// GET /api/users/{id}/surveys - Newest first
#[utoipa::path(
    get,
    path = "/api/users/{id}/surveys",
    tag = "Users",
    params(("id" = String, Path, description = "User id")),
    responses(
        (status = 200, description = "The user's surveys, newest first", body = [Survey]),
        (status = 404, description = "User not found")
    )
)]
pub async fn list_user_surveys(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> HttpResponse {
    let user_id = path.into_inner();

    match survey_service::list_user_surveys(state.store.as_ref(), &user_id).await {
        Ok(surveys) => HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "total": surveys.len(),
            "surveys": surveys
        })),
        Err(e) => failure("Failed to list surveys", e),
    }
}
