pub mod health;
pub mod invitations;
pub mod metrics;
pub mod reports;
pub mod respondent;
pub mod surveys;
pub mod swagger;
pub mod users;

use actix_web::{web, HttpResponse, ResponseError};

use crate::utils::error::AppError;

/// Logs a failed request and renders the error envelope.
/// Client errors are warnings; store and upstream failures are errors.
pub(crate) fn failure(context: &str, e: AppError) -> HttpResponse {
    if e.is_client_error() {
        log::warn!("⚠️  {}: {}", context, e);
    } else {
        log::error!("❌ {}: {}", context, e);
    }
    e.error_response()
}

/// Malformed bodies (including unknown enum tags) answer with the same
/// `{"success": false, "error": ...}` envelope as every other failure.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(64 * 1024)
        .error_handler(|err, _req| AppError::validation(err.to_string()).into())
}

/// Registers every `/api` route.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .app_data(json_config())
            // Users
            .route("/users", web::post().to(users::create_user))
            .route("/users/{id}", web::get().to(users::get_user))
            .route("/users/{id}/surveys", web::get().to(users::list_user_surveys))
            // Surveys
            .route("/surveys", web::post().to(surveys::create_survey))
            .route("/surveys/{id}", web::get().to(surveys::get_survey))
            .route("/surveys/{id}", web::put().to(surveys::update_survey))
            // Invitations
            .route("/surveys/{id}/invitations", web::post().to(invitations::create_invitations))
            .route("/surveys/{id}/send-invitations", web::post().to(invitations::send_invitations))
            .route("/invitations/{id}/remind", web::post().to(invitations::send_reminder))
            // Reports
            .route("/surveys/{id}/generate-report", web::post().to(reports::generate_report))
            .route("/surveys/{id}/report/pdf", web::get().to(reports::report_pdf))
            // Respondent flow (token is the only credential)
            .route("/survey/{token}", web::get().to(respondent::get_survey_for_respondent))
            .route("/survey/{token}/responses", web::post().to(respondent::submit_response))
            .route("/survey/{token}/complete", web::post().to(respondent::complete_survey)),
    );
}
