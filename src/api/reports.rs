use actix_web::{http::header, web, HttpResponse};
use std::time::Instant;

use crate::api::failure;
use crate::models::InsightReport;
use crate::services::{pdf_service, report_service};
use crate::state::AppState;

/// POST /api/surveys/{id}/generate-report - Aggregate, generate and persist
#[utoipa::path(
    post,
    path = "/api/surveys/{id}/generate-report",
    tag = "Reports",
    params(("id" = String, Path, description = "Survey id")),
    responses(
        (status = 200, description = "Report generated and stored", body = InsightReport),
        (status = 400, description = "Fewer than 3 completed invitations, or report already generated"),
        (status = 404, description = "Survey not found"),
        (status = 500, description = "Text generator failure; the survey is left unchanged")
    )
)]
pub async fn generate_report(state: web::Data<AppState>, path: web::Path<String>) -> HttpResponse {
    let survey_id = path.into_inner();
    log::info!("🤖 POST /surveys/{}/generate-report", survey_id);
    let started = Instant::now();

    match report_service::generate_report(
        state.store.as_ref(),
        state.generator.as_ref(),
        state.generation_timeout,
        &survey_id,
    )
    .await
    {
        Ok(survey) => {
            state.metrics.report_generated();
            log::info!(
                "✅ Report for survey {} generated in {:.1}s",
                survey_id,
                started.elapsed().as_secs_f64()
            );
            HttpResponse::Ok().json(serde_json::json!({
                "success": true,
                "report": survey.report_data
            }))
        }
        Err(e) => {
            if !e.is_client_error() {
                state.metrics.report_failed();
            }
            failure("Failed to generate report", e)
        }
    }
}

/// GET /api/surveys/{id}/report/pdf - Stored report as a PDF download
#[utoipa::path(
    get,
    path = "/api/surveys/{id}/report/pdf",
    tag = "Reports",
    params(("id" = String, Path, description = "Survey id")),
    responses(
        (status = 200, description = "PDF document", content_type = "application/pdf"),
        (status = 404, description = "Survey not found or no report yet"),
        (status = 500, description = "PDF renderer failure")
    )
)]
pub async fn report_pdf(state: web::Data<AppState>, path: web::Path<String>) -> HttpResponse {
    let survey_id = path.into_inner();
    log::info!("📄 GET /surveys/{}/report/pdf", survey_id);

    match pdf_service::report_pdf(state.store.as_ref(), state.renderer.as_ref(), &survey_id).await {
        Ok(rendered) => HttpResponse::Ok()
            .content_type("application/pdf")
            .insert_header((
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", rendered.filename),
            ))
            .body(rendered.bytes),
        Err(e) => failure("Failed to render report PDF", e),
    }
}
