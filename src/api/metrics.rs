use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};

use crate::state::{AppState, MetricsSnapshot};

/// Counter names and values as exported on `/metrics`.
#[derive(Serialize, Deserialize, utoipa::ToSchema)]
pub struct MetricsResponse {
    pub insight_responses_recorded_total: u64,
    pub insight_invitations_completed_total: u64,
    pub insight_reports_generated_total: u64,
    pub insight_report_failures_total: u64,
    pub insight_emails_sent_total: u64,
    pub insight_email_failures_total: u64,
}

impl From<MetricsSnapshot> for MetricsResponse {
    fn from(s: MetricsSnapshot) -> Self {
        Self {
            insight_responses_recorded_total: s.responses_recorded,
            insight_invitations_completed_total: s.invitations_completed,
            insight_reports_generated_total: s.reports_generated,
            insight_report_failures_total: s.report_failures,
            insight_emails_sent_total: s.emails_sent,
            insight_email_failures_total: s.email_failures,
        }
    }
}

impl MetricsResponse {
    fn to_prometheus(&self) -> String {
        let counters = [
            ("insight_responses_recorded_total", "Answers recorded", self.insight_responses_recorded_total),
            ("insight_invitations_completed_total", "Invitations completed", self.insight_invitations_completed_total),
            ("insight_reports_generated_total", "Reports generated and stored", self.insight_reports_generated_total),
            ("insight_report_failures_total", "Report generations that failed upstream", self.insight_report_failures_total),
            ("insight_emails_sent_total", "Emails delivered to the mail provider", self.insight_emails_sent_total),
            ("insight_email_failures_total", "Emails the mail provider rejected", self.insight_email_failures_total),
        ];

        counters
            .iter()
            .map(|(name, help, value)| {
                format!(
                    "# HELP {name} {help}\n# TYPE {name} counter\n{name} {value}\n",
                    name = name,
                    help = help,
                    value = value
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[utoipa::path(
    get,
    path = "/metrics",
    tag = "Health",
    responses(
        (status = 200, description = "Prometheus text exposition", body = MetricsResponse)
    )
)]
pub async fn get_metrics(state: web::Data<AppState>) -> HttpResponse {
    let metrics = MetricsResponse::from(state.metrics.snapshot());

    HttpResponse::Ok()
        .content_type("text/plain; version=0.0.4")
        .body(metrics.to_prometheus())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{self, ScriptedGenerator};
    use actix_web::{test, App};

    #[actix_web::test]
    async fn test_counters_are_exported() {
        let state = test_support::app_state(ScriptedGenerator::new());
        state.metrics.response_recorded();
        state.metrics.response_recorded();
        state.metrics.emails(3, 1);
        let app = test::init_service(
            App::new()
                .app_data(state)
                .route("/metrics", web::get().to(get_metrics)),
        )
        .await;

        let req = test::TestRequest::get().uri("/metrics").to_request();
        let body = test::call_and_read_body(&app, req).await;
        let text = String::from_utf8(body.to_vec()).unwrap();
        assert!(text.contains("# TYPE insight_responses_recorded_total counter"));
        assert!(text.contains("insight_responses_recorded_total 2\n"));
        assert!(text.contains("insight_emails_sent_total 3\n"));
        assert!(text.contains("insight_email_failures_total 1\n"));
        assert!(text.contains("insight_reports_generated_total 0\n"));
    }
}
