use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Insight Service API",
        version = "1.0.0",
        description = "Anonymous 360° feedback: surveys, invitations, the token-based respondent flow and mentor-voiced reports.\n\n**Anonymity:** respondent identities never reach report generation; only answers grouped by question are sent to the text generator.\n\n**Respondent flow:** `/api/survey/{token}` routes take the invitation token as their only credential.",
        contact(
            name = "Insight Service Team",
            email = "support@insightengine.com"
        )
    ),
    paths(
        // Health & Metrics
        crate::api::health::health_check,
        crate::api::metrics::get_metrics,

        // Users
        crate::api::users::create_user,
        crate::api::users::get_user,
        crate::api::users::list_user_surveys,

        // Surveys
        crate::api::surveys::create_survey,
        crate::api::surveys::get_survey,
        crate::api::surveys::update_survey,

        // Invitations
        crate::api::invitations::create_invitations,
        crate::api::invitations::send_invitations,
        crate::api::invitations::send_reminder,

        // Respondent
        crate::api::respondent::get_survey_for_respondent,
        crate::api::respondent::submit_response,
        crate::api::respondent::complete_survey,

        // Reports
        crate::api::reports::generate_report,
        crate::api::reports::report_pdf,
    ),
    components(
        schemas(
            // Health & Metrics
            crate::api::health::HealthResponse,
            crate::api::metrics::MetricsResponse,

            // Users
            crate::models::User,
            crate::models::CreateUserRequest,

            // Surveys
            crate::models::Survey,
            crate::models::SurveyStatus,
            crate::models::SelfAssessment,
            crate::models::SurveyWithInvitations,
            crate::models::CreateSurveyRequest,
            crate::models::UpdateSurveyRequest,
            crate::models::FocusArea,
            crate::models::MentorPersona,

            // Invitations
            crate::models::Invitation,
            crate::models::InvitationStatus,
            crate::models::Relationship,
            crate::models::NewInvitation,

            // Respondent
            crate::models::SubmitAnswerRequest,
            crate::models::AnswerReceipt,

            // Reports
            crate::models::InsightReport,
            crate::models::PersonalitySnapshot,
            crate::models::Insight,
            crate::models::StrengthsAndBlindSpots,
            crate::models::ActionRoadmap,
            crate::models::ReportMetadata,
        )
    ),
    tags(
        (name = "Users", description = "Survey subjects, identified by email."),
        (name = "Surveys", description = "Survey setup and lifecycle (setup, collecting, completed)."),
        (name = "Invitations", description = "Respondent invitations, invitation emails and reminders."),
        (name = "Respondent", description = "Token-based flow used by respondents to answer a survey."),
        (name = "Reports", description = "Report generation from aggregated answers, and PDF export."),
        (name = "Health", description = "Health check and process counters for monitoring."),
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_route_is_documented() {
        let doc = ApiDoc::openapi();
        for path in [
            "/health",
            "/metrics",
            "/api/users",
            "/api/users/{id}/surveys",
            "/api/surveys/{id}",
            "/api/surveys/{id}/invitations",
            "/api/surveys/{id}/send-invitations",
            "/api/invitations/{id}/remind",
            "/api/survey/{token}",
            "/api/survey/{token}/responses",
            "/api/survey/{token}/complete",
            "/api/surveys/{id}/generate-report",
            "/api/surveys/{id}/report/pdf",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {}", path);
        }
    }
}
