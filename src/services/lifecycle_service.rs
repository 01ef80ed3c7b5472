// ==================== SURVEY LIFECYCLE ====================
// Survey:     setup -> collecting -> completed
// Invitation: pending -> in_progress -> completed (never reverts)

use chrono::Utc;

use crate::database::{CompletionOutcome, SurveyStore};
use crate::models::{Answer, InsightReport, Invitation, Response, Survey, SurveyStatus};
use crate::utils::error::AppError;

/// Completed invitations required before a report may be generated.
pub const MIN_COMPLETED_INVITATIONS: usize = 3;

pub fn completed_count(survey: &Survey, invitations: &[Invitation]) -> usize {
    invitations
        .iter()
        .filter(|i| i.survey_id == survey.id && i.is_completed())
        .count()
}

pub fn can_generate_report(survey: &Survey, invitations: &[Invitation]) -> bool {
    completed_count(survey, invitations) >= MIN_COMPLETED_INVITATIONS
}

/// Gate checked before any generator call is made.
pub fn ensure_report_allowed(survey: &Survey, invitations: &[Invitation]) -> Result<(), AppError> {
    if survey.status == SurveyStatus::Completed {
        return Err(AppError::precondition(
            "Report has already been generated for this survey",
        ));
    }
    if !can_generate_report(survey, invitations) {
        return Err(threshold_error(completed_count(survey, invitations)));
    }
    Ok(())
}

fn threshold_error(completed: usize) -> AppError {
    AppError::precondition(format!(
        "Need at least {} completed responses to generate report (have {})",
        MIN_COMPLETED_INVITATIONS, completed
    ))
}

/// setup -> collecting. Returns whether the status changed.
pub fn begin_collecting(survey: &mut Survey) -> bool {
    if survey.status == SurveyStatus::Setup {
        survey.status = SurveyStatus::Collecting;
        return true;
    }
    false
}

/// Records one answer for a non-completed invitation.
///
/// The first answer moves the invitation to `in_progress`. Only the status
/// is written, so a concurrent `sentAt` stamp survives, and an invitation
/// completed concurrently rejects the answer instead of being reopened.
pub async fn record_response(
    store: &dyn SurveyStore,
    invitation: &Invitation,
    question_id: &str,
    answer: Answer,
) -> Result<Response, AppError> {
    if invitation.is_completed() {
        return Err(AppError::precondition("This survey has already been completed"));
    }

    if store.mark_invitation_started(&invitation.id).await? {
        log::info!("📝 Invitation {} started", invitation.id);
    } else {
        let current = store
            .get_invitation(&invitation.id)
            .await?
            .ok_or_else(|| AppError::not_found("Invitation"))?;
        if current.is_completed() {
            return Err(AppError::precondition("This survey has already been completed"));
        }
    }

    let response = Response::new(&invitation.id, question_id, answer);
    store.insert_response(&response).await?;
    Ok(response)
}

/// Marks an invitation completed and returns the stored record, plus
/// whether this call made the change.
///
/// Idempotent: completing an already completed invitation keeps the
/// original completion time. No minimum number of answers is required.
pub async fn complete_invitation(
    store: &dyn SurveyStore,
    invitation: &Invitation,
) -> Result<(Invitation, bool), AppError> {
    if invitation.is_completed() {
        return Ok((invitation.clone(), false));
    }

    let changed = store.complete_invitation(&invitation.id, Utc::now()).await?;
    if changed {
        log::info!("✅ Invitation {} completed", invitation.id);
    }

    let stored = store
        .get_invitation(&invitation.id)
        .await?
        .ok_or_else(|| AppError::not_found("Invitation"))?;
    Ok((stored, changed))
}

/// Attaches the report and completes the survey in one guarded write.
/// The completed-invitation threshold is re-checked by the store at write time.
pub async fn mark_survey_completed(
    store: &dyn SurveyStore,
    survey_id: &str,
    report: &InsightReport,
) -> Result<Survey, AppError> {
    if report.mentor_commentary.trim().is_empty()
        || report.personality.personality_summary.trim().is_empty()
    {
        return Err(AppError::validation("Report data is empty"));
    }

    match store
        .complete_survey(survey_id, report, Utc::now(), MIN_COMPLETED_INVITATIONS)
        .await?
    {
        CompletionOutcome::Completed(survey) => {
            log::info!("🏁 Survey {} completed", survey_id);
            Ok(survey)
        }
        CompletionOutcome::NotFound => Err(AppError::not_found("Survey")),
        CompletionOutcome::AlreadyCompleted => Err(AppError::precondition(
            "Report has already been generated for this survey",
        )),
        CompletionOutcome::BelowThreshold { completed } => Err(threshold_error(completed)),
    }
}
