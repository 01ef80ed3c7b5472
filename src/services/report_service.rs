use chrono::Utc;
use std::time::Duration;

use crate::database::SurveyStore;
use crate::models::{
    parse_commentary, ActionRoadmap, FocusArea, GeneratedSection, InsightReport, MentorPersona,
    PersonalitySnapshot, ReportMetadata, StrengthsAndBlindSpots, Survey,
};
use crate::services::aggregation_service::{self, AggregatedAnswers};
use crate::services::lifecycle_service;
use crate::services::openai_service::TextGenerator;
use crate::services::prompts::{self, ReportSection};
use crate::utils::error::AppError;

/// Inputs shared by the four section prompts plus the metadata block.
#[derive(Debug, Clone)]
pub struct ReportContext<'a> {
    pub subject_name: &'a str,
    pub mentor: MentorPersona,
    pub focus_areas: &'a [FocusArea],
    /// Completed invitations at the gate check. The completion write replaces
    /// it with the count observed when the report is stored.
    pub total_responses: usize,
}

/// Calls the generator for one section, bounded by `timeout`.
async fn call_generator(
    generator: &dyn TextGenerator,
    timeout: Duration,
    section: ReportSection,
    ctx: &ReportContext<'_>,
    answers: &AggregatedAnswers,
) -> Result<String, AppError> {
    let request = prompts::section_request(section, ctx.mentor, ctx.subject_name, answers);

    match tokio::time::timeout(timeout, generator.generate(&request)).await {
        Ok(Ok(raw)) => Ok(raw),
        Ok(Err(e)) => Err(AppError::upstream(format!(
            "Failed to generate {}: {}",
            section.name(),
            e
        ))),
        Err(_) => Err(AppError::upstream(format!(
            "Generating {} timed out after {}s",
            section.name(),
            timeout.as_secs()
        ))),
    }
}

async fn generate_section<S: GeneratedSection>(
    generator: &dyn TextGenerator,
    timeout: Duration,
    section: ReportSection,
    ctx: &ReportContext<'_>,
    answers: &AggregatedAnswers,
) -> Result<S, AppError> {
    let raw = call_generator(generator, timeout, section, ctx, answers).await?;
    S::parse(&raw).map_err(|e| {
        log::warn!("⚠️  Rejected generator output for {}: {}", section.name(), e);
        AppError::upstream(e)
    })
}

async fn generate_commentary(
    generator: &dyn TextGenerator,
    timeout: Duration,
    ctx: &ReportContext<'_>,
    answers: &AggregatedAnswers,
) -> Result<String, AppError> {
    let section = ReportSection::MentorCommentary;
    let raw = call_generator(generator, timeout, section, ctx, answers).await?;
    parse_commentary(&raw).map_err(AppError::upstream)
}

/// Runs the four section calls concurrently and merges them.
///
/// All-or-nothing: the first failing section aborts the join and no report
/// is returned.
pub async fn assemble_report(
    generator: &dyn TextGenerator,
    timeout: Duration,
    ctx: &ReportContext<'_>,
    answers: &AggregatedAnswers,
) -> Result<InsightReport, AppError> {
    let (personality, strengths, mentor_commentary, action_steps) = tokio::try_join!(
        generate_section::<PersonalitySnapshot>(
            generator,
            timeout,
            ReportSection::Personality,
            ctx,
            answers
        ),
        generate_section::<StrengthsAndBlindSpots>(
            generator,
            timeout,
            ReportSection::StrengthsAndBlindSpots,
            ctx,
            answers
        ),
        generate_commentary(generator, timeout, ctx, answers),
        generate_section::<ActionRoadmap>(
            generator,
            timeout,
            ReportSection::ActionSteps,
            ctx,
            answers
        ),
    )?;

    Ok(InsightReport {
        personality,
        strengths: strengths.strengths,
        blind_spots: strengths.blind_spots,
        mentor_commentary,
        action_steps,
        metadata: ReportMetadata {
            total_responses: ctx.total_responses,
            focus_areas: ctx.focus_areas.to_vec(),
            mentor: ctx.mentor.display_name().to_string(),
            generated_at: Utc::now(),
        },
    })
}

/// Gate check, aggregation, assembly and the single completion write.
///
/// On any failure the survey is left exactly as it was, so the caller can
/// retry the whole operation.
pub async fn generate_report(
    store: &dyn SurveyStore,
    generator: &dyn TextGenerator,
    timeout: Duration,
    survey_id: &str,
) -> Result<Survey, AppError> {
    let survey = store
        .get_survey(survey_id)
        .await?
        .ok_or_else(|| AppError::not_found("Survey"))?;

    let invitations = store.list_survey_invitations(survey_id).await?;
    lifecycle_service::ensure_report_allowed(&survey, &invitations)?;

    let subject = store
        .get_user(&survey.user_id)
        .await?
        .ok_or_else(|| AppError::not_found("User"))?;

    let answers = aggregation_service::aggregate(store, survey_id).await?;

    let ctx = ReportContext {
        subject_name: &subject.name,
        mentor: survey.ai_mentor,
        focus_areas: &survey.focus_areas,
        total_responses: lifecycle_service::completed_count(&survey, &invitations),
    };

    log::info!(
        "🤖 Generating report for survey {} ({} completed, mentor {})",
        survey_id,
        ctx.total_responses,
        ctx.mentor
    );

    let report = assemble_report(generator, timeout, &ctx, &answers).await?;
    lifecycle_service::mark_survey_completed(store, survey_id, &report).await
}
