pub mod memory;
pub mod mongo;

pub use memory::InMemoryStore;
pub use mongo::MongoDB;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::models::{AnsweredQuestion, InsightReport, Invitation, Response, Survey, User};
use crate::utils::error::AppError;

/// Persistence seam for users, surveys, invitations and responses.
///
/// Conditional writes carry the lifecycle rules that must hold at write
/// time, not only when the caller last looked:
/// - invitation writes touch only their own fields and never move a status
///   backward,
/// - `update_survey` never overwrites a completed survey,
/// - `complete_survey` re-counts completed invitations before writing.
#[async_trait]
pub trait SurveyStore: Send + Sync {
    async fn ping(&self) -> Result<(), AppError>;

    async fn get_user(&self, id: &str) -> Result<Option<User>, AppError>;
    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, AppError>;
    async fn insert_user(&self, user: &User) -> Result<(), AppError>;

    async fn get_survey(&self, id: &str) -> Result<Option<Survey>, AppError>;
    /// Newest first.
    async fn list_user_surveys(&self, user_id: &str) -> Result<Vec<Survey>, AppError>;
    async fn insert_survey(&self, survey: &Survey) -> Result<(), AppError>;
    /// Returns `false` when the survey is missing or already completed.
    async fn update_survey(&self, survey: &Survey) -> Result<bool, AppError>;

    async fn get_invitation(&self, id: &str) -> Result<Option<Invitation>, AppError>;
    async fn get_invitation_by_token(&self, token: &str) -> Result<Option<Invitation>, AppError>;
    /// Creation order.
    async fn list_survey_invitations(&self, survey_id: &str) -> Result<Vec<Invitation>, AppError>;
    async fn insert_invitations(&self, invitations: &[Invitation]) -> Result<(), AppError>;
    /// pending -> in_progress. Returns `false` when the invitation is
    /// missing or no longer pending.
    async fn mark_invitation_started(&self, id: &str) -> Result<bool, AppError>;
    /// Sets `sentAt` only. Returns `false` when the invitation is missing.
    async fn stamp_invitation_sent(&self, id: &str, sent_at: DateTime<Utc>) -> Result<bool, AppError>;
    /// Sets `status = completed` and `completedAt`. Returns `false` when the
    /// invitation is missing or already completed.
    async fn complete_invitation(&self, id: &str, completed_at: DateTime<Utc>) -> Result<bool, AppError>;
    async fn count_completed_invitations(&self, survey_id: &str) -> Result<usize, AppError>;

    async fn insert_response(&self, response: &Response) -> Result<(), AppError>;
    /// Joins responses to the survey's invitations and keeps the latest answer
    /// per (invitation, question), ordered by when that answer was stored.
    /// The projection carries no invitation or respondent identity.
    async fn survey_answers(&self, survey_id: &str) -> Result<Vec<AnsweredQuestion>, AppError>;

    /// Single write that attaches the report and marks the survey completed,
    /// only if it is not completed yet and at least `min_completed`
    /// invitations are completed at write time. The stored
    /// `metadata.totalResponses` is that write-time count.
    async fn complete_survey(
        &self,
        survey_id: &str,
        report: &InsightReport,
        completed_at: DateTime<Utc>,
        min_completed: usize,
    ) -> Result<CompletionOutcome, AppError>;
}

/// Result of a guarded survey completion write.
#[derive(Debug, Clone, PartialEq)]
pub enum CompletionOutcome {
    Completed(Survey),
    NotFound,
    AlreadyCompleted,
    BelowThreshold { completed: usize },
}
