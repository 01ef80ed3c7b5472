use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use super::{CompletionOutcome, SurveyStore};
use crate::models::{
    AnsweredQuestion, InsightReport, Invitation, InvitationStatus, Response, Survey, SurveyStatus,
    User,
};
use crate::utils::error::AppError;

/// Process-local store for development (`DATABASE_URL=memory://`) and tests.
///
/// Every operation runs under one lock, so guarded writes are atomic.
#[derive(Default)]
pub struct InMemoryStore {
    state: Mutex<State>,
}

#[derive(Default)]
struct State {
    users: Vec<User>,
    surveys: Vec<Survey>,
    invitations: Vec<Invitation>,
    responses: Vec<Response>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> Result<MutexGuard<'_, State>, AppError> {
        self.state
            .lock()
            .map_err(|_| AppError::Database("in-memory store lock poisoned".to_string()))
    }
}

#[async_trait]
impl SurveyStore for InMemoryStore {
    async fn ping(&self) -> Result<(), AppError> {
        self.state().map(|_| ())
    }

    async fn get_user(&self, id: &str) -> Result<Option<User>, AppError> {
        Ok(self.state()?.users.iter().find(|u| u.id == id).cloned())
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        Ok(self.state()?.users.iter().find(|u| u.email == email).cloned())
    }

    async fn insert_user(&self, user: &User) -> Result<(), AppError> {
        let mut state = self.state()?;
        if state.users.iter().any(|u| u.email == user.email) {
            return Err(AppError::Database(format!("duplicate email: {}", user.email)));
        }
        state.users.push(user.clone());
        Ok(())
    }

    async fn get_survey(&self, id: &str) -> Result<Option<Survey>, AppError> {
        Ok(self.state()?.surveys.iter().find(|s| s.id == id).cloned())
    }

    async fn list_user_surveys(&self, user_id: &str) -> Result<Vec<Survey>, AppError> {
        let mut surveys: Vec<Survey> = self
            .state()?
            .surveys
            .iter()
            .filter(|s| s.user_id == user_id)
            .cloned()
            .collect();
        surveys.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(surveys)
    }

    async fn insert_survey(&self, survey: &Survey) -> Result<(), AppError> {
        self.state()?.surveys.push(survey.clone());
        Ok(())
    }

    async fn update_survey(&self, survey: &Survey) -> Result<bool, AppError> {
        let mut state = self.state()?;
        match state
            .surveys
            .iter_mut()
            .find(|s| s.id == survey.id && s.status != SurveyStatus::Completed)
        {
            Some(stored) => {
                *stored = survey.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn get_invitation(&self, id: &str) -> Result<Option<Invitation>, AppError> {
        Ok(self.state()?.invitations.iter().find(|i| i.id == id).cloned())
    }

    async fn get_invitation_by_token(&self, token: &str) -> Result<Option<Invitation>, AppError> {
        Ok(self
            .state()?
            .invitations
            .iter()
            .find(|i| i.token == token)
            .cloned())
    }

    async fn list_survey_invitations(&self, survey_id: &str) -> Result<Vec<Invitation>, AppError> {
        Ok(self
            .state()?
            .invitations
            .iter()
            .filter(|i| i.survey_id == survey_id)
            .cloned()
            .collect())
    }

    async fn insert_invitations(&self, invitations: &[Invitation]) -> Result<(), AppError> {
        let mut state = self.state()?;
        for invitation in invitations {
            if state.invitations.iter().any(|i| i.token == invitation.token) {
                return Err(AppError::Database("duplicate invitation token".to_string()));
            }
        }
        state.invitations.extend_from_slice(invitations);
        Ok(())
    }

    async fn mark_invitation_started(&self, id: &str) -> Result<bool, AppError> {
        let mut state = self.state()?;
        match state
            .invitations
            .iter_mut()
            .find(|i| i.id == id && i.status == InvitationStatus::Pending)
        {
            Some(stored) => {
                stored.status = InvitationStatus::InProgress;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn stamp_invitation_sent(&self, id: &str, sent_at: DateTime<Utc>) -> Result<bool, AppError> {
        let mut state = self.state()?;
        match state.invitations.iter_mut().find(|i| i.id == id) {
            Some(stored) => {
                stored.sent_at = Some(sent_at);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn complete_invitation(&self, id: &str, completed_at: DateTime<Utc>) -> Result<bool, AppError> {
        let mut state = self.state()?;
        match state
            .invitations
            .iter_mut()
            .find(|i| i.id == id && i.status != InvitationStatus::Completed)
        {
            Some(stored) => {
                stored.status = InvitationStatus::Completed;
                stored.completed_at = Some(completed_at);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn count_completed_invitations(&self, survey_id: &str) -> Result<usize, AppError> {
        Ok(self
            .state()?
            .invitations
            .iter()
            .filter(|i| i.survey_id == survey_id && i.is_completed())
            .count())
    }

    async fn insert_response(&self, response: &Response) -> Result<(), AppError> {
        self.state()?.responses.push(response.clone());
        Ok(())
    }

    async fn survey_answers(&self, survey_id: &str) -> Result<Vec<AnsweredQuestion>, AppError> {
        let state = self.state()?;
        let invitation_ids: Vec<&str> = state
            .invitations
            .iter()
            .filter(|i| i.survey_id == survey_id)
            .map(|i| i.id.as_str())
            .collect();

        // Latest answer per (invitation, question), remembered with its position.
        let mut latest: HashMap<(&str, &str), (usize, &Response)> = HashMap::new();
        for (position, response) in state.responses.iter().enumerate() {
            if invitation_ids.contains(&response.invitation_id.as_str()) {
                latest.insert(
                    (response.invitation_id.as_str(), response.question_id.as_str()),
                    (position, response),
                );
            }
        }

        let mut kept: Vec<(usize, &Response)> = latest.into_values().collect();
        kept.sort_by_key(|(position, _)| *position);
        Ok(kept
            .into_iter()
            .map(|(_, r)| AnsweredQuestion {
                question_id: r.question_id.clone(),
                answer: r.answer.clone(),
            })
            .collect())
    }

    async fn complete_survey(
        &self,
        survey_id: &str,
        report: &InsightReport,
        completed_at: DateTime<Utc>,
        min_completed: usize,
    ) -> Result<CompletionOutcome, AppError> {
        let mut state = self.state()?;
        let completed = state
            .invitations
            .iter()
            .filter(|i| i.survey_id == survey_id && i.is_completed())
            .count();

        let Some(survey) = state.surveys.iter_mut().find(|s| s.id == survey_id) else {
            return Ok(CompletionOutcome::NotFound);
        };
        if survey.status == SurveyStatus::Completed {
            return Ok(CompletionOutcome::AlreadyCompleted);
        }
        if completed < min_completed {
            return Ok(CompletionOutcome::BelowThreshold { completed });
        }

        let mut report = report.clone();
        report.metadata.total_responses = completed;
        survey.status = SurveyStatus::Completed;
        survey.report_data = Some(report);
        survey.completed_at = Some(completed_at);
        Ok(CompletionOutcome::Completed(survey.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support;

    fn completed(mut invitation: Invitation) -> Invitation {
        invitation.status = InvitationStatus::Completed;
        invitation.completed_at = Some(Utc::now());
        invitation
    }

    #[tokio::test]
    async fn test_invitation_status_only_moves_forward() {
        let store = InMemoryStore::new();
        let invitation = test_support::sample_invitation("s1");
        store.insert_invitations(&[invitation.clone()]).await.unwrap();

        assert!(store.mark_invitation_started(&invitation.id).await.unwrap());
        assert!(!store.mark_invitation_started(&invitation.id).await.unwrap());

        let first = Utc::now();
        assert!(store.complete_invitation(&invitation.id, first).await.unwrap());
        assert!(!store.complete_invitation(&invitation.id, Utc::now()).await.unwrap());
        assert!(!store.mark_invitation_started(&invitation.id).await.unwrap());

        let stored = store.get_invitation(&invitation.id).await.unwrap().unwrap();
        assert!(stored.is_completed());
        assert_eq!(stored.completed_at, Some(first));
    }

    #[tokio::test]
    async fn test_sent_stamp_leaves_status_alone() {
        let store = InMemoryStore::new();
        let invitation = test_support::sample_invitation("s1");
        store.insert_invitations(&[invitation.clone()]).await.unwrap();
        store.complete_invitation(&invitation.id, Utc::now()).await.unwrap();

        assert!(store.stamp_invitation_sent(&invitation.id, Utc::now()).await.unwrap());
        assert!(!store.stamp_invitation_sent("missing", Utc::now()).await.unwrap());

        let stored = store.get_invitation(&invitation.id).await.unwrap().unwrap();
        assert!(stored.is_completed());
        assert!(stored.sent_at.is_some());
    }

    #[tokio::test]
    async fn test_duplicate_token_rejects_batch() {
        let store = InMemoryStore::new();
        let invitation = test_support::sample_invitation("s1");
        store.insert_invitations(&[invitation.clone()]).await.unwrap();

        let mut clash = test_support::sample_invitation("s1");
        clash.token = invitation.token.clone();
        assert!(store.insert_invitations(&[clash]).await.is_err());
        assert_eq!(store.list_survey_invitations("s1").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_complete_survey_guards() {
        let store = InMemoryStore::new();
        let survey = test_support::sample_survey("u1");
        store.insert_survey(&survey).await.unwrap();
        let report = test_support::sample_report();

        let invitations: Vec<Invitation> = (0..3)
            .map(|_| completed(test_support::sample_invitation(&survey.id)))
            .collect();
        store.insert_invitations(&invitations[..2]).await.unwrap();

        let outcome = store.complete_survey(&survey.id, &report, Utc::now(), 3).await.unwrap();
        assert_eq!(outcome, CompletionOutcome::BelowThreshold { completed: 2 });

        store.insert_invitations(&invitations[2..]).await.unwrap();
        let outcome = store.complete_survey(&survey.id, &report, Utc::now(), 3).await.unwrap();
        let CompletionOutcome::Completed(stored) = outcome else {
            panic!("expected completion, got {:?}", outcome);
        };
        assert_eq!(stored.status, SurveyStatus::Completed);
        let stored_report = stored.report_data.as_ref().unwrap();
        assert_eq!(stored_report.mentor_commentary, report.mentor_commentary);

        let outcome = store.complete_survey(&survey.id, &report, Utc::now(), 3).await.unwrap();
        assert_eq!(outcome, CompletionOutcome::AlreadyCompleted);
        assert!(!store.update_survey(&survey).await.unwrap());

        let outcome = store.complete_survey("missing", &report, Utc::now(), 3).await.unwrap();
        assert_eq!(outcome, CompletionOutcome::NotFound);
    }

    #[tokio::test]
    async fn test_user_surveys_newest_first() {
        let store = InMemoryStore::new();
        let mut older = test_support::sample_survey("u1");
        older.created_at = Utc::now() - chrono::Duration::hours(1);
        let newer = test_support::sample_survey("u1");
        store.insert_survey(&older).await.unwrap();
        store.insert_survey(&newer).await.unwrap();
        store.insert_survey(&test_support::sample_survey("u2")).await.unwrap();

        let surveys = store.list_user_surveys("u1").await.unwrap();
        let ids: Vec<&str> = surveys.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec![newer.id.as_str(), older.id.as_str()]);
    }
}
