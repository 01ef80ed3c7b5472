use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::database::SurveyStore;
use crate::models::{
    find_question, questions_for, validate_contacts, Answer, AnswerReceipt, CreateSurveyRequest,
    CreateUserRequest, FocusArea, Invitation, InvitationStatus, NewInvitation, Question,
    SubmitAnswerRequest, Survey, SurveyStatus, SurveyWithInvitations, UpdateSurveyRequest, User,
};
use crate::services::lifecycle_service;
use crate::utils::error::AppError;

// ==================== USERS ====================

/// Returns the user registered under the request's email, creating it if
/// there is none.
pub async fn get_or_create_user(
    store: &dyn SurveyStore,
    request: CreateUserRequest,
) -> Result<(User, bool), AppError> {
    request.validate()?;
    let user = request.into_user();

    if let Some(existing) = store.get_user_by_email(&user.email).await? {
        return Ok((existing, false));
    }

    store.insert_user(&user).await?;
    log::info!("👤 User {} created", user.id);
    Ok((user, true))
}

pub async fn get_user(store: &dyn SurveyStore, user_id: &str) -> Result<User, AppError> {
    store
        .get_user(user_id)
        .await?
        .ok_or_else(|| AppError::not_found("User"))
}

pub async fn list_user_surveys(
    store: &dyn SurveyStore,
    user_id: &str,
) -> Result<Vec<Survey>, AppError> {
    get_user(store, user_id).await?;
    store.list_user_surveys(user_id).await
}

// ==================== SURVEYS ====================

pub async fn create_survey(
    store: &dyn SurveyStore,
    request: CreateSurveyRequest,
) -> Result<Survey, AppError> {
    request.validate()?;
    get_user(store, &request.user_id).await?;

    let survey = request.into_survey();
    store.insert_survey(&survey).await?;
    log::info!("📋 Survey {} created ({})", survey.id, survey.status);
    Ok(survey)
}

pub async fn get_survey(store: &dyn SurveyStore, survey_id: &str) -> Result<Survey, AppError> {
    store
        .get_survey(survey_id)
        .await?
        .ok_or_else(|| AppError::not_found("Survey"))
}

pub async fn get_survey_with_invitations(
    store: &dyn SurveyStore,
    survey_id: &str,
) -> Result<SurveyWithInvitations, AppError> {
    let survey = get_survey(store, survey_id).await?;
    let invitations = store.list_survey_invitations(survey_id).await?;
    Ok(SurveyWithInvitations { survey, invitations })
}

/// Edits the subject-editable fields. Completed surveys are frozen.
pub async fn update_survey(
    store: &dyn SurveyStore,
    survey_id: &str,
    request: UpdateSurveyRequest,
) -> Result<Survey, AppError> {
    request.validate()?;
    let mut survey = get_survey(store, survey_id).await?;
    if survey.status == SurveyStatus::Completed {
        return Err(AppError::precondition("A completed survey cannot be edited"));
    }

    request.apply(&mut survey);
    if !store.update_survey(&survey).await? {
        return Err(AppError::precondition("A completed survey cannot be edited"));
    }
    Ok(survey)
}

// ==================== INVITATIONS ====================

/// Creates one invitation per contact, each with a fresh token.
/// The first batch moves the survey from `setup` to `collecting`.
pub async fn add_invitations(
    store: &dyn SurveyStore,
    survey_id: &str,
    contacts: Vec<NewInvitation>,
) -> Result<Vec<Invitation>, AppError> {
    validate_contacts(&contacts)?;
    let mut survey = get_survey(store, survey_id).await?;
    if survey.status == SurveyStatus::Completed {
        return Err(AppError::precondition(
            "Cannot add invitations to a completed survey",
        ));
    }

    let invitations: Vec<Invitation> = contacts
        .into_iter()
        .map(|c| c.into_invitation(survey_id))
        .collect();
    store.insert_invitations(&invitations).await?;
    log::info!("✉️  {} invitations created for survey {}", invitations.len(), survey_id);

    if lifecycle_service::begin_collecting(&mut survey) {
        if store.update_survey(&survey).await? {
            log::info!("📋 Survey {} is now {}", survey_id, survey.status);
        } else {
            log::warn!("⚠️  Survey {} changed while adding invitations", survey_id);
        }
    }

    Ok(invitations)
}

pub async fn get_invitation(
    store: &dyn SurveyStore,
    invitation_id: &str,
) -> Result<Invitation, AppError> {
    store
        .get_invitation(invitation_id)
        .await?
        .ok_or_else(|| AppError::not_found("Invitation"))
}

// ==================== RESPONDENT FLOW ====================

/// The token is the respondent's only credential.
pub async fn resolve_token(store: &dyn SurveyStore, token: &str) -> Result<Invitation, AppError> {
    store
        .get_invitation_by_token(token)
        .await?
        .ok_or_else(|| AppError::not_found("Invitation"))
}

/// What a respondent sees when opening their link.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RespondentSurvey {
    pub status: InvitationStatus,
    pub completed_at: Option<DateTime<Utc>>,
    pub survey_title: String,
    pub subject_name: String,
    pub focus_areas: Vec<FocusArea>,
    pub questions: Vec<Question>,
}

pub async fn respondent_view(
    store: &dyn SurveyStore,
    token: &str,
) -> Result<RespondentSurvey, AppError> {
    let invitation = resolve_token(store, token).await?;
    let survey = get_survey(store, &invitation.survey_id).await?;
    let subject = get_user(store, &survey.user_id).await?;

    Ok(RespondentSurvey {
        status: invitation.status,
        completed_at: invitation.completed_at,
        survey_title: survey.title,
        subject_name: subject.name,
        questions: questions_for(&survey.focus_areas),
        focus_areas: survey.focus_areas,
    })
}

/// Validates one answer against the survey's question bank and records it.
pub async fn submit_answer(
    store: &dyn SurveyStore,
    token: &str,
    request: SubmitAnswerRequest,
) -> Result<AnswerReceipt, AppError> {
    let invitation = resolve_token(store, token).await?;
    let survey = get_survey(store, &invitation.survey_id).await?;

    let question = find_question(&survey.focus_areas, &request.question_id).ok_or_else(|| {
        AppError::validation(format!(
            "questionId: '{}' is not part of this survey",
            request.question_id
        ))
    })?;
    let answer = Answer::for_question(&question, &request.answer)?;

    let response =
        lifecycle_service::record_response(store, &invitation, &question.id, answer).await?;
    Ok(AnswerReceipt {
        question_id: response.question_id,
        recorded_at: response.created_at,
    })
}

/// The flag is `true` only for the call that completed the invitation.
pub async fn complete_by_token(
    store: &dyn SurveyStore,
    token: &str,
) -> Result<(Invitation, bool), AppError> {
    let invitation = resolve_token(store, token).await?;
    lifecycle_service::complete_invitation(store, &invitation).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::InMemoryStore;
    use crate::models::{MentorPersona, Relationship};
    use crate::test_support;

    fn contact(name: &str, email: &str) -> NewInvitation {
        NewInvitation {
            name: name.into(),
            email: email.into(),
            relationship: Relationship::Friend,
        }
    }

    #[tokio::test]
    async fn test_get_or_create_user_reuses_email() {
        let store = InMemoryStore::new();
        let (first, created) = get_or_create_user(
            &store,
            CreateUserRequest { email: "Dana@Example.com".into(), name: "Dana".into() },
        )
        .await
        .unwrap();
        assert!(created);

        let (again, created) = get_or_create_user(
            &store,
            CreateUserRequest { email: "dana@example.com".into(), name: "Dana R".into() },
        )
        .await
        .unwrap();
        assert!(!created);
        assert_eq!(again.id, first.id);
    }

    #[tokio::test]
    async fn test_create_survey_requires_known_user() {
        let store = InMemoryStore::new();
        let request = CreateSurveyRequest {
            user_id: "ghost".into(),
            title: "Feedback".into(),
            focus_areas: vec![FocusArea::Leadership],
            ai_mentor: MentorPersona::MarcusAI,
            self_assessment: None,
        };
        let err = create_survey(&store, request).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_first_invitations_start_collecting() {
        let store = InMemoryStore::new();
        let user = test_support::seed_user(&store).await;

        let survey = create_survey(
            &store,
            CreateSurveyRequest {
                user_id: user.id.clone(),
                title: "Team pulse".into(),
                focus_areas: vec![FocusArea::Communication],
                ai_mentor: MentorPersona::MayaAI,
                self_assessment: None,
            },
        )
        .await
        .unwrap();
        assert_eq!(survey.status, SurveyStatus::Setup);

        let created = add_invitations(
            &store,
            &survey.id,
            vec![contact("Ana", "ana@example.com"), contact("Ben", "ben@example.com")],
        )
        .await
        .unwrap();
        assert_eq!(created.len(), 2);

        let full = get_survey_with_invitations(&store, &survey.id).await.unwrap();
        assert_eq!(full.survey.status, SurveyStatus::Collecting);
        assert_eq!(full.invitations.len(), 2);
    }

    #[tokio::test]
    async fn test_completed_survey_rejects_invitations_and_edits() {
        let store = InMemoryStore::new();
        let (survey, invitations) = test_support::seed_survey(&store, 3).await;
        for invitation in &invitations {
            lifecycle_service::complete_invitation(&store, invitation).await.unwrap();
        }
        lifecycle_service::mark_survey_completed(&store, &survey.id, &test_support::sample_report())
            .await
            .unwrap();

        let err = add_invitations(&store, &survey.id, vec![contact("Ana", "ana@example.com")])
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::PreconditionFailed(_)));

        let edit = UpdateSurveyRequest { title: Some("New".into()), ..Default::default() };
        let err = update_survey(&store, &survey.id, edit).await.unwrap_err();
        assert!(matches!(err, AppError::PreconditionFailed(_)));
    }

    #[tokio::test]
    async fn test_submit_answer_validates_against_question_bank() {
        let store = InMemoryStore::new();
        let (_, invitations) = test_support::seed_survey(&store, 1).await;
        let token = &invitations[0].token;

        let unknown = SubmitAnswerRequest { question_id: "empathy".into(), answer: "High".into() };
        let err = submit_answer(&store, token, unknown).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        let bad_option = SubmitAnswerRequest {
            question_id: "leadership_effectiveness".into(),
            answer: "Amazing".into(),
        };
        assert!(submit_answer(&store, token, bad_option).await.is_err());

        let ok = SubmitAnswerRequest {
            question_id: "leadership_effectiveness".into(),
            answer: "Very effective - usually inspires and guides well".into(),
        };
        let receipt = submit_answer(&store, token, ok).await.unwrap();
        assert_eq!(receipt.question_id, "leadership_effectiveness");
    }

    #[tokio::test]
    async fn test_unknown_token_is_not_found() {
        let store = InMemoryStore::new();
        let request = SubmitAnswerRequest { question_id: "integrity".into(), answer: "x".into() };
        let err = submit_answer(&store, "not-a-token", request).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
        assert!(matches!(
            complete_by_token(&store, "not-a-token").await.unwrap_err(),
            AppError::NotFound(_)
        ));
    }

    #[tokio::test]
    async fn test_respondent_view_lists_questions_without_other_respondents() {
        let store = InMemoryStore::new();
        let (survey, invitations) = test_support::seed_survey(&store, 2).await;

        let view = respondent_view(&store, &invitations[0].token).await.unwrap();
        assert_eq!(view.survey_title, survey.title);
        assert_eq!(view.questions, questions_for(&survey.focus_areas));

        let json = serde_json::to_string(&view).unwrap();
        assert!(!json.contains(&invitations[1].email));
        assert!(!json.contains(&invitations[1].token));
    }
}
