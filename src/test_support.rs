//! Fixtures and scripted collaborators shared by unit tests.

use actix_web::web;
use async_trait::async_trait;
use chrono::Utc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::database::{InMemoryStore, SurveyStore};
use crate::models::{
    ActionRoadmap, CreateSurveyRequest, CreateUserRequest, FocusArea, Insight, InsightReport,
    Invitation, MentorPersona, NewInvitation, PersonalitySnapshot, Relationship, ReportMetadata,
    Survey, User,
};
use crate::services::mail_service::{EmailMessage, Mailer};
use crate::services::openai_service::{GenerationRequest, TextGenerator};
use crate::services::pdf_service::PdfRenderer;
use crate::services::prompts::ReportSection;
use crate::services::survey_service;
use crate::state::AppState;
use crate::utils::{error::AppError, ids};

pub const FOCUS_AREAS: [FocusArea; 2] = [FocusArea::Leadership, FocusArea::Character];

pub async fn seed_user(store: &dyn SurveyStore) -> User {
    let request = CreateUserRequest {
        email: format!("subject-{}@example.com", ids::new_id()),
        name: "Jordan Lee".into(),
    };
    survey_service::get_or_create_user(store, request)
        .await
        .unwrap()
        .0
}

/// A subject, a collecting survey over [`FOCUS_AREAS`] and `respondents`
/// pending invitations.
pub async fn seed_survey(store: &dyn SurveyStore, respondents: usize) -> (Survey, Vec<Invitation>) {
    let user = seed_user(store).await;
    let survey = survey_service::create_survey(
        store,
        CreateSurveyRequest {
            user_id: user.id,
            title: "Quarterly 360".into(),
            focus_areas: FOCUS_AREAS.to_vec(),
            ai_mentor: MentorPersona::KobunAI,
            self_assessment: None,
        },
    )
    .await
    .unwrap();

    let contacts = (0..respondents)
        .map(|i| NewInvitation {
            name: format!("Respondent {}", i + 1),
            email: format!("respondent{}-{}@example.com", i + 1, ids::new_id()),
            relationship: Relationship::Coworker,
        })
        .collect();
    let invitations = survey_service::add_invitations(store, &survey.id, contacts)
        .await
        .unwrap();
    let survey = store.get_survey(&survey.id).await.unwrap().unwrap();
    (survey, invitations)
}

pub fn sample_survey(user_id: &str) -> Survey {
    CreateSurveyRequest {
        user_id: user_id.into(),
        title: "Sample".into(),
        focus_areas: FOCUS_AREAS.to_vec(),
        ai_mentor: MentorPersona::MarcusAI,
        self_assessment: None,
    }
    .into_survey()
}

pub fn sample_invitation(survey_id: &str) -> Invitation {
    NewInvitation {
        name: "Ana".into(),
        email: "ana@example.com".into(),
        relationship: Relationship::Manager,
    }
    .into_invitation(survey_id)
}

fn insight(title: &str) -> Insight {
    Insight {
        title: title.into(),
        description: format!("{} shows up consistently", title),
        frequency: "Mentioned by 3/3 respondents".into(),
    }
}

pub fn sample_report() -> InsightReport {
    InsightReport {
        personality: PersonalitySnapshot {
            mbti_inference: "INFJ".into(),
            mbti_description: "Quiet, principled idealist".into(),
            core_archetype: "The Steady Guide".into(),
            archetype_description: "Leads through example".into(),
            key_traits: vec!["calm".into(), "fair".into(), "direct".into()],
            personality_summary: "A dependable presence others rely on.".into(),
        },
        strengths: vec![insight("Integrity"), insight("Listening")],
        blind_spots: vec![insight("Delegation")],
        mentor_commentary: "Be where your feet are.".into(),
        action_steps: ActionRoadmap {
            this_week: vec!["Ask one teammate for feedback".into()],
            this_month: vec!["Delegate a recurring task".into()],
            next_quarter: vec!["Mentor a new hire".into()],
        },
        metadata: ReportMetadata {
            total_responses: 3,
            focus_areas: FOCUS_AREAS.to_vec(),
            mentor: "Kobun Chino".into(),
            generated_at: Utc::now(),
        },
    }
}

// ==================== SCRIPTED GENERATOR ====================

fn section_of(request: &GenerationRequest) -> ReportSection {
    let prompt = &request.prompt;
    if prompt.contains("growth roadmap") {
        ReportSection::ActionSteps
    } else if prompt.contains("personality assessment") {
        ReportSection::Personality
    } else if prompt.contains("strengths and blind spots") {
        ReportSection::StrengthsAndBlindSpots
    } else {
        ReportSection::MentorCommentary
    }
}

fn canned(section: ReportSection) -> String {
    match section {
        ReportSection::Personality => serde_json::json!({
            "mbtiInference": "INFJ",
            "mbtiDescription": "Quiet, principled idealist",
            "coreArchetype": "The Steady Guide",
            "archetypeDescription": "Leads through example",
            "keyTraits": ["calm", "fair", "direct", "curious", "loyal"],
            "personalitySummary": "A dependable presence others rely on."
        })
        .to_string(),
        ReportSection::StrengthsAndBlindSpots => serde_json::json!({
            "strengths": [
                { "title": "Integrity", "description": "Keeps promises", "frequency": "3/3" },
                { "title": "Listening", "description": "Hears people out", "frequency": "2/3" }
            ],
            "blindSpots": [
                { "title": "Delegation", "description": "Holds on to work", "frequency": "2/3" }
            ]
        })
        .to_string(),
        ReportSection::MentorCommentary => "Be where your feet are.".to_string(),
        ReportSection::ActionSteps => format!(
            "```json\n{}\n```",
            serde_json::json!({
                "thisWeek": ["Ask one teammate for feedback"],
                "thisMonth": ["Delegate a recurring task"],
                "nextQuarter": ["Mentor a new hire"]
            })
        ),
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Fault {
    Fail,
    Malformed,
}

/// Answers each section with canned output; can fail or garble one section.
#[derive(Default)]
pub struct ScriptedGenerator {
    fault: Option<(ReportSection, Fault)>,
    delay: Option<Duration>,
    calls: AtomicUsize,
}

impl ScriptedGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(section: ReportSection) -> Self {
        Self { fault: Some((section, Fault::Fail)), ..Self::default() }
    }

    pub fn malformed(section: ReportSection) -> Self {
        Self { fault: Some((section, Fault::Malformed)), ..Self::default() }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, AppError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let section = section_of(request);
        match self.fault {
            Some((s, Fault::Fail)) if s == section => {
                Err(AppError::upstream("scripted generator failure"))
            }
            Some((s, Fault::Malformed)) if s == section => Ok("{\"unexpected\": true}".into()),
            _ => Ok(canned(section)),
        }
    }
}

// ==================== MAILER / RENDERER ====================

#[derive(Default)]
pub struct RecordingMailer {
    fail_for: Option<String>,
    sent: Mutex<Vec<EmailMessage>>,
}

impl RecordingMailer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_for(email: &str) -> Self {
        Self { fail_for: Some(email.to_string()), ..Self::default() }
    }

    pub fn sent(&self) -> Vec<EmailMessage> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, message: &EmailMessage) -> Result<(), AppError> {
        if self.fail_for.as_deref() == Some(message.to.as_str()) {
            return Err(AppError::upstream("mailbox unavailable"));
        }
        self.sent.lock().unwrap().push(message.clone());
        Ok(())
    }
}

pub struct StubRenderer;

#[async_trait]
impl PdfRenderer for StubRenderer {
    async fn render(&self, html: &str) -> Result<Vec<u8>, AppError> {
        let mut bytes = b"%PDF-1.4\n".to_vec();
        bytes.extend_from_slice(&html.len().to_le_bytes());
        Ok(bytes)
    }
}

/// Handler state over a fresh in-memory store and the given generator.
pub fn app_state(generator: ScriptedGenerator) -> web::Data<AppState> {
    web::Data::new(AppState::new(
        Arc::new(InMemoryStore::new()),
        Arc::new(generator),
        Arc::new(RecordingMailer::new()),
        Arc::new(StubRenderer),
        Duration::from_secs(5),
        "http://localhost:5000",
    ))
}
