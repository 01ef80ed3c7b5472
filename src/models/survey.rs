use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::models::{FocusArea, InsightReport, Invitation, MentorPersona};
use crate::utils::{error::AppError, ids, validation};

/// Survey lifecycle: setup -> collecting -> completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SurveyStatus {
    Setup,
    Collecting,
    Completed,
}

impl SurveyStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SurveyStatus::Setup => "setup",
            SurveyStatus::Collecting => "collecting",
            SurveyStatus::Completed => "completed",
        }
    }
}

impl fmt::Display for SurveyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Subject's own answers collected during onboarding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct SelfAssessment {
    pub confidence_level: String,
    pub feedback_openness: String,
    pub growth_mindset: String,
    pub self_awareness: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub goals: Option<String>,
}

/// One feedback campaign (stored in the "surveys" collection).
///
/// `report_data` is set if and only if `status` is `Completed`; the only
/// write path that sets either is the lifecycle manager's completion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Survey {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub focus_areas: Vec<FocusArea>,
    pub ai_mentor: MentorPersona,
    pub status: SurveyStatus,
    #[serde(default)]
    pub self_assessment: Option<SelfAssessment>,
    #[serde(default)]
    pub report_data: Option<InsightReport>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SurveyWithInvitations {
    #[serde(flatten)]
    pub survey: Survey,
    pub invitations: Vec<Invitation>,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateSurveyRequest {
    pub user_id: String,
    pub title: String,
    pub focus_areas: Vec<FocusArea>,
    pub ai_mentor: MentorPersona,
    #[serde(default)]
    pub self_assessment: Option<SelfAssessment>,
}

impl CreateSurveyRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        validation::require_min_len("title", &self.title, 1)?;
        validate_focus_areas(&self.focus_areas)
    }

    pub fn into_survey(self) -> Survey {
        Survey {
            id: ids::new_id(),
            user_id: self.user_id,
            title: self.title.trim().to_string(),
            focus_areas: dedup_focus_areas(self.focus_areas),
            ai_mentor: self.ai_mentor,
            status: SurveyStatus::Setup,
            self_assessment: self.self_assessment,
            report_data: None,
            created_at: Utc::now(),
            completed_at: None,
        }
    }
}

/// Editable survey fields. Status and report are not writable here.
#[derive(Debug, Default, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateSurveyRequest {
    pub title: Option<String>,
    pub focus_areas: Option<Vec<FocusArea>>,
    pub ai_mentor: Option<MentorPersona>,
    pub self_assessment: Option<SelfAssessment>,
}

impl UpdateSurveyRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        if let Some(title) = &self.title {
            validation::require_min_len("title", title, 1)?;
        }
        if let Some(areas) = &self.focus_areas {
            validate_focus_areas(areas)?;
        }
        Ok(())
    }

    pub fn apply(self, survey: &mut Survey) {
        if let Some(title) = self.title {
            survey.title = title.trim().to_string();
        }
        if let Some(areas) = self.focus_areas {
            survey.focus_areas = dedup_focus_areas(areas);
        }
        if let Some(mentor) = self.ai_mentor {
            survey.ai_mentor = mentor;
        }
        if let Some(assessment) = self.self_assessment {
            survey.self_assessment = Some(assessment);
        }
    }
}

fn validate_focus_areas(areas: &[FocusArea]) -> Result<(), AppError> {
    if areas.is_empty() {
        return Err(AppError::validation(
            "focusAreas: select at least one focus area",
        ));
    }
    Ok(())
}

fn dedup_focus_areas(areas: Vec<FocusArea>) -> Vec<FocusArea> {
    let mut unique = Vec::with_capacity(areas.len());
    for area in areas {
        if !unique.contains(&area) {
            unique.push(area);
        }
    }
    unique
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(areas: Vec<FocusArea>) -> CreateSurveyRequest {
        CreateSurveyRequest {
            user_id: "u1".into(),
            title: "My 360".into(),
            focus_areas: areas,
            ai_mentor: MentorPersona::KobunAI,
            self_assessment: None,
        }
    }

    #[test]
    fn test_new_survey_starts_in_setup_without_report() {
        let survey = request(vec![FocusArea::Leadership]).into_survey();
        assert_eq!(survey.status, SurveyStatus::Setup);
        assert!(survey.report_data.is_none());
        assert!(survey.completed_at.is_none());
    }

    #[test]
    fn test_focus_areas_required_and_deduplicated() {
        assert!(request(vec![]).validate().is_err());
        let survey = request(vec![
            FocusArea::Leadership,
            FocusArea::Character,
            FocusArea::Leadership,
        ])
        .into_survey();
        assert_eq!(survey.focus_areas, vec![FocusArea::Leadership, FocusArea::Character]);
    }

    #[test]
    fn test_update_rejects_status_and_report_fields() {
        let body = serde_json::json!({ "status": "completed" });
        assert!(serde_json::from_value::<UpdateSurveyRequest>(body).is_err());
        let body = serde_json::json!({ "reportData": {} });
        assert!(serde_json::from_value::<UpdateSurveyRequest>(body).is_err());
    }

    #[test]
    fn test_create_request_wire_shape() {
        let body = serde_json::json!({
            "userId": "u1",
            "title": "Feedback",
            "focusAreas": ["communication"],
            "aiMentor": "SteveAI",
            "selfAssessment": {
                "confidence_level": "Very confident",
                "feedback_openness": "Very open",
                "growth_mindset": "Agree",
                "self_awareness": "Neutral"
            }
        });
        let req: CreateSurveyRequest = serde_json::from_value(body).unwrap();
        assert_eq!(req.ai_mentor, MentorPersona::SteveAI);
        assert_eq!(req.self_assessment.unwrap().goals, None);
    }
}
