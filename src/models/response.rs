use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{Question, QuestionKind};
use crate::utils::{error::AppError, ids};

/// Answer payload, classified against the question it answers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Answer {
    /// One of the question's options, verbatim.
    Choice(String),
    Text(String),
}

impl Answer {
    pub fn value(&self) -> &str {
        match self {
            Answer::Choice(v) | Answer::Text(v) => v,
        }
    }

    /// Checks a raw answer against the question definition.
    pub fn for_question(question: &Question, raw: &str) -> Result<Self, AppError> {
        match question.kind {
            QuestionKind::Choice { options } => options
                .iter()
                .find(|opt| **opt == raw)
                .map(|opt| Answer::Choice(opt.to_string()))
                .ok_or_else(|| {
                    AppError::validation(format!(
                        "answer: not an option of question '{}'",
                        question.id
                    ))
                }),
            QuestionKind::Text => {
                let text = raw.trim();
                if text.is_empty() {
                    return Err(AppError::validation("answer: must not be empty"));
                }
                Ok(Answer::Text(text.to_string()))
            }
        }
    }
}

/// One stored answer (collection "responses").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Response {
    pub id: String,
    pub invitation_id: String,
    pub question_id: String,
    pub answer: Answer,
    pub created_at: DateTime<Utc>,
}

impl Response {
    pub fn new(invitation_id: &str, question_id: &str, answer: Answer) -> Self {
        Self {
            id: ids::new_id(),
            invitation_id: invitation_id.to_string(),
            question_id: question_id.to_string(),
            answer,
            created_at: Utc::now(),
        }
    }
}

/// Respondent-free projection of a response, as handed to the aggregator.
/// Carries no invitation or respondent field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnsweredQuestion {
    pub question_id: String,
    pub answer: Answer,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmitAnswerRequest {
    pub question_id: String,
    pub answer: String,
}

/// Acknowledgement returned to the respondent (no identifiers echoed back).
#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnswerReceipt {
    pub question_id: String,
    pub recorded_at: DateTime<Utc>,
}
