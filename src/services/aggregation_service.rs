use serde::Serialize;
use std::collections::BTreeMap;

use crate::database::SurveyStore;
use crate::models::AnsweredQuestion;
use crate::utils::error::AppError;

/// Answer values grouped by question id.
///
/// The only thing this type can hold is question ids mapped to answer
/// strings; there is no slot for an invitation or respondent. Questions
/// without answers are absent rather than mapped to an empty list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct AggregatedAnswers(BTreeMap<String, Vec<String>>);

impl AggregatedAnswers {
    pub fn push(&mut self, question_id: &str, answer: &str) {
        self.0
            .entry(question_id.to_string())
            .or_default()
            .push(answer.to_string());
    }

    pub fn get(&self, question_id: &str) -> Option<&[String]> {
        self.0.get(question_id).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn answer_count(&self) -> usize {
        self.0.values().map(Vec::len).sum()
    }

    /// Compact JSON embedded into generator prompts.
    pub fn to_json(&self) -> String {
        serde_json::to_string(&self.0).unwrap_or_else(|_| "{}".to_string())
    }
}

impl FromIterator<AnsweredQuestion> for AggregatedAnswers {
    fn from_iter<I: IntoIterator<Item = AnsweredQuestion>>(iter: I) -> Self {
        let mut answers = AggregatedAnswers::default();
        for answered in iter {
            answers.push(&answered.question_id, answered.answer.value());
        }
        answers
    }
}

/// Groups every answer given under a survey by question id.
///
/// The join runs in the store; within a question, answers keep fetch order.
pub async fn aggregate(
    store: &dyn SurveyStore,
    survey_id: &str,
) -> Result<AggregatedAnswers, AppError> {
    let answered = store.survey_answers(survey_id).await?;
    let answers: AggregatedAnswers = answered.into_iter().collect();
    log::debug!(
        "📊 Aggregated {} answers over {} questions for survey {}",
        answers.answer_count(),
        answers.len(),
        survey_id
    );
    Ok(answers)
}
