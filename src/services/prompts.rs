//! Prompt templates for the four report sections.
//!
//! Every prompt embeds the aggregated answers as JSON. The aggregate only
//! carries question ids and answer values, so nothing here can name a
//! respondent.

use crate::models::MentorPersona;
use crate::services::aggregation_service::AggregatedAnswers;
use crate::services::openai_service::{GenerationRequest, ResponseFormat};

/// Which report section a prompt produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportSection {
    Personality,
    StrengthsAndBlindSpots,
    MentorCommentary,
    ActionSteps,
}

impl ReportSection {
    pub const ALL: [ReportSection; 4] = [
        ReportSection::Personality,
        ReportSection::StrengthsAndBlindSpots,
        ReportSection::MentorCommentary,
        ReportSection::ActionSteps,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ReportSection::Personality => "personality",
            ReportSection::StrengthsAndBlindSpots => "strengths",
            ReportSection::MentorCommentary => "mentorCommentary",
            ReportSection::ActionSteps => "actionSteps",
        }
    }

    fn format(&self) -> ResponseFormat {
        match self {
            ReportSection::MentorCommentary => ResponseFormat::Text,
            _ => ResponseFormat::JsonObject,
        }
    }

    fn system_suffix(&self) -> &'static str {
        match self {
            ReportSection::Personality => {
                "Analyze feedback with your unique perspective and wisdom."
            }
            ReportSection::StrengthsAndBlindSpots => "Focus on actionable insights.",
            ReportSection::MentorCommentary => {
                "Speak in your authentic voice with your characteristic wisdom and perspective."
            }
            ReportSection::ActionSteps => "Provide practical, actionable advice in your style.",
        }
    }
}

const PERSONALITY_SHAPE: &str = r#"{
  "mbtiInference": "XXXX",
  "mbtiDescription": "Brief description",
  "coreArchetype": "The [Role] [Type]",
  "archetypeDescription": "Brief description",
  "keyTraits": ["trait1", "trait2", "trait3", "trait4", "trait5"],
  "personalitySummary": "2-3 sentence summary of personality"
}"#;

const STRENGTHS_SHAPE: &str = r#"{
  "strengths": [
    { "title": "Strength Name", "description": "How this strength manifests", "frequency": "Mentioned by X/Y respondents" }
  ],
  "blindSpots": [
    { "title": "Blind Spot Name", "description": "How this shows up", "frequency": "Noted by X/Y respondents" }
  ]
}"#;

const ROADMAP_SHAPE: &str = r#"{
  "thisWeek": ["Specific action item", "Another specific action"],
  "thisMonth": ["Medium-term goal", "Another monthly goal"],
  "nextQuarter": ["Long-term development area", "Strategic improvement"]
}"#;

pub fn system_prompt(mentor: MentorPersona, section: ReportSection) -> String {
    format!(
        "You are {}, known for {}. {}. {}",
        mentor.display_name(),
        mentor.specialty(),
        mentor.voice(),
        section.system_suffix()
    )
}

/// Builds the user prompt for one section.
pub fn section_prompt(
    section: ReportSection,
    mentor: MentorPersona,
    subject_name: &str,
    answers: &AggregatedAnswers,
) -> String {
    let mentor_name = mentor.display_name();
    let feedback = answers.to_json();

    match section {
        ReportSection::Personality => format!(
            r#"As {mentor_name}, analyze the 360-degree feedback for {subject_name} and provide a personality assessment.

Feedback data: {feedback}

Based on the feedback patterns, respond with a JSON object of exactly this shape:
{PERSONALITY_SHAPE}"#
        ),
        ReportSection::StrengthsAndBlindSpots => format!(
            r#"As {mentor_name}, identify {subject_name}'s key strengths and blind spots from this 360-degree feedback.

Feedback data: {feedback}

Respond with a JSON object of exactly this shape:
{STRENGTHS_SHAPE}

Provide 3-4 strengths and 2-3 blind spots based on the feedback patterns."#
        ),
        ReportSection::MentorCommentary => format!(
            r#"As {mentor_name}, provide a thoughtful, personalized commentary on {subject_name}'s 360-degree feedback.

Feedback data: {feedback}

Write 2-3 sentences in your voice and style, offering wisdom and perspective that only you could provide. Make it personal and actionable. Reply with plain text only, no JSON and no markdown."#
        ),
        ReportSection::ActionSteps => format!(
            r#"As {mentor_name}, create a practical growth roadmap for {subject_name} based on this feedback.

Feedback data: {feedback}

Respond with a JSON object of exactly this shape:
{ROADMAP_SHAPE}

Focus on 3-4 actionable items per timeframe, specific to the feedback patterns."#
        ),
    }
}

/// Full generator request for one section.
pub fn section_request(
    section: ReportSection,
    mentor: MentorPersona,
    subject_name: &str,
    answers: &AggregatedAnswers,
) -> GenerationRequest {
    GenerationRequest {
        system: system_prompt(mentor, section),
        prompt: section_prompt(section, mentor, subject_name, answers),
        format: section.format(),
    }
}
