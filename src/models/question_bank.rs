// Static question banks, one per focus area.
// Questions are not persisted; responses reference them by id.

use serde::{Deserialize, Serialize};

/// Suffix of the optional free-text follow-up asked after every
/// multiple-choice question.
pub const EXAMPLE_SUFFIX: &str = "_example";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum FocusArea {
    Leadership,
    Communication,
    EmotionalIntelligence,
    ProblemSolving,
    Collaboration,
    Character,
}

impl FocusArea {
    pub fn label(&self) -> &'static str {
        match self {
            FocusArea::Leadership => "Leadership Style",
            FocusArea::Communication => "Communication",
            FocusArea::EmotionalIntelligence => "Emotional Intelligence",
            FocusArea::ProblemSolving => "Problem Solving",
            FocusArea::Collaboration => "Collaboration",
            FocusArea::Character => "Character & Values",
        }
    }

    fn bank(&self) -> &'static [BankEntry] {
        match self {
            FocusArea::Leadership => LEADERSHIP,
            FocusArea::Communication => COMMUNICATION,
            FocusArea::EmotionalIntelligence => EMOTIONAL_INTELLIGENCE,
            FocusArea::ProblemSolving => PROBLEM_SOLVING,
            FocusArea::Collaboration => COLLABORATION,
            FocusArea::Character => CHARACTER,
        }
    }
}

/// How a question is answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type")]
pub enum QuestionKind {
    #[serde(rename = "radio")]
    Choice { options: &'static [&'static str] },
    #[serde(rename = "textarea")]
    Text,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Question {
    pub id: String,
    pub question: &'static str,
    #[serde(flatten)]
    pub kind: QuestionKind,
    pub optional: bool,
}

struct BankEntry {
    id: &'static str,
    prompt: &'static str,
    options: &'static [&'static str],
}

/// Ordered question list for a survey: every bank question of each focus
/// area, each followed by its optional example question.
pub fn questions_for(focus_areas: &[FocusArea]) -> Vec<Question> {
    focus_areas
        .iter()
        .flat_map(|area| area.bank())
        .flat_map(|entry| {
            [
                Question {
                    id: entry.id.to_string(),
                    question: entry.prompt,
                    kind: QuestionKind::Choice { options: entry.options },
                    optional: false,
                },
                Question {
                    id: format!("{}{}", entry.id, EXAMPLE_SUFFIX),
                    question: "Share a specific example (optional)",
                    kind: QuestionKind::Text,
                    optional: true,
                },
            ]
        })
        .collect()
}

/// Looks a question id up among the banks selected by `focus_areas`.
pub fn find_question(focus_areas: &[FocusArea], question_id: &str) -> Option<Question> {
    questions_for(focus_areas)
        .into_iter()
        .find(|q| q.id == question_id)
}

const LEADERSHIP: &[BankEntry] = &[
    BankEntry {
        id: "leadership_effectiveness",
        prompt: "How effectively does this person lead and inspire others?",
        options: &[
            "Exceptionally effective - consistently inspires and motivates",
            "Very effective - usually inspires and guides well",
            "Moderately effective - sometimes provides good leadership",
            "Somewhat effective - occasional leadership moments",
            "Ineffective - rarely demonstrates leadership qualities",
        ],
    },
    BankEntry {
        id: "decision_making",
        prompt: "How would you rate their decision-making abilities?",
        options: &[
            "Excellent - makes sound decisions quickly and confidently",
            "Good - generally makes good decisions with consideration",
            "Average - decisions are reasonable but sometimes delayed",
            "Below average - decisions often lack clarity or timing",
            "Poor - frequently makes questionable decisions",
        ],
    },
];

const COMMUNICATION: &[BankEntry] = &[
    BankEntry {
        id: "communication_clarity",
        prompt: "How effectively does this person communicate complex ideas to different audiences?",
        options: &[
            "Exceptionally clear - always adapts message to audience",
            "Very clear - usually adapts well to different audiences",
            "Moderately clear - some adaptation to audience",
            "Sometimes unclear - limited audience adaptation",
            "Often unclear - difficulty adapting to audience",
        ],
    },
    BankEntry {
        id: "listening_skills",
        prompt: "How well do they listen and respond to others?",
        options: &[
            "Excellent listener - always engaged and responsive",
            "Good listener - usually attentive and understanding",
            "Average listener - sometimes distracted but tries",
            "Poor listener - often distracted or dismissive",
            "Very poor listener - rarely pays attention to others",
        ],
    },
];

const EMOTIONAL_INTELLIGENCE: &[BankEntry] = &[
    BankEntry {
        id: "emotional_awareness",
        prompt: "How well does this person understand and manage their emotions?",
        options: &[
            "Excellent - highly self-aware and emotionally regulated",
            "Good - generally manages emotions well",
            "Average - sometimes struggles with emotional control",
            "Below average - often lets emotions drive behavior",
            "Poor - frequently emotionally reactive or unaware",
        ],
    },
    BankEntry {
        id: "empathy",
        prompt: "How empathetic and understanding are they towards others?",
        options: &[
            "Extremely empathetic - always considers others' perspectives",
            "Very empathetic - usually understanding and supportive",
            "Moderately empathetic - sometimes shows understanding",
            "Somewhat empathetic - occasional awareness of others",
            "Not empathetic - rarely considers others' feelings",
        ],
    },
];

const PROBLEM_SOLVING: &[BankEntry] = &[BankEntry {
    id: "analytical_thinking",
    prompt: "How effectively do they analyze and solve complex problems?",
    options: &[
        "Exceptional - quickly identifies root causes and solutions",
        "Strong - generally good at breaking down problems",
        "Average - can solve problems with some guidance",
        "Weak - struggles to analyze complex issues",
        "Very weak - needs significant help with problem-solving",
    ],
}];

const COLLABORATION: &[BankEntry] = &[BankEntry {
    id: "teamwork",
    prompt: "How well do they work with others in team settings?",
    options: &[
        "Excellent team player - enhances team performance",
        "Good team player - contributes positively to teams",
        "Average - adequate team participation",
        "Below average - sometimes creates team friction",
        "Poor - often disrupts team dynamics",
    ],
}];

const CHARACTER: &[BankEntry] = &[BankEntry {
    id: "integrity",
    prompt: "How would you rate their integrity and ethical behavior?",
    options: &[
        "Extremely high - always acts with integrity",
        "High - consistently ethical and trustworthy",
        "Good - generally acts with good character",
        "Average - sometimes compromises on values",
        "Poor - frequently acts without integrity",
    ],
}];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_each_choice_question_is_followed_by_its_example() {
        let questions = questions_for(&[FocusArea::Leadership]);
        let ids: Vec<&str> = questions.iter().map(|q| q.id.as_str()).collect();
        assert_eq!(
            ids,
            vec![
                "leadership_effectiveness",
                "leadership_effectiveness_example",
                "decision_making",
                "decision_making_example",
            ]
        );
        assert!(!questions[0].optional);
        assert!(questions[1].optional);
        assert_eq!(questions[1].kind, QuestionKind::Text);
    }

    #[test]
    fn test_find_question_is_scoped_to_focus_areas() {
        let areas = [FocusArea::Communication, FocusArea::Character];
        assert!(find_question(&areas, "integrity").is_some());
        assert!(find_question(&areas, "listening_skills_example").is_some());
        assert!(find_question(&areas, "teamwork").is_none());
        assert!(find_question(&areas, "").is_none());
    }

    #[test]
    fn test_focus_area_tags() {
        let area: FocusArea = serde_json::from_str("\"emotional_intelligence\"").unwrap();
        assert_eq!(area, FocusArea::EmotionalIntelligence);
        assert!(serde_json::from_str::<FocusArea>("\"cooking\"").is_err());
    }

    #[test]
    fn test_question_serializes_with_client_type_tags() {
        let question = &questions_for(&[FocusArea::Collaboration])[0];
        let json = serde_json::to_value(question).unwrap();
        assert_eq!(json["type"], "radio");
        assert_eq!(json["options"].as_array().unwrap().len(), 5);
        assert_eq!(json["id"], "teamwork");
    }
}
