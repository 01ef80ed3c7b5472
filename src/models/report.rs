use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::models::FocusArea;

pub const KEY_TRAITS_MAX: usize = 5;
pub const STRENGTHS_MAX: usize = 4;
pub const BLIND_SPOTS_MAX: usize = 3;
pub const ROADMAP_ITEMS_MAX: usize = 4;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PersonalitySnapshot {
    pub mbti_inference: String,
    pub mbti_description: String,
    pub core_archetype: String,
    pub archetype_description: String,
    pub key_traits: Vec<String>,
    pub personality_summary: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct Insight {
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub frequency: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StrengthsAndBlindSpots {
    pub strengths: Vec<Insight>,
    pub blind_spots: Vec<Insight>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ActionRoadmap {
    pub this_week: Vec<String>,
    pub this_month: Vec<String>,
    pub next_quarter: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReportMetadata {
    /// Number of completed invitations at generation time.
    pub total_responses: usize,
    pub focus_areas: Vec<FocusArea>,
    /// Mentor display name.
    pub mentor: String,
    pub generated_at: DateTime<Utc>,
}

/// The persisted insight report (`Survey.reportData`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InsightReport {
    pub personality: PersonalitySnapshot,
    pub strengths: Vec<Insight>,
    pub blind_spots: Vec<Insight>,
    pub mentor_commentary: String,
    pub action_steps: ActionRoadmap,
    pub metadata: ReportMetadata,
}

/// A report section produced by the text generator.
///
/// `normalize` trims the section to its documented shape and rejects output
/// that is missing required content.
pub trait GeneratedSection: DeserializeOwned + Sized {
    const NAME: &'static str;

    fn normalize(self) -> Result<Self, String>;

    /// Parses raw generator output (JSON, optionally inside a markdown fence).
    fn parse(raw: &str) -> Result<Self, String> {
        let body = strip_code_fence(raw);
        let section: Self = serde_json::from_str(body)
            .map_err(|e| format!("{}: malformed JSON from generator: {}", Self::NAME, e))?;
        section.normalize()
    }
}

impl GeneratedSection for PersonalitySnapshot {
    const NAME: &'static str = "personality";

    fn normalize(mut self) -> Result<Self, String> {
        self.key_traits = clean_list(self.key_traits, KEY_TRAITS_MAX);
        require_text(Self::NAME, "mbtiInference", &self.mbti_inference)?;
        require_text(Self::NAME, "coreArchetype", &self.core_archetype)?;
        require_text(Self::NAME, "personalitySummary", &self.personality_summary)?;
        require_items(Self::NAME, "keyTraits", self.key_traits.len())?;
        Ok(self)
    }
}

impl GeneratedSection for StrengthsAndBlindSpots {
    const NAME: &'static str = "strengths";

    fn normalize(mut self) -> Result<Self, String> {
        self.strengths = clean_insights(self.strengths, STRENGTHS_MAX);
        self.blind_spots = clean_insights(self.blind_spots, BLIND_SPOTS_MAX);
        require_items(Self::NAME, "strengths", self.strengths.len())?;
        require_items(Self::NAME, "blindSpots", self.blind_spots.len())?;
        Ok(self)
    }
}

impl GeneratedSection for ActionRoadmap {
    const NAME: &'static str = "actionSteps";

    fn normalize(mut self) -> Result<Self, String> {
        self.this_week = clean_list(self.this_week, ROADMAP_ITEMS_MAX);
        self.this_month = clean_list(self.this_month, ROADMAP_ITEMS_MAX);
        self.next_quarter = clean_list(self.next_quarter, ROADMAP_ITEMS_MAX);
        require_items(Self::NAME, "thisWeek", self.this_week.len())?;
        require_items(Self::NAME, "thisMonth", self.this_month.len())?;
        require_items(Self::NAME, "nextQuarter", self.next_quarter.len())?;
        Ok(self)
    }
}

/// Mentor commentary is plain text; fences and one pair of wrapping quotes
/// are dropped.
pub fn parse_commentary(raw: &str) -> Result<String, String> {
    let text = strip_code_fence(raw).trim();
    let text = text
        .strip_prefix('"')
        .and_then(|t| t.strip_suffix('"'))
        .unwrap_or(text)
        .trim();
    if text.is_empty() {
        return Err("mentorCommentary: generator returned no text".to_string());
    }
    Ok(text.to_string())
}

fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Skip an optional language tag on the opening fence line.
    let rest = match rest.find('\n') {
        Some(pos) => &rest[pos + 1..],
        None => rest,
    };
    rest.trim_end().strip_suffix("```").unwrap_or(rest).trim()
}

fn clean_list(items: Vec<String>, max: usize) -> Vec<String> {
    items
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .take(max)
        .collect()
}

fn clean_insights(items: Vec<Insight>, max: usize) -> Vec<Insight> {
    items
        .into_iter()
        .filter(|i| !i.title.trim().is_empty())
        .take(max)
        .collect()
}

fn require_text(section: &str, field: &str, value: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        return Err(format!("{}: '{}' is empty", section, field));
    }
    Ok(())
}

fn require_items(section: &str, field: &str, len: usize) -> Result<(), String> {
    if len == 0 {
        return Err(format!("{}: '{}' has no items", section, field));
    }
    Ok(())
}
