use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use std::fmt::Write;
use std::time::Duration;

use crate::database::SurveyStore;
use crate::models::{Insight, InsightReport};
use crate::services::survey_service;
use crate::utils::{error::AppError, html};

/// HTML to PDF rendering collaborator.
#[async_trait]
pub trait PdfRenderer: Send + Sync {
    async fn render(&self, html: &str) -> Result<Vec<u8>, AppError>;
}

/// Gotenberg-compatible Chromium HTML conversion endpoint.
pub struct GotenbergRenderer {
    http: reqwest::Client,
    base_url: String,
}

impl GotenbergRenderer {
    pub fn new(base_url: &str) -> Result<Self, AppError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| AppError::upstream(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl PdfRenderer for GotenbergRenderer {
    async fn render(&self, html: &str) -> Result<Vec<u8>, AppError> {
        let url = format!("{}/forms/chromium/convert/html", self.base_url);
        let page = Part::bytes(html.as_bytes().to_vec())
            .file_name("index.html")
            .mime_str("text/html")?;

        let response = self
            .http
            .post(&url)
            .multipart(Form::new().part("files", page))
            .send()
            .await
            .map_err(|e| AppError::upstream(format!("PDF renderer request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::upstream(format!("PDF renderer error: {}", status)));
        }
        Ok(response.bytes().await?.to_vec())
    }
}

/// Download file name: `360-insight-report-<slug>.pdf`.
pub fn report_filename(subject_name: &str) -> String {
    let slug = subject_name
        .split_whitespace()
        .map(|word| {
            word.chars()
                .filter(|c| c.is_ascii_alphanumeric() || *c == '-')
                .collect::<String>()
                .to_lowercase()
        })
        .filter(|word| !word.is_empty())
        .collect::<Vec<_>>()
        .join("-");

    if slug.is_empty() {
        "360-insight-report.pdf".to_string()
    } else {
        format!("360-insight-report-{}.pdf", slug)
    }
}

fn insight_list(out: &mut String, heading: &str, items: &[Insight]) {
    let _ = write!(out, "<h2>{}</h2><ul>", heading);
    for item in items {
        let _ = write!(
            out,
            "<li><strong>{}</strong> {}",
            html::escape(&item.title),
            html::escape(&item.description)
        );
        if !item.frequency.is_empty() {
            let _ = write!(out, " <em>({})</em>", html::escape(&item.frequency));
        }
        out.push_str("</li>");
    }
    out.push_str("</ul>");
}

fn text_list(out: &mut String, heading: &str, items: &[String]) {
    let _ = write!(out, "<h3>{}</h3><ul>", heading);
    for item in items {
        let _ = write!(out, "<li>{}</li>", html::escape(item));
    }
    out.push_str("</ul>");
}

/// Printable HTML for a stored report. All generator text is escaped.
pub fn render_report_html(report: &InsightReport, subject_name: &str) -> String {
    let p = &report.personality;
    let mut out = String::with_capacity(4096);

    let _ = write!(
        out,
        r#"<!DOCTYPE html><html><head><meta charset="utf-8"><title>360° Insight Report - {name}</title>
<style>body{{font-family:sans-serif;color:#1e293b;margin:40px;line-height:1.5}}h1{{color:#2563eb}}h2{{border-bottom:1px solid #e2e8f0;padding-bottom:4px}}</style>
</head><body><h1>360° Insight Report</h1><p>{name} · Mentor: {mentor} · {date}</p>"#,
        name = html::escape(subject_name),
        mentor = html::escape(&report.metadata.mentor),
        date = report.metadata.generated_at.format("%B %-d, %Y"),
    );

    let areas: Vec<&str> = report.metadata.focus_areas.iter().map(|a| a.label()).collect();
    let _ = write!(out, "<p>Focus areas: {}</p>", html::escape(&areas.join(", ")));

    let _ = write!(
        out,
        "<h2>Personality Snapshot</h2><p><strong>{}</strong> {}</p><p><strong>{}</strong> {}</p><p>{}</p>",
        html::escape(&p.mbti_inference),
        html::escape(&p.mbti_description),
        html::escape(&p.core_archetype),
        html::escape(&p.archetype_description),
        html::escape(&p.personality_summary),
    );
    let traits: Vec<String> = p.key_traits.iter().map(|t| html::escape(t)).collect();
    let _ = write!(out, "<p>Key traits: {}</p>", traits.join(", "));

    insight_list(&mut out, "Strengths", &report.strengths);
    insight_list(&mut out, "Blind Spots", &report.blind_spots);

    let _ = write!(
        out,
        "<h2>Words from {}</h2><blockquote>{}</blockquote>",
        html::escape(&report.metadata.mentor),
        html::escape(&report.mentor_commentary)
    );

    out.push_str("<h2>Action Roadmap</h2>");
    text_list(&mut out, "This Week", &report.action_steps.this_week);
    text_list(&mut out, "This Month", &report.action_steps.this_month);
    text_list(&mut out, "Next Quarter", &report.action_steps.next_quarter);

    let _ = write!(
        out,
        "<p><small>Based on {} completed responses.</small></p></body></html>",
        report.metadata.total_responses
    );
    out
}

pub struct RenderedReport {
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// Renders the persisted report. A survey without a report is `NotFound`.
pub async fn report_pdf(
    store: &dyn SurveyStore,
    renderer: &dyn PdfRenderer,
    survey_id: &str,
) -> Result<RenderedReport, AppError> {
    let survey = survey_service::get_survey(store, survey_id).await?;
    let report = survey
        .report_data
        .as_ref()
        .ok_or_else(|| AppError::not_found("Report"))?;
    let subject = survey_service::get_user(store, &survey.user_id).await?;

    let bytes = renderer
        .render(&render_report_html(report, &subject.name))
        .await?;
    log::info!("📄 Rendered report PDF for survey {} ({} bytes)", survey_id, bytes.len());

    Ok(RenderedReport {
        filename: report_filename(&subject.name),
        bytes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::InMemoryStore;
    use crate::services::lifecycle_service::{complete_invitation, mark_survey_completed};
    use crate::test_support::{self, StubRenderer};

    #[test]
    fn test_report_filename_slug() {
        assert_eq!(report_filename("Dana  Scully"), "360-insight-report-dana-scully.pdf");
        assert_eq!(report_filename("Zoë O'Neil"), "360-insight-report-zo-oneil.pdf");
        assert_eq!(report_filename("  "), "360-insight-report.pdf");
    }

    #[test]
    fn test_report_html_escapes_generator_text() {
        let mut report = test_support::sample_report();
        report.mentor_commentary = "<script>alert(1)</script>".into();
        let page = render_report_html(&report, "Dana");
        assert!(!page.contains("<script>"));
        assert!(page.contains("&lt;script&gt;"));
        assert!(page.contains(&report.personality.mbti_inference));
        assert!(page.contains("Next Quarter"));
        assert!(page.contains("Focus areas: Leadership Style, Character &amp; Values"));
    }

    #[tokio::test]
    async fn test_pdf_requires_a_stored_report() {
        let store = InMemoryStore::new();
        let (survey, invitations) = test_support::seed_survey(&store, 3).await;
        let renderer = StubRenderer;

        let err = report_pdf(&store, &renderer, &survey.id).await.err().unwrap();
        assert!(matches!(err, AppError::NotFound(_)));

        for invitation in &invitations {
            complete_invitation(&store, invitation).await.unwrap();
        }
        mark_survey_completed(&store, &survey.id, &test_support::sample_report())
            .await
            .unwrap();

        let rendered = report_pdf(&store, &renderer, &survey.id).await.unwrap();
        assert!(rendered.bytes.starts_with(b"%PDF"));
        assert!(rendered.filename.starts_with("360-insight-report-"));
    }
}
