use async_trait::async_trait;
use chrono::Utc;
use serde::Serialize;
use std::time::Duration;

use crate::database::SurveyStore;
use crate::models::{Invitation, InvitationStatus, SurveyStatus};
use crate::services::survey_service;
use crate::utils::{error::AppError, html};

const SENDGRID_SEND_URL: &str = "https://api.sendgrid.com/v3/mail/send";

#[derive(Debug, Clone, PartialEq)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub text: String,
    pub html: String,
}

/// Outbound email collaborator.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, message: &EmailMessage) -> Result<(), AppError>;
}

// ==================== SENDGRID ====================

#[derive(Serialize)]
struct Address<'a> {
    email: &'a str,
}

#[derive(Serialize)]
struct Personalization<'a> {
    to: Vec<Address<'a>>,
}

#[derive(Serialize)]
struct Content<'a> {
    #[serde(rename = "type")]
    kind: &'a str,
    value: &'a str,
}

#[derive(Serialize)]
struct SendGridRequest<'a> {
    personalizations: Vec<Personalization<'a>>,
    from: Address<'a>,
    subject: &'a str,
    content: Vec<Content<'a>>,
}

/// SendGrid v3 mail-send over HTTP.
pub struct SendGridMailer {
    http: reqwest::Client,
    api_key: String,
    from: String,
}

impl SendGridMailer {
    pub fn new(api_key: &str, from: &str) -> Result<Self, AppError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .map_err(|e| AppError::upstream(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self {
            http,
            api_key: api_key.to_string(),
            from: from.to_string(),
        })
    }

    fn request_body<'a>(&'a self, message: &'a EmailMessage) -> SendGridRequest<'a> {
        SendGridRequest {
            personalizations: vec![Personalization {
                to: vec![Address { email: &message.to }],
            }],
            from: Address { email: &self.from },
            subject: &message.subject,
            content: vec![
                Content { kind: "text/plain", value: &message.text },
                Content { kind: "text/html", value: &message.html },
            ],
        }
    }
}

#[async_trait]
impl Mailer for SendGridMailer {
    async fn send(&self, message: &EmailMessage) -> Result<(), AppError> {
        let response = self
            .http
            .post(SENDGRID_SEND_URL)
            .bearer_auth(&self.api_key)
            .json(&self.request_body(message))
            .send()
            .await
            .map_err(|e| AppError::upstream(format!("Email request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::upstream(format!(
                "Email API error: {} {}",
                status,
                body.chars().take(200).collect::<String>()
            )));
        }
        Ok(())
    }
}

/// Used when no SendGrid key is configured: nothing leaves the process.
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, message: &EmailMessage) -> Result<(), AppError> {
        log::info!("📧 [log mailer] to={} subject={:?}", message.to, message.subject);
        Ok(())
    }
}

// ==================== TEMPLATES ====================

pub fn survey_link(base_url: &str, token: &str) -> String {
    format!("{}/survey/{}", base_url.trim_end_matches('/'), token)
}

pub fn invitation_email(invitation: &Invitation, subject_name: &str, base_url: &str) -> EmailMessage {
    let url = survey_link(base_url, &invitation.token);
    let who = html::escape(subject_name);
    let name = html::escape(&invitation.name);

    let html = format!(
        r#"<!DOCTYPE html>
<html>
<head><meta charset="utf-8"><title>360° Feedback Request from {who}</title></head>
<body style="font-family: sans-serif; line-height: 1.6; color: #1e293b;">
  <div style="max-width: 600px; margin: 0 auto; padding: 20px;">
    <h1>360° Feedback Request</h1>
    <p>Hello {name},</p>
    <p>{who} has invited you to participate in a 360° feedback survey. Your honest insights will help them understand their strengths and areas for growth.</p>
    <p><strong>🔒 Your privacy is protected.</strong> Your responses are anonymous. {who} will see the aggregated insights but never know who said what.</p>
    <p>It takes about 8-10 minutes. Optional text answers let you share examples.</p>
    <p style="text-align: center; margin: 30px 0;"><a href="{url}" style="background: #2563eb; color: white; padding: 15px 30px; text-decoration: none; border-radius: 8px;">Start Survey</a></p>
    <p>Thank you for taking the time to contribute!</p>
  </div>
</body>
</html>"#,
        url = html::escape(&url),
    );

    let text = format!(
        "{subject_name} has invited you to participate in a 360° feedback survey.\n\n\
         Your responses are anonymous and will help {subject_name} understand their strengths and growth areas.\n\n\
         Complete the survey here: {url}\n\n\
         Expected time: 8-10 minutes\n\n\
         Thank you for your honest feedback!\n"
    );

    EmailMessage {
        to: invitation.email.clone(),
        subject: format!("360° Feedback Request from {}", subject_name),
        text,
        html,
    }
}

pub fn reminder_email(invitation: &Invitation, subject_name: &str, base_url: &str) -> EmailMessage {
    let url = survey_link(base_url, &invitation.token);
    let who = html::escape(subject_name);

    let html = format!(
        r#"<!DOCTYPE html>
<html>
<head><meta charset="utf-8"><title>Reminder: 360° Feedback for {who}</title></head>
<body style="font-family: sans-serif; line-height: 1.6; color: #1e293b;">
  <div style="max-width: 600px; margin: 0 auto; padding: 20px;">
    <h1>Friendly Reminder</h1>
    <p>Hello {name},</p>
    <p>This is a friendly reminder about the 360° feedback survey for {who}. Just 8-10 minutes of your time can make a real difference in their development.</p>
    <p style="text-align: center; margin: 30px 0;"><a href="{url}" style="background: #059669; color: white; padding: 15px 30px; text-decoration: none; border-radius: 8px;">Complete Survey</a></p>
    <p>Remember: your responses are anonymous.</p>
  </div>
</body>
</html>"#,
        name = html::escape(&invitation.name),
        url = html::escape(&url),
    );

    let text = format!(
        "Friendly reminder: {subject_name} is still hoping for your 360° feedback.\n\n\
         Complete the survey here: {url}\n\n\
         Your responses are anonymous.\n"
    );

    EmailMessage {
        to: invitation.email.clone(),
        subject: format!("Reminder: 360° Feedback for {}", subject_name),
        text,
        html,
    }
}

// ==================== SENDING ====================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SendSummary {
    pub sent: usize,
    pub failed: usize,
}

/// Emails every pending invitation of a survey.
///
/// Each invitation is independent: a failed send is logged and counted and
/// the loop moves on. Successful sends stamp `sentAt`.
pub async fn send_survey_invitations(
    store: &dyn SurveyStore,
    mailer: &dyn Mailer,
    base_url: &str,
    survey_id: &str,
) -> Result<SendSummary, AppError> {
    let survey = survey_service::get_survey(store, survey_id).await?;
    if survey.status == SurveyStatus::Completed {
        return Err(AppError::precondition("Survey is already completed"));
    }
    let subject = survey_service::get_user(store, &survey.user_id).await?;
    let invitations = store.list_survey_invitations(survey_id).await?;

    let mut summary = SendSummary::default();
    for invitation in invitations
        .into_iter()
        .filter(|i| i.status == InvitationStatus::Pending)
    {
        let message = invitation_email(&invitation, &subject.name, base_url);
        match mailer.send(&message).await {
            Ok(()) => {
                // The respondent may already be answering; touch only sentAt.
                if let Err(e) = store.stamp_invitation_sent(&invitation.id, Utc::now()).await {
                    log::error!("❌ Failed to stamp sentAt on invitation {}: {}", invitation.id, e);
                }
                summary.sent += 1;
            }
            Err(e) => {
                log::warn!("⚠️  Invitation email {} failed: {}", invitation.id, e);
                summary.failed += 1;
            }
        }
    }

    log::info!(
        "📧 Survey {}: {} invitation emails sent, {} failed",
        survey_id,
        summary.sent,
        summary.failed
    );
    Ok(summary)
}

/// Re-sends the survey link to a respondent who has not finished.
pub async fn send_reminder(
    store: &dyn SurveyStore,
    mailer: &dyn Mailer,
    base_url: &str,
    invitation_id: &str,
) -> Result<(), AppError> {
    let invitation = survey_service::get_invitation(store, invitation_id).await?;
    if invitation.is_completed() {
        return Err(AppError::precondition(
            "This invitation has already been completed",
        ));
    }
    let survey = survey_service::get_survey(store, &invitation.survey_id).await?;
    let subject = survey_service::get_user(store, &survey.user_id).await?;

    mailer
        .send(&reminder_email(&invitation, &subject.name, base_url))
        .await?;
    log::info!("🔔 Reminder sent for invitation {}", invitation.id);
    Ok(())
}
