use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::utils::{error::AppError, ids, validation};

/// Invitation lifecycle: pending -> in_progress -> completed. Never reverts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum InvitationStatus {
    Pending,
    InProgress,
    Completed,
}

impl fmt::Display for InvitationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            InvitationStatus::Pending => "pending",
            InvitationStatus::InProgress => "in_progress",
            InvitationStatus::Completed => "completed",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Relationship {
    Coworker,
    Manager,
    DirectReport,
    Friend,
    Family,
    Client,
}

/// One respondent's participation record (stored in "invitations").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Invitation {
    pub id: String,
    pub survey_id: String,
    pub name: String,
    pub email: String,
    pub relationship: Relationship,
    /// Sole respondent credential.
    pub token: String,
    pub status: InvitationStatus,
    #[serde(default)]
    pub sent_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Invitation {
    pub fn is_completed(&self) -> bool {
        self.status == InvitationStatus::Completed
    }
}

/// One contact from the subject's circle.
#[derive(Debug, Clone, Deserialize, utoipa::ToSchema)]
pub struct NewInvitation {
    pub name: String,
    pub email: String,
    pub relationship: Relationship,
}

pub const MAX_CONTACTS_PER_REQUEST: usize = 10;

impl NewInvitation {
    pub fn validate(&self) -> Result<(), AppError> {
        validation::require_min_len("name", &self.name, 2)?;
        validation::require_email("email", &self.email)
    }

    pub fn into_invitation(self, survey_id: &str) -> Invitation {
        Invitation {
            id: ids::new_id(),
            survey_id: survey_id.to_string(),
            name: self.name.trim().to_string(),
            email: self.email.trim().to_string(),
            relationship: self.relationship,
            token: ids::new_token(),
            status: InvitationStatus::Pending,
            sent_at: None,
            completed_at: None,
            created_at: Utc::now(),
        }
    }
}

pub fn validate_contacts(contacts: &[NewInvitation]) -> Result<(), AppError> {
    if contacts.is_empty() {
        return Err(AppError::validation("At least one contact is required"));
    }
    if contacts.len() > MAX_CONTACTS_PER_REQUEST {
        return Err(AppError::validation(format!(
            "At most {} contacts per request",
            MAX_CONTACTS_PER_REQUEST
        )));
    }
    for (i, contact) in contacts.iter().enumerate() {
        contact
            .validate()
            .map_err(|e| AppError::validation(format!("contacts[{}].{}", i, e)))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contact(name: &str, email: &str) -> NewInvitation {
        NewInvitation {
            name: name.into(),
            email: email.into(),
            relationship: Relationship::Coworker,
        }
    }

    #[test]
    fn test_status_order_is_forward() {
        assert!(InvitationStatus::Pending < InvitationStatus::InProgress);
        assert!(InvitationStatus::InProgress < InvitationStatus::Completed);
        assert_eq!(InvitationStatus::InProgress.to_string(), "in_progress");
    }

    #[test]
    fn test_new_invitation_is_pending_with_fresh_token() {
        let a = contact("Ana", "ana@example.com").into_invitation("s1");
        let b = contact("Bob", "bob@example.com").into_invitation("s1");
        assert_eq!(a.status, InvitationStatus::Pending);
        assert_ne!(a.token, b.token);
        assert!(a.sent_at.is_none() && a.completed_at.is_none());
    }

    #[test]
    fn test_contact_list_validation() {
        assert!(validate_contacts(&[]).is_err());
        assert!(validate_contacts(&[contact("Ana", "ana@example.com")]).is_ok());

        let err = validate_contacts(&[contact("Ana", "ana@example.com"), contact("B", "b@x.io")])
            .unwrap_err();
        assert!(err.to_string().starts_with("contacts[1].name"));

        let many: Vec<_> = (0..11).map(|i| contact("Name", &format!("p{}@x.io", i))).collect();
        assert!(validate_contacts(&many).is_err());
    }

    #[test]
    fn test_relationship_tags() {
        let r: Relationship = serde_json::from_str("\"direct_report\"").unwrap();
        assert_eq!(r, Relationship::DirectReport);
        assert!(serde_json::from_str::<Relationship>("\"neighbor\"").is_err());
    }
}
