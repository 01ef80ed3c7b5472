use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::utils::{error::AppError, ids, validation};

/// The feedback subject.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String, // PRIMARY IDENTIFIER
    pub email: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct CreateUserRequest {
    pub email: String,
    pub name: String,
}

impl CreateUserRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        validation::require_min_len("name", &self.name, 2)?;
        validation::require_email("email", &self.email)
    }

    pub fn into_user(self) -> User {
        User {
            id: ids::new_id(),
            email: self.email.trim().to_lowercase(),
            name: self.name.trim().to_string(),
            created_at: Utc::now(),
        }
    }
}
