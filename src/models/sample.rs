use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::models::User;

#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sample {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub user_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing)]
    pub deleted_at: Option<DateTime<Utc>>,
}

/// A sample as returned by the API, with its owner's public profile.
#[derive(Debug, Clone, Serialize)]
pub struct SampleResponse {
    #[serde(flatten)]
    pub sample: Sample,
    pub user: User,
}

impl Sample {
    /// Only the owning user may mutate or delete a sample.
    pub fn ensure_owner(&self, user_id: i64) -> Result<(), AppError> {
        if self.user_id == user_id {
            Ok(())
        } else {
            Err(AppError::Forbidden(
                "You don't have permission to modify this sample".to_string(),
            ))
        }
    }
}

/// Partial update. Absent or blank fields keep the stored value, so a field
/// can never be cleared through an update.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SampleChanges {
    pub title: Option<String>,
    pub description: Option<String>,
}

impl SampleChanges {
    /// Resolve the `(title, description)` pair to persist.
    pub fn merge(&self, current: &Sample) -> (String, String) {
        (
            pick(self.title.as_deref(), &current.title),
            pick(self.description.as_deref(), &current.description),
        )
    }

    pub fn is_empty(&self) -> bool {
        provided(self.title.as_deref()).is_none() && provided(self.description.as_deref()).is_none()
    }
}

fn provided(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn pick(update: Option<&str>, current: &str) -> String {
    provided(update).unwrap_or(current).to_string()
}
