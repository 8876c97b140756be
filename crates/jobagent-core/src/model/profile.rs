use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// Free-text profile owned by exactly one user (zero-or-one per user)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserProfile {
    pub profile_uuid: Uuid,
    pub user_uuid: Uuid,
    pub experience: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
