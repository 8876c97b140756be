use chrono::{DateTime, Utc};
use jobagent_core_types::Sensitive;
use uuid::Uuid;

/// Access token issued by the external recruiting platform (hh.ru)
///
/// The token value is redacted in `Debug` output and is stored encrypted.
#[derive(Debug, Clone)]
pub struct ExternalToken {
    pub token_uuid: Uuid,
    pub user_uuid: Uuid,
    pub access_token: Sensitive<String>,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ExternalToken {
    /// A token is unusable from its expiry instant onwards
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn token(expires_at: DateTime<Utc>) -> ExternalToken {
        let now = Utc::now();
        ExternalToken {
            token_uuid: Uuid::new_v4(),
            user_uuid: Uuid::new_v4(),
            access_token: Sensitive::new("APPLHH-token".to_string()),
            expires_at,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_expiry_boundary() {
        let now = Utc::now();
        assert!(!token(now + Duration::seconds(1)).is_expired(now));
        assert!(token(now).is_expired(now));
        assert!(token(now - Duration::hours(1)).is_expired(now));
    }

    #[test]
    fn test_debug_redacts_access_token() {
        let rendered = format!("{:?}", token(Utc::now()));
        assert!(!rendered.contains("APPLHH"));
    }
}
