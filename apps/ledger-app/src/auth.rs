//! Authentication seam.
//!
//! Every boundary operation starts by resolving the caller's token into a
//! [`Session`]. The tenant on the session is the only tenant the operation
//! ever reads or writes; nothing in a request body can override it.
//!
//! ```text
//! token ──► Authenticator::authenticate ──► Session { tenant_id, role }
//!                     │
//!                     └── AuthError ──► ApiError(UNAUTHORIZED)
//! ```

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Caller role as reported by the identity provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Member,
}

/// Resolved caller identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub tenant_id: String,
    pub role: Role,
}

/// Authentication errors.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Missing session token")]
    MissingToken,

    #[error("Invalid or expired session")]
    InvalidToken,
}

/// Resolves caller tokens into sessions.
///
/// Implementations must be cheap to call; they run before every operation.
pub trait Authenticator: Send + Sync {
    fn authenticate(&self, token: &str) -> Result<Session, AuthError>;
}

/// Fixed token table. Used by the report binary and tests.
#[derive(Debug, Clone, Default)]
pub struct StaticTokens {
    sessions: HashMap<String, Session>,
}

impl StaticTokens {
    pub fn new() -> Self {
        StaticTokens::default()
    }

    /// Adds (or replaces) a token.
    pub fn with_token(mut self, token: impl Into<String>, tenant_id: impl Into<String>, role: Role) -> Self {
        self.sessions.insert(
            token.into(),
            Session {
                tenant_id: tenant_id.into(),
                role,
            },
        );
        self
    }
}

impl Authenticator for StaticTokens {
    fn authenticate(&self, token: &str) -> Result<Session, AuthError> {
        let token = token.trim();
        if token.is_empty() {
            return Err(AuthError::MissingToken);
        }
        self.sessions.get(token).cloned().ok_or(AuthError::InvalidToken)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_tokens() {
        let auth = StaticTokens::new()
            .with_token("t-a", "tenant-a", Role::Admin)
            .with_token("t-b", "tenant-b", Role::Member);

        let session = auth.authenticate(" t-a ").unwrap();
        assert_eq!(session.tenant_id, "tenant-a");
        assert_eq!(session.role, Role::Admin);
        assert_eq!(auth.authenticate("t-b").unwrap().tenant_id, "tenant-b");

        assert!(matches!(auth.authenticate(""), Err(AuthError::MissingToken)));
        assert!(matches!(auth.authenticate("nope"), Err(AuthError::InvalidToken)));
    }
}
