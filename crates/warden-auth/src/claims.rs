//! JWT claims for session tokens.

use serde::{Deserialize, Serialize};

use warden_core::Identity;

/// Claims embedded in a session token.
///
/// Roles are deliberately absent: they change independently of the token and
/// are looked up per request through the role cache.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    /// User ID (subject claim)
    pub sub: String,
    /// User's email address
    pub email: String,
    /// Display name
    pub name: String,
    /// Server-side session record this token is bound to
    pub sid: String,
    /// Token expiration timestamp (Unix timestamp)
    pub exp: usize,
    /// Token issued-at timestamp (Unix timestamp)
    pub iat: usize,
}

impl SessionClaims {
    pub fn identity(&self) -> Identity {
        Identity::new(&self.sub, &self.email, &self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_claims_serialize() {
        let claims = SessionClaims {
            sub: "user-id-123".to_string(),
            email: "test@example.com".to_string(),
            name: "Test".to_string(),
            sid: "sid-1".to_string(),
            exp: 1234567890,
            iat: 1234567800,
        };
        let serialized = serde_json::to_string(&claims).unwrap();
        assert!(serialized.contains(r#""sub":"user-id-123""#));
        assert!(serialized.contains(r#""sid":"sid-1""#));
    }

    #[test]
    fn test_claims_to_identity() {
        let json = r#"{"sub":"u-9","email":"grace@example.com","name":"Grace","sid":"s","exp":9999999999,"iat":9999999900}"#;
        let claims: SessionClaims = serde_json::from_str(json).unwrap();
        let identity = claims.identity();
        assert_eq!(identity.id, "u-9");
        assert_eq!(identity.display_name, "Grace");
    }
}
