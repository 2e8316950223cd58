//! Authentication payloads.

use serde::{Deserialize, Serialize};

/// Credentials posted to the JSON login endpoint.
#[derive(Clone, Serialize)]
pub struct Credentials {
    /// Account e-mail address.
    pub email: String,

    /// Plain-text password. Never logged.
    pub password: String,
}

impl Credentials {
    /// Creates a credential pair.
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Successful login response.
#[derive(Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    /// The bearer token; opaque to the client.
    pub access_token: String,

    /// Token type, normally `bearer`.
    #[serde(default)]
    pub token_type: Option<String>,

    /// Any further fields the backend includes.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl std::fmt::Debug for LoginResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginResponse")
            .field("access_token", &"[REDACTED]")
            .field("token_type", &self.token_type)
            .field("extra", &self.extra)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_credentials_serialize() {
        let body = serde_json::to_value(Credentials::new("lead@desk.io", "hunter2")).unwrap();
        assert_eq!(body, json!({"email": "lead@desk.io", "password": "hunter2"}));
    }

    #[test]
    fn test_credentials_debug_redacts_password() {
        let printed = format!("{:?}", Credentials::new("lead@desk.io", "hunter2"));
        assert!(!printed.contains("hunter2"));
    }

    #[test]
    fn test_login_response_keeps_extra_fields() {
        let response: LoginResponse = serde_json::from_value(json!({
            "access_token": "eyJ.abc",
            "token_type": "bearer",
            "expires_in": 3600
        }))
        .unwrap();
        assert_eq!(response.access_token, "eyJ.abc");
        assert_eq!(response.token_type.as_deref(), Some("bearer"));
        assert_eq!(response.extra.get("expires_in"), Some(&json!(3600)));
        assert!(!format!("{:?}", response).contains("eyJ.abc"));
    }

    #[test]
    fn test_login_response_requires_token() {
        let result = serde_json::from_value::<LoginResponse>(json!({"token_type": "bearer"}));
        assert!(result.is_err());
    }
}
