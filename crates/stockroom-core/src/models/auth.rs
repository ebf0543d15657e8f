use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginResponse {
    #[serde(default)]
    pub success: bool,
    pub token: Option<String>,
    pub username: Option<String>,
    pub message: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct VerifyResponse {
    #[serde(default)]
    pub valid: bool,
    pub username: Option<String>,
}

/// Envelope returned by command endpoints and by every error response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MessageResponse {
    #[serde(default)]
    pub success: bool,
    pub message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_login_success() {
        let json = r#"{"success":true,"token":"f3a9","username":"admin"}"#;
        let resp: LoginResponse = serde_json::from_str(json).unwrap();
        assert!(resp.success);
        assert_eq!(resp.token.as_deref(), Some("f3a9"));
        assert_eq!(resp.username.as_deref(), Some("admin"));
        assert!(resp.message.is_none());
    }

    #[test]
    fn test_parse_login_failure_envelope() {
        let json = r#"{"success":false,"message":"Invalid username or password"}"#;
        let resp: LoginResponse = serde_json::from_str(json).unwrap();
        assert!(!resp.success);
        assert!(resp.token.is_none());
        assert_eq!(resp.message.as_deref(), Some("Invalid username or password"));
    }

    #[test]
    fn test_parse_verify() {
        let resp: VerifyResponse = serde_json::from_str(r#"{"valid":true,"username":"admin"}"#).unwrap();
        assert!(resp.valid);

        // Error envelopes carry no `valid` field
        let resp: VerifyResponse = serde_json::from_str(r#"{"success":false,"message":"expired"}"#).unwrap();
        assert!(!resp.valid);
    }
}
