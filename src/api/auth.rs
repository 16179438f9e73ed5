//! Login call and session token extraction.

use serde::{Deserialize, Serialize};

use super::{client::ApiClient, error::ApiError};

/// Credentials sent to `POST /auth/login`.
#[derive(Debug, Serialize)]
pub struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

/// Login response. The token location varies between API deployments,
/// so every known field is modeled and probed in a fixed order.
#[derive(Debug, Default, Deserialize)]
pub struct LoginResponse {
    /// Some deployments return the token under `login`.
    pub login: Option<String>,
    pub token: Option<String>,
    pub access_token: Option<String>,
    pub data: Option<LoginData>,
}

/// Nested payload variant (`{data: {token}}`).
#[derive(Debug, Default, Deserialize)]
pub struct LoginData {
    pub token: Option<String>,
}

/// Probe the known token fields in priority order: `login`, `token`,
/// `access_token`, `data.token`.
fn extract_token(resp: &LoginResponse) -> Option<String> {
    resp.login
        .clone()
        .or_else(|| resp.token.clone())
        .or_else(|| resp.access_token.clone())
        .or_else(|| resp.data.as_ref().and_then(|d| d.token.clone()))
}

/// Authenticate and return the session token.
///
/// A 2xx response with no recognizable token field is an explicit
/// `UnrecognizedLogin` error rather than a silent auth failure.
pub async fn login(client: &ApiClient, email: &str, password: &str) -> Result<String, ApiError> {
    let resp = client
        .post("/auth/login")
        .json(&LoginRequest { email, password })
        .send()
        .await?;

    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        tracing::warn!("login rejected: {status}");
        return Err(ApiError::Status { status, body });
    }

    let body = resp.json::<LoginResponse>().await?;
    match extract_token(&body) {
        Some(token) => Ok(token),
        None => {
            tracing::error!("login response carried no token field");
            Err(ApiError::UnrecognizedLogin)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(v: serde_json::Value) -> LoginResponse {
        serde_json::from_value(v).unwrap()
    }

    #[test]
    fn token_found_under_each_known_field() {
        let login = parse(serde_json::json!({"login": "t-login"}));
        assert_eq!(extract_token(&login).as_deref(), Some("t-login"));

        let token = parse(serde_json::json!({"token": "t-token"}));
        assert_eq!(extract_token(&token).as_deref(), Some("t-token"));

        let access = parse(serde_json::json!({"access_token": "t-access"}));
        assert_eq!(extract_token(&access).as_deref(), Some("t-access"));

        let nested = parse(serde_json::json!({"data": {"token": "t-nested"}}));
        assert_eq!(extract_token(&nested).as_deref(), Some("t-nested"));
    }

    #[test]
    fn probe_order_prefers_login_field() {
        let both = parse(serde_json::json!({
            "login": "t-login",
            "token": "t-token",
            "access_token": "t-access",
            "data": {"token": "t-nested"}
        }));
        assert_eq!(extract_token(&both).as_deref(), Some("t-login"));
    }

    #[test]
    fn unrecognized_shape_yields_no_token() {
        let none = parse(serde_json::json!({"success": true, "message": "ok"}));
        assert!(extract_token(&none).is_none());
    }
}
