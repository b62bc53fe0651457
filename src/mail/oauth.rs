//! Google OAuth 2.0 helpers for the mail credential
//!
//! The consent flow is an operator task, run once to obtain a refresh token
//! (see the `auth-url` and `exchange-code` commands of the binary). At runtime
//! the notifier only uses [`refresh_access_token`].

use crate::config::MailConfig;
use crate::error::{Error, MailError};
use serde::Deserialize;
use std::time::Duration;
use url::Url;

/// Scope needed to send (and only send) mail
pub const GMAIL_SEND_SCOPE: &str = "https://www.googleapis.com/auth/gmail.send";

/// Successful token endpoint response
#[derive(Clone, Debug, Deserialize)]
pub struct TokenResponse {
    /// Short-lived bearer token
    pub access_token: String,
    /// Lifetime of `access_token` in seconds
    #[serde(default)]
    pub expires_in: Option<u64>,
    /// Long-lived token; only returned by the code exchange with `prompt=consent`
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// Granted scopes, space separated
    #[serde(default)]
    pub scope: Option<String>,
    /// Usually "Bearer"
    #[serde(default)]
    pub token_type: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TokenErrorBody {
    error: Option<String>,
    error_description: Option<String>,
}

/// Consent URL asking for offline access to the send scope
///
/// `prompt=consent` forces Google to issue a refresh token even if the account
/// already granted access once.
pub fn authorization_url(config: &MailConfig, state: Option<&str>) -> crate::Result<Url> {
    if config.client_id.trim().is_empty() {
        return Err(Error::config("GOOGLE_CLIENT_ID", "GOOGLE_CLIENT_ID is required"));
    }
    if config.redirect_uri.trim().is_empty() {
        return Err(Error::config(
            "GOOGLE_REDIRECT_URI",
            "GOOGLE_REDIRECT_URI is required",
        ));
    }

    let mut url = Url::parse(&config.auth_url)
        .map_err(|e| Error::config("auth_url", format!("invalid consent URL: {e}")))?;
    {
        let mut query = url.query_pairs_mut();
        query
            .append_pair("client_id", &config.client_id)
            .append_pair("redirect_uri", &config.redirect_uri)
            .append_pair("response_type", "code")
            .append_pair("scope", GMAIL_SEND_SCOPE)
            .append_pair("access_type", "offline")
            .append_pair("prompt", "consent");
        if let Some(state) = state {
            query.append_pair("state", state);
        }
    }
    Ok(url)
}

/// Trade an authorization code from the consent redirect for tokens
pub async fn exchange_code(
    client: &reqwest::Client,
    config: &MailConfig,
    code: &str,
) -> Result<TokenResponse, MailError> {
    let form = [
        ("code", code),
        ("client_id", config.client_id.as_str()),
        ("client_secret", config.client_secret.as_str()),
        ("redirect_uri", config.redirect_uri.as_str()),
        ("grant_type", "authorization_code"),
    ];
    request_token(client, &config.token_url, &form, config.timeout).await
}

/// Obtain a fresh access token from the configured refresh token
pub async fn refresh_access_token(
    client: &reqwest::Client,
    config: &MailConfig,
) -> Result<TokenResponse, MailError> {
    let refresh_token = config
        .refresh_token
        .as_deref()
        .filter(|t| !t.trim().is_empty())
        .ok_or(MailError::MissingCredential("refresh token"))?;

    let form = [
        ("client_id", config.client_id.as_str()),
        ("client_secret", config.client_secret.as_str()),
        ("refresh_token", refresh_token),
        ("grant_type", "refresh_token"),
    ];
    request_token(client, &config.token_url, &form, config.timeout).await
}

async fn request_token(
    client: &reqwest::Client,
    token_url: &str,
    form: &[(&str, &str)],
    timeout: Duration,
) -> Result<TokenResponse, MailError> {
    let response = client
        .post(token_url)
        .form(form)
        .timeout(timeout)
        .send()
        .await
        .map_err(|e| MailError::from_reqwest(e, timeout))?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(MailError::Token {
            status: status.as_u16(),
            message: token_error_message(status.as_u16(), &body),
        });
    }

    response
        .json::<TokenResponse>()
        .await
        .map_err(|e| MailError::from_reqwest(e, timeout))
}

fn token_error_message(status: u16, body: &str) -> String {
    match serde_json::from_str::<TokenErrorBody>(body) {
        Ok(TokenErrorBody {
            error: Some(error),
            error_description: Some(description),
        }) => format!("{error}: {description}"),
        Ok(TokenErrorBody {
            error: Some(error), ..
        }) => error,
        _ if !body.trim().is_empty() => body.trim().to_string(),
        _ => format!("HTTP {status}"),
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config(token_url: String) -> MailConfig {
        MailConfig {
            client_id: "client-id".into(),
            client_secret: "client-secret".into(),
            redirect_uri: "http://localhost:3001/".into(),
            refresh_token: Some("refresh-token".into()),
            token_url,
            ..Default::default()
        }
    }

    #[test]
    fn authorization_url_requests_offline_send_scope() {
        let url = authorization_url(&config(String::new()), Some("xyz")).unwrap();
        let params: HashMap<_, _> = url.query_pairs().into_owned().collect();

        assert!(url.as_str().starts_with("https://accounts.google.com/o/oauth2/v2/auth?"));
        assert_eq!(params["client_id"], "client-id");
        assert_eq!(params["redirect_uri"], "http://localhost:3001/");
        assert_eq!(params["response_type"], "code");
        assert_eq!(params["scope"], GMAIL_SEND_SCOPE);
        assert_eq!(params["access_type"], "offline");
        assert_eq!(params["prompt"], "consent");
        assert_eq!(params["state"], "xyz");
    }

    #[test]
    fn authorization_url_without_state() {
        let url = authorization_url(&config(String::new()), None).unwrap();
        assert!(!url.query_pairs().any(|(k, _)| k == "state"));
    }

    #[test]
    fn authorization_url_requires_client_id() {
        let mut cfg = config(String::new());
        cfg.client_id.clear();
        assert!(matches!(
            authorization_url(&cfg, None),
            Err(Error::Config { key: Some(ref k), .. }) if k == "GOOGLE_CLIENT_ID"
        ));
    }

    #[tokio::test]
    async fn refresh_posts_refresh_grant() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .and(body_string_contains("grant_type=refresh_token"))
            .and(body_string_contains("refresh_token=refresh-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "ya29.token",
                "expires_in": 3599,
                "token_type": "Bearer"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let token = refresh_access_token(
            &reqwest::Client::new(),
            &config(format!("{}/token", server.uri())),
        )
        .await
        .unwrap();

        assert_eq!(token.access_token, "ya29.token");
        assert_eq!(token.expires_in, Some(3599));
        assert!(token.refresh_token.is_none());
    }

    #[tokio::test]
    async fn refresh_without_token_fails_before_any_request() {
        let mut cfg = config("http://127.0.0.1:9/token".into());
        cfg.refresh_token = None;

        let err = refresh_access_token(&reqwest::Client::new(), &cfg)
            .await
            .unwrap_err();
        assert_eq!(err, MailError::MissingCredential("refresh token"));
    }

    #[tokio::test]
    async fn revoked_refresh_token_reports_google_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "error": "invalid_grant",
                "error_description": "Token has been expired or revoked."
            })))
            .mount(&server)
            .await;

        let err = refresh_access_token(&reqwest::Client::new(), &config(server.uri()))
            .await
            .unwrap_err();

        assert_eq!(
            err,
            MailError::Token {
                status: 400,
                message: "invalid_grant: Token has been expired or revoked.".into()
            }
        );
    }

    #[tokio::test]
    async fn exchange_code_returns_refresh_token() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .and(body_string_contains("grant_type=authorization_code"))
            .and(body_string_contains("code=4%2Fabc"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "ya29.token",
                "expires_in": 3599,
                "refresh_token": "1//long-lived",
                "scope": GMAIL_SEND_SCOPE,
                "token_type": "Bearer"
            })))
            .mount(&server)
            .await;

        let tokens = exchange_code(
            &reqwest::Client::new(),
            &config(format!("{}/token", server.uri())),
            "4/abc",
        )
        .await
        .unwrap();

        assert_eq!(tokens.refresh_token.as_deref(), Some("1//long-lived"));
        assert_eq!(tokens.scope.as_deref(), Some(GMAIL_SEND_SCOPE));
    }
}
