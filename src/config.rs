//! Configuration types for canal-denuncia

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::{
    net::{IpAddr, SocketAddr},
    time::Duration,
};

/// HTTP server configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address to bind to (default: 0.0.0.0:4000)
    #[serde(default = "default_bind_address")]
    pub bind_address: SocketAddr,

    /// Allowed CORS origins (default: ["*"], i.e. any origin)
    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,

    /// Maximum accepted request body in bytes (default: 200 KB)
    #[serde(default = "default_body_limit")]
    pub body_limit_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            cors_origins: default_cors_origins(),
            body_limit_bytes: default_body_limit(),
        }
    }
}

/// Report store (Supabase REST) configuration
///
/// The key must be the service-role key: the reports table is expected to deny
/// anonymous inserts through row-level security.
#[derive(Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Project URL, e.g. `https://xyz.supabase.co`
    #[serde(default)]
    pub url: String,

    /// Service-role key used for both the `apikey` and bearer headers
    #[serde(default)]
    pub service_key: String,

    /// Table receiving one row per report (default: "canal-de-denuncias")
    #[serde(default = "default_table")]
    pub table: String,

    /// Timeout for a single insert (default: 10 seconds)
    #[serde(default = "default_store_timeout", with = "duration_serde")]
    pub timeout: Duration,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            service_key: String::new(),
            table: default_table(),
            timeout: default_store_timeout(),
        }
    }
}

impl std::fmt::Debug for StoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreConfig")
            .field("url", &self.url)
            .field("service_key", &redacted(&self.service_key))
            .field("table", &self.table)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Mail notifier (Gmail API) configuration
#[derive(Clone, Serialize, Deserialize)]
pub struct MailConfig {
    /// OAuth client ID
    #[serde(default)]
    pub client_id: String,

    /// OAuth client secret
    #[serde(default)]
    pub client_secret: String,

    /// Redirect URI registered for the consent flow
    #[serde(default)]
    pub redirect_uri: String,

    /// Long-lived refresh token obtained through the consent flow
    #[serde(default)]
    pub refresh_token: Option<String>,

    /// Address receiving every notification
    #[serde(default)]
    pub recipient: String,

    /// Subject line of every notification
    #[serde(default = "default_subject")]
    pub subject: String,

    /// OAuth consent endpoint
    #[serde(default = "default_auth_url")]
    pub auth_url: String,

    /// OAuth token endpoint
    #[serde(default = "default_token_url")]
    pub token_url: String,

    /// Gmail API base URL
    #[serde(default = "default_api_base")]
    pub api_base: String,

    /// Timeout for each token or send request (default: 15 seconds)
    #[serde(default = "default_mail_timeout", with = "duration_serde")]
    pub timeout: Duration,
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            client_secret: String::new(),
            redirect_uri: String::new(),
            refresh_token: None,
            recipient: String::new(),
            subject: default_subject(),
            auth_url: default_auth_url(),
            token_url: default_token_url(),
            api_base: default_api_base(),
            timeout: default_mail_timeout(),
        }
    }
}

impl MailConfig {
    /// Whether a refresh token is available for sending
    pub fn has_credentials(&self) -> bool {
        self.refresh_token
            .as_deref()
            .is_some_and(|token| !token.trim().is_empty())
    }
}

impl std::fmt::Debug for MailConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MailConfig")
            .field("client_id", &self.client_id)
            .field("client_secret", &redacted(&self.client_secret))
            .field("redirect_uri", &self.redirect_uri)
            .field(
                "refresh_token",
                &self.refresh_token.as_deref().map(redacted),
            )
            .field("recipient", &self.recipient)
            .field("subject", &self.subject)
            .field("auth_url", &self.auth_url)
            .field("token_url", &self.token_url)
            .field("api_base", &self.api_base)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Main configuration
///
/// - [`server`](ServerConfig) - listener, CORS and body limit
/// - [`store`](StoreConfig) - where reports are appended
/// - [`mail`](MailConfig) - who is notified and with which credential
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Config {
    /// HTTP server settings
    #[serde(default)]
    pub server: ServerConfig,

    /// Report store settings
    #[serde(default)]
    pub store: StoreConfig,

    /// Mail notifier settings
    #[serde(default)]
    pub mail: MailConfig,
}

impl Config {
    /// Build a configuration from process environment variables
    ///
    /// Unset variables fall back to defaults; call [`Config::validate`] before
    /// building clients.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a configuration from an arbitrary key lookup
    ///
    /// # Recognized keys
    ///
    /// | Key | Field |
    /// |-----|-------|
    /// | `BIND_HOST`, `PORT` | `server.bind_address` |
    /// | `FRONTEND_URL` | `server.cors_origins` (comma separated) |
    /// | `BODY_LIMIT_BYTES` | `server.body_limit_bytes` |
    /// | `SUPABASE_URL`, `SUPABASE_SERVICE_ROLE_KEY`, `SUPABASE_TABLE` | `store.*` |
    /// | `STORE_TIMEOUT_SECS` | `store.timeout` |
    /// | `GOOGLE_CLIENT_ID`, `GOOGLE_CLIENT_SECRET`, `GOOGLE_REDIRECT_URI`, `GOOGLE_REFRESH_TOKEN` | `mail.*` credentials |
    /// | `MAIL_RECIPIENT`, `MAIL_SUBJECT`, `MAIL_TIMEOUT_SECS` | `mail.*` |
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = Config::default();

        let host = match get("BIND_HOST") {
            Some(h) => parse_host(&h)?,
            None => config.server.bind_address.ip(),
        };
        let port = match get("PORT") {
            Some(p) => parse_number::<u16>("PORT", &p)?,
            None => config.server.bind_address.port(),
        };
        config.server.bind_address = SocketAddr::new(host, port);

        if let Some(origins) = get("FRONTEND_URL") {
            config.server.cors_origins = origins
                .split(',')
                .map(|o| o.trim().to_string())
                .filter(|o| !o.is_empty())
                .collect();
        }
        if let Some(limit) = get("BODY_LIMIT_BYTES") {
            config.server.body_limit_bytes = parse_number("BODY_LIMIT_BYTES", &limit)?;
        }

        if let Some(url) = get("SUPABASE_URL") {
            config.store.url = url;
        }
        if let Some(key) = get("SUPABASE_SERVICE_ROLE_KEY") {
            config.store.service_key = key;
        }
        if let Some(table) = get("SUPABASE_TABLE") {
            config.store.table = table;
        }
        if let Some(secs) = get("STORE_TIMEOUT_SECS") {
            config.store.timeout = Duration::from_secs(parse_number("STORE_TIMEOUT_SECS", &secs)?);
        }

        if let Some(id) = get("GOOGLE_CLIENT_ID") {
            config.mail.client_id = id;
        }
        if let Some(secret) = get("GOOGLE_CLIENT_SECRET") {
            config.mail.client_secret = secret;
        }
        if let Some(uri) = get("GOOGLE_REDIRECT_URI") {
            config.mail.redirect_uri = uri;
        }
        config.mail.refresh_token = get("GOOGLE_REFRESH_TOKEN");
        if let Some(recipient) = get("MAIL_RECIPIENT") {
            config.mail.recipient = recipient;
        }
        if let Some(subject) = get("MAIL_SUBJECT") {
            config.mail.subject = subject;
        }
        if let Some(secs) = get("MAIL_TIMEOUT_SECS") {
            config.mail.timeout = Duration::from_secs(parse_number("MAIL_TIMEOUT_SECS", &secs)?);
        }

        Ok(config)
    }

    /// Check that everything the intake service needs at runtime is present
    pub fn validate(&self) -> Result<()> {
        let required = [
            ("SUPABASE_URL", self.store.url.as_str()),
            ("SUPABASE_SERVICE_ROLE_KEY", self.store.service_key.as_str()),
            ("SUPABASE_TABLE", self.store.table.as_str()),
            ("GOOGLE_CLIENT_ID", self.mail.client_id.as_str()),
            ("GOOGLE_CLIENT_SECRET", self.mail.client_secret.as_str()),
            ("MAIL_RECIPIENT", self.mail.recipient.as_str()),
        ];
        if let Some((key, _)) = required.iter().find(|(_, v)| v.trim().is_empty()) {
            return Err(Error::config(*key, format!("{key} is required")));
        }
        if !self.mail.has_credentials() {
            return Err(Error::config(
                "GOOGLE_REFRESH_TOKEN",
                "GOOGLE_REFRESH_TOKEN is required; run `canal-denuncia auth-url` to obtain one",
            ));
        }
        if self.server.body_limit_bytes == 0 {
            return Err(Error::config(
                "BODY_LIMIT_BYTES",
                "body limit must be greater than zero",
            ));
        }
        Ok(())
    }
}

fn parse_number<T>(key: &str, value: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e| Error::config(key, format!("invalid {key} '{value}': {e}")))
}

fn redacted(secret: &str) -> &'static str {
    if secret.is_empty() { "" } else { "[redacted]" }
}

/// An IPv4 or IPv6 address, with or without brackets (`::`, `[::1]`)
fn parse_host(value: &str) -> Result<IpAddr> {
    let trimmed = value.trim();
    let bare = trimmed
        .strip_prefix('[')
        .and_then(|h| h.strip_suffix(']'))
        .unwrap_or(trimmed);
    bare.parse()
        .map_err(|e| Error::config("BIND_HOST", format!("invalid bind address {value:?}: {e}")))
}

fn default_bind_address() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 4000))
}

fn default_cors_origins() -> Vec<String> {
    vec!["*".into()]
}

fn default_body_limit() -> usize {
    200 * 1024
}

fn default_table() -> String {
    "canal-de-denuncias".into()
}

fn default_store_timeout() -> Duration {
    Duration::from_secs(10)
}

fn default_subject() -> String {
    "Mensagem do canal de denúncia".into()
}

fn default_auth_url() -> String {
    "https://accounts.google.com/o/oauth2/v2/auth".into()
}

fn default_token_url() -> String {
    "https://oauth2.googleapis.com/token".into()
}

fn default_api_base() -> String {
    "https://gmail.googleapis.com".into()
}

fn default_mail_timeout() -> Duration {
    Duration::from_secs(15)
}

// Duration as integer seconds
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_secs())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}
