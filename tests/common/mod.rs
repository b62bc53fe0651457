//! Common test utilities for canal-denuncia integration tests
//!
//! Stands up wiremock servers in place of Supabase and Google, then builds a
//! [`Config`] pointing at them through the same key lookup the binary uses.

use canal_denuncia::{Config, GmailNotifier, SubmissionPipeline, SupabaseStore};
use std::collections::HashMap;
use std::sync::Arc;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Table name used by every test config
pub const TABLE: &str = "canal-de-denuncias";

/// Path the store inserts into
pub const INSERT_PATH: &str = "/rest/v1/canal-de-denuncias";

/// Path the notifier sends through
pub const SEND_PATH: &str = "/gmail/v1/users/me/messages/send";

/// Mock Supabase and Google endpoints
pub struct Backends {
    /// Stands in for the Supabase project
    pub supabase: MockServer,
    /// Stands in for both the OAuth token endpoint and the Gmail API
    pub google: MockServer,
}

impl Backends {
    /// Start both servers with a working token endpoint
    pub async fn start() -> Self {
        let backends = Self {
            supabase: MockServer::start().await,
            google: MockServer::start().await,
        };
        Mock::given(method("POST"))
            .and(path("/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "ya29.integration",
                "expires_in": 3599,
                "token_type": "Bearer"
            })))
            .mount(&backends.google)
            .await;
        backends
    }

    /// Configuration pointing at the mock servers, as loaded from environment keys
    pub fn config(&self) -> Config {
        let env: HashMap<&str, String> = HashMap::from([
            ("BIND_HOST", "127.0.0.1".to_string()),
            ("PORT", "0".to_string()),
            ("SUPABASE_URL", self.supabase.uri()),
            ("SUPABASE_SERVICE_ROLE_KEY", "service-role-key".to_string()),
            ("SUPABASE_TABLE", TABLE.to_string()),
            ("STORE_TIMEOUT_SECS", "2".to_string()),
            ("GOOGLE_CLIENT_ID", "client-id".to_string()),
            ("GOOGLE_CLIENT_SECRET", "client-secret".to_string()),
            ("GOOGLE_REDIRECT_URI", "http://localhost/callback".to_string()),
            ("GOOGLE_REFRESH_TOKEN", "refresh-token".to_string()),
            ("MAIL_RECIPIENT", "ouvidoria@example.org".to_string()),
            ("MAIL_TIMEOUT_SECS", "2".to_string()),
        ]);

        let mut config = Config::from_lookup(|key| env.get(key).cloned())
            .unwrap_or_else(|e| panic!("test config should load: {e}"));
        config.mail.token_url = format!("{}/token", self.google.uri());
        config.mail.api_base = self.google.uri();
        config
            .validate()
            .unwrap_or_else(|e| panic!("test config should validate: {e}"));
        config
    }

    /// Pipeline over the real Supabase and Gmail clients
    pub fn pipeline(&self, config: &Config) -> Arc<SubmissionPipeline> {
        let store = SupabaseStore::new(&config.store)
            .unwrap_or_else(|e| panic!("store should build: {e}"));
        let notifier = GmailNotifier::new(config.mail.clone())
            .unwrap_or_else(|e| panic!("notifier should build: {e}"));
        Arc::new(SubmissionPipeline::new(Arc::new(store), Arc::new(notifier)))
    }

    /// Router wired to the mock servers
    pub fn router(&self) -> axum::Router {
        let config = self.config();
        let pipeline = self.pipeline(&config);
        canal_denuncia::api::create_router(pipeline, Arc::new(config))
    }

    /// Requests received at `request_path` on the given server
    pub async fn requests_to(server: &MockServer, request_path: &str) -> Vec<wiremock::Request> {
        server
            .received_requests()
            .await
            .unwrap_or_default()
            .into_iter()
            .filter(|r| r.url.path() == request_path)
            .collect()
    }
}
