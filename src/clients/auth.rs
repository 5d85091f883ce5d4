use async_trait::async_trait;
use console_framework::{ApiClient, AuthProvider, AuthResult, ConsoleError, RequestOptions};
use std::sync::Arc;
use tracing::{debug, instrument};

pub const AUTH_CHECK_ENDPOINT: &str = "auth/check.php";

/// Asks the backend whether the current session is signed in.
pub struct SessionAuth {
    api: Arc<dyn ApiClient>,
}

impl SessionAuth {
    pub fn new(api: Arc<dyn ApiClient>) -> Self {
        Self { api }
    }
}

#[async_trait]
impl AuthProvider for SessionAuth {
    #[instrument(skip(self))]
    async fn check_auth(&self) -> Result<AuthResult, ConsoleError> {
        let envelope = self.api.request(AUTH_CHECK_ENDPOINT, RequestOptions::get()).await?;
        let result: AuthResult = serde_json::from_value(envelope.into_payload()?)
            .map_err(|e| ConsoleError::UnexpectedPayload(e.to_string()))?;
        debug!(authenticated = result.authenticated, "Session checked");
        Ok(result)
    }
}
