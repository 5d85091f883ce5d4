//! # External Collaborators
//!
//! The core never talks to the network, the session or the toast renderer
//! directly. It goes through three narrow traits:
//!
//! - [`ApiClient`] - `request(endpoint, options) -> ApiEnvelope`
//! - [`Notifier`] - `notify(message, kind)`, fire-and-forget
//! - [`AuthProvider`] - `check_auth() -> AuthResult`, called once at startup
//!
//! Implementations live in the application crate; test doubles live in
//! [`crate::mock`].

use crate::error::ConsoleError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// HTTP verb of a collaborator request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verb = match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        };
        f.write_str(verb)
    }
}

/// Options passed alongside an endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestOptions {
    pub method: Method,
    pub body: Option<Value>,
    pub headers: Vec<(String, String)>,
}

impl RequestOptions {
    pub fn get() -> Self {
        Self {
            method: Method::Get,
            body: None,
            headers: Vec::new(),
        }
    }

    pub fn with_body(method: Method, body: Value) -> Self {
        Self {
            method,
            body: Some(body),
            headers: Vec::new(),
        }
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

/// The `{ success, data, message }` envelope every endpoint answers with.
///
/// `message` is normally a string. Some legacy endpoints put the item array
/// in `message` instead of `data`; [`ApiEnvelope::into_payload`] accepts both.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiEnvelope {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub data: Option<Value>,
    #[serde(default)]
    pub message: Value,
}

impl ApiEnvelope {
    pub fn ok(data: Value) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: Value::String(String::new()),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            message: Value::String(message.into()),
        }
    }

    /// Human-readable message, empty when the endpoint sent a non-string.
    pub fn message_text(&self) -> &str {
        self.message.as_str().unwrap_or_default()
    }

    /// Fails with [`ConsoleError::Api`] when `success` is false.
    pub fn ensure_success(&self) -> Result<(), ConsoleError> {
        if self.success {
            return Ok(());
        }
        let message = match self.message_text() {
            "" => "Operation failed".to_string(),
            text => text.to_string(),
        };
        Err(ConsoleError::Api(message))
    }

    /// Unwraps a successful envelope into its payload.
    ///
    /// `success: false` becomes [`ConsoleError::Api`]; a successful envelope
    /// without `data` falls back to an array carried in `message`.
    pub fn into_payload(self) -> Result<Value, ConsoleError> {
        self.ensure_success()?;
        match (self.data, self.message) {
            (Some(data), _) if !data.is_null() => Ok(data),
            (_, message @ Value::Array(_)) => Ok(message),
            _ => Err(ConsoleError::UnexpectedPayload("envelope carries no data".into())),
        }
    }
}

/// Fetch layer. Non-2xx responses and `success: false` are both failures to the core.
#[async_trait]
pub trait ApiClient: Send + Sync {
    async fn request(
        &self,
        endpoint: &str,
        options: RequestOptions,
    ) -> Result<ApiEnvelope, ConsoleError>;
}

/// Severity of a user-facing notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeKind {
    Success,
    Error,
    Warning,
    Info,
}

/// Toast renderer.
pub trait Notifier: Send + Sync {
    fn notify(&self, message: &str, kind: NoticeKind);
}

/// The signed-in user as reported by the session check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthUser {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub role: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthResult {
    #[serde(default)]
    pub authenticated: bool,
    #[serde(default)]
    pub user: Option<AuthUser>,
}

impl AuthResult {
    pub fn admin(username: impl Into<String>) -> Self {
        Self {
            authenticated: true,
            user: Some(AuthUser {
                username: username.into(),
                role: "admin".into(),
            }),
        }
    }

    pub fn anonymous() -> Self {
        Self {
            authenticated: false,
            user: None,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.authenticated
            && self
                .user
                .as_ref()
                .is_some_and(|u| u.role.eq_ignore_ascii_case("admin"))
    }
}

/// Session verification.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    async fn check_auth(&self) -> Result<AuthResult, ConsoleError>;
}
