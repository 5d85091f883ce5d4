//! # Collaborator Implementations
//!
//! Concrete implementations of the traits the console core talks through:
//!
//! - [`HttpApiClient`] and [`FixtureApi`] implement [`ApiClient`](console_framework::ApiClient)
//! - [`SessionAuth`] implements [`AuthProvider`](console_framework::AuthProvider)
//! - [`TracingNotifier`] implements [`Notifier`](console_framework::Notifier)

pub mod auth;
pub mod fixture_api;
pub mod http_api;
pub mod notifier;

pub use auth::SessionAuth;
pub use fixture_api::FixtureApi;
pub use http_api::HttpApiClient;
pub use notifier::TracingNotifier;
