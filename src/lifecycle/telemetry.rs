//! # Observability & Tracing
//!
//! [`setup_tracing`] installs a compact `tracing-subscriber` formatter whose
//! verbosity comes from `RUST_LOG`.
//!
//! ## What Gets Traced
//!
//! - **Navigation**: activations, rejected activations, section entry failures
//! - **Readiness**: construction attempts, ready announcements, timeouts
//! - **Listing**: page loads with their request token, dropped stale responses
//! - **Notifications**: every toast, at a level matching its kind
//!
//! ## Usage Examples
//!
//! ```bash
//! # Navigation, renders and notifications
//! RUST_LOG=info cargo run
//!
//! # Request tokens, readiness channels, endpoints
//! RUST_LOG=debug cargo run
//!
//! # Only the framework internals
//! RUST_LOG=console_framework=trace cargo run
//! ```
//!
//! ## Workflow Trace Example
//!
//! **With `RUST_LOG=info`**:
//!
//! ```text
//! INFO start: Section activated section="dashboard"
//! INFO start:activate: Constructing module module="dashboard" attempt=1
//! INFO start:activate: Dashboard loaded users=23 posts=12
//! INFO activate: Section activated section="users"
//! INFO activate:load_page: Page rendered section="users" page=1 total=23
//! ```

/// Initializes the global subscriber. Call once, at startup.
pub fn setup_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .init();
}
