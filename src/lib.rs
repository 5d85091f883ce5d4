#![doc(html_logo_url = "https://www.rust-lang.org/logos/rust-logo-128x128.png")]
#![doc(html_favicon_url = "https://www.rust-lang.org/favicon.ico")]
//! # Admin Console
//!
//! > **A forum admin console built on [`console_framework`].**
//!
//! The framework crate knows how to route between sections, wait for modules
//! to become ready and page through listings. This crate supplies what is
//! specific to the forum: its record types, its dashboard, its backends and
//! the startup sequence.
//!
//! ## 🗺️ Module Tour
//!
//! ### 1. The Records ([`model`])
//! Users, posts, comments, products and categories.
//! - **Role**: Each implements [`ResourceEntity`](console_framework::ResourceEntity),
//!   which is all a [`ResourceManager`](console_framework::ResourceManager) needs to list it.
//! - **Note**: The backend is loose about numbers and field names, so the models
//!   accept ids as numbers or strings and carry serde aliases for legacy names.
//!
//! ### 2. The Sections ([`managers`])
//! - **Role**: Registers one module per section. Listed sections use the generic
//!   manager; the dashboard has its own module.
//! - **Key items**: [`register_all`](managers::register_all), [`DashboardModule`](managers::DashboardModule).
//!
//! ### 3. The Backends ([`clients`])
//! - **Role**: [`HttpApiClient`](clients::HttpApiClient) talks to the real API over
//!   `reqwest`; [`FixtureApi`](clients::FixtureApi) serves seeded data in memory.
//!
//! ### 4. The Orchestrator ([`lifecycle`])
//! - **Role**: Checks the session, declares the document skeleton and wires the
//!   registry to the router.
//! - **Key items**: [`AdminConsole`](lifecycle::AdminConsole), [`setup_tracing`](lifecycle::setup_tracing).
//!
//! ## 🚀 Quick Start
//!
//! ```no_run
//! use admin_console::clients::{FixtureApi, SessionAuth, TracingNotifier};
//! use admin_console::lifecycle::AdminConsole;
//! use console_framework::ConsoleConfig;
//! use std::sync::Arc;
//!
//! # async fn run() -> Result<(), console_framework::ConsoleError> {
//! let api = Arc::new(FixtureApi::seeded());
//! let console = AdminConsole::start(
//!     ConsoleConfig::default(),
//!     api.clone(),
//!     Arc::new(SessionAuth::new(api)),
//!     Arc::new(TracingNotifier),
//! )
//! .await?;
//!
//! console.activate("users").await;
//! console.search("member1").await?;
//! console.shutdown();
//! # Ok(())
//! # }
//! ```
//!
//! ## 🧪 Testing
//!
//! Integration tests run the whole console against [`FixtureApi`](clients::FixtureApi)
//! and record toasts with [`RecordingNotifier`](console_framework::mock::RecordingNotifier).
//! Time-dependent behavior (debounce, readiness ceilings) is tested with
//! `#[tokio::test(start_paused = true)]`.

pub mod clients;
pub mod lifecycle;
pub mod managers;
pub mod model;
