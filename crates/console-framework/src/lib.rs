//! # Console Framework
//!
//! Orchestration core of a single-page admin console: which section is
//! visible, when the module behind it exists, and how its paginated listing
//! is fetched and rendered.
//!
//! ## Architecture Overview
//!
//! The framework separates concerns into four layers:
//!
//! 1. **Navigation** ([`SectionRouter`]) - a state machine over the declared
//!    sections. It projects the active section onto the [`Document`] and
//!    publishes it to modules through an [`ActiveSection`] watch channel.
//! 2. **Readiness** ([`ModuleRegistry`]) - constructs each section module
//!    once, on first use, and lets any number of callers wait for it.
//! 3. **Listing** ([`ResourceManager`]) - a generic fetch / normalize /
//!    render / paginate loop, written once for every [`ResourceEntity`].
//! 4. **Rendering** ([`Document`], [`pagination`]) - a typed model of the
//!    console skeleton that modules write rows, errors and controls into.
//!
//! Collaborators the core does not own (HTTP, toasts, session checks) sit
//! behind the [`ApiClient`], [`Notifier`] and [`AuthProvider`] traits and are
//! injected through a [`ModuleContext`].
//!
//! ## Core Abstractions
//!
//! ### [`ResourceEntity`] - a listed record type
//!
//! ```rust
//! use console_framework::{ListQuery, Listing, ResourceEntity, Row, ConsoleError};
//! use serde::Deserialize;
//! use serde_json::Value;
//!
//! #[derive(Debug, Deserialize)]
//! struct Tag {
//!     id: u64,
//!     label: String,
//! }
//!
//! impl ResourceEntity for Tag {
//!     const SECTION: &'static str = "tags";
//!     const ENDPOINT: &'static str = "admin/tags.php";
//!
//!     fn normalize(payload: Value, query: &ListQuery) -> Result<Listing<Value>, ConsoleError> {
//!         Listing::from_payload(payload, "tags", query)
//!     }
//!
//!     fn record_id(&self) -> String {
//!         self.id.to_string()
//!     }
//!
//!     fn render_row(&self) -> Row {
//!         Row::new(self.record_id(), vec![self.label.clone()])
//!     }
//! }
//! ```
//!
//! Registering `ManagerFactory::<Tag>::new()` under `"tags"` is all it takes
//! for the section to list, search, filter and paginate tags.
//!
//! ## Concurrency Model
//!
//! - Everything runs on tokio. No lock is held across an `.await`.
//! - Module construction runs on a spawned task; waiters race a broadcast
//!   event against a bounded poll.
//! - Each manager tags every request; only the latest issued request renders.
//!
//! ## Testing
//!
//! [`mock`] provides a scripted [`ApiClient`], a recording [`Notifier`] and
//! controllable module factories. Time-dependent behaviour (debounce,
//! readiness ceilings) is tested with `#[tokio::test(start_paused = true)]`.

pub mod collaborators;
pub mod config;
pub mod debounce;
pub mod dom;
pub mod entity;
pub mod error;
pub mod listing;
pub mod manager;
pub mod mock;
pub mod module;
pub mod pagination;
pub mod readiness;
pub mod router;

// Re-export core types for convenience
pub use collaborators::{
    ApiClient, ApiEnvelope, AuthProvider, AuthResult, AuthUser, Method, NoticeKind, Notifier,
    RequestOptions,
};
pub use config::{ConsoleConfig, ReadinessPolicy, CONFIG_PATH_ENV};
pub use debounce::Debouncer;
pub use dom::{ContainerContent, Control, ControlKind, Document, Panel, PanelStatus, Row};
pub use entity::ResourceEntity;
pub use error::ConsoleError;
pub use listing::{ListQuery, Listing, PageState};
pub use manager::{LoadOutcome, ManagerFactory, ResourceManager};
pub use module::{content_container, pagination_container, ModuleContext, ModuleFactory, SectionModule};
pub use pagination::{compute_visible_pages, PageMarker, PageRequest};
pub use readiness::{ModuleEvent, ModuleRegistry, ModuleStatus};
pub use router::{
    active_section_channel, ActivePublisher, ActiveSection, CurrentSection, NavigationRejection,
    RegistrySectionHandler, SectionHandler, SectionRouter, Transition,
};
