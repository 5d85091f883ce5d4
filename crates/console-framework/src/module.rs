//! # Section Modules
//!
//! A section module is whatever backs a section's content: a resource
//! manager, the dashboard, or a test double. Modules are constructed lazily
//! by a [`ModuleFactory`] and handed a [`ModuleContext`] carrying every
//! collaborator they need. Nothing is looked up from globals.

use crate::collaborators::{ApiClient, Notifier};
use crate::config::ConsoleConfig;
use crate::dom::Document;
use crate::error::ConsoleError;
use crate::router::ActiveSection;
use async_trait::async_trait;
use std::sync::Arc;

/// Dependencies injected into every module at construction time.
#[derive(Clone)]
pub struct ModuleContext {
    pub api: Arc<dyn ApiClient>,
    pub notifier: Arc<dyn Notifier>,
    pub document: Document,
    /// Read side of the router's active section, used to discard responses
    /// that arrive after the user navigated away.
    pub active: ActiveSection,
    pub config: ConsoleConfig,
}

/// Content container of a section.
pub fn content_container(section: &str) -> String {
    format!("{section}-content")
}

/// Pagination container of a section.
pub fn pagination_container(section: &str) -> String {
    format!("{section}-pagination")
}

/// A constructed, usable section module.
///
/// Only [`SectionModule::enter`] is required. Search, filters, refresh and
/// delete have defaults for modules that have nothing to search.
#[async_trait]
pub trait SectionModule: Send + Sync {
    fn name(&self) -> &str;

    /// Called every time the section becomes active: reset paging and load page 1.
    ///
    /// Fetch failures are handled inside the module. An `Err` here means the
    /// section itself could not be entered.
    async fn enter(&self) -> Result<(), ConsoleError>;

    async fn refresh(&self) -> Result<(), ConsoleError> {
        self.enter().await
    }

    /// Deletes one record of this section.
    async fn delete(&self, _id: &str) -> Result<(), ConsoleError> {
        Err(ConsoleError::Api(format!("{} has no deletable records", self.name())))
    }

    fn search(&self, _query: String) {}

    fn set_filter(&self, _key: String, _value: String) {}
}

/// Builds a module. Construction may be slow (it can fetch); the registry
/// runs it in the background and announces readiness when it completes.
#[async_trait]
pub trait ModuleFactory: Send + Sync {
    async fn construct(&self, ctx: ModuleContext) -> Result<Arc<dyn SectionModule>, ConsoleError>;
}
