//! # Section Router
//!
//! The router is the state machine that decides which section is visible.
//!
//! ## States
//!
//! [`CurrentSection::NoneActive`] at startup, then one state per declared
//! section. Because the initial state is a real state, the first activation
//! of any section goes through the normal path; there is no "initial load"
//! flag.
//!
//! ## Transitions
//!
//! ```text
//! activate(id)
//!   ├─ id not declared        → Rejected(Unknown)        (logged)
//!   ├─ id == current section  → Rejected(AlreadyActive)  (logged)
//!   └─ otherwise              → hide current, show id, publish id,
//!                               on_section_entered(id)   → Entered(id)
//! ```
//!
//! ## Failure semantics
//!
//! If entering the section fails, the error is notified and written to the
//! panel's status slot. The section stays active: navigation is never
//! reverted, so the user is never stranded on a blank panel.

use crate::collaborators::{NoticeKind, Notifier};
use crate::dom::{Document, PanelStatus};
use crate::error::ConsoleError;
use crate::readiness::ModuleRegistry;
use async_trait::async_trait;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::watch;
use tracing::{debug, error, info, instrument, warn};

/// A declared section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub id: String,
    pub is_active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CurrentSection {
    NoneActive,
    Active(String),
}

/// Why an activation request was ignored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationRejection {
    Unknown(String),
    AlreadyActive(String),
}

/// Result of [`SectionRouter::activate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    Entered(String),
    Rejected(NavigationRejection),
}

/// Read side of the active-section publication.
#[derive(Debug, Clone)]
pub struct ActiveSection(watch::Receiver<Option<String>>);

impl ActiveSection {
    pub fn current(&self) -> Option<String> {
        self.0.borrow().clone()
    }

    pub fn is(&self, section: &str) -> bool {
        self.0.borrow().as_deref() == Some(section)
    }

    /// Waits until the active section changes.
    pub async fn changed(&mut self) -> Option<String> {
        self.0.changed().await.ok()?;
        self.current()
    }
}

/// Write side, owned by the router.
#[derive(Debug)]
pub struct ActivePublisher(watch::Sender<Option<String>>);

impl ActivePublisher {
    pub fn publish(&self, section: &str) {
        self.0.send_replace(Some(section.to_string()));
    }

    pub fn subscribe(&self) -> ActiveSection {
        ActiveSection(self.0.subscribe())
    }
}

/// Creates the active-section channel. The publisher goes to the router,
/// receivers go to modules through their context.
pub fn active_section_channel() -> (ActivePublisher, ActiveSection) {
    let (tx, rx) = watch::channel(None);
    (ActivePublisher(tx), ActiveSection(rx))
}

/// Runs when a section becomes active.
#[async_trait]
pub trait SectionHandler: Send + Sync {
    async fn on_section_entered(&self, section: &str) -> Result<(), ConsoleError>;

    /// Clears a failed state so the next entry can try again.
    fn reset(&self, _section: &str) {}
}

/// Section handler backed by the module registry.
///
/// Entering a section requests its module (constructing it on first use and
/// waiting for readiness) and calls [`SectionModule::enter`](crate::SectionModule::enter).
/// Sections without a registered module are static and load nothing.
pub struct RegistrySectionHandler {
    registry: ModuleRegistry,
}

impl RegistrySectionHandler {
    pub fn new(registry: ModuleRegistry) -> Self {
        Self { registry }
    }
}

#[async_trait]
impl SectionHandler for RegistrySectionHandler {
    async fn on_section_entered(&self, section: &str) -> Result<(), ConsoleError> {
        if !self.registry.contains(section) {
            debug!(section, "Static section, nothing to load");
            return Ok(());
        }
        let module = self.registry.request(section).await?;
        module.enter().await
    }

    fn reset(&self, section: &str) {
        self.registry.reset(section);
    }
}

struct RouterState {
    sections: Vec<Section>,
    current: CurrentSection,
}

/// The section state machine.
pub struct SectionRouter {
    state: Mutex<RouterState>,
    document: Document,
    notifier: Arc<dyn Notifier>,
    handler: Arc<dyn SectionHandler>,
    publisher: ActivePublisher,
}

impl SectionRouter {
    pub fn new<I, S>(
        sections: I,
        document: Document,
        notifier: Arc<dyn Notifier>,
        handler: Arc<dyn SectionHandler>,
        publisher: ActivePublisher,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let sections = sections
            .into_iter()
            .map(|id| Section {
                id: id.into(),
                is_active: false,
            })
            .collect();
        Self {
            state: Mutex::new(RouterState {
                sections,
                current: CurrentSection::NoneActive,
            }),
            document,
            notifier,
            handler,
            publisher,
        }
    }

    fn lock(&self) -> MutexGuard<'_, RouterState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn current(&self) -> CurrentSection {
        self.lock().current.clone()
    }

    pub fn sections(&self) -> Vec<Section> {
        self.lock().sections.clone()
    }

    /// Switches to `section` and enters it.
    #[instrument(skip(self))]
    pub async fn activate(&self, section: &str) -> Transition {
        if let Err(rejection) = self.transition(section) {
            match &rejection {
                NavigationRejection::Unknown(id) => warn!(section = %id, "Unknown section requested"),
                NavigationRejection::AlreadyActive(id) => debug!(section = %id, "Section already active"),
            }
            return Transition::Rejected(rejection);
        }
        info!(section, "Section activated");
        self.enter(section).await;
        Transition::Entered(section.to_string())
    }

    /// Retries entry of the active section after a failure.
    #[instrument(skip(self))]
    pub async fn retry(&self, section: &str) -> Result<(), ConsoleError> {
        if !self.is_current(section) {
            return Err(ConsoleError::UnknownSection(section.to_string()));
        }
        info!(section, "Retrying section");
        self.handler.reset(section);
        self.enter(section).await;
        Ok(())
    }

    /// The synchronous half of a switch: validates, flips `is_active`,
    /// projects to the document and publishes.
    fn transition(&self, section: &str) -> Result<(), NavigationRejection> {
        let mut state = self.lock();
        if !state.sections.iter().any(|s| s.id == section) {
            return Err(NavigationRejection::Unknown(section.to_string()));
        }
        if let CurrentSection::Active(current) = &state.current {
            if current == section {
                return Err(NavigationRejection::AlreadyActive(section.to_string()));
            }
        }

        for s in state.sections.iter_mut() {
            s.is_active = s.id == section;
        }
        for s in &state.sections {
            if let Err(e) = self.document.project_section(&s.id, s.is_active) {
                warn!(section = %s.id, error = %e, "Section has no panel");
            }
        }
        state.current = CurrentSection::Active(section.to_string());
        self.publisher.publish(section);
        Ok(())
    }

    fn is_current(&self, section: &str) -> bool {
        matches!(&self.lock().current, CurrentSection::Active(id) if id == section)
    }

    async fn enter(&self, section: &str) {
        if let Err(e) = self.document.set_panel_status(section, PanelStatus::Loading) {
            warn!(section, error = %e, "Section has no panel");
        }
        let result = self.handler.on_section_entered(section).await;

        let status = match result {
            Ok(()) => PanelStatus::Idle,
            Err(e) => {
                error!(section, error = %e, "Failed to enter section");
                self.notifier.notify(&e.to_string(), NoticeKind::Error);
                PanelStatus::Error {
                    message: e.to_string(),
                    retry: e.is_retryable(),
                }
            }
        };
        // A panel hidden in the meantime was already reset by the switch.
        if self.is_current(section) {
            if let Err(e) = self.document.set_panel_status(section, status) {
                warn!(section, error = %e, "Section has no panel");
            }
        }
    }
}
