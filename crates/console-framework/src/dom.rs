//! # Document Skeleton
//!
//! The console works against a fixed, pre-declared skeleton: one panel
//! (`"{section}-section"`) and one nav link per section, plus content
//! containers addressed by explicit ids. [`Document`] is a cheap-to-clone
//! handle to that skeleton.
//!
//! Ownership of the tree is split by region:
//! - the router toggles panel visibility, nav link state and the panel status slot;
//! - each module writes only into its own containers.
//!
//! Panel and nav state are a projection of the router's `Section::is_active`,
//! never read back as a source of truth.

use crate::error::ConsoleError;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, trace};

/// Callback bound to pagination controls.
pub type PageChangeHandler = Arc<dyn Fn(u32) + Send + Sync>;

/// Conventional panel id for a section.
pub fn panel_id(section: &str) -> String {
    format!("{section}-section")
}

/// Status slot of a panel, written by the router.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PanelStatus {
    #[default]
    Idle,
    Loading,
    Error { message: String, retry: bool },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Panel {
    pub id: String,
    pub visible: bool,
    pub status: PanelStatus,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavLink {
    /// Value of the link's `data-section` attribute.
    pub data_section: String,
    pub active: bool,
}

/// One rendered record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    pub id: String,
    pub cells: Vec<String>,
}

impl Row {
    pub fn new(id: impl Into<String>, cells: Vec<String>) -> Self {
        Self {
            id: id.into(),
            cells,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlKind {
    Previous,
    Next,
    Page(u32),
    Ellipsis,
}

/// A pagination button.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Control {
    pub kind: ControlKind,
    pub target: Option<u32>,
    pub disabled: bool,
    pub current: bool,
}

impl Control {
    pub fn is_clickable(&self) -> bool {
        !self.disabled && !self.current && self.target.is_some()
    }
}

/// Rendered pagination controls with their bound handler.
#[derive(Clone)]
pub struct PaginationControls {
    pub controls: Vec<Control>,
    pub(crate) on_page_change: PageChangeHandler,
}

impl fmt::Debug for PaginationControls {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PaginationControls")
            .field("controls", &self.controls)
            .finish_non_exhaustive()
    }
}

/// Whatever a container currently shows.
#[derive(Debug, Clone, Default)]
pub enum ContainerContent {
    #[default]
    Empty,
    Rows(Vec<Row>),
    /// Inline error state rendered by the owning module.
    Error(String),
    Pagination(PaginationControls),
}

impl ContainerContent {
    pub fn is_empty(&self) -> bool {
        matches!(self, ContainerContent::Empty)
    }

    pub fn rows(&self) -> Option<&[Row]> {
        match self {
            ContainerContent::Rows(rows) => Some(rows),
            _ => None,
        }
    }

    pub fn controls(&self) -> Option<&[Control]> {
        match self {
            ContainerContent::Pagination(p) => Some(&p.controls),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            ContainerContent::Error(message) => Some(message),
            _ => None,
        }
    }
}

#[derive(Default)]
struct Skeleton {
    panels: HashMap<String, Panel>,
    nav_links: HashMap<String, NavLink>,
    containers: HashMap<String, ContainerContent>,
}

/// Shared handle to the document skeleton.
#[derive(Clone, Default)]
pub struct Document {
    inner: Arc<Mutex<Skeleton>>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    fn skeleton(&self) -> MutexGuard<'_, Skeleton> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Declares the panel and nav link of a section. Both start hidden/inactive.
    pub fn declare_section(&self, section: &str) {
        let mut doc = self.skeleton();
        let id = panel_id(section);
        doc.panels.insert(
            section.to_string(),
            Panel {
                id,
                visible: false,
                status: PanelStatus::Idle,
            },
        );
        doc.nav_links.insert(
            section.to_string(),
            NavLink {
                data_section: section.to_string(),
                active: false,
            },
        );
    }

    pub fn declare_container(&self, id: &str) {
        self.skeleton()
            .containers
            .insert(id.to_string(), ContainerContent::Empty);
    }

    pub fn panel(&self, section: &str) -> Option<Panel> {
        self.skeleton().panels.get(section).cloned()
    }

    pub fn nav_link(&self, section: &str) -> Option<NavLink> {
        self.skeleton().nav_links.get(section).cloned()
    }

    /// Shows or hides a section's panel and sets its nav link's active class.
    pub fn project_section(&self, section: &str, active: bool) -> Result<(), ConsoleError> {
        let mut doc = self.skeleton();
        let panel = doc
            .panels
            .get_mut(section)
            .ok_or_else(|| ConsoleError::MissingElement(panel_id(section)))?;
        panel.visible = active;
        if !active {
            panel.status = PanelStatus::Idle;
        }
        if let Some(link) = doc.nav_links.get_mut(section) {
            link.active = active;
        }
        trace!(section, active, "Section projected");
        Ok(())
    }

    pub fn set_panel_status(&self, section: &str, status: PanelStatus) -> Result<(), ConsoleError> {
        let mut doc = self.skeleton();
        let panel = doc
            .panels
            .get_mut(section)
            .ok_or_else(|| ConsoleError::MissingElement(panel_id(section)))?;
        panel.status = status;
        Ok(())
    }

    /// Replaces the full content of a container.
    pub fn replace(&self, container: &str, content: ContainerContent) -> Result<(), ConsoleError> {
        let mut doc = self.skeleton();
        let slot = doc
            .containers
            .get_mut(container)
            .ok_or_else(|| ConsoleError::MissingElement(container.to_string()))?;
        *slot = content;
        Ok(())
    }

    pub fn clear(&self, container: &str) -> Result<(), ConsoleError> {
        self.replace(container, ContainerContent::Empty)
    }

    pub fn content(&self, container: &str) -> Option<ContainerContent> {
        self.skeleton().containers.get(container).cloned()
    }

    /// Clicks the control at `index` in a pagination container.
    ///
    /// Returns `true` when the bound handler was invoked. Disabled controls,
    /// the current page and ellipses are inert.
    pub fn click(&self, container: &str, index: usize) -> Result<bool, ConsoleError> {
        let (target, handler) = {
            let doc = self.skeleton();
            let controls = match doc.containers.get(container) {
                Some(ContainerContent::Pagination(p)) => p,
                Some(_) => return Ok(false),
                None => return Err(ConsoleError::MissingElement(container.to_string())),
            };
            match controls.controls.get(index) {
                Some(control) if control.is_clickable() => {
                    (control.target, controls.on_page_change.clone())
                }
                _ => return Ok(false),
            }
        };
        // The handler may re-render this container, so the lock is released first.
        match target {
            Some(page) => {
                debug!(container, page, "Page control clicked");
                handler(page);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Clicks the numbered control for `page`, if one is rendered.
    pub fn click_page(&self, container: &str, page: u32) -> Result<bool, ConsoleError> {
        let index = self.content(container).and_then(|content| {
            content
                .controls()
                .and_then(|controls| controls.iter().position(|c| c.kind == ControlKind::Page(page)))
        });
        match index {
            Some(index) => self.click(container, index),
            None => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn projection_toggles_panel_and_nav_together() {
        let doc = Document::new();
        doc.declare_section("users");
        doc.project_section("users", true).unwrap();
        assert!(doc.panel("users").unwrap().visible);
        assert!(doc.nav_link("users").unwrap().active);
        assert_eq!(doc.panel("users").unwrap().id, "users-section");

        doc.set_panel_status("users", PanelStatus::Loading).unwrap();
        doc.project_section("users", false).unwrap();
        let panel = doc.panel("users").unwrap();
        assert!(!panel.visible);
        assert_eq!(panel.status, PanelStatus::Idle);
    }

    #[test]
    fn writes_to_undeclared_elements_fail() {
        let doc = Document::new();
        assert_eq!(
            doc.replace("ghost", ContainerContent::Empty),
            Err(ConsoleError::MissingElement("ghost".into()))
        );
        assert!(doc.project_section("ghost", true).is_err());
    }
}
