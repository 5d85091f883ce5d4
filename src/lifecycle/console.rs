use crate::managers::{self, DASHBOARD, RESOURCE_SECTIONS};
use console_framework::{
    active_section_channel, content_container, pagination_container, ApiClient, AuthProvider,
    AuthUser, ConsoleConfig, ConsoleError, CurrentSection, Document, ModuleContext,
    ModuleRegistry, Notifier, RegistrySectionHandler, SectionModule, SectionRouter, Transition,
};
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// The section shown right after start.
pub const LANDING_SECTION: &str = DASHBOARD;

/// Every section of the console, in navigation order.
pub fn sections() -> Vec<&'static str> {
    std::iter::once(DASHBOARD).chain(RESOURCE_SECTIONS).collect()
}

/// The running admin console.
///
/// `AdminConsole` is responsible for:
/// - **Access**: refusing to start for anything but an authenticated administrator
/// - **Skeleton**: declaring every section panel and its content and pagination containers
/// - **Wiring**: registering one module per section and routing navigation to it
///
/// # Example
///
/// ```ignore
/// let console = AdminConsole::start(config, api, auth, notifier).await?;
///
/// console.activate("users").await;
/// console.search("alice").await?;
///
/// console.shutdown();
/// ```
pub struct AdminConsole {
    document: Document,
    registry: ModuleRegistry,
    router: SectionRouter,
    user: Option<AuthUser>,
}

impl AdminConsole {
    /// Checks the session, builds the skeleton and lands on the dashboard.
    #[instrument(skip_all)]
    pub async fn start(
        config: ConsoleConfig,
        api: Arc<dyn ApiClient>,
        auth: Arc<dyn AuthProvider>,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self, ConsoleError> {
        config.validate()?;
        let session = auth.check_auth().await?;
        if !session.is_admin() {
            warn!(authenticated = session.authenticated, "Console refused: not an administrator");
            return Err(ConsoleError::Unauthorized);
        }

        let document = Document::new();
        for section in sections() {
            document.declare_section(section);
            document.declare_container(&content_container(section));
            document.declare_container(&pagination_container(section));
        }

        let (publisher, active) = active_section_channel();
        let ctx = ModuleContext {
            api,
            notifier: notifier.clone(),
            document: document.clone(),
            active,
            config: config.clone(),
        };
        let registry = ModuleRegistry::new(ctx, config.readiness);
        managers::register_all(&registry);

        let handler = Arc::new(RegistrySectionHandler::new(registry.clone()));
        let router = SectionRouter::new(sections(), document.clone(), notifier, handler, publisher);

        let console = Self {
            document,
            registry,
            router,
            user: session.user,
        };
        console.router.activate(LANDING_SECTION).await;
        info!(
            user = console.user.as_ref().map(|u| u.username.as_str()).unwrap_or_default(),
            "Admin console started"
        );
        Ok(console)
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn router(&self) -> &SectionRouter {
        &self.router
    }

    pub fn user(&self) -> Option<&AuthUser> {
        self.user.as_ref()
    }

    /// Navigates to `section`.
    pub async fn activate(&self, section: &str) -> Transition {
        self.router.activate(section).await
    }

    /// Re-enters the active section after a failure.
    pub async fn retry(&self, section: &str) -> Result<(), ConsoleError> {
        self.router.retry(section).await
    }

    async fn active_module(&self) -> Result<Arc<dyn SectionModule>, ConsoleError> {
        match self.router.current() {
            CurrentSection::Active(section) => self.registry.request(&section).await,
            CurrentSection::NoneActive => Err(ConsoleError::UnknownSection(String::new())),
        }
    }

    /// Searches the active section. Debounced by the section's module.
    pub async fn search(&self, query: &str) -> Result<(), ConsoleError> {
        self.active_module().await?.search(query.to_string());
        Ok(())
    }

    /// Sets a filter on the active section. An empty value removes it.
    pub async fn set_filter(&self, key: &str, value: &str) -> Result<(), ConsoleError> {
        self.active_module()
            .await?
            .set_filter(key.to_string(), value.to_string());
        Ok(())
    }

    /// Reloads the active section's current page.
    pub async fn refresh(&self) -> Result<(), ConsoleError> {
        self.active_module().await?.refresh().await
    }

    /// Deletes one record of the active section.
    pub async fn delete(&self, id: &str) -> Result<(), ConsoleError> {
        self.active_module().await?.delete(id).await
    }

    /// Aborts pending module constructions.
    pub fn shutdown(self) {
        self.registry.shutdown();
        info!("Admin console stopped");
    }
}
