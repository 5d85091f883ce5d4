use crate::model::DashboardStats;
use async_trait::async_trait;
use console_framework::{
    content_container, ConsoleError, ContainerContent, ModuleContext, ModuleFactory, NoticeKind,
    RequestOptions, SectionModule,
};
use std::sync::Arc;
use tracing::{error, info, instrument};

pub const DASHBOARD: &str = "dashboard";

/// Backs the `dashboard` section with aggregate counts.
pub struct DashboardModule {
    ctx: ModuleContext,
}

impl DashboardModule {
    pub fn new(ctx: ModuleContext) -> Self {
        Self { ctx }
    }

    async fn fetch(&self) -> Result<DashboardStats, ConsoleError> {
        let envelope = self
            .ctx
            .api
            .request(DashboardStats::ENDPOINT, RequestOptions::get())
            .await?;
        DashboardStats::from_payload(envelope.into_payload()?)
    }
}

#[async_trait]
impl SectionModule for DashboardModule {
    fn name(&self) -> &str {
        DASHBOARD
    }

    #[instrument(skip(self))]
    async fn enter(&self) -> Result<(), ConsoleError> {
        let result = self.fetch().await;
        if !self.ctx.active.is(DASHBOARD) {
            return Ok(());
        }
        let content = match result {
            Ok(stats) => {
                info!(users = stats.users, posts = stats.posts, "Dashboard loaded");
                ContainerContent::Rows(stats.rows())
            }
            Err(e) => {
                error!(error = %e, "Failed to load dashboard");
                let message = format!("Failed to load dashboard: {e}");
                self.ctx.notifier.notify(&message, NoticeKind::Error);
                ContainerContent::Error(message)
            }
        };
        self.ctx.document.replace(&content_container(DASHBOARD), content)
    }
}

pub struct DashboardFactory;

#[async_trait]
impl ModuleFactory for DashboardFactory {
    async fn construct(&self, ctx: ModuleContext) -> Result<Arc<dyn SectionModule>, ConsoleError> {
        Ok(Arc::new(DashboardModule::new(ctx)))
    }
}
