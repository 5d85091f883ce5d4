//! # Admin Console Demo
//!
//! Starts the console and walks through the sections the way an
//! administrator would:
//! 1. Land on the dashboard.
//! 2. Open the user list, search it and page through the results.
//! 3. Delete a comment.
//!
//! Set `ADMIN_CONSOLE_API_BASE` to run against a real backend; otherwise the
//! seeded in-memory backend is used.

use admin_console::clients::{FixtureApi, HttpApiClient, SessionAuth, TracingNotifier};
use admin_console::lifecycle::{setup_tracing, AdminConsole};
use console_framework::{
    content_container, pagination_container, ApiClient, ConsoleConfig, ContainerContent,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn, Instrument};

fn summarize(content: Option<ContainerContent>) -> String {
    match content {
        Some(ContainerContent::Rows(rows)) => format!("{} rows", rows.len()),
        Some(ContainerContent::Error(message)) => format!("error: {message}"),
        Some(other) => format!("{other:?}"),
        None => "nothing rendered".to_string(),
    }
}

#[tokio::main]
async fn main() -> Result<(), String> {
    setup_tracing();

    let config = ConsoleConfig::load().map_err(|e| e.to_string())?;
    let api: Arc<dyn ApiClient> = match &config.api_base_url {
        Some(base) => {
            info!(base = %base, "Using HTTP backend");
            Arc::new(HttpApiClient::new(base).map_err(|e| e.to_string())?)
        }
        None => {
            info!("Using seeded in-memory backend");
            Arc::new(FixtureApi::seeded())
        }
    };
    let settle = config.search_debounce() + Duration::from_millis(100);

    let console = AdminConsole::start(
        config,
        api.clone(),
        Arc::new(SessionAuth::new(api)),
        Arc::new(TracingNotifier),
    )
    .await
    .map_err(|e| e.to_string())?;

    info!(
        dashboard = %summarize(console.document().content(&content_container("dashboard"))),
        "Console ready"
    );

    let span = tracing::info_span!("browse_users");
    async {
        console.activate("users").await;
        info!(listing = %summarize(console.document().content(&content_container("users"))), "First page");

        console.search("member1").await.map_err(|e| e.to_string())?;
        tokio::time::sleep(settle).await;
        info!(listing = %summarize(console.document().content(&content_container("users"))), "Search applied");

        console.search("").await.map_err(|e| e.to_string())?;
        tokio::time::sleep(settle).await;
        match console.document().click_page(&pagination_container("users"), 2) {
            Ok(true) => {
                tokio::time::sleep(Duration::from_millis(100)).await;
                info!(listing = %summarize(console.document().content(&content_container("users"))), "Second page");
            }
            Ok(false) => warn!("Page 2 is not clickable"),
            Err(e) => warn!(error = %e, "No pagination rendered"),
        }
        Ok::<(), String>(())
    }
    .instrument(span)
    .await?;

    let span = tracing::info_span!("moderate_comments");
    async {
        console.activate("comments").await;
        if let Err(e) = console.delete("3").await {
            warn!(error = %e, "Delete failed");
        }
        info!(listing = %summarize(console.document().content(&content_container("comments"))), "After delete");
    }
    .instrument(span)
    .await;

    console.shutdown();
    info!("Demo finished");
    Ok(())
}
