//! # Generic Resource Manager
//!
//! One [`ResourceManager`] backs every listed section. It is generic over a
//! [`ResourceEntity`], so the fetch / normalize / render / paginate loop is
//! written once and each entity only contributes its endpoint, its payload
//! adapter and its row layout.
//!
//! ## Load cycle
//!
//! ```text
//! load_page(n)
//!   ├─ take request token t
//!   ├─ GET {ENDPOINT}?page=n&limit=..&search=..&{filters}
//!   ├─ token != latest           → Stale (dropped, nothing rendered)
//!   ├─ section no longer active  → Stale (dropped, nothing rendered)
//!   ├─ error  → inline error in the content container, notify, state unchanged
//!   └─ ok     → rows, pagination, PageState updated → Rendered
//! ```
//!
//! Tokens are taken before the request is sent, so only the response to the
//! most recently *issued* request can render, whatever order responses
//! arrive in.

use crate::collaborators::{Method, NoticeKind, RequestOptions};
use crate::debounce::Debouncer;
use crate::dom::{ContainerContent, PageChangeHandler};
use crate::entity::ResourceEntity;
use crate::error::ConsoleError;
use crate::listing::{Listing, PageState};
use crate::module::{content_container, pagination_container, ModuleContext, ModuleFactory, SectionModule};
use crate::pagination::{self, PageRequest};
use async_trait::async_trait;
use serde_json::json;
use std::marker::PhantomData;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use tracing::{debug, error, info, instrument, warn};

/// What became of one [`ResourceManager::load_page`] call.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadOutcome {
    Rendered { page: u32 },
    /// Superseded by a newer request, or the section is no longer visible.
    Stale,
    Failed(ConsoleError),
}

pub struct ResourceManager<E: ResourceEntity> {
    ctx: ModuleContext,
    state: Mutex<PageState>,
    latest: AtomicU64,
    debouncer: Debouncer,
    this: Weak<Self>,
    _entity: PhantomData<fn() -> E>,
}

impl<E: ResourceEntity> ResourceManager<E> {
    pub fn new(ctx: ModuleContext) -> Arc<Self> {
        let state = PageState::new(ctx.config.page_size);
        let debouncer = Debouncer::new(ctx.config.search_debounce());
        Arc::new_cyclic(|this| Self {
            ctx,
            state: Mutex::new(state),
            latest: AtomicU64::new(0),
            debouncer,
            this: this.clone(),
            _entity: PhantomData,
        })
    }

    fn lock(&self) -> MutexGuard<'_, PageState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn page_state(&self) -> PageState {
        self.lock().clone()
    }

    /// Fetches and renders `page` under the current search and filters.
    #[instrument(skip(self), fields(section = E::SECTION))]
    pub async fn load_page(&self, page: u32) -> LoadOutcome {
        let token = self.latest.fetch_add(1, Ordering::SeqCst) + 1;
        let query = self.lock().query_for(page);
        let endpoint = query.to_endpoint(E::ENDPOINT);
        debug!(token, %endpoint, "Loading page");

        let result: Result<Listing<E>, ConsoleError> = async {
            let envelope = self.ctx.api.request(&endpoint, RequestOptions::get()).await?;
            let listing = E::normalize(envelope.into_payload()?, &query)?;
            listing
                .try_map(serde_json::from_value::<E>)
                .map_err(|e| ConsoleError::UnexpectedPayload(e.to_string()))
        }
        .await;

        if self.latest.load(Ordering::SeqCst) != token {
            debug!(token, "Superseded response dropped");
            return LoadOutcome::Stale;
        }
        if !self.ctx.active.is(E::SECTION) {
            debug!(token, "Response for hidden section dropped");
            return LoadOutcome::Stale;
        }

        match result.and_then(|listing| self.render(listing)) {
            Ok(page) => LoadOutcome::Rendered { page },
            Err(e) => {
                self.render_failure(&e);
                LoadOutcome::Failed(e)
            }
        }
    }

    /// Writes both containers, then commits the listing to PageState. A
    /// render error leaves PageState untouched.
    fn render(&self, listing: Listing<E>) -> Result<u32, ConsoleError> {
        let request = PageRequest {
            current_page: listing.page,
            total_pages: listing.total_pages,
            max_visible: self.ctx.config.max_visible_pages,
        };
        pagination::render(
            &self.ctx.document,
            &pagination_container(E::SECTION),
            request,
            self.page_handler(),
        )?;
        let rows = listing.items.iter().map(E::render_row).collect();
        self.ctx
            .document
            .replace(&content_container(E::SECTION), ContainerContent::Rows(rows))?;

        self.lock().apply(&listing);
        info!(
            section = E::SECTION,
            page = listing.page,
            total = listing.total,
            "Page rendered"
        );
        Ok(listing.page)
    }

    fn render_failure(&self, e: &ConsoleError) {
        error!(section = E::SECTION, error = %e, "Failed to load");
        let message = format!("Failed to load {}: {e}", E::SECTION);
        let content = ContainerContent::Error(message.clone());
        if let Err(e) = self.ctx.document.replace(&content_container(E::SECTION), content) {
            warn!(section = E::SECTION, error = %e, "Error state not rendered");
        }
        self.ctx.notifier.notify(&message, NoticeKind::Error);
    }

    /// Bound to every rendered page control.
    fn page_handler(&self) -> PageChangeHandler {
        let this = self.this.clone();
        Arc::new(move |page| {
            if let Some(manager) = this.upgrade() {
                tokio::spawn(async move {
                    manager.load_page(page).await;
                });
            }
        })
    }

    /// Reloads the current page.
    pub async fn reload(&self) -> LoadOutcome {
        let page = self.lock().current_page;
        self.load_page(page).await
    }

    /// Deletes a record, then reloads the current page.
    #[instrument(skip(self), fields(section = E::SECTION))]
    pub async fn delete_record(&self, id: &str) -> Result<(), ConsoleError> {
        let options = RequestOptions::with_body(Method::Delete, json!({ "id": id }));
        let outcome = self
            .ctx
            .api
            .request(E::ENDPOINT, options)
            .await
            .and_then(|envelope| envelope.ensure_success());
        if let Err(e) = outcome {
            error!(id, error = %e, "Delete failed");
            self.ctx.notifier.notify(&e.to_string(), NoticeKind::Error);
            return Err(e);
        }
        info!(id, "Record deleted");
        self.ctx.notifier.notify("Deleted successfully", NoticeKind::Success);
        self.reload().await;
        Ok(())
    }

    /// Applies `update` now and schedules a debounced reload of page 1.
    fn update_and_reload(&self, update: impl FnOnce(&mut PageState)) {
        update(&mut *self.lock());
        let this = self.this.clone();
        self.debouncer.schedule(move || async move {
            if let Some(manager) = this.upgrade() {
                manager.load_page(1).await;
            }
        });
    }
}

#[async_trait]
impl<E: ResourceEntity> SectionModule for ResourceManager<E> {
    fn name(&self) -> &str {
        E::SECTION
    }

    async fn enter(&self) -> Result<(), ConsoleError> {
        self.lock().current_page = 1;
        self.load_page(1).await;
        Ok(())
    }

    async fn refresh(&self) -> Result<(), ConsoleError> {
        self.reload().await;
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<(), ConsoleError> {
        self.delete_record(id).await
    }

    /// The query is recorded at once; only the last input within the quiet
    /// window triggers a load.
    fn search(&self, query: String) {
        self.update_and_reload(move |state| state.search_query = query);
    }

    /// Debounced like search. An empty value removes the filter.
    fn set_filter(&self, key: String, value: String) {
        self.update_and_reload(move |state| {
            if value.is_empty() {
                state.filters.remove(&key);
            } else {
                state.filters.insert(key, value);
            }
        });
    }
}

/// Builds a [`ResourceManager`] for `E`.
pub struct ManagerFactory<E>(PhantomData<fn() -> E>);

impl<E: ResourceEntity> ManagerFactory<E> {
    pub fn new() -> Self {
        Self(PhantomData)
    }
}

impl<E: ResourceEntity> Default for ManagerFactory<E> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<E: ResourceEntity> ModuleFactory for ManagerFactory<E> {
    async fn construct(&self, ctx: ModuleContext) -> Result<Arc<dyn SectionModule>, ConsoleError> {
        debug!(section = E::SECTION, "Building resource manager");
        Ok(ResourceManager::<E>::new(ctx))
    }
}
