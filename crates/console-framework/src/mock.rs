//! # Test Doubles
//!
//! In-memory stand-ins for every collaborator, so routers, registries and
//! managers can be driven deterministically without a network.
//!
//! | Double | Stands in for | Inspect with |
//! |--------|---------------|--------------|
//! | [`MockApi`] | [`ApiClient`] | `calls()`, `verify()` |
//! | [`RecordingNotifier`] | [`Notifier`] | `notices()`, `of_kind()` |
//! | [`StaticAuth`] | [`AuthProvider`] | - |
//! | [`MockFactory`] / [`MockModule`] | [`ModuleFactory`] / [`SectionModule`] | `constructions()`, `enters()` |
//!
//! ## Expectations
//!
//! `MockApi` answers requests from a FIFO queue of expectations. Each
//! expectation names an endpoint fragment the request must contain:
//!
//! ```rust,ignore
//! let api = MockApi::new();
//! api.expect("admin/users.php").return_ok(json!({"items": [], "total": 0}));
//! api.expect("admin/users.php").return_failure("Database offline");
//!
//! // ... drive the code under test ...
//! api.verify(); // every expectation consumed
//! ```
//!
//! ## Controlling response order
//!
//! [`ExpectationBuilder::return_deferred`] parks the response until the test
//! resolves it, which is how out-of-order arrival is simulated:
//!
//! ```rust,ignore
//! let first = api.expect("page=1").return_deferred();
//! let second = api.expect("page=2").return_deferred();
//! second.resolve_ok(page_two);
//! first.resolve_ok(page_one); // arrives last, must be discarded
//! ```

use crate::collaborators::{
    ApiClient, ApiEnvelope, AuthProvider, AuthResult, NoticeKind, Notifier, RequestOptions,
};
use crate::config::ConsoleConfig;
use crate::dom::Document;
use crate::error::ConsoleError;
use crate::module::{ModuleContext, ModuleFactory, SectionModule};
use crate::router::{active_section_channel, ActivePublisher};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::oneshot;

type Response = Result<ApiEnvelope, ConsoleError>;

enum MockResponse {
    Ready(Response),
    Deferred(oneshot::Receiver<Response>),
}

struct Expectation {
    endpoint: String,
    response: MockResponse,
}

/// A request received by [`MockApi`].
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub endpoint: String,
    pub options: RequestOptions,
}

/// Scripted [`ApiClient`].
#[derive(Clone, Default)]
pub struct MockApi {
    expectations: Arc<Mutex<VecDeque<Expectation>>>,
    calls: Arc<Mutex<Vec<RecordedCall>>>,
}

impl MockApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Expects a request whose endpoint contains `endpoint`.
    pub fn expect(&self, endpoint: impl Into<String>) -> ExpectationBuilder {
        ExpectationBuilder {
            endpoint: endpoint.into(),
            expectations: self.expectations.clone(),
        }
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Verifies that all expectations were met.
    pub fn verify(&self) {
        let remaining = self.expectations.lock().unwrap().len();
        if remaining > 0 {
            panic!("Not all expectations were met. {remaining} remaining");
        }
    }
}

#[async_trait]
impl ApiClient for MockApi {
    async fn request(&self, endpoint: &str, options: RequestOptions) -> Response {
        self.calls.lock().unwrap().push(RecordedCall {
            endpoint: endpoint.to_string(),
            options,
        });
        let expectation = self.expectations.lock().unwrap().pop_front();
        let Some(expectation) = expectation else {
            panic!("Unexpected request to {endpoint}");
        };
        if !endpoint.contains(&expectation.endpoint) {
            panic!(
                "Expected a request to {}, got {endpoint}",
                expectation.endpoint
            );
        }
        match expectation.response {
            MockResponse::Ready(response) => response,
            MockResponse::Deferred(rx) => rx.await.unwrap_or_else(|_| {
                Err(ConsoleError::Fetch {
                    endpoint: endpoint.to_string(),
                    reason: "deferred response dropped".into(),
                })
            }),
        }
    }
}

/// Builder returned by [`MockApi::expect`].
pub struct ExpectationBuilder {
    endpoint: String,
    expectations: Arc<Mutex<VecDeque<Expectation>>>,
}

impl ExpectationBuilder {
    fn push(self, response: MockResponse) {
        self.expectations.lock().unwrap().push_back(Expectation {
            endpoint: self.endpoint,
            response,
        });
    }

    /// Answers with a successful envelope carrying `data`.
    pub fn return_ok(self, data: Value) {
        self.push(MockResponse::Ready(Ok(ApiEnvelope::ok(data))));
    }

    /// Answers with `success: false`.
    pub fn return_failure(self, message: &str) {
        self.push(MockResponse::Ready(Ok(ApiEnvelope::failure(message))));
    }

    /// Fails at the transport level.
    pub fn return_err(self, error: ConsoleError) {
        self.push(MockResponse::Ready(Err(error)));
    }

    /// Holds the response until [`DeferredResponse::resolve`] is called.
    pub fn return_deferred(self) -> DeferredResponse {
        let (tx, rx) = oneshot::channel();
        self.push(MockResponse::Deferred(rx));
        DeferredResponse(tx)
    }
}

/// Resolves a parked response.
pub struct DeferredResponse(oneshot::Sender<Response>);

impl DeferredResponse {
    pub fn resolve(self, response: Response) {
        let _ = self.0.send(response);
    }

    pub fn resolve_ok(self, data: Value) {
        self.resolve(Ok(ApiEnvelope::ok(data)));
    }
}

/// Records every notification.
#[derive(Default)]
pub struct RecordingNotifier {
    notices: Mutex<Vec<(String, NoticeKind)>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notices(&self) -> Vec<(String, NoticeKind)> {
        self.notices.lock().unwrap().clone()
    }

    pub fn of_kind(&self, kind: NoticeKind) -> Vec<String> {
        self.notices
            .lock()
            .unwrap()
            .iter()
            .filter(|(_, k)| *k == kind)
            .map(|(m, _)| m.clone())
            .collect()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, message: &str, kind: NoticeKind) {
        self.notices.lock().unwrap().push((message.to_string(), kind));
    }
}

/// Answers every session check with the same result.
pub struct StaticAuth(pub Result<AuthResult, ConsoleError>);

#[async_trait]
impl AuthProvider for StaticAuth {
    async fn check_auth(&self) -> Result<AuthResult, ConsoleError> {
        self.0.clone()
    }
}

/// Section module that counts entries.
pub struct MockModule {
    name: String,
    enters: AtomicU32,
    enter_error: Mutex<Option<ConsoleError>>,
}

impl MockModule {
    pub fn new(name: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            name: name.into(),
            enters: AtomicU32::new(0),
            enter_error: Mutex::new(None),
        })
    }

    /// Makes the next entries fail with `error`.
    pub fn fail_enter_with(&self, error: ConsoleError) {
        *self.enter_error.lock().unwrap() = Some(error);
    }

    pub fn succeed_enter(&self) {
        *self.enter_error.lock().unwrap() = None;
    }

    pub fn enters(&self) -> u32 {
        self.enters.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SectionModule for MockModule {
    fn name(&self) -> &str {
        &self.name
    }

    async fn enter(&self) -> Result<(), ConsoleError> {
        self.enters.fetch_add(1, Ordering::SeqCst);
        match self.enter_error.lock().unwrap().clone() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

/// How a [`MockFactory`] constructs.
#[derive(Debug, Clone)]
pub enum Construction {
    Immediate,
    /// Never completes; readiness must come from an announcement or time out.
    Never,
    Delayed(Duration),
    Fail(String),
}

/// Factory handing out one shared [`MockModule`].
pub struct MockFactory {
    behaviour: Construction,
    module: Arc<MockModule>,
    constructions: AtomicU32,
}

impl MockFactory {
    pub fn new(name: &str, behaviour: Construction) -> Arc<Self> {
        Arc::new(Self {
            behaviour,
            module: MockModule::new(name),
            constructions: AtomicU32::new(0),
        })
    }

    pub fn module(&self) -> Arc<MockModule> {
        self.module.clone()
    }

    pub fn constructions(&self) -> u32 {
        self.constructions.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ModuleFactory for MockFactory {
    async fn construct(&self, _ctx: ModuleContext) -> Result<Arc<dyn SectionModule>, ConsoleError> {
        self.constructions.fetch_add(1, Ordering::SeqCst);
        match &self.behaviour {
            Construction::Immediate => {}
            Construction::Never => std::future::pending::<()>().await,
            Construction::Delayed(delay) => tokio::time::sleep(*delay).await,
            Construction::Fail(reason) => return Err(ConsoleError::Api(reason.clone())),
        }
        Ok(self.module.clone())
    }
}

/// A [`ModuleContext`] wired to fresh doubles, with handles to each of them.
pub struct MockEnvironment {
    pub api: MockApi,
    pub notifier: Arc<RecordingNotifier>,
    pub document: Document,
    pub publisher: ActivePublisher,
    pub ctx: ModuleContext,
}

impl MockEnvironment {
    pub fn new(config: ConsoleConfig) -> Self {
        let api = MockApi::new();
        let notifier = Arc::new(RecordingNotifier::new());
        let document = Document::new();
        let (publisher, active) = active_section_channel();
        let ctx = ModuleContext {
            api: Arc::new(api.clone()),
            notifier: notifier.clone(),
            document: document.clone(),
            active,
            config,
        };
        Self {
            api,
            notifier,
            document,
            publisher,
            ctx,
        }
    }

    /// Declares `section` and its content and pagination containers.
    pub fn declare_listing(&self, section: &str) {
        self.document.declare_section(section);
        self.document
            .declare_container(&crate::module::content_container(section));
        self.document
            .declare_container(&crate::module::pagination_container(section));
    }
}

impl Default for MockEnvironment {
    fn default() -> Self {
        Self::new(ConsoleConfig::default())
    }
}
