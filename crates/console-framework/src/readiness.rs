//! # Module Readiness Protocol
//!
//! The [`ModuleRegistry`] owns one handle per lazily-constructed module and
//! drives its state machine:
//!
//! ```text
//! Uninitialized ──request──▶ Initializing ──announce / construction ok──▶ Ready
//!       ▲                          │
//!       └────────reset─────── Failed ◀── construction error / poll ceiling
//! ```
//!
//! ## Waiting for readiness
//!
//! A consumer calling [`ModuleRegistry::request`] while the module is
//! initializing waits on two channels at once:
//!
//! 1. **Event** - a subscription to the broadcast [`ModuleEvent`] stream.
//!    The subscription is taken *before* the state is inspected, so a ready
//!    event fired between the check and the wait is still observed.
//! 2. **Poll** - a fixed-cadence interval re-checking the handle state, with
//!    an attempt ceiling. This bounds the wait and covers lagged receivers.
//!
//! Whichever channel sees `Ready` first wins; returning drops both the
//! subscription and the interval. When the ceiling is reached the handle
//! becomes `Failed` and a failure event rejects every other waiter.
//!
//! ## Singleton construction
//!
//! The state transition to `Initializing` and the spawn of the construction
//! happen under one lock, so concurrent requests share the in-flight
//! construction. Each construction is tagged with its attempt number; a
//! result arriving after its attempt timed out is discarded.
//!
//! ```rust,ignore
//! registry.register("users", Arc::new(ManagerFactory::<User>::new()));
//!
//! // Both callers get the same instance from a single construction.
//! let (a, b) = tokio::join!(registry.request("users"), registry.request("users"));
//! ```

use crate::config::ReadinessPolicy;
use crate::error::ConsoleError;
use crate::module::{ModuleContext, ModuleFactory, SectionModule};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info, instrument, warn};

/// State of one module handle.
#[derive(Clone)]
pub enum ModuleState {
    Uninitialized,
    Initializing,
    Ready(Arc<dyn SectionModule>),
    Failed(ConsoleError),
}

impl ModuleState {
    pub fn status(&self) -> ModuleStatus {
        match self {
            ModuleState::Uninitialized => ModuleStatus::Uninitialized,
            ModuleState::Initializing => ModuleStatus::Initializing,
            ModuleState::Ready(_) => ModuleStatus::Ready,
            ModuleState::Failed(_) => ModuleStatus::Failed,
        }
    }
}

impl fmt::Debug for ModuleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModuleState::Ready(module) => f.debug_tuple("Ready").field(&module.name()).finish(),
            ModuleState::Failed(e) => f.debug_tuple("Failed").field(e).finish(),
            other => write!(f, "{:?}", other.status()),
        }
    }
}

/// Instance-free snapshot of a handle's state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModuleStatus {
    Uninitialized,
    Initializing,
    Ready,
    Failed,
}

/// Broadcast on every terminal transition.
#[derive(Debug, Clone, PartialEq)]
pub enum ModuleEvent {
    Ready { module: String },
    Failed { module: String, error: ConsoleError },
}

struct ModuleHandle {
    state: ModuleState,
    /// `None` for modules that are built elsewhere and only announce themselves.
    factory: Option<Arc<dyn ModuleFactory>>,
    attempt: u64,
    construction: Option<JoinHandle<()>>,
}

impl ModuleHandle {
    fn new(factory: Option<Arc<dyn ModuleFactory>>) -> Self {
        Self {
            state: ModuleState::Uninitialized,
            factory,
            attempt: 0,
            construction: None,
        }
    }
}

struct RegistryInner {
    handles: Mutex<HashMap<String, ModuleHandle>>,
    events: broadcast::Sender<ModuleEvent>,
    ctx: ModuleContext,
    policy: ReadinessPolicy,
}

/// Registry of lazily constructed section modules. Cheap to clone.
#[derive(Clone)]
pub struct ModuleRegistry {
    inner: Arc<RegistryInner>,
}

impl ModuleRegistry {
    pub fn new(ctx: ModuleContext, policy: ReadinessPolicy) -> Self {
        let (events, _) = broadcast::channel(64);
        Self {
            inner: Arc::new(RegistryInner {
                handles: Mutex::new(HashMap::new()),
                events,
                ctx,
                policy,
            }),
        }
    }

    fn handles(&self) -> MutexGuard<'_, HashMap<String, ModuleHandle>> {
        self.inner.handles.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn policy(&self) -> ReadinessPolicy {
        self.inner.policy
    }

    /// Declares a module built by `factory` on first request.
    pub fn register(&self, id: impl Into<String>, factory: Arc<dyn ModuleFactory>) {
        let id = id.into();
        debug!(module = %id, "Module registered");
        if self.handles().insert(id.clone(), ModuleHandle::new(Some(factory))).is_some() {
            warn!(module = %id, "Module registered twice; previous handle replaced");
        }
    }

    /// Declares a module that is constructed elsewhere and will call
    /// [`ModuleRegistry::announce_ready`] itself.
    pub fn declare(&self, id: impl Into<String>) {
        let id = id.into();
        debug!(module = %id, "Module declared");
        self.handles().entry(id).or_insert_with(|| ModuleHandle::new(None));
    }

    pub fn contains(&self, id: &str) -> bool {
        self.handles().contains_key(id)
    }

    pub fn status(&self, id: &str) -> Option<ModuleStatus> {
        self.handles().get(id).map(|h| h.state.status())
    }

    /// Observes readiness events.
    pub fn subscribe(&self) -> broadcast::Receiver<ModuleEvent> {
        self.inner.events.subscribe()
    }

    /// Returns the module, constructing it on first use and waiting for readiness.
    #[instrument(skip(self))]
    pub async fn request(&self, id: &str) -> Result<Arc<dyn SectionModule>, ConsoleError> {
        let events = self.inner.events.subscribe();
        {
            let mut handles = self.handles();
            let handle = handles
                .get_mut(id)
                .ok_or_else(|| ConsoleError::UnknownModule(id.to_string()))?;
            match &handle.state {
                ModuleState::Ready(module) => return Ok(module.clone()),
                ModuleState::Failed(error) => return Err(error.clone()),
                ModuleState::Initializing => debug!(module = id, "Joining in-flight construction"),
                ModuleState::Uninitialized => {
                    handle.attempt += 1;
                    handle.state = ModuleState::Initializing;
                    if let Some(factory) = handle.factory.clone() {
                        info!(module = id, attempt = handle.attempt, "Constructing module");
                        handle.construction = Some(self.spawn_construction(id, handle.attempt, factory));
                    } else {
                        info!(module = id, "Waiting for module announcement");
                    }
                }
            }
        }
        self.wait_ready(id, events).await
    }

    /// Marks a module ready and wakes every waiter.
    ///
    /// A second announcement for a module that is already ready is ignored:
    /// the first instance stays the singleton.
    pub fn announce_ready(&self, id: &str, module: Arc<dyn SectionModule>) -> Result<(), ConsoleError> {
        {
            let mut handles = self.handles();
            let handle = handles
                .get_mut(id)
                .ok_or_else(|| ConsoleError::UnknownModule(id.to_string()))?;
            if matches!(handle.state, ModuleState::Ready(_)) {
                warn!(module = id, "Duplicate ready announcement ignored");
                return Ok(());
            }
            handle.state = ModuleState::Ready(module);
        }
        info!(module = id, "Module ready");
        let _ = self.inner.events.send(ModuleEvent::Ready {
            module: id.to_string(),
        });
        Ok(())
    }

    /// Moves a failed module back to `Uninitialized` so it can be requested again.
    pub fn reset(&self, id: &str) -> bool {
        let mut handles = self.handles();
        match handles.get_mut(id) {
            Some(handle) if matches!(handle.state, ModuleState::Failed(_)) => {
                handle.state = ModuleState::Uninitialized;
                info!(module = id, "Module reset after failure");
                true
            }
            _ => false,
        }
    }

    /// Aborts in-flight constructions and fails their waiters.
    pub fn shutdown(&self) {
        let mut failed = Vec::new();
        {
            let mut handles = self.handles();
            for (id, handle) in handles.iter_mut() {
                if let Some(construction) = handle.construction.take() {
                    construction.abort();
                }
                if matches!(handle.state, ModuleState::Initializing) {
                    let error = ConsoleError::ModuleUnavailable(id.clone());
                    handle.state = ModuleState::Failed(error.clone());
                    failed.push((id.clone(), error));
                }
            }
        }
        for (module, error) in failed {
            let _ = self.inner.events.send(ModuleEvent::Failed { module, error });
        }
        info!("Module registry shut down");
    }

    fn spawn_construction(&self, id: &str, attempt: u64, factory: Arc<dyn ModuleFactory>) -> JoinHandle<()> {
        let registry = self.clone();
        let ctx = self.inner.ctx.clone();
        let id = id.to_string();
        tokio::spawn(async move {
            let result = factory.construct(ctx).await;
            registry.complete_construction(&id, attempt, result);
        })
    }

    fn complete_construction(
        &self,
        id: &str,
        attempt: u64,
        result: Result<Arc<dyn SectionModule>, ConsoleError>,
    ) {
        let event = {
            let mut handles = self.handles();
            let Some(handle) = handles.get_mut(id) else {
                return;
            };
            if handle.attempt != attempt || !matches!(handle.state, ModuleState::Initializing) {
                debug!(module = id, attempt, "Construction result discarded");
                return;
            }
            handle.construction = None;
            match result {
                Ok(module) => {
                    handle.state = ModuleState::Ready(module);
                    info!(module = id, attempt, "Module ready");
                    ModuleEvent::Ready {
                        module: id.to_string(),
                    }
                }
                Err(e) => {
                    let error = ConsoleError::ModuleInitFailed {
                        module: id.to_string(),
                        reason: e.to_string(),
                    };
                    warn!(module = id, attempt, error = %e, "Module construction failed");
                    handle.state = ModuleState::Failed(error.clone());
                    ModuleEvent::Failed {
                        module: id.to_string(),
                        error,
                    }
                }
            }
        };
        let _ = self.inner.events.send(event);
    }

    /// `Some` once the handle reached a terminal state.
    fn settled(&self, id: &str) -> Option<Result<Arc<dyn SectionModule>, ConsoleError>> {
        match self.handles().get(id).map(|h| &h.state) {
            Some(ModuleState::Ready(module)) => Some(Ok(module.clone())),
            Some(ModuleState::Failed(error)) => Some(Err(error.clone())),
            Some(_) => None,
            None => Some(Err(ConsoleError::UnknownModule(id.to_string()))),
        }
    }

    async fn wait_ready(
        &self,
        id: &str,
        mut events: broadcast::Receiver<ModuleEvent>,
    ) -> Result<Arc<dyn SectionModule>, ConsoleError> {
        let policy = self.inner.policy;
        let period = policy.poll_interval();
        let mut poll = interval_at(Instant::now() + period, period);
        poll.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut checks = 0u32;

        loop {
            tokio::select! {
                event = events.recv() => match event {
                    Ok(ModuleEvent::Ready { module }) if module == id => {
                        if let Some(result) = self.settled(id) {
                            debug!(module = id, "Readiness observed via event");
                            return result;
                        }
                    }
                    Ok(ModuleEvent::Failed { module, error }) if module == id => return Err(error),
                    Ok(_) => {}
                    Err(RecvError::Lagged(skipped)) => {
                        debug!(module = id, skipped, "Readiness events lagged, relying on poll");
                    }
                    Err(RecvError::Closed) => return Err(ConsoleError::ModuleUnavailable(id.to_string())),
                },
                _ = poll.tick() => {
                    checks += 1;
                    if let Some(result) = self.settled(id) {
                        debug!(module = id, checks, "Readiness observed via poll");
                        return result;
                    }
                    if checks >= policy.max_attempts {
                        return self.time_out(id, checks);
                    }
                }
            }
        }
    }

    fn time_out(&self, id: &str, checks: u32) -> Result<Arc<dyn SectionModule>, ConsoleError> {
        let error = ConsoleError::ModuleInitTimeout {
            module: id.to_string(),
            attempts: checks,
        };
        {
            let mut handles = self.handles();
            let handle = handles
                .get_mut(id)
                .ok_or_else(|| ConsoleError::UnknownModule(id.to_string()))?;
            match &handle.state {
                ModuleState::Ready(module) => return Ok(module.clone()),
                ModuleState::Failed(existing) => return Err(existing.clone()),
                _ => {}
            }
            if let Some(construction) = handle.construction.take() {
                construction.abort();
            }
            handle.state = ModuleState::Failed(error.clone());
        }
        warn!(module = id, checks, "Module readiness timed out");
        let _ = self.inner.events.send(ModuleEvent::Failed {
            module: id.to_string(),
            error: error.clone(),
        });
        Err(error)
    }
}
