use async_trait::async_trait;
use console_framework::mock::{Construction, MockEnvironment, MockFactory, RecordingNotifier};
use console_framework::{
    ActiveSection, ConsoleError, CurrentSection, Document, ModuleRegistry, NavigationRejection,
    NoticeKind, PanelStatus, ReadinessPolicy, RegistrySectionHandler, SectionHandler,
    SectionRouter, Transition,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

const SECTIONS: [&str; 3] = ["dashboard", "users", "posts"];

// --- Spy handler ---

#[derive(Default)]
struct SpyHandler {
    entries: Mutex<HashMap<String, u32>>,
}

impl SpyHandler {
    fn entries(&self, section: &str) -> u32 {
        self.entries.lock().unwrap().get(section).copied().unwrap_or(0)
    }
}

#[async_trait]
impl SectionHandler for SpyHandler {
    async fn on_section_entered(&self, section: &str) -> Result<(), ConsoleError> {
        *self.entries.lock().unwrap().entry(section.to_string()).or_default() += 1;
        Ok(())
    }
}

struct Harness {
    router: Arc<SectionRouter>,
    document: Document,
    notifier: Arc<RecordingNotifier>,
    active: ActiveSection,
}

fn harness_with(handler: impl FnOnce(&MockEnvironment) -> Arc<dyn SectionHandler>) -> Harness {
    let env = MockEnvironment::default();
    for section in SECTIONS {
        env.document.declare_section(section);
    }
    let handler = handler(&env);
    let MockEnvironment {
        notifier,
        document,
        publisher,
        ctx,
        ..
    } = env;
    let router = SectionRouter::new(SECTIONS, document.clone(), notifier.clone(), handler, publisher);
    Harness {
        router: Arc::new(router),
        document,
        notifier,
        active: ctx.active,
    }
}

fn spy_harness() -> (Harness, Arc<SpyHandler>) {
    let spy = Arc::new(SpyHandler::default());
    let handler: Arc<dyn SectionHandler> = spy.clone();
    (harness_with(move |_| handler), spy)
}

fn registry_harness(factories: Vec<(&'static str, Arc<MockFactory>)>) -> Harness {
    harness_with(move |env| {
        let registry = ModuleRegistry::new(
            env.ctx.clone(),
            ReadinessPolicy::new(Duration::from_millis(100), 50),
        );
        for (id, factory) in factories {
            registry.register(id, factory);
        }
        let handler: Arc<dyn SectionHandler> = Arc::new(RegistrySectionHandler::new(registry));
        handler
    })
}

fn visible_panels(document: &Document) -> Vec<&'static str> {
    SECTIONS
        .into_iter()
        .filter(|s| document.panel(s).is_some_and(|p| p.visible))
        .collect()
}

#[tokio::test]
async fn activating_the_active_section_is_a_no_op() {
    let (h, spy) = spy_harness();

    assert_eq!(h.router.activate("users").await, Transition::Entered("users".into()));
    assert_eq!(
        h.router.activate("users").await,
        Transition::Rejected(NavigationRejection::AlreadyActive("users".into()))
    );
    assert_eq!(spy.entries("users"), 1);
}

#[tokio::test]
async fn unknown_section_is_rejected_and_state_kept() {
    let (h, spy) = spy_harness();
    h.router.activate("dashboard").await;

    assert_eq!(
        h.router.activate("reports").await,
        Transition::Rejected(NavigationRejection::Unknown("reports".into()))
    );
    assert_eq!(h.router.current(), CurrentSection::Active("dashboard".into()));
    assert_eq!(visible_panels(&h.document), vec!["dashboard"]);
    assert_eq!(spy.entries("reports"), 0);
}

#[tokio::test]
async fn first_activation_enters_from_the_initial_state() {
    let (h, spy) = spy_harness();
    assert_eq!(h.router.current(), CurrentSection::NoneActive);
    assert!(visible_panels(&h.document).is_empty());
    assert_eq!(h.active.current(), None);

    h.router.activate("dashboard").await;
    assert_eq!(spy.entries("dashboard"), 1);
    assert!(h.active.is("dashboard"));
}

#[tokio::test]
async fn switching_projects_exactly_one_active_section() {
    let (h, _) = spy_harness();
    h.router.activate("users").await;
    h.router.activate("posts").await;

    assert_eq!(visible_panels(&h.document), vec!["posts"]);
    assert!(h.document.nav_link("posts").unwrap().active);
    assert!(!h.document.nav_link("users").unwrap().active);
    let active: Vec<_> = h.router.sections().into_iter().filter(|s| s.is_active).collect();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].id, "posts");
    assert_eq!(h.active.current().as_deref(), Some("posts"));
}

#[tokio::test]
async fn failed_module_leaves_section_active_with_error() {
    let h = registry_harness(vec![(
        "users",
        MockFactory::new("users", Construction::Fail("Database offline".into())),
    )]);

    assert_eq!(h.router.activate("users").await, Transition::Entered("users".into()));

    assert_eq!(h.router.current(), CurrentSection::Active("users".into()));
    let panel = h.document.panel("users").unwrap();
    assert!(panel.visible);
    match panel.status {
        PanelStatus::Error { message, retry } => {
            assert!(message.contains("Database offline"));
            assert!(retry);
        }
        other => panic!("expected an error status, got {other:?}"),
    }
    assert_eq!(h.notifier.of_kind(NoticeKind::Error).len(), 1);
}

#[tokio::test]
async fn retry_reenters_after_failure() {
    let factory = MockFactory::new("users", Construction::Immediate);
    let module = factory.module();
    module.fail_enter_with(ConsoleError::Api("Database offline".into()));
    let h = registry_harness(vec![("users", factory.clone())]);

    h.router.activate("users").await;
    assert!(matches!(
        h.document.panel("users").unwrap().status,
        PanelStatus::Error { .. }
    ));

    module.succeed_enter();
    h.router.retry("users").await.unwrap();
    assert_eq!(h.document.panel("users").unwrap().status, PanelStatus::Idle);
    assert_eq!(module.enters(), 2);
    assert_eq!(factory.constructions(), 1);

    assert_eq!(
        h.router.retry("posts").await,
        Err(ConsoleError::UnknownSection("posts".into()))
    );
}

#[tokio::test]
async fn sections_without_a_module_are_static() {
    let h = registry_harness(vec![]);
    assert_eq!(h.router.activate("dashboard").await, Transition::Entered("dashboard".into()));
    assert_eq!(h.document.panel("dashboard").unwrap().status, PanelStatus::Idle);
    assert!(h.notifier.notices().is_empty());
}

#[tokio::test(start_paused = true)]
async fn navigating_away_during_slow_construction_is_not_reverted() {
    let slow = MockFactory::new("users", Construction::Delayed(Duration::from_millis(500)));
    let h = registry_harness(vec![
        ("users", slow.clone()),
        ("posts", MockFactory::new("posts", Construction::Immediate)),
    ]);

    let entering = {
        let router = h.router.clone();
        tokio::spawn(async move { router.activate("users").await })
    };
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(h.document.panel("users").unwrap().status, PanelStatus::Loading);

    h.router.activate("posts").await;
    entering.await.unwrap();

    assert_eq!(h.router.current(), CurrentSection::Active("posts".into()));
    assert_eq!(visible_panels(&h.document), vec!["posts"]);
    assert_eq!(h.document.panel("users").unwrap().status, PanelStatus::Idle);
    // The slow module still finished and was entered once.
    assert_eq!(slow.module().enters(), 1);
}

#[tokio::test]
async fn section_without_a_panel_is_still_entered() {
    let env = MockEnvironment::default();
    let spy = Arc::new(SpyHandler::default());
    let handler: Arc<dyn SectionHandler> = spy.clone();
    let router = SectionRouter::new(
        ["reports"],
        env.document.clone(),
        env.notifier.clone(),
        handler,
        env.publisher,
    );

    assert_eq!(router.activate("reports").await, Transition::Entered("reports".into()));

    assert_eq!(spy.entries("reports"), 1);
    assert_eq!(router.current(), CurrentSection::Active("reports".into()));
    assert!(env.document.panel("reports").is_none());
    assert!(env.notifier.notices().is_empty());
}
