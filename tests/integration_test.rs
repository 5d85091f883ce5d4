use admin_console::clients::{FixtureApi, SessionAuth};
use admin_console::lifecycle::{sections, AdminConsole};
use console_framework::mock::{RecordingNotifier, StaticAuth};
use console_framework::{
    content_container, pagination_container, AuthResult, AuthUser, ConsoleConfig, ConsoleError,
    ContainerContent, CurrentSection, NavigationRejection, NoticeKind, Transition,
};
use std::sync::Arc;
use std::time::Duration;

// --- Helpers ---

async fn start_with(api: FixtureApi) -> (Result<AdminConsole, ConsoleError>, Arc<RecordingNotifier>) {
    let api = Arc::new(api);
    let notifier = Arc::new(RecordingNotifier::new());
    let console = AdminConsole::start(
        ConsoleConfig::default(),
        api.clone(),
        Arc::new(SessionAuth::new(api)),
        notifier.clone(),
    )
    .await;
    (console, notifier)
}

async fn start() -> (AdminConsole, Arc<RecordingNotifier>) {
    let (console, notifier) = start_with(FixtureApi::seeded()).await;
    (console.expect("console should start"), notifier)
}

fn rows(console: &AdminConsole, section: &str) -> Vec<(String, Vec<String>)> {
    match console.document().content(&content_container(section)) {
        Some(ContainerContent::Rows(rows)) => rows.into_iter().map(|r| (r.id, r.cells)).collect(),
        other => panic!("{section}: expected rows, got {other:?}"),
    }
}

fn row_ids(console: &AdminConsole, section: &str) -> Vec<String> {
    rows(console, section).into_iter().map(|(id, _)| id).collect()
}

fn ids(range: std::ops::RangeInclusive<u32>) -> Vec<String> {
    range.map(|n| n.to_string()).collect()
}

async fn settle() {
    tokio::time::sleep(Duration::from_millis(400)).await;
}

// --- Startup ---

#[tokio::test]
async fn test_starts_on_dashboard_with_counts() {
    let (console, notifier) = start().await;

    assert_eq!(console.router().current(), CurrentSection::Active("dashboard".into()));
    assert_eq!(console.user().map(|u| u.username.as_str()), Some("admin"));

    let dashboard = rows(&console, "dashboard");
    assert_eq!(dashboard[0].1, vec!["Users", "23"]);
    assert_eq!(dashboard[2].1, vec!["Comments", "30"]);
    assert!(notifier.of_kind(NoticeKind::Error).is_empty());

    let panel = console.document().panel("dashboard").unwrap();
    assert!(panel.visible);
}

#[tokio::test]
async fn test_anonymous_session_is_refused() {
    let (console, _) = start_with(FixtureApi::seeded().with_session(AuthResult::anonymous())).await;
    assert!(matches!(console, Err(ConsoleError::Unauthorized)));
}

#[tokio::test]
async fn test_non_admin_session_is_refused() {
    let member = AuthResult {
        authenticated: true,
        user: Some(AuthUser {
            username: "member02".into(),
            role: "user".into(),
        }),
    };
    let (console, _) = start_with(FixtureApi::seeded().with_session(member)).await;
    assert!(matches!(console, Err(ConsoleError::Unauthorized)));
}

#[tokio::test]
async fn test_failed_session_check_stops_startup() {
    let outage = ConsoleError::Fetch {
        endpoint: "auth/check.php".into(),
        reason: "HTTP 503".into(),
    };
    let console = AdminConsole::start(
        ConsoleConfig::default(),
        Arc::new(FixtureApi::seeded()),
        Arc::new(StaticAuth(Err(outage.clone()))),
        Arc::new(RecordingNotifier::new()),
    )
    .await;

    assert_eq!(console.err(), Some(outage));
}

#[tokio::test]
async fn test_invalid_config_stops_startup() {
    let config = ConsoleConfig {
        page_size: 0,
        ..ConsoleConfig::default()
    };
    let console = AdminConsole::start(
        config,
        Arc::new(FixtureApi::seeded()),
        Arc::new(StaticAuth(Ok(AuthResult::admin("admin")))),
        Arc::new(RecordingNotifier::new()),
    )
    .await;

    assert!(matches!(console, Err(ConsoleError::Config(_))));
}

// --- Navigation ---

#[tokio::test]
async fn test_every_section_lists_its_records() {
    let (console, notifier) = start().await;

    for (section, expected) in [
        ("users", 10),
        ("posts", 10),
        ("comments", 10),
        ("products", 8),
        ("categories", 4),
    ] {
        assert_eq!(
            console.activate(section).await,
            Transition::Entered(section.to_string())
        );
        assert_eq!(rows(&console, section).len(), expected, "{section}");
    }

    assert!(notifier.of_kind(NoticeKind::Error).is_empty());
    let visible: Vec<&str> = sections()
        .into_iter()
        .filter(|s| console.document().panel(s).is_some_and(|p| p.visible))
        .collect();
    assert_eq!(visible, vec!["categories"]);
}

#[tokio::test]
async fn test_unknown_section_is_rejected() {
    let (console, _) = start().await;

    assert_eq!(
        console.activate("settings").await,
        Transition::Rejected(NavigationRejection::Unknown("settings".into()))
    );
    assert_eq!(console.router().current(), CurrentSection::Active("dashboard".into()));
}

#[tokio::test]
async fn test_returning_to_a_section_starts_at_page_one() {
    let (console, _) = start().await;
    console.activate("users").await;

    assert!(console
        .document()
        .click_page(&pagination_container("users"), 2)
        .unwrap());
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert_eq!(row_ids(&console, "users"), ids(11..=20));

    console.activate("posts").await;
    console.activate("users").await;
    assert_eq!(row_ids(&console, "users"), ids(1..=10));
}

// --- Listing ---

#[tokio::test]
async fn test_pagination_walks_to_the_last_page() {
    let (console, _) = start().await;
    console.activate("users").await;

    let container = pagination_container("users");
    assert!(console.document().click_page(&container, 3).unwrap());
    tokio::time::sleep(Duration::from_millis(20)).await;

    assert_eq!(row_ids(&console, "users"), ids(21..=23));
    let controls = console.document().content(&container).unwrap();
    let current: Vec<u32> = controls
        .controls()
        .unwrap()
        .iter()
        .filter(|c| c.current)
        .filter_map(|c| c.target)
        .collect();
    assert_eq!(current, vec![3]);
}

#[tokio::test(start_paused = true)]
async fn test_search_is_debounced() {
    let (console, _) = start().await;
    console.activate("users").await;

    console.search("member").await.unwrap();
    tokio::time::sleep(Duration::from_millis(100)).await;
    console.search("member1").await.unwrap();
    tokio::time::sleep(Duration::from_millis(250)).await;
    assert_eq!(row_ids(&console, "users"), ids(1..=10));

    settle().await;
    assert_eq!(row_ids(&console, "users"), ids(10..=19));
}

#[tokio::test(start_paused = true)]
async fn test_filter_narrows_and_clears() {
    let (console, _) = start().await;
    console.activate("users").await;

    console.set_filter("role", "moderator").await.unwrap();
    settle().await;
    assert_eq!(row_ids(&console, "users"), vec!["5", "10", "15", "20"]);

    console.set_filter("role", "").await.unwrap();
    settle().await;
    assert_eq!(row_ids(&console, "users"), ids(1..=10));
}

// --- Mutations ---

#[tokio::test]
async fn test_delete_through_console_reloads() {
    let (console, notifier) = start().await;
    console.activate("comments").await;

    console.delete("3").await.unwrap();

    let listed = row_ids(&console, "comments");
    assert_eq!(listed.len(), 10);
    assert!(!listed.contains(&"3".to_string()));
    assert_eq!(listed.last().map(String::as_str), Some("11"));
    assert_eq!(notifier.of_kind(NoticeKind::Success), vec!["Deleted successfully"]);
}

#[tokio::test]
async fn test_delete_of_missing_record_is_reported() {
    let (console, notifier) = start().await;
    console.activate("products").await;

    let result = console.delete("999").await;

    assert_eq!(result, Err(ConsoleError::Api("Record not found".into())));
    assert_eq!(notifier.of_kind(NoticeKind::Error), vec!["Record not found"]);
    assert_eq!(rows(&console, "products").len(), 8);
}

#[tokio::test]
async fn test_dashboard_has_nothing_to_delete() {
    let (console, _) = start().await;
    assert!(matches!(console.delete("1").await, Err(ConsoleError::Api(_))));
}

#[tokio::test]
async fn test_refresh_picks_up_backend_changes() {
    let (console, _) = start().await;
    console.activate("categories").await;
    console.delete("4").await.unwrap();
    assert_eq!(row_ids(&console, "categories"), ids(1..=3));

    console.refresh().await.unwrap();
    assert_eq!(row_ids(&console, "categories"), ids(1..=3));
    console.shutdown();
}
