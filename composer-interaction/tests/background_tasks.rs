//! Timer-Driven Background Task Tests
//!
//! Exercises the debounced auto-save scheduler, the single-flight interface
//! fetch guard, and the execution monitor's polling/deadline/cancellation
//! behavior under a paused clock.

mod common;

use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use common::{bare_component, harness, wit_info_response, MockClient, MockRenderer, MockService, MockUi};

use composer_core::{Bounds, Diagram, DiagramId, DiagramStore, ElementId, MovedElement};
use composer_interaction::{
    AutoSaveConfig, AutoSaveScheduler, DiagramService, ExecutionConfig, ExecutionMonitor,
    ExecutionStatus, InterfaceCache, NoticeLevel, RenderingSurface, SyncStatus, UiSurface,
    WitFetchConfig, WitFetchOutcome,
};
use composer_mcp::tools;
use composer_mcp::McpClient;

fn bounds_at(x: f64) -> Bounds {
    Bounds {
        x,
        y: 0.0,
        width: 160.0,
        height: 80.0,
    }
}

// ============================================================================
// Auto-save debounce
// ============================================================================

struct AutoSaveHarness {
    service: Arc<MockService>,
    ui: Arc<MockUi>,
    scheduler: AutoSaveScheduler,
}

fn autosave_harness(debounce: Duration) -> AutoSaveHarness {
    let service = Arc::new(MockService::default());
    let ui = Arc::new(MockUi::default());
    let scheduler = AutoSaveScheduler::new(
        Arc::clone(&service) as Arc<dyn DiagramService>,
        Arc::clone(&ui) as Arc<dyn UiSurface>,
        AutoSaveConfig { debounce },
    );
    AutoSaveHarness {
        service,
        ui,
        scheduler,
    }
}

#[tokio::test(start_paused = true)]
async fn burst_of_drag_ends_commits_once_with_last_geometry() {
    let h = autosave_harness(Duration::from_millis(500));
    let diagram_id = DiagramId::new();
    let element_id = ElementId::new();

    for x in [10.0, 20.0, 30.0] {
        h.scheduler.schedule(
            diagram_id,
            vec![MovedElement {
                id: element_id,
                bounds: bounds_at(x),
            }],
        );
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
    tokio::time::sleep(Duration::from_millis(600)).await;

    let commits = h.service.position_commits.lock().expect("lock").clone();
    assert_eq!(commits.len(), 1, "three drag ends collapse into one commit");
    assert_eq!(commits[0].len(), 1);
    assert!((commits[0][0].bounds.x - 30.0).abs() < f64::EPSILON);

    assert_eq!(h.service.saves.load(Ordering::SeqCst), 1);
    assert_eq!(
        h.ui.sync_statuses.lock().expect("lock").clone(),
        vec![SyncStatus::Saving, SyncStatus::Saved]
    );
}

#[tokio::test(start_paused = true)]
async fn new_batch_resets_the_debounce_timer() {
    let h = autosave_harness(Duration::from_millis(500));
    let diagram_id = DiagramId::new();
    let element_id = ElementId::new();

    h.scheduler.schedule(
        diagram_id,
        vec![MovedElement {
            id: element_id,
            bounds: bounds_at(1.0),
        }],
    );
    tokio::time::sleep(Duration::from_millis(400)).await;
    h.scheduler.schedule(
        diagram_id,
        vec![MovedElement {
            id: element_id,
            bounds: bounds_at(2.0),
        }],
    );
    // 800ms after the first schedule, 400ms after the second: nothing yet.
    tokio::time::sleep(Duration::from_millis(400)).await;
    assert!(h.service.position_commits.lock().expect("lock").is_empty());

    tokio::time::sleep(Duration::from_millis(200)).await;
    let commits = h.service.position_commits.lock().expect("lock").clone();
    assert_eq!(commits.len(), 1);
    assert!((commits[0][0].bounds.x - 2.0).abs() < f64::EPSILON);
}

#[tokio::test(start_paused = true)]
async fn failed_commit_reports_error_status_and_notice() {
    let h = autosave_harness(Duration::from_millis(500));
    h.service.fail_positions.store(true, Ordering::SeqCst);

    h.scheduler.schedule(
        DiagramId::new(),
        vec![MovedElement {
            id: ElementId::new(),
            bounds: bounds_at(5.0),
        }],
    );
    tokio::time::sleep(Duration::from_millis(600)).await;

    assert_eq!(
        h.ui.sync_statuses.lock().expect("lock").clone(),
        vec![SyncStatus::Saving, SyncStatus::Error]
    );
    assert_eq!(h.ui.notices_at(NoticeLevel::Error).len(), 1);
}

#[tokio::test(start_paused = true)]
async fn cancel_pending_drops_the_batch() {
    let h = autosave_harness(Duration::from_millis(500));

    h.scheduler.schedule(
        DiagramId::new(),
        vec![MovedElement {
            id: ElementId::new(),
            bounds: bounds_at(5.0),
        }],
    );
    h.scheduler.cancel_pending();
    tokio::time::sleep(Duration::from_secs(2)).await;

    assert!(h.service.position_commits.lock().expect("lock").is_empty());
    assert!(h.ui.sync_statuses.lock().expect("lock").is_empty());
}

#[tokio::test(start_paused = true)]
async fn coordinator_drag_end_saves_selected_elements_only() {
    let h = harness();
    let selected = bare_component("selected");
    let unselected = bare_component("unselected");
    let selected_id = selected.id;
    let mut diagram = Diagram::new("wasm-composition", "test");
    diagram.add_element(selected);
    diagram.add_element(unselected);
    diagram.select(selected_id).expect("select");
    h.coordinator.store().set_diagram(diagram);

    for x in [50.0, 60.0, 70.0] {
        h.coordinator
            .store()
            .move_element(selected_id, bounds_at(x))
            .expect("move");
        h.coordinator.handle_drag_end();
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    tokio::time::sleep(Duration::from_secs(1)).await;

    let commits = h.service.position_commits.lock().expect("lock").clone();
    assert_eq!(commits.len(), 1);
    assert_eq!(commits[0].len(), 1, "unselected elements are never saved");
    assert_eq!(commits[0][0].id, selected_id);
    assert!((commits[0][0].bounds.x - 70.0).abs() < f64::EPSILON);
}

// ============================================================================
// Interface fetch single-flight guard
// ============================================================================

#[tokio::test(start_paused = true)]
async fn concurrent_ensure_interfaces_issues_one_request() {
    let renderer = Arc::new(MockRenderer::default());
    let client = Arc::new(MockClient::default());
    client.set_wit_response("filter", wit_info_response("filter", "render"));
    *client.wit_delay.lock().expect("lock") = Some(Duration::from_millis(200));

    let store = DiagramStore::new();
    let element = bare_component("filter");
    let element_id = element.id;
    let mut diagram = Diagram::new("wasm-composition", "test");
    diagram.add_element(element);
    store.set_diagram(diagram);

    let cache = Arc::new(InterfaceCache::new(
        Arc::clone(&client) as Arc<dyn McpClient>,
        store,
        Arc::clone(&renderer) as Arc<dyn RenderingSurface>,
        WitFetchConfig::default(),
    ));

    let first = tokio::spawn({
        let cache = Arc::clone(&cache);
        async move { cache.ensure_interfaces(element_id).await }
    });
    tokio::task::yield_now().await;

    // The first fetch is parked on the network; a second click is a no-op.
    let second = cache.ensure_interfaces(element_id).await;
    assert_eq!(second, WitFetchOutcome::InFlight);

    let first = first.await.expect("join");
    assert_eq!(first, WitFetchOutcome::Loaded);
    assert_eq!(client.tool_calls(tools::GET_COMPONENT_WIT_INFO), 1);

    // Once loaded, further calls short-circuit without a request.
    let third = cache.ensure_interfaces(element_id).await;
    assert_eq!(third, WitFetchOutcome::AlreadyLoaded);
    assert_eq!(client.tool_calls(tools::GET_COMPONENT_WIT_INFO), 1);
}

#[tokio::test(start_paused = true)]
async fn slow_fetch_times_out_and_marks_error() {
    let renderer = Arc::new(MockRenderer::default());
    let client = Arc::new(MockClient::default());
    client.set_wit_response("slow", wit_info_response("slow", "render"));
    *client.wit_delay.lock().expect("lock") = Some(Duration::from_secs(30));

    let store = DiagramStore::new();
    let element = bare_component("slow");
    let element_id = element.id;
    let mut diagram = Diagram::new("wasm-composition", "test");
    diagram.add_element(element);
    store.set_diagram(diagram);

    let cache = InterfaceCache::new(
        Arc::clone(&client) as Arc<dyn McpClient>,
        store.clone(),
        Arc::clone(&renderer) as Arc<dyn RenderingSurface>,
        WitFetchConfig {
            request_timeout: Duration::from_secs(10),
        },
    );

    let outcome = cache.ensure_interfaces(element_id).await;
    assert!(matches!(outcome, WitFetchOutcome::Failed(_)));
    let element = store.element(element_id).expect("element");
    assert_eq!(element.status(), composer_core::ComponentStatus::Error);
}

// ============================================================================
// Execution monitor
// ============================================================================

struct MonitorHarness {
    client: Arc<MockClient>,
    ui: Arc<MockUi>,
    monitor: ExecutionMonitor,
}

fn monitor_harness() -> MonitorHarness {
    let client = Arc::new(MockClient::default());
    let ui = Arc::new(MockUi::default());
    let monitor = ExecutionMonitor::new(
        Arc::clone(&client) as Arc<dyn McpClient>,
        Arc::clone(&ui) as Arc<dyn UiSurface>,
        ExecutionConfig {
            poll_interval: Duration::from_millis(100),
            deadline: Duration::from_secs(1),
            ..ExecutionConfig::default()
        },
    );
    MonitorHarness {
        client,
        ui,
        monitor,
    }
}

#[tokio::test(start_paused = true)]
async fn execution_completes_with_result() {
    let h = monitor_harness();
    h.client.push_progress("Executing", 0.5);
    h.client.push_progress("Complete", 1.0);
    *h.client.result_payload.lock().expect("lock") = Some(serde_json::json!({
        "executionId": "exec-1",
        "success": true,
        "result": {"frames": 12},
        "executionTimeMs": 250,
        "memoryUsageMb": 16
    }));

    let session = h.monitor.submit("filter").await.expect("submitted");
    assert_eq!(session.id(), "exec-1");

    let outcome = session.wait().await;
    assert_eq!(outcome.status, ExecutionStatus::Completed);
    let result = outcome.result.expect("result payload");
    assert!(result.success);
    assert_eq!(result.execution_time_ms, 250);

    // Each poll surfaced stage and percentage.
    let updates = h.ui.progress_updates.lock().expect("lock").clone();
    assert!(updates.len() >= 2);
    assert_eq!(updates[0].1, "Executing");
    assert_eq!(updates[0].2, 50);
    assert_eq!(updates.last().expect("last").1, "Complete");
}

#[tokio::test(start_paused = true)]
async fn execution_error_stage_resolves_failed_without_result() {
    let h = monitor_harness();
    h.client.push_progress("Executing", 0.3);
    h.client.progress_feed.lock().expect("lock").push_back(serde_json::json!({
        "executionId": "exec-1",
        "stage": "Error",
        "progress": 0.3,
        "message": "trap",
        "error": "unreachable executed"
    }));

    let session = h.monitor.submit("filter").await.expect("submitted");
    let outcome = session.wait().await;

    assert_eq!(outcome.status, ExecutionStatus::Failed);
    assert_eq!(outcome.error.as_deref(), Some("unreachable executed"));
    // The result resource is missing: "no result", not a hang or a panic.
    assert!(outcome.result.is_none());
}

#[tokio::test(start_paused = true)]
async fn execution_times_out_and_stops_polling() {
    let h = monitor_harness();
    // Progress never reaches a terminal stage.
    h.client.push_progress("Executing", 0.7);

    let session = h.monitor.submit("filter").await.expect("submitted");
    let outcome = session.wait().await;
    assert_eq!(outcome.status, ExecutionStatus::TimedOut);

    // The polling loop died with the session: no further reads.
    let reads = h.client.progress_reads.load(Ordering::SeqCst);
    tokio::time::sleep(Duration::from_secs(5)).await;
    assert_eq!(h.client.progress_reads.load(Ordering::SeqCst), reads);
}

#[tokio::test(start_paused = true)]
async fn stopping_a_session_cancels_both_timers() {
    let h = monitor_harness();
    h.client.push_progress("Executing", 0.1);

    let session = h.monitor.submit("filter").await.expect("submitted");
    session.stop();
    // A second stop is harmless.
    session.stop();

    let outcome = session.wait().await;
    assert_eq!(outcome.status, ExecutionStatus::Cancelled);
    assert_eq!(h.client.tool_calls(tools::CANCEL_EXECUTION), 1);

    let reads = h.client.progress_reads.load(Ordering::SeqCst);
    tokio::time::sleep(Duration::from_secs(5)).await;
    assert_eq!(
        h.client.progress_reads.load(Ordering::SeqCst),
        reads,
        "no polls fire after cancellation"
    );
}

#[tokio::test(start_paused = true)]
async fn inspect_reflects_latest_poll() {
    let h = monitor_harness();
    h.client.push_progress("Executing", 0.25);

    let session = h.monitor.submit("filter").await.expect("submitted");
    tokio::time::sleep(Duration::from_millis(150)).await;

    let snapshot = session.inspect();
    assert_eq!(snapshot.stage, composer_mcp::ExecutionStage::Executing);
    assert_eq!(snapshot.percent, 25);

    session.stop();
    let outcome = session.wait().await;
    assert_eq!(outcome.status, ExecutionStatus::Cancelled);
}

#[tokio::test(start_paused = true)]
async fn missing_result_resource_resolves_to_no_result() {
    let h = monitor_harness();
    h.client.push_progress("Complete", 1.0);

    let session = h.monitor.submit("filter").await.expect("submitted");
    let outcome = session.wait().await;

    assert_eq!(outcome.status, ExecutionStatus::Completed);
    assert!(outcome.result.is_none());
}
