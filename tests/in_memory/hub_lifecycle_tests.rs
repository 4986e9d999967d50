//! Integration tests for hub lifecycle orchestration over simulated tools.

use super::helpers::{TestHub, hub_for, provider, registry, settled_status};
use mcp_hub::{
    hub::{
        adapters::SimulatedConnectorProvider,
        domain::{ConnectSummary, ConnectionState, ConnectorHealth},
        services::HubError,
    },
    tool_registry::{domain::ToolKind, services::ToolRegistry},
};
use rstest::rstest;
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::{Duration, Instant};

fn kind(value: &str) -> ToolKind {
    ToolKind::new(value).expect("valid tool kind")
}

fn states(hub: &TestHub) -> Vec<(String, ConnectionState)> {
    hub.status()
        .expect("status available")
        .tools()
        .values()
        .map(|tool| (tool.kind.to_string(), tool.state))
        .collect()
}

#[rstest]
#[case("ai", 3)]
#[case("engineering", 2)]
#[case("writing", 2)]
#[case("experiment", 3)]
#[case("notes", 2)]
fn every_mode_starts_disconnected(
    registry: Arc<ToolRegistry>,
    provider: Arc<SimulatedConnectorProvider>,
    #[case] mode: &str,
    #[case] expected_tools: usize,
) {
    let hub = hub_for(&registry, mode, &provider);

    let status = hub.status().expect("status available");

    assert_eq!(status.mode().as_str(), mode);
    assert_eq!(status.total(), expected_tools);
    assert_eq!(status.count_in(ConnectionState::Disconnected), expected_tools);
    assert!(status.active_connections().is_empty());
}

#[rstest]
#[case("ai")]
#[case("engineering")]
#[case("writing")]
#[case("experiment")]
#[case("notes")]
#[tokio::test(flavor = "multi_thread")]
async fn connect_all_connects_every_tool_in_mode(
    registry: Arc<ToolRegistry>,
    provider: Arc<SimulatedConnectorProvider>,
    #[case] mode: &str,
) {
    let hub = hub_for(&registry, mode, &provider);

    let summary = hub.connect_all().await.expect("connect_all runs");
    let status = hub.status().expect("status available");

    assert!(summary.all_connected());
    assert_eq!(summary.total(), status.total());
    assert_eq!(status.count_in(ConnectionState::Connected), status.total());
    assert_eq!(status.active_connections().len(), status.total());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn ai_mode_connects_three_tools_with_distinct_connections(
    registry: Arc<ToolRegistry>,
    provider: Arc<SimulatedConnectorProvider>,
) {
    let hub = hub_for(&registry, "ai", &provider);

    let summary = hub.connect_all().await.expect("connect_all runs");

    assert_eq!(summary, ConnectSummary::new(3, 3));
    let status = hub.status().expect("status available");
    let ids: BTreeSet<_> = status
        .active_connections()
        .iter()
        .map(|connection| connection.connection_id().into_inner())
        .collect();
    assert_eq!(ids.len(), 3);
    for tool in ["ray", "dask", "openai"] {
        assert!(provider.is_connected(tool).expect("provider state readable"));
    }
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn one_failing_tool_does_not_block_the_others(
    registry: Arc<ToolRegistry>,
    provider: Arc<SimulatedConnectorProvider>,
) {
    provider
        .fail_connect(kind("openai"), "api key rejected")
        .expect("failure injected");
    let hub = hub_for(&registry, "ai", &provider);

    let summary = hub.connect_all().await.expect("connect_all runs");

    assert_eq!(summary, ConnectSummary::new(3, 2));
    assert!(summary.is_success());
    assert!(!summary.all_connected());
    let status = hub.status().expect("status available");
    let openai = status.get("openai").expect("openai tracked");
    assert_eq!(openai.state, ConnectionState::Error);
    assert!(
        openai
            .last_error
            .as_deref()
            .is_some_and(|reason| reason.contains("api key rejected"))
    );
    assert_eq!(status.state_of("ray"), Some(ConnectionState::Connected));
    assert_eq!(status.state_of("dask"), Some(ConnectionState::Connected));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn connect_all_retries_failed_tools(
    registry: Arc<ToolRegistry>,
    provider: Arc<SimulatedConnectorProvider>,
) {
    provider
        .fail_connect(kind("dask"), "scheduler down")
        .expect("failure injected");
    let hub = hub_for(&registry, "ai", &provider);
    hub.connect_all().await.expect("first connect_all runs");
    provider.clear_failure("dask").expect("failure cleared");

    let summary = hub.connect_all().await.expect("second connect_all runs");

    assert_eq!(summary, ConnectSummary::new(3, 3));
    assert_eq!(provider.connect_attempts("ray").expect("counter readable"), 1);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn unknown_tool_leaves_states_untouched(
    registry: Arc<ToolRegistry>,
    provider: Arc<SimulatedConnectorProvider>,
) {
    let hub = hub_for(&registry, "ai", &provider);
    hub.connect("ray").await.expect("connect runs");
    let before = states(&hub);

    let result = hub.connect("nonexistent").await;

    assert!(matches!(result, Err(HubError::UnknownTool(ref tool)) if tool == "nonexistent"));
    assert_eq!(states(&hub), before);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn tool_from_another_mode_is_unknown(
    registry: Arc<ToolRegistry>,
    provider: Arc<SimulatedConnectorProvider>,
) {
    let hub = hub_for(&registry, "writing", &provider);

    let result = hub.disconnect("ray").await;

    assert!(matches!(result, Err(HubError::UnknownTool(_))));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn disconnect_all_leaves_every_tool_disconnected(
    registry: Arc<ToolRegistry>,
    provider: Arc<SimulatedConnectorProvider>,
) {
    provider
        .fail_connect(kind("github"), "rate limited")
        .expect("failure injected");
    let hub = hub_for(&registry, "experiment", &provider);
    hub.connect_all().await.expect("connect_all runs");

    hub.disconnect_all().await.expect("disconnect_all runs");

    let status = hub.status().expect("status available");
    assert_eq!(status.count_in(ConnectionState::Disconnected), status.total());
    assert!(status.active_connections().is_empty());
    assert!(status.tools().values().all(|tool| tool.last_error.is_none()));
    assert_eq!(provider.disconnect_calls("github").expect("counter readable"), 0);
    assert_eq!(provider.disconnect_calls("fastapi").expect("counter readable"), 1);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn restart_matches_disconnect_then_connect(
    registry: Arc<ToolRegistry>,
    provider: Arc<SimulatedConnectorProvider>,
) {
    let hub = hub_for(&registry, "ai", &provider);
    hub.connect_all().await.expect("connect_all runs");
    let first_ids: BTreeSet<_> = hub
        .status()
        .expect("status available")
        .active_connections()
        .iter()
        .map(|connection| connection.connection_id().into_inner())
        .collect();

    let summary = hub.restart().await.expect("restart runs");

    assert_eq!(summary, ConnectSummary::new(3, 3));
    let status = hub.status().expect("status available");
    assert_eq!(status.count_in(ConnectionState::Connected), 3);
    assert!(
        status
            .active_connections()
            .iter()
            .all(|connection| !first_ids.contains(&connection.connection_id().into_inner()))
    );
    assert_eq!(provider.connect_attempts("ray").expect("counter readable"), 2);
}

async fn prepared_hub(
    registry: &Arc<ToolRegistry>,
    connected: &[&str],
    failing: &[&str],
) -> (TestHub, Arc<SimulatedConnectorProvider>) {
    let provider = Arc::new(
        SimulatedConnectorProvider::new().with_delays(Duration::ZERO, Duration::ZERO),
    );
    for tool in failing {
        provider
            .fail_connect(kind(tool), "still unavailable")
            .expect("failure injected");
    }
    let hub = hub_for(registry, "ai", &provider);
    for tool in connected.iter().chain(failing) {
        hub.connect(tool).await.expect("connect runs");
    }
    (hub, provider)
}

#[rstest]
#[case(&["ray"], &["dask"])]
#[case(&[], &["openai"])]
#[case(&["ray", "dask"], &[])]
#[case(&["dask"], &["ray", "openai"])]
#[tokio::test(flavor = "multi_thread")]
async fn restart_from_mixed_states_matches_explicit_cycle(
    registry: Arc<ToolRegistry>,
    #[case] connected: &[&str],
    #[case] failing: &[&str],
) {
    let (restarted, _) = prepared_hub(&registry, connected, failing).await;
    let (cycled, _) = prepared_hub(&registry, connected, failing).await;
    assert_eq!(states(&restarted), states(&cycled));

    let summary = restarted.restart().await.expect("restart runs");
    cycled.disconnect_all().await.expect("disconnect_all runs");
    let expected = cycled.connect_all().await.expect("connect_all runs");

    assert_eq!(summary, expected);
    assert_eq!(states(&restarted), states(&cycled));
    assert_eq!(summary.failed(), failing.len());
    for tool in failing {
        assert_eq!(
            restarted.status().expect("status available").state_of(tool),
            Some(ConnectionState::Error)
        );
    }
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn shutdown_closes_the_hub(
    registry: Arc<ToolRegistry>,
    provider: Arc<SimulatedConnectorProvider>,
) {
    let hub = hub_for(&registry, "notes", &provider);
    hub.connect_all().await.expect("connect_all runs");

    hub.shutdown().await.expect("shutdown runs");

    assert!(!provider.is_connected("obsidian").expect("provider state readable"));
    assert!(!provider.is_connected("zotero").expect("provider state readable"));
    assert!(matches!(hub.status(), Err(HubError::HubClosed)));
    assert!(matches!(hub.disconnect_all().await, Err(HubError::HubClosed)));
    assert!(matches!(hub.check_dependencies(), Err(HubError::HubClosed)));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn shutdown_racing_connect_leaves_nothing_connected(registry: Arc<ToolRegistry>) {
    let provider = Arc::new(
        SimulatedConnectorProvider::new().with_delays(Duration::from_millis(50), Duration::ZERO),
    );
    let hub = hub_for(&registry, "ai", &provider);

    let (shutdown, connected) = tokio::join!(hub.shutdown(), hub.connect("ray"));

    shutdown.expect("shutdown succeeds");
    assert!(matches!(connected, Ok(true) | Err(HubError::HubClosed)));
    assert!(hub.is_closed());
    assert!(!provider.is_connected("ray").expect("provider state readable"));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn shutdown_disconnects_a_connect_already_in_flight(registry: Arc<ToolRegistry>) {
    let provider = Arc::new(
        SimulatedConnectorProvider::new().with_delays(Duration::from_millis(100), Duration::ZERO),
    );
    let hub = Arc::new(hub_for(&registry, "ai", &provider));
    let background = Arc::clone(&hub);
    let connecting = tokio::spawn(async move { background.connect("ray").await });
    tokio::time::sleep(Duration::from_millis(30)).await;

    hub.shutdown().await.expect("shutdown succeeds");

    let connected = connecting.await.expect("task joins");
    assert!(matches!(connected, Ok(true)));
    assert!(!provider.is_connected("ray").expect("provider state readable"));
    assert_eq!(provider.disconnect_calls("ray").expect("counter readable"), 1);
    assert!(matches!(hub.connect("ray").await, Err(HubError::HubClosed)));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn tools_connect_concurrently(registry: Arc<ToolRegistry>) {
    let provider = Arc::new(
        SimulatedConnectorProvider::new()
            .with_delays(Duration::from_millis(200), Duration::ZERO),
    );
    let hub = hub_for(&registry, "ai", &provider);
    let started = Instant::now();

    let summary = hub.connect_all().await.expect("connect_all runs");

    assert!(summary.all_connected());
    assert!(started.elapsed() < Duration::from_millis(550));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn abandoned_connect_all_still_settles(registry: Arc<ToolRegistry>) {
    let provider = Arc::new(
        SimulatedConnectorProvider::new()
            .with_delays(Duration::from_millis(100), Duration::ZERO),
    );
    let hub = hub_for(&registry, "ai", &provider);

    let abandoned = tokio::time::timeout(Duration::from_millis(10), hub.connect_all()).await;
    assert!(abandoned.is_err());
    assert_eq!(
        hub.status()
            .expect("status available")
            .count_in(ConnectionState::Connecting),
        3
    );

    let status = settled_status(&hub).await;
    assert_eq!(status.count_in(ConnectionState::Connected), 3);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn concurrent_connects_to_one_tool_run_once(registry: Arc<ToolRegistry>) {
    let provider = Arc::new(
        SimulatedConnectorProvider::new().with_delays(Duration::from_millis(50), Duration::ZERO),
    );
    let hub = hub_for(&registry, "ai", &provider);

    let (first, second) = tokio::join!(hub.connect("ray"), hub.connect("ray"));

    assert!(first.expect("first connect runs"));
    assert!(second.expect("second connect runs"));
    assert_eq!(provider.connect_attempts("ray").expect("counter readable"), 1);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn status_is_readable_while_connecting(
    registry: Arc<ToolRegistry>,
    provider: Arc<SimulatedConnectorProvider>,
) {
    provider
        .set_connect_delay(kind("openai"), Duration::from_millis(150))
        .expect("delay configured");
    let hub = Arc::new(hub_for(&registry, "ai", &provider));
    let background = Arc::clone(&hub);

    let task = tokio::spawn(async move { background.connect_all().await });
    tokio::time::sleep(Duration::from_millis(50)).await;

    let status = hub.status().expect("status available while connecting");
    assert_eq!(status.state_of("openai"), Some(ConnectionState::Connecting));
    assert_eq!(status.state_of("ray"), Some(ConnectionState::Connected));

    let summary = task
        .await
        .expect("task joins")
        .expect("connect_all runs");
    assert!(summary.all_connected());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn health_reflects_connection_and_connector(
    registry: Arc<ToolRegistry>,
    provider: Arc<SimulatedConnectorProvider>,
) {
    let hub = hub_for(&registry, "ai", &provider);
    let idle = hub.check_health("ray").await.expect("health check runs");
    assert_eq!(idle.health(), &ConnectorHealth::Unknown);

    hub.connect_all().await.expect("connect_all runs");
    provider
        .set_unhealthy(kind("dask"), "workers lost")
        .expect("health injected");

    let ray = hub.check_health("ray").await.expect("health check runs");
    let dask = hub.check_health("dask").await.expect("health check runs");
    assert!(ray.health().is_healthy());
    assert_eq!(dask.health(), &ConnectorHealth::unhealthy("workers lost"));
    assert_eq!(
        hub.status().expect("status available").state_of("dask"),
        Some(ConnectionState::Connected)
    );
}

#[rstest]
fn dependency_check_reports_missing_capabilities(
    registry: Arc<ToolRegistry>,
    provider: Arc<SimulatedConnectorProvider>,
) {
    let hub = hub_for(&registry, "experiment", &provider);
    assert!(hub.check_dependencies().expect("check runs").is_satisfied());

    provider
        .mark_capability_missing("requests")
        .expect("capability removed");
    let report = hub.check_dependencies().expect("check runs");

    assert!(!report.is_satisfied());
    assert_eq!(report.missing_for("github"), ["requests".to_owned()]);
    assert!(report.missing_for("fastapi").is_empty());
    assert_eq!(
        hub.status()
            .expect("status available")
            .count_in(ConnectionState::Disconnected),
        3
    );
}

#[rstest]
fn list_follows_mode_order(
    registry: Arc<ToolRegistry>,
    provider: Arc<SimulatedConnectorProvider>,
) {
    let hub = hub_for(&registry, "experiment", &provider);

    let kinds: Vec<String> = hub
        .list()
        .expect("list available")
        .iter()
        .map(|descriptor| descriptor.kind().to_string())
        .collect();

    assert_eq!(kinds, ["fastapi", "github", "shortcuts"]);
}
