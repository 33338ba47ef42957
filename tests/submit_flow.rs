//! End-to-end submission tests against a mocked automation backend.

use std::sync::Arc;

use chrono::Utc;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use campaignflow::api::{HttpAutomationApi, HttpPlatformConnections, HttpProgressApi};
use campaignflow::config::{ApiConfig, Config, PollingConfig};
use campaignflow::{ApiError, BlockKind, CyclePolicy, EditorSession, SessionError, StartTrigger};

fn test_config(base_url: &str) -> Config {
    Config {
        api: ApiConfig {
            base_url: base_url.to_string(),
            tenant: "default".to_string(),
        },
        polling: PollingConfig {
            progress_interval_secs: 5,
            connection_interval_secs: 0,
        },
        cycle_policy: CyclePolicy::Reject,
    }
}

fn session_for(server: &MockServer) -> EditorSession {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    let client = reqwest::Client::new();
    EditorSession::new(
        test_config(&server.uri()),
        Arc::new(HttpAutomationApi::new(client.clone(), server.uri())),
        Arc::new(HttpPlatformConnections::new(client.clone(), server.uri())),
        Arc::new(HttpProgressApi::new(client, server.uri())),
    )
}

fn schedule_start() -> StartTrigger {
    StartTrigger::Schedule {
        next_execution_time: Utc::now() + chrono::Duration::hours(1),
        repeat_interval: None,
    }
}

/// Trigger → generator → wait → email, inserted in scrambled order so the
/// submission order only matches if the sorter actually ran.
fn build_chain(session: &mut EditorSession) -> Vec<uuid::Uuid> {
    let graph = session.graph_mut();
    let email = graph.add_node(BlockKind::Email).unwrap();
    let wait = graph.add_node(BlockKind::Wait).unwrap();
    let generate = graph.add_node(BlockKind::TextGenerator).unwrap();
    let trigger = graph.add_node(BlockKind::FormTrigger).unwrap();
    graph.connect(trigger.id, generate.id).unwrap();
    graph.connect(generate.id, wait.id).unwrap();
    graph.connect(wait.id, email.id).unwrap();
    vec![trigger.id, generate.id, wait.id, email.id]
}

#[tokio::test]
async fn saving_posts_sorted_nodes_then_updates_in_place() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/automations"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "auto-123" })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/api/automations/auto-123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let mut session = session_for(&server);
    let expected_order = build_chain(&mut session);

    let id = session.save("Welcome flow", schedule_start()).await?;
    assert_eq!(id, "auto-123");
    assert_eq!(session.graph().automation_id(), Some("auto-123"));

    // the second save goes through the update path
    let id = session.save("Welcome flow", schedule_start()).await?;
    assert_eq!(id, "auto-123");

    let requests = server.received_requests().await.unwrap();
    let create = &requests[0];
    let body: serde_json::Value = serde_json::from_slice(&create.body)?;
    let submitted: Vec<String> = body["nodes"]
        .as_array()
        .unwrap()
        .iter()
        .map(|n| n["id"].as_str().unwrap().to_string())
        .collect();
    let expected: Vec<String> = expected_order.iter().map(|id| id.to_string()).collect();
    assert_eq!(submitted, expected);
    assert_eq!(body["name"], "Welcome flow");
    assert_eq!(body["testing"], false);
    assert_eq!(body["startType"], "schedule");
    assert!(body.get("id").is_none());

    let update: serde_json::Value = serde_json::from_slice(&requests[1].body)?;
    assert_eq!(update["id"], "auto-123");
    Ok(())
}

#[tokio::test]
async fn empty_name_falls_back_to_placeholder() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/automations"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "auto-9" })))
        .mount(&server)
        .await;

    let mut session = session_for(&server);
    build_chain(&mut session);
    session.save("   ", schedule_start()).await?;

    let requests = server.received_requests().await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&requests[0].body)?;
    assert_eq!(body["name"], "Untitled automation");
    Ok(())
}

#[tokio::test]
async fn opening_saved_automation_updates_on_save() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/api/automations/auto-55"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let mut builder = campaignflow::FlowGraph::new();
    let trigger = builder.add_node(BlockKind::FormTrigger).unwrap();
    let email = builder.add_node(BlockKind::Email).unwrap();
    builder.connect(trigger.id, email.id).unwrap();
    let record = campaignflow::AutomationRecord {
        id: Some("auto-55".to_string()),
        name: "Saved flow".to_string(),
        nodes: builder.nodes().to_vec(),
        edges: builder.edges().to_vec(),
        start: schedule_start(),
        testing: false,
    };

    let client = reqwest::Client::new();
    let mut session = EditorSession::open(
        test_config(&server.uri()),
        &record,
        Arc::new(HttpAutomationApi::new(client.clone(), server.uri())),
        Arc::new(HttpPlatformConnections::new(client.clone(), server.uri())),
        Arc::new(HttpProgressApi::new(client, server.uri())),
    );
    assert_eq!(session.graph().automation_id(), Some("auto-55"));
    assert_eq!(session.graph().len(), 2);

    let id = session.save("Saved flow", schedule_start()).await?;
    assert_eq!(id, "auto-55");

    // closing the editor cancels background polling deterministically
    session.start_progress_polling();
    assert!(session.poller().is_running());
    session.close().await;
    Ok(())
}

#[tokio::test]
async fn failed_save_preserves_graph_for_retry() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/automations"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let mut session = session_for(&server);
    build_chain(&mut session);

    let err = session
        .save("Welcome flow", schedule_start())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        SessionError::Api(ApiError::Status { status }) if status.as_u16() == 500
    ));

    // nothing was cleared; the user can fix the backend and retry
    assert_eq!(session.graph().len(), 4);
    assert_eq!(session.graph().automation_id(), None);
}

#[tokio::test]
async fn test_run_flags_testing_and_requires_schedule() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/automations"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "auto-7" })))
        .mount(&server)
        .await;

    let mut session = session_for(&server);
    build_chain(&mut session);

    let err = session
        .test_run(
            "Welcome flow",
            StartTrigger::Event {
                event: campaignflow::workflow::types::EventSelector::FormSubmission,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, SessionError::TestRunUnavailable));
    assert!(server.received_requests().await.unwrap().is_empty());

    session.test_run("Welcome flow", schedule_start()).await?;
    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    let body: serde_json::Value = serde_json::from_slice(&requests[0].body)?;
    assert_eq!(body["testing"], true);
    Ok(())
}

#[tokio::test]
async fn cyclic_graph_is_rejected_before_any_request() {
    let server = MockServer::start().await;

    let mut session = session_for(&server);
    let graph = session.graph_mut();
    let a = graph.add_node(BlockKind::Email).unwrap();
    let b = graph.add_node(BlockKind::Twitter).unwrap();
    graph.connect(a.id, b.id).unwrap();
    graph.connect(b.id, a.id).unwrap();

    let err = session
        .save("Looped", schedule_start())
        .await
        .unwrap_err();
    assert!(matches!(err, SessionError::Sort(_)));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn social_step_requires_connected_platform() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/connections/twitter/status/default"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "connected": false })))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/connections/twitter/status/default"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "connected": true })))
        .mount(&server)
        .await;

    let mut session = session_for(&server);

    let err = session.add_node(BlockKind::Twitter).await.unwrap_err();
    assert!(matches!(
        err,
        SessionError::PlatformNotConnected(campaignflow::Platform::Twitter)
    ));
    assert!(session.graph().is_empty());

    // once the auth flow completed, the same insertion goes through
    let node = session.add_node(BlockKind::Twitter).await?;
    assert_eq!(node.kind(), BlockKind::Twitter);
    assert_eq!(session.graph().len(), 1);
    Ok(())
}

#[tokio::test]
async fn awaiting_platform_connection_polls_until_linked() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/connections/linkedin/status/default"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "connected": false })))
        .up_to_n_times(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/connections/linkedin/status/default"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "connected": true })))
        .mount(&server)
        .await;

    let session = session_for(&server);
    let cancel = tokio_util::sync::CancellationToken::new();
    let connected = session
        .await_platform_connection(campaignflow::Platform::Linkedin, &cancel)
        .await?;
    assert!(connected);
    assert!(server.received_requests().await.unwrap().len() >= 3);
    Ok(())
}

#[tokio::test]
async fn awaiting_platform_connection_honors_cancellation() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/connections/youtube/status/default"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "connected": false })))
        .mount(&server)
        .await;

    let session = session_for(&server);
    let cancel = tokio_util::sync::CancellationToken::new();
    cancel.cancel();
    let connected = session
        .await_platform_connection(campaignflow::Platform::Youtube, &cancel)
        .await?;
    assert!(!connected);
    Ok(())
}
