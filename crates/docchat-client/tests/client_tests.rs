//! Tests for docchat-client: the five gateway operations, typed error
//! pass-through, correlation under concurrency, and transport failure

use docchat_client::CapabilityClient;
use docchat_core::{CapabilityKind, Error};
use docchat_host::{create_default_host, CapabilityHost};
use docchat_store::DocumentStore;
use serde_json::json;
use std::sync::Arc;

fn host() -> CapabilityHost {
    create_default_host(Arc::new(DocumentStore::seeded()))
}

// ===========================================================================
// The five operations
// ===========================================================================

#[tokio::test]
async fn list_actions_returns_action_catalog() {
    let client = CapabilityClient::connect(host());
    let actions = client.list_actions().await.unwrap();
    let names: Vec<&str> = actions.iter().map(|d| d.name.as_str()).collect();
    assert_eq!(names, ["edit_doc", "read_doc"]);
    assert!(actions.iter().all(|d| d.kind == CapabilityKind::Action));
}

#[tokio::test]
async fn invoke_action_round_trip() {
    let client = CapabilityClient::connect(host());
    let result = client
        .invoke_action("read_doc", json!({ "doc_id": "deposition.md" }))
        .await
        .unwrap();
    assert!(result.to_content_string().contains("Angela Smith"));
}

#[tokio::test]
async fn list_workflows_returns_workflow_catalog() {
    let client = CapabilityClient::connect(host());
    let workflows = client.list_workflows().await.unwrap();
    let names: Vec<&str> = workflows.iter().map(|d| d.name.as_str()).collect();
    assert_eq!(names, ["format", "summarize"]);
}

#[tokio::test]
async fn resolve_workflow_returns_seed_messages() {
    let client = CapabilityClient::connect(host());
    let messages = client
        .resolve_workflow("summarize", json!({ "doc_id": "plan.md" }))
        .await
        .unwrap();
    assert!(!messages.is_empty());
    assert!(messages[0].content.contains("plan.md"));
}

#[tokio::test]
async fn read_endpoint_fetches_by_address() {
    let client = CapabilityClient::connect(host());

    let index = client.read_endpoint("docs://documents").await.unwrap();
    assert!(index.to_content_string().contains("report.pdf"));

    let content = client
        .read_endpoint("docs://documents/report.pdf")
        .await
        .unwrap();
    assert!(content.to_content_string().contains("condenser tower"));
}

// ===========================================================================
// Error pass-through
// ===========================================================================

#[tokio::test]
async fn host_failure_kinds_pass_through_unchanged() {
    let client = CapabilityClient::connect(host());

    let err = client
        .invoke_action("read_doc", json!({ "doc_id": "missing.pdf" }))
        .await
        .unwrap_err();
    assert_eq!(err, Error::NotFound("missing.pdf".into()));

    let err = client
        .invoke_action("edit_doc", json!({ "doc_id": "plan.md" }))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InvalidArgs { .. }));

    let err = client
        .resolve_workflow("summarize", json!({ "doc_id": "missing.pdf" }))
        .await
        .unwrap_err();
    assert_eq!(err, Error::NotFound("missing.pdf".into()));

    let err = client
        .invoke_action("format", json!({ "doc_id": "plan.md" }))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::WrongKind { .. }));

    let err = client.read_endpoint("docs://nowhere").await.unwrap_err();
    assert_eq!(err, Error::UnknownCapability("docs://nowhere".into()));
}

// ===========================================================================
// Correlation under concurrency
// ===========================================================================

#[tokio::test]
async fn concurrent_invocations_each_get_their_own_response() {
    let client = CapabilityClient::connect(host());
    let ids = [
        "deposition.md",
        "report.pdf",
        "financials.docx",
        "outlook.pdf",
        "plan.md",
        "spec.txt",
    ];

    let fetches = ids.iter().map(|&id| {
        let client = client.clone();
        async move {
            let result = client
                .invoke_action("read_doc", json!({ "doc_id": id }))
                .await
                .unwrap();
            (id, result.to_content_string())
        }
    });
    let results = futures::future::join_all(fetches).await;

    let expected = [
        ("deposition.md", "Angela Smith"),
        ("report.pdf", "condenser tower"),
        ("financials.docx", "budget"),
        ("outlook.pdf", "future performance"),
        ("plan.md", "steps"),
        ("spec.txt", "technical requirements"),
    ];
    for ((id, content), (expected_id, needle)) in results.iter().zip(expected) {
        assert_eq!(*id, expected_id);
        assert!(content.contains(needle), "{}: got {}", id, content);
    }
}

// ===========================================================================
// Transport failure
// ===========================================================================

#[tokio::test]
async fn dead_host_surfaces_transport_error() {
    let (req_tx, req_rx) = tokio::sync::mpsc::channel(8);
    let (resp_tx, resp_rx) = tokio::sync::mpsc::channel(8);
    let serving = docchat_host::channel::spawn(host(), req_rx, resp_tx);
    let client = CapabilityClient::from_channels(req_tx, resp_rx);

    // Works while the host is up.
    client.list_actions().await.unwrap();

    serving.abort();
    let _ = serving.await;

    let err = client.list_actions().await.unwrap_err();
    assert!(matches!(err, Error::Transport(_)), "got {:?}", err);
}
