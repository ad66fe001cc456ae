//! Sync tests against a mock GraphQL endpoint.
//!
//! These tests use wiremock to simulate the shop API and check what ends up
//! in the snapshot file after each run.

use std::fs;
use std::ops::Range;

use serde_json::{Value, json};
use storesync::error::Error;
use storesync::{
    GraphqlClient, Resource, ShopConfig, SnapshotStore, StartPosition, SyncEngine, SyncOptions,
    SyncOutcome,
};
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const GRAPHQL_PATH: &str = "/admin/api/2024-10/graphql.json";

/// Helper to create a client pointed at the mock server.
fn client(server: &MockServer) -> GraphqlClient {
    let config = ShopConfig::new(format!("{}{}", server.uri(), GRAPHQL_PATH), "shpat_test")
        .unwrap()
        .with_app_secret("app-secret");
    GraphqlClient::new(config).unwrap()
}

fn customer_id(i: u32) -> String {
    format!("gid://shopify/Customer/{i}")
}

/// A `customers` connection page with ids in `ids`.
fn page(ids: Range<u32>, has_next_page: bool) -> Value {
    let end_cursor = ids.clone().last().map(|i| format!("cursor-{i}"));
    let edges: Vec<Value> = ids
        .map(|i| {
            json!({
                "cursor": format!("cursor-{i}"),
                "node": {"id": customer_id(i), "email": format!("c{i}@example.com")}
            })
        })
        .collect();
    json!({
        "data": {
            "customers": {
                "edges": edges,
                "pageInfo": {"hasNextPage": has_next_page, "endCursor": end_cursor}
            }
        }
    })
}

async fn mount_page(server: &MockServer, after: Value, body: Value) {
    Mock::given(method("POST"))
        .and(path(GRAPHQL_PATH))
        .and(body_partial_json(json!({"variables": {"first": 100, "after": after}})))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

fn customers_in(dir: &tempfile::TempDir) -> Resource {
    Resource::customers().with_snapshot_path(dir.path().join("customer.json"))
}

fn stored_ids(resource: &Resource) -> Vec<String> {
    SnapshotStore::new(&resource.snapshot_path, "customers")
        .load()
        .edges()
        .iter()
        .map(|edge| edge.id().to_string())
        .collect()
}

// ============================================================================
// Pagination and merge
// ============================================================================

#[tokio::test]
async fn test_sync_two_pages_into_empty_store() {
    let server = MockServer::start().await;
    mount_page(&server, Value::Null, page(0..100, true)).await;
    mount_page(&server, json!("cursor-99"), page(100..150, false)).await;

    let dir = tempfile::tempdir().unwrap();
    let resource = customers_in(&dir);
    let engine = SyncEngine::new(client(&server), SyncOptions::default());

    let report = engine.run(&resource).await.unwrap();

    assert!(report.outcome.is_completed());
    assert_eq!(report.pages_fetched, 2);
    assert_eq!(report.records_added, 150);
    assert_eq!(report.total_records, 150);

    let written: Value =
        serde_json::from_str(&fs::read_to_string(&resource.snapshot_path).unwrap()).unwrap();
    assert_eq!(written["data"]["customers"]["edges"].as_array().unwrap().len(), 150);
    assert_eq!(written["pageInfo"]["hasNextPage"], false);
    assert_eq!(written["pageInfo"]["endCursor"], "cursor-149");
}

#[tokio::test]
async fn test_second_run_adds_no_duplicates() {
    let server = MockServer::start().await;
    mount_page(&server, Value::Null, page(0..100, true)).await;
    mount_page(&server, json!("cursor-99"), page(100..150, false)).await;

    let dir = tempfile::tempdir().unwrap();
    let resource = customers_in(&dir);
    let engine = SyncEngine::new(client(&server), SyncOptions::default());

    engine.run(&resource).await.unwrap();
    let second = engine.run(&resource).await.unwrap();

    assert_eq!(second.records_added, 0);
    assert_eq!(second.records_skipped, 150);
    let ids = stored_ids(&resource);
    assert_eq!(ids.len(), 150);
    let unique: std::collections::HashSet<_> = ids.iter().collect();
    assert_eq!(unique.len(), 150);
}

#[tokio::test]
async fn test_stored_record_is_not_overwritten() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        Value::Null,
        json!({
            "data": {"customers": {
                "edges": [
                    {"cursor": "c1", "node": {"id": "X", "email": "new@example.com"}},
                    {"cursor": "c2", "node": {"id": "Y", "email": "y@example.com"}}
                ],
                "pageInfo": {"hasNextPage": false, "endCursor": "c2"}
            }}
        }),
    )
    .await;

    let dir = tempfile::tempdir().unwrap();
    let resource = customers_in(&dir);
    fs::write(
        &resource.snapshot_path,
        json!({
            "data": {"customers": {"edges": [
                {"cursor": "c1", "node": {"id": "X", "email": "old@example.com"}}
            ]}},
            "pageInfo": {}
        })
        .to_string(),
    )
    .unwrap();

    let engine = SyncEngine::new(client(&server), SyncOptions::default());
    let report = engine.run(&resource).await.unwrap();

    assert_eq!(report.records_added, 1);
    let snapshot = SnapshotStore::new(&resource.snapshot_path, "customers").load();
    assert_eq!(stored_ids(&resource), vec!["X", "Y"]);
    assert_eq!(
        snapshot.get("X").unwrap().node.fields["email"],
        "old@example.com"
    );
}

#[tokio::test]
async fn test_resume_from_stored_cursor() {
    let server = MockServer::start().await;
    mount_page(&server, json!("cursor-99"), page(100..150, false)).await;

    let dir = tempfile::tempdir().unwrap();
    let resource = customers_in(&dir);

    // A previous run stopped after the first page.
    let mut seeded = page(0..100, true);
    let page_info = seeded["data"]["customers"]["pageInfo"].take();
    seeded["data"]["customers"]
        .as_object_mut()
        .unwrap()
        .remove("pageInfo");
    seeded["pageInfo"] = page_info;
    fs::write(&resource.snapshot_path, seeded.to_string()).unwrap();

    let options = SyncOptions::default().with_start(StartPosition::Resume);
    let engine = SyncEngine::new(client(&server), options);
    let report = engine.run(&resource).await.unwrap();

    assert!(report.outcome.is_completed());
    assert_eq!(report.records_added, 50);
    assert_eq!(report.pages_fetched, 1);
    assert_eq!(stored_ids(&resource).len(), 150);
}

#[tokio::test]
async fn test_corrupt_store_is_replaced() {
    let server = MockServer::start().await;
    mount_page(&server, Value::Null, page(0..3, false)).await;

    let dir = tempfile::tempdir().unwrap();
    let resource = customers_in(&dir);
    fs::write(&resource.snapshot_path, "{ this is not json").unwrap();

    let engine = SyncEngine::new(client(&server), SyncOptions::default());
    let report = engine.run(&resource).await.unwrap();

    assert!(report.outcome.is_completed());
    assert_eq!(stored_ids(&resource).len(), 3);
}

// ============================================================================
// Request shape
// ============================================================================

#[tokio::test]
async fn test_request_carries_query_and_credentials() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(GRAPHQL_PATH))
        .and(header("x-shopify-access-token", "shpat_test"))
        .and(header("x-shopify-app-secret", "app-secret"))
        .and(header("content-type", "application/json"))
        .and(body_partial_json(json!({
            "query": Resource::customers().query,
            "variables": {"first": 25, "after": null}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(0..1, false)))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let options = SyncOptions::default().with_page_size(25).unwrap();
    let engine = SyncEngine::new(client(&server), options);

    let report = engine.run(&customers_in(&dir)).await.unwrap();
    assert!(report.outcome.is_completed());
}

// ============================================================================
// Failures
// ============================================================================

#[tokio::test]
async fn test_http_error_keeps_partial_progress() {
    let server = MockServer::start().await;
    mount_page(&server, Value::Null, page(0..100, true)).await;

    Mock::given(method("POST"))
        .and(path(GRAPHQL_PATH))
        .and(body_partial_json(json!({"variables": {"after": "cursor-99"}})))
        .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let resource = customers_in(&dir);
    let engine = SyncEngine::new(client(&server), SyncOptions::default());

    let report = engine.run(&resource).await.unwrap();

    match report.outcome {
        SyncOutcome::Aborted(Error::Protocol(err)) => {
            assert_eq!(err.status, 500);
            assert_eq!(err.body, "Internal Server Error");
        }
        other => panic!("expected protocol abort, got {:?}", other),
    }
    assert_eq!(stored_ids(&resource).len(), 100);
}

#[tokio::test]
async fn test_malformed_body_surfaces_raw_response() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(GRAPHQL_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let resource = customers_in(&dir);
    let engine = SyncEngine::new(client(&server), SyncOptions::default());

    let report = engine.run(&resource).await.unwrap();

    match report.outcome {
        SyncOutcome::Aborted(Error::Decode(err)) => {
            assert_eq!(err.raw, "<html>maintenance</html>");
            assert!(err.to_string().contains("<html>maintenance</html>"));
        }
        other => panic!("expected decode abort, got {:?}", other),
    }
    // The empty snapshot is still persisted.
    assert!(resource.snapshot_path.exists());
    assert!(stored_ids(&resource).is_empty());
}

#[tokio::test]
async fn test_graphql_errors_abort() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(GRAPHQL_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "errors": [{"message": "Throttled", "extensions": {"code": "THROTTLED"}}]
        })))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let engine = SyncEngine::new(client(&server), SyncOptions::default());

    let report = engine.run(&customers_in(&dir)).await.unwrap();

    match report.outcome {
        SyncOutcome::Aborted(Error::Graphql(err)) => {
            assert_eq!(err.messages, vec!["Throttled".to_string()]);
        }
        other => panic!("expected graphql abort, got {:?}", other),
    }
}

#[tokio::test]
async fn test_field_errors_with_data_are_not_fatal() {
    let server = MockServer::start().await;

    let mut body = page(0..3, false);
    body["errors"] = json!([
        {"message": "Access denied for field note", "path": ["customers", "edges", 0, "node", "note"]}
    ]);
    Mock::given(method("POST"))
        .and(path(GRAPHQL_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let resource = customers_in(&dir);
    let engine = SyncEngine::new(client(&server), SyncOptions::default());

    let report = engine.run(&resource).await.unwrap();

    assert!(report.outcome.is_completed());
    assert_eq!(report.records_added, 3);
    assert_eq!(stored_ids(&resource).len(), 3);
}

#[tokio::test]
async fn test_missing_connection_field_aborts() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(GRAPHQL_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": {"orders": null}})))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let engine = SyncEngine::new(client(&server), SyncOptions::default());

    let report = engine.run(&customers_in(&dir)).await.unwrap();
    assert!(matches!(report.outcome, SyncOutcome::Aborted(Error::Decode(_))));
}
