//! End-to-end runs of the houses feed against a mock server.

use std::sync::Arc;

use got_core::api::client::{ClientSettings, IceAndFireClient};
use got_core::core::services::{FeedState, HouseService, HousesStatus, PagedFeed};
use got_core::networking::{ConnectivityMonitor, ManualNetwork, Pagination, RequestStatus};
use tokio::sync::broadcast;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const STARK: &str = r#"{
    "url": "https://www.anapioficeandfire.com/api/houses/362",
    "name": "House Stark of Winterfell",
    "region": "The North",
    "words": "Winter is Coming",
    "seats": ["Scattered (formerly Winterfell)"]
}"#;

fn feed_for(
    base_url: String,
    connectivity: Option<ConnectivityMonitor>,
) -> Arc<PagedFeed<HouseService>> {
    let settings = ClientSettings {
        base_url,
        ..ClientSettings::default()
    };
    let client = IceAndFireClient::new(&settings, connectivity).expect("client creation failed");
    Arc::new(PagedFeed::new(Arc::new(HouseService::new(client, 20))))
}

async fn next_terminal(updates: &mut broadcast::Receiver<HousesStatus>) -> HousesStatus {
    assert_eq!(
        updates.recv().await.expect("loading status"),
        RequestStatus::Loading
    );
    updates.recv().await.expect("terminal status")
}

fn monitor(network: ManualNetwork) -> ConnectivityMonitor {
    ConnectivityMonitor::new(Arc::new(network))
}

#[tokio::test]
async fn test_envelope_page_loads_and_advances() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/houses"))
        .and(query_param("page", "1"))
        .and(query_param("pageSize", "20"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(format!(r#"{{"count": 1, "results": [{}]}}"#, STARK)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let feed = feed_for(format!("{}/api/", server.uri()), None);
    let mut updates = feed.subscribe();
    feed.spawn_fetch(false).await.expect("fetch task");

    match next_terminal(&mut updates).await {
        RequestStatus::Success { status_code, data } => {
            assert_eq!(status_code, 200);
            assert_eq!(data.len(), 1);
            assert_eq!(data[0].name, "House Stark of Winterfell");
            assert_eq!(data[0].id(), Some(362));
        }
        other => panic!("Expected Success, got {:?}", other),
    }
    assert_eq!(feed.pagination().current_page, 2);
    assert!(!feed.pagination().loading_first_time);
    assert_eq!(feed.state(), FeedState::Loaded);
}

#[tokio::test]
async fn test_paging_until_empty_page() {
    let server = MockServer::start().await;
    Mock::given(path("/api/houses"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_string(format!("[{}]", STARK)))
        .mount(&server)
        .await;
    Mock::given(path("/api/houses"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_string("[]"))
        .expect(1)
        .mount(&server)
        .await;

    let feed = feed_for(format!("{}/api/", server.uri()), None);
    let mut updates = feed.subscribe();

    feed.fetch(false).await;
    feed.fetch(false).await;
    assert!(next_terminal(&mut updates).await.is_success());
    assert_eq!(
        next_terminal(&mut updates).await,
        RequestStatus::Success {
            status_code: 200,
            data: vec![]
        }
    );
    assert!(feed.pagination().reached_last_page);

    // Past the end: no request, no emission
    feed.fetch(false).await;
    assert!(updates.try_recv().is_err());
}

#[tokio::test]
async fn test_server_failure_is_server_error() {
    let server = MockServer::start().await;
    Mock::given(path("/api/houses"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let feed = feed_for(format!("{}/api/", server.uri()), None);
    let mut updates = feed.subscribe();
    feed.fetch(false).await;

    assert_eq!(next_terminal(&mut updates).await, RequestStatus::ServerError);
    assert_eq!(feed.pagination(), Pagination::new());
    assert_eq!(feed.state(), FeedState::Failed);
}

#[tokio::test]
async fn test_not_found_carries_error_body() {
    let server = MockServer::start().await;
    Mock::given(path("/api/houses"))
        .respond_with(ResponseTemplate::new(404).set_body_string("not found"))
        .mount(&server)
        .await;

    let feed = feed_for(format!("{}/api/", server.uri()), None);
    let mut updates = feed.subscribe();
    feed.fetch(false).await;

    let status = next_terminal(&mut updates).await;
    assert_eq!(
        status,
        RequestStatus::ApiError {
            status_code: 404,
            error_message: Some("not found".to_string())
        }
    );
    assert_eq!(
        status.user_message().as_deref(),
        Some("Request failed (404): not found")
    );
}

#[tokio::test]
async fn test_malformed_body_is_parse_error() {
    let server = MockServer::start().await;
    Mock::given(path("/api/houses"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"houses": "#))
        .mount(&server)
        .await;

    let feed = feed_for(format!("{}/api/", server.uri()), None);
    let mut updates = feed.subscribe();
    feed.fetch(false).await;

    assert_eq!(next_terminal(&mut updates).await, RequestStatus::ParseError);
}

/// Base URL of a port nothing listens on.
async fn refused_base_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind listener");
    let address = listener.local_addr().expect("local address");
    drop(listener);
    format!("http://{}/api/", address)
}

#[tokio::test]
async fn test_refused_connection_while_online_is_server_unreachable() {
    let feed = feed_for(
        refused_base_url().await,
        Some(monitor(ManualNetwork::connected())),
    );
    let mut updates = feed.subscribe();
    feed.fetch(false).await;

    assert_eq!(
        next_terminal(&mut updates).await,
        RequestStatus::ServerUnreachable
    );
}

#[tokio::test]
async fn test_refused_connection_while_offline_is_network_error() {
    let feed = feed_for(
        refused_base_url().await,
        Some(monitor(ManualNetwork::disconnected())),
    );
    let mut updates = feed.subscribe();
    feed.fetch(false).await;

    assert_eq!(next_terminal(&mut updates).await, RequestStatus::NetworkError);
}

#[tokio::test]
async fn test_refresh_requests_first_page_again() {
    let server = MockServer::start().await;
    Mock::given(path("/api/houses"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_string(format!("[{}]", STARK)))
        .expect(2)
        .mount(&server)
        .await;

    let feed = feed_for(format!("{}/api/", server.uri()), None);
    feed.fetch(false).await;
    assert_eq!(feed.pagination().current_page, 2);

    feed.fetch(true).await;
    assert_eq!(feed.pagination().current_page, 2);
    assert!(!feed.pagination().reached_last_page);
}
