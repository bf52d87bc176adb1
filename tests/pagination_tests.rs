//! Integration tests for paginated record sets, sequential and parallel.

use futures::TryStreamExt;
use netbox_api::rest::Query;
use netbox_api::{Api, BaseUrl, NetboxConfig, NetboxConfigBuilder};
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn builder_for(server: &MockServer) -> NetboxConfigBuilder {
    NetboxConfig::builder().base_url(BaseUrl::new(server.uri()).unwrap())
}

/// Mounts five devices served two per page.
///
/// Offset pages are mounted first so they take precedence over the
/// catch-all first page.
async fn mount_device_pages(server: &MockServer, expected_offset_calls: u64) {
    let next = |offset: u64| format!("{}/api/dcim/devices/?limit=2&offset={offset}", server.uri());

    Mock::given(method("GET"))
        .and(path("/api/dcim/devices/"))
        .and(query_param("offset", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "count": 5,
            "next": next(4),
            "previous": next(0),
            "results": [{"id": 3, "name": "d3"}, {"id": 4, "name": "d4"}]
        })))
        .expect(expected_offset_calls)
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/dcim/devices/"))
        .and(query_param("offset", "4"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "count": 5,
            "next": null,
            "previous": next(2),
            "results": [{"id": 5, "name": "d5"}]
        })))
        .expect(expected_offset_calls)
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/dcim/devices/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "count": 5,
            "next": next(2),
            "previous": null,
            "results": [{"id": 1, "name": "d1"}, {"id": 2, "name": "d2"}]
        })))
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_sequential_pagination_follows_next_links() {
    let server = MockServer::start().await;
    mount_device_pages(&server, 1).await;

    let api = Api::new(builder_for(&server).build().unwrap()).unwrap();
    let devices = api
        .dcim()
        .endpoint("devices")
        .all(Query::new())
        .collect_all()
        .await
        .unwrap();

    let ids: Vec<Option<u64>> = devices.iter().map(|d| d.id()).collect();
    assert_eq!(ids, vec![Some(1), Some(2), Some(3), Some(4), Some(5)]);
}

#[tokio::test]
async fn test_threaded_pagination_keeps_server_order() {
    let server = MockServer::start().await;
    mount_device_pages(&server, 1).await;

    let config = builder_for(&server)
        .threading(true)
        .max_workers(2)
        .build()
        .unwrap();
    let api = Api::new(config).unwrap();

    let names: Vec<String> = api
        .dcim()
        .endpoint("devices")
        .all(Query::new())
        .into_stream()
        .map_ok(|record| record.to_string())
        .try_collect()
        .await
        .unwrap();

    assert_eq!(names, vec!["d1", "d2", "d3", "d4", "d5"]);
}

#[tokio::test]
async fn test_explicit_offset_fetches_one_page() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/dcim/devices/"))
        .and(query_param("offset", "1"))
        .and(query_param("limit", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "count": 5,
            "next": format!("{}/api/dcim/devices/?limit=2&offset=3", server.uri()),
            "previous": null,
            "results": [{"id": 2}, {"id": 3}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let config = builder_for(&server).threading(true).build().unwrap();
    let api = Api::new(config).unwrap();

    let records = api
        .dcim()
        .endpoint("devices")
        .all(Query::new().limit(2).offset(1))
        .collect_all()
        .await
        .unwrap();

    let ids: Vec<Option<u64>> = records.iter().map(|d| d.id()).collect();
    assert_eq!(ids, vec![Some(2), Some(3)]);
}

#[tokio::test]
async fn test_len_uses_reported_count() {
    let server = MockServer::start().await;
    mount_device_pages(&server, 0).await;

    let api = Api::new(builder_for(&server).build().unwrap()).unwrap();
    let mut set = api.dcim().endpoint("devices").all(Query::new());

    assert_eq!(set.len().await.unwrap(), 5);
    // The first page stays buffered
    assert_eq!(set.next().await.unwrap().unwrap().id(), Some(1));
}

#[tokio::test]
async fn test_configured_page_size_is_sent_as_limit() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/dcim/sites/"))
        .and(query_param("limit", "50"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "count": 1,
            "next": null,
            "previous": null,
            "results": [{"id": 1, "name": "ams1"}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let config = builder_for(&server).page_size(50).build().unwrap();
    let api = Api::new(config).unwrap();

    let sites = api
        .dcim()
        .endpoint("sites")
        .all(Query::new())
        .collect_all()
        .await
        .unwrap();
    assert_eq!(sites.len(), 1);
}

#[tokio::test]
async fn test_bare_list_response() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/dcim/sites/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 1, "name": "ams1"},
            {"id": 2, "name": "fra1"}
        ])))
        .mount(&server)
        .await;

    let api = Api::new(builder_for(&server).build().unwrap()).unwrap();
    let mut set = api.dcim().endpoint("sites").all(Query::new());

    assert_eq!(set.len().await.unwrap(), 2);
    assert_eq!(set.collect_all().await.unwrap().len(), 2);
}
