use crate::db::store::{PropertyStore, QueryResult, StoreQuery};
use crate::errors::StoreError;
use crate::router::handle;
use crate::tests::utils::{body_json, raw, seeded_catalog};
use astra::Body;
use http::{Method, Request};
use serde_json::json;

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

struct DownStore;

impl PropertyStore for DownStore {
    fn execute(&self, _query: &StoreQuery) -> Result<QueryResult, StoreError> {
        Err(StoreError::Open("unable to open database file".into()))
    }
}

#[test]
fn filter_options_endpoint_lists_values() {
    let catalog = seeded_catalog(
        "router_options",
        &[
            raw(json!({"id": 1, "developer": "{'name': 'Sodic'}", "compound": {"name": "Villette"},
                "ready_by": "2026-12-31", "finishing": "Core & Shell"})),
            raw(json!({"id": 2, "developer": {"name": "Sodic"}, "compound": {"name": "Eastown"},
                "ready_by": "ready_to_move"})),
        ],
    );

    let resp = handle(get("/api/filter-options"), &catalog).expect("Handler failed");
    assert_eq!(resp.status(), 200);

    let body = body_json(resp);
    assert_eq!(body["developers"], json!(["Sodic"]));
    assert_eq!(body["readyByYearOptions"], json!(["Ready", "2026"]));
    assert_eq!(body["developerCompounds"], json!({"Sodic": ["Eastown", "Villette"]}));
    assert_eq!(body["finishingOptions"], json!(["Core & Shell"]));
    assert_eq!(body["error"], json!(null));
}

#[test]
fn store_failures_keep_the_envelope() {
    let catalog = crate::catalog::CatalogService::new(DownStore, Default::default());

    let resp = handle(get("/api/filter-options"), &catalog).expect("Handler failed");
    assert_eq!(resp.status(), 500);
    let body = body_json(resp);
    assert_eq!(body["developers"], json!([]));
    assert!(body["error"].as_str().unwrap().contains("unable to open"));

    let resp = handle(get("/api/properties?search=x"), &catalog).expect("Handler failed");
    assert_eq!(resp.status(), 500);
    let body = body_json(resp);
    assert_eq!(body["properties"], json!([]));
    assert_eq!(body["totalCount"], json!(0));
}
