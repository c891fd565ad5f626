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

fn listings() -> Vec<crate::domain::RawRecord> {
    vec![
        raw(json!({"id": 1, "developer": "{'id': 4, 'name': 'Sodic'}",
            "compound": {"name": "Villette"}, "area": {"name": "New Cairo"},
            "number_of_bedrooms": 2, "price_in_egp": 2_000_000.0})),
        raw(json!({"id": 2, "developer": {"name": "Emaar Misr"},
            "compound": {"name": "Mivida"}, "area": {"name": "New Cairo"},
            "number_of_bedrooms": 3, "price_in_egp": 6_000_000.0})),
        raw(json!({"id": 3, "developer": {"name": "Palm Hills"},
            "compound": {"name": "Palm Hills October"}, "area": {"name": "6th of October"},
            "number_of_bedrooms": 3, "price_in_egp": 4_000_000.0})),
    ]
}

#[test]
fn health_check_responds_ok() {
    let catalog = seeded_catalog("router_health", &[]);
    let resp = handle(get("/health"), &catalog).expect("Handler failed");

    assert_eq!(resp.status(), 200);
    assert_eq!(
        resp.headers().get("Content-Type").and_then(|v| v.to_str().ok()),
        Some("application/json; charset=utf-8")
    );
    assert_eq!(body_json(resp), json!({"status": "ok"}));
}

#[test]
fn lists_properties_with_decoded_filters() {
    let catalog = seeded_catalog("router_list", &listings());

    let resp = handle(get("/api/properties?area=New%20Cairo&page_size=1"), &catalog)
        .expect("Handler failed");
    assert_eq!(resp.status(), 200);

    let body = body_json(resp);
    assert_eq!(body["error"], json!(null));
    assert_eq!(body["totalPages"], json!(2));
    assert_eq!(body["pageSize"], json!(1));
    assert_eq!(body["properties"][0]["id"], json!(2));
    assert_eq!(body["properties"][0]["developer"]["name"], json!("Emaar Misr"));
}

#[test]
fn multi_area_and_numeric_filters() {
    let catalog = seeded_catalog("router_areas", &listings());

    let resp = handle(
        get("/api/properties?areas=october,+new+cairo&bedrooms=3&max_price=5000000"),
        &catalog,
    )
    .expect("Handler failed");
    let body = body_json(resp);
    let ids: Vec<i64> = body["properties"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["id"].as_i64().unwrap())
        .collect();
    assert_eq!(ids, vec![3]);
    assert_eq!(body["totalCount"], json!(1));
}

#[test]
fn malformed_numbers_are_bad_requests() {
    let catalog = seeded_catalog("router_bad_number", &listings());

    let err = handle(get("/api/properties?bedrooms=three"), &catalog)
        .err()
        .expect("expected an error");
    assert_eq!(err.status(), 400);

    let err = handle(get("/api/properties?page=-1"), &catalog)
        .err()
        .expect("expected an error");
    assert_eq!(err.status(), 400);

    let err = handle(get("/api/properties?category=industrial"), &catalog)
        .err()
        .expect("expected an error");
    assert_eq!(err.status(), 400);
}

#[test]
fn single_property_lookup() {
    let catalog = seeded_catalog("router_single", &listings());

    let resp = handle(get("/api/properties/1"), &catalog).expect("Handler failed");
    assert_eq!(resp.status(), 200);
    let body = body_json(resp);
    assert_eq!(body["developer"], json!({"id": 4, "name": "Sodic"}));

    let err = handle(get("/api/properties/404"), &catalog)
        .err()
        .expect("expected an error");
    assert_eq!(err.status(), 404);

    let err = handle(get("/api/properties/abc"), &catalog)
        .err()
        .expect("expected an error");
    assert_eq!(err.status(), 400);
}

#[test]
fn unknown_routes_are_not_found() {
    let catalog = seeded_catalog("router_unknown", &[]);
    let err = handle(get("/nope"), &catalog)
        .err()
        .expect("expected an error");
    assert_eq!(err.status(), 404);

    let resp = crate::responses::error_response(err);
    assert_eq!(resp.status(), 404);
    assert_eq!(body_json(resp), json!({"error": "Not Found"}));
}
