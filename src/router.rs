use crate::catalog::{CatalogService, FilterSpecification};
use crate::db::PropertyStore;
use crate::errors::ServerError;
use crate::responses::{json_response, ResultResp};
use astra::Request;
use serde_json::json;
use std::collections::HashMap;

pub fn handle<S: PropertyStore>(req: Request, catalog: &CatalogService<S>) -> ResultResp {
    let method = req.method().as_str();
    let path = req.uri().path().trim_end_matches('/');

    tracing::debug!(method, path, "request");

    match (method, path) {
        ("GET", "/health") => json_response(200, &json!({ "status": "ok" })),
        ("GET", "/api/properties") => {
            let params = parse_query(&req);
            let filters = FilterSpecification::from_query(&params)?;
            let page = page_param(&params, "page")?.unwrap_or(1);
            let page_size = page_param(&params, "page_size")?
                .unwrap_or(catalog.config().default_page_size);

            let result = catalog.fetch_catalog_page(page, page_size, &filters);
            json_response(status_of(&result.error), &result)
        }
        ("GET", "/api/filter-options") => {
            let result = catalog.fetch_filter_options();
            json_response(status_of(&result.error), &result)
        }
        ("GET", p) if p.starts_with("/api/properties/") => {
            let raw_id = &p["/api/properties/".len()..];
            let id: i64 = raw_id
                .parse()
                .map_err(|_| ServerError::BadRequest(format!("invalid property id {raw_id:?}")))?;
            match catalog.fetch_property(id)? {
                Some(record) => json_response(200, &record),
                None => Err(ServerError::NotFound),
            }
        }
        _ => Err(ServerError::NotFound),
    }
}

/// Envelopes carrying a store error still go out with their body, as a 500.
fn status_of(error: &Option<String>) -> u16 {
    if error.is_some() {
        500
    } else {
        200
    }
}

fn page_param(params: &HashMap<String, String>, key: &str) -> Result<Option<usize>, ServerError> {
    match params.get(key).map(|v| v.trim()).filter(|v| !v.is_empty()) {
        None => Ok(None),
        Some(raw) => raw
            .parse()
            .map(Some)
            .map_err(|_| ServerError::BadRequest(format!("invalid {key}: {raw:?}"))),
    }
}

/// Decoded query pairs; a repeated key keeps its last value.
pub fn parse_query(req: &Request) -> HashMap<String, String> {
    req.uri()
        .query()
        .map(|q| url::form_urlencoded::parse(q.as_bytes()).into_owned().collect())
        .unwrap_or_default()
}
