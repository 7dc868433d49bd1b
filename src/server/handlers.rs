// src/server/handlers.rs

use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info};
use warp::{
    http::StatusCode,
    hyper::body::Bytes,
    path::Tail,
    reject::Rejection,
    reply::{self, Reply, Response},
};

use super::{error_reply, page, AppState, QueryTooLarge, MAX_QUERY_BYTES};
use crate::schema::QuerySpec;

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
}

pub async fn index(state: Arc<AppState>) -> Result<Response, Rejection> {
    let entries = state.client.list_entries().await.unwrap_or_default();
    let preview = state.featured_preview().await;
    Ok(reply::html(page::render_index(&entries, preview.as_ref())).into_response())
}

pub async fn health() -> Result<Response, Rejection> {
    Ok(reply::json(&serde_json::json!({
        "status": "healthy",
        "service": "pxweb-viewer"
    }))
    .into_response())
}

pub async fn list_tables(state: Arc<AppState>) -> Result<Response, Rejection> {
    let entries = match state.client.list_entries_mirrored().await {
        Ok(listing) => listing.raw,
        Err(_) => Value::Array(Vec::new()),
    };
    Ok(reply::json(&entries).into_response())
}

pub async fn search(params: SearchParams, state: Arc<AppState>) -> Result<Response, Rejection> {
    let keyword = match params.q.as_deref() {
        Some(q) if !q.is_empty() => q,
        _ => return Ok(error_reply(StatusCode::BAD_REQUEST, "Search keyword required")),
    };
    info!(keyword, "search requested");
    let found = state.client.search(keyword).await.unwrap_or_default();
    Ok(reply::json(&found).into_response())
}

pub async fn preview(state: Arc<AppState>) -> Result<Response, Rejection> {
    match state.featured_preview().await {
        Some(preview) => Ok(reply::json(&preview).into_response()),
        None => Ok(error_reply(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Featured table unavailable",
        )),
    }
}

pub async fn metadata(tail: Tail, state: Arc<AppState>) -> Result<Response, Rejection> {
    let id = tail.as_str();
    if id.is_empty() {
        return Err(warp::reject::not_found());
    }
    match state.client.get_metadata_mirrored(id).await {
        Ok(meta) => Ok(reply::json(&meta.raw).into_response()),
        Err(_) => Ok(error_reply(StatusCode::NOT_FOUND, "Table not found")),
    }
}

pub async fn table_data(
    tail: Tail,
    body: Bytes,
    state: Arc<AppState>,
) -> Result<Response, Rejection> {
    let id = match tail.as_str().strip_suffix("/data") {
        Some(id) if !id.is_empty() => id,
        _ => return Err(warp::reject::not_found()),
    };
    // chunked bodies carry no declared length
    if body.len() as u64 > MAX_QUERY_BYTES {
        return Err(warp::reject::custom(QueryTooLarge));
    }
    let query = match parse_query(&body) {
        Ok(query) => query,
        Err(e) => {
            debug!(error = %e, "rejecting query body");
            return Ok(error_reply(StatusCode::BAD_REQUEST, "Query body is not valid JSON"));
        }
    };
    match state.client.get_data_mirrored(id, query).await {
        Ok(data) => Ok(reply::json(&data.raw).into_response()),
        Err(_) => Ok(error_reply(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Failed to fetch table data",
        )),
    }
}

/// An empty body means "no query"; anything else must be JSON.
fn parse_query(body: &[u8]) -> serde_json::Result<Option<QuerySpec>> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }
    serde_json::from_slice(body).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_query() {
        assert_eq!(parse_query(b"").unwrap(), None);
        assert_eq!(parse_query(b" \n").unwrap(), None);
        assert_eq!(
            parse_query(br#"{"query": []}"#).unwrap(),
            Some(QuerySpec(json!({"query": []})))
        );
        assert!(parse_query(b"{not json").is_err());
    }
}
