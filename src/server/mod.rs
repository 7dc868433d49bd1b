// src/server/mod.rs

use serde::{Deserialize, Serialize};
use std::{convert::Infallible, sync::Arc};
use tracing::{info, warn};
use warp::{http::StatusCode, hyper::body::Bytes, reject::Rejection, reply::Reply, Filter};

use crate::client::StatsClient;
use crate::config::Config;
use crate::parse::{self, DisplayRow};
use crate::sample;
use crate::schema::TableData;

mod handlers;
mod page;


/// Largest query body accepted on the data route.
pub(crate) const MAX_QUERY_BYTES: u64 = 64 * 1024;

/// Shared, read-only state handed to every handler.
#[derive(Debug, Clone)]
pub struct AppState {
    pub client: StatsClient,
    pub featured_table: String,
    pub row_limit: Option<usize>,
    pub sample_fallback: bool,
}

impl AppState {
    pub fn new(client: StatsClient, config: &Config) -> Self {
        Self {
            client,
            featured_table: config.featured_table.clone(),
            row_limit: config.row_limit,
            sample_fallback: config.sample_fallback,
        }
    }

    /// Flattened rows of the featured table, or the bundled sample when the
    /// live fetch fails and fallback is on.
    pub async fn featured_preview(&self) -> Option<Preview> {
        match self.client.get_data(&self.featured_table, None).await {
            Ok(data) => Some(Preview::of(&data, self.row_limit, false)),
            Err(e) if self.sample_fallback => {
                warn!(error = %e, "featured table unavailable, using sample data");
                let data = sample::population_sample();
                Some(Preview::of(&data, self.row_limit, true))
            }
            Err(_) => None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Preview {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub rows: Vec<DisplayRow>,
    /// True when `rows` come from the bundled sample rather than upstream.
    pub sample: bool,
}

impl Preview {
    fn of(data: &TableData, limit: Option<usize>, sample: bool) -> Self {
        Self {
            title: data
                .extra
                .get("title")
                .and_then(|t| t.as_str())
                .map(String::from),
            rows: parse::flatten(data, limit),
            sample,
        }
    }
}

/// JSON body of every error response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiError {
    pub error: String,
}

pub(crate) fn error_reply(status: StatusCode, message: &str) -> warp::reply::Response {
    warp::reply::with_status(
        warp::reply::json(&ApiError {
            error: message.to_string(),
        }),
        status,
    )
    .into_response()
}

/// Rejection for query bodies over `MAX_QUERY_BYTES`.
#[derive(Debug)]
pub(crate) struct QueryTooLarge;

impl warp::reject::Reject for QueryTooLarge {}

/// The raw request body, capped by its declared length when there is one.
/// A POST without `Content-Length` (and without a body) is still accepted.
fn query_body() -> impl Filter<Extract = (Bytes,), Error = Rejection> + Clone {
    warp::header::optional::<u64>("content-length")
        .and_then(|declared: Option<u64>| async move {
            match declared {
                Some(len) if len > MAX_QUERY_BYTES => Err(warp::reject::custom(QueryTooLarge)),
                _ => Ok(()),
            }
        })
        .untuple_one()
        .and(warp::body::bytes())
}

fn with_state(
    state: Arc<AppState>,
) -> impl Filter<Extract = (Arc<AppState>,), Error = Infallible> + Clone {
    warp::any().map(move || state.clone())
}

/// All routes, with unmatched requests answered as JSON errors.
pub fn routes(
    state: Arc<AppState>,
) -> impl Filter<Extract = (impl Reply,), Error = Infallible> + Clone {
    let index = warp::path::end()
        .and(warp::get())
        .and(with_state(state.clone()))
        .and_then(handlers::index);

    let health = warp::path!("health")
        .and(warp::get())
        .and_then(handlers::health);

    let tables = warp::path!("api" / "data")
        .or(warp::path!("api" / "tables"))
        .unify()
        .and(warp::get())
        .and(with_state(state.clone()))
        .and_then(handlers::list_tables);

    let search = warp::path!("api" / "search")
        .and(warp::get())
        .and(warp::query::<handlers::SearchParams>())
        .and(with_state(state.clone()))
        .and_then(handlers::search);

    let preview = warp::path!("api" / "preview")
        .and(warp::get())
        .and(with_state(state.clone()))
        .and_then(handlers::preview);

    // table ids contain slashes, so everything after /api/table/ is the tail
    let table = warp::path!("api" / "table" / ..).and(warp::path::tail());

    let metadata = table
        .clone()
        .and(warp::get())
        .and(with_state(state.clone()))
        .and_then(handlers::metadata);

    let data = table
        .and(warp::post())
        .and(query_body())
        .and(with_state(state))
        .and_then(handlers::table_data);

    index
        .or(health)
        .or(tables)
        .or(search)
        .or(preview)
        .or(metadata)
        .or(data)
        .recover(handle_rejection)
        .with(warp::trace::request())
}

async fn handle_rejection(rejection: Rejection) -> Result<warp::reply::Response, Infallible> {
    let (status, message) = if rejection.is_not_found() {
        (StatusCode::NOT_FOUND, "Not found")
    } else if rejection.find::<warp::reject::MethodNotAllowed>().is_some() {
        (StatusCode::METHOD_NOT_ALLOWED, "Method not allowed")
    } else if rejection.find::<QueryTooLarge>().is_some() {
        (StatusCode::PAYLOAD_TOO_LARGE, "Query body too large")
    } else if rejection.find::<warp::reject::InvalidHeader>().is_some() {
        (StatusCode::BAD_REQUEST, "Invalid request header")
    } else if rejection.find::<warp::reject::InvalidQuery>().is_some() {
        (StatusCode::BAD_REQUEST, "Invalid query string")
    } else {
        warn!(?rejection, "unhandled rejection");
        (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
    };
    Ok(error_reply(status, message))
}

/// Serve until the process is stopped.
pub async fn serve(config: &Config, state: AppState) {
    let addr = (config.host, config.port);
    info!("Server starting on http://{}:{}", config.host, config.port);
    info!(
        upstream = %state.client.base_url(),
        language = state.client.language(),
        "proxying PX-Web API"
    );
    warp::serve(routes(Arc::new(state))).run(addr).await;
}
