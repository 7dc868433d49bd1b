// src/client/mod.rs

use anyhow::{Context, Result};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, instrument, warn};
use url::Url;

use crate::schema::{QuerySpec, TableData, TableEntry, TableMetadata};

pub mod error;
mod search;

pub use error::{FetchError, FetchResult};

pub const DEFAULT_BASE_URL: &str = "https://px.hagstofa.is/pxis/api/v1";
pub const DEFAULT_LANGUAGE: &str = "is";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Client for a PX-Web catalog rooted at `{base}/{language}`.
///
/// Cloning is cheap: the underlying `reqwest::Client` is reference counted
/// and holds no per-request state.
#[derive(Debug, Clone)]
pub struct StatsClient {
    http: Client,
    base: Url,
    language: String,
}

impl StatsClient {
    /// Build a client with its own connection pool and a fixed request timeout.
    pub fn new(base: Url, language: impl Into<String>, timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .context("building HTTP client")?;
        Ok(Self::with_client(http, base, language))
    }

    pub fn with_client(http: Client, mut base: Url, language: impl Into<String>) -> Self {
        // `Url::join` resolves against the last directory, so keep a trailing slash.
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        Self {
            http,
            base,
            language: language.into(),
        }
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// `{base}/{lang}` for the root, `{base}/{lang}/{id}` otherwise. Ids are
    /// path-like (`Ibuar/mannfjoldi/MAN00000.px`) and keep their slashes, but
    /// `.`/`..` segments (plain or percent-encoded) are refused so an id can
    /// never resolve outside `{base}/{lang}/`.
    pub fn endpoint(&self, id: Option<&str>) -> FetchResult<Url> {
        let relative = match id {
            None => self.language.clone(),
            Some(id) => {
                if id.split('/').any(is_dot_segment) {
                    return Err(FetchError::RelativeId { id: id.to_string() });
                }
                format!("{}/{}", self.language, id.trim_start_matches('/'))
            }
        };
        self.base
            .join(&relative)
            .map_err(|source| FetchError::InvalidUrl {
                id: relative,
                source,
            })
    }

    async fn get_json(&self, url: &Url) -> FetchResult<Value> {
        debug!(%url, "GET");
        self.http
            .get(url.clone())
            .send()
            .await
            .and_then(|resp| resp.error_for_status())
            .map_err(|e| FetchError::from_reqwest(url, e))?
            .json::<Value>()
            .await
            .map_err(|e| FetchError::from_reqwest(url, e))
    }

    async fn post_json(&self, url: &Url, query: &QuerySpec) -> FetchResult<Value> {
        debug!(%url, "POST");
        self.http
            .post(url.clone())
            .json(query)
            .send()
            .await
            .and_then(|resp| resp.error_for_status())
            .map_err(|e| FetchError::from_reqwest(url, e))?
            .json::<Value>()
            .await
            .map_err(|e| FetchError::from_reqwest(url, e))
    }

    /// Top-level catalog entries.
    pub async fn list_entries(&self) -> FetchResult<Vec<TableEntry>> {
        self.list_entries_mirrored().await.map(|m| m.parsed)
    }

    #[instrument(level = "debug", skip(self))]
    pub async fn list_entries_mirrored(&self) -> FetchResult<Mirrored<Vec<TableEntry>>> {
        let url = self.endpoint(None)?;
        let raw = self.get_json(&url).await;
        raw.and_then(|raw| Mirrored::decode(&url, raw))
            .inspect_err(|e| warn!(error = %e, "Error fetching tables"))
    }

    /// Children of one folder entry.
    #[instrument(level = "debug", skip(self))]
    pub async fn list_folder(&self, folder_id: &str) -> FetchResult<Vec<TableEntry>> {
        let url = self.endpoint(Some(folder_id))?;
        let raw = self.get_json(&url).await;
        raw.and_then(|raw| Mirrored::decode(&url, raw))
            .map(|m| m.parsed)
            .inspect_err(|e| warn!(error = %e, "Error fetching folder"))
    }

    pub async fn get_metadata(&self, table_id: &str) -> FetchResult<TableMetadata> {
        self.get_metadata_mirrored(table_id).await.map(|m| m.parsed)
    }

    #[instrument(level = "debug", skip(self))]
    pub async fn get_metadata_mirrored(
        &self,
        table_id: &str,
    ) -> FetchResult<Mirrored<TableMetadata>> {
        let url = self
            .endpoint(Some(table_id))
            .inspect_err(|e| warn!(error = %e, "Error fetching table metadata"))?;
        let raw = self.get_json(&url).await;
        raw.and_then(|raw| Mirrored::decode(&url, raw))
            .inspect_err(|e| warn!(error = %e, "Error fetching table metadata"))
    }

    /// Run `query` against a table. Without a query (or with an empty one) the
    /// table's metadata is fetched first and, only if that succeeds, every
    /// value is requested.
    pub async fn get_data(
        &self,
        table_id: &str,
        query: Option<QuerySpec>,
    ) -> FetchResult<TableData> {
        self.get_data_mirrored(table_id, query).await.map(|m| m.parsed)
    }

    #[instrument(level = "debug", skip(self, query))]
    pub async fn get_data_mirrored(
        &self,
        table_id: &str,
        query: Option<QuerySpec>,
    ) -> FetchResult<Mirrored<TableData>> {
        let query = match query.filter(|q| !q.is_empty()) {
            Some(q) => q,
            None => {
                if let Err(e) = self.get_metadata(table_id).await {
                    return Err(FetchError::MetadataUnavailable {
                        id: table_id.to_string(),
                        source: Box::new(e),
                    });
                }
                QuerySpec::select_all()
            }
        };

        let url = self.endpoint(Some(table_id))?;
        let raw = self.post_json(&url, &query).await;
        raw.and_then(|raw| Mirrored::decode(&url, raw))
            .inspect_err(|e| warn!(error = %e, "Error fetching table data"))
    }
}

/// An upstream body exactly as received, next to its typed view. The web
/// layer serves `raw` so field names and order reach the caller untouched.
#[derive(Debug, Clone)]
pub struct Mirrored<T> {
    pub raw: Value,
    pub parsed: T,
}

impl<T: DeserializeOwned> Mirrored<T> {
    fn decode(url: &Url, raw: Value) -> FetchResult<Self> {
        let parsed = T::deserialize(&raw).map_err(|source| FetchError::Shape {
            url: url.to_string(),
            source,
        })?;
        Ok(Self { raw, parsed })
    }
}

fn is_dot_segment(segment: &str) -> bool {
    let decoded = segment.to_ascii_lowercase().replace("%2e", ".");
    decoded == "." || decoded == ".."
}
