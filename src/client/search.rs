// src/client/search.rs

use std::vec;
use tracing::{debug, info, instrument};

use super::{FetchResult, StatsClient};
use crate::schema::TableEntry;

impl StatsClient {
    /// Depth-first walk of the whole catalog, returning every table whose
    /// `text` or `id` contains `keyword` (case-insensitive).
    ///
    /// Fails only if the root listing fails. Each folder costs one request.
    #[instrument(level = "info", skip(self))]
    pub async fn search(&self, keyword: &str) -> FetchResult<Vec<TableEntry>> {
        let root = self.list_entries().await?;
        Ok(self.search_from(root, keyword).await)
    }

    /// Same walk starting from an already fetched listing.
    ///
    /// A folder that cannot be listed is treated as empty. There is no depth
    /// limit and no visited set: a folder reachable twice is walked twice.
    pub async fn search_from(&self, root: Vec<TableEntry>, keyword: &str) -> Vec<TableEntry> {
        let needle = keyword.to_lowercase();
        let mut found = Vec::new();
        let mut expanded = 0usize;
        // one iterator per open folder; the top of the stack is the deepest
        let mut pending: Vec<vec::IntoIter<TableEntry>> = vec![root.into_iter()];

        while let Some(level) = pending.last_mut() {
            let Some(entry) = level.next() else {
                pending.pop();
                continue;
            };

            if entry.is_folder() {
                if entry.id.is_empty() {
                    continue;
                }
                match self.list_folder(&entry.id).await {
                    Ok(children) => {
                        expanded += 1;
                        pending.push(children.into_iter());
                    }
                    Err(e) => debug!(folder = %entry.id, error = %e, "treating folder as empty"),
                }
            } else if entry.is_table() && entry.matches(&needle) {
                found.push(entry);
            }
        }

        info!(matches = found.len(), folders = expanded, "search finished");
        found
    }
}

#[cfg(test)]
mod tests {
    use crate::test_support::Fixture;
    use serde_json::json;

    /// is
    /// ├── Ibuar (l)
    /// │   ├── mannfjoldi (l)
    /// │   │   ├── MAN00000.px  "Population by sex and age"
    /// │   │   └── deep (l)
    /// │   │       └── MAN10001.px "POPULATION projections"
    /// │   └── BUS01.px "Births"
    /// ├── Broken (l)   -> 404
    /// ├── VIS01.px "Population density" (id has no match)
    /// └── population_index.px "Index"
    fn catalog() -> Fixture {
        Fixture::default()
            .get(
                "is",
                json!([
                    {"id": "Ibuar", "text": "Íbúar", "type": "l"},
                    {"id": "Broken", "text": "Broken folder", "type": "l"},
                    {"id": "VIS01.px", "text": "Population density", "type": "t"},
                    {"id": "population_index.px", "text": "Index", "type": "t"}
                ]),
            )
            .get(
                "is/Ibuar",
                json!([
                    {"id": "Ibuar/mannfjoldi", "text": "Mannfjöldi", "type": "l"},
                    {"id": "Ibuar/BUS01.px", "text": "Births", "type": "t"}
                ]),
            )
            .get(
                "is/Ibuar/mannfjoldi",
                json!([
                    {"id": "Ibuar/mannfjoldi/MAN00000.px", "text": "Population by sex and age", "type": "t"},
                    {"id": "Ibuar/mannfjoldi/deep", "text": "Deeper", "type": "l"}
                ]),
            )
            .get(
                "is/Ibuar/mannfjoldi/deep",
                json!([
                    {"id": "Ibuar/mannfjoldi/deep/MAN10001.px", "text": "POPULATION projections", "type": "t"}
                ]),
            )
    }

    #[tokio::test]
    async fn test_search_walks_nested_folders_depth_first() {
        let upstream = catalog().spawn().await;
        let found = upstream.client().search("population").await.unwrap();

        let ids: Vec<&str> = found.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(
            ids,
            vec![
                "Ibuar/mannfjoldi/MAN00000.px",
                "Ibuar/mannfjoldi/deep/MAN10001.px",
                "VIS01.px",
                "population_index.px",
            ]
        );
        assert!(found.iter().all(|e| e.is_table()));
        // root + Ibuar + mannfjoldi + deep + Broken
        assert_eq!(upstream.get_count(), 5);
    }

    #[tokio::test]
    async fn test_search_ignores_folder_labels() {
        let upstream = catalog().spawn().await;
        let found = upstream.client().search("mannfjöldi").await.unwrap();
        assert!(found.is_empty());
    }

    #[tokio::test]
    async fn test_search_root_failure_is_error() {
        let upstream = Fixture::default().spawn().await;
        assert!(upstream.client().search("anything").await.is_err());
        assert_eq!(upstream.get_count(), 1);
    }

    #[tokio::test]
    async fn test_search_does_not_dedupe_repeated_paths() {
        let upstream = Fixture::default()
            .get(
                "is",
                json!([
                    {"id": "a", "text": "A", "type": "l"},
                    {"id": "a", "text": "A again", "type": "l"}
                ]),
            )
            .get("is/a", json!([{"id": "a/pop.px", "text": "Pop", "type": "t"}]))
            .spawn()
            .await;

        let found = upstream.client().search("POP").await.unwrap();
        assert_eq!(found.len(), 2);
        assert_eq!(upstream.get_count(), 3);
    }
}
