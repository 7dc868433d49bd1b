// src/schema/types.rs

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Fields the upstream sent that we don't model; kept so they round-trip untouched.
pub type Extra = Map<String, Value>;

/// Kind of a catalog node, encoded upstream as `"l"` (list) or `"t"` (table).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EntryKind {
    Folder,
    Table,
    Other(String),
}

impl EntryKind {
    /// Entry sent without a `type` field.
    pub fn is_missing(&self) -> bool {
        matches!(self, EntryKind::Other(raw) if raw.is_empty())
    }

    pub fn as_str(&self) -> &str {
        match self {
            EntryKind::Folder => "l",
            EntryKind::Table => "t",
            EntryKind::Other(raw) => raw,
        }
    }

    /// Human-readable label used by the page and the explore binary.
    pub fn label(&self) -> &'static str {
        match self {
            EntryKind::Folder => "folder",
            EntryKind::Table => "table",
            EntryKind::Other(_) => "other",
        }
    }
}

impl Default for EntryKind {
    fn default() -> Self {
        EntryKind::Other(String::new())
    }
}

impl From<String> for EntryKind {
    fn from(s: String) -> Self {
        match s.as_str() {
            "l" => EntryKind::Folder,
            "t" => EntryKind::Table,
            _ => EntryKind::Other(s),
        }
    }
}

impl From<EntryKind> for String {
    fn from(kind: EntryKind) -> Self {
        match kind {
            EntryKind::Other(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

/// One node of the remote catalog tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableEntry {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub text: String,
    #[serde(rename = "type", default, skip_serializing_if = "EntryKind::is_missing")]
    pub kind: EntryKind,
    #[serde(flatten)]
    pub extra: Extra,
}

impl TableEntry {
    pub fn is_folder(&self) -> bool {
        self.kind == EntryKind::Folder
    }

    pub fn is_table(&self) -> bool {
        self.kind == EntryKind::Table
    }

    /// Case-insensitive substring match against `text` or `id`.
    /// `needle` must already be lowercased.
    pub fn matches(&self, needle: &str) -> bool {
        self.text.to_lowercase().contains(needle) || self.id.to_lowercase().contains(needle)
    }
}

/// A variable descriptor in table metadata. Everything past `code`/`text`
/// (values, valueTexts, elimination, time, ...) is passed through as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variable {
    #[serde(default)]
    pub code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableMetadata {
    #[serde(default)]
    pub title: String,
    /// Opaque date string, never parsed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated: Option<String>,
    #[serde(default)]
    pub variables: Vec<Variable>,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    #[serde(default)]
    pub code: String,
    pub text: String,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataRow {
    #[serde(default)]
    pub key: Vec<String>,
    #[serde(default)]
    pub values: Vec<String>,
    #[serde(flatten)]
    pub extra: Extra,
}

/// Raw result of a data query. Column order defines the positional meaning
/// of every row's `key`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableData {
    pub columns: Vec<Column>,
    pub data: Vec<DataRow>,
    #[serde(flatten)]
    pub extra: Extra,
}

/// Outbound query body. Opaque: never inspected beyond emptiness.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuerySpec(pub Value);

impl QuerySpec {
    /// Empty selection, i.e. every value of every variable, as JSON.
    pub fn select_all() -> Self {
        QuerySpec(serde_json::json!({
            "query": [],
            "response": { "format": "json" }
        }))
    }

    /// `null`, `{}`, `[]` and `""` carry no selection and count as absent.
    pub fn is_empty(&self) -> bool {
        match &self.0 {
            Value::Null => true,
            Value::Object(m) => m.is_empty(),
            Value::Array(a) => a.is_empty(),
            Value::String(s) => s.is_empty(),
            _ => false,
        }
    }
}

impl Default for QuerySpec {
    fn default() -> Self {
        Self::select_all()
    }
}
