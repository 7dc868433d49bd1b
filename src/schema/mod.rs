pub mod types;

pub use types::{
    Column, DataRow, EntryKind, Extra, QuerySpec, TableData, TableEntry, TableMetadata, Variable,
};
