// src/sample.rs

use chrono::Local;
use serde_json::json;

use crate::schema::TableData;

/// Shown on the index page instead of live data, when enabled, if the
/// featured table can't be fetched.
pub const SAMPLE_NOTE: &str =
    "Þetta eru sýnigögn sem notuð eru þegar ekki næst í raunverulega API þjónustu Hagstofunnar.";

/// Municipal population sample in the PX-Web data response shape.
pub fn population_sample() -> TableData {
    let rows = [
        ("Reykjavík", "139,875"),
        ("Kópavogur", "39,890"),
        ("Hafnarfjörður", "31,595"),
        ("Akureyri", "19,850"),
        ("Reykjanesbær", "19,676"),
        ("Garðabær", "17,295"),
        ("Mosfellsbær", "12,450"),
        ("Árborg", "9,856"),
        ("Akranes", "7,532"),
        ("Fjarðabyggð", "4,891"),
    ];
    let data: Vec<_> = rows
        .iter()
        .map(|(town, people)| json!({"key": [town, "Alls", "2024"], "values": [people]}))
        .collect();

    let raw = json!({
        "title": "Mannfjöldi eftir sveitarfélögum, kyni og ársfjórðungi 2010-2024",
        "updated": Local::now().format("%Y-%m-%d").to_string(),
        "columns": [
            {"code": "Sveitarfélag", "text": "Sveitarfélag"},
            {"code": "Kyn", "text": "Kyn"},
            {"code": "Ár", "text": "Ár"},
            {"code": "Mannfjöldi", "text": "Mannfjöldi"}
        ],
        "data": data,
        "note": SAMPLE_NOTE
    });
    serde_json::from_value(raw).expect("sample literal matches TableData")
}
