// src/server/page.rs

use std::fmt::Write;

use super::Preview;
use crate::sample::SAMPLE_NOTE;
use crate::schema::TableEntry;

const STYLE: &str = "body{font-family:sans-serif;margin:2rem;color:#222}\
table{border-collapse:collapse}td,th{border:1px solid #ccc;padding:.3rem .6rem}\
th{background:#f0f0f0}.note{color:#a60}";

pub fn render_index(entries: &[TableEntry], preview: Option<&Preview>) -> String {
    let mut html = String::with_capacity(4096);
    html.push_str("<!DOCTYPE html>\n<html lang=\"is\">\n<head>\n<meta charset=\"utf-8\">\n");
    html.push_str("<title>Hagstofa Íslands - tölfræði</title>\n");
    let _ = writeln!(html, "<style>{}</style>\n</head>\n<body>", STYLE);
    html.push_str("<h1>Hagstofa Íslands</h1>\n");

    html.push_str("<section>\n");
    match preview {
        Some(preview) => render_preview(&mut html, preview),
        None => html.push_str("<p class=\"note\">Gögn eru ekki aðgengileg í augnablikinu.</p>\n"),
    }
    html.push_str("</section>\n");

    html.push_str("<section>\n<h2>Efnisflokkar</h2>\n");
    if entries.is_empty() {
        html.push_str("<p class=\"note\">Enginn efnisflokkur fannst.</p>\n");
    } else {
        html.push_str("<ul>\n");
        for entry in entries {
            let label = html_escape(&entry.text);
            if entry.is_table() {
                let _ = writeln!(
                    html,
                    "<li>{}: <a href=\"/api/table/{}\">{}</a></li>",
                    entry.kind.label(),
                    html_escape(&entry.id),
                    label
                );
            } else {
                let _ = writeln!(html, "<li>{}: {}</li>", entry.kind.label(), label);
            }
        }
        html.push_str("</ul>\n");
    }
    html.push_str("</section>\n</body>\n</html>\n");
    html
}

fn render_preview(html: &mut String, preview: &Preview) {
    if let Some(title) = &preview.title {
        let _ = writeln!(html, "<h2>{}</h2>", html_escape(title));
    }
    if preview.sample {
        let _ = writeln!(html, "<p class=\"note\">{}</p>", html_escape(SAMPLE_NOTE));
    }
    let Some(first) = preview.rows.first() else {
        html.push_str("<p>Engar raðir.</p>\n");
        return;
    };

    html.push_str("<table>\n<tr>");
    for label in first.keys() {
        let _ = write!(html, "<th>{}</th>", html_escape(label));
    }
    html.push_str("</tr>\n");
    for row in &preview.rows {
        html.push_str("<tr>");
        for label in first.keys() {
            let cell = row.get(label).map(String::as_str).unwrap_or("");
            let _ = write!(html, "<td>{}</td>", html_escape(cell));
        }
        html.push_str("</tr>\n");
    }
    html.push_str("</table>\n");
}

fn html_escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
