use regex::Regex;
use scraper::{ElementRef, Html, Node, Selector};
use std::sync::OnceLock;

const BLOCK_TAGS: [&str; 12] = [
    "br", "p", "div", "li", "tr", "td", "h1", "h2", "h3", "h4", "h5", "h6",
];
const SKIPPED_TEXT_PARENTS: [&str; 2] = ["script", "style"];

fn horizontal_ws_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[ \t]+").expect("invalid horizontal ws regex"))
}

fn ws_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s+").expect("invalid ws regex"))
}

fn tr_selector() -> &'static Selector {
    static SEL: OnceLock<Selector> = OnceLock::new();
    SEL.get_or_init(|| Selector::parse("tr").expect("invalid tr selector"))
}

fn trim_text(s: &str) -> String {
    ws_re().replace_all(s.trim(), " ").trim().to_string()
}

/// Linearizes HTML into plain text.
///
/// Block-level tags (`br p div li tr td h1-h6`) start a new line, text runs
/// are trimmed and appended as-is, runs of spaces/tabs collapse to one space
/// and entities are unescaped. Text with no markup comes back unchanged.
pub fn flatten_html(html: &str) -> String {
    let doc = Html::parse_document(html);
    let mut out = String::with_capacity(html.len() / 2);
    for node in doc.tree.root().descendants() {
        match node.value() {
            Node::Element(el) => {
                if BLOCK_TAGS.contains(&el.name()) {
                    out.push('\n');
                }
            }
            Node::Text(text) => {
                let skipped = node
                    .parent()
                    .and_then(|p| p.value().as_element())
                    .map(|el| SKIPPED_TEXT_PARENTS.contains(&el.name()))
                    .unwrap_or(false);
                if skipped {
                    continue;
                }
                let trimmed = text.trim();
                if !trimmed.is_empty() {
                    out.push_str(trimmed);
                }
            }
            _ => {}
        }
    }

    let out = out.replace("\r\n", "\n");
    let out = horizontal_ws_re().replace_all(&out, " ");
    html_escape::decode_html_entities(&out).trim().to_string()
}

/// Every `<tr>` rendered as the texts of its direct `td`/`th` cells.
pub fn table_rows(html: &str) -> Vec<Vec<String>> {
    let doc = Html::parse_document(html);
    let mut rows = Vec::new();
    for tr in doc.select(tr_selector()) {
        let row = tr
            .children()
            .filter_map(ElementRef::wrap)
            .filter(|cell| {
                let name = cell.value().name();
                name.eq_ignore_ascii_case("td") || name.eq_ignore_ascii_case("th")
            })
            .map(|cell| trim_text(&cell.text().collect::<Vec<_>>().join(" ")))
            .collect::<Vec<_>>();
        if row.iter().any(|c| !c.is_empty()) {
            rows.push(row);
        }
    }
    rows
}

/// The cell right after the first cell reading exactly `label`.
pub fn cell_after_label<'a>(rows: &'a [Vec<String>], label: &str) -> Option<&'a str> {
    rows.iter().find_map(|row| {
        let idx = row.iter().position(|cell| cell == label)?;
        row.get(idx + 1).map(String::as_str)
    })
}
