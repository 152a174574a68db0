// src/extract/mod.rs

use crate::error::{Error, Result};
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, trace};

/// Header text plus the cell text of every data row, as read from the page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    /// Cell texts of the table's first row.
    pub headers: Vec<String>,
    /// Each following row, truncated to `headers.len()` cells.
    pub rows: Vec<Vec<String>>,
}

/// The styling marker that identifies a data table on the source pages.
pub const DATA_TABLE_SELECTOR: &str = "table.wikitable";

static TABLE_SEL: Lazy<Selector> =
    Lazy::new(|| Selector::parse(DATA_TABLE_SELECTOR).expect("table selector should parse"));
static ROW_SEL: Lazy<Selector> =
    Lazy::new(|| Selector::parse("tr").expect("row selector should parse"));
static CELL_SEL: Lazy<Selector> =
    Lazy::new(|| Selector::parse("th, td").expect("cell selector should parse"));

/// Pull the first data table out of `document`.
///
/// The first `<tr>` is the header row. A later row is kept only when it has at least as
/// many cells as there are headers; extra cells are dropped. Short rows (footers, spacer
/// rows) are skipped without complaint.
pub fn extract(document: &str) -> Result<RawTable> {
    let doc = Html::parse_document(document);
    let table = doc.select(&TABLE_SEL).next().ok_or_else(|| {
        Error::Extraction(format!("no element matching `{DATA_TABLE_SELECTOR}` in document"))
    })?;

    let mut rows = table.select(&ROW_SEL);
    let headers: Vec<String> = match rows.next() {
        Some(header_row) => cell_texts(header_row),
        None => return Err(Error::Extraction("data table has no rows".into())),
    };
    let width = headers.len();

    let mut out = RawTable {
        headers,
        rows: Vec::new(),
    };
    let mut skipped = 0usize;
    for row in rows {
        let mut cells = cell_texts(row);
        if cells.len() < width {
            trace!(cells = cells.len(), width, "skipping short row");
            skipped += 1;
            continue;
        }
        cells.truncate(width);
        out.rows.push(cells);
    }

    debug!(
        headers = ?out.headers,
        rows = out.rows.len(),
        skipped,
        "extracted table"
    );
    Ok(out)
}

fn cell_texts(row: ElementRef<'_>) -> Vec<String> {
    row.select(&CELL_SEL)
        .map(|cell| cell.text().collect::<String>().trim().to_string())
        .collect()
}
