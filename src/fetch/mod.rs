// src/fetch/mod.rs

use anyhow::{anyhow, bail, Context, Result};
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};
use tracing::debug;
use url::Url;

use crate::progress::ProgressLog;
use crate::table::BankTable;

/// Download `source_url` and parse the first `table.<table_class>` into a
/// two-column [`BankTable`].
pub async fn extract(
    client: &Client,
    source_url: &str,
    table_class: &str,
    column_names: &[String],
    log: &ProgressLog,
) -> Result<BankTable> {
    let url = Url::parse(source_url).with_context(|| format!("parsing source URL {}", source_url))?;

    let html = client
        .get(url.clone())
        .send()
        .await
        .with_context(|| format!("GET {}", url))?
        .error_for_status()?
        .text()
        .await
        .with_context(|| format!("reading body from {}", url))?;
    debug!(bytes = html.len(), "fetched {}", url);

    let table = parse_bank_table(&html, table_class, column_names)?;

    log.log("Data extraction complete");
    Ok(table)
}

/// Parse the ranked bank table out of an HTML document.
///
/// The first `<tr>` is the header. Every later row with at least three `<td>`
/// cells yields one record: cell 2 is the name, cell 3 the USD value with
/// thousands separators removed. Unparseable values become `None`.
pub fn parse_bank_table(html: &str, table_class: &str, column_names: &[String]) -> Result<BankTable> {
    let [name_col, value_col] = column_names else {
        bail!(
            "expected exactly 2 column names, got {}",
            column_names.len()
        );
    };

    let table_sel = Selector::parse(&format!("table.{}", table_class))
        .map_err(|e| anyhow!("invalid table class {:?}: {:?}", table_class, e))?;
    let row_sel = Selector::parse("tr").expect("selector should parse");
    let cell_sel = Selector::parse("td").expect("selector should parse");

    let document = Html::parse_document(html);
    let table = document
        .select(&table_sel)
        .next()
        .ok_or_else(|| anyhow!("no <table class=\"{}\"> found in page", table_class))?;

    let mut out = BankTable::new(name_col.as_str(), value_col.as_str());
    for row in table.select(&row_sel).skip(1) {
        let cells: Vec<ElementRef> = row.select(&cell_sel).collect();
        if cells.len() < 3 {
            continue;
        }
        let name = cell_text(&cells[1]);
        let value = parse_amount(&cell_text(&cells[2]));
        out.push(name, value);
    }

    debug!(rows = out.len(), "parsed bank table");
    Ok(out)
}

fn cell_text(cell: &ElementRef) -> String {
    cell.text().collect::<String>().trim().to_string()
}

/// `"1,234.5"` → `Some(1234.5)`; anything non-numeric or non-finite → `None`.
pub fn parse_amount(raw: &str) -> Option<f64> {
    raw.trim()
        .replace(',', "")
        .parse::<f64>()
        .ok()
        .filter(|x| x.is_finite())
}
