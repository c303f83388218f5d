use anyhow::{bail, Context, Result};
use duckdb::{Connection, ToSql};
use regex::Regex;
use std::{fs, path::Path};
use tracing::debug;

use crate::progress::ProgressLog;
use crate::table::BankTable;

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating directory {}", parent.display()))?;
    }
    Ok(())
}

/// `100.0`, `1234.5`; empty for null.
fn format_value(v: Option<f64>) -> String {
    v.map(|x| format!("{:?}", x)).unwrap_or_default()
}

/// Write `table` as CSV to `path`, replacing any existing file.
/// The first column is an unnamed 0-based row index.
pub fn save_csv(table: &BankTable, path: impl AsRef<Path>, log: &ProgressLog) -> Result<()> {
    let path = path.as_ref();
    log.log("Data saved to CSV file");

    ensure_parent(path)?;
    let mut writer =
        csv::Writer::from_path(path).with_context(|| format!("creating {}", path.display()))?;

    let mut header = vec![""];
    header.extend(table.column_names());
    writer.write_record(&header)?;

    for (i, record) in table.records.iter().enumerate() {
        let mut row = Vec::with_capacity(record.values.len() + 2);
        row.push(i.to_string());
        row.push(record.name.clone());
        row.extend(record.values.iter().copied().map(format_value));
        writer.write_record(&row)?;
    }
    writer
        .flush()
        .with_context(|| format!("flushing {}", path.display()))?;
    Ok(())
}

/// Open (or create) the DuckDB file at `path`.
pub fn open_db(path: impl AsRef<Path>) -> Result<Connection> {
    let path = path.as_ref();
    ensure_parent(path)?;
    Connection::open(path).with_context(|| format!("opening database {}", path.display()))
}

fn check_identifier(name: &str) -> Result<()> {
    let re = Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("identifier regex should parse");
    if !re.is_match(name) {
        bail!("invalid table name {:?}", name);
    }
    Ok(())
}

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Replace `table_name` with the contents of `table`.
pub fn save_table(
    table: &BankTable,
    conn: &Connection,
    table_name: &str,
    log: &ProgressLog,
) -> Result<()> {
    log.log("Data loaded to Database as a table");
    check_identifier(table_name)?;

    let columns = std::iter::once(format!("{} VARCHAR", quote_ident(&table.name_column)))
        .chain(
            table
                .value_columns
                .iter()
                .map(|c| format!("{} DOUBLE", quote_ident(c))),
        )
        .collect::<Vec<_>>()
        .join(", ");
    conn.execute_batch(&format!(
        "CREATE OR REPLACE TABLE {} ({});",
        quote_ident(table_name),
        columns
    ))
    .with_context(|| format!("creating table {}", table_name))?;

    let mut appender = conn
        .appender(table_name)
        .with_context(|| format!("opening appender on {}", table_name))?;
    for record in &table.records {
        let mut params: Vec<&dyn ToSql> = Vec::with_capacity(record.values.len() + 1);
        params.push(&record.name);
        for v in &record.values {
            params.push(v);
        }
        appender.append_row(params.as_slice())?;
    }
    appender.flush()?;

    debug!(rows = table.len(), "loaded {}", table_name);
    Ok(())
}
