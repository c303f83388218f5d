use anyhow::{Context, Result};
use duckdb::arrow::record_batch::RecordBatch;
use duckdb::arrow::util::pretty::pretty_format_batches;
use duckdb::Connection;

use crate::progress::ProgressLog;

/// Execute `sql` and collect the result as Arrow batches.
///
/// An empty result still yields one zero-row batch carrying the schema.
pub fn query_batches(sql: &str, conn: &Connection) -> Result<Vec<RecordBatch>> {
    let mut stmt = conn
        .prepare(sql)
        .with_context(|| format!("preparing {}", sql))?;
    let rows = stmt
        .query_arrow([])
        .with_context(|| format!("executing {}", sql))?;
    let schema = rows.get_schema();
    let mut batches: Vec<RecordBatch> = rows.collect();
    if batches.is_empty() {
        batches.push(RecordBatch::new_empty(schema));
    }
    Ok(batches)
}

/// Print `sql`, run it verbatim, then print the result table.
///
/// Only for statements built by the driver; nothing here is parameterized.
pub fn run_query(sql: &str, conn: &Connection, log: &ProgressLog) -> Result<()> {
    log.log("Executing query");
    println!("{}", sql);
    let batches = query_batches(sql, conn)?;
    println!("{}", pretty_format_batches(&batches)?);
    Ok(())
}
