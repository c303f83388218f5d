use anyhow::{Context, Result};
use reqwest::Client;
use tracing::{debug, info};

use crate::config::PipelineConfig;
use crate::load::{open_db, save_csv, save_table};
use crate::progress::ProgressLog;
use crate::query::run_query;
use crate::table::BankTable;
use crate::{fetch, transform};

/// Where a run currently is. Transitions are strictly linear.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Stage {
    Init,
    Extracted,
    Transformed,
    CsvSaved,
    DbConnected,
    DbLoaded,
    Query1,
    Query2,
    Query3,
    Closed,
}

impl Stage {
    pub fn as_str(&self) -> &str {
        match self {
            Stage::Init => "Init",
            Stage::Extracted => "Extracted",
            Stage::Transformed => "Transformed",
            Stage::CsvSaved => "CsvSaved",
            Stage::DbConnected => "DbConnected",
            Stage::DbLoaded => "DbLoaded",
            Stage::Query1 => "Query1",
            Stage::Query2 => "Query2",
            Stage::Query3 => "Query3",
            Stage::Closed => "Closed",
        }
    }

    pub fn next(&self) -> Option<Stage> {
        use Stage::*;
        match self {
            Init => Some(Extracted),
            Extracted => Some(Transformed),
            Transformed => Some(CsvSaved),
            CsvSaved => Some(DbConnected),
            DbConnected => Some(DbLoaded),
            DbLoaded => Some(Query1),
            Query1 => Some(Query2),
            Query2 => Some(Query3),
            Query3 => Some(Closed),
            Closed => None,
        }
    }
}

fn advance(stage: &mut Stage) {
    if let Some(next) = stage.next() {
        debug!(from = stage.as_str(), to = next.as_str(), "stage");
        *stage = next;
    }
}

/// The three analytical queries, in execution order.
pub fn queries(table_name: &str) -> [String; 3] {
    [
        format!("SELECT * FROM {}", table_name),
        format!("SELECT AVG(MC_GBP_Billion) FROM {}", table_name),
        format!("SELECT Name FROM {} LIMIT 5", table_name),
    ]
}

/// Full run: scrape, convert, persist, query.
pub async fn run(config: &PipelineConfig) -> Result<()> {
    let log = ProgressLog::new(&config.log_path);
    log.log("Preliminaries complete. Initiating ETL process");

    let client = Client::new();
    let table = fetch::extract(
        &client,
        &config.source_url,
        &config.table_class,
        &config.column_names,
        &log,
    )
    .await
    .with_context(|| format!("extracting from {}", config.source_url))?;
    info!(rows = table.len(), "extracted");

    load_and_query(table, config, &log)?;
    Ok(())
}

/// Everything after extraction. Returns the stage reached, always
/// [`Stage::Closed`] on success.
pub fn load_and_query(table: BankTable, config: &PipelineConfig, log: &ProgressLog) -> Result<Stage> {
    let mut stage = Stage::Init;
    advance(&mut stage);

    log.log("Initiating Transformation process");
    let table = transform::transform(table, &config.rate_table_path, log);
    advance(&mut stage);

    log.log("Initiating Loading process");
    save_csv(&table, &config.csv_output_path, log)?;
    advance(&mut stage);

    log.log("SQL Connection initiated");
    let conn = open_db(&config.db_path)?;
    advance(&mut stage);

    save_table(&table, &conn, &config.table_name, log)?;
    advance(&mut stage);

    let labels = ["First query", "Second query", "Third query"];
    for (label, sql) in labels.into_iter().zip(queries(&config.table_name)) {
        log.log(label);
        run_query(&sql, &conn, log)?;
        advance(&mut stage);
    }

    log.log("Process Complete");
    conn.close()
        .map_err(|(_, e)| e)
        .with_context(|| format!("closing {}", config.db_path.display()))?;
    advance(&mut stage);

    info!(stage = stage.as_str(), "pipeline finished");
    Ok(stage)
}
