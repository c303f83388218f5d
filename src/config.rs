use std::path::PathBuf;

static SOURCE_URL: &str =
    "https://web.archive.org/web/20230908091635/https://en.wikipedia.org/wiki/List_of_largest_banks";

/// Everything the driver needs for one run.
#[derive(Clone, Debug)]
pub struct PipelineConfig {
    /// Page holding the ranked bank table.
    pub source_url: String,
    /// `Currency,Rate` reference file.
    pub rate_table_path: PathBuf,
    pub csv_output_path: PathBuf,
    pub db_path: PathBuf,
    pub table_name: String,
    /// Append-only progress log.
    pub log_path: PathBuf,
    /// CSS class marking the table to scrape.
    pub table_class: String,
    /// Labels for the name and USD value columns.
    pub column_names: [String; 2],
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            source_url: SOURCE_URL.to_string(),
            rate_table_path: PathBuf::from("./data/exchange_rate.csv"),
            csv_output_path: PathBuf::from("./data/Largest_banks_data.csv"),
            db_path: PathBuf::from("./data/Banks.duckdb"),
            table_name: "Largest_banks".to_string(),
            log_path: PathBuf::from("./logs/code_log.txt"),
            table_class: "wikitable".to_string(),
            column_names: ["Name".to_string(), "MC_USD_Billion".to_string()],
        }
    }
}
