use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::{collections::HashMap, fs::File, path::Path};
use tracing::warn;

use crate::progress::ProgressLog;
use crate::table::{BankTable, USD_COLUMN};

/// Currencies derived from the USD column, in output column order.
pub const TARGET_CURRENCIES: [&str; 3] = ["GBP", "EUR", "INR"];

#[derive(Debug, Deserialize)]
struct RateRow {
    #[serde(rename = "Currency")]
    currency: String,
    #[serde(rename = "Rate")]
    rate: f64,
}

/// Currency code → multiplier against USD.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ExchangeRates {
    rates: HashMap<String, f64>,
}

impl ExchangeRates {
    /// Load a `Currency,Rate` CSV. Missing headers, duplicate codes and
    /// non-positive rates are rejected.
    pub fn from_csv_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
        let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(file);

        let headers = reader
            .headers()
            .with_context(|| format!("reading header of {}", path.display()))?;
        for required in ["Currency", "Rate"] {
            if !headers.iter().any(|h| h == required) {
                bail!("{} has no {} column", path.display(), required);
            }
        }

        let mut rates = HashMap::new();
        for row in reader.deserialize::<RateRow>() {
            let row = row.with_context(|| format!("reading rates from {}", path.display()))?;
            if !row.rate.is_finite() || row.rate <= 0.0 {
                bail!("rate for {} must be positive, got {}", row.currency, row.rate);
            }
            if rates.insert(row.currency.clone(), row.rate).is_some() {
                bail!("duplicate currency {} in {}", row.currency, path.display());
            }
        }
        Ok(Self { rates })
    }

    pub fn get(&self, currency: &str) -> Option<f64> {
        self.rates.get(currency).copied()
    }

    /// Rate for `currency`, falling back to 1.0 when the reference lacks it.
    pub fn rate(&self, currency: &str) -> f64 {
        self.get(currency).unwrap_or_else(|| {
            warn!(currency, "no exchange rate found; using 1.0");
            1.0
        })
    }
}

impl FromIterator<(String, f64)> for ExchangeRates {
    fn from_iter<I: IntoIterator<Item = (String, f64)>>(iter: I) -> Self {
        Self {
            rates: iter.into_iter().collect(),
        }
    }
}

/// Round to 2 decimals, ties to even.
pub fn round2(x: f64) -> f64 {
    (x * 100.0).round_ties_even() / 100.0
}

pub fn converted_column(currency: &str) -> String {
    format!("MC_{}_Billion", currency)
}

/// Add one `MC_<CUR>_Billion` column per target currency.
///
/// If the rates file cannot be loaded the error is logged and `table` comes
/// back untouched.
pub fn transform(table: BankTable, rates_source: impl AsRef<Path>, log: &ProgressLog) -> BankTable {
    let rates = match ExchangeRates::from_csv_path(rates_source.as_ref()) {
        Ok(r) => r,
        Err(e) => {
            log.log(&format!("Error reading exchange rates: {:#}", e));
            return table;
        }
    };

    let table = apply_rates(table, &rates);
    log.log("Data transformation complete");
    table
}

/// Derive the target currency columns from the USD column. Tables without a
/// USD column are returned as-is. Re-applying overwrites the same columns.
pub fn apply_rates(mut table: BankTable, rates: &ExchangeRates) -> BankTable {
    let Some(usd) = table.column(USD_COLUMN) else {
        return table;
    };

    for currency in TARGET_CURRENCIES {
        let rate = rates.rate(currency);
        let values = usd.iter().map(|v| v.map(|x| round2(x * rate))).collect();
        table.set_column(&converted_column(currency), values);
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn fixture() -> BankTable {
        let mut t = BankTable::new("Name", USD_COLUMN);
        t.push("BankA", Some(100.0));
        t.push("BankB", crate::fetch::parse_amount("not-a-number"));
        t
    }

    fn write_rates(dir: &Path, content: &str) -> std::path::PathBuf {
        let path = dir.join("exchange_rate.csv");
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_converts_fixture() {
        let tmp = tempdir().unwrap();
        let rates = write_rates(tmp.path(), "Currency,Rate\nGBP,0.8\nEUR,0.9\nINR,80\n");
        let log = ProgressLog::new(tmp.path().join("log.txt"));

        let out = transform(fixture(), &rates, &log);

        assert_eq!(
            out.column_names(),
            vec![
                "Name",
                "MC_USD_Billion",
                "MC_GBP_Billion",
                "MC_EUR_Billion",
                "MC_INR_Billion"
            ]
        );
        assert_eq!(
            out.records[0].values,
            vec![Some(100.0), Some(80.0), Some(90.0), Some(8000.0)]
        );
        assert_eq!(out.records[1].name, "BankB");
        assert_eq!(out.records[1].values, vec![None; 4]);

        let logged = fs::read_to_string(tmp.path().join("log.txt")).unwrap();
        assert!(logged.contains("Data transformation complete"));
    }

    #[test]
    fn test_missing_rates_file_returns_input() {
        let tmp = tempdir().unwrap();
        let log = ProgressLog::new(tmp.path().join("log.txt"));

        let out = transform(fixture(), tmp.path().join("absent.csv"), &log);

        assert_eq!(out, fixture());
        let logged = fs::read_to_string(tmp.path().join("log.txt")).unwrap();
        assert!(logged.contains("Error reading exchange rates"));
        assert!(!logged.contains("Data transformation complete"));
    }

    #[test]
    fn test_malformed_rates_file_returns_input() {
        let tmp = tempdir().unwrap();
        let log = ProgressLog::new(tmp.path().join("log.txt"));
        for content in [
            "",
            "Code,Value\n",
            "Currency\n",
            "Code,Value\nGBP,0.8\n",
            "Currency,Rate\nGBP,abc\n",
            "Currency,Rate\nGBP,-1\n",
            "Currency,Rate\nGBP,0.8\nGBP,0.9\n",
        ] {
            let rates = write_rates(tmp.path(), content);
            assert_eq!(transform(fixture(), &rates, &log), fixture(), "{}", content);
        }
    }

    #[test]
    fn test_transform_is_idempotent() {
        let tmp = tempdir().unwrap();
        let rates = write_rates(tmp.path(), "Currency,Rate\nGBP,0.8\nEUR,0.93\nINR,82.95\n");
        let log = ProgressLog::new(tmp.path().join("log.txt"));

        let once = transform(fixture(), &rates, &log);
        let twice = transform(once.clone(), &rates, &log);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_missing_currency_uses_unit_rate() {
        let rates: ExchangeRates = [("GBP".to_string(), 0.5)].into_iter().collect();
        let out = apply_rates(fixture(), &rates);
        assert_eq!(out.column("MC_GBP_Billion").unwrap()[0], Some(50.0));
        assert_eq!(out.column("MC_EUR_Billion").unwrap()[0], Some(100.0));
        assert_eq!(out.column("MC_INR_Billion").unwrap()[0], Some(100.0));
    }

    #[test]
    fn test_without_usd_column_is_noop() {
        let mut t = BankTable::new("Name", "Other");
        t.push("BankA", Some(1.0));
        let rates: ExchangeRates = [("GBP".to_string(), 0.5)].into_iter().collect();
        assert_eq!(apply_rates(t.clone(), &rates), t);
    }

    #[test]
    fn test_round2() {
        assert_eq!(round2(432.92 * 0.8), 346.34);
        assert_eq!(round2(1.005 * 1000.0), 1005.0);
        assert_eq!(round2(2.345678), 2.35);
        assert_eq!(round2(0.125), 0.12);
        assert_eq!(round2(0.375), 0.38);
        assert_eq!(round2(-0.125), -0.12);
    }
}
