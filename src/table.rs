/// Label of the base currency column produced by extraction.
pub const USD_COLUMN: &str = "MC_USD_Billion";

/// One ranked bank: its name plus one nullable value per value column.
#[derive(Clone, Debug, PartialEq)]
pub struct BankRecord {
    pub name: String,
    pub values: Vec<Option<f64>>,
}

/// In-memory table flowing between pipeline stages.
///
/// `values` of every record line up with `value_columns`.
#[derive(Clone, Debug, PartialEq)]
pub struct BankTable {
    pub name_column: String,
    pub value_columns: Vec<String>,
    pub records: Vec<BankRecord>,
}

impl BankTable {
    pub fn new(name_column: impl Into<String>, value_column: impl Into<String>) -> Self {
        Self {
            name_column: name_column.into(),
            value_columns: vec![value_column.into()],
            records: Vec::new(),
        }
    }

    /// Append a row carrying a value for the first value column only.
    /// Later columns are padded with `None`.
    pub fn push(&mut self, name: impl Into<String>, value: Option<f64>) {
        let mut values = vec![None; self.value_columns.len()];
        if let Some(first) = values.first_mut() {
            *first = value;
        }
        self.records.push(BankRecord {
            name: name.into(),
            values,
        });
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// All column labels, name column first.
    pub fn column_names(&self) -> Vec<&str> {
        std::iter::once(self.name_column.as_str())
            .chain(self.value_columns.iter().map(String::as_str))
            .collect()
    }

    pub fn column_index(&self, column: &str) -> Option<usize> {
        self.value_columns.iter().position(|c| c == column)
    }

    /// Values of one value column, in row order.
    pub fn column(&self, column: &str) -> Option<Vec<Option<f64>>> {
        let idx = self.column_index(column)?;
        Some(self.records.iter().map(|r| r.values[idx]).collect())
    }

    /// Set (or add) a value column. Existing columns are overwritten in place.
    ///
    /// Panics if `values` does not have one entry per record.
    pub fn set_column(&mut self, column: &str, values: Vec<Option<f64>>) {
        assert_eq!(values.len(), self.records.len(), "column length mismatch");
        match self.column_index(column) {
            Some(idx) => {
                for (record, v) in self.records.iter_mut().zip(values) {
                    record.values[idx] = v;
                }
            }
            None => {
                self.value_columns.push(column.to_string());
                for (record, v) in self.records.iter_mut().zip(values) {
                    record.values.push(v);
                }
            }
        }
    }
}
