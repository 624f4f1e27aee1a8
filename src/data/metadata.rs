//! Sample metadata (observation covariates) keyed by sample id.

use crate::error::{MofaError, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Tokens treated as a missing cell when reading delimited files.
pub(crate) const MISSING_TOKENS: [&str; 5] = ["", "NA", "na", "NaN", "nan"];

pub(crate) fn is_missing_token(raw: &str) -> bool {
    MISSING_TOKENS.contains(&raw)
}

/// A covariate value: categorical, continuous, or missing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Variable {
    /// Categorical variable with string levels.
    Categorical(String),
    /// Continuous numeric variable.
    Continuous(f64),
    /// Missing value.
    Missing,
}

impl Variable {
    /// Check if this is a missing value.
    pub fn is_missing(&self) -> bool {
        matches!(self, Variable::Missing)
    }

    /// Try to get as categorical string.
    pub fn as_categorical(&self) -> Option<&str> {
        match self {
            Variable::Categorical(s) => Some(s),
            _ => None,
        }
    }

    /// Try to get as continuous f64.
    pub fn as_continuous(&self) -> Option<f64> {
        match self {
            Variable::Continuous(v) => Some(*v),
            _ => None,
        }
    }

    /// Render the value as a delimited-file field. Missing values render empty.
    pub fn to_field(&self) -> String {
        match self {
            Variable::Categorical(s) => s.clone(),
            Variable::Continuous(v) => v.to_string(),
            Variable::Missing => String::new(),
        }
    }
}

/// Type hint for columns when loading metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VariableType {
    Categorical,
    Continuous,
}

/// Per-sample covariates, one row per sample id.
#[derive(Debug, Clone)]
pub struct SampleMetadata {
    /// Sample IDs in order.
    sample_ids: Vec<String>,
    /// Column names, excluding the key column.
    column_names: Vec<String>,
    /// Data stored as sample_id -> column_name -> Variable.
    data: HashMap<String, HashMap<String, Variable>>,
    /// Type hints for each column.
    column_types: HashMap<String, VariableType>,
}

impl SampleMetadata {
    /// Create empty metadata.
    pub fn new() -> Self {
        Self {
            sample_ids: Vec::new(),
            column_names: Vec::new(),
            data: HashMap::new(),
            column_types: HashMap::new(),
        }
    }

    /// Create empty metadata with the given typed columns.
    pub fn with_columns(columns: &[(&str, VariableType)]) -> Self {
        let mut meta = Self::new();
        for (name, var_type) in columns {
            meta.column_names.push(name.to_string());
            meta.column_types.insert(name.to_string(), *var_type);
        }
        meta
    }

    /// Load metadata from a tab-delimited file keyed by `key_column`.
    ///
    /// The key column may sit anywhere in the header. Every other column
    /// becomes a covariate; columns are inferred as continuous if all
    /// non-missing values parse as numbers, otherwise categorical.
    pub fn from_tsv<P: AsRef<Path>>(path: P, key_column: &str) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(MofaError::MissingInput(path.to_path_buf()));
        }
        let file = File::open(path)?;
        Self::from_reader(file, b'\t', key_column)
    }

    /// Load metadata from any delimited reader.
    pub fn from_reader<R: Read>(reader: R, delimiter: u8, key_column: &str) -> Result<Self> {
        let mut rdr = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .flexible(true)
            .from_reader(reader);

        let header: Vec<String> = rdr.headers()?.iter().map(|s| s.trim().to_string()).collect();
        let key_idx = header
            .iter()
            .position(|h| h == key_column)
            .ok_or_else(|| MofaError::MissingColumn(key_column.to_string()))?;
        let value_cols: Vec<(usize, String)> = header
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != key_idx)
            .map(|(i, h)| (i, h.clone()))
            .collect();

        // First pass: collect raw values so column types can be inferred
        let mut raw_data: Vec<(String, Vec<String>)> = Vec::new();
        for record in rdr.records() {
            let record = record?;
            let sample_id = match record.get(key_idx) {
                Some(id) if !id.trim().is_empty() => id.trim().to_string(),
                _ => continue,
            };
            let values = value_cols
                .iter()
                .map(|(i, _)| record.get(*i).unwrap_or("").trim().to_string())
                .collect();
            raw_data.push((sample_id, values));
        }

        if raw_data.is_empty() {
            return Err(MofaError::EmptyData("No samples in metadata".to_string()));
        }

        let mut meta = Self::new();
        for (col_idx, (_, col_name)) in value_cols.iter().enumerate() {
            let all_numeric = raw_data.iter().all(|(_, values)| {
                let v = values[col_idx].as_str();
                is_missing_token(v) || v.parse::<f64>().is_ok()
            });
            let var_type = if all_numeric {
                VariableType::Continuous
            } else {
                VariableType::Categorical
            };
            meta.column_names.push(col_name.clone());
            meta.column_types.insert(col_name.clone(), var_type);
        }

        for (sample_id, values) in raw_data {
            let row: Vec<(String, Variable)> = meta
                .column_names
                .iter()
                .zip(values)
                .map(|(col, raw)| {
                    let var = parse_variable(&raw, meta.column_types[col]);
                    (col.clone(), var)
                })
                .collect();
            meta.push_sample(&sample_id, row)?;
        }

        Ok(meta)
    }

    /// Append one sample row. Columns not mentioned are recorded as missing.
    pub fn push_sample(&mut self, sample_id: &str, values: Vec<(String, Variable)>) -> Result<()> {
        if self.data.contains_key(sample_id) {
            return Err(MofaError::DuplicateId {
                kind: "sample".to_string(),
                id: sample_id.to_string(),
            });
        }
        let mut row: HashMap<String, Variable> = HashMap::new();
        for (col, var) in values {
            if !self.has_column(&col) {
                return Err(MofaError::MissingColumn(col));
            }
            row.insert(col, var);
        }
        for col in &self.column_names {
            row.entry(col.clone()).or_insert(Variable::Missing);
        }
        self.sample_ids.push(sample_id.to_string());
        self.data.insert(sample_id.to_string(), row);
        Ok(())
    }

    /// Left-join this table onto an index of sample ids.
    ///
    /// Every id in `sample_ids` appears in the result, in that order.
    /// Ids without a metadata row get missing values in every column;
    /// metadata rows whose id is not in the index are dropped.
    pub fn left_join(&self, sample_ids: &[String]) -> Self {
        let mut data = HashMap::new();
        for sid in sample_ids {
            let row = self.data.get(sid).cloned().unwrap_or_else(|| {
                self.column_names
                    .iter()
                    .map(|c| (c.clone(), Variable::Missing))
                    .collect()
            });
            data.insert(sid.clone(), row);
        }
        Self {
            sample_ids: sample_ids.to_vec(),
            column_names: self.column_names.clone(),
            data,
            column_types: self.column_types.clone(),
        }
    }

    /// Write the table as tab-delimited text with the key column first.
    pub fn to_tsv<P: AsRef<Path>>(&self, path: P, key_column: &str) -> Result<()> {
        let mut wtr = csv::WriterBuilder::new()
            .delimiter(b'\t')
            .from_path(path)?;
        let mut header = vec![key_column.to_string()];
        header.extend(self.column_names.iter().cloned());
        wtr.write_record(&header)?;
        for sid in &self.sample_ids {
            let mut record = vec![sid.clone()];
            for col in &self.column_names {
                let field = self
                    .get(sid, col)
                    .map(Variable::to_field)
                    .unwrap_or_default();
                record.push(field);
            }
            wtr.write_record(&record)?;
        }
        wtr.flush()?;
        Ok(())
    }

    /// Sample IDs in order.
    pub fn sample_ids(&self) -> &[String] {
        &self.sample_ids
    }

    /// Column names.
    pub fn column_names(&self) -> &[String] {
        &self.column_names
    }

    /// Number of samples.
    pub fn n_samples(&self) -> usize {
        self.sample_ids.len()
    }

    /// Number of columns (variables).
    pub fn n_columns(&self) -> usize {
        self.column_names.len()
    }

    /// Get a variable value for a specific sample and column.
    pub fn get(&self, sample_id: &str, column: &str) -> Option<&Variable> {
        self.data.get(sample_id).and_then(|m| m.get(column))
    }

    /// Get all values for a column, in sample order.
    pub fn column(&self, column: &str) -> Result<Vec<&Variable>> {
        if !self.has_column(column) {
            return Err(MofaError::MissingColumn(column.to_string()));
        }
        Ok(self
            .sample_ids
            .iter()
            .map(|sid| {
                self.data
                    .get(sid)
                    .and_then(|m| m.get(column))
                    .unwrap_or(&Variable::Missing)
            })
            .collect())
    }

    /// Get the type of a column.
    pub fn column_type(&self, column: &str) -> Option<VariableType> {
        self.column_types.get(column).copied()
    }

    /// Get sorted unique levels for a categorical column.
    pub fn levels(&self, column: &str) -> Result<Vec<String>> {
        let values = self.column(column)?;
        Ok(values
            .iter()
            .filter_map(|v| v.as_categorical().map(String::from))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect())
    }

    /// Check if a sample exists.
    pub fn has_sample(&self, sample_id: &str) -> bool {
        self.data.contains_key(sample_id)
    }

    /// Check if a column exists.
    pub fn has_column(&self, column: &str) -> bool {
        self.column_names.iter().any(|c| c == column)
    }
}

impl Default for SampleMetadata {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_variable(raw: &str, var_type: VariableType) -> Variable {
    let raw = raw.trim();
    if is_missing_token(raw) {
        return Variable::Missing;
    }
    match var_type {
        VariableType::Continuous => raw
            .parse::<f64>()
            .map(Variable::Continuous)
            .unwrap_or(Variable::Missing),
        VariableType::Categorical => Variable::Categorical(raw.to_string()),
    }
}
