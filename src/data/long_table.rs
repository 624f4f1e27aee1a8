//! Long-format multi-omics observations: one row per (sample, feature, view).

use crate::data::metadata::is_missing_token;
use crate::error::{MofaError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Columns every long-format table must provide.
pub const LONG_COLUMNS: [&str; 6] = ["sample", "feature", "view", "value", "time", "group"];

/// A single long-format observation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LongRecord {
    pub sample: String,
    pub feature: String,
    pub view: String,
    /// Measured value; NaN when the cell was missing in the source.
    pub value: f64,
    pub time: f64,
    pub group: String,
}

impl LongRecord {
    pub fn new(sample: &str, feature: &str, view: &str, value: f64, time: f64, group: &str) -> Self {
        Self {
            sample: sample.to_string(),
            feature: feature.to_string(),
            view: view.to_string(),
            value,
            time,
            group: group.to_string(),
        }
    }
}

/// A long-format observation table.
#[derive(Debug, Clone, Default)]
pub struct LongTable {
    records: Vec<LongRecord>,
}

impl LongTable {
    pub fn new(records: Vec<LongRecord>) -> Self {
        Self { records }
    }

    /// Load a comma-delimited long table.
    ///
    /// Columns are located by header name, so extra columns (such as a
    /// leading unnamed row index) are ignored.
    pub fn from_csv<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(MofaError::MissingInput(path.to_path_buf()));
        }
        Self::from_reader(File::open(path)?)
    }

    /// Load a long table from any comma-delimited reader.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut rdr = csv::ReaderBuilder::new().from_reader(reader);
        let header = rdr.headers()?.clone();

        let mut idx = [0usize; 6];
        for (slot, name) in idx.iter_mut().zip(LONG_COLUMNS) {
            *slot = header
                .iter()
                .position(|h| h.trim() == name)
                .ok_or_else(|| MofaError::MissingColumn(name.to_string()))?;
        }
        let [i_sample, i_feature, i_view, i_value, i_time, i_group] = idx;

        let mut records = Vec::new();
        for (row, record) in rdr.records().enumerate() {
            let record = record?;
            let field = |i: usize| record.get(i).unwrap_or("").trim();

            let value = parse_number(field(i_value), row, i_value)?;
            let time = parse_number(field(i_time), row, i_time)?;
            records.push(LongRecord {
                sample: field(i_sample).to_string(),
                feature: field(i_feature).to_string(),
                view: field(i_view).to_string(),
                value,
                time,
                group: field(i_group).to_string(),
            });
        }

        if records.is_empty() {
            return Err(MofaError::EmptyData("No rows in long table".to_string()));
        }
        Ok(Self { records })
    }

    /// Distinct view names in first-appearance order.
    pub fn views(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        self.records
            .iter()
            .filter(|r| seen.insert(r.view.as_str()))
            .map(|r| r.view.clone())
            .collect()
    }

    /// Records belonging to one view.
    pub fn view_records<'a>(&'a self, view: &'a str) -> impl Iterator<Item = &'a LongRecord> + 'a {
        self.records.iter().filter(move |r| r.view == view)
    }

    pub fn records(&self) -> &[LongRecord] {
        &self.records
    }

    pub fn iter(&self) -> impl Iterator<Item = &LongRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

fn parse_number(raw: &str, row: usize, col: usize) -> Result<f64> {
    if is_missing_token(raw) {
        return Ok(f64::NAN);
    }
    raw.parse::<f64>().map_err(|_| MofaError::InvalidValue {
        value: raw.to_string(),
        row,
        col,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const EVODEVO: &str = "\
,sample,feature,view,value,time,group
0,s1,f1,A,1.0,0,g1
1,s1,f2,B,2.0,0,g1
2,s2,f1,A,,1,g1
";

    #[test]
    fn test_read_ignores_index_column() {
        let table = LongTable::from_reader(EVODEVO.as_bytes()).unwrap();
        assert_eq!(table.len(), 3);
        assert_eq!(table.records()[0], LongRecord::new("s1", "f1", "A", 1.0, 0.0, "g1"));
        assert!(table.records()[2].value.is_nan());
    }

    #[test]
    fn test_views_first_appearance_order() {
        let csv = "sample,feature,view,value,time,group\n\
                   s1,f1,B,1,0,g\ns1,f2,A,1,0,g\ns2,f1,B,1,0,g\n";
        let table = LongTable::from_reader(csv.as_bytes()).unwrap();
        assert_eq!(table.views(), vec!["B", "A"]);
        assert_eq!(table.view_records("B").count(), 2);
    }

    #[test]
    fn test_missing_column() {
        let csv = "sample,feature,view,value,time\ns1,f1,A,1,0\n";
        let err = LongTable::from_reader(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, MofaError::MissingColumn(c) if c == "group"));
    }

    #[test]
    fn test_invalid_value() {
        let csv = "sample,feature,view,value,time,group\ns1,f1,A,high,0,g\n";
        let err = LongTable::from_reader(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, MofaError::InvalidValue { row: 0, col: 3, .. }));
    }
}
