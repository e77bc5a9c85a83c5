//! Tabular container for candidate features.

use crate::error::{Error, Result};

/// Ordered column names plus rows of floating-point values. Every row holds
/// exactly one value per column.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureTable {
    columns: Vec<String>,
    rows: Vec<Vec<f64>>,
}

impl FeatureTable {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<f64>>) -> Result<Self> {
        if columns.is_empty() {
            return Err(Error::MalformedInput {
                reason: "table has no columns".to_string(),
            });
        }
        for (index, row) in rows.iter().enumerate() {
            if row.len() != columns.len() {
                return Err(Error::MalformedInput {
                    reason: format!(
                        "row {} has {} values, expected {}",
                        index,
                        row.len(),
                        columns.len()
                    ),
                });
            }
        }
        Ok(Self { columns, rows })
    }

    /// Parses CSV bytes with a header row into a table. Any structural or
    /// numeric defect is reported as malformed input.
    pub fn from_csv(bytes: &[u8]) -> Result<Self> {
        if bytes.is_empty() {
            return Err(Error::MalformedInput {
                reason: "empty upload".to_string(),
            });
        }

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(bytes);

        let headers = reader
            .headers()
            .map_err(|e| Error::MalformedInput {
                reason: format!("unreadable header: {}", e),
            })?
            .clone();
        let columns: Vec<String> = headers.iter().map(|h| h.to_string()).collect();
        if columns.iter().any(|c| c.is_empty()) {
            return Err(Error::MalformedInput {
                reason: "empty column name in header".to_string(),
            });
        }
        for (index, name) in columns.iter().enumerate() {
            if columns[..index].contains(name) {
                return Err(Error::MalformedInput {
                    reason: format!("duplicate column: {}", name),
                });
            }
        }

        let mut rows = Vec::new();
        for (index, record) in reader.records().enumerate() {
            let record = record.map_err(|e| Error::MalformedInput {
                reason: format!("row {}: {}", index, e),
            })?;
            let mut row = Vec::with_capacity(columns.len());
            for (name, field) in columns.iter().zip(record.iter()) {
                let value: f64 = field.parse().map_err(|_| Error::MalformedInput {
                    reason: format!("row {}, column {}: not a number: {:?}", index, name, field),
                })?;
                if !value.is_finite() {
                    return Err(Error::MalformedInput {
                        reason: format!("row {}, column {}: non-finite value", index, name),
                    });
                }
                row.push(value);
            }
            rows.push(row);
        }

        Self::new(columns, rows)
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<f64>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_preserves_order() {
        let csv = "orbital_period,planet_radius\n10.5,2.3\n3.2,1.1\n0.8,11.2\n";
        let table = FeatureTable::from_csv(csv.as_bytes()).unwrap();
        assert_eq!(table.columns(), &["orbital_period", "planet_radius"]);
        assert_eq!(table.len(), 3);
        assert_eq!(table.rows()[0], vec![10.5, 2.3]);
        assert_eq!(table.rows()[2], vec![0.8, 11.2]);
    }

    #[test]
    fn test_empty_upload_rejected() {
        let result = FeatureTable::from_csv(b"");
        assert!(matches!(result, Err(Error::MalformedInput { .. })));
    }

    #[test]
    fn test_header_only_gives_empty_table() {
        let table = FeatureTable::from_csv(b"a,b\n").unwrap();
        assert!(table.is_empty());
        assert_eq!(table.columns().len(), 2);
    }

    #[test]
    fn test_non_numeric_cell_names_position() {
        let result = FeatureTable::from_csv(b"a,b\n1.0,fast\n");
        match result {
            Err(Error::MalformedInput { reason }) => {
                assert!(reason.contains("row 0"));
                assert!(reason.contains("column b"));
            }
            other => panic!("expected MalformedInput, got {:?}", other),
        }
    }

    #[test]
    fn test_ragged_row_rejected() {
        let result = FeatureTable::from_csv(b"a,b\n1.0\n");
        assert!(matches!(result, Err(Error::MalformedInput { .. })));
    }

    #[test]
    fn test_duplicate_column_rejected() {
        let result = FeatureTable::from_csv(b"a,a\n1.0,2.0\n");
        match result {
            Err(Error::MalformedInput { reason }) => assert!(reason.contains("duplicate")),
            other => panic!("expected MalformedInput, got {:?}", other),
        }
    }

    #[test]
    fn test_width_invariant_enforced() {
        let result = FeatureTable::new(
            vec!["a".to_string(), "b".to_string()],
            vec![vec![1.0, 2.0], vec![3.0]],
        );
        assert!(matches!(result, Err(Error::MalformedInput { .. })));
    }
}
