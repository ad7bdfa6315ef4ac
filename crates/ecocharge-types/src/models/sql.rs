//! Results from the admin SQL console.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Tabular result of an ad-hoc SQL statement.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct SqlResult {
    /// Column names, in the order cells appear in each row
    pub columns: Vec<String>,
    /// Row cells as raw JSON values
    pub rows: Vec<Vec<Value>>,
    /// Rows returned, or rows affected for statements without a result set
    pub row_count: u64,
}

impl SqlResult {
    /// Normalize the shapes the API returns for `/api/admin/sql`.
    ///
    /// Accepted: a bare array of row objects, `{"rows": [...]}` /
    /// `{"result": [...]}` / `{"data": [...]}` wrappers, or a write summary carrying
    /// `affectedRows`.
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Array(rows) => Self::from_rows(rows),
            Value::Object(mut map) => {
                let rows = ["rows", "result", "data"].iter().find_map(|key| map.remove(*key));
                if let Some(Value::Array(rows)) = rows {
                    return Self::from_rows(rows);
                }
                let affected = map
                    .get("affectedRows")
                    .or_else(|| map.get("rowCount"))
                    .and_then(Value::as_u64)
                    .unwrap_or(0);
                Self { columns: Vec::new(), rows: Vec::new(), row_count: affected }
            },
            other => Self {
                columns: vec!["value".to_string()],
                rows: vec![vec![other]],
                row_count: 1,
            },
        }
    }

    fn from_rows(rows: Vec<Value>) -> Self {
        let mut columns: Vec<String> = Vec::new();
        for row in &rows {
            if let Value::Object(map) = row {
                for key in map.keys() {
                    if !columns.contains(key) {
                        columns.push(key.clone());
                    }
                }
            }
        }
        if columns.is_empty() && !rows.is_empty() {
            columns.push("value".to_string());
        }

        let row_count = rows.len() as u64;
        let rows = rows
            .into_iter()
            .map(|row| match row {
                Value::Object(map) => columns
                    .iter()
                    .map(|c| map.get(c).cloned().unwrap_or(Value::Null))
                    .collect(),
                other => vec![other],
            })
            .collect();

        Self { columns, rows, row_count }
    }

    /// Whether the statement produced a result set.
    pub fn has_rows(&self) -> bool {
        !self.columns.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_rows_from_array() {
        let result = SqlResult::from_value(json!([
            {"id": 1, "name": "A"},
            {"id": 2, "name": "B", "extra": true}
        ]));

        assert_eq!(result.row_count, 2);
        assert_eq!(result.columns.len(), 3);
        let extra_idx = result.columns.iter().position(|c| c == "extra");
        assert_eq!(extra_idx.map(|i| result.rows[0][i].clone()), Some(Value::Null));
    }

    #[test]
    fn test_write_summary() {
        let result = SqlResult::from_value(json!({"affectedRows": 4, "insertId": 0}));

        assert!(!result.has_rows());
        assert_eq!(result.row_count, 4);
    }

    #[test]
    fn test_wrapped_rows() {
        let result = SqlResult::from_value(json!({"rows": [{"n": 1}]}));
        assert_eq!(result.columns, vec!["n".to_string()]);
        assert_eq!(result.rows, vec![vec![json!(1)]]);
    }
}
