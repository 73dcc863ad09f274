use rusqlite::types::Value as SqlValue;

use crate::error::{DashError, DashResult};

/// Tabular result of one query: named columns and ordered rows.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultSet {
    columns: Vec<String>,
    rows: Vec<Vec<SqlValue>>,
}

impl ResultSet {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<SqlValue>>) -> Self {
        Self { columns, rows }
    }

    pub fn rows(&self) -> impl Iterator<Item = ResultRow<'_>> {
        self.rows.iter().map(move |values| ResultRow { set: self, values })
    }

    /// Decode every row with `f`, failing on the first undecodable row.
    pub fn decode<T>(&self, f: impl Fn(&ResultRow<'_>) -> DashResult<T>) -> DashResult<Vec<T>> {
        self.rows().map(|row| f(&row)).collect()
    }

    fn index_of(&self, column: &str) -> DashResult<usize> {
        self.columns
            .iter()
            .position(|c| c == column)
            .ok_or_else(|| DashError::MissingColumn {
                column: column.to_string(),
            })
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ResultRow<'a> {
    set: &'a ResultSet,
    values: &'a [SqlValue],
}

impl<'a> ResultRow<'a> {
    fn value(&self, column: &str) -> DashResult<&'a SqlValue> {
        let index = self.set.index_of(column)?;
        Ok(&self.values[index])
    }

    pub fn opt_text(&self, column: &str) -> DashResult<Option<String>> {
        match self.value(column)? {
            SqlValue::Null => Ok(None),
            SqlValue::Text(text) => Ok(Some(text.clone())),
            SqlValue::Integer(v) => Ok(Some(v.to_string())),
            SqlValue::Real(v) => Ok(Some(v.to_string())),
            SqlValue::Blob(_) => Err(malformed(column, "blob where text was expected")),
        }
    }

    pub fn text(&self, column: &str) -> DashResult<String> {
        self.opt_text(column)?
            .ok_or_else(|| malformed(column, "unexpected NULL"))
    }

    pub fn opt_f64(&self, column: &str) -> DashResult<Option<f64>> {
        match self.value(column)? {
            SqlValue::Null => Ok(None),
            SqlValue::Integer(v) => Ok(Some(*v as f64)),
            SqlValue::Real(v) => Ok(Some(*v)),
            SqlValue::Text(text) => text
                .trim()
                .parse::<f64>()
                .map(Some)
                .map_err(|_| malformed(column, "text is not numeric")),
            SqlValue::Blob(_) => Err(malformed(column, "blob where a number was expected")),
        }
    }

    pub fn f64(&self, column: &str) -> DashResult<f64> {
        self.opt_f64(column)?
            .ok_or_else(|| malformed(column, "unexpected NULL"))
    }

    /// Non-negative integer such as a `COUNT(*)`.
    pub fn count(&self, column: &str) -> DashResult<usize> {
        let value = self.i64(column)?;
        usize::try_from(value).map_err(|_| malformed(column, "negative count"))
    }

    pub fn i64(&self, column: &str) -> DashResult<i64> {
        match self.value(column)? {
            SqlValue::Integer(v) => Ok(*v),
            SqlValue::Real(v) if v.fract() == 0.0 => Ok(*v as i64),
            SqlValue::Null => Err(malformed(column, "unexpected NULL")),
            _ => Err(malformed(column, "not an integer")),
        }
    }
}

fn malformed(column: &str, reason: &str) -> DashError {
    DashError::Malformed {
        column: column.to_string(),
        reason: reason.to_string(),
    }
}
