//! In-memory table of rows keyed by a URL column.

use serde::Serialize;

use crate::error::{StoreError, StoreResult};
use crate::types::fields::{encode_list, FieldKey, FieldValue};
use crate::types::result::ExtractionResult;

/// One table cell.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(untagged)]
pub enum Cell {
    #[default]
    Null,
    Integer(i64),
    Text(String),
}

impl Cell {
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Text content, if this is a text cell.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Whether this cell holds non-empty text.
    fn has_text(&self) -> bool {
        matches!(self, Self::Text(s) if !s.is_empty())
    }

    /// Parse a raw field from a flat file.
    ///
    /// Empty fields are null. Integers written exactly as `i64` prints them
    /// become integers, so `007` or `+4` stay text and round-trip unchanged.
    pub fn parse(raw: &str) -> Self {
        if raw.is_empty() {
            return Self::Null;
        }
        match raw.parse::<i64>() {
            Ok(n) if n.to_string() == raw => Self::Integer(n),
            _ => Self::Text(raw.to_string()),
        }
    }

    /// Flat string form; null is the empty string.
    pub fn render(&self) -> String {
        match self {
            Self::Null => String::new(),
            Self::Integer(n) => n.to_string(),
            Self::Text(s) => s.clone(),
        }
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<i64> for Cell {
    fn from(n: i64) -> Self {
        Self::Integer(n)
    }
}

/// Ordered columns and rows of cells.
///
/// Every row has exactly one cell per column.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

impl Table {
    /// Create an empty table with the given columns.
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Append a row, padding short rows with nulls and dropping extra cells.
    pub fn push_row(&mut self, mut cells: Vec<Cell>) {
        cells.resize(self.columns.len(), Cell::Null);
        self.rows.push(cells);
    }

    /// Builder-style `push_row`.
    pub fn with_row<I, C>(mut self, cells: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<Cell>,
    {
        self.push_row(cells.into_iter().map(Into::into).collect());
        self
    }

    /// Cell at `row` in the named column.
    pub fn cell(&self, row: usize, column: &str) -> Option<&Cell> {
        let col = self.column_index(column)?;
        self.rows.get(row).map(|r| &r[col])
    }

    /// Append any missing columns, filled with nulls. Returns the names added.
    pub fn ensure_columns<I, S>(&mut self, columns: I) -> Vec<String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut added = Vec::new();
        for name in columns {
            let name = name.as_ref();
            if self.column_index(name).is_none() {
                self.columns.push(name.to_string());
                for row in &mut self.rows {
                    row.push(Cell::Null);
                }
                added.push(name.to_string());
            }
        }
        added
    }

    fn key_index(&self, key_column: &str) -> StoreResult<usize> {
        self.column_index(key_column)
            .ok_or_else(|| StoreError::MissingKeyColumn {
                column: key_column.to_string(),
            })
    }

    /// Indices of rows whose key cell equals `url` (surrounding whitespace ignored).
    pub fn find_rows(&self, key_column: &str, url: &str) -> StoreResult<Vec<usize>> {
        let key = self.key_index(key_column)?;
        let url = url.trim();
        Ok(self
            .rows
            .iter()
            .enumerate()
            .filter(|(_, row)| !row[key].is_null() && row[key].render().trim() == url)
            .map(|(i, _)| i)
            .collect())
    }

    /// Distinct non-blank URLs from the key column, in first-seen order.
    pub fn urls(&self, key_column: &str) -> StoreResult<Vec<String>> {
        let key = self.key_index(key_column)?;
        let mut urls: Vec<String> = Vec::new();
        for row in &self.rows {
            let url = row[key].render().trim().to_string();
            if !url.is_empty() && !urls.contains(&url) {
                urls.push(url);
            }
        }
        Ok(urls)
    }

    /// Whether the named column holds no text anywhere.
    pub fn is_numeric_column(&self, column: &str) -> bool {
        match self.column_index(column) {
            Some(col) => self.numeric_except(col, &[]),
            None => false,
        }
    }

    /// Numeric when no row outside `skip` holds non-empty text in `col`.
    ///
    /// The rows being written are left out so re-merging cannot flip the
    /// decision.
    fn numeric_except(&self, col: usize, skip: &[usize]) -> bool {
        !self
            .rows
            .iter()
            .enumerate()
            .filter(|(i, _)| !skip.contains(i))
            .any(|(_, row)| row[col].has_text())
    }

    /// Write every field of `result` into every row keyed by `url`.
    ///
    /// Returns the number of rows updated. A URL with no matching row leaves
    /// the table untouched. Merging the same result twice has the same effect
    /// as merging it once.
    pub fn merge(
        &mut self,
        key_column: &str,
        url: &str,
        result: &ExtractionResult,
    ) -> StoreResult<usize> {
        let targets = self.find_rows(key_column, url)?;
        if targets.is_empty() {
            return Ok(0);
        }

        self.ensure_columns(FieldKey::columns());

        for (key, value) in result.iter() {
            let Some(col) = self.column_index(key.column()) else {
                continue;
            };
            let cell = match value {
                FieldValue::Missing if self.numeric_except(col, &targets) => Cell::Null,
                FieldValue::Missing => Cell::Text(String::new()),
                FieldValue::Count(n) => match i64::try_from(*n) {
                    Ok(n) => Cell::Integer(n),
                    Err(_) => Cell::Text(n.to_string()),
                },
                FieldValue::Text(s) => Cell::Text(s.clone()),
                FieldValue::List(items) => Cell::Text(encode_list(items)),
            };
            for &row in &targets {
                self.rows[row][col] = cell.clone();
            }
        }

        Ok(targets.len())
    }
}
