//! Row-keyed measurement tables
//!
//! A `ResultTable` holds either raw latency curves (`ResultTable<usize, f32>`,
//! one fixed-length row per swept stride) or detected jump positions
//! (`ResultTable<usize, usize>`, row lengths vary). Rows keep insertion
//! order, which is the sweep order the correlation rules depend on.

use crate::error::{AnalysisError, Result};
use std::fmt::Display;

/// One table row: sweep key and its values
#[derive(Debug, Clone, PartialEq)]
pub struct TableRow<K, V> {
    pub key: K,
    pub values: Vec<V>,
}

/// Ordered, row-keyed table
#[derive(Debug, Clone, PartialEq)]
pub struct ResultTable<K, V> {
    header: Option<Vec<String>>,
    rows: Vec<TableRow<K, V>>,
}

impl<K, V> ResultTable<K, V> {
    /// Create an empty table without a header
    pub fn new() -> Self {
        Self {
            header: None,
            rows: Vec::new(),
        }
    }

    /// Attach a column header (first entry names the key column)
    pub fn with_header(mut self, header: Vec<String>) -> Self {
        self.header = Some(header);
        self
    }

    pub fn header(&self) -> Option<&[String]> {
        self.header.as_deref()
    }

    /// Append a row; callers append in ascending sweep order
    pub fn append(&mut self, key: K, values: Vec<V>) {
        self.rows.push(TableRow { key, values });
    }

    pub fn rows(&self) -> &[TableRow<K, V>] {
        &self.rows
    }

    pub fn get(&self, index: usize) -> Option<&TableRow<K, V>> {
        self.rows.get(index)
    }

    pub fn last(&self) -> Option<&TableRow<K, V>> {
        self.rows.last()
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> + '_ {
        self.rows.iter().map(|row| &row.key)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl<K: PartialEq + Display, V> ResultTable<K, V> {
    /// Values of the first row whose key equals `key`
    ///
    /// Linear scan: tables hold tens of rows.
    pub fn row_by_key(&self, key: &K) -> Result<&[V]> {
        self.rows
            .iter()
            .find(|row| row.key == *key)
            .map(|row| row.values.as_slice())
            .ok_or_else(|| AnalysisError::NotFound {
                key: key.to_string(),
            })
    }
}

impl<K: Clone, V> ResultTable<K, V> {
    /// Derive a new table row by row, keeping sweep order
    ///
    /// Rows for which `f` returns `None` are left out. The derived table has
    /// no header: its columns no longer match the source's.
    pub fn map_rows<W, F>(&self, mut f: F) -> ResultTable<K, W>
    where
        F: FnMut(&TableRow<K, V>) -> Option<Vec<W>>,
    {
        let mut derived = ResultTable::new();
        for row in &self.rows {
            if let Some(values) = f(row) {
                derived.append(row.key.clone(), values);
            }
        }
        derived
    }
}

impl<K, V> Default for ResultTable<K, V> {
    fn default() -> Self {
        Self::new()
    }
}
