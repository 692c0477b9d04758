//! Equality indexes over single table columns.
//!
//! An index is a cache derived from the row store: buckets map a value's
//! canonical key to the ids of the rows holding it, in insertion order.
//! NULL values are never indexed, and a bucket is removed the moment its
//! last row is evicted.

use std::collections::HashMap;

use crate::table::{RowId, Table};
use crate::value::Value;

/// A single equality index over one column of one table.
#[derive(Debug)]
pub struct Index {
    /// Name given at CREATE INDEX time; reporting only.
    pub name: String,
    /// Declared spelling of the indexed column.
    pub column: String,
    buckets: HashMap<String, Vec<RowId>>,
}

impl Index {
    fn evict(&mut self, key: &str, id: RowId) {
        if let Some(bucket) = self.buckets.get_mut(key) {
            bucket.retain(|r| *r != id);
            if bucket.is_empty() {
                self.buckets.remove(key);
            }
        }
    }
}

/// Owns every index in the database, keyed by lowercase table and column
/// names. At most one index exists per pair; re-creation replaces.
#[derive(Debug, Default)]
pub struct IndexManager {
    indexes: HashMap<(String, String), Index>,
}

impl IndexManager {
    /// Builds an index from a full scan of the table's current rows.
    /// `column` must be the declared spelling.
    pub fn create(&mut self, table_key: &str, index_name: &str, table: &Table, column: &str) {
        let mut index = Index {
            name: index_name.to_string(),
            column: column.to_string(),
            buckets: HashMap::new(),
        };
        for id in table.row_ids() {
            if let Some(key) = table.value(id, column).key() {
                index.buckets.entry(key).or_default().push(id);
            }
        }
        tracing::debug!(
            table = table_key,
            column,
            keys = index.buckets.len(),
            "index built"
        );
        self.indexes
            .insert((table_key.to_string(), column.to_lowercase()), index);
    }

    /// Hooks a freshly inserted row into every index on its table.
    pub fn on_insert(&mut self, table_key: &str, table: &Table, id: RowId) {
        for ((t, _), index) in self.indexes.iter_mut() {
            if t != table_key {
                continue;
            }
            if let Some(key) = table.value(id, &index.column).key() {
                index.buckets.entry(key).or_default().push(id);
            }
        }
    }

    /// Rewrites `column` to `new_value` on every given row, keeping the
    /// matching index in step. This is the single mutation path for row
    /// fields: each row is unhooked from its old-value bucket before the
    /// field changes and re-hooked afterwards, so index and store can never
    /// diverge.
    pub fn on_update(
        &mut self,
        table_key: &str,
        table: &mut Table,
        ids: &[RowId],
        column: &str,
        new_value: &Value,
    ) {
        let mut index = self
            .indexes
            .get_mut(&(table_key.to_string(), column.to_lowercase()));
        for &id in ids {
            if let Some(ix) = index.as_mut() {
                if let Some(old_key) = table.value(id, column).key() {
                    ix.evict(&old_key, id);
                }
            }
            if let Some(row) = table.row_mut(id) {
                row.insert(column.to_string(), new_value.clone());
            }
            if let Some(ix) = index.as_mut() {
                if let Some(new_key) = new_value.key() {
                    ix.buckets.entry(new_key).or_default().push(id);
                }
            }
        }
    }

    /// Unhooks rows about to be deleted from every index on their table.
    /// Must run while the rows are still readable.
    pub fn on_delete(&mut self, table_key: &str, table: &Table, ids: &[RowId]) {
        for ((t, _), index) in self.indexes.iter_mut() {
            if t != table_key {
                continue;
            }
            for &id in ids {
                if let Some(key) = table.value(id, &index.column).key() {
                    index.evict(&key, id);
                }
            }
        }
    }

    /// Equality probe. `None` means no index exists for the pair; an empty
    /// vec means the index exists and holds no match for `value_key`.
    pub fn lookup(&self, table_key: &str, column: &str, value_key: &str) -> Option<Vec<RowId>> {
        let index = self
            .indexes
            .get(&(table_key.to_string(), column.to_lowercase()))?;
        Some(index.buckets.get(value_key).cloned().unwrap_or_default())
    }

    /// Drops every index of a table. Called when the table itself is
    /// dropped; stale entries must not outlive their rows.
    pub fn drop_table(&mut self, table_key: &str) {
        self.indexes.retain(|(t, _), _| t != table_key);
    }
}
