//! PRIMARY KEY, UNIQUE and FOREIGN KEY enforcement, plus the
//! ON DELETE SET NULL cascade.
//!
//! All checks are whole-table scans; the engine keeps no ordered structure
//! to probe, which is acceptable at its in-memory scale.

use std::collections::{HashMap, HashSet};

use crate::error::DbError;
use crate::index::IndexManager;
use crate::table::{Row, RowId, Table};
use crate::value::Value;

/// Validates a row about to be inserted into `table`.
///
/// Primary key and unique columns are scanned over the whole table; foreign
/// key values are scanned over the whole referenced table. A NULL foreign
/// key value is always accepted.
pub fn check_insert(
    tables: &HashMap<String, Table>,
    table: &Table,
    row: &Row,
) -> Result<(), DbError> {
    for col in &table.columns {
        if !(col.primary_key || col.unique) {
            continue;
        }
        let candidate = row.get(&col.name).unwrap_or(&Value::Null);
        for existing in table.rows() {
            if existing.get(&col.name).unwrap_or(&Value::Null) == candidate {
                let constraint = if col.primary_key { "PRIMARY KEY" } else { "UNIQUE" };
                return Err(DbError::DuplicateValue {
                    constraint,
                    column: col.name.clone(),
                    value: candidate.to_string(),
                    table: table.name.clone(),
                });
            }
        }
    }

    for col in &table.columns {
        let Some(fk) = &col.foreign_key else { continue };
        let supplied = row.get(&col.name).unwrap_or(&Value::Null);
        let Some(key) = supplied.key() else { continue };

        let referenced = tables
            .get(&fk.table.to_lowercase())
            .ok_or_else(|| DbError::TableNotFound(fk.table.clone()))?;
        let ref_col = referenced
            .resolve_column(&fk.column)
            .ok_or_else(|| DbError::ColumnNotFound {
                table: fk.table.clone(),
                column: fk.column.clone(),
            })?
            .to_string();

        let found = referenced
            .rows()
            .any(|r| r.get(&ref_col).and_then(Value::key).is_some_and(|k| k == key));
        if !found {
            return Err(DbError::ForeignKeyViolation {
                value: key,
                table: fk.table.clone(),
                column: fk.column.clone(),
            });
        }
    }

    Ok(())
}

/// ON DELETE SET NULL: before the `doomed` rows leave `target_key`, every
/// foreign key column elsewhere that points at one of their referenced
/// values is blanked. The mutation goes through [IndexManager::on_update]
/// so dependent indexes stay correct.
///
/// Must run while the doomed rows are still in the table; their referenced
/// values have to be readable.
pub fn cascade_set_null(
    tables: &mut HashMap<String, Table>,
    indexes: &mut IndexManager,
    target_key: &str,
    doomed: &[RowId],
) {
    // (dependent table, FK column, referenced value keys)
    let mut pending: Vec<(String, String, HashSet<String>)> = Vec::new();
    {
        let Some(target) = tables.get(target_key) else {
            return;
        };
        for (dep_key, dep) in tables.iter() {
            for col in &dep.columns {
                let Some(fk) = &col.foreign_key else { continue };
                if fk.table.to_lowercase() != target_key {
                    continue;
                }
                let Some(ref_col) = target.resolve_column(&fk.column) else {
                    continue;
                };
                let values: HashSet<String> = doomed
                    .iter()
                    .filter_map(|&id| target.value(id, ref_col).key())
                    .collect();
                if !values.is_empty() {
                    pending.push((dep_key.clone(), col.name.clone(), values));
                }
            }
        }
    }

    for (dep_key, fk_col, values) in pending {
        let Some(dep) = tables.get_mut(&dep_key) else {
            continue;
        };
        let hit_ids: Vec<RowId> = dep
            .row_ids()
            .filter(|&id| {
                dep.value(id, &fk_col)
                    .key()
                    .is_some_and(|k| values.contains(&k))
            })
            .collect();
        if hit_ids.is_empty() {
            continue;
        }
        tracing::debug!(
            table = %dep_key,
            column = %fk_col,
            rows = hit_ids.len(),
            "cascade set null"
        );
        indexes.on_update(&dep_key, dep, &hit_ids, &fk_col, &Value::Null);
    }
}
