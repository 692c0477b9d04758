use std::collections::{HashMap, HashSet};

use crate::value::Value;

/// Reference to a column of another table, declared with
/// `FOREIGN KEY REFERENCES table(column)`.
#[derive(Debug, Clone, PartialEq)]
pub struct ForeignKey {
    pub table: String,
    pub column: String,
}

/// Column definition in the schema. Immutable once the table is created.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDef {
    /// Declared spelling, preserved for display and used as the row key.
    pub name: String,
    /// Free-form type token, uppercased. Kept for DESCRIBE only; storage
    /// does not enforce it.
    pub data_type: String,
    pub primary_key: bool,
    pub unique: bool,
    pub foreign_key: Option<ForeignKey>,
}

/// Stable identity of a row for its whole lifetime. Indexes store row ids
/// and resolve them through the owning table's arena, so a row never needs
/// more than one owner.
pub type RowId = u64;

/// A single row: declared column spelling → value.
pub type Row = HashMap<String, Value>;

/// A table: ordered schema plus a row arena with stable ids.
pub struct Table {
    /// Originally declared spelling, retained for display.
    pub name: String,
    /// Declaration order; also the projection order for `SELECT *`.
    pub columns: Vec<ColumnDef>,
    arena: HashMap<RowId, Row>,
    order: Vec<RowId>,
    next_id: RowId,
}

impl Table {
    pub fn new(name: String, columns: Vec<ColumnDef>) -> Self {
        Self {
            name,
            columns,
            arena: HashMap::new(),
            order: Vec::new(),
            next_id: 0,
        }
    }

    /// Case-insensitive column resolution; returns the declared spelling.
    pub fn resolve_column(&self, name: &str) -> Option<&str> {
        self.columns
            .iter()
            .find(|c| c.name.eq_ignore_ascii_case(name))
            .map(|c| c.name.as_str())
    }

    pub fn row_count(&self) -> usize {
        self.order.len()
    }

    /// Appends a row and returns its stable id.
    pub fn insert_row(&mut self, row: Row) -> RowId {
        let id = self.next_id;
        self.next_id += 1;
        self.arena.insert(id, row);
        self.order.push(id);
        id
    }

    pub fn row(&self, id: RowId) -> Option<&Row> {
        self.arena.get(&id)
    }

    pub fn row_mut(&mut self, id: RowId) -> Option<&mut Row> {
        self.arena.get_mut(&id)
    }

    /// Row ids in insertion order.
    pub fn row_ids(&self) -> impl Iterator<Item = RowId> + '_ {
        self.order.iter().copied()
    }

    /// Rows in insertion order.
    pub fn rows(&self) -> impl Iterator<Item = &Row> {
        self.order.iter().filter_map(|id| self.arena.get(id))
    }

    /// Value of `column` (declared spelling) in row `id`, NULL when absent.
    pub fn value(&self, id: RowId, column: &str) -> Value {
        self.arena
            .get(&id)
            .and_then(|row| row.get(column))
            .cloned()
            .unwrap_or(Value::Null)
    }

    /// Removes the given rows, keeping the order of the remainder. Returns
    /// the number of rows actually removed.
    pub fn remove_rows(&mut self, ids: &[RowId]) -> usize {
        let doomed: HashSet<RowId> = ids.iter().copied().collect();
        let before = self.order.len();
        self.order.retain(|id| !doomed.contains(id));
        for id in &doomed {
            self.arena.remove(id);
        }
        before - self.order.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn users() -> Table {
        Table::new(
            "Users".into(),
            vec![
                ColumnDef {
                    name: "id".into(),
                    data_type: "INT".into(),
                    primary_key: true,
                    unique: false,
                    foreign_key: None,
                },
                ColumnDef {
                    name: "Name".into(),
                    data_type: "VARCHAR".into(),
                    primary_key: false,
                    unique: false,
                    foreign_key: None,
                },
            ],
        )
    }

    fn row(id: f64, name: &str) -> Row {
        Row::from([
            ("id".to_string(), Value::Number(id)),
            ("Name".to_string(), Value::Text(name.into())),
        ])
    }

    #[test]
    fn test_insert_and_read() {
        let mut table = users();
        let a = table.insert_row(row(1.0, "Alice"));
        let b = table.insert_row(row(2.0, "Bob"));

        assert_eq!(table.row_count(), 2);
        assert_eq!(table.value(a, "Name"), Value::Text("Alice".into()));
        assert_eq!(table.value(b, "id"), Value::Number(2.0));
        assert_eq!(table.row_ids().collect::<Vec<_>>(), vec![a, b]);
    }

    #[test]
    fn test_resolve_column_is_case_insensitive() {
        let table = users();
        assert_eq!(table.resolve_column("NAME"), Some("Name"));
        assert_eq!(table.resolve_column("id"), Some("id"));
        assert_eq!(table.resolve_column("missing"), None);
    }

    #[test]
    fn test_remove_keeps_order_and_identity() {
        let mut table = users();
        let a = table.insert_row(row(1.0, "Alice"));
        let b = table.insert_row(row(2.0, "Bob"));
        let c = table.insert_row(row(3.0, "Carol"));

        assert_eq!(table.remove_rows(&[b]), 1);
        assert_eq!(table.row_ids().collect::<Vec<_>>(), vec![a, c]);
        // Surviving ids still resolve after a removal.
        assert_eq!(table.value(c, "Name"), Value::Text("Carol".into()));
        assert!(table.row(b).is_none());
    }

    #[test]
    fn test_remove_unknown_id_is_a_no_op() {
        let mut table = users();
        table.insert_row(row(1.0, "Alice"));
        assert_eq!(table.remove_rows(&[99]), 0);
        assert_eq!(table.row_count(), 1);
    }

    #[test]
    fn test_missing_column_reads_null() {
        let mut table = users();
        let id = table.insert_row(Row::from([(
            "id".to_string(),
            Value::Number(1.0),
        )]));
        assert_eq!(table.value(id, "Name"), Value::Null);
    }

    #[test]
    fn test_mutate_in_place() {
        let mut table = users();
        let id = table.insert_row(row(1.0, "Alice"));
        table
            .row_mut(id)
            .unwrap()
            .insert("Name".into(), Value::Text("Alicia".into()));
        assert_eq!(table.value(id, "Name"), Value::Text("Alicia".into()));
    }
}
