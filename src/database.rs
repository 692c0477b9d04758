use std::collections::HashMap;

use crate::ast::{Join, Literal, Projection, Select, Statement};
use crate::constraints;
use crate::error::DbError;
use crate::index::IndexManager;
use crate::parser;
use crate::predicate::{self, CmpOp};
use crate::table::{ColumnDef, Row, RowId, Table};
use crate::value::Value;

/// The main entry point of the engine. Owns every table and every index and
/// dispatches parsed statements to the matching operation.
///
/// The engine is strictly single-threaded: one statement runs to completion
/// before the next begins, and a statement either succeeds or fails as a
/// whole. Embedders that share a `Database` across threads must hold one
/// exclusive lock around each [Database::execute] call.
#[derive(Default)]
pub struct Database {
    /// Canonical (lowercase) table name → table.
    tables: HashMap<String, Table>,
    indexes: IndexManager,
}

/// Result of a successfully executed statement.
///
/// DDL, DML and plain SELECTs come back as display text; join queries
/// return structured rows whose keys are qualified as `table.column`.
/// Callers must handle both shapes.
#[derive(Debug, PartialEq)]
pub enum ExecResult {
    Text(String),
    Rows(Vec<Row>),
}

impl ExecResult {
    /// Convenience for callers that only display results.
    pub fn into_text(self) -> String {
        match self {
            Self::Text(text) => text,
            Self::Rows(rows) => format!("{} row(s) returned.", rows.len()),
        }
    }
}

impl Database {
    /// Creates a new, empty database instance.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a table exists, by any-case name.
    pub fn table_exists(&self, name: &str) -> bool {
        self.tables.contains_key(&name.to_lowercase())
    }

    /// Canonical (lowercase) name of an existing table.
    pub fn canonical_name(&self, name: &str) -> Option<&str> {
        self.tables
            .get_key_value(&name.to_lowercase())
            .map(|(k, _)| k.as_str())
    }

    /// Read-only table access for presentation layers (columns + rows).
    /// All mutation must go through [Database::execute] so constraints and
    /// indexes stay consistent.
    pub fn get_table(&self, name: &str) -> Option<&Table> {
        self.tables.get(&name.to_lowercase())
    }

    /// Canonical table names, sorted.
    pub fn list_tables(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.tables.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Parses and executes one statement.
    ///
    /// # Errors
    /// Returns a [DbError] when parsing, resolution, a constraint check or
    /// the operation itself fails; the database is left unchanged.
    ///
    /// # Example
    /// ```
    /// use reldb::{Database, ExecResult};
    ///
    /// let mut db = Database::new();
    /// db.execute("CREATE TABLE users (id INT PRIMARY KEY, name VARCHAR)").unwrap();
    /// db.execute("INSERT INTO users VALUES (1, 'Alice')").unwrap();
    ///
    /// let out = db.execute("SELECT name FROM users WHERE id = 1").unwrap();
    /// assert_eq!(
    ///     out,
    ///     ExecResult::Text("name\n----\nAlice\n\n1 row(s) returned.".into())
    /// );
    /// ```
    pub fn execute(&mut self, sql: &str) -> Result<ExecResult, DbError> {
        match parser::parse(sql)? {
            Statement::ShowTables => Ok(ExecResult::Text(self.show_tables())),
            Statement::Describe { table } => self.describe(&table).map(ExecResult::Text),
            Statement::CreateTable { table, columns } => {
                self.create_table(table, columns).map(ExecResult::Text)
            }
            Statement::CreateIndex {
                name,
                table,
                column,
            } => self.create_index(&name, &table, &column).map(ExecResult::Text),
            Statement::Insert { table, values } => {
                self.insert(&table, &values).map(ExecResult::Text)
            }
            Statement::Select(select) => self.select(&select),
            Statement::Update {
                table,
                assignments,
                where_clause,
            } => self
                .update(&table, &assignments, where_clause.as_deref())
                .map(ExecResult::Text),
            Statement::Delete {
                table,
                where_clause,
            } => self
                .delete(&table, where_clause.as_deref())
                .map(ExecResult::Text),
            Statement::DropTable { table } => self.drop_table(&table).map(ExecResult::Text),
        }
    }

    fn create_table(&mut self, name: String, columns: Vec<ColumnDef>) -> Result<String, DbError> {
        let key = name.to_lowercase();
        if self.tables.contains_key(&key) {
            return Err(DbError::TableExists(key));
        }
        self.tables.insert(key.clone(), Table::new(name, columns));
        Ok(format!("Table '{key}' created."))
    }

    fn drop_table(&mut self, table: &str) -> Result<String, DbError> {
        let key = table.to_lowercase();
        if self.tables.remove(&key).is_none() {
            return Err(DbError::TableNotFound(table.to_string()));
        }
        // Stale index entries must not outlive their table.
        self.indexes.drop_table(&key);
        Ok(format!("Table '{key}' dropped."))
    }

    fn create_index(
        &mut self,
        index_name: &str,
        table: &str,
        column: &str,
    ) -> Result<String, DbError> {
        let key = table.to_lowercase();
        let t = self
            .tables
            .get(&key)
            .ok_or_else(|| DbError::TableNotFound(table.to_string()))?;
        let actual = t
            .resolve_column(column)
            .ok_or_else(|| DbError::ColumnNotFound {
                table: table.to_string(),
                column: column.to_string(),
            })?
            .to_string();
        self.indexes.create(&key, index_name, t, &actual);
        Ok(format!(
            "Index '{index_name}' created on column '{actual}' in table '{key}'."
        ))
    }

    fn insert(&mut self, table: &str, values: &[Literal]) -> Result<String, DbError> {
        let key = table.to_lowercase();
        let t = self
            .tables
            .get(&key)
            .ok_or_else(|| DbError::TableNotFound(table.to_string()))?;

        // Positional assignment in declaration order; missing trailing
        // values become NULL, surplus values are dropped.
        let mut row = Row::new();
        for (i, col) in t.columns.iter().enumerate() {
            let value = values
                .get(i)
                .map(Value::from_literal)
                .unwrap_or(Value::Null);
            row.insert(col.name.clone(), value);
        }

        constraints::check_insert(&self.tables, t, &row)?;

        let t = self
            .tables
            .get_mut(&key)
            .ok_or_else(|| DbError::TableNotFound(table.to_string()))?;
        let id = t.insert_row(row);
        let t = self
            .tables
            .get(&key)
            .ok_or_else(|| DbError::TableNotFound(table.to_string()))?;
        self.indexes.on_insert(&key, t, id);

        Ok(format!("1 row inserted into '{key}'."))
    }

    /// Resolves a WHERE clause to row ids, probing an index for plain
    /// equality before falling back to a full scan. An existing index is
    /// authoritative even when the probed bucket is empty; only the absence
    /// of an index scans.
    fn matching_rows(
        &self,
        key: &str,
        table: &Table,
        where_clause: Option<&str>,
    ) -> Result<Vec<RowId>, DbError> {
        let Some(clause) = where_clause else {
            return Ok(table.row_ids().collect());
        };
        let cond = predicate::parse(clause)?;
        let column = table
            .resolve_column(&cond.column)
            .ok_or_else(|| DbError::ColumnNotFound {
                table: key.to_string(),
                column: cond.column.clone(),
            })?
            .to_string();

        if cond.op == CmpOp::Eq {
            if let Some(mut ids) = self.indexes.lookup(key, &column, &cond.value) {
                // Buckets key on the canonical rendering, so a numeric
                // literal written differently (1200.50 for a stored 1200.5)
                // must also probe under its canonical form.
                if let Ok(n) = cond.value.parse::<f64>() {
                    if let Some(canonical) = Value::Number(n).key() {
                        if canonical != cond.value {
                            if let Some(more) = self.indexes.lookup(key, &column, &canonical) {
                                ids.extend(more);
                            }
                        }
                    }
                }
                return Ok(ids);
            }
        }
        Ok(table
            .row_ids()
            .filter(|&id| cond.matches(&table.value(id, &column).cmp_text()))
            .collect())
    }

    fn select(&self, select: &Select) -> Result<ExecResult, DbError> {
        let key = select.table.to_lowercase();
        let table = self
            .tables
            .get(&key)
            .ok_or_else(|| DbError::TableNotFound(select.table.clone()))?;

        let ids = self.matching_rows(&key, table, select.where_clause.as_deref())?;
        if let Some(join) = &select.join {
            return self.join(&key, table, &ids, join).map(ExecResult::Rows);
        }

        let headers: Vec<String> = match &select.projection {
            Projection::Star => table.columns.iter().map(|c| c.name.clone()).collect(),
            Projection::Columns(cols) => cols
                .iter()
                .map(|c| {
                    table
                        .resolve_column(c)
                        .map(str::to_string)
                        .ok_or_else(|| DbError::ColumnNotFound {
                            table: select.table.clone(),
                            column: c.clone(),
                        })
                })
                .collect::<Result<_, _>>()?,
        };
        Ok(ExecResult::Text(format_rows(table, &ids, &headers)))
    }

    /// Nested-loop inner equi-join over the given base rows (a WHERE clause
    /// restricts them against the base table first). Each base row's key
    /// probes an index on the join column; without one, the joined table is
    /// scanned linearly. Base rows with a NULL key, or no match, produce no
    /// output.
    fn join(
        &self,
        base_key: &str,
        base: &Table,
        base_ids: &[RowId],
        join: &Join,
    ) -> Result<Vec<Row>, DbError> {
        let join_key = join.table.to_lowercase();
        let joined = self
            .tables
            .get(&join_key)
            .ok_or_else(|| DbError::TableNotFound(join.table.clone()))?;

        // The ON condition may name the sides in either order.
        let names_base = |side: &crate::ast::QualifiedColumn| {
            side.table.eq_ignore_ascii_case(base_key) || side.table.eq_ignore_ascii_case(&base.name)
        };
        let (base_side, join_side) = if names_base(&join.left) {
            (&join.left, &join.right)
        } else if names_base(&join.right) {
            (&join.right, &join.left)
        } else {
            return Err(DbError::MalformedJoin(format!(
                "{}.{} = {}.{}",
                join.left.table, join.left.column, join.right.table, join.right.column
            )));
        };
        if !(join_side.table.eq_ignore_ascii_case(&join_key)
            || join_side.table.eq_ignore_ascii_case(&joined.name))
        {
            return Err(DbError::MalformedJoin(format!(
                "{}.{} = {}.{}",
                join.left.table, join.left.column, join.right.table, join.right.column
            )));
        }

        let base_col = base
            .resolve_column(&base_side.column)
            .ok_or_else(|| DbError::ColumnNotFound {
                table: base_key.to_string(),
                column: base_side.column.clone(),
            })?
            .to_string();
        let join_col = joined
            .resolve_column(&join_side.column)
            .ok_or_else(|| DbError::ColumnNotFound {
                table: join_key.clone(),
                column: join_side.column.clone(),
            })?
            .to_string();

        let mut out = Vec::new();
        for &id in base_ids {
            let Some(key_text) = base.value(id, &base_col).key() else {
                continue;
            };
            let matches: Vec<RowId> = match self.indexes.lookup(&join_key, &join_col, &key_text) {
                Some(ids) => ids,
                None => joined
                    .row_ids()
                    .filter(|&jid| {
                        joined
                            .value(jid, &join_col)
                            .key()
                            .is_some_and(|k| k == key_text)
                    })
                    .collect(),
            };
            for jid in matches {
                let mut combined = Row::new();
                if let Some(row) = base.row(id) {
                    for (col, value) in row {
                        combined.insert(format!("{base_key}.{col}"), value.clone());
                    }
                }
                if let Some(row) = joined.row(jid) {
                    for (col, value) in row {
                        combined.insert(format!("{join_key}.{col}"), value.clone());
                    }
                }
                out.push(combined);
            }
        }
        Ok(out)
    }

    fn update(
        &mut self,
        table: &str,
        assignments: &[(String, Literal)],
        where_clause: Option<&str>,
    ) -> Result<String, DbError> {
        let key = table.to_lowercase();
        let t = self
            .tables
            .get(&key)
            .ok_or_else(|| DbError::TableNotFound(table.to_string()))?;
        let ids = self.matching_rows(&key, t, where_clause)?;
        if ids.is_empty() {
            return Ok("0 row(s) updated.".to_string());
        }

        // Resolve every column before mutating anything, so a bad
        // assignment list leaves the table untouched.
        let resolved: Vec<(String, Value)> = assignments
            .iter()
            .map(|(col, lit)| {
                t.resolve_column(col)
                    .map(|actual| (actual.to_string(), Value::from_literal(lit)))
                    .ok_or_else(|| DbError::ColumnNotFound {
                        table: key.clone(),
                        column: col.clone(),
                    })
            })
            .collect::<Result<_, _>>()?;

        let t = self
            .tables
            .get_mut(&key)
            .ok_or_else(|| DbError::TableNotFound(table.to_string()))?;
        for (column, value) in &resolved {
            self.indexes.on_update(&key, t, &ids, column, value);
        }
        Ok(format!("{} row(s) updated in '{key}'.", ids.len()))
    }

    fn delete(&mut self, table: &str, where_clause: Option<&str>) -> Result<String, DbError> {
        let key = table.to_lowercase();
        let t = self
            .tables
            .get(&key)
            .ok_or_else(|| DbError::TableNotFound(table.to_string()))?;
        let ids = self.matching_rows(&key, t, where_clause)?;

        // Dependent foreign keys go NULL while the rows are still readable.
        constraints::cascade_set_null(&mut self.tables, &mut self.indexes, &key, &ids);

        let t = self
            .tables
            .get_mut(&key)
            .ok_or_else(|| DbError::TableNotFound(table.to_string()))?;
        self.indexes.on_delete(&key, t, &ids);
        let removed = t.remove_rows(&ids);
        Ok(format!("{removed} row(s) deleted from '{key}'."))
    }

    fn show_tables(&self) -> String {
        if self.tables.is_empty() {
            return "No tables in database.".to_string();
        }
        let mut out = vec!["Tables in the database:".to_string()];
        for name in self.list_tables() {
            out.push(format!("- {name} ({} rows)", self.tables[name].row_count()));
        }
        out.join("\n")
    }

    fn describe(&self, table: &str) -> Result<String, DbError> {
        let key = table.to_lowercase();
        let t = self
            .tables
            .get(&key)
            .ok_or_else(|| DbError::TableNotFound(table.to_string()))?;

        let mut out = vec![
            format!("Table: {key}"),
            "-".repeat(50),
            format!("{:<20} {:<15} {}", "Column", "Type", "Constraints"),
            "-".repeat(50),
        ];
        for col in &t.columns {
            let mut constraints = Vec::new();
            if col.primary_key {
                constraints.push("PRIMARY KEY".to_string());
            }
            if col.unique {
                constraints.push("UNIQUE".to_string());
            }
            if let Some(fk) = &col.foreign_key {
                constraints.push(format!("FOREIGN KEY REFERENCES {}({})", fk.table, fk.column));
            }
            out.push(format!(
                "{:<20} {:<15} {}",
                col.name,
                col.data_type,
                constraints.join(" ")
            ));
        }
        out.push("-".repeat(50));
        out.push(format!("Total rows: {}", t.row_count()));
        Ok(out.join("\n"))
    }
}

/// Formats selected rows as a plain-text table: a ` | `-joined header, a
/// dashed rule, one line per row and a trailing count.
fn format_rows(table: &Table, ids: &[RowId], headers: &[String]) -> String {
    if ids.is_empty() {
        return "No rows found.".to_string();
    }
    let header = headers.join(" | ");
    let mut out = vec![header.clone(), "-".repeat(header.len())];
    for &id in ids {
        let line: Vec<String> = headers
            .iter()
            .map(|col| table.value(id, col).to_string())
            .collect();
        out.push(line.join(" | "));
    }
    out.push(format!("\n{} row(s) returned.", ids.len()));
    out.join("\n")
}
