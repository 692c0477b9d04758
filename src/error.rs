use thiserror::Error;

/// Every failure the engine can report.
///
/// Errors are local to the one statement that raised them: the statement
/// fails as a whole and leaves no partial state behind. There is no
/// fatal/unrecoverable distinction.
#[derive(Debug, Error, PartialEq)]
pub enum DbError {
    /// Malformed statement text; names the construct being parsed and the
    /// offending fragment.
    #[error("syntax error in {statement}: {detail}")]
    Syntax {
        statement: &'static str,
        detail: String,
    },

    /// Dispatch fallthrough: the input matched no recognized statement form.
    #[error("unknown command: {0}")]
    UnknownCommand(String),

    #[error("table '{0}' already exists")]
    TableExists(String),

    #[error("table '{0}' does not exist")]
    TableNotFound(String),

    #[error("column '{column}' does not exist in table '{table}'")]
    ColumnNotFound { table: String, column: String },

    /// PRIMARY KEY or UNIQUE conflict on insert.
    #[error("duplicate {constraint} value '{value}' for column '{column}' in table '{table}'")]
    DuplicateValue {
        constraint: &'static str,
        column: String,
        value: String,
        table: String,
    },

    /// A non-null foreign key value was supplied that the referenced table
    /// does not contain.
    #[error("foreign key violation: value '{value}' not found in {table}({column})")]
    ForeignKeyViolation {
        value: String,
        table: String,
        column: String,
    },

    #[error("unsupported WHERE operator in: {0}")]
    UnsupportedOperator(String),

    #[error("malformed JOIN condition: {0}")]
    MalformedJoin(String),
}
