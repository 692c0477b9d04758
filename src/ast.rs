use crate::table::ColumnDef;

/// A raw literal taken from an INSERT value list or an UPDATE assignment.
///
/// `quoted` records whether the token was enclosed in quotes in the original
/// statement, which decides type coercion later: unquoted tokens may become
/// numbers or NULL, quoted tokens are always text.
#[derive(Debug, Clone, PartialEq)]
pub struct Literal {
    pub text: String,
    pub quoted: bool,
}

/// Projection list of a SELECT.
#[derive(Debug, Clone, PartialEq)]
pub enum Projection {
    Star,
    Columns(Vec<String>),
}

/// One side of a join condition, written `table.column` in the statement.
#[derive(Debug, Clone, PartialEq)]
pub struct QualifiedColumn {
    pub table: String,
    pub column: String,
}

/// `JOIN <table> ON <left> = <right>` descriptor. The sides may name the
/// base and joined tables in either order.
#[derive(Debug, Clone, PartialEq)]
pub struct Join {
    pub table: String,
    pub left: QualifiedColumn,
    pub right: QualifiedColumn,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Select {
    pub table: String,
    pub projection: Projection,
    pub join: Option<Join>,
    /// WHERE text with its original casing; comparison values are
    /// case-sensitive even though the surrounding syntax is not.
    pub where_clause: Option<String>,
}

/// A fully parsed statement, one variant per recognized form. Identifier
/// spellings are preserved verbatim; resolution happens at execution time.
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    ShowTables,
    Describe {
        table: String,
    },
    CreateTable {
        table: String,
        columns: Vec<ColumnDef>,
    },
    CreateIndex {
        name: String,
        table: String,
        column: String,
    },
    Insert {
        table: String,
        values: Vec<Literal>,
    },
    Select(Select),
    Update {
        table: String,
        assignments: Vec<(String, Literal)>,
        where_clause: Option<String>,
    },
    Delete {
        table: String,
        where_clause: Option<String>,
    },
    DropTable {
        table: String,
    },
}
