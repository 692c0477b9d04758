pub mod ast;
pub mod constraints;
pub mod database;
pub mod error;
pub mod index;
pub mod parser;
pub mod predicate;
pub mod table;
pub mod value;

pub use ast::Statement;
pub use database::{Database, ExecResult};
pub use error::DbError;
pub use table::{ColumnDef, ForeignKey, Row, RowId, Table};
pub use value::Value;
