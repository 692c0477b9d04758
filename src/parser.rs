//! Turns one textual statement into a typed [Statement] descriptor.
//!
//! Keywords match case-insensitively; table and column spellings, and the
//! whole WHERE clause, are carried through verbatim for later resolution.

use crate::ast::{Join, Literal, Projection, QualifiedColumn, Select, Statement};
use crate::error::DbError;
use crate::table::{ColumnDef, ForeignKey};

/// Parses a single statement. A trailing semicolon is allowed and ignored.
pub fn parse(command: &str) -> Result<Statement, DbError> {
    let command = command.trim().trim_end_matches(';').trim();
    let tokens: Vec<&str> = command.split_whitespace().collect();
    let Some(first) = tokens.first() else {
        return Err(syntax("statement", "empty command"));
    };

    let second_is = |kw: &str| tokens.get(1).is_some_and(|t| t.eq_ignore_ascii_case(kw));

    match first.to_ascii_uppercase().as_str() {
        "SHOW" if second_is("TABLES") => Ok(Statement::ShowTables),
        "DESCRIBE" | "DESC" => {
            let table = tokens
                .get(1)
                .ok_or_else(|| syntax("DESCRIBE", "missing table name"))?;
            Ok(Statement::Describe {
                table: table.to_string(),
            })
        }
        "CREATE" if second_is("TABLE") => parse_create_table(command),
        "CREATE" if second_is("INDEX") => parse_create_index(&tokens),
        "INSERT" if second_is("INTO") => parse_insert(command),
        "SELECT" => parse_select(command),
        "UPDATE" => parse_update(command),
        "DELETE" => parse_delete(command),
        "DROP" if second_is("TABLE") => {
            let table = tokens
                .get(2)
                .ok_or_else(|| syntax("DROP TABLE", "missing table name"))?;
            Ok(Statement::DropTable {
                table: table.to_string(),
            })
        }
        _ => Err(DbError::UnknownCommand(command.to_string())),
    }
}

fn syntax(statement: &'static str, detail: impl Into<String>) -> DbError {
    DbError::Syntax {
        statement,
        detail: detail.into(),
    }
}

/// Byte offset of a keyword, matched case-insensitively. Keywords are padded
/// with spaces by the callers so they only hit on word boundaries.
fn find_keyword(haystack: &str, keyword: &str) -> Option<usize> {
    haystack.to_ascii_uppercase().find(keyword)
}

/// Strips one pair of matching quotes. Returns the inner text and whether
/// the token was quoted at all.
pub(crate) fn strip_quotes(token: &str) -> (String, bool) {
    let bytes = token.as_bytes();
    if bytes.len() >= 2
        && (bytes[0] == b'\'' || bytes[0] == b'"')
        && bytes[bytes.len() - 1] == bytes[0]
    {
        (token[1..token.len() - 1].to_string(), true)
    } else {
        (token.to_string(), false)
    }
}

/// Splits on commas that sit outside single or double quotes. Tokens are
/// returned verbatim (quotes included), trimmed of surrounding whitespace.
fn split_commas_outside_quotes(input: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;

    for ch in input.chars() {
        match quote {
            Some(q) if ch == q => {
                quote = None;
                current.push(ch);
            }
            Some(_) => current.push(ch),
            None if ch == '\'' || ch == '"' => {
                quote = Some(ch);
                current.push(ch);
            }
            None if ch == ',' => {
                parts.push(current.trim().to_string());
                current.clear();
            }
            None => current.push(ch),
        }
    }
    let last = current.trim().to_string();
    if !last.is_empty() {
        parts.push(last);
    }
    parts
}

/// Splits on a separator at parenthesis depth zero, so a
/// `REFERENCES t(c)` clause is never cut into a column of its own.
fn split_outside_parens(input: &str, sep: char) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut depth: i32 = 0;

    for ch in input.chars() {
        match ch {
            '(' => {
                depth += 1;
                current.push(ch);
            }
            ')' => {
                depth -= 1;
                current.push(ch);
            }
            c if c == sep && depth == 0 => {
                parts.push(current.trim().to_string());
                current.clear();
            }
            c => current.push(c),
        }
    }
    let last = current.trim().to_string();
    if !last.is_empty() {
        parts.push(last);
    }
    parts
}

fn parse_create_table(command: &str) -> Result<Statement, DbError> {
    let open = command
        .find('(')
        .ok_or_else(|| syntax("CREATE TABLE", "missing column definitions in parentheses"))?;
    let close = command
        .rfind(')')
        .filter(|&c| c > open)
        .ok_or_else(|| syntax("CREATE TABLE", "unbalanced parentheses"))?;

    let head: Vec<&str> = command[..open].split_whitespace().collect();
    if head.len() < 3 {
        return Err(syntax("CREATE TABLE", "missing table name"));
    }
    let table = head[2].to_string();

    let mut columns = Vec::new();
    for def in split_outside_parens(&command[open + 1..close], ',') {
        columns.push(parse_column_def(&def)?);
    }
    if columns.is_empty() {
        return Err(syntax("CREATE TABLE", "no column definitions"));
    }

    Ok(Statement::CreateTable { table, columns })
}

fn parse_column_def(def: &str) -> Result<ColumnDef, DbError> {
    let tokens: Vec<&str> = def.split_whitespace().collect();
    if tokens.len() < 2 {
        return Err(syntax(
            "CREATE TABLE",
            format!("invalid column definition: {def}"),
        ));
    }
    let upper = def.to_ascii_uppercase();
    let foreign_key = if upper.contains("FOREIGN") && upper.contains("REFERENCES") {
        Some(parse_reference(def)?)
    } else {
        None
    };

    Ok(ColumnDef {
        name: tokens[0].to_string(),
        data_type: tokens[1].to_ascii_uppercase(),
        primary_key: upper.contains("PRIMARY") && upper.contains("KEY"),
        unique: upper.contains("UNIQUE"),
        foreign_key,
    })
}

/// Parses the `REFERENCES t(c)` tail of a foreign key clause.
fn parse_reference(def: &str) -> Result<ForeignKey, DbError> {
    let pos = find_keyword(def, "REFERENCES")
        .ok_or_else(|| syntax("CREATE TABLE", format!("invalid foreign key: {def}")))?;
    let rest = &def[pos + "REFERENCES".len()..];
    let open = rest
        .find('(')
        .ok_or_else(|| syntax("CREATE TABLE", format!("invalid foreign key: {def}")))?;
    let close = rest
        .find(')')
        .filter(|&c| c > open)
        .ok_or_else(|| syntax("CREATE TABLE", format!("invalid foreign key: {def}")))?;

    let table = rest[..open].trim();
    let column = rest[open + 1..close].trim();
    if table.is_empty() || column.is_empty() {
        return Err(syntax("CREATE TABLE", format!("invalid foreign key: {def}")));
    }
    Ok(ForeignKey {
        table: table.to_string(),
        column: column.to_string(),
    })
}

fn parse_create_index(tokens: &[&str]) -> Result<Statement, DbError> {
    // CREATE INDEX <name> ON <table>(<column>)
    if tokens.len() < 5 || !tokens[3].eq_ignore_ascii_case("ON") {
        return Err(syntax("CREATE INDEX", "expected CREATE INDEX name ON table(column)"));
    }
    let name = tokens[2].to_string();
    let target = tokens[4..].join(" ");
    let open = target
        .find('(')
        .ok_or_else(|| syntax("CREATE INDEX", "expected table(column)"))?;
    let close = target
        .find(')')
        .filter(|&c| c > open)
        .ok_or_else(|| syntax("CREATE INDEX", "expected table(column)"))?;

    let table = target[..open].trim();
    let column = target[open + 1..close].trim();
    if table.is_empty() || column.is_empty() {
        return Err(syntax("CREATE INDEX", "expected table(column)"));
    }
    Ok(Statement::CreateIndex {
        name,
        table: table.to_string(),
        column: column.to_string(),
    })
}

fn parse_insert(command: &str) -> Result<Statement, DbError> {
    let vpos = find_keyword(command, " VALUES")
        .ok_or_else(|| syntax("INSERT", "missing VALUES keyword"))?;

    let head: Vec<&str> = command[..vpos].split_whitespace().collect();
    if head.len() < 3 {
        return Err(syntax("INSERT", "missing table name"));
    }
    let table = head[2].to_string();

    let mut body = command[vpos + " VALUES".len()..].trim();
    body = body.strip_prefix('(').unwrap_or(body);
    body = body.strip_suffix(')').unwrap_or(body);

    let values = split_commas_outside_quotes(body)
        .iter()
        .map(|token| {
            let (text, quoted) = strip_quotes(token);
            Literal { text, quoted }
        })
        .collect();

    Ok(Statement::Insert { table, values })
}

fn parse_select(command: &str) -> Result<Statement, DbError> {
    let from = find_keyword(command, " FROM ")
        .ok_or_else(|| syntax("SELECT", "missing FROM keyword"))?;

    let cols_str = command["SELECT".len()..from].trim();
    if cols_str.is_empty() {
        return Err(syntax("SELECT", "missing projection list"));
    }
    let projection = if cols_str == "*" {
        Projection::Star
    } else {
        Projection::Columns(
            cols_str
                .split(',')
                .map(|c| c.trim().to_string())
                .filter(|c| !c.is_empty())
                .collect(),
        )
    };

    let rest = &command[from + " FROM ".len()..];
    let (head, where_clause) = split_where(rest);

    let (table, join) = match find_keyword(head, " JOIN ") {
        Some(j) => {
            let table = head[..j].trim().to_string();
            let join_rest = &head[j + " JOIN ".len()..];
            let on = find_keyword(join_rest, " ON ")
                .ok_or_else(|| DbError::MalformedJoin(join_rest.trim().to_string()))?;
            let join_table = join_rest[..on].trim().to_string();
            let condition = join_rest[on + " ON ".len()..].trim();
            let (left, right) = condition
                .split_once('=')
                .ok_or_else(|| DbError::MalformedJoin(condition.to_string()))?;
            let join = Join {
                table: join_table,
                left: parse_qualified(left)?,
                right: parse_qualified(right)?,
            };
            (table, Some(join))
        }
        None => (head.trim().to_string(), None),
    };
    if table.is_empty() {
        return Err(syntax("SELECT", "missing table name"));
    }

    Ok(Statement::Select(Select {
        table,
        projection,
        join,
        where_clause,
    }))
}

fn parse_qualified(side: &str) -> Result<QualifiedColumn, DbError> {
    let side = side.trim();
    let (table, column) = side
        .split_once('.')
        .ok_or_else(|| DbError::MalformedJoin(side.to_string()))?;
    if table.is_empty() || column.is_empty() {
        return Err(DbError::MalformedJoin(side.to_string()));
    }
    Ok(QualifiedColumn {
        table: table.trim().to_string(),
        column: column.trim().to_string(),
    })
}

/// Splits off the WHERE clause, keeping its original casing.
fn split_where(input: &str) -> (&str, Option<String>) {
    match find_keyword(input, " WHERE ") {
        Some(w) => (
            &input[..w],
            Some(input[w + " WHERE ".len()..].trim().to_string()),
        ),
        None => (input, None),
    }
}

fn parse_update(command: &str) -> Result<Statement, DbError> {
    let setp = find_keyword(command, " SET ")
        .ok_or_else(|| syntax("UPDATE", "missing SET keyword"))?;

    let head: Vec<&str> = command[..setp].split_whitespace().collect();
    if head.len() < 2 {
        return Err(syntax("UPDATE", "missing table name"));
    }
    let table = head[1].to_string();

    let rest = &command[setp + " SET ".len()..];
    let (set_clause, where_clause) = split_where(rest);

    let mut assignments = Vec::new();
    for part in split_commas_outside_quotes(set_clause) {
        let (column, value) = part
            .split_once('=')
            .ok_or_else(|| syntax("UPDATE", format!("invalid SET clause: {part}")))?;
        let column = column.trim();
        if column.is_empty() {
            return Err(syntax("UPDATE", format!("invalid SET clause: {part}")));
        }
        let (text, quoted) = strip_quotes(value.trim());
        assignments.push((column.to_string(), Literal { text, quoted }));
    }
    if assignments.is_empty() {
        return Err(syntax("UPDATE", "empty SET clause"));
    }

    Ok(Statement::Update {
        table,
        assignments,
        where_clause,
    })
}

fn parse_delete(command: &str) -> Result<Statement, DbError> {
    let from = find_keyword(command, " FROM ")
        .ok_or_else(|| syntax("DELETE", "missing FROM keyword"))?;

    let rest = &command[from + " FROM ".len()..];
    let (head, where_clause) = split_where(rest);
    let table = head.trim();
    if table.is_empty() {
        return Err(syntax("DELETE", "missing table name"));
    }

    Ok(Statement::Delete {
        table: table.to_string(),
        where_clause,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_show_tables_and_describe() {
        assert_eq!(parse("show tables;").unwrap(), Statement::ShowTables);
        assert_eq!(
            parse("DESC Suppliers").unwrap(),
            Statement::Describe {
                table: "Suppliers".into()
            }
        );
        assert_eq!(
            parse("DESCRIBE products").unwrap(),
            Statement::Describe {
                table: "products".into()
            }
        );
    }

    #[test]
    fn test_create_table_with_constraints() {
        let stmt = parse(
            "CREATE TABLE products (id INT PRIMARY KEY, cname VARCHAR, \
             supplier_id INT FOREIGN KEY REFERENCES suppliers(id))",
        )
        .unwrap();
        let Statement::CreateTable { table, columns } = stmt else {
            panic!("expected CreateTable");
        };
        assert_eq!(table, "products");
        assert_eq!(columns.len(), 3);
        assert!(columns[0].primary_key);
        assert_eq!(columns[0].data_type, "INT");
        assert!(!columns[1].primary_key);
        let fk = columns[2].foreign_key.as_ref().unwrap();
        assert_eq!(fk.table, "suppliers");
        assert_eq!(fk.column, "id");
    }

    #[test]
    fn test_create_table_references_is_not_split() {
        // The comma split must respect the parentheses of REFERENCES t(c).
        let stmt =
            parse("CREATE TABLE a (x INT FOREIGN KEY REFERENCES b(y), z INT UNIQUE)").unwrap();
        let Statement::CreateTable { columns, .. } = stmt else {
            panic!("expected CreateTable");
        };
        assert_eq!(columns.len(), 2);
        assert!(columns[0].foreign_key.is_some());
        assert!(columns[1].unique);
    }

    #[test]
    fn test_create_table_preserves_name_case() {
        let Statement::CreateTable { table, .. } =
            parse("CREATE TABLE Suppliers (id INT)").unwrap()
        else {
            panic!("expected CreateTable");
        };
        assert_eq!(table, "Suppliers");
    }

    #[test]
    fn test_create_index() {
        assert_eq!(
            parse("CREATE INDEX idx_email ON users(email)").unwrap(),
            Statement::CreateIndex {
                name: "idx_email".into(),
                table: "users".into(),
                column: "email".into(),
            }
        );
        // Space before the parenthesis is accepted.
        assert_eq!(
            parse("create index i on t (c)").unwrap(),
            Statement::CreateIndex {
                name: "i".into(),
                table: "t".into(),
                column: "c".into(),
            }
        );
    }

    #[test]
    fn test_insert_with_quoted_commas() {
        let Statement::Insert { table, values } =
            parse("INSERT INTO suppliers VALUES (1, 'Acme, Inc', \"a@b.com\")").unwrap()
        else {
            panic!("expected Insert");
        };
        assert_eq!(table, "suppliers");
        assert_eq!(
            values,
            vec![
                Literal {
                    text: "1".into(),
                    quoted: false
                },
                Literal {
                    text: "Acme, Inc".into(),
                    quoted: true
                },
                Literal {
                    text: "a@b.com".into(),
                    quoted: true
                },
            ]
        );
    }

    #[test]
    fn test_insert_without_space_before_parenthesis() {
        let Statement::Insert { values, .. } = parse("INSERT INTO t VALUES(1, 2)").unwrap() else {
            panic!("expected Insert");
        };
        assert_eq!(values.len(), 2);
    }

    #[test]
    fn test_select_star_with_where_preserves_case() {
        let Statement::Select(select) =
            parse("select * from Users WHERE Name = 'Alice'").unwrap()
        else {
            panic!("expected Select");
        };
        assert_eq!(select.table, "Users");
        assert_eq!(select.projection, Projection::Star);
        assert_eq!(select.where_clause.as_deref(), Some("Name = 'Alice'"));
        assert!(select.join.is_none());
    }

    #[test]
    fn test_select_column_list() {
        let Statement::Select(select) = parse("SELECT id, name FROM users").unwrap() else {
            panic!("expected Select");
        };
        assert_eq!(
            select.projection,
            Projection::Columns(vec!["id".into(), "name".into()])
        );
    }

    #[test]
    fn test_select_join() {
        let Statement::Select(select) =
            parse("SELECT * FROM orders JOIN products ON orders.product_id = products.id").unwrap()
        else {
            panic!("expected Select");
        };
        let join = select.join.unwrap();
        assert_eq!(join.table, "products");
        assert_eq!(join.left.table, "orders");
        assert_eq!(join.left.column, "product_id");
        assert_eq!(join.right.table, "products");
        assert_eq!(join.right.column, "id");
    }

    #[test]
    fn test_select_join_with_where() {
        let Statement::Select(select) =
            parse("SELECT * FROM a JOIN b ON a.x = b.y WHERE x > 3").unwrap()
        else {
            panic!("expected Select");
        };
        assert!(select.join.is_some());
        assert_eq!(select.where_clause.as_deref(), Some("x > 3"));
    }

    #[test]
    fn test_malformed_join_condition() {
        let err = parse("SELECT * FROM a JOIN b ON a.x").unwrap_err();
        assert!(matches!(err, DbError::MalformedJoin(_)));
        let err = parse("SELECT * FROM a JOIN b ON x = y").unwrap_err();
        assert!(matches!(err, DbError::MalformedJoin(_)));
    }

    #[test]
    fn test_update_multiple_assignments() {
        let Statement::Update {
            table,
            assignments,
            where_clause,
        } = parse("UPDATE users SET name = 'Bob, Jr', age = 40 WHERE id = 1").unwrap()
        else {
            panic!("expected Update");
        };
        assert_eq!(table, "users");
        assert_eq!(assignments.len(), 2);
        assert_eq!(assignments[0].0, "name");
        assert_eq!(
            assignments[0].1,
            Literal {
                text: "Bob, Jr".into(),
                quoted: true
            }
        );
        assert_eq!(assignments[1].0, "age");
        assert_eq!(
            assignments[1].1,
            Literal {
                text: "40".into(),
                quoted: false
            }
        );
        assert_eq!(where_clause.as_deref(), Some("id = 1"));
    }

    #[test]
    fn test_update_without_where() {
        let Statement::Update { where_clause, .. } =
            parse("UPDATE t SET a = 1").unwrap()
        else {
            panic!("expected Update");
        };
        assert!(where_clause.is_none());
    }

    #[test]
    fn test_delete() {
        assert_eq!(
            parse("DELETE FROM users WHERE id = 3").unwrap(),
            Statement::Delete {
                table: "users".into(),
                where_clause: Some("id = 3".into()),
            }
        );
        assert_eq!(
            parse("delete from users").unwrap(),
            Statement::Delete {
                table: "users".into(),
                where_clause: None,
            }
        );
    }

    #[test]
    fn test_drop_table() {
        assert_eq!(
            parse("DROP TABLE Users;").unwrap(),
            Statement::DropTable {
                table: "Users".into()
            }
        );
    }

    #[test]
    fn test_unknown_command_carries_fragment() {
        let err = parse("TRUNCATE users").unwrap_err();
        assert_eq!(err, DbError::UnknownCommand("TRUNCATE users".into()));
    }

    #[test]
    fn test_empty_command() {
        assert!(matches!(parse("  ;  "), Err(DbError::Syntax { .. })));
    }

    #[test]
    fn test_create_table_without_parentheses() {
        assert!(matches!(
            parse("CREATE TABLE users"),
            Err(DbError::Syntax { .. })
        ));
    }
}
