use reldb::{Database, DbError, ExecResult};

fn run(db: &mut Database, sql: &str) -> Result<(), DbError> {
    println!("db> {sql}");
    match db.execute(sql)? {
        ExecResult::Text(text) => println!("{text}\n"),
        ExecResult::Rows(rows) => {
            for row in &rows {
                let mut cols: Vec<_> = row.iter().collect();
                cols.sort_by(|a, b| a.0.cmp(b.0));
                let line: Vec<String> = cols.iter().map(|(k, v)| format!("{k}={v}")).collect();
                println!("{}", line.join(" | "));
            }
            println!("{} row(s) returned.\n", rows.len());
        }
    }
    Ok(())
}

fn main() -> Result<(), DbError> {
    println!("Inventory Demo\n");

    let mut db = Database::new();

    run(
        &mut db,
        "CREATE TABLE suppliers (id INT PRIMARY KEY, name VARCHAR, email VARCHAR UNIQUE)",
    )?;
    run(
        &mut db,
        "CREATE TABLE products (id INT PRIMARY KEY, name VARCHAR, price FLOAT, \
         supplier_id INT FOREIGN KEY REFERENCES suppliers(id))",
    )?;

    run(
        &mut db,
        "INSERT INTO suppliers VALUES (1, 'TechSupply', 'contact@techsupply.com')",
    )?;
    run(
        &mut db,
        "INSERT INTO suppliers VALUES (2, 'GlobalParts', 'sales@globalparts.com')",
    )?;
    run(&mut db, "INSERT INTO products VALUES (1, 'Laptop', 1200.50, 1)")?;
    run(&mut db, "INSERT INTO products VALUES (2, 'Mouse', 25.99, 1)")?;
    run(&mut db, "INSERT INTO products VALUES (3, 'Keyboard', 45.00, 2)")?;

    // Constraints at work: duplicate key and dangling reference both fail.
    for bad in [
        "INSERT INTO suppliers VALUES (1, 'Impostor', 'x@y.com')",
        "INSERT INTO products VALUES (4, 'Ghost', 9.99, 42)",
    ] {
        println!("db> {bad}");
        match db.execute(bad) {
            Ok(_) => println!("unexpectedly accepted\n"),
            Err(err) => println!("Error: {err}\n"),
        }
    }

    run(&mut db, "CREATE INDEX idx_supplier ON products(supplier_id)")?;
    run(&mut db, "SELECT name, price FROM products WHERE supplier_id = 1")?;
    run(&mut db, "SELECT name FROM products WHERE name LIKE '%board'")?;

    run(
        &mut db,
        "SELECT * FROM products JOIN suppliers ON products.supplier_id = suppliers.id",
    )?;

    run(&mut db, "UPDATE products SET price = 999.99 WHERE id = 1")?;

    // Deleting a supplier sets dependent foreign keys to NULL.
    run(&mut db, "DELETE FROM suppliers WHERE id = 1")?;
    run(&mut db, "SELECT * FROM products")?;

    run(&mut db, "SHOW TABLES")?;
    run(&mut db, "DESCRIBE products")?;
    run(&mut db, "DROP TABLE products")?;

    Ok(())
}
