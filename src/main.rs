use std::io::{self, BufRead, Write};

use reldb::{Database, ExecResult};

/// Minimal line-oriented shell around the engine. One statement per line,
/// `exit` or EOF to quit.
fn main() -> io::Result<()> {
    let mut db = Database::new();
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    println!("reldb shell. One statement per line, 'exit' to quit.");
    loop {
        print!("db> ");
        stdout.flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line.eq_ignore_ascii_case("exit") || line.eq_ignore_ascii_case("quit") {
            break;
        }

        match db.execute(line) {
            Ok(ExecResult::Text(text)) => println!("{text}"),
            Ok(ExecResult::Rows(rows)) => {
                for row in &rows {
                    let mut cols: Vec<_> = row.iter().collect();
                    cols.sort_by(|a, b| a.0.cmp(b.0));
                    let line: Vec<String> =
                        cols.iter().map(|(k, v)| format!("{k}={v}")).collect();
                    println!("{}", line.join(" | "));
                }
                println!("{} row(s) returned.", rows.len());
            }
            Err(err) => println!("Error: {err}"),
        }
    }
    Ok(())
}
