use grants_ytd::schema::{resolve_role, ColumnRole};
use grants_ytd::{schema::resolve::numeric_amount_column, table::load_table};
use std::{env, path::Path, process::exit};

fn main() {
    // Expect exactly one CLI argument: path to an award table.
    let args: Vec<String> = env::args().collect();
    if args.len() != 2 {
        eprintln!("Usage: {} <TABLE_FILE>", args[0]);
        exit(1);
    }
    if let Err(e) = inspect(Path::new(&args[1])) {
        eprintln!("Error: {:#}", e);
        exit(1);
    }
}

/// Load the table and print which column every role resolves to.
fn inspect(path: &Path) -> anyhow::Result<()> {
    let table = load_table(path)?;

    println!("=== Table: {} ===", path.display());
    println!("Rows:    {}", table.len());
    println!("Columns: {}", table.headers.len());
    println!();

    println!("=== Roles ===");
    for role in ColumnRole::ALL {
        let found = resolve_role(&table.headers, role).unwrap_or("-");
        println!("- {:<18} | {}", role.as_str(), found);
    }
    println!();

    println!(
        "Heuristic amount: {}",
        numeric_amount_column(&table).unwrap_or("-")
    );
    Ok(())
}
