use crate::db::{get_connection, get_metadata};
use crate::error::Result;
use crate::fmt::{format_bytes, percent};
use crate::settings::load_settings;
use crate::store::count_cases;

pub fn run() -> Result<()> {
    let settings = load_settings();
    let db_path = settings.db_path();

    println!("Data dir:     {}", settings.data_dir);
    println!("Database:     {}", db_path.display());
    println!("Default rate: {}", percent(settings.default_rate));

    if db_path.exists() {
        let size = std::fs::metadata(&db_path)?.len();
        println!("DB size:      {}", format_bytes(size));

        let conn = get_connection(&db_path)?;
        let firm = get_metadata(&conn, "firm_name");
        println!("Firm:         {}", firm.as_deref().unwrap_or("(not set)"));

        let cases = count_cases(&conn)?;
        let payments: i64 = conn.query_row(
            "SELECT count(*) FROM transactions WHERE kind = 'payment'",
            [],
            |r| r.get(0),
        )?;
        let costs: i64 = conn.query_row(
            "SELECT count(*) FROM transactions WHERE kind = 'cost'",
            [],
            |r| r.get(0),
        )?;

        println!();
        println!("Cases:     {cases}");
        println!("Payments:  {payments}");
        println!("Costs:     {costs}");
    } else {
        println!();
        println!("Database not found. Run `payoff init` to set up.");
    }

    Ok(())
}
