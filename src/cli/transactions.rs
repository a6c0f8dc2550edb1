use colored::Colorize;
use comfy_table::{Cell, Table};
use rust_decimal::Decimal;

use crate::cli::{as_of_or_today, open_db, parse_date_opt};
use crate::error::Result;
use crate::fmt::money;
use crate::models::{parse_date, EventKind};
use crate::store::{self, TransactionInput};

pub fn add(case_id: i64, kind: &str, amount: Decimal, date: &str, description: Option<String>) -> Result<()> {
    let conn = open_db()?;
    let input = TransactionInput {
        date: parse_date(date)?,
        kind: kind.parse()?,
        amount,
        description,
    };
    let id = store::add_transaction(&conn, case_id, &input)?;
    println!("Added {} {id}: {} on {}", input.kind, money(amount), input.date);
    Ok(())
}

pub fn list(case_id: i64, as_of: Option<&str>) -> Result<()> {
    let conn = open_db()?;
    let as_of = as_of_or_today(as_of)?;
    let rows = store::ledger(&conn, case_id, as_of)?;

    if rows.is_empty() {
        println!("No transactions found.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["ID", "Date", "Type", "Amount", "Accrued Interest", "Principal Balance", "Description"]);
    for row in &rows {
        let t = &row.transaction;
        let amount = match t.kind {
            EventKind::Payment => money(t.amount).green().to_string(),
            EventKind::Cost => money(t.amount).red().to_string(),
        };
        let (interest, principal) = match &row.entry {
            Some(e) => (money(e.interest_accrued_this_period), money(e.remaining_principal)),
            None => ("pending".dimmed().to_string(), String::new()),
        };
        table.add_row(vec![
            Cell::new(t.id),
            Cell::new(t.date),
            Cell::new(t.kind.as_str().to_uppercase()),
            Cell::new(amount),
            Cell::new(interest),
            Cell::new(principal),
            Cell::new(t.description.as_deref().unwrap_or("")),
        ]);
    }
    println!("Transactions for case {case_id} as of {as_of}\n{table}");
    Ok(())
}

pub fn edit(
    id: i64,
    kind: Option<String>,
    amount: Option<Decimal>,
    date: Option<String>,
    description: Option<String>,
) -> Result<()> {
    let conn = open_db()?;
    let existing = store::get_transaction(&conn, id)?;
    let input = TransactionInput {
        date: parse_date_opt(date.as_deref())?.unwrap_or(existing.date),
        kind: match kind {
            Some(k) => k.parse()?,
            None => existing.kind,
        },
        amount: amount.unwrap_or(existing.amount),
        description: description.or(existing.description),
    };
    store::update_transaction(&conn, id, &input)?;
    println!("Updated transaction {id}");
    Ok(())
}

pub fn delete(id: i64) -> Result<()> {
    let conn = open_db()?;
    store::delete_transaction(&conn, id)?;
    println!("Deleted transaction {id}");
    Ok(())
}
