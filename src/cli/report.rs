use std::io::Write;

use colored::Colorize;
use comfy_table::{Cell, Table};

use crate::cli::{as_of_or_today, open_db};
use crate::contract::TimelineRow;
use crate::error::Result;
use crate::fmt::{daily, money, percent};
use crate::models::{CalculationResult, EntryType};
use crate::store;

pub fn payoff(case_id: i64, as_of: Option<&str>) -> Result<()> {
    let conn = open_db()?;
    let as_of = as_of_or_today(as_of)?;
    let case = store::get_case(&conn, case_id)?;
    let r = store::calculate_case(&conn, case_id, as_of)?;

    let mut table = Table::new();
    table.set_header(vec!["Item", "Amount"]);
    table.add_row(vec![Cell::new("Judgment amount"), Cell::new(money(r.initial_principal))]);
    table.add_row(vec![Cell::new("Interest rate"), Cell::new(percent(case.annual_interest_rate))]);
    table.add_row(vec![Cell::new("Days since judgment"), Cell::new(r.total_days)]);
    table.add_row(vec![Cell::new("Daily interest"), Cell::new(daily(r.daily_interest))]);
    table.add_row(vec![Cell::new("Costs after judgment"), Cell::new(money(r.total_costs))]);
    table.add_row(vec![Cell::new("Payments to date"), Cell::new(money(r.total_payments))]);
    table.add_row(vec![Cell::new("Principal reduction"), Cell::new(money(r.principal_reduction))]);
    table.add_row(vec![Cell::new("Interest to date"), Cell::new(money(r.interest_to_date))]);
    table.add_row(vec![Cell::new("Interest this period"), Cell::new(money(r.current_period_interest))]);
    table.add_row(vec![Cell::new(""), Cell::new("")]);
    table.add_row(vec![Cell::new("Principal balance"), Cell::new(money(r.remaining_principal))]);
    table.add_row(vec![Cell::new("Accrued interest"), Cell::new(money(r.unpaid_interest))]);
    table.add_row(vec![
        Cell::new("TOTAL PAYOFF".green().bold()),
        Cell::new(money(r.total_due).green().bold()),
    ]);

    println!(
        "Payoff: {} ({}) as of {as_of}\n{table}",
        case.case_name, case.court_case_number
    );
    Ok(())
}

pub fn timeline(case_id: i64, as_of: Option<&str>, csv_path: Option<String>) -> Result<()> {
    let conn = open_db()?;
    let as_of = as_of_or_today(as_of)?;
    let r = store::calculate_case(&conn, case_id, as_of)?;

    if let Some(path) = csv_path {
        let file = std::fs::File::create(&path)?;
        write_timeline_csv(&r, file)?;
        println!("Timeline ({} rows) written to {path}", r.timeline.len());
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec![
        "Date", "Event", "Days", "Interest", "Payment", "Cost", "To Interest", "To Principal", "Principal", "Unpaid Interest",
    ]);
    for e in &r.timeline {
        let event = match e.event_type {
            EntryType::Payment => e.event_type.as_str().green().to_string(),
            EntryType::Cost => e.event_type.as_str().red().to_string(),
            EntryType::InterestOnly => e.event_type.as_str().dimmed().to_string(),
        };
        table.add_row(vec![
            Cell::new(e.event_date),
            Cell::new(event),
            Cell::new(e.days_since_last_event),
            Cell::new(money(e.interest_accrued_this_period)),
            Cell::new(money(e.payment_amount)),
            Cell::new(money(e.cost_amount)),
            Cell::new(money(e.applied_to_interest)),
            Cell::new(money(e.applied_to_principal)),
            Cell::new(money(e.remaining_principal)),
            Cell::new(money(e.unpaid_interest_balance)),
        ]);
    }
    println!("Timeline for case {case_id} as of {as_of} (total due {})\n{table}", money(r.total_due));
    Ok(())
}

pub fn write_timeline_csv<W: Write>(result: &CalculationResult, writer: W) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    for entry in &result.timeline {
        wtr.serialize(TimelineRow::from(entry))?;
    }
    wtr.flush()?;
    Ok(())
}
