use colored::Colorize;
use comfy_table::{Cell, Table};
use rust_decimal::Decimal;

use crate::cli::{as_of_or_today, open_db, parse_date_opt, DetailArgs};
use crate::error::Result;
use crate::fmt::{money, percent};
use crate::models::parse_date;
use crate::settings::load_settings;
use crate::store::{self, CaseInput, CaseUpdate};

#[allow(clippy::too_many_arguments)]
pub fn add(
    name: &str,
    court: &str,
    number: &str,
    amount: Decimal,
    date: &str,
    rate: Option<Decimal>,
    details: DetailArgs,
) -> Result<()> {
    let conn = open_db()?;
    let input = CaseInput {
        case_name: name.to_string(),
        court_name: court.to_string(),
        court_case_number: number.to_string(),
        judgment_amount: amount,
        judgment_date: parse_date(date)?,
        annual_interest_rate: rate.unwrap_or(load_settings().default_rate),
        details: details.into_details()?,
    };
    let id = store::create_case(&conn, &input)?;
    println!("Added case {id}: {name}");
    Ok(())
}

pub fn list(limit: i64, offset: i64, as_of: Option<&str>) -> Result<()> {
    let conn = open_db()?;
    let as_of = as_of_or_today(as_of)?;
    let rows = store::case_summaries(&conn, as_of, limit, offset)?;

    if rows.is_empty() {
        println!("No cases found.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec![
        "ID", "Case", "Court", "Number", "Judgment", "Judgment Date", "Last Payment", "Paid", "Interest", "Payoff",
    ]);
    for r in &rows {
        table.add_row(vec![
            Cell::new(r.id),
            Cell::new(&r.case_name),
            Cell::new(&r.court_name),
            Cell::new(&r.court_case_number),
            Cell::new(money(r.judgment_amount)),
            Cell::new(r.judgment_date),
            Cell::new(r.last_payment_date.map(|d| d.to_string()).unwrap_or_default()),
            Cell::new(money(r.total_payment_to_date)),
            Cell::new(money(r.interest_to_date)),
            Cell::new(money(r.payoff).bold()),
        ]);
    }
    let total = store::count_cases(&conn)?;
    println!("Cases as of {as_of} ({} of {total})\n{table}", rows.len());
    Ok(())
}

pub fn show(id: i64) -> Result<()> {
    let conn = open_db()?;
    let case = store::get_case(&conn, id)?;
    let d = &case.details;

    let mut table = Table::new();
    table.set_header(vec!["Field", "Value"]);
    let rows: Vec<(&str, String)> = vec![
        ("Case", case.case_name.clone()),
        ("Court", case.court_name.clone()),
        ("Case number", case.court_case_number.clone()),
        ("Judgment amount", money(case.judgment_amount)),
        ("Judgment date", case.judgment_date.to_string()),
        ("Interest rate", percent(case.annual_interest_rate)),
        ("End date", d.end_date.map(|e| e.to_string()).unwrap_or_default()),
        ("Firm", d.firm_name.clone().unwrap_or_default()),
        ("Email", d.email.clone().unwrap_or_default()),
        ("Website", d.website.clone().unwrap_or_default()),
        ("Street", d.street_address.clone().unwrap_or_default()),
        ("City", d.city.clone().unwrap_or_default()),
        ("State", d.state.clone().unwrap_or_default()),
        ("Zip", d.zip_code.clone().unwrap_or_default()),
        ("Phone", d.phone_number.clone().unwrap_or_default()),
    ];
    for (label, value) in rows {
        table.add_row(vec![Cell::new(label), Cell::new(value)]);
    }
    println!("Case {}\n{table}", case.id);
    Ok(())
}

#[allow(clippy::too_many_arguments)]
pub fn edit(
    id: i64,
    name: Option<String>,
    court: Option<String>,
    number: Option<String>,
    amount: Option<Decimal>,
    date: Option<String>,
    rate: Option<Decimal>,
    mut details: DetailArgs,
) -> Result<()> {
    let conn = open_db()?;
    let clear_end_date = details.end_date.as_deref().is_some_and(|d| d.trim().is_empty());
    if clear_end_date {
        details.end_date = None;
    }
    let update = CaseUpdate {
        case_name: name,
        court_name: court,
        court_case_number: number,
        judgment_amount: amount,
        judgment_date: parse_date_opt(date.as_deref())?,
        annual_interest_rate: rate,
        details: details.into_details()?,
        clear_end_date,
    };
    let case = store::update_case(&conn, id, &update)?;
    println!("Updated case {}: {}", case.id, case.case_name);
    Ok(())
}

pub fn delete(id: i64) -> Result<()> {
    let conn = open_db()?;
    let case = store::get_case(&conn, id)?;
    store::delete_case(&conn, id)?;
    println!("Deleted case {id}: {}", case.case_name.red());
    Ok(())
}
