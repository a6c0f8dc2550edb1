use chrono::{Local, Months, NaiveDate};
use rusqlite::Connection;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::cli::open_db;
use crate::error::Result;
use crate::models::{CaseDetails, EventKind};
use crate::store::{self, CaseInput, TransactionInput};

const DEMO_CASE: &str = "Rivera v. Holt";
const GARNISHMENT_CASE: &str = "Northwind Supply v. Calder";

struct DemoTxn {
    date: NaiveDate,
    kind: EventKind,
    amount: Decimal,
    description: &'static str,
}

fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default()
}

/// Monthly garnishment payments starting one month after `start`, up to today,
/// plus a levy fee in the second month.
fn garnishment_schedule(start: NaiveDate, today: NaiveDate) -> Vec<DemoTxn> {
    let mut txns = Vec::new();
    for i in 1.. {
        let Some(date) = start.checked_add_months(Months::new(i)) else {
            break;
        };
        if date > today {
            break;
        }
        txns.push(DemoTxn {
            date,
            kind: EventKind::Payment,
            amount: dec!(412.50),
            description: "Wage garnishment",
        });
        if i == 2 {
            txns.push(DemoTxn {
                date,
                kind: EventKind::Cost,
                amount: dec!(85),
                description: "Sheriff levy fee",
            });
        }
    }
    txns
}

fn insert_demo_data(conn: &Connection) -> Result<usize> {
    let today = Local::now().date_naive();
    let mut inserted = 0;

    let rivera = store::create_case(
        conn,
        &CaseInput {
            case_name: DEMO_CASE.to_string(),
            court_name: "Superior Court of Fresno County".to_string(),
            court_case_number: "24CECG00123".to_string(),
            judgment_amount: dec!(100000),
            judgment_date: ymd(2024, 1, 1),
            annual_interest_rate: dec!(10),
            details: CaseDetails {
                firm_name: Some("Acme Legal".to_string()),
                city: Some("Fresno".to_string()),
                state: Some("CA".to_string()),
                ..Default::default()
            },
        },
    )?;
    store::add_transaction(
        conn,
        rivera,
        &TransactionInput {
            date: ymd(2024, 4, 1),
            kind: EventKind::Payment,
            amount: dec!(5000),
            description: Some("Settlement installment".to_string()),
        },
    )?;
    inserted += 1;

    let start = today.checked_sub_months(Months::new(18)).unwrap_or(today);
    let calder = store::create_case(
        conn,
        &CaseInput {
            case_name: GARNISHMENT_CASE.to_string(),
            court_name: "Sacramento County Superior Court".to_string(),
            court_case_number: "34-2023-00098765".to_string(),
            judgment_amount: dec!(18250.75),
            judgment_date: start,
            annual_interest_rate: dec!(10),
            details: CaseDetails::default(),
        },
    )?;
    for txn in garnishment_schedule(start, today) {
        store::add_transaction(
            conn,
            calder,
            &TransactionInput {
                date: txn.date,
                kind: txn.kind,
                amount: txn.amount,
                description: Some(txn.description.to_string()),
            },
        )?;
        inserted += 1;
    }

    Ok(inserted)
}

pub fn run() -> Result<()> {
    let conn = open_db()?;

    let exists: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM cases WHERE case_name = ?1)",
        [DEMO_CASE],
        |r| r.get(0),
    )?;
    if exists {
        println!("Demo data already loaded (case '{DEMO_CASE}' exists).");
        return Ok(());
    }

    let txn_count = insert_demo_data(&conn)?;

    println!("Demo data loaded!");
    println!("  Cases:        {DEMO_CASE}, {GARNISHMENT_CASE}");
    println!("  Transactions: {txn_count}");
    println!();
    println!("Try these next:");
    println!("  payoff cases list");
    println!("  payoff payoff 1 --as-of 2024-07-01");
    println!("  payoff timeline 2");
    println!("  payoff tx list 2");

    Ok(())
}
