use std::str::FromStr;

use chrono::NaiveDate;
use regex::Regex;
use rusqlite::types::Type;
use rusqlite::{Connection, OptionalExtension, Row};
use rust_decimal::Decimal;
use tracing::info;

use crate::engine;
use crate::error::{PayoffError, Result};
use crate::models::{
    CalculationResult, CaseDetails, CaseSummary, EventKind, JudgmentCase, TimelineEntry,
    Transaction, TransactionEvent,
};

const EMAIL_PATTERN: &str = r"^[^\s@]+@[^\s@]+\.[^\s@]+$";
const ZIP_PATTERN: &str = r"^\d{5}(-\d{4})?$";
const PHONE_PATTERN: &str = r"^\+?[0-9]{10,15}$";

fn matches(value: &str, pattern: &str) -> bool {
    Regex::new(pattern)
        .map(|re| re.is_match(value))
        .unwrap_or(false)
}

// ---------------------------------------------------------------------------
// Inputs
// ---------------------------------------------------------------------------

/// Everything needed to record a new case.
#[derive(Debug, Clone)]
pub struct CaseInput {
    pub case_name: String,
    pub court_name: String,
    pub court_case_number: String,
    pub judgment_amount: Decimal,
    pub judgment_date: NaiveDate,
    pub annual_interest_rate: Decimal,
    pub details: CaseDetails,
}

impl CaseInput {
    pub fn validate(&self) -> Result<()> {
        for (label, value) in [
            ("case name", &self.case_name),
            ("court name", &self.court_name),
            ("court case number", &self.court_case_number),
        ] {
            if value.trim().chars().count() < 2 {
                return Err(PayoffError::InvalidField(format!(
                    "{label} must be at least 2 characters"
                )));
            }
        }
        if self.judgment_amount <= Decimal::ZERO {
            return Err(PayoffError::InvalidAmount(format!(
                "judgment amount must be positive, got {}",
                self.judgment_amount
            )));
        }
        if self.annual_interest_rate < Decimal::ZERO {
            return Err(PayoffError::InvalidRate(format!(
                "annual interest rate cannot be negative, got {}",
                self.annual_interest_rate
            )));
        }

        let d = &self.details;
        if let Some(end) = d.end_date {
            if end < self.judgment_date {
                return Err(PayoffError::InvalidRange(format!(
                    "end date {end} is before judgment date {}",
                    self.judgment_date
                )));
            }
        }
        if let Some(email) = &d.email {
            if !matches(email, EMAIL_PATTERN) {
                return Err(PayoffError::InvalidField(format!("invalid email: {email}")));
            }
        }
        if let Some(zip) = &d.zip_code {
            if !matches(zip, ZIP_PATTERN) {
                return Err(PayoffError::InvalidField(format!("invalid zip code: {zip}")));
            }
        }
        if let Some(phone) = &d.phone_number {
            if !matches(phone, PHONE_PATTERN) {
                return Err(PayoffError::InvalidField(format!(
                    "phone number must be 10-15 digits and may start with +: {phone}"
                )));
            }
        }
        Ok(())
    }
}

/// Partial edit of a case. `None` leaves the stored value alone and a blank
/// detail string clears it.
#[derive(Debug, Clone, Default)]
pub struct CaseUpdate {
    pub case_name: Option<String>,
    pub court_name: Option<String>,
    pub court_case_number: Option<String>,
    pub judgment_amount: Option<Decimal>,
    pub judgment_date: Option<NaiveDate>,
    pub annual_interest_rate: Option<Decimal>,
    pub details: CaseDetails,
    pub clear_end_date: bool,
}

#[derive(Debug, Clone)]
pub struct TransactionInput {
    pub date: NaiveDate,
    pub kind: EventKind,
    pub amount: Decimal,
    pub description: Option<String>,
}

impl TransactionInput {
    fn validate(&self, case: &JudgmentCase) -> Result<()> {
        if self.amount <= Decimal::ZERO {
            return Err(PayoffError::InvalidAmount(format!(
                "{} amount must be positive, got {}",
                self.kind, self.amount
            )));
        }
        if self.date < case.judgment_date {
            return Err(PayoffError::InvalidRange(format!(
                "{} on {} is before judgment date {}",
                self.kind, self.date, case.judgment_date
            )));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Row mapping
// ---------------------------------------------------------------------------

fn decimal_at(row: &Row, idx: usize) -> rusqlite::Result<Decimal> {
    let raw: String = row.get(idx)?;
    Decimal::from_str(&raw)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn date_at(row: &Row, idx: usize) -> rusqlite::Result<NaiveDate> {
    let raw: String = row.get(idx)?;
    NaiveDate::from_str(&raw)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn opt_date_at(row: &Row, idx: usize) -> rusqlite::Result<Option<NaiveDate>> {
    match row.get::<_, Option<String>>(idx)? {
        Some(_) => date_at(row, idx).map(Some),
        None => Ok(None),
    }
}

fn kind_at(row: &Row, idx: usize) -> rusqlite::Result<EventKind> {
    let raw: String = row.get(idx)?;
    EventKind::from_str(&raw)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

const CASE_COLUMNS: &str = "id, case_name, court_name, court_case_number, judgment_amount, \
    judgment_date, annual_interest_rate, end_date, firm_name, email, website, street_address, \
    city, state, zip_code, phone_number";

fn row_to_case(row: &Row) -> rusqlite::Result<JudgmentCase> {
    Ok(JudgmentCase {
        id: row.get(0)?,
        case_name: row.get(1)?,
        court_name: row.get(2)?,
        court_case_number: row.get(3)?,
        judgment_amount: decimal_at(row, 4)?,
        judgment_date: date_at(row, 5)?,
        annual_interest_rate: decimal_at(row, 6)?,
        details: CaseDetails {
            end_date: opt_date_at(row, 7)?,
            firm_name: row.get(8)?,
            email: row.get(9)?,
            website: row.get(10)?,
            street_address: row.get(11)?,
            city: row.get(12)?,
            state: row.get(13)?,
            zip_code: row.get(14)?,
            phone_number: row.get(15)?,
        },
    })
}

const TXN_COLUMNS: &str = "id, case_id, date, kind, amount, description";

fn row_to_transaction(row: &Row) -> rusqlite::Result<Transaction> {
    Ok(Transaction {
        id: row.get(0)?,
        case_id: row.get(1)?,
        date: date_at(row, 2)?,
        kind: kind_at(row, 3)?,
        amount: decimal_at(row, 4)?,
        description: row.get(5)?,
    })
}

// ---------------------------------------------------------------------------
// Cases
// ---------------------------------------------------------------------------

pub fn create_case(conn: &Connection, input: &CaseInput) -> Result<i64> {
    input.validate()?;
    let d = &input.details;
    conn.execute(
        "INSERT INTO cases (case_name, court_name, court_case_number, judgment_amount, \
         judgment_date, annual_interest_rate, end_date, firm_name, email, website, \
         street_address, city, state, zip_code, phone_number) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)",
        rusqlite::params![
            input.case_name.trim(),
            input.court_name.trim(),
            input.court_case_number.trim(),
            input.judgment_amount.to_string(),
            input.judgment_date.to_string(),
            input.annual_interest_rate.to_string(),
            d.end_date.map(|e| e.to_string()),
            d.firm_name,
            d.email,
            d.website,
            d.street_address,
            d.city,
            d.state,
            d.zip_code,
            d.phone_number,
        ],
    )?;
    let id = conn.last_insert_rowid();
    info!(case_id = id, case = %input.case_name, "case created");
    Ok(id)
}

pub fn get_case(conn: &Connection, id: i64) -> Result<JudgmentCase> {
    conn.query_row(
        &format!("SELECT {CASE_COLUMNS} FROM cases WHERE id = ?1"),
        [id],
        row_to_case,
    )
    .optional()?
    .ok_or(PayoffError::UnknownCase(id))
}

pub fn list_cases(conn: &Connection, limit: i64, offset: i64) -> Result<Vec<JudgmentCase>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {CASE_COLUMNS} FROM cases ORDER BY id LIMIT ?1 OFFSET ?2"
    ))?;
    let rows = stmt.query_map([limit, offset], row_to_case)?;
    Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
}

pub fn count_cases(conn: &Connection) -> Result<i64> {
    Ok(conn.query_row("SELECT count(*) FROM cases", [], |r| r.get(0))?)
}

pub fn update_case(conn: &Connection, id: i64, update: &CaseUpdate) -> Result<JudgmentCase> {
    let current = get_case(conn, id)?;
    let mut details = current.details.clone();
    details.merge(&update.details);
    if update.clear_end_date {
        details.end_date = None;
    }
    let merged = CaseInput {
        case_name: update.case_name.clone().unwrap_or(current.case_name),
        court_name: update.court_name.clone().unwrap_or(current.court_name),
        court_case_number: update
            .court_case_number
            .clone()
            .unwrap_or(current.court_case_number),
        judgment_amount: update.judgment_amount.unwrap_or(current.judgment_amount),
        judgment_date: update.judgment_date.unwrap_or(current.judgment_date),
        annual_interest_rate: update
            .annual_interest_rate
            .unwrap_or(current.annual_interest_rate),
        details,
    };
    merged.validate()?;

    let earliest: Option<String> = conn.query_row(
        "SELECT MIN(date) FROM transactions WHERE case_id = ?1",
        [id],
        |r| r.get(0),
    )?;
    if let Some(earliest) = earliest {
        if earliest.as_str() < merged.judgment_date.to_string().as_str() {
            return Err(PayoffError::InvalidRange(format!(
                "judgment date {} is after existing transaction on {earliest}",
                merged.judgment_date
            )));
        }
    }

    let d = &merged.details;
    conn.execute(
        "UPDATE cases SET case_name = ?1, court_name = ?2, court_case_number = ?3, \
         judgment_amount = ?4, judgment_date = ?5, annual_interest_rate = ?6, end_date = ?7, \
         firm_name = ?8, email = ?9, website = ?10, street_address = ?11, city = ?12, \
         state = ?13, zip_code = ?14, phone_number = ?15, updated_at = datetime('now') \
         WHERE id = ?16",
        rusqlite::params![
            merged.case_name.trim(),
            merged.court_name.trim(),
            merged.court_case_number.trim(),
            merged.judgment_amount.to_string(),
            merged.judgment_date.to_string(),
            merged.annual_interest_rate.to_string(),
            d.end_date.map(|e| e.to_string()),
            d.firm_name,
            d.email,
            d.website,
            d.street_address,
            d.city,
            d.state,
            d.zip_code,
            d.phone_number,
            id,
        ],
    )?;
    info!(case_id = id, "case updated");
    get_case(conn, id)
}

/// Delete a case. Its transactions go with it.
pub fn delete_case(conn: &Connection, id: i64) -> Result<()> {
    let deleted = conn.execute("DELETE FROM cases WHERE id = ?1", [id])?;
    if deleted == 0 {
        return Err(PayoffError::UnknownCase(id));
    }
    info!(case_id = id, "case deleted");
    Ok(())
}

// ---------------------------------------------------------------------------
// Transactions
// ---------------------------------------------------------------------------

pub fn add_transaction(conn: &Connection, case_id: i64, input: &TransactionInput) -> Result<i64> {
    let case = get_case(conn, case_id)?;
    input.validate(&case)?;
    conn.execute(
        "INSERT INTO transactions (case_id, date, kind, amount, description) \
         VALUES (?1, ?2, ?3, ?4, ?5)",
        rusqlite::params![
            case_id,
            input.date.to_string(),
            input.kind.as_str(),
            input.amount.to_string(),
            input.description,
        ],
    )?;
    let id = conn.last_insert_rowid();
    info!(case_id, transaction_id = id, kind = %input.kind, amount = %input.amount, "transaction added");
    Ok(id)
}

pub fn get_transaction(conn: &Connection, id: i64) -> Result<Transaction> {
    conn.query_row(
        &format!("SELECT {TXN_COLUMNS} FROM transactions WHERE id = ?1"),
        [id],
        row_to_transaction,
    )
    .optional()?
    .ok_or(PayoffError::UnknownTransaction(id))
}

/// Transactions in replay order: by date, then by insertion.
pub fn list_transactions(conn: &Connection, case_id: i64) -> Result<Vec<Transaction>> {
    get_case(conn, case_id)?;
    let mut stmt = conn.prepare(&format!(
        "SELECT {TXN_COLUMNS} FROM transactions WHERE case_id = ?1 ORDER BY date, id"
    ))?;
    let rows = stmt.query_map([case_id], row_to_transaction)?;
    Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
}

pub fn update_transaction(conn: &Connection, id: i64, input: &TransactionInput) -> Result<()> {
    let existing = get_transaction(conn, id)?;
    let case = get_case(conn, existing.case_id)?;
    input.validate(&case)?;
    conn.execute(
        "UPDATE transactions SET date = ?1, kind = ?2, amount = ?3, description = ?4 WHERE id = ?5",
        rusqlite::params![
            input.date.to_string(),
            input.kind.as_str(),
            input.amount.to_string(),
            input.description,
            id,
        ],
    )?;
    info!(case_id = existing.case_id, transaction_id = id, "transaction updated");
    Ok(())
}

pub fn delete_transaction(conn: &Connection, id: i64) -> Result<()> {
    let deleted = conn.execute("DELETE FROM transactions WHERE id = ?1", [id])?;
    if deleted == 0 {
        return Err(PayoffError::UnknownTransaction(id));
    }
    info!(transaction_id = id, "transaction deleted");
    Ok(())
}

/// A case's events in insertion order, fully loaded before any calculation.
pub fn load_events(conn: &Connection, case_id: i64) -> Result<Vec<TransactionEvent>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {TXN_COLUMNS} FROM transactions WHERE case_id = ?1 ORDER BY id"
    ))?;
    let rows = stmt.query_map([case_id], row_to_transaction)?;
    let txns = rows.collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(txns.iter().map(Transaction::event).collect())
}

// ---------------------------------------------------------------------------
// Calculations
// ---------------------------------------------------------------------------

pub fn calculate_case(conn: &Connection, case_id: i64, as_of: NaiveDate) -> Result<CalculationResult> {
    let case = get_case(conn, case_id)?;
    let events = load_events(conn, case_id)?;
    engine::calculate(&case.terms(), &events, as_of)
}

/// A transaction next to the timeline row it produced. `entry` is `None`
/// for transactions dated after the as-of date.
pub struct LedgerRow {
    pub transaction: Transaction,
    pub entry: Option<TimelineEntry>,
}

pub fn ledger(conn: &Connection, case_id: i64, as_of: NaiveDate) -> Result<Vec<LedgerRow>> {
    let txns = list_transactions(conn, case_id)?;
    let result = calculate_case(conn, case_id, as_of)?;
    // Timeline rows follow the same (date, id) order, minus the final
    // interest-only row.
    let mut entries = result.timeline.into_iter();
    Ok(txns
        .into_iter()
        .map(|transaction| {
            let entry = if transaction.date <= as_of {
                entries.next()
            } else {
                None
            };
            LedgerRow { transaction, entry }
        })
        .collect())
}

/// Case list with each payoff computed as of `as_of`. Cases whose judgment
/// is dated after `as_of` are valued on their judgment date.
pub fn case_summaries(
    conn: &Connection,
    as_of: NaiveDate,
    limit: i64,
    offset: i64,
) -> Result<Vec<CaseSummary>> {
    list_cases(conn, limit, offset)?
        .into_iter()
        .map(|case| -> Result<CaseSummary> {
            let events = load_events(conn, case.id)?;
            let result = engine::calculate(&case.terms(), &events, as_of.max(case.judgment_date))?;
            Ok(CaseSummary {
                id: case.id,
                case_name: case.case_name,
                court_name: case.court_name,
                court_case_number: case.court_case_number,
                judgment_amount: case.judgment_amount,
                judgment_date: case.judgment_date,
                last_payment_date: result.last_payment_date,
                total_payment_to_date: result.total_payments,
                interest_to_date: result.interest_to_date,
                payoff: result.total_due,
            })
        })
        .collect()
}
