use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::error::{PayoffError, Result};

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parse a `YYYY-MM-DD` date, mapping failures to `MalformedDate`.
pub fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), DATE_FORMAT)
        .map_err(|_| PayoffError::MalformedDate(s.to_string()))
}

#[derive(Debug, Clone, PartialEq)]
pub struct JudgmentCase {
    pub id: i64,
    pub case_name: String,
    pub court_name: String,
    pub court_case_number: String,
    pub judgment_amount: Decimal,
    pub judgment_date: NaiveDate,
    pub annual_interest_rate: Decimal,
    pub details: CaseDetails,
}

/// Optional intake fields. The engine never reads these.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CaseDetails {
    pub end_date: Option<NaiveDate>,
    pub firm_name: Option<String>,
    pub email: Option<String>,
    pub website: Option<String>,
    pub street_address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    pub phone_number: Option<String>,
}

impl CaseDetails {
    /// Overlay the fields that are set in `other`. A blank string clears the
    /// field.
    pub fn merge(&mut self, other: &CaseDetails) {
        fn take(dst: &mut Option<String>, src: &Option<String>) {
            match src.as_deref().map(str::trim) {
                Some("") => *dst = None,
                Some(_) => dst.clone_from(src),
                None => {}
            }
        }
        if other.end_date.is_some() {
            self.end_date = other.end_date;
        }
        take(&mut self.firm_name, &other.firm_name);
        take(&mut self.email, &other.email);
        take(&mut self.website, &other.website);
        take(&mut self.street_address, &other.street_address);
        take(&mut self.city, &other.city);
        take(&mut self.state, &other.state);
        take(&mut self.zip_code, &other.zip_code);
        take(&mut self.phone_number, &other.phone_number);
    }
}

impl JudgmentCase {
    pub fn terms(&self) -> JudgmentTerms {
        JudgmentTerms {
            principal: self.judgment_amount,
            annual_rate: self.annual_interest_rate,
            start_date: self.judgment_date,
        }
    }
}

/// The three numbers the engine needs from a case.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JudgmentTerms {
    pub principal: Decimal,
    /// Percentage per year: 10 means 10%.
    pub annual_rate: Decimal,
    pub start_date: NaiveDate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Payment,
    Cost,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Payment => "payment",
            EventKind::Cost => "cost",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventKind {
    type Err = PayoffError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "payment" => Ok(EventKind::Payment),
            "cost" => Ok(EventKind::Cost),
            other => Err(PayoffError::InvalidField(format!(
                "unknown transaction kind '{other}' (expected payment or cost)"
            ))),
        }
    }
}

/// A payment or cost as the engine sees it. Position in the input slice is
/// the insertion order used to break same-day ties.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransactionEvent {
    pub date: NaiveDate,
    pub kind: EventKind,
    pub amount: Decimal,
}

/// A transaction row as persisted for a case.
#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    pub id: i64,
    pub case_id: i64,
    pub date: NaiveDate,
    pub kind: EventKind,
    pub amount: Decimal,
    pub description: Option<String>,
}

impl Transaction {
    pub fn event(&self) -> TransactionEvent {
        TransactionEvent {
            date: self.date,
            kind: self.kind,
            amount: self.amount,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryType {
    Payment,
    Cost,
    InterestOnly,
}

impl EntryType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryType::Payment => "payment",
            EntryType::Cost => "cost",
            EntryType::InterestOnly => "interest-only",
        }
    }
}

impl From<EventKind> for EntryType {
    fn from(kind: EventKind) -> Self {
        match kind {
            EventKind::Payment => EntryType::Payment,
            EventKind::Cost => EntryType::Cost,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TimelineEntry {
    pub event_date: NaiveDate,
    pub event_type: EntryType,
    pub days_since_last_event: i64,
    pub interest_accrued_this_period: Decimal,
    pub payment_amount: Decimal,
    pub cost_amount: Decimal,
    pub applied_to_interest: Decimal,
    pub applied_to_principal: Decimal,
    pub remaining_principal: Decimal,
    pub unpaid_interest_balance: Decimal,
}

/// Unrounded engine output. Rounding happens when it is rendered.
#[derive(Debug, Clone, PartialEq)]
pub struct CalculationResult {
    pub as_of_date: NaiveDate,
    pub initial_principal: Decimal,
    pub daily_interest: Decimal,
    pub total_days: i64,
    pub principal_reduction: Decimal,
    pub total_payments: Decimal,
    pub total_costs: Decimal,
    pub current_period_interest: Decimal,
    pub interest_to_date: Decimal,
    pub unpaid_interest: Decimal,
    pub remaining_principal: Decimal,
    pub total_due: Decimal,
    pub last_payment_date: Option<NaiveDate>,
    pub timeline: Vec<TimelineEntry>,
}

/// One row of the case list: identity plus the payoff as of a date.
#[derive(Debug, Clone, PartialEq)]
pub struct CaseSummary {
    pub id: i64,
    pub case_name: String,
    pub court_name: String,
    pub court_case_number: String,
    pub judgment_amount: Decimal,
    pub judgment_date: NaiveDate,
    pub last_payment_date: Option<NaiveDate>,
    pub total_payment_to_date: Decimal,
    pub interest_to_date: Decimal,
    pub payoff: Decimal,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date_accepts_iso() {
        let d = parse_date("2024-07-01").unwrap();
        assert_eq!(d, NaiveDate::from_ymd_opt(2024, 7, 1).unwrap());
    }

    #[test]
    fn test_parse_date_rejects_other_formats() {
        for bad in ["07/01/2024", "2024-13-01", "2024-02-30", ""] {
            assert!(
                matches!(parse_date(bad), Err(PayoffError::MalformedDate(_))),
                "accepted {bad:?}"
            );
        }
    }

    #[test]
    fn test_details_merge_keeps_unset_fields() {
        let mut details = CaseDetails {
            firm_name: Some("Acme Legal".into()),
            city: Some("Fresno".into()),
            ..Default::default()
        };
        details.merge(&CaseDetails {
            city: Some("Sacramento".into()),
            zip_code: Some("95814".into()),
            ..Default::default()
        });
        assert_eq!(details.firm_name.as_deref(), Some("Acme Legal"));
        assert_eq!(details.city.as_deref(), Some("Sacramento"));
        assert_eq!(details.zip_code.as_deref(), Some("95814"));
    }

    #[test]
    fn test_details_merge_blank_clears_field() {
        let mut details = CaseDetails {
            email: Some("clerk@acme.law".into()),
            city: Some("Fresno".into()),
            ..Default::default()
        };
        details.merge(&CaseDetails {
            email: Some("  ".into()),
            ..Default::default()
        });
        assert_eq!(details.email, None);
        assert_eq!(details.city.as_deref(), Some("Fresno"));
    }

    #[test]
    fn test_event_kind_parse() {
        assert_eq!("Payment".parse::<EventKind>().unwrap(), EventKind::Payment);
        assert_eq!(" cost ".parse::<EventKind>().unwrap(), EventKind::Cost);
        assert!("refund".parse::<EventKind>().is_err());
    }
}
