//! JSON request/response shapes for a one-off calculation.
//!
//! Amounts may arrive as JSON numbers or decimal strings. Responses always
//! carry amounts as fixed-point strings and dates as `YYYY-MM-DD`.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::engine;
use crate::error::Result;
use crate::fmt::{round_daily, round_money};
use crate::models::{parse_date, CalculationResult, JudgmentTerms, TimelineEntry, TransactionEvent};

#[derive(Debug, Clone, Deserialize)]
pub struct CalculateRequest {
    pub judgment_amount: Decimal,
    pub judgment_date: String,
    pub annual_interest_rate: Decimal,
    pub as_of_date: String,
    #[serde(default)]
    pub events: Vec<RequestEvent>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RequestEvent {
    pub date: String,
    pub kind: String,
    pub amount: Decimal,
}

impl CalculateRequest {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Parse dates and kinds into engine inputs. Range and amount checks are
    /// left to the engine so both entry points share them.
    pub fn to_inputs(&self) -> Result<(JudgmentTerms, Vec<TransactionEvent>, NaiveDate)> {
        let terms = JudgmentTerms {
            principal: self.judgment_amount,
            annual_rate: self.annual_interest_rate,
            start_date: parse_date(&self.judgment_date)?,
        };
        let as_of = parse_date(&self.as_of_date)?;
        let events = self
            .events
            .iter()
            .map(|e| -> Result<TransactionEvent> {
                Ok(TransactionEvent {
                    date: parse_date(&e.date)?,
                    kind: e.kind.parse()?,
                    amount: e.amount,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok((terms, events, as_of))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalculateResponse {
    pub as_of_date: NaiveDate,
    pub initial_principal: String,
    pub daily_interest: String,
    pub total_days: i64,
    pub principal_reduction: String,
    pub total_payments: String,
    pub total_costs: String,
    pub current_period_interest: String,
    pub total_interest_accrued: String,
    pub unpaid_interest: String,
    pub remaining_principal: String,
    pub total_due: String,
    pub last_payment_date: Option<NaiveDate>,
    pub timeline: Vec<TimelineRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimelineRow {
    pub event_date: NaiveDate,
    pub event_type: &'static str,
    pub days_since_last_event: i64,
    pub interest_accrued: String,
    pub payment_amount: String,
    pub cost_amount: String,
    pub applied_to_interest: String,
    pub applied_to_principal: String,
    pub remaining_principal: String,
    pub unpaid_interest_balance: String,
}

fn cents(val: Decimal) -> String {
    format!("{:.2}", round_money(val))
}

impl From<&TimelineEntry> for TimelineRow {
    fn from(e: &TimelineEntry) -> Self {
        Self {
            event_date: e.event_date,
            event_type: e.event_type.as_str(),
            days_since_last_event: e.days_since_last_event,
            interest_accrued: cents(e.interest_accrued_this_period),
            payment_amount: cents(e.payment_amount),
            cost_amount: cents(e.cost_amount),
            applied_to_interest: cents(e.applied_to_interest),
            applied_to_principal: cents(e.applied_to_principal),
            remaining_principal: cents(e.remaining_principal),
            unpaid_interest_balance: cents(e.unpaid_interest_balance),
        }
    }
}

impl From<&CalculationResult> for CalculateResponse {
    fn from(r: &CalculationResult) -> Self {
        Self {
            as_of_date: r.as_of_date,
            initial_principal: cents(r.initial_principal),
            daily_interest: format!("{:.4}", round_daily(r.daily_interest)),
            total_days: r.total_days,
            principal_reduction: cents(r.principal_reduction),
            total_payments: cents(r.total_payments),
            total_costs: cents(r.total_costs),
            current_period_interest: cents(r.current_period_interest),
            total_interest_accrued: cents(r.interest_to_date),
            unpaid_interest: cents(r.unpaid_interest),
            remaining_principal: cents(r.remaining_principal),
            total_due: cents(r.total_due),
            last_payment_date: r.last_payment_date,
            timeline: r.timeline.iter().map(TimelineRow::from).collect(),
        }
    }
}

pub fn handle(request: &CalculateRequest) -> Result<CalculateResponse> {
    let (terms, events, as_of) = request.to_inputs()?;
    let result = engine::calculate(&terms, &events, as_of)?;
    Ok(CalculateResponse::from(&result))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PayoffError;

    const SCENARIO: &str = r#"{
        "judgment_amount": 100000,
        "judgment_date": "2024-01-01",
        "annual_interest_rate": "10",
        "as_of_date": "2024-07-01",
        "events": [{"date": "2024-04-01", "kind": "payment", "amount": "5000.00"}]
    }"#;

    #[test]
    fn test_handle_scenario() {
        let req = CalculateRequest::from_json(SCENARIO).unwrap();
        let resp = handle(&req).unwrap();
        assert_eq!(resp.initial_principal, "100000.00");
        assert_eq!(resp.total_days, 182);
        assert_eq!(resp.last_payment_date, NaiveDate::from_ymd_opt(2024, 4, 1));
        assert_eq!(resp.timeline.len(), 2);

        let first = &resp.timeline[0];
        assert_eq!(first.event_type, "payment");
        assert_eq!(first.applied_to_interest, "2493.15");
        assert_eq!(first.applied_to_principal, "2506.85");
        assert_eq!(first.remaining_principal, "97493.15");

        let last = &resp.timeline[1];
        assert_eq!(last.event_type, "interest-only");
        assert_eq!(last.days_since_last_event, 91);
    }

    #[test]
    fn test_response_json_shape() {
        let req = CalculateRequest::from_json(
            r#"{"judgment_amount": "100000", "judgment_date": "2024-01-01",
                "annual_interest_rate": 10, "as_of_date": "2024-07-01"}"#,
        )
        .unwrap();
        let resp = handle(&req).unwrap();
        let json: serde_json::Value = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["as_of_date"], "2024-07-01");
        assert_eq!(json["total_interest_accrued"], "4986.30");
        assert_eq!(json["total_due"], "104986.30");
        assert_eq!(json["daily_interest"], "27.3973");
        assert!(json["last_payment_date"].is_null());
        assert_eq!(json["timeline"][0]["event_type"], "interest-only");
    }

    #[test]
    fn test_repeated_requests_serialize_identically() {
        let req = CalculateRequest::from_json(SCENARIO).unwrap();
        let a = serde_json::to_string(&handle(&req).unwrap()).unwrap();
        let b = serde_json::to_string(&handle(&req).unwrap()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_malformed_date() {
        let req = CalculateRequest::from_json(
            r#"{"judgment_amount": 1, "judgment_date": "01/01/2024",
                "annual_interest_rate": 10, "as_of_date": "2024-07-01"}"#,
        )
        .unwrap();
        assert!(matches!(handle(&req), Err(PayoffError::MalformedDate(_))));
    }

    #[test]
    fn test_unknown_kind_rejected() {
        let req = CalculateRequest::from_json(
            r#"{"judgment_amount": 1, "judgment_date": "2024-01-01",
                "annual_interest_rate": 10, "as_of_date": "2024-07-01",
                "events": [{"date": "2024-02-01", "kind": "refund", "amount": 5}]}"#,
        )
        .unwrap();
        assert!(matches!(handle(&req), Err(PayoffError::InvalidField(_))));
    }

    #[test]
    fn test_as_of_before_judgment() {
        let req = CalculateRequest::from_json(
            r#"{"judgment_amount": 1000, "judgment_date": "2024-01-01",
                "annual_interest_rate": 10, "as_of_date": "2023-01-01"}"#,
        )
        .unwrap();
        assert!(matches!(handle(&req), Err(PayoffError::InvalidRange(_))));
    }

    #[test]
    fn test_oversized_amounts_return_error() {
        let req = CalculateRequest::from_json(
            r#"{"judgment_amount": "10000000000000000000000", "judgment_date": "2000-01-01",
                "annual_interest_rate": "1000000", "as_of_date": "2024-01-01"}"#,
        )
        .unwrap();
        assert!(matches!(handle(&req), Err(PayoffError::InvalidAmount(_))));

        let req = CalculateRequest::from_json(
            r#"{"judgment_amount": "70000000000000000000000000000", "judgment_date": "2024-01-01",
                "annual_interest_rate": 10, "as_of_date": "2024-01-01",
                "events": [{"date": "2024-01-01", "kind": "cost", "amount": "70000000000000000000000000000"}]}"#,
        )
        .unwrap();
        assert!(matches!(handle(&req), Err(PayoffError::InvalidAmount(_))));
    }
}

