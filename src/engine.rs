//! Judgment interest accrual.
//!
//! Simple (non-compounding) interest accrues daily on the remaining
//! principal. Payments go to unpaid interest first and the rest to principal.
//! Costs are added to principal. The result is a pure function of its inputs.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tracing::{debug, trace};

use crate::error::{PayoffError, Result};
use crate::models::{
    CalculationResult, EntryType, EventKind, JudgmentTerms, TimelineEntry, TransactionEvent,
};

const PERCENT: Decimal = dec!(100);
const DAYS_PER_YEAR: Decimal = dec!(365);

fn overflow() -> PayoffError {
    PayoffError::InvalidAmount("amount too large to calculate".to_string())
}

fn add(a: Decimal, b: Decimal) -> Result<Decimal> {
    a.checked_add(b).ok_or_else(overflow)
}

fn sub(a: Decimal, b: Decimal) -> Result<Decimal> {
    a.checked_sub(b).ok_or_else(overflow)
}

// principal × (rate / 100 / 365) × days, with a single division at the end.
fn period_interest(principal: Decimal, annual_rate: Decimal, days: i64) -> Result<Decimal> {
    if days <= 0 || annual_rate.is_zero() {
        return Ok(Decimal::ZERO);
    }
    principal
        .checked_mul(annual_rate)
        .and_then(|v| v.checked_mul(Decimal::from(days)))
        .and_then(|v| v.checked_div(PERCENT * DAYS_PER_YEAR))
        .ok_or_else(overflow)
}

fn validate(terms: &JudgmentTerms, events: &[TransactionEvent], as_of: NaiveDate) -> Result<()> {
    if terms.principal <= Decimal::ZERO {
        return Err(PayoffError::InvalidAmount(format!(
            "judgment amount must be positive, got {}",
            terms.principal
        )));
    }
    if terms.annual_rate < Decimal::ZERO {
        return Err(PayoffError::InvalidRate(format!(
            "annual interest rate cannot be negative, got {}",
            terms.annual_rate
        )));
    }
    if as_of < terms.start_date {
        return Err(PayoffError::InvalidRange(format!(
            "as-of date {as_of} is before judgment date {}",
            terms.start_date
        )));
    }
    for event in events {
        if event.amount <= Decimal::ZERO {
            return Err(PayoffError::InvalidAmount(format!(
                "{} on {} must be positive, got {}",
                event.kind, event.date, event.amount
            )));
        }
        if event.date < terms.start_date {
            return Err(PayoffError::InvalidRange(format!(
                "{} on {} is before judgment date {}",
                event.kind, event.date, terms.start_date
            )));
        }
    }
    Ok(())
}

/// Compute the payoff timeline for a judgment as of `as_of`.
///
/// `events` may arrive in any order. They are replayed by date, and events
/// sharing a date replay in slice order. Events after `as_of` are ignored.
/// Every input is validated before any accrual happens, so an error never
/// comes with a partial timeline.
pub fn calculate(
    terms: &JudgmentTerms,
    events: &[TransactionEvent],
    as_of: NaiveDate,
) -> Result<CalculationResult> {
    validate(terms, events, as_of)?;

    let mut ordered: Vec<&TransactionEvent> = events.iter().filter(|e| e.date <= as_of).collect();
    ordered.sort_by_key(|e| e.date);
    debug!(
        principal = %terms.principal,
        rate = %terms.annual_rate,
        start = %terms.start_date,
        %as_of,
        events = events.len(),
        skipped_future = events.len() - ordered.len(),
        "calculating payoff"
    );

    let steps = ordered
        .into_iter()
        .map(|e| (e.date, Some(e)))
        .chain(std::iter::once((as_of, None)));

    let mut remaining = terms.principal;
    let mut unpaid = Decimal::ZERO;
    let mut cursor = terms.start_date;
    let mut total_interest = Decimal::ZERO;
    let mut total_payments = Decimal::ZERO;
    let mut total_costs = Decimal::ZERO;
    let mut current_period_interest = Decimal::ZERO;
    let mut last_payment_date = None;
    let mut timeline = Vec::new();

    for (date, event) in steps {
        let days = (date - cursor).num_days();
        let interest = period_interest(remaining, terms.annual_rate, days)?;
        unpaid = add(unpaid, interest)?;
        total_interest = add(total_interest, interest)?;

        let mut entry = TimelineEntry {
            event_date: date,
            event_type: EntryType::InterestOnly,
            days_since_last_event: days,
            interest_accrued_this_period: interest,
            payment_amount: Decimal::ZERO,
            cost_amount: Decimal::ZERO,
            applied_to_interest: Decimal::ZERO,
            applied_to_principal: Decimal::ZERO,
            remaining_principal: Decimal::ZERO,
            unpaid_interest_balance: Decimal::ZERO,
        };

        match event {
            Some(ev) => {
                entry.event_type = ev.kind.into();
                match ev.kind {
                    EventKind::Payment => {
                        let to_interest = ev.amount.min(unpaid);
                        let to_principal = ev.amount - to_interest;
                        unpaid -= to_interest;
                        remaining = (remaining - to_principal).max(Decimal::ZERO);
                        total_payments = add(total_payments, ev.amount)?;
                        last_payment_date = Some(date);
                        entry.payment_amount = ev.amount;
                        entry.applied_to_interest = to_interest;
                        entry.applied_to_principal = to_principal;
                    }
                    EventKind::Cost => {
                        remaining = add(remaining, ev.amount)?;
                        total_costs = add(total_costs, ev.amount)?;
                        entry.cost_amount = ev.amount;
                    }
                }
            }
            None => current_period_interest = interest,
        }

        entry.remaining_principal = remaining;
        entry.unpaid_interest_balance = unpaid;
        trace!(
            date = %date,
            kind = entry.event_type.as_str(),
            days,
            %interest,
            %remaining,
            %unpaid,
            "step"
        );
        timeline.push(entry);
        cursor = date;
    }

    let daily_interest = period_interest(remaining, terms.annual_rate, 1)?;
    let principal_reduction = sub(terms.principal, remaining - total_costs)?;
    let total_due = add(remaining, unpaid)?;
    let result = CalculationResult {
        as_of_date: as_of,
        initial_principal: terms.principal,
        daily_interest,
        total_days: (as_of - terms.start_date).num_days(),
        principal_reduction,
        total_payments,
        total_costs,
        current_period_interest,
        interest_to_date: total_interest,
        unpaid_interest: unpaid,
        remaining_principal: remaining,
        total_due,
        last_payment_date,
        timeline,
    };
    debug!(total_due = %result.total_due, interest = %result.interest_to_date, "payoff calculated");
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fmt::round_money;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn terms(principal: Decimal, rate: Decimal) -> JudgmentTerms {
        JudgmentTerms {
            principal,
            annual_rate: rate,
            start_date: date(2024, 1, 1),
        }
    }

    fn payment(d: NaiveDate, amount: Decimal) -> TransactionEvent {
        TransactionEvent { date: d, kind: EventKind::Payment, amount }
    }

    fn cost(d: NaiveDate, amount: Decimal) -> TransactionEvent {
        TransactionEvent { date: d, kind: EventKind::Cost, amount }
    }

    #[test]
    fn test_no_events_half_year() {
        let r = calculate(&terms(dec!(100000), dec!(10)), &[], date(2024, 7, 1)).unwrap();
        assert_eq!(r.total_days, 182);
        assert_eq!(round_money(r.interest_to_date), dec!(4986.30));
        assert_eq!(round_money(r.total_due), dec!(104986.30));
        assert_eq!(r.remaining_principal, dec!(100000));
        assert_eq!(r.timeline.len(), 1);
        assert_eq!(r.timeline[0].event_type, EntryType::InterestOnly);
        assert_eq!(r.timeline[0].days_since_last_event, 182);
    }

    #[test]
    fn test_payment_splits_interest_first() {
        let events = [payment(date(2024, 4, 1), dec!(5000))];
        let r = calculate(&terms(dec!(100000), dec!(10)), &events, date(2024, 7, 1)).unwrap();
        let row = &r.timeline[0];
        assert_eq!(row.event_type, EntryType::Payment);
        assert_eq!(row.days_since_last_event, 91);
        assert_eq!(round_money(row.interest_accrued_this_period), dec!(2493.15));
        assert_eq!(round_money(row.applied_to_interest), dec!(2493.15));
        assert_eq!(round_money(row.applied_to_principal), dec!(2506.85));
        assert_eq!(round_money(row.remaining_principal), dec!(97493.15));
        assert!(row.unpaid_interest_balance.is_zero());
        assert_eq!(r.last_payment_date, Some(date(2024, 4, 1)));
        assert_eq!(round_money(r.principal_reduction), dec!(2506.85));
    }

    #[test]
    fn test_as_of_before_judgment_is_invalid_range() {
        let err = calculate(&terms(dec!(1000), dec!(10)), &[], date(2023, 12, 31)).unwrap_err();
        assert!(matches!(err, PayoffError::InvalidRange(_)));
    }

    #[test]
    fn test_rejects_bad_inputs() {
        let as_of = date(2024, 6, 1);
        assert!(matches!(
            calculate(&terms(Decimal::ZERO, dec!(10)), &[], as_of),
            Err(PayoffError::InvalidAmount(_))
        ));
        assert!(matches!(
            calculate(&terms(dec!(1000), dec!(-1)), &[], as_of),
            Err(PayoffError::InvalidRate(_))
        ));
        assert!(matches!(
            calculate(&terms(dec!(1000), dec!(10)), &[payment(date(2024, 2, 1), dec!(-5))], as_of),
            Err(PayoffError::InvalidAmount(_))
        ));
        assert!(matches!(
            calculate(&terms(dec!(1000), dec!(10)), &[cost(date(2023, 6, 1), dec!(5))], as_of),
            Err(PayoffError::InvalidRange(_))
        ));
    }

    #[test]
    fn test_invalid_event_after_as_of_still_rejected() {
        // Validation covers the whole input, not just the replayed part.
        let events = [payment(date(2025, 1, 1), Decimal::ZERO)];
        let err = calculate(&terms(dec!(1000), dec!(10)), &events, date(2024, 6, 1)).unwrap_err();
        assert!(matches!(err, PayoffError::InvalidAmount(_)));
    }

    #[test]
    fn test_deterministic() {
        let events = [
            cost(date(2024, 2, 10), dec!(350)),
            payment(date(2024, 3, 5), dec!(1200)),
            payment(date(2024, 3, 5), dec!(75.55)),
        ];
        let t = terms(dec!(25000), dec!(9.5));
        let a = calculate(&t, &events, date(2024, 12, 31)).unwrap();
        let b = calculate(&t, &events, date(2024, 12, 31)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_interest_strictly_increases_without_payments() {
        let t = terms(dec!(5000), dec!(7.25));
        let events = [cost(date(2024, 3, 1), dec!(120))];
        let mut previous = Decimal::ZERO;
        for offset in 1..=400 {
            let as_of = date(2024, 1, 1) + chrono::Duration::days(offset);
            let r = calculate(&t, &events, as_of).unwrap();
            assert!(r.interest_to_date > previous, "not increasing at day {offset}");
            previous = r.interest_to_date;
        }
    }

    #[test]
    fn test_zero_rate_accrues_nothing() {
        let t = terms(dec!(5000), Decimal::ZERO);
        let events = [payment(date(2024, 5, 1), dec!(100)), cost(date(2024, 6, 1), dec!(40))];
        for as_of in [date(2024, 1, 1), date(2024, 5, 1), date(2030, 1, 1)] {
            let r = calculate(&t, &events, as_of).unwrap();
            assert!(r.interest_to_date.is_zero());
            assert!(r.daily_interest.is_zero());
        }
    }

    #[test]
    fn test_full_payoff_on_as_of_date_clears_balance() {
        let t = terms(dec!(100000), dec!(10));
        let as_of = date(2024, 7, 1);
        let events = vec![payment(date(2024, 4, 1), dec!(5000))];
        let before = calculate(&t, &events, as_of).unwrap();

        let mut with_payoff = events.clone();
        with_payoff.push(payment(as_of, before.total_due));
        let after = calculate(&t, &with_payoff, as_of).unwrap();
        assert!(round_money(after.total_due).is_zero());
        assert!(after.unpaid_interest.is_zero());
        assert!(after.remaining_principal < dec!(0.0001));
    }

    #[test]
    fn test_small_payment_only_reduces_interest() {
        let t = terms(dec!(100000), dec!(10));
        let events = [payment(date(2024, 4, 1), dec!(1000))];
        let r = calculate(&t, &events, date(2024, 4, 1)).unwrap();
        let row = &r.timeline[0];
        assert_eq!(row.remaining_principal, dec!(100000));
        assert!(row.applied_to_principal.is_zero());
        assert_eq!(row.applied_to_interest, dec!(1000));
        assert_eq!(row.unpaid_interest_balance, row.interest_accrued_this_period - dec!(1000));
    }

    #[test]
    fn test_overpayment_clamps_principal_at_zero() {
        let t = terms(dec!(1000), dec!(10));
        let events = [payment(date(2024, 1, 1), dec!(1500))];
        let r = calculate(&t, &events, date(2024, 2, 1)).unwrap();
        assert!(r.remaining_principal.is_zero());
        assert!(r.unpaid_interest.is_zero());
        assert!(r.total_due.is_zero());
        assert_eq!(r.total_payments, dec!(1500));
    }

    #[test]
    fn test_cost_adds_to_principal_and_accrues() {
        let t = terms(dec!(10000), dec!(10));
        let events = [cost(date(2024, 1, 1), dec!(500))];
        let r = calculate(&t, &events, date(2024, 1, 11)).unwrap();
        assert_eq!(r.timeline[0].event_type, EntryType::Cost);
        assert_eq!(r.timeline[0].remaining_principal, dec!(10500));
        assert_eq!(r.total_costs, dec!(500));
        assert!(r.principal_reduction.is_zero());
        // 10,500 × 10% / 365 × 10 days
        assert_eq!(round_money(r.interest_to_date), dec!(28.77));
        assert_eq!(round_money(r.total_due), dec!(10528.77));
    }

    #[test]
    fn test_future_events_are_ignored() {
        let t = terms(dec!(10000), dec!(10));
        let events = [payment(date(2024, 3, 1), dec!(200)), payment(date(2024, 9, 1), dec!(9000))];
        let r = calculate(&t, &events, date(2024, 6, 1)).unwrap();
        assert_eq!(r.timeline.len(), 2);
        assert_eq!(r.total_payments, dec!(200));
    }

    #[test]
    fn test_same_day_events_keep_insertion_order_and_accrue_nothing_between() {
        let t = terms(dec!(10000), dec!(10));
        let d = date(2024, 2, 1);
        let events = [
            payment(date(2024, 3, 1), dec!(10)),
            cost(d, dec!(300)),
            payment(d, dec!(50)),
        ];
        let r = calculate(&t, &events, date(2024, 4, 1)).unwrap();
        let kinds: Vec<EntryType> = r.timeline.iter().map(|e| e.event_type).collect();
        assert_eq!(
            kinds,
            vec![EntryType::Cost, EntryType::Payment, EntryType::Payment, EntryType::InterestOnly]
        );
        assert_eq!(r.timeline[1].days_since_last_event, 0);
        assert!(r.timeline[1].interest_accrued_this_period.is_zero());
    }

    #[test]
    fn test_backdated_event_only_changes_later_rows() {
        let t = terms(dec!(50000), dec!(8));
        let as_of = date(2024, 12, 31);
        let mut events = vec![
            payment(date(2024, 2, 1), dec!(1000)),
            payment(date(2024, 8, 1), dec!(1000)),
        ];
        let before = calculate(&t, &events, as_of).unwrap();
        events.push(cost(date(2024, 5, 1), dec!(250)));
        let after = calculate(&t, &events, as_of).unwrap();

        assert_eq!(after.timeline.len(), before.timeline.len() + 1);
        assert_eq!(after.timeline[0], before.timeline[0]);
        assert_eq!(after.timeline[1].event_type, EntryType::Cost);
        assert_ne!(after.timeline[2], before.timeline[1]);
        assert!(after.total_due > before.total_due);
    }

    #[test]
    fn test_current_period_interest_is_since_last_event() {
        let t = terms(dec!(36500), dec!(10));
        let events = [payment(date(2024, 1, 31), dec!(300))];
        let r = calculate(&t, &events, date(2024, 2, 10)).unwrap();
        // 30 days at $10/day is fully paid by the $300 payment.
        assert_eq!(r.timeline[0].applied_to_interest, dec!(300));
        assert_eq!(r.current_period_interest, dec!(100));
        assert_eq!(r.daily_interest, dec!(10));
        assert_eq!(r.total_due, dec!(36600));
    }

    #[test]
    fn test_interest_overflow_is_an_error() {
        let t = JudgmentTerms {
            principal: dec!(10000000000000000000000),
            annual_rate: dec!(1000000),
            start_date: date(2000, 1, 1),
        };
        let err = calculate(&t, &[], date(2024, 1, 1)).unwrap_err();
        assert!(matches!(err, PayoffError::InvalidAmount(_)));
    }

    #[test]
    fn test_cost_overflow_is_an_error() {
        let t = terms(Decimal::MAX, dec!(0));
        let events = [cost(date(2024, 1, 1), dec!(1))];
        let err = calculate(&t, &events, date(2024, 1, 1)).unwrap_err();
        assert!(matches!(err, PayoffError::InvalidAmount(_)));
    }

    #[test]
    fn test_payment_total_overflow_is_an_error() {
        let t = terms(dec!(1000), dec!(0));
        let events = [
            payment(date(2024, 1, 2), Decimal::MAX),
            payment(date(2024, 1, 3), Decimal::MAX),
        ];
        let err = calculate(&t, &events, date(2024, 2, 1)).unwrap_err();
        assert!(matches!(err, PayoffError::InvalidAmount(_)));
    }
}
