//! Recurrence occurrence calculation.
//!
//! Computes first and next occurrence dates for a recurrence rule. Rules
//! that pin specific weekdays scan forward day by day; everything else is
//! plain calendar arithmetic. Month additions use chrono's clamping
//! rollover (Jan 31 + 1 month = Feb 28/29).

use chrono::{Datelike, Days, Months, NaiveDate};

use taskpilot_core::types::{Recurrence, RecurrenceKind, RecurrenceUnit, Weekday};

/// The next occurrence strictly after `current`, or `None` for
/// non-repeating rules.
pub fn next_occurrence(rec: &Recurrence, current: NaiveDate) -> Option<NaiveDate> {
    match rec.kind {
        RecurrenceKind::None => None,
        RecurrenceKind::Daily => current.checked_add_days(Days::new(1)),
        RecurrenceKind::Weekly => {
            if rec.days_of_week.is_empty() {
                // Preserved fallback: an empty day set means a flat week.
                current.checked_add_days(Days::new(7))
            } else {
                scan_weekdays(current.checked_add_days(Days::new(1))?, &rec.days_of_week)
            }
        }
        RecurrenceKind::Monthly => current.checked_add_months(Months::new(1)),
        RecurrenceKind::Custom => next_custom(rec, current),
    }
}

fn next_custom(rec: &Recurrence, current: NaiveDate) -> Option<NaiveDate> {
    // Absurd intervals from the assistant degrade to None, never overflow.
    let interval = rec.interval.unwrap_or(1).max(1) as u64;
    match rec.unit {
        RecurrenceUnit::Day => current.checked_add_days(Days::new(interval)),
        RecurrenceUnit::Month => {
            current.checked_add_months(Months::new(u32::try_from(interval).ok()?))
        }
        RecurrenceUnit::Week => {
            let span = interval.checked_mul(7)?;
            if rec.days_of_week.is_empty() {
                // Preserved fallback, same as Weekly.
                return current.checked_add_days(Days::new(span));
            }
            // Phase one: the next pinned weekday, starting tomorrow. The
            // scan covers current+1 ..= current+7, so a non-empty set
            // always lands here. Pinned weekdays win over strict interval
            // arithmetic.
            let tomorrow = current.checked_add_days(Days::new(1))?;
            if let Some(hit) = scan_weekdays(tomorrow, &rec.days_of_week) {
                return Some(hit);
            }
            // Phase two: jump the interval, then snap to a pinned weekday.
            let jump = current.checked_add_days(Days::new(span))?;
            scan_weekdays(jump, &rec.days_of_week).or(Some(jump))
        }
    }
}

/// The first occurrence on or after `today`, given an optional base date.
///
/// Non-repeating rules return the base date unchanged, even if it lies in
/// the past. A future base date is always honored as-is. Weekday-pinned
/// rules without a usable base snap to today or the next pinned day.
pub fn first_occurrence(
    rec: &Recurrence,
    base: Option<NaiveDate>,
    today: NaiveDate,
) -> NaiveDate {
    if rec.kind == RecurrenceKind::None {
        return base.unwrap_or(today);
    }
    if let Some(base) = base {
        if base >= today {
            return base;
        }
    }
    if rec.pins_weekdays() && !rec.days_of_week.is_empty() {
        if rec.days_of_week.contains(&Weekday::from_chrono(today.weekday())) {
            return today;
        }
        if let Some(next) = today
            .checked_add_days(Days::new(1))
            .and_then(|d| scan_weekdays(d, &rec.days_of_week))
        {
            return next;
        }
    }
    base.unwrap_or(today)
}

/// First date in `from ..= from+6` whose weekday is in `days`.
fn scan_weekdays(from: NaiveDate, days: &[Weekday]) -> Option<NaiveDate> {
    let mut date = from;
    for _ in 0..7 {
        if days.contains(&Weekday::from_chrono(date.weekday())) {
            return Some(date);
        }
        date = date.checked_add_days(Days::new(1))?;
    }
    None
}
