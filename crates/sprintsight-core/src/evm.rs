//! Earned-value management formulas.
//!
//! Stateless: every function maps planned value (PV), earned value (EV) and
//! actual cost (AC) figures to the standard EVM variances and indices.
//! Division by zero yields the documented neutral value (1 for the indices,
//! 0 for the budget forecast) instead of failing.

use chrono::{Duration, NaiveDateTime};

use crate::calendar::{to_calendar_days, working_days_between};

/// Cost Variance: `EV - AC`. Positive is under budget.
pub fn cv(ev: f64, ac: f64) -> f64 {
    ev - ac
}

/// Schedule Variance: `EV - PV`. Positive is ahead of schedule.
pub fn sv(ev: f64, pv: f64) -> f64 {
    ev - pv
}

/// Cost Performance Index: `EV / AC`, 1 when nothing has been spent yet.
pub fn cpi(ev: f64, ac: f64) -> f64 {
    if ac == 0.0 {
        1.0
    } else {
        ev / ac
    }
}

/// Schedule Performance Index: `EV / PV`, 1 when nothing was planned yet.
pub fn spi(ev: f64, pv: f64) -> f64 {
    if pv == 0.0 {
        1.0
    } else {
        ev / pv
    }
}

/// Project the completion date from schedule performance.
///
/// The planned working days between `start` and `due` are stretched by the
/// inverse of the SPI and converted back to calendar days from `start`.
/// A zero-length plan returns `due` unchanged.
pub fn estimated_completion_date(
    pv: f64,
    ev: f64,
    start: NaiveDateTime,
    due: NaiveDateTime,
) -> NaiveDateTime {
    let planned = working_days_between(start, due);
    if planned == 0 {
        return due;
    }
    let projected = (planned as f64 / spi(ev, pv)).round() as i64;
    start + Duration::days(to_calendar_days(projected))
}

/// Project the budget at completion from cost performance:
/// `(max_pv / EV) * AC`, 0 while nothing has been earned.
pub fn estimated_budget_at_completion(ev: f64, ac: f64, max_pv: f64) -> f64 {
    if ev == 0.0 {
        return 0.0;
    }
    (max_pv / ev) * ac
}
