//! Renewal date rules

use chrono::{Duration, NaiveDate};
use thiserror::Error;

/// Weeks from today proposed as the new due date
pub const DEFAULT_RENEWAL_WEEKS: i64 = 3;

/// Furthest a renewal may push the due date
pub const MAX_RENEWAL_WEEKS: i64 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RenewalDateError {
    #[error("Invalid date - renewal in past")]
    InPast,

    #[error("Invalid date - renewal more than 4 weeks ahead")]
    TooFarAhead,
}

/// Date offered when the renewal form is first shown
pub fn proposed_renewal_date(today: NaiveDate) -> NaiveDate {
    today + Duration::weeks(DEFAULT_RENEWAL_WEEKS)
}

/// Latest acceptable renewal date
pub fn latest_renewal_date(today: NaiveDate) -> NaiveDate {
    today + Duration::weeks(MAX_RENEWAL_WEEKS)
}

/// Accept `candidate` if it lies in `today..=today + 4 weeks`.
pub fn validate_renewal_date(
    candidate: NaiveDate,
    today: NaiveDate,
) -> Result<NaiveDate, RenewalDateError> {
    if candidate < today {
        return Err(RenewalDateError::InPast);
    }

    if candidate > latest_renewal_date(today) {
        return Err(RenewalDateError::TooFarAhead);
    }

    Ok(candidate)
}
