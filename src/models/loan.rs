//! Loan renewal rules and request/response types

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

use super::book_instance::BookInstance;
use crate::{config::LoansConfig, error::AppError};

/// Why a proposed renewal date was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RenewalRejection {
    #[error("date in past")]
    InPast,
    #[error("date too far in future")]
    TooFarAhead,
}

impl From<RenewalRejection> for AppError {
    fn from(rejection: RenewalRejection) -> Self {
        AppError::Validation(rejection.to_string())
    }
}

/// Renewal window: a new due date must fall in `(today, today + max_weeks]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenewalPolicy {
    default_weeks: i64,
    max_weeks: i64,
}

impl RenewalPolicy {
    pub fn new(default_weeks: i64, max_weeks: i64) -> Self {
        Self {
            default_weeks,
            max_weeks,
        }
    }

    pub fn from_config(config: &LoansConfig) -> Self {
        Self::new(config.default_renewal_weeks, config.max_renewal_weeks)
    }

    /// Date offered when the caller supplies none
    pub fn proposed_due_date(&self, today: NaiveDate) -> NaiveDate {
        weeks_after(today, self.default_weeks)
    }

    /// Latest acceptable due date (inclusive)
    pub fn latest_due_date(&self, today: NaiveDate) -> NaiveDate {
        weeks_after(today, self.max_weeks)
    }

    pub fn check(&self, today: NaiveDate, proposed: NaiveDate) -> Result<(), RenewalRejection> {
        if proposed <= today {
            return Err(RenewalRejection::InPast);
        }
        if proposed > self.latest_due_date(today) {
            return Err(RenewalRejection::TooFarAhead);
        }
        Ok(())
    }
}

/// Saturates at the calendar bounds instead of overflowing
fn weeks_after(today: NaiveDate, weeks: i64) -> NaiveDate {
    let fallback = if weeks < 0 { NaiveDate::MIN } else { NaiveDate::MAX };
    Duration::try_weeks(weeks)
        .and_then(|span| today.checked_add_signed(span))
        .unwrap_or(fallback)
}

impl Default for RenewalPolicy {
    fn default() -> Self {
        Self::new(3, 4)
    }
}

/// Renew request
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct RenewRequest {
    /// New due date; defaults to the proposed renewal date
    pub due_back: Option<NaiveDate>,
}

/// What the renewal form is pre-filled with
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RenewalProposal {
    pub book_instance: BookInstance,
    pub proposed_due_back: NaiveDate,
    pub latest_due_back: NaiveDate,
}
