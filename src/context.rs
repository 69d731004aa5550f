//! Request-scoped context passed explicitly into service calls

use chrono::{NaiveDate, Utc};

use crate::models::user::UserClaims;

/// Who is calling and what "today" means for this request
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub actor: UserClaims,
    pub today: NaiveDate,
}

impl RequestContext {
    pub fn new(actor: UserClaims, today: NaiveDate) -> Self {
        Self { actor, today }
    }

    /// Context dated with the current UTC day
    pub fn now(actor: UserClaims) -> Self {
        Self::new(actor, Utc::now().date_naive())
    }
}
