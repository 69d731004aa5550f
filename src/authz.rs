//! Capability checks for guarded operations

use crate::{
    error::{AppError, AppResult},
    models::user::{Capability, UserClaims},
};

/// Answers whether an actor holds a capability.
#[cfg_attr(test, mockall::automock)]
pub trait Authorizer: Send + Sync {
    fn has_capability(&self, actor: &UserClaims, capability: Capability) -> AppResult<bool>;
}

/// Grants what the token claims list (superusers get everything)
#[derive(Debug, Clone, Copy, Default)]
pub struct ClaimsAuthorizer;

impl Authorizer for ClaimsAuthorizer {
    fn has_capability(&self, actor: &UserClaims, capability: Capability) -> AppResult<bool> {
        Ok(actor.has_capability(capability))
    }
}

/// Fails closed: a denial and a failed check both reject the call.
pub fn require(
    authz: &dyn Authorizer,
    actor: &UserClaims,
    capability: Capability,
) -> AppResult<()> {
    match authz.has_capability(actor, capability) {
        Ok(true) => Ok(()),
        Ok(false) => {
            tracing::warn!(user_id = actor.user_id, %capability, "Capability denied");
            Err(AppError::Authorization(format!(
                "Missing capability {}",
                capability
            )))
        }
        Err(e) => {
            tracing::warn!(user_id = actor.user_id, %capability, error = %e, "Capability check failed");
            Err(AppError::Authorization(format!(
                "Unable to verify capability {}",
                capability
            )))
        }
    }
}
