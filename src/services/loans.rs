//! Loan workflow: renewing and returning copies

use std::sync::Arc;

use chrono::NaiveDate;
use uuid::Uuid;

use crate::{
    authz::{self, Authorizer},
    config::LoansConfig,
    context::RequestContext,
    error::{AppError, AppResult},
    models::{
        book_instance::BookInstance,
        loan::{RenewalPolicy, RenewalProposal},
        user::Capability,
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct LoansService {
    repository: Repository,
    authz: Arc<dyn Authorizer>,
    policy: RenewalPolicy,
    strict_return: bool,
}

impl LoansService {
    pub fn new(repository: Repository, authz: Arc<dyn Authorizer>, config: &LoansConfig) -> Self {
        Self {
            repository,
            authz,
            policy: RenewalPolicy::from_config(config),
            strict_return: config.strict_return,
        }
    }

    pub fn policy(&self) -> RenewalPolicy {
        self.policy
    }

    /// Current state of a copy plus the due date the renewal form proposes
    pub async fn renewal_proposal(&self, ctx: &RequestContext, id: Uuid) -> AppResult<RenewalProposal> {
        authz::require(self.authz.as_ref(), &ctx.actor, Capability::MarkReturned)?;

        let book_instance = self.repository.book_instances.get(id).await?;
        Ok(RenewalProposal {
            book_instance,
            proposed_due_back: self.policy.proposed_due_date(ctx.today),
            latest_due_back: self.policy.latest_due_date(ctx.today),
        })
    }

    /// Move the due date of a copy on loan.
    ///
    /// Without a proposed date the default renewal date is used. The date is
    /// checked against the renewal window before the copy is loaded.
    pub async fn renew(
        &self,
        ctx: &RequestContext,
        id: Uuid,
        proposed: Option<NaiveDate>,
    ) -> AppResult<BookInstance> {
        authz::require(self.authz.as_ref(), &ctx.actor, Capability::MarkReturned)?;

        let due_back = proposed.unwrap_or_else(|| self.policy.proposed_due_date(ctx.today));
        self.policy.check(ctx.today, due_back)?;

        let mut instance = self.repository.book_instances.get(id).await?;
        if !instance.is_on_loan() {
            return Err(AppError::BusinessRule(format!(
                "Book instance {} is not on loan (status: {})",
                id, instance.status
            )));
        }

        instance.renew(due_back);
        instance.check_consistency()?;
        let saved = self.repository.book_instances.save(&instance).await?;

        tracing::info!(
            instance = %id,
            due_back = %due_back,
            actor = ctx.actor.user_id,
            "Book instance renewed"
        );
        Ok(saved)
    }

    /// Mark a copy as returned: available, no due date, no borrower.
    ///
    /// Returning a copy that is already available succeeds and changes
    /// nothing, unless `strict_return` is configured.
    pub async fn return_book(&self, ctx: &RequestContext, id: Uuid) -> AppResult<BookInstance> {
        authz::require(self.authz.as_ref(), &ctx.actor, Capability::MarkReturned)?;

        let mut instance = self.repository.book_instances.get(id).await?;
        if self.strict_return && !instance.is_on_loan() {
            return Err(AppError::BusinessRule(format!(
                "Book instance {} is not on loan (status: {})",
                id, instance.status
            )));
        }

        let previous = instance.status;
        instance.mark_returned();
        let saved = self.repository.book_instances.save(&instance).await?;

        tracing::info!(
            instance = %id,
            previous_status = %previous,
            actor = ctx.actor.user_id,
            "Book instance returned"
        );
        Ok(saved)
    }
}
