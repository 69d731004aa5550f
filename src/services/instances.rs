//! Administrative management of book copies

use std::sync::Arc;

use uuid::Uuid;
use validator::Validate;

use crate::{
    authz::{self, Authorizer},
    context::RequestContext,
    error::AppResult,
    models::{
        book_instance::{BookInstance, CreateBookInstance, LoanStatus, UpdateBookInstance},
        user::Capability,
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct InstancesService {
    repository: Repository,
    authz: Arc<dyn Authorizer>,
}

impl InstancesService {
    pub fn new(repository: Repository, authz: Arc<dyn Authorizer>) -> Self {
        Self { repository, authz }
    }

    pub async fn get(&self, id: Uuid) -> AppResult<BookInstance> {
        self.repository.book_instances.get(id).await
    }

    pub async fn create(&self, ctx: &RequestContext, data: CreateBookInstance) -> AppResult<BookInstance> {
        authz::require(self.authz.as_ref(), &ctx.actor, Capability::AddBookInstance)?;
        data.validate()?;
        self.repository.books.get(data.book_id).await?;

        let instance = BookInstance {
            id: Uuid::new_v4(),
            book_id: data.book_id,
            imprint: data.imprint,
            due_back: data.due_back,
            status: data.status.unwrap_or(LoanStatus::Maintenance),
            borrower_id: data.borrower_id,
            version: 0,
        };
        instance.check_consistency()?;

        let created = self.repository.book_instances.create(&instance).await?;
        tracing::info!(
            instance = %created.id,
            book = created.book_id,
            status = %created.status,
            actor = ctx.actor.user_id,
            "Book instance created"
        );
        Ok(created)
    }

    /// Assign a new state (loan-out, maintenance, reservation...).
    pub async fn update(
        &self,
        ctx: &RequestContext,
        id: Uuid,
        data: UpdateBookInstance,
    ) -> AppResult<BookInstance> {
        authz::require(self.authz.as_ref(), &ctx.actor, Capability::ChangeBookInstance)?;
        data.validate()?;

        let mut instance = self.repository.book_instances.get(id).await?;
        if let Some(imprint) = data.imprint {
            instance.imprint = imprint;
        }
        instance.status = data.status;
        instance.due_back = data.due_back;
        instance.borrower_id = data.borrower_id;
        instance.check_consistency()?;

        let saved = self.repository.book_instances.save(&instance).await?;
        tracing::info!(
            instance = %id,
            status = %saved.status,
            actor = ctx.actor.user_id,
            "Book instance updated"
        );
        Ok(saved)
    }

    pub async fn delete(&self, ctx: &RequestContext, id: Uuid) -> AppResult<()> {
        authz::require(self.authz.as_ref(), &ctx.actor, Capability::DeleteBookInstance)?;

        self.repository.book_instances.delete(id).await?;
        tracing::info!(instance = %id, actor = ctx.actor.user_id, "Book instance deleted");
        Ok(())
    }
}
