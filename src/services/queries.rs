//! Read-only catalog queries: counts, the landing summary and loan listings

use std::sync::Arc;

use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    authz::{self, Authorizer},
    config::CatalogConfig,
    context::RequestContext,
    error::AppResult,
    models::{
        book_instance::{LoanStatus, LoanedCopy},
        pagination::{Page, PageQuery},
        user::Capability,
    },
    repository::Repository,
};

/// Kinds of record that can be counted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    Book,
    BookInstance,
    Author,
    Genre,
}

/// Landing page counters
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CatalogSummary {
    pub num_books: i64,
    /// Books whose title contains `title_filter`
    pub num_books_matching: i64,
    pub title_filter: String,
    pub num_instances: i64,
    pub num_instances_available: i64,
    pub num_instances_overdue: i64,
    pub num_authors: i64,
    pub num_genres: i64,
    /// Visits in the caller's session, including this one
    pub num_visits: u64,
}

#[derive(Clone)]
pub struct CatalogQueryService {
    repository: Repository,
    authz: Arc<dyn Authorizer>,
    config: CatalogConfig,
}

impl CatalogQueryService {
    pub fn new(repository: Repository, authz: Arc<dyn Authorizer>, config: CatalogConfig) -> Self {
        Self {
            repository,
            authz,
            config,
        }
    }

    pub async fn count_all(&self, kind: RecordKind) -> AppResult<i64> {
        match kind {
            RecordKind::Book => self.repository.books.count().await,
            RecordKind::BookInstance => self.repository.book_instances.count(None).await,
            RecordKind::Author => self.repository.authors.count().await,
            RecordKind::Genre => self.repository.genres.count().await,
        }
    }

    pub async fn count_available(&self) -> AppResult<i64> {
        self.repository
            .book_instances
            .count(Some(LoanStatus::Available))
            .await
    }

    pub async fn count_title_contains(&self, fragment: &str) -> AppResult<i64> {
        self.repository.books.count_title_contains(fragment).await
    }

    pub async fn count_overdue(&self, ctx: &RequestContext) -> AppResult<i64> {
        self.repository.book_instances.count_overdue(ctx.today).await
    }

    /// Landing summary; `num_visits` comes from the session counter
    pub async fn summary(
        &self,
        ctx: &RequestContext,
        title_filter: Option<&str>,
        num_visits: u64,
    ) -> AppResult<CatalogSummary> {
        let title_filter = title_filter
            .unwrap_or(&self.config.summary_title_filter)
            .to_string();

        Ok(CatalogSummary {
            num_books: self.count_all(RecordKind::Book).await?,
            num_books_matching: self.count_title_contains(&title_filter).await?,
            title_filter,
            num_instances: self.count_all(RecordKind::BookInstance).await?,
            num_instances_available: self.count_available().await?,
            num_instances_overdue: self.count_overdue(ctx).await?,
            num_authors: self.count_all(RecordKind::Author).await?,
            num_genres: self.count_all(RecordKind::Genre).await?,
            num_visits,
        })
    }

    /// Every copy on loan, soonest due first (librarians only)
    pub async fn list_on_loan(
        &self,
        ctx: &RequestContext,
        query: &PageQuery,
    ) -> AppResult<Page<LoanedCopy>> {
        authz::require(self.authz.as_ref(), &ctx.actor, Capability::MarkReturned)?;
        self.loans_page(ctx, None, query).await
    }

    /// Copies on loan to the caller, soonest due first
    pub async fn list_on_loan_for_borrower(
        &self,
        ctx: &RequestContext,
        query: &PageQuery,
    ) -> AppResult<Page<LoanedCopy>> {
        self.loans_page(ctx, Some(ctx.actor.user_id), query).await
    }

    async fn loans_page(
        &self,
        ctx: &RequestContext,
        borrower_id: Option<i32>,
        query: &PageQuery,
    ) -> AppResult<Page<LoanedCopy>> {
        let window = query.window(self.config.page_size, self.config.max_page_size);
        let (mut items, total) = self
            .repository
            .book_instances
            .list_on_loan(borrower_id, window)
            .await?;
        for copy in &mut items {
            copy.is_overdue = copy.due_back.map(|d| d < ctx.today).unwrap_or(false);
        }
        Ok(Page::new(items, total, window))
    }
}
