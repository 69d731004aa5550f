//! Catalog management service: books, authors and genres

use std::sync::Arc;

use validator::Validate;

use crate::{
    authz::{self, Authorizer},
    config::CatalogConfig,
    context::RequestContext,
    error::{AppError, AppResult},
    models::{
        author::{Author, AuthorDetails, CreateAuthor, UpdateAuthor},
        book::{Book, BookDetails, CreateBook, UpdateBook},
        genre::Genre,
        pagination::{Page, PageQuery},
        user::Capability,
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct CatalogService {
    repository: Repository,
    authz: Arc<dyn Authorizer>,
    config: CatalogConfig,
}

impl CatalogService {
    pub fn new(repository: Repository, authz: Arc<dyn Authorizer>, config: CatalogConfig) -> Self {
        Self {
            repository,
            authz,
            config,
        }
    }

    // Books

    pub async fn list_books(&self, query: &PageQuery) -> AppResult<Page<Book>> {
        let window = query.window(self.config.page_size, self.config.max_page_size);
        let (items, total) = self.repository.books.list(window).await?;
        Ok(Page::new(items, total, window))
    }

    pub async fn get_book(&self, id: i32) -> AppResult<BookDetails> {
        let book = self.repository.books.get(id).await?;
        let author = match book.author_id {
            Some(author_id) => match self.repository.authors.get(author_id).await {
                Ok(author) => Some(author),
                Err(AppError::NotFound(_)) => None,
                Err(e) => return Err(e),
            },
            None => None,
        };
        let copies = self.repository.book_instances.list_for_book(id).await?;
        Ok(BookDetails {
            book,
            author,
            copies,
        })
    }

    pub async fn create_book(&self, ctx: &RequestContext, data: CreateBook) -> AppResult<Book> {
        authz::require(self.authz.as_ref(), &ctx.actor, Capability::AddBook)?;
        data.validate()?;
        if let Some(author_id) = data.author_id {
            self.repository.authors.get(author_id).await?;
        }

        let book = self.repository.books.create(&data).await?;
        tracing::info!(book = book.id, actor = ctx.actor.user_id, "Book created");
        Ok(book)
    }

    pub async fn update_book(&self, ctx: &RequestContext, id: i32, data: UpdateBook) -> AppResult<Book> {
        authz::require(self.authz.as_ref(), &ctx.actor, Capability::ChangeBook)?;
        data.validate()?;
        if let Some(author_id) = data.author_id {
            self.repository.authors.get(author_id).await?;
        }

        let mut book = self.repository.books.get(id).await?;
        book.apply(data);
        let book = self.repository.books.update(&book).await?;
        tracing::info!(book = id, actor = ctx.actor.user_id, "Book updated");
        Ok(book)
    }

    /// Refused while copies of the book exist
    pub async fn delete_book(&self, ctx: &RequestContext, id: i32) -> AppResult<()> {
        authz::require(self.authz.as_ref(), &ctx.actor, Capability::DeleteBook)?;

        let copies = self.repository.book_instances.list_for_book(id).await?;
        if !copies.is_empty() {
            return Err(AppError::BusinessRule(format!(
                "Book {} still has {} copies",
                id,
                copies.len()
            )));
        }
        self.repository.books.delete(id).await?;
        tracing::info!(book = id, actor = ctx.actor.user_id, "Book deleted");
        Ok(())
    }

    // Authors

    pub async fn list_authors(&self, query: &PageQuery) -> AppResult<Page<Author>> {
        let window = query.window(self.config.page_size, self.config.max_page_size);
        let (items, total) = self.repository.authors.list(window).await?;
        Ok(Page::new(items, total, window))
    }

    pub async fn get_author(&self, id: i32) -> AppResult<AuthorDetails> {
        let author = self.repository.authors.get(id).await?;
        let books = self.repository.books.list_by_author(id).await?;
        Ok(AuthorDetails { author, books })
    }

    pub async fn create_author(&self, ctx: &RequestContext, data: CreateAuthor) -> AppResult<Author> {
        authz::require(self.authz.as_ref(), &ctx.actor, Capability::AddAuthor)?;
        data.validate()?;

        let author = self.repository.authors.create(&data).await?;
        tracing::info!(author = author.id, actor = ctx.actor.user_id, "Author created");
        Ok(author)
    }

    pub async fn update_author(
        &self,
        ctx: &RequestContext,
        id: i32,
        data: UpdateAuthor,
    ) -> AppResult<Author> {
        authz::require(self.authz.as_ref(), &ctx.actor, Capability::ChangeAuthor)?;
        data.validate()?;

        let mut author = self.repository.authors.get(id).await?;
        author.apply(data);
        author
            .check_lifespan()
            .map_err(|e| AppError::Validation(e.to_string()))?;
        let author = self.repository.authors.update(&author).await?;
        tracing::info!(author = id, actor = ctx.actor.user_id, "Author updated");
        Ok(author)
    }

    pub async fn delete_author(&self, ctx: &RequestContext, id: i32) -> AppResult<()> {
        authz::require(self.authz.as_ref(), &ctx.actor, Capability::DeleteAuthor)?;

        self.repository.authors.delete(id).await?;
        tracing::info!(author = id, actor = ctx.actor.user_id, "Author deleted");
        Ok(())
    }

    // Genres

    pub async fn list_genres(&self) -> AppResult<Vec<Genre>> {
        self.repository.genres.list().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        authz::ClaimsAuthorizer,
        models::{book_instance::BookInstance, book_instance::LoanStatus, user::UserClaims},
        repository::{BookInstanceStore, MemoryStore},
    };
    use chrono::NaiveDate;
    use uuid::Uuid;

    fn ctx(capabilities: &[Capability]) -> RequestContext {
        RequestContext::new(
            UserClaims {
                sub: "staff".to_string(),
                user_id: 1,
                sid: None,
                is_superuser: false,
                capabilities: capabilities.iter().map(|c| c.as_str().to_string()).collect(),
                exp: 0,
                iat: 0,
            },
            NaiveDate::from_ymd_opt(2024, 1, 5).unwrap(),
        )
    }

    fn service(store: &MemoryStore) -> CatalogService {
        CatalogService::new(
            Repository::in_memory(store.clone()),
            Arc::new(ClaimsAuthorizer),
            CatalogConfig::default(),
        )
    }

    fn new_author() -> CreateAuthor {
        CreateAuthor {
            first_name: "Stanisław".into(),
            last_name: "Lem".into(),
            date_of_birth: NaiveDate::from_ymd_opt(1921, 9, 12),
            date_of_death: NaiveDate::from_ymd_opt(2006, 3, 27),
        }
    }

    fn new_book(author_id: Option<i32>) -> CreateBook {
        CreateBook {
            title: "Solaris".into(),
            author_id,
            summary: Some("A planet-wide ocean.".into()),
            isbn: "9780156027601".into(),
            genre_ids: None,
        }
    }

    #[tokio::test]
    async fn test_book_lifecycle() {
        let store = MemoryStore::new();
        let catalog = service(&store);
        let staff = ctx(&[
            Capability::AddAuthor,
            Capability::AddBook,
            Capability::ChangeBook,
            Capability::DeleteBook,
        ]);

        let author = catalog.create_author(&staff, new_author()).await.unwrap();
        let book = catalog.create_book(&staff, new_book(Some(author.id))).await.unwrap();

        let updated = catalog
            .update_book(
                &staff,
                book.id,
                UpdateBook {
                    title: Some("Solaris (1961)".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.title, "Solaris (1961)");
        assert_eq!(updated.isbn, book.isbn);

        let details = catalog.get_book(book.id).await.unwrap();
        assert_eq!(details.author, Some(author.clone()));
        assert!(details.copies.is_empty());

        let by_author = catalog.get_author(author.id).await.unwrap();
        assert_eq!(by_author.books.len(), 1);

        catalog.delete_book(&staff, book.id).await.unwrap();
        assert!(matches!(catalog.get_book(book.id).await, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_book_with_copies_cannot_be_deleted() {
        let store = MemoryStore::new();
        let catalog = service(&store);
        let staff = ctx(&[Capability::AddBook, Capability::DeleteBook]);

        let book = catalog.create_book(&staff, new_book(None)).await.unwrap();
        BookInstanceStore::create(
            &store,
            &BookInstance {
                id: Uuid::new_v4(),
                book_id: book.id,
                imprint: "Walker, 1970".into(),
                due_back: None,
                status: LoanStatus::Maintenance,
                borrower_id: None,
                version: 0,
            },
        )
        .await
        .unwrap();

        assert!(matches!(
            catalog.delete_book(&staff, book.id).await,
            Err(AppError::BusinessRule(_))
        ));
    }

    #[tokio::test]
    async fn test_validation_and_capabilities() {
        let store = MemoryStore::new();
        let catalog = service(&store);

        let reader = ctx(&[]);
        assert!(matches!(
            catalog.create_author(&reader, new_author()).await,
            Err(AppError::Authorization(_))
        ));

        let staff = ctx(&[Capability::AddAuthor, Capability::ChangeAuthor, Capability::AddBook]);
        let blank_title = CreateBook {
            title: String::new(),
            ..new_book(None)
        };
        assert!(matches!(
            catalog.create_book(&staff, blank_title).await,
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            catalog.create_book(&staff, new_book(Some(42))).await,
            Err(AppError::NotFound(_))
        ));

        let author = catalog.create_author(&staff, new_author()).await.unwrap();
        let result = catalog
            .update_author(
                &staff,
                author.id,
                UpdateAuthor {
                    date_of_death: NaiveDate::from_ymd_opt(1900, 1, 1),
                    ..Default::default()
                },
            )
            .await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_duplicate_isbn_is_not_retryable() {
        let store = MemoryStore::new();
        let catalog = service(&store);
        let staff = ctx(&[Capability::AddBook, Capability::ChangeBook]);

        catalog.create_book(&staff, new_book(None)).await.unwrap();
        for _ in 0..2 {
            match catalog.create_book(&staff, new_book(None)).await {
                Err(e @ AppError::Duplicate(_)) => assert!(!e.is_retryable()),
                other => panic!("unexpected result: {:?}", other),
            }
        }

        let other = catalog
            .create_book(
                &staff,
                CreateBook {
                    isbn: "9780156027602".into(),
                    ..new_book(None)
                },
            )
            .await
            .unwrap();
        let result = catalog
            .update_book(
                &staff,
                other.id,
                UpdateBook {
                    isbn: Some("9780156027601".into()),
                    ..Default::default()
                },
            )
            .await;
        assert!(matches!(result, Err(AppError::Duplicate(_))));
    }

    #[tokio::test]
    async fn test_author_listing_is_sorted_and_paginated() {
        let store = MemoryStore::new();
        let catalog = service(&store);
        let staff = ctx(&[Capability::AddAuthor]);

        for (first, last) in [("Isaac", "Asimov"), ("Frank", "Herbert"), ("Arthur", "Clarke")] {
            catalog
                .create_author(
                    &staff,
                    CreateAuthor {
                        first_name: first.into(),
                        last_name: last.into(),
                        date_of_birth: None,
                        date_of_death: None,
                    },
                )
                .await
                .unwrap();
        }

        let page = catalog.list_authors(&PageQuery::new(1, 2)).await.unwrap();
        assert_eq!(page.total, 3);
        let names: Vec<String> = page.items.iter().map(|a| a.last_name.clone()).collect();
        assert_eq!(names, vec!["Asimov", "Clarke"]);
    }
}
