//! In-memory store backing every repository contract
//!
//! Used by the `memory` storage backend and by tests. All maps sit behind a
//! single lock, so each operation is atomic with respect to the others.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{AuthorStore, BookInstanceStore, BookStore, GenreStore};
use crate::{
    error::{AppError, AppResult},
    models::{
        author::{Author, CreateAuthor},
        book::{Book, CreateBook},
        book_instance::{BookInstance, LoanStatus, LoanedCopy},
        genre::Genre,
        pagination::PageWindow,
    },
};

#[derive(Default)]
struct State {
    books: BTreeMap<i32, Book>,
    authors: BTreeMap<i32, Author>,
    genres: BTreeMap<i32, Genre>,
    instances: HashMap<Uuid, BookInstance>,
    next_book_id: i32,
    next_author_id: i32,
    next_genre_id: i32,
}

impl State {
    fn next_id(counter: &mut i32) -> i32 {
        *counter += 1;
        *counter
    }
}

fn window_of<T>(rows: Vec<T>, window: PageWindow) -> (Vec<T>, i64) {
    let total = rows.len() as i64;
    let items = rows
        .into_iter()
        .skip(window.offset() as usize)
        .take(window.limit() as usize)
        .collect();
    (items, total)
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    state: Arc<RwLock<State>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Genres have no write path in the API; seed them directly.
    pub async fn insert_genre(&self, name: &str) -> Genre {
        let mut state = self.state.write().await;
        let id = State::next_id(&mut state.next_genre_id);
        let genre = Genre {
            id,
            name: name.to_string(),
        };
        state.genres.insert(id, genre.clone());
        genre
    }
}

#[async_trait]
impl BookInstanceStore for MemoryStore {
    async fn get(&self, id: Uuid) -> AppResult<BookInstance> {
        self.state
            .read()
            .await
            .instances
            .get(&id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Book instance {} not found", id)))
    }

    async fn create(&self, instance: &BookInstance) -> AppResult<BookInstance> {
        // Same row constraint as the book_instances table
        instance.check_consistency()?;
        let mut state = self.state.write().await;
        if !state.books.contains_key(&instance.book_id) {
            return Err(AppError::NotFound(format!("Book {} not found", instance.book_id)));
        }
        if state.instances.contains_key(&instance.id) {
            return Err(AppError::Duplicate(format!(
                "Book instance {} already exists",
                instance.id
            )));
        }
        let created = BookInstance {
            version: 0,
            ..instance.clone()
        };
        state.instances.insert(created.id, created.clone());
        Ok(created)
    }

    async fn save(&self, instance: &BookInstance) -> AppResult<BookInstance> {
        instance.check_consistency()?;
        let mut state = self.state.write().await;
        let stored = state
            .instances
            .get_mut(&instance.id)
            .ok_or_else(|| AppError::NotFound(format!("Book instance {} not found", instance.id)))?;
        if stored.version != instance.version {
            return Err(AppError::Conflict(format!(
                "Book instance {} was modified concurrently",
                instance.id
            )));
        }
        *stored = BookInstance {
            version: instance.version + 1,
            ..instance.clone()
        };
        Ok(stored.clone())
    }

    async fn delete(&self, id: Uuid) -> AppResult<()> {
        self.state
            .write()
            .await
            .instances
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| AppError::NotFound(format!("Book instance {} not found", id)))
    }

    async fn list_for_book(&self, book_id: i32) -> AppResult<Vec<BookInstance>> {
        let state = self.state.read().await;
        let mut rows: Vec<BookInstance> = state
            .instances
            .values()
            .filter(|i| i.book_id == book_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| a.imprint.cmp(&b.imprint).then(a.id.cmp(&b.id)));
        Ok(rows)
    }

    async fn count(&self, status: Option<LoanStatus>) -> AppResult<i64> {
        let state = self.state.read().await;
        let count = state
            .instances
            .values()
            .filter(|i| status.map(|s| i.status == s).unwrap_or(true))
            .count();
        Ok(count as i64)
    }

    async fn count_overdue(&self, today: NaiveDate) -> AppResult<i64> {
        let state = self.state.read().await;
        Ok(state.instances.values().filter(|i| i.is_overdue(today)).count() as i64)
    }

    async fn list_on_loan(
        &self,
        borrower_id: Option<i32>,
        window: PageWindow,
    ) -> AppResult<(Vec<LoanedCopy>, i64)> {
        let state = self.state.read().await;
        let mut rows: Vec<LoanedCopy> = state
            .instances
            .values()
            .filter(|i| i.is_on_loan())
            .filter(|i| borrower_id.is_none() || i.borrower_id == borrower_id)
            .map(|i| LoanedCopy {
                id: i.id,
                book_id: i.book_id,
                title: state
                    .books
                    .get(&i.book_id)
                    .map(|b| b.title.clone())
                    .unwrap_or_default(),
                imprint: i.imprint.clone(),
                due_back: i.due_back,
                borrower_id: i.borrower_id,
                is_overdue: false,
            })
            .collect();
        // Ascending due date, undated rows last (as Postgres orders NULLs)
        rows.sort_by(|a, b| {
            (a.due_back.is_none(), a.due_back, a.id).cmp(&(b.due_back.is_none(), b.due_back, b.id))
        });
        Ok(window_of(rows, window))
    }
}

#[async_trait]
impl BookStore for MemoryStore {
    async fn list(&self, window: PageWindow) -> AppResult<(Vec<Book>, i64)> {
        let state = self.state.read().await;
        let mut rows: Vec<Book> = state.books.values().cloned().collect();
        rows.sort_by(|a, b| a.title.cmp(&b.title).then(a.id.cmp(&b.id)));
        Ok(window_of(rows, window))
    }

    async fn get(&self, id: i32) -> AppResult<Book> {
        self.state
            .read()
            .await
            .books
            .get(&id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Book {} not found", id)))
    }

    async fn list_by_author(&self, author_id: i32) -> AppResult<Vec<Book>> {
        let state = self.state.read().await;
        let mut rows: Vec<Book> = state
            .books
            .values()
            .filter(|b| b.author_id == Some(author_id))
            .cloned()
            .collect();
        rows.sort_by(|a, b| a.title.cmp(&b.title).then(a.id.cmp(&b.id)));
        Ok(rows)
    }

    async fn create(&self, data: &CreateBook) -> AppResult<Book> {
        let mut state = self.state.write().await;
        if state.books.values().any(|b| b.isbn == data.isbn) {
            return Err(AppError::Duplicate(format!("ISBN {} already catalogued", data.isbn)));
        }
        let id = State::next_id(&mut state.next_book_id);
        let book = Book {
            id,
            title: data.title.clone(),
            author_id: data.author_id,
            summary: data.summary.clone().unwrap_or_default(),
            isbn: data.isbn.clone(),
            genre_ids: data.genre_ids.clone().unwrap_or_default(),
        };
        state.books.insert(id, book.clone());
        Ok(book)
    }

    async fn update(&self, book: &Book) -> AppResult<Book> {
        let mut state = self.state.write().await;
        if state
            .books
            .values()
            .any(|b| b.id != book.id && b.isbn == book.isbn)
        {
            return Err(AppError::Duplicate(format!("ISBN {} already catalogued", book.isbn)));
        }
        let stored = state
            .books
            .get_mut(&book.id)
            .ok_or_else(|| AppError::NotFound(format!("Book {} not found", book.id)))?;
        *stored = book.clone();
        Ok(book.clone())
    }

    async fn delete(&self, id: i32) -> AppResult<()> {
        let mut state = self.state.write().await;
        if state.instances.values().any(|i| i.book_id == id) {
            return Err(AppError::BusinessRule(format!("Book {} still has copies", id)));
        }
        state
            .books
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| AppError::NotFound(format!("Book {} not found", id)))
    }

    async fn count(&self) -> AppResult<i64> {
        Ok(self.state.read().await.books.len() as i64)
    }

    async fn count_title_contains(&self, fragment: &str) -> AppResult<i64> {
        let needle = fragment.to_lowercase();
        let state = self.state.read().await;
        Ok(state
            .books
            .values()
            .filter(|b| b.title.to_lowercase().contains(&needle))
            .count() as i64)
    }
}

#[async_trait]
impl AuthorStore for MemoryStore {
    async fn list(&self, window: PageWindow) -> AppResult<(Vec<Author>, i64)> {
        let state = self.state.read().await;
        let mut rows: Vec<Author> = state.authors.values().cloned().collect();
        rows.sort_by(|a, b| {
            (&a.last_name, &a.first_name, a.id).cmp(&(&b.last_name, &b.first_name, b.id))
        });
        Ok(window_of(rows, window))
    }

    async fn get(&self, id: i32) -> AppResult<Author> {
        self.state
            .read()
            .await
            .authors
            .get(&id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Author {} not found", id)))
    }

    async fn create(&self, data: &CreateAuthor) -> AppResult<Author> {
        let mut state = self.state.write().await;
        let id = State::next_id(&mut state.next_author_id);
        let author = Author {
            id,
            first_name: data.first_name.clone(),
            last_name: data.last_name.clone(),
            date_of_birth: data.date_of_birth,
            date_of_death: data.date_of_death,
        };
        state.authors.insert(id, author.clone());
        Ok(author)
    }

    async fn update(&self, author: &Author) -> AppResult<Author> {
        let mut state = self.state.write().await;
        let stored = state
            .authors
            .get_mut(&author.id)
            .ok_or_else(|| AppError::NotFound(format!("Author {} not found", author.id)))?;
        *stored = author.clone();
        Ok(author.clone())
    }

    async fn delete(&self, id: i32) -> AppResult<()> {
        let mut state = self.state.write().await;
        if state.authors.remove(&id).is_none() {
            return Err(AppError::NotFound(format!("Author {} not found", id)));
        }
        for book in state.books.values_mut() {
            if book.author_id == Some(id) {
                book.author_id = None;
            }
        }
        Ok(())
    }

    async fn count(&self) -> AppResult<i64> {
        Ok(self.state.read().await.authors.len() as i64)
    }
}

#[async_trait]
impl GenreStore for MemoryStore {
    async fn list(&self) -> AppResult<Vec<Genre>> {
        let state = self.state.read().await;
        let mut rows: Vec<Genre> = state.genres.values().cloned().collect();
        rows.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(rows)
    }

    async fn count(&self) -> AppResult<i64> {
        Ok(self.state.read().await.genres.len() as i64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn store_with_copy() -> (MemoryStore, BookInstance) {
        let store = MemoryStore::new();
        let book = BookStore::create(
            &store,
            &CreateBook {
                title: "The Left Hand of Darkness".into(),
                author_id: None,
                summary: None,
                isbn: "9780441478125".into(),
                genre_ids: None,
            },
        )
        .await
        .unwrap();
        let copy = BookInstanceStore::create(
            &store,
            &BookInstance {
                id: Uuid::new_v4(),
                book_id: book.id,
                imprint: "Ace, 1969".into(),
                due_back: None,
                status: LoanStatus::Available,
                borrower_id: None,
                version: 0,
            },
        )
        .await
        .unwrap();
        (store, copy)
    }

    #[tokio::test]
    async fn test_save_bumps_version() {
        let (store, copy) = store_with_copy().await;
        let saved = BookInstanceStore::save(&store, &copy).await.unwrap();
        assert_eq!(saved.version, copy.version + 1);
        assert_eq!(BookInstanceStore::get(&store, copy.id).await.unwrap(), saved);
    }

    #[tokio::test]
    async fn test_stale_save_conflicts() {
        let (store, copy) = store_with_copy().await;
        let first = copy.clone();
        let mut second = copy.clone();

        BookInstanceStore::save(&store, &first).await.unwrap();
        second.imprint = "Walker, 1969".into();
        let result = BookInstanceStore::save(&store, &second).await;
        assert!(matches!(result, Err(AppError::Conflict(_))));
        // The losing write left no trace
        let stored = BookInstanceStore::get(&store, copy.id).await.unwrap();
        assert_eq!(stored.imprint, "Ace, 1969");
    }

    #[tokio::test]
    async fn test_save_unknown_is_not_found() {
        let (store, mut copy) = store_with_copy().await;
        copy.id = Uuid::new_v4();
        let result = BookInstanceStore::save(&store, &copy).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_loan_fields_only_on_loaned_copies() {
        let (store, copy) = store_with_copy().await;

        // Available with a due date but no borrower
        let half_returned = BookInstance {
            due_back: NaiveDate::from_ymd_opt(2024, 1, 10),
            ..copy.clone()
        };
        let result = BookInstanceStore::save(&store, &half_returned).await;
        assert!(matches!(result, Err(AppError::Validation(_))));

        let result = BookInstanceStore::create(
            &store,
            &BookInstance {
                id: Uuid::new_v4(),
                status: LoanStatus::Maintenance,
                borrower_id: Some(7),
                ..copy.clone()
            },
        )
        .await;
        assert!(matches!(result, Err(AppError::Validation(_))));
        assert_eq!(BookInstanceStore::count(&store, None).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_delete_book_with_copies_is_refused() {
        let (store, copy) = store_with_copy().await;
        let result = BookStore::delete(&store, copy.book_id).await;
        assert!(matches!(result, Err(AppError::BusinessRule(_))));
    }

    #[tokio::test]
    async fn test_delete_author_detaches_books() {
        let store = MemoryStore::new();
        let author = AuthorStore::create(
            &store,
            &CreateAuthor {
                first_name: "Ursula".into(),
                last_name: "Le Guin".into(),
                date_of_birth: None,
                date_of_death: None,
            },
        )
        .await
        .unwrap();
        let book = BookStore::create(
            &store,
            &CreateBook {
                title: "Earthsea".into(),
                author_id: Some(author.id),
                summary: None,
                isbn: "9780547773742".into(),
                genre_ids: None,
            },
        )
        .await
        .unwrap();

        AuthorStore::delete(&store, author.id).await.unwrap();
        assert_eq!(BookStore::get(&store, book.id).await.unwrap().author_id, None);
    }
}
