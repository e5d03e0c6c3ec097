//! Repository layer for database operations

pub mod books;
pub mod memory;
pub mod users;

use async_trait::async_trait;
use sqlx::{Pool, Postgres};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{Book, NewBook, NewUser, User},
};

pub use memory::MemoryRepository;

/// Durable storage for users and books.
///
/// Every mutation is a single atomic operation. Email uniqueness is enforced
/// by the store itself: `create_user` fails with `AppError::Conflict` when the
/// email is taken, including when a concurrent insert won the race.
#[async_trait]
pub trait Store: Send + Sync {
    async fn user_by_email(&self, email: &str) -> AppResult<Option<User>>;

    async fn user_by_id(&self, id: Uuid) -> AppResult<Option<User>>;

    async fn create_user(&self, user: NewUser) -> AppResult<User>;

    /// Books of one owner, newest first
    async fn books_by_owner(&self, owner_id: Uuid) -> AppResult<Vec<Book>>;

    async fn book_by_id(&self, id: Uuid) -> AppResult<Option<Book>>;

    async fn create_book(&self, book: NewBook) -> AppResult<Book>;

    /// Returns false when no such book existed
    async fn delete_book(&self, id: Uuid) -> AppResult<bool>;

    /// Connectivity check used by the readiness probe
    async fn ping(&self) -> AppResult<()>;
}

pub type DynStore = Arc<dyn Store>;

/// PostgreSQL-backed store
#[derive(Clone)]
pub struct Repository {
    pub pool: Pool<Postgres>,
}

impl Repository {
    /// Create a new repository with the given database pool
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Store for Repository {
    async fn user_by_email(&self, email: &str) -> AppResult<Option<User>> {
        self.users_get_by_email(email).await
    }

    async fn user_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        self.users_get_by_id(id).await
    }

    async fn create_user(&self, user: NewUser) -> AppResult<User> {
        self.users_create(&user).await
    }

    async fn books_by_owner(&self, owner_id: Uuid) -> AppResult<Vec<Book>> {
        self.books_list_by_owner(owner_id).await
    }

    async fn book_by_id(&self, id: Uuid) -> AppResult<Option<Book>> {
        self.books_get_by_id(id).await
    }

    async fn create_book(&self, book: NewBook) -> AppResult<Book> {
        self.books_create(&book).await
    }

    async fn delete_book(&self, id: Uuid) -> AppResult<bool> {
        self.books_delete(id).await
    }

    async fn ping(&self) -> AppResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
