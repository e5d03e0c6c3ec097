//! In-memory store with the same uniqueness and ordering rules as Postgres

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::Store;
use crate::{
    error::{AppError, AppResult},
    models::{Book, NewBook, NewUser, User},
};

#[derive(Default)]
struct Tables {
    users: HashMap<Uuid, User>,
    /// Kept in insertion order
    books: Vec<Book>,
}

#[derive(Default)]
pub struct MemoryRepository {
    tables: RwLock<Tables>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryRepository {
    async fn user_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables.users.values().find(|u| u.email == email).cloned())
    }

    async fn user_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn create_user(&self, user: NewUser) -> AppResult<User> {
        let mut tables = self.tables.write().await;
        if tables.users.values().any(|u| u.email == user.email) {
            return Err(AppError::Conflict(
                "User already exists with this email".to_string(),
            ));
        }

        let user = User {
            id: Uuid::new_v4(),
            email: user.email,
            name: user.name,
            password_hash: user.password_hash,
            created_at: Utc::now(),
        };
        tables.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn books_by_owner(&self, owner_id: Uuid) -> AppResult<Vec<Book>> {
        let tables = self.tables.read().await;
        // Reverse first so equal timestamps keep the latest insert on top
        let mut books: Vec<Book> = tables
            .books
            .iter()
            .rev()
            .filter(|b| b.owner_id == owner_id)
            .cloned()
            .collect();
        books.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(books)
    }

    async fn book_by_id(&self, id: Uuid) -> AppResult<Option<Book>> {
        let tables = self.tables.read().await;
        Ok(tables.books.iter().find(|b| b.id == id).cloned())
    }

    async fn create_book(&self, book: NewBook) -> AppResult<Book> {
        let mut tables = self.tables.write().await;
        if !tables.users.contains_key(&book.owner_id) {
            return Err(AppError::Internal(format!(
                "Owner {} does not exist",
                book.owner_id
            )));
        }

        let book = Book {
            id: Uuid::new_v4(),
            title: book.title,
            author: book.author,
            genre: book.genre,
            owner_id: book.owner_id,
            created_at: Utc::now(),
        };
        tables.books.push(book.clone());
        Ok(book)
    }

    async fn delete_book(&self, id: Uuid) -> AppResult<bool> {
        let mut tables = self.tables.write().await;
        let before = tables.books.len();
        tables.books.retain(|b| b.id != id);
        Ok(tables.books.len() != before)
    }

    async fn ping(&self) -> AppResult<()> {
        Ok(())
    }
}
