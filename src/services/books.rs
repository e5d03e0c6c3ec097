//! Owner-scoped book operations

use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{Book, CreateBook, Identity, NewBook},
    repository::DynStore,
};

#[derive(Clone)]
pub struct BookService {
    store: DynStore,
}

impl BookService {
    pub fn new(store: DynStore) -> Self {
        Self { store }
    }

    /// Books of the caller, newest first; nothing for anonymous callers
    pub async fn list(&self, identity: Option<&Identity>) -> AppResult<Vec<Book>> {
        match identity {
            Some(identity) => self.store.books_by_owner(identity.id).await,
            None => Ok(Vec::new()),
        }
    }

    pub async fn create(&self, identity: Option<&Identity>, data: &CreateBook) -> AppResult<Book> {
        let identity = identity.ok_or(AppError::Unauthenticated)?;
        let data = data.normalized()?;

        let book = self
            .store
            .create_book(NewBook {
                title: data.title,
                author: data.author,
                genre: data.genre,
                owner_id: identity.id,
            })
            .await?;

        tracing::info!(user_id = %identity.id, book_id = %book.id, "Book created");
        Ok(book)
    }

    pub async fn delete(&self, identity: Option<&Identity>, book_id: Uuid) -> AppResult<()> {
        let identity = identity.ok_or(AppError::Unauthenticated)?;

        let book = self
            .store
            .book_by_id(book_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book {} not found", book_id)))?;

        if book.owner_id != identity.id {
            tracing::warn!(user_id = %identity.id, book_id = %book_id, "Delete of foreign book refused");
            return Err(AppError::Forbidden);
        }

        if !self.store.delete_book(book_id).await? {
            return Err(AppError::NotFound(format!("Book {} not found", book_id)));
        }

        tracing::info!(user_id = %identity.id, book_id = %book_id, "Book deleted");
        Ok(())
    }
}
