//! Book domain methods on Repository

use uuid::Uuid;

use super::Repository;
use crate::{
    error::AppResult,
    models::{Book, NewBook},
};

impl Repository {
    /// List books of one owner, newest first
    pub async fn books_list_by_owner(&self, owner_id: Uuid) -> AppResult<Vec<Book>> {
        let rows = sqlx::query_as::<_, Book>(
            r#"
            SELECT id, title, author, genre, owner_id, created_at
            FROM books
            WHERE owner_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Get book by ID
    pub async fn books_get_by_id(&self, id: Uuid) -> AppResult<Option<Book>> {
        let book = sqlx::query_as::<_, Book>(
            "SELECT id, title, author, genre, owner_id, created_at FROM books WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(book)
    }

    /// Create book
    pub async fn books_create(&self, data: &NewBook) -> AppResult<Book> {
        let row = sqlx::query_as::<_, Book>(
            r#"
            INSERT INTO books (id, title, author, genre, owner_id, created_at)
            VALUES ($1, $2, $3, $4, $5, NOW())
            RETURNING id, title, author, genre, owner_id, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&data.title)
        .bind(&data.author)
        .bind(&data.genre)
        .bind(data.owner_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    /// Delete book
    pub async fn books_delete(&self, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
