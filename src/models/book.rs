//! Book model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};

/// Book record, owned by exactly one user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    pub id: Uuid,
    pub title: String,
    pub author: String,
    pub genre: String,
    pub owner_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// Create book request
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateBook {
    #[validate(length(min = 1))]
    pub title: String,
    #[validate(length(min = 1))]
    pub author: String,
    #[validate(length(min = 1))]
    pub genre: String,
}

impl CreateBook {
    /// Trim every field and reject the request if any of them ends up empty
    pub fn normalized(&self) -> AppResult<CreateBook> {
        let trimmed = CreateBook {
            title: self.title.trim().to_string(),
            author: self.author.trim().to_string(),
            genre: self.genre.trim().to_string(),
        };
        trimmed
            .validate()
            .map_err(|_| AppError::Validation("Invalid input".to_string()))?;
        Ok(trimmed)
    }
}

/// Data needed to insert a book
#[derive(Debug, Clone)]
pub struct NewBook {
    pub title: String,
    pub author: String,
    pub genre: String,
    pub owner_id: Uuid,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(title: &str, author: &str, genre: &str) -> CreateBook {
        CreateBook {
            title: title.into(),
            author: author.into(),
            genre: genre.into(),
        }
    }

    #[test]
    fn fields_are_trimmed() {
        let book = request("  Dune ", "Herbert", " SciFi").normalized().unwrap();
        assert_eq!(book.title, "Dune");
        assert_eq!(book.genre, "SciFi");
    }

    #[test]
    fn blank_fields_are_rejected() {
        for req in [
            request("", "Herbert", "SciFi"),
            request("Dune", "   ", "SciFi"),
            request("Dune", "Herbert", "\t"),
        ] {
            match req.normalized() {
                Err(AppError::Validation(msg)) => assert_eq!(msg, "Invalid input"),
                other => panic!("expected validation error, got {:?}", other),
            }
        }
    }

    #[test]
    fn serializes_with_camel_case_fields() {
        let book = Book {
            id: Uuid::new_v4(),
            title: "Dune".into(),
            author: "Herbert".into(),
            genre: "SciFi".into(),
            owner_id: Uuid::new_v4(),
            created_at: Utc::now(),
        };
        let json = serde_json::to_value(&book).unwrap();
        assert!(json.get("ownerId").is_some());
        assert!(json.get("createdAt").is_some());
    }
}
