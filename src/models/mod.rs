//! Data models for Bookshelf

pub mod book;
pub mod user;

// Re-export commonly used types
pub use book::{Book, CreateBook, NewBook};
pub use user::{Identity, NewUser, SessionClaims, User};
