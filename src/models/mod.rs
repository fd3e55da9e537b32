//! Data models for the catalog

pub mod author;
pub mod book;
pub mod book_instance;
pub mod genre;
pub mod language;
pub mod pagination;
pub mod schema;
pub mod user;

// Re-export commonly used types
pub use author::{Author, AuthorDeletion, AuthorWithBooks};
pub use book::{Book, BookDetail, BookShort};
pub use book_instance::{BookInstance, BookInstanceWithTitle, LoanStatus};
pub use genre::Genre;
pub use language::Language;
pub use pagination::{PageRequest, PaginatedResponse};
pub use user::{Permission, User, UserClaims};
