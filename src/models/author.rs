//! Author model and related types

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use super::book::BookShort;

/// Author row. Listed by (last_name, first_name).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Author {
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: Option<NaiveDate>,
    /// Died
    pub date_of_death: Option<NaiveDate>,
}

impl std::fmt::Display for Author {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}, {}", self.last_name, self.first_name)
    }
}

/// Author with the books attributed to them
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuthorWithBooks {
    #[serde(flatten)]
    pub author: Author,
    pub books: Vec<BookShort>,
}

/// Create author request
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateAuthor {
    #[validate(length(min = 1, max = 100, message = "First name must be 1-100 characters"))]
    pub first_name: String,
    #[validate(length(min = 1, max = 100, message = "Last name must be 1-100 characters"))]
    pub last_name: String,
    pub date_of_birth: Option<NaiveDate>,
    pub date_of_death: Option<NaiveDate>,
}

/// Update author request. Replaces every field: a missing or null date
/// clears it.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct UpdateAuthor {
    #[validate(length(min = 1, max = 100, message = "First name must be 1-100 characters"))]
    pub first_name: String,
    #[validate(length(min = 1, max = 100, message = "Last name must be 1-100 characters"))]
    pub last_name: String,
    #[serde(default)]
    pub date_of_birth: Option<NaiveDate>,
    #[serde(default)]
    pub date_of_death: Option<NaiveDate>,
}

/// Author list query parameters
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct AuthorQuery {
    pub page: Option<i64>,
}

/// Deletion confirmation shown before (and again after a refused) delete
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct AuthorDeleteConfirmation {
    pub author: Author,
    /// Books still attributed to this author; deletion is refused while non-zero
    pub book_count: i64,
    /// Where to send the confirmed deletion
    pub confirm_path: String,
}

impl AuthorDeleteConfirmation {
    pub fn new(author: Author, book_count: i64) -> Self {
        let confirm_path = format!("/api/v1/authors/{}", author.id);
        Self {
            author,
            book_count,
            confirm_path,
        }
    }
}

/// Outcome of a delete-author request
#[derive(Debug, Clone, PartialEq)]
pub enum AuthorDeletion {
    Deleted,
    /// Books still reference the author; the confirmation should be shown again
    Blocked(AuthorDeleteConfirmation),
}
