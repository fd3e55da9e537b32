//! Book model (a title, not a specific copy)

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use super::{author::Author, book_instance::BookInstance, genre::Genre, language::Language};

/// Number of genres shown before the list is abbreviated
const GENRE_DISPLAY_LIMIT: usize = 3;

/// Book row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Book {
    pub id: i32,
    pub title: String,
    pub author_id: Option<i32>,
    pub summary: String,
    /// 13 character ISBN
    pub isbn: String,
    pub language_id: Option<i32>,
}

/// Book with its author name, for lists. Fetched with a single join.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct BookShort {
    pub id: i32,
    pub title: String,
    pub author_id: Option<i32>,
    pub author_first_name: Option<String>,
    pub author_last_name: Option<String>,
}

impl BookShort {
    /// "last, first" of the author, when there is one
    pub fn author_display(&self) -> Option<String> {
        match (&self.author_last_name, &self.author_first_name) {
            (Some(last), Some(first)) => Some(format!("{}, {}", last, first)),
            (Some(last), None) => Some(last.clone()),
            _ => None,
        }
    }
}

impl std::fmt::Display for BookShort {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.author_display() {
            Some(author) => write!(f, "{} by {}", self.title, author),
            None => write!(f, "{} by None", self.title),
        }
    }
}

/// Book joined with its author and language, one row per book
#[derive(Debug, Clone, FromRow)]
pub struct BookWithRelationsRow {
    pub id: i32,
    pub title: String,
    pub author_id: Option<i32>,
    pub summary: String,
    pub isbn: String,
    pub language_id: Option<i32>,
    pub author_first_name: Option<String>,
    pub author_last_name: Option<String>,
    pub author_date_of_birth: Option<NaiveDate>,
    pub author_date_of_death: Option<NaiveDate>,
    pub language_name: Option<String>,
}

impl BookWithRelationsRow {
    /// Split the joined row. A side of the LEFT JOIN that matched nothing becomes `None`.
    pub fn into_parts(self) -> (Book, Option<Author>, Option<Language>) {
        let author = match (self.author_id, self.author_first_name, self.author_last_name) {
            (Some(id), Some(first_name), Some(last_name)) => Some(Author {
                id,
                first_name,
                last_name,
                date_of_birth: self.author_date_of_birth,
                date_of_death: self.author_date_of_death,
            }),
            _ => None,
        };
        let language = match (self.language_id, self.language_name) {
            (Some(id), Some(name)) => Some(Language { id, name }),
            _ => None,
        };
        let book = Book {
            id: self.id,
            title: self.title,
            author_id: self.author_id,
            summary: self.summary,
            isbn: self.isbn,
            language_id: self.language_id,
        };
        (book, author, language)
    }
}

/// Book with everything the detail page shows
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BookDetail {
    #[serde(flatten)]
    pub book: Book,
    pub author: Option<Author>,
    pub genres: Vec<Genre>,
    pub genre_display: String,
    pub language: Option<Language>,
    pub instances: Vec<BookInstance>,
}

/// Create book request
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateBook {
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: String,
    pub author_id: Option<i32>,
    #[validate(length(max = 1000, message = "Summary must be at most 1000 characters"))]
    pub summary: String,
    #[validate(length(equal = 13, message = "ISBN must be exactly 13 characters"))]
    pub isbn: String,
    #[serde(default)]
    pub genre_ids: Vec<i32>,
    pub language_id: Option<i32>,
}

/// Book list query parameters
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct BookQuery {
    pub page: Option<i64>,
}

/// Comma separated genre names, abbreviated after the first three
pub fn display_genre(genres: &[Genre]) -> String {
    let shown = genres
        .iter()
        .take(GENRE_DISPLAY_LIMIT)
        .map(|g| g.name.as_str())
        .collect::<Vec<_>>()
        .join(", ");

    if genres.len() > GENRE_DISPLAY_LIMIT {
        format!("{}...", shown)
    } else {
        shown
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn genres(names: &[&str]) -> Vec<Genre> {
        names
            .iter()
            .enumerate()
            .map(|(i, name)| Genre {
                id: i as i32 + 1,
                name: name.to_string(),
            })
            .collect()
    }

    #[test]
    fn test_display_genre() {
        assert_eq!(display_genre(&[]), "");
        assert_eq!(display_genre(&genres(&["Fantasy"])), "Fantasy");
        assert_eq!(
            display_genre(&genres(&["Fantasy", "Horror", "Poetry"])),
            "Fantasy, Horror, Poetry"
        );
        assert_eq!(
            display_genre(&genres(&["Fantasy", "Horror", "Poetry", "Drama"])),
            "Fantasy, Horror, Poetry..."
        );
    }

    #[test]
    fn test_isbn_must_be_13_characters() {
        let book = CreateBook {
            title: "Dune".to_string(),
            author_id: Some(1),
            summary: String::new(),
            isbn: "9780441172719".to_string(),
            genre_ids: vec![],
            language_id: None,
        };
        assert!(book.validate().is_ok());

        let short = CreateBook {
            isbn: "044117271".to_string(),
            ..book
        };
        assert!(short.validate().is_err());
    }

    fn joined_row() -> BookWithRelationsRow {
        BookWithRelationsRow {
            id: 4,
            title: "Dune".to_string(),
            author_id: Some(2),
            summary: String::new(),
            isbn: "9780441172719".to_string(),
            language_id: Some(1),
            author_first_name: Some("Frank".to_string()),
            author_last_name: Some("Herbert".to_string()),
            author_date_of_birth: NaiveDate::from_ymd_opt(1920, 10, 8),
            author_date_of_death: NaiveDate::from_ymd_opt(1986, 2, 11),
            language_name: Some("English".to_string()),
        }
    }

    #[test]
    fn test_joined_row_into_parts() {
        let (book, author, language) = joined_row().into_parts();
        assert_eq!(book.id, 4);
        assert_eq!(book.author_id, Some(2));

        let author = author.expect("author");
        assert_eq!(author.id, 2);
        assert_eq!(author.to_string(), "Herbert, Frank");
        assert_eq!(author.date_of_death, NaiveDate::from_ymd_opt(1986, 2, 11));

        assert_eq!(
            language,
            Some(Language {
                id: 1,
                name: "English".to_string()
            })
        );
    }

    #[test]
    fn test_joined_row_without_author_or_language() {
        let row = BookWithRelationsRow {
            author_id: None,
            author_first_name: None,
            author_last_name: None,
            author_date_of_birth: None,
            author_date_of_death: None,
            language_id: None,
            language_name: None,
            ..joined_row()
        };
        let (book, author, language) = row.into_parts();
        assert_eq!(book.title, "Dune");
        assert_eq!(author, None);
        assert_eq!(language, None);
    }

    #[test]
    fn test_book_display() {
        let book = BookShort {
            id: 1,
            title: "Dune".to_string(),
            author_id: Some(2),
            author_first_name: Some("Frank".to_string()),
            author_last_name: Some("Herbert".to_string()),
        };
        assert_eq!(book.to_string(), "Dune by Herbert, Frank");
    }
}
