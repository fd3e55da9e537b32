//! Authors repository for database operations

use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::{
        author::{Author, AuthorWithBooks, CreateAuthor, UpdateAuthor},
        book::BookShort,
        pagination::PageRequest,
    },
};

/// Persistence of author records
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AuthorStore: Send + Sync {
    async fn get(&self, id: i32) -> AppResult<Author>;

    async fn get_with_books(&self, id: i32) -> AppResult<AuthorWithBooks>;

    /// One page of authors with their books (two queries, no N+1)
    async fn list_with_books(&self, page: PageRequest) -> AppResult<(Vec<AuthorWithBooks>, i64)>;

    async fn create(&self, data: &CreateAuthor) -> AppResult<Author>;

    /// Replace every field of the author
    async fn update(&self, id: i32, data: &UpdateAuthor) -> AppResult<Author>;

    /// Fails with `ReferentialConflict` while books reference the author
    async fn delete(&self, id: i32) -> AppResult<()>;

    async fn count_books(&self, id: i32) -> AppResult<i64>;
}

#[derive(Clone)]
pub struct AuthorsRepository {
    pool: Pool<Postgres>,
}

impl AuthorsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    pub async fn count(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM authors")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Books for a set of authors, grouped by author id
    async fn books_by_author(&self, author_ids: &[i32]) -> AppResult<HashMap<i32, Vec<BookShort>>> {
        let books = sqlx::query_as::<_, BookShort>(
            r#"
            SELECT b.id, b.title, b.author_id,
                   a.first_name AS author_first_name, a.last_name AS author_last_name
            FROM books b
            JOIN authors a ON a.id = b.author_id
            WHERE b.author_id = ANY($1)
            ORDER BY b.title, b.id
            "#,
        )
        .bind(author_ids)
        .fetch_all(&self.pool)
        .await?;

        let mut grouped: HashMap<i32, Vec<BookShort>> = HashMap::new();
        for book in books {
            if let Some(author_id) = book.author_id {
                grouped.entry(author_id).or_default().push(book);
            }
        }
        Ok(grouped)
    }
}

#[async_trait]
impl AuthorStore for AuthorsRepository {
    async fn get(&self, id: i32) -> AppResult<Author> {
        sqlx::query_as::<_, Author>("SELECT * FROM authors WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Author {} not found", id)))
    }

    async fn get_with_books(&self, id: i32) -> AppResult<AuthorWithBooks> {
        let author = self.get(id).await?;
        let books = self.books_by_author(&[id]).await?.remove(&id).unwrap_or_default();
        Ok(AuthorWithBooks { author, books })
    }

    async fn list_with_books(&self, page: PageRequest) -> AppResult<(Vec<AuthorWithBooks>, i64)> {
        let total = self.count().await?;

        let authors = sqlx::query_as::<_, Author>(
            "SELECT * FROM authors ORDER BY last_name, first_name, id LIMIT $1 OFFSET $2",
        )
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        let ids: Vec<i32> = authors.iter().map(|a| a.id).collect();
        let mut books = self.books_by_author(&ids).await?;

        let result = authors
            .into_iter()
            .map(|author| {
                let books = books.remove(&author.id).unwrap_or_default();
                AuthorWithBooks { author, books }
            })
            .collect();

        Ok((result, total))
    }

    async fn create(&self, data: &CreateAuthor) -> AppResult<Author> {
        let author = sqlx::query_as::<_, Author>(
            r#"
            INSERT INTO authors (first_name, last_name, date_of_birth, date_of_death)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(&data.first_name)
        .bind(&data.last_name)
        .bind(data.date_of_birth)
        .bind(data.date_of_death)
        .fetch_one(&self.pool)
        .await?;
        Ok(author)
    }

    async fn update(&self, id: i32, data: &UpdateAuthor) -> AppResult<Author> {
        sqlx::query_as::<_, Author>(
            r#"
            UPDATE authors SET
                first_name = $1,
                last_name = $2,
                date_of_birth = $3,
                date_of_death = $4
            WHERE id = $5
            RETURNING *
            "#,
        )
        .bind(&data.first_name)
        .bind(&data.last_name)
        .bind(data.date_of_birth)
        .bind(data.date_of_death)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Author {} not found", id)))
    }

    async fn delete(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM authors WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::from_delete(e, "authors", id))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Author {} not found", id)));
        }
        Ok(())
    }

    async fn count_books(&self, id: i32) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM books WHERE author_id = $1")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
