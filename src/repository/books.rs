//! Books repository for database operations

use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::{
        author::Author,
        book::{Book, BookShort, BookWithRelationsRow, CreateBook},
        language::Language,
        pagination::PageRequest,
    },
};

#[derive(Clone)]
pub struct BooksRepository {
    pool: Pool<Postgres>,
}

impl BooksRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get book by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Book> {
        sqlx::query_as::<_, Book>("SELECT * FROM books WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book {} not found", id)))
    }

    /// Book with its author and language, fetched with a single join
    pub async fn get_with_relations(
        &self,
        id: i32,
    ) -> AppResult<(Book, Option<Author>, Option<Language>)> {
        let row = sqlx::query_as::<_, BookWithRelationsRow>(
            r#"
            SELECT b.id, b.title, b.author_id, b.summary, b.isbn, b.language_id,
                   a.first_name AS author_first_name, a.last_name AS author_last_name,
                   a.date_of_birth AS author_date_of_birth,
                   a.date_of_death AS author_date_of_death,
                   l.name AS language_name
            FROM books b
            LEFT JOIN authors a ON a.id = b.author_id
            LEFT JOIN languages l ON l.id = b.language_id
            WHERE b.id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Book {} not found", id)))?;

        Ok(row.into_parts())
    }

    /// One page of books with their author, ordered by title then author
    pub async fn list(&self, page: PageRequest) -> AppResult<(Vec<BookShort>, i64)> {
        let total = self.count().await?;

        let books = sqlx::query_as::<_, BookShort>(
            r#"
            SELECT b.id, b.title, b.author_id,
                   a.first_name AS author_first_name, a.last_name AS author_last_name
            FROM books b
            LEFT JOIN authors a ON a.id = b.author_id
            ORDER BY b.title, a.last_name, a.first_name, b.id
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        Ok((books, total))
    }

    /// Create a book and its genre links in one transaction
    pub async fn create(&self, data: &CreateBook) -> AppResult<Book> {
        let mut tx = self.pool.begin().await?;

        let book = sqlx::query_as::<_, Book>(
            r#"
            INSERT INTO books (title, author_id, summary, isbn, language_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(&data.title)
        .bind(data.author_id)
        .bind(&data.summary)
        .bind(&data.isbn)
        .bind(data.language_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| AppError::from_write(e, &format!("Book with ISBN {}", data.isbn)))?;

        if !data.genre_ids.is_empty() {
            sqlx::query(
                r#"
                INSERT INTO book_genres (book_id, genre_id)
                SELECT $1, UNNEST($2::INTEGER[])
                ON CONFLICT DO NOTHING
                "#,
            )
            .bind(book.id)
            .bind(&data.genre_ids)
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::from_write(e, "Book genre"))?;
        }

        tx.commit().await?;
        Ok(book)
    }

    /// Delete a book. Refused with `ReferentialConflict` while copies exist.
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::from_delete(e, "books", id))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Book {} not found", id)));
        }
        Ok(())
    }

    pub async fn count(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM books")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
