//! Book instances repository for database operations

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{
        book_instance::{
            BookInstance, BookInstanceWithTitle, CreateBookInstance, LoanStatus,
            UpdateBookInstance,
        },
        pagination::PageRequest,
    },
};

const SELECT_WITH_TITLE: &str = r#"
    SELECT bi.id, bi.book_id, b.title AS book_title, bi.imprint, bi.due_back,
           bi.borrower_id, u.username AS borrower_username, bi.status
    FROM book_instances bi
    LEFT JOIN books b ON b.id = bi.book_id
    LEFT JOIN users u ON u.id = bi.borrower_id
"#;

/// Loan-related access to book instances
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BookInstanceStore: Send + Sync {
    /// Instance with its book title
    async fn get_with_title(&self, id: Uuid) -> AppResult<BookInstanceWithTitle>;

    /// Set the due date, leaving status and borrower alone
    async fn set_due_back(&self, id: Uuid, due_back: NaiveDate) -> AppResult<BookInstance>;

    /// Make the copy available again and forget the loan
    async fn mark_returned(&self, id: Uuid) -> AppResult<BookInstance>;

    /// Replace status, borrower, due date and imprint
    async fn update(&self, id: Uuid, data: &UpdateBookInstance) -> AppResult<BookInstance>;

    async fn delete(&self, id: Uuid) -> AppResult<()>;

    /// On-loan instances ordered by due date, optionally for one borrower
    async fn list_on_loan(
        &self,
        borrower_id: Option<i32>,
        page: PageRequest,
    ) -> AppResult<(Vec<BookInstanceWithTitle>, i64)>;
}

#[derive(Clone)]
pub struct BookInstancesRepository {
    pool: Pool<Postgres>,
}

impl BookInstancesRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// All instances of a book, by due date
    pub async fn list_for_book(&self, book_id: i32) -> AppResult<Vec<BookInstance>> {
        let rows = sqlx::query_as::<_, BookInstance>(
            "SELECT * FROM book_instances WHERE book_id = $1 ORDER BY due_back, id",
        )
        .bind(book_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Register a new physical copy
    pub async fn create(&self, book_id: i32, data: &CreateBookInstance) -> AppResult<BookInstance> {
        sqlx::query_as::<_, BookInstance>(
            r#"
            INSERT INTO book_instances (id, book_id, imprint, due_back, borrower_id, status)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(book_id)
        .bind(&data.imprint)
        .bind(data.due_back)
        .bind(data.borrower_id)
        .bind(data.status.unwrap_or_default())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::from_write(e, "Book instance"))
    }

    pub async fn count(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM book_instances")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    pub async fn count_by_status(&self, status: LoanStatus) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM book_instances WHERE status = $1")
            .bind(status)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

#[async_trait]
impl BookInstanceStore for BookInstancesRepository {
    async fn get_with_title(&self, id: Uuid) -> AppResult<BookInstanceWithTitle> {
        let query = format!("{} WHERE bi.id = $1", SELECT_WITH_TITLE);
        sqlx::query_as::<_, BookInstanceWithTitle>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book instance {} not found", id)))
    }

    async fn set_due_back(&self, id: Uuid, due_back: NaiveDate) -> AppResult<BookInstance> {
        sqlx::query_as::<_, BookInstance>(
            "UPDATE book_instances SET due_back = $1 WHERE id = $2 RETURNING *",
        )
        .bind(due_back)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Book instance {} not found", id)))
    }

    async fn mark_returned(&self, id: Uuid) -> AppResult<BookInstance> {
        sqlx::query_as::<_, BookInstance>(
            r#"
            UPDATE book_instances
            SET status = $1, borrower_id = NULL, due_back = NULL
            WHERE id = $2
            RETURNING *
            "#,
        )
        .bind(LoanStatus::Available)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Book instance {} not found", id)))
    }

    async fn update(&self, id: Uuid, data: &UpdateBookInstance) -> AppResult<BookInstance> {
        sqlx::query_as::<_, BookInstance>(
            r#"
            UPDATE book_instances
            SET imprint = $1, due_back = $2, borrower_id = $3, status = $4
            WHERE id = $5
            RETURNING *
            "#,
        )
        .bind(&data.imprint)
        .bind(data.due_back)
        .bind(data.borrower_id)
        .bind(data.status)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::from_write(e, "Book instance"))?
        .ok_or_else(|| AppError::NotFound(format!("Book instance {} not found", id)))
    }

    async fn delete(&self, id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM book_instances WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::from_delete(e, "book_instances", id))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Book instance {} not found", id)));
        }
        Ok(())
    }

    async fn list_on_loan(
        &self,
        borrower_id: Option<i32>,
        page: PageRequest,
    ) -> AppResult<(Vec<BookInstanceWithTitle>, i64)> {
        // $1 = status, $2 = borrower (NULL means everyone)
        let filter = "bi.status = $1 AND ($2::INTEGER IS NULL OR bi.borrower_id = $2)";

        let total: i64 = sqlx::query_scalar(&format!(
            "SELECT COUNT(*) FROM book_instances bi WHERE {}",
            filter
        ))
        .bind(LoanStatus::OnLoan)
        .bind(borrower_id)
        .fetch_one(&self.pool)
        .await?;

        let query = format!(
            "{} WHERE {} ORDER BY bi.due_back, bi.id LIMIT $3 OFFSET $4",
            SELECT_WITH_TITLE, filter
        );
        let rows = sqlx::query_as::<_, BookInstanceWithTitle>(&query)
            .bind(LoanStatus::OnLoan)
            .bind(borrower_id)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(&self.pool)
            .await?;

        Ok((rows, total))
    }
}
