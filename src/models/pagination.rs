//! Page arithmetic shared by the list endpoints

use serde::Serialize;
use utoipa::ToSchema;

use crate::error::{AppError, AppResult};

/// A requested page, resolved to LIMIT/OFFSET
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: i64,
    pub per_page: i64,
}

impl PageRequest {
    /// Pages are 1-based; a missing page means the first one. A page whose
    /// offset does not fit in an `i64` cannot exist and is not found.
    pub fn new(page: Option<i64>, per_page: i64) -> AppResult<Self> {
        let page = page.unwrap_or(1);
        if page < 1 {
            return Err(AppError::BadRequest(format!("Invalid page number: {}", page)));
        }
        if (page - 1).checked_mul(per_page).is_none() {
            return Err(AppError::NotFound(format!("Page {} not found", page)));
        }
        Ok(Self { page, per_page })
    }

    pub fn limit(&self) -> i64 {
        self.per_page
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.per_page)
    }

    /// Wrap a fetched page. Pages past the end are not found, except the
    /// first page of an empty list.
    pub fn into_response<T>(self, items: Vec<T>, total: i64) -> AppResult<PaginatedResponse<T>>
    where
        T: for<'a> ToSchema<'a>,
    {
        let num_pages = num_pages(total, self.per_page);
        if self.page > num_pages.max(1) {
            return Err(AppError::NotFound(format!(
                "Page {} not found ({} pages)",
                self.page, num_pages
            )));
        }

        Ok(PaginatedResponse {
            items,
            total,
            page: self.page,
            per_page: self.per_page,
            num_pages,
        })
    }
}

pub fn num_pages(total: i64, per_page: i64) -> i64 {
    if per_page <= 0 {
        return 0;
    }
    (total + per_page - 1) / per_page
}

/// Paginated response wrapper
#[derive(Debug, Serialize, ToSchema)]
pub struct PaginatedResponse<T>
where
    T: for<'a> ToSchema<'a>,
{
    /// Items on this page
    pub items: Vec<T>,
    /// Total number of items
    pub total: i64,
    /// Current page number
    pub page: i64,
    /// Items per page
    pub per_page: i64,
    /// Number of pages
    pub num_pages: i64,
}
