//! Loan management service

use std::sync::Arc;

use chrono::NaiveDate;
use uuid::Uuid;
use validator::Validate;

use crate::{
    error::AppResult,
    models::{
        book_instance::{BookInstance, BookInstanceWithTitle, RenewalForm, UpdateBookInstance},
        pagination::{PageRequest, PaginatedResponse},
        user::{Permission, UserClaims},
    },
    repository::BookInstanceStore,
};

use super::renewal;

#[derive(Clone)]
pub struct LoansService {
    instances: Arc<dyn BookInstanceStore>,
}

impl LoansService {
    pub fn new(instances: Arc<dyn BookInstanceStore>) -> Self {
        Self { instances }
    }

    /// Copies the actor currently has on loan, soonest due first
    pub async fn my_loans(
        &self,
        actor: &UserClaims,
        page: PageRequest,
        today: NaiveDate,
    ) -> AppResult<PaginatedResponse<BookInstanceWithTitle>> {
        let (rows, total) = self.instances.list_on_loan(Some(actor.user_id), page).await?;
        let rows = rows.into_iter().map(|r| r.with_overdue(today)).collect();
        page.into_response(rows, total)
    }

    /// Every copy on loan (librarian view)
    pub async fn all_loans(
        &self,
        actor: &UserClaims,
        page: PageRequest,
        today: NaiveDate,
    ) -> AppResult<PaginatedResponse<BookInstanceWithTitle>> {
        actor.require(Permission::CanMarkReturned)?;

        let (rows, total) = self.instances.list_on_loan(None, page).await?;
        let rows = rows.into_iter().map(|r| r.with_overdue(today)).collect();
        page.into_response(rows, total)
    }

    /// Renewal form with the default proposal
    pub async fn renewal_form(
        &self,
        id: Uuid,
        actor: &UserClaims,
        today: NaiveDate,
    ) -> AppResult<RenewalForm> {
        actor.require(Permission::CanMarkReturned)?;

        let book_instance = self.instances.get_with_title(id).await?.with_overdue(today);

        Ok(RenewalForm {
            book_instance,
            proposed_renewal_date: renewal::proposed_renewal_date(today),
            min_date: today,
            max_date: renewal::latest_renewal_date(today),
        })
    }

    /// Move the due date of a copy. Status and borrower are not touched.
    pub async fn renew(
        &self,
        id: Uuid,
        proposed: NaiveDate,
        actor: &UserClaims,
        today: NaiveDate,
    ) -> AppResult<BookInstance> {
        actor.require(Permission::CanMarkReturned)?;

        let instance = self.instances.get_with_title(id).await?;
        let due_back = renewal::validate_renewal_date(proposed, today)?;

        let renewed = self.instances.set_due_back(instance.id, due_back).await?;

        tracing::info!(
            "Renewed {} until {} (by user {})",
            instance,
            due_back,
            actor.user_id
        );

        Ok(renewed)
    }

    /// Set any status, borrower and due date on a copy (lending it out,
    /// reserving it, sending it to maintenance)
    pub async fn update_instance(
        &self,
        id: Uuid,
        data: UpdateBookInstance,
        actor: &UserClaims,
    ) -> AppResult<BookInstance> {
        actor.require(Permission::ChangeBookInstance)?;
        data.validate()?;

        let updated = self.instances.update(id, &data).await?;
        tracing::info!(
            "Book instance {} set to {} (borrower {:?}, due {:?}) by user {}",
            id,
            updated.status,
            updated.borrower_id,
            updated.due_back,
            actor.user_id
        );
        Ok(updated)
    }

    pub async fn delete_instance(&self, id: Uuid, actor: &UserClaims) -> AppResult<()> {
        actor.require(Permission::DeleteBookInstance)?;

        self.instances.delete(id).await?;
        tracing::info!("Book instance {} deleted by user {}", id, actor.user_id);
        Ok(())
    }

    /// Mark a copy as returned
    pub async fn mark_returned(&self, id: Uuid, actor: &UserClaims) -> AppResult<BookInstance> {
        actor.require(Permission::CanMarkReturned)?;

        let returned = self.instances.mark_returned(id).await?;
        tracing::info!("Book instance {} returned (by user {})", id, actor.user_id);
        Ok(returned)
    }
}
