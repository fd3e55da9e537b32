//! Author management service

use std::sync::Arc;

use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::{
        author::{
            Author, AuthorDeleteConfirmation, AuthorDeletion, AuthorWithBooks, CreateAuthor,
            UpdateAuthor,
        },
        pagination::{PageRequest, PaginatedResponse},
        user::{Permission, UserClaims},
    },
    repository::AuthorStore,
};

#[derive(Clone)]
pub struct AuthorsService {
    authors: Arc<dyn AuthorStore>,
}

impl AuthorsService {
    pub fn new(authors: Arc<dyn AuthorStore>) -> Self {
        Self { authors }
    }

    pub async fn list(&self, page: PageRequest) -> AppResult<PaginatedResponse<AuthorWithBooks>> {
        let (authors, total) = self.authors.list_with_books(page).await?;
        page.into_response(authors, total)
    }

    pub async fn get(&self, id: i32) -> AppResult<AuthorWithBooks> {
        self.authors.get_with_books(id).await
    }

    pub async fn create(&self, data: CreateAuthor, actor: &UserClaims) -> AppResult<Author> {
        actor.require(Permission::AddAuthor)?;
        data.validate()?;

        let author = self.authors.create(&data).await?;
        tracing::info!("Author {} created: {}", author.id, author);
        Ok(author)
    }

    pub async fn update(
        &self,
        id: i32,
        data: UpdateAuthor,
        actor: &UserClaims,
    ) -> AppResult<Author> {
        actor.require(Permission::ChangeAuthor)?;
        data.validate()?;

        self.authors.update(id, &data).await
    }

    /// What the delete confirmation shows
    pub async fn delete_confirmation(
        &self,
        id: i32,
        actor: &UserClaims,
    ) -> AppResult<AuthorDeleteConfirmation> {
        actor.require(Permission::DeleteAuthor)?;

        let author = self.authors.get(id).await?;
        let book_count = self.authors.count_books(id).await?;
        Ok(AuthorDeleteConfirmation::new(author, book_count))
    }

    /// Delete an author.
    ///
    /// A refusal caused by books still referencing the author is returned as
    /// `AuthorDeletion::Blocked` so the caller can show the confirmation
    /// again. Other failures propagate.
    pub async fn delete(&self, id: i32, actor: &UserClaims) -> AppResult<AuthorDeletion> {
        actor.require(Permission::DeleteAuthor)?;

        let author = self.authors.get(id).await?;

        match self.authors.delete(id).await {
            Ok(()) => {
                tracing::info!("Author {} deleted: {}", id, author);
                Ok(AuthorDeletion::Deleted)
            }
            Err(AppError::ReferentialConflict(reason)) => {
                tracing::warn!("Author {} not deleted: {}", id, reason);
                let book_count = self.authors.count_books(id).await?;
                Ok(AuthorDeletion::Blocked(AuthorDeleteConfirmation::new(
                    author, book_count,
                )))
            }
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::authors::MockAuthorStore;
    use chrono::Utc;
    use mockall::predicate::eq;

    fn claims(permissions: &[Permission]) -> UserClaims {
        let now = Utc::now().timestamp();
        UserClaims {
            sub: "librarian".to_string(),
            user_id: 1,
            permissions: permissions.iter().map(|p| p.codename().to_string()).collect(),
            exp: now + 3600,
            iat: now,
        }
    }

    fn author(id: i32) -> Author {
        Author {
            id,
            first_name: "Isaac".to_string(),
            last_name: "Asimov".to_string(),
            date_of_birth: None,
            date_of_death: None,
        }
    }

    fn service(store: MockAuthorStore) -> AuthorsService {
        AuthorsService::new(Arc::new(store))
    }

    #[tokio::test]
    async fn test_delete_referenced_author_asks_again() {
        let mut store = MockAuthorStore::new();
        store.expect_get().with(eq(4)).returning(|id| Ok(author(id)));
        store.expect_delete().with(eq(4)).times(1).returning(|_| {
            Err(AppError::ReferentialConflict(
                "authors 4 is still referenced by books".to_string(),
            ))
        });
        store.expect_count_books().with(eq(4)).returning(|_| Ok(2));

        let outcome = service(store)
            .delete(4, &claims(&[Permission::DeleteAuthor]))
            .await
            .unwrap();

        match outcome {
            AuthorDeletion::Blocked(confirmation) => {
                assert_eq!(confirmation.author, author(4));
                assert_eq!(confirmation.book_count, 2);
                assert_eq!(confirmation.confirm_path, "/api/v1/authors/4");
            }
            AuthorDeletion::Deleted => panic!("referenced author must not be deleted"),
        }
    }

    #[tokio::test]
    async fn test_delete_unreferenced_author() {
        let mut store = MockAuthorStore::new();
        store.expect_get().returning(|id| Ok(author(id)));
        store.expect_delete().times(1).returning(|_| Ok(()));
        store.expect_count_books().never();

        let outcome = service(store)
            .delete(9, &claims(&[Permission::DeleteAuthor]))
            .await
            .unwrap();
        assert_eq!(outcome, AuthorDeletion::Deleted);
    }

    #[tokio::test]
    async fn test_delete_propagates_other_failures() {
        let mut store = MockAuthorStore::new();
        store.expect_get().returning(|id| Ok(author(id)));
        store
            .expect_delete()
            .returning(|_| Err(AppError::Database(sqlx::Error::PoolTimedOut)));

        let result = service(store)
            .delete(9, &claims(&[Permission::DeleteAuthor]))
            .await;
        assert!(matches!(result, Err(AppError::Database(_))));
    }

    #[tokio::test]
    async fn test_delete_requires_permission() {
        let mut store = MockAuthorStore::new();
        store.expect_get().never();
        store.expect_delete().never();

        let result = service(store)
            .delete(9, &claims(&[Permission::ChangeAuthor]))
            .await;
        assert!(matches!(result, Err(AppError::Authorization(_))));
    }

    #[tokio::test]
    async fn test_create_validates_before_storing() {
        let mut store = MockAuthorStore::new();
        store.expect_create().never();

        let data = CreateAuthor {
            first_name: String::new(),
            last_name: "Asimov".to_string(),
            date_of_birth: None,
            date_of_death: None,
        };
        let result = service(store)
            .create(data, &claims(&[Permission::AddAuthor]))
            .await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_update_clears_date_of_death() {
        let mut store = MockAuthorStore::new();
        store
            .expect_update()
            .withf(|id, data| *id == 4 && data.date_of_death.is_none())
            .times(1)
            .returning(|id, data| {
                Ok(Author {
                    id,
                    first_name: data.first_name.clone(),
                    last_name: data.last_name.clone(),
                    date_of_birth: data.date_of_birth,
                    date_of_death: data.date_of_death,
                })
            });

        let data = UpdateAuthor {
            first_name: "Isaac".to_string(),
            last_name: "Asimov".to_string(),
            date_of_birth: chrono::NaiveDate::from_ymd_opt(1920, 1, 2),
            date_of_death: None,
        };
        let updated = service(store)
            .update(4, data, &claims(&[Permission::ChangeAuthor]))
            .await
            .unwrap();
        assert_eq!(updated.date_of_death, None);
    }
}
