//! Catalog browsing and maintenance service

use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::{
        book::{display_genre, Book, BookDetail, BookShort, CreateBook},
        book_instance::{BookInstance, CreateBookInstance, LoanStatus},
        genre::{CreateGenre, Genre},
        language::{CreateLanguage, Language},
        pagination::{PageRequest, PaginatedResponse},
        user::{Permission, UserClaims},
    },
    repository::{AuthorStore, Repository},
};

/// Record counts shown on the landing page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogCounts {
    pub books: i64,
    pub instances: i64,
    pub instances_available: i64,
    pub authors: i64,
}

#[derive(Clone)]
pub struct CatalogService {
    repository: Repository,
}

impl CatalogService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn counts(&self) -> AppResult<CatalogCounts> {
        Ok(CatalogCounts {
            books: self.repository.books.count().await?,
            instances: self.repository.instances.count().await?,
            instances_available: self
                .repository
                .instances
                .count_by_status(LoanStatus::Available)
                .await?,
            authors: self.repository.authors.count().await?,
        })
    }

    pub async fn list_books(&self, page: PageRequest) -> AppResult<PaginatedResponse<BookShort>> {
        let (books, total) = self.repository.books.list(page).await?;
        page.into_response(books, total)
    }

    /// Book with author, genres, language and copies
    pub async fn get_book(&self, id: i32) -> AppResult<BookDetail> {
        let (book, author, language) = self.repository.books.get_with_relations(id).await?;
        let genres = self.repository.genres.list_for_book(id).await?;
        let instances = self.repository.instances.list_for_book(id).await?;

        Ok(BookDetail {
            genre_display: display_genre(&genres),
            book,
            author,
            genres,
            language,
            instances,
        })
    }

    pub async fn create_book(&self, data: CreateBook, actor: &UserClaims) -> AppResult<Book> {
        actor.require(Permission::AddBook)?;
        data.validate()?;

        let book = self.repository.books.create(&data).await?;
        tracing::info!("Book {} created: {} ({})", book.id, book.title, book.isbn);
        Ok(book)
    }

    /// Register a physical copy of a book. New copies start in maintenance
    /// unless a status is given.
    pub async fn create_instance(
        &self,
        book_id: i32,
        data: CreateBookInstance,
        actor: &UserClaims,
    ) -> AppResult<BookInstance> {
        actor.require(Permission::AddBookInstance)?;
        data.validate()?;

        self.repository.books.get_by_id(book_id).await?;
        let instance = self.repository.instances.create(book_id, &data).await?;
        tracing::info!("Book instance {} registered for book {}", instance.id, book_id);
        Ok(instance)
    }

    /// Delete a book. Refused while copies of it exist.
    pub async fn delete_book(&self, id: i32, actor: &UserClaims) -> AppResult<()> {
        actor.require(Permission::DeleteBook)?;

        self.repository.books.delete(id).await?;
        tracing::info!("Book {} deleted by user {}", id, actor.user_id);
        Ok(())
    }

    pub async fn list_genres(&self) -> AppResult<Vec<Genre>> {
        self.repository.genres.list().await
    }

    pub async fn create_genre(&self, data: CreateGenre, actor: &UserClaims) -> AppResult<Genre> {
        actor.require(Permission::AddGenre)?;
        data.validate()?;
        if data.name.trim().is_empty() {
            return Err(AppError::Validation("Genre name must not be blank".to_string()));
        }
        self.repository.genres.create(&data).await
    }

    pub async fn delete_genre(&self, id: i32, actor: &UserClaims) -> AppResult<()> {
        actor.require(Permission::DeleteGenre)?;
        self.repository.genres.delete(id).await
    }

    pub async fn list_languages(&self) -> AppResult<Vec<Language>> {
        self.repository.languages.list().await
    }

    pub async fn create_language(
        &self,
        data: CreateLanguage,
        actor: &UserClaims,
    ) -> AppResult<Language> {
        actor.require(Permission::AddLanguage)?;
        data.validate()?;
        if data.name.trim().is_empty() {
            return Err(AppError::Validation("Language name must not be blank".to_string()));
        }
        self.repository.languages.create(&data).await
    }

    /// Delete a language; books in that language are kept with no language
    pub async fn delete_language(&self, id: i32, actor: &UserClaims) -> AppResult<()> {
        actor.require(Permission::DeleteLanguage)?;
        self.repository.languages.delete(id).await?;
        tracing::info!("Language {} deleted", id);
        Ok(())
    }
}
