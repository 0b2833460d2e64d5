//! Catalog management service
//!
//! Entity invariants are re-checked here on every write, so books built
//! without the form layer are still rejected before persistence.

use std::collections::HashSet;

use crate::{
    error::{AppError, AppResult},
    models::{
        author::{Author, CreateAuthor},
        book::{Book, BookDraft, BookSummary},
    },
    repository::Repository,
    services::media::MediaStore,
};

#[derive(Clone)]
pub struct CatalogService {
    repository: Repository,
    media: MediaStore,
}

impl CatalogService {
    pub fn new(repository: Repository, media: MediaStore) -> Self {
        Self { repository, media }
    }

    /// Flat list of all books
    pub async fn list_books(&self) -> AppResult<Vec<BookSummary>> {
        self.repository.books.list().await
    }

    /// Get a book with its authors
    pub async fn get_book(&self, id: i32) -> AppResult<Book> {
        self.repository.books.get(id).await
    }

    /// Validate and persist a new book; the cover is staged first so the
    /// stored path lands in the same transactional write.
    pub async fn create_book(&self, draft: BookDraft) -> AppResult<Book> {
        draft.validate().map_err(AppError::FieldValidation)?;

        let cover_path = self.stage_cover(&draft).await?;
        let book = self
            .repository
            .books
            .create(&draft, cover_path.as_deref())
            .await?;

        tracing::info!("Created book id={} title={:?}", book.id, book.title);
        Ok(book)
    }

    /// Validate and persist changes to an existing book. Without a new
    /// upload the stored cover is kept.
    pub async fn update_book(&self, id: i32, draft: BookDraft) -> AppResult<Book> {
        draft.validate().map_err(AppError::FieldValidation)?;

        let cover_path = self.stage_cover(&draft).await?;
        let book = self
            .repository
            .books
            .update(id, &draft, cover_path.as_deref())
            .await?;

        tracing::info!("Updated book id={}", book.id);
        Ok(book)
    }

    pub async fn delete_book(&self, id: i32) -> AppResult<()> {
        self.repository.books.delete(id).await?;
        tracing::info!("Deleted book id={}", id);
        Ok(())
    }

    async fn stage_cover(&self, draft: &BookDraft) -> AppResult<Option<String>> {
        match &draft.cover_image {
            Some(upload) => Ok(Some(self.media.save_cover(upload).await?)),
            None => Ok(None),
        }
    }

    pub async fn list_authors(&self) -> AppResult<Vec<Author>> {
        self.repository.authors.list().await
    }

    /// Known author ids, for validating form selections
    pub async fn author_ids(&self) -> AppResult<HashSet<i32>> {
        self.repository.authors.ids().await
    }

    pub async fn create_author(&self, author: &CreateAuthor) -> AppResult<Author> {
        let created = self.repository.authors.create(author).await?;
        tracing::info!("Created author id={}", created.id);
        Ok(created)
    }

    pub async fn delete_author(&self, id: i32) -> AppResult<()> {
        self.repository.authors.delete(id).await?;
        tracing::info!("Deleted author id={}", id);
        Ok(())
    }
}
