//! Books repository for database operations.
//!
//! Writes are transactional: the book row and its author links land
//! together or not at all.

use sqlx::{Pool, Postgres, Row};

use crate::{
    error::{AppError, AppResult},
    models::{
        author::Author,
        book::{Book, BookDraft, BookRow, BookSummary},
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

    /// Flat list of all books with their author counts
    pub async fn list(&self) -> AppResult<Vec<BookSummary>> {
        let books = sqlx::query_as::<_, BookSummary>(
            r#"
            SELECT b.id, b.title, b.pages, b.rating, b.status, b.published_date,
                   COUNT(ba.author_id) AS nb_authors
            FROM books b
            LEFT JOIN book_authors ba ON ba.book_id = b.id
            GROUP BY b.id
            ORDER BY b.id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(books)
    }

    /// Get a book by id with its authors loaded
    pub async fn get(&self, id: i32) -> AppResult<Book> {
        let row = sqlx::query_as::<_, BookRow>(
            r#"
            SELECT id, title, pages, rating, status, published_date, read_date,
                   cover_image, created_at, updated_at
            FROM books
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))?;

        let mut book = Book::from(row);
        book.authors = self.get_book_authors(id).await?;

        Ok(book)
    }

    /// Load all authors for a book via the book_authors junction table
    async fn get_book_authors(&self, book_id: i32) -> AppResult<Vec<Author>> {
        let rows = sqlx::query(
            r#"
            SELECT a.id, a.name, a.last_name
            FROM book_authors ba
            JOIN authors a ON a.id = ba.author_id
            WHERE ba.book_id = $1
            ORDER BY a.id
            "#,
        )
        .bind(book_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .iter()
            .map(|r| Author {
                id: r.get("id"),
                name: r.get("name"),
                last_name: r.get("last_name"),
            })
            .collect())
    }

    /// Insert a book and its author links in one transaction
    pub async fn create(&self, draft: &BookDraft, cover_path: Option<&str>) -> AppResult<Book> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query(
            r#"
            INSERT INTO books (title, pages, rating, status, published_date, read_date, cover_image)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id
            "#,
        )
        .bind(&draft.title)
        .bind(draft.pages)
        .bind(draft.rating)
        .bind(draft.status.as_code())
        .bind(draft.published_date)
        .bind(draft.read_date)
        .bind(cover_path)
        .fetch_one(&mut *tx)
        .await?;
        let id: i32 = row.get("id");

        for author_id in &draft.authors {
            sqlx::query("INSERT INTO book_authors (book_id, author_id) VALUES ($1, $2)")
                .bind(id)
                .bind(author_id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;

        self.get(id).await
    }

    /// Update a book and replace its author links in one transaction.
    /// An absent cover path keeps the stored cover.
    pub async fn update(
        &self,
        id: i32,
        draft: &BookDraft,
        cover_path: Option<&str>,
    ) -> AppResult<Book> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            UPDATE books
            SET title = $1, pages = $2, rating = $3, status = $4,
                published_date = $5, read_date = $6,
                cover_image = COALESCE($7, cover_image),
                updated_at = now()
            WHERE id = $8
            "#,
        )
        .bind(&draft.title)
        .bind(draft.pages)
        .bind(draft.rating)
        .bind(draft.status.as_code())
        .bind(draft.published_date)
        .bind(draft.read_date)
        .bind(cover_path)
        .bind(id)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Book with id {} not found", id)));
        }

        sqlx::query("DELETE FROM book_authors WHERE book_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        for author_id in &draft.authors {
            sqlx::query("INSERT INTO book_authors (book_id, author_id) VALUES ($1, $2)")
                .bind(id)
                .bind(author_id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;

        self.get(id).await
    }

    /// Delete a book; junction rows cascade, authors survive
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Book with id {} not found", id)));
        }

        Ok(())
    }
}
