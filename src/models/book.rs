//! Book model, status codes and entity-level validation.
//!
//! `Book::validate` / `BookDraft::validate` enforce the catalog invariants at
//! the persistence boundary, independent of the form layer: a book built
//! programmatically is rejected the same way a form submission is.

use chrono::{DateTime, NaiveDate, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use super::author::Author;

/// Message attached to `read_date` when it precedes the publication date
pub const READ_DATE_BEFORE_PUBLISHED: &str = "The read date must be after the published date";

/// Reading status for a book. Persisted as the two-letter code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum BookStatus {
    #[serde(rename = "PE")]
    Pending,
    #[serde(rename = "RE")]
    Reading,
    #[serde(rename = "FI")]
    Finished,
}

impl BookStatus {
    /// Return the persisted code for this status
    pub fn as_code(&self) -> &'static str {
        match self {
            BookStatus::Pending => "PE",
            BookStatus::Reading => "RE",
            BookStatus::Finished => "FI",
        }
    }

    /// Human-readable label for form rendering
    pub fn label(&self) -> &'static str {
        match self {
            BookStatus::Pending => "Pending",
            BookStatus::Reading => "Reading",
            BookStatus::Finished => "Finished",
        }
    }

    /// All status choices in form order
    pub fn choices() -> Vec<StatusChoice> {
        [BookStatus::Pending, BookStatus::Reading, BookStatus::Finished]
            .iter()
            .map(|s| StatusChoice {
                code: s.as_code().to_string(),
                label: s.label().to_string(),
            })
            .collect()
    }
}

impl std::str::FromStr for BookStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PE" => Ok(BookStatus::Pending),
            "RE" => Ok(BookStatus::Reading),
            "FI" => Ok(BookStatus::Finished),
            _ => Err(format!("Invalid status code: {}", s)),
        }
    }
}

impl std::fmt::Display for BookStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_code())
    }
}

/// Status choice entry for form rendering
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StatusChoice {
    pub code: String,
    pub label: String,
}

/// Field-keyed validation errors. Keys keep insertion order so the first
/// failure recorded for a field stays at position 0 of its message list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldErrors(IndexMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a message to a field's error list
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_insert_with(Vec::new)
            .push(message.into());
    }

    /// Messages recorded for a field, in the order they were raised
    pub fn get(&self, field: &str) -> Option<&Vec<String>> {
        self.0.get(field)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Ok when no error was recorded, Err(self) otherwise
    pub fn into_result(self) -> Result<(), FieldErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

/// Internal row structure for book queries (status as the stored code)
#[derive(Debug, Clone, FromRow)]
pub struct BookRow {
    id: i32,
    title: String,
    pages: i32,
    rating: Option<i32>,
    status: String,
    published_date: NaiveDate,
    read_date: Option<NaiveDate>,
    cover_image: Option<String>,
    created_at: Option<DateTime<Utc>>,
    updated_at: Option<DateTime<Utc>>,
}

impl From<BookRow> for Book {
    fn from(row: BookRow) -> Self {
        Book {
            id: row.id,
            title: row.title,
            pages: row.pages,
            rating: row.rating,
            status: row.status.parse().unwrap_or(BookStatus::Pending),
            published_date: row.published_date,
            read_date: row.read_date,
            cover_image: row.cover_image,
            created_at: row.created_at,
            updated_at: row.updated_at,
            authors: Vec::new(),
        }
    }
}

/// Full book model (DB + API)
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Book {
    pub id: i32,
    pub title: String,
    pub pages: i32,
    pub rating: Option<i32>,
    pub status: BookStatus,
    pub published_date: NaiveDate,
    pub read_date: Option<NaiveDate>,
    /// Relative media path below the media root (`covers/...`)
    pub cover_image: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    // Relations (loaded separately)
    #[serde(default)]
    pub authors: Vec<Author>,
}

impl Book {
    /// Check the catalog invariants, returning field-keyed errors.
    pub fn validate(&self) -> Result<(), FieldErrors> {
        check_invariants(
            &self.title,
            self.pages,
            self.rating,
            self.published_date,
            self.read_date,
        )
    }
}

/// Short book representation for the flat list
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct BookSummary {
    pub id: i32,
    pub title: String,
    pub pages: i32,
    pub rating: Option<i32>,
    pub status: String,
    pub published_date: NaiveDate,
    pub nb_authors: i64,
}

/// Uploaded cover file staged for storage
#[derive(Debug, Clone)]
pub struct CoverUpload {
    pub filename: String,
    pub content: Vec<u8>,
}

/// Fully validated book submission, ready to persist
#[derive(Debug, Clone)]
pub struct BookDraft {
    pub title: String,
    pub pages: i32,
    pub rating: Option<i32>,
    pub status: BookStatus,
    pub published_date: NaiveDate,
    pub read_date: Option<NaiveDate>,
    /// Ids of linked authors, deduplicated
    pub authors: Vec<i32>,
    pub cover_image: Option<CoverUpload>,
}

impl BookDraft {
    /// Check the catalog invariants, returning field-keyed errors.
    pub fn validate(&self) -> Result<(), FieldErrors> {
        check_invariants(
            &self.title,
            self.pages,
            self.rating,
            self.published_date,
            self.read_date,
        )
    }
}

fn check_invariants(
    title: &str,
    pages: i32,
    rating: Option<i32>,
    published_date: NaiveDate,
    read_date: Option<NaiveDate>,
) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::new();

    if title.is_empty() {
        errors.add("title", "The title is mandatory");
    } else if title.chars().count() > 50 {
        errors.add("title", "The title must be less than 50 characters long");
    }

    if pages < 1 {
        errors.add("pages", "Ensure this value is greater than or equal to 1");
    }

    if let Some(rating) = rating {
        if rating < 1 {
            errors.add("rating", "Ensure this value is greater than or equal to 1");
        } else if rating > 5 {
            errors.add("rating", "Ensure this value is less than or equal to 5");
        }
    }

    if let Some(read) = read_date {
        if read < published_date {
            errors.add("read_date", READ_DATE_BEFORE_PUBLISHED);
        }
    }

    errors.into_result()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    fn draft() -> BookDraft {
        BookDraft {
            title: "Cien años de soledad".to_string(),
            pages: 100,
            rating: None,
            status: BookStatus::Pending,
            published_date: date(2020, 1, 1),
            read_date: None,
            authors: Vec::new(),
            cover_image: None,
        }
    }

    #[test]
    fn valid_draft_passes() {
        assert!(draft().validate().is_ok());
    }

    #[test]
    fn zero_pages_fails() {
        let mut d = draft();
        d.pages = 0;
        let errors = d.validate().unwrap_err();
        assert!(errors.get("pages").is_some());
    }

    #[test]
    fn one_page_passes() {
        let mut d = draft();
        d.pages = 1;
        assert!(d.validate().is_ok());
    }

    #[test]
    fn rating_out_of_range_fails() {
        for rating in [0, 6, -1] {
            let mut d = draft();
            d.rating = Some(rating);
            assert!(d.validate().is_err(), "rating {} accepted", rating);
        }
    }

    #[test]
    fn rating_in_range_passes() {
        for rating in 1..=5 {
            let mut d = draft();
            d.rating = Some(rating);
            assert!(d.validate().is_ok(), "rating {} rejected", rating);
        }
    }

    #[test]
    fn read_date_before_published_fails_on_read_date() {
        let mut d = draft();
        d.status = BookStatus::Finished;
        d.read_date = Some(date(2019, 12, 31));
        let errors = d.validate().unwrap_err();
        assert_eq!(errors.get("read_date").map(|m| m[0].as_str()), Some(READ_DATE_BEFORE_PUBLISHED));
    }

    #[test]
    fn read_date_on_or_after_published_passes() {
        let mut d = draft();
        d.read_date = Some(date(2020, 1, 1));
        assert!(d.validate().is_ok());

        d.read_date = Some(date(2021, 6, 15));
        assert!(d.validate().is_ok());
    }

    #[test]
    fn empty_title_is_mandatory_error_only() {
        let mut d = draft();
        d.title = String::new();
        let errors = d.validate().unwrap_err();
        let messages = errors.get("title").expect("title errors");
        assert_eq!(messages[0], "The title is mandatory");
        assert_eq!(messages.len(), 1);
    }

    #[test]
    fn overlong_title_fails_with_length_message() {
        let mut d = draft();
        d.title = "A".repeat(51);
        let errors = d.validate().unwrap_err();
        assert_eq!(
            errors.get("title").map(|m| m[0].as_str()),
            Some("The title must be less than 50 characters long")
        );
    }

    #[test]
    fn title_up_to_fifty_chars_passes() {
        let mut d = draft();
        d.title = "A".repeat(50);
        assert!(d.validate().is_ok());
    }

    #[test]
    fn status_codes_round_trip() {
        for status in [BookStatus::Pending, BookStatus::Reading, BookStatus::Finished] {
            assert_eq!(status.as_code().parse::<BookStatus>(), Ok(status));
        }
        assert!("XX".parse::<BookStatus>().is_err());
    }

    #[test]
    fn field_errors_keep_first_message_first() {
        let mut errors = FieldErrors::new();
        errors.add("title", "first");
        errors.add("title", "second");
        assert_eq!(errors.get("title").map(|m| m[0].as_str()), Some("first"));
    }
}
