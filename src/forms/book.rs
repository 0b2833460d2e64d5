//! Book submission form: coercion and validation of untrusted input.
//!
//! Fields are checked in declaration order, then the cross-field date rule
//! runs once both dates parsed. The submission is atomic: either every field
//! coerces and passes, yielding a `BookDraft`, or the whole submission is
//! rejected with the per-field messages.

use std::collections::HashSet;

use axum_extra::extract::Multipart;
use chrono::NaiveDate;

use crate::error::{AppError, AppResult};
use crate::models::book::{
    BookDraft, BookStatus, CoverUpload, FieldErrors, READ_DATE_BEFORE_PUBLISHED,
};

const REQUIRED: &str = "This field is required.";
const WHOLE_NUMBER: &str = "Enter a whole number.";
const VALID_DATE: &str = "Enter a valid date.";

/// Raw book submission as received from a multipart form. Scalar fields are
/// kept untyped; `validate` coerces and checks them.
#[derive(Debug, Clone, Default)]
pub struct BookForm {
    pub title: Option<String>,
    pub pages: Option<String>,
    pub rating: Option<String>,
    pub status: Option<String>,
    pub published_date: Option<String>,
    pub read_date: Option<String>,
    pub authors: Vec<String>,
    pub cover_image: Option<CoverUpload>,
}

impl BookForm {
    /// Collect form fields from a multipart request body. Unknown fields are
    /// ignored; a cover part without filename or content counts as absent.
    pub async fn from_multipart(mut multipart: Multipart) -> AppResult<Self> {
        let mut form = BookForm::default();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| AppError::BadRequest(format!("Malformed multipart body: {}", e)))?
        {
            let Some(name) = field.name().map(str::to_string) else {
                continue;
            };

            if name == "cover_image" {
                let filename = field.file_name().map(str::to_string);
                let content = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::BadRequest(format!("Malformed multipart body: {}", e)))?;
                if let Some(filename) = filename.filter(|f| !f.is_empty()) {
                    if !content.is_empty() {
                        form.cover_image = Some(CoverUpload {
                            filename,
                            content: content.to_vec(),
                        });
                    }
                }
                continue;
            }

            let value = field
                .text()
                .await
                .map_err(|e| AppError::BadRequest(format!("Malformed multipart body: {}", e)))?;

            match name.as_str() {
                "title" => form.title = Some(value),
                "pages" => form.pages = Some(value),
                "rating" => form.rating = Some(value),
                "status" => form.status = Some(value),
                "published_date" => form.published_date = Some(value),
                "read_date" => form.read_date = Some(value),
                "authors" => form.authors.push(value),
                _ => {}
            }
        }

        Ok(form)
    }

    /// Coerce and validate the submission against the set of known author
    /// ids. Returns the typed draft, or every field error that was raised.
    pub fn validate(&self, known_author_ids: &HashSet<i32>) -> Result<BookDraft, FieldErrors> {
        let mut errors = FieldErrors::new();

        let title = self.title.clone().unwrap_or_default();
        if title.is_empty() {
            errors.add("title", "The title is mandatory");
        } else if title.chars().count() > 50 {
            errors.add("title", "The title must be less than 50 characters long");
        }

        let pages = match present(&self.pages) {
            None => {
                errors.add("pages", REQUIRED);
                None
            }
            Some(raw) => match raw.parse::<i32>() {
                Err(_) => {
                    errors.add("pages", WHOLE_NUMBER);
                    None
                }
                Ok(v) if v < 1 => {
                    errors.add("pages", "Ensure this value is greater than or equal to 1");
                    None
                }
                Ok(v) => Some(v),
            },
        };

        let rating = match present(&self.rating) {
            None => None,
            Some(raw) => match raw.parse::<i32>() {
                Err(_) => {
                    errors.add("rating", WHOLE_NUMBER);
                    None
                }
                Ok(v) if v < 1 => {
                    errors.add("rating", "Ensure this value is greater than or equal to 1");
                    None
                }
                Ok(v) if v > 5 => {
                    errors.add("rating", "Ensure this value is less than or equal to 5");
                    None
                }
                Ok(v) => Some(v),
            },
        };

        let status = match present(&self.status) {
            None => {
                errors.add("status", REQUIRED);
                None
            }
            Some(raw) => match raw.parse::<BookStatus>() {
                Ok(s) => Some(s),
                Err(_) => {
                    errors.add(
                        "status",
                        format!("Select a valid choice. {} is not one of the available choices.", raw),
                    );
                    None
                }
            },
        };

        let published_date = parse_date(&mut errors, "published_date", &self.published_date, true);
        let read_date = parse_date(&mut errors, "read_date", &self.read_date, false);

        let mut authors: Vec<i32> = Vec::new();
        for raw in &self.authors {
            let raw = raw.trim();
            if raw.is_empty() {
                continue;
            }
            match raw.parse::<i32>() {
                Ok(id) if known_author_ids.contains(&id) => {
                    if !authors.contains(&id) {
                        authors.push(id);
                    }
                }
                _ => errors.add(
                    "authors",
                    format!("Select a valid choice. {} is not one of the available choices.", raw),
                ),
            }
        }

        // Cross-field rule, only once both dates parsed
        if let (Some(published), Some(read)) = (published_date, read_date) {
            if read < published {
                errors.add("read_date", READ_DATE_BEFORE_PUBLISHED);
            }
        }

        let (Some(pages), Some(status), Some(published_date)) = (pages, status, published_date)
        else {
            return Err(errors);
        };
        errors.into_result()?;

        Ok(BookDraft {
            title,
            pages,
            rating,
            status,
            published_date,
            read_date,
            authors,
            cover_image: self.cover_image.clone(),
        })
    }
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

fn parse_date(
    errors: &mut FieldErrors,
    field: &str,
    value: &Option<String>,
    required: bool,
) -> Option<NaiveDate> {
    match present(value) {
        None => {
            if required {
                errors.add(field, REQUIRED);
            }
            None
        }
        Some(raw) => match NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
            Ok(date) => Some(date),
            Err(_) => {
                errors.add(field, VALID_DATE);
                None
            }
        },
    }
}
