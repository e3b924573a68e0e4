//! Book model

use std::{fmt, str::FromStr};

use bson::oid::ObjectId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::error::{AppError, AppResult};

pub const DEFAULT_PAGE: u64 = 1;
pub const DEFAULT_LIMIT: u64 = 20;
pub const MAX_LIMIT: u64 = 100;

/// Store-assigned book identifier (24 hexadecimal characters)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BookId(ObjectId);

impl BookId {
    /// Generate a fresh identifier
    pub fn new() -> Self {
        Self(ObjectId::new())
    }

    pub fn object_id(&self) -> ObjectId {
        self.0
    }
}

impl Default for BookId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<ObjectId> for BookId {
    fn from(oid: ObjectId) -> Self {
        Self(oid)
    }
}

impl FromStr for BookId {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ObjectId::parse_str(s)
            .map(Self)
            .map_err(|_| AppError::Validation("ID inválido".to_string()))
    }
}

impl fmt::Display for BookId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.to_hex())
    }
}

/// Book record as returned by the API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Book {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "titulo")]
    pub title: String,
    #[serde(rename = "autor")]
    pub author: String,
    #[serde(rename = "editora")]
    pub publisher: String,
    /// Publication year
    #[serde(rename = "ano")]
    pub year: i32,
    #[serde(rename = "preco")]
    pub price: f64,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}

/// Create book request. Every field is required; `null` counts as absent.
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct CreateBook {
    #[serde(rename = "titulo")]
    #[validate(
        required(message = "O campo 'titulo' é obrigatório"),
        length(min = 1, message = "O campo 'titulo' é obrigatório")
    )]
    pub title: Option<String>,
    #[serde(rename = "autor")]
    #[validate(
        required(message = "O campo 'autor' é obrigatório"),
        length(min = 1, message = "O campo 'autor' é obrigatório")
    )]
    pub author: Option<String>,
    #[serde(rename = "editora")]
    #[validate(
        required(message = "O campo 'editora' é obrigatório"),
        length(min = 1, message = "O campo 'editora' é obrigatório")
    )]
    pub publisher: Option<String>,
    #[serde(rename = "ano")]
    #[validate(required(message = "O campo 'ano' é obrigatório"))]
    pub year: Option<i32>,
    #[serde(rename = "preco")]
    #[validate(required(message = "O campo 'preco' é obrigatório"))]
    pub price: Option<f64>,
}

/// A book that passed validation and is ready to be inserted
#[derive(Debug, Clone, PartialEq)]
pub struct NewBook {
    pub title: String,
    pub author: String,
    pub publisher: String,
    pub year: i32,
    pub price: f64,
}

impl CreateBook {
    /// Check required fields and produce the record to insert
    pub fn into_new_book(self) -> AppResult<NewBook> {
        if let Err(errors) = self.validate() {
            let mut messages: Vec<String> = errors
                .field_errors()
                .values()
                .filter_map(|errs| errs.first())
                .filter_map(|err| err.message.as_ref().map(|m| m.to_string()))
                .collect();
            messages.sort();
            messages.dedup();
            return Err(AppError::Validation(messages.join("; ")));
        }

        match (self.title, self.author, self.publisher, self.year, self.price) {
            (Some(title), Some(author), Some(publisher), Some(year), Some(price)) => Ok(NewBook {
                title,
                author,
                publisher,
                year,
                price,
            }),
            _ => Err(AppError::Validation("Campos obrigatórios ausentes".to_string())),
        }
    }
}

/// Update book request.
///
/// Each field is tri-state: absent (left untouched), `null` (rejected), or a value.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateBook {
    #[serde(rename = "titulo", default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<String>)]
    pub title: Option<Option<String>>,
    #[serde(rename = "autor", default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<String>)]
    pub author: Option<Option<String>>,
    #[serde(rename = "editora", default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<String>)]
    pub publisher: Option<Option<String>>,
    #[serde(rename = "ano", default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<i32>)]
    pub year: Option<Option<i32>>,
    #[serde(rename = "preco", default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<f64>)]
    pub price: Option<Option<f64>>,
}

/// Validated set of field changes for an update
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BookChanges {
    pub title: Option<String>,
    pub author: Option<String>,
    pub publisher: Option<String>,
    pub year: Option<i32>,
    pub price: Option<f64>,
}

impl UpdateBook {
    /// True when none of the book fields were supplied
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.author.is_none()
            && self.publisher.is_none()
            && self.year.is_none()
            && self.price.is_none()
    }

    /// Reject empty patches and patches that would leave a required field unset
    pub fn into_changes(self) -> AppResult<BookChanges> {
        if self.is_empty() {
            return Err(AppError::Validation(
                "Nenhum campo informado para atualização".to_string(),
            ));
        }

        let mut messages = Vec::new();
        let changes = BookChanges {
            title: supplied_text(self.title, "titulo", &mut messages),
            author: supplied_text(self.author, "autor", &mut messages),
            publisher: supplied_text(self.publisher, "editora", &mut messages),
            year: supplied(self.year, "ano", &mut messages),
            price: supplied(self.price, "preco", &mut messages),
        };

        if messages.is_empty() {
            Ok(changes)
        } else {
            messages.sort();
            Err(AppError::Validation(messages.join("; ")))
        }
    }
}

impl BookChanges {
    /// Overwrite the fields of `book` that this change set carries
    pub fn apply_to(&self, book: &mut Book) {
        if let Some(title) = &self.title {
            book.title = title.clone();
        }
        if let Some(author) = &self.author {
            book.author = author.clone();
        }
        if let Some(publisher) = &self.publisher {
            book.publisher = publisher.clone();
        }
        if let Some(year) = self.year {
            book.year = year;
        }
        if let Some(price) = self.price {
            book.price = price;
        }
    }
}

fn required_message(field: &str) -> String {
    format!("O campo '{}' é obrigatório", field)
}

fn supplied<T>(value: Option<Option<T>>, field: &str, messages: &mut Vec<String>) -> Option<T> {
    match value {
        None => None,
        Some(None) => {
            messages.push(required_message(field));
            None
        }
        Some(Some(v)) => Some(v),
    }
}

fn supplied_text(
    value: Option<Option<String>>,
    field: &str,
    messages: &mut Vec<String>,
) -> Option<String> {
    match supplied(value, field, messages) {
        Some(text) if text.is_empty() => {
            messages.push(required_message(field));
            None
        }
        other => other,
    }
}

/// Raw pagination query parameters. Values that are not integers fall back to defaults.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PageQuery {
    /// Page number (default: 1)
    pub page: Option<String>,
    /// Items per page (default: 20, max: 100)
    pub limit: Option<String>,
}

/// Clamped pagination window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: u64,
    pub limit: u64,
}

impl Pagination {
    /// Number of records to skip; capped at `i64::MAX`, the largest skip the store accepts
    pub fn offset(&self) -> u64 {
        self.page
            .saturating_sub(1)
            .saturating_mul(self.limit)
            .min(i64::MAX as u64)
    }
}

impl From<&PageQuery> for Pagination {
    fn from(query: &PageQuery) -> Self {
        let page = parse_param(query.page.as_deref()).unwrap_or(DEFAULT_PAGE as i64);
        let limit = parse_param(query.limit.as_deref()).unwrap_or(DEFAULT_LIMIT as i64);

        Self {
            page: page.max(1) as u64,
            limit: limit.clamp(1, MAX_LIMIT as i64) as u64,
        }
    }
}

fn parse_param(raw: Option<&str>) -> Option<i64> {
    raw.and_then(|value| value.trim().parse::<i64>().ok())
}

/// One page of the book list
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct BookPage {
    pub page: u64,
    pub limit: u64,
    /// Number of books in the whole collection
    pub total: u64,
    pub items: Vec<Book>,
}

/// Delete response: the removed record in its last known state
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DeletedBook {
    pub message: String,
    pub book: Book,
}
