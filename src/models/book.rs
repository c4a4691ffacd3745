//! Book model and related types

use std::borrow::Cow;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::Deserialize;
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::{Validate, ValidationError};

use super::user::Reader;
use crate::error::{AppError, AppResult};

/// Maximum digits before the decimal point for a price (NUMERIC(7, 2))
const PRICE_INTEGER_DIGITS: u32 = 5;
const PRICE_DECIMAL_PLACES: u32 = 2;

/// Book row as stored, with the owner's username joined in
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct BookRow {
    pub id: i32,
    pub name: String,
    pub price: Decimal,
    pub author_name: String,
    pub discount: i32,
    pub owner_id: Option<i32>,
    pub owner_username: Option<String>,
}

/// Book row with its query-time aggregates attached
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotatedBook {
    pub book: BookRow,
    /// Mean of non-null rates, unrounded
    pub rating: Option<Decimal>,
    /// Price after the percentage discount, unrounded
    pub discount_value: Decimal,
    pub likes_count: i64,
    pub readers: Vec<Reader>,
}

/// Fields a client may order the book list by
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderField {
    Id,
    Price,
    AuthorName,
}

impl OrderField {
    pub fn column(&self) -> &'static str {
        match self {
            OrderField::Id => "b.id",
            OrderField::Price => "b.price",
            OrderField::AuthorName => "b.author_name",
        }
    }
}

impl FromStr for OrderField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "id" => Ok(OrderField::Id),
            "price" => Ok(OrderField::Price),
            "author_name" => Ok(OrderField::AuthorName),
            _ => Err(format!("Invalid ordering field: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ordering {
    pub field: OrderField,
    pub descending: bool,
}

impl Ordering {
    /// Parse a comma-separated `ordering` parameter such as `-price,author_name`.
    /// Unknown field names are skipped.
    pub fn parse_list(param: &str) -> Vec<Ordering> {
        param
            .split(',')
            .map(str::trim)
            .filter(|term| !term.is_empty())
            .filter_map(|term| {
                let (descending, name) = match term.strip_prefix('-') {
                    Some(name) => (true, name),
                    None => (false, term),
                };
                match name.parse::<OrderField>() {
                    Ok(field) => Some(Ordering { field, descending }),
                    Err(e) => {
                        tracing::debug!("Ignoring ordering term: {}", e);
                        None
                    }
                }
            })
            .collect()
    }
}

/// Book list query parameters
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct BookQuery {
    /// Exact price match
    pub price: Option<String>,
    /// Case-insensitive substring of name or author_name
    pub search: Option<String>,
    /// Comma-separated fields among `id`, `price`, `author_name`; prefix with `-` for descending
    pub ordering: Option<String>,
}

/// Validated list criteria handed to the store
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BookFilter {
    pub price: Option<Decimal>,
    pub search: Option<String>,
    pub ordering: Vec<Ordering>,
}

impl TryFrom<BookQuery> for BookFilter {
    type Error = AppError;

    fn try_from(query: BookQuery) -> AppResult<Self> {
        let price = match query.price.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => Some(
                Decimal::from_str(raw)
                    .map_err(|_| AppError::invalid_field("price", "Enter a number."))?,
            ),
        };

        let search = query
            .search
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        let ordering = query
            .ordering
            .as_deref()
            .map(Ordering::parse_list)
            .unwrap_or_default();

        Ok(BookFilter {
            price,
            search,
            ordering,
        })
    }
}

/// Create/replace book request
#[derive(Debug, Clone, PartialEq, Deserialize, Validate, ToSchema)]
pub struct BookPayload {
    #[validate(
        length(max = 255, message = "Ensure this field has no more than 255 characters."),
        custom(function = "not_blank")
    )]
    pub name: String,
    #[schema(value_type = String, example = "25.00")]
    #[validate(custom(function = "validate_price"))]
    pub price: Decimal,
    #[validate(
        length(max = 255, message = "Ensure this field has no more than 255 characters."),
        custom(function = "not_blank")
    )]
    pub author_name: String,
    /// Percentage discount, 0 to 100; left unchanged on update when omitted
    #[validate(range(min = 0, max = 100, message = "Ensure this value is between 0 and 100."))]
    pub discount: Option<i32>,
}

fn error_with_message(code: &'static str, message: &'static str) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(Cow::Borrowed(message));
    error
}

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(error_with_message("blank", "This field may not be blank."));
    }
    Ok(())
}

fn validate_price(price: &Decimal) -> Result<(), ValidationError> {
    if price.is_sign_negative() && !price.is_zero() {
        return Err(error_with_message(
            "min_value",
            "Ensure this value is greater than or equal to 0.",
        ));
    }
    let normalized = price.normalize();
    if normalized.scale() > PRICE_DECIMAL_PLACES {
        return Err(error_with_message(
            "max_decimal_places",
            "Ensure that there are no more than 2 decimal places.",
        ));
    }
    let integer_digits = normalized
        .abs()
        .trunc()
        .normalize()
        .to_string()
        .trim_start_matches('0')
        .len();
    if integer_digits as u32 > PRICE_INTEGER_DIGITS {
        return Err(error_with_message(
            "max_whole_digits",
            "Ensure that there are no more than 5 digits before the decimal point.",
        ));
    }
    Ok(())
}
