//! Response representation of annotated books

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::{AnnotatedBook, Reader};

/// Render a decimal with exactly two fraction digits, rounding half away from zero
pub fn format_decimal(value: Decimal) -> String {
    let mut rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(2);
    rounded.to_string()
}

/// Book as returned by the API. Field order is part of the response contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct BookView {
    pub id: i32,
    pub name: String,
    #[schema(example = "25.00")]
    pub price: String,
    pub author_name: String,
    pub discount: i32,
    /// Average rate, null when nobody rated the book
    #[schema(example = "4.67")]
    pub rating: Option<String>,
    #[schema(example = "25.00")]
    pub discount_value: String,
    /// Owner's username, empty for unowned books
    pub owner_name: String,
    pub readers: Vec<Reader>,
}

impl From<AnnotatedBook> for BookView {
    fn from(annotated: AnnotatedBook) -> Self {
        let AnnotatedBook {
            book,
            rating,
            discount_value,
            readers,
            ..
        } = annotated;

        Self {
            id: book.id,
            name: book.name,
            price: format_decimal(book.price),
            author_name: book.author_name,
            discount: book.discount,
            rating: rating.map(format_decimal),
            discount_value: format_decimal(discount_value),
            owner_name: book.owner_username.unwrap_or_default(),
            readers,
        }
    }
}
