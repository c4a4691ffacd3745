//! Query-time aggregates for books: rating, discount value, likes and readers

use std::collections::HashMap;

use rust_decimal::Decimal;

use crate::models::{AnnotatedBook, BookRow, Reader, ReaderRelation};

/// Price after applying a percentage discount
pub fn discount_value(price: Decimal, discount: i32) -> Decimal {
    price - price / Decimal::ONE_HUNDRED * Decimal::from(discount)
}

/// Mean of the non-null rates, `None` when nobody rated
pub fn average_rate<'a>(rates: impl IntoIterator<Item = &'a Option<i16>>) -> Option<Decimal> {
    let (sum, count) = rates
        .into_iter()
        .flatten()
        .fold((0i64, 0i64), |(sum, count), rate| (sum + i64::from(*rate), count + 1));
    if count == 0 {
        None
    } else {
        Some(Decimal::from(sum) / Decimal::from(count))
    }
}

/// Attach aggregates to each book, keeping the order of `books`.
///
/// `relations` may cover any superset of the books; relations of books not in
/// `books` are ignored. Readers keep the order of `relations`.
pub fn annotate(books: Vec<BookRow>, relations: Vec<ReaderRelation>) -> Vec<AnnotatedBook> {
    let mut by_book: HashMap<i32, Vec<ReaderRelation>> = HashMap::new();
    for relation in relations {
        by_book.entry(relation.book_id).or_default().push(relation);
    }

    books
        .into_iter()
        .map(|book| {
            let relations = by_book.remove(&book.id).unwrap_or_default();
            let likes_count = relations.iter().filter(|r| r.like).count() as i64;
            let rating = average_rate(relations.iter().map(|r| &r.rate));
            let readers = relations
                .into_iter()
                .map(|r| Reader {
                    first_name: r.first_name,
                    last_name: r.last_name,
                })
                .collect();

            AnnotatedBook {
                discount_value: discount_value(book.price, book.discount),
                book,
                rating,
                likes_count,
                readers,
            }
        })
        .collect()
}
