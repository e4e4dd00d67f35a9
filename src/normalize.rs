// 🧹 Record Normalizer - raw catalog rows → canonical books
//
// Three stages, always in this order:
//   1. trim_whitespace  (text cells only)
//   2. fill_missing     (defaults for absent values)
//   3. fix_formats      (price / rating / stock coercion)
//
// No stage ever drops a record. A field that cannot be parsed falls back to
// its default and a warning is logged.

use crate::catalog::{Book, RawBook, RawValue};
use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

/// First parenthesized integer, e.g. "In stock (22 available)" → 22.
static STOCK_COUNT: Lazy<Regex> = Lazy::new(|| Regex::new(r"\((\d+)").expect("valid regex"));

/// Word ratings as scraped from the catalog ("One" .. "Five").
const RATING_WORDS: [(&str, u8); 5] = [
    ("one", 1),
    ("two", 2),
    ("three", 3),
    ("four", 4),
    ("five", 5),
];

pub const MAX_RATING: u8 = 5;

// ============================================================================
// FIELD ERRORS
// ============================================================================

/// Why a field fell back to its default.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FieldError {
    #[error("price '{0}' is not a number")]
    InvalidPrice(String),

    #[error("price {0} is not a finite non-negative amount")]
    PriceOutOfRange(f64),

    #[error("rating '{0}' is not a known rating")]
    UnknownRating(String),

    #[error("rating {0} is outside 0-5")]
    RatingOutOfRange(i64),

    #[error("stock '{0}' is not a count")]
    InvalidStock(String),

    #[error("stock {0} is negative or too large")]
    StockOutOfRange(i64),

    #[error("{field} has unsupported {kind} value")]
    UnsupportedType {
        field: &'static str,
        kind: &'static str,
    },
}

// ============================================================================
// PARSE OUTCOME
// ============================================================================

/// Result of coercing one field. Never a failure: at worst the default.
#[derive(Debug, Clone, PartialEq)]
pub enum ParseOutcome<T> {
    Parsed(T),
    Defaulted { value: T, reason: FieldError },
}

impl<T> ParseOutcome<T> {
    fn defaulted(value: T, reason: FieldError) -> Self {
        ParseOutcome::Defaulted { value, reason }
    }

    pub fn is_defaulted(&self) -> bool {
        matches!(self, ParseOutcome::Defaulted { .. })
    }

    pub fn reason(&self) -> Option<&FieldError> {
        match self {
            ParseOutcome::Parsed(_) => None,
            ParseOutcome::Defaulted { reason, .. } => Some(reason),
        }
    }

    /// Collapse to the plain value, logging the fallback if there was one.
    pub fn into_value(self, field: &'static str, index: usize) -> T {
        match self {
            ParseOutcome::Parsed(value) => value,
            ParseOutcome::Defaulted { value, reason } => {
                tracing::warn!(record = index, field, %reason, "field reset to default");
                value
            }
        }
    }
}

// ============================================================================
// STAGE 1: WHITESPACE
// ============================================================================

/// Strip leading/trailing whitespace from every text cell.
pub fn trim_whitespace(mut books: Vec<RawBook>) -> Vec<RawBook> {
    for book in &mut books {
        for value in book.fields_mut() {
            if let RawValue::Text(s) = value {
                let trimmed = s.trim();
                if trimmed.len() != s.len() {
                    *s = trimmed.to_string();
                }
            }
        }
    }
    books
}

// ============================================================================
// STAGE 2: MISSING VALUES
// ============================================================================

fn is_falsy(value: &RawValue) -> bool {
    match value {
        RawValue::Missing => true,
        RawValue::Int(i) => *i == 0,
        RawValue::Float(f) => *f == 0.0,
        RawValue::Text(s) => s.is_empty(),
    }
}

/// Fill absent fields with their defaults.
///
/// An empty price string is left alone here: it is not missing, it is
/// malformed, and fix_formats reports it as such.
pub fn fill_missing(mut books: Vec<RawBook>) -> Vec<RawBook> {
    for book in &mut books {
        if book.title.is_missing() {
            book.title = RawValue::Text(String::new());
        }

        if book.price.is_missing() {
            book.price = RawValue::Float(0.0);
        }

        if is_falsy(&book.rating) {
            book.rating = RawValue::Int(0);
        }

        let empty_stock = matches!(&book.available, RawValue::Text(s) if s.is_empty());
        if book.available.is_missing() || empty_stock {
            book.available = RawValue::Int(0);
        }
    }
    books
}

// ============================================================================
// STAGE 3: FORMATS
// ============================================================================

fn check_price(price: f64) -> ParseOutcome<f64> {
    if price.is_finite() && price >= 0.0 {
        // -0.0 and 0.0 must compare and hash the same downstream
        ParseOutcome::Parsed(price + 0.0)
    } else {
        ParseOutcome::defaulted(0.0, FieldError::PriceOutOfRange(price))
    }
}

/// "£10.50 " → 10.50, "25.99$" → 25.99, "12,5 €" → 12.5
pub fn parse_price(value: &RawValue) -> ParseOutcome<f64> {
    match value {
        RawValue::Float(f) => check_price(*f),
        RawValue::Int(i) => check_price(*i as f64),
        RawValue::Text(s) => {
            let cleaned = s
                .replace(['£', '€', '$'], "")
                .trim()
                .replace(',', ".");
            match cleaned.parse::<f64>() {
                Ok(price) => check_price(price),
                Err(_) => ParseOutcome::defaulted(0.0, FieldError::InvalidPrice(s.clone())),
            }
        }
        RawValue::Missing => ParseOutcome::defaulted(
            0.0,
            FieldError::UnsupportedType {
                field: "price",
                kind: value.kind(),
            },
        ),
    }
}

fn check_rating(rating: i64) -> ParseOutcome<u8> {
    if (0..=MAX_RATING as i64).contains(&rating) {
        ParseOutcome::Parsed(rating as u8)
    } else {
        ParseOutcome::defaulted(0, FieldError::RatingOutOfRange(rating))
    }
}

/// "Three" → 3, "four stars" → 4, "2" → 2, "Six" → 0
pub fn parse_rating(value: &RawValue) -> ParseOutcome<u8> {
    match value {
        RawValue::Int(i) => check_rating(*i),
        RawValue::Text(s) => {
            let lowered = s.trim().to_lowercase();
            let token = lowered.strip_suffix(" stars").unwrap_or(lowered.as_str()).trim();

            if let Some((_, stars)) = RATING_WORDS.iter().find(|(word, _)| *word == token) {
                return ParseOutcome::Parsed(*stars);
            }

            match token.parse::<i64>() {
                Ok(n) => check_rating(n),
                Err(_) => ParseOutcome::defaulted(0, FieldError::UnknownRating(s.clone())),
            }
        }
        RawValue::Float(_) | RawValue::Missing => ParseOutcome::defaulted(
            0,
            FieldError::UnsupportedType {
                field: "rating",
                kind: value.kind(),
            },
        ),
    }
}

fn check_stock(count: i64) -> ParseOutcome<u32> {
    match u32::try_from(count) {
        Ok(n) => ParseOutcome::Parsed(n),
        Err(_) => ParseOutcome::defaulted(0, FieldError::StockOutOfRange(count)),
    }
}

/// "In stock (2)" → 2, "Out of stock" → 0, "25" → 25
pub fn parse_available(value: &RawValue) -> ParseOutcome<u32> {
    match value {
        RawValue::Int(i) => check_stock(*i),
        RawValue::Text(s) => {
            if s.contains("In stock") {
                let count = STOCK_COUNT
                    .captures(s)
                    .and_then(|caps| caps.get(1))
                    .and_then(|m| m.as_str().parse::<u32>().ok());
                return match count {
                    Some(n) => ParseOutcome::Parsed(n),
                    // "In stock" with no count: we know nothing about quantity
                    None => ParseOutcome::Parsed(0),
                };
            }

            if s.contains("Out of stock") {
                return ParseOutcome::Parsed(0);
            }

            match s.trim().parse::<i64>() {
                Ok(n) => check_stock(n),
                Err(_) => ParseOutcome::defaulted(0, FieldError::InvalidStock(s.clone())),
            }
        }
        RawValue::Float(_) | RawValue::Missing => ParseOutcome::defaulted(
            0,
            FieldError::UnsupportedType {
                field: "available",
                kind: value.kind(),
            },
        ),
    }
}

fn canonical_title(value: &RawValue) -> String {
    match value {
        RawValue::Text(s) => s.trim().to_string(),
        RawValue::Int(i) => i.to_string(),
        RawValue::Float(f) => f.to_string(),
        RawValue::Missing => String::new(),
    }
}

/// Coerce every field into its canonical type.
pub fn fix_formats(books: Vec<RawBook>) -> Vec<Book> {
    books
        .into_iter()
        .enumerate()
        .map(|(index, raw)| Book {
            title: canonical_title(&raw.title),
            price: parse_price(&raw.price).into_value("price", index),
            rating: parse_rating(&raw.rating).into_value("rating", index),
            available: parse_available(&raw.available).into_value("available", index),
        })
        .collect()
}

// ============================================================================
// FULL PIPELINE
// ============================================================================

/// Run all three stages. Output has the same length and order as the input.
pub fn normalize(books: Vec<RawBook>) -> Vec<Book> {
    let count = books.len();
    let books = trim_whitespace(books);
    let books = fill_missing(books);
    let books = fix_formats(books);
    tracing::debug!(count, "records normalized");
    books
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    /// The five raw rows the cleaning tests share.
    fn raw_fixture() -> Vec<RawBook> {
        vec![
            RawBook::new("  Book 1 ", "£10.50 ", "Three", "In stock (2)"),
            RawBook::new("Book 2", "5.00", "One", "Out of stock"),
            RawBook::new("Book 3", RawValue::Missing, "", 1),
            RawBook::new("Book 1", "£10.50 ", "Three", "In stock (2)"),
            RawBook::new("Book 5", "25.99$", "Six", "25"),
        ]
    }

    #[test]
    fn test_trim_whitespace() {
        let books = trim_whitespace(raw_fixture());

        assert_eq!(books[0].title, RawValue::from("Book 1"));
        assert_eq!(books[0].price, RawValue::from("£10.50"));
        // Non-text untouched
        assert_eq!(books[2].available, RawValue::Int(1));
    }

    #[test]
    fn test_fill_missing() {
        let books = fill_missing(raw_fixture());

        assert_eq!(books[2].price, RawValue::Float(0.0));
        assert_eq!(books[2].rating, RawValue::Int(0));
        assert_eq!(books[2].available, RawValue::Int(1));
    }

    #[test]
    fn test_fill_missing_empty_stock_and_title() {
        let books = fill_missing(vec![RawBook::new(RawValue::Missing, 3.0, 2, "")]);

        assert_eq!(books[0].title, RawValue::from(""));
        assert_eq!(books[0].available, RawValue::Int(0));
        assert_eq!(books[0].rating, RawValue::Int(2));
    }

    #[test]
    fn test_fix_formats() {
        let books = fix_formats(fill_missing(raw_fixture()));

        assert_eq!(books[0].price, 10.50);
        assert_eq!(books[0].rating, 3);
        assert_eq!(books[0].available, 2);

        assert_eq!(books[4].price, 25.99);
        assert_eq!(books[4].rating, 0);
        assert_eq!(books[4].available, 25);
    }

    #[test]
    fn test_price_parsing() {
        assert_eq!(parse_price(&"£10.50 ".into()), ParseOutcome::Parsed(10.50));
        assert_eq!(parse_price(&"25.99$".into()), ParseOutcome::Parsed(25.99));
        assert_eq!(parse_price(&"5.00".into()), ParseOutcome::Parsed(5.00));
        assert_eq!(parse_price(&"12,5 €".into()), ParseOutcome::Parsed(12.5));
        assert_eq!(parse_price(&RawValue::Int(7)), ParseOutcome::Parsed(7.0));
    }

    #[test]
    fn test_price_invalid_defaults_to_zero() {
        let outcome = parse_price(&"free".into());
        assert!(outcome.is_defaulted());
        assert_eq!(
            outcome.reason(),
            Some(&FieldError::InvalidPrice("free".to_string()))
        );
        assert_eq!(outcome.into_value("price", 0), 0.0);

        assert!(parse_price(&RawValue::Float(-3.0)).is_defaulted());
        assert!(parse_price(&RawValue::Float(f64::NAN)).is_defaulted());
        assert!(parse_price(&"".into()).is_defaulted());
    }

    #[test]
    fn test_rating_parsing() {
        assert_eq!(parse_rating(&"Three".into()), ParseOutcome::Parsed(3));
        assert_eq!(parse_rating(&"five stars".into()), ParseOutcome::Parsed(5));
        assert_eq!(parse_rating(&"FOUR".into()), ParseOutcome::Parsed(4));
        assert_eq!(parse_rating(&"2".into()), ParseOutcome::Parsed(2));
        assert_eq!(parse_rating(&RawValue::Int(5)), ParseOutcome::Parsed(5));
    }

    #[test]
    fn test_rating_invalid_defaults_to_zero() {
        assert_eq!(parse_rating(&"Six".into()).into_value("rating", 0), 0);
        assert_eq!(
            parse_rating(&RawValue::Int(9)).reason(),
            Some(&FieldError::RatingOutOfRange(9))
        );
        assert_eq!(parse_rating(&RawValue::Float(3.5)).into_value("rating", 0), 0);
        assert_eq!(parse_rating(&RawValue::Missing).into_value("rating", 0), 0);
    }

    #[test]
    fn test_missing_rating_normalizes_to_zero() {
        let books = normalize(vec![
            RawBook::new("A", 1.0, RawValue::Missing, 1),
            RawBook::new("B", 1.0, "", 1),
        ]);

        assert_eq!(books[0].rating, 0);
        assert_eq!(books[1].rating, 0);
    }

    #[test]
    fn test_availability_parsing() {
        assert_eq!(parse_available(&"In stock (2)".into()), ParseOutcome::Parsed(2));
        assert_eq!(
            parse_available(&"In stock (19 available)".into()),
            ParseOutcome::Parsed(19)
        );
        assert_eq!(parse_available(&"In stock".into()), ParseOutcome::Parsed(0));
        assert_eq!(parse_available(&"Out of stock".into()), ParseOutcome::Parsed(0));
        assert_eq!(parse_available(&"25".into()), ParseOutcome::Parsed(25));
        assert_eq!(parse_available(&RawValue::Int(4)), ParseOutcome::Parsed(4));
    }

    #[test]
    fn test_availability_invalid_defaults_to_zero() {
        assert!(parse_available(&"lots".into()).is_defaulted());
        assert_eq!(
            parse_available(&RawValue::Int(-2)).reason(),
            Some(&FieldError::StockOutOfRange(-2))
        );
        assert!(parse_available(&RawValue::Float(2.0)).is_defaulted());
    }

    #[test]
    fn test_normalize_keeps_length_and_order() {
        let books = normalize(raw_fixture());

        assert_eq!(books.len(), 5);
        let titles: Vec<&str> = books.iter().map(|b| b.title.as_str()).collect();
        assert_eq!(titles, vec!["Book 1", "Book 2", "Book 3", "Book 1", "Book 5"]);
        assert_eq!(books[2], Book::new("Book 3", 0.0, 0, 1));
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let once = normalize(raw_fixture());
        let twice = normalize(once.iter().map(RawBook::from).collect());

        assert_eq!(once, twice);
    }

    #[test]
    fn test_normalize_empty() {
        assert!(normalize(Vec::new()).is_empty());
    }
}
