// 🔍 Deduplication - drop repeated catalog entries
// Identity: same (trimmed) title at the same price

use crate::catalog::Book;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ============================================================================
// IDENTITY KEY
// ============================================================================

/// Two books with equal keys are the same book.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IdentityKey {
    title: String,
    /// Bit pattern of the price; only built from finite values
    price_bits: u64,
}

impl IdentityKey {
    /// Build the key, or `None` when the price cannot take part in a key.
    pub fn for_book(book: &Book) -> Option<Self> {
        if !book.price.is_finite() {
            return None;
        }
        Some(IdentityKey {
            title: book.title.trim().to_string(),
            // Adding 0.0 folds -0.0 into 0.0
            price_bits: (book.price + 0.0).to_bits(),
        })
    }
}

// ============================================================================
// DUPLICATE MATCH RESULT
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DuplicateMatch {
    /// Index of the occurrence that is kept
    pub first_index: usize,

    /// Index of the later occurrence that is dropped
    pub duplicate_index: usize,

    /// Human-readable reason
    pub reason: String,
}

/// List every later occurrence of an already seen key.
pub fn find_duplicates(books: &[Book]) -> Vec<DuplicateMatch> {
    let mut first_seen: HashMap<IdentityKey, usize> = HashMap::new();
    let mut matches = Vec::new();

    for (i, book) in books.iter().enumerate() {
        let Some(key) = IdentityKey::for_book(book) else {
            tracing::warn!(record = i, price = book.price, "no identity key, keeping record");
            continue;
        };

        match first_seen.get(&key) {
            Some(&first) => matches.push(DuplicateMatch {
                first_index: first,
                duplicate_index: i,
                reason: format!("Same title and price: {} | {:.2}", book.title.trim(), book.price),
            }),
            None => {
                first_seen.insert(key, i);
            }
        }
    }

    matches
}

/// Remove duplicates, keeping the first occurrence of each key in input order.
///
/// Records without a usable key are always kept.
pub fn remove_duplicates(books: Vec<Book>) -> Vec<Book> {
    let duplicates = find_duplicates(&books);
    if duplicates.is_empty() {
        return books;
    }

    for m in &duplicates {
        tracing::debug!(
            kept = m.first_index,
            dropped = m.duplicate_index,
            reason = %m.reason,
            "duplicate removed"
        );
    }

    let mut dropped = vec![false; books.len()];
    for m in &duplicates {
        dropped[m.duplicate_index] = true;
    }

    let before = books.len();
    let unique: Vec<Book> = books
        .into_iter()
        .zip(dropped)
        .filter_map(|(book, is_dup)| (!is_dup).then_some(book))
        .collect();

    tracing::info!(before, after = unique.len(), "duplicates removed");
    unique
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::RawBook;
    use crate::normalize::normalize;

    fn create_test_book(title: &str, price: f64) -> Book {
        Book::new(title, price, 3, 1)
    }

    #[test]
    fn test_remove_duplicates_fixture() {
        let raw = vec![
            RawBook::new("  Book 1 ", "£10.50 ", "Three", "In stock (2)"),
            RawBook::new("Book 2", "5.00", "One", "Out of stock"),
            RawBook::new("Book 3", crate::catalog::RawValue::Missing, "", 1),
            RawBook::new("Book 1", "£10.50 ", "Three", "In stock (2)"),
            RawBook::new("Book 5", "25.99$", "Six", "25"),
        ];

        let unique = remove_duplicates(normalize(raw));

        assert_eq!(unique.len(), 4);
        let titles: Vec<&str> = unique.iter().map(|b| b.title.as_str()).collect();
        assert_eq!(titles, vec!["Book 1", "Book 2", "Book 3", "Book 5"]);
    }

    #[test]
    fn test_first_occurrence_kept() {
        let mut first = create_test_book("Dune", 9.99);
        first.available = 7;
        let books = vec![
            first.clone(),
            create_test_book("Emma", 4.0),
            create_test_book("Dune", 9.99),
        ];

        let unique = remove_duplicates(books);

        assert_eq!(unique.len(), 2);
        assert_eq!(unique[0], first);
        assert_eq!(unique[1].title, "Emma");
    }

    #[test]
    fn test_title_trimmed_in_key() {
        let books = vec![create_test_book(" Dune ", 9.99), create_test_book("Dune", 9.99)];

        let matches = find_duplicates(&books);

        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].first_index, 0);
        assert_eq!(matches[0].duplicate_index, 1);
    }

    #[test]
    fn test_same_title_different_price_kept() {
        let books = vec![create_test_book("Dune", 9.99), create_test_book("Dune", 10.99)];

        assert_eq!(remove_duplicates(books).len(), 2);
    }

    #[test]
    fn test_unkeyable_records_kept() {
        let books = vec![
            create_test_book("Dune", f64::NAN),
            create_test_book("Dune", f64::NAN),
        ];

        assert!(IdentityKey::for_book(&books[0]).is_none());
        assert_eq!(remove_duplicates(books).len(), 2);
    }

    #[test]
    fn test_negative_zero_price_same_key() {
        let a = IdentityKey::for_book(&create_test_book("Free", 0.0));
        let b = IdentityKey::for_book(&create_test_book("Free", -0.0));
        assert_eq!(a, b);
    }

    #[test]
    fn test_empty_input() {
        assert!(find_duplicates(&[]).is_empty());
        assert!(remove_duplicates(Vec::new()).is_empty());
    }
}
