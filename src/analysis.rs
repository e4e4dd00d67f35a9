// 📊 Aggregator - statistics per rating bucket + global statistics
//
// Buckets 0..=5 always exist. Bucket 0 collects unrated books, out-of-range
// ratings and records that cannot be read as numbers at all.

use crate::catalog::{Book, RawBook, RawValue};
use crate::normalize::MAX_RATING;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Bucket used for missing, invalid and degraded ratings.
pub const ERROR_BUCKET: u8 = 0;

/// Round to cents. Only applied when results are presented.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

// ============================================================================
// INPUT SEAM
// ============================================================================

/// Anything the aggregator can read a rating, a price and a stock count from.
///
/// Each accessor returns `None` when the value cannot be interpreted as a
/// number, which marks the whole record as degraded.
pub trait StockEntry {
    fn rating(&self) -> Option<i64>;
    fn price(&self) -> Option<f64>;
    fn stock(&self) -> Option<i64>;
}

impl StockEntry for Book {
    fn rating(&self) -> Option<i64> {
        Some(self.rating as i64)
    }

    fn price(&self) -> Option<f64> {
        Some(self.price)
    }

    fn stock(&self) -> Option<i64> {
        Some(self.available as i64)
    }
}

impl StockEntry for RawBook {
    fn rating(&self) -> Option<i64> {
        match &self.rating {
            RawValue::Int(i) => Some(*i),
            RawValue::Float(f) if f.is_finite() => Some(f.trunc() as i64),
            RawValue::Text(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    fn price(&self) -> Option<f64> {
        match &self.price {
            RawValue::Int(i) => Some(*i as f64),
            RawValue::Float(f) => Some(*f),
            _ => None,
        }
    }

    fn stock(&self) -> Option<i64> {
        match &self.available {
            RawValue::Int(i) => Some(*i),
            RawValue::Float(f) if f.is_finite() && f.fract() == 0.0 => Some(*f as i64),
            _ => None,
        }
    }
}

// ============================================================================
// RATING BUCKETS
// ============================================================================

/// Running totals for one rating.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RatingBucket {
    /// Positions of the contributing records in the analyzed slice
    pub indices: Vec<usize>,
    pub total_price: f64,
    pub total_stock: i64,
    pub total_value: f64,
    /// Includes degraded records, which contribute nothing else
    pub book_count: usize,
    pub degraded_count: usize,
}

impl RatingBucket {
    fn add(&mut self, index: usize, price: f64, stock: i64) {
        self.indices.push(index);
        self.total_price += price;
        self.total_stock += stock;
        self.total_value += price * stock as f64;
        self.book_count += 1;
    }

    fn add_degraded(&mut self) {
        self.book_count += 1;
        self.degraded_count += 1;
    }

    pub fn average_price(&self) -> f64 {
        if self.book_count == 0 {
            0.0
        } else {
            self.total_price / self.book_count as f64
        }
    }

    pub fn summary(&self, rating: u8) -> RatingSummary {
        RatingSummary {
            rating,
            average_price: self.average_price(),
            total_stock: self.total_stock,
            value: self.total_value,
            book_count: self.book_count,
        }
    }
}

/// What reporters get for one rating.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RatingSummary {
    pub rating: u8,
    pub average_price: f64,
    pub total_stock: i64,
    pub value: f64,
    pub book_count: usize,
}

impl RatingSummary {
    pub fn rounded(&self) -> Self {
        RatingSummary {
            average_price: round2(self.average_price),
            value: round2(self.value),
            ..*self
        }
    }
}

fn empty_buckets() -> BTreeMap<u8, RatingBucket> {
    (0..=MAX_RATING).map(|r| (r, RatingBucket::default())).collect()
}

/// Partition records into the six rating buckets.
pub fn analyze_by_rating<T: StockEntry>(books: &[T]) -> BTreeMap<u8, RatingBucket> {
    let mut buckets = empty_buckets();

    for (index, book) in books.iter().enumerate() {
        match (book.rating(), book.price(), book.stock()) {
            (Some(rating), Some(price), Some(stock)) => {
                let key = match u8::try_from(rating) {
                    Ok(r) if r <= MAX_RATING => r,
                    _ => {
                        tracing::debug!(record = index, rating, "rating out of range, counted as unrated");
                        ERROR_BUCKET
                    }
                };
                if let Some(bucket) = buckets.get_mut(&key) {
                    bucket.add(index, price, stock);
                }
            }
            _ => {
                tracing::warn!(record = index, "record not numeric, counted in bucket 0 only");
                if let Some(bucket) = buckets.get_mut(&ERROR_BUCKET) {
                    bucket.add_degraded();
                }
            }
        }
    }

    buckets
}

/// Per-rating summaries, full precision.
pub fn summarize_buckets(buckets: &BTreeMap<u8, RatingBucket>) -> BTreeMap<u8, RatingSummary> {
    buckets
        .iter()
        .map(|(rating, bucket)| (*rating, bucket.summary(*rating)))
        .collect()
}

// ============================================================================
// GLOBAL STATISTICS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct GlobalStats {
    pub total_books: usize,
    pub average_price: f64,
    pub total_stock: i64,
    pub total_value: f64,
    /// Cheapest strictly positive price; free placeholder entries don't count
    pub min_price: f64,
    pub max_price: f64,
}

impl GlobalStats {
    pub fn zero() -> Self {
        GlobalStats::default()
    }

    pub fn rounded(&self) -> Self {
        GlobalStats {
            average_price: round2(self.average_price),
            total_value: round2(self.total_value),
            min_price: round2(self.min_price),
            max_price: round2(self.max_price),
            ..*self
        }
    }
}

/// Dataset-wide statistics, computed directly from the records.
///
/// Values that cannot be read count as zero here.
pub fn global_statistics<T: StockEntry>(books: &[T]) -> GlobalStats {
    if books.is_empty() {
        return GlobalStats::zero();
    }

    let prices: Vec<f64> = books.iter().map(|b| b.price().unwrap_or(0.0)).collect();
    let stocks: Vec<i64> = books.iter().map(|b| b.stock().unwrap_or(0)).collect();

    let total_price: f64 = prices.iter().sum();
    let total_stock: i64 = stocks.iter().sum();
    let total_value: f64 = prices
        .iter()
        .zip(&stocks)
        .map(|(price, stock)| price * *stock as f64)
        .sum();

    let min_price = prices
        .iter()
        .copied()
        .filter(|p| *p > 0.0)
        .fold(None, |acc: Option<f64>, p| Some(acc.map_or(p, |m| m.min(p))))
        .unwrap_or(0.0);
    let max_price = prices.iter().copied().fold(0.0, f64::max);

    GlobalStats {
        total_books: books.len(),
        average_price: total_price / books.len() as f64,
        total_stock,
        total_value,
        min_price,
        max_price,
    }
}

// ============================================================================
// ANALYSIS
// ============================================================================

/// Everything a reporter needs from one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Analysis {
    pub by_rating: BTreeMap<u8, RatingSummary>,
    pub global_stats: GlobalStats,
    pub books: Vec<Book>,
}

/// Analyze a cleaned catalog.
///
/// Returns `None` for an empty catalog: there is nothing to report on, and
/// the caller decides whether that is a failure.
pub fn analyze(books: Vec<Book>) -> Option<Analysis> {
    if books.is_empty() {
        tracing::warn!("no books to analyze");
        return None;
    }

    tracing::info!(count = books.len(), "starting analysis");

    let buckets = analyze_by_rating(&books);
    let by_rating = summarize_buckets(&buckets);
    let global_stats = global_statistics(&books);

    Some(Analysis {
        by_rating,
        global_stats,
        books,
    })
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn clean_books() -> Vec<Book> {
        vec![
            Book::new("High Price 5-Star", 50.00, 5, 10),
            Book::new("Low Price 5-Star", 10.00, 5, 5),
            Book::new("Avg Price 3-Star", 20.00, 3, 20),
            Book::new("Zero Rating/Error", 5.00, 0, 1),
        ]
    }

    #[test]
    fn test_analyze_by_rating() {
        let buckets = analyze_by_rating(&clean_books());
        let rating_5 = buckets[&5].summary(5).rounded();

        assert_eq!(rating_5.book_count, 2);
        assert_eq!(rating_5.average_price, 30.00);
        assert_eq!(rating_5.value, 550.00);
        assert_eq!(rating_5.total_stock, 15);
        assert_eq!(buckets[&5].indices, vec![0, 1]);
    }

    #[test]
    fn test_all_six_buckets_present() {
        let summaries = summarize_buckets(&analyze_by_rating::<Book>(&[]));

        assert_eq!(summaries.keys().copied().collect::<Vec<_>>(), vec![0, 1, 2, 3, 4, 5]);
        for summary in summaries.values() {
            assert_eq!(summary.book_count, 0);
            assert_eq!(summary.average_price, 0.0);
            assert_eq!(summary.value, 0.0);
        }
    }

    #[test]
    fn test_out_of_range_rating_goes_to_bucket_zero() {
        let mut corrupted = Book::new("Corrupted", 8.0, 5, 2);
        corrupted.rating = 9;

        let buckets = analyze_by_rating(&[corrupted]);

        assert_eq!(buckets[&0].book_count, 1);
        assert_eq!(buckets[&0].total_value, 16.0);
        assert_eq!(buckets[&5].book_count, 0);
    }

    #[test]
    fn test_raw_records_out_of_range_and_degraded() {
        let raw = vec![
            RawBook::new("Too high", 4.0, 7, 1),
            RawBook::new("Negative", 6.0, -1, 1),
            RawBook::new("Unreadable", 10.0, "Three", 2),
            RawBook::new("Fine", 3.0, "4", 2),
        ];

        let buckets = analyze_by_rating(&raw);

        // Two out-of-range plus one degraded
        assert_eq!(buckets[&0].book_count, 3);
        assert_eq!(buckets[&0].degraded_count, 1);
        // Degraded record adds nothing but the count
        assert_eq!(buckets[&0].total_price, 10.0);
        assert_eq!(buckets[&0].total_stock, 2);
        assert_eq!(buckets[&0].indices, vec![0, 1]);
        assert_eq!(buckets[&4].book_count, 1);
    }

    #[test]
    fn test_global_statistics() {
        let stats = global_statistics(&clean_books()).rounded();

        assert_eq!(stats.total_books, 4);
        assert_eq!(stats.average_price, 21.25);
        assert_eq!(stats.max_price, 50.00);
        assert_eq!(stats.min_price, 5.00);
        assert_eq!(stats.total_stock, 36);
        assert_eq!(stats.total_value, 955.00);
    }

    #[test]
    fn test_global_statistics_empty_list() {
        let stats = global_statistics::<Book>(&[]);

        assert_eq!(stats.total_books, 0);
        assert_eq!(stats.average_price, 0.0);
        assert_eq!(stats, GlobalStats::zero());
    }

    #[test]
    fn test_min_price_ignores_free_books() {
        let books = vec![Book::new("Free", 0.0, 1, 1), Book::new("Cheap", 2.5, 1, 1)];
        assert_eq!(global_statistics(&books).min_price, 2.5);

        let all_free = vec![Book::new("Free", 0.0, 1, 1)];
        assert_eq!(global_statistics(&all_free).min_price, 0.0);
    }

    #[test]
    fn test_rounding_only_at_presentation() {
        let books = vec![Book::new("A", 1.005, 1, 3), Book::new("B", 1.0, 1, 0)];
        let buckets = analyze_by_rating(&books);

        let full = buckets[&1].summary(1);
        assert!((full.value - 3.015).abs() < 1e-9);
        assert_eq!(round2(2.0 / 3.0), 0.67);
    }

    #[test]
    fn test_analyze_empty_is_none() {
        assert!(analyze(Vec::new()).is_none());
    }

    #[test]
    fn test_analyze() {
        let analysis = analyze(clean_books()).unwrap();

        assert_eq!(analysis.by_rating.len(), 6);
        assert_eq!(analysis.by_rating[&3].book_count, 1);
        assert_eq!(analysis.global_stats.total_books, 4);
        assert_eq!(analysis.books.len(), 4);
    }
}
