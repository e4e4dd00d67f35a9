// 📚 Book Catalog - raw and canonical book records + CSV loader

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::Path;

// ============================================================================
// RAW VALUES (loosely typed, as read from the catalog)
// ============================================================================

/// A single cell before normalization.
///
/// The catalog has no declared types, so a cell is whatever the loader could
/// infer from its text: nothing at all, an integer, a decimal, or free text.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    #[default]
    Missing,
    Int(i64),
    Float(f64),
    Text(String),
}

impl RawValue {
    /// Infer a value from a CSV cell. Empty cells are `Missing`.
    pub fn infer(cell: &str) -> Self {
        if cell.is_empty() {
            return RawValue::Missing;
        }
        if let Ok(i) = cell.parse::<i64>() {
            return RawValue::Int(i);
        }
        if let Ok(f) = cell.parse::<f64>() {
            return RawValue::Float(f);
        }
        RawValue::Text(cell.to_string())
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, RawValue::Missing)
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            RawValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Name of the variant, used in diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            RawValue::Missing => "missing",
            RawValue::Int(_) => "integer",
            RawValue::Float(_) => "decimal",
            RawValue::Text(_) => "text",
        }
    }
}

impl From<&str> for RawValue {
    fn from(s: &str) -> Self {
        RawValue::Text(s.to_string())
    }
}

impl From<String> for RawValue {
    fn from(s: String) -> Self {
        RawValue::Text(s)
    }
}

impl From<i64> for RawValue {
    fn from(i: i64) -> Self {
        RawValue::Int(i)
    }
}

impl From<i32> for RawValue {
    fn from(i: i32) -> Self {
        RawValue::Int(i as i64)
    }
}

impl From<f64> for RawValue {
    fn from(f: f64) -> Self {
        RawValue::Float(f)
    }
}

// ============================================================================
// RAW BOOK (pre-normalization)
// ============================================================================

/// One book exactly as it came out of the catalog.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RawBook {
    pub title: RawValue,
    pub price: RawValue,
    pub rating: RawValue,
    pub available: RawValue,
}

impl RawBook {
    pub fn new(
        title: impl Into<RawValue>,
        price: impl Into<RawValue>,
        rating: impl Into<RawValue>,
        available: impl Into<RawValue>,
    ) -> Self {
        RawBook {
            title: title.into(),
            price: price.into(),
            rating: rating.into(),
            available: available.into(),
        }
    }

    /// Mutable access to every field, in column order.
    pub(crate) fn fields_mut(&mut self) -> [&mut RawValue; 4] {
        [
            &mut self.title,
            &mut self.price,
            &mut self.rating,
            &mut self.available,
        ]
    }
}

impl From<&Book> for RawBook {
    fn from(book: &Book) -> Self {
        RawBook {
            title: RawValue::Text(book.title.clone()),
            price: RawValue::Float(book.price),
            rating: RawValue::Int(book.rating as i64),
            available: RawValue::Int(book.available as i64),
        }
    }
}

// ============================================================================
// BOOK (canonical form)
// ============================================================================

/// A fully normalized book, ready for deduplication and aggregation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Book {
    pub title: String,
    /// Non-negative, currency agnostic
    pub price: f64,
    /// 1-5 stars, 0 when missing or invalid
    pub rating: u8,
    /// Units in stock
    pub available: u32,
}

impl Book {
    pub fn new(title: &str, price: f64, rating: u8, available: u32) -> Self {
        Book {
            title: title.to_string(),
            price,
            rating,
            available,
        }
    }

    /// Stock value of this line (price × units).
    pub fn stock_value(&self) -> f64 {
        self.price * self.available as f64
    }
}

// ============================================================================
// CSV LOADING
// ============================================================================

#[derive(Debug, Default, Clone, Copy)]
struct ColumnMap {
    title: Option<usize>,
    price: Option<usize>,
    rating: Option<usize>,
    available: Option<usize>,
}

impl ColumnMap {
    fn from_headers(headers: &csv::StringRecord) -> Self {
        let mut map = ColumnMap::default();
        for (idx, name) in headers.iter().enumerate() {
            match name.trim().to_lowercase().as_str() {
                "title" => map.title = Some(idx),
                "price" => map.price = Some(idx),
                "rating" => map.rating = Some(idx),
                "available" => map.available = Some(idx),
                _ => {}
            }
        }
        map
    }
}

fn cell(record: &csv::StringRecord, idx: Option<usize>) -> Option<&str> {
    idx.and_then(|i| record.get(i))
}

/// Read books from any CSV source with a header row.
///
/// Columns other than title/price/rating/available are ignored. Titles are
/// always kept as text; the other three columns are type-inferred per cell.
pub fn read_books_from<R: Read>(reader: R) -> Result<Vec<RawBook>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let headers = rdr.headers().context("Failed to read CSV header row")?.clone();
    let columns = ColumnMap::from_headers(&headers);

    let mut books = Vec::new();
    for (line_num, result) in rdr.records().enumerate() {
        // +2 because: 1-indexed + header row
        let record = result.with_context(|| format!("Failed to parse CSV line {}", line_num + 2))?;

        let title = match cell(&record, columns.title) {
            None | Some("") => RawValue::Missing,
            Some(t) => RawValue::Text(t.to_string()),
        };

        books.push(RawBook {
            title,
            price: cell(&record, columns.price).map(RawValue::infer).unwrap_or_default(),
            rating: cell(&record, columns.rating).map(RawValue::infer).unwrap_or_default(),
            available: cell(&record, columns.available)
                .map(RawValue::infer)
                .unwrap_or_default(),
        });
    }

    Ok(books)
}

/// Read books from a CSV file, propagating I/O and format errors.
pub fn read_books(csv_path: &Path) -> Result<Vec<RawBook>> {
    let file = File::open(csv_path)
        .with_context(|| format!("Failed to open file: {}", csv_path.display()))?;
    read_books_from(file).with_context(|| format!("Failed to read catalog {}", csv_path.display()))
}

/// Load the catalog, never failing.
///
/// A missing or unreadable file yields an empty list; the caller decides
/// whether an empty run is worth continuing.
pub fn load_books(csv_path: &Path) -> Vec<RawBook> {
    if !csv_path.exists() {
        tracing::warn!(path = %csv_path.display(), "catalog file not found");
        return Vec::new();
    }

    match read_books(csv_path) {
        Ok(books) => {
            tracing::info!(path = %csv_path.display(), count = books.len(), "catalog loaded");
            books
        }
        Err(err) => {
            tracing::error!(path = %csv_path.display(), error = %format!("{:#}", err), "failed to read catalog");
            Vec::new()
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
