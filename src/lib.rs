// Book Catalog Analyzer - Core Library
// Cleaning pipeline, rating analysis and reports, shared by the CLI and tests

pub mod catalog;
pub mod normalize;
pub mod deduplication;
pub mod analysis;
pub mod config;
pub mod report;
pub mod visuals;
pub mod pipeline;
pub mod logging;

// Only compile UI module when TUI feature is enabled
#[cfg(feature = "tui")]
pub mod ui;

// Re-export commonly used types
pub use catalog::{
    Book, RawBook, RawValue,
    load_books, read_books, read_books_from,
};
pub use normalize::{
    FieldError, ParseOutcome,
    trim_whitespace, fill_missing, fix_formats, normalize,
    parse_price, parse_rating, parse_available,
};
pub use deduplication::{
    DuplicateMatch, IdentityKey,
    find_duplicates, remove_duplicates,
};
pub use analysis::{
    Analysis, GlobalStats, RatingBucket, RatingSummary, StockEntry,
    analyze, analyze_by_rating, global_statistics, summarize_buckets, round2,
};
pub use config::AnalyzerConfig;
pub use report::{
    render_rating_table, render_global_stats, render_report,
    write_report, write_json,
};
pub use visuals::{render_visuals, price_histogram, HistogramBin};
pub use pipeline::{clean_data, prepare, run, RunOutcome};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
