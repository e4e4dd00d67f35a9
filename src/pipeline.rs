// 🔗 Pipeline - load → normalize → deduplicate → analyze → report

use crate::analysis::{analyze, Analysis};
use crate::catalog::{load_books, Book, RawBook};
use crate::config::AnalyzerConfig;
use crate::deduplication::remove_duplicates;
use crate::normalize::normalize;
use crate::report::{render_report, write_json, write_report};
use crate::visuals::render_visuals;
use std::path::PathBuf;

/// What a full run produced.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub analysis: Analysis,
    /// Rendered text report, also saved to disk when possible
    pub report: String,
    pub books_loaded: usize,
    pub duplicates_removed: usize,
    /// Every file successfully written
    pub written: Vec<PathBuf>,
}

/// Normalize and deduplicate a raw catalog.
pub fn clean_data(books: Vec<RawBook>) -> Vec<Book> {
    if books.is_empty() {
        tracing::info!("books list is empty, nothing to clean");
        return Vec::new();
    }

    tracing::info!(count = books.len(), "cleaning started");
    let cleaned = remove_duplicates(normalize(books));
    tracing::info!(count = cleaned.len(), "cleaning finished");
    cleaned
}

/// Load and clean the configured catalog, then analyze it.
///
/// `None` when there is nothing to analyze.
pub fn prepare(config: &AnalyzerConfig) -> Option<Analysis> {
    analyze(clean_data(load_books(&config.input_csv)))
}

/// Full run: analysis, text report, JSON export and charts.
///
/// Output failures are logged and skipped; only an empty catalog makes the
/// run return `None`.
pub fn run(config: &AnalyzerConfig) -> Option<RunOutcome> {
    let raw = load_books(&config.input_csv);
    let books_loaded = raw.len();

    let cleaned = clean_data(raw);
    let duplicates_removed = books_loaded - cleaned.len();

    let analysis = analyze(cleaned)?;
    let report = render_report(&analysis);
    let mut written = Vec::new();

    match write_report(&report, &config.output_dir, &config.report_filename) {
        Ok(path) => written.push(path),
        Err(err) => tracing::error!(error = %format!("{:#}", err), "failed to save report"),
    }

    match write_json(&analysis, &config.output_dir, &config.json_filename) {
        Ok(path) => written.push(path),
        Err(err) => tracing::error!(error = %format!("{:#}", err), "failed to save JSON export"),
    }

    match render_visuals(&analysis, &config.visuals_dir) {
        Ok(paths) => written.extend(paths),
        Err(err) => tracing::error!(error = %format!("{:#}", err), "failed to generate charts"),
    }

    Some(RunOutcome {
        analysis,
        report,
        books_loaded,
        duplicates_removed,
        written,
    })
}

// ============================================================================
// TESTS
// ============================================================================
