// 📝 Reporter - text and JSON renderings of an Analysis

use crate::analysis::{Analysis, GlobalStats, RatingSummary, ERROR_BUCKET};
use crate::catalog::Book;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

pub const REPORT_TITLE: &str = "Rapport d'Analyse des Livres";

// ============================================================================
// TEXT
// ============================================================================

/// Fixed-width table of the six rating buckets, rounded to cents.
pub fn render_rating_table(by_rating: &BTreeMap<u8, RatingSummary>) -> String {
    let mut out = String::new();

    out.push_str(&format!("\n{}\n", "=".repeat(80)));
    out.push_str("ANALYSE DES LIVRES PAR RATING\n");
    out.push_str(&format!("{}\n", "=".repeat(80)));
    out.push_str(&format!(
        "{:<10} {:<15} {:<15} {:<15} {:<15}\n",
        "Rating", "Average_Price", "Total_Stock", "Value", "Book_Count"
    ));
    out.push_str(&format!("{}\n", "-".repeat(80)));

    for (rating, summary) in by_rating {
        let summary = summary.rounded();
        let label = if *rating == ERROR_BUCKET {
            format!("{} (Erreur)", rating)
        } else {
            rating.to_string()
        };

        out.push_str(&format!(
            "{:<10} {:<15.2} {:<15} {:<15.2} {:<15}\n",
            label, summary.average_price, summary.total_stock, summary.value, summary.book_count
        ));
    }

    out.push_str(&format!("{}\n\n", "=".repeat(80)));
    out
}

/// Global statistics block. Prices are shown in pounds, as in the catalog.
pub fn render_global_stats(stats: &GlobalStats) -> String {
    let stats = stats.rounded();
    let mut out = String::new();

    out.push_str(&format!("\n{}\n", "=".repeat(60)));
    out.push_str("📈 STATISTIQUES GLOBALES\n");
    out.push_str(&format!("{}\n", "=".repeat(60)));
    out.push_str(&format!("Nombre total de livres       : {}\n", stats.total_books));
    out.push_str(&format!("Prix moyen                   : {:.2} £\n", stats.average_price));
    out.push_str(&format!("Prix minimum                 : {:.2} £\n", stats.min_price));
    out.push_str(&format!("Prix maximum                 : {:.2} £\n", stats.max_price));
    out.push_str(&format!("Stock total                  : {} livres\n", stats.total_stock));
    out.push_str(&format!("Valeur totale du stock       : {:.2} £\n", stats.total_value));
    out.push_str(&format!("{}\n\n", "=".repeat(60)));
    out
}

/// The whole report: title, rating table, global statistics.
pub fn render_report(analysis: &Analysis) -> String {
    format!(
        "{}\n{}\n\n{}{}",
        REPORT_TITLE,
        "=".repeat(35),
        render_rating_table(&analysis.by_rating),
        render_global_stats(&analysis.global_stats)
    )
}

/// Write `content` to `dir/filename`, creating `dir` and replacing any
/// previous report.
pub fn write_report(content: &str, dir: &Path, filename: &str) -> Result<PathBuf> {
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create output directory {}", dir.display()))?;

    let path = dir.join(filename);
    fs::write(&path, content).with_context(|| format!("Failed to write {}", path.display()))?;

    tracing::info!(path = %path.display(), "report saved");
    Ok(path)
}

// ============================================================================
// JSON
// ============================================================================

#[derive(Debug, Serialize)]
struct JsonReport<'a> {
    run_id: String,
    generated_at: DateTime<Utc>,
    by_rating: Vec<RatingSummary>,
    global_stats: GlobalStats,
    books: &'a [Book],
}

fn json_report(analysis: &Analysis) -> JsonReport<'_> {
    JsonReport {
        run_id: uuid::Uuid::new_v4().to_string(),
        generated_at: Utc::now(),
        by_rating: analysis.by_rating.values().map(RatingSummary::rounded).collect(),
        global_stats: analysis.global_stats.rounded(),
        books: &analysis.books,
    }
}

/// Machine-readable copy of the report (rounded figures plus the books).
pub fn write_json(analysis: &Analysis, dir: &Path, filename: &str) -> Result<PathBuf> {
    let json = serde_json::to_string_pretty(&json_report(analysis))
        .context("Failed to serialize analysis")?;
    write_report(&json, dir, filename)
}

// ============================================================================
// TESTS
// ============================================================================
