// 📈 Visuals - SVG charts fed by an Analysis
//
//   01  price distribution histogram
//   02  average price per star rating
//   03  price vs stock scatter, colored by rating

use crate::analysis::{Analysis, RatingSummary};
use crate::catalog::Book;
use crate::normalize::MAX_RATING;
use anyhow::{Context, Result};
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

pub const DISTRIBUTION_FILE: &str = "01_distribution_prix.svg";
pub const BY_RATING_FILE: &str = "02_prix_moyen_par_note.svg";
pub const PRICE_STOCK_FILE: &str = "03_prix_vs_stock.svg";

pub const HISTOGRAM_BINS: usize = 30;

/// Prices at or below this are placeholders and left out of the histogram.
const MIN_PLOTTED_PRICE: f64 = 1.0;

const TEAL: RGBColor = RGBColor(0, 128, 128);
const SKY_BLUE: RGBColor = RGBColor(135, 206, 235);

/// One color per rating, sampled from the viridis map.
const RATING_COLORS: [RGBColor; 6] = [
    RGBColor(68, 1, 84),
    RGBColor(65, 68, 135),
    RGBColor(42, 120, 142),
    RGBColor(34, 168, 132),
    RGBColor(122, 209, 81),
    RGBColor(253, 231, 37),
];

// ============================================================================
// HISTOGRAM BINNING
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HistogramBin {
    pub start: f64,
    pub end: f64,
    pub count: usize,
}

/// Split `prices` into `bins` equal-width bins spanning min..=max.
///
/// The maximum lands in the last bin. A single distinct price gets a
/// unit-wide range centred on it.
pub fn price_histogram(prices: &[f64], bins: usize) -> Vec<HistogramBin> {
    let finite: Vec<f64> = prices.iter().copied().filter(|p| p.is_finite()).collect();
    if finite.is_empty() || bins == 0 {
        return Vec::new();
    }

    let mut lo = finite.iter().copied().fold(f64::INFINITY, f64::min);
    let mut hi = finite.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if lo == hi {
        lo -= 0.5;
        hi += 0.5;
    }
    let width = (hi - lo) / bins as f64;

    let mut histogram: Vec<HistogramBin> = (0..bins)
        .map(|i| HistogramBin {
            start: lo + width * i as f64,
            end: if i + 1 == bins { hi } else { lo + width * (i + 1) as f64 },
            count: 0,
        })
        .collect();

    for price in finite {
        let idx = (((price - lo) / width) as usize).min(bins - 1);
        histogram[idx].count += 1;
    }

    histogram
}

// ============================================================================
// CHARTS
// ============================================================================

fn draw_price_distribution(books: &[Book], path: &Path) -> Result<()> {
    let prices: Vec<f64> = books
        .iter()
        .map(|b| b.price)
        .filter(|p| *p > MIN_PLOTTED_PRICE)
        .collect();
    let bins = price_histogram(&prices, HISTOGRAM_BINS);

    let x_start = bins.first().map_or(0.0, |b| b.start);
    let x_end = bins.last().map_or(1.0, |b| b.end);
    let y_max = bins.iter().map(|b| b.count).max().unwrap_or(0).max(1) as f64;

    let root = SVGBackend::new(path, (1000, 600)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption("Distribution des Prix des Livres", ("sans-serif", 24).into_font())
        .margin(15)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(x_start..x_end, 0f64..y_max * 1.1)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_desc("Prix (£)")
        .y_desc("Fréquence (Nombre de Livres)")
        .draw()?;

    chart.draw_series(bins.iter().map(|b| {
        Rectangle::new([(b.start, 0.0), (b.end, b.count as f64)], TEAL.mix(0.7).filled())
    }))?;
    chart.draw_series(bins.iter().map(|b| {
        Rectangle::new([(b.start, 0.0), (b.end, b.count as f64)], BLACK.stroke_width(1))
    }))?;

    root.present()?;
    Ok(())
}

fn draw_average_price_by_rating(
    by_rating: &BTreeMap<u8, RatingSummary>,
    path: &Path,
) -> Result<()> {
    // Bucket 0 holds errors, not a rating
    let bars: Vec<(u8, f64)> = (1..=MAX_RATING)
        .map(|r| (r, by_rating.get(&r).map_or(0.0, |s| s.rounded().average_price)))
        .collect();
    let y_max = bars.iter().map(|(_, avg)| *avg).fold(0.0, f64::max).max(1.0);

    let root = SVGBackend::new(path, (900, 600)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption("Prix Moyen des Livres par Note (Rating)", ("sans-serif", 24).into_font())
        .margin(15)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(0.5f64..MAX_RATING as f64 + 0.5, 0f64..y_max * 1.15)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(MAX_RATING as usize)
        .x_label_formatter(&|x| format!("{:.0}", x))
        .x_desc("Note Étoile")
        .y_desc("Prix Moyen (£)")
        .draw()?;

    chart.draw_series(bars.iter().map(|(rating, avg)| {
        let x = *rating as f64;
        Rectangle::new([(x - 0.4, 0.0), (x + 0.4, *avg)], SKY_BLUE.filled())
    }))?;

    let label_style = TextStyle::from(("sans-serif", 14).into_font())
        .pos(Pos::new(HPos::Center, VPos::Bottom));
    chart.draw_series(bars.iter().map(|(rating, avg)| {
        Text::new(
            format!("{:.2}", avg),
            (*rating as f64, *avg + y_max * 0.01),
            label_style.clone(),
        )
    }))?;

    root.present()?;
    Ok(())
}

fn draw_price_vs_stock(books: &[Book], path: &Path) -> Result<()> {
    let plotted: Vec<&Book> = books
        .iter()
        .filter(|b| b.available > 0 && b.price > 0.0)
        .collect();

    let x_max = plotted.iter().map(|b| b.price).fold(0.0, f64::max).max(1.0);
    let y_max = plotted.iter().map(|b| b.available as f64).fold(0.0, f64::max).max(1.0);

    let root = SVGBackend::new(path, (1000, 600)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption("Relation entre Prix et Stock (coloré par Note)", ("sans-serif", 24).into_font())
        .margin(15)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(0f64..x_max * 1.05, 0f64..y_max * 1.1)?;

    chart
        .configure_mesh()
        .x_desc("Prix (£)")
        .y_desc("Stock Disponible")
        .draw()?;

    for rating in 0..=MAX_RATING {
        let color = RATING_COLORS[rating as usize];
        let points: Vec<(f64, f64)> = plotted
            .iter()
            .filter(|b| b.rating == rating)
            .map(|b| (b.price, b.available as f64))
            .collect();
        if points.is_empty() {
            continue;
        }

        chart
            .draw_series(
                points
                    .into_iter()
                    .map(|p| Circle::new(p, 4, color.mix(0.6).filled())),
            )?
            .label(format!("Note {}", rating))
            .legend(move |(x, y)| Circle::new((x, y), 4, color.filled()));
    }

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperRight)
        .background_style(WHITE.mix(0.8).filled())
        .border_style(BLACK.stroke_width(1))
        .draw()?;

    root.present()?;
    Ok(())
}

/// Write the three charts into `dir`, creating it if needed.
pub fn render_visuals(analysis: &Analysis, dir: &Path) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create visuals directory {}", dir.display()))?;

    let distribution = dir.join(DISTRIBUTION_FILE);
    draw_price_distribution(&analysis.books, &distribution)
        .with_context(|| format!("Failed to draw {}", distribution.display()))?;
    tracing::info!(path = %distribution.display(), "chart generated");

    let by_rating = dir.join(BY_RATING_FILE);
    draw_average_price_by_rating(&analysis.by_rating, &by_rating)
        .with_context(|| format!("Failed to draw {}", by_rating.display()))?;
    tracing::info!(path = %by_rating.display(), "chart generated");

    let price_stock = dir.join(PRICE_STOCK_FILE);
    draw_price_vs_stock(&analysis.books, &price_stock)
        .with_context(|| format!("Failed to draw {}", price_stock.display()))?;
    tracing::info!(path = %price_stock.display(), "chart generated");

    Ok(vec![distribution, by_rating, price_stock])
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::analyze;

    #[test]
    fn test_histogram_counts_every_price() {
        let prices = vec![1.5, 2.0, 2.5, 9.0, 10.0];
        let bins = price_histogram(&prices, 3);

        assert_eq!(bins.len(), 3);
        assert_eq!(bins.iter().map(|b| b.count).sum::<usize>(), 5);
        assert_eq!(bins[0].start, 1.5);
        assert_eq!(bins[2].end, 10.0);
        // Max lands in the last bin
        assert_eq!(bins[2].count, 2);
        assert_eq!(bins[0].count, 3);
    }

    #[test]
    fn test_histogram_single_value() {
        let bins = price_histogram(&[4.0, 4.0], 2);

        assert_eq!(bins.len(), 2);
        assert_eq!(bins[0].start, 3.5);
        assert_eq!(bins[1].end, 4.5);
        assert_eq!(bins.iter().map(|b| b.count).sum::<usize>(), 2);
    }

    #[test]
    fn test_histogram_empty() {
        assert!(price_histogram(&[], 30).is_empty());
        assert!(price_histogram(&[1.0], 0).is_empty());
    }

    #[test]
    fn test_render_visuals_writes_three_files() {
        let analysis = analyze(vec![
            Book::new("A", 50.0, 5, 10),
            Book::new("B", 10.0, 5, 5),
            Book::new("C", 20.0, 3, 20),
            Book::new("D", 5.0, 0, 1),
            Book::new("E", 0.0, 2, 0),
        ])
        .unwrap();
        let dir = tempfile::tempdir().unwrap();
        let visuals = dir.path().join("visuals");

        let paths = render_visuals(&analysis, &visuals).unwrap();

        assert_eq!(paths.len(), 3);
        for path in &paths {
            let svg = fs::read_to_string(path).unwrap();
            assert!(svg.contains("<svg"), "{} is not an SVG", path.display());
        }
        assert!(paths[0].ends_with(DISTRIBUTION_FILE));
    }
}
