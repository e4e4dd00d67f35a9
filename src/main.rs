use anyhow::Result;
use std::env;

use book_analyzer::{logging, AnalyzerConfig};

fn main() -> Result<()> {
    // A local .env may set BOOKS_CSV_FILE and friends
    dotenv::dotenv().ok();
    logging::init_logging();

    let config = AnalyzerConfig::from_env();
    let args: Vec<String> = env::args().collect();

    if args.len() > 1 && args[1] == "ui" {
        run_ui_mode(&config)?;
    } else {
        run_analysis(&config);
    }

    Ok(())
}

fn run_analysis(config: &AnalyzerConfig) {
    println!("📚 Analyse du catalogue: {}", config.input_csv.display());

    match book_analyzer::run(config) {
        Some(outcome) => {
            print!("{}", outcome.report);
            println!(
                "✓ {} livres chargés, {} doublons supprimés",
                outcome.books_loaded, outcome.duplicates_removed
            );
            for path in &outcome.written {
                println!("  → {}", path.display());
            }
            println!("\n✅ Analyse terminée avec succès !");
        }
        None => {
            eprintln!("\n❌ Échec de l'analyse: aucune donnée à analyser");
            std::process::exit(1);
        }
    }
}

#[cfg(feature = "tui")]
fn run_ui_mode(config: &AnalyzerConfig) -> Result<()> {
    use book_analyzer::ui;

    let Some(analysis) = book_analyzer::prepare(config) else {
        eprintln!("❌ Aucune donnée à afficher: {}", config.input_csv.display());
        std::process::exit(1);
    };

    let mut app = ui::App::new(analysis);
    ui::run_ui(&mut app)?;

    Ok(())
}

#[cfg(not(feature = "tui"))]
fn run_ui_mode(_config: &AnalyzerConfig) -> Result<()> {
    eprintln!("❌ TUI mode not available!");
    eprintln!("   Rebuild with: cargo build --features tui");
    std::process::exit(1);
}
