// ⚙️ Analyzer configuration - where to read the catalog, where to write reports

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const ENV_INPUT_CSV: &str = "BOOKS_CSV_FILE";
pub const ENV_OUTPUT_DIR: &str = "BOOKS_OUTPUT_DIR";
pub const ENV_VISUALS_DIR: &str = "BOOKS_VISUALS_DIR";

pub const DEFAULT_INPUT_CSV: &str = "input/books.csv";
pub const DEFAULT_OUTPUT_DIR: &str = "output";
pub const DEFAULT_VISUALS_DIR: &str = "output/visuals";
pub const DEFAULT_REPORT_FILENAME: &str = "analysis_report.txt";
pub const DEFAULT_JSON_FILENAME: &str = "analysis.json";

/// Paths for one analyzer run.
///
/// Passed explicitly to the pipeline; nothing reads the environment except
/// [`AnalyzerConfig::from_env`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyzerConfig {
    pub input_csv: PathBuf,
    pub output_dir: PathBuf,
    pub visuals_dir: PathBuf,
    pub report_filename: String,
    pub json_filename: String,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        AnalyzerConfig {
            input_csv: PathBuf::from(DEFAULT_INPUT_CSV),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            visuals_dir: PathBuf::from(DEFAULT_VISUALS_DIR),
            report_filename: DEFAULT_REPORT_FILENAME.to_string(),
            json_filename: DEFAULT_JSON_FILENAME.to_string(),
        }
    }
}

impl AnalyzerConfig {
    /// Defaults, overridden by `BOOKS_CSV_FILE`, `BOOKS_OUTPUT_DIR` and
    /// `BOOKS_VISUALS_DIR` when set.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as `from_env`, reading variables through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = AnalyzerConfig::default();
        let set = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(path) = set(ENV_INPUT_CSV) {
            config.input_csv = PathBuf::from(path);
        }
        if let Some(dir) = set(ENV_OUTPUT_DIR) {
            config.output_dir = PathBuf::from(dir);
        }
        if let Some(dir) = set(ENV_VISUALS_DIR) {
            config.visuals_dir = PathBuf::from(dir);
        }

        config
    }

    pub fn with_input(mut self, path: impl Into<PathBuf>) -> Self {
        self.input_csv = path.into();
        self
    }

    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    pub fn with_visuals_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.visuals_dir = dir.into();
        self
    }

    pub fn report_path(&self) -> PathBuf {
        self.output_dir.join(&self.report_filename)
    }
}
