use anyhow::{Context, Result, ensure};
use std::path::{Path, PathBuf};
use tracing::warn;

pub const DEFAULT_BATCH_SIZE: usize = 10_000_000;
pub const DEFAULT_PREFIX: &str = "https://google.com/";

// past this we only warn, nothing stops a caller from filling the disk
const LARGE_SIZE_GB: f64 = 100.0;

/// Shape of the generated data.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum Distribution {
    /// Fresh random strings with heavily skewed repetition counts.
    #[default]
    Skewed,
    /// Fixed URL pools sampled uniformly, as one repeated value, or by percentage weights.
    Cases,
}

#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    pub output_path: PathBuf,
    /// Target data file size in GB, checked at batch boundaries.
    pub size: f64,
    /// Number of entries written to the answer file.
    pub n: usize,
    pub batch_size: usize,
    pub prefix: String,
    pub seed: Option<u64>,
    pub distribution: Distribution,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        GeneratorConfig {
            output_path: PathBuf::from("./data/"),
            size: 1.0,
            n: 100,
            batch_size: DEFAULT_BATCH_SIZE,
            prefix: DEFAULT_PREFIX.to_string(),
            seed: None,
            distribution: Distribution::Skewed,
        }
    }
}

impl GeneratorConfig {
    pub fn validate(&self) -> Result<()> {
        ensure!(self.size.is_finite(), "size must be a finite number, got {}", self.size);
        ensure!(self.size >= 0.0, "size must not be negative, got {}", self.size);
        ensure!(self.batch_size > 0, "batch size must be at least 1");
        ensure!(!self.prefix.is_empty(), "string prefix must not be empty");
        ensure!(
            !self.prefix.contains('\n'),
            "string prefix must not contain a newline"
        );
        if self.size > LARGE_SIZE_GB {
            warn!(size = self.size, "requested data file is very large, make sure the disk can hold it");
        }
        Ok(())
    }

    /// Creates the output directory if it is missing.
    pub fn prepare_output_dir(&self) -> Result<()> {
        std::fs::create_dir_all(&self.output_path)
            .with_context(|| format!("cannot create output directory {}", self.output_path.display()))
    }

    // `--size 1` renders as `1`, not `1.0`
    pub fn data_file(&self) -> PathBuf {
        self.output_path.join(format!("data_{}g.txt", self.size))
    }

    pub fn answer_file(&self) -> PathBuf {
        self.output_path.join(format!("ans_{}g.txt", self.size))
    }
}

/// Size of `path` in GB, rounded to two decimal places.
pub fn file_size_gb(path: &Path) -> Result<f64> {
    let bytes = std::fs::metadata(path)
        .with_context(|| format!("cannot stat {}", path.display()))?
        .len();
    Ok(bytes_to_gb(bytes))
}

pub fn bytes_to_gb(bytes: u64) -> f64 {
    let gb = bytes as f64 / (1024 * 1024 * 1024) as f64;
    (gb * 100.0).round() / 100.0
}
