use crate::{
    answer::write_answer,
    batch::{Batch, UrlGenerator},
    cases::{Case, standard_cases},
    config::{Distribution, GeneratorConfig, file_size_gb},
    frequency::FrequencyTable,
};
use anyhow::{Context, Result};
use rand::{SeedableRng, prelude::StdRng};
use std::{
    fs::{File, OpenOptions},
    io::{BufWriter, Write},
    path::{Path, PathBuf},
    time::Instant,
};
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq)]
pub struct GenerationReport {
    pub data_file: PathBuf,
    pub answer_file: PathBuf,
    pub batches: usize,
    pub lines: u64,
    pub bytes: u64,
    pub distinct: usize,
    pub answer_lines: usize,
    /// Final data file size in GB, rounded like the loop condition.
    pub size_gb: f64,
}

/// Owns the RNG for one generator invocation.
pub struct DatasetGenerator {
    config: GeneratorConfig,
    rng: StdRng,
}

impl DatasetGenerator {
    pub fn new(config: GeneratorConfig) -> Result<Self> {
        config.validate()?;
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Ok(DatasetGenerator { config, rng })
    }

    /// Fills the data file until it reaches the configured size and writes the answer file.
    pub fn run(mut self) -> Result<GenerationReport> {
        self.config.prepare_output_dir()?;
        let data_file = self.config.data_file();
        let answer_file = self.config.answer_file();

        let (table, stats) = self.fill(&data_file)?;
        let size_gb = file_size_gb(&data_file)?;

        let top = table.top_n(self.config.n);
        let answer_lines = write_answer(&answer_file, top)?;
        info!(path = %answer_file.display(), lines = answer_lines, "answer written");

        Ok(GenerationReport {
            data_file,
            answer_file,
            batches: stats.batches,
            lines: stats.lines,
            bytes: stats.bytes,
            distinct: table.len(),
            answer_lines,
            size_gb,
        })
    }

    /// Generation phase. The data file handle lives only inside this call.
    fn fill(&mut self, data_file: &Path) -> Result<(FrequencyTable, FillStats)> {
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(data_file)
            .with_context(|| format!("cannot open data file {}", data_file.display()))?;
        let mut writer = BufWriter::with_capacity(1 << 20, file);

        let source = match self.config.distribution {
            Distribution::Skewed => Source::Skewed(UrlGenerator::new(&self.config.prefix)),
            Distribution::Cases => {
                let cases = standard_cases(&self.config.prefix, &mut self.rng)?;
                debug!(cases = ?cases.iter().map(Case::name).collect::<Vec<_>>(), "case pools ready");
                Source::Cases(cases)
            }
        };
        let mut table = FrequencyTable::new();
        let mut stats = FillStats::default();

        // one batch always goes out before the size is looked at
        loop {
            let start = Instant::now();
            let mut batch = match &source {
                Source::Skewed(generator) => Batch::generate(generator, self.config.batch_size, &mut self.rng),
                Source::Cases(cases) => Batch::sample(cases, self.config.batch_size, &mut self.rng),
            };
            table.merge_batch(&batch);
            batch.shuffle(&mut self.rng);
            let bytes = write_batch(&mut writer, &batch, data_file)?;

            stats.batches += 1;
            stats.lines += batch.len() as u64;
            stats.bytes += bytes;

            let size = file_size_gb(data_file)?;
            info!(
                batch = stats.batches,
                lines = batch.len(),
                distinct = table.len(),
                size_gb = size,
                "batch written"
            );
            debug!(elapsed = ?start.elapsed(), bytes, "batch timing");
            if size >= self.config.size {
                break;
            }
        }
        Ok((table, stats))
    }
}

enum Source<'a> {
    Skewed(UrlGenerator<'a>),
    Cases(Vec<Case>),
}

#[derive(Debug, Default)]
struct FillStats {
    batches: usize,
    lines: u64,
    bytes: u64,
}

fn write_batch(writer: &mut BufWriter<File>, batch: &Batch, path: &Path) -> Result<u64> {
    let bytes = batch
        .write_to(writer)
        .and_then(|bytes| writer.flush().map(|_| bytes))
        .with_context(|| format!("cannot write data file {}", path.display()))?;
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::answer::{parse_answer, read_answer};

    fn small(dir: &Path, seed: u64) -> GeneratorConfig {
        GeneratorConfig {
            output_path: dir.to_path_buf(),
            size: 0.0,
            n: 5,
            batch_size: 20_000,
            seed: Some(seed),
            ..Default::default()
        }
    }

    #[test]
    fn zero_size_writes_one_batch() {
        let dir = tempfile::tempdir().unwrap();
        let report = DatasetGenerator::new(small(dir.path(), 1)).unwrap().run().unwrap();
        assert_eq!(report.batches, 1);
        assert!(report.lines >= 20_000);
        assert_eq!(std::fs::metadata(&report.data_file).unwrap().len(), report.bytes);
        assert_eq!(report.answer_lines, 5usize.min(report.distinct));
    }

    #[test]
    fn answer_is_sorted() {
        let dir = tempfile::tempdir().unwrap();
        let report = DatasetGenerator::new(small(dir.path(), 2)).unwrap().run().unwrap();
        let content = read_answer(&report.answer_file).unwrap();
        let answer = parse_answer(&content).unwrap();
        assert!(answer.len() <= 5);
        assert!(answer.windows(2).all(|pair| pair[0].1 >= pair[1].1));
    }

    #[test]
    fn same_seed_same_output() {
        let first = tempfile::tempdir().unwrap();
        let second = tempfile::tempdir().unwrap();
        let a = DatasetGenerator::new(small(first.path(), 9)).unwrap().run().unwrap();
        let b = DatasetGenerator::new(small(second.path(), 9)).unwrap().run().unwrap();
        assert_eq!(
            std::fs::read(&a.data_file).unwrap(),
            std::fs::read(&b.data_file).unwrap()
        );
        assert_eq!(
            std::fs::read(&a.answer_file).unwrap(),
            std::fs::read(&b.answer_file).unwrap()
        );
    }

    #[test]
    fn rerun_truncates_data_file() {
        let dir = tempfile::tempdir().unwrap();
        let first = DatasetGenerator::new(small(dir.path(), 4)).unwrap().run().unwrap();
        let second = DatasetGenerator::new(small(dir.path(), 5)).unwrap().run().unwrap();
        assert_eq!(first.data_file, second.data_file);
        assert_eq!(std::fs::metadata(&second.data_file).unwrap().len(), second.bytes);
    }

    #[test]
    fn cases_feed_the_same_answer() {
        let dir = tempfile::tempdir().unwrap();
        let config = GeneratorConfig {
            distribution: Distribution::Cases,
            batch_size: 22_000,
            n: 3,
            ..small(dir.path(), 6)
        };
        let report = DatasetGenerator::new(config).unwrap().run().unwrap();
        assert_eq!(report.batches, 1);
        assert_eq!(report.lines, 22_000);

        let data = std::fs::read_to_string(&report.data_file).unwrap();
        let table = data.lines().collect::<FrequencyTable>();
        let content = read_answer(&report.answer_file).unwrap();
        let answer = parse_answer(&content).unwrap();
        assert_eq!(answer, table.top_n(3));
        // the uniform-1 and single cases each put 2000 lines on one string
        assert!(answer[0].1 >= 2000);
    }

    #[test]
    fn invalid_config_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let config = GeneratorConfig {
            size: -2.0,
            ..small(dir.path(), 0)
        };
        assert!(DatasetGenerator::new(config).is_err());
    }
}
