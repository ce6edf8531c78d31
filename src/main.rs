use anyhow::{Result, bail};
use clap::Parser;
use std::path::{Path, PathBuf};
use topn_datagen::{
    DatasetGenerator, Distribution, GeneratorConfig,
    answer::check_answer_files,
    config::{DEFAULT_BATCH_SIZE, DEFAULT_PREFIX},
    verify::verify,
};
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(name = "topn-datagen")]
#[command(version)]
#[command(about = "Generate a URL dataset and the reference top-N answer for it")]
struct Args {
    /// Output data path
    #[arg(long = "output_path", default_value = "./data/")]
    output_path: PathBuf,

    /// Size of data [GB]
    #[arg(long, default_value_t = 1.0)]
    size: f64,

    /// Top n answers will be stored
    #[arg(long, default_value_t = 100)]
    n: usize,

    /// Minimum number of lines generated per batch
    #[arg(long = "batch_size", default_value_t = DEFAULT_BATCH_SIZE)]
    batch_size: usize,

    /// Fixed prefix of every generated string
    #[arg(long, default_value = DEFAULT_PREFIX)]
    prefix: String,

    /// Shape of the generated data
    #[arg(long, value_enum, default_value_t = Distribution::Skewed)]
    distribution: Distribution,

    /// Seed for reproducible output
    #[arg(long)]
    seed: Option<u64>,

    /// Recount the data file afterwards and check the answer file against it
    #[arg(long)]
    verify: bool,

    /// Skip generation and compare a top-n result file produced by another program with the answer
    /// file of an earlier run
    #[arg(long, value_name = "FILE")]
    check: Option<PathBuf>,

    #[arg(short, long)]
    verbose: bool,
}

impl From<&Args> for GeneratorConfig {
    fn from(args: &Args) -> Self {
        GeneratorConfig {
            output_path: args.output_path.clone(),
            size: args.size,
            n: args.n,
            batch_size: args.batch_size,
            prefix: args.prefix.clone(),
            seed: args.seed,
            distribution: args.distribution,
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_max_level(if args.verbose { tracing::Level::DEBUG } else { tracing::Level::INFO })
        .with_writer(std::io::stderr)
        .init();

    println!("{args:?}");
    let config = GeneratorConfig::from(&args);
    if let Some(result) = &args.check {
        return check(&config, result);
    }

    let n = config.n;
    let report = DatasetGenerator::new(config)?.run()?;
    info!(
        batches = report.batches,
        lines = report.lines,
        distinct = report.distinct,
        size_gb = report.size_gb,
        "generation finished"
    );

    if args.verify {
        verify(&report.data_file, &report.answer_file, n)?;
    }

    println!("Data generator done.");
    Ok(())
}

/// Compares the answer file of an earlier run with the output of a top-n solver.
fn check(config: &GeneratorConfig, result: &Path) -> Result<()> {
    let answer = config.answer_file();
    if let Some(mismatch) = check_answer_files(&answer, result)? {
        error!(
            line = mismatch.line,
            expected = mismatch.expected.as_deref().unwrap_or("<none>"),
            got = mismatch.got.as_deref().unwrap_or("<none>"),
            "result file differs from answer"
        );
        bail!("{} does not match {}", result.display(), answer.display());
    }
    info!(path = %result.display(), "result file matches answer");
    println!("PASS");
    Ok(())
}
