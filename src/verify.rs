use crate::{
    answer::{parse_answer, read_answer},
    frequency::{FrequencyTable, rank},
};
use anyhow::{Context, Result, bail, ensure};
use rayon::prelude::*;
use std::{cmp::Ordering, path::Path};
use tracing::info;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifyReport {
    pub lines: u64,
    pub distinct: usize,
    pub answer_lines: usize,
}

/// Counts every line of `content` on all cores.
pub fn count_lines(content: &str) -> FrequencyTable {
    let lines = content.lines().collect::<Vec<_>>();
    let cpus = num_cpus::get().max(1);
    let chunk = lines.len().div_ceil(cpus).max(1);
    lines
        .par_chunks(chunk)
        .map(|chunk| chunk.iter().collect::<FrequencyTable>())
        .reduce(FrequencyTable::new, |mut left, right| {
            left.merge(right);
            left
        })
}

/// Recounts the data file and checks that the answer file is exactly its top `n`.
pub fn verify(data_file: &Path, answer_file: &Path, n: usize) -> Result<VerifyReport> {
    let content =
        std::fs::read_to_string(data_file).with_context(|| format!("cannot read data file {}", data_file.display()))?;
    let table = count_lines(&content);
    let answer = read_answer(answer_file)?;
    let answer = parse_answer(&answer)?;
    check_top_n(&table, &answer, n)?;

    let report = VerifyReport {
        lines: table.total(),
        distinct: table.len(),
        answer_lines: answer.len(),
    };
    info!(lines = report.lines, distinct = report.distinct, "answer matches data file");
    Ok(report)
}

pub fn check_top_n(table: &FrequencyTable, answer: &[(&str, u64)], n: usize) -> Result<()> {
    let expected_len = n.min(table.len());
    ensure!(
        answer.len() == expected_len,
        "answer has {} lines, expected {expected_len}",
        answer.len()
    );
    for (index, pair) in answer.windows(2).enumerate() {
        if rank(&pair[0], &pair[1]) != Ordering::Less {
            bail!(
                "answer line {} ({}: {}) is out of order after ({}: {})",
                index + 2,
                pair[1].0,
                pair[1].1,
                pair[0].0,
                pair[0].1
            );
        }
    }
    for (index, &(value, count)) in answer.iter().enumerate() {
        match table.get(value) {
            Some(actual) if actual == count => {}
            Some(actual) => bail!("answer line {}: {value} counted {count}, data file has {actual}", index + 1),
            None => bail!("answer line {}: {value} never appears in the data file", index + 1),
        }
    }
    let expected = table.top_n(n);
    if let Some(index) = expected.iter().zip(answer).position(|(left, right)| left != right) {
        bail!(
            "answer line {} is {}: {}, expected {}: {}",
            index + 1,
            answer[index].0,
            answer[index].1,
            expected[index].0,
            expected[index].1
        );
    }
    Ok(())
}
