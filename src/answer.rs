use anyhow::{Context, Result, bail};
use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

pub const SEPARATOR: &str = ": ";

/// Overwrites `path` with one `"<value>: <count>"` line per entry.
pub fn write_answer<'a>(path: &Path, entries: impl IntoIterator<Item = (&'a str, u64)>) -> Result<usize> {
    let file = File::create(path).with_context(|| format!("cannot create answer file {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    let mut lines = 0;
    for (value, count) in entries {
        writeln!(writer, "{value}{SEPARATOR}{count}")
            .with_context(|| format!("cannot write answer file {}", path.display()))?;
        lines += 1;
    }
    writer
        .flush()
        .with_context(|| format!("cannot write answer file {}", path.display()))?;
    Ok(lines)
}

/// Parses answer lines. The value may itself contain `": "`, the count is after the last one.
pub fn parse_answer(content: &str) -> Result<Vec<(&str, u64)>> {
    content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.is_empty())
        .map(|(index, line)| {
            let Some((value, count)) = line.rsplit_once(SEPARATOR) else {
                bail!("line {}: missing `{SEPARATOR}` in {line:?}", index + 1);
            };
            let count = count
                .trim()
                .parse::<u64>()
                .with_context(|| format!("line {}: invalid count in {line:?}", index + 1))?;
            Ok((value, count))
        })
        .collect()
}

pub fn read_answer(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("cannot read answer file {}", path.display()))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mismatch {
    /// 1-based line number of the first difference.
    pub line: usize,
    pub expected: Option<String>,
    pub got: Option<String>,
}

/// Compares a solver's output with the reference answer, ignoring leading and trailing whitespace
/// of the whole files.
pub fn check_answer(expected: &str, got: &str) -> Option<Mismatch> {
    let expected = expected.trim();
    let got = got.trim();
    if expected == got {
        return None;
    }
    let mut left = expected.lines();
    let mut right = got.lines();
    let mut line = 1;
    loop {
        match (left.next(), right.next()) {
            (Some(a), Some(b)) if a == b => line += 1,
            (None, None) => {
                // only line endings differ
                return Some(Mismatch { line, expected: None, got: None });
            }
            (a, b) => {
                return Some(Mismatch {
                    line,
                    expected: a.map(str::to_string),
                    got: b.map(str::to_string),
                });
            }
        }
    }
}

pub fn check_answer_files(expected: &Path, got: &Path) -> Result<Option<Mismatch>> {
    let expected = read_answer(expected)?;
    let got = std::fs::read_to_string(got).with_context(|| format!("cannot read result file {}", got.display()))?;
    Ok(check_answer(&expected, &got))
}
