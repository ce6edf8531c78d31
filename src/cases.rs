//! Fixed-pool data shapes for exercising top-K solvers on degenerate inputs.
//!
//! Each [`Case`] owns a pool of URL-like strings built once per run and a rule
//! for picking from it: uniformly, always the first entry, or by percentage
//! weights. A batch gives every case an equal share of its lines.

use crate::batch::Batch;
use ahash::{HashMap, HashMapExt};
use anyhow::{Result, ensure};
use rand::{
    Rng,
    distr::{Distribution as _, weighted::WeightedIndex},
};

const PATH_SEGMENTS: [&str; 3] = ["issues/", "pull/", ""];

pub const UNIFORM_CARDINALITIES: [usize; 4] = [1, 100, 10_000, 1_000_000];
pub const SINGLE_CARDINALITIES: [usize; 2] = [10, 100];

const DECAY: &[f64] = &[0.9, 0.09, 0.009, 0.0009, 0.00009, 0.000009];
const PERCENT_CASES: [(usize, &[f64]); 5] = [
    (11, DECAY),
    (10_000, DECAY),
    (100_000, DECAY),
    (10_000, &[0.5, 0.4]),
    (10_000, &[0.3, 0.3, 0.3]),
];

#[derive(Debug, Clone)]
enum Pick {
    Uniform,
    Single,
    Weighted(WeightedIndex<f64>),
}

#[derive(Debug, Clone)]
pub struct Case {
    name: String,
    pool: Vec<Box<str>>,
    pick: Pick,
}

/// `cardinality` distinct strings `<prefix><segment><i>`, the segment chosen at random.
pub fn url_pool<R: Rng + ?Sized>(prefix: &str, cardinality: usize, rng: &mut R) -> Vec<Box<str>> {
    (0..cardinality)
        .map(|i| {
            let segment = PATH_SEGMENTS[rng.random_range(0..PATH_SEGMENTS.len())];
            format!("{prefix}{segment}{i}").into_boxed_str()
        })
        .collect()
}

impl Case {
    pub fn uniform<R: Rng + ?Sized>(prefix: &str, cardinality: usize, rng: &mut R) -> Result<Case> {
        ensure!(cardinality > 0, "uniform case needs at least one string");
        Ok(Case {
            name: format!("uniform-{cardinality}"),
            pool: url_pool(prefix, cardinality, rng),
            pick: Pick::Uniform,
        })
    }

    /// Always emits the first string of a `cardinality` sized pool.
    pub fn single<R: Rng + ?Sized>(prefix: &str, cardinality: usize, rng: &mut R) -> Result<Case> {
        ensure!(cardinality > 0, "single case needs at least one string");
        Ok(Case {
            name: format!("single-{cardinality}"),
            pool: url_pool(prefix, cardinality, rng),
            pick: Pick::Single,
        })
    }

    /// The first strings take the `head` shares, the remaining probability is
    /// split evenly over the rest of the `len` strings.
    pub fn percent<R: Rng + ?Sized>(prefix: &str, len: usize, head: &[f64], rng: &mut R) -> Result<Case> {
        let sum = head.iter().sum::<f64>();
        ensure!(
            head.iter().all(|p| p.is_finite() && *p >= 0.0),
            "percentages must be non-negative, got {head:?}"
        );
        ensure!(sum <= 1.0, "percentages add up to {sum}, more than 1");
        ensure!(head.len() <= len, "{} percentages for only {len} strings", head.len());
        ensure!(sum > 0.0 || head.len() < len, "percent case has no weight left");

        let rest = len - head.len();
        let mut weights = head.to_vec();
        if rest > 0 {
            weights.extend(std::iter::repeat_n((1.0 - sum).max(0.0) / rest as f64, rest));
        }
        Ok(Case {
            name: format!("percent-{len}-{}", head.len()),
            pool: url_pool(prefix, len, rng),
            pick: Pick::Weighted(WeightedIndex::new(&weights)?),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn pool(&self) -> &[Box<str>] {
        &self.pool
    }

    fn pick<R: Rng + ?Sized>(&self, rng: &mut R) -> usize {
        match &self.pick {
            Pick::Uniform => rng.random_range(0..self.pool.len()),
            Pick::Single => 0,
            Pick::Weighted(weights) => weights.sample(rng),
        }
    }
}

/// Uniform, single-value and percent-skew cases, eleven in total.
pub fn standard_cases<R: Rng + ?Sized>(prefix: &str, rng: &mut R) -> Result<Vec<Case>> {
    let mut cases = Vec::new();
    for cardinality in UNIFORM_CARDINALITIES {
        cases.push(Case::uniform(prefix, cardinality, rng)?);
    }
    for cardinality in SINGLE_CARDINALITIES {
        cases.push(Case::single(prefix, cardinality, rng)?);
    }
    for (len, head) in PERCENT_CASES {
        cases.push(Case::percent(prefix, len, head, rng)?);
    }
    Ok(cases)
}

impl Batch {
    /// Draws `ceil(min_entries / cases)` lines from every case, case after case.
    pub fn sample<R: Rng + ?Sized>(cases: &[Case], min_entries: usize, rng: &mut R) -> Batch {
        if cases.is_empty() {
            return Batch::from_parts(Vec::new(), Vec::new());
        }
        let share = min_entries.div_ceil(cases.len());
        let mut groups: Vec<(Box<str>, u32)> = Vec::new();
        let mut seen = HashMap::<(usize, usize), u32>::new();
        let mut order = Vec::with_capacity(share * cases.len());
        for (case_index, case) in cases.iter().enumerate() {
            for _ in 0..share {
                let pick = case.pick(rng);
                let group = *seen.entry((case_index, pick)).or_insert_with(|| {
                    groups.push((case.pool[pick].clone(), 0));
                    (groups.len() - 1) as u32
                });
                groups[group as usize].1 += 1;
                order.push(group);
            }
        }
        Batch::from_parts(groups, order)
    }
}
