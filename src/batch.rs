use rand::{
    Rng,
    distr::{Alphanumeric, SampleString},
    seq::SliceRandom,
};
use std::{
    io::{self, Write},
    ops::RangeInclusive,
};

pub const SUFFIX_LEN: RangeInclusive<usize> = 2..=100;

/// One loop iteration worth of strings.
///
/// Every distinct generated value is stored once in `groups` together with how
/// many times it was repeated; `order` lists one group index per output line.
/// Shuffling `order` is equivalent to shuffling the expanded list of strings
/// without keeping millions of copies around.
pub struct Batch {
    groups: Vec<(Box<str>, u32)>,
    order: Vec<u32>,
}

/// Produces URL-like strings and the skewed repetition counts attached to them.
pub struct UrlGenerator<'a> {
    prefix: &'a str,
}

impl<'a> UrlGenerator<'a> {
    pub fn new(prefix: &'a str) -> Self {
        UrlGenerator { prefix }
    }

    pub fn string<R: Rng + ?Sized>(&self, rng: &mut R) -> Box<str> {
        let len = rng.random_range(SUFFIX_LEN);
        let mut out = String::with_capacity(self.prefix.len() + len);
        out.push_str(self.prefix);
        Alphanumeric.append_string(rng, &mut out, len);
        out.into_boxed_str()
    }

    /// `floor(U(0,1) * 10000) + randint(0, 1000) + randint(0, 100)`, heavily right skewed
    /// once summed over a run.
    pub fn repetitions<R: Rng + ?Sized>(&self, rng: &mut R) -> u32 {
        let uniform = (rng.random::<f64>() * 10000.0) as u32;
        uniform + rng.random_range(0..=1000u32) + rng.random_range(0..=100u32)
    }
}

impl Batch {
    /// Generates groups until at least `min_entries` lines are queued. The last
    /// group may overshoot.
    pub fn generate<R: Rng + ?Sized>(generator: &UrlGenerator, min_entries: usize, rng: &mut R) -> Batch {
        let mut groups = Vec::new();
        let mut total = 0usize;
        while total < min_entries {
            let value = generator.string(rng);
            let repeat = generator.repetitions(rng);
            if repeat == 0 {
                continue;
            }
            total += repeat as usize;
            groups.push((value, repeat));
        }
        Batch::expand(groups, total)
    }

    /// Builds a batch from explicit `(value, repetitions)` pairs.
    pub fn from_groups<I, S>(groups: I) -> Batch
    where
        I: IntoIterator<Item = (S, u32)>,
        S: Into<Box<str>>,
    {
        let groups = groups
            .into_iter()
            .filter(|(_, repeat)| *repeat > 0)
            .map(|(value, repeat)| (value.into(), repeat))
            .collect::<Vec<_>>();
        let total = groups.iter().map(|(_, repeat)| *repeat as usize).sum();
        Batch::expand(groups, total)
    }

    /// `order` holds one index into `groups` per line and must agree with the group counts.
    pub(crate) fn from_parts(groups: Vec<(Box<str>, u32)>, order: Vec<u32>) -> Batch {
        Batch { groups, order }
    }

    fn expand(groups: Vec<(Box<str>, u32)>, total: usize) -> Batch {
        let mut order = Vec::with_capacity(total);
        for (index, (_, repeat)) in groups.iter().enumerate() {
            order.extend(std::iter::repeat_n(index as u32, *repeat as usize));
        }
        Batch { groups, order }
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Distinct generated groups. Two groups may hold the same value.
    pub fn groups(&self) -> impl Iterator<Item = (&str, u32)> {
        self.groups.iter().map(|(value, repeat)| (&**value, *repeat))
    }

    pub fn shuffle<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.order.shuffle(rng);
    }

    /// Lines in their current order.
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(|&index| &*self.groups[index as usize].0)
    }

    /// Writes every line followed by `\n`, returning the number of bytes written.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<u64> {
        let mut written = 0u64;
        for line in self.lines() {
            writer.write_all(line.as_bytes())?;
            writer.write_all(b"\n")?;
            written += line.len() as u64 + 1;
        }
        Ok(written)
    }
}
