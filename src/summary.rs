//! Per-station running aggregates.

use std::{
    hash::BuildHasherDefault,
    io::{self, Write},
};

use hashbrown::HashMap;
use rustc_hash::FxHasher;

use crate::parse::Measurement;

type FxBuildHasher = BuildHasherDefault<FxHasher>;

/// Running min/max/total/count for one station.
///
/// Starts from the first observed value, never from a sentinel, so `count` is
/// at least one for every reducer that exists.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stat<V: Measurement> {
    pub min: V,
    pub max: V,
    pub total: V::Total,
    pub count: u64,
}

impl<V: Measurement> Stat<V> {
    #[inline]
    pub fn new(value: V) -> Self {
        Stat {
            min: value,
            max: value,
            total: value.to_total(),
            count: 1,
        }
    }

    #[inline]
    pub fn add(&mut self, value: V) {
        if value < self.min {
            self.min = value;
        }
        if value > self.max {
            self.max = value;
        }
        self.total += value.to_total();
        self.count += 1;
    }

    /// Folds another partial aggregate for the same station into this one.
    #[inline]
    pub fn merge(&mut self, other: &Stat<V>) {
        if other.min < self.min {
            self.min = other.min;
        }
        if other.max > self.max {
            self.max = other.max;
        }
        self.total += other.total;
        self.count += other.count;
    }

    pub fn mean(&self) -> f64 {
        V::mean(self.total, self.count)
    }
}

/// The finished figures for one station, in measurement units.
#[derive(Debug, Clone, PartialEq)]
pub struct StationSummary<'a> {
    pub name: &'a [u8],
    pub min: f64,
    pub max: f64,
    pub mean: f64,
}

impl StationSummary<'_> {
    pub fn write_to<W: Write>(&self, out: &mut W) -> io::Result<()> {
        out.write_all(self.name)?;
        writeln!(out)?;
        writeln!(out, "\tmin: {:.6}", positive_zero(self.min))?;
        writeln!(out, "\tmax: {:.6}", positive_zero(self.max))?;
        writeln!(out, "\tmean: {:.6}", positive_zero(self.mean))
    }
}

/// Turns `-0.0` into `0.0` so a zero never prints with a sign.
#[inline]
fn positive_zero(x: f64) -> f64 {
    x + 0.0
}

/// Station name to reducer.
///
/// Names are copied into owned storage the first time they are seen, so the
/// caller can reuse its line buffer. Later lookups for a known name borrow the
/// caller's bytes and allocate nothing.
#[derive(Debug, Clone)]
pub struct StationTable<V: Measurement> {
    stats: HashMap<Box<[u8]>, Stat<V>, FxBuildHasher>,
}

impl<V: Measurement> Default for StationTable<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: Measurement> StationTable<V> {
    pub fn new() -> Self {
        Self::with_capacity(1024)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        StationTable {
            stats: HashMap::with_capacity_and_hasher(capacity, Default::default()),
        }
    }

    /// Records one measurement, mutating the existing reducer in place.
    #[inline]
    pub fn update(&mut self, name: &[u8], value: V) {
        self.stats
            .entry_ref(name)
            .and_modify(|stat| stat.add(value))
            .or_insert_with(|| Stat::new(value));
    }

    /// Records one measurement by copying the reducer out, updating the copy
    /// and storing it back. Same result as [`StationTable::update`] at the
    /// cost of a second lookup.
    pub fn update_by_copy(&mut self, name: &[u8], value: V) {
        match self.stats.get(name).copied() {
            Some(mut stat) => {
                stat.add(value);
                if let Some(slot) = self.stats.get_mut(name) {
                    *slot = stat;
                }
            }
            None => {
                self.stats.insert(name.into(), Stat::new(value));
            }
        }
    }

    /// Combines a table built from another part of the input into this one.
    pub fn merge(&mut self, other: StationTable<V>) {
        for (name, partial) in other.stats {
            self.stats
                .entry(name)
                .and_modify(|stat| stat.merge(&partial))
                .or_insert(partial);
        }
    }

    pub fn get(&self, name: &[u8]) -> Option<&Stat<V>> {
        self.stats.get(name)
    }

    pub fn len(&self) -> usize {
        self.stats.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stats.is_empty()
    }

    /// Summaries for every station, ascending by name bytes.
    pub fn summaries(&self) -> Vec<StationSummary<'_>> {
        let mut summaries: Vec<StationSummary> = self
            .stats
            .iter()
            .map(|(name, stat)| StationSummary {
                name,
                min: stat.min.to_f64(),
                max: stat.max.to_f64(),
                mean: stat.mean(),
            })
            .collect();
        summaries.sort_unstable_by(|s1, s2| s1.name.cmp(s2.name));
        summaries
    }

    /// Writes the report and consumes the table.
    pub fn render<W: Write>(self, out: &mut W) -> io::Result<()> {
        for summary in self.summaries() {
            summary.write_to(out)?;
        }
        Ok(())
    }
}
