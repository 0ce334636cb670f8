//! Core types for tscompress

use crate::{Result, TsError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Timestamp in milliseconds since Unix epoch
pub type Timestamp = i64;

/// Fixed-point scale applied to sample values
pub const MILLI_SCALE: f64 = 1000.0;

/// A single measurement
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// Timestamp in milliseconds
    pub timestamp: Timestamp,
    /// Measured value
    pub value: f32,
}

impl Sample {
    /// Create a new sample
    pub fn new(timestamp: Timestamp, value: f32) -> Self {
        Self { timestamp, value }
    }

    /// Build a sample from a fixed-point milli-value
    pub fn from_milli(timestamp: Timestamp, value_milli: i64) -> Self {
        Self {
            timestamp,
            value: (value_milli as f64 / MILLI_SCALE) as f32,
        }
    }

    /// Value as an integer count of thousandths, rounded half away from zero
    pub fn value_milli(&self) -> i64 {
        (f64::from(self.value) * MILLI_SCALE).round() as i64
    }

    /// Equality at millisecond / milli-unit precision
    pub fn milli_eq(&self, other: &Sample) -> bool {
        self.timestamp == other.timestamp && self.value_milli() == other.value_milli()
    }
}

impl fmt::Display for Sample {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({} ms, {})", self.timestamp, self.value)
    }
}

/// Equality used by every round-trip check.
///
/// Two absent samples are equal; a present and an absent sample never are.
pub fn equal_at_milli(a: Option<&Sample>, b: Option<&Sample>) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(a), Some(b)) => a.milli_eq(b),
        _ => false,
    }
}

/// Ordered, non-empty sequence of samples
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    samples: Vec<Sample>,
}

impl Series {
    /// Create a series, rejecting empty input
    pub fn new(samples: Vec<Sample>) -> Result<Self> {
        if samples.is_empty() {
            return Err(TsError::format("series must contain at least one sample"));
        }
        Ok(Self { samples })
    }

    /// Number of samples
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Always false: a series holds at least one sample
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// First sample
    pub fn first(&self) -> &Sample {
        &self.samples[0]
    }

    /// Samples in order
    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    /// Iterate over samples
    pub fn iter(&self) -> impl Iterator<Item = &Sample> {
        self.samples.iter()
    }

    /// Consume the series
    pub fn into_samples(self) -> Vec<Sample> {
        self.samples
    }

    /// Equal length and pairwise [`Sample::milli_eq`]
    pub fn milli_eq(&self, other: &Series) -> bool {
        self.first_mismatch(other).is_none()
    }

    /// Index of the first sample that differs at milli precision.
    ///
    /// When one series is a prefix of the other the shorter length is
    /// returned.
    pub fn first_mismatch(&self, other: &Series) -> Option<usize> {
        let longest = self.len().max(other.len());
        (0..longest).find(|&i| !equal_at_milli(self.samples.get(i), other.samples.get(i)))
    }

    /// First and last timestamps
    pub fn time_range(&self) -> TimeRange {
        let last = self.samples[self.samples.len() - 1].timestamp;
        TimeRange::new(self.first().timestamp, last)
    }
}

impl<'a> IntoIterator for &'a Series {
    type Item = &'a Sample;
    type IntoIter = std::slice::Iter<'a, Sample>;

    fn into_iter(self) -> Self::IntoIter {
        self.samples.iter()
    }
}

/// Time span covered by a series
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRange {
    /// Start timestamp (inclusive)
    pub start: Timestamp,
    /// End timestamp (inclusive)
    pub end: Timestamp,
}

impl TimeRange {
    /// Create a new time range
    pub fn new(start: Timestamp, end: Timestamp) -> Self {
        Self { start, end }
    }

    /// Check if a timestamp is within the range
    pub fn contains(&self, ts: Timestamp) -> bool {
        ts >= self.start && ts <= self.end
    }

    /// Duration in milliseconds
    pub fn duration(&self) -> i64 {
        self.end - self.start
    }
}
