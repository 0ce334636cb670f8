//! Delta transform over fixed-point samples

use crate::{Result, Sample, Series, Timestamp, TsError};

/// A sample in fixed-point form: milliseconds and milli-units.
///
/// In a [`DeltaSeries`] either field may hold a difference instead of an
/// absolute value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FixedPoint {
    /// Milliseconds (absolute or delta)
    pub time: Timestamp,
    /// Milli-units (absolute or delta)
    pub value: i64,
}

impl FixedPoint {
    /// Create a new fixed-point sample
    pub fn new(time: Timestamp, value: i64) -> Self {
        Self { time, value }
    }

    /// Convert a sample to fixed point
    pub fn from_sample(sample: &Sample) -> Self {
        Self {
            time: sample.timestamp,
            value: sample.value_milli(),
        }
    }

    /// Convert back to a sample
    pub fn to_sample(self) -> Sample {
        Sample::from_milli(self.time, self.value)
    }
}

/// Delta-encoded form of a series.
///
/// Element 0 always holds the absolute first sample.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DeltaSeries {
    points: Vec<FixedPoint>,
}

impl DeltaSeries {
    /// Wrap already delta-encoded points
    pub fn new(points: Vec<FixedPoint>) -> Self {
        Self { points }
    }

    /// Number of points
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Points in order
    pub fn points(&self) -> &[FixedPoint] {
        &self.points
    }

    /// Iterate over points
    pub fn iter(&self) -> impl Iterator<Item = &FixedPoint> {
        self.points.iter()
    }
}

impl FromIterator<FixedPoint> for DeltaSeries {
    fn from_iter<I: IntoIterator<Item = FixedPoint>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// Replace each field after the first by its difference from the predecessor.
///
/// Arithmetic wraps modulo 2^64, so [`delta_decode`] inverts every encoding
/// exactly.
pub fn delta_encode(series: &Series, encode_time: bool, encode_value: bool) -> DeltaSeries {
    let fixed: Vec<FixedPoint> = series.iter().map(FixedPoint::from_sample).collect();

    let mut points = Vec::with_capacity(fixed.len());
    points.push(fixed[0]);
    points.extend(fixed.windows(2).map(|pair| {
        let (prev, cur) = (pair[0], pair[1]);
        FixedPoint {
            time: if encode_time {
                cur.time.wrapping_sub(prev.time)
            } else {
                cur.time
            },
            value: if encode_value {
                cur.value.wrapping_sub(prev.value)
            } else {
                cur.value
            },
        }
    }));

    DeltaSeries::new(points)
}

/// Rebuild absolute samples by accumulating deltas in index order.
///
/// Time deltas are milliseconds, the unit [`delta_encode`] produced.
pub fn delta_decode(deltas: &DeltaSeries, encode_time: bool, encode_value: bool) -> Result<Series> {
    let mut points = deltas.points.iter().copied();
    let first = points
        .next()
        .ok_or_else(|| TsError::format("cannot decode an empty delta series"))?;

    let absolute = points.scan(first, |prev, delta| {
        let point = FixedPoint {
            time: if encode_time {
                prev.time.wrapping_add(delta.time)
            } else {
                delta.time
            },
            value: if encode_value {
                prev.value.wrapping_add(delta.value)
            } else {
                delta.value
            },
        };
        *prev = point;
        Some(point)
    });

    let samples = std::iter::once(first)
        .chain(absolute)
        .map(FixedPoint::to_sample)
        .collect();

    Series::new(samples)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn series(points: &[(i64, f32)]) -> Series {
        Series::new(points.iter().map(|&(t, v)| Sample::new(t, v)).collect()).unwrap()
    }

    #[test]
    fn test_delta_encode_both_fields() {
        let s = series(&[(1_000, 10.0), (1_500, 15.0), (3_000, 25.0), (3_100, 8.0)]);

        let encoded = delta_encode(&s, true, true);
        assert_eq!(
            encoded.points(),
            &[
                FixedPoint::new(1_000, 10_000),
                FixedPoint::new(500, 5_000),
                FixedPoint::new(1_500, 10_000),
                FixedPoint::new(100, -17_000),
            ]
        );
    }

    #[test]
    fn test_delta_encode_single_field() {
        let s = series(&[(1_000, 10.0), (1_500, 15.0), (3_000, 25.0)]);

        let times_only = delta_encode(&s, true, false);
        assert_eq!(
            times_only.points(),
            &[
                FixedPoint::new(1_000, 10_000),
                FixedPoint::new(500, 15_000),
                FixedPoint::new(1_500, 25_000),
            ]
        );

        let values_only = delta_encode(&s, false, true);
        assert_eq!(
            values_only.points(),
            &[
                FixedPoint::new(1_000, 10_000),
                FixedPoint::new(1_500, 5_000),
                FixedPoint::new(3_000, 10_000),
            ]
        );

        let neither = delta_encode(&s, false, false);
        let decoded = delta_decode(&neither, false, false).unwrap();
        assert!(decoded.milli_eq(&s));
    }

    #[test]
    fn test_single_sample_unchanged() {
        let s = series(&[(42, -1.5)]);
        let encoded = delta_encode(&s, true, true);
        assert_eq!(encoded.points(), &[FixedPoint::new(42, -1_500)]);
        assert!(delta_decode(&encoded, true, true).unwrap().milli_eq(&s));
    }

    #[test]
    fn test_decode_irregular_intervals_exact_durations() {
        let s = series(&[
            (1_700_000_000_123, 1.0),
            (1_700_000_000_124, 1.0),
            (1_700_000_003_901, 1.0),
            (1_700_000_003_902, 1.0),
            (1_700_000_250_000, 1.0),
        ]);

        let decoded = delta_decode(&delta_encode(&s, true, false), true, false).unwrap();
        let durations: Vec<i64> = decoded
            .samples()
            .windows(2)
            .map(|pair| pair[1].timestamp - pair[0].timestamp)
            .collect();

        assert_eq!(durations, vec![1, 3_777, 1, 246_098]);
        assert_eq!(decoded.samples()[4].timestamp, 1_700_000_250_000);
    }

    #[test]
    fn test_decode_empty_fails() {
        let err = delta_decode(&DeltaSeries::default(), true, true).unwrap_err();
        assert!(err.is_format());
    }

    prop_compose! {
        fn arb_series()(
            points in prop::collection::vec((0i64..10_000_000_000_000, -100_000i32..100_000), 1..300)
        ) -> Series {
            Series::new(
                points
                    .into_iter()
                    .map(|(t, v)| Sample::new(t, v as f32 / 1000.0))
                    .collect(),
            )
            .unwrap()
        }
    }

    proptest! {
        #[test]
        fn prop_delta_round_trip(s in arb_series(), times in any::<bool>(), values in any::<bool>()) {
            let decoded = delta_decode(&delta_encode(&s, times, values), times, values).unwrap();
            prop_assert_eq!(decoded.len(), s.len());
            prop_assert!(decoded.milli_eq(&s));
        }
    }
}
