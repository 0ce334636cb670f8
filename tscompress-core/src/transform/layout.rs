//! Flat unsigned layouts of a delta series

use super::delta::{DeltaSeries, FixedPoint};
use super::zigzag::{zigzag_decode, zigzag_encode};
use crate::{Result, TsError};
use serde::{Deserialize, Serialize};

/// Ordering of the time and value streams in a flat sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Layout {
    /// `[t0, v0, t1, v1, ...]`
    Interleaved,
    /// `[t0, t1, ..., v0, v1, ...]`
    #[default]
    Split,
}

impl Layout {
    /// Layout selected by an interleave flag
    pub fn from_interleave(interleave: bool) -> Self {
        if interleave {
            Layout::Interleaved
        } else {
            Layout::Split
        }
    }

    /// Check if interleaved
    pub fn is_interleaved(&self) -> bool {
        matches!(self, Layout::Interleaved)
    }
}

// Times go through a two's-complement cast, so a negative delta from an
// out-of-order series still comes back unchanged.
#[inline]
fn pack(point: &FixedPoint) -> (u64, u64) {
    (point.time as u64, zigzag_encode(point.value))
}

#[inline]
fn unpack(time: u64, value: u64) -> FixedPoint {
    FixedPoint::new(time as i64, zigzag_decode(value))
}

/// Flatten a delta series into one unsigned sequence
pub fn flatten(deltas: &DeltaSeries, layout: Layout) -> Vec<u64> {
    let n = deltas.len();
    let mut flat = vec![0u64; n * 2];

    for (i, point) in deltas.iter().enumerate() {
        let (time, value) = pack(point);
        match layout {
            Layout::Interleaved => {
                flat[i * 2] = time;
                flat[i * 2 + 1] = value;
            }
            Layout::Split => {
                flat[i] = time;
                flat[i + n] = value;
            }
        }
    }

    flat
}

/// Inverse of [`flatten`]
pub fn unflatten(flat: &[u64], layout: Layout) -> Result<DeltaSeries> {
    if flat.len() % 2 != 0 {
        return Err(TsError::format(format!(
            "flat sequence has odd length {}",
            flat.len()
        )));
    }

    let points: DeltaSeries = match layout {
        Layout::Interleaved => flat
            .chunks_exact(2)
            .map(|pair| unpack(pair[0], pair[1]))
            .collect(),
        Layout::Split => {
            let (times, values) = flat.split_at(flat.len() / 2);
            times
                .iter()
                .zip(values)
                .map(|(&t, &v)| unpack(t, v))
                .collect()
        }
    };

    Ok(points)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::{delta_decode, delta_encode};
    use crate::{Sample, Series};
    use proptest::prelude::*;

    fn three_points(a: f32, b: f32, c: f32) -> Series {
        Series::new(vec![
            Sample::new(1_000, a),
            Sample::new(2_000, b),
            Sample::new(3_000, c),
        ])
        .unwrap()
    }

    #[test]
    fn test_interleaved_absolute() {
        let s = three_points(40.0, 50.0, 60.0);
        let flat = flatten(&delta_encode(&s, false, false), Layout::Interleaved);
        assert_eq!(
            flat,
            vec![
                1_000,
                zigzag_encode(40_000),
                2_000,
                zigzag_encode(50_000),
                3_000,
                zigzag_encode(60_000),
            ]
        );
    }

    #[test]
    fn test_split_absolute() {
        let s = three_points(10.0, 20.0, 30.0);
        let flat = flatten(&delta_encode(&s, false, false), Layout::Split);
        assert_eq!(
            flat,
            vec![
                1_000,
                2_000,
                3_000,
                zigzag_encode(10_000),
                zigzag_encode(20_000),
                zigzag_encode(30_000),
            ]
        );
    }

    #[test]
    fn test_interleaved_delta_scenario() {
        let s = three_points(40.0, 50.0, 60.0);
        let flat = flatten(&delta_encode(&s, true, true), Layout::Interleaved);
        assert_eq!(
            flat,
            vec![
                1_000,
                zigzag_encode(40_000),
                1_000,
                zigzag_encode(10_000),
                1_000,
                zigzag_encode(10_000),
            ]
        );

        let restored = delta_decode(&unflatten(&flat, Layout::Interleaved).unwrap(), true, true)
            .unwrap();
        assert!(restored.milli_eq(&s));
        assert_eq!(restored.samples()[2], Sample::new(3_000, 60.0));
    }

    #[test]
    fn test_negative_deltas_survive() {
        let deltas = DeltaSeries::new(vec![
            FixedPoint::new(5_000, -3),
            FixedPoint::new(-250, -17_000),
            FixedPoint::new(i64::MIN, i64::MAX),
        ]);
        for layout in [Layout::Interleaved, Layout::Split] {
            assert_eq!(unflatten(&flatten(&deltas, layout), layout).unwrap(), deltas);
        }
    }

    #[test]
    fn test_unflatten_odd_length_fails() {
        let err = unflatten(&[1, 2, 3], Layout::Split).unwrap_err();
        assert!(err.is_format());
    }

    #[test]
    fn test_layout_from_flag() {
        assert_eq!(Layout::from_interleave(true), Layout::Interleaved);
        assert_eq!(Layout::from_interleave(false), Layout::Split);
        assert!(!Layout::default().is_interleaved());
    }

    proptest! {
        #[test]
        fn prop_unflatten_inverts_flatten(
            points in prop::collection::vec((any::<i64>(), any::<i64>()), 0..200),
            interleave in any::<bool>(),
        ) {
            let deltas: DeltaSeries = points
                .into_iter()
                .map(|(t, v)| FixedPoint::new(t, v))
                .collect();
            let layout = Layout::from_interleave(interleave);
            prop_assert_eq!(unflatten(&flatten(&deltas, layout), layout).unwrap(), deltas);
        }
    }
}
