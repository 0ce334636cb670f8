//! Series-to-integer transforms
//!
//! A series reaches an integer codec in three steps:
//!
//! - **Delta**: every sample after the first becomes the difference from its
//!   predecessor, computed on fixed-point integers
//! - **Zigzag**: signed value deltas are remapped so small magnitudes stay small
//! - **Layout**: time and value streams are flattened interleaved or split
//!
//! Each step has an exact inverse.

mod delta;
mod layout;
mod zigzag;

pub use delta::{delta_decode, delta_encode, DeltaSeries, FixedPoint};
pub use layout::{flatten, unflatten, Layout};
pub use zigzag::{zigzag_decode, zigzag_encode};
