//! Simple-8b word packing
//!
//! Each 64-bit word holds a 4-bit selector and 60 payload bits. The selector
//! picks how many equally sized integers share the payload, from 240 zeros
//! down to a single 60-bit value. Words are written big-endian.

use super::IntegerCodec;
use crate::{Result, TsError};
use bytes::{Buf, BufMut, BytesMut};

/// Largest value a word can hold
pub const MAX_VALUE: u64 = (1 << 60) - 1;

/// (values per word, bits per value), indexed by selector
const SELECTORS: [(usize, u32); 16] = [
    (240, 0),
    (120, 0),
    (60, 1),
    (30, 2),
    (20, 3),
    (15, 4),
    (12, 5),
    (10, 6),
    (8, 7),
    (7, 8),
    (6, 10),
    (5, 12),
    (4, 15),
    (3, 20),
    (2, 30),
    (1, 60),
];

/// Simple-8b integer codec
#[derive(Debug, Clone, Copy, Default)]
pub struct Simple8b;

impl Simple8b {
    /// Pack values into selector words
    pub fn pack(values: &[u64]) -> Result<Vec<u64>> {
        let mut words = Vec::with_capacity(values.len() / 4 + 1);
        let mut rest = values;

        while !rest.is_empty() {
            let (selector, n) = select(rest)?;
            words.push(pack_word(selector, &rest[..n]));
            rest = &rest[n..];
        }

        Ok(words)
    }

    /// Expand selector words back into values
    pub fn unpack(words: &[u64]) -> Vec<u64> {
        let mut values = Vec::with_capacity(words.len() * 4);

        for &word in words {
            let (n, bits) = SELECTORS[(word >> 60) as usize];
            if bits == 0 {
                values.extend(std::iter::repeat(0).take(n));
                continue;
            }
            let mask = (1u64 << bits) - 1;
            values.extend((0..n).map(|j| (word >> (j as u32 * bits)) & mask));
        }

        values
    }
}

/// Densest selector whose group fits the next values
fn select(rest: &[u64]) -> Result<(usize, usize)> {
    for (selector, &(n, bits)) in SELECTORS.iter().enumerate() {
        if rest.len() < n {
            continue;
        }
        let limit = if bits == 0 { 0 } else { (1u64 << bits) - 1 };
        if rest[..n].iter().all(|&v| v <= limit) {
            return Ok((selector, n));
        }
    }

    Err(TsError::codec(format!(
        "value {} exceeds the simple-8b limit of {}",
        rest[0], MAX_VALUE
    )))
}

fn pack_word(selector: usize, group: &[u64]) -> u64 {
    let (_, bits) = SELECTORS[selector];
    group
        .iter()
        .enumerate()
        .fold((selector as u64) << 60, |word, (j, &v)| {
            if bits == 0 {
                word
            } else {
                word | (v << (j as u32 * bits))
            }
        })
}

impl IntegerCodec for Simple8b {
    fn name(&self) -> &'static str {
        "simple-8b"
    }

    fn encode(&self, values: &[u64]) -> Result<Vec<u8>> {
        let words = Self::pack(values)?;
        let mut buf = BytesMut::with_capacity(words.len() * 8);
        for word in words {
            buf.put_u64(word);
        }
        Ok(buf.to_vec())
    }

    fn decode(&self, data: &[u8]) -> Result<Vec<u64>> {
        if data.len() % 8 != 0 {
            return Err(TsError::codec(format!(
                "simple-8b data length {} is not a multiple of 8",
                data.len()
            )));
        }

        let mut cursor = data;
        let mut words = Vec::with_capacity(data.len() / 8);
        while cursor.has_remaining() {
            words.push(cursor.get_u64());
        }
        Ok(Self::unpack(&words))
    }
}
