//! Block bit-packing
//!
//! Values are split into blocks of [`BITPACK_BLOCK_LEN`]. Every block stores
//! the bit width of its largest value in 7 bits, then each value at that
//! width. The stream starts with the total value count in 64 bits.

use super::bitstream::{BitReader, BitWriter};
use super::IntegerCodec;
use crate::config::BITPACK_BLOCK_LEN;
use crate::{Result, TsError};

/// Bit-packing integer codec
#[derive(Debug, Clone, Copy, Default)]
pub struct BitPack;

fn bit_width(block: &[u64]) -> u32 {
    let max = block.iter().copied().max().unwrap_or(0);
    64 - max.leading_zeros()
}

impl IntegerCodec for BitPack {
    fn name(&self) -> &'static str {
        "bitpack"
    }

    fn encode(&self, values: &[u64]) -> Result<Vec<u8>> {
        let mut writer = BitWriter::with_capacity(8 + values.len() * 2);
        writer.write_bits(values.len() as u64, 64);

        for block in values.chunks(BITPACK_BLOCK_LEN) {
            let width = bit_width(block);
            writer.write_bits(width as u64, 7);
            for &v in block {
                writer.write_bits(v, width as usize);
            }
        }

        Ok(writer.finish())
    }

    fn decode(&self, data: &[u8]) -> Result<Vec<u64>> {
        let truncated = || TsError::codec("bit-packed stream ended unexpectedly");
        let mut reader = BitReader::new(data);

        let count = reader.read_bits(64).ok_or_else(truncated)? as usize;
        // Every value costs at least the 7-bit block width amortised
        if count / BITPACK_BLOCK_LEN > reader.remaining() / 7 {
            return Err(TsError::codec(format!(
                "bit-packed stream too short for {count} values"
            )));
        }

        let mut values = Vec::with_capacity(count);
        while values.len() < count {
            let width = reader.read_bits(7).ok_or_else(truncated)? as usize;
            if width > 64 {
                return Err(TsError::codec(format!("invalid bit width {width}")));
            }
            let block_len = BITPACK_BLOCK_LEN.min(count - values.len());
            for _ in 0..block_len {
                values.push(reader.read_bits(width).ok_or_else(truncated)?);
            }
        }

        Ok(values)
    }
}
