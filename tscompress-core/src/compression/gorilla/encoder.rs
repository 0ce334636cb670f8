//! Gorilla encoder for time-series compression

use super::GorillaBlock;
use crate::compression::bitstream::BitWriter;

/// Largest leading-zero count that fits the 5-bit window field
pub(super) const MAX_LEADING_ZEROS: u32 = 31;

/// Gorilla encoder for time-series data
pub struct GorillaEncoder {
    writer: BitWriter,
    header: u32,
    count: u32,

    // Timestamp state
    prev_offset: i64,
    prev_offset_delta: i64,

    // Value state
    prev_value_bits: u64,
    prev_leading_zeros: u32,
    prev_trailing_zeros: u32,
}

impl GorillaEncoder {
    /// Create an encoder for a block starting at `header` (whole seconds)
    pub fn new(header: u32) -> Self {
        let mut writer = BitWriter::with_capacity(4096);
        writer.write_bits(header as u64, 32);

        Self {
            writer,
            header,
            count: 0,
            prev_offset: 0,
            prev_offset_delta: 0,
            prev_value_bits: 0,
            prev_leading_zeros: u32::MAX,
            prev_trailing_zeros: 0,
        }
    }

    /// Encode a point given as a millisecond offset from the header
    pub fn encode(&mut self, offset: u32, value: f64) {
        if self.count == 0 {
            self.encode_first(offset, value);
        } else {
            self.encode_timestamp(offset as i64);
            self.encode_value(value);
        }
        self.count += 1;
    }

    /// Finish encoding and return compressed block
    pub fn finish(self) -> GorillaBlock {
        GorillaBlock {
            header: self.header,
            count: self.count,
            data: self.writer.finish(),
        }
    }

    fn encode_first(&mut self, offset: u32, value: f64) {
        self.prev_offset = offset as i64;
        self.writer.write_bits(offset as u64, 32);

        let value_bits = value.to_bits();
        self.writer.write_bits(value_bits, 64);
        self.prev_value_bits = value_bits;
    }

    fn encode_timestamp(&mut self, offset: i64) {
        let delta = offset - self.prev_offset;
        let delta_of_delta = delta - self.prev_offset_delta;

        // Regular sampling keeps delta-of-delta at zero, a single bit.
        if delta_of_delta == 0 {
            self.writer.write_bit(false);
        } else if (-63..=64).contains(&delta_of_delta) {
            self.writer.write_bits(0b10, 2);
            self.writer.write_bits((delta_of_delta + 63) as u64, 7);
        } else if (-255..=256).contains(&delta_of_delta) {
            self.writer.write_bits(0b110, 3);
            self.writer.write_bits((delta_of_delta + 255) as u64, 9);
        } else if (-2047..=2048).contains(&delta_of_delta) {
            self.writer.write_bits(0b1110, 4);
            self.writer.write_bits((delta_of_delta + 2047) as u64, 12);
        } else {
            self.writer.write_bits(0b1111, 4);
            self.writer.write_bits(delta_of_delta as u64, 64);
        }

        self.prev_offset_delta = delta;
        self.prev_offset = offset;
    }

    fn encode_value(&mut self, value: f64) {
        let value_bits = value.to_bits();
        let xor = value_bits ^ self.prev_value_bits;

        if xor == 0 {
            self.writer.write_bit(false);
        } else {
            self.writer.write_bit(true);

            let leading_zeros = xor.leading_zeros().min(MAX_LEADING_ZEROS);
            let trailing_zeros = xor.trailing_zeros();

            if leading_zeros >= self.prev_leading_zeros
                && trailing_zeros >= self.prev_trailing_zeros
            {
                // Fits the previous window
                self.writer.write_bit(false);
                let meaningful_bits = 64 - self.prev_leading_zeros - self.prev_trailing_zeros;
                self.writer
                    .write_bits(xor >> self.prev_trailing_zeros, meaningful_bits as usize);
            } else {
                self.writer.write_bit(true);

                // Window length is 1..=64, stored minus one in 6 bits
                let meaningful_bits = 64 - leading_zeros - trailing_zeros;
                self.writer.write_bits(leading_zeros as u64, 5);
                self.writer.write_bits((meaningful_bits - 1) as u64, 6);
                self.writer
                    .write_bits(xor >> trailing_zeros, meaningful_bits as usize);

                self.prev_leading_zeros = leading_zeros;
                self.prev_trailing_zeros = trailing_zeros;
            }
        }

        self.prev_value_bits = value_bits;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encoder_single_point() {
        let mut encoder = GorillaEncoder::new(1_000_000);
        encoder.encode(250, 23.5);
        let block = encoder.finish();

        assert_eq!(block.count, 1);
        assert_eq!(block.header, 1_000_000);
        // header + offset + value
        assert_eq!(block.data.len(), (32 + 32 + 64) / 8);
    }

    #[test]
    fn test_encoder_constant_delta() {
        let mut encoder = GorillaEncoder::new(1_000_000);

        for i in 0..100 {
            encoder.encode(i * 10_000, 23_500.0);
        }

        let block = encoder.finish();
        assert_eq!(block.count, 100);

        // Constant delta and value cost about 2 bits per point
        let bytes_per_point = block.bytes_per_point();
        assert!(
            bytes_per_point < 2.0,
            "Expected < 2 bytes/point for constant data, got {}",
            bytes_per_point
        );
    }

    #[test]
    fn test_encoder_varying_values() {
        let mut encoder = GorillaEncoder::new(0);

        for i in 0..1000u32 {
            let value = (20_000.0 + (i as f64 * 0.1).sin() * 5_000.0).round();
            encoder.encode(i * 1_000, value);
        }

        let block = encoder.finish();
        assert_eq!(block.count, 1000);

        let bytes_per_point = block.bytes_per_point();
        assert!(
            bytes_per_point < 5.0,
            "Expected < 5 bytes/point, got {}",
            bytes_per_point
        );
    }
}
