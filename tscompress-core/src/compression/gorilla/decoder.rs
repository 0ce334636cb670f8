//! Gorilla decoder for time-series decompression

use crate::compression::bitstream::BitReader;
use crate::{Result, TsError};

fn unexpected_end() -> TsError {
    TsError::codec("gorilla stream ended unexpectedly")
}

/// Gorilla decoder for time-series data
pub struct GorillaDecoder<'a> {
    reader: BitReader<'a>,
    header: u32,
    count: usize,
    decoded: usize,

    // Timestamp state
    prev_offset: i64,
    prev_offset_delta: i64,

    // Value state
    prev_value_bits: u64,
    prev_leading_zeros: u32,
    prev_trailing_zeros: u32,
}

impl<'a> GorillaDecoder<'a> {
    /// Create a decoder over a bit stream holding `count` points
    pub fn new(data: &'a [u8], count: usize) -> Result<Self> {
        let mut reader = BitReader::new(data);
        let header = reader.read_bits(32).ok_or_else(unexpected_end)? as u32;

        Ok(Self {
            reader,
            header,
            count,
            decoded: 0,
            prev_offset: 0,
            prev_offset_delta: 0,
            prev_value_bits: 0,
            prev_leading_zeros: 0,
            prev_trailing_zeros: 0,
        })
    }

    /// Block start in whole seconds
    pub fn header(&self) -> u32 {
        self.header
    }

    /// Decode all points as (millisecond offset, value)
    pub fn decode_all(&mut self) -> Result<Vec<(u32, f64)>> {
        // Every point after the first costs at least two bits
        let mut points = Vec::with_capacity(self.count.min(self.reader.remaining() / 2 + 1));

        while let Some(point) = self.decode_next()? {
            points.push(point);
        }

        Ok(points)
    }

    /// Decode the next offset-value pair
    pub fn decode_next(&mut self) -> Result<Option<(u32, f64)>> {
        if self.decoded >= self.count {
            return Ok(None);
        }

        let point = if self.decoded == 0 {
            self.decode_first()?
        } else {
            let offset = self.decode_timestamp()?;
            let value = self.decode_value()?;
            (offset, value)
        };
        self.decoded += 1;

        let offset = u32::try_from(point.0).map_err(|_| {
            TsError::codec(format!("gorilla offset {} out of range", point.0))
        })?;
        Ok(Some((offset, point.1)))
    }

    fn read(&mut self, num_bits: usize) -> Result<u64> {
        self.reader.read_bits(num_bits).ok_or_else(unexpected_end)
    }

    fn read_bit(&mut self) -> Result<bool> {
        self.reader.read_bit().ok_or_else(unexpected_end)
    }

    fn decode_first(&mut self) -> Result<(i64, f64)> {
        let offset = self.read(32)? as i64;
        let value_bits = self.read(64)?;

        self.prev_offset = offset;
        self.prev_value_bits = value_bits;

        Ok((offset, f64::from_bits(value_bits)))
    }

    fn decode_timestamp(&mut self) -> Result<i64> {
        let delta_of_delta = if !self.read_bit()? {
            // '0'
            0
        } else if !self.read_bit()? {
            // '10'
            self.read(7)? as i64 - 63
        } else if !self.read_bit()? {
            // '110'
            self.read(9)? as i64 - 255
        } else if !self.read_bit()? {
            // '1110'
            self.read(12)? as i64 - 2047
        } else {
            // '1111'
            self.read(64)? as i64
        };

        let delta = self.prev_offset_delta.wrapping_add(delta_of_delta);
        let offset = self.prev_offset.wrapping_add(delta);

        self.prev_offset_delta = delta;
        self.prev_offset = offset;

        Ok(offset)
    }

    fn decode_value(&mut self) -> Result<f64> {
        if !self.read_bit()? {
            // Same value
            return Ok(f64::from_bits(self.prev_value_bits));
        }

        let (leading_zeros, meaningful_bits) = if !self.read_bit()? {
            // Previous window
            (
                self.prev_leading_zeros,
                64 - self.prev_leading_zeros - self.prev_trailing_zeros,
            )
        } else {
            let leading = self.read(5)? as u32;
            let meaningful = self.read(6)? as u32 + 1;
            if leading + meaningful > 64 {
                return Err(TsError::codec("gorilla value window exceeds 64 bits"));
            }

            self.prev_leading_zeros = leading;
            self.prev_trailing_zeros = 64 - leading - meaningful;

            (leading, meaningful)
        };

        let meaningful_value = self.read(meaningful_bits as usize)?;
        let trailing_zeros = 64 - leading_zeros - meaningful_bits;
        let value_bits = self.prev_value_bits ^ (meaningful_value << trailing_zeros);

        self.prev_value_bits = value_bits;

        Ok(f64::from_bits(value_bits))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compression::gorilla::GorillaEncoder;

    #[test]
    fn test_encode_decode_roundtrip() {
        let mut encoder = GorillaEncoder::new(1_700_000_000);

        let points: Vec<(u32, f64)> = (0..100u32)
            .map(|i| (i * 10_000 + (i % 7) * 13, 20_000.0 + i as f64 * 500.0))
            .collect();

        for (offset, value) in &points {
            encoder.encode(*offset, *value);
        }

        let block = encoder.finish();
        let mut decoder = GorillaDecoder::new(&block.data, block.count as usize).unwrap();
        assert_eq!(decoder.header(), 1_700_000_000);

        let decoded = decoder.decode_all().unwrap();
        assert_eq!(decoded, points);
    }

    #[test]
    fn test_decode_constant_values() {
        let mut encoder = GorillaEncoder::new(0);

        for i in 0..50 {
            encoder.encode(i * 10_000, 42_000.0);
        }

        let block = encoder.finish();
        let mut decoder = GorillaDecoder::new(&block.data, block.count as usize).unwrap();
        let decoded = decoder.decode_all().unwrap();

        assert_eq!(decoded.len(), 50);
        for (i, (offset, value)) in decoded.into_iter().enumerate() {
            assert_eq!(offset, i as u32 * 10_000);
            assert_eq!(value, 42_000.0);
        }
    }

    #[test]
    fn test_large_gaps_and_full_width_xor() {
        let points = vec![
            (0u32, 0.0),
            (5, -1.0),
            (4_000_000_000, f64::MAX),
            (4_000_000_001, f64::MIN_POSITIVE),
            (4_000_000_001, -0.0),
        ];

        let mut encoder = GorillaEncoder::new(7);
        for (offset, value) in &points {
            encoder.encode(*offset, *value);
        }
        let block = encoder.finish();

        let decoded = GorillaDecoder::new(&block.data, points.len())
            .unwrap()
            .decode_all()
            .unwrap();
        assert_eq!(decoded.len(), points.len());
        for ((o1, v1), (o2, v2)) in points.iter().zip(&decoded) {
            assert_eq!(o1, o2);
            assert_eq!(v1.to_bits(), v2.to_bits());
        }
    }

    #[test]
    fn test_truncated_stream_fails() {
        let mut encoder = GorillaEncoder::new(0);
        for i in 0..10 {
            encoder.encode(i * 3, i as f64);
        }
        let block = encoder.finish();

        let truncated = &block.data[..block.data.len() / 2];
        let result = GorillaDecoder::new(truncated, 10).unwrap().decode_all();
        assert!(result.is_err());
    }
}
