//! Gorilla compression for time-series data
//!
//! Implements the stream format from Facebook's paper
//! "Gorilla: A Fast, Scalable, In-Memory Time Series Database":
//!
//! - a 32-bit header holding the block start in whole seconds
//! - timestamps as 32-bit millisecond offsets from the header, stored as
//!   delta-of-delta with variable-length prefixes
//! - values XOR-ed against their predecessor with leading/trailing zero
//!   windows

mod decoder;
mod encoder;

pub use decoder::GorillaDecoder;
pub use encoder::GorillaEncoder;

use crate::{Result, TsError};
use bytes::{Buf, BufMut, BytesMut};

/// Compressed block of time-series data
#[derive(Debug, Clone, PartialEq)]
pub struct GorillaBlock {
    /// Block start in whole seconds
    pub header: u32,
    /// Number of encoded points
    pub count: u32,
    /// Bit stream
    pub data: Vec<u8>,
}

impl GorillaBlock {
    /// Frame overhead in front of the bit stream
    pub const PREFIX_SIZE: usize = 4;

    /// Serialize as `[count: u32 le][bit stream]`.
    ///
    /// The header lives inside the bit stream.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = BytesMut::with_capacity(Self::PREFIX_SIZE + self.data.len());
        buf.put_u32_le(self.count);
        buf.put_slice(&self.data);
        buf.to_vec()
    }

    /// Deserialize from bytes written by [`GorillaBlock::to_bytes`]
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        if data.len() < Self::PREFIX_SIZE {
            return Err(TsError::codec("gorilla block too short"));
        }
        let mut cursor = data;
        let count = cursor.get_u32_le();
        let mut header_bytes = cursor;
        if header_bytes.len() < 4 {
            return Err(TsError::codec("gorilla block is missing its header"));
        }
        let header = header_bytes.get_u32();

        Ok(Self {
            header,
            count,
            data: cursor.to_vec(),
        })
    }

    /// Get bytes per point
    pub fn bytes_per_point(&self) -> f64 {
        self.data.len() as f64 / self.count.max(1) as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_framing() {
        let mut encoder = GorillaEncoder::new(1_700_000_000);
        encoder.encode(0, 0.0);
        encoder.encode(123, 42.0);
        let block = encoder.finish();

        let bytes = block.to_bytes();
        assert_eq!(bytes.len(), GorillaBlock::PREFIX_SIZE + block.data.len());
        assert_eq!(GorillaBlock::from_bytes(&bytes).unwrap(), block);
    }

    #[test]
    fn test_truncated_block() {
        assert!(GorillaBlock::from_bytes(&[1, 0]).is_err());
        assert!(GorillaBlock::from_bytes(&[1, 0, 0, 0, 7]).is_err());
    }
}
