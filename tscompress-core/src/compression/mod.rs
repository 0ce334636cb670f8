//! Codecs behind the compression methods
//!
//! Two strategy traits model the external collaborators:
//!
//! - [`ByteCodec`]: general-purpose compressors over arbitrary bytes
//!   (gzip, zlib, zstd, brotli, lzma, lzfse, lz4)
//! - [`IntegerCodec`]: packers over flat sequences of unsigned integers
//!   (simple-8b, bit-packing)
//!
//! The Gorilla codec works on (offset, value) pairs directly and is used by
//! its own method.

mod bitpack;
mod bitstream;
mod bytestream;
pub mod gorilla;
mod simple8b;

pub use bitpack::BitPack;
pub use bitstream::{BitReader, BitWriter};
pub use bytestream::{Brotli, Gzip, Identity, Lz4, Lzfse, Lzma, Zlib, Zstd};
pub use gorilla::{GorillaBlock, GorillaDecoder, GorillaEncoder};
pub use simple8b::Simple8b;

use crate::{Result, TsError};

/// Lossless compressor over arbitrary bytes
pub trait ByteCodec: Send + Sync {
    /// Short codec name for logs
    fn name(&self) -> &'static str;

    fn compress(&self, data: &[u8]) -> Result<Vec<u8>>;

    fn decompress(&self, data: &[u8]) -> Result<Vec<u8>>;
}

/// Lossless, order-preserving packer for unsigned integers
pub trait IntegerCodec: Send + Sync {
    /// Short codec name for logs
    fn name(&self) -> &'static str;

    fn encode(&self, values: &[u64]) -> Result<Vec<u8>>;

    fn decode(&self, data: &[u8]) -> Result<Vec<u64>>;
}

/// Compression levels for the byte-stream codecs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompressionConfig {
    /// gzip level (0-9)
    pub gzip_level: u32,
    /// zlib level (0-9)
    pub zlib_level: u32,
    /// zstd level (1-22)
    pub zstd_level: i32,
    /// brotli quality (0-11)
    pub brotli_quality: u32,
    /// brotli window size as log2 (10-24)
    pub brotli_window: u32,
}

impl CompressionConfig {
    /// Reject levels the codecs do not accept
    pub fn validate(&self) -> Result<()> {
        if self.gzip_level > 9 || self.zlib_level > 9 {
            return Err(TsError::Config(format!(
                "deflate level must be 0-9, got gzip={} zlib={}",
                self.gzip_level, self.zlib_level
            )));
        }
        if !(1..=22).contains(&self.zstd_level) {
            return Err(TsError::Config(format!(
                "zstd level must be 1-22, got {}",
                self.zstd_level
            )));
        }
        if self.brotli_quality > 11 {
            return Err(TsError::Config(format!(
                "brotli quality must be 0-11, got {}",
                self.brotli_quality
            )));
        }
        if !(10..=24).contains(&self.brotli_window) {
            return Err(TsError::Config(format!(
                "brotli window must be 10-24, got {}",
                self.brotli_window
            )));
        }
        Ok(())
    }
}

impl Default for CompressionConfig {
    fn default() -> Self {
        use crate::config;

        Self {
            gzip_level: config::GZIP_LEVEL,
            zlib_level: config::ZLIB_LEVEL,
            zstd_level: config::ZSTD_LEVEL,
            brotli_quality: config::BROTLI_QUALITY,
            brotli_window: config::BROTLI_WINDOW,
        }
    }
}
