//! tscompress Core - Lossless Time-Series Compression Evaluation
//!
//! Measures how well a series of timestamped float samples compresses under
//! a family of methods, and proves every result by decoding it again.
//!
//! # Architecture
//!
//! - **Transform**: zigzag mapping, delta encoding at millisecond/milli-unit
//!   precision, and the interleaved or split flat layout
//! - **Text**: the delta table rendered as CSV-like text
//! - **Compression**: integer packers, Gorilla, and byte-stream codecs
//! - **Compressor**: encodes with one method and verifies the round trip
//! - **Evaluate**: loads a sample file and reports sizes and ratios

pub mod compression;
pub mod compressor;
pub mod evaluate;
pub mod loader;
pub mod method;
pub mod text;
pub mod transform;

mod error;
mod types;

pub use compressor::{Compressed, Compressor, Options};
pub use error::{Result, TsError};
pub use evaluate::{Evaluation, Report};
pub use method::Method;
pub use types::*;

/// tscompress version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default configuration values
pub mod config {
    /// gzip level for `gzip-csv`
    pub const GZIP_LEVEL: u32 = 5;

    /// zlib level for `zlib-csv`
    pub const ZLIB_LEVEL: u32 = 5;

    /// zstd level for `zstd-csv`
    pub const ZSTD_LEVEL: i32 = 22;

    /// brotli quality for `brotli-csv`
    pub const BROTLI_QUALITY: u32 = 10;

    /// brotli window (log2 bytes)
    pub const BROTLI_WINDOW: u32 = 22;

    /// Values per block in the bit-packing codec
    pub const BITPACK_BLOCK_LEN: usize = 128;

    /// Naive size of one sample: 8-byte timestamp plus 4-byte float
    pub const NAIVE_BYTES_PER_POINT: usize = 12;
}
