//! Adapters over general-purpose byte-stream compressors

use super::ByteCodec;
use crate::{Result, TsError};
use flate2::read::{GzDecoder, ZlibDecoder};
use flate2::write::{GzEncoder, ZlibEncoder};
use flate2::Compression;
use std::io::{Read, Write};

/// Internal buffer size for brotli readers
const BROTLI_BUFFER_SIZE: usize = 4096;

fn compress_err(codec: &str, e: impl std::fmt::Display) -> TsError {
    TsError::Codec(format!("{codec} compression failed: {e}"))
}

fn decompress_err(codec: &str, e: impl std::fmt::Display) -> TsError {
    TsError::Codec(format!("{codec} decompression failed: {e}"))
}

/// Pass-through codec used by the plain `csv` method
#[derive(Debug, Clone, Copy, Default)]
pub struct Identity;

impl ByteCodec for Identity {
    fn name(&self) -> &'static str {
        "identity"
    }

    fn compress(&self, data: &[u8]) -> Result<Vec<u8>> {
        Ok(data.to_vec())
    }

    fn decompress(&self, data: &[u8]) -> Result<Vec<u8>> {
        Ok(data.to_vec())
    }
}

/// gzip via flate2
#[derive(Debug, Clone, Copy)]
pub struct Gzip {
    pub level: u32,
}

impl ByteCodec for Gzip {
    fn name(&self) -> &'static str {
        "gzip"
    }

    fn compress(&self, data: &[u8]) -> Result<Vec<u8>> {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::new(self.level));
        encoder
            .write_all(data)
            .map_err(|e| compress_err(self.name(), e))?;
        encoder.finish().map_err(|e| compress_err(self.name(), e))
    }

    fn decompress(&self, data: &[u8]) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        GzDecoder::new(data)
            .read_to_end(&mut out)
            .map_err(|e| decompress_err(self.name(), e))?;
        Ok(out)
    }
}

/// zlib via flate2
#[derive(Debug, Clone, Copy)]
pub struct Zlib {
    pub level: u32,
}

impl ByteCodec for Zlib {
    fn name(&self) -> &'static str {
        "zlib"
    }

    fn compress(&self, data: &[u8]) -> Result<Vec<u8>> {
        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::new(self.level));
        encoder
            .write_all(data)
            .map_err(|e| compress_err(self.name(), e))?;
        encoder.finish().map_err(|e| compress_err(self.name(), e))
    }

    fn decompress(&self, data: &[u8]) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        ZlibDecoder::new(data)
            .read_to_end(&mut out)
            .map_err(|e| decompress_err(self.name(), e))?;
        Ok(out)
    }
}

/// Zstandard
#[derive(Debug, Clone, Copy)]
pub struct Zstd {
    pub level: i32,
}

impl ByteCodec for Zstd {
    fn name(&self) -> &'static str {
        "zstd"
    }

    fn compress(&self, data: &[u8]) -> Result<Vec<u8>> {
        zstd::bulk::compress(data, self.level).map_err(|e| compress_err(self.name(), e))
    }

    fn decompress(&self, data: &[u8]) -> Result<Vec<u8>> {
        zstd::stream::decode_all(data).map_err(|e| decompress_err(self.name(), e))
    }
}

/// Brotli
#[derive(Debug, Clone, Copy)]
pub struct Brotli {
    pub quality: u32,
    pub window: u32,
}

impl ByteCodec for Brotli {
    fn name(&self) -> &'static str {
        "brotli"
    }

    fn compress(&self, data: &[u8]) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        brotli::CompressorReader::new(data, BROTLI_BUFFER_SIZE, self.quality, self.window)
            .read_to_end(&mut out)
            .map_err(|e| compress_err(self.name(), e))?;
        Ok(out)
    }

    fn decompress(&self, data: &[u8]) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        brotli::Decompressor::new(data, BROTLI_BUFFER_SIZE)
            .read_to_end(&mut out)
            .map_err(|e| decompress_err(self.name(), e))?;
        Ok(out)
    }
}

/// LZMA in an xz container
#[derive(Debug, Clone, Copy, Default)]
pub struct Lzma;

impl ByteCodec for Lzma {
    fn name(&self) -> &'static str {
        "lzma"
    }

    fn compress(&self, data: &[u8]) -> Result<Vec<u8>> {
        let mut input = data;
        let mut out = Vec::new();
        lzma_rs::xz_compress(&mut input, &mut out).map_err(|e| compress_err(self.name(), e))?;
        Ok(out)
    }

    fn decompress(&self, data: &[u8]) -> Result<Vec<u8>> {
        let mut input = data;
        let mut out = Vec::new();
        lzma_rs::xz_decompress(&mut input, &mut out)
            .map_err(|e| decompress_err(self.name(), format!("{e:?}")))?;
        Ok(out)
    }
}

/// LZFSE
#[derive(Debug, Clone, Copy, Default)]
pub struct Lzfse;

impl ByteCodec for Lzfse {
    fn name(&self) -> &'static str {
        "lzfse"
    }

    fn compress(&self, data: &[u8]) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        lzfse_rust::encode_bytes(data, &mut out).map_err(|e| compress_err(self.name(), e))?;
        Ok(out)
    }

    fn decompress(&self, data: &[u8]) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        lzfse_rust::decode_bytes(data, &mut out)
            .map_err(|e| decompress_err(self.name(), format!("{e:?}")))?;
        Ok(out)
    }
}

/// LZ4 block format with a size prefix
#[derive(Debug, Clone, Copy, Default)]
pub struct Lz4;

impl ByteCodec for Lz4 {
    fn name(&self) -> &'static str {
        "lz4"
    }

    fn compress(&self, data: &[u8]) -> Result<Vec<u8>> {
        Ok(lz4_flex::compress_prepend_size(data))
    }

    fn decompress(&self, data: &[u8]) -> Result<Vec<u8>> {
        lz4_flex::decompress_size_prepended(data).map_err(|e| decompress_err(self.name(), e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn codecs() -> Vec<Box<dyn ByteCodec>> {
        vec![
            Box::new(Identity),
            Box::new(Gzip { level: 5 }),
            Box::new(Zlib { level: 5 }),
            Box::new(Zstd { level: 3 }),
            Box::new(Brotli {
                quality: 5,
                window: 22,
            }),
            Box::new(Lzma),
            Box::new(Lzfse),
            Box::new(Lz4),
        ]
    }

    fn delta_table() -> Vec<u8> {
        let mut text = String::from("delta");
        for i in 0..2_000 {
            text.push_str(if i % 10 == 0 { "\n1001" } else { "\n1000" });
        }
        for i in 0..2_000 {
            text.push_str(&format!("\n{}", (i % 7) as i64 * 10 - 30));
        }
        text.into_bytes()
    }

    #[test]
    fn test_round_trip_all_codecs() {
        let input = delta_table();
        for codec in codecs() {
            let compressed = codec.compress(&input).unwrap();
            let restored = codec.decompress(&compressed).unwrap();
            assert_eq!(restored, input, "{} did not round-trip", codec.name());
        }
    }

    #[test]
    fn test_repetitive_text_shrinks() {
        let input = delta_table();
        for codec in codecs().into_iter().filter(|c| c.name() != "identity") {
            let compressed = codec.compress(&input).unwrap();
            assert!(
                compressed.len() < input.len() / 4,
                "{} only reached {} of {} bytes",
                codec.name(),
                compressed.len(),
                input.len()
            );
        }
    }

    #[test]
    fn test_garbage_input_fails() {
        // Only formats that open with a magic number reject garbage up front
        let framed = ["gzip", "zlib", "zstd", "lzma", "lzfse"];
        let garbage = [0xde, 0xad, 0xbe, 0xef, 0x00, 0x01, 0x02];
        for codec in codecs().into_iter().filter(|c| framed.contains(&c.name())) {
            assert!(
                codec.decompress(&garbage).is_err(),
                "{} accepted garbage",
                codec.name()
            );
        }
    }
}
