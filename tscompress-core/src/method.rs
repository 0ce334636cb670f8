//! Supported compression methods

use crate::compression::{
    BitPack, Brotli, CompressionConfig, Gzip, Identity, Lz4, Lzfse, Lzma, Simple8b, Zlib, Zstd,
};
use crate::compressor::{Algorithm, GorillaAlgorithm, IntegerAlgorithm, TextAlgorithm};
use crate::{Result, TsError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A compression method, the closed set a user may select
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Method {
    #[serde(rename = "simple-8b")]
    Simple8b,
    #[serde(rename = "gorilla")]
    Gorilla,
    #[serde(rename = "bitpack")]
    BitPack,
    #[serde(rename = "csv")]
    Csv,
    #[serde(rename = "zstd-csv")]
    ZstdCsv,
    #[serde(rename = "gzip-csv")]
    GzipCsv,
    #[serde(rename = "zlib-csv")]
    ZlibCsv,
    #[serde(rename = "brotli-csv")]
    BrotliCsv,
    #[serde(rename = "lzfse-csv")]
    LzfseCsv,
    #[serde(rename = "lzma-csv")]
    LzmaCsv,
    #[serde(rename = "lz4-csv")]
    Lz4Csv,
}

impl Method {
    /// Every method, in report order
    pub const ALL: [Method; 11] = [
        Method::Simple8b,
        Method::Gorilla,
        Method::BitPack,
        Method::Csv,
        Method::ZstdCsv,
        Method::GzipCsv,
        Method::ZlibCsv,
        Method::BrotliCsv,
        Method::LzfseCsv,
        Method::LzmaCsv,
        Method::Lz4Csv,
    ];

    /// Method name as accepted on the command line
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Simple8b => "simple-8b",
            Method::Gorilla => "gorilla",
            Method::BitPack => "bitpack",
            Method::Csv => "csv",
            Method::ZstdCsv => "zstd-csv",
            Method::GzipCsv => "gzip-csv",
            Method::ZlibCsv => "zlib-csv",
            Method::BrotliCsv => "brotli-csv",
            Method::LzfseCsv => "lzfse-csv",
            Method::LzmaCsv => "lzma-csv",
            Method::Lz4Csv => "lz4-csv",
        }
    }

    /// All method names joined by `sep`
    pub fn names(sep: &str) -> String {
        Self::ALL
            .iter()
            .map(Method::as_str)
            .collect::<Vec<_>>()
            .join(sep)
    }

    /// Whether the interleave flag changes this method's input
    pub fn uses_layout(&self) -> bool {
        !matches!(self, Method::Gorilla)
    }

    /// Build the algorithm that implements this method
    pub fn algorithm(&self, config: &CompressionConfig) -> Box<dyn Algorithm> {
        match self {
            Method::Simple8b => Box::new(IntegerAlgorithm::new(*self, Simple8b)),
            Method::BitPack => Box::new(IntegerAlgorithm::new(*self, BitPack)),
            Method::Gorilla => Box::new(GorillaAlgorithm),
            Method::Csv => Box::new(TextAlgorithm::new(*self, Identity)),
            Method::ZstdCsv => Box::new(TextAlgorithm::new(
                *self,
                Zstd {
                    level: config.zstd_level,
                },
            )),
            Method::GzipCsv => Box::new(TextAlgorithm::new(
                *self,
                Gzip {
                    level: config.gzip_level,
                },
            )),
            Method::ZlibCsv => Box::new(TextAlgorithm::new(
                *self,
                Zlib {
                    level: config.zlib_level,
                },
            )),
            Method::BrotliCsv => Box::new(TextAlgorithm::new(
                *self,
                Brotli {
                    quality: config.brotli_quality,
                    window: config.brotli_window,
                },
            )),
            Method::LzfseCsv => Box::new(TextAlgorithm::new(*self, Lzfse)),
            Method::LzmaCsv => Box::new(TextAlgorithm::new(*self, Lzma)),
            Method::Lz4Csv => Box::new(TextAlgorithm::new(*self, Lz4)),
        }
    }

    /// Override the level of the codec this method uses
    pub fn with_level(
        &self,
        mut config: CompressionConfig,
        level: i32,
    ) -> Result<CompressionConfig> {
        let unsigned = || {
            u32::try_from(level).map_err(|_| {
                TsError::Config(format!("{self} does not accept negative level {level}"))
            })
        };

        match self {
            Method::GzipCsv => config.gzip_level = unsigned()?,
            Method::ZlibCsv => config.zlib_level = unsigned()?,
            Method::ZstdCsv => config.zstd_level = level,
            Method::BrotliCsv => config.brotli_quality = unsigned()?,
            _ => {
                return Err(TsError::Config(format!(
                    "{self} has no adjustable compression level"
                )))
            }
        }

        config.validate()?;
        Ok(config)
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Method {
    type Err = TsError;

    fn from_str(s: &str) -> Result<Self> {
        if s == "bp32" {
            return Ok(Method::BitPack);
        }
        Self::ALL
            .into_iter()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| {
                TsError::UnsupportedAlgorithm(format!(
                    "{s} (expected one of: {})",
                    Self::names(", ")
                ))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compressor::RepresentationKind;

    #[test]
    fn test_parse_all_names() {
        for method in Method::ALL {
            assert_eq!(method.as_str().parse::<Method>().unwrap(), method);
            assert_eq!(method.to_string(), method.as_str());
        }
        assert_eq!("bp32".parse::<Method>().unwrap(), Method::BitPack);
    }

    #[test]
    fn test_unknown_method() {
        let err = "snappy-csv".parse::<Method>().unwrap_err();
        assert!(matches!(err, TsError::UnsupportedAlgorithm(_)));
        assert!(err.to_string().contains("gzip-csv"));
    }

    #[test]
    fn test_representation_table() {
        let config = CompressionConfig::default();
        for method in Method::ALL {
            let algorithm = method.algorithm(&config);
            assert_eq!(algorithm.method(), method);

            let expected = match method {
                Method::Simple8b | Method::BitPack => RepresentationKind::Flat,
                Method::Gorilla => RepresentationKind::Samples,
                _ => RepresentationKind::Text,
            };
            assert_eq!(algorithm.representation(), expected, "{method}");
        }
    }

    #[test]
    fn test_with_level() {
        let config = CompressionConfig::default();

        let zstd = Method::ZstdCsv.with_level(config, 3).unwrap();
        assert_eq!(zstd.zstd_level, 3);
        assert_eq!(zstd.gzip_level, config.gzip_level);

        let gzip = Method::GzipCsv.with_level(config, 9).unwrap();
        assert_eq!(gzip.gzip_level, 9);

        assert!(Method::GzipCsv.with_level(config, 15).is_err());
        assert!(Method::BrotliCsv.with_level(config, -1).is_err());
        assert!(Method::Simple8b.with_level(config, 1).is_err());
    }

    #[test]
    fn test_layout_applies() {
        assert!(Method::Simple8b.uses_layout());
        assert!(Method::ZstdCsv.uses_layout());
        assert!(!Method::Gorilla.uses_layout());
    }
}
