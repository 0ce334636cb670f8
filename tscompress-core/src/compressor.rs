//! Compression orchestrator
//!
//! A [`Compressor`] turns a series into the representation its algorithm
//! expects, encodes it, and immediately decodes the bytes again to prove the
//! result is lossless at millisecond / milli-unit precision.

use crate::compression::{
    ByteCodec, CompressionConfig, GorillaBlock, GorillaDecoder, GorillaEncoder, IntegerCodec,
};
use crate::text::TextCodec;
use crate::transform::{delta_decode, delta_encode, flatten, unflatten, Layout};
use crate::{Method, Result, Sample, Series, TsError};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Input shape an algorithm consumes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepresentationKind {
    /// Delta-encoded, zigzag-mapped unsigned integers
    Flat,
    /// Delta table as text
    Text,
    /// Fixed-point samples
    Samples,
}

/// Series in the shape an algorithm encodes
#[derive(Debug, Clone, PartialEq)]
pub enum Representation {
    Flat(Vec<u64>),
    Text(String),
    Samples(Series),
}

impl Representation {
    pub fn kind(&self) -> RepresentationKind {
        match self {
            Representation::Flat(_) => RepresentationKind::Flat,
            Representation::Text(_) => RepresentationKind::Text,
            Representation::Samples(_) => RepresentationKind::Samples,
        }
    }
}

fn wrong_input(method: Method, expected: RepresentationKind, got: &Representation) -> TsError {
    TsError::Config(format!(
        "{method} expects {expected:?} input, got {:?}",
        got.kind()
    ))
}

/// One compression method over one representation
pub trait Algorithm: Send + Sync {
    /// Method this algorithm implements
    fn method(&self) -> Method;

    /// Representation `encode` expects and `decode` produces
    fn representation(&self) -> RepresentationKind;

    fn encode(&self, input: &Representation) -> Result<Vec<u8>>;

    fn decode(&self, data: &[u8]) -> Result<Representation>;
}

/// Integer packer over the flat delta sequence
pub struct IntegerAlgorithm<C> {
    method: Method,
    codec: C,
}

impl<C: IntegerCodec> IntegerAlgorithm<C> {
    pub fn new(method: Method, codec: C) -> Self {
        Self { method, codec }
    }
}

impl<C: IntegerCodec> Algorithm for IntegerAlgorithm<C> {
    fn method(&self) -> Method {
        self.method
    }

    fn representation(&self) -> RepresentationKind {
        RepresentationKind::Flat
    }

    fn encode(&self, input: &Representation) -> Result<Vec<u8>> {
        match input {
            Representation::Flat(values) => self.codec.encode(values),
            other => Err(wrong_input(self.method, RepresentationKind::Flat, other)),
        }
    }

    fn decode(&self, data: &[u8]) -> Result<Representation> {
        self.codec.decode(data).map(Representation::Flat)
    }
}

/// Byte-stream compressor over the delta table text
pub struct TextAlgorithm<C> {
    method: Method,
    codec: C,
}

impl<C: ByteCodec> TextAlgorithm<C> {
    pub fn new(method: Method, codec: C) -> Self {
        Self { method, codec }
    }
}

impl<C: ByteCodec> Algorithm for TextAlgorithm<C> {
    fn method(&self) -> Method {
        self.method
    }

    fn representation(&self) -> RepresentationKind {
        RepresentationKind::Text
    }

    fn encode(&self, input: &Representation) -> Result<Vec<u8>> {
        match input {
            Representation::Text(text) => self.codec.compress(text.as_bytes()),
            other => Err(wrong_input(self.method, RepresentationKind::Text, other)),
        }
    }

    fn decode(&self, data: &[u8]) -> Result<Representation> {
        let bytes = self.codec.decompress(data)?;
        let text = String::from_utf8(bytes)
            .map_err(|e| TsError::format(format!("decompressed table is not UTF-8: {e}")))?;
        Ok(Representation::Text(text))
    }
}

/// Gorilla over the fixed-point samples.
///
/// The block header holds the first timestamp in whole seconds. A zero
/// anchor at offset 0 opens the stream and is dropped on decode; real
/// samples follow as millisecond offsets from the header, so the
/// sub-second part of the first timestamp survives.
#[derive(Debug, Clone, Copy, Default)]
pub struct GorillaAlgorithm;

impl GorillaAlgorithm {
    fn encode_series(series: &Series) -> Result<Vec<u8>> {
        let first = series.first().timestamp;
        let header = u32::try_from(first.div_euclid(1000)).map_err(|_| {
            TsError::codec(format!(
                "first timestamp {first} ms does not fit a 32-bit seconds header"
            ))
        })?;
        let milli_offset = first.rem_euclid(1000);

        let mut encoder = GorillaEncoder::new(header);
        encoder.encode(0, 0.0);

        for sample in series {
            let offset = sample
                .timestamp
                .checked_sub(first)
                .and_then(|d| d.checked_add(milli_offset))
                .and_then(|d| u32::try_from(d).ok())
                .ok_or_else(|| {
                    TsError::codec(format!(
                        "timestamp {} ms is outside the 32-bit offset range of the block",
                        sample.timestamp
                    ))
                })?;
            encoder.encode(offset, sample.value_milli() as f64);
        }

        let block = encoder.finish();
        debug!(
            points = block.count,
            bytes_per_point = block.bytes_per_point(),
            "gorilla block encoded"
        );
        Ok(block.to_bytes())
    }

    fn decode_series(data: &[u8]) -> Result<Series> {
        let block = GorillaBlock::from_bytes(data)?;
        let mut decoder = GorillaDecoder::new(&block.data, block.count as usize)?;
        let base = i64::from(decoder.header()) * 1000;

        let mut points = decoder.decode_all()?.into_iter();
        points
            .next()
            .ok_or_else(|| TsError::codec("gorilla block has no anchor point"))?;

        let samples = points
            .map(|(offset, milli)| Sample::from_milli(base + i64::from(offset), milli as i64))
            .collect();
        Series::new(samples)
    }
}

impl Algorithm for GorillaAlgorithm {
    fn method(&self) -> Method {
        Method::Gorilla
    }

    fn representation(&self) -> RepresentationKind {
        RepresentationKind::Samples
    }

    fn encode(&self, input: &Representation) -> Result<Vec<u8>> {
        match input {
            Representation::Samples(series) => Self::encode_series(series),
            other => Err(wrong_input(Method::Gorilla, RepresentationKind::Samples, other)),
        }
    }

    fn decode(&self, data: &[u8]) -> Result<Representation> {
        Self::decode_series(data).map(Representation::Samples)
    }
}

/// Compressor options
#[derive(Debug, Clone, Copy)]
pub struct Options {
    /// Compression method
    pub method: Method,
    /// Interleave time and value deltas instead of splitting them
    pub interleave: bool,
    /// Codec levels
    pub levels: CompressionConfig,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            method: Method::Simple8b,
            interleave: false,
            levels: CompressionConfig::default(),
        }
    }
}

impl Options {
    /// Options for `method` with default layout and levels
    pub fn for_method(method: Method) -> Self {
        Self {
            method,
            ..Default::default()
        }
    }

    pub fn layout(&self) -> Layout {
        Layout::from_interleave(self.interleave)
    }
}

/// Output of one compression attempt
#[derive(Debug)]
pub struct Compressed {
    /// Method that produced the bytes
    pub method: Method,
    /// Compressed bytes
    pub data: Vec<u8>,
    /// Outcome of the round-trip check
    pub verification: Result<()>,
    /// Time spent building the representation and encoding
    pub encode_time: Duration,
    /// Time spent decoding and comparing
    pub verify_time: Duration,
}

impl Compressed {
    /// Compressed size in bytes
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Check if the bytes decoded back to the original series
    pub fn is_verified(&self) -> bool {
        self.verification.is_ok()
    }

    /// Bytes if verification passed, otherwise the verification error
    pub fn into_verified(self) -> Result<Vec<u8>> {
        self.verification.map(|()| self.data)
    }
}

/// Encodes a series with one method and verifies the round trip
pub struct Compressor {
    algorithm: Box<dyn Algorithm>,
    layout: Layout,
}

impl Compressor {
    /// Compressor for `method` with default options
    pub fn new(method: Method) -> Self {
        Self {
            algorithm: method.algorithm(&CompressionConfig::default()),
            layout: Layout::default(),
        }
    }

    /// Compressor from explicit options
    pub fn with_options(options: Options) -> Result<Self> {
        options.levels.validate()?;
        Ok(Self {
            algorithm: options.method.algorithm(&options.levels),
            layout: options.layout(),
        })
    }

    /// Compressor around any algorithm
    pub fn from_algorithm(algorithm: Box<dyn Algorithm>, layout: Layout) -> Self {
        Self { algorithm, layout }
    }

    pub fn method(&self) -> Method {
        self.algorithm.method()
    }

    pub fn layout(&self) -> Layout {
        self.layout
    }

    /// Compress a series and verify the result.
    ///
    /// Encode failures abort. A failed verification is returned in
    /// [`Compressed::verification`] alongside the bytes.
    pub fn compress(&self, series: &Series) -> Result<Compressed> {
        let method = self.method();

        let started = Instant::now();
        let input = self.prepare(series);
        let data = self.algorithm.encode(&input)?;
        let encode_time = started.elapsed();
        debug!(
            %method,
            layout = ?self.layout,
            points = series.len(),
            bytes = data.len(),
            "encoded"
        );

        let started = Instant::now();
        let verification = self.verify(series, &data);
        let verify_time = started.elapsed();
        match &verification {
            Ok(()) => debug!(%method, "round trip verified"),
            Err(e) => warn!(%method, error = %e, "round trip failed"),
        }

        Ok(Compressed {
            method,
            data,
            verification,
            encode_time,
            verify_time,
        })
    }

    /// Decode bytes produced by this compressor back into a series
    pub fn decompress(&self, data: &[u8]) -> Result<Series> {
        let output = self.algorithm.decode(data)?;
        self.restore(output)
    }

    fn prepare(&self, series: &Series) -> Representation {
        match self.algorithm.representation() {
            RepresentationKind::Flat => {
                Representation::Flat(flatten(&delta_encode(series, true, true), self.layout))
            }
            RepresentationKind::Text => {
                Representation::Text(TextCodec::new(self.layout).encode(series))
            }
            RepresentationKind::Samples => Representation::Samples(series.clone()),
        }
    }

    fn restore(&self, output: Representation) -> Result<Series> {
        match output {
            Representation::Flat(values) => {
                delta_decode(&unflatten(&values, self.layout)?, true, true)
            }
            Representation::Text(text) => TextCodec::new(self.layout).decode(&text),
            Representation::Samples(series) => Ok(series),
        }
    }

    fn verify(&self, original: &Series, data: &[u8]) -> Result<()> {
        let decoded = self.decompress(data)?;

        match original.first_mismatch(&decoded) {
            None => Ok(()),
            Some(index) => {
                debug!(
                    index,
                    expected = ?original.samples().get(index),
                    actual = ?decoded.samples().get(index),
                    "first differing sample"
                );
                Err(TsError::VerificationMismatch {
                    method: self.method().to_string(),
                    index,
                })
            }
        }
    }
}
