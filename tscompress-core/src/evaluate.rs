//! Evaluation runs and their reports

use crate::compressor::{Compressor, Options};
use crate::config::NAIVE_BYTES_PER_POINT;
use crate::transform::Layout;
use crate::{Method, Result, Series, Timestamp};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use std::path::Path;
use tracing::info;

/// A series paired with the options to compress it with
#[derive(Debug, Clone)]
pub struct Evaluation {
    options: Options,
    series: Series,
}

impl Evaluation {
    /// Load the sample file at `path`
    pub fn new(options: Options, path: impl AsRef<Path>) -> Result<Self> {
        let series = Series::from_path(path)?;
        Ok(Self::from_series(options, series))
    }

    pub fn from_series(options: Options, series: Series) -> Self {
        Self { options, series }
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    pub fn series(&self) -> &Series {
        &self.series
    }

    /// Compress and verify once.
    ///
    /// A verification failure is part of the report, not an error.
    pub fn run(&self) -> Result<Report> {
        let compressor = Compressor::with_options(self.options)?;
        let compressed = compressor.compress(&self.series)?;
        let range = self.series.time_range();
        let method = compressed.method;

        let report = Report {
            method,
            layout: method.uses_layout().then_some(compressor.layout()),
            num_points: self.series.len(),
            compressed_size: compressed.len(),
            encode_ms: compressed.encode_time.as_secs_f64() * 1000.0,
            verify_ms: compressed.verify_time.as_secs_f64() * 1000.0,
            start: to_datetime(range.start),
            end: to_datetime(range.end),
            verification_error: compressed.verification.err().map(|e| e.to_string()),
        };

        info!(
            %method,
            points = report.num_points,
            size = report.compressed_size,
            ratio = report.ratio(),
            verified = report.is_verified(),
            "evaluation finished"
        );
        Ok(report)
    }
}

fn to_datetime(ts: Timestamp) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp_millis(ts)
}

/// Outcome of one evaluation
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub method: Method,
    /// `None` for methods the layout does not apply to
    pub layout: Option<Layout>,
    pub num_points: usize,
    pub compressed_size: usize,
    pub encode_ms: f64,
    pub verify_ms: f64,
    /// First sample time, if representable
    pub start: Option<DateTime<Utc>>,
    /// Last sample time, if representable
    pub end: Option<DateTime<Utc>>,
    pub verification_error: Option<String>,
}

impl Report {
    /// Size of the raw samples: 8-byte timestamp plus 4-byte value each
    pub fn naive_size(&self) -> usize {
        self.num_points * NAIVE_BYTES_PER_POINT
    }

    /// Naive size over compressed size
    pub fn ratio(&self) -> f64 {
        self.naive_size() as f64 / self.compressed_size as f64
    }

    pub fn bytes_per_point(&self) -> f64 {
        self.compressed_size as f64 / self.num_points as f64
    }

    pub fn is_verified(&self) -> bool {
        self.verification_error.is_none()
    }

    /// Report as a JSON-friendly value including the derived fields
    pub fn summary(&self) -> ReportSummary<'_> {
        ReportSummary {
            report: self,
            naive_size: self.naive_size(),
            ratio: self.ratio(),
            verified: self.is_verified(),
        }
    }
}

/// [`Report`] with its derived figures
#[derive(Debug, Serialize)]
pub struct ReportSummary<'a> {
    #[serde(flatten)]
    pub report: &'a Report,
    pub naive_size: usize,
    pub ratio: f64,
    pub verified: bool,
}

fn write_time(f: &mut fmt::Formatter<'_>, label: &str, t: Option<DateTime<Utc>>) -> fmt::Result {
    match t {
        Some(t) => writeln!(f, "{label}: {}", t.format("%Y-%m-%d %H:%M:%S%.3f UTC")),
        None => writeln!(f, "{label}: out of range"),
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Algorithm        : {}", self.method)?;
        if let Some(layout) = self.layout {
            writeln!(f, "Layout           : {layout:?}")?;
        }
        writeln!(f, "Points           : {}", self.num_points)?;
        write_time(f, "Start            ", self.start)?;
        write_time(f, "End              ", self.end)?;
        writeln!(f, "Uncompressed     : {} bytes", self.naive_size())?;
        writeln!(f, "Compressed       : {} bytes", self.compressed_size)?;
        writeln!(f, "Bytes per point  : {:.3}", self.bytes_per_point())?;
        writeln!(f, "Compression Ratio: {:.2}", self.ratio())?;
        writeln!(f, "Encode time      : {:.3} ms", self.encode_ms)?;
        writeln!(f, "Verify time      : {:.3} ms", self.verify_ms)?;
        match &self.verification_error {
            None => write!(f, "Verification     : ok"),
            Some(e) => write!(f, "Verification     : FAILED ({e})"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Sample;
    use std::io::Write;

    fn series() -> Series {
        let samples = (0..100)
            .map(|i| Sample::new(1_700_000_000_000 + i * 1000, 20.0 + (i % 5) as f32 * 0.5))
            .collect();
        Series::new(samples).unwrap()
    }

    #[test]
    fn test_run_report() {
        let evaluation = Evaluation::from_series(Options::for_method(Method::ZstdCsv), series());
        let report = evaluation.run().unwrap();

        assert_eq!(report.method, Method::ZstdCsv);
        assert_eq!(report.layout, Some(Layout::Split));
        assert_eq!(report.num_points, 100);
        assert_eq!(report.naive_size(), 1200);
        assert!(report.is_verified());
        assert!(report.ratio() > 1.0);
        assert_eq!(
            report.start.unwrap().timestamp_millis(),
            1_700_000_000_000
        );
        assert_eq!(report.end.unwrap().timestamp_millis(), 1_700_000_099_000);
    }

    #[test]
    fn test_gorilla_has_no_layout() {
        let options = Options {
            method: Method::Gorilla,
            interleave: true,
            ..Default::default()
        };
        let report = Evaluation::from_series(options, series()).run().unwrap();
        assert_eq!(report.layout, None);
    }

    #[test]
    fn test_print_stats() {
        let report = Evaluation::from_series(Options::for_method(Method::Csv), series())
            .run()
            .unwrap();
        let text = report.to_string();

        assert!(text.starts_with("Algorithm        : csv\n"));
        assert!(text.contains("Uncompressed     : 1200 bytes"));
        assert!(text.contains("Start            : 2023-11-14 22:13:20.000 UTC"));
        assert!(text.ends_with("Verification     : ok"));
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "time,value\n1000,40.0\n2000,50.0\n3000,60.0").unwrap();

        let options = Options {
            method: Method::Simple8b,
            interleave: true,
            ..Default::default()
        };
        let report = Evaluation::new(options, file.path()).unwrap().run().unwrap();
        assert_eq!(report.num_points, 3);
        assert_eq!(report.layout, Some(Layout::Interleaved));
        assert!(report.is_verified());
    }

    #[test]
    fn test_load_failure() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "time,value\n").unwrap();
        assert!(Evaluation::new(Options::default(), file.path())
            .unwrap_err()
            .is_format());
    }
}
