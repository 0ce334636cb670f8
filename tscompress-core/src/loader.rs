//! Sample file loading
//!
//! A sample file starts with a header line followed by `timestamp_ms,value`
//! rows. Blank lines are ignored.

use crate::{Result, Sample, Series, TsError};
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;
use tracing::debug;

impl Series {
    /// Load a series from a sample file
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let series = Self::from_reader(file)?;

        debug!(path = %path.display(), points = series.len(), "loaded series");
        Ok(series)
    }

    /// Parse a series from any reader
    pub fn from_reader(reader: impl Read) -> Result<Self> {
        let mut samples = Vec::new();

        // Line 1 is the header
        for (i, line) in BufReader::new(reader).lines().enumerate().skip(1) {
            let line = line?;
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            samples.push(parse_row(i + 1, line)?);
        }

        if samples.is_empty() {
            return Err(TsError::format("sample file contains no rows"));
        }
        Series::new(samples)
    }
}

fn parse_row(line_no: usize, line: &str) -> Result<Sample> {
    let fields: Vec<&str> = line.split(',').map(str::trim).collect();
    let [timestamp, value] = fields.as_slice() else {
        return Err(TsError::format(format!(
            "line {line_no}: expected 2 fields, found {}",
            fields.len()
        )));
    };

    let timestamp = timestamp.parse::<i64>().map_err(|e| {
        TsError::format(format!("line {line_no}: bad timestamp {timestamp:?}: {e}"))
    })?;
    let value = value
        .parse::<f32>()
        .map_err(|e| TsError::format(format!("line {line_no}: bad value {value:?}: {e}")))?;

    Ok(Sample::new(timestamp, value))
}
