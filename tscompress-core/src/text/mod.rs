//! Textual delta tables
//!
//! Byte-stream compressors are fed a small CSV-like table of delta values
//! rather than the binary flat sequence. Two variants exist:
//!
//! - **Split**: a header line, N time-delta lines, then N value-delta lines
//! - **Interleaved**: a header line, then N `time_delta,value_delta` lines
//!
//! Time deltas are raw milliseconds and value deltas are signed milli-units,
//! both in decimal. Output never ends with a newline.

use crate::transform::{delta_decode, delta_encode, DeltaSeries, FixedPoint, Layout};
use crate::{Result, Series, TsError};
use std::fmt::Write;
use tracing::debug;

/// Header of the split variant
pub const SPLIT_HEADER: &str = "delta";

/// Header of the interleaved variant
pub const INTERLEAVED_HEADER: &str = "time_delta_ms,value_delta_milli";

const SEPARATOR: char = ',';

/// Encodes a series as a delta table and parses it back
#[derive(Debug, Clone, Copy, Default)]
pub struct TextCodec {
    layout: Layout,
}

impl TextCodec {
    /// Create a codec for the given table variant
    pub fn new(layout: Layout) -> Self {
        Self { layout }
    }

    /// Table variant
    pub fn layout(&self) -> Layout {
        self.layout
    }

    /// Delta-encode both fields and render the table
    pub fn encode(&self, series: &Series) -> String {
        render_delta_text(&delta_encode(series, true, true), self.layout)
    }

    /// Parse a table and undo the delta encoding
    pub fn decode(&self, text: &str) -> Result<Series> {
        let deltas = parse_delta_text(text, self.layout)?;
        delta_decode(&deltas, true, true)
    }
}

/// Render a delta series as a table
pub fn render_delta_text(deltas: &DeltaSeries, layout: Layout) -> String {
    // Delta values rarely exceed a handful of digits.
    let mut out = String::with_capacity(32 + deltas.len() * 12);

    // Writing to a String cannot fail.
    match layout {
        Layout::Split => {
            let _ = writeln!(out, "{SPLIT_HEADER}");
            for point in deltas.iter() {
                let _ = writeln!(out, "{}", point.time);
            }
            for point in deltas.iter() {
                let _ = writeln!(out, "{}", point.value);
            }
        }
        Layout::Interleaved => {
            let _ = writeln!(out, "{INTERLEAVED_HEADER}");
            for point in deltas.iter() {
                let _ = writeln!(out, "{}{SEPARATOR}{}", point.time, point.value);
            }
        }
    }

    let trimmed = out.trim_end().len();
    out.truncate(trimmed);
    out
}

/// Parse a table produced by [`render_delta_text`]
pub fn parse_delta_text(text: &str, layout: Layout) -> Result<DeltaSeries> {
    // (line number, line); blank lines are ignored
    let mut rows = text
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(i, line)| (i + 1, line));

    if rows.next().is_none() {
        return Err(TsError::format("delta table is empty"));
    }
    let rows: Vec<(usize, &str)> = rows.collect();
    if rows.is_empty() {
        return Err(TsError::format("delta table has a header but no data"));
    }

    debug!(rows = rows.len(), ?layout, "parsing delta table");

    match layout {
        Layout::Split => parse_split(&rows),
        Layout::Interleaved => parse_interleaved(&rows),
    }
}

fn parse_split(rows: &[(usize, &str)]) -> Result<DeltaSeries> {
    if rows.len() % 2 != 0 {
        return Err(TsError::format(format!(
            "split delta table needs an even number of data lines, found {}",
            rows.len()
        )));
    }

    let (times, values) = rows.split_at(rows.len() / 2);
    times
        .iter()
        .zip(values)
        .map(|(&(t_line, t), &(v_line, v))| {
            let [time] = fields::<1>(t_line, t)?;
            let [value] = fields::<1>(v_line, v)?;
            Ok(FixedPoint::new(time, value))
        })
        .collect()
}

fn parse_interleaved(rows: &[(usize, &str)]) -> Result<DeltaSeries> {
    rows.iter()
        .map(|&(line_no, line)| {
            let [time, value] = fields::<2>(line_no, line)?;
            Ok(FixedPoint::new(time, value))
        })
        .collect()
}

/// Split a line into exactly `N` base-10 integers
fn fields<const N: usize>(line_no: usize, line: &str) -> Result<[i64; N]> {
    let mut out = [0i64; N];
    let mut count = 0;

    for field in line.split(SEPARATOR) {
        if count == N {
            return Err(TsError::format(format!(
                "line {line_no}: expected {N} field(s), found more"
            )));
        }
        out[count] = field.parse::<i64>().map_err(|e| {
            TsError::format(format!("line {line_no}: invalid integer {field:?}: {e}"))
        })?;
        count += 1;
    }

    if count != N {
        return Err(TsError::format(format!(
            "line {line_no}: expected {N} field(s), found {count}"
        )));
    }
    Ok(out)
}
