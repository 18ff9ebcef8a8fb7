use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use chrono::{DateTime, Local, NaiveDate, NaiveTime, TimeZone, Utc};
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use super::{time_axis, RawTrace, TraceError};

/// Number of lines before the three skipped lines that precede the data
const HEADER_LINES: usize = 22;
/// 1-based positions of the parsed header fields
const DATE_LINE: usize = 19;
const TIME_LINE: usize = 20;
const RATE_LINE: usize = 21;
const SIZE_LINE: usize = 22;
/// Lines between the header and the first data record
const SKIPPED_LINES: usize = 3;
/// Integration-point listing appended by the acquisition software
const IPOINT_MARKER: &str = "IPOINT";
/// Millivolts per volt
const MV_PER_V: f64 = 1000.0;
/// Upper bound on the capacity reserved from the header's declared size
const MAX_PREALLOCATED_SAMPLES: usize = 1 << 20;

/// Time zone used to interpret the header's wall-clock date and time
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimestampZone {
    /// Treat header date/time as UTC
    #[default]
    Utc,
    /// Treat header date/time as the host's local time
    Local,
}

/// Configuration for reading trace files
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReaderConfig {
    /// Zone of the header timestamp
    pub timestamp_zone: TimestampZone,

    /// Largest accepted difference between declared and actual sample counts.
    ///
    /// Within the tolerance both arrays are truncated to the shorter length;
    /// beyond it the file is rejected with [`TraceError::LengthMismatch`].
    pub length_tolerance: usize,
}

/// Parsed header fields of a trace file
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TraceHeader {
    /// Acquisition start
    pub timestamp: DateTime<Utc>,
    /// Samples per second
    pub sample_rate: u32,
    /// Sample count declared by the header
    pub declared_samples: usize,
}

/// Reader for the chromatograph's fixed-layout ASCII export
#[derive(Debug, Clone, Default)]
pub struct TraceReader {
    config: ReaderConfig,
}

impl TraceReader {
    /// Create a reader with default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a reader with the given configuration
    pub fn with_config(config: ReaderConfig) -> Self {
        Self { config }
    }

    /// Read and parse the trace file at `path`
    pub fn read_path<P: AsRef<Path>>(&self, path: P) -> Result<RawTrace, TraceError> {
        let path = path.as_ref();
        debug!("Reading trace {}", path.display());
        let file = File::open(path)?;
        self.read_from(BufReader::new(file))
    }

    /// Parse a trace from any buffered reader
    pub fn read_from<R: BufRead>(&self, reader: R) -> Result<RawTrace, TraceError> {
        let mut lines = reader.lines();

        let mut header_lines = Vec::with_capacity(HEADER_LINES);
        while header_lines.len() < HEADER_LINES {
            match lines.next() {
                Some(line) => header_lines.push(line?),
                None => {
                    return Err(TraceError::TruncatedHeader {
                        expected: HEADER_LINES,
                        found: header_lines.len(),
                    })
                }
            }
        }
        let header = self.parse_header(&header_lines)?;

        for line in lines.by_ref().take(SKIPPED_LINES) {
            line?;
        }

        // The declared size is untrusted until compared with the data read
        let mut signal = Vec::with_capacity(header.declared_samples.min(MAX_PREALLOCATED_SAMPLES));
        let first_data_line = HEADER_LINES + SKIPPED_LINES + 1;
        for (offset, line) in lines.enumerate() {
            let line = line?;
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.contains(IPOINT_MARKER) {
                continue;
            }
            let first = trimmed.split(',').next().unwrap_or_default().trim();
            let millivolts: i64 = first.parse().map_err(|_| TraceError::InvalidSample {
                line: first_data_line + offset,
                value: first.to_string(),
            })?;
            signal.push(millivolts as f64 / MV_PER_V);
        }

        let declared = header.declared_samples;
        let actual = signal.len();
        if declared != actual {
            if declared.abs_diff(actual) > self.config.length_tolerance {
                return Err(TraceError::LengthMismatch { declared, actual });
            }
            warn!(
                "Header declares {} samples but {} were read; truncating to {}",
                declared,
                actual,
                declared.min(actual)
            );
            signal.truncate(declared.min(actual));
        }

        let sample_rate = f64::from(header.sample_rate);
        debug!(
            "Parsed {} samples at {} Hz acquired {}",
            signal.len(),
            header.sample_rate,
            header.timestamp
        );

        Ok(RawTrace {
            timestamp: header.timestamp,
            sample_rate,
            time: time_axis(sample_rate, signal.len()),
            signal,
        })
    }

    /// Parse the 22 fixed header lines
    pub fn parse_header(&self, lines: &[String]) -> Result<TraceHeader, TraceError> {
        if lines.len() < HEADER_LINES {
            return Err(TraceError::TruncatedHeader {
                expected: HEADER_LINES,
                found: lines.len(),
            });
        }
        let line = |number: usize| lines[number - 1].as_str();

        let [month, day, year] = split_numbers(line(DATE_LINE), DATE_LINE, "date", '-')?;
        let [hour, minute, second] = split_numbers(line(TIME_LINE), TIME_LINE, "time", ':')?;
        let timestamp = self.to_timestamp(year, month, day, hour, minute, second)?;

        let rate_value = field_value(line(RATE_LINE), RATE_LINE, "sample rate")?;
        let sample_rate = rate_value
            .chars()
            .next()
            .and_then(|c| c.to_digit(10))
            .filter(|rate| *rate > 0)
            .ok_or_else(|| TraceError::InvalidRate {
                line: RATE_LINE,
                value: rate_value.to_string(),
            })?;

        let size_value = field_value(line(SIZE_LINE), SIZE_LINE, "sample count")?;
        let declared_samples = size_value
            .parse()
            .map_err(|_| TraceError::MalformedField {
                line: SIZE_LINE,
                field: "sample count",
                value: line(SIZE_LINE).to_string(),
            })?;

        Ok(TraceHeader {
            timestamp,
            sample_rate,
            declared_samples,
        })
    }

    fn to_timestamp(
        &self,
        year: u32,
        month: u32,
        day: u32,
        hour: u32,
        minute: u32,
        second: u32,
    ) -> Result<DateTime<Utc>, TraceError> {
        let invalid = || {
            TraceError::InvalidDateTime(format!(
                "{:02}-{:02}-{:04} {:02}:{:02}:{:02}",
                month, day, year, hour, minute, second
            ))
        };
        let year = i32::try_from(year).map_err(|_| invalid())?;
        let date = NaiveDate::from_ymd_opt(year, month, day).ok_or_else(invalid)?;
        let time = NaiveTime::from_hms_opt(hour, minute, second).ok_or_else(invalid)?;
        let naive = date.and_time(time);

        match self.config.timestamp_zone {
            TimestampZone::Utc => Ok(naive.and_utc()),
            TimestampZone::Local => Local
                .from_local_datetime(&naive)
                .earliest()
                .map(|local| local.with_timezone(&Utc))
                .ok_or_else(invalid),
        }
    }
}

/// Text after the first `=` of a `label=value` header line
fn field_value<'a>(
    line: &'a str,
    number: usize,
    field: &'static str,
) -> Result<&'a str, TraceError> {
    line.split_once('=')
        .map(|(_, value)| value.trim())
        .filter(|value| !value.is_empty())
        .ok_or_else(|| TraceError::MalformedField {
            line: number,
            field,
            value: line.to_string(),
        })
}

/// Three `sep`-separated integers from a `label=a<sep>b<sep>c` header line
fn split_numbers(
    line: &str,
    number: usize,
    field: &'static str,
    sep: char,
) -> Result<[u32; 3], TraceError> {
    let malformed = || TraceError::MalformedField {
        line: number,
        field,
        value: line.to_string(),
    };
    let parts: Vec<u32> = field_value(line, number, field)?
        .split(sep)
        .map(|part| part.trim().parse().map_err(|_| malformed()))
        .collect::<Result<_, _>>()?;
    parts.try_into().map_err(|_| malformed())
}
