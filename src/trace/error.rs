/// Errors that can occur while reading a chromatograph trace file
#[derive(Debug, thiserror::Error)]
pub enum TraceError {
    /// I/O error reading the trace file
    #[error("Failed to read trace: {0}")]
    IoError(#[from] std::io::Error),

    /// File ended before the fixed-size header was complete
    #[error("Truncated header: expected {expected} header lines, found {found}")]
    TruncatedHeader {
        /// Number of header lines the format requires
        expected: usize,
        /// Number of lines actually present
        found: usize,
    },

    /// A header field is missing its `=` separator or has the wrong shape
    #[error("Malformed header field '{field}' on line {line}: {value:?}")]
    MalformedField {
        /// 1-based line number in the file
        line: usize,
        /// Name of the header field
        field: &'static str,
        /// Raw line content
        value: String,
    },

    /// Date and time fields parse but do not name a real instant
    #[error("Invalid acquisition date/time: {0}")]
    InvalidDateTime(String),

    /// Sampling rate must be a positive digit
    #[error("Invalid sampling rate on line {line}: {value:?}")]
    InvalidRate {
        /// 1-based line number in the file
        line: usize,
        /// Raw value after the `=` separator
        value: String,
    },

    /// A data record does not start with an integer sample
    #[error("Invalid data sample on line {line}: {value:?}")]
    InvalidSample {
        /// 1-based line number in the file
        line: usize,
        /// Offending first field
        value: String,
    },

    /// Declared sample count disagrees with the data records read
    #[error("Sample count mismatch: header declares {declared} samples, file contains {actual}")]
    LengthMismatch {
        /// Sample count from the header
        declared: usize,
        /// Number of data records actually parsed
        actual: usize,
    },
}
