/// Errors that can occur while building or loading a calibration table
#[derive(Debug, thiserror::Error)]
pub enum CalibrationError {
    /// I/O error reading the calibration file
    #[error("Failed to read calibration file: {0}")]
    IoError(#[from] std::io::Error),

    /// CSV parsing error
    #[error("CSV parsing error: {0}")]
    CsvError(#[from] csv::Error),

    /// Required column missing from the header row
    #[error("Missing required calibration column: {0}")]
    MissingColumn(&'static str),

    /// A numeric column holds something that is not a number
    #[error("Invalid value for '{column}' of {chem_id}: {value:?}")]
    InvalidValue {
        /// Chemical the row belongs to
        chem_id: String,
        /// Column name
        column: &'static str,
        /// Raw cell content
        value: String,
    },

    /// The same chemical appears twice
    #[error("Duplicate chemical identifier: {0}")]
    DuplicateChemId(String),

    /// Retention window is empty or inverted
    #[error("Invalid retention window for {chem_id}: start {start} must be below end {end}")]
    InvalidWindow {
        /// Chemical the window belongs to
        chem_id: String,
        /// Window start in minutes
        start: f64,
        /// Window end in minutes
        end: f64,
    },

    /// Chemical identifier collides with a reserved record key or is blank
    #[error("Invalid chemical identifier: {0:?}")]
    InvalidChemId(String),
}
