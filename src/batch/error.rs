/// Errors raised while collecting or tabulating a batch of traces
#[derive(Debug, thiserror::Error)]
pub enum BatchError {
    /// I/O error walking directories or writing output
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// CSV serialization error
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
}
