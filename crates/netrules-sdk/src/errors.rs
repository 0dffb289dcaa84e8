use thiserror::Error;

/// Errors that can occur while running a netrules conversion
#[derive(Error, Debug)]
pub enum SdkError {
    #[error("CSV error: {0}")]
    Csv(#[from] netrules_csvs::CsvError),

    #[error("Parse error: {0}")]
    Parse(#[from] netrules_matcher::ParseError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to write {} output(s): {}", .failures.len(), .failures.join("; "))]
    OutputWrite { failures: Vec<String> },
}

pub type SdkResult<T> = Result<T, SdkError>;
