use thiserror::Error;

pub type MatcherResult<T> = Result<T, ParseError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("Invalid address '{}'{}", .token, at_row(.row))]
    InvalidAddress { token: String, row: Option<usize> },

    #[error("Invalid network spec '{}'{}: {}", .token, at_row(.row), .reason)]
    InvalidSpec {
        token: String,
        row: Option<usize>,
        reason: String,
    },
}

impl ParseError {
    pub(crate) fn address(token: &str) -> Self {
        ParseError::InvalidAddress {
            token: token.to_string(),
            row: None,
        }
    }

    pub(crate) fn spec(token: &str, reason: impl ToString) -> Self {
        ParseError::InvalidSpec {
            token: token.to_string(),
            row: None,
            reason: reason.to_string(),
        }
    }

    /// Attach the source row the offending token was read from
    pub fn with_row(self, source_row: usize) -> Self {
        match self {
            ParseError::InvalidAddress { token, .. } => ParseError::InvalidAddress {
                token,
                row: Some(source_row),
            },
            ParseError::InvalidSpec { token, reason, .. } => ParseError::InvalidSpec {
                token,
                row: Some(source_row),
                reason,
            },
        }
    }

    /// The offending token as it appeared in the input
    pub fn token(&self) -> &str {
        match self {
            ParseError::InvalidAddress { token, .. } | ParseError::InvalidSpec { token, .. } => {
                token
            }
        }
    }

    pub fn row(&self) -> Option<usize> {
        match self {
            ParseError::InvalidAddress { row, .. } | ParseError::InvalidSpec { row, .. } => *row,
        }
    }
}

fn at_row(row: &Option<usize>) -> String {
    match row {
        Some(row) => format!(" (row {})", row),
        None => String::new(),
    }
}
