use thiserror::Error;

#[derive(Error, Debug)]
pub enum HexcryptError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Parse error at {line}:{column}: {message}")]
    Format {
        line: usize,
        column: usize,
        message: String,
        text: String,
    },

    #[error("Parse error at {line}:{column}: checksum error (expected {expected:02X})")]
    Checksum {
        line: usize,
        column: usize,
        expected: u8,
        text: String,
    },

    #[error("Payload too large: {0} bytes, a record holds at most 255")]
    PayloadTooLarge(usize),

    #[error("Invalid key length: {0}. Must be at least 1 byte")]
    InvalidKeyLength(usize),

    #[error("Key is empty")]
    EmptyKey,
}

impl HexcryptError {
    pub(crate) fn format(line: usize, column: usize, message: &str, text: &str) -> Self {
        Self::Format {
            line,
            column,
            message: message.to_string(),
            text: text.to_string(),
        }
    }

    /// True for errors raised while validating record lines
    pub fn is_parse_error(&self) -> bool {
        matches!(self, Self::Format { .. } | Self::Checksum { .. })
    }

    /// Render the error for a terminal. Parse errors get the offending line
    /// and a caret under the failing column.
    pub fn diagnostic(&self) -> String {
        match self {
            Self::Format { column, text, .. } | Self::Checksum { column, text, .. } => {
                format!("{}\n{}\n{}^", self, text, " ".repeat(*column))
            }
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, HexcryptError>;
