use super::Format;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O operation failed: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    #[error("failed to parse {format} data: {details} (at line ~{line})")]
    Parse {
        format: Format,
        line: usize,
        details: String,
    },

    #[error("failed to parse system TOML: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("invalid system description: {0}")]
    Conversion(String),

    #[error(transparent)]
    Place(#[from] crate::place::Error),
}

impl Error {
    pub fn parse(format: Format, line: usize, details: impl Into<String>) -> Self {
        Self::Parse {
            format,
            line,
            details: details.into(),
        }
    }

    pub fn conversion(details: impl Into<String>) -> Self {
        Self::Conversion(details.into())
    }
}
