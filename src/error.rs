use serde::Deserialize;
use thiserror::Error;

use std::fmt::Display;

/// A single error triple as reported by the Square API.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
pub struct ApiError {
    pub category: String,
    pub code: String,
    #[serde(default)]
    pub detail: String,
}

impl ApiError {
    #[must_use]
    pub fn new(
        category: impl Into<String>,
        code: impl Into<String>,
        detail: impl Into<String>,
    ) -> Self {
        Self {
            category: category.into(),
            code: code.into(),
            detail: detail.into(),
        }
    }
}

/// The ordered list of errors carried by a failed API response.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ApiErrors(pub Vec<ApiError>);

impl ApiErrors {
    /// Wraps a transport or decoding failure that never produced a
    /// structured response of its own.
    #[must_use]
    pub fn synthesized(category: &str, code: &str, detail: impl Display) -> Self {
        Self(vec![ApiError::new(category, code, detail.to_string())])
    }
}

impl Display for ApiErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for err in &self.0 {
            writeln!(f)?;
            writeln!(f, "\tcategory: {}", err.category)?;
            writeln!(f, "\tcode: {}", err.code)?;
            write!(f, "\tdetail: {}", err.detail)?;
        }
        Ok(())
    }
}

/// Errors that end a report run.
#[derive(Debug, Error)]
pub enum Error {
    /// Bad operator input, caught before any request is made.
    #[error("invalid input: {0}")]
    Validation(String),

    /// One of the remote operations reported failure.
    #[error("{operation} failed:{errors}")]
    Remote {
        operation: &'static str,
        errors: ApiErrors,
    },

    #[error("configuration: {0}")]
    Config(String),

    #[error("building HTTP client: {0}")]
    Client(#[from] reqwest::Error),

    #[error("writing report: {0}")]
    Io(#[from] std::io::Error),

    #[error("writing CSV: {0}")]
    Csv(#[from] csv::Error),
}

impl Error {
    pub(crate) fn remote(operation: &'static str, errors: ApiErrors) -> Self {
        Self::Remote { operation, errors }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
