// Top-level errors: what a command or the interactive session can fail with.

use thiserror::Error;

use crate::api::ApiError;

/// Every variant is fatal to the process (exit status 1). Cancelling the
/// add-product form is not an error and never shows up here.
#[derive(Error, Debug)]
pub enum CliError {
    /// Missing or invalid arguments; reported with the usage block.
    #[error("{}", .0.as_deref().unwrap_or("invalid usage"))]
    Usage(Option<String>),

    /// Same as `Usage`, for the two-positional order form.
    #[error("{}", .0.as_deref().unwrap_or("invalid usage"))]
    LegacyUsage(Option<String>),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("interrupted")]
    Interrupted,
}

pub type CliResult<T> = Result<T, CliError>;

impl CliError {
    pub fn usage(message: impl Into<String>) -> Self {
        CliError::Usage(Some(message.into()))
    }

    pub fn exit_code(&self) -> i32 {
        1
    }
}
