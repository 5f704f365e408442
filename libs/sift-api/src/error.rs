use std::fmt;

/// Error returned by processor trait methods.
///
/// A processor that cannot transform a record for structural reasons skips
/// it (returns the record unchanged) — an `Err` means the record is
/// unprocessable and is handed to the engine's error policy.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProcessorError {
    /// A field the transform cannot proceed without is absent or mis-typed.
    #[error("required field '{0}' not found in record")]
    MissingField(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("format error: {0}")]
    Format(String),
}

impl ProcessorError {
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingField(field.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn format_err(msg: impl Into<String>) -> Self {
        Self::Format(msg.into())
    }

    /// Add context to the error message, preserving the variant.
    pub fn with_context(self, ctx: impl fmt::Display) -> Self {
        match self {
            Self::Config(msg) => Self::Config(format!("{ctx}: {msg}")),
            Self::Format(msg) => Self::Format(format!("{ctx}: {msg}")),
            other => other,
        }
    }
}

impl From<serde_json::Error> for ProcessorError {
    fn from(e: serde_json::Error) -> Self {
        Self::Format(e.to_string())
    }
}
