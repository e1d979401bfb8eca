/// Convenience result type used across animdown.
pub type AnimResult<T> = Result<T, AnimError>;

/// Error taxonomy for one DSL block.
///
/// Every variant is recoverable at block granularity: batch APIs turn it into a
/// [`Diagnostic`](crate::Diagnostic) in the failing block's slot and keep going.
#[derive(thiserror::Error, Debug)]
pub enum AnimError {
    /// Malformed line, unknown verb, bad quoting, invalid range or unknown color.
    #[error("syntax error at line {line}: {message}")]
    Syntax { line: usize, message: String },

    /// A name was declared twice in the same block.
    #[error("duplicate name '{name}' at line {line} (first declared at line {first_line})")]
    DuplicateName {
        name: String,
        line: usize,
        first_line: usize,
    },

    /// A name was referenced before (or without) being declared.
    #[error("undefined reference '{name}' at line {line}")]
    UndefinedReference { name: String, line: usize },

    /// A name was referenced where its kind cannot be used.
    #[error("type error at line {line}: '{name}' is {found}, expected {expected}")]
    Type {
        name: String,
        line: usize,
        expected: &'static str,
        found: String,
    },

    /// The backend process failed, exited non-zero, timed out or produced no output.
    #[error("render error: {message}")]
    Render {
        message: String,
        output: Option<String>,
    },

    /// Artifact storage could not be read or written.
    #[error("cache error: {0}")]
    Cache(String),

    /// Invalid compiler configuration.
    #[error("config error: {0}")]
    Config(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl AnimError {
    /// Build an [`AnimError::Syntax`] value.
    pub fn syntax(line: usize, msg: impl Into<String>) -> Self {
        Self::Syntax {
            line,
            message: msg.into(),
        }
    }

    /// Build an [`AnimError::Render`] value without backend output.
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render {
            message: msg.into(),
            output: None,
        }
    }

    /// Build an [`AnimError::Render`] value carrying the backend's diagnostic output.
    pub fn render_with_output(msg: impl Into<String>, output: impl Into<String>) -> Self {
        let output = output.into();
        Self::Render {
            message: msg.into(),
            output: (!output.trim().is_empty()).then_some(output),
        }
    }

    /// Build an [`AnimError::Cache`] value.
    pub fn cache(msg: impl Into<String>) -> Self {
        Self::Cache(msg.into())
    }

    /// Build an [`AnimError::Config`] value.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Source line the error is localized to, if any.
    pub fn line(&self) -> Option<usize> {
        match self {
            Self::Syntax { line, .. }
            | Self::DuplicateName { line, .. }
            | Self::UndefinedReference { line, .. }
            | Self::Type { line, .. } => Some(*line),
            Self::Render { .. } | Self::Cache(_) | Self::Config(_) | Self::Other(_) => None,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
