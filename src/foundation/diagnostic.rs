use std::fmt;

use serde::Serialize;

use crate::foundation::error::AnimError;

/// Category of a [`Diagnostic`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    Syntax,
    DuplicateName,
    UndefinedReference,
    Type,
    Render,
    Cache,
    Config,
    Internal,
}

impl DiagnosticKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Syntax => "syntax error",
            Self::DuplicateName => "duplicate name",
            Self::UndefinedReference => "undefined reference",
            Self::Type => "type error",
            Self::Render => "render error",
            Self::Cache => "cache error",
            Self::Config => "config error",
            Self::Internal => "internal error",
        }
    }
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured, serializable report of a failed block.
///
/// This is what the document preprocessor receives in place of an artifact; it is expected to
/// render it inline (see [`Diagnostic::to_warning_html`]) rather than abort the document.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
    /// Backend output attached to render failures.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl Diagnostic {
    pub fn to_warning_html(&self) -> String {
        let mut body = match self.line {
            Some(line) => format!("line {line}: {}: {}", self.kind, self.message),
            None => format!("{}: {}", self.kind, self.message),
        };
        if let Some(detail) = &self.detail {
            body.push_str("\n\n");
            body.push_str(detail);
        }
        format!(
            "<div class=\"warning-box\" data-title=\"Animation Render Failed\">\n\n{}\n\n</div>",
            escape_html(&body)
        )
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.line {
            Some(line) => write!(f, "line {line}: {}: {}", self.kind, self.message),
            None => write!(f, "{}: {}", self.kind, self.message),
        }
    }
}

impl From<&AnimError> for Diagnostic {
    fn from(err: &AnimError) -> Self {
        let (kind, message, detail) = match err {
            AnimError::Syntax { message, .. } => (DiagnosticKind::Syntax, message.clone(), None),
            AnimError::DuplicateName {
                name, first_line, ..
            } => (
                DiagnosticKind::DuplicateName,
                format!("'{name}' is already declared at line {first_line}"),
                None,
            ),
            AnimError::UndefinedReference { name, .. } => (
                DiagnosticKind::UndefinedReference,
                format!("'{name}' is not declared before this line"),
                None,
            ),
            AnimError::Type {
                name,
                expected,
                found,
                ..
            } => (
                DiagnosticKind::Type,
                format!("'{name}' is {found}, expected {expected}"),
                None,
            ),
            AnimError::Render { message, output } => {
                (DiagnosticKind::Render, message.clone(), output.clone())
            }
            AnimError::Cache(message) => (DiagnosticKind::Cache, message.clone(), None),
            AnimError::Config(message) => (DiagnosticKind::Config, message.clone(), None),
            AnimError::Other(e) => (DiagnosticKind::Internal, format!("{e:#}"), None),
        };
        Self {
            kind,
            message,
            line: err.line(),
            detail,
        }
    }
}

impl From<AnimError> for Diagnostic {
    fn from(err: AnimError) -> Self {
        Self::from(&err)
    }
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/diagnostic.rs"]
mod tests;
