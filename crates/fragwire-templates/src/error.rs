//! Template error types.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading or rendering templates.
#[derive(Debug, Error)]
pub enum TemplateError {
    /// The template file could not be read.
    #[error("failed to read template file {}: {source}", path.display())]
    Io {
        /// File that was being read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The template source did not parse.
    #[error("failed to parse template {name}: {source}")]
    Syntax {
        /// Name the source was registered under.
        name: String,
        /// Parser error.
        #[source]
        source: minijinja::Error,
    },
    /// No fragment is defined under the requested name.
    #[error("unknown template: {name}")]
    UnknownTemplate {
        /// Requested fragment name.
        name: String,
    },
    /// Expanding a fragment failed.
    #[error("failed to render template: {0}")]
    Render(#[from] minijinja::Error),
    /// The one-time load failed earlier; nothing can be rendered.
    #[error("template registry unavailable: {reason}")]
    Unavailable {
        /// Display form of the original load failure.
        reason: String,
    },
}

/// Result type for template operations.
pub type Result<T> = std::result::Result<T, TemplateError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_error_display_names_path() {
        let err = TemplateError::Io {
            path: PathBuf::from("/nope/socketTemplates.html"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
        };
        let msg = err.to_string();
        assert!(msg.contains("/nope/socketTemplates.html"));
        assert!(msg.contains("not found"));
    }

    #[test]
    fn unknown_template_display() {
        let err = TemplateError::UnknownTemplate {
            name: "buttonTemplate9".into(),
        };
        assert_eq!(err.to_string(), "unknown template: buttonTemplate9");
    }

    #[test]
    fn unavailable_display() {
        let err = TemplateError::Unavailable {
            reason: "boom".into(),
        };
        assert_eq!(err.to_string(), "template registry unavailable: boom");
    }

    #[test]
    fn render_error_from_conversion() {
        let inner = minijinja::Error::new(minijinja::ErrorKind::InvalidOperation, "bad");
        let err: TemplateError = inner.into();
        assert!(matches!(err, TemplateError::Render(_)));
    }
}
