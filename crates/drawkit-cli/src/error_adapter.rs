//! Error adapter for converting DrawkitError to miette diagnostics.
//!
//! This module provides the bridge between the library's error type and
//! miette's diagnostic formatting used in the CLI.

use std::fmt;

use miette::{Diagnostic as MietteDiagnostic, LabeledSpan};

use drawkit::{Algorithm, DrawkitError};

/// Adapter rendering a [`DrawkitError`] as a miette diagnostic with an
/// error code and, where the fix is known, a help line.
pub struct ErrorAdapter<'a>(pub &'a DrawkitError);

impl ErrorAdapter<'_> {
    fn help_text(&self) -> Option<String> {
        match self.0 {
            DrawkitError::Validation(message) if message.contains("layout algorithm") => Some(
                format!("Supported algorithms: {}", Algorithm::allowed()),
            ),
            DrawkitError::Validation(message) if message.contains("direction") => {
                Some("Supported directions: top-down, left-right".to_string())
            }
            DrawkitError::Validation(message) if message.contains("JSON") => Some(
                "Pass a JSON object or an array of objects, quoted for your shell".to_string(),
            ),
            DrawkitError::NotFound(_) => {
                Some("Run `drawkit info <path>` to list the ids in the diagram".to_string())
            }
            DrawkitError::MalformedDocument(_) => Some(
                "The file must be an SVG with an embedded draw.io diagram, e.g. one created by `drawkit new`"
                    .to_string(),
            ),
            DrawkitError::Config(_) => Some(
                "Config keys live under [layout] and [editing]; pass another file with --config"
                    .to_string(),
            ),
            _ => None,
        }
    }
}

impl fmt::Debug for ErrorAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)
    }
}

impl fmt::Display for ErrorAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl std::error::Error for ErrorAdapter<'_> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.0.source()
    }
}

impl MietteDiagnostic for ErrorAdapter<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        let code = match self.0 {
            DrawkitError::Io(_) => "drawkit::io",
            DrawkitError::Validation(_) => "drawkit::validation",
            DrawkitError::NotFound(_) => "drawkit::not_found",
            DrawkitError::MalformedDocument(_) => "drawkit::malformed_document",
            DrawkitError::Layout(_) => "drawkit::layout",
            DrawkitError::Config(_) => "drawkit::config",
        };
        Some(Box::new(code))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        self.help_text()
            .map(|help| Box::new(help) as Box<dyn fmt::Display>)
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        None
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_and_help() {
        let error = DrawkitError::Validation(
            "Unsupported layout algorithm: spiral. Supported algorithms: ...".to_string(),
        );
        let adapter = ErrorAdapter(&error);

        assert_eq!(adapter.code().unwrap().to_string(), "drawkit::validation");
        assert!(adapter.help().unwrap().to_string().contains("radial-tree"));
    }

    #[test]
    fn test_config_errors_have_their_own_code() {
        let error = DrawkitError::Config("invalid drawkit config in a.toml".to_string());
        let adapter = ErrorAdapter(&error);

        assert_eq!(adapter.code().unwrap().to_string(), "drawkit::config");
        assert!(adapter.help().unwrap().to_string().contains("[layout]"));
    }

    #[test]
    fn test_io_has_no_help() {
        let error = DrawkitError::Io(std::io::Error::other("disk full"));
        let adapter = ErrorAdapter(&error);

        assert_eq!(adapter.code().unwrap().to_string(), "drawkit::io");
        assert!(adapter.help().is_none());
    }
}
