//! YAML error diagnostics for draft files

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

/// YAML problem with source location
#[derive(Debug, Error, Diagnostic)]
#[error("{message}")]
#[diagnostic(code(onboard::yaml::syntax))]
pub struct YamlSyntaxError {
    #[source_code]
    src: NamedSource<String>,

    #[label("error here")]
    span: SourceSpan,

    #[help]
    help: Option<String>,

    message: String,
}

impl YamlSyntaxError {
    /// Create a syntax error from a serde_yml error
    pub fn from_serde_error(err: &serde_yml::Error, source: &str, filename: &str) -> Self {
        let (line, column) = err
            .location()
            .map(|loc| (loc.line(), loc.column()))
            .unwrap_or((1, 1));

        let message = err.to_string();
        let help = generate_help(&message);
        Self::at_location(format!("YAML syntax error: {}", message), source, filename, line, column, help)
    }

    /// Create an error at a specific 1-based line and column
    pub fn at_location(
        message: impl Into<String>,
        source: &str,
        filename: &str,
        line: usize,
        column: usize,
        help: Option<String>,
    ) -> Self {
        let offset = line_col_to_offset(source, line, column);

        Self {
            src: NamedSource::new(filename, source.to_string()),
            span: SourceSpan::from(offset..offset.saturating_add(1)),
            help,
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn offset(&self) -> usize {
        self.span.offset()
    }
}

/// Error loading a YAML document from disk
#[derive(Debug, Error, Diagnostic)]
pub enum YamlError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Syntax(#[from] YamlSyntaxError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convert 1-based line/column to byte offset
pub fn line_col_to_offset(source: &str, line: usize, column: usize) -> usize {
    let mut line_start = 0;
    for (i, l) in source.split_inclusive('\n').enumerate() {
        if i + 1 == line {
            let within = l
                .char_indices()
                .nth(column.saturating_sub(1))
                .map(|(j, _)| j)
                .unwrap_or(l.len());
            return line_start + within;
        }
        line_start += l.len();
    }
    source.len().saturating_sub(1)
}

/// 1-based line of the first top-level key named `key`
pub fn find_top_level_key_line(source: &str, key: &str) -> Option<usize> {
    let pattern = format!("{}:", key);
    source
        .lines()
        .position(|l| l.starts_with(&pattern))
        .map(|i| i + 1)
}

/// Generate helpful suggestions based on error message
fn generate_help(message: &str) -> Option<String> {
    let msg_lower = message.to_lowercase();

    if msg_lower.contains("tab") {
        return Some(
            "YAML requires spaces for indentation, not tabs. Replace tabs with spaces.".to_string(),
        );
    }

    if msg_lower.contains("duplicate") {
        return Some("Each key can only appear once. Remove or rename the duplicate key.".to_string());
    }

    if msg_lower.contains("expected block end") {
        return Some("Check your indentation - it may be inconsistent.".to_string());
    }

    if msg_lower.contains("mapping values are not allowed") {
        return Some("You may be missing a space after ':' or have incorrect indentation.".to_string());
    }

    if msg_lower.contains("@") {
        return Some("Values starting with special characters like @ need quotes: \"@value\"".to_string());
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_col_to_offset() {
        let source = "line1\nline2\nline3";
        assert_eq!(line_col_to_offset(source, 1, 1), 0);
        assert_eq!(line_col_to_offset(source, 2, 1), 6);
        assert_eq!(line_col_to_offset(source, 3, 3), 14);
    }

    #[test]
    fn test_find_top_level_key_line() {
        let source = "account:\n  email: a@b.co\npersonal:\n  first_name: Omar\n";
        assert_eq!(find_top_level_key_line(source, "personal"), Some(3));
        assert_eq!(find_top_level_key_line(source, "email"), None);
    }

    #[test]
    fn test_help_generation() {
        assert!(generate_help("found tab character").is_some());
        assert!(generate_help("duplicate entry with key").is_some());
        assert!(generate_help("some random error").is_none());
    }
}
