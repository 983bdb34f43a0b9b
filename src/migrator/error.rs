use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort the migration of one file
///
/// Missing lifecycle methods, call sites or companion objects are not errors:
/// the step that needed them is skipped.
#[derive(Debug, Error)]
pub enum MigrationError {
    /// The input file could not be split into declarations
    #[error("[Line {line}:{column}] {message}")]
    Parse {
        message: String,
        line: usize,
        column: usize,
    },

    /// Text generated by the migrator did not parse back into a node
    #[error("generated {kind} for class `{class}` did not parse: `{text}`")]
    SyntheticParse {
        kind: &'static str,
        class: String,
        text: String,
    },

    #[error("failed to access `{}`: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl MigrationError {
    pub fn parse(message: impl Into<String>, line: usize, column: usize) -> Self {
        MigrationError::Parse {
            message: message.into(),
            line,
            column,
        }
    }

    /// Fill in the class name once the failing fragment is known to belong to one
    pub fn in_class(self, class_name: &str) -> Self {
        match self {
            MigrationError::SyntheticParse { kind, text, .. } => MigrationError::SyntheticParse {
                kind,
                class: class_name.to_string(),
                text,
            },
            other => other,
        }
    }
}

pub type Result<T> = std::result::Result<T, MigrationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_message_has_position() {
        let err = MigrationError::parse("Unclosed '{'", 3, 7);
        assert_eq!(err.to_string(), "[Line 3:7] Unclosed '{'");
    }

    #[test]
    fn test_in_class_fills_synthetic_parse_class() {
        let err = MigrationError::SyntheticParse {
            kind: "property",
            class: String::new(),
            text: "private val".to_string(),
        }
        .in_class("MainActivity");

        assert!(err.to_string().contains("`MainActivity`"));
        assert!(err.to_string().contains("`private val`"));
    }
}
