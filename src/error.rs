//! Error types shared by the resolvers.

use std::path::PathBuf;

use thiserror::Error;

/// Convenience result alias for fallible widget operations.
pub type Result<T> = std::result::Result<T, WidgetError>;

/// Errors raised while resolving widget scripts and model assets.
#[derive(Debug, Error)]
pub enum WidgetError {
    /// The directory does not contain a `*.model.json` or `*.model3.json` file.
    #[error("no model descriptor found in {}", dir.display())]
    DescriptorNotFound {
        /// Directory that was searched.
        dir: PathBuf,
    },

    /// The directory contains more than one model descriptor.
    #[error("ambiguous model descriptors in {}: {}", dir.display(), candidates.join(", "))]
    AmbiguousDescriptor {
        /// Directory that was searched.
        dir: PathBuf,
        /// Descriptor file names that matched.
        candidates: Vec<String>,
    },

    /// A generator was requested with an empty source or target.
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),

    /// No resolution strategy produced a model manifest URL.
    #[error("did not find a model for `{0}`")]
    ModelNotFound(String),

    /// A package directory exists but its metadata is missing or unreadable.
    #[error("malformed package `{name}` at {}: {reason}", dir.display())]
    MalformedPackage {
        /// Requested package name.
        name: String,
        /// Package directory that was found.
        dir: PathBuf,
        /// Description of what was wrong with the metadata.
        reason: String,
    },

    /// Reading a file failed.
    #[error("failed to read {}", path.display())]
    Io {
        /// Path that caused the error.
        path: PathBuf,
        /// Source I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A JSON document could not be parsed.
    #[error("failed to parse {}", path.display())]
    Parse {
        /// Path that caused the error.
        path: PathBuf,
        /// Source parse error.
        #[source]
        source: serde_json::Error,
    },

    /// A YAML configuration file could not be parsed.
    #[error("failed to parse configuration {}", path.display())]
    Config {
        /// Path that caused the error.
        path: PathBuf,
        /// Source parse error.
        #[source]
        source: serde_yaml::Error,
    },
}

impl WidgetError {
    /// Returns `true` for errors that mean "no descriptor here", which resolution
    /// strategies treat as a reason to try the next strategy.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::DescriptorNotFound { .. } | Self::AmbiguousDescriptor { .. }
        )
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_descriptor_errors_as_not_found() {
        let missing = WidgetError::DescriptorNotFound {
            dir: PathBuf::from("models/a"),
        };
        let ambiguous = WidgetError::AmbiguousDescriptor {
            dir: PathBuf::from("models/a"),
            candidates: vec!["a.model.json".into(), "b.model3.json".into()],
        };

        assert!(missing.is_not_found());
        assert!(ambiguous.is_not_found());
        assert!(!WidgetError::ModelNotFound("a".into()).is_not_found());
        assert!(!WidgetError::InvalidArgument("source path is empty").is_not_found());
    }

    #[test]
    fn ambiguous_message_lists_candidates() {
        let err = WidgetError::AmbiguousDescriptor {
            dir: PathBuf::from("models/a"),
            candidates: vec!["a.model.json".into(), "b.model3.json".into()],
        };
        assert_eq!(
            err.to_string(),
            "ambiguous model descriptors in models/a: a.model.json, b.model3.json"
        );
    }
}
