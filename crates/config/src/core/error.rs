//! Configuration error types

use thiserror::Error;

/// Boxed error returned by schema predicates and other user callbacks
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Configuration error type
///
/// Display strings are stable: callers match on substrings of them.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Registry constructed without an environment label
    #[error("env is required when initializing config registry")]
    EnvRequired,

    /// Unknown environment label
    #[error("invalid env: {env}")]
    InvalidEnv {
        /// Label that was rejected
        env: String,
    },

    /// The `.env` collaborator failed
    #[error("error loading {file} file: {message}")]
    DotenvFailed {
        /// File name that was requested (`.env`, `.env.testing`)
        file: String,
        /// Message from the loader
        message: String,
    },

    /// A write path without a key below the section
    #[error("invalid config path: {path}")]
    InvalidPath {
        /// Offending path
        path: String,
    },

    /// No section registered under this name
    #[error("config section not found: {}", section_in_path(.section, .path.as_deref()))]
    SectionNotFound {
        /// Section name (first path segment)
        section: String,
        /// Full path, when the lookup was path-addressed
        path: Option<String>,
    },

    /// Section registered but its loader produced no tree
    #[error("config section is nil: '{section}' in path '{path}'")]
    SectionNil {
        /// Section name
        section: String,
        /// Full path
        path: String,
    },

    /// Missing key during traversal
    #[error("key not found: '{key}' in path '{path}'")]
    KeyNotFound {
        /// Accumulated prefix or final segment
        key: String,
        /// Full path
        path: String,
    },

    /// Traversal hit a scalar before the last segment
    #[error("value at '{prefix}' in path '{path}' is not a map, cannot traverse further")]
    NotAMap {
        /// Accumulated prefix that holds the scalar
        prefix: String,
        /// Full path
        path: String,
    },

    /// A resolved value is not a subtree where one is required
    #[error("value at '{path}' is not a map")]
    NotATree {
        /// Path that was resolved
        path: String,
    },

    /// Typed getter received a value kind outside its coercion table
    #[error("cannot convert value at path '{path}' to {target}: found type {found}")]
    TypeMismatch {
        /// Full path
        path: String,
        /// Requested output type
        target: &'static str,
        /// Type name of the stored value
        found: &'static str,
    },

    /// String to scalar parse failure
    #[error("cannot convert value '{value}' at path '{path}' to {target}: {message}")]
    ParseFailed {
        /// Raw string value
        value: String,
        /// Full path
        path: String,
        /// Requested output type
        target: &'static str,
        /// Parser message
        message: String,
    },

    /// Non-string element in a string array
    #[error("cannot convert item at index {index} in path '{path}' to string: found type {found}")]
    ArrayElementMismatch {
        /// Element position
        index: usize,
        /// Full path
        path: String,
        /// Type name of the element
        found: &'static str,
    },

    /// Unmarshal target rejected
    #[error("unmarshal target must be a non-nil pointer")]
    InvalidTarget,

    /// A `required` record field has no key in the subtree
    #[error("required field '{key}' not found in configuration")]
    RequiredFieldMissing {
        /// Configuration key of the field
        key: String,
    },

    /// Field type with no projection
    #[error("unsupported field type: {kind}")]
    UnsupportedFieldType {
        /// Rust type name of the field
        kind: String,
    },

    /// Scalar conversion failure while projecting a field
    #[error("{message}")]
    Conversion {
        /// Conversion message
        message: String,
    },

    /// Projection of a single record field failed
    #[error("error setting field '{key}': {source}")]
    Field {
        /// Configuration key of the field
        key: String,
        /// Underlying failure
        #[source]
        source: Box<ConfigError>,
    },

    /// Schema: required path absent
    #[error("required field missing: {path}")]
    SchemaRequiredMissing {
        /// Dotted schema path
        path: String,
    },

    /// Schema: required path present but null
    #[error("validation failed for {path}: required field is nil")]
    SchemaRequiredNil {
        /// Dotted schema path
        path: String,
    },

    /// Schema: value kind differs from the declared kind
    #[error("validation failed for {path}: expected type {expected}, got {actual}")]
    SchemaTypeMismatch {
        /// Dotted schema path
        path: String,
        /// Declared kind
        expected: String,
        /// Kind found in the tree
        actual: String,
    },

    /// Schema: custom predicate rejected the value
    #[error("validation failed for {path}: {source}")]
    SchemaPredicate {
        /// Dotted schema path
        path: String,
        /// Predicate error
        #[source]
        source: BoxError,
    },
}

fn section_in_path(section: &str, path: Option<&str>) -> String {
    match path {
        Some(path) => format!("'{section}' in path '{path}'"),
        None => section.to_string(),
    }
}

impl ConfigError {
    /// Create an invalid env error
    pub fn invalid_env(env: impl Into<String>) -> Self {
        Self::InvalidEnv { env: env.into() }
    }

    /// Create a dotenv failure
    pub fn dotenv_failed(file: impl Into<String>, message: impl Into<String>) -> Self {
        Self::DotenvFailed {
            file: file.into(),
            message: message.into(),
        }
    }

    /// Create an invalid path error
    pub fn invalid_path(path: impl Into<String>) -> Self {
        Self::InvalidPath { path: path.into() }
    }

    /// Create a section-not-found error for a path-addressed lookup
    pub fn section_not_found(section: impl Into<String>, path: impl Into<String>) -> Self {
        Self::SectionNotFound {
            section: section.into(),
            path: Some(path.into()),
        }
    }

    /// Create a section-not-found error for a lookup by section name
    pub fn unknown_section(section: impl Into<String>) -> Self {
        Self::SectionNotFound {
            section: section.into(),
            path: None,
        }
    }

    /// Create a nil section error
    pub fn section_nil(section: impl Into<String>, path: impl Into<String>) -> Self {
        Self::SectionNil {
            section: section.into(),
            path: path.into(),
        }
    }

    /// Create a key-not-found error
    pub fn key_not_found(key: impl Into<String>, path: impl Into<String>) -> Self {
        Self::KeyNotFound {
            key: key.into(),
            path: path.into(),
        }
    }

    /// Create a not-a-map traversal error
    pub fn not_a_map(prefix: impl Into<String>, path: impl Into<String>) -> Self {
        Self::NotAMap {
            prefix: prefix.into(),
            path: path.into(),
        }
    }

    /// Create a type mismatch error
    pub fn type_mismatch(path: impl Into<String>, target: &'static str, found: &'static str) -> Self {
        Self::TypeMismatch {
            path: path.into(),
            target,
            found,
        }
    }

    /// Create a parse error
    pub fn parse_failed(
        value: impl Into<String>,
        path: impl Into<String>,
        target: &'static str,
        message: impl std::fmt::Display,
    ) -> Self {
        Self::ParseFailed {
            value: value.into(),
            path: path.into(),
            target,
            message: message.to_string(),
        }
    }

    /// Create a conversion error
    pub fn conversion(message: impl Into<String>) -> Self {
        Self::Conversion {
            message: message.into(),
        }
    }

    /// Create an unsupported field type error
    pub fn unsupported_field_type(kind: impl Into<String>) -> Self {
        Self::UnsupportedFieldType { kind: kind.into() }
    }

    /// Wrap a field projection failure with its key
    pub fn field(key: impl Into<String>, source: ConfigError) -> Self {
        Self::Field {
            key: key.into(),
            source: Box::new(source),
        }
    }

    /// Create a required field error for record projection
    pub fn required_field_missing(key: impl Into<String>) -> Self {
        Self::RequiredFieldMissing { key: key.into() }
    }

    /// Get the taxonomy tag of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::EnvRequired => ErrorKind::InitEnvMissing,
            Self::InvalidEnv { .. } => ErrorKind::InitEnvInvalid,
            Self::DotenvFailed { .. } => ErrorKind::InitDotenvFailed,
            Self::InvalidPath { .. } => ErrorKind::PathInvalid,
            Self::SectionNotFound { .. } => ErrorKind::SectionMissing,
            Self::SectionNil { .. } => ErrorKind::SectionNil,
            Self::KeyNotFound { .. } => ErrorKind::KeyMissing,
            Self::NotAMap { .. } | Self::NotATree { .. } => ErrorKind::NotAMap,
            Self::TypeMismatch { .. } | Self::Conversion { .. } => ErrorKind::TypeMismatch,
            Self::ParseFailed { .. } => ErrorKind::ParseFailed,
            Self::ArrayElementMismatch { .. } => ErrorKind::ArrayElementMismatch,
            Self::InvalidTarget => ErrorKind::UnmarshalTargetInvalid,
            Self::RequiredFieldMissing { .. } => ErrorKind::UnmarshalRequiredMissing,
            Self::UnsupportedFieldType { .. } => ErrorKind::UnmarshalUnsupportedKind,
            Self::Field { .. } => ErrorKind::UnmarshalField,
            Self::SchemaRequiredMissing { .. } | Self::SchemaRequiredNil { .. } => {
                ErrorKind::SchemaRequiredMissing
            }
            Self::SchemaTypeMismatch { .. } => ErrorKind::SchemaTypeMismatch,
            Self::SchemaPredicate { .. } => ErrorKind::SchemaPredicateFailed,
        }
    }

    /// Check if the error means "nothing stored at this path"
    ///
    /// Typed getters fall back to their default exactly when this holds.
    pub fn is_missing(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::SectionMissing
                | ErrorKind::SectionNil
                | ErrorKind::KeyMissing
                | ErrorKind::NotAMap
        )
    }

    /// Get the innermost error of a field projection chain
    pub fn root_cause(&self) -> &ConfigError {
        match self {
            Self::Field { source, .. } => source.root_cause(),
            other => other,
        }
    }
}

/// Error taxonomy tag
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Construction without an environment label
    InitEnvMissing,
    /// Unknown environment label
    InitEnvInvalid,
    /// `.env` file failed to load
    InitDotenvFailed,
    /// Write path shorter than two segments
    PathInvalid,
    /// Unknown section
    SectionMissing,
    /// Section stored as no tree
    SectionNil,
    /// Missing key
    KeyMissing,
    /// Traversal hit a scalar
    NotAMap,
    /// Coercion table mismatch
    TypeMismatch,
    /// String parse failure
    ParseFailed,
    /// Non-string array element
    ArrayElementMismatch,
    /// Bad unmarshal target
    UnmarshalTargetInvalid,
    /// Required record field absent
    UnmarshalRequiredMissing,
    /// Record field type without projection
    UnmarshalUnsupportedKind,
    /// Record field projection failed
    UnmarshalField,
    /// Schema required path absent or nil
    SchemaRequiredMissing,
    /// Schema kind mismatch
    SchemaTypeMismatch,
    /// Schema predicate failure
    SchemaPredicateFailed,
}
