//! Path-based schema validation for configuration trees

use crate::core::path::split;
use crate::core::tree::{set_at, traverse};
use crate::core::{BoxError, ConfigError, ConfigResult, ConfigTree, Value, ValueKind};
use indexmap::IndexMap;
use std::fmt;
use std::sync::Arc;

/// Custom check run on a present, correctly typed value
pub type FieldPredicate = Arc<dyn Fn(&Value) -> Result<(), BoxError> + Send + Sync>;

/// Rules for one dotted path
#[derive(Clone)]
pub struct SchemaField {
    kind: ValueKind,
    required: bool,
    default: Option<Value>,
    validator: Option<FieldPredicate>,
}

impl fmt::Debug for SchemaField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemaField")
            .field("kind", &self.kind)
            .field("required", &self.required)
            .field("default", &self.default)
            .field("validator", &self.validator.as_ref().map(|_| "<fn>"))
            .finish()
    }
}

impl SchemaField {
    /// Optional field of the given kind
    pub fn new(kind: ValueKind) -> Self {
        Self {
            kind,
            required: false,
            default: None,
            validator: None,
        }
    }

    /// Fail validation when the path is absent or null
    #[must_use = "builder methods must be chained or built"]
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Value written into the tree when the path is absent
    ///
    /// Ignored for required fields, which fail instead.
    #[must_use = "builder methods must be chained or built"]
    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// Run `f` on present values after the kind check
    #[must_use = "builder methods must be chained or built"]
    pub fn with_validator<F, E>(mut self, f: F) -> Self
    where
        F: Fn(&Value) -> Result<(), E> + Send + Sync + 'static,
        E: Into<BoxError>,
    {
        self.validator = Some(Arc::new(move |value: &Value| f(value).map_err(Into::into)));
        self
    }

    /// Declared kind
    pub fn kind(&self) -> ValueKind {
        self.kind
    }

    /// Whether the field is required
    pub fn is_required(&self) -> bool {
        self.required
    }

    /// Default value, if any
    pub fn default_value(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    fn check(&self, path: &str, value: &Value) -> ConfigResult<()> {
        if value.is_null() {
            return if self.required {
                Err(ConfigError::SchemaRequiredNil {
                    path: path.to_string(),
                })
            } else {
                Ok(())
            };
        }

        if value.kind() != self.kind {
            return Err(ConfigError::SchemaTypeMismatch {
                path: path.to_string(),
                expected: self.kind.to_string(),
                actual: value.kind().to_string(),
            });
        }

        if let Some(validator) = &self.validator {
            validator(value).map_err(|source| ConfigError::SchemaPredicate {
                path: path.to_string(),
                source,
            })?;
        }
        Ok(())
    }
}

/// Set of [`SchemaField`]s keyed by dotted path
///
/// Paths are relative to the tree passed to [`validate`](Self::validate) and
/// are checked in the order they were added.
#[derive(Debug, Clone, Default)]
pub struct ConfigSchema {
    fields: IndexMap<String, SchemaField>,
}

impl ConfigSchema {
    /// Create an empty schema
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace the rules for `path`
    pub fn add_field(&mut self, path: impl Into<String>, field: SchemaField) {
        self.fields.insert(path.into(), field);
    }

    /// Builder form of [`add_field`](Self::add_field)
    #[must_use = "builder methods must be chained or built"]
    pub fn field(mut self, path: impl Into<String>, field: SchemaField) -> Self {
        self.add_field(path, field);
        self
    }

    /// Number of declared paths
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether no paths are declared
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Declared paths and their rules
    pub fn fields(&self) -> impl Iterator<Item = (&str, &SchemaField)> {
        self.fields.iter().map(|(path, field)| (path.as_str(), field))
    }

    /// Validate `tree`, writing defaults for absent optional paths
    ///
    /// Stops at the first failing path. Defaults written before the failure
    /// stay in the tree.
    pub fn validate(&self, tree: &mut ConfigTree) -> ConfigResult<()> {
        for (path, field) in &self.fields {
            let segments = split(path);
            match traverse(tree, &segments, path) {
                Ok(value) => field.check(path, value)?,
                Err(_) if field.required => {
                    return Err(ConfigError::SchemaRequiredMissing { path: path.clone() });
                }
                Err(_) => {
                    if let Some(default) = &field.default {
                        tracing::debug!(path = %path, default = %default, "applying schema default");
                        set_at(tree, &segments, default.clone());
                    }
                }
            }
        }
        Ok(())
    }
}
