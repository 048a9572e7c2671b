//! Traits for projecting configuration subtrees into typed records

use super::{ConfigResult, ConfigTree, Value};

/// A record that can be filled from a configuration subtree
///
/// Normally implemented with `#[derive(Unmarshal)]`. Fields whose key is
/// absent from the tree keep their current value.
pub trait Unmarshal {
    /// Overwrite the fields present in `tree`
    fn unmarshal_from(&mut self, tree: &ConfigTree) -> ConfigResult<()>;
}

/// A field type that can be assigned from a single stored [`Value`]
///
/// Implemented for strings, integers, floats, bools, `Vec<String>`,
/// `Option<T>`, raw [`Value`]s and trees, and every derived record.
pub trait FieldValue {
    /// Assign `value` into `self`, coercing where the conversion table allows
    fn assign(&mut self, value: &Value) -> ConfigResult<()>;
}
