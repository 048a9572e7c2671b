//! Pure read/write primitives over nested [`ConfigTree`]s

use super::{ConfigError, ConfigResult, ConfigTree, Value};

/// Walk `tree` one level per segment and return the value at the end
///
/// `full_path` is only used for error messages. Failures at an intermediate
/// segment report the segments visited so far (including the failing one);
/// a missing final key reports just that key.
pub fn traverse<'a>(
    tree: &'a ConfigTree,
    segments: &[String],
    full_path: &str,
) -> ConfigResult<&'a Value> {
    let Some((last, parents)) = segments.split_last() else {
        return Err(ConfigError::invalid_path(full_path));
    };

    let mut current = tree;
    for (i, segment) in parents.iter().enumerate() {
        match current.get(segment) {
            Some(Value::Map(next)) => current = next,
            Some(_) => {
                return Err(ConfigError::not_a_map(segments[..=i].join("."), full_path));
            }
            None => {
                return Err(ConfigError::key_not_found(segments[..=i].join("."), full_path));
            }
        }
    }

    current
        .get(last)
        .ok_or_else(|| ConfigError::key_not_found(last.as_str(), full_path))
}

/// Assign `value` at `segments`, creating intermediate maps as needed
///
/// Intermediate segments that are absent or hold a non-map value are
/// replaced with an empty map. An empty segment list is a no-op.
pub fn set_at(tree: &mut ConfigTree, segments: &[String], value: Value) {
    let Some((last, parents)) = segments.split_last() else {
        return;
    };

    let mut current = tree;
    for segment in parents {
        let slot = current
            .entry(segment.clone())
            .or_insert_with(|| Value::Map(ConfigTree::new()));
        if !matches!(slot, Value::Map(_)) {
            *slot = Value::Map(ConfigTree::new());
        }
        let Value::Map(next) = slot else {
            return;
        };
        current = next;
    }

    current.insert(last.clone(), value);
}
