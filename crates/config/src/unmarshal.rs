//! [`FieldValue`] implementations for standard field types
//!
//! These decide how a stored [`Value`] lands in a record field produced by
//! `#[derive(Unmarshal)]`. They are more lenient than the typed getters:
//! strings accept any scalar and bools accept integers.

use crate::core::coerce::{parse_bool, split_list};
use crate::core::{ConfigError, ConfigResult, ConfigTree, FieldValue, Value};

fn cannot_convert(value: &Value, target: &str) -> ConfigError {
    ConfigError::conversion(format!("cannot convert {} to {target}", value.type_name()))
}

fn to_i64(value: &Value) -> ConfigResult<i64> {
    match value {
        Value::Int(i) => Ok(*i),
        Value::Float(f) => Ok(*f as i64),
        Value::String(s) => s
            .parse::<i64>()
            .map_err(|e| ConfigError::conversion(format!("invalid int64 '{s}': {e}"))),
        other => Err(cannot_convert(other, "int64")),
    }
}

fn to_u64(value: &Value) -> ConfigResult<u64> {
    match value {
        Value::Uint(u) => Ok(*u),
        Value::Float(f) if *f < 0.0 => Err(ConfigError::conversion(
            "cannot convert negative float64 to uint64",
        )),
        Value::Float(f) => Ok(*f as u64),
        Value::String(s) => s
            .parse::<u64>()
            .map_err(|e| ConfigError::conversion(format!("invalid uint64 '{s}': {e}"))),
        other => Err(cannot_convert(other, "uint64")),
    }
}

fn to_f64(value: &Value) -> ConfigResult<f64> {
    match value {
        Value::Float(f) => Ok(*f),
        Value::Int(i) => Ok(*i as f64),
        Value::String(s) => s
            .parse::<f64>()
            .map_err(|e| ConfigError::conversion(format!("invalid float64 '{s}': {e}"))),
        other => Err(cannot_convert(other, "float64")),
    }
}

macro_rules! impl_signed {
    ($($t:ty),*) => {
        $(impl FieldValue for $t {
            fn assign(&mut self, value: &Value) -> ConfigResult<()> {
                let wide = to_i64(value)?;
                *self = <$t>::try_from(wide).map_err(|_| {
                    ConfigError::conversion(format!("value {} overflows {}", wide, stringify!($t)))
                })?;
                Ok(())
            }
        })*
    };
}

macro_rules! impl_unsigned {
    ($($t:ty),*) => {
        $(impl FieldValue for $t {
            fn assign(&mut self, value: &Value) -> ConfigResult<()> {
                let wide = to_u64(value)?;
                *self = <$t>::try_from(wide).map_err(|_| {
                    ConfigError::conversion(format!("value {} overflows {}", wide, stringify!($t)))
                })?;
                Ok(())
            }
        })*
    };
}

impl_signed!(i8, i16, i32, i64, isize);
impl_unsigned!(u8, u16, u32, u64, usize);

impl FieldValue for f64 {
    fn assign(&mut self, value: &Value) -> ConfigResult<()> {
        *self = to_f64(value)?;
        Ok(())
    }
}

impl FieldValue for f32 {
    fn assign(&mut self, value: &Value) -> ConfigResult<()> {
        *self = to_f64(value)? as f32;
        Ok(())
    }
}

impl FieldValue for String {
    fn assign(&mut self, value: &Value) -> ConfigResult<()> {
        *self = match value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        Ok(())
    }
}

impl FieldValue for bool {
    fn assign(&mut self, value: &Value) -> ConfigResult<()> {
        *self = match value {
            Value::Bool(b) => *b,
            Value::Int(i) => *i != 0,
            Value::String(s) => parse_bool(s).map_err(|e| {
                ConfigError::conversion(format!("invalid bool '{s}': {e}"))
            })?,
            other => return Err(cannot_convert(other, "bool")),
        };
        Ok(())
    }
}

impl FieldValue for Vec<String> {
    fn assign(&mut self, value: &Value) -> ConfigResult<()> {
        *self = match value {
            Value::String(s) => split_list(s),
            Value::Array(items) => items
                .iter()
                .enumerate()
                .map(|(index, item)| match item {
                    Value::String(s) => Ok(s.clone()),
                    other => Err(ConfigError::conversion(format!(
                        "cannot convert item at index {index} to string: found type {}",
                        other.type_name()
                    ))),
                })
                .collect::<ConfigResult<_>>()?,
            other => return Err(cannot_convert(other, "[]string")),
        };
        Ok(())
    }
}

impl<T: FieldValue + Default> FieldValue for Option<T> {
    fn assign(&mut self, value: &Value) -> ConfigResult<()> {
        if value.is_null() {
            *self = None;
            return Ok(());
        }
        let mut inner = T::default();
        inner.assign(value)?;
        *self = Some(inner);
        Ok(())
    }
}

impl FieldValue for Value {
    fn assign(&mut self, value: &Value) -> ConfigResult<()> {
        *self = value.clone();
        Ok(())
    }
}

impl FieldValue for ConfigTree {
    fn assign(&mut self, value: &Value) -> ConfigResult<()> {
        match value {
            Value::Map(tree) => {
                *self = tree.clone();
                Ok(())
            }
            other => Err(cannot_convert(other, "map")),
        }
    }
}
