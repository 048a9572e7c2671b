//! Configuration validators

mod schema;

pub use schema::{ConfigSchema, FieldPredicate, SchemaField};
