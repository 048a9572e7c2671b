//! Unmarshal derive - successful cases.

use keystone_config::{ConfigTree, Unmarshal, Value};

/// Every supported field kind.
#[derive(Debug, Default, Unmarshal)]
pub struct Everything {
    text: String,
    small: i8,
    wide: i64,
    size: usize,
    ratio: f32,
    enabled: bool,
    hosts: Vec<String>,
    maybe: Option<u32>,
    raw: Value,
    subtree: ConfigTree,
    nested: Nested,
    #[config(key = "renamed", required)]
    field: String,
    #[config(skip)]
    _cache: Vec<u8>,
    #[config(key = "-")]
    _also_skipped: std::time::Duration,
}

#[derive(Debug, Default, Unmarshal)]
pub struct Nested {
    #[config(required)]
    id: u64,
}

/// All fields skipped.
#[derive(Default, Unmarshal)]
pub struct Opaque {
    #[config(skip)]
    _inner: std::collections::HashMap<String, String>,
}

/// Generic records work when the parameter is a field value.
#[derive(Default, Unmarshal)]
pub struct Wrapper<T: keystone_config::FieldValue + Default> {
    inner: T,
}

fn main() {
    let mut tree = ConfigTree::new();
    tree.insert("renamed".into(), Value::from("x"));
    tree.insert(
        "nested".into(),
        Value::Map([("id".to_string(), Value::from(1_u64))].into_iter().collect()),
    );

    let mut everything = Everything::default();
    keystone_config::Unmarshal::unmarshal_from(&mut everything, &tree).unwrap();
    assert_eq!(everything.field, "x");
    assert_eq!(everything.nested.id, 1);

    let mut opaque = Opaque::default();
    opaque.unmarshal_from(&ConfigTree::new()).unwrap();

    let mut wrapper = Wrapper::<String>::default();
    wrapper.unmarshal_from(&ConfigTree::new()).unwrap();
    assert!(wrapper.inner.is_empty());
}
