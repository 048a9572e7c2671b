//! # Keystone Config Macros
//!
//! Derive support for `keystone-config`. Use it through the re-export:
//!
//! ```ignore
//! use keystone_config::Unmarshal;
//!
//! #[derive(Default, Unmarshal)]
//! struct Database {
//!     host: String,
//!     #[config(required)]
//!     port: i64,
//!     #[config(key = "max_connections")]
//!     pool_size: u32,
//!     #[config(skip)]
//!     resolved: Option<String>,
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

extern crate proc_macro;

use proc_macro::TokenStream;

mod support;
mod unmarshal;

/// Derive `Unmarshal` and `FieldValue` for a struct with named fields.
///
/// Each field is read from the key of the same name, lowercased. Absent keys
/// leave the field untouched.
///
/// # Field attributes
///
/// - `#[config(key = "...")]` - Read this key instead; `"-"` skips the field
/// - `#[config(required)]` - Fail with "required field '<key>' not found in
///   configuration" when the key is absent
/// - `#[config(skip)]` - Never read this field
///
/// Keys are looked up in the current map only; a dotted key is not split.
/// Nested records are filled from nested maps.
#[proc_macro_derive(Unmarshal, attributes(config))]
pub fn derive_unmarshal(input: TokenStream) -> TokenStream {
    unmarshal::derive(input)
}
