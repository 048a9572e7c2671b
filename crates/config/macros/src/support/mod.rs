//! Shared helpers for the derive: attribute parsing, diagnostics and
//! struct shape checks.

pub mod attrs;
pub mod diag;
pub mod utils;
