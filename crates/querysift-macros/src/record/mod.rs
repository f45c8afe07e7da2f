//! Implementation of the `#[derive(Record)]` macro.
//!
//! This module provides derive macro support for querysift, generating
//! property lookups and name constants from struct fields.

mod attrs;
mod derive;

pub use derive::record_derive_impl;
