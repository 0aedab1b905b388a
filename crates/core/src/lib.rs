//! Shop Widget Core - Shared types library.
//!
//! This crate provides the domain types used by the storefront widget:
//! - [`ProductId`] - Type-safe catalog identifiers
//! - [`Price`] - Non-negative decimal prices with display formatting
//! - [`Product`] - A single catalog record
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no
//! rendering, no HTTP clients. This keeps it lightweight and allows it to be
//! used anywhere.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
