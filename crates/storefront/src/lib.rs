//! Shop widget storefront library.
//!
//! A product grid with search, a cart persisted in a key-value store, and a
//! modal cart panel, rendered into an in-memory [`dom::Document`]. The
//! `shop-widget` binary drives it from the command line and can serve the
//! page shell and catalog over HTTP.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod catalog;
pub mod commands;
pub mod config;
pub mod dialogs;
pub mod dom;
pub mod error;
pub mod modal;
pub mod render;
pub mod runtime;
pub mod search;
pub mod server;
pub mod state;
pub mod storage;

#[cfg(test)]
mod testing;

pub use commands::{Command, Key, Scheduled};
pub use config::WidgetConfig;
pub use state::AppState;
