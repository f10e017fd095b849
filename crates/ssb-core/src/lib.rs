//! Core domain + application logic for the sticker saver bot.
//!
//! This crate is framework-agnostic. Telegram lives behind ports (traits)
//! implemented in the adapter crate.

pub mod config;
pub mod domain;
pub mod download;
pub mod errors;
pub mod flow;
pub mod logging;
pub mod messaging;
pub mod ports;
pub mod shutdown;
pub mod storage;

#[cfg(test)]
mod testing;

pub use errors::{Error, Result};
