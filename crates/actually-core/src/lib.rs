//! Core library for actually: response formatting, configuration,
//! local persistence and the completion API client.

pub mod api;
pub mod config;
pub mod formatter;
pub mod logging;
pub mod storage;

pub use formatter::{Node, format};
