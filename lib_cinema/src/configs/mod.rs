//! # Configuration Modules
//!
//! Loads the cinema chain registry: per-chain base URL, endpoint path
//! suffixes and optional request headers.

/// Cinema chain registry read from a JSON file.
pub mod config_cinemas;
