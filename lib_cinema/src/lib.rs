//! # lib_cinema
//!
//! Shared library behind the `palace` showtime tracker. Each top-level module
//! is gated behind a cargo feature of the same name so that consumers only
//! pull in the dependencies they need.

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms, unused_qualifications)]

/// Cinema chain registry loaded from a JSON file.
#[cfg(feature = "configs")]
pub mod configs;
/// Local structured logging (TTY, file, in-memory).
#[cfg(feature = "loggers")]
pub mod loggers;
/// Generic HTTP retrieval client.
#[cfg(feature = "retrieve")]
pub mod retrieve;
/// Movie, location and session tracking for a cinema chain's web API.
#[cfg(feature = "cinemas")]
pub mod cinemas;

#[cfg(feature = "configs")]
pub use configs::config_cinemas::*;
#[cfg(feature = "loggers")]
pub use loggers::loggerlocal::*;
#[cfg(feature = "loggers")]
pub use loggers::logrecord::*;
