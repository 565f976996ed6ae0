//! # Cinema Chain API Module
//!
//! Everything needed to read a cinema chain's public web API.
//!
//! ## Contained Modules:
//!
//! - **`apicall`**: GET + JSON decode, degrading to an empty mapping.
//! - **`models`**: `Location`, `Movie`, `SessionGroup` and the field-level
//!   extraction that turns schema drift into a `TrackerError`.
//! - **`tracker`**: `MovieTracker`, the three listing operations and
//!   session pagination.

/// JSON fetching on top of `retrieve::ky_http`.
pub mod apicall;
/// Typed cinema records and their extraction from raw JSON.
pub mod models;
/// Listing operations and pagination.
pub mod tracker;

pub use apicall::ApiCall;
pub use models::{Location, Movie, SessionGroup, TrackerError};
pub use tracker::{MovieTracker, SessionQuery, SELECTED_CINEMA_ID};
