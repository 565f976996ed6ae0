//! # Data Retrieval Module
//!
//! Generic HTTP retrieval used by the cinema trackers.
//!
//! ## Contained Modules:
//!
//! - **`ky_http`**: A GET-only `ApiClient` built on `reqwest` and
//!   `reqwest-middleware`. It never fails on a non-2xx status; the caller
//!   inspects the returned `ApiResponse`. Retries are opt-in.

/// Generic HTTP API client returning raw responses.
pub mod ky_http;
