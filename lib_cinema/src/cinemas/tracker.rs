//! # Movie Tracker
//!
//! Lists locations, movies and sessions of one cinema chain and normalizes each
//! response into a map keyed by the entity's identifier.
//!
//! ## Failure policy
//! All three operations treat schema drift the same way: the first
//! `TrackerError` is logged at error level, processing stops, and whatever was
//! already parsed is returned. An empty mapping (the decode-failure stand-in
//! from `ApiCall`) contributes nothing and is not logged a second time.

use crate::cinemas::apicall::ApiCall;
use crate::cinemas::models::{
    as_records, collect_records, count_field, is_empty_mapping, list_field, ApiRecord, Location, Movie,
    SessionGroup, TrackerError,
};
use crate::loggers::loggerlocal::LoggerLocal;
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::ops::Range;
use std::sync::Arc;

/// Cinema whose sessions are queried. Fixed by the sessions API contract.
pub const SELECTED_CINEMA_ID: u32 = 121;

/// Parameters of one session listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionQuery {
    /// Date in `YYYY-MM-DD` form, inserted into the URL verbatim.
    pub date: String,
    /// Also fetch page `totalPages`. Off by default: pagination stops at
    /// `totalPages - 1`, which is what the tracker has always requested.
    pub include_final_page: bool,
}

impl SessionQuery {
    pub fn new(date: impl Into<String>) -> Self {
        Self {
            date: date.into(),
            include_final_page: false,
        }
    }

    pub fn include_final_page(mut self, include: bool) -> Self {
        self.include_final_page = include;
        self
    }

    /// Full URL for `page`, concatenated onto `endpoint` without encoding.
    pub fn page_url(&self, endpoint: &str, page: u64) -> String {
        format!(
            "{}selectedDates={}&selectedCinemaIds={}&page={}",
            endpoint, self.date, SELECTED_CINEMA_ID, page
        )
    }

    /// Pages requested after page 1, given the reported `totalPages`.
    pub fn remaining_pages(&self, total_pages: u64) -> Range<u64> {
        let end = if self.include_final_page {
            total_pages.saturating_add(1)
        } else {
            total_pages
        };
        2..end.max(2)
    }
}

/// Movie, location and session lookups for one cinema chain.
pub struct MovieTracker {
    api_call: Arc<ApiCall>,
    logger: Arc<LoggerLocal>,
}

impl MovieTracker {
    pub fn new(api_call: Arc<ApiCall>, logger: Arc<LoggerLocal>) -> Self {
        Self { api_call, logger }
    }

    /// # Get Movies
    ///
    /// Every movie in the listing at `endpoint`, keyed by `movieId`.
    pub async fn get_movies(&self, endpoint: &str) -> BTreeMap<String, Movie> {
        let response = self.api_call.get_json_response(endpoint).await;
        self.shape_records(endpoint, &response)
    }

    /// # Get Locations
    ///
    /// Every cinema in the listing at `endpoint`, keyed by `cinemaId`.
    pub async fn get_locations(&self, endpoint: &str) -> BTreeMap<String, Location> {
        let response = self.api_call.get_json_response(endpoint).await;
        self.shape_records(endpoint, &response)
    }

    /// # Get Sessions
    ///
    /// Showings on `date`, keyed by `movieId`. See `get_sessions_with`.
    pub async fn get_sessions(&self, endpoint: &str, date: &str) -> BTreeMap<String, SessionGroup> {
        self.get_sessions_with(endpoint, &SessionQuery::new(date)).await
    }

    /// # Get Sessions (explicit query)
    ///
    /// ## Logic:
    /// 1.  Fetch page 1 and merge its `data` into the result.
    /// 2.  Read `totalPages` from page 1.
    /// 3.  Fetch `query.remaining_pages(totalPages)` one after the other,
    ///     merging each page. A later page overwrites a movie already seen.
    ///
    /// A page that came back empty is skipped. Any structural error stops the
    /// whole query and the groups merged so far are returned.
    pub async fn get_sessions_with(&self, endpoint: &str, query: &SessionQuery) -> BTreeMap<String, SessionGroup> {
        let mut sessions = BTreeMap::new();

        let first_url = query.page_url(endpoint, 1);
        let first_page = self.api_call.get_json_response(&first_url).await;
        if is_empty_mapping(&first_page) {
            return sessions;
        }

        if let Err(e) = merge_session_page(&first_page, &mut sessions) {
            self.report(&first_url, &e);
            return sessions;
        }

        let total_pages = match count_field(&first_page, "totalPages") {
            Ok(total) => total,
            Err(e) => {
                self.report(&first_url, &e);
                return sessions;
            }
        };

        for page in query.remaining_pages(total_pages) {
            let url = query.page_url(endpoint, page);
            self.logger.debug(
                &format!("Fetching sessions page {} of {}", page, total_pages),
                Some(json!({"url": url})),
            );

            let response = self.api_call.get_json_response(&url).await;
            if is_empty_mapping(&response) {
                continue;
            }

            if let Err(e) = merge_session_page(&response, &mut sessions) {
                self.report(&url, &e);
                break;
            }
        }

        sessions
    }

    fn shape_records<T: ApiRecord>(&self, endpoint: &str, response: &Value) -> BTreeMap<String, T> {
        let mut records = BTreeMap::new();
        if is_empty_mapping(response) {
            return records;
        }

        let result = as_records(response).and_then(|items| collect_records(items, &mut records));
        if let Err(e) = result {
            self.report(endpoint, &e);
        }
        records
    }

    fn report(&self, endpoint: &str, error: &TrackerError) {
        self.logger.error(&error.to_string(), Some(json!({"endpoint": endpoint})));
    }
}

/// Merges the `data` array of one sessions page into `sessions`.
pub fn merge_session_page(
    page: &Value,
    sessions: &mut BTreeMap<String, SessionGroup>,
) -> Result<(), TrackerError> {
    let movies = list_field(page, "data")?;
    collect_records(movies, sessions)
}
