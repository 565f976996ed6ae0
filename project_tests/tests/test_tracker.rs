//! # `MovieTracker` Integration Tests
//!
//! Drives the tracker against the in-process mock cinema API and checks the
//! shaped results, the pages requested and the log lines emitted.

use lib_cinema::cinemas::{SessionQuery, TrackerError};
use lib_cinema::loggers::logrecord::LogLevel;
use lib_cinema::retrieve::ky_http::ApiClientOptions;
use project_tests::{memory_logger, test_client_options, tracker, tracker_with, MockCinemaApi};
use serde_json::json;
use std::collections::BTreeMap;

const DATE: &str = "2024-12-22";

fn session_page(path: &str, page: u64) -> String {
    format!("{}?selectedDates={}&selectedCinemaIds=121&page={}", path, DATE, page)
}

fn showing(movie_id: &str, title: &str, dates: &[&str]) -> serde_json::Value {
    let sessions: Vec<_> = dates.iter().map(|d| json!({"date": d, "screenName": "1"})).collect();
    json!({"movieId": movie_id, "title": title, "sessions": sessions})
}

#[tokio::test]
async fn get_movies_keys_each_movie_by_id() {
    let server = MockCinemaApi::new()
        .json(
            "/movies?locality=brisbane",
            json!([
                {"movieId": "abc123", "title": "My Fake Title"},
                {"movieId": "123abc", "title": "My Fake Movie"}
            ]),
        )
        .start()
        .await;
    let logger = memory_logger();

    let movies = tracker(&logger).get_movies(&server.url("/movies?locality=brisbane")).await;

    assert_eq!(movies.len(), 2);
    assert_eq!(
        serde_json::to_value(&movies["abc123"]).unwrap(),
        json!({"movieId": "abc123", "title": "My Fake Title"})
    );
    assert_eq!(
        serde_json::to_value(&movies["123abc"]).unwrap(),
        json!({"movieId": "123abc", "title": "My Fake Movie"})
    );
    assert!(logger.records_at(LogLevel::Error).is_empty());
    assert!(logger.records_at(LogLevel::Warn).is_empty());
}

#[tokio::test]
async fn chain_headers_are_sent_on_every_tracker_request() {
    let server = MockCinemaApi::new()
        .json(
            "/movies?locality=brisbane",
            json!([{"movieId": "abc123", "title": "My Fake Title"}]),
        )
        .json(
            &session_page("/sessions", 1),
            json!({"totalPages": 3, "data": [showing("m1", "Wicked", &["2024-12-22T10:00:00"])]}),
        )
        .json(
            &session_page("/sessions", 2),
            json!({"totalPages": 3, "data": [showing("m2", "Conclave", &["2024-12-22T13:15:00"])]}),
        )
        .start()
        .await;
    let logger = memory_logger();
    let options = ApiClientOptions {
        default_headers: BTreeMap::from([("x-chain".to_string(), "palace".to_string())]),
        ..test_client_options()
    };
    let tracker = tracker_with(options, &logger);

    let movies = tracker.get_movies(&server.url("/movies?locality=brisbane")).await;
    let sessions = tracker.get_sessions(&server.url("/sessions?"), DATE).await;

    assert_eq!(movies["abc123"].title, "My Fake Title");
    assert_eq!(sessions.len(), 2);
    assert_eq!(server.requests().len(), 3);
    assert!(server
        .header_values("x-chain")
        .iter()
        .all(|value| value.as_deref() == Some("palace")));
}

#[tokio::test]
async fn get_movies_stops_at_first_missing_key() {
    let server = MockCinemaApi::new()
        .json(
            "/movies",
            json!([
                {"title": "No id here"},
                {"movieId": "123abc", "title": "My Fake Movie"}
            ]),
        )
        .start()
        .await;
    let logger = memory_logger();

    let movies = tracker(&logger).get_movies(&server.url("/movies")).await;

    assert!(movies.is_empty());
    let errors = logger.records_at(LogLevel::Error);
    assert_eq!(errors.len(), 1);
    assert!(errors[0].message.contains("Unexpected key 'movieId' found"));
}

#[tokio::test]
async fn get_movies_keeps_items_before_the_failure() {
    let server = MockCinemaApi::new()
        .json(
            "/movies",
            json!([
                {"movieId": "abc123", "title": "My Fake Title"},
                {"movieId": "123abc"},
                {"movieId": "zzz999", "title": "Never Reached"}
            ]),
        )
        .start()
        .await;
    let logger = memory_logger();

    let movies = tracker(&logger).get_movies(&server.url("/movies")).await;

    assert_eq!(movies.keys().collect::<Vec<_>>(), vec!["abc123"]);
    assert_eq!(
        logger.records_at(LogLevel::Error)[0].message,
        TrackerError::MissingKey("title".to_string()).to_string()
    );
}

#[tokio::test]
async fn get_movies_rejects_a_mapping_response() {
    let server = MockCinemaApi::new()
        .json("/movies", json!({"bad_key": "bad_response"}))
        .start()
        .await;
    let logger = memory_logger();

    let movies = tracker(&logger).get_movies(&server.url("/movies")).await;

    assert!(movies.is_empty());
    let errors = logger.records_at(LogLevel::Error);
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].message, "Recieved malformed JSON, not proceeding.");
}

#[tokio::test]
async fn get_movies_on_non_json_body_logs_one_error() {
    let server = MockCinemaApi::new()
        .raw("/movies", 200, "<html>maintenance</html>")
        .start()
        .await;
    let logger = memory_logger();

    let movies = tracker(&logger).get_movies(&server.url("/movies")).await;

    assert!(movies.is_empty());
    let errors = logger.records_at(LogLevel::Error);
    assert_eq!(errors.len(), 1);
    assert!(errors[0].message.contains("no JSON response"));
}

#[tokio::test]
async fn get_movies_on_bad_status_warns_and_returns_nothing() {
    let server = MockCinemaApi::new().start().await;
    let logger = memory_logger();
    let url = server.url("/movies?locality=nowhere");

    let movies = tracker(&logger).get_movies(&url).await;

    assert!(movies.is_empty());
    let warnings = logger.records_at(LogLevel::Warn);
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0].message, format!("Could not resolve request to '{}'.", url));
    assert_eq!(warnings[0].tags["status"], 404);
    assert_eq!(logger.records_at(LogLevel::Error).len(), 1);
}

#[tokio::test]
async fn unreachable_api_degrades_to_empty() {
    let logger = memory_logger();

    let movies = tracker(&logger).get_movies("http://127.0.0.1:1/movies").await;

    assert!(movies.is_empty());
    let errors = logger.records_at(LogLevel::Error);
    assert_eq!(errors.len(), 1);
    assert!(errors[0].message.contains("no JSON response"));
    assert!(errors[0].tags["reason"].is_string());
}

#[tokio::test]
async fn get_locations_copies_all_fields() {
    let server = MockCinemaApi::new()
        .json(
            "/cinemas",
            json!([
                {"cinemaId": "121", "title": "Palace James St", "locality": "brisbane", "city": "Brisbane", "phone": "x"},
                {"cinemaId": "130", "title": "Palace Barracks", "locality": "brisbane", "city": "Brisbane"}
            ]),
        )
        .start()
        .await;
    let logger = memory_logger();

    let locations = tracker(&logger).get_locations(&server.url("/cinemas")).await;

    assert_eq!(locations.len(), 2);
    assert_eq!(
        serde_json::to_value(&locations["121"]).unwrap(),
        json!({"cinemaId": "121", "title": "Palace James St", "locality": "brisbane", "city": "Brisbane"})
    );
    assert_eq!(locations["130"].title, "Palace Barracks");
}

#[tokio::test]
async fn get_locations_missing_key_keeps_earlier_locations() {
    let server = MockCinemaApi::new()
        .json(
            "/cinemas",
            json!([
                {"cinemaId": "121", "title": "Palace James St", "locality": "brisbane", "city": "Brisbane"},
                {"cinemaId": "130", "title": "Palace Barracks", "locality": "brisbane"}
            ]),
        )
        .start()
        .await;
    let logger = memory_logger();

    let locations = tracker(&logger).get_locations(&server.url("/cinemas")).await;

    assert_eq!(locations.keys().collect::<Vec<_>>(), vec!["121"]);
    assert!(logger.records_at(LogLevel::Error)[0].message.contains("'city'"));
}

#[tokio::test]
async fn get_sessions_skips_the_final_page() {
    let server = MockCinemaApi::new()
        .json(
            &session_page("/sessions", 1),
            json!({"totalPages": 3, "data": [showing("m1", "Wicked", &["2024-12-22T10:00:00"])]}),
        )
        .json(
            &session_page("/sessions", 2),
            json!({"totalPages": 3, "data": [showing("m2", "Conclave", &["2024-12-22T13:15:00"])]}),
        )
        .json(
            &session_page("/sessions", 3),
            json!({"totalPages": 3, "data": [showing("m3", "Nosferatu", &["2024-12-22T21:00:00"])]}),
        )
        .start()
        .await;
    let logger = memory_logger();

    let sessions = tracker(&logger).get_sessions(&server.url("/sessions?"), DATE).await;

    assert_eq!(
        server.requests(),
        vec![session_page("/sessions", 1), session_page("/sessions", 2)]
    );
    assert_eq!(sessions.keys().collect::<Vec<_>>(), vec!["m1", "m2"]);
    assert_eq!(sessions["m1"].sessions, vec!["2024-12-22T10:00:00"]);
    assert!(logger.records_at(LogLevel::Error).is_empty());
}

#[tokio::test]
async fn get_sessions_can_include_the_final_page() {
    let server = MockCinemaApi::new()
        .json(
            &session_page("/sessions", 1),
            json!({"totalPages": 3, "data": [showing("m1", "Wicked", &["2024-12-22T10:00:00"])]}),
        )
        .json(&session_page("/sessions", 2), json!({"totalPages": 3, "data": []}))
        .json(
            &session_page("/sessions", 3),
            json!({"totalPages": 3, "data": [showing("m3", "Nosferatu", &["2024-12-22T21:00:00"])]}),
        )
        .start()
        .await;
    let logger = memory_logger();
    let query = SessionQuery::new(DATE).include_final_page(true);

    let sessions = tracker(&logger)
        .get_sessions_with(&server.url("/sessions?"), &query)
        .await;

    assert_eq!(server.requests().len(), 3);
    assert_eq!(sessions.keys().collect::<Vec<_>>(), vec!["m1", "m3"]);
}

#[tokio::test]
async fn get_sessions_single_page_makes_one_request() {
    let server = MockCinemaApi::new()
        .json(
            &session_page("/sessions", 1),
            json!({"totalPages": 1, "data": [showing("m1", "Wicked", &["2024-12-22T10:00:00", "2024-12-22T19:00:00"])]}),
        )
        .start()
        .await;
    let logger = memory_logger();

    let sessions = tracker(&logger).get_sessions(&server.url("/sessions?"), DATE).await;

    assert_eq!(server.requests().len(), 1);
    assert_eq!(sessions["m1"].showings_on(DATE).count(), 2);
}

#[tokio::test]
async fn later_pages_overwrite_the_same_movie() {
    let server = MockCinemaApi::new()
        .json(
            &session_page("/sessions", 1),
            json!({"totalPages": 3, "data": [showing("m1", "Wicked", &["2024-12-22T10:00:00"])]}),
        )
        .json(
            &session_page("/sessions", 2),
            json!({"totalPages": 3, "data": [showing("m1", "Wicked", &["2024-12-22T20:00:00"])]}),
        )
        .start()
        .await;
    let logger = memory_logger();

    let sessions = tracker(&logger).get_sessions(&server.url("/sessions?"), DATE).await;

    assert_eq!(sessions.len(), 1);
    assert_eq!(sessions["m1"].sessions, vec!["2024-12-22T20:00:00"]);
}

#[tokio::test]
async fn failed_page_is_skipped() {
    let server = MockCinemaApi::new()
        .json(
            &session_page("/sessions", 1),
            json!({"totalPages": 4, "data": [showing("m1", "Wicked", &["2024-12-22T10:00:00"])]}),
        )
        .raw(&session_page("/sessions", 2), 502, "Bad Gateway")
        .json(
            &session_page("/sessions", 3),
            json!({"totalPages": 4, "data": [showing("m3", "Nosferatu", &["2024-12-22T21:00:00"])]}),
        )
        .start()
        .await;
    let logger = memory_logger();

    let sessions = tracker(&logger).get_sessions(&server.url("/sessions?"), DATE).await;

    assert_eq!(server.requests().len(), 3);
    assert_eq!(sessions.keys().collect::<Vec<_>>(), vec!["m1", "m3"]);
    assert_eq!(logger.records_at(LogLevel::Warn).len(), 1);
    assert_eq!(logger.records_at(LogLevel::Error).len(), 1);
}

#[tokio::test]
async fn missing_total_pages_keeps_page_one() {
    let server = MockCinemaApi::new()
        .json(
            &session_page("/sessions", 1),
            json!({"data": [showing("m1", "Wicked", &["2024-12-22T10:00:00"])]}),
        )
        .start()
        .await;
    let logger = memory_logger();

    let sessions = tracker(&logger).get_sessions(&server.url("/sessions?"), DATE).await;

    assert_eq!(server.requests().len(), 1);
    assert_eq!(sessions.len(), 1);
    assert!(logger.records_at(LogLevel::Error)[0].message.contains("'totalPages'"));
}

#[tokio::test]
async fn schema_drift_on_a_later_page_stops_the_query() {
    let server = MockCinemaApi::new()
        .json(
            &session_page("/sessions", 1),
            json!({"totalPages": 4, "data": [showing("m1", "Wicked", &["2024-12-22T10:00:00"])]}),
        )
        .json(&session_page("/sessions", 2), json!({"totalPages": 4, "results": []}))
        .json(
            &session_page("/sessions", 3),
            json!({"totalPages": 4, "data": [showing("m3", "Nosferatu", &["2024-12-22T21:00:00"])]}),
        )
        .start()
        .await;
    let logger = memory_logger();

    let sessions = tracker(&logger).get_sessions(&server.url("/sessions?"), DATE).await;

    assert_eq!(server.requests().len(), 2);
    assert_eq!(sessions.keys().collect::<Vec<_>>(), vec!["m1"]);
    assert_eq!(
        logger.records_at(LogLevel::Error)[0].message,
        "Unexpected key 'data' found in response, not proceeding."
    );
}

#[tokio::test]
async fn empty_first_page_stops_pagination() {
    let server = MockCinemaApi::new()
        .raw(&session_page("/sessions", 1), 200, "not json")
        .start()
        .await;
    let logger = memory_logger();

    let sessions = tracker(&logger).get_sessions(&server.url("/sessions?"), DATE).await;

    assert!(sessions.is_empty());
    assert_eq!(server.requests().len(), 1);
    assert_eq!(logger.records_at(LogLevel::Error).len(), 1);
}
