//! # palace
//!
//! Prints the locations, the movies showing in one locality and the showtimes
//! on one date for a cinema chain listed in the registry file.
//!
//! Exit codes: `0` on success, `1` when no movies were found, `2` when the
//! configuration or the HTTP client could not be set up.

mod config;
mod output;

use anyhow::Result;
use clap::Parser;
use config::{load_config, Config, Settings};
use lib_cinema::cinemas::{ApiCall, MovieTracker, SessionQuery};
use lib_cinema::loggers::loggerlocal::{LoggerLocal, LoggerLocalOptions};
use lib_cinema::retrieve::ky_http::ApiClientOptions;
use lib_cinema::CinemaRegistry;
use serde_json::json;
use std::process::ExitCode;
use std::sync::Arc;

const APP_NAME: &str = "palace";

#[tokio::main]
async fn main() -> ExitCode {
    let settings = match load_config(Config::parse()) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("{}: configuration error: {:#}", APP_NAME, e);
            return ExitCode::from(2);
        }
    };

    let logger = Arc::new(LoggerLocal::new(
        APP_NAME.to_string(),
        Some(LoggerLocalOptions::with_min_level(
            settings.log_level,
            Some(settings.log_dir.clone()),
        )),
    ));

    match run(&settings, Arc::clone(&logger)).await {
        Ok(code) => code,
        Err(e) => {
            logger.fatal(&format!("{:#}", e), None);
            ExitCode::from(2)
        }
    }
}

async fn run(settings: &Settings, logger: Arc<LoggerLocal>) -> Result<ExitCode> {
    let registry = CinemaRegistry::from_file(&settings.cinemas_file)?;
    let chain = registry.chain(&settings.chain)?;
    logger.debug(
        &format!("Using cinema chain '{}': {}", settings.chain, chain),
        Some(json!({"url": chain.url, "date": settings.date, "locality": settings.locality})),
    );

    let options = ApiClientOptions {
        timeout: settings.timeout,
        max_retries: settings.retries,
        default_headers: chain.headers.clone(),
        ..Default::default()
    };
    let api_call = Arc::new(ApiCall::with_options(options, Arc::clone(&logger))?);
    let tracker = MovieTracker::new(api_call, Arc::clone(&logger));

    let locations = tracker.get_locations(&chain.locations_endpoint()).await;
    println!("{}", serde_json::to_string_pretty(&locations)?);

    let movies = tracker.get_movies(&chain.movies_endpoint(&settings.locality)).await;
    if movies.is_empty() {
        logger.error("No movies found.", Some(json!({"locality": settings.locality})));
        return Ok(ExitCode::from(1));
    }
    println!("{}", serde_json::to_string_pretty(&movies)?);

    let query = SessionQuery::new(settings.date.clone()).include_final_page(settings.include_final_page);
    let sessions = tracker.get_sessions_with(&chain.sessions_endpoint(), &query).await;
    for line in output::showtime_lines(&sessions, &settings.date) {
        println!("{}", line);
    }

    logger.info(
        "Showtimes listed",
        Some(json!({
            "locations": locations.len(),
            "movies": movies.len(),
            "sessionGroups": sessions.len()
        })),
    );
    Ok(ExitCode::SUCCESS)
}
