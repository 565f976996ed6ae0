use anyhow::{anyhow, Context, Result};
use chrono::{Local, NaiveDate};
use clap::Parser;
use lib_cinema::loggers::logrecord::LogLevel;
use lib_cinema::CINEMAS_FILE_NAME;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Parser, Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
#[command(about = "Palace Cinemas showtime tracker", version)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[arg(long, env = "PALACE_CONFIG_PATH", help = "Path to a JSON settings file.")]
    pub config_path: Option<PathBuf>,

    #[arg(long, env = "PALACE_CINEMAS_FILE", help = "Path to the cinema chain registry (cinemas.json).")]
    pub cinemas_file: Option<PathBuf>,

    #[arg(long, env = "PALACE_CHAIN", help = "Registry entry to query.")]
    pub chain: Option<String>,

    #[arg(long, env = "PALACE_LOCALITY", help = "Locality used to narrow the movie listing.")]
    pub locality: Option<String>,

    #[arg(long, env = "PALACE_DATE", help = "Session date (YYYY-MM-DD). Defaults to today.")]
    pub date: Option<String>,

    #[arg(long, env = "PALACE_LOG_DIR", help = "Directory for log files.")]
    pub log_dir: Option<PathBuf>,

    #[arg(long, env = "PALACE_LOG_LEVEL", help = "Logging level (silly, trace, debug, info, warn, error, fatal).")]
    pub log_level: Option<String>,

    #[arg(long, env = "PALACE_TIMEOUT_SECS", help = "Per-request timeout in seconds.")]
    pub timeout_secs: Option<u64>,

    #[arg(long, env = "PALACE_RETRIES", help = "Retries for transient HTTP failures (0 disables retrying).")]
    pub retries: Option<u32>,

    #[arg(
        long,
        env = "PALACE_INCLUDE_FINAL_PAGE",
        num_args = 0..=1,
        default_missing_value = "true",
        help = "Also fetch the last sessions page reported by totalPages."
    )]
    pub include_final_page: Option<bool>,
}

impl Config {
    // 'other' overrides 'self' for Some values
    fn merge(self, other: Config) -> Config {
        Config {
            config_path: other.config_path.or(self.config_path),
            cinemas_file: other.cinemas_file.or(self.cinemas_file),
            chain: other.chain.or(self.chain),
            locality: other.locality.or(self.locality),
            date: other.date.or(self.date),
            log_dir: other.log_dir.or(self.log_dir),
            log_level: other.log_level.or(self.log_level),
            timeout_secs: other.timeout_secs.or(self.timeout_secs),
            retries: other.retries.or(self.retries),
            include_final_page: other.include_final_page.or(self.include_final_page),
        }
    }
}

/// Fully resolved settings the binary runs with.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub cinemas_file: PathBuf,
    pub chain: String,
    pub locality: String,
    pub date: String,
    pub log_dir: PathBuf,
    pub log_level: LogLevel,
    pub timeout: Duration,
    pub retries: u32,
    pub include_final_page: bool,
}

impl TryFrom<Config> for Settings {
    type Error = anyhow::Error;

    fn try_from(config: Config) -> Result<Self> {
        let missing = |name: &str| anyhow!("no value for '{}' after applying defaults", name);

        let date = config.date.ok_or_else(|| missing("date"))?;
        NaiveDate::parse_from_str(&date, DATE_FORMAT)
            .with_context(|| format!("invalid date '{}', expected YYYY-MM-DD", date))?;

        let log_level = config
            .log_level
            .ok_or_else(|| missing("logLevel"))?
            .parse::<LogLevel>()
            .map_err(|e| anyhow!(e))?;

        Ok(Settings {
            cinemas_file: config.cinemas_file.ok_or_else(|| missing("cinemasFile"))?,
            chain: config.chain.ok_or_else(|| missing("chain"))?,
            locality: config.locality.ok_or_else(|| missing("locality"))?,
            date,
            log_dir: config.log_dir.ok_or_else(|| missing("logDir"))?,
            log_level,
            timeout: Duration::from_secs(config.timeout_secs.ok_or_else(|| missing("timeoutSecs"))?),
            retries: config.retries.unwrap_or(0),
            include_final_page: config.include_final_page.unwrap_or(false),
        })
    }
}

fn default_config() -> Config {
    Config {
        cinemas_file: Some(PathBuf::from(CINEMAS_FILE_NAME)),
        chain: Some("palace".to_string()),
        locality: Some("brisbane".to_string()),
        date: Some(Local::now().date_naive().format(DATE_FORMAT).to_string()),
        log_dir: Some(PathBuf::from("./logs")),
        log_level: Some("info".to_string()),
        timeout_secs: Some(30),
        retries: Some(0),
        include_final_page: Some(false),
        ..Default::default()
    }
}

/// Layers defaults, the optional settings file and CLI/env values (highest wins).
pub fn load_config(cli: Config) -> Result<Settings> {
    let mut current_config = default_config();

    if let Some(path) = &cli.config_path {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read settings file {}", path.display()))?;
        let file_config: Config = serde_json::from_str(&raw)
            .with_context(|| format!("failed to parse settings file {}", path.display()))?;
        current_config = current_config.merge(file_config);
    }

    current_config = current_config.merge(cli);
    Settings::try_from(current_config)
}
