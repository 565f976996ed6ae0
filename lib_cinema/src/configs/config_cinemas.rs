use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default registry file name, looked up in the working directory.
pub const CINEMAS_FILE_NAME: &str = "cinemas.json";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid cinema registry JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Cinema chain '{name}' is not present in the registry (known: {known})")]
    UnknownChain { name: String, known: String },
}

/// Endpoints of one cinema chain.
///
/// URLs are assembled by plain concatenation of `url` and a path suffix, so
/// suffixes carry their own `?`/`&` separators, e.g. `"api/sessions?"`.
#[derive(Default, Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct CinemaChain {
    pub url: String,
    pub locations: String,
    pub movies: String,
    pub sessions: String,
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
}

impl CinemaChain {
    pub fn locations_endpoint(&self) -> String {
        format!("{}{}", self.url, self.locations)
    }

    /// Movies endpoint narrowed to one locality, e.g. `brisbane`.
    pub fn movies_endpoint(&self, locality: &str) -> String {
        format!("{}{}locality={}", self.url, self.movies, locality)
    }

    pub fn sessions_endpoint(&self) -> String {
        format!("{}{}", self.url, self.sessions)
    }
}

impl fmt::Display for CinemaChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "CinemaChain
    Base url: {},
    Locations: {},
    Movies: {},
    Sessions: {},
    Headers: {:?}
",
            self.url, self.locations, self.movies, self.sessions, self.headers
        )
    }
}

/// All known chains, keyed by name (e.g. `palace`).
#[derive(Default, Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(transparent)]
pub struct CinemaRegistry {
    pub chains: BTreeMap<String, CinemaChain>,
}

impl CinemaRegistry {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&raw)
    }

    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn chain(&self, name: &str) -> Result<&CinemaChain, ConfigError> {
        self.chains
            .get(name)
            .ok_or_else(|| ConfigError::UnknownChain {
                name: name.to_string(),
                known: self.names().collect::<Vec<_>>().join(", "),
            })
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.chains.keys().map(String::as_str)
    }
}
