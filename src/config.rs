use std::env;
use std::path::PathBuf;

use crate::error::ConfigError;

pub const DEFAULT_ENDPOINT: &str = "https://icanhazdadjoke.com/";
pub const DEFAULT_NUM_JOKES: usize = 5;
pub const DEFAULT_STORAGE_KEY: &str = "jokes";

/// Runtime settings, built once in `main` and handed to whatever needs them.
#[derive(Clone, Debug)]
pub struct Config {
    /// Joke API endpoint; one GET returns one joke.
    pub endpoint: String,
    /// How many unique new jokes a fetch cycle collects.
    pub num_jokes_to_get: usize,
    /// Key the joke collection is persisted under.
    pub storage_key: String,
    /// Directory holding the persisted store and the log file.
    pub data_dir: PathBuf,
}

impl Config {
    /// Defaults rooted at `data_dir`.
    pub fn with_data_dir(data_dir: PathBuf) -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            num_jokes_to_get: DEFAULT_NUM_JOKES,
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            data_dir,
        }
    }

    /// Loads configuration from the command line and environment.
    ///
    /// The first positional argument, if any, replaces the endpoint.
    /// `CHEEZ_JOKES_COUNT` replaces the number of jokes per fetch.
    pub fn load() -> Result<Self, ConfigError> {
        let data_dir = dirs::data_dir()
            .ok_or(ConfigError::NoDataDir)?
            .join("cheez-jokes");

        let mut config = Self::with_data_dir(data_dir);

        if let Some(endpoint) = env::args().nth(1) {
            config.endpoint = endpoint;
        }

        if let Ok(raw) = env::var("CHEEZ_JOKES_COUNT") {
            config.num_jokes_to_get = parse_count(&raw)?;
        }

        Ok(config)
    }
}

fn parse_count(raw: &str) -> Result<usize, ConfigError> {
    raw.trim()
        .parse::<usize>()
        .map_err(|e| ConfigError::InvalidVar("CHEEZ_JOKES_COUNT".into(), e.to_string()))
}
