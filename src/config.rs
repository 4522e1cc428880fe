//! Run configuration, read once from the environment at startup.

use std::fmt;
use std::path::PathBuf;

use num_format::Locale;

use crate::error::ConfigError;

/// Weekly ridership export of the Halifax Transit open data portal.
pub const DEFAULT_SOURCE_URL: &str =
    "https://opendata.arcgis.com/datasets/a0ece3efdc7144d69cb1881b90cd93fe_0.csv";

pub const DEFAULT_MARKER_FILE: &str = ".doneWeek";

pub const DEFAULT_GRAPH_OUTPUT: &str = "graph.png";

pub const CONSUMER_KEY_VAR: &str = "TWITTER_CONSUMER_KEY";
pub const CONSUMER_SECRET_VAR: &str = "TWITTER_CONSUMER_SECRET";
pub const APP_TOKEN_VAR: &str = "TWITTER_APP_TOKEN";
pub const APP_SECRET_VAR: &str = "TWITTER_APP_SECRET";
pub const TEST_MODE_VAR: &str = "TEST_MODE";
pub const LOCALE_VAR: &str = "CAPTION_LOCALE";

/// OAuth 1.0a consumer and access-token pairs for the posting account.
#[derive(Clone, PartialEq, Eq)]
pub struct TwitterCredentials {
    pub consumer_key: String,
    pub consumer_secret: String,
    pub access_token: String,
    pub access_secret: String,
}

impl fmt::Debug for TwitterCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TwitterCredentials")
            .field("consumer_key", &self.consumer_key)
            .field("consumer_secret", &"<redacted>")
            .field("access_token", &self.access_token)
            .field("access_secret", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    /// Always present outside test mode.
    pub credentials: Option<TwitterCredentials>,
    pub test_mode: bool,
    pub locale: Locale,
    pub source_url: String,
    pub marker_path: PathBuf,
    pub graph_output: PathBuf,
}

impl Config {
    /// Reads the process environment. `force_test_mode` comes from the CLI
    /// and wins over `TEST_MODE`.
    pub fn from_env(force_test_mode: bool) -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok(), force_test_mode)
    }

    /// Builds the configuration from an arbitrary variable lookup.
    ///
    /// Empty values count as unset. The four credential variables are
    /// required unless test mode is on.
    pub fn from_lookup<F>(lookup: F, force_test_mode: bool) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.is_empty());

        let test_mode = match var(TEST_MODE_VAR) {
            Some(raw) => parse_bool(TEST_MODE_VAR, &raw)?,
            None => false,
        } || force_test_mode;

        let credentials = if test_mode {
            None
        } else {
            let required = |name: &'static str| var(name).ok_or(ConfigError::MissingVar { name });
            Some(TwitterCredentials {
                consumer_key: required(CONSUMER_KEY_VAR)?,
                consumer_secret: required(CONSUMER_SECRET_VAR)?,
                access_token: required(APP_TOKEN_VAR)?,
                access_secret: required(APP_SECRET_VAR)?,
            })
        };

        let locale = match var(LOCALE_VAR) {
            Some(name) => {
                Locale::from_name(&name).map_err(|_| ConfigError::UnknownLocale(name.clone()))?
            }
            None => Locale::en,
        };

        Ok(Self {
            credentials,
            test_mode,
            locale,
            source_url: DEFAULT_SOURCE_URL.to_string(),
            marker_path: PathBuf::from(DEFAULT_MARKER_FILE),
            graph_output: PathBuf::from(DEFAULT_GRAPH_OUTPUT),
        })
    }
}

/// Accepts the same spellings as Go's `strconv.ParseBool`.
fn parse_bool(name: &'static str, raw: &str) -> Result<bool, ConfigError> {
    match raw {
        "1" | "t" | "T" | "true" | "TRUE" | "True" => Ok(true),
        "0" | "f" | "F" | "false" | "FALSE" | "False" => Ok(false),
        _ => Err(ConfigError::InvalidBool {
            name,
            value: raw.to_string(),
        }),
    }
}
