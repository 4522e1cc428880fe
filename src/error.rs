//! Error types for a single posting run.
//!
//! Every variant is fatal to the run. The "nothing to post" and "already
//! posted" cases are not errors; see [`crate::app::RunOutcome`].

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

type BoxedSource = Box<dyn std::error::Error + Send + Sync>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Transport failure or non-success status while fetching ridership data.
    #[error("fetch error: {message}")]
    Fetch {
        message: String,
        status: Option<u16>,
        #[source]
        source: Option<BoxedSource>,
    },

    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("render error: {message}")]
    Render {
        message: String,
        #[source]
        source: Option<BoxedSource>,
    },

    /// Media upload or alt-text attachment failed.
    #[error("upload error: {message}")]
    Upload {
        message: String,
        status: Option<u16>,
        #[source]
        source: Option<BoxedSource>,
    },

    #[error("post error: {message}")]
    Post {
        message: String,
        status: Option<u16>,
        #[source]
        source: Option<BoxedSource>,
    },

    #[error("i/o error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    pub fn fetch(msg: impl Into<String>) -> Self {
        Self::Fetch {
            message: msg.into(),
            status: None,
            source: None,
        }
    }

    pub fn fetch_status(msg: impl Into<String>, status: u16) -> Self {
        Self::Fetch {
            message: msg.into(),
            status: Some(status),
            source: None,
        }
    }

    pub fn fetch_with_source(
        msg: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Fetch {
            message: msg.into(),
            status: None,
            source: Some(Box::new(source)),
        }
    }

    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render {
            message: msg.into(),
            source: None,
        }
    }

    pub fn render_with_source(
        msg: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Render {
            message: msg.into(),
            source: Some(Box::new(source)),
        }
    }

    pub fn upload(msg: impl Into<String>) -> Self {
        Self::Upload {
            message: msg.into(),
            status: None,
            source: None,
        }
    }

    pub fn upload_status(msg: impl Into<String>, status: u16) -> Self {
        Self::Upload {
            message: msg.into(),
            status: Some(status),
            source: None,
        }
    }

    pub fn upload_with_source(
        msg: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Upload {
            message: msg.into(),
            status: None,
            source: Some(Box::new(source)),
        }
    }

    pub fn post(msg: impl Into<String>) -> Self {
        Self::Post {
            message: msg.into(),
            status: None,
            source: None,
        }
    }

    pub fn post_status(msg: impl Into<String>, status: u16) -> Self {
        Self::Post {
            message: msg.into(),
            status: Some(status),
            source: None,
        }
    }

    pub fn post_with_source(
        msg: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Post {
            message: msg.into(),
            status: None,
            source: Some(Box::new(source)),
        }
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// HTTP status carried by the error, if the failure came from a response.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Fetch { status, .. } | Self::Upload { status, .. } | Self::Post { status, .. } => {
                *status
            }
            _ => None,
        }
    }
}

/// Missing or invalid environment/CLI configuration.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required environment variable {name}")]
    MissingVar { name: &'static str },

    #[error("invalid boolean for {name}: {value:?}")]
    InvalidBool { name: &'static str, value: String },

    #[error("unknown caption locale {0:?}")]
    UnknownLocale(String),

    #[error("invalid source url {url:?}: {reason}")]
    InvalidUrl { url: String, reason: String },
}

/// Malformed CSV or week-range data.
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("missing required column {0:?}")]
    MissingColumn(&'static str),

    #[error("invalid ridership {value:?} on line {line}")]
    InvalidRidership { value: String, line: u64 },

    #[error("invalid week range {0:?}")]
    InvalidWeekRange(String),

    #[error("invalid date {0:?} in week range")]
    InvalidDate(String),

    #[error("ridership total for week {week:?} overflows on line {line}")]
    RidershipOverflow { week: String, line: u64 },

    #[error("malformed csv: {0}")]
    Csv(#[from] csv::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_is_carried_for_http_failures() {
        assert_eq!(Error::fetch_status("bad status", 503).status(), Some(503));
        assert_eq!(Error::upload_status("rejected", 400).status(), Some(400));
        assert_eq!(Error::post("no body").status(), None);
        assert_eq!(Error::render("no data").status(), None);
    }

    #[test]
    fn test_display_includes_context() {
        let err = Error::from(ConfigError::MissingVar {
            name: "TWITTER_APP_TOKEN",
        });
        assert_eq!(
            err.to_string(),
            "configuration error: missing required environment variable TWITTER_APP_TOKEN"
        );

        let err = Error::io(
            ".doneWeek",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        assert_eq!(err.to_string(), "i/o error on .doneWeek: denied");
    }

    #[test]
    fn test_parse_error_converts() {
        let err: Error = ParseError::MissingColumn("Week_Range").into();
        assert!(matches!(err, Error::Parse(ParseError::MissingColumn(_))));
        assert!(err.to_string().contains("Week_Range"));
    }
}
