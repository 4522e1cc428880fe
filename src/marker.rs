//! Persisted record of the last week that was posted.
//!
//! The marker file holds a single `YYYY-MM-DD` end date and nothing else.

use std::fs::OpenOptions;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{Error, Result};
use crate::week::WeeklyTotal;

#[derive(Debug, Clone)]
pub struct DoneMarker {
    path: PathBuf,
}

impl DoneMarker {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns `true` when the marker holds exactly this week's end date.
    ///
    /// A missing marker file means nothing has been posted yet.
    pub fn is_already_done(&self, week: &WeeklyTotal) -> Result<bool> {
        let stored = match std::fs::read_to_string(&self.path) {
            Ok(stored) => stored,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "No done marker yet");
                return Ok(false);
            }
            Err(e) => return Err(Error::io(&self.path, e)),
        };

        Ok(stored == week.marker_value())
    }

    /// Replaces the marker with this week's end date.
    pub fn mark_done(&self, week: &WeeklyTotal) -> Result<()> {
        write_private(&self.path, week.marker_value().as_bytes())?;

        debug!(path = %self.path.display(), week_end = %week.end, "Marked week as done");
        Ok(())
    }
}

/// Truncates or creates `path` and writes `contents`. New files on Unix are
/// readable and writable by the owner only.
pub(crate) fn write_private(path: &Path, contents: &[u8]) -> Result<()> {
    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let mut file = options.open(path).map_err(|e| Error::io(path, e))?;
    file.write_all(contents).map_err(|e| Error::io(path, e))
}
