use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::EventLogError;
use crate::sink::{DispatchOutcome, EventLog};

/// Default log file name, relative to the working directory.
pub const DEFAULT_LOG_FILE: &str = "aLog.txt";

/// Append-only text log. The file is opened per entry and closed again,
/// so a removed or remounted medium is picked up on the next frame.
#[derive(Debug, Clone)]
pub struct FileEventLog {
    path: PathBuf,
}

impl FileEventLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for FileEventLog {
    fn default() -> Self {
        Self::new(DEFAULT_LOG_FILE)
    }
}

impl EventLog for FileEventLog {
    fn append(&mut self, outcome: &DispatchOutcome) -> Result<(), EventLogError> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|source| EventLogError::Open {
                path: self.path.clone(),
                source,
            })?;

        writeln!(file, "{}", outcome.log_line())
            .and_then(|()| file.flush())
            .map_err(|source| EventLogError::Write {
                path: self.path.clone(),
                source,
            })
    }
}

/// In-memory log, optionally unavailable.
#[cfg(test)]
#[derive(Debug, Default, Clone)]
pub(crate) struct MemoryEventLog {
    entries: Vec<String>,
    unavailable: bool,
}

#[cfg(test)]
impl MemoryEventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// A log whose every append fails.
    pub fn unavailable() -> Self {
        Self {
            entries: Vec::new(),
            unavailable: true,
        }
    }

    pub fn set_unavailable(&mut self, unavailable: bool) {
        self.unavailable = unavailable;
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }
}

#[cfg(test)]
impl EventLog for MemoryEventLog {
    fn append(&mut self, outcome: &DispatchOutcome) -> Result<(), EventLogError> {
        if self.unavailable {
            return Err(EventLogError::Unavailable);
        }
        self.entries.push(outcome.log_line());
        Ok(())
    }
}
