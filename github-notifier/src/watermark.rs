//! The watermark is the point in time before which notifications count as handled.
//!
//! The file-backed store keeps it purely in filesystem metadata: the file's
//! modification time is the value, and a missing file means the epoch.

use std::fs::{File, FileTimes};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::SystemTime;

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::AppError;

pub type Watermark = DateTime<Utc>;

/// Value of a watermark that has never been written.
pub const EPOCH: Watermark = DateTime::<Utc>::UNIX_EPOCH;

pub trait WatermarkStore: Send {
    fn read(&self) -> Result<Watermark, AppError>;
    /// Moves the watermark to "now", creating it if needed.
    fn touch(&mut self) -> Result<(), AppError>;
}

#[derive(Debug, Clone)]
pub struct FileWatermarkStore {
    path: PathBuf,
}

impl FileWatermarkStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn read_err(&self, source: std::io::Error) -> AppError {
        AppError::StoreRead {
            path: self.path.clone(),
            source,
        }
    }

    fn write_err(&self, source: std::io::Error) -> AppError {
        AppError::StoreWrite {
            path: self.path.clone(),
            source,
        }
    }
}

impl WatermarkStore for FileWatermarkStore {
    fn read(&self) -> Result<Watermark, AppError> {
        match std::fs::metadata(&self.path) {
            Ok(meta) => meta
                .modified()
                .map(Watermark::from)
                .map_err(|e| self.read_err(e)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(EPOCH),
            Err(e) => Err(self.read_err(e)),
        }
    }

    fn touch(&mut self) -> Result<(), AppError> {
        match std::fs::metadata(&self.path) {
            Err(e) if e.kind() == ErrorKind::NotFound => {
                File::create(&self.path).map_err(|e| self.write_err(e))?;
                debug!(path = %self.path.display(), "watermark file created");
            }
            Err(e) => return Err(self.write_err(e)),
            Ok(_) => {
                // A read-only handle is enough for the owner to set timestamps,
                // so a 0444 file or a directory can still be touched.
                let now = SystemTime::now();
                let file = File::open(&self.path).map_err(|e| self.write_err(e))?;
                file.set_times(FileTimes::new().set_accessed(now).set_modified(now))
                    .map_err(|e| self.write_err(e))?;
            }
        }
        Ok(())
    }
}

/// Source of "now" for stores that do not live on a real filesystem.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    pub fn advance(&self, by: chrono::Duration) {
        let mut now = self.now.lock().unwrap_or_else(|p| p.into_inner());
        *now += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(|p| p.into_inner())
    }
}

/// In-memory store; `touch` takes its time from the given clock.
pub struct MemoryWatermarkStore {
    value: Option<Watermark>,
    clock: Arc<dyn Clock>,
    touches: usize,
}

impl MemoryWatermarkStore {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            value: None,
            clock,
            touches: 0,
        }
    }

    pub fn with_value(clock: Arc<dyn Clock>, value: Watermark) -> Self {
        Self {
            value: Some(value),
            clock,
            touches: 0,
        }
    }

    /// How many times `touch` has been called.
    pub fn touches(&self) -> usize {
        self.touches
    }
}

impl WatermarkStore for MemoryWatermarkStore {
    fn read(&self) -> Result<Watermark, AppError> {
        Ok(self.value.unwrap_or(EPOCH))
    }

    fn touch(&mut self) -> Result<(), AppError> {
        self.value = Some(self.clock.now());
        self.touches += 1;
        Ok(())
    }
}
