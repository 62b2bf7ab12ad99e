//! JSON-lines capture store: one capture record per line.

use std::fs::File;
use std::io::{BufRead, BufReader, ErrorKind};
use std::path::{Path, PathBuf};

use journey_core::DateRange;

use crate::error::Result;
use crate::sources::{CaptureStore, RawCapture, source_selected};

#[derive(Debug, Clone)]
pub struct JsonlCaptureStore {
    path: PathBuf,
}

impl JsonlCaptureStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CaptureStore for JsonlCaptureStore {
    fn captures_in_range(&self, range: &DateRange, sources: &[String]) -> Result<Vec<RawCapture>> {
        let file = match File::open(&self.path) {
            Ok(f) => f,
            // No store yet means no captures.
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), "capture store missing; treating as empty");
                return Ok(Vec::new());
            }
            Err(e) => return Err(e.into()),
        };

        let mut out = Vec::new();
        let mut skipped = 0usize;
        for (idx, line) in BufReader::new(file).split(b'\n').enumerate() {
            let line = line?;
            let trimmed = line.trim_ascii();
            if trimmed.is_empty() {
                continue;
            }
            // Undecodable bytes surface as a JSON error and are skipped.
            match serde_json::from_slice::<RawCapture>(trimmed) {
                Ok(capture) => {
                    if range.contains(capture.timestamp) && source_selected(&capture.source, sources) {
                        out.push(capture);
                    }
                }
                Err(e) => {
                    skipped += 1;
                    tracing::debug!(line = idx + 1, error = %e, "skipping malformed capture record");
                }
            }
        }
        if skipped > 0 {
            tracing::warn!(
                path = %self.path.display(),
                skipped,
                "capture store contained malformed records"
            );
        }
        Ok(out)
    }
}
