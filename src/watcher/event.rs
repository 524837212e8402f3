//! Watch lifecycle events and the per-target debounce queue.

use std::mem;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use serde::Serialize;

/// Default debounce window.
pub const DEBOUNCE_MS: u64 = 500;

/// What happened, in machine-readable form. One JSON object per line when
/// the CLI runs with `--json`.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum WatchEvent {
    WatchStarted {
        target: String,
        dir: PathBuf,
    },
    FileChanged {
        target: String,
        path: PathBuf,
    },
    Generated {
        target: String,
        dist: PathBuf,
        trigger: Option<PathBuf>,
    },
    SkippedFile {
        target: String,
        path: PathBuf,
        message: String,
    },
    Error {
        message: String,
    },
    Shutdown,
}

impl WatchEvent {
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }
}

/// Collects changed paths and releases them in one batch once the window
/// has elapsed since the first change. Changes arriving while the window
/// is open join the pending batch without extending it.
#[derive(Debug)]
pub struct PendingQueue {
    paths: Vec<PathBuf>,
    armed_at: Option<Instant>,
    window: Duration,
}

impl PendingQueue {
    pub fn new(window: Duration) -> Self {
        PendingQueue {
            paths: Vec::new(),
            armed_at: None,
            window,
        }
    }

    pub fn push(&mut self, path: PathBuf) {
        if !self.paths.contains(&path) {
            self.paths.push(path);
        }
        if self.armed_at.is_none() {
            self.armed_at = Some(Instant::now());
        }
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// True once the window has elapsed and something is pending.
    pub fn ready(&self) -> bool {
        match self.armed_at {
            Some(armed) => !self.paths.is_empty() && armed.elapsed() >= self.window,
            None => false,
        }
    }

    /// Takes the pending batch. The queue is reset before the caller
    /// processes anything, so changes made during processing re-arm it.
    pub fn drain(&mut self) -> Vec<PathBuf> {
        self.armed_at = None;
        mem::take(&mut self.paths)
    }

    pub fn clear(&mut self) {
        self.armed_at = None;
        self.paths.clear();
    }
}
