//! Zone file hot reload.
//!
//! The debouncer thread only forwards events over a channel; the UI thread
//! drains it each frame and does the reload itself.

use anyhow::Context;
use eframe::egui;
use notify_debouncer_mini::notify::{RecommendedWatcher, RecursiveMode};
use notify_debouncer_mini::{DebounceEventResult, DebouncedEvent, Debouncer, new_debouncer};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{Receiver, TryRecvError};
use std::time::Duration;

const DEBOUNCE: Duration = Duration::from_millis(250);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchEvent {
    Changed,
    Failed(String),
}

pub struct ZoneWatcher {
    path: PathBuf,
    events: Receiver<WatchEvent>,
    _debouncer: Debouncer<RecommendedWatcher>,
}

impl ZoneWatcher {
    /// Watch `path` for changes. The parent directory is watched so editors
    /// that save by replacing the file are still noticed.
    pub fn start(path: &Path, ctx: egui::Context) -> anyhow::Result<Self> {
        let target = std::fs::canonicalize(path)
            .with_context(|| format!("Failed to resolve {}", path.display()))?;
        let dir = target
            .parent()
            .map(Path::to_path_buf)
            .ok_or_else(|| anyhow::anyhow!("{} has no parent directory", target.display()))?;

        let (tx, rx) = std::sync::mpsc::channel();
        let filter = target.clone();
        let mut debouncer = new_debouncer(DEBOUNCE, move |result: DebounceEventResult| {
            let event = match result {
                Ok(events) if touches(&events, &filter) => WatchEvent::Changed,
                Ok(_) => return,
                Err(e) => WatchEvent::Failed(e.to_string()),
            };
            if tx.send(event).is_ok() {
                ctx.request_repaint();
            }
        })
        .context("Failed to start file watcher")?;

        debouncer
            .watcher()
            .watch(&dir, RecursiveMode::NonRecursive)
            .with_context(|| format!("Failed to watch {}", dir.display()))?;

        tracing::info!(path = %target.display(), "watching zone file");
        Ok(Self {
            path: target,
            events: rx,
            _debouncer: debouncer,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Drain pending events, collapsing a burst of changes into one.
    pub fn poll(&self) -> Option<WatchEvent> {
        let mut latest = None;
        loop {
            match self.events.try_recv() {
                Ok(WatchEvent::Changed) => {
                    if latest.is_none() {
                        latest = Some(WatchEvent::Changed);
                    }
                }
                Ok(failed) => latest = Some(failed),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    tracing::debug!("zone watcher channel closed");
                    break;
                }
            }
        }
        latest
    }
}

fn touches(events: &[DebouncedEvent], target: &Path) -> bool {
    events.iter().any(|e| e.path == target)
}
