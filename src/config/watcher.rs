// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Hot reload of the instrument catalog.
//!
//! The watcher follows a catalog file (or a directory of catalogs) and
//! re-parses it after edits settle, so score order presets offered to
//! the user track the file on disk.

use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::time::{Duration, Instant};

use anyhow::{anyhow, Result};
use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tracing::{debug, warn};

use super::CatalogFile;

const DEFAULT_DEBOUNCE_MS: u64 = 500;
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Events emitted by the catalog watcher
#[derive(Debug, Clone)]
pub enum ConfigEvent {
    /// Catalog was modified and parsed
    Reloaded(Box<CatalogFile>),
    /// Catalog was modified but failed to parse
    Error(String),
    /// A file appeared in the watched directory
    FileCreated(PathBuf),
    /// A file was removed from the watched directory
    FileDeleted(PathBuf),
}

/// Catalog watcher with debouncing
pub struct ConfigWatcher {
    _watcher: RecommendedWatcher,
    event_receiver: Receiver<ConfigEvent>,
    watched_path: PathBuf,
}

impl ConfigWatcher {
    /// Watch `path` (file or directory); edits are reported once no
    /// further modification arrived for `debounce_ms` (default 500).
    pub fn new<P: AsRef<Path>>(path: P, debounce_ms: Option<u64>) -> Result<Self> {
        let watched_path = path.as_ref().to_path_buf();
        let debounce = Duration::from_millis(debounce_ms.unwrap_or(DEFAULT_DEBOUNCE_MS));

        let (event_tx, event_rx) = mpsc::channel();
        let (raw_tx, raw_rx): (Sender<Event>, Receiver<Event>) = mpsc::channel();

        let mut watcher = RecommendedWatcher::new(
            move |res: Result<Event, notify::Error>| {
                if let Ok(event) = res {
                    let _ = raw_tx.send(event);
                }
            },
            Config::default(),
        )
        .map_err(|e| anyhow!("Failed to create file watcher: {}", e))?;

        let mode = if watched_path.is_dir() {
            RecursiveMode::Recursive
        } else {
            RecursiveMode::NonRecursive
        };
        watcher
            .watch(&watched_path, mode)
            .map_err(|e| anyhow!("Failed to watch path {:?}: {}", watched_path, e))?;

        let root = watched_path.clone();
        std::thread::spawn(move || debounce_loop(raw_rx, event_tx, root, debounce));

        debug!(path = ?watched_path, "watching instrument catalog");
        Ok(Self {
            _watcher: watcher,
            event_receiver: event_rx,
            watched_path,
        })
    }

    /// Try to receive the next event (non-blocking)
    pub fn try_recv(&self) -> Option<ConfigEvent> {
        self.event_receiver.try_recv().ok()
    }

    /// Receive all pending events
    pub fn recv_all(&self) -> Vec<ConfigEvent> {
        let mut events = Vec::new();
        while let Some(event) = self.try_recv() {
            events.push(event);
        }
        events
    }

    /// Block until the next event
    pub fn recv(&self) -> Option<ConfigEvent> {
        self.event_receiver.recv().ok()
    }

    pub fn watched_path(&self) -> &Path {
        &self.watched_path
    }
}

fn debounce_loop(
    raw: Receiver<Event>,
    events: Sender<ConfigEvent>,
    root: PathBuf,
    debounce: Duration,
) {
    let mut last_modified: Option<Instant> = None;
    let mut pending: Vec<PathBuf> = Vec::new();

    loop {
        match raw.recv_timeout(POLL_INTERVAL) {
            Ok(event) => match event.kind {
                EventKind::Create(_) => {
                    for path in event.paths {
                        let _ = events.send(ConfigEvent::FileCreated(path));
                    }
                }
                EventKind::Remove(_) => {
                    for path in event.paths {
                        let _ = events.send(ConfigEvent::FileDeleted(path));
                    }
                }
                EventKind::Modify(_) => {
                    for path in event.paths {
                        if !pending.contains(&path) {
                            pending.push(path);
                        }
                    }
                    last_modified = Some(Instant::now());
                }
                _ => {}
            },
            Err(RecvTimeoutError::Timeout) => {
                let settled = last_modified.map(|t| t.elapsed() >= debounce).unwrap_or(false);
                if !settled {
                    continue;
                }
                for path in pending.drain(..) {
                    if !is_catalog_path(&path, &root) {
                        continue;
                    }
                    let event = match CatalogFile::load(&path) {
                        Ok(catalog) => ConfigEvent::Reloaded(Box::new(catalog)),
                        Err(e) => {
                            warn!(path = ?path, error = %e, "catalog reload failed");
                            ConfigEvent::Error(format!("Failed to load {:?}: {:#}", path, e))
                        }
                    };
                    let _ = events.send(event);
                }
                last_modified = None;
            }
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }
}

/// Catalog files are YAML or TOML; the watched file itself always qualifies
fn is_catalog_path(path: &Path, root: &Path) -> bool {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("yaml") | Some("yml") | Some("toml") => true,
        _ => path == root,
    }
}

/// Parse a catalog without applying it
pub fn validate_config<P: AsRef<Path>>(path: P) -> Result<CatalogFile> {
    CatalogFile::load(path)
}
