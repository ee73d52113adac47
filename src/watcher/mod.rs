//! Source file watching for `render --watch`.
//!
//! Uses the notify crate; changes are debounced so an editor's
//! write-rename-chmod burst produces one re-render.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver};
use std::time::{Duration, Instant};

use notify::{Event, RecommendedWatcher, RecursiveMode, Watcher};

/// Watches one markdown source and reports settled changes.
pub struct SourceWatcher {
    _watcher: RecommendedWatcher,
    events: Receiver<notify::Result<Event>>,
    dir: PathBuf,
    source: PathBuf,
    file_name: Option<OsString>,
    debounce: Duration,
    last_change: Option<Instant>,
}

impl SourceWatcher {
    /// Start watching `path`.
    ///
    /// The parent directory is watched rather than the file, so editors
    /// that save by replacing the file are still noticed.
    ///
    /// # Errors
    /// Returns an error if the watcher cannot be created or the directory
    /// cannot be watched.
    pub fn new(path: impl AsRef<Path>, debounce: Duration) -> notify::Result<Self> {
        let path = path.as_ref();
        let source = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
        let file_name = source.file_name().map(std::ffi::OsStr::to_os_string);
        let dir = parent_dir(&source);

        let (tx, events) = mpsc::channel();
        let mut watcher = notify::recommended_watcher(move |res| {
            let _ = tx.send(res);
        })?;
        watcher.watch(&dir, RecursiveMode::NonRecursive)?;
        tracing::debug!(source = %source.display(), dir = %dir.display(), "watching source");

        Ok(Self {
            _watcher: watcher,
            events,
            dir,
            source,
            file_name,
            debounce,
            last_change: None,
        })
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    /// Drain pending events; `true` once a change has been quiet for the
    /// debounce interval.
    pub fn poll_changed(&mut self) -> bool {
        let mut touched = false;
        while let Ok(event) = self.events.try_recv() {
            match event {
                Ok(event) if self.concerns_source(&event) => touched = true,
                Ok(event) => {
                    tracing::trace!(kind = ?event.kind, paths = ?event.paths, "ignored fs event");
                }
                Err(err) => tracing::warn!(%err, "watch error"),
            }
        }

        if touched {
            self.last_change = Some(Instant::now());
        }

        match self.last_change {
            Some(at) if at.elapsed() >= self.debounce => {
                self.last_change = None;
                true
            }
            _ => false,
        }
    }

    fn concerns_source(&self, event: &Event) -> bool {
        event.paths.iter().any(|path| {
            path == &self.dir
                || path == &self.source
                || self
                    .file_name
                    .as_ref()
                    .is_some_and(|name| path.file_name() == Some(name.as_os_str()))
        })
    }
}

fn parent_dir(path: &Path) -> PathBuf {
    path.parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map_or_else(|| PathBuf::from("."), Path::to_path_buf)
}
