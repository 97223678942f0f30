//! File watching for live reload.

use std::path::{Path, PathBuf};

use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

/// What happened to a watched path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Created,
    Deleted,
    Modified,
}

/// A change under one of the watched targets.
#[derive(Debug, Clone)]
pub struct WatchEvent {
    /// Index of the target that saw the change
    pub target: usize,

    /// Changed path
    pub path: PathBuf,

    pub kind: ChangeKind,
}

/// File watcher for detecting changes.
///
/// Holds one notify watcher per target so every event is tagged with the
/// target it came from. Dropping the `FileWatcher` stops watching.
pub struct FileWatcher {
    _watchers: Vec<RecommendedWatcher>,
}

impl FileWatcher {
    /// Create a watcher over `targets`, recursively.
    ///
    /// Targets that do not exist are skipped. Returns the watcher and a
    /// channel to receive events.
    pub fn new(
        targets: &[PathBuf],
    ) -> Result<(Self, mpsc::UnboundedReceiver<WatchEvent>), notify::Error> {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut watchers = Vec::with_capacity(targets.len());

        for (index, target) in targets.iter().enumerate() {
            if !target.exists() {
                tracing::warn!("Not watching missing directory {}", target.display());
                continue;
            }

            let tx = tx.clone();
            let handler = move |res: notify::Result<notify::Event>| {
                let event = match res {
                    Ok(event) => event,
                    Err(e) => {
                        tracing::warn!("Watch error: {}", e);
                        return;
                    }
                };

                for path in event.paths {
                    if let Some(kind) = classify_event(&path, &event.kind) {
                        let _ = tx.send(WatchEvent {
                            target: index,
                            path,
                            kind,
                        });
                    }
                }
            };

            let mut watcher = notify::recommended_watcher(handler)?;
            watcher.watch(target, RecursiveMode::Recursive)?;
            tracing::debug!("Watching {}", target.display());
            watchers.push(watcher);
        }

        Ok((
            Self {
                _watchers: watchers,
            },
            rx,
        ))
    }
}

/// Classify a notify event, ignoring reads and metadata-only noise.
fn classify_event(path: &Path, kind: &notify::EventKind) -> Option<ChangeKind> {
    use notify::event::ModifyKind;
    use notify::EventKind;

    match kind {
        EventKind::Create(_) => Some(ChangeKind::Created),
        EventKind::Remove(_) => Some(ChangeKind::Deleted),
        EventKind::Modify(ModifyKind::Metadata(_)) if path.is_dir() => None,
        EventKind::Modify(_) => Some(ChangeKind::Modified),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::time::Duration;
    use tempfile::tempdir;

    #[test]
    fn classifies_events() {
        use notify::event::{CreateKind, EventKind, RemoveKind};

        let path = Path::new("web/index.html");
        assert_eq!(
            classify_event(path, &EventKind::Create(CreateKind::File)),
            Some(ChangeKind::Created)
        );
        assert_eq!(
            classify_event(path, &EventKind::Remove(RemoveKind::File)),
            Some(ChangeKind::Deleted)
        );
        assert_eq!(
            classify_event(path, &EventKind::Access(notify::event::AccessKind::Any)),
            None
        );
    }

    #[test]
    fn skips_missing_targets() {
        let temp = tempdir().unwrap();

        let result = FileWatcher::new(&[temp.path().join("does-not-exist")]);

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn tags_events_with_their_target() {
        let first = tempdir().unwrap();
        let second = tempdir().unwrap();

        let (watcher, mut rx) =
            FileWatcher::new(&[first.path().to_path_buf(), second.path().to_path_buf()]).unwrap();

        // Give inotify time to set up
        tokio::time::sleep(Duration::from_millis(100)).await;

        fs::write(second.path().join("page.html"), "<p>changed</p>").unwrap();

        let event = tokio::time::timeout(Duration::from_secs(3), rx.recv()).await;

        drop(watcher);

        let event = event
            .expect("timeout waiting for file watch event")
            .expect("channel should not be closed");
        assert_eq!(event.target, 1);
    }
}
