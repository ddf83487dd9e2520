//! Live reload manager.
//!
//! Watches the public directory, turns debounced filesystem events into
//! notifications and broadcasts them to connected clients.

use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use moon_reload::{AssetKind, ClientConfig, Notification};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use serde_json::Value;
use tokio::sync::{broadcast, mpsc};

use super::debouncer::{EventDebouncer, FsEvent, FsEventKind};

/// How often the drain task checks for debounced events.
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Capacity of the broadcast channel; slower clients skip older messages.
const BROADCAST_CAPACITY: usize = 100;

/// Watches the public directory and pushes notifications to clients.
pub struct LiveReloadManager {
    public_dir: PathBuf,
    project_dir: PathBuf,
    watch_patterns: Vec<glob::Pattern>,
    assets: ClientConfig,
    debounce: Duration,
    broadcaster: broadcast::Sender<Notification>,
    watcher: Option<RecommendedWatcher>,
}

impl LiveReloadManager {
    /// Create a manager for `public_dir`.
    ///
    /// Changed files are reported relative to `project_dir`. Invalid watch
    /// patterns are skipped with a warning.
    pub fn new(
        public_dir: PathBuf,
        project_dir: PathBuf,
        watch_patterns: &[String],
        assets: ClientConfig,
        debounce: Duration,
    ) -> Self {
        let watch_patterns = watch_patterns
            .iter()
            .filter_map(|p| match glob::Pattern::new(p) {
                Ok(pattern) => Some(pattern),
                Err(err) => {
                    tracing::warn!(pattern = %p, error = %err, "Ignoring invalid watch pattern");
                    None
                }
            })
            .collect();
        let (broadcaster, _) = broadcast::channel(BROADCAST_CAPACITY);

        Self {
            public_dir,
            project_dir,
            watch_patterns,
            assets,
            debounce,
            broadcaster,
            watcher: None,
        }
    }

    /// Start watching.
    ///
    /// Spawns the tasks that feed the debouncer and broadcast notifications,
    /// so it must be called inside a tokio runtime.
    pub fn start(&mut self) -> Result<(), notify::Error> {
        let (tx, mut rx) = mpsc::channel::<Event>(100);

        let mut watcher = notify::recommended_watcher(move |res: Result<Event, notify::Error>| {
            match res {
                // The callback runs on notify's own thread.
                Ok(event) => {
                    let _ = tx.blocking_send(event);
                }
                Err(err) => tracing::warn!(error = %err, "File watcher error"),
            }
        })?;
        watcher.watch(&self.public_dir, RecursiveMode::Recursive)?;
        self.watcher = Some(watcher);

        let debouncer = Arc::new(EventDebouncer::new(self.debounce));

        let recorder = Arc::clone(&debouncer);
        let public_dir = self.public_dir.clone();
        let patterns = self.watch_patterns.clone();
        tokio::spawn(async move {
            while let Some(event) = rx.recv().await {
                record_event(&event, &public_dir, &patterns, &recorder);
            }
        });

        let classifier = Classifier {
            public_dir: self.public_dir.clone(),
            project_dir: self.project_dir.clone(),
            assets: self.assets.clone(),
        };
        let broadcaster = self.broadcaster.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(POLL_INTERVAL);
            loop {
                interval.tick().await;
                for fs_event in debouncer.drain_ready() {
                    let message = classifier.classify(&fs_event);
                    tracing::info!(
                        path = %fs_event.path.display(),
                        kind = ?fs_event.kind,
                        ?message,
                        "Live reload event"
                    );
                    let _ = broadcaster.send(message);
                }
            }
        });

        tracing::info!(dir = %self.public_dir.display(), "Watching for changes");
        Ok(())
    }

    /// Broadcast a build failure to every client. Returns how many received it.
    pub fn report_build_error(&self, file: &str, error: Value) -> usize {
        tracing::error!(file, error = %error, "Reporting build error to clients");
        self.broadcaster
            .send(Notification::build_error(file, error))
            .unwrap_or(0)
    }

    /// Broadcast an arbitrary notification. Returns how many received it.
    pub fn notify(&self, message: Notification) -> usize {
        self.broadcaster.send(message).unwrap_or(0)
    }

    /// Receiver for broadcast notifications.
    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.broadcaster.subscribe()
    }
}

/// Record a raw notify event into the debouncer.
fn record_event(
    event: &Event,
    public_dir: &Path,
    patterns: &[glob::Pattern],
    debouncer: &EventDebouncer,
) {
    let kind = match event.kind {
        EventKind::Create(_) => FsEventKind::Created,
        EventKind::Modify(_) => FsEventKind::Modified,
        EventKind::Remove(_) => FsEventKind::Removed,
        _ => return,
    };

    for path in &event.paths {
        if !matches_patterns(path, public_dir, patterns) {
            continue;
        }
        debouncer.record(path.clone(), kind);
        tracing::debug!(path = %path.display(), ?kind, "Recorded filesystem event");
    }
}

/// Whether a path under `public_dir` matches any watch pattern.
fn matches_patterns(path: &Path, public_dir: &Path, patterns: &[glob::Pattern]) -> bool {
    let Ok(relative) = path.strip_prefix(public_dir) else {
        return false;
    };
    patterns.iter().any(|pattern| pattern.matches_path(relative))
}

/// Maps debounced filesystem events to notifications.
#[derive(Clone, Debug)]
struct Classifier {
    public_dir: PathBuf,
    project_dir: PathBuf,
    assets: ClientConfig,
}

impl Classifier {
    /// Created or modified stylesheets and images reload in place; anything
    /// else, and every removal, reloads the page.
    fn classify(&self, event: &FsEvent) -> Notification {
        if event.kind == FsEventKind::Removed {
            return Notification::reload();
        }

        let kind = event
            .path
            .extension()
            .map_or(AssetKind::Other, |ext| {
                self.assets.classify_extension(&ext.to_string_lossy())
            });

        match (kind, self.relative_file(&event.path)) {
            (AssetKind::Stylesheet | AssetKind::Image, Some(file)) => {
                Notification::reload_single(file)
            }
            _ => Notification::reload(),
        }
    }

    /// Path relative to the project, falling back to the public directory's
    /// parent, joined with `/`.
    fn relative_file(&self, path: &Path) -> Option<String> {
        let relative = path.strip_prefix(&self.project_dir).ok().or_else(|| {
            self.public_dir
                .parent()
                .and_then(|parent| path.strip_prefix(parent).ok())
        })?;

        let segments: Vec<_> = relative
            .components()
            .filter_map(|c| match c {
                Component::Normal(s) => Some(s.to_string_lossy()),
                _ => None,
            })
            .collect();
        Some(segments.join("/"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn classifier() -> Classifier {
        Classifier {
            public_dir: PathBuf::from("/site/public"),
            project_dir: PathBuf::from("/site"),
            assets: ClientConfig::default(),
        }
    }

    fn fs_event(path: &str, kind: FsEventKind) -> FsEvent {
        FsEvent {
            path: PathBuf::from(path),
            kind,
        }
    }

    #[test]
    fn test_classify_stylesheet_source() {
        let message = classifier().classify(&fs_event(
            "/site/public/css/app.styl",
            FsEventKind::Modified,
        ));
        assert_eq!(message, Notification::reload_single("public/css/app.styl"));
    }

    #[test]
    fn test_classify_new_image() {
        let message =
            classifier().classify(&fs_event("/site/public/img/logo.PNG", FsEventKind::Created));
        assert_eq!(message, Notification::reload_single("public/img/logo.PNG"));
    }

    #[test]
    fn test_classify_html_reloads_page() {
        let message =
            classifier().classify(&fs_event("/site/public/index.html", FsEventKind::Modified));
        assert_eq!(message, Notification::reload());
    }

    #[test]
    fn test_classify_removed_stylesheet_reloads_page() {
        let message =
            classifier().classify(&fs_event("/site/public/css/app.css", FsEventKind::Removed));
        assert_eq!(message, Notification::reload());
    }

    #[test]
    fn test_classify_public_dir_outside_project() {
        let classifier = Classifier {
            public_dir: PathBuf::from("/srv/www"),
            ..classifier()
        };
        let message = classifier.classify(&fs_event("/srv/www/a.css", FsEventKind::Modified));
        assert_eq!(message, Notification::reload_single("www/a.css"));
    }

    #[test]
    fn test_matches_patterns() {
        let public_dir = PathBuf::from("/site/public");
        let patterns = vec![glob::Pattern::new("**/*.css").unwrap()];

        assert!(matches_patterns(
            Path::new("/site/public/css/app.css"),
            &public_dir,
            &patterns
        ));
        assert!(!matches_patterns(
            Path::new("/site/public/index.html"),
            &public_dir,
            &patterns
        ));
        assert!(!matches_patterns(
            Path::new("/elsewhere/app.css"),
            &public_dir,
            &patterns
        ));
    }

    #[test]
    fn test_invalid_patterns_skipped() {
        let manager = LiveReloadManager::new(
            PathBuf::from("/site/public"),
            PathBuf::from("/site"),
            &["[".to_owned(), "**/*".to_owned()],
            ClientConfig::default(),
            Duration::from_millis(10),
        );
        assert_eq!(manager.watch_patterns.len(), 1);
    }

    #[test]
    fn test_report_build_error_broadcasts() {
        let manager = LiveReloadManager::new(
            PathBuf::from("/site/public"),
            PathBuf::from("/site"),
            &["**/*".to_owned()],
            ClientConfig::default(),
            Duration::from_millis(10),
        );
        assert_eq!(manager.report_build_error("app.coffee", json!({})), 0);

        let mut rx = manager.subscribe();
        assert_eq!(
            manager.report_build_error("app.coffee", json!({"line": 1})),
            1
        );
        assert_eq!(
            rx.try_recv().unwrap(),
            Notification::build_error("app.coffee", json!({"line": 1}))
        );
    }

    #[tokio::test]
    async fn test_watcher_broadcasts_changes() {
        let dir = tempfile::tempdir().unwrap();
        let public_dir = dir.path().join("public");
        std::fs::create_dir_all(public_dir.join("css")).unwrap();
        // Canonical paths keep prefix stripping stable where the temp dir is a symlink.
        let project_dir = dir.path().canonicalize().unwrap();
        let public_dir = public_dir.canonicalize().unwrap();

        let mut manager = LiveReloadManager::new(
            public_dir.clone(),
            project_dir,
            &["**/*.css".to_owned()],
            ClientConfig::default(),
            Duration::from_millis(20),
        );
        let mut rx = manager.subscribe();
        manager.start().unwrap();

        std::fs::write(public_dir.join("css/app.css"), "body {}").unwrap();

        let message = tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .expect("no notification received")
            .unwrap();
        assert_eq!(message, Notification::reload_single("public/css/app.css"));
    }
}
