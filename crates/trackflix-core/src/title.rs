use std::sync::Arc;
use tokio::sync::watch;
use trackflix_models::DEFAULT_TITLE;

/// The application-wide "current title" label.
///
/// Front-ends subscribe to it; the only way to change it is [`TitleDisplay::show`],
/// whose guard restores the default when dropped.
#[derive(Debug, Clone)]
pub struct TitleDisplay {
    tx: Arc<watch::Sender<String>>,
}

impl TitleDisplay {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(DEFAULT_TITLE.to_string());
        Self { tx: Arc::new(tx) }
    }

    pub fn current(&self) -> String {
        self.tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<String> {
        self.tx.subscribe()
    }

    /// Label the display with a movie title until the guard is dropped
    #[must_use = "the title resets as soon as the guard is dropped"]
    pub fn show(&self, movie_title: &str) -> TitleGuard {
        self.tx.send_replace(format!("Movie | {}", movie_title));
        TitleGuard {
            tx: Arc::clone(&self.tx),
        }
    }
}

impl Default for TitleDisplay {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug)]
pub struct TitleGuard {
    tx: Arc<watch::Sender<String>>,
}

impl Drop for TitleGuard {
    fn drop(&mut self) {
        self.tx.send_replace(DEFAULT_TITLE.to_string());
    }
}
