use crate::store::HistoryStore;
use crate::HistoryError;
use arboard::{Clipboard, Error as ArboardError};
use async_trait::async_trait;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{self, Duration};
use tracing::{debug, error, info, trace};

#[async_trait]
pub trait ClipboardSource: Send {
    async fn read_text(&mut self) -> Result<String, HistoryError>;
}

pub struct ArboardSource {
    clipboard: Clipboard,
}

impl ArboardSource {
    pub fn new() -> Result<Self, HistoryError> {
        let clipboard = Clipboard::new()
            .map_err(|e: ArboardError| HistoryError::ClipboardInitError(e.to_string()))?;
        Ok(ArboardSource { clipboard })
    }
}

#[async_trait]
impl ClipboardSource for ArboardSource {
    async fn read_text(&mut self) -> Result<String, HistoryError> {
        self.clipboard
            .get_text()
            .map_err(|e| HistoryError::ClipboardReadError(e.to_string()))
    }
}

#[async_trait]
pub trait ClipboardSink: Send {
    async fn write_text(&mut self, text: &str) -> Result<(), HistoryError>;
}

pub struct ArboardSink {
    clipboard: Clipboard,
}

impl ArboardSink {
    pub fn new() -> Result<Self, HistoryError> {
        let clipboard = Clipboard::new()
            .map_err(|e: ArboardError| HistoryError::ClipboardInitError(e.to_string()))?;
        Ok(ArboardSink { clipboard })
    }
}

#[async_trait]
impl ClipboardSink for ArboardSink {
    async fn write_text(&mut self, text: &str) -> Result<(), HistoryError> {
        self.clipboard
            .set_text(text)
            .map_err(|e| HistoryError::ClipboardWriteError(e.to_string()))
    }
}

#[derive(Debug, Clone)]
pub struct WatcherConfig {
    pub interval_ms: u64,
}

impl Default for WatcherConfig {
    fn default() -> Self {
        WatcherConfig { interval_ms: 1000 }
    }
}

pub type SharedStore = Arc<Mutex<HistoryStore>>;

pub struct ClipboardWatcher {
    config: WatcherConfig,
    store: SharedStore,
    shutdown: Option<watch::Sender<bool>>,
    task: Option<JoinHandle<()>>,
}

impl ClipboardWatcher {
    pub fn new(config: WatcherConfig, store: SharedStore) -> Self {
        ClipboardWatcher {
            config,
            store,
            shutdown: None,
            task: None,
        }
    }

    pub fn is_listening(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }

    pub fn store(&self) -> SharedStore {
        Arc::clone(&self.store)
    }

    pub fn start_listening<S>(&mut self, mut source: S)
    where
        S: ClipboardSource + 'static,
    {
        if self.is_listening() {
            debug!("Watcher is already listening");
            return;
        }

        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
        let store = Arc::clone(&self.store);
        let interval_ms = self.config.interval_ms;

        let task = tokio::spawn(async move {
            let mut interval = time::interval(Duration::from_millis(interval_ms));
            let mut last_content = String::new();

            debug!("Watching clipboard for new content");

            loop {
                tokio::select! {
                    _ = interval.tick() => {
                        trace!("Checking clipboard content");
                        match source.read_text().await {
                            Ok(content) => {
                                let text = content.trim();
                                if text.is_empty() || text == last_content {
                                    continue;
                                }
                                info!("New clipboard content detected");
                                last_content = text.to_owned();
                                let mut store =
                                    store.lock().unwrap_or_else(PoisonError::into_inner);
                                store.add(text);
                            }
                            Err(e) => {
                                error!("Failed to read clipboard content: {}", e);
                            }
                        }
                    }
                    _ = shutdown_rx.changed() => {
                        info!("Stopping clipboard watch");
                        break;
                    }
                }
            }
        });

        self.shutdown = Some(shutdown_tx);
        self.task = Some(task);
    }

    pub fn stop_listening(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            shutdown.send(true).ok();
        }
        self.task = None;
    }
}
