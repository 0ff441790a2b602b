use crate::storage::KeyValueStore;
use crate::HistoryError;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

pub const STORAGE_KEY: &str = "clipsage-history";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryItem {
    pub id: String,
    pub text: String,
    pub timestamp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub favorite: bool,
}

impl HistoryItem {
    fn new(text: &str) -> Self {
        HistoryItem {
            id: Uuid::new_v4().to_string(),
            text: text.to_owned(),
            timestamp: Utc::now().timestamp_millis(),
            category: None,
            tags: Vec::new(),
            favorite: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub limit: usize,
    pub persist: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig {
            limit: 10,
            persist: true,
        }
    }
}

pub struct HistoryStore {
    config: StoreConfig,
    storage: Box<dyn KeyValueStore>,
    history: Vec<HistoryItem>,
}

impl HistoryStore {
    pub fn new(config: StoreConfig, storage: Box<dyn KeyValueStore>) -> Self {
        let history = if config.persist {
            Self::load(storage.as_ref())
        } else {
            Vec::new()
        };
        HistoryStore {
            config,
            storage,
            history,
        }
    }

    fn load(storage: &dyn KeyValueStore) -> Vec<HistoryItem> {
        let data = match storage.get(STORAGE_KEY) {
            Ok(Some(data)) => data,
            Ok(None) => return Vec::new(),
            Err(e) => {
                warn!("Failed to read history slot: {}", e);
                return Vec::new();
            }
        };
        match serde_json::from_str(&data) {
            Ok(history) => history,
            Err(e) => {
                warn!("Discarding malformed history slot: {}", e);
                Vec::new()
            }
        }
    }

    fn save(&self) {
        if !self.config.persist {
            return;
        }
        let data = match serde_json::to_string(&self.history) {
            Ok(data) => data,
            Err(e) => {
                warn!("Failed to serialize history: {}", e);
                return;
            }
        };
        if let Err(e) = self.storage.set(STORAGE_KEY, &data) {
            warn!("Failed to persist history: {}", e);
        }
    }

    pub fn flush(&self) {
        self.save();
    }

    pub fn add(&mut self, text: &str) -> HistoryItem {
        if let Some(head) = self.history.first() {
            if head.text == text {
                debug!("Skipping duplicate of the newest item");
                return head.clone();
            }
        }

        let item = HistoryItem::new(text);
        self.history.insert(0, item.clone());
        if self.history.len() > self.config.limit {
            self.history.truncate(self.config.limit);
        }
        self.save();
        item
    }

    pub fn remove(&mut self, id: &str) {
        let before = self.history.len();
        self.history.retain(|item| item.id != id);
        if self.history.len() != before {
            self.save();
        }
    }

    pub fn clear(&mut self) {
        self.history.clear();
        if self.config.persist {
            if let Err(e) = self.storage.remove(STORAGE_KEY) {
                warn!("Failed to delete history slot: {}", e);
            }
        }
    }

    pub fn history(&self) -> &[HistoryItem] {
        &self.history
    }

    pub fn get(&self, id: &str) -> Option<&HistoryItem> {
        self.history.iter().find(|item| item.id == id)
    }

    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    pub fn add_tag(&mut self, id: &str, tag: &str) {
        let mut changed = false;
        if let Some(item) = self.history.iter_mut().find(|item| item.id == id) {
            if !item.tags.iter().any(|t| t == tag) {
                item.tags.push(tag.to_owned());
                changed = true;
            }
        }
        if changed {
            self.save();
        }
    }

    pub fn remove_tag(&mut self, id: &str, tag: &str) {
        let mut changed = false;
        if let Some(item) = self.history.iter_mut().find(|item| item.id == id) {
            let before = item.tags.len();
            item.tags.retain(|t| t != tag);
            changed = item.tags.len() != before;
        }
        if changed {
            self.save();
        }
    }

    pub fn set_category(&mut self, id: &str, category: &str) {
        let mut changed = false;
        if let Some(item) = self.history.iter_mut().find(|item| item.id == id) {
            item.category = Some(category.to_owned());
            changed = true;
        }
        if changed {
            self.save();
        }
    }

    pub fn toggle_favorite(&mut self, id: &str) {
        let mut changed = false;
        if let Some(item) = self.history.iter_mut().find(|item| item.id == id) {
            item.favorite = !item.favorite;
            changed = true;
        }
        if changed {
            self.save();
        }
    }

    pub fn categories(&self) -> Vec<String> {
        let mut categories: Vec<String> = Vec::new();
        for item in &self.history {
            if let Some(category) = &item.category {
                if !categories.contains(category) {
                    categories.push(category.clone());
                }
            }
        }
        categories
    }

    pub fn filtered(&self, query: Option<&str>, category: Option<&str>) -> Vec<&HistoryItem> {
        let query = query.map(str::to_lowercase);
        self.history
            .iter()
            .filter(|item| {
                let matches_query = query.as_deref().map_or(true, |q| {
                    item.text.to_lowercase().contains(q)
                        || item.tags.iter().any(|tag| tag.to_lowercase().contains(q))
                });
                let matches_category =
                    category.map_or(true, |c| item.category.as_deref() == Some(c));
                matches_query && matches_category
            })
            .collect()
    }

    pub fn export_history(&self) -> Result<String, HistoryError> {
        serde_json::to_string_pretty(&self.history)
            .map_err(|e| HistoryError::SerializationError(e.to_string()))
    }

    pub fn export_file_name() -> String {
        format!("clipboard-history-{}.json", Utc::now().timestamp_millis())
    }

    // Imported data may exceed the limit; the bound is re-established on the
    // next add.
    pub fn import_history(&mut self, contents: &str) {
        match serde_json::from_str::<Vec<HistoryItem>>(contents) {
            Ok(imported) => {
                info!("Imported {} history items", imported.len());
                self.history = imported;
            }
            Err(e) => {
                warn!("Ignoring malformed history import: {}", e);
            }
        }
    }
}
