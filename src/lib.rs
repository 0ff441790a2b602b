pub mod errors;
pub mod llm;
pub mod logger;
pub mod storage;
pub mod store;
pub mod watch;

pub use errors::HistoryError;
pub use store::{HistoryItem, HistoryStore, StoreConfig};
