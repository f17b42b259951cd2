pub mod settings;

pub use settings::{AppConfig, HistoryConfig, LogConfig, StoreConfig};
