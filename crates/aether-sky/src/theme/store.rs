//! Persistence of the chosen theme label.
//!
//! The store is a plain string key-value store owned by the host. Failures
//! never reach the frame loop: reads fall back to the configured default
//! and writes are logged and dropped.

use std::collections::HashMap;

use aether_config::ThemeConfig;
use thiserror::Error;
use tracing::{debug, warn};

use super::Theme;

/// Errors raised by a [`ThemeStore`].
#[derive(Debug, Error)]
pub enum StoreError {
    /// The store cannot be reached at all.
    #[error("theme store unavailable")]
    Unavailable,

    /// I/O error in a file-backed store.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// String key-value storage for the theme label.
pub trait ThemeStore {
    /// Read `key`. `Ok(None)` when nothing is stored.
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    /// Write `key`.
    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
}

/// In-memory store. Can simulate an unavailable backend.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: HashMap<String, String>,
    unavailable: bool,
}

impl MemoryStore {
    /// Create an empty, working store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store whose every operation fails.
    pub fn unavailable() -> Self {
        Self {
            values: HashMap::new(),
            unavailable: true,
        }
    }
}

impl ThemeStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        if self.unavailable {
            return Err(StoreError::Unavailable);
        }
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        if self.unavailable {
            return Err(StoreError::Unavailable);
        }
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Startup theme: the stored label, else the configured default, else dark.
pub fn load_theme(store: &dyn ThemeStore, config: &ThemeConfig) -> Theme {
    let fallback = Theme::parse(&config.default_theme).unwrap_or(Theme::Dark);
    match store.get(&config.storage_key) {
        Ok(Some(label)) => Theme::parse(&label).unwrap_or_else(|| {
            warn!("Ignoring unknown stored theme '{label}'");
            fallback
        }),
        Ok(None) => {
            debug!("No stored theme, using {}", fallback.label());
            fallback
        }
        Err(e) => {
            warn!("Failed to read stored theme: {e}");
            fallback
        }
    }
}

/// Write `theme` under `key`. Failures are logged and swallowed.
pub fn persist_theme(store: &mut dyn ThemeStore, key: &str, theme: Theme) {
    if let Err(e) = store.set(key, theme.label()) {
        warn!("Failed to persist theme '{}': {e}", theme.label());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_prefers_stored_label() {
        let mut store = MemoryStore::new();
        store.set("theme", "light").unwrap();
        assert_eq!(load_theme(&store, &ThemeConfig::default()), Theme::Light);
    }

    #[test]
    fn test_load_falls_back_to_default() {
        let store = MemoryStore::new();
        let config = ThemeConfig {
            default_theme: "light".to_string(),
            ..ThemeConfig::default()
        };
        assert_eq!(load_theme(&store, &config), Theme::Light);
    }

    #[test]
    fn test_garbage_label_falls_back() {
        let mut store = MemoryStore::new();
        store.set("theme", "purple").unwrap();
        assert_eq!(load_theme(&store, &ThemeConfig::default()), Theme::Dark);
    }

    #[test]
    fn test_unavailable_store_is_harmless() {
        let mut store = MemoryStore::unavailable();
        assert_eq!(load_theme(&store, &ThemeConfig::default()), Theme::Dark);
        persist_theme(&mut store, "theme", Theme::Light);
    }

    #[test]
    fn test_persist_writes_label() {
        let mut store = MemoryStore::new();
        persist_theme(&mut store, "theme", Theme::Light);
        assert_eq!(store.get("theme").unwrap().as_deref(), Some("light"));
    }
}
