//! Persistent translation cache, one JSON store per target language.
//!
//! Keys are the trimmed source text (case and inner whitespace preserved).
//! The whole mapping is loaded at startup and rewritten on flush; a missing
//! or corrupt store degrades to an empty cache instead of failing the run.

use crate::error::{Error, Result};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Number of characters of a key shown in hit log lines.
const LOG_PREVIEW_CHARS: usize = 40;

/// Translation cache scoped to a single target language.
#[derive(Debug)]
pub struct TranslationCache {
    entries: BTreeMap<String, String>,
    path: Option<PathBuf>,
    enabled: bool,
    hits: usize,
}

impl TranslationCache {
    /// Location of the store for `target_language` inside `dir`.
    pub fn store_path(dir: &Path, target_language: &str) -> PathBuf {
        dir.join(format!("global-{}.json", target_language))
    }

    /// Load the store for `target_language` from `dir`.
    ///
    /// Never fails: unreadable or corrupt stores are logged and replaced by
    /// an empty mapping that will overwrite them on the next flush.
    pub fn load(dir: &Path, target_language: &str) -> Self {
        let path = Self::store_path(dir, target_language);
        let entries = match read_store(&path) {
            Ok(Some(entries)) => {
                log::info!(
                    "Loaded {} translation cache entries (target language: {})",
                    entries.len(),
                    target_language
                );
                entries
            }
            Ok(None) => BTreeMap::new(),
            Err(e) => {
                log::warn!("Failed to load cache {}: {}", path.display(), e);
                BTreeMap::new()
            }
        };

        Self {
            entries,
            path: Some(path),
            enabled: true,
            hits: 0,
        }
    }

    /// A cache that is never persisted.
    pub fn in_memory() -> Self {
        Self {
            entries: BTreeMap::new(),
            path: None,
            enabled: true,
            hits: 0,
        }
    }

    /// A cache that always misses and never stores anything.
    pub fn disabled() -> Self {
        Self {
            entries: BTreeMap::new(),
            path: None,
            enabled: false,
            hits: 0,
        }
    }

    /// Look up a translation, counting a hit on success.
    pub fn get(&mut self, text: &str) -> Option<String> {
        if !self.enabled {
            return None;
        }

        let key = text.trim();
        let translation = self.entries.get(key)?.clone();
        self.hits += 1;
        log::debug!("[cache hit] {}", preview(key));
        Some(translation)
    }

    /// Insert or overwrite the translation for `text`.
    pub fn put(&mut self, text: &str, translation: &str) {
        if !self.enabled {
            return;
        }
        self.entries
            .insert(text.trim().to_string(), translation.to_string());
    }

    /// Write the full mapping back to its store.
    ///
    /// Safe to call repeatedly; each call overwrites the store with the
    /// current mapping. A no-op for disabled and in-memory caches.
    pub fn flush(&self) -> Result<()> {
        let Some(path) = self.path.as_ref().filter(|_| self.enabled) else {
            return Ok(());
        };

        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).map_err(|e| {
                Error::CacheError(format!("Failed to create {}: {}", dir.display(), e))
            })?;
        }

        let json = serde_json::to_string_pretty(&self.entries)
            .map_err(|e| Error::CacheError(format!("Failed to serialize cache: {}", e)))?;

        // Write then rename; the store is never left half-written.
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, json)
            .and_then(|_| fs::rename(&tmp, path))
            .map_err(|e| {
                Error::CacheError(format!("Failed to write {}: {}", path.display(), e))
            })?;

        log::info!(
            "Saved {} translation cache entries to {}",
            self.entries.len(),
            path.display()
        );
        Ok(())
    }

    /// Number of lookups answered from the cache so far.
    pub fn hits(&self) -> usize {
        self.hits
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Backing store, if this cache is persisted.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Read-only view of all entries.
    pub fn entries(&self) -> &BTreeMap<String, String> {
        &self.entries
    }
}

fn read_store(path: &Path) -> Result<Option<BTreeMap<String, String>>> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let entries = serde_json::from_str(&content)
        .map_err(|e| Error::CacheError(format!("corrupt cache file: {}", e)))?;
    Ok(Some(entries))
}

fn preview(text: &str) -> String {
    if text.chars().count() > LOG_PREVIEW_CHARS {
        let head: String = text.chars().take(LOG_PREVIEW_CHARS).collect();
        format!("{}...", head)
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_get_uses_trimmed_key_and_counts_hits() {
        let mut cache = TranslationCache::in_memory();
        cache.put("  Hello world. ", "你好，世界。");

        assert_eq!(cache.get("Hello world."), Some("你好，世界。".to_string()));
        assert_eq!(cache.get("\tHello world.\n"), Some("你好，世界。".to_string()));
        assert_eq!(cache.get("hello world."), None);
        assert_eq!(cache.hits(), 2);
    }

    #[test]
    fn test_disabled_cache_never_hits() {
        let mut cache = TranslationCache::disabled();
        cache.put("Hello", "你好");

        assert_eq!(cache.get("Hello"), None);
        assert!(cache.is_empty());
        assert_eq!(cache.hits(), 0);
        assert!(cache.flush().is_ok());
    }

    #[test]
    fn test_flush_then_load_round_trip() {
        let dir = TempDir::new().unwrap();

        let mut cache = TranslationCache::load(dir.path(), "zh-CN");
        assert!(cache.is_empty());
        cache.put("Hello", "你好");
        cache.put("Quarterly report", "季度报告");
        cache.flush().unwrap();
        // Idempotent.
        cache.flush().unwrap();

        let reloaded = TranslationCache::load(dir.path(), "zh-CN");
        assert_eq!(reloaded.entries(), cache.entries());

        // Stores never mix languages.
        let other = TranslationCache::load(dir.path(), "ja");
        assert!(other.is_empty());
    }

    #[test]
    fn test_store_is_pretty_printed_utf8() {
        let dir = TempDir::new().unwrap();
        let mut cache = TranslationCache::load(dir.path(), "zh-CN");
        cache.put("Hello", "你好");
        cache.flush().unwrap();

        let path = TranslationCache::store_path(dir.path(), "zh-CN");
        assert!(path.ends_with("global-zh-CN.json"));
        let content = std::fs::read_to_string(path).unwrap();
        assert!(content.contains("\n  \"Hello\": \"你好\""));
    }

    #[test]
    fn test_corrupt_store_loads_empty() {
        let dir = TempDir::new().unwrap();
        let path = TranslationCache::store_path(dir.path(), "de");
        std::fs::write(&path, "{ not json").unwrap();

        let mut cache = TranslationCache::load(dir.path(), "de");
        assert!(cache.is_empty());

        cache.put("Hello", "Hallo");
        cache.flush().unwrap();
        let reloaded = TranslationCache::load(dir.path(), "de");
        assert_eq!(reloaded.len(), 1);
    }

    #[test]
    fn test_preview_truncates_on_char_boundary() {
        let long = "翻".repeat(50);
        let shown = preview(&long);
        assert_eq!(shown.chars().count(), LOG_PREVIEW_CHARS + 3);
        assert_eq!(preview("short"), "short");
    }
}
