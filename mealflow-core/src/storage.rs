//! Key-value storage for user preferences.
//!
//! `KeyValueStore` is deliberately narrow (get/set/remove on strings) so the
//! backing store can be swapped: `MemoryStore` for tests, `FileStore` for the CLI.
//! `Preferences` layers typed helpers on top. Like the browser storage it
//! replaces, read failures fall back to defaults and write failures are logged.

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::{Mutex, MutexGuard, PoisonError};
use thiserror::Error;

use crate::config::DEFAULT_LANGUAGE;
use crate::types::RecipeFilters;

const FAVORITES_KEY: &str = "mealflow_favorites";
const SEARCH_HISTORY_KEY: &str = "mealflow_search_history";
const RECENT_SEARCHES_KEY: &str = "mealflow_recent_searches";
const THEME_KEY: &str = "mealflow_theme";
const LANGUAGE_KEY: &str = "mealflow_language";
const LAST_ORDER_LINK_KEY: &str = "mealflow_last_order_link";
const FILTERS_KEY: &str = "mealflow_filters";

const ALL_KEYS: &[&str] = &[
    FAVORITES_KEY,
    SEARCH_HISTORY_KEY,
    RECENT_SEARCHES_KEY,
    THEME_KEY,
    LANGUAGE_KEY,
    LAST_ORDER_LINK_KEY,
    FILTERS_KEY,
];

/// Maximum entries kept in the search history.
pub const SEARCH_HISTORY_LIMIT: usize = 20;

/// Maximum entries kept in the recent searches list.
pub const RECENT_SEARCHES_LIMIT: usize = 10;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Corrupt storage file: {0}")]
    Json(#[from] serde_json::Error),
}

pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> MutexGuard<'_, BTreeMap<String, String>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.entries().remove(key);
        Ok(())
    }
}

/// A JSON object on disk. Every write rewrites the whole file.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: Mutex<BTreeMap<String, String>>,
}

impl FileStore {
    /// Open the store at `path`. A missing file is an empty store.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let path = path.into();
        let entries = match fs::read_to_string(&path) {
            Ok(contents) if contents.trim().is_empty() => BTreeMap::new(),
            Ok(contents) => serde_json::from_str(&contents)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(e.into()),
        };

        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn entries(&self) -> MutexGuard<'_, BTreeMap<String, String>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn persist(&self, entries: &BTreeMap<String, String>) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, serde_json::to_string_pretty(entries)?)?;
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut entries = self.entries();
        entries.insert(key.to_string(), value.to_string());
        self.persist(&entries)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut entries = self.entries();
        if entries.remove(key).is_some() {
            self.persist(&entries)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown theme: {0}")]
pub struct UnknownTheme(pub String);

impl FromStr for Theme {
    type Err = UnknownTheme;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            other => Err(UnknownTheme(other.to_string())),
        }
    }
}

/// Typed access to user preferences.
pub struct Preferences<S> {
    store: S,
}

impl<S: KeyValueStore> Preferences<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    fn read_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        match self.store.get(key) {
            Ok(Some(raw)) => serde_json::from_str(&raw)
                .inspect_err(|e| tracing::warn!(key, error = %e, "ignoring unreadable preference"))
                .ok(),
            Ok(None) => None,
            Err(e) => {
                tracing::warn!(key, error = %e, "failed to read preference");
                None
            }
        }
    }

    fn write_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) {
        let result = serde_json::to_string(value)
            .map_err(StorageError::from)
            .and_then(|raw| self.store.set(key, &raw));
        if let Err(e) = result {
            tracing::warn!(key, error = %e, "failed to save preference");
        }
    }

    fn read_raw(&self, key: &str) -> Option<String> {
        self.store
            .get(key)
            .inspect_err(|e| tracing::warn!(key, error = %e, "failed to read preference"))
            .ok()
            .flatten()
    }

    fn write_raw(&self, key: &str, value: &str) {
        if let Err(e) = self.store.set(key, value) {
            tracing::warn!(key, error = %e, "failed to save preference");
        }
    }

    fn remove(&self, key: &str) {
        if let Err(e) = self.store.remove(key) {
            tracing::warn!(key, error = %e, "failed to remove preference");
        }
    }

    /// Favorite recipe ids, oldest first.
    pub fn favorites(&self) -> Vec<String> {
        self.read_json(FAVORITES_KEY).unwrap_or_default()
    }

    pub fn add_favorite(&self, recipe_id: &str) {
        let mut favorites = self.favorites();
        if !favorites.iter().any(|id| id == recipe_id) {
            favorites.push(recipe_id.to_string());
            self.write_json(FAVORITES_KEY, &favorites);
        }
    }

    pub fn remove_favorite(&self, recipe_id: &str) {
        let favorites: Vec<String> = self
            .favorites()
            .into_iter()
            .filter(|id| id != recipe_id)
            .collect();
        self.write_json(FAVORITES_KEY, &favorites);
    }

    pub fn is_favorite(&self, recipe_id: &str) -> bool {
        self.favorites().iter().any(|id| id == recipe_id)
    }

    /// Search history, newest first.
    pub fn search_history(&self) -> Vec<String> {
        self.read_json(SEARCH_HISTORY_KEY).unwrap_or_default()
    }

    /// Record a search. Blank and already-recorded searches are ignored.
    pub fn add_search_to_history(&self, search: &str) {
        let search = search.trim();
        let mut history = self.search_history();
        if search.is_empty() || history.iter().any(|s| s == search) {
            return;
        }
        history.insert(0, search.to_string());
        history.truncate(SEARCH_HISTORY_LIMIT);
        self.write_json(SEARCH_HISTORY_KEY, &history);
    }

    pub fn clear_search_history(&self) {
        self.remove(SEARCH_HISTORY_KEY);
    }

    /// Recent searches, newest first.
    pub fn recent_searches(&self) -> Vec<String> {
        self.read_json(RECENT_SEARCHES_KEY).unwrap_or_default()
    }

    /// Record a search, moving an existing entry to the front.
    pub fn add_recent_search(&self, search: &str) {
        let search = search.trim();
        if search.is_empty() {
            return;
        }
        let mut searches: Vec<String> = self
            .recent_searches()
            .into_iter()
            .filter(|s| s != search)
            .collect();
        searches.insert(0, search.to_string());
        searches.truncate(RECENT_SEARCHES_LIMIT);
        self.write_json(RECENT_SEARCHES_KEY, &searches);
    }

    pub fn theme(&self) -> Theme {
        self.read_raw(THEME_KEY)
            .and_then(|t| {
                t.parse()
                    .inspect_err(|e| tracing::warn!(error = %e, "ignoring stored theme"))
                    .ok()
            })
            .unwrap_or_default()
    }

    pub fn set_theme(&self, theme: Theme) {
        self.write_raw(THEME_KEY, theme.as_str());
    }

    pub fn language(&self) -> String {
        self.read_raw(LANGUAGE_KEY)
            .unwrap_or_else(|| DEFAULT_LANGUAGE.to_string())
    }

    pub fn set_language(&self, language: &str) {
        self.write_raw(LANGUAGE_KEY, language);
    }

    /// The most recently generated order link.
    pub fn last_order_link(&self) -> Option<String> {
        self.read_raw(LAST_ORDER_LINK_KEY)
    }

    pub fn set_last_order_link(&self, link: &str) {
        self.write_raw(LAST_ORDER_LINK_KEY, link);
    }

    /// Saved recipe list filters; empty when none were saved.
    pub fn filters(&self) -> RecipeFilters {
        self.read_json(FILTERS_KEY).unwrap_or_default()
    }

    pub fn set_filters(&self, filters: &RecipeFilters) {
        self.write_json(FILTERS_KEY, filters);
    }

    /// Remove every preference this type manages.
    pub fn clear_all(&self) {
        for key in ALL_KEYS {
            self.remove(key);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_favorites_have_no_duplicates() {
        let prefs = Preferences::new(MemoryStore::new());
        prefs.add_favorite("r1");
        prefs.add_favorite("r2");
        prefs.add_favorite("r1");
        assert_eq!(prefs.favorites(), vec!["r1", "r2"]);
        assert!(prefs.is_favorite("r2"));

        prefs.remove_favorite("r1");
        assert_eq!(prefs.favorites(), vec!["r2"]);
    }

    #[test]
    fn test_search_history_is_capped_and_deduped() {
        let prefs = Preferences::new(MemoryStore::new());
        for i in 0..25 {
            prefs.add_search_to_history(&format!("борщ {}", i));
        }
        prefs.add_search_to_history("  борщ 24  ");
        prefs.add_search_to_history("   ");

        let history = prefs.search_history();
        assert_eq!(history.len(), SEARCH_HISTORY_LIMIT);
        assert_eq!(history[0], "борщ 24");
        assert_eq!(history[19], "борщ 5");

        prefs.clear_search_history();
        assert!(prefs.search_history().is_empty());
    }

    #[test]
    fn test_recent_search_moves_to_front() {
        let prefs = Preferences::new(MemoryStore::new());
        for search in ["вареники", "борщ", "деруни"] {
            prefs.add_recent_search(search);
        }
        prefs.add_recent_search("вареники");
        assert_eq!(prefs.recent_searches(), vec!["вареники", "деруни", "борщ"]);

        for i in 0..15 {
            prefs.add_recent_search(&format!("q{}", i));
        }
        assert_eq!(prefs.recent_searches().len(), RECENT_SEARCHES_LIMIT);
    }

    #[test]
    fn test_defaults_and_corrupt_values() {
        let store = MemoryStore::new();
        store.set(FAVORITES_KEY, "not json").unwrap();
        store.set(THEME_KEY, "sepia").unwrap();
        let prefs = Preferences::new(store);

        assert!(prefs.favorites().is_empty());
        assert_eq!(prefs.theme(), Theme::Light);
        assert_eq!(prefs.language(), "uk");

        prefs.set_theme(Theme::Dark);
        prefs.set_language("en");
        assert_eq!(prefs.theme(), Theme::Dark);
        assert_eq!(prefs.language(), "en");

        prefs.clear_all();
        assert_eq!(prefs.theme(), Theme::Light);
        assert_eq!(prefs.store().get(FAVORITES_KEY).unwrap(), None);
    }

    #[test]
    fn test_theme_parses_known_names_only() {
        assert_eq!("dark".parse::<Theme>(), Ok(Theme::Dark));
        assert_eq!(Theme::Light.as_str().parse::<Theme>(), Ok(Theme::Light));
        assert_eq!(
            "sepia".parse::<Theme>(),
            Err(UnknownTheme("sepia".to_string()))
        );
    }

    #[test]
    fn test_filters_round_trip_and_clear() {
        let prefs = Preferences::new(MemoryStore::new());
        assert_eq!(prefs.filters(), RecipeFilters::default());

        let filters = RecipeFilters {
            cuisine: Some("українська".to_string()),
            max_time: Some(45),
            tags: vec!["суп".to_string()],
            ..Default::default()
        };
        prefs.set_filters(&filters);
        assert_eq!(prefs.filters(), filters);
        assert_eq!(
            prefs.store().get(FILTERS_KEY).unwrap().as_deref(),
            Some(r#"{"cuisine":"українська","maxTime":45,"tags":["суп"]}"#)
        );

        prefs.clear_all();
        assert_eq!(prefs.filters(), RecipeFilters::default());
    }

    #[test]
    fn test_file_store_persists() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("storage.json");

        {
            let prefs = Preferences::new(FileStore::open(&path).unwrap());
            prefs.add_favorite("r1");
            prefs.set_last_order_link("https://store.example/order?ids=p1&titles=Milk");
        }

        let prefs = Preferences::new(FileStore::open(&path).unwrap());
        assert_eq!(prefs.favorites(), vec!["r1"]);
        assert_eq!(
            prefs.last_order_link().as_deref(),
            Some("https://store.example/order?ids=p1&titles=Milk")
        );
    }

    #[test]
    fn test_file_store_rejects_corrupt_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("storage.json");
        fs::write(&path, "[1, 2").unwrap();

        assert!(matches!(FileStore::open(&path), Err(StorageError::Json(_))));
    }
}
