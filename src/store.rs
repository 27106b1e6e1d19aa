use crate::models::Card;
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

/// Slot holding the saved card list.
pub const CARDS_KEY: &str = "Cards";

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, StoreError>;

/// Where the session loads its deck from.
pub trait CardStore {
    /// Last saved card list. `None` if nothing was saved or it can't be decoded.
    fn load(&self) -> Option<Vec<Card>>;

    fn save(&mut self, cards: &[Card]) -> Result<()>;
}

#[derive(Debug, Default)]
pub struct Preferences {
    path: Option<PathBuf>,
    values: BTreeMap<String, String>,
}

impl Preferences {
    /// A store that is never written to disk.
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Opens the store at `path`. A missing file is an empty store.
    pub fn open(path: &Path) -> Result<Self> {
        let values = match fs::read_to_string(path) {
            Ok(text) => serde_json::from_str(&text)?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(?path, "No preference file yet");
                BTreeMap::new()
            }
            Err(e) => return Err(e.into()),
        };
        Ok(Preferences {
            path: Some(path.to_path_buf()),
            values,
        })
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn set(&mut self, key: &str, value: String) -> Result<()> {
        self.values.insert(key.to_string(), value);
        self.flush()
    }

    fn flush(&self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string_pretty(&self.values)?)?;
        debug!(?path, keys = self.values.len(), "Wrote preferences");
        Ok(())
    }
}

impl CardStore for Preferences {
    fn load(&self) -> Option<Vec<Card>> {
        let data = self.get(CARDS_KEY)?;
        match serde_json::from_str(data) {
            Ok(cards) => Some(cards),
            Err(e) => {
                warn!(error = %e, "Saved cards could not be decoded, starting with an empty deck");
                None
            }
        }
    }

    fn save(&mut self, cards: &[Card]) -> Result<()> {
        let data = serde_json::to_string(cards)?;
        self.set(CARDS_KEY, data)?;
        debug!(count = cards.len(), "Saved cards");
        Ok(())
    }
}

#[test]
fn test_load_without_saved_cards() {
    let prefs = Preferences::in_memory();
    assert_eq!(prefs.load(), None);
}

#[test]
fn test_save_then_load_keeps_order() {
    let mut prefs = Preferences::in_memory();
    let cards = vec![Card::new("a", "1"), Card::new("b", "2")];
    prefs.save(&cards).unwrap();
    assert_eq!(prefs.load(), Some(cards));
}

#[test]
fn test_undecodable_cards_are_ignored() {
    let mut prefs = Preferences::in_memory();
    prefs
        .set(CARDS_KEY, String::from("[{\"prompt\": 1}]"))
        .unwrap();
    assert_eq!(prefs.load(), None);
}

#[test]
fn test_file_store_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("preferences.json");

    let mut prefs = Preferences::open(&path).unwrap();
    assert_eq!(prefs.load(), None);
    prefs.save(&[Card::example()]).unwrap();

    let reopened = Preferences::open(&path).unwrap();
    assert_eq!(reopened.load(), Some(vec![Card::example()]));
    assert_eq!(reopened.path(), Some(path.as_path()));
}

#[test]
fn test_corrupt_preference_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("preferences.json");
    fs::write(&path, "not json").unwrap();

    let result = Preferences::open(&path);
    assert!(matches!(result, Err(StoreError::Json(_))));
}
