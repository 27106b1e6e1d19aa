use crate::store::{self, Preferences};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::warn;

/// Slot holding the user's settings.
pub const SETTINGS_KEY: &str = "Settings";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    /// Put cards answered incorrectly back into the deck instead of dropping them.
    pub reuse_incorrect: bool,
    /// Shuffle the deck whenever a session starts.
    pub shuffle: bool,
}

impl Settings {
    /// Reads the saved settings, falling back to defaults.
    pub fn load(prefs: &Preferences) -> Self {
        let Some(data) = prefs.get(SETTINGS_KEY) else {
            return Settings::default();
        };
        serde_json::from_str(data).unwrap_or_else(|e| {
            warn!(error = %e, "Saved settings could not be decoded, using defaults");
            Settings::default()
        })
    }

    pub fn save(&self, prefs: &mut Preferences) -> store::Result<()> {
        prefs.set(SETTINGS_KEY, serde_json::to_string(self)?)
    }
}

impl fmt::Display for Settings {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            concat!(
                "Settings:\n",
                "  Reuse cards answered incorrectly: {}\n",
                "  Shuffle deck on start:            {}"
            ),
            yes_no(self.reuse_incorrect),
            yes_no(self.shuffle),
        )
    }
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "yes"
    } else {
        "no"
    }
}

#[test]
fn test_defaults_when_nothing_saved() {
    let prefs = Preferences::in_memory();
    assert_eq!(Settings::load(&prefs), Settings::default());
}

#[test]
fn test_save_and_load() {
    let mut prefs = Preferences::in_memory();
    let settings = Settings {
        reuse_incorrect: true,
        shuffle: false,
    };
    settings.save(&mut prefs).unwrap();
    assert_eq!(Settings::load(&prefs), settings);
}

#[test]
fn test_missing_fields_default() {
    let mut prefs = Preferences::in_memory();
    prefs
        .set(SETTINGS_KEY, String::from("{\"reuse_incorrect\": true}"))
        .unwrap();
    let settings = Settings::load(&prefs);
    assert!(settings.reuse_incorrect);
    assert!(!settings.shuffle);
}

#[test]
fn test_garbage_falls_back_to_defaults() {
    let mut prefs = Preferences::in_memory();
    prefs.set(SETTINGS_KEY, String::from("not json")).unwrap();
    assert_eq!(Settings::load(&prefs), Settings::default());
}

#[test]
fn test_display() {
    let settings = Settings {
        reuse_incorrect: true,
        shuffle: false,
    };
    assert_eq!(
        settings.to_string(),
        "Settings:\n  Reuse cards answered incorrectly: yes\n  Shuffle deck on start:            no"
    );
}
