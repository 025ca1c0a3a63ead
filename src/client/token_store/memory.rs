use std::collections::HashMap;
use std::sync::RwLock;

use super::{PreferenceChange, Preferences};

/// Preferences held in process memory
#[derive(Debug, Default)]
pub struct MemoryPreferences {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryPreferences {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.read().map(|entries| entries.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Apply a batch of changes to a plain map
pub(crate) fn apply_changes(entries: &mut HashMap<String, String>, changes: &[PreferenceChange]) {
    for change in changes {
        match change {
            PreferenceChange::Put { key, value } => {
                entries.insert(key.clone(), value.clone());
            }
            PreferenceChange::Remove { key } => {
                entries.remove(key);
            }
        }
    }
}

impl Preferences for MemoryPreferences {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.read().ok()?.get(key).cloned()
    }

    fn apply(&self, changes: Vec<PreferenceChange>) {
        match self.entries.write() {
            Ok(mut entries) => apply_changes(&mut entries, &changes),
            Err(_) => tracing::error!("[STORE] In-memory preferences lock poisoned, edit dropped"),
        }
    }
}
