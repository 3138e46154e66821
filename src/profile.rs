//! Player profile persistence interface
//!
//! The game treats persistence as a key-value store with read/write/sync.
//! Real backends (browser storage, a sync service) live outside this crate;
//! the in-memory implementation here covers tests and the headless demo.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::progression::Progression;

/// Storage key for the player profile
pub const PROFILE_KEY: &str = "packet_sniper_player_data";

/// The persistent slice of player state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerProfile {
    pub player_name: String,
    pub level: u32,
    pub xp: f64,
    pub score: u64,
    pub wave_number: u32,
    pub total_threats_destroyed: u32,
    pub total_threats_missed: u32,
    pub total_shots: u32,
    pub total_hits: u32,
}

impl PlayerProfile {
    /// Snapshot the persistent fields of a progression store
    pub fn from_progression(tracker: &Progression) -> Self {
        Self {
            player_name: tracker.player_name.clone(),
            level: tracker.level(),
            xp: tracker.xp(),
            score: tracker.score(),
            wave_number: tracker.wave_number(),
            total_threats_destroyed: tracker.total_threats_destroyed,
            total_threats_missed: tracker.total_threats_missed,
            total_shots: tracker.total_shots,
            total_hits: tracker.total_hits,
        }
    }
}

/// A key-value profile store. `sync` flushes to whatever backend exists;
/// the default is a no-op for purely local stores.
pub trait ProfileStore {
    fn read(&self, key: &str) -> Option<String>;
    fn write(&mut self, key: &str, value: &str);
    fn sync(&mut self) {}
}

/// In-memory store for tests and the headless demo
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    map: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ProfileStore for MemoryStore {
    fn read(&self, key: &str) -> Option<String> {
        self.map.get(key).cloned()
    }

    fn write(&mut self, key: &str, value: &str) {
        let _ = self.map.insert(key.to_owned(), value.to_owned());
    }
}

/// Save a profile snapshot into the store
pub fn save_profile(store: &mut dyn ProfileStore, profile: &PlayerProfile) {
    if let Ok(json) = serde_json::to_string(profile) {
        store.write(PROFILE_KEY, &json);
        store.sync();
        log::info!("profile saved (level {})", profile.level);
    }
}

/// Load the saved profile, if any. Corrupt data is dropped with a warning.
pub fn load_profile(store: &dyn ProfileStore) -> Option<PlayerProfile> {
    let json = store.read(PROFILE_KEY)?;
    match serde_json::from_str(&json) {
        Ok(profile) => Some(profile),
        Err(err) => {
            log::warn!("discarding corrupt profile: {err}");
            None
        }
    }
}
