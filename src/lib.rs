//! Packet Sniper - a network-defense arcade shooter
//!
//! Core modules:
//! - `sim`: Deterministic simulation (spawning, hit resolution, timed events)
//! - `progression`: Player progression state (level, XP, score, ammo)
//! - `content`: Synthetic packet payload generator
//! - `leaderboard`: Top-score table
//! - `profile`: Key-value player profile store

pub mod content;
pub mod leaderboard;
pub mod profile;
pub mod progression;
pub mod sim;

pub use leaderboard::Leaderboard;
pub use progression::{GameOverReason, GamePhase, Progression};

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz - packet speeds are px/s at 60 fps)
    pub const TICK_RATE: u32 = 60;
    /// Seconds per tick
    pub const SIM_DT: f32 = 1.0 / TICK_RATE as f32;

    /// Default viewport dimensions
    pub const VIEW_WIDTH: f32 = 1920.0;
    pub const VIEW_HEIGHT: f32 = 1080.0;

    /// Packets enter off-screen from the left
    pub const SPAWN_X: f32 = -100.0;
    /// Vertical margin above and below the spawn bands
    pub const SPAWN_MARGIN: f32 = 100.0;
    /// Number of vertical spawn bands used to reduce overlap
    pub const SPAWN_BANDS: u32 = 5;

    /// Double-click critical window (ms)
    pub const CRITICAL_WINDOW_MS: u32 = 500;

    /// Game over after this many malicious packets slip through
    pub const MAX_MISSED_MALICIOUS: u32 = 10;

    /// Power Mode duration (seconds) and its movement slow factor
    pub const POWER_MODE_SECS: u32 = 5;
    pub const POWER_MODE_SLOW: f32 = 0.5;
    /// Firewall Shield duration (seconds)
    pub const FIREWALL_SECS: u32 = 10;
}

/// Convert a millisecond duration to whole simulation ticks (at least 1)
#[inline]
pub fn ms_to_ticks(ms: u32) -> u32 {
    (ms * consts::TICK_RATE).div_ceil(1000).max(1)
}

/// Convert whole seconds to simulation ticks
#[inline]
pub fn secs_to_ticks(secs: u32) -> u32 {
    secs * consts::TICK_RATE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tick_conversions() {
        assert_eq!(ms_to_ticks(1000), 60);
        assert_eq!(ms_to_ticks(500), 30);
        assert_eq!(ms_to_ticks(100), 6);
        assert_eq!(ms_to_ticks(50), 3);
        // Sub-tick intervals round up, never to zero
        assert_eq!(ms_to_ticks(1), 1);
        assert_eq!(secs_to_ticks(5), 300);
    }
}
