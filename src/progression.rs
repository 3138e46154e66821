//! Player progression: level, XP, score, ammo and wave bookkeeping.
//!
//! This is the one store the simulation talks to. It owns the master
//! difficulty inputs (`level`, `difficulty`, `phase`, paused flag) and is
//! mutated back through the `register_*` calls as packets are destroyed or
//! slip through.

use serde::{Deserialize, Serialize};

/// Current phase of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GamePhase {
    /// Waiting at the menu / between runs
    #[default]
    Ready,
    /// Active gameplay
    Playing,
    /// Wave finished normally
    Ended,
    /// Run lost
    GameOver,
}

/// Why a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GameOverReason {
    /// A data breach packet reached the edge
    DataBreach,
    /// Ten malicious packets slipped through
    MaliciousBreach,
    #[default]
    SystemFailure,
}

impl GameOverReason {
    pub fn as_str(self) -> &'static str {
        match self {
            GameOverReason::DataBreach => "data-breach",
            GameOverReason::MaliciousBreach => "malicious-breach",
            GameOverReason::SystemFailure => "system-failure",
        }
    }
}

/// Per-wave scoreboard
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct WaveStatus {
    pub shots_hit: u32,
    pub shots_missed: u32,
    pub malicious_hit: u32,
    pub benign_hit: u32,
    pub xp_gained: f64,
}

/// Base XP for any successful hit (before packet-type overrides)
const BASE_HIT_XP: f64 = 10.0;
/// Extra XP for hitting a threat
const MALICIOUS_HIT_XP: f64 = 50.0;
/// XP deducted when a corrupted packet escapes
const CORRUPTED_PASS_PENALTY: f64 = 50.0;
/// Bonus granted at every fifth level
pub const LEVEL_MILESTONE_XP: u32 = 500;

/// The player progression store
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Progression {
    phase: GamePhase,
    pub player_name: String,
    level: u32,
    /// XP toward the next level (carry-over after each level-up)
    xp: f64,
    score: u64,
    ammo: f32,
    max_ammo: f32,
    /// Ammo regained per second before the level bonus
    recharge_rate: f32,
    paused: bool,

    wave_number: u32,
    difficulty: f32,
    pub wave_status: WaveStatus,
    game_over_reason: GameOverReason,

    pub total_threats_destroyed: u32,
    pub total_threats_missed: u32,
    pub total_shots: u32,
    pub total_hits: u32,
    just_leveled_up: bool,
}

impl Progression {
    pub fn new(player_name: &str) -> Self {
        Self {
            phase: GamePhase::Ready,
            player_name: player_name.to_owned(),
            level: 1,
            xp: 0.0,
            score: 0,
            ammo: 10.0,
            max_ammo: 10.0,
            recharge_rate: 0.5,
            paused: false,
            wave_number: 0,
            difficulty: 1.0,
            wave_status: WaveStatus::default(),
            game_over_reason: GameOverReason::default(),
            total_threats_destroyed: 0,
            total_threats_missed: 0,
            total_shots: 0,
            total_hits: 0,
            just_leveled_up: false,
        }
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn xp(&self) -> f64 {
        self.xp
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    pub fn ammo(&self) -> f32 {
        self.ammo
    }

    pub fn difficulty(&self) -> f32 {
        self.difficulty
    }

    pub fn wave_number(&self) -> u32 {
        self.wave_number
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn game_over_reason(&self) -> GameOverReason {
        self.game_over_reason
    }

    /// XP needed to finish the current level
    pub fn xp_for_next_level(&self) -> f64 {
        (self.level as f64).powf(1.5) * 1000.0
    }

    /// Begin a run. The first wave resets score and ammo.
    pub fn start_game(&mut self) {
        self.phase = GamePhase::Playing;
        self.paused = false;
        if self.wave_number == 0 {
            self.wave_number = 1;
            self.score = 0;
            self.ammo = self.max_ammo;
            self.wave_status = WaveStatus::default();
        }
    }

    /// Advance to the next wave. Difficulty grows with the wave count and,
    /// more strongly, with the level.
    pub fn start_wave(&mut self) {
        self.wave_number += 1;
        self.difficulty =
            1.0 + (self.wave_number - 1) as f32 * 0.2 + (self.level as f32).sqrt() * 0.1;
        self.phase = GamePhase::Playing;
        self.paused = false;
        self.ammo = self.max_ammo;
        self.wave_status = WaveStatus::default();
    }

    /// Close out the wave: score bonuses for volume and accuracy.
    /// XP was already granted hit-by-hit.
    pub fn end_wave(&mut self) {
        let status = self.wave_status;
        let wave_bonus = self.wave_number as u64 * 50;
        let malicious_bonus = status.malicious_hit as u64 * 100;
        let attempts = (status.shots_hit + status.shots_missed).max(1);
        let accuracy_bonus = (status.malicious_hit as f64 / attempts as f64 * 100.0) as u64;

        self.score += wave_bonus + malicious_bonus + accuracy_bonus;
        self.phase = GamePhase::Ended;
    }

    /// End the run. Idempotent: later causes in the same tick are ignored.
    pub fn game_over(&mut self, reason: GameOverReason) {
        if self.phase == GamePhase::GameOver {
            return;
        }
        log::info!("game over: {}", reason.as_str());
        self.phase = GamePhase::GameOver;
        self.game_over_reason = reason;
    }

    pub fn toggle_pause(&mut self) {
        self.paused = !self.paused;
    }

    pub fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
    }

    /// Gate a shot request: playing, unpaused, ammo available. Consumes one
    /// ammo unless the shot is free (Power Mode). Records the attempt.
    pub fn try_fire(&mut self, free: bool) -> bool {
        if self.phase != GamePhase::Playing || self.paused {
            return false;
        }
        if !free {
            if self.ammo < 1.0 {
                return false;
            }
            self.ammo -= 1.0;
        }
        self.total_shots += 1;
        true
    }

    /// Continuous ammo recharge; the rate scales 10% per level above one
    pub fn recharge_ammo(&mut self, dt: f32) {
        if self.ammo < self.max_ammo {
            let level_bonus = 1.0 + (self.level - 1) as f32 * 0.1;
            self.ammo = (self.ammo + self.recharge_rate * level_bonus * dt).min(self.max_ammo);
        }
    }

    /// Record a successful hit. `xp_override` replaces the default formula
    /// when the caller has already priced the kill (type multipliers,
    /// Power Mode doubling, firewall sweeps).
    pub fn register_hit(&mut self, is_malicious: bool, xp_override: Option<u32>) {
        let gained = match xp_override {
            Some(xp) => xp as f64,
            None => {
                let malicious_bonus = if is_malicious { MALICIOUS_HIT_XP } else { 0.0 };
                let level_bonus = ((self.level - 1) as f64 * 0.2 * BASE_HIT_XP).floor();
                BASE_HIT_XP + malicious_bonus + level_bonus
            }
        };

        self.wave_status.shots_hit += 1;
        self.wave_status.xp_gained += gained;
        if is_malicious {
            self.wave_status.malicious_hit += 1;
            self.total_threats_destroyed += 1;
        } else {
            self.wave_status.benign_hit += 1;
        }
        self.total_hits += 1;
        self.grant_xp(gained);
    }

    /// Record a shot that hit nothing
    pub fn register_miss(&mut self) {
        self.wave_status.shots_missed += 1;
    }

    /// A corrupted packet escaped: count it and take the XP penalty
    pub fn register_corrupted_packet_passed(&mut self) {
        self.total_threats_missed += 1;
        self.xp = (self.xp - CORRUPTED_PASS_PENALTY).max(0.0);
    }

    /// Any threat escaped
    pub fn update_threats_missed(&mut self) {
        self.total_threats_missed += 1;
    }

    /// Grant XP outside the hit path (encrypted kills, level milestones)
    pub fn award_bonus_xp(&mut self, amount: u32) {
        self.grant_xp(amount as f64);
    }

    fn grant_xp(&mut self, amount: f64) {
        self.xp += amount;
        let needed = self.xp_for_next_level();
        if self.xp >= needed {
            self.level += 1;
            self.xp -= needed;
            self.just_leveled_up = true;
            log::info!("level up -> {}", self.level);
        }
    }

    /// Consume the level-up flag set by the most recent XP grant
    pub fn take_level_up(&mut self) -> bool {
        std::mem::take(&mut self.just_leveled_up)
    }
}
