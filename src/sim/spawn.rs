//! Spawn scheduling: continuous cadence for early levels, burst-cooldown
//! above level 10, and the high-frequency Heat Wave override.
//!
//! All cadence runs off the single simulation clock. A cycle period always
//! covers its own staggered burst, so two bursts can never be in flight at
//! once and pausing freezes everything by simply not ticking.

use rand::Rng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::ms_to_ticks;

/// Burst-mode parameters for level >= 10
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BurstParams {
    /// Packets per burst (2-4)
    pub size: u32,
    pub duration_ms: u32,
    pub cooldown_ms: u32,
}

/// Continuous spawn interval for levels 1-9 (ms)
pub fn spawn_interval_ms(level: u32) -> u32 {
    let level_spawn_bonus = (level * 8).min(350);
    (900u32.saturating_sub(level * 40).saturating_sub(level_spawn_bonus)).max(250)
}

/// Burst spawn parameters for levels 10+
pub fn burst_params(level: u32) -> BurstParams {
    let above = level.saturating_sub(9);
    BurstParams {
        size: 2 + (above / 2).min(2),
        duration_ms: (1200u32.saturating_sub(above * 80)).max(500),
        cooldown_ms: (2500u32.saturating_sub(above * 100)).max(1000),
    }
}

/// Heat Wave spawn interval (ms), tiered like the rest of the curve
pub fn heat_wave_interval_ms(level: u32) -> u32 {
    let base = 400u32.saturating_sub(level * 15).max(150);
    if level > 90 {
        (230u32.saturating_sub((level - 90) * 2)).max(180)
    } else if level >= 20 {
        230
    } else if level >= 15 {
        (base + 50).max(200)
    } else {
        base
    }
}

/// Opening population when a session starts or resumes.
/// Early levels get a small fixed count; level 10+ grows logarithmically
/// with an occasional extra packet, capped at 7.
pub fn initial_population(level: u32, rng: &mut Pcg32) -> u32 {
    if level < 10 {
        2 + (level as f32 * 0.4).floor() as u32
    } else {
        let log_growth = ((level - 8) as f32).log2().floor() as u32;
        let random_bonus = if rng.random::<f32>() < 0.3 { 1 } else { 0 };
        (3 + log_growth + random_bonus).min(7)
    }
}

/// What a due spawn should produce
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpawnRequest {
    pub event_variant: bool,
    pub forced_encrypted: bool,
}

impl SpawnRequest {
    pub const NORMAL: Self = Self {
        event_variant: false,
        forced_encrypted: false,
    };
    pub const HEAT_WAVE: Self = Self {
        event_variant: true,
        forced_encrypted: false,
    };
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct DelayedSpawn {
    /// Ticks remaining before the spawn fires
    delay: u32,
    request: SpawnRequest,
}

/// Active cadence mode, derived from level tier or an event override
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpawnMode {
    /// One packet per interval (levels 1-9)
    Continuous { interval: u32 },
    /// Staggered bursts separated by a cooldown (levels 10+)
    Burst { size: u32, burst: u32, cooldown: u32 },
    /// Heat Wave override: fast cadence, sometimes several packets per cycle
    HeatWave { interval: u32 },
}

/// The spawn scheduler. Rebuilt whenever play (re)starts, the level changes,
/// or a Heat Wave swaps the cadence - never two running at once.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Spawner {
    pub mode: SpawnMode,
    /// Level the cadence was derived from
    level: u32,
    /// Ticks until the next cycle fires
    cycle: u32,
    queue: Vec<DelayedSpawn>,
}

impl Spawner {
    /// Normal cadence for the given level: continuous below 10, bursts above
    pub fn normal(level: u32) -> Self {
        let mode = if level < 10 {
            SpawnMode::Continuous {
                interval: ms_to_ticks(spawn_interval_ms(level)),
            }
        } else {
            let params = burst_params(level);
            SpawnMode::Burst {
                size: params.size,
                burst: ms_to_ticks(params.duration_ms),
                cooldown: ms_to_ticks(params.cooldown_ms),
            }
        };
        let cycle = match mode {
            SpawnMode::Continuous { interval } | SpawnMode::HeatWave { interval } => interval,
            SpawnMode::Burst { burst, cooldown, .. } => burst + cooldown,
        };
        Self {
            mode,
            level,
            cycle,
            queue: Vec::new(),
        }
    }

    /// Heat Wave cadence override
    pub fn heat_wave(level: u32) -> Self {
        let interval = ms_to_ticks(heat_wave_interval_ms(level));
        Self {
            mode: SpawnMode::HeatWave { interval },
            level,
            cycle: interval,
            queue: Vec::new(),
        }
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    /// Schedule a spawn `delay` ticks from now (0 = this tick)
    pub fn push_delayed(&mut self, delay: u32, request: SpawnRequest) {
        self.queue.push(DelayedSpawn { delay, request });
    }

    /// Drop everything still waiting to fire
    pub fn clear_pending(&mut self) {
        self.queue.clear();
    }

    /// Queue the opening population for a session (re)start
    pub fn seed_initial(&mut self, level: u32, rng: &mut Pcg32) {
        let count = initial_population(level, rng);
        if level < 10 {
            for _ in 0..count {
                self.push_delayed(0, SpawnRequest::NORMAL);
            }
        } else {
            // Only a few land immediately; the rest trickle in 100ms apart
            let immediate = count.min(3);
            for _ in 0..immediate {
                self.push_delayed(0, SpawnRequest::NORMAL);
            }
            for i in 0..count - immediate {
                self.push_delayed((i + 1) * ms_to_ticks(100), SpawnRequest::NORMAL);
            }
        }
    }

    /// Advance one tick and return the spawns due now.
    pub fn take_due(&mut self, rng: &mut Pcg32) -> Vec<SpawnRequest> {
        let mut due: Vec<SpawnRequest> = Vec::new();

        self.queue.retain_mut(|entry| {
            if entry.delay == 0 {
                due.push(entry.request);
                false
            } else {
                entry.delay -= 1;
                true
            }
        });

        if self.cycle > 0 {
            self.cycle -= 1;
        }
        if self.cycle == 0 {
            match self.mode {
                SpawnMode::Continuous { interval } => {
                    due.push(SpawnRequest::NORMAL);
                    self.cycle = interval;
                }
                SpawnMode::Burst {
                    size,
                    burst,
                    cooldown,
                } => {
                    // Stagger the burst evenly across its duration; the cycle
                    // period spans burst + cooldown so the queue is always
                    // drained before the next burst starts
                    let stagger = burst / size.max(1);
                    due.push(SpawnRequest::NORMAL);
                    for i in 1..size {
                        self.push_delayed(i * stagger, SpawnRequest::NORMAL);
                    }
                    self.cycle = burst + cooldown;
                }
                SpawnMode::HeatWave { interval } => {
                    // 50% chance of a multi-spawn cycle (2-3 packets, 50ms apart)
                    let count = if rng.random::<f32>() < 0.5 {
                        1
                    } else {
                        2 + rng.random_range(0..2)
                    };
                    due.push(SpawnRequest::HEAT_WAVE);
                    for i in 1..count {
                        self.push_delayed(i * ms_to_ticks(50), SpawnRequest::HEAT_WAVE);
                    }
                    self.cycle = interval;
                }
            }
        }

        due
    }
}
