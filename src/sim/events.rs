//! Timed game modifiers: Heat Wave, Power Mode and Firewall Shield.
//!
//! Each modifier is a tick countdown on the single simulation clock. At most
//! one Heat Wave runs at a time; Power Mode and Firewall Shield may overlap
//! (Power Mode starts the shield on entry). All three are force-ended on the
//! same tick the game pauses or leaves the playing phase.

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::spawn::{SpawnRequest, Spawner};
use super::state::{SimEvent, SimState};
use crate::consts::{FIREWALL_SECS, POWER_MODE_SECS, POWER_MODE_SLOW, TICK_RATE};
use crate::progression::Progression;
use crate::{ms_to_ticks, secs_to_ticks};

/// Heat Wave eligibility check cadence (ms) per level tier
pub fn heat_wave_check_ms(level: u32) -> u32 {
    if level > 90 {
        11_000
    } else if level >= 15 {
        12_000
    } else if level > 12 {
        10_000
    } else {
        15_000
    }
}

/// Probability a check triggers a Heat Wave, per level tier
pub fn heat_wave_chance(level: u32) -> f32 {
    if level > 90 {
        0.18
    } else if level >= 15 {
        0.15
    } else if level > 12 {
        0.2
    } else {
        0.1
    }
}

/// Roll a Heat Wave duration in whole seconds
pub fn heat_wave_duration_secs<R: Rng>(level: u32, rng: &mut R) -> u32 {
    if level > 90 {
        5 + rng.random_range(0..4)
    } else if level >= 15 {
        6 + rng.random_range(0..5)
    } else {
        5 + rng.random_range(0..6)
    }
}

/// Size of the opening burst a Heat Wave spawns
pub fn heat_wave_burst_count(level: u32) -> u32 {
    let base = 8 + (level.saturating_sub(9) / 2).min(7);
    if level > 90 {
        12 + ((level - 90) / 10).min(3)
    } else if level >= 20 {
        (10 + (level - 20) / 35).min(12)
    } else if level >= 15 {
        base.saturating_sub(2).max(10)
    } else {
        base
    }
}

/// Timed spawn-rate/toughness event, eligible from level 10
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct HeatWave {
    pub active: bool,
    /// Countdown to the end of the wave (ticks)
    pub remaining: u32,
    /// Countdown to the next eligibility roll (ticks)
    pub check: u32,
}

/// Time-slow / double-XP buff earned by destroying an encrypted packet
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct PowerMode {
    pub active: bool,
    pub remaining: u32,
}

/// Auto-destroys every dangerous packet each tick while up
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct FirewallShield {
    pub active: bool,
    pub remaining: u32,
}

/// The three concurrent modifiers
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Modifiers {
    pub heat_wave: HeatWave,
    pub power_mode: PowerMode,
    pub firewall: FirewallShield,
}

impl Modifiers {
    pub fn new(level: u32) -> Self {
        Self {
            heat_wave: HeatWave {
                check: ms_to_ticks(heat_wave_check_ms(level)),
                ..Default::default()
            },
            power_mode: PowerMode::default(),
            firewall: FirewallShield::default(),
        }
    }

    /// Movement-time speed factor. Stored packet speeds are never mutated,
    /// so the slow applies to packets spawned mid-mode and reverts exactly
    /// on expiry.
    #[inline]
    pub fn speed_factor(&self) -> f32 {
        if self.power_mode.active {
            POWER_MODE_SLOW
        } else {
            1.0
        }
    }

    pub fn any_active(&self) -> bool {
        self.heat_wave.active || self.power_mode.active || self.firewall.active
    }

    /// Whole seconds left on a countdown, for HUD-style consumers
    pub fn seconds_remaining(ticks: u32) -> u32 {
        ticks.div_ceil(TICK_RATE)
    }
}

impl SimState {
    /// Advance all modifier timers by one tick. Runs only while playing.
    pub(crate) fn tick_modifiers(
        &mut self,
        tracker: &mut Progression,
        force_heat_wave: bool,
    ) {
        let level = tracker.level();

        // Heat Wave eligibility roll (level 10+, one wave at a time)
        if level >= 10 && !self.modifiers.heat_wave.active {
            if force_heat_wave {
                self.start_heat_wave(level);
            } else {
                if self.modifiers.heat_wave.check > 0 {
                    self.modifiers.heat_wave.check -= 1;
                }
                if self.modifiers.heat_wave.check == 0 {
                    self.modifiers.heat_wave.check = ms_to_ticks(heat_wave_check_ms(level));
                    if self.rng.random::<f32>() < heat_wave_chance(level) {
                        self.start_heat_wave(level);
                    }
                }
            }
        }

        if self.modifiers.heat_wave.active {
            self.modifiers.heat_wave.remaining -= 1;
            if self.modifiers.heat_wave.remaining == 0 {
                self.end_heat_wave(level);
            }
        }

        if self.modifiers.power_mode.active {
            self.modifiers.power_mode.remaining -= 1;
            if self.modifiers.power_mode.remaining == 0 {
                self.end_power_mode();
            }
        }

        if self.modifiers.firewall.active {
            self.firewall_sweep(tracker);
            self.modifiers.firewall.remaining -= 1;
            if self.modifiers.firewall.remaining == 0 {
                self.end_firewall();
            }
        }
    }

    /// Begin a Heat Wave: swap in the fast spawner and queue the opening
    /// burst, with a 20% chance the first packet is a guaranteed encrypted.
    pub(crate) fn start_heat_wave(&mut self, level: u32) {
        if self.modifiers.heat_wave.active {
            return;
        }
        let seconds = heat_wave_duration_secs(level, &mut self.rng);
        self.modifiers.heat_wave.active = true;
        self.modifiers.heat_wave.remaining = secs_to_ticks(seconds);
        self.modifiers.heat_wave.check = ms_to_ticks(heat_wave_check_ms(level));

        self.spawner = Spawner::heat_wave(level);
        let burst = heat_wave_burst_count(level);
        let lead_encrypted = self.rng.random::<f32>() < 0.2;
        for i in 0..burst {
            let request = SpawnRequest {
                event_variant: true,
                forced_encrypted: i == 0 && lead_encrypted,
            };
            self.spawner.push_delayed(i * ms_to_ticks(100), request);
        }

        log::info!("heat wave started: {seconds}s, burst of {burst}");
        self.push_event(SimEvent::HeatWaveStarted { seconds });
    }

    /// End the Heat Wave and reinstall the normal spawner for the level
    pub(crate) fn end_heat_wave(&mut self, level: u32) {
        if !self.modifiers.heat_wave.active {
            return;
        }
        self.modifiers.heat_wave.active = false;
        self.modifiers.heat_wave.remaining = 0;
        self.modifiers.heat_wave.check = ms_to_ticks(heat_wave_check_ms(level));
        self.spawner = Spawner::normal(level);
        log::info!("heat wave ended");
        self.push_event(SimEvent::HeatWaveEnded);
    }

    /// Begin Power Mode (no restack while already running) and raise the
    /// Firewall Shield as a side effect.
    pub(crate) fn start_power_mode(&mut self) {
        if self.modifiers.power_mode.active {
            return;
        }
        self.modifiers.power_mode.active = true;
        self.modifiers.power_mode.remaining = secs_to_ticks(POWER_MODE_SECS);
        self.push_event(SimEvent::PowerModeStarted {
            seconds: POWER_MODE_SECS,
        });
        self.start_firewall();
    }

    pub(crate) fn end_power_mode(&mut self) {
        if !self.modifiers.power_mode.active {
            return;
        }
        self.modifiers.power_mode.active = false;
        self.modifiers.power_mode.remaining = 0;
        self.push_event(SimEvent::PowerModeEnded);
    }

    /// Raise the Firewall Shield; re-triggering only resets the timer
    pub(crate) fn start_firewall(&mut self) {
        if self.modifiers.firewall.active {
            self.modifiers.firewall.remaining = secs_to_ticks(FIREWALL_SECS);
            return;
        }
        self.modifiers.firewall.active = true;
        self.modifiers.firewall.remaining = secs_to_ticks(FIREWALL_SECS);
        self.push_event(SimEvent::FirewallShieldStarted {
            seconds: FIREWALL_SECS,
        });
    }

    pub(crate) fn end_firewall(&mut self) {
        if !self.modifiers.firewall.active {
            return;
        }
        self.modifiers.firewall.active = false;
        self.modifiers.firewall.remaining = 0;
        self.push_event(SimEvent::FirewallShieldEnded);
    }

    /// Destroy every dangerous packet on screen, awarding base XP as if each
    /// had been shot down normally. Benign and encrypted packets pass.
    fn firewall_sweep(&mut self, tracker: &mut Progression) {
        let mut destroyed = Vec::new();
        self.packets.retain(|p| {
            if p.kind.is_threat() && p.kind != super::state::PacketKind::Encrypted {
                destroyed.push((p.id, p.kind, p.pos, p.max_health));
                false
            } else {
                true
            }
        });

        for (id, kind, pos, max_health) in destroyed {
            let xp = kind.xp_multiplier() * max_health as u32;
            if xp > 0 {
                tracker.register_hit(true, Some(xp));
            }
            self.push_event(SimEvent::PacketDestroyed { id, kind, pos });
        }
    }

    /// Same-tick teardown for pause or phase exit: no modifier may keep
    /// counting and no queued spawn may land later.
    pub(crate) fn force_end_modifiers(&mut self, level: u32) {
        self.end_heat_wave(level);
        self.end_power_mode();
        self.end_firewall();
        self.spawner.clear_pending();
    }
}
