//! Packet Sniper entry point
//!
//! Headless demo: runs the deterministic simulation at the fixed timestep
//! with a simple auto-player and reports the outcome. The browser/GUI shell
//! consumes the same `tick` + event stream.

use std::time::{SystemTime, UNIX_EPOCH};

use packet_sniper::consts::SIM_DT;
use packet_sniper::profile::{MemoryStore, PlayerProfile, save_profile};
use packet_sniper::sim::{ShotEvent, SimEvent, SimState, TickInput, Viewport, tick};
use packet_sniper::{GamePhase, Leaderboard, Progression};

/// Demo length in simulated seconds
const DEMO_SECS: u64 = 90;

fn main() {
    env_logger::init();

    let seed = std::env::args()
        .nth(1)
        .and_then(|arg| arg.parse().ok())
        .unwrap_or_else(|| {
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_millis() as u64)
                .unwrap_or(0)
        });
    log::info!("packet sniper demo starting, seed {seed}");

    let mut tracker = Progression::new("Agent");
    tracker.start_game();
    let mut state = SimState::new(seed, Viewport::default());

    let mut destroyed = 0u32;
    let mut criticals = 0u32;

    for step in 0..DEMO_SECS * packet_sniper::consts::TICK_RATE as u64 {
        // Aim at the first threat on screen every third of a second
        let shots = if step % 20 == 0 {
            state
                .packets
                .iter()
                .find(|p| p.kind.is_threat())
                .map(|p| {
                    vec![ShotEvent {
                        x: p.pos.x,
                        y: p.pos.y,
                    }]
                })
                .unwrap_or_default()
        } else {
            Vec::new()
        };

        let input = TickInput {
            shots,
            ..Default::default()
        };
        for event in tick(&mut state, &mut tracker, &input, SIM_DT) {
            match event {
                SimEvent::PacketDestroyed { .. } => destroyed += 1,
                SimEvent::CriticalHit { .. } => criticals += 1,
                SimEvent::GameOver { reason } => {
                    log::info!("run ended: {}", reason.as_str());
                }
                _ => {}
            }
        }

        if tracker.phase() == GamePhase::GameOver {
            break;
        }
    }

    // Bank the wave bonuses so the summary shows a real score
    if tracker.phase() == GamePhase::Playing {
        tracker.end_wave();
    }

    log::info!(
        "demo over: level {}, score {}, {} destroyed ({} criticals), {} threats missed",
        tracker.level(),
        tracker.score(),
        destroyed,
        criticals,
        tracker.total_threats_missed,
    );

    let mut board = Leaderboard::new();
    if let Some(rank) = board.add_score(
        &tracker.player_name,
        tracker.score(),
        tracker.level(),
        tracker.wave_number(),
    ) {
        log::info!("leaderboard rank #{rank}");
    }

    let mut store = MemoryStore::new();
    save_profile(&mut store, &PlayerProfile::from_progression(&tracker));
}
