//! Packet creation: speed curves, type odds, health rolls and geometry.
//!
//! Difficulty scaling is intentionally non-linear. Speed and type odds go
//! through distinct regimes as the level climbs, tuned so hyperspeed levels
//! stay playable; the exact constants define the gameplay feel and must not
//! drift.

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;

use super::state::{Direction, Packet, PacketKind, Viewport};
use crate::consts::{SPAWN_BANDS, SPAWN_MARGIN, SPAWN_X};
use crate::content;

/// Speed regime constants for a level tier
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpeedCurve {
    pub level_speed_bonus: f32,
    pub speed_random_factor: f32,
    pub difficulty_impact: f32,
}

/// Level-tiered speed curve:
/// - 1-9: moderate scaling
/// - 10-14: hyperspeed, exponential with diminishing returns
/// - 15-19: slowed back down to stay playable
/// - 20-90: high but stable
/// - 91+: gradual creep upward again
pub fn speed_curve(level: u32) -> SpeedCurve {
    if level < 10 {
        SpeedCurve {
            level_speed_bonus: level as f32 * 1.2,
            speed_random_factor: 70.0,
            difficulty_impact: 0.15,
        }
    } else if level < 15 {
        let level_factor = 15.0 + ((level - 9) as f32).powf(1.2) * 5.0;
        SpeedCurve {
            level_speed_bonus: level_factor * 2.5,
            speed_random_factor: 40.0,
            difficulty_impact: 0.25,
        }
    } else if level < 20 {
        SpeedCurve {
            level_speed_bonus: 50.0 * 1.8,
            speed_random_factor: 30.0,
            difficulty_impact: 0.2,
        }
    } else if level <= 90 {
        SpeedCurve {
            level_speed_bonus: 55.0 * 1.7,
            speed_random_factor: 25.0,
            difficulty_impact: 0.18,
        }
    } else {
        let extra = (((level - 90) as f32) * 0.5).min(30.0);
        SpeedCurve {
            level_speed_bonus: (55.0 + extra) * 1.7,
            speed_random_factor: 25.0,
            difficulty_impact: 0.18 + (((level - 90) as f32) * 0.002).min(0.1),
        }
    }
}

/// Cumulative type-selection thresholds for one uniform draw
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TypeOdds {
    pub encrypted: f32,
    pub danger: f32,
    pub malicious: f32,
    pub corrupted: f32,
}

/// Type odds for the three regimes: event-variant, level<10, level>=10.
///
/// Encrypted packets are near-legendary outside events (0.2%, 0.3% past
/// level 12) but roll at 20% on every Heat Wave spawn.
pub fn type_odds(level: u32, event_variant: bool) -> TypeOdds {
    let encrypted = if event_variant {
        0.2
    } else if level > 12 {
        0.003
    } else {
        0.002
    };

    let (danger, malicious, corrupted) = if event_variant {
        let level_factor = level.saturating_sub(9) as f32;
        (
            (0.05 + level_factor * 0.003).min(0.15),
            (0.15 + level_factor * 0.01).min(0.35),
            (0.05 + level_factor * 0.005).min(0.15),
        )
    } else if level < 10 {
        (
            (0.01 + level as f32 * 0.002).min(0.05),
            (0.3 + level as f32 * 0.01).min(0.45),
            (0.13 + level as f32 * 0.005).min(0.18),
        )
    } else {
        (
            (0.05 + (level - 9) as f32 * 0.004).min(0.08),
            (0.45 + (level - 9) as f32 * 0.01).min(0.55),
            0.15,
        )
    };

    TypeOdds {
        encrypted,
        danger,
        malicious,
        corrupted,
    }
}

/// Map a uniform draw r in [0,1) to a packet kind via cumulative thresholds
pub fn pick_kind(r: f32, odds: TypeOdds) -> PacketKind {
    if r < odds.encrypted {
        PacketKind::Encrypted
    } else if r < odds.danger {
        PacketKind::DataBreach
    } else if r < odds.danger + odds.malicious {
        PacketKind::Malicious
    } else if r < odds.danger + odds.malicious + odds.corrupted {
        PacketKind::Corrupted
    } else {
        PacketKind::Benign
    }
}

/// Roll max health for a kind. Data breach packets are the toughest;
/// event-variant threats get a flat bonus on top.
fn roll_health(rng: &mut Pcg32, kind: PacketKind, event_variant: bool) -> i32 {
    let mut health = match kind {
        PacketKind::Benign => 1,
        PacketKind::DataBreach => 3 + rng.random_range(0..3),
        _ => 1 + rng.random_range(0..3),
    };
    if event_variant && kind.is_threat() {
        health += 6;
    }
    health
}

/// Pick a vertical spawn position from one of the equal screen bands,
/// with intra-band jitter so packets rarely stack
fn spawn_y(rng: &mut Pcg32, view: Viewport) -> f32 {
    let band_height = (view.height - 2.0 * SPAWN_MARGIN) / SPAWN_BANDS as f32;
    let band = rng.random_range(0..SPAWN_BANDS) as f32;
    SPAWN_MARGIN + band * band_height + rng.random::<f32>() * band_height * 0.7
}

/// Create a packet for the current level and difficulty.
///
/// The factory always succeeds; random draws are the only nondeterminism.
pub fn create_packet(
    rng: &mut Pcg32,
    view: Viewport,
    id: u32,
    level: u32,
    difficulty: f32,
    event_variant: bool,
) -> Packet {
    let curve = speed_curve(level);

    let mut base_speed = 25.0 + level.min(5) as f32 * 8.0 + curve.level_speed_bonus;
    if event_variant {
        base_speed *= 0.3;
    }
    let speed = (base_speed + rng.random::<f32>() * curve.speed_random_factor)
        * (1.0 + difficulty * curve.difficulty_impact);

    let y = spawn_y(rng, view);

    let odds = type_odds(level, event_variant);
    let kind = pick_kind(rng.random::<f32>(), odds);

    let content = content::generate_content(rng, kind.is_threat());
    let width = 160.0 + rng.random::<f32>() * 120.0;
    let height = 64.0 + rng.random::<f32>() * 32.0;
    let max_health = roll_health(rng, kind, event_variant);

    Packet {
        id,
        pos: Vec2::new(SPAWN_X, y),
        speed,
        direction: Direction::Right,
        kind,
        content,
        width,
        height,
        health: max_health,
        max_health,
        glow: matches!(kind, PacketKind::DataBreach | PacketKind::Encrypted),
        heat_wave: event_variant,
        animated: kind == PacketKind::Encrypted,
    }
}

/// The guaranteed encrypted packet that can lead a Heat Wave opening burst
pub fn forced_encrypted(rng: &mut Pcg32, view: Viewport, id: u32, level: u32) -> Packet {
    let slow = if level >= 15 { 0.7 } else { 1.0 };
    let speed = (150.0 + rng.random::<f32>() * 40.0) * slow;
    let y = SPAWN_MARGIN + rng.random::<f32>() * (view.height - 2.0 * SPAWN_MARGIN);

    Packet {
        id,
        pos: Vec2::new(SPAWN_X, y),
        speed,
        direction: Direction::Right,
        kind: PacketKind::Encrypted,
        content: content::generate_content(rng, true),
        width: 160.0 + rng.random::<f32>() * 120.0,
        height: 64.0 + rng.random::<f32>() * 32.0,
        health: 1,
        max_health: 1,
        glow: true,
        heat_wave: true,
        animated: true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;

    #[test]
    fn test_speed_curve_regimes() {
        // Level 1-9: linear bonus
        assert!((speed_curve(5).level_speed_bonus - 6.0).abs() < 1e-4);
        assert_eq!(speed_curve(5).speed_random_factor, 70.0);
        // Level 10-14: exponential hyperspeed
        let c = speed_curve(12);
        let expected = (15.0 + 3.0_f32.powf(1.2) * 5.0) * 2.5;
        assert!((c.level_speed_bonus - expected).abs() < 1e-4);
        assert_eq!(c.difficulty_impact, 0.25);
        // Level 15-19 and 20-90: fixed bonuses
        assert!((speed_curve(17).level_speed_bonus - 90.0).abs() < 1e-4);
        assert!((speed_curve(50).level_speed_bonus - 93.5).abs() < 1e-4);
        // Level 91+: capped creep
        let c = speed_curve(200);
        assert!((c.level_speed_bonus - (55.0 + 30.0) * 1.7).abs() < 1e-4);
        assert!((c.difficulty_impact - 0.28).abs() < 1e-6);
    }

    #[test]
    fn test_type_thresholds_low_level() {
        // Level 1: danger 1.2%, malicious 31%, corrupted 13.5%
        let odds = type_odds(1, false);
        assert!((odds.danger - 0.012).abs() < 1e-6);
        assert!((odds.malicious - 0.31).abs() < 1e-6);
        assert!((odds.corrupted - 0.135).abs() < 1e-6);

        // r=0.2 falls in the malicious band at level 1
        assert_eq!(pick_kind(0.2, odds), PacketKind::Malicious);
        assert_eq!(pick_kind(0.001, odds), PacketKind::Encrypted);
        assert_eq!(pick_kind(0.005, odds), PacketKind::DataBreach);
        assert_eq!(pick_kind(0.4, odds), PacketKind::Corrupted);
        assert_eq!(pick_kind(0.9, odds), PacketKind::Benign);
    }

    #[test]
    fn test_type_thresholds_event_variant() {
        // Heat Wave spawns: 20% encrypted regardless of level
        let odds = type_odds(20, true);
        assert!((odds.encrypted - 0.2).abs() < 1e-6);
        assert_eq!(pick_kind(0.19, odds), PacketKind::Encrypted);

        // Caps hold at very high levels
        let odds = type_odds(500, true);
        assert!((odds.danger - 0.15).abs() < 1e-6);
        assert!((odds.malicious - 0.35).abs() < 1e-6);
        assert!((odds.corrupted - 0.15).abs() < 1e-6);
    }

    #[test]
    fn test_encrypted_chance_bumps_past_level_12() {
        assert!((type_odds(12, false).encrypted - 0.002).abs() < 1e-7);
        assert!((type_odds(13, false).encrypted - 0.003).abs() < 1e-7);
    }

    #[test]
    fn test_event_variant_health_bonus() {
        let mut rng = Pcg32::seed_from_u64(42);
        for _ in 0..200 {
            let h = roll_health(&mut rng, PacketKind::Malicious, true);
            assert!((7..=9).contains(&h));
            let h = roll_health(&mut rng, PacketKind::DataBreach, false);
            assert!((3..=5).contains(&h));
        }
    }

    #[test]
    fn test_forced_encrypted_is_one_shot() {
        let mut rng = Pcg32::seed_from_u64(9);
        let p = forced_encrypted(&mut rng, Viewport::default(), 1, 12);
        assert_eq!(p.kind, PacketKind::Encrypted);
        assert_eq!(p.max_health, 1);
        assert!(p.glow && p.animated && p.heat_wave);
        assert!(p.speed >= 150.0 && p.speed < 190.0);

        // Level 15+ openers are slowed to 70%
        let p = forced_encrypted(&mut rng, Viewport::default(), 2, 15);
        assert!(p.speed >= 105.0 && p.speed < 133.0);
    }

    proptest! {
        #[test]
        fn packet_invariants(level in 1u32..200, seed in any::<u64>(), event in any::<bool>()) {
            let mut rng = Pcg32::seed_from_u64(seed);
            let p = create_packet(&mut rng, Viewport::default(), 1, level, 1.0, event);

            prop_assert!(p.speed > 0.0);
            prop_assert!(p.max_health >= 1);
            prop_assert_eq!(p.health, p.max_health);
            prop_assert!((160.0..280.0).contains(&p.width));
            prop_assert!((64.0..96.0).contains(&p.height));
            prop_assert_eq!(p.direction, Direction::Right);
            prop_assert!(!p.content.is_empty());
            if p.kind == PacketKind::Benign {
                prop_assert_eq!(p.max_health, 1);
            }
            if p.kind == PacketKind::Encrypted {
                prop_assert!(p.glow && p.animated);
            }
            prop_assert_eq!(p.heat_wave, event);
        }
    }
}
