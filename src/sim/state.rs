//! Game state and core simulation types
//!
//! Everything that must be persisted for save/resume determinism lives here.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::combat::LastClick;
use super::events::Modifiers;
use super::spawn::Spawner;
use crate::GameOverReason;

/// Packet classification - assigned at creation, immutable afterward
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PacketKind {
    /// Legitimate traffic - must not be shot
    Benign,
    /// Standard threat
    Malicious,
    /// Degraded traffic - passing through costs XP
    Corrupted,
    /// High-value target - a single one escaping ends the run
    DataBreach,
    /// Legendary packet - one-shot kill, grants Power Mode
    Encrypted,
}

impl PacketKind {
    /// Anything that is not benign counts as a threat
    #[inline]
    pub fn is_threat(self) -> bool {
        self != PacketKind::Benign
    }

    /// XP awarded per point of max health when this packet is destroyed
    pub fn xp_multiplier(self) -> u32 {
        match self {
            PacketKind::DataBreach => 30,
            PacketKind::Corrupted => 15,
            PacketKind::Malicious => 8,
            PacketKind::Benign | PacketKind::Encrypted => 0,
        }
    }
}

/// Horizontal travel direction (gameplay only spawns rightward flow)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Left,
    Right,
}

/// A packet crossing the screen
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Packet {
    pub id: u32,
    pub pos: Vec2,
    /// Scalar speed in pixels/second
    pub speed: f32,
    pub direction: Direction,
    pub kind: PacketKind,
    /// Payload text shown on the packet card
    pub content: String,
    pub width: f32,
    pub height: f32,
    pub health: i32,
    pub max_health: i32,
    /// Rendering hint only
    pub glow: bool,
    /// Spawned by a Heat Wave
    pub heat_wave: bool,
    /// Rendering hint only (encrypted packets animate)
    pub animated: bool,
}

impl Packet {
    /// Axis-aligned hitbox test: the packet extends half its size around `pos`
    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= self.pos.x - self.width / 2.0
            && point.x <= self.pos.x + self.width / 2.0
            && point.y >= self.pos.y - self.height / 2.0
            && point.y <= self.pos.y + self.height / 2.0
    }

    /// True once the packet has fully crossed the far edge of the viewport
    pub fn has_exited(&self, view: Viewport) -> bool {
        match self.direction {
            Direction::Right => self.pos.x > view.width + self.width / 2.0,
            Direction::Left => self.pos.x < -self.width / 2.0,
        }
    }
}

/// Screen dimensions the simulation runs against
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: crate::consts::VIEW_WIDTH,
            height: crate::consts::VIEW_HEIGHT,
        }
    }
}

/// Events emitted by the simulation for the presentation layer.
///
/// The core never touches a rendering surface; flashes, particles and sounds
/// are all driven from this stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SimEvent {
    /// A packet was destroyed by a hit or by the Firewall Shield
    PacketDestroyed { id: u32, kind: PacketKind, pos: Vec2 },
    /// A threat slipped past the edge
    PacketExited { id: u32, kind: PacketKind },
    /// Second click on the same packet inside the critical window
    CriticalHit { pos: Vec2 },
    /// Encrypted packet destroyed: decorative particle burst over ~1s
    EncryptedBurst { pos: Vec2, particles: u32 },
    HeatWaveStarted { seconds: u32 },
    HeatWaveEnded,
    PowerModeStarted { seconds: u32 },
    PowerModeEnded,
    FirewallShieldStarted { seconds: u32 },
    FirewallShieldEnded,
    GameOver { reason: GameOverReason },
    /// Every fifth level grants a bonus
    LevelMilestone { level: u32, bonus_xp: u32 },
}

/// Complete simulation state (deterministic, serializable)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimState {
    /// Run seed for reproducibility
    pub seed: u64,
    /// All randomness flows through this one generator
    pub rng: Pcg32,
    pub view: Viewport,
    /// Simulation tick counter
    pub time_ticks: u64,
    /// Live packets in spawn order
    pub packets: Vec<Packet>,
    pub spawner: Spawner,
    pub modifiers: Modifiers,
    /// Last click record for critical-hit detection
    pub last_click: Option<LastClick>,
    /// Malicious packets that escaped this session
    pub missed_malicious: u32,
    /// Set while paused or outside the playing phase; a playing tick after
    /// a blocked one rebuilds the spawner and opening population
    pub(crate) blocked: bool,
    next_id: u32,
    #[serde(skip)]
    pub(crate) events: Vec<SimEvent>,
}

impl SimState {
    /// Create a fresh simulation with the given seed and viewport
    pub fn new(seed: u64, view: Viewport) -> Self {
        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            view,
            time_ticks: 0,
            packets: Vec::new(),
            spawner: Spawner::normal(1),
            modifiers: Modifiers::new(1),
            last_click: None,
            missed_malicious: 0,
            blocked: true,
            next_id: 1,
            events: Vec::new(),
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub(crate) fn push_event(&mut self, event: SimEvent) {
        self.events.push(event);
    }

    pub(crate) fn drain_events(&mut self) -> Vec<SimEvent> {
        std::mem::take(&mut self.events)
    }

    /// Create a packet via the factory and insert it into the live set
    pub(crate) fn spawn_packet(&mut self, level: u32, difficulty: f32, event_variant: bool) -> u32 {
        let id = self.next_entity_id();
        let packet = super::factory::create_packet(
            &mut self.rng,
            self.view,
            id,
            level,
            difficulty,
            event_variant,
        );
        self.packets.push(packet);
        id
    }

    /// Spawn the guaranteed encrypted packet that can open a Heat Wave
    pub(crate) fn spawn_forced_encrypted(&mut self, level: u32) -> u32 {
        let id = self.next_entity_id();
        let packet = super::factory::forced_encrypted(&mut self.rng, self.view, id, level);
        self.packets.push(packet);
        id
    }

    /// Look up a live packet index by id
    pub(crate) fn find_packet(&self, id: u32) -> Option<usize> {
        self.packets.iter().position(|p| p.id == id)
    }
}
