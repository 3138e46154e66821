//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (by spawn order / entity ID)
//! - No rendering or platform dependencies

pub mod combat;
pub mod events;
pub mod factory;
pub mod spawn;
pub mod state;
pub mod tick;

pub use events::{FirewallShield, HeatWave, Modifiers, PowerMode};
pub use spawn::{BurstParams, SpawnMode, Spawner};
pub use state::{Direction, Packet, PacketKind, SimEvent, SimState, Viewport};
pub use tick::{ClickEvent, ShotEvent, TickInput, tick};
