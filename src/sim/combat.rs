//! Hit resolution: pointer clicks and shots against packet hitboxes.
//!
//! Clicks address a packet by id; shots carry a screen point and resolve to
//! the first packet whose box contains it, passing straight through benign
//! traffic. Both paths share the damage rules, including the double-click
//! critical window and the encrypted one-shot path.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::state::{PacketKind, SimEvent, SimState};
use crate::consts::CRITICAL_WINDOW_MS;
use crate::ms_to_ticks;
use crate::progression::Progression;

/// Last click record for critical-hit detection. Ephemeral: overwritten on
/// every click, only ever compared against the immediately preceding one.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct LastClick {
    pub packet_id: u32,
    pub tick: u64,
    pub pos: Vec2,
}

impl SimState {
    /// A pointer click on a specific packet.
    ///
    /// A stale id (the packet already exited or died) is a silent no-op.
    pub(crate) fn resolve_click(&mut self, tracker: &mut Progression, id: u32, pos: Vec2) {
        let Some(index) = self.find_packet(id) else {
            return;
        };

        if self.packets[index].kind == PacketKind::Encrypted {
            self.destroy_encrypted(tracker, index, pos);
            return;
        }

        let critical = self.record_click(id, pos);

        // Benign packets cannot be hit; the click still counts for the
        // critical window bookkeeping above
        if self.packets[index].kind == PacketKind::Benign {
            return;
        }

        if critical {
            self.push_event(SimEvent::CriticalHit { pos });
        }
        self.apply_damage(tracker, index, if critical { 2 } else { 1 });
    }

    /// A shot fired at screen coordinates.
    pub(crate) fn resolve_shot(&mut self, tracker: &mut Progression, pos: Vec2) {
        let power_mode = self.modifiers.power_mode.active;
        if !tracker.try_fire(power_mode) {
            return;
        }

        let target = self
            .packets
            .iter()
            .position(|p| p.contains(pos) && p.kind != PacketKind::Benign);

        match target {
            Some(index) if self.packets[index].kind == PacketKind::Encrypted => {
                self.destroy_encrypted(tracker, index, pos);
            }
            Some(index) => {
                let id = self.packets[index].id;
                let critical = self.record_click(id, pos);
                if critical {
                    self.push_event(SimEvent::CriticalHit { pos });
                }
                self.apply_damage(tracker, index, if critical { 2 } else { 1 });
            }
            // Nothing under the crosshair: a miss, unless Power Mode's
            // unlimited-ammo grace is up
            None => {
                if !power_mode {
                    tracker.register_miss();
                }
            }
        }
    }

    /// Update the click record; true when this is the second hit on the same
    /// packet inside the critical window.
    fn record_click(&mut self, id: u32, pos: Vec2) -> bool {
        let now = self.time_ticks;
        let window = ms_to_ticks(CRITICAL_WINDOW_MS) as u64;
        let critical = self
            .last_click
            .as_ref()
            .is_some_and(|last| last.packet_id == id && now - last.tick < window);
        self.last_click = Some(LastClick {
            packet_id: id,
            tick: now,
            pos,
        });
        critical
    }

    /// Decrement health; at zero the packet dies and pays out XP scaled by
    /// its max health, doubled while Power Mode runs.
    fn apply_damage(&mut self, tracker: &mut Progression, index: usize, damage: i32) {
        self.packets[index].health -= damage;
        if self.packets[index].health > 0 {
            return;
        }

        let packet = self.packets.remove(index);
        let mut xp = packet.kind.xp_multiplier() * packet.max_health as u32;
        if self.modifiers.power_mode.active {
            xp *= 2;
        }
        tracker.register_hit(true, Some(xp));
        self.push_event(SimEvent::PacketDestroyed {
            id: packet.id,
            kind: packet.kind,
            pos: packet.pos,
        });
    }

    /// Encrypted packets die to any hit, ignoring health entirely, and set
    /// off the whole reward chain: particle burst, bonus XP, Power Mode.
    fn destroy_encrypted(&mut self, tracker: &mut Progression, index: usize, pos: Vec2) {
        let packet = self.packets.remove(index);
        let level = tracker.level();

        self.push_event(SimEvent::PacketDestroyed {
            id: packet.id,
            kind: packet.kind,
            pos: packet.pos,
        });
        self.push_event(SimEvent::EncryptedBurst { pos, particles: 20 });

        let bonus = 200 * (1 + level / 2);
        tracker.award_bonus_xp(bonus);
        log::info!("encrypted packet down: +{bonus} xp, power mode up");

        self.start_power_mode();
    }
}
