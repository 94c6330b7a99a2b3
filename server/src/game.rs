//! Authoritative race state: datagram ingestion and the per-tick step

use crate::physics::{PhysicsWorld, Vector2};
use crate::registry::ClientRegistry;
use log::debug;
use shared::{ClientPacket, ServerPacket, Snapshot, MAX_PLAYERS, SPAWN_X, SPAWN_Y};
use std::net::SocketAddr;

pub struct GameState {
    pub tick: u64,
    registry: ClientRegistry,
    physics: PhysicsWorld,
}

impl GameState {
    pub fn new(dt: f32) -> Self {
        Self {
            tick: 0,
            registry: ClientRegistry::new(MAX_PLAYERS),
            physics: PhysicsWorld::new(dt, Vector2::new(SPAWN_X, SPAWN_Y)),
        }
    }

    pub fn registry(&self) -> &ClientRegistry {
        &self.registry
    }

    pub fn physics(&self) -> &PhysicsWorld {
        &self.physics
    }

    /// Applies one inbound datagram.
    ///
    /// An unseen endpoint gets the next slot and a body at the spawn point,
    /// and the returned packet must be sent back to it. When every slot is
    /// taken the datagram is dropped without a reply. Input packets from a
    /// known endpoint overwrite its controls; anything else is ignored.
    pub fn handle_datagram(&mut self, addr: SocketAddr, data: &[u8]) -> Option<ServerPacket> {
        let mut reply = None;

        if self.registry.slot_of(addr).is_none() {
            match self.registry.register(addr) {
                Some(slot) => {
                    self.physics.add_body(slot as usize);
                    reply = Some(ServerPacket::SlotAssigned { slot });
                }
                None => {
                    debug!("No free slot for {}, dropping datagram", addr);
                    return None;
                }
            }
        }

        match ClientPacket::decode(data) {
            Ok(ClientPacket::Input(input)) => {
                self.registry.set_input(addr, input);
            }
            Err(e) => debug!("Dropping datagram from {}: {}", addr, e),
        }

        reply
    }

    /// Runs one simulation tick and returns the resulting world state.
    pub fn step(&mut self) -> Snapshot {
        for (slot, input) in self.registry.inputs() {
            self.physics.apply_input(slot as usize, input);
        }
        self.physics.step();
        self.tick += 1;
        self.physics.snapshot()
    }

    /// Addresses that receive the per-tick broadcast
    pub fn endpoints(&self) -> Vec<SocketAddr> {
        self.registry.endpoints()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::{InputFlags, SlotPose, DT, INPUT_UP};

    fn addr(port: u16) -> SocketAddr {
        SocketAddr::from(([10, 0, 0, 1], port))
    }

    #[test]
    fn test_first_contact_assigns_slot_zero() {
        let mut game = GameState::new(DT);
        let reply = game.handle_datagram(addr(4000), &[0x01, INPUT_UP]);

        assert_eq!(reply, Some(ServerPacket::SlotAssigned { slot: 0 }));
        assert_eq!(reply.unwrap().encode().unwrap(), vec![0x02, 0x00]);
        assert_eq!(game.physics().body_count(), 1);
        assert_eq!(
            game.registry().client(addr(4000)).unwrap().input,
            InputFlags::from_bits(INPUT_UP)
        );
    }

    #[test]
    fn test_repeat_contact_gets_no_reply() {
        let mut game = GameState::new(DT);
        game.handle_datagram(addr(4000), &[0x01, 0]);
        assert_eq!(game.handle_datagram(addr(4000), &[0x01, 0b010]), None);
        assert_eq!(game.registry().len(), 1);
        assert!(game.registry().client(addr(4000)).unwrap().input.left);
    }

    #[test]
    fn test_malformed_datagram_still_assigns_slot() {
        let mut game = GameState::new(DT);
        let reply = game.handle_datagram(addr(4000), &[0x09, 0xff]);
        assert_eq!(reply, Some(ServerPacket::SlotAssigned { slot: 0 }));
        assert_eq!(
            game.registry().client(addr(4000)).unwrap().input,
            InputFlags::default()
        );

        assert_eq!(game.handle_datagram(addr(4000), &[]), None);
        assert_eq!(game.handle_datagram(addr(4000), &[0x01]), None);
        assert_eq!(
            game.registry().client(addr(4000)).unwrap().input,
            InputFlags::default()
        );
    }

    #[test]
    fn test_full_registry_drops_new_endpoint() {
        let mut game = GameState::new(DT);
        for port in 0..MAX_PLAYERS as u16 {
            assert!(game.handle_datagram(addr(4000 + port), &[0x01, 0]).is_some());
        }

        let reply = game.handle_datagram(addr(9000), &[0x01, INPUT_UP]);
        assert_eq!(reply, None);
        assert_eq!(game.registry().len(), MAX_PLAYERS);
        assert_eq!(game.physics().body_count(), MAX_PLAYERS);
        assert!(!game.endpoints().contains(&addr(9000)));
    }

    #[test]
    fn test_step_moves_thrusting_slot_only() {
        let mut game = GameState::new(DT);
        game.handle_datagram(addr(4000), &[0x01, 0]);
        game.handle_datagram(addr(4001), &[0x01, INPUT_UP]);

        let snapshot = game.step();
        assert_eq!(game.tick, 1);
        assert_eq!(snapshot.slots[0], SlotPose::SPAWN);
        assert!(snapshot.slots[1].x > SPAWN_X);
        assert_eq!(snapshot.slots[2], SlotPose::VACANT);
        assert_eq!(snapshot.slots[3], SlotPose::VACANT);
    }

    #[test]
    fn test_step_without_clients() {
        let mut game = GameState::new(DT);
        assert_eq!(game.step(), Snapshot::default());
        assert!(game.endpoints().is_empty());
    }

    #[test]
    fn test_latest_input_wins_between_ticks() {
        let mut game = GameState::new(DT);
        game.handle_datagram(addr(4000), &[0x01, INPUT_UP]);
        game.handle_datagram(addr(4000), &[0x01, 0]);

        let snapshot = game.step();
        assert_eq!(snapshot.slots[0], SlotPose::SPAWN);
    }
}
