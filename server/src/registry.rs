//! Endpoint-to-slot bookkeeping for the race server
//!
//! The registry maps each client endpoint to the player slot it was given on
//! first contact, together with the controls that endpoint last reported.
//! Slots come from a monotonic counter and are never handed out twice, and
//! entries are never removed: a client that goes quiet keeps its slot for the
//! lifetime of the process. Once every slot is taken, new endpoints are
//! refused.

use log::info;
use shared::InputFlags;
use std::collections::HashMap;
use std::net::SocketAddr;

/// A registered endpoint and its latest controls
#[derive(Debug, Clone)]
pub struct Client {
    /// Slot index assigned on first contact
    pub slot: u8,
    /// Network address used as the registry key and for replies
    pub addr: SocketAddr,
    /// Controls from the most recent input packet
    pub input: InputFlags,
}

impl Client {
    pub fn new(slot: u8, addr: SocketAddr) -> Self {
        Self {
            slot,
            addr,
            input: InputFlags::default(),
        }
    }
}

/// Tracks every known endpoint, bounded by the number of player slots
pub struct ClientRegistry {
    clients: HashMap<SocketAddr, Client>,
    /// Next slot to hand out; only ever increases
    next_slot: u8,
    max_clients: usize,
}

impl ClientRegistry {
    pub fn new(max_clients: usize) -> Self {
        Self {
            clients: HashMap::new(),
            next_slot: 0,
            max_clients,
        }
    }

    /// Assigns the next free slot to a new endpoint
    ///
    /// Returns None when the registry is full or the endpoint is already
    /// known; use [`ClientRegistry::slot_of`] to look up existing entries.
    pub fn register(&mut self, addr: SocketAddr) -> Option<u8> {
        if self.clients.contains_key(&addr) || self.is_full() {
            return None;
        }

        let slot = self.next_slot;
        self.next_slot += 1;

        info!("Assigned slot {} to {}", slot, addr);
        self.clients.insert(addr, Client::new(slot, addr));
        Some(slot)
    }

    pub fn slot_of(&self, addr: SocketAddr) -> Option<u8> {
        self.clients.get(&addr).map(|client| client.slot)
    }

    pub fn client(&self, addr: SocketAddr) -> Option<&Client> {
        self.clients.get(&addr)
    }

    /// Overwrites the stored controls for a known endpoint
    ///
    /// Returns false if the endpoint has no slot.
    pub fn set_input(&mut self, addr: SocketAddr, input: InputFlags) -> bool {
        if let Some(client) = self.clients.get_mut(&addr) {
            client.input = input;
            true
        } else {
            false
        }
    }

    /// Every occupied slot with its latest controls, in slot order
    pub fn inputs(&self) -> Vec<(u8, InputFlags)> {
        let mut inputs: Vec<(u8, InputFlags)> = self
            .clients
            .values()
            .map(|client| (client.slot, client.input))
            .collect();
        inputs.sort_by_key(|(slot, _)| *slot);
        inputs
    }

    /// Every registered address, in slot order
    pub fn endpoints(&self) -> Vec<SocketAddr> {
        let mut clients: Vec<&Client> = self.clients.values().collect();
        clients.sort_by_key(|client| client.slot);
        clients.into_iter().map(|client| client.addr).collect()
    }

    pub fn len(&self) -> usize {
        self.clients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.clients.len() >= self.max_clients
    }
}
