//! # Race Server Library
//!
//! Authoritative server for the top-down racing game. It owns every vehicle's
//! physics, accepts throttled input datagrams from clients, and broadcasts the
//! packed position of every slot once per tick.
//!
//! ## Core Responsibilities
//!
//! ### Slot Assignment
//! The first datagram from an unseen endpoint claims the next player slot and
//! is answered with a one-byte slot assignment. Slots are never reclaimed, and
//! once all of them are taken new endpoints are silently ignored.
//!
//! ### Authoritative Simulation
//! Every tick the latest controls of each slot are turned into forces, the
//! physics world advances by one fixed step, and the resulting poses are
//! packed into a world-state datagram.
//!
//! ### State Broadcasting
//! The world state is sent unicast to every registered endpoint. A failed send
//! to one endpoint is logged and does not affect the others.
//!
//! ## Architecture Design
//!
//! ### Single-Owner Event Loop
//! Game state is owned by one task. A receiver task forwards raw datagrams to
//! it over a channel and a sender task drains its outgoing queue, so no locks
//! guard the registry or the physics world.
//!
//! ## Module Organization
//!
//! - `physics`: rigid bodies, the force model and the fixed-step integrator
//! - `registry`: endpoint-to-slot mapping and each slot's latest controls
//! - `game`: datagram ingestion and the per-tick simulation step
//! - `network`: sockets, background tasks and the tick scheduler
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use server::network::Server;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut server = Server::new("127.0.0.1:9999", shared::SIM_FPS).await?;
//!     server.run().await?;
//!     Ok(())
//! }
//! ```

pub mod game;
pub mod network;
pub mod physics;
pub mod registry;
