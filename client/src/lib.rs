//! # Race Client Library
//!
//! Client side of the networked racing game. The client does not simulate
//! vehicles; it sends its held controls to the server at a fixed rate and
//! renders a smoothed copy of the positions the server broadcasts.
//!
//! ## Architecture Overview
//!
//! ### Throttled Input
//! Key edges update a small set of held controls. Frame time accumulates
//! until the send interval is reached, then one input packet goes out and the
//! timer restarts from zero.
//!
//! ### Interpolated Rendering
//! Each world-state packet only replaces per-slot targets. Every render frame
//! the drawn pose of each slot moves a fixed fraction of the way toward its
//! target, so motion stays smooth regardless of packet jitter.
//!
//! ### Threading
//! Network reception runs on a dedicated thread. It shares the interpolation
//! state with the render loop behind a mutex whose critical sections only copy
//! a handful of floats.
//!
//! ## Module Organization
//!
//! - `game`: per-slot interpolation state and snapshot application
//! - `input`: held controls and send-rate throttling
//! - `network`: the network worker thread and outbound input queue
//! - `rendering`: macroquad drawing of vehicles and status text

pub mod game;
pub mod input;
pub mod network;
pub mod rendering;
