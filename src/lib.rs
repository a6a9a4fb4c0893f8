//! # Virtual IC Trainer Core
//!
//! The simulation core of a virtual IC trainer board written in Rust.
//!
//! This library provides:
//! - A pin/wire graph with validated, driver-oriented connections
//! - Change-driven value propagation under a global power gate
//! - A combinational component library of TTL-style DIP-14 packages
//!   (gates, multiplexers, demultiplexers, encoder, decoder)
//! - Truth-table generation, closed-form and by sweeping the live circuit
//! - Line-oriented circuit file save/load and JSON board-panel configuration
//!
//! Rendering, drag positioning and dialogs live outside this crate; the core
//! exposes a pin-change event stream (`Circuit::drain_events`) for them.

pub mod board;
pub mod circuit;
pub mod component;
pub mod connection;
pub mod logic;
pub mod persist;
pub mod pin;
pub mod truth_table;
pub mod types;

// Re-export commonly used items for easier importing
pub use circuit::{Circuit, CircuitError, ComponentId, LedId, PinEvent, PropagationError, SwitchId};
pub use pin::{Pin, PinId, PinRole, WireId};
pub use types::{ComponentKind, Position};
