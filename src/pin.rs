//! Pins and wires: the electrical graph the simulation runs over.
//!
//! Pins live in a slotmap arena owned by the circuit; a pin knows its owner,
//! its electrical role, its current boolean value and the wires incident on
//! it. Wires are directed driver-to-sink edges, canonicalized at creation by
//! the connection validator so that illegal pairings never exist in the graph.

use slotmap::{new_key_type, SlotMap};

use crate::circuit::{ComponentId, LedId, SwitchId};

new_key_type! {
    /// Arena key for a pin.
    pub struct PinId;
    /// Arena key for a wire.
    pub struct WireId;
}

pub type PinMap = SlotMap<PinId, Pin>;
pub type WireMap = SlotMap<WireId, Wire>;

/// Electrical role of a pin, fixed at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinRole {
    /// Receives a value from a driver.
    Input,
    /// Driven by component logic (or by a switch).
    Output,
    /// Always-high supply pin (DIP pin 14).
    PowerRail,
    /// Always-low supply pin (DIP pin 7).
    GroundRail,
}

impl PinRole {
    /// Whether a pin with this role may sit on the driving end of a wire.
    pub fn is_driver(&self) -> bool {
        !matches!(self, PinRole::Input)
    }
}

/// What a pin belongs to. Component pins carry their DIP pin number (1-based).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinOwner {
    Component { id: ComponentId, number: usize },
    Switch(SwitchId),
    Led(LedId),
}

#[derive(Debug)]
pub struct Pin {
    pub owner: PinOwner,
    pub role: PinRole,
    pub value: bool,
    /// Wires incident on this pin, driver or sink end.
    pub wires: Vec<WireId>,
}

impl Pin {
    pub fn new(owner: PinOwner, role: PinRole) -> Self {
        Pin {
            owner,
            role,
            value: false,
            wires: Vec::new(),
        }
    }
}

/// A directed connection: `driver` pushes its value to `sink`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Wire {
    pub driver: PinId,
    pub sink: PinId,
}

impl Wire {
    /// The end of this wire that is not `pin`.
    pub fn other(&self, pin: PinId) -> PinId {
        if pin == self.driver {
            self.sink
        } else {
            self.driver
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_driver_capability() {
        assert!(!PinRole::Input.is_driver());
        assert!(PinRole::Output.is_driver());
        assert!(PinRole::PowerRail.is_driver());
        assert!(PinRole::GroundRail.is_driver());
    }

    #[test]
    fn test_new_pin_starts_low_and_unwired() {
        let mut pins: PinMap = SlotMap::with_key();
        let mut switches: SlotMap<SwitchId, ()> = SlotMap::with_key();
        let sw = switches.insert(());
        let id = pins.insert(Pin::new(PinOwner::Switch(sw), PinRole::Output));
        let pin = &pins[id];
        assert!(!pin.value);
        assert!(pin.wires.is_empty());
    }

    #[test]
    fn test_wire_other_end() {
        let mut pins: PinMap = SlotMap::with_key();
        let mut switches: SlotMap<SwitchId, ()> = SlotMap::with_key();
        let sw = switches.insert(());
        let a = pins.insert(Pin::new(PinOwner::Switch(sw), PinRole::Output));
        let b = pins.insert(Pin::new(PinOwner::Switch(sw), PinRole::Input));
        let wire = Wire { driver: a, sink: b };
        assert_eq!(wire.other(a), b);
        assert_eq!(wire.other(b), a);
    }
}
