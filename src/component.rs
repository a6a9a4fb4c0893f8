//! The DIP-14 package catalog.
//!
//! Every component kind is a 14-pin package: pin 7 is the ground rail, pin 14
//! the power rail, and the remaining pins carry roles fixed per kind. Pins
//! the kind does not use default to Input so that miswiring them is harmless.

use crate::pin::{PinId, PinRole};
use crate::types::{ComponentKind, Position};

/// Pins per package. Everything in the catalog is DIP-14.
pub const PACKAGE_PINS: usize = 14;
/// DIP number of the power rail pin.
pub const POWER_PIN: usize = 14;
/// DIP number of the ground rail pin.
pub const GROUND_PIN: usize = 7;

/// A placed package: its kind, panel position, and the arena ids of its 14
/// pins, indexed by DIP number minus one.
#[derive(Debug)]
pub struct Component {
    pub kind: ComponentKind,
    pub position: Position,
    pub pins: Vec<PinId>,
}

impl Component {
    pub fn new(kind: ComponentKind, position: Position, pins: Vec<PinId>) -> Self {
        Component { kind, position, pins }
    }

    /// Arena id of a pin by DIP number (1-14).
    pub fn pin(&self, number: usize) -> Option<PinId> {
        self.pins.get(number.checked_sub(1)?).copied()
    }
}

impl ComponentKind {
    /// Output pins by DIP number, in the kind's signal order.
    pub fn output_pins(&self) -> &'static [usize] {
        match self {
            // Quad gates share the 7400-style layout except the 7402,
            // whose outputs come first in each gate group.
            ComponentKind::Nand
            | ComponentKind::And
            | ComponentKind::Or
            | ComponentKind::Xor
            | ComponentKind::Xnor => &[3, 6, 8, 11],
            ComponentKind::Nor => &[1, 4, 10, 13],
            ComponentKind::Not => &[2, 4, 6, 9, 11, 13],
            ComponentKind::And3
            | ComponentKind::Or3
            | ComponentKind::Nand3
            | ComponentKind::Nor3
            | ComponentKind::Xor3
            | ComponentKind::Xnor3 => &[4],
            ComponentKind::Mux2 => &[4],
            ComponentKind::Mux4 => &[11],
            ComponentKind::Mux8 => &[13],
            ComponentKind::Demux2 => &[3, 4],
            ComponentKind::Demux4 => &[4, 5, 6, 8],
            ComponentKind::Demux8 => &[5, 6, 8, 9, 10, 11, 12, 13],
            ComponentKind::Encoder4x2 => &[5, 6],
            ComponentKind::Decoder2x4 => &[4, 5, 6, 8],
        }
    }

    /// Input pins by DIP number, in the kind's signal order (data bits first,
    /// then select/enable where applicable).
    pub fn input_pins(&self) -> &'static [usize] {
        match self {
            ComponentKind::Nand
            | ComponentKind::And
            | ComponentKind::Or
            | ComponentKind::Xor
            | ComponentKind::Xnor => &[1, 2, 4, 5, 9, 10, 12, 13],
            ComponentKind::Nor => &[2, 3, 5, 6, 8, 9, 11, 12],
            ComponentKind::Not => &[1, 3, 5, 8, 10, 12],
            ComponentKind::And3
            | ComponentKind::Or3
            | ComponentKind::Nand3
            | ComponentKind::Nor3
            | ComponentKind::Xor3
            | ComponentKind::Xnor3 => &[1, 2, 3],
            ComponentKind::Mux2 => &[1, 2, 3],
            ComponentKind::Mux4 => &[1, 2, 3, 4, 5, 6],
            ComponentKind::Mux8 => &[1, 2, 3, 4, 5, 6, 8, 9, 10, 11, 12],
            ComponentKind::Demux2 => &[1, 2],
            ComponentKind::Demux4 => &[1, 2, 3],
            ComponentKind::Demux8 => &[1, 2, 3, 4],
            ComponentKind::Encoder4x2 => &[1, 2, 3, 4],
            ComponentKind::Decoder2x4 => &[1, 2, 3],
        }
    }

    /// Roles for all 14 pins, indexed by DIP number minus one.
    pub fn pin_roles(&self) -> [PinRole; PACKAGE_PINS] {
        let mut roles = [PinRole::Input; PACKAGE_PINS];
        roles[GROUND_PIN - 1] = PinRole::GroundRail;
        roles[POWER_PIN - 1] = PinRole::PowerRail;
        for &number in self.output_pins() {
            roles[number - 1] = PinRole::Output;
        }
        roles
    }
}
