//! The circuit aggregate and the propagation engine.
//!
//! A `Circuit` owns every arena (pins, wires, components, switches,
//! indicators), the global power flag, and a pin-change event queue for the
//! rendering layer. Propagation is change-driven: setting a pin that already
//! holds the value is a no-op, otherwise the change is pushed through every
//! incident wire and the receiving component re-evaluated, recursively. Every
//! propagating entry point carries a step budget so combinational feedback
//! surfaces as an `Unsettled` error instead of unbounded recursion.

use std::collections::VecDeque;

use slotmap::{new_key_type, SlotMap};
use thiserror::Error;
use tracing::debug;

use crate::component::{Component, PACKAGE_PINS};
use crate::connection::{self, BusConnectError, ConnectError};
use crate::logic;
use crate::pin::{Pin, PinId, PinMap, PinOwner, PinRole, Wire, WireId, WireMap};
use crate::types::{ComponentKind, Position};

new_key_type! {
    /// Arena key for a placed component.
    pub struct ComponentId;
    /// Arena key for an external switch.
    pub struct SwitchId;
    /// Arena key for an external indicator.
    pub struct LedId;
}

/// Upper bound on pin changes per propagating operation.
pub const MAX_PROPAGATION_STEPS: usize = 100_000;
/// Upper bound on full-circuit settle passes in `evaluate_all`.
pub const MAX_SETTLE_PASSES: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PropagationError {
    #[error("circuit did not settle within the propagation budget")]
    Unsettled,
}

/// Errors from `Circuit`'s mutating operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CircuitError {
    #[error("connection rejected: {0}")]
    Rejected(#[from] ConnectError),
    #[error("bus connection rejected: {0}")]
    RejectedBus(#[from] BusConnectError),
    #[error(transparent)]
    Propagation(#[from] PropagationError),
    #[error("wire no longer exists")]
    UnknownWire,
    #[error("component no longer exists")]
    UnknownComponent,
    #[error("switch no longer exists")]
    UnknownSwitch,
    #[error("indicator no longer exists")]
    UnknownIndicator,
}

/// External toggle switch: one always-driving output pin.
#[derive(Debug)]
pub struct Switch {
    pub pin: PinId,
    pub position: Position,
    pub on: bool,
    /// Displayed state; off whenever board power is off.
    pub lit: bool,
}

/// External indicator LED: one input pin.
#[derive(Debug)]
pub struct Led {
    pub pin: PinId,
    pub position: Position,
    pub lit: bool,
}

/// A pin changed value. Drained by the rendering layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PinEvent {
    pub pin: PinId,
    pub value: bool,
}

/// The whole trainer board: entity arenas, power state, event queue.
#[derive(Debug)]
pub struct Circuit {
    pins: PinMap,
    wires: WireMap,
    components: SlotMap<ComponentId, Component>,
    switches: SlotMap<SwitchId, Switch>,
    leds: SlotMap<LedId, Led>,
    // Insertion-ordered id lists; save indices and sweep order come from these.
    component_order: Vec<ComponentId>,
    switch_order: Vec<SwitchId>,
    led_order: Vec<LedId>,
    powered: bool,
    steps: u64,
    events: Vec<PinEvent>,
}

impl Circuit {
    pub fn new() -> Self {
        Circuit {
            pins: SlotMap::with_key(),
            wires: SlotMap::with_key(),
            components: SlotMap::with_key(),
            switches: SlotMap::with_key(),
            leds: SlotMap::with_key(),
            component_order: Vec::new(),
            switch_order: Vec::new(),
            led_order: Vec::new(),
            powered: false,
            steps: 0,
            events: Vec::new(),
        }
    }

    pub fn powered(&self) -> bool {
        self.powered
    }

    /// Total pin changes recorded since creation. Useful for detecting that a
    /// re-evaluation changed nothing.
    pub fn propagation_steps(&self) -> u64 {
        self.steps
    }

    /// Turns board power on or off and re-settles the circuit.
    pub fn set_power(&mut self, on: bool) -> Result<(), PropagationError> {
        if self.powered != on {
            debug!(on, "board power");
        }
        self.powered = on;
        self.evaluate_all()
    }

    /// Places a toggle switch on the panel, initially off.
    pub fn add_switch(&mut self, position: Position) -> SwitchId {
        let id = self.switches.insert(Switch {
            pin: PinId::default(),
            position,
            on: false,
            lit: false,
        });
        let pin = self.pins.insert(Pin::new(PinOwner::Switch(id), PinRole::Output));
        self.switches[id].pin = pin;
        self.switch_order.push(id);
        id
    }

    /// Places an indicator LED on the panel.
    pub fn add_indicator(&mut self, position: Position) -> LedId {
        let id = self.leds.insert(Led {
            pin: PinId::default(),
            position,
            lit: false,
        });
        let pin = self.pins.insert(Pin::new(PinOwner::Led(id), PinRole::Input));
        self.leds[id].pin = pin;
        self.led_order.push(id);
        id
    }

    /// Places a component and evaluates it once, so outputs that are active
    /// for all-low inputs (NAND, NOR, ...) come up immediately.
    pub fn instantiate(
        &mut self,
        kind: ComponentKind,
        position: Position,
    ) -> Result<ComponentId, PropagationError> {
        let id = self.components.insert(Component::new(kind, position, Vec::new()));
        let roles = kind.pin_roles();
        let mut pin_ids = Vec::with_capacity(PACKAGE_PINS);
        for (index, &role) in roles.iter().enumerate() {
            let owner = PinOwner::Component { id, number: index + 1 };
            pin_ids.push(self.pins.insert(Pin::new(owner, role)));
        }
        self.components[id].pins = pin_ids;
        self.component_order.push(id);
        debug!(kind = %kind, "placed component");

        let mut budget = MAX_PROPAGATION_STEPS;
        self.evaluate_component(id, &mut budget)?;
        self.refresh_displays();
        Ok(id)
    }

    /// Removes a component and every wire touching it.
    pub fn remove_component(&mut self, id: ComponentId) -> Result<(), CircuitError> {
        let component = self.components.remove(id).ok_or(CircuitError::UnknownComponent)?;
        for pin in &component.pins {
            for wire in self.pins[*pin].wires.clone() {
                self.remove_wire_raw(wire);
            }
            self.pins.remove(*pin);
        }
        self.component_order.retain(|&c| c != id);
        self.reset_disconnected_indicators();
        self.refresh_displays();
        Ok(())
    }

    /// Removes an indicator and every wire touching it.
    pub fn remove_indicator(&mut self, id: LedId) -> Result<(), CircuitError> {
        let led = self.leds.remove(id).ok_or(CircuitError::UnknownIndicator)?;
        for wire in self.pins[led.pin].wires.clone() {
            self.remove_wire_raw(wire);
        }
        self.pins.remove(led.pin);
        self.led_order.retain(|&l| l != id);
        Ok(())
    }

    /// Connects two pins. The pair is validated and oriented driver-to-sink;
    /// the driver's current value is pushed through immediately. If the
    /// circuit fails to settle, the wire is removed again before the error
    /// is returned.
    pub fn connect(&mut self, a: PinId, b: PinId) -> Result<WireId, CircuitError> {
        let (driver, sink) = connection::validate(&self.pins, a, b)?;
        let wire = self.wires.insert(Wire { driver, sink });
        self.pins[driver].wires.push(wire);
        self.pins[sink].wires.push(wire);
        if let Err(error) = self.push_initial_value(wire) {
            self.remove_wire_raw(wire);
            self.reset_disconnected_indicators();
            self.refresh_displays();
            return Err(error.into());
        }
        self.refresh_displays();
        Ok(wire)
    }

    /// Connects two equal-width pin groups as parallel single-bit wires.
    /// Validation is atomic: if any pair is rejected, or the circuit fails
    /// to settle afterwards, no wire survives.
    pub fn connect_bus(
        &mut self,
        from: &[PinId],
        to: &[PinId],
    ) -> Result<Vec<WireId>, CircuitError> {
        let pairs = connection::validate_bus(&self.pins, &self.wires, from, to)?;
        let mut created = Vec::with_capacity(pairs.len());
        for (driver, sink) in pairs {
            let wire = self.wires.insert(Wire { driver, sink });
            self.pins[driver].wires.push(wire);
            self.pins[sink].wires.push(wire);
            created.push(wire);
        }
        for &wire in &created {
            if let Err(error) = self.push_initial_value(wire) {
                for &w in &created {
                    self.remove_wire_raw(w);
                }
                self.reset_disconnected_indicators();
                self.refresh_displays();
                return Err(error.into());
            }
        }
        self.refresh_displays();
        Ok(created)
    }

    /// Removes one wire. An indicator that loses its last wire resets to off.
    pub fn disconnect(&mut self, wire: WireId) -> Result<(), CircuitError> {
        if !self.wires.contains_key(wire) {
            return Err(CircuitError::UnknownWire);
        }
        self.remove_wire_raw(wire);
        self.reset_disconnected_indicators();
        self.refresh_displays();
        Ok(())
    }

    /// Removes every wire, leaving all placed entities in place.
    pub fn clear_wires(&mut self) {
        let all: Vec<WireId> = self.wires.keys().collect();
        for wire in all {
            self.remove_wire_raw(wire);
        }
        self.reset_disconnected_indicators();
        self.refresh_displays();
    }

    /// Sets a switch and propagates the new value through its wires.
    pub fn set_external_input(&mut self, id: SwitchId, on: bool) -> Result<(), CircuitError> {
        let pin = self.switches.get(id).ok_or(CircuitError::UnknownSwitch)?.pin;
        self.switches[id].on = on;
        let mut budget = MAX_PROPAGATION_STEPS;
        self.set_pin_value(pin, on, &mut budget)?;
        self.refresh_displays();
        Ok(())
    }

    /// Re-settles the whole circuit.
    ///
    /// Power off: every component output and every indicator pin is forced
    /// low without running gate logic, and all displayed state goes dark.
    /// Power on: every component is evaluated repeatedly until a full pass
    /// changes no pin, bounded by `MAX_SETTLE_PASSES`.
    pub fn evaluate_all(&mut self) -> Result<(), PropagationError> {
        if !self.powered {
            let components: Vec<ComponentId> = self.component_order.clone();
            for id in components {
                for &number in self.components[id].kind.output_pins() {
                    let pin = self.components[id].pins[number - 1];
                    self.force_pin(pin, false);
                }
            }
            let leds: Vec<LedId> = self.led_order.clone();
            for id in leds {
                let pin = self.leds[id].pin;
                self.force_pin(pin, false);
            }
        } else {
            let components: Vec<ComponentId> = self.component_order.clone();
            let mut budget = MAX_PROPAGATION_STEPS;
            let mut settled = false;
            for _ in 0..MAX_SETTLE_PASSES {
                let before = self.steps;
                for &id in &components {
                    self.evaluate_component(id, &mut budget)?;
                }
                if self.steps == before {
                    settled = true;
                    break;
                }
            }
            if !settled {
                return Err(PropagationError::Unsettled);
            }
        }
        self.reset_disconnected_indicators();
        self.refresh_displays();
        Ok(())
    }

    /// Takes the accumulated pin-change events.
    pub fn drain_events(&mut self) -> Vec<PinEvent> {
        std::mem::take(&mut self.events)
    }

    // --- read accessors -------------------------------------------------

    pub fn pin(&self, id: PinId) -> Option<&Pin> {
        self.pins.get(id)
    }

    pub fn pin_value(&self, id: PinId) -> Option<bool> {
        self.pins.get(id).map(|p| p.value)
    }

    pub fn component(&self, id: ComponentId) -> Option<&Component> {
        self.components.get(id)
    }

    /// Pin id of a component pin by DIP number (1-14).
    pub fn component_pin(&self, id: ComponentId, number: usize) -> Option<PinId> {
        self.components.get(id)?.pin(number)
    }

    pub fn switch(&self, id: SwitchId) -> Option<&Switch> {
        self.switches.get(id)
    }

    pub fn indicator(&self, id: LedId) -> Option<&Led> {
        self.leds.get(id)
    }

    /// Placed components in placement order.
    pub fn components(&self) -> impl Iterator<Item = (ComponentId, &Component)> + '_ {
        self.component_order.iter().map(move |&id| (id, &self.components[id]))
    }

    /// Switches in placement order.
    pub fn switches(&self) -> impl Iterator<Item = (SwitchId, &Switch)> + '_ {
        self.switch_order.iter().map(move |&id| (id, &self.switches[id]))
    }

    /// Indicators in placement order.
    pub fn indicators(&self) -> impl Iterator<Item = (LedId, &Led)> + '_ {
        self.led_order.iter().map(move |&id| (id, &self.leds[id]))
    }

    pub fn wires(&self) -> impl Iterator<Item = (WireId, &Wire)> + '_ {
        self.wires.iter()
    }

    /// Placement-order index of a component (its save index).
    pub fn component_index(&self, id: ComponentId) -> Option<usize> {
        self.component_order.iter().position(|&c| c == id)
    }

    pub fn switch_index(&self, id: SwitchId) -> Option<usize> {
        self.switch_order.iter().position(|&s| s == id)
    }

    pub fn indicator_index(&self, id: LedId) -> Option<usize> {
        self.led_order.iter().position(|&l| l == id)
    }

    // --- internals ------------------------------------------------------

    /// Change-driven propagation over a pending-update queue.
    ///
    /// Applying an update that differs from the pin's current value records
    /// the change, queues the owning component's recomputed outputs when an
    /// input changed, and queues the value for every sink the pin drives.
    /// Updates that match the current value are dropped, so the queue only
    /// stays busy while pins keep changing; a feedback loop therefore burns
    /// the step budget in this loop instead of growing the call stack.
    fn drain(
        &mut self,
        pending: &mut VecDeque<(PinId, bool)>,
        budget: &mut usize,
    ) -> Result<(), PropagationError> {
        while let Some((pin, value)) = pending.pop_front() {
            let Some(p) = self.pins.get(pin) else {
                continue;
            };
            if p.value == value {
                continue;
            }
            if *budget == 0 {
                return Err(PropagationError::Unsettled);
            }
            *budget -= 1;
            self.steps += 1;
            self.pins[pin].value = value;
            self.events.push(PinEvent { pin, value });

            let role = self.pins[pin].role;
            let owner = self.pins[pin].owner;

            if role == PinRole::Input {
                if let PinOwner::Component { id, .. } = owner {
                    self.queue_component_outputs(id, pending);
                }
            }

            if role.is_driver() {
                let wires = self.pins[pin].wires.clone();
                for w in wires {
                    let Some(wire) = self.wires.get(w) else { continue };
                    if wire.driver == pin {
                        pending.push_back((wire.sink, value));
                    }
                }
            }
        }
        Ok(())
    }

    fn set_pin_value(
        &mut self,
        pin: PinId,
        value: bool,
        budget: &mut usize,
    ) -> Result<(), PropagationError> {
        let mut pending = VecDeque::from([(pin, value)]);
        self.drain(&mut pending, budget)
    }

    /// Runs one component's logic and propagates the resulting outputs.
    fn evaluate_component(
        &mut self,
        id: ComponentId,
        budget: &mut usize,
    ) -> Result<(), PropagationError> {
        let mut pending = VecDeque::new();
        self.queue_component_outputs(id, &mut pending);
        self.drain(&mut pending, budget)
    }

    /// Computes a component's outputs from its current pin values and queues
    /// them as pending updates.
    fn queue_component_outputs(&self, id: ComponentId, pending: &mut VecDeque<(PinId, bool)>) {
        let Some(component) = self.components.get(id) else {
            return;
        };
        let mut values = [false; PACKAGE_PINS];
        for (index, &pin) in component.pins.iter().enumerate() {
            values[index] = self.pins[pin].value;
        }
        for (number, value) in logic::evaluate(component.kind, &values, self.powered) {
            pending.push_back((component.pins[number - 1], value));
        }
    }

    /// Sets a pin directly, without propagation or gate logic. Used by the
    /// power-off path and by indicator resets.
    fn force_pin(&mut self, pin: PinId, value: bool) {
        if let Some(p) = self.pins.get_mut(pin) {
            if p.value != value {
                p.value = value;
                self.steps += 1;
                self.events.push(PinEvent { pin, value });
            }
        }
    }

    /// Pushes a new wire's driver value to its sink and settles downstream.
    fn push_initial_value(&mut self, wire: WireId) -> Result<(), PropagationError> {
        let Wire { driver, sink } = self.wires[wire];
        let value = match self.pins[driver].role {
            PinRole::PowerRail => true,
            PinRole::GroundRail => false,
            _ => self.pins[driver].value,
        };
        // Rails hold their level regardless of earlier state.
        self.pins[driver].value = value;
        let mut budget = MAX_PROPAGATION_STEPS;
        self.set_pin_value(sink, value, &mut budget)
    }

    fn remove_wire_raw(&mut self, wire: WireId) {
        if let Some(w) = self.wires.remove(wire) {
            for end in [w.driver, w.sink] {
                if let Some(pin) = self.pins.get_mut(end) {
                    pin.wires.retain(|&x| x != wire);
                }
            }
        }
    }

    /// Indicators with no remaining wire reset to off.
    fn reset_disconnected_indicators(&mut self) {
        let leds: Vec<LedId> = self.led_order.clone();
        for id in leds {
            let pin = self.leds[id].pin;
            if self.pins[pin].wires.is_empty() {
                self.force_pin(pin, false);
            }
        }
    }

    /// Recomputes displayed switch/indicator state from power and pin values.
    fn refresh_displays(&mut self) {
        let powered = self.powered;
        for switch in self.switches.values_mut() {
            switch.lit = powered && switch.on;
        }
        let leds: Vec<LedId> = self.led_order.clone();
        for id in leds {
            let value = self.pins[self.leds[id].pin].value;
            self.leds[id].lit = powered && value;
        }
    }
}

impl Default for Circuit {
    fn default() -> Self {
        Circuit::new()
    }
}
