//! Line-oriented circuit file save/load (`.vic`).
//!
//! One record per line:
//!
//! ```text
//! POWER=<bool>
//! SW,<index>,<x>,<y>,<on>
//! LED,<index>,<x>,<y>
//! IC,<index>,<kind name>,<x>,<y>
//! WIRE,<ownerKeyA>,<ownerKeyB>,<pinA>,<pinB>
//! ```
//!
//! Owner keys are `SW<i>`/`LED<i>`/`IC<i>` by save order. External pins are
//! written as pin number -1; component pins use DIP numbers 1-14. Power is
//! restored before any wire so wire creation propagates live values, exactly
//! as interactive wiring does.

use std::io::{self, BufRead, Write};

use thiserror::Error;
use tracing::warn;

use crate::circuit::{Circuit, CircuitError, ComponentId, LedId, PropagationError, SwitchId};
use crate::pin::{PinId, PinOwner};
use crate::types::{ComponentKind, Position};

/// Substituted when a file names a kind this build does not know.
pub const FALLBACK_KIND: ComponentKind = ComponentKind::Nand;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("i/o error reading circuit file")]
    Io(#[from] io::Error),
    #[error("malformed record at line {line}: {record}")]
    Malformed { line: usize, record: String },
    #[error(transparent)]
    Propagation(#[from] PropagationError),
    #[error(transparent)]
    Circuit(#[from] CircuitError),
}

/// Writes the circuit to `out` in the line format above.
pub fn save<W: Write>(circuit: &Circuit, out: &mut W) -> io::Result<()> {
    writeln!(out, "POWER={}", circuit.powered())?;

    for (index, (_, switch)) in circuit.switches().enumerate() {
        writeln!(
            out,
            "SW,{},{:.2},{:.2},{}",
            index, switch.position.x, switch.position.y, switch.on
        )?;
    }
    for (index, (_, led)) in circuit.indicators().enumerate() {
        writeln!(out, "LED,{},{:.2},{:.2}", index, led.position.x, led.position.y)?;
    }
    for (index, (_, component)) in circuit.components().enumerate() {
        writeln!(
            out,
            "IC,{},{},{:.2},{:.2}",
            index, component.kind, component.position.x, component.position.y
        )?;
    }

    for (_, wire) in circuit.wires() {
        let (key_a, pin_a) = owner_key(circuit, wire.driver);
        let (key_b, pin_b) = owner_key(circuit, wire.sink);
        writeln!(out, "WIRE,{},{},{},{}", key_a, key_b, pin_a, pin_b)?;
    }
    Ok(())
}

fn owner_key(circuit: &Circuit, pin: PinId) -> (String, i32) {
    match circuit.pin(pin).map(|p| p.owner) {
        Some(PinOwner::Component { id, number }) => {
            let index = circuit.component_index(id).unwrap_or(0);
            (format!("IC{index}"), number as i32)
        }
        Some(PinOwner::Switch(id)) => {
            let index = circuit.switch_index(id).unwrap_or(0);
            (format!("SW{index}"), -1)
        }
        Some(PinOwner::Led(id)) => {
            let index = circuit.indicator_index(id).unwrap_or(0);
            (format!("LED{index}"), -1)
        }
        None => (String::from("SW0"), -1),
    }
}

/// Reads a circuit from `input`.
///
/// Unknown component kind names are substituted with [`FALLBACK_KIND`] and a
/// warning; wire records that fail connection validation are skipped with a
/// warning. I/O errors and structurally malformed records abort the load.
pub fn load<R: BufRead>(input: R) -> Result<Circuit, LoadError> {
    let mut circuit = Circuit::new();
    let mut switches: Vec<SwitchId> = Vec::new();
    let mut leds: Vec<LedId> = Vec::new();
    let mut components: Vec<ComponentId> = Vec::new();
    let mut wire_records: Vec<(usize, String)> = Vec::new();

    for (number, line) in input.lines().enumerate() {
        let line = line?;
        let record = line.trim();
        if record.is_empty() {
            continue;
        }
        let line_number = number + 1;
        let malformed = || LoadError::Malformed {
            line: line_number,
            record: record.to_string(),
        };

        if let Some(value) = record.strip_prefix("POWER=") {
            let on: bool = value.trim().parse().map_err(|_| malformed())?;
            circuit.set_power(on)?;
        } else if let Some(rest) = record.strip_prefix("SW,") {
            let fields: Vec<&str> = rest.split(',').collect();
            if fields.len() != 4 {
                return Err(malformed());
            }
            let x: f64 = fields[1].parse().map_err(|_| malformed())?;
            let y: f64 = fields[2].parse().map_err(|_| malformed())?;
            let on: bool = fields[3].parse().map_err(|_| malformed())?;
            let id = circuit.add_switch(Position::new(x, y));
            circuit.set_external_input(id, on)?;
            switches.push(id);
        } else if let Some(rest) = record.strip_prefix("LED,") {
            let fields: Vec<&str> = rest.split(',').collect();
            if fields.len() != 3 {
                return Err(malformed());
            }
            let x: f64 = fields[1].parse().map_err(|_| malformed())?;
            let y: f64 = fields[2].parse().map_err(|_| malformed())?;
            leds.push(circuit.add_indicator(Position::new(x, y)));
        } else if let Some(rest) = record.strip_prefix("IC,") {
            let fields: Vec<&str> = rest.split(',').collect();
            if fields.len() != 4 {
                return Err(malformed());
            }
            let kind = match ComponentKind::from_name(fields[1]) {
                Some(kind) => kind,
                None => {
                    warn!(name = fields[1], "unknown component kind, substituting {FALLBACK_KIND}");
                    FALLBACK_KIND
                }
            };
            let x: f64 = fields[2].parse().map_err(|_| malformed())?;
            let y: f64 = fields[3].parse().map_err(|_| malformed())?;
            components.push(circuit.instantiate(kind, Position::new(x, y))?);
        } else if record.starts_with("WIRE,") {
            // Wires resolve against entities that may appear later in the
            // file; defer them to a second pass.
            wire_records.push((line_number, record.to_string()));
        } else {
            return Err(malformed());
        }
    }

    for (line_number, record) in wire_records {
        let malformed = || LoadError::Malformed {
            line: line_number,
            record: record.clone(),
        };
        let fields: Vec<&str> = record["WIRE,".len()..].split(',').collect();
        if fields.len() != 4 {
            return Err(malformed());
        }
        let pin_a: i32 = fields[2].parse().map_err(|_| malformed())?;
        let pin_b: i32 = fields[3].parse().map_err(|_| malformed())?;
        let a = resolve_pin(&circuit, &switches, &leds, &components, fields[0], pin_a)
            .ok_or_else(malformed)?;
        let b = resolve_pin(&circuit, &switches, &leds, &components, fields[1], pin_b)
            .ok_or_else(malformed)?;
        if let Err(error) = circuit.connect(a, b) {
            warn!(%error, record, "skipping wire record");
        }
    }

    circuit.evaluate_all()?;
    Ok(circuit)
}

fn resolve_pin(
    circuit: &Circuit,
    switches: &[SwitchId],
    leds: &[LedId],
    components: &[ComponentId],
    key: &str,
    pin_number: i32,
) -> Option<PinId> {
    if let Some(index) = key.strip_prefix("SW") {
        let id = *switches.get(index.parse::<usize>().ok()?)?;
        Some(circuit.switch(id)?.pin)
    } else if let Some(index) = key.strip_prefix("LED") {
        let id = *leds.get(index.parse::<usize>().ok()?)?;
        Some(circuit.indicator(id)?.pin)
    } else if let Some(index) = key.strip_prefix("IC") {
        let id = *components.get(index.parse::<usize>().ok()?)?;
        let number = usize::try_from(pin_number).ok()?;
        circuit.component_pin(id, number)
    } else {
        None
    }
}
