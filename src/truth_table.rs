//! Truth-table generation.
//!
//! Two paths produce tables: a closed-form path for the combinational blocks
//! (MUX/DEMUX/ENCODER/DECODER), computed directly from `logic::evaluate` so
//! the rows always agree with the live formulas, and a circuit-driven sweep
//! that toggles the board's wired switches through every assignment and reads
//! the wired indicators back.

use thiserror::Error;

use crate::circuit::{Circuit, CircuitError, LedId, PropagationError, SwitchId};
use crate::component::PACKAGE_PINS;
use crate::logic;
use crate::types::ComponentKind;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TruthTable {
    /// Input column names followed by output column names.
    pub headers: Vec<String>,
    pub rows: Vec<Row>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    pub inputs: Vec<bool>,
    pub outputs: Vec<bool>,
    /// Circuit sweeps run in observational mode with no reference table, so
    /// every swept row reports pass.
    pub pass: bool,
}

impl TruthTable {
    pub fn input_count(&self) -> usize {
        self.rows.first().map_or(0, |row| row.inputs.len())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TruthTableError {
    #[error("no wired switch to sweep")]
    NoActiveInputs,
    #[error("no wired indicator to observe")]
    NoActiveOutputs,
    #[error(transparent)]
    Circuit(#[from] CircuitError),
    #[error(transparent)]
    Propagation(#[from] PropagationError),
}

/// (name, DIP pin) signal columns for one block kind.
struct Signals {
    inputs: &'static [(&'static str, usize)],
    outputs: &'static [(&'static str, usize)],
}

fn signals(kind: ComponentKind) -> Option<Signals> {
    let s = match kind {
        ComponentKind::Mux2 => Signals {
            inputs: &[("A", 1), ("B", 2), ("S", 3)],
            outputs: &[("Y", 4)],
        },
        ComponentKind::Mux4 => Signals {
            inputs: &[("I0", 1), ("I1", 2), ("I2", 3), ("I3", 4), ("S0", 5), ("S1", 6)],
            outputs: &[("Y", 11)],
        },
        ComponentKind::Mux8 => Signals {
            inputs: &[
                ("I0", 1),
                ("I1", 2),
                ("I2", 3),
                ("I3", 4),
                ("I4", 5),
                ("I5", 6),
                ("I6", 8),
                ("I7", 9),
                ("S0", 10),
                ("S1", 11),
                ("S2", 12),
            ],
            outputs: &[("Y", 13)],
        },
        ComponentKind::Demux2 => Signals {
            inputs: &[("D", 1), ("S", 2)],
            outputs: &[("Y0", 3), ("Y1", 4)],
        },
        ComponentKind::Demux4 => Signals {
            inputs: &[("D", 1), ("S0", 2), ("S1", 3)],
            outputs: &[("Y0", 4), ("Y1", 5), ("Y2", 6), ("Y3", 8)],
        },
        ComponentKind::Demux8 => Signals {
            inputs: &[("D", 1), ("S0", 2), ("S1", 3), ("S2", 4)],
            outputs: &[
                ("Y0", 5),
                ("Y1", 6),
                ("Y2", 8),
                ("Y3", 9),
                ("Y4", 10),
                ("Y5", 11),
                ("Y6", 12),
                ("Y7", 13),
            ],
        },
        ComponentKind::Encoder4x2 => Signals {
            inputs: &[("D0", 1), ("D1", 2), ("D2", 3), ("D3", 4)],
            outputs: &[("Y1", 6), ("Y0", 5)],
        },
        ComponentKind::Decoder2x4 => Signals {
            inputs: &[("A", 1), ("B", 2), ("EN", 3)],
            outputs: &[("Y0", 4), ("Y1", 5), ("Y2", 6), ("Y3", 8)],
        },
        _ => return None,
    };
    Some(s)
}

/// Closed-form table for a combinational block, or `None` for plain gate
/// packages (callers fall back to the circuit-driven sweep for those).
///
/// The first listed input varies slowest. Rows come from `logic::evaluate`,
/// so the table cannot disagree with what the simulation does.
pub fn generate(kind: ComponentKind) -> Option<TruthTable> {
    let signals = signals(kind)?;
    let n = signals.inputs.len();

    let headers = signals
        .inputs
        .iter()
        .chain(signals.outputs.iter())
        .map(|&(name, _)| name.to_string())
        .collect();

    let mut rows = Vec::with_capacity(1 << n);
    for combo in 0..(1u32 << n) {
        let mut pins = [false; PACKAGE_PINS];
        let mut inputs = Vec::with_capacity(n);
        for (i, &(_, number)) in signals.inputs.iter().enumerate() {
            let bit = combo >> (n - 1 - i) & 1 != 0;
            pins[number - 1] = bit;
            inputs.push(bit);
        }
        let computed = logic::evaluate(kind, &pins, true);
        let outputs = signals
            .outputs
            .iter()
            .map(|&(_, number)| {
                computed
                    .iter()
                    .find(|&&(n, _)| n == number)
                    .map_or(false, |&(_, v)| v)
            })
            .collect();
        rows.push(Row { inputs, outputs, pass: true });
    }

    Some(TruthTable { headers, rows })
}

/// Sweeps the live circuit through every assignment of its wired switches
/// and records the wired indicators.
///
/// Requires at least one wired switch and one wired indicator. Assignments
/// run in ascending binary-counter order with bit 0 on the first wired
/// switch. The circuit is left at the final assignment (all switches on).
pub fn generate_from_circuit(circuit: &mut Circuit) -> Result<TruthTable, TruthTableError> {
    let wired_switches: Vec<(usize, SwitchId)> = circuit
        .switches()
        .enumerate()
        .filter(|(_, (_, sw))| {
            circuit.pin(sw.pin).map_or(false, |p| !p.wires.is_empty())
        })
        .map(|(index, (id, _))| (index, id))
        .collect();
    let wired_leds: Vec<(usize, LedId)> = circuit
        .indicators()
        .enumerate()
        .filter(|(_, (_, led))| {
            circuit.pin(led.pin).map_or(false, |p| !p.wires.is_empty())
        })
        .map(|(index, (id, _))| (index, id))
        .collect();

    if wired_switches.is_empty() {
        return Err(TruthTableError::NoActiveInputs);
    }
    if wired_leds.is_empty() {
        return Err(TruthTableError::NoActiveOutputs);
    }

    let headers = wired_switches
        .iter()
        .map(|&(index, _)| format!("IN{}", index + 1))
        .chain(wired_leds.iter().map(|&(index, _)| format!("OUT{}", index + 1)))
        .collect();

    let n = wired_switches.len();
    let mut rows = Vec::with_capacity(1 << n);
    for mask in 0..(1u32 << n) {
        let mut inputs = Vec::with_capacity(n);
        for (bit, &(_, id)) in wired_switches.iter().enumerate() {
            let on = mask >> bit & 1 != 0;
            circuit.set_external_input(id, on)?;
            inputs.push(on);
        }
        circuit.evaluate_all()?;
        let outputs = wired_leds
            .iter()
            .map(|&(_, id)| {
                circuit
                    .indicator(id)
                    .and_then(|led| circuit.pin_value(led.pin))
                    .unwrap_or(false)
            })
            .collect();
        rows.push(Row { inputs, outputs, pass: true });
    }

    Ok(TruthTable { headers, rows })
}
