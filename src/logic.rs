//! Combinational logic for every package in the catalog.
//!
//! `evaluate` is a pure function from a package's pin values to its output
//! values. It has no knowledge of the wire graph; the propagation engine and
//! the truth-table generator both call it, so the two can never disagree.

use crate::component::PACKAGE_PINS;
use crate::types::ComponentKind;

/// (a, b, y) DIP pin triples for the 7400-style quad gate layout.
const QUAD_ABY: [(usize, usize, usize); 4] = [(1, 2, 3), (4, 5, 6), (9, 10, 8), (12, 13, 11)];

/// (a, b, y) triples for the 7402, whose outputs lead each gate group.
const QUAD_ABY_NOR: [(usize, usize, usize); 4] = [(2, 3, 1), (5, 6, 4), (8, 9, 10), (11, 12, 13)];

/// (a, y) pairs for the 7404 hex inverter.
const HEX_INV: [(usize, usize); 6] = [(1, 2), (3, 4), (5, 6), (8, 9), (10, 11), (12, 13)];

/// Computes a package's output pin values from its current pin values.
///
/// `pins` is indexed by DIP number minus one. Returns (DIP number, value)
/// pairs for every output pin of the kind, in the kind's signal order. When
/// `powered` is false every output is false, without consulting the inputs.
pub fn evaluate(
    kind: ComponentKind,
    pins: &[bool; PACKAGE_PINS],
    powered: bool,
) -> Vec<(usize, bool)> {
    if !powered {
        return kind
            .output_pins()
            .iter()
            .map(|&number| (number, false))
            .collect();
    }

    let at = |number: usize| pins[number - 1];

    match kind {
        ComponentKind::Nand => quad(pins, &QUAD_ABY, |a, b| !(a && b)),
        ComponentKind::Nor => quad(pins, &QUAD_ABY_NOR, |a, b| !(a || b)),
        ComponentKind::And => quad(pins, &QUAD_ABY, |a, b| a && b),
        ComponentKind::Or => quad(pins, &QUAD_ABY, |a, b| a || b),
        ComponentKind::Xor => quad(pins, &QUAD_ABY, |a, b| a ^ b),
        ComponentKind::Xnor => quad(pins, &QUAD_ABY, |a, b| !(a ^ b)),
        ComponentKind::Not => HEX_INV
            .iter()
            .map(|&(a, y)| (y, !at(a)))
            .collect(),

        ComponentKind::And3 => vec![(4, at(1) && at(2) && at(3))],
        ComponentKind::Or3 => vec![(4, at(1) || at(2) || at(3))],
        ComponentKind::Nand3 => vec![(4, !(at(1) && at(2) && at(3)))],
        ComponentKind::Nor3 => vec![(4, !(at(1) || at(2) || at(3)))],
        ComponentKind::Xor3 => vec![(4, parity(&[at(1), at(2), at(3)]))],
        ComponentKind::Xnor3 => vec![(4, !parity(&[at(1), at(2), at(3)]))],

        ComponentKind::Mux2 => mux(pins, &[1, 2], &[3], 4),
        ComponentKind::Mux4 => mux(pins, &[1, 2, 3, 4], &[5, 6], 11),
        ComponentKind::Mux8 => mux(pins, &[1, 2, 3, 4, 5, 6, 8, 9], &[10, 11, 12], 13),

        ComponentKind::Demux2 => demux(pins, 1, &[2], &[3, 4]),
        ComponentKind::Demux4 => demux(pins, 1, &[2, 3], &[4, 5, 6, 8]),
        ComponentKind::Demux8 => demux(pins, 1, &[2, 3, 4], &[5, 6, 8, 9, 10, 11, 12, 13]),

        ComponentKind::Encoder4x2 => {
            // Ascending scan; a later asserted input overwrites an earlier
            // one, so the highest asserted index wins.
            let mut code: Option<usize> = None;
            for (i, &number) in [1, 2, 3, 4].iter().enumerate() {
                if at(number) {
                    code = Some(i);
                }
            }
            let c = code.unwrap_or(0);
            let hit = code.is_some();
            vec![(5, hit && c & 1 != 0), (6, hit && c & 2 != 0)]
        }

        ComponentKind::Decoder2x4 => {
            let en = at(3);
            let sel = at(1) as usize | (at(2) as usize) << 1;
            [4, 5, 6, 8]
                .iter()
                .enumerate()
                .map(|(i, &number)| (number, en && i == sel))
                .collect()
        }
    }
}

fn quad(
    pins: &[bool; PACKAGE_PINS],
    layout: &[(usize, usize, usize); 4],
    f: impl Fn(bool, bool) -> bool,
) -> Vec<(usize, bool)> {
    layout
        .iter()
        .map(|&(a, b, y)| (y, f(pins[a - 1], pins[b - 1])))
        .collect()
}

fn parity(bits: &[bool]) -> bool {
    bits.iter().filter(|&&b| b).count() % 2 == 1
}

/// Select bits are least-significant-first in `selects` pin order.
fn select_index(pins: &[bool; PACKAGE_PINS], selects: &[usize]) -> usize {
    selects
        .iter()
        .enumerate()
        .fold(0, |acc, (bit, &number)| acc | (pins[number - 1] as usize) << bit)
}

fn mux(
    pins: &[bool; PACKAGE_PINS],
    data: &[usize],
    selects: &[usize],
    out: usize,
) -> Vec<(usize, bool)> {
    let sel = select_index(pins, selects);
    vec![(out, pins[data[sel] - 1])]
}

fn demux(
    pins: &[bool; PACKAGE_PINS],
    data: usize,
    selects: &[usize],
    outs: &[usize],
) -> Vec<(usize, bool)> {
    let sel = select_index(pins, selects);
    let d = pins[data - 1];
    outs.iter()
        .enumerate()
        .map(|(i, &number)| (number, d && i == sel))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with(pins: &[(usize, bool)]) -> [bool; PACKAGE_PINS] {
        let mut values = [false; PACKAGE_PINS];
        for &(number, value) in pins {
            values[number - 1] = value;
        }
        values
    }

    fn output(kind: ComponentKind, pins: &[bool; PACKAGE_PINS], number: usize) -> bool {
        evaluate(kind, pins, true)
            .into_iter()
            .find(|&(n, _)| n == number)
            .map(|(_, v)| v)
            .unwrap()
    }

    #[test]
    fn test_unpowered_all_outputs_false() {
        let pins = with(&[(1, true), (2, true)]);
        for kind in ComponentKind::ALL {
            for (number, value) in evaluate(kind, &pins, false) {
                assert!(!value, "{kind} pin {number} high while unpowered");
            }
        }
    }

    #[test]
    fn test_nand_gate_one() {
        for (a, b, y) in [
            (false, false, true),
            (false, true, true),
            (true, false, true),
            (true, true, false),
        ] {
            let pins = with(&[(1, a), (2, b)]);
            assert_eq!(output(ComponentKind::Nand, &pins, 3), y);
        }
    }

    #[test]
    fn test_nor_uses_output_first_layout() {
        // Gate one: inputs 2/3, output 1.
        let pins = with(&[(2, false), (3, false)]);
        assert!(output(ComponentKind::Nor, &pins, 1));
        let pins = with(&[(2, true), (3, false)]);
        assert!(!output(ComponentKind::Nor, &pins, 1));
    }

    #[test]
    fn test_inverter_pairs() {
        let pins = with(&[(1, true), (3, false)]);
        assert!(!output(ComponentKind::Not, &pins, 2));
        assert!(output(ComponentKind::Not, &pins, 4));
    }

    #[test]
    fn test_xor3_parity() {
        let pins = with(&[(1, true), (2, true), (3, true)]);
        assert!(output(ComponentKind::Xor3, &pins, 4));
        assert!(!output(ComponentKind::Xnor3, &pins, 4));
        let pins = with(&[(1, true), (2, true)]);
        assert!(!output(ComponentKind::Xor3, &pins, 4));
    }

    #[test]
    fn test_mux4_selects_each_input() {
        for sel in 0..4usize {
            let data_pin = sel + 1;
            let pins = with(&[
                (data_pin, true),
                (5, sel & 1 != 0),
                (6, sel & 2 != 0),
            ]);
            assert!(output(ComponentKind::Mux4, &pins, 11), "sel={sel}");
            // Any other single data bit does not reach the output.
            let other = (sel + 1) % 4 + 1;
            let pins = with(&[(other, true), (5, sel & 1 != 0), (6, sel & 2 != 0)]);
            assert!(!output(ComponentKind::Mux4, &pins, 11), "sel={sel}");
        }
    }

    #[test]
    fn test_mux8_selects_high_data_pins() {
        // sel=7 routes the pin-9 data bit (layout skips the rails).
        let pins = with(&[(9, true), (10, true), (11, true), (12, true)]);
        assert!(output(ComponentKind::Mux8, &pins, 13));
        let pins = with(&[(10, true), (11, true), (12, true)]);
        assert!(!output(ComponentKind::Mux8, &pins, 13));
    }

    #[test]
    fn test_demux4_one_hot() {
        for sel in 0..4usize {
            let pins = with(&[(1, true), (2, sel & 1 != 0), (3, sel & 2 != 0)]);
            let outs = evaluate(ComponentKind::Demux4, &pins, true);
            for (i, &(_, value)) in outs.iter().enumerate() {
                assert_eq!(value, i == sel, "sel={sel} out={i}");
            }
        }
    }

    #[test]
    fn test_demux_data_low_all_low() {
        let pins = with(&[(2, true), (3, true)]);
        for (_, value) in evaluate(ComponentKind::Demux4, &pins, true) {
            assert!(!value);
        }
    }

    #[test]
    fn test_encoder_highest_asserted_wins() {
        // D1 and D3 both high: the later scan hit (D3, code 3) wins.
        let pins = with(&[(2, true), (4, true)]);
        let outs = evaluate(ComponentKind::Encoder4x2, &pins, true);
        assert_eq!(outs, vec![(5, true), (6, true)]);
    }

    #[test]
    fn test_encoder_no_input_all_low() {
        let pins = with(&[]);
        let outs = evaluate(ComponentKind::Encoder4x2, &pins, true);
        assert_eq!(outs, vec![(5, false), (6, false)]);
    }

    #[test]
    fn test_decoder_enable_gates_outputs() {
        let pins = with(&[(1, true), (2, true)]);
        for (_, value) in evaluate(ComponentKind::Decoder2x4, &pins, true) {
            assert!(!value, "disabled decoder drove an output");
        }
        let pins = with(&[(1, true), (2, true), (3, true)]);
        let outs = evaluate(ComponentKind::Decoder2x4, &pins, true);
        assert_eq!(outs, vec![(4, false), (5, false), (6, false), (8, true)]);
    }

    #[test]
    fn test_outputs_cover_declared_pins() {
        let pins = with(&[]);
        for kind in ComponentKind::ALL {
            let produced: Vec<usize> = evaluate(kind, &pins, true)
                .into_iter()
                .map(|(n, _)| n)
                .collect();
            let mut declared: Vec<usize> = kind.output_pins().to_vec();
            let mut sorted = produced.clone();
            sorted.sort_unstable();
            declared.sort_unstable();
            assert_eq!(sorted, declared, "{kind}");
        }
    }
}
