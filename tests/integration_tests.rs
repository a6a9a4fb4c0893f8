//! End-to-end tests through the public API: build a board, place packages,
//! wire them, flip switches, and check what the LEDs and truth tables say.

use std::io::Cursor;

use ictrainer::board::BoardConfig;
use ictrainer::circuit::{LedId, SwitchId};
use ictrainer::connection::ConnectError;
use ictrainer::persist;
use ictrainer::truth_table;
use ictrainer::{Circuit, CircuitError, ComponentId, ComponentKind, Position, PropagationError};

fn pos() -> Position {
    Position::new(0.0, 0.0)
}

/// Standard board with the first few switches/LEDs pulled out for wiring.
fn board() -> (Circuit, Vec<SwitchId>, Vec<LedId>) {
    let circuit = BoardConfig::default().build();
    let switches = circuit.switches().map(|(id, _)| id).collect();
    let leds = circuit.indicators().map(|(id, _)| id).collect();
    (circuit, switches, leds)
}

fn wire_gate_one(
    circuit: &mut Circuit,
    ic: ComponentId,
    a: SwitchId,
    b: SwitchId,
    out: LedId,
) {
    circuit
        .connect(circuit.switch(a).unwrap().pin, circuit.component_pin(ic, 1).unwrap())
        .unwrap();
    circuit
        .connect(circuit.switch(b).unwrap().pin, circuit.component_pin(ic, 2).unwrap())
        .unwrap();
    circuit
        .connect(circuit.component_pin(ic, 3).unwrap(), circuit.indicator(out).unwrap().pin)
        .unwrap();
}

#[test]
fn unpowered_board_shows_nothing() {
    let (mut circuit, switches, leds) = board();
    let ic = circuit.instantiate(ComponentKind::Nand, pos()).unwrap();
    wire_gate_one(&mut circuit, ic, switches[0], switches[1], leds[0]);
    circuit.set_external_input(switches[0], true).unwrap();

    // Power is still off: the NAND does not compute and nothing lights up.
    assert!(!circuit.indicator(leds[0]).unwrap().lit);
    assert!(!circuit.switch(switches[0]).unwrap().lit);
    assert!(!circuit
        .pin_value(circuit.component_pin(ic, 3).unwrap())
        .unwrap());
}

#[test]
fn nand_truth_over_the_panel() {
    let (mut circuit, switches, leds) = board();
    circuit.set_power(true).unwrap();
    let ic = circuit.instantiate(ComponentKind::Nand, pos()).unwrap();
    wire_gate_one(&mut circuit, ic, switches[0], switches[1], leds[0]);

    for (a, b, y) in [
        (false, false, true),
        (false, true, true),
        (true, false, true),
        (true, true, false),
    ] {
        circuit.set_external_input(switches[0], a).unwrap();
        circuit.set_external_input(switches[1], b).unwrap();
        assert_eq!(circuit.indicator(leds[0]).unwrap().lit, y, "a={a} b={b}");
    }
}

#[test]
fn two_stage_pipeline_settles() {
    // XOR feeding an inverter: LED shows XNOR.
    let (mut circuit, switches, leds) = board();
    circuit.set_power(true).unwrap();
    let xor = circuit.instantiate(ComponentKind::Xor, pos()).unwrap();
    let inv = circuit.instantiate(ComponentKind::Not, pos()).unwrap();
    circuit
        .connect(circuit.switch(switches[0]).unwrap().pin, circuit.component_pin(xor, 1).unwrap())
        .unwrap();
    circuit
        .connect(circuit.switch(switches[1]).unwrap().pin, circuit.component_pin(xor, 2).unwrap())
        .unwrap();
    circuit
        .connect(circuit.component_pin(xor, 3).unwrap(), circuit.component_pin(inv, 1).unwrap())
        .unwrap();
    circuit
        .connect(circuit.component_pin(inv, 2).unwrap(), circuit.indicator(leds[0]).unwrap().pin)
        .unwrap();

    for (a, b) in [(false, false), (false, true), (true, false), (true, true)] {
        circuit.set_external_input(switches[0], a).unwrap();
        circuit.set_external_input(switches[1], b).unwrap();
        assert_eq!(circuit.indicator(leds[0]).unwrap().lit, a == b, "a={a} b={b}");
    }
}

#[test]
fn mux4_routes_the_selected_data_line() {
    let (mut circuit, switches, leds) = board();
    circuit.set_power(true).unwrap();
    let mux = circuit.instantiate(ComponentKind::Mux4, pos()).unwrap();

    // Data lines from switches 0-3, selects from 4-5.
    for (i, dip) in [(0usize, 1usize), (1, 2), (2, 3), (3, 4), (4, 5), (5, 6)] {
        circuit
            .connect(
                circuit.switch(switches[i]).unwrap().pin,
                circuit.component_pin(mux, dip).unwrap(),
            )
            .unwrap();
    }
    circuit
        .connect(circuit.component_pin(mux, 11).unwrap(), circuit.indicator(leds[0]).unwrap().pin)
        .unwrap();

    for sel in 0..4usize {
        circuit.set_external_input(switches[4], sel & 1 != 0).unwrap();
        circuit.set_external_input(switches[5], sel & 2 != 0).unwrap();
        for data in 0..4usize {
            for (i, sw) in switches[..4].iter().enumerate() {
                circuit.set_external_input(*sw, i == data).unwrap();
            }
            assert_eq!(circuit.indicator(leds[0]).unwrap().lit, data == sel);
        }
    }
}

#[test]
fn demux4_lights_one_lane() {
    let (mut circuit, switches, leds) = board();
    circuit.set_power(true).unwrap();
    let demux = circuit.instantiate(ComponentKind::Demux4, pos()).unwrap();

    for (i, dip) in [(0usize, 1usize), (1, 2), (2, 3)] {
        circuit
            .connect(
                circuit.switch(switches[i]).unwrap().pin,
                circuit.component_pin(demux, dip).unwrap(),
            )
            .unwrap();
    }
    for (lane, dip) in [(0usize, 4usize), (1, 5), (2, 6), (3, 8)] {
        circuit
            .connect(
                circuit.component_pin(demux, dip).unwrap(),
                circuit.indicator(leds[lane]).unwrap().pin,
            )
            .unwrap();
    }

    circuit.set_external_input(switches[0], true).unwrap();
    for sel in 0..4usize {
        circuit.set_external_input(switches[1], sel & 1 != 0).unwrap();
        circuit.set_external_input(switches[2], sel & 2 != 0).unwrap();
        for lane in 0..4usize {
            assert_eq!(
                circuit.indicator(leds[lane]).unwrap().lit,
                lane == sel,
                "sel={sel} lane={lane}"
            );
        }
    }
}

#[test]
fn encoder_prefers_the_highest_input() {
    let (mut circuit, switches, leds) = board();
    circuit.set_power(true).unwrap();
    let enc = circuit.instantiate(ComponentKind::Encoder4x2, pos()).unwrap();
    for i in 0..4usize {
        circuit
            .connect(
                circuit.switch(switches[i]).unwrap().pin,
                circuit.component_pin(enc, i + 1).unwrap(),
            )
            .unwrap();
    }
    circuit
        .connect(circuit.component_pin(enc, 5).unwrap(), circuit.indicator(leds[0]).unwrap().pin)
        .unwrap();
    circuit
        .connect(circuit.component_pin(enc, 6).unwrap(), circuit.indicator(leds[1]).unwrap().pin)
        .unwrap();

    // D1 and D2 both on: code 2 wins over code 1.
    circuit.set_external_input(switches[1], true).unwrap();
    circuit.set_external_input(switches[2], true).unwrap();
    assert!(!circuit.indicator(leds[0]).unwrap().lit); // Y0
    assert!(circuit.indicator(leds[1]).unwrap().lit); // Y1
}

#[test]
fn validator_rejections_leave_no_wire() {
    let (mut circuit, switches, leds) = board();
    circuit.set_power(true).unwrap();
    let ic = circuit.instantiate(ComponentKind::And, pos()).unwrap();

    let sw_pin = circuit.switch(switches[0]).unwrap().pin;
    let led_pin = circuit.indicator(leds[0]).unwrap().pin;
    let out_pin = circuit.component_pin(ic, 3).unwrap();
    let in_pin = circuit.component_pin(ic, 1).unwrap();

    assert_eq!(
        circuit.connect(sw_pin, sw_pin).unwrap_err(),
        CircuitError::Rejected(ConnectError::SelfConnection)
    );
    assert_eq!(
        circuit.connect(sw_pin, out_pin).unwrap_err(),
        CircuitError::Rejected(ConnectError::TwoDrivers)
    );
    assert_eq!(
        circuit.connect(led_pin, in_pin).unwrap_err(),
        CircuitError::Rejected(ConnectError::NoDriver)
    );
    assert_eq!(circuit.wires().count(), 0);
}

#[test]
fn bus_connect_mismatch_creates_nothing() {
    let (mut circuit, switches, _) = board();
    circuit.set_power(true).unwrap();
    let ic = circuit.instantiate(ComponentKind::And3, pos()).unwrap();
    let from = [
        circuit.switch(switches[0]).unwrap().pin,
        circuit.switch(switches[1]).unwrap().pin,
    ];
    let to = [
        circuit.component_pin(ic, 1).unwrap(),
        circuit.component_pin(ic, 2).unwrap(),
        circuit.component_pin(ic, 3).unwrap(),
    ];
    assert!(circuit.connect_bus(&from, &to).is_err());
    assert_eq!(circuit.wires().count(), 0);

    // Matching widths succeed in one shot.
    let wires = circuit.connect_bus(&from, &to[..2]).unwrap();
    assert_eq!(wires.len(), 2);
    assert_eq!(circuit.wires().count(), 2);
}

#[test]
fn re_evaluation_of_a_settled_circuit_changes_nothing() {
    let (mut circuit, switches, leds) = board();
    circuit.set_power(true).unwrap();
    let ic = circuit.instantiate(ComponentKind::Or, pos()).unwrap();
    wire_gate_one(&mut circuit, ic, switches[0], switches[1], leds[0]);
    circuit.set_external_input(switches[0], true).unwrap();
    circuit.evaluate_all().unwrap();

    let steps = circuit.propagation_steps();
    circuit.evaluate_all().unwrap();
    circuit.evaluate_all().unwrap();
    assert_eq!(circuit.propagation_steps(), steps);
}

#[test]
fn feedback_loop_is_a_diagnostic_not_a_crash() {
    let mut circuit = Circuit::new();
    circuit.set_power(true).unwrap();
    let inv = circuit.instantiate(ComponentKind::Not, pos()).unwrap();
    let err = circuit
        .connect(circuit.component_pin(inv, 2).unwrap(), circuit.component_pin(inv, 1).unwrap())
        .unwrap_err();
    assert_eq!(err, CircuitError::Propagation(PropagationError::Unsettled));
    // The rejected connect rolls its wire back.
    assert_eq!(circuit.wires().count(), 0);

    // A three-inverter ring through separate packages oscillates too.
    let a = circuit.instantiate(ComponentKind::Not, pos()).unwrap();
    let b = circuit.instantiate(ComponentKind::Not, pos()).unwrap();
    circuit
        .connect(circuit.component_pin(inv, 2).unwrap(), circuit.component_pin(a, 1).unwrap())
        .unwrap();
    circuit
        .connect(circuit.component_pin(a, 2).unwrap(), circuit.component_pin(b, 1).unwrap())
        .unwrap();
    let err = circuit
        .connect(circuit.component_pin(b, 2).unwrap(), circuit.component_pin(inv, 1).unwrap())
        .unwrap_err();
    assert_eq!(err, CircuitError::Propagation(PropagationError::Unsettled));
    assert_eq!(circuit.wires().count(), 2);
}

#[test]
fn save_load_round_trip_preserves_behavior() {
    let (mut circuit, switches, leds) = board();
    circuit.set_power(true).unwrap();
    let ic = circuit.instantiate(ComponentKind::Xor, pos()).unwrap();
    wire_gate_one(&mut circuit, ic, switches[0], switches[1], leds[0]);
    circuit.set_external_input(switches[0], true).unwrap();
    assert!(circuit.indicator(leds[0]).unwrap().lit);

    let mut buffer = Vec::new();
    persist::save(&circuit, &mut buffer).unwrap();
    let mut loaded = persist::load(Cursor::new(buffer)).unwrap();

    assert!(loaded.powered());
    let loaded_leds: Vec<LedId> = loaded.indicators().map(|(id, _)| id).collect();
    let loaded_switches: Vec<SwitchId> = loaded.switches().map(|(id, _)| id).collect();
    assert!(loaded.indicator(loaded_leds[0]).unwrap().lit);

    // The loaded circuit is live: flipping the second switch turns XOR off.
    loaded.set_external_input(loaded_switches[1], true).unwrap();
    assert!(!loaded.indicator(loaded_leds[0]).unwrap().lit);
}

#[test]
fn swept_table_matches_closed_form_for_a_mux2() {
    let (mut circuit, switches, leds) = board();
    circuit.set_power(true).unwrap();
    let mux = circuit.instantiate(ComponentKind::Mux2, pos()).unwrap();
    for (i, dip) in [(0usize, 1usize), (1, 2), (2, 3)] {
        circuit
            .connect(
                circuit.switch(switches[i]).unwrap().pin,
                circuit.component_pin(mux, dip).unwrap(),
            )
            .unwrap();
    }
    circuit
        .connect(circuit.component_pin(mux, 4).unwrap(), circuit.indicator(leds[0]).unwrap().pin)
        .unwrap();

    let swept = truth_table::generate_from_circuit(&mut circuit).unwrap();
    let closed = truth_table::generate(ComponentKind::Mux2).unwrap();

    // Same function, different row order (the sweep counts bit 0 on the
    // first switch, the closed form varies the first input slowest).
    assert_eq!(swept.rows.len(), closed.rows.len());
    for row in &swept.rows {
        let twin = closed
            .rows
            .iter()
            .find(|r| r.inputs == row.inputs)
            .expect("closed-form row missing");
        assert_eq!(twin.outputs, row.outputs, "inputs {:?}", row.inputs);
    }
}

#[test]
fn power_cycle_restores_the_picture() {
    let (mut circuit, switches, leds) = board();
    circuit.set_power(true).unwrap();
    let ic = circuit.instantiate(ComponentKind::Or, pos()).unwrap();
    wire_gate_one(&mut circuit, ic, switches[0], switches[1], leds[0]);
    circuit.set_external_input(switches[0], true).unwrap();
    assert!(circuit.indicator(leds[0]).unwrap().lit);

    circuit.set_power(false).unwrap();
    assert!(!circuit.indicator(leds[0]).unwrap().lit);

    circuit.set_power(true).unwrap();
    assert!(circuit.indicator(leds[0]).unwrap().lit);
}
