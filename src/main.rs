use std::env;
use std::fs::File;
use std::io::BufReader;

use ictrainer::board::BoardConfig;
use ictrainer::truth_table::{self, TruthTable};
use ictrainer::{Circuit, ComponentKind};

fn main() {
    tracing_subscriber::fmt::init();

    println!("Virtual IC Trainer - Simulation Core Demo");
    println!("=========================================");

    // With a path argument, load and report a saved circuit instead of
    // running the built-in demo.
    if let Some(path) = env::args().nth(1) {
        load_and_report(&path);
        return;
    }

    // Build the standard trainer board and wire a NAND gate between the
    // first two switches and the first LED.
    let mut circuit = BoardConfig::default().build();
    let switches: Vec<_> = circuit.switches().map(|(id, _)| id).collect();
    let leds: Vec<_> = circuit.indicators().map(|(id, _)| id).collect();

    let ic = match circuit.instantiate(ComponentKind::Nand, ictrainer::Position::new(600.0, 300.0)) {
        Ok(id) => id,
        Err(e) => {
            eprintln!("Failed to place component: {}", e);
            return;
        }
    };

    let wiring = [
        (circuit.switch(switches[0]).map(|s| s.pin), circuit.component_pin(ic, 1)),
        (circuit.switch(switches[1]).map(|s| s.pin), circuit.component_pin(ic, 2)),
        (circuit.component_pin(ic, 3), circuit.indicator(leds[0]).map(|l| l.pin)),
    ];
    for (a, b) in wiring {
        let (Some(a), Some(b)) = (a, b) else {
            eprintln!("Demo wiring refers to a missing pin");
            return;
        };
        if let Err(e) = circuit.connect(a, b) {
            eprintln!("Failed to connect demo wiring: {}", e);
            return;
        }
    }

    if let Err(e) = circuit.set_power(true) {
        eprintln!("Circuit did not settle at power-on: {}", e);
        return;
    }
    println!("\nBoard powered on, 7400 NAND wired to SW1/SW2 -> LED1");

    println!("\nSwept truth table (wired panel I/O):");
    match truth_table::generate_from_circuit(&mut circuit) {
        Ok(table) => print_table(&table),
        Err(e) => eprintln!("Truth table sweep failed: {}", e),
    }

    println!("\nClosed-form table for the 4x1 MUX:");
    match truth_table::generate(ComponentKind::Mux4) {
        Some(table) => print_table(&table),
        None => eprintln!("No closed-form table for this kind"),
    }
}

fn load_and_report(path: &str) {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) => {
            eprintln!("Failed to open {}: {}", path, e);
            return;
        }
    };
    let circuit: Circuit = match ictrainer::persist::load(BufReader::new(file)) {
        Ok(circuit) => circuit,
        Err(e) => {
            eprintln!("Failed to load {}: {}", path, e);
            return;
        }
    };

    println!("\nLoaded {}", path);
    println!("  Power: {}", if circuit.powered() { "on" } else { "off" });
    println!("  Switches: {}", circuit.switches().count());
    println!("  Indicators: {}", circuit.indicators().count());
    println!("  Components: {}", circuit.components().count());
    println!("  Wires: {}", circuit.wires().count());
    for (index, (_, component)) in circuit.components().enumerate() {
        println!("    IC{}: {} at {}", index, component.kind, component.position);
    }
}

fn print_table(table: &TruthTable) {
    let inputs = table.input_count();
    println!("{}", table.headers.join(" | "));
    for row in &table.rows {
        let cells: Vec<&str> = row
            .inputs
            .iter()
            .chain(row.outputs.iter())
            .map(|&v| if v { "1" } else { "0" })
            .collect();
        let (ins, outs) = cells.split_at(inputs);
        println!("{} || {}", ins.join("   "), outs.join("   "));
    }
}
