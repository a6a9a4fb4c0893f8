use std::fmt;

/// Panel position of a placed entity.
///
/// The core stores positions passively for rendering and persistence; no
/// simulation behavior depends on them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Position { x, y }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.2}, {:.2})", self.x, self.y)
    }
}

/// Catalog of component kinds the trainer can place.
///
/// A kind fixes everything about a component: its pin roles and its logic
/// function. All kinds are DIP-14 packages with the ground rail on pin 7 and
/// the power rail on pin 14.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentKind {
    /// 7400: quad 2-input NAND
    Nand,
    /// 7402: quad 2-input NOR (output-first pinout)
    Nor,
    /// 7408: quad 2-input AND
    And,
    /// 7432: quad 2-input OR
    Or,
    /// 7404: hex inverter
    Not,
    /// 7486: quad 2-input XOR
    Xor,
    /// 7487: quad 2-input XNOR
    Xnor,
    And3,
    Or3,
    Nand3,
    Nor3,
    Xor3,
    Xnor3,
    Mux2,
    Mux4,
    Mux8,
    Demux2,
    Demux4,
    Demux8,
    Encoder4x2,
    Decoder2x4,
}

impl ComponentKind {
    /// Every placeable kind, in catalog order.
    pub const ALL: [ComponentKind; 21] = [
        ComponentKind::Nand,
        ComponentKind::Nor,
        ComponentKind::And,
        ComponentKind::Or,
        ComponentKind::Not,
        ComponentKind::Xor,
        ComponentKind::Xnor,
        ComponentKind::And3,
        ComponentKind::Or3,
        ComponentKind::Nand3,
        ComponentKind::Nor3,
        ComponentKind::Xor3,
        ComponentKind::Xnor3,
        ComponentKind::Mux2,
        ComponentKind::Mux4,
        ComponentKind::Mux8,
        ComponentKind::Demux2,
        ComponentKind::Demux4,
        ComponentKind::Demux8,
        ComponentKind::Encoder4x2,
        ComponentKind::Decoder2x4,
    ];

    /// Catalog name, as written to circuit files.
    pub fn name(&self) -> &'static str {
        match self {
            ComponentKind::Nand => "7400 NAND",
            ComponentKind::Nor => "7402 NOR",
            ComponentKind::And => "7408 AND",
            ComponentKind::Or => "7432 OR",
            ComponentKind::Not => "7404 NOT",
            ComponentKind::Xor => "7486 XOR",
            ComponentKind::Xnor => "7487 XNOR",
            ComponentKind::And3 => "AND3",
            ComponentKind::Or3 => "OR3",
            ComponentKind::Nand3 => "NAND3",
            ComponentKind::Nor3 => "NOR3",
            ComponentKind::Xor3 => "XOR3",
            ComponentKind::Xnor3 => "XNOR3",
            ComponentKind::Mux2 => "2x1 MUX",
            ComponentKind::Mux4 => "4x1 MUX",
            ComponentKind::Mux8 => "8x1 MUX",
            ComponentKind::Demux2 => "1x2 DEMUX",
            ComponentKind::Demux4 => "1x4 DEMUX",
            ComponentKind::Demux8 => "1x8 DEMUX",
            ComponentKind::Encoder4x2 => "4x2 ENCODER",
            ComponentKind::Decoder2x4 => "2x4 DECODER",
        }
    }

    /// Parses a catalog name from a circuit file.
    ///
    /// Accepts both the full name ("7400 NAND") and the bare part number
    /// ("7400") for the 74-series packages. Returns `None` for unrecognized
    /// names; the loader substitutes a fallback kind in that case rather than
    /// aborting the load.
    pub fn from_name(name: &str) -> Option<ComponentKind> {
        let kind = match name.trim() {
            "7400" | "7400 NAND" => ComponentKind::Nand,
            "7402" | "7402 NOR" => ComponentKind::Nor,
            "7408" | "7408 AND" => ComponentKind::And,
            "7432" | "7432 OR" => ComponentKind::Or,
            "7404" | "7404 NOT" => ComponentKind::Not,
            "7486" | "7486 XOR" => ComponentKind::Xor,
            "7487" | "7487 XNOR" => ComponentKind::Xnor,
            "AND3" => ComponentKind::And3,
            "OR3" => ComponentKind::Or3,
            "NAND3" => ComponentKind::Nand3,
            "NOR3" => ComponentKind::Nor3,
            "XOR3" => ComponentKind::Xor3,
            "XNOR3" => ComponentKind::Xnor3,
            "2x1 MUX" => ComponentKind::Mux2,
            "4x1 MUX" => ComponentKind::Mux4,
            "8x1 MUX" => ComponentKind::Mux8,
            "1x2 DEMUX" => ComponentKind::Demux2,
            "1x4 DEMUX" => ComponentKind::Demux4,
            "1x8 DEMUX" => ComponentKind::Demux8,
            "4x2 ENCODER" => ComponentKind::Encoder4x2,
            "2x4 DECODER" => ComponentKind::Decoder2x4,
            _ => return None,
        };
        Some(kind)
    }
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}
