//! Trainer board front-panel configuration.
//!
//! The panel (how many switches and indicators, where they sit) is data, not
//! code: a small JSON document describes it, and `build` turns it into a
//! populated `Circuit`. The default matches the standard trainer board of
//! eight switches on the left edge and eight LEDs on the right.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::circuit::Circuit;
use crate::types::Position;

const SWITCH_X: f64 = 40.0;
const SWITCH_TOP: f64 = 100.0;
const LED_X: f64 = 1220.0;
const LED_TOP: f64 = 120.0;
const ROW_SPACING: f64 = 60.0;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardConfig {
    pub name: String,
    /// Number of toggle switches down the left edge.
    pub switches: usize,
    /// Number of indicator LEDs down the right edge.
    pub indicators: usize,
}

#[derive(Debug, Error)]
pub enum BoardConfigError {
    #[error("failed to read board config {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse board config {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl Default for BoardConfig {
    fn default() -> Self {
        BoardConfig {
            name: "standard trainer board".to_string(),
            switches: 8,
            indicators: 8,
        }
    }
}

impl BoardConfig {
    /// Loads a panel description from a JSON file.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, BoardConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| BoardConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: BoardConfig =
            serde_json::from_str(&text).map_err(|source| BoardConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        debug!(name = %config.name, "loaded board config");
        Ok(config)
    }

    /// Builds an empty powered-down circuit with this panel populated.
    pub fn build(&self) -> Circuit {
        let mut circuit = Circuit::new();
        for row in 0..self.switches {
            circuit.add_switch(Position::new(SWITCH_X, SWITCH_TOP + row as f64 * ROW_SPACING));
        }
        for row in 0..self.indicators {
            circuit.add_indicator(Position::new(LED_X, LED_TOP + row as f64 * ROW_SPACING));
        }
        circuit
    }
}
