//! Connection validation.
//!
//! Every wire in the graph goes through `validate` (or `validate_bus`) before
//! creation. Validation rejects illegal pairings and canonicalizes the pair
//! into (driver, sink) order, so downstream code never re-checks roles.

use thiserror::Error;

use crate::pin::{PinId, PinMap};

/// Why a two-pin connection was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ConnectError {
    #[error("cannot connect a pin to itself")]
    SelfConnection,
    #[error("both pins are drivers")]
    TwoDrivers,
    #[error("neither pin is a driver")]
    NoDriver,
    #[error("pin no longer exists")]
    StalePin,
}

/// Why a bus connection was rejected. Bus validation is atomic: no wire is
/// created unless every pair passes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum BusConnectError {
    #[error("bus width mismatch: {left} vs {right} pins")]
    SizeMismatch { left: usize, right: usize },
    #[error("pair {index} rejected: {source}")]
    InvalidPair {
        index: usize,
        source: ConnectError,
    },
    #[error("pair {index} rejected: sink already driven by another pin")]
    DriverConflict { index: usize },
}

/// Validates a candidate connection and orients it as (driver, sink).
///
/// Checks, in order: the two ends are distinct pins, not both driver-capable,
/// and not both inputs. Exactly one end drives; that end comes first in the
/// returned pair.
pub(crate) fn validate(
    pins: &PinMap,
    a: PinId,
    b: PinId,
) -> Result<(PinId, PinId), ConnectError> {
    if a == b {
        return Err(ConnectError::SelfConnection);
    }
    let pin_a = pins.get(a).ok_or(ConnectError::StalePin)?;
    let pin_b = pins.get(b).ok_or(ConnectError::StalePin)?;

    match (pin_a.role.is_driver(), pin_b.role.is_driver()) {
        (true, true) => Err(ConnectError::TwoDrivers),
        (false, false) => Err(ConnectError::NoDriver),
        (true, false) => Ok((a, b)),
        (false, true) => Ok((b, a)),
    }
}

/// Validates a parallel bus of single-bit connections.
///
/// Beyond per-pair validation, a sink that already has a wire from a
/// different driver pin is rejected; the error carries the first offending
/// pair index. Returns the oriented pairs only when all pass.
pub(crate) fn validate_bus(
    pins: &PinMap,
    wires: &crate::pin::WireMap,
    from: &[PinId],
    to: &[PinId],
) -> Result<Vec<(PinId, PinId)>, BusConnectError> {
    if from.len() != to.len() {
        return Err(BusConnectError::SizeMismatch {
            left: from.len(),
            right: to.len(),
        });
    }

    let mut pairs = Vec::with_capacity(from.len());
    for (index, (&a, &b)) in from.iter().zip(to.iter()).enumerate() {
        let (driver, sink) =
            validate(pins, a, b).map_err(|source| BusConnectError::InvalidPair { index, source })?;

        let already_driven = pins[sink]
            .wires
            .iter()
            .filter_map(|&w| wires.get(w))
            .any(|wire| wire.sink == sink && wire.driver != driver);
        if already_driven {
            return Err(BusConnectError::DriverConflict { index });
        }

        pairs.push((driver, sink));
    }
    Ok(pairs)
}
