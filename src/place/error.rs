//! Error types for virtual-site resolution and placement.
//!
//! Every failure here is a deterministic function of the input topology and
//! parameter store — missing force-field data or a declared-but-unsupported
//! site configuration — so there is no retry or local recovery; errors
//! propagate to the caller as-is.

use thiserror::Error;

/// Errors that can occur while resolving geometry and placing virtual sites.
#[derive(Debug, Error)]
pub enum Error {
    /// No real-atom positions were supplied, or their count disagrees with
    /// the topology.
    #[error("positions are required: {0}")]
    MissingPositions(String),

    /// The store has no VirtualSites collection, or it is empty.
    #[error("no virtual sites found in the parameter store")]
    MissingVirtualSites,

    /// A virtual-site kind (or an operation on it) has no implementation.
    #[error("virtual site type not implemented: {0}")]
    VirtualSiteTypeNotImplemented(String),

    /// A declared but unimplemented geometric sub-case: non-planar
    /// monovalent sites, asymmetric divalent legs, or a non-planar divalent
    /// site outside the recognized water-like pattern.
    #[error("unsupported virtual site geometry: {0}")]
    UnsupportedGeometry(String),

    /// The resolver exhausted constraints, bonds, and angle derivation.
    #[error("could not resolve equilibrium {quantity} for atoms {atom_indices:?}")]
    GeometryNotFound {
        /// What was being resolved ("distance" or "angle").
        quantity: &'static str,
        /// The atom indices of the failed query.
        atom_indices: Vec<usize>,
    },

    /// A parameter record lacks an entry the caller requires.
    #[error("parameter record for {record} is missing parameter '{parameter}'")]
    MissingParameter {
        /// Description of the interaction whose record is incomplete.
        record: String,
        /// The absent parameter name.
        parameter: String,
    },

    /// A record entry carries the wrong physical dimension.
    #[error("parameter '{parameter}' has dimension '{found}', expected {expected}")]
    UnitMismatch {
        /// The offending parameter name.
        parameter: String,
        /// The dimension expected by the caller.
        expected: &'static str,
        /// The dimension actually stored.
        found: String,
    },
}

impl Error {
    /// Creates a [`GeometryNotFound`](Error::GeometryNotFound) for a distance
    /// query.
    pub fn distance_not_found(i: usize, j: usize) -> Self {
        Self::GeometryNotFound {
            quantity: "distance",
            atom_indices: vec![i, j],
        }
    }

    /// Creates a [`GeometryNotFound`](Error::GeometryNotFound) for an angle
    /// query.
    pub fn angle_not_found(i: usize, center: usize, k: usize) -> Self {
        Self::GeometryNotFound {
            quantity: "angle",
            atom_indices: vec![i, center, k],
        }
    }

    /// Creates a [`MissingParameter`](Error::MissingParameter) error.
    pub fn missing_parameter(record: impl Into<String>, parameter: impl Into<String>) -> Self {
        Self::MissingParameter {
            record: record.into(),
            parameter: parameter.into(),
        }
    }

    /// Creates an [`UnsupportedGeometry`](Error::UnsupportedGeometry) error.
    pub fn unsupported(detail: impl Into<String>) -> Self {
        Self::UnsupportedGeometry(detail.into())
    }
}
