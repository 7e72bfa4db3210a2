//! The geometry-resolution and virtual-site placement engine.
//!
//! Everything here reads the parameter store and topology without mutating
//! them; each failure is a deterministic property of the inputs.

mod assemble;
mod error;
mod geometry;
mod locator;

pub use assemble::{get_positions_with_virtual_sites, virtual_site_parent_molecule_mapping};
pub use error::Error;
pub use geometry::GeometryResolver;
pub use locator::{position, weights, VirtualSiteDescriptor, VirtualSiteWeights};
