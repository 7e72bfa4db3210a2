//! A pure Rust library for resolving force-field equilibrium geometry and
//! placing virtual interaction sites. It sits between parameter assignment
//! and simulation-engine export: given a topology and a populated parameter
//! store, it answers where each massless site goes, either as affine weights
//! over its orientation atoms or as absolute coordinates merged into the
//! per-molecule particle ordering.
//!
//! # Features
//!
//! - **Parameter store** — Insertion-ordered collections mapping structural
//!   keys (bonds, angles, virtual sites) to shared potential records with
//!   dimension-tagged values
//! - **Geometry resolution** — Equilibrium distances from Constraints, Bonds,
//!   or the law of cosines over adjacent records; equilibrium angles from
//!   Angles records
//! - **Virtual-site placement** — BondCharge, MonovalentLonePair,
//!   DivalentLonePair, and TrivalentLonePair rules, reproducing the sign and
//!   tie-break conventions of the reference simulation engines
//! - **Position assembly** — Per-molecule merge of real-atom and virtual-site
//!   rows, with a zero-placeholder mode for writers that fill sites later
//!
//! # Quick Start
//!
//! The main entry point is [`place::get_positions_with_virtual_sites`],
//! which takes a [`Topology`](model::topology::Topology), a populated
//! [`ParameterStore`](model::store::ParameterStore), and the real-atom
//! coordinates:
//!
//! ```
//! use glam::DVec3;
//! use vsite_forge::model::keys::{PotentialKey, StructuralKey, VirtualSiteKey, VirtualSiteKind};
//! use vsite_forge::model::quantity::Length;
//! use vsite_forge::model::store::{ParameterStore, Potential};
//! use vsite_forge::model::topology::{Molecule, Topology};
//! use vsite_forge::place::get_positions_with_virtual_sites;
//!
//! // A chlorine-like diatomic with one BondCharge site past atom 0.
//! let topology = Topology::new(vec![Molecule::from_atomic_numbers(&[17, 17])]);
//!
//! let mut store = ParameterStore::new();
//!
//! let bonds = store.collection_mut(ParameterStore::BONDS);
//! let pk = PotentialKey::new("b-ClCl");
//! bonds.insert_potential(pk.clone(), Potential::new().with("length", Length::nanometers(0.15)));
//! bonds.insert_key(StructuralKey::bond(0, 1), pk);
//!
//! let sites = store.collection_mut(ParameterStore::VIRTUAL_SITES);
//! let pk = PotentialKey::new("v-Cl");
//! sites.insert_potential(pk.clone(), Potential::new().with("distance", Length::nanometers(0.05)));
//! sites.insert_key(
//!     StructuralKey::VirtualSite(VirtualSiteKey::new(VirtualSiteKind::BondCharge, vec![0, 1])),
//!     pk,
//! );
//!
//! let positions = vec![DVec3::ZERO, DVec3::new(0.15, 0.0, 0.0)];
//! let all = get_positions_with_virtual_sites(&topology, &store, Some(&positions), false)?;
//!
//! // Molecule rows first, then its site: on the bond axis, beyond atom 0.
//! assert_eq!(all.len(), 3);
//! assert!((all[2] - DVec3::new(-0.05, 0.0, 0.0)).length() < 1e-12);
//! # Ok::<(), vsite_forge::place::Error>(())
//! ```
//!
//! # Module Organization
//!
//! - [`model`] — Parameter store, structural/potential keys,
//!   dimension-tagged quantities, and the molecule topology
//! - [`place`] — Geometry resolution, per-rule placement, and position
//!   assembly
//! - [`io`] — TOML system descriptions and XYZ coordinate files
//!
//! All internal lengths are nanometers and all angles radians; unit
//! conversion happens at the [`io`] boundary.

pub mod io;
pub mod model;
pub mod place;
