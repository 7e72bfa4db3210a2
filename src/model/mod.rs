//! Core data structures for force field parameters and topologies.
//!
//! This module provides the types that flow through `vsite-forge`:
//!
//! - [`quantity`] – Unit-tagged scalar values (lengths, angles).
//! - [`keys`] – Structural keys identifying interaction instances and the
//!   potential keys deduplicating their parameter records.
//! - [`store`] – The collection registry mapping structural keys to records.
//! - [`topology`] – Ordered molecules and atoms with global-index lookups.
//!
//! The data model intentionally separates *which* interaction a parameter
//! applies to (a [`StructuralKey`]) from *what* the parameter is (a
//! [`Potential`] behind a [`PotentialKey`]), so many interactions share one
//! deduplicated record. Everything here is built once by an external
//! ingestion stage and treated as read-only by the [`crate::place`] engine.
//!
//! [`StructuralKey`]: keys::StructuralKey
//! [`Potential`]: store::Potential
//! [`PotentialKey`]: keys::PotentialKey

pub mod keys;
pub mod quantity;
pub mod store;
pub mod topology;
