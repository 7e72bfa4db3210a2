//! The deduplicated parameter store.
//!
//! A [`Collection`] holds one interaction category's worth of parameters:
//! an insertion-ordered map from [`StructuralKey`] to [`PotentialKey`] and a
//! map from [`PotentialKey`] to its [`Potential`] record. A
//! [`ParameterStore`] is the registry of collections keyed by category name
//! ("Bonds", "Angles", "Constraints", "VirtualSites", ...).
//!
//! Collections are populated once by an external ingestion stage and are
//! read-only afterwards; every accessor here takes `&self`.

use std::collections::BTreeMap;
use std::collections::HashMap;

use super::keys::{PotentialKey, StructuralKey, VirtualSiteKey};
use super::quantity::Quantity;

/// An immutable parameter record: named, unit-tagged values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Potential {
    parameters: BTreeMap<String, Quantity>,
}

impl Potential {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insertion, used while constructing a record.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Quantity>) -> Self {
        self.parameters.insert(name.into(), value.into());
        self
    }

    pub fn get(&self, name: &str) -> Option<&Quantity> {
        self.parameters.get(name)
    }

    pub fn parameters(&self) -> impl Iterator<Item = (&str, &Quantity)> {
        self.parameters.iter().map(|(k, v)| (k.as_str(), v))
    }
}

/// One interaction category's key map and potentials.
///
/// The key map preserves insertion order: downstream consumers (position
/// assembly in particular) iterate virtual sites in the order they were
/// discovered during ingestion.
#[derive(Debug, Clone, Default)]
pub struct Collection {
    key_map: Vec<(StructuralKey, PotentialKey)>,
    potentials: HashMap<PotentialKey, Potential>,
}

impl Collection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Associates a structural key with a potential key.
    ///
    /// Assignment happens once per key during ingestion; re-inserting an
    /// existing structural key replaces its mapping.
    pub fn insert_key(&mut self, key: StructuralKey, potential_key: PotentialKey) {
        if let Some(entry) = self.key_map.iter_mut().find(|(k, _)| *k == key) {
            entry.1 = potential_key;
        } else {
            self.key_map.push((key, potential_key));
        }
    }

    pub fn insert_potential(&mut self, key: PotentialKey, potential: Potential) {
        self.potentials.insert(key, potential);
    }

    pub fn is_empty(&self) -> bool {
        self.key_map.is_empty()
    }

    pub fn len(&self) -> usize {
        self.key_map.len()
    }

    /// Structural keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &StructuralKey> {
        self.key_map.iter().map(|(k, _)| k)
    }

    pub fn potential_key_for(&self, key: &StructuralKey) -> Option<&PotentialKey> {
        self.key_map
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, pk)| pk)
    }

    pub fn potential(&self, key: &PotentialKey) -> Option<&Potential> {
        self.potentials.get(key)
    }

    /// The parameter record mapped to a structural key, if both links exist.
    pub fn potential_for(&self, key: &StructuralKey) -> Option<&Potential> {
        self.potential_key_for(key)
            .and_then(|pk| self.potentials.get(pk))
    }

    /// The record of a two-atom key spanning `{i, j}` in either order.
    pub fn potential_for_pair(&self, i: usize, j: usize) -> Option<&Potential> {
        self.key_map
            .iter()
            .find(|(k, _)| k.spans_pair(i, j))
            .and_then(|(_, pk)| self.potentials.get(pk))
    }

    /// The record of an angle key matching `(i, center, k)` in either
    /// orientation.
    pub fn potential_for_angle(&self, i: usize, center: usize, k: usize) -> Option<&Potential> {
        self.key_map
            .iter()
            .find(|(key, _)| key.matches_angle(i, center, k))
            .and_then(|(_, pk)| self.potentials.get(pk))
    }

    /// Angle keys whose endpoints are `{i, j}`, yielding each center atom and
    /// the associated record. Used by the law-of-cosines distance derivation.
    pub fn angles_spanning<'a>(
        &'a self,
        i: usize,
        j: usize,
    ) -> impl Iterator<Item = (usize, &'a Potential)> + 'a {
        self.key_map.iter().filter_map(move |(key, pk)| {
            let center = key.angle_between(i, j)?;
            Some((center, self.potentials.get(pk)?))
        })
    }

    /// Virtual-site keys in insertion order.
    pub fn virtual_site_keys(&self) -> impl Iterator<Item = &VirtualSiteKey> {
        self.key_map.iter().filter_map(|(k, _)| k.as_virtual_site())
    }
}

/// Registry of collections by category name.
#[derive(Debug, Clone, Default)]
pub struct ParameterStore {
    collections: BTreeMap<String, Collection>,
}

impl ParameterStore {
    /// Category names with meaning to the geometry resolver and assembler.
    pub const BONDS: &'static str = "Bonds";
    pub const ANGLES: &'static str = "Angles";
    pub const CONSTRAINTS: &'static str = "Constraints";
    pub const VIRTUAL_SITES: &'static str = "VirtualSites";

    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_collection(&mut self, name: impl Into<String>, collection: Collection) {
        self.collections.insert(name.into(), collection);
    }

    /// Fetches or creates a collection, for ingestion code.
    pub fn collection_mut(&mut self, name: &str) -> &mut Collection {
        self.collections.entry(name.to_string()).or_default()
    }

    pub fn collection(&self, name: &str) -> Option<&Collection> {
        self.collections.get(name)
    }

    pub fn collection_names(&self) -> impl Iterator<Item = &str> {
        self.collections.keys().map(|s| s.as_str())
    }
}
