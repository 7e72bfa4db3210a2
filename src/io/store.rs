//! Reader for the TOML system description.
//!
//! The file declares the topology's molecules and the parameter
//! collections, in the shape an ingestion stage would produce them:
//!
//! ```toml
//! [[molecules]]
//! atomic_numbers = [8, 1, 1]
//!
//! [collections.Bonds.potentials.b-OH]
//! length = { value = 0.09572, unit = "nanometer" }
//!
//! [[collections.Bonds.entries]]
//! atoms = [0, 1]
//! potential = "b-OH"
//!
//! [[collections.VirtualSites.entries]]
//! type = "DivalentLonePair"
//! atoms = [0, 1, 2]
//! potential = "v-EP"
//!
//! [collections.VirtualSites.potentials.v-EP]
//! distance = { value = -0.15, unit = "angstrom" }
//! ```
//!
//! Raw structures are deserialized with serde and then validated into the
//! crate's model types; atom indices are global topology indices.

use std::collections::HashMap;
use std::io::BufRead;

use serde::Deserialize;

use crate::model::keys::{PotentialKey, StructuralKey, VirtualSiteKey, VirtualSiteKind};
use crate::model::quantity::{Angle, Length, Quantity};
use crate::model::store::{Collection, ParameterStore, Potential};
use crate::model::topology::{Molecule, Topology};
use crate::place;

use super::error::Error;

#[derive(Debug, Deserialize)]
struct SystemSpec {
    #[serde(default)]
    molecules: Vec<MoleculeSpec>,
    #[serde(default)]
    collections: HashMap<String, CollectionSpec>,
}

#[derive(Debug, Deserialize)]
struct MoleculeSpec {
    atomic_numbers: Vec<u8>,
}

#[derive(Debug, Deserialize)]
struct CollectionSpec {
    #[serde(default)]
    potentials: HashMap<String, HashMap<String, QuantitySpec>>,
    #[serde(default)]
    entries: Vec<EntrySpec>,
}

#[derive(Debug, Deserialize)]
struct QuantitySpec {
    value: f64,
    unit: String,
}

#[derive(Debug, Deserialize)]
struct EntrySpec {
    atoms: Vec<usize>,
    potential: String,
    #[serde(default, rename = "type")]
    site_type: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    mult: Option<u32>,
}

/// Reads a system description, returning the topology and populated store.
pub fn read<R: BufRead>(mut reader: R) -> Result<(Topology, ParameterStore), Error> {
    let mut text = String::new();
    reader.read_to_string(&mut text)?;
    parse(&text)
}

/// Parses a system description from a TOML string.
pub fn parse(text: &str) -> Result<(Topology, ParameterStore), Error> {
    let spec: SystemSpec = toml::from_str(text)?;

    let topology = Topology::new(
        spec.molecules
            .iter()
            .map(|m| Molecule::from_atomic_numbers(&m.atomic_numbers))
            .collect(),
    );

    let mut store = ParameterStore::new();
    for (category, collection_spec) in spec.collections {
        let collection = build_collection(&category, collection_spec, &topology)?;
        store.insert_collection(category, collection);
    }

    Ok((topology, store))
}

fn build_collection(
    category: &str,
    spec: CollectionSpec,
    topology: &Topology,
) -> Result<Collection, Error> {
    let mut collection = Collection::new();

    for (id, parameters) in spec.potentials {
        let mut potential = Potential::new();
        for (name, quantity) in parameters {
            potential = potential.with(name, convert_quantity(quantity));
        }
        collection.insert_potential(PotentialKey::new(id), potential);
    }

    for entry in spec.entries {
        for &atom in &entry.atoms {
            if atom >= topology.atom_count() {
                return Err(Error::conversion(format!(
                    "{category} entry references atom {atom}, but the topology has {} atoms",
                    topology.atom_count()
                )));
            }
        }

        let potential_key = match entry.mult {
            Some(mult) => PotentialKey::with_mult(&entry.potential, mult),
            None => PotentialKey::new(&entry.potential),
        };
        if collection.potential(&potential_key).is_none() {
            return Err(Error::conversion(format!(
                "{category} entry references undeclared potential '{potential_key}'"
            )));
        }

        let key = structural_key(category, &entry)?;
        collection.insert_key(key, potential_key);
    }

    Ok(collection)
}

fn structural_key(category: &str, entry: &EntrySpec) -> Result<StructuralKey, Error> {
    if let Some(tag) = &entry.site_type {
        let kind = virtual_site_kind(tag)?;
        if entry.atoms.len() != kind.orientation_atom_count() {
            return Err(Error::conversion(format!(
                "{category} {tag} entry needs {} orientation atoms, got {}",
                kind.orientation_atom_count(),
                entry.atoms.len()
            )));
        }
        let name = entry.name.clone().unwrap_or_else(|| "EP".to_string());
        return Ok(StructuralKey::VirtualSite(VirtualSiteKey::named(
            kind,
            entry.atoms.clone(),
            name,
        )));
    }

    match entry.atoms.as_slice() {
        &[i, j] => Ok(StructuralKey::bond(i, j)),
        &[i, c, k] => Ok(StructuralKey::angle(i, c, k)),
        &[i, j, k, l] => Ok(StructuralKey::ProperTorsion {
            atom_indices: [i, j, k, l],
        }),
        atoms => Err(Error::conversion(format!(
            "{category} entry spans {} atoms; expected 2, 3, or 4 (or a virtual-site type tag)",
            atoms.len()
        ))),
    }
}

fn virtual_site_kind(tag: &str) -> Result<VirtualSiteKind, Error> {
    match tag {
        "BondCharge" => Ok(VirtualSiteKind::BondCharge),
        "MonovalentLonePair" => Ok(VirtualSiteKind::MonovalentLonePair),
        "DivalentLonePair" => Ok(VirtualSiteKind::DivalentLonePair),
        "TrivalentLonePair" => Ok(VirtualSiteKind::TrivalentLonePair),
        other => Err(place::Error::VirtualSiteTypeNotImplemented(other.to_string()).into()),
    }
}

fn convert_quantity(spec: QuantitySpec) -> Quantity {
    match spec.unit.as_str() {
        "nanometer" | "nanometers" | "nm" => Quantity::Length(Length::nanometers(spec.value)),
        "angstrom" | "angstroms" => Quantity::Length(Length::angstroms(spec.value)),
        "radian" | "radians" => Quantity::Angle(Angle::radians(spec.value)),
        "degree" | "degrees" => Quantity::Angle(Angle::degrees(spec.value)),
        _ => Quantity::Other {
            value: spec.value,
            unit: spec.unit,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const TIP4P_LIKE: &str = r#"
        [[molecules]]
        atomic_numbers = [8, 1, 1]

        [collections.Bonds.potentials.b-OH]
        length = { value = 0.09572, unit = "nanometer" }
        k = { value = 462750.4, unit = "kilojoule_per_mole / nanometer ** 2" }

        [[collections.Bonds.entries]]
        atoms = [0, 1]
        potential = "b-OH"

        [[collections.Bonds.entries]]
        atoms = [0, 2]
        potential = "b-OH"

        [collections.Angles.potentials.a-HOH]
        angle = { value = 104.52, unit = "degree" }

        [[collections.Angles.entries]]
        atoms = [1, 0, 2]
        potential = "a-HOH"

        [collections.VirtualSites.potentials.v-EP]
        distance = { value = -0.15, unit = "angstrom" }

        [[collections.VirtualSites.entries]]
        type = "DivalentLonePair"
        atoms = [0, 1, 2]
        potential = "v-EP"
    "#;

    #[test]
    fn parses_a_complete_system() {
        let (topology, store) = parse(TIP4P_LIKE).unwrap();
        assert_eq!(topology.molecule_count(), 1);
        assert_eq!(topology.atom_count(), 3);
        assert_eq!(topology.atomic_number(0), Some(8));

        let bonds = store.collection(ParameterStore::BONDS).unwrap();
        assert_eq!(bonds.len(), 2);
        let length = bonds
            .potential_for_pair(2, 0)
            .unwrap()
            .get("length")
            .unwrap()
            .as_length()
            .unwrap();
        assert_relative_eq!(length.as_nanometers(), 0.09572);

        let sites = store.collection(ParameterStore::VIRTUAL_SITES).unwrap();
        let key = sites.virtual_site_keys().next().unwrap();
        assert_eq!(key.kind, VirtualSiteKind::DivalentLonePair);
        assert_eq!(key.name, "EP");
        assert_eq!(key.orientation_atom_indices, vec![0, 1, 2]);
    }

    #[test]
    fn angstroms_convert_to_nanometers() {
        let (_, store) = parse(TIP4P_LIKE).unwrap();
        let sites = store.collection(ParameterStore::VIRTUAL_SITES).unwrap();
        let key = sites.virtual_site_keys().next().unwrap().clone();
        let potential = sites
            .potential_for(&StructuralKey::VirtualSite(key))
            .unwrap();
        let distance = potential.get("distance").unwrap().as_length().unwrap();
        assert_relative_eq!(distance.as_nanometers(), -0.015);
    }

    #[test]
    fn uninterpreted_units_pass_through() {
        let (_, store) = parse(TIP4P_LIKE).unwrap();
        let bonds = store.collection(ParameterStore::BONDS).unwrap();
        let k = bonds.potential_for_pair(0, 1).unwrap().get("k").unwrap();
        assert!(k.as_length().is_none());
        assert_eq!(k.dimension(), "kilojoule_per_mole / nanometer ** 2");
    }

    #[test]
    fn rejects_unknown_virtual_site_type() {
        let text = r#"
            [[molecules]]
            atomic_numbers = [8, 1]

            [collections.VirtualSites.potentials.v]
            distance = { value = 0.1, unit = "nanometer" }

            [[collections.VirtualSites.entries]]
            type = "TetravalentLonePair"
            atoms = [0, 1]
            potential = "v"
        "#;
        assert!(matches!(
            parse(text),
            Err(Error::Place(place::Error::VirtualSiteTypeNotImplemented(_)))
        ));
    }

    #[test]
    fn rejects_out_of_range_atom_indices() {
        let text = r#"
            [[molecules]]
            atomic_numbers = [8, 1]

            [collections.Bonds.potentials.b]
            length = { value = 0.1, unit = "nanometer" }

            [[collections.Bonds.entries]]
            atoms = [0, 5]
            potential = "b"
        "#;
        assert!(matches!(parse(text), Err(Error::Conversion(_))));
    }

    #[test]
    fn rejects_undeclared_potential_references() {
        let text = r#"
            [[molecules]]
            atomic_numbers = [8, 1]

            [[collections.Bonds.entries]]
            atoms = [0, 1]
            potential = "missing"
        "#;
        assert!(matches!(parse(text), Err(Error::Conversion(_))));
    }

    #[test]
    fn rejects_malformed_toml() {
        assert!(matches!(parse("not [[ valid"), Err(Error::Toml(_))));
    }
}
