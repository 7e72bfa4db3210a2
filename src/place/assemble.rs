//! Assembly of real-atom and virtual-site positions.
//!
//! Output ordering is per-molecule: each molecule contributes its real
//! atoms in their original order, immediately followed by its virtual
//! sites in the order they appear in the VirtualSites collection. A
//! molecule with no sites contributes only its real rows.

use std::collections::HashMap;

use glam::DVec3;

use crate::model::keys::VirtualSiteKey;
use crate::model::store::ParameterStore;
use crate::model::topology::Topology;

use super::error::Error;
use super::geometry::GeometryResolver;
use super::locator::{self, VirtualSiteDescriptor};

/// Maps each virtual-site key to the molecule owning its parent atom.
///
/// Returns an empty map when the store has no VirtualSites collection.
/// Iteration-order-sensitive consumers should walk the collection itself;
/// this map only answers ownership queries.
pub fn virtual_site_parent_molecule_mapping(
    topology: &Topology,
    store: &ParameterStore,
) -> HashMap<VirtualSiteKey, usize> {
    let Some(sites) = store.collection(ParameterStore::VIRTUAL_SITES) else {
        return HashMap::new();
    };

    sites
        .virtual_site_keys()
        .filter_map(|key| {
            let molecule = topology.molecule_of_virtual_site(key)?;
            Some((key.clone(), molecule))
        })
        .collect()
}

/// Returns the positions of all particles — real atoms and virtual sites —
/// ordered per molecule, in nanometers.
///
/// `positions` holds one row per real atom, in global topology order.
/// With `use_zeros` the virtual-site rows are zero vectors (placeholder
/// output for writers that overwrite them later); otherwise each site's
/// position is computed from the force-field geometry.
///
/// # Errors
///
/// [`Error::MissingPositions`] when `positions` is `None` or the row count
/// disagrees with the topology; [`Error::MissingVirtualSites`] when the
/// VirtualSites collection is absent or empty; placement errors pass
/// through.
pub fn get_positions_with_virtual_sites(
    topology: &Topology,
    store: &ParameterStore,
    positions: Option<&[DVec3]>,
    use_zeros: bool,
) -> Result<Vec<DVec3>, Error> {
    let positions = positions
        .ok_or_else(|| Error::MissingPositions("no real-atom positions supplied".into()))?;
    if positions.len() != topology.atom_count() {
        return Err(Error::MissingPositions(format!(
            "got {} position rows for {} atoms",
            positions.len(),
            topology.atom_count()
        )));
    }

    let sites = store
        .collection(ParameterStore::VIRTUAL_SITES)
        .ok_or(Error::MissingVirtualSites)?;
    if sites.is_empty() {
        return Err(Error::MissingVirtualSites);
    }

    // Group sites by owning molecule, preserving collection order within
    // each group.
    let mut molecule_sites: HashMap<usize, Vec<&VirtualSiteKey>> = HashMap::new();
    for key in sites.virtual_site_keys() {
        let molecule = topology.molecule_of_virtual_site(key).ok_or_else(|| {
            Error::MissingPositions(format!(
                "virtual site parent atom {} is not in the topology",
                key.parent_atom_index()
            ))
        })?;
        molecule_sites.entry(molecule).or_default().push(key);
    }

    let resolver = GeometryResolver::new(store);
    let site_count: usize = molecule_sites.values().map(Vec::len).sum();
    let mut particle_positions = Vec::with_capacity(positions.len() + site_count);

    for molecule_index in 0..topology.molecule_count() {
        particle_positions.extend_from_slice(&positions[topology.atom_indices(molecule_index)]);

        let Some(keys) = molecule_sites.get(&molecule_index) else {
            continue;
        };
        for key in keys {
            if use_zeros {
                particle_positions.push(DVec3::ZERO);
            } else {
                let descriptor = VirtualSiteDescriptor::from_store(key, store)?;
                particle_positions.push(locator::position(
                    &descriptor,
                    resolver,
                    topology,
                    positions,
                )?);
            }
        }
    }

    Ok(particle_positions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::keys::{PotentialKey, StructuralKey, VirtualSiteKind};
    use crate::model::quantity::Length;
    use crate::model::store::{Collection, Potential};
    use crate::model::topology::Molecule;
    use approx::assert_relative_eq;

    /// Cl2-like diatomic with one BondCharge site, next to a bare argon
    /// atom: molecule 0 gets one extra row, molecule 1 none.
    fn two_molecule_system() -> (Topology, ParameterStore, Vec<DVec3>) {
        let topology = Topology::new(vec![
            Molecule::from_atomic_numbers(&[17, 17]),
            Molecule::from_atomic_numbers(&[18]),
        ]);

        let mut store = ParameterStore::new();

        let mut bonds = Collection::new();
        let pk = PotentialKey::new("b");
        bonds.insert_potential(pk.clone(), Potential::new().with("length", Length::nanometers(0.15)));
        bonds.insert_key(StructuralKey::bond(0, 1), pk);
        store.insert_collection(ParameterStore::BONDS, bonds);

        let mut sites = Collection::new();
        let pk = PotentialKey::new("v");
        sites.insert_potential(pk.clone(), Potential::new().with("distance", Length::nanometers(0.05)));
        sites.insert_key(
            StructuralKey::VirtualSite(VirtualSiteKey::new(VirtualSiteKind::BondCharge, vec![0, 1])),
            pk,
        );
        store.insert_collection(ParameterStore::VIRTUAL_SITES, sites);

        let positions = vec![
            DVec3::ZERO,
            DVec3::new(0.15, 0.0, 0.0),
            DVec3::new(1.0, 1.0, 1.0),
        ];
        (topology, store, positions)
    }

    #[test]
    fn extra_row_lands_between_the_molecules() {
        let (topology, store, positions) = two_molecule_system();
        let all =
            get_positions_with_virtual_sites(&topology, &store, Some(&positions), false).unwrap();

        assert_eq!(all.len(), 4);
        assert_eq!(all[0], positions[0]);
        assert_eq!(all[1], positions[1]);
        // Site row directly after molecule 0's atoms, before molecule 1.
        assert_relative_eq!(all[2].x, -0.05, max_relative = 1e-12);
        assert_eq!(all[3], positions[2]);
    }

    #[test]
    fn zeros_mode_substitutes_placeholders() {
        let (topology, store, positions) = two_molecule_system();
        let all =
            get_positions_with_virtual_sites(&topology, &store, Some(&positions), true).unwrap();
        assert_eq!(all.len(), 4);
        assert_eq!(all[2], DVec3::ZERO);
    }

    #[test]
    fn missing_positions_is_an_error() {
        let (topology, store, positions) = two_molecule_system();
        assert!(matches!(
            get_positions_with_virtual_sites(&topology, &store, None, false),
            Err(Error::MissingPositions(_))
        ));

        let short = &positions[..2];
        assert!(matches!(
            get_positions_with_virtual_sites(&topology, &store, Some(short), false),
            Err(Error::MissingPositions(_))
        ));
    }

    #[test]
    fn absent_or_empty_virtual_sites_is_an_error() {
        let (topology, _, positions) = two_molecule_system();

        let bare = ParameterStore::new();
        assert!(matches!(
            get_positions_with_virtual_sites(&topology, &bare, Some(&positions), false),
            Err(Error::MissingVirtualSites)
        ));

        let mut empty = ParameterStore::new();
        empty.insert_collection(ParameterStore::VIRTUAL_SITES, Collection::new());
        assert!(matches!(
            get_positions_with_virtual_sites(&topology, &empty, Some(&positions), false),
            Err(Error::MissingVirtualSites)
        ));
    }

    #[test]
    fn parent_molecule_mapping() {
        let (topology, store, _) = two_molecule_system();
        let mapping = virtual_site_parent_molecule_mapping(&topology, &store);
        assert_eq!(mapping.len(), 1);
        let (key, &molecule) = mapping.iter().next().unwrap();
        assert_eq!(key.parent_atom_index(), 0);
        assert_eq!(molecule, 0);

        let bare = ParameterStore::new();
        assert!(virtual_site_parent_molecule_mapping(&topology, &bare).is_empty());
    }

    #[test]
    fn sites_follow_their_parent_molecule() {
        // Two waters, one divalent site on the *second* molecule: the extra
        // row appears at the very end, after molecule 1's atoms.
        let topology = Topology::new(vec![
            Molecule::from_atomic_numbers(&[8, 1, 1]),
            Molecule::from_atomic_numbers(&[8, 1, 1]),
        ]);

        let mut store = ParameterStore::new();
        let bonds = store.collection_mut(ParameterStore::BONDS);
        let pk = PotentialKey::new("b-OH");
        bonds.insert_potential(pk.clone(), Potential::new().with("length", Length::nanometers(0.09572)));
        for (i, j) in [(0, 1), (0, 2), (3, 4), (3, 5)] {
            bonds.insert_key(StructuralKey::bond(i, j), pk.clone());
        }
        let angles = store.collection_mut(ParameterStore::ANGLES);
        let pk = PotentialKey::new("a-HOH");
        angles.insert_potential(
            pk.clone(),
            Potential::new().with("angle", crate::model::quantity::Angle::degrees(104.52)),
        );
        angles.insert_key(StructuralKey::angle(1, 0, 2), pk.clone());
        angles.insert_key(StructuralKey::angle(4, 3, 5), pk);

        let sites = store.collection_mut(ParameterStore::VIRTUAL_SITES);
        let pk = PotentialKey::new("v");
        sites.insert_potential(pk.clone(), Potential::new().with("distance", Length::nanometers(-0.015)));
        sites.insert_key(
            StructuralKey::VirtualSite(VirtualSiteKey::new(
                VirtualSiteKind::DivalentLonePair,
                vec![3, 4, 5],
            )),
            pk,
        );

        let half = (104.52f64 / 2.0).to_radians();
        let oh = 0.09572;
        let water = |origin: DVec3| {
            [
                origin,
                origin + oh * DVec3::new(half.cos(), half.sin(), 0.0),
                origin + oh * DVec3::new(half.cos(), -half.sin(), 0.0),
            ]
        };
        let mut positions = Vec::new();
        positions.extend(water(DVec3::ZERO));
        positions.extend(water(DVec3::new(0.5, 0.0, 0.0)));

        let all =
            get_positions_with_virtual_sites(&topology, &store, Some(&positions), false).unwrap();
        assert_eq!(all.len(), 7);
        assert_eq!(&all[..6], &positions[..]);
        // Negative distance pulls the site toward the hydrogens (+x of O2).
        let u = all[6] - positions[3];
        assert_relative_eq!(u.length(), 0.015, max_relative = 1e-10);
        assert!(u.x > 0.0);
    }
}
