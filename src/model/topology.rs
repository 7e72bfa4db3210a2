//! Read-only topology: ordered molecules of ordered atoms.
//!
//! Global atom indices follow concatenation order — molecule 0's atoms
//! first, then molecule 1's, and so on. The topology is built once and
//! never mutated during resolution.

use super::keys::VirtualSiteKey;

/// A real atom. Virtual sites are not atoms and never appear here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Atom {
    pub atomic_number: u8,
}

impl Atom {
    pub fn new(atomic_number: u8) -> Self {
        Self { atomic_number }
    }
}

/// One molecule's ordered atoms.
#[derive(Debug, Clone, Default)]
pub struct Molecule {
    pub atoms: Vec<Atom>,
}

impl Molecule {
    pub fn new(atoms: Vec<Atom>) -> Self {
        Self { atoms }
    }

    /// Convenience constructor from atomic numbers.
    pub fn from_atomic_numbers(numbers: &[u8]) -> Self {
        Self {
            atoms: numbers.iter().map(|&z| Atom::new(z)).collect(),
        }
    }

    #[inline]
    pub fn atom_count(&self) -> usize {
        self.atoms.len()
    }
}

/// An ordered list of molecules with global-index bookkeeping.
#[derive(Debug, Clone, Default)]
pub struct Topology {
    molecules: Vec<Molecule>,
    /// Global index of each molecule's first atom; one extra entry holds
    /// the total atom count.
    offsets: Vec<usize>,
}

impl Topology {
    pub fn new(molecules: Vec<Molecule>) -> Self {
        let mut offsets = Vec::with_capacity(molecules.len() + 1);
        let mut total = 0;
        for molecule in &molecules {
            offsets.push(total);
            total += molecule.atom_count();
        }
        offsets.push(total);
        Self { molecules, offsets }
    }

    #[inline]
    pub fn molecule_count(&self) -> usize {
        self.molecules.len()
    }

    #[inline]
    pub fn atom_count(&self) -> usize {
        *self.offsets.last().unwrap_or(&0)
    }

    pub fn molecules(&self) -> impl Iterator<Item = &Molecule> {
        self.molecules.iter()
    }

    pub fn molecule(&self, index: usize) -> Option<&Molecule> {
        self.molecules.get(index)
    }

    /// Global indices of a molecule's atoms, in their original order.
    ///
    /// # Panics
    ///
    /// Panics when `molecule_index >= molecule_count()`. Callers iterate
    /// molecules the topology itself enumerates; use
    /// [`molecule`](Topology::molecule) for fallible lookup.
    pub fn atom_indices(&self, molecule_index: usize) -> std::ops::Range<usize> {
        self.offsets[molecule_index]..self.offsets[molecule_index + 1]
    }

    /// Global index of a molecule-local atom.
    ///
    /// # Panics
    ///
    /// Panics when `molecule_index >= molecule_count()`.
    pub fn global_index(&self, molecule_index: usize, local_index: usize) -> usize {
        self.offsets[molecule_index] + local_index
    }

    /// The molecule owning a global atom index.
    pub fn molecule_of_atom(&self, atom_index: usize) -> Option<usize> {
        if atom_index >= self.atom_count() {
            return None;
        }
        // offsets is sorted; partition_point finds the first offset past the
        // atom, whose predecessor is the owning molecule.
        Some(self.offsets.partition_point(|&o| o <= atom_index) - 1)
    }

    pub fn atom(&self, atom_index: usize) -> Option<&Atom> {
        let molecule_index = self.molecule_of_atom(atom_index)?;
        let local = atom_index - self.offsets[molecule_index];
        self.molecules[molecule_index].atoms.get(local)
    }

    pub fn atomic_number(&self, atom_index: usize) -> Option<u8> {
        self.atom(atom_index).map(|a| a.atomic_number)
    }

    /// The molecule owning a virtual site, via its parent atom.
    pub fn molecule_of_virtual_site(&self, key: &VirtualSiteKey) -> Option<usize> {
        self.molecule_of_atom(key.parent_atom_index())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::keys::{VirtualSiteKey, VirtualSiteKind};

    fn water_dimer() -> Topology {
        Topology::new(vec![
            Molecule::from_atomic_numbers(&[8, 1, 1]),
            Molecule::from_atomic_numbers(&[8, 1, 1]),
        ])
    }

    #[test]
    fn counts_and_offsets() {
        let top = water_dimer();
        assert_eq!(top.molecule_count(), 2);
        assert_eq!(top.atom_count(), 6);
        assert_eq!(top.atom_indices(0), 0..3);
        assert_eq!(top.atom_indices(1), 3..6);
        assert_eq!(top.global_index(1, 2), 5);
    }

    #[test]
    fn atom_lookup_crosses_molecule_boundaries() {
        let top = water_dimer();
        assert_eq!(top.molecule_of_atom(0), Some(0));
        assert_eq!(top.molecule_of_atom(2), Some(0));
        assert_eq!(top.molecule_of_atom(3), Some(1));
        assert_eq!(top.molecule_of_atom(5), Some(1));
        assert_eq!(top.molecule_of_atom(6), None);

        assert_eq!(top.atomic_number(3), Some(8));
        assert_eq!(top.atomic_number(4), Some(1));
    }

    #[test]
    fn virtual_site_molecule_follows_parent() {
        let top = water_dimer();
        let key = VirtualSiteKey::new(VirtualSiteKind::DivalentLonePair, vec![3, 4, 5]);
        assert_eq!(top.molecule_of_virtual_site(&key), Some(1));
    }

    #[test]
    #[should_panic]
    fn atom_indices_rejects_out_of_range_molecule() {
        water_dimer().atom_indices(2);
    }

    #[test]
    fn empty_topology() {
        let top = Topology::new(Vec::new());
        assert_eq!(top.atom_count(), 0);
        assert_eq!(top.molecule_of_atom(0), None);
    }

    #[test]
    fn empty_molecule_is_skipped_in_lookup() {
        let top = Topology::new(vec![
            Molecule::from_atomic_numbers(&[6]),
            Molecule::default(),
            Molecule::from_atomic_numbers(&[7]),
        ]);
        assert_eq!(top.atom_count(), 2);
        assert_eq!(top.molecule_of_atom(1), Some(2));
        assert_eq!(top.atom_indices(1), 1..1);
    }
}
