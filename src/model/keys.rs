//! Structural and potential keys.
//!
//! A [`StructuralKey`] identifies one interaction instance in a topology by
//! the ordered atom indices it spans; a [`PotentialKey`] identifies one
//! deduplicated parameter record. Many structural keys may map to the same
//! potential key.
//!
//! Stored atom order is significant (virtual sites in particular must never
//! have their orientation atoms reordered), so equality and hashing are
//! order-sensitive. Lookups that must treat a bond and its reversal as the
//! same interaction go through [`StructuralKey::spans_pair`] and
//! [`StructuralKey::angle_between`] instead of `==`.

use std::fmt;

/// The placement rule of a virtual site.
///
/// One variant per supported rule; dispatch is an exhaustive match so a new
/// rule is a compile-time-checked addition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VirtualSiteKind {
    /// Two orientation atoms; site on the bond axis beyond the parent.
    BondCharge,
    /// Three orientation atoms; site in (or out of) the 1-2-3 plane.
    MonovalentLonePair,
    /// Three orientation atoms; site on (or off) the bisector at atom 0.
    DivalentLonePair,
    /// Four orientation atoms; site along the normal of the substituent plane.
    TrivalentLonePair,
}

impl VirtualSiteKind {
    /// Number of orientation atoms this rule requires.
    pub fn orientation_atom_count(self) -> usize {
        match self {
            VirtualSiteKind::BondCharge => 2,
            VirtualSiteKind::MonovalentLonePair => 3,
            VirtualSiteKind::DivalentLonePair => 3,
            VirtualSiteKind::TrivalentLonePair => 4,
        }
    }
}

impl fmt::Display for VirtualSiteKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            VirtualSiteKind::BondCharge => "BondCharge",
            VirtualSiteKind::MonovalentLonePair => "MonovalentLonePair",
            VirtualSiteKind::DivalentLonePair => "DivalentLonePair",
            VirtualSiteKind::TrivalentLonePair => "TrivalentLonePair",
        };
        f.write_str(name)
    }
}

/// Identifies one virtual site: its placement rule, its ordered orientation
/// atoms, and a name discriminating multiple sites that share them.
///
/// By convention `orientation_atom_indices[0]` is the parent atom, which
/// determines the molecule a site belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VirtualSiteKey {
    pub kind: VirtualSiteKind,
    pub orientation_atom_indices: Vec<usize>,
    pub name: String,
}

impl VirtualSiteKey {
    /// Creates a key with the default site name `"EP"`.
    pub fn new(kind: VirtualSiteKind, orientation_atom_indices: Vec<usize>) -> Self {
        Self::named(kind, orientation_atom_indices, "EP")
    }

    pub fn named(
        kind: VirtualSiteKind,
        orientation_atom_indices: Vec<usize>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            orientation_atom_indices,
            name: name.into(),
        }
    }

    /// The parent atom (orientation index 0).
    pub fn parent_atom_index(&self) -> usize {
        self.orientation_atom_indices[0]
    }
}

/// One interaction instance, tagged by kind.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum StructuralKey {
    /// A two-atom interaction (bond or distance constraint).
    Bond { atom_indices: [usize; 2] },
    /// A three-atom bend; the central atom is at position 1.
    Angle { atom_indices: [usize; 3] },
    /// A four-atom torsion.
    ProperTorsion { atom_indices: [usize; 4] },
    /// A virtual site.
    VirtualSite(VirtualSiteKey),
}

impl StructuralKey {
    pub fn bond(i: usize, j: usize) -> Self {
        StructuralKey::Bond {
            atom_indices: [i, j],
        }
    }

    pub fn angle(i: usize, center: usize, k: usize) -> Self {
        StructuralKey::Angle {
            atom_indices: [i, center, k],
        }
    }

    /// True for a two-atom key spanning `{i, j}` in either traversal order.
    pub fn spans_pair(&self, i: usize, j: usize) -> bool {
        match self {
            StructuralKey::Bond { atom_indices: [a, b] } => {
                (*a, *b) == (i, j) || (*b, *a) == (i, j)
            }
            _ => false,
        }
    }

    /// For an angle key whose endpoints are `{i, j}` (in either orientation),
    /// returns the central atom.
    pub fn angle_between(&self, i: usize, j: usize) -> Option<usize> {
        match self {
            StructuralKey::Angle {
                atom_indices: [a, b, c],
            } if (*a, *c) == (i, j) || (*c, *a) == (i, j) => Some(*b),
            _ => None,
        }
    }

    /// True for an angle key matching `(i, center, k)` forward or reversed;
    /// the central atom position is fixed.
    pub fn matches_angle(&self, i: usize, center: usize, k: usize) -> bool {
        matches!(
            self,
            StructuralKey::Angle {
                atom_indices: [a, b, c],
            } if *b == center && ((*a, *c) == (i, k) || (*c, *a) == (i, k))
        )
    }

    /// The virtual-site key, if this is a virtual-site entry.
    pub fn as_virtual_site(&self) -> Option<&VirtualSiteKey> {
        match self {
            StructuralKey::VirtualSite(key) => Some(key),
            _ => None,
        }
    }
}

/// Opaque identifier of a deduplicated parameter record.
///
/// The id is typically the source parameter's identifier (e.g. a SMIRKS
/// pattern); `mult` disambiguates multi-term records such as torsion
/// periodicities.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PotentialKey {
    pub id: String,
    pub mult: Option<u32>,
}

impl PotentialKey {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            mult: None,
        }
    }

    pub fn with_mult(id: impl Into<String>, mult: u32) -> Self {
        Self {
            id: id.into(),
            mult: Some(mult),
        }
    }
}

impl fmt::Display for PotentialKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.mult {
            Some(mult) => write!(f, "{} mult={}", self.id, mult),
            None => f.write_str(&self.id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bond_key_matches_either_order() {
        let key = StructuralKey::bond(3, 7);
        assert!(key.spans_pair(3, 7));
        assert!(key.spans_pair(7, 3));
        assert!(!key.spans_pair(3, 8));
    }

    #[test]
    fn bond_key_equality_is_order_sensitive() {
        assert_ne!(StructuralKey::bond(3, 7), StructuralKey::bond(7, 3));
    }

    #[test]
    fn angle_key_center_is_fixed() {
        let key = StructuralKey::angle(0, 1, 2);
        assert!(key.matches_angle(0, 1, 2));
        assert!(key.matches_angle(2, 1, 0));
        assert!(!key.matches_angle(1, 0, 2));
    }

    #[test]
    fn angle_endpoints_expose_center() {
        let key = StructuralKey::angle(4, 9, 6);
        assert_eq!(key.angle_between(4, 6), Some(9));
        assert_eq!(key.angle_between(6, 4), Some(9));
        assert_eq!(key.angle_between(4, 9), None);
    }

    #[test]
    fn pair_matching_ignores_other_kinds() {
        let key = StructuralKey::angle(0, 1, 2);
        assert!(!key.spans_pair(0, 2));
    }

    #[test]
    fn virtual_site_key_parent_and_name() {
        let key = VirtualSiteKey::new(VirtualSiteKind::BondCharge, vec![5, 2]);
        assert_eq!(key.parent_atom_index(), 5);
        assert_eq!(key.name, "EP");

        let named = VirtualSiteKey::named(VirtualSiteKind::DivalentLonePair, vec![0, 1, 2], "LP1");
        assert_ne!(
            StructuralKey::VirtualSite(named.clone()),
            StructuralKey::VirtualSite(VirtualSiteKey::new(
                VirtualSiteKind::DivalentLonePair,
                vec![0, 1, 2],
            )),
        );
    }

    #[test]
    fn orientation_atom_counts() {
        assert_eq!(VirtualSiteKind::BondCharge.orientation_atom_count(), 2);
        assert_eq!(VirtualSiteKind::MonovalentLonePair.orientation_atom_count(), 3);
        assert_eq!(VirtualSiteKind::DivalentLonePair.orientation_atom_count(), 3);
        assert_eq!(VirtualSiteKind::TrivalentLonePair.orientation_atom_count(), 4);
    }
}
