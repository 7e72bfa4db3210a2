//! Virtual-site placement.
//!
//! Each supported placement rule turns a site's force-field parameters
//! (distance, in-plane angle, out-of-plane angle) plus the equilibrium
//! geometry of its orientation atoms into either a set of affine weights
//! over those atoms' positions or an absolute position. Weights are what
//! engine exporters consume; positions are what coordinate output needs.
//!
//! The formulas follow the conventions of the reference simulation engines
//! exactly, including two deliberate tie-breaks that substitute for
//! undefined handedness conventions: the divalent cross-product sign is
//! fixed by the ordering of the outer orientation indices, and the
//! trivalent normal direction by an ε-perturbation test (ε = 1e-3 nm)
//! against the central atom.

use glam::DVec3;

use crate::model::keys::{StructuralKey, VirtualSiteKey, VirtualSiteKind};
use crate::model::quantity::{Angle, Length};
use crate::model::store::ParameterStore;
use crate::model::topology::Topology;

use super::error::Error;
use super::geometry::GeometryResolver;

/// Perturbation magnitude of the trivalent sign test, in nanometers.
///
/// Hard-coded in the reference implementation; changing it (or scaling it
/// with the input unit) would break bit-for-bit parity.
const TRIVALENT_SIGN_EPSILON_NM: f64 = 1e-3;

/// Tolerance for the divalent symmetric-leg requirement, inclusive.
const DIVALENT_LEG_TOLERANCE_NM: f64 = 1e-3;

/// A virtual site's placement rule and geometric parameters, resolved from
/// its key and parameter record.
///
/// Derived on demand; not persisted independently of the store.
#[derive(Debug, Clone)]
pub struct VirtualSiteDescriptor {
    pub kind: VirtualSiteKind,
    /// Ordered orientation atoms; index 0 is the parent. Never reordered.
    pub orientation_atom_indices: Vec<usize>,
    pub distance: Length,
    pub in_plane_angle: Angle,
    pub out_of_plane_angle: Angle,
}

impl VirtualSiteDescriptor {
    /// Looks up the key's parameter record and extracts the geometric
    /// parameters: `"distance"` (required), `"inPlaneAngle"` and
    /// `"outOfPlaneAngle"` (defaulting to zero when absent).
    ///
    /// # Errors
    ///
    /// [`Error::MissingVirtualSites`] when the store has no VirtualSites
    /// collection or no record for this key; [`Error::MissingParameter`] /
    /// [`Error::UnitMismatch`] for malformed records;
    /// [`Error::UnsupportedGeometry`] when the orientation atom count does
    /// not match the kind.
    pub fn from_store(key: &VirtualSiteKey, store: &ParameterStore) -> Result<Self, Error> {
        let expected = key.kind.orientation_atom_count();
        if key.orientation_atom_indices.len() != expected {
            return Err(Error::unsupported(format!(
                "{} requires {} orientation atoms, got {}",
                key.kind,
                expected,
                key.orientation_atom_indices.len()
            )));
        }

        let potential = store
            .collection(ParameterStore::VIRTUAL_SITES)
            .and_then(|sites| sites.potential_for(&StructuralKey::VirtualSite(key.clone())))
            .ok_or(Error::MissingVirtualSites)?;

        let record = format!("virtual site '{}' on atoms {:?}", key.name, key.orientation_atom_indices);

        let distance = potential
            .get("distance")
            .ok_or_else(|| Error::missing_parameter(record.clone(), "distance"))?
            .as_length()
            .ok_or_else(|| Error::UnitMismatch {
                parameter: "distance".into(),
                expected: "length",
                found: potential.get("distance").map(|q| q.dimension().to_string()).unwrap_or_default(),
            })?;

        let angle_or_zero = |name: &str| -> Result<Angle, Error> {
            match potential.get(name) {
                None => Ok(Angle::ZERO),
                Some(q) => q.as_angle().ok_or_else(|| Error::UnitMismatch {
                    parameter: name.into(),
                    expected: "angle",
                    found: q.dimension().to_string(),
                }),
            }
        };

        Ok(Self {
            kind: key.kind,
            orientation_atom_indices: key.orientation_atom_indices.clone(),
            distance,
            in_plane_angle: angle_or_zero("inPlaneAngle")?,
            out_of_plane_angle: angle_or_zero("outOfPlaneAngle")?,
        })
    }
}

/// A virtual site expressed as coefficients over its orientation atoms.
#[derive(Debug, Clone, PartialEq)]
pub enum VirtualSiteWeights {
    /// Position = Σ wᵢ·rᵢ over the orientation atoms; the wᵢ sum to 1.
    Affine(Vec<f64>),
    /// Position = r₁ + w12·(r₂−r₁) + w13·(r₃−r₁) + wcross·(r₂−r₁)×(r₃−r₁).
    /// `wcross` carries units of inverse length (per nanometer).
    LocalFrame { w12: f64, w13: f64, wcross: f64 },
}

/// Computes the weight tuple expressing a site over its orientation atoms.
///
/// Uses only force-field equilibrium geometry via the resolver — no real
/// positions — so the result is valid for any conformation an engine keeps
/// at the constrained geometry.
///
/// # Errors
///
/// [`Error::VirtualSiteTypeNotImplemented`] for the trivalent rule, whose
/// placement has no affine form; [`Error::UnsupportedGeometry`] for
/// declared-but-unimplemented sub-cases; resolver errors pass through.
pub fn weights(
    descriptor: &VirtualSiteDescriptor,
    resolver: GeometryResolver<'_>,
    topology: &Topology,
) -> Result<VirtualSiteWeights, Error> {
    match descriptor.kind {
        VirtualSiteKind::BondCharge => bond_charge_weights(descriptor, resolver),
        VirtualSiteKind::MonovalentLonePair => monovalent_weights(descriptor, resolver),
        VirtualSiteKind::DivalentLonePair => divalent_weights(descriptor, resolver, topology),
        VirtualSiteKind::TrivalentLonePair => Err(Error::VirtualSiteTypeNotImplemented(
            "TrivalentLonePair placement has no affine weight form".into(),
        )),
    }
}

/// Computes a site's absolute position from its orientation atoms' real
/// positions (global indexing, nanometers).
///
/// # Errors
///
/// [`Error::MissingPositions`] when an orientation atom has no position
/// row; otherwise as [`weights`], except that the trivalent rule is
/// supported here.
pub fn position(
    descriptor: &VirtualSiteDescriptor,
    resolver: GeometryResolver<'_>,
    topology: &Topology,
    positions: &[DVec3],
) -> Result<DVec3, Error> {
    for &index in &descriptor.orientation_atom_indices {
        if index >= positions.len() {
            return Err(Error::MissingPositions(format!(
                "orientation atom {} has no position (only {} rows)",
                index,
                positions.len()
            )));
        }
    }

    match descriptor.kind {
        VirtualSiteKind::TrivalentLonePair => trivalent_position(descriptor, positions),
        _ => match weights(descriptor, resolver, topology)? {
            VirtualSiteWeights::Affine(w) => Ok(descriptor
                .orientation_atom_indices
                .iter()
                .zip(&w)
                .map(|(&index, &weight)| positions[index] * weight)
                .sum()),
            VirtualSiteWeights::LocalFrame { w12, w13, wcross } => {
                let r1 = positions[descriptor.orientation_atom_indices[0]];
                let r2 = positions[descriptor.orientation_atom_indices[1]];
                let r3 = positions[descriptor.orientation_atom_indices[2]];
                let e12 = r2 - r1;
                let e13 = r3 - r1;
                Ok(r1 + e12 * w12 + e13 * w13 + e12.cross(e13) * wcross)
            }
        },
    }
}

/// Two orientation atoms; the site sits on the bond axis beyond the parent,
/// at the declared distance from it.
fn bond_charge_weights(
    descriptor: &VirtualSiteDescriptor,
    resolver: GeometryResolver<'_>,
) -> Result<VirtualSiteWeights, Error> {
    let [i, j] = [
        descriptor.orientation_atom_indices[0],
        descriptor.orientation_atom_indices[1],
    ];
    let separation = resolver.distance(i, j)?;
    if separation.as_nanometers() == 0.0 {
        return Err(Error::unsupported(format!(
            "zero equilibrium separation between atoms {i} and {j}"
        )));
    }

    let ratio = descriptor.distance / separation;
    Ok(VirtualSiteWeights::Affine(vec![1.0 + ratio, -ratio]))
}

/// Three orientation atoms, planar case only. The in-plane angle is
/// measured at atom 1 from the 1→2 bond, opening toward atom 3.
fn monovalent_weights(
    descriptor: &VirtualSiteDescriptor,
    resolver: GeometryResolver<'_>,
) -> Result<VirtualSiteWeights, Error> {
    if descriptor.out_of_plane_angle.as_radians() != 0.0 {
        return Err(Error::unsupported(
            "only planar (zero out-of-plane angle) MonovalentLonePair sites are supported",
        ));
    }

    let [i, j, k] = [
        descriptor.orientation_atom_indices[0],
        descriptor.orientation_atom_indices[1],
        descriptor.orientation_atom_indices[2],
    ];
    let r12 = resolver.distance(i, j)?;
    let r23 = resolver.distance(j, k)?;
    let theta_123 = resolver.angle(i, j, k)?;

    let sin_supplement = theta_123.supplement().sin();
    if sin_supplement == 0.0 {
        return Err(Error::unsupported(format!(
            "collinear orientation atoms ({i}, {j}, {k})"
        )));
    }

    let theta = descriptor.in_plane_angle;
    let w3 = (descriptor.distance / r23) * theta.supplement().sin() / sin_supplement;
    let w1 = 1.0
        + w3 * (r23 / r12) * theta_123.supplement().cos()
        + (descriptor.distance / r12) * theta.supplement().cos();
    let w2 = 1.0 - w1 - w3;

    Ok(VirtualSiteWeights::Affine(vec![w1, w2, w3]))
}

/// Three orientation atoms with atom 0 central; requires symmetric legs.
///
/// The planar case places the site on the bisector; the non-planar case is
/// recognized only for a heavy central atom with two hydrogen outer atoms
/// (symmetric four/five-point water-like models) and adds a cross-product
/// term lifting the site out of the molecular plane.
fn divalent_weights(
    descriptor: &VirtualSiteDescriptor,
    resolver: GeometryResolver<'_>,
    topology: &Topology,
) -> Result<VirtualSiteWeights, Error> {
    let [c, o1, o2] = [
        descriptor.orientation_atom_indices[0],
        descriptor.orientation_atom_indices[1],
        descriptor.orientation_atom_indices[2],
    ];
    let r12 = resolver.distance(c, o1)?;
    let r13 = resolver.distance(c, o2)?;

    if (r12 - r13).abs().as_nanometers() > DIVALENT_LEG_TOLERANCE_NM {
        return Err(Error::unsupported(format!(
            "asymmetric DivalentLonePair legs: |{r12} - {r13}| exceeds {DIVALENT_LEG_TOLERANCE_NM} nm"
        )));
    }

    let theta = resolver.angle(o1, c, o2)?;
    let r_mid = r12 * (theta * 0.5).cos();
    if r_mid.as_nanometers() == 0.0 {
        return Err(Error::unsupported(format!(
            "collinear orientation atoms ({o1}, {c}, {o2})"
        )));
    }

    let phi = descriptor.out_of_plane_angle;
    if phi.as_radians() == 0.0 {
        let w1 = 1.0 + descriptor.distance / r_mid;
        let w_outer = (1.0 - w1) / 2.0;
        return Ok(VirtualSiteWeights::Affine(vec![w1, w_outer, w_outer]));
    }

    // Non-planar placement is only defined for the water-like pattern the
    // reference engines recognize: heavy central atom, two hydrogens.
    let heavy_center = topology.atomic_number(c).is_some_and(|z| z > 1);
    let hydrogen_outer = topology.atomic_number(o1) == Some(1) && topology.atomic_number(o2) == Some(1);
    if !heavy_center || !hydrogen_outer {
        return Err(Error::unsupported(
            "non-planar DivalentLonePair sites are only supported for a heavy \
             central atom with two hydrogen orientation atoms",
        ));
    }

    let w_in_plane = -(descriptor.distance / r_mid) * phi.cos() / 2.0;
    let mut wcross = descriptor.distance.as_nanometers() * phi.sin()
        / ((r12 * r13).as_square_nanometers() * theta.sin());
    // Index-order tie-break standing in for an undefined geometric
    // handedness convention.
    if o2 < o1 {
        wcross = -wcross;
    }

    Ok(VirtualSiteWeights::LocalFrame {
        w12: w_in_plane,
        w13: w_in_plane,
        wcross,
    })
}

/// Four orientation atoms: center plus three substituents spanning a plane.
///
/// The plane normal's sign is resolved by nudging the raw cross product by
/// ±ε along the unit normal and keeping whichever end lands closer to the
/// central atom, exactly as the reference engine does (the raw cross
/// product is compared as a point, quirk included).
fn trivalent_position(
    descriptor: &VirtualSiteDescriptor,
    positions: &[DVec3],
) -> Result<DVec3, Error> {
    let [center, a, b, c] = [
        descriptor.orientation_atom_indices[0],
        descriptor.orientation_atom_indices[1],
        descriptor.orientation_atom_indices[2],
        descriptor.orientation_atom_indices[3],
    ];
    let r_center = positions[center];
    let raw_cross = (positions[b] - positions[a]).cross(positions[c] - positions[a]);
    if raw_cross.length() == 0.0 {
        return Err(Error::unsupported(format!(
            "collinear substituents ({a}, {b}, {c}) give no plane normal"
        )));
    }

    let mut normal = raw_cross.normalize();
    let toward = (r_center - (raw_cross + normal * TRIVALENT_SIGN_EPSILON_NM)).length();
    let away = (r_center - (raw_cross - normal * TRIVALENT_SIGN_EPSILON_NM)).length();
    if toward >= away {
        normal = -normal;
    }

    Ok(r_center + normal * descriptor.distance.as_nanometers())
}
