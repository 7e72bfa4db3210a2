//! Equilibrium geometry resolution from the parameter store.
//!
//! Virtual-site placement needs equilibrium distances and angles as the
//! force field defines them, not as the instantaneous positions happen to
//! be. The [`GeometryResolver`] searches the store in a fixed priority
//! order — constraints, then bonds, then angle records — and falls back to
//! law-of-cosines derivation when a direct record is absent.
//!
//! The two derivations depend on each other (an unknown distance can come
//! from an angle record, an unknown angle from three distances). The
//! recursion stays finite by construction: the angle-based distance branch
//! reads the angle value straight off the matched record instead of
//! re-entering angle derivation, and an explicit visited-triple path
//! guarantees each angle triple is expanded at most once per query.

use crate::model::quantity::{Angle, Length, Quantity};
use crate::model::store::{ParameterStore, Potential};

use super::error::Error;

/// Read-only view over a [`ParameterStore`] answering equilibrium geometry
/// queries.
#[derive(Debug, Clone, Copy)]
pub struct GeometryResolver<'a> {
    store: &'a ParameterStore,
}

impl<'a> GeometryResolver<'a> {
    pub fn new(store: &'a ParameterStore) -> Self {
        Self { store }
    }

    /// Equilibrium separation of atoms `i` and `j`.
    ///
    /// Searches the Constraints collection (parameter `"distance"`), then
    /// Bonds (parameter `"length"`), matching either traversal order. If
    /// neither holds a record, derives the separation from any angle record
    /// whose endpoints are `{i, j}` via the law of cosines:
    /// `d² = a² + b² − 2ab·cos γ`.
    ///
    /// # Errors
    ///
    /// [`Error::GeometryNotFound`] when every path is exhausted;
    /// [`Error::MissingParameter`] / [`Error::UnitMismatch`] when a matched
    /// record is malformed.
    pub fn distance(&self, i: usize, j: usize) -> Result<Length, Error> {
        self.distance_via(i, j, &mut Vec::new())
    }

    /// Equilibrium angle at `center` between `i` and `k`.
    ///
    /// A direct Angles record (either orientation, center fixed at position
    /// 1) wins; otherwise the angle is derived from the three pairwise
    /// distances by the inverse law of cosines:
    /// `γ = arccos((c_ik² − c_ic² − c_ck²) / (−2·c_ic·c_ck))`.
    ///
    /// # Errors
    ///
    /// [`Error::GeometryNotFound`] when neither a direct record nor all
    /// three pairwise distances are resolvable.
    pub fn angle(&self, i: usize, center: usize, k: usize) -> Result<Angle, Error> {
        if let Some(potential) = self
            .store
            .collection(ParameterStore::ANGLES)
            .and_then(|angles| angles.potential_for_angle(i, center, k))
        {
            return angle_parameter(potential, "angle", i, center, k);
        }

        let mut visited = Vec::new();
        // Report exhaustion as an angle failure, but let malformed-record
        // errors through untouched, as the distance path does.
        let resolve = |a: usize, b: usize, visited: &mut Vec<[usize; 3]>| {
            match self.distance_via(a, b, visited) {
                Err(Error::GeometryNotFound { .. }) => Err(Error::angle_not_found(i, center, k)),
                other => other,
            }
        };
        let ic = resolve(i, center, &mut visited)?;
        let ck = resolve(center, k, &mut visited)?;
        let ik = resolve(i, k, &mut visited)?;

        let ratio = (ik * ik - ic * ic - ck * ck) / (ic * ck * -2.0);
        Ok(Angle::acos(ratio))
    }

    /// Distance resolution with the derivation path so far.
    ///
    /// `visited` holds the normalized angle triples already expanded; a
    /// triple is never expanded twice, which breaks every potential
    /// distance→angle→distance cycle.
    fn distance_via(
        &self,
        i: usize,
        j: usize,
        visited: &mut Vec<[usize; 3]>,
    ) -> Result<Length, Error> {
        if let Some(constraints) = self.store.collection(ParameterStore::CONSTRAINTS) {
            if let Some(potential) = constraints.potential_for_pair(i, j) {
                return length_parameter(potential, "distance", i, j);
            }
        }

        if let Some(bonds) = self.store.collection(ParameterStore::BONDS) {
            if let Some(potential) = bonds.potential_for_pair(i, j) {
                return length_parameter(potential, "length", i, j);
            }
        }

        if let Some(angles) = self.store.collection(ParameterStore::ANGLES) {
            // Collect candidates up front; the recursion below needs the
            // visited path mutably.
            let candidates: Vec<(usize, &Potential)> = angles.angles_spanning(i, j).collect();

            for (center, potential) in candidates {
                let triple = normalized_triple(i, center, j);
                if visited.contains(&triple) {
                    continue;
                }
                visited.push(triple);

                let gamma = angle_parameter(potential, "angle", i, center, j)?;
                let Ok(a) = self.distance_via(i, center, visited) else {
                    continue;
                };
                let Ok(b) = self.distance_via(center, j, visited) else {
                    continue;
                };

                return Ok((a * a + b * b - a * b * (2.0 * gamma.cos())).sqrt());
            }
        }

        Err(Error::distance_not_found(i, j))
    }
}

fn normalized_triple(i: usize, center: usize, j: usize) -> [usize; 3] {
    let mut triple = [i, center, j];
    triple.sort_unstable();
    triple
}

fn length_parameter(potential: &Potential, name: &str, i: usize, j: usize) -> Result<Length, Error> {
    expect_quantity(potential, name, format!("atoms ({i}, {j})"))?
        .as_length()
        .ok_or_else(|| Error::UnitMismatch {
            parameter: name.to_string(),
            expected: "length",
            found: potential.get(name).map(|q| q.dimension().to_string()).unwrap_or_default(),
        })
}

fn angle_parameter(
    potential: &Potential,
    name: &str,
    i: usize,
    center: usize,
    k: usize,
) -> Result<Angle, Error> {
    expect_quantity(potential, name, format!("atoms ({i}, {center}, {k})"))?
        .as_angle()
        .ok_or_else(|| Error::UnitMismatch {
            parameter: name.to_string(),
            expected: "angle",
            found: potential.get(name).map(|q| q.dimension().to_string()).unwrap_or_default(),
        })
}

fn expect_quantity<'p>(
    potential: &'p Potential,
    name: &str,
    record: String,
) -> Result<&'p Quantity, Error> {
    potential
        .get(name)
        .ok_or_else(|| Error::missing_parameter(record, name))
}
