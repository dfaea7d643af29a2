// Copyright 2024 Mikael Lund
//
// Licensed under the Apache license, version 2.0 (the "license");
// you may not use this file except in compliance with the license.
// You may obtain a copy of the license at
//
//     http://www.apache.org/licenses/license-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the license is distributed on an "as is" basis,
// without warranties or conditions of any kind, either express or implied.
// See the license for the specific language governing permissions and
// limitations under the license.

//! ## Atomic configurations
//!
//! Ordered collections of atoms with species labels, positions, per-atom
//! charges, and a periodic cell. Configurations are the mutable substrate of
//! the finite-difference checks: positions, cell, and charges may be
//! perturbed in place, while the atom count and species sequence are fixed
//! at construction.

use crate::{Error, Vector3};
use nalgebra::Matrix3;
use rand::Rng;

mod lattice;
mod random;
pub use self::lattice::{
    body_centered_cubic, cesium_chloride, diamond, face_centered_cubic, rock_salt, simple_cubic,
};
pub use self::random::{assign_charges, random_solid, AssignCharges};

/// Standard atomic mass (u) for the chemical symbols used by the built-in catalog
pub fn atomic_mass(symbol: &str) -> Result<f64, Error> {
    let mass = match symbol {
        "H" => 1.008,
        "He" => 4.002602,
        "C" => 12.011,
        "Na" => 22.98976928,
        "Si" => 28.085,
        "Cl" => 35.45,
        "Fe" => 55.845,
        "Ni" => 58.6934,
        "Cu" => 63.546,
        "Ag" => 107.8682,
        "Au" => 196.966570,
        _ => return Err(Error::UnknownSpecies(symbol.to_string())),
    };
    Ok(mass)
}

/// An ordered set of atoms in a (possibly periodic) cell.
///
/// Lattice vectors are the *columns* of the cell matrix. The species
/// sequence is immutable once constructed; positions, cell, and charges are
/// exposed mutably since they are the perturbation targets of the
/// finite-difference checks.
#[derive(Clone, Debug, PartialEq)]
pub struct AtomicConfiguration {
    species: Vec<String>,
    positions: Vec<Vector3>,
    charges: Vec<f64>,
    cell: Matrix3<f64>,
    periodic: bool,
}

impl AtomicConfiguration {
    /// New configuration with all charges set to zero.
    ///
    /// Panics if the number of species labels and positions differ, or if a
    /// periodic cell is singular.
    pub fn new(
        species: Vec<String>,
        positions: Vec<Vector3>,
        cell: Matrix3<f64>,
        periodic: bool,
    ) -> Self {
        assert_eq!(species.len(), positions.len());
        assert!(
            !periodic || cell.try_inverse().is_some(),
            "periodic cell must be invertible"
        );
        let charges = vec![0.0; species.len()];
        Self {
            species,
            positions,
            charges,
            cell,
            periodic,
        }
    }

    /// Number of atoms
    pub fn len(&self) -> usize {
        self.species.len()
    }

    pub fn is_empty(&self) -> bool {
        self.species.is_empty()
    }

    /// Chemical symbols in atom order
    pub fn species(&self) -> &[String] {
        &self.species
    }

    pub fn positions(&self) -> &[Vector3] {
        &self.positions
    }

    /// Mutable access to positions; the atom count cannot change
    pub fn positions_mut(&mut self) -> &mut [Vector3] {
        &mut self.positions
    }

    pub fn charges(&self) -> &[f64] {
        &self.charges
    }

    pub fn charges_mut(&mut self) -> &mut [f64] {
        &mut self.charges
    }

    pub fn set_charges(&mut self, charges: &[f64]) {
        assert_eq!(charges.len(), self.len());
        self.charges.copy_from_slice(charges);
    }

    pub fn cell(&self) -> &Matrix3<f64> {
        &self.cell
    }

    /// Replace the cell. With `scale_atoms`, atomic positions follow the
    /// cell affinely (fractional coordinates are preserved).
    pub fn set_cell(&mut self, cell: Matrix3<f64>, scale_atoms: bool) {
        assert!(
            !self.periodic || cell.try_inverse().is_some(),
            "periodic cell must be invertible"
        );
        if scale_atoms {
            let old_inverse = self
                .cell
                .try_inverse()
                .expect("cell must be invertible to scale atoms");
            let map = cell * old_inverse;
            for r in &mut self.positions {
                *r = map * *r;
            }
        }
        self.cell = cell;
    }

    pub fn periodic(&self) -> bool {
        self.periodic
    }

    /// Cell volume
    pub fn volume(&self) -> f64 {
        self.cell.determinant().abs()
    }

    /// Sum of atomic masses (u)
    pub fn total_mass(&self) -> Result<f64, Error> {
        self.species.iter().map(|s| atomic_mass(s)).sum()
    }

    /// Rigid translation of all atoms
    pub fn translate(&mut self, offset: &Vector3) {
        for r in &mut self.positions {
            *r += offset;
        }
    }

    /// Random displacement of every atom by up to `amplitude`, with
    /// isotropic direction. Used to probe derivative correctness away from
    /// equilibrium.
    pub fn rattle<R: Rng>(&mut self, amplitude: f64, rng: &mut R) {
        for r in &mut self.positions {
            *r += amplitude * random_in_unit_ball(rng);
        }
    }
}

/// Uniform point in the unit ball by rejection sampling
fn random_in_unit_ball<R: Rng>(rng: &mut R) -> Vector3 {
    loop {
        let v = Vector3::new(
            rng.gen_range(-1.0..=1.0),
            rng.gen_range(-1.0..=1.0),
            rng.gen_range(-1.0..=1.0),
        );
        if v.norm_squared() <= 1.0 {
            return v;
        }
    }
}
