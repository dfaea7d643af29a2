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

//! ## Interaction models
//!
//! The evaluation contract ([`InteractionModel`]) required by the
//! finite-difference checks, together with reference implementations:
//! simple pair potentials, a second-moment many-body model, and smeared and
//! unsmeared Coulomb electrostatics.

use crate::structure::AtomicConfiguration;
use crate::{Info, Matrix3, Vector3};
use dyn_clone::DynClone;
use std::fmt::Debug;

mod electrostatic;
mod manybody;
pub mod neighbor;
mod pair;
pub use self::electrostatic::{DirectCoulomb, GaussianCharges, SlaterCharges};
pub use self::manybody::{Gupta, GuptaParams};
pub use self::pair::{Harmonic, LennardJonesCut, PairPotential, Pairwise, PowerSix};

/// Evaluation contract between a potential and the finite-difference checks.
///
/// A model must report total energy, analytic per-atom forces, and the
/// analytic stress tensor for any configuration. Charge-dependent models
/// additionally expose ∂E/∂qᵢ; all others inherit the `None` default and
/// their charge check is skipped.
pub trait InteractionModel: Info + Debug + DynClone {
    /// Total potential energy (eV)
    fn energy(&self, system: &AtomicConfiguration) -> f64;

    /// Analytic force on every atom (eV/Å)
    fn forces(&self, system: &AtomicConfiguration) -> Vec<Vector3>;

    /// Analytic stress tensor, dE/dε divided by the cell volume (eV/Å³)
    fn stress(&self, system: &AtomicConfiguration) -> Matrix3;

    /// Analytic derivative of the energy with respect to each atom's charge (eV/e)
    fn charge_gradient(&self, _system: &AtomicConfiguration) -> Option<Vec<f64>> {
        None
    }
}

dyn_clone::clone_trait_object!(InteractionModel);

/// Accumulator turning per-bond radial gradients dE/dr into forces and a
/// virial. Valid for any energy that is a function of interatomic distances
/// only, which covers every model in this crate.
pub(crate) struct PairGradients {
    pub forces: Vec<Vector3>,
    /// dE/dε, i.e. the virial before division by volume
    pub virial: Matrix3,
}

impl PairGradients {
    pub fn new(n: usize) -> Self {
        Self {
            forces: vec![Vector3::zeros(); n],
            virial: Matrix3::zeros(),
        }
    }

    /// Add one bond's contribution. `delta` points from `i` to the image of
    /// `j`, `de_dr` is dE/dr for this bond.
    pub fn add(&mut self, i: usize, j: usize, delta: &Vector3, dist: f64, de_dr: f64) {
        let unit = delta / dist;
        self.forces[i] += de_dr * unit;
        self.forces[j] -= de_dr * unit;
        self.virial += de_dr / dist * delta * delta.transpose();
    }
}
