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

//! Central finite-difference validation of analytic derivatives.
//!
//! Each check perturbs one degree of freedom at a time (a Cartesian
//! coordinate, a strain component, or a charge), evaluates the model energy
//! on both sides, and compares the resulting numeric derivative against the
//! model's analytic one. Perturbations are store-and-restore: the saved
//! value is written back verbatim, so the configuration is bit-identical
//! after every check.

use crate::model::InteractionModel;
use crate::structure::AtomicConfiguration;
use crate::{max_abs_difference, Matrix3, Vector3};

/// Step sizes of the central differences, one per perturbed quantity
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FiniteDifference {
    /// Cartesian displacement (Å)
    pub dx: f64,
    /// Strain amplitude (dimensionless)
    pub de: f64,
    /// Charge increment (e)
    pub dq: f64,
}

impl Default for FiniteDifference {
    fn default() -> Self {
        Self {
            dx: 1e-6,
            de: 1e-6,
            dq: 1e-6,
        }
    }
}

/// Outcome of one derivative check: both sides of the comparison plus the
/// largest componentwise deviation between them.
#[derive(Clone, Debug)]
pub struct GradientCheck<T> {
    pub numeric: T,
    pub analytic: T,
    pub deviation: f64,
}

/// The six independent strain components, diagonal first
const STRAIN_COMPONENTS: [(usize, usize); 6] = [(0, 0), (1, 1), (2, 2), (1, 2), (0, 2), (0, 1)];

impl FiniteDifference {
    /// Numeric forces from ±dx displacements of every coordinate, compared
    /// against [`InteractionModel::forces`].
    pub fn check_forces(
        &self,
        model: &dyn InteractionModel,
        system: &mut AtomicConfiguration,
    ) -> GradientCheck<Vec<Vector3>> {
        let analytic = model.forces(system);
        let mut numeric = vec![Vector3::zeros(); system.len()];
        for atom in 0..system.len() {
            for axis in 0..3 {
                let saved = system.positions()[atom][axis];
                system.positions_mut()[atom][axis] = saved + self.dx;
                let above = model.energy(system);
                system.positions_mut()[atom][axis] = saved - self.dx;
                let below = model.energy(system);
                system.positions_mut()[atom][axis] = saved;
                numeric[atom][axis] = -(above - below) / (2.0 * self.dx);
            }
        }
        let deviation = max_abs_difference(
            numeric.iter().flat_map(|f| f.iter().copied()),
            analytic.iter().flat_map(|f| f.iter().copied()),
        );
        GradientCheck {
            numeric,
            analytic,
            deviation,
        }
    }

    /// Numeric stress from ±de affine strains of the cell and all positions,
    /// compared against [`InteractionModel::stress`].
    pub fn check_stress(
        &self,
        model: &dyn InteractionModel,
        system: &mut AtomicConfiguration,
    ) -> GradientCheck<Matrix3> {
        let analytic = model.stress(system);
        let volume = system.volume();
        let saved_cell = *system.cell();
        let saved_positions = system.positions().to_vec();
        let mut numeric = Matrix3::zeros();
        for (alpha, beta) in STRAIN_COMPONENTS {
            let mut energies = [0.0; 2];
            for (slot, sign) in [1.0, -1.0].into_iter().enumerate() {
                let mut deformation = Matrix3::identity();
                if alpha == beta {
                    deformation[(alpha, alpha)] += sign * self.de;
                } else {
                    deformation[(alpha, beta)] += 0.5 * sign * self.de;
                    deformation[(beta, alpha)] += 0.5 * sign * self.de;
                }
                system.set_cell(deformation * saved_cell, false);
                for (position, saved) in system.positions_mut().iter_mut().zip(&saved_positions) {
                    *position = deformation * saved;
                }
                energies[slot] = model.energy(system);
            }
            system.set_cell(saved_cell, false);
            system.positions_mut().copy_from_slice(&saved_positions);
            let derivative = (energies[0] - energies[1]) / (2.0 * self.de * volume);
            numeric[(alpha, beta)] = derivative;
            numeric[(beta, alpha)] = derivative;
        }
        let deviation = max_abs_difference(numeric.iter().copied(), analytic.iter().copied());
        GradientCheck {
            numeric,
            analytic,
            deviation,
        }
    }

    /// Numeric charge derivatives from ±dq on every charge, compared against
    /// [`InteractionModel::charge_gradient`]. `None` if the model has no
    /// charge dependence.
    pub fn check_charge_gradient(
        &self,
        model: &dyn InteractionModel,
        system: &mut AtomicConfiguration,
    ) -> Option<GradientCheck<Vec<f64>>> {
        let analytic = model.charge_gradient(system)?;
        let mut numeric = vec![0.0; system.len()];
        for atom in 0..system.len() {
            let saved = system.charges()[atom];
            system.charges_mut()[atom] = saved + self.dq;
            let above = model.energy(system);
            system.charges_mut()[atom] = saved - self.dq;
            let below = model.energy(system);
            system.charges_mut()[atom] = saved;
            numeric[atom] = (above - below) / (2.0 * self.dq);
        }
        let deviation = max_abs_difference(numeric.iter().copied(), analytic.iter().copied());
        Some(GradientCheck {
            numeric,
            analytic,
            deviation,
        })
    }
}
