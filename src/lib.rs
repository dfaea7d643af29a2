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

//! # Forcecheck
//!
//! A library for validating the internal consistency of analytic derivatives
//! produced by interatomic potentials: per-atom forces, the virial (stress)
//! tensor, and derivatives of the energy with respect to per-atom charges.
//! Each analytic quantity is compared against a central finite-difference
//! estimate obtained by perturbing atomic positions, cell strain, or charges
//! and re-evaluating the total energy.
//!
//! The main entry points are [`fdcheck::FiniteDifference`] for individual
//! checks, [`catalog::reference_catalog`] for the built-in table of
//! (potential, material) cases, and [`sweep::Sweep`] for driving the whole
//! table with a pluggable [`sweep::Reporter`].

#[cfg(test)]
extern crate approx;

/// A point in 3D space
pub type Vector3 = nalgebra::Vector3<f64>;
/// A stack-allocated 3x3 square matrix
pub type Matrix3 = nalgebra::Matrix3<f64>;

use num::Float;

pub mod catalog;
pub mod fdcheck;
pub mod model;
pub mod structure;
pub mod sweep;

use physical_constants::{ELEMENTARY_CHARGE, VACUUM_ELECTRIC_PERMITTIVITY};
use std::f64::consts::PI;

/// Electrostatic prefactor, e²/4πε₀ (eV × Å per squared elementary charge).
///
/// Converts a Coulomb pair term z₁z₂/r, with unit-less charge numbers and a
/// separation in ångström, to an energy in electron volts:
///
/// Examples:
/// ```
/// use forcecheck::COULOMB_PREFACTOR;
/// let z1 = 1.0;
/// let z2 = -1.0;
/// let r = 7.0; // separation in angstrom
/// let energy = COULOMB_PREFACTOR * z1 * z2 / r;
/// assert!((energy + 2.0571).abs() < 1e-4); // in eV
/// ```
pub const COULOMB_PREFACTOR: f64 =
    ELEMENTARY_CHARGE * 1.0e10 / (4.0 * PI * VACUUM_ELECTRIC_PERMITTIVITY);

/// Defines a cutoff distance
pub trait Cutoff {
    /// Squared cutoff distance
    fn cutoff_squared(&self) -> f64 {
        self.cutoff().powi(2)
    }

    /// Cutoff distance
    fn cutoff(&self) -> f64;
}

/// Optional information about a potential: display names and literature provenance.
///
/// All methods default to `None` so that implementors never have to provide a
/// name; reporting code falls back to a generic label instead.
pub trait Info {
    /// Short, machine-friendly name, e.g. `"ljcut"`
    fn short_name(&self) -> Option<&'static str> {
        None
    }
    /// Longer, human-readable name
    fn long_name(&self) -> Option<&'static str> {
        None
    }
    /// Literature reference for the potential or its parameter set
    fn citation(&self) -> Option<&'static str> {
        None
    }
}

/// Library error type
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// No tabulated atomic mass for the given chemical symbol
    #[error("unknown chemical species '{0}'")]
    UnknownSpecies(String),
    /// A structure generator was asked to build a structure with no atoms
    #[error("structure has no atoms")]
    EmptyStructure,
}

/// See Pythagorean means on [Wikipedia](https://en.wikipedia.org/wiki/Pythagorean_means)
pub(crate) fn geometric_mean<T: Float>(values: (T, T)) -> T {
    T::sqrt(values.0 * values.1)
}

/// See Pythagorean means on [Wikipedia](https://en.wikipedia.org/wiki/Pythagorean_means)
pub(crate) fn arithmetic_mean<T: Float>(values: (T, T)) -> T {
    (values.0 + values.1) * num::NumCast::from(0.5).unwrap()
}

/// Largest elementwise absolute difference between two equally long sequences
pub(crate) fn max_abs_difference<T, I, J>(a: I, b: J) -> T
where
    T: Float,
    I: IntoIterator<Item = T>,
    J: IntoIterator<Item = T>,
{
    a.into_iter()
        .zip(b)
        .map(|(x, y)| (x - y).abs())
        .fold(T::zero(), T::max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn coulomb_prefactor() {
        assert_relative_eq!(COULOMB_PREFACTOR, 14.399645, epsilon = 1e-5);
    }

    #[test]
    fn means() {
        assert_relative_eq!(geometric_mean((2.0, 8.0)), 4.0);
        assert_relative_eq!(arithmetic_mean((2.0, 8.0)), 5.0);
    }

    #[test]
    fn max_abs() {
        let a = [1.0, 2.0, 3.0];
        let b = [1.5, 2.0, 2.0];
        assert_relative_eq!(max_abs_difference(a, b), 1.0);
    }
}
