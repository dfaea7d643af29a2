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

//! Simple pair potentials and the [`Pairwise`] driver that lifts a radial
//! kernel to the full [`InteractionModel`] contract.

use super::neighbor::image_pairs;
use super::{InteractionModel, PairGradients};
use crate::structure::AtomicConfiguration;
use crate::{Cutoff, Info, Matrix3, Vector3};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

/// Radial pair interaction, 𝑈(𝑟).
///
/// Kernels are only evaluated below their cutoff; truncation is the
/// driver's responsibility.
pub trait PairPotential: Debug {
    /// Pair energy at separation `dist`
    fn pair_energy(&self, dist: f64) -> f64;

    /// Radial derivative d𝑈/d𝑟.
    ///
    /// The default implementation uses a central difference and should be
    /// overridden with the exact analytical expression for better speed and
    /// accuracy.
    fn pair_gradient(&self, dist: f64) -> f64 {
        const EPS: f64 = 1e-6;
        (self.pair_energy(dist + EPS) - self.pair_energy(dist - EPS)) / (2.0 * EPS)
    }
}

/// Lifts any [`PairPotential`] kernel to an [`InteractionModel`] by summing
/// over all periodic-image bonds within the kernel's cutoff.
#[derive(Clone, Debug)]
pub struct Pairwise<K> {
    kernel: K,
}

impl<K: PairPotential + Cutoff> Pairwise<K> {
    pub fn new(kernel: K) -> Self {
        Self { kernel }
    }

    pub fn kernel(&self) -> &K {
        &self.kernel
    }
}

impl<K: Info> Info for Pairwise<K> {
    fn short_name(&self) -> Option<&'static str> {
        self.kernel.short_name()
    }
    fn long_name(&self) -> Option<&'static str> {
        self.kernel.long_name()
    }
    fn citation(&self) -> Option<&'static str> {
        self.kernel.citation()
    }
}

impl<K> InteractionModel for Pairwise<K>
where
    K: PairPotential + Cutoff + Info + Debug + Clone + 'static,
{
    fn energy(&self, system: &AtomicConfiguration) -> f64 {
        image_pairs(system, self.kernel.cutoff())
            .iter()
            .map(|p| self.kernel.pair_energy(p.dist))
            .sum()
    }

    fn forces(&self, system: &AtomicConfiguration) -> Vec<Vector3> {
        self.gradients(system).forces
    }

    fn stress(&self, system: &AtomicConfiguration) -> Matrix3 {
        self.gradients(system).virial / system.volume()
    }
}

impl<K: PairPotential + Cutoff> Pairwise<K> {
    fn gradients(&self, system: &AtomicConfiguration) -> PairGradients {
        let mut grads = PairGradients::new(system.len());
        for p in image_pairs(system, self.kernel.cutoff()) {
            grads.add(p.i, p.j, &p.delta, p.dist, self.kernel.pair_gradient(p.dist));
        }
        grads
    }
}

/// Harmonic bond, 𝑈(𝑟) = ½𝑘(𝑟 − 𝑟₀)², truncated at the cutoff
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(Deserialize, Serialize),
    serde(deny_unknown_fields)
)]
pub struct Harmonic {
    #[cfg_attr(feature = "serde", serde(rename = "k"))]
    spring_constant: f64,
    #[cfg_attr(feature = "serde", serde(rename = "r0"))]
    equilibrium: f64,
    cutoff: f64,
}

impl Harmonic {
    pub fn new(spring_constant: f64, equilibrium: f64, cutoff: f64) -> Self {
        Self {
            spring_constant,
            equilibrium,
            cutoff,
        }
    }
}

impl PairPotential for Harmonic {
    #[inline]
    fn pair_energy(&self, dist: f64) -> f64 {
        0.5 * self.spring_constant * (dist - self.equilibrium).powi(2)
    }
    #[inline]
    fn pair_gradient(&self, dist: f64) -> f64 {
        self.spring_constant * (dist - self.equilibrium)
    }
}

impl Cutoff for Harmonic {
    fn cutoff(&self) -> f64 {
        self.cutoff
    }
}

impl Info for Harmonic {
    fn short_name(&self) -> Option<&'static str> {
        Some("harmonic")
    }
    fn long_name(&self) -> Option<&'static str> {
        Some("Harmonic pair potential")
    }
}

/// Attractive inverse-sixth-power tail, 𝑈(𝑟) = 𝐴(𝑟₀/𝑟)⁶, truncated at the cutoff
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(Deserialize, Serialize),
    serde(deny_unknown_fields)
)]
pub struct PowerSix {
    #[cfg_attr(feature = "serde", serde(rename = "a"))]
    amplitude: f64,
    #[cfg_attr(feature = "serde", serde(rename = "r0"))]
    scale: f64,
    cutoff: f64,
}

impl PowerSix {
    pub fn new(amplitude: f64, scale: f64, cutoff: f64) -> Self {
        Self {
            amplitude,
            scale,
            cutoff,
        }
    }
}

impl PairPotential for PowerSix {
    #[inline]
    fn pair_energy(&self, dist: f64) -> f64 {
        self.amplitude * (self.scale / dist).powi(6)
    }
    #[inline]
    fn pair_gradient(&self, dist: f64) -> f64 {
        -6.0 * self.amplitude * self.scale.powi(6) / dist.powi(7)
    }
}

impl Cutoff for PowerSix {
    fn cutoff(&self) -> f64 {
        self.cutoff
    }
}

impl Info for PowerSix {
    fn short_name(&self) -> Option<&'static str> {
        Some("r6")
    }
    fn long_name(&self) -> Option<&'static str> {
        Some("Inverse-sixth-power pair potential")
    }
}

/// Truncated Lennard-Jones potential with an optional energy shift that
/// moves 𝑈(𝑟ᶜ) to zero, removing the discontinuity at the cutoff.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(Deserialize, Serialize),
    serde(deny_unknown_fields)
)]
pub struct LennardJonesCut {
    #[cfg_attr(feature = "serde", serde(rename = "eps"))]
    epsilon: f64,
    sigma: f64,
    cutoff: f64,
    energy_shift: f64,
}

impl LennardJonesCut {
    pub fn new(epsilon: f64, sigma: f64, cutoff: f64, shift: bool) -> Self {
        let mut lj = Self {
            epsilon,
            sigma,
            cutoff,
            energy_shift: 0.0,
        };
        if shift {
            lj.energy_shift = lj.unshifted(cutoff);
        }
        lj
    }

    fn unshifted(&self, dist: f64) -> f64 {
        let x = (self.sigma / dist).powi(6);
        4.0 * self.epsilon * (x * x - x)
    }
}

impl PairPotential for LennardJonesCut {
    #[inline]
    fn pair_energy(&self, dist: f64) -> f64 {
        self.unshifted(dist) - self.energy_shift
    }
    #[inline]
    fn pair_gradient(&self, dist: f64) -> f64 {
        let x = (self.sigma / dist).powi(6);
        4.0 * self.epsilon * (6.0 * x - 12.0 * x * x) / dist
    }
}

impl Cutoff for LennardJonesCut {
    fn cutoff(&self) -> f64 {
        self.cutoff
    }
}

impl Info for LennardJonesCut {
    fn short_name(&self) -> Option<&'static str> {
        Some("ljcut")
    }
    fn long_name(&self) -> Option<&'static str> {
        Some("Truncated Lennard-Jones potential")
    }
    fn citation(&self) -> Option<&'static str> {
        Some("doi:10/cqhgm7")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    /// analytic kernel gradients must agree with the default central difference
    fn assert_gradient_consistent<K: PairPotential>(kernel: &K, dists: &[f64]) {
        struct Fd<'a, K>(&'a K);
        impl<K: PairPotential> Debug for Fd<'_, K> {
            fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
                write!(f, "Fd")
            }
        }
        impl<K: PairPotential> PairPotential for Fd<'_, K> {
            fn pair_energy(&self, dist: f64) -> f64 {
                self.0.pair_energy(dist)
            }
        }
        for &r in dists {
            assert_relative_eq!(
                kernel.pair_gradient(r),
                Fd(kernel).pair_gradient(r),
                epsilon = 1e-6,
                max_relative = 1e-5
            );
        }
    }

    #[test]
    fn harmonic() {
        let harmonic = Harmonic::new(1.0, 1.0, 1.5);
        assert_relative_eq!(harmonic.pair_energy(1.0), 0.0);
        assert_relative_eq!(harmonic.pair_energy(1.2), 0.02);
        assert_gradient_consistent(&harmonic, &[0.7, 1.0, 1.3]);
    }

    #[test]
    fn power_six() {
        let r6 = PowerSix::new(1.0, 1.0, 5.0);
        assert_relative_eq!(r6.pair_energy(1.0), 1.0);
        assert_relative_eq!(r6.pair_energy(2.0), 1.0 / 64.0);
        assert_gradient_consistent(&r6, &[0.9, 1.5, 3.0]);
    }

    #[test]
    fn lennard_jones_minimum_and_shift() {
        let lj = LennardJonesCut::new(10.2, 2.28, 5.0, false);
        let r_min = 2.0_f64.powf(1.0 / 6.0) * 2.28;
        assert_relative_eq!(lj.pair_energy(r_min), -10.2, epsilon = 1e-12);
        assert_relative_eq!(lj.pair_gradient(r_min), 0.0, epsilon = 1e-10);
        assert_gradient_consistent(&lj, &[2.0, r_min, 4.0]);

        let shifted = LennardJonesCut::new(10.2, 2.28, 5.0, true);
        assert_relative_eq!(shifted.pair_energy(5.0), 0.0, epsilon = 1e-14);
        // the shift must not change the gradient
        assert_relative_eq!(shifted.pair_gradient(3.0), lj.pair_gradient(3.0));
    }

    #[test]
    fn perfect_lattice_has_no_net_forces() {
        use crate::structure::face_centered_cubic;
        let model = Pairwise::new(Harmonic::new(1.0, 1.0, 1.5));
        let crystal = face_centered_cubic("He", 1.0, [2, 2, 2]);
        for force in model.forces(&crystal) {
            assert!(force.norm() < 1e-10);
        }
    }

    #[test]
    fn dimer_forces_point_along_the_bond() {
        use crate::structure::AtomicConfiguration;
        use nalgebra::Matrix3;
        let system = AtomicConfiguration::new(
            vec!["He".into(), "He".into()],
            vec![Vector3::zeros(), Vector3::new(2.0, 0.0, 0.0)],
            Matrix3::identity(),
            false,
        );
        let model = Pairwise::new(LennardJonesCut::new(10.2, 2.28, 5.0, true));
        let forces = model.forces(&system);
        assert!((forces[0] + forces[1]).norm() < 1e-12);
        // r < r_min: repulsive, atoms pushed apart
        assert!(forces[0].x < 0.0);
        assert!(forces[1].x > 0.0);
    }
}
