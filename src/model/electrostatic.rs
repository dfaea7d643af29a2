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

//! Charge-dependent models: direct Coulomb summation and two charge-smearing
//! variants (Gaussian and Slater clouds). These are the models exercising
//! the charge-derivative check; all expose ∂E/∂qᵢ analytically.
//!
//! Energies are in eV with charges in elementary charges and distances in
//! ångström; the conversion is [`COULOMB_PREFACTOR`].

use super::neighbor::image_pairs;
use super::{InteractionModel, PairGradients};
use crate::structure::AtomicConfiguration;
use crate::{Cutoff, Info, Matrix3, Vector3, COULOMB_PREFACTOR};
use libm::erf;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Direct summation of the bare Coulomb interaction over all periodic-image
/// pairs within the cutoff.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(Deserialize, Serialize),
    serde(deny_unknown_fields)
)]
pub struct DirectCoulomb {
    cutoff: f64,
}

impl DirectCoulomb {
    pub fn new(cutoff: f64) -> Self {
        Self { cutoff }
    }
}

impl Default for DirectCoulomb {
    fn default() -> Self {
        Self::new(10.0)
    }
}

impl Cutoff for DirectCoulomb {
    fn cutoff(&self) -> f64 {
        self.cutoff
    }
}

impl Info for DirectCoulomb {
    fn short_name(&self) -> Option<&'static str> {
        Some("direct-coulomb")
    }
    fn long_name(&self) -> Option<&'static str> {
        Some("Direct Coulomb summation")
    }
}

impl InteractionModel for DirectCoulomb {
    fn energy(&self, system: &AtomicConfiguration) -> f64 {
        let q = system.charges();
        image_pairs(system, self.cutoff)
            .iter()
            .map(|p| COULOMB_PREFACTOR * q[p.i] * q[p.j] / p.dist)
            .sum()
    }

    fn forces(&self, system: &AtomicConfiguration) -> Vec<Vector3> {
        self.gradients(system).forces
    }

    fn stress(&self, system: &AtomicConfiguration) -> Matrix3 {
        self.gradients(system).virial / system.volume()
    }

    fn charge_gradient(&self, system: &AtomicConfiguration) -> Option<Vec<f64>> {
        let q = system.charges();
        let mut grad = vec![0.0; system.len()];
        for p in image_pairs(system, self.cutoff) {
            grad[p.i] += COULOMB_PREFACTOR * q[p.j] / p.dist;
            grad[p.j] += COULOMB_PREFACTOR * q[p.i] / p.dist;
        }
        Some(grad)
    }
}

impl DirectCoulomb {
    fn gradients(&self, system: &AtomicConfiguration) -> PairGradients {
        let q = system.charges();
        let mut grads = PairGradients::new(system.len());
        for p in image_pairs(system, self.cutoff) {
            let de_dr = -COULOMB_PREFACTOR * q[p.i] * q[p.j] / p.dist.powi(2);
            grads.add(p.i, p.j, &p.delta, p.dist, de_dr);
        }
        grads
    }
}

/// Coulomb interaction between Gaussian charge clouds.
///
/// The cloud width follows from the per-element Hubbard parameter through
/// the Gaussian self-energy relation σ = kₑ/(√π U), and the onsite energy
/// ½Uq² is included. Species without a parameter interact as point charges.
#[derive(Clone, Debug)]
pub struct GaussianCharges {
    elements: Vec<String>,
    hubbard_u: Vec<f64>,
    cutoff: f64,
}

impl GaussianCharges {
    pub fn new(elements: &[(&str, f64)], cutoff: f64) -> Self {
        Self {
            elements: elements.iter().map(|(s, _)| s.to_string()).collect(),
            hubbard_u: elements.iter().map(|&(_, u)| u).collect(),
            cutoff,
        }
    }

    /// Per-atom (hubbard U, squared cloud width); `None` for point charges
    fn atom_params(&self, system: &AtomicConfiguration) -> Vec<Option<(f64, f64)>> {
        system
            .species()
            .iter()
            .map(|symbol| {
                self.elements.iter().position(|e| e == symbol).map(|idx| {
                    let u = self.hubbard_u[idx];
                    let width = COULOMB_PREFACTOR / (PI.sqrt() * u);
                    (u, width * width)
                })
            })
            .collect()
    }

    /// Inverse smearing length for a pair; `None` for two point charges
    fn gamma(a: &Option<(f64, f64)>, b: &Option<(f64, f64)>) -> Option<f64> {
        let squared = a.map_or(0.0, |(_, w2)| w2) + b.map_or(0.0, |(_, w2)| w2);
        (squared > 0.0).then(|| 1.0 / (2.0 * squared).sqrt())
    }

    /// erf(γr)/r and its radial derivative
    fn kernel(gamma: Option<f64>, dist: f64) -> (f64, f64) {
        match gamma {
            None => (1.0 / dist, -1.0 / dist.powi(2)),
            Some(gamma) => {
                let e = erf(gamma * dist);
                let gauss = 2.0 * gamma / PI.sqrt() * (-(gamma * dist).powi(2)).exp();
                (e / dist, gauss / dist - e / dist.powi(2))
            }
        }
    }
}

impl Cutoff for GaussianCharges {
    fn cutoff(&self) -> f64 {
        self.cutoff
    }
}

impl Info for GaussianCharges {
    fn short_name(&self) -> Option<&'static str> {
        Some("gaussian-charges")
    }
    fn long_name(&self) -> Option<&'static str> {
        Some("Coulomb interaction between Gaussian charge clouds")
    }
}

impl InteractionModel for GaussianCharges {
    fn energy(&self, system: &AtomicConfiguration) -> f64 {
        let q = system.charges();
        let params = self.atom_params(system);
        let onsite: f64 = q
            .iter()
            .zip(&params)
            .map(|(q, par)| 0.5 * par.map_or(0.0, |(u, _)| u) * q * q)
            .sum();
        let pairwise: f64 = image_pairs(system, self.cutoff)
            .iter()
            .map(|p| {
                let (v, _) = Self::kernel(Self::gamma(&params[p.i], &params[p.j]), p.dist);
                COULOMB_PREFACTOR * q[p.i] * q[p.j] * v
            })
            .sum();
        onsite + pairwise
    }

    fn forces(&self, system: &AtomicConfiguration) -> Vec<Vector3> {
        self.gradients(system).forces
    }

    fn stress(&self, system: &AtomicConfiguration) -> Matrix3 {
        self.gradients(system).virial / system.volume()
    }

    fn charge_gradient(&self, system: &AtomicConfiguration) -> Option<Vec<f64>> {
        let q = system.charges();
        let params = self.atom_params(system);
        let mut grad: Vec<f64> = q
            .iter()
            .zip(&params)
            .map(|(q, par)| par.map_or(0.0, |(u, _)| u) * q)
            .collect();
        for p in image_pairs(system, self.cutoff) {
            let (v, _) = Self::kernel(Self::gamma(&params[p.i], &params[p.j]), p.dist);
            grad[p.i] += COULOMB_PREFACTOR * q[p.j] * v;
            grad[p.j] += COULOMB_PREFACTOR * q[p.i] * v;
        }
        Some(grad)
    }
}

impl GaussianCharges {
    fn gradients(&self, system: &AtomicConfiguration) -> PairGradients {
        let q = system.charges();
        let params = self.atom_params(system);
        let mut grads = PairGradients::new(system.len());
        for p in image_pairs(system, self.cutoff) {
            let (_, dv) = Self::kernel(Self::gamma(&params[p.i], &params[p.j]), p.dist);
            grads.add(
                p.i,
                p.j,
                &p.delta,
                p.dist,
                COULOMB_PREFACTOR * q[p.i] * q[p.j] * dv,
            );
        }
        grads
    }
}

/// Coulomb interaction between 1s Slater charge clouds with optional point
/// cores.
///
/// Each parameterized element carries a Hubbard U, fixing the Slater
/// exponent τ = 16U/(5kₑ), and an effective core charge Z. The ion's charge
/// splits into a point core Z and a Slater cloud carrying q − Z; the bare
/// Coulomb term is corrected by the point-cloud and cloud-cloud overlap
/// integrals. Equal exponents are handled by a dedicated branch, which is
/// also exercised from two *different* species with identical U.
#[derive(Clone, Debug)]
pub struct SlaterCharges {
    elements: Vec<String>,
    hubbard_u: Vec<f64>,
    core_charge: Vec<f64>,
    cutoff: f64,
}

/// (Slater exponent, core charge, hubbard U) of one atom, `None` for point charges
type SlaterAtom = Option<(f64, f64, f64)>;

impl SlaterCharges {
    pub fn new(elements: &[(&str, f64, f64)], cutoff: f64) -> Self {
        Self {
            elements: elements.iter().map(|(s, ..)| s.to_string()).collect(),
            hubbard_u: elements.iter().map(|&(_, u, _)| u).collect(),
            core_charge: elements.iter().map(|&(.., z)| z).collect(),
            cutoff,
        }
    }

    fn atom_params(&self, system: &AtomicConfiguration) -> Vec<SlaterAtom> {
        system
            .species()
            .iter()
            .map(|symbol| {
                self.elements.iter().position(|e| e == symbol).map(|idx| {
                    let u = self.hubbard_u[idx];
                    let tau = 16.0 * u / (5.0 * COULOMB_PREFACTOR);
                    (tau, self.core_charge[idx], u)
                })
            })
            .collect()
    }

    /// Correction to the bare Coulomb pair energy (divided by kₑ) and its
    /// radial derivative.
    fn correction(a: &SlaterAtom, b: &SlaterAtom, qi: f64, qj: f64, dist: f64) -> (f64, f64) {
        match (a, b) {
            (Some((ti, zi, _)), Some((tj, zj, _))) => {
                let (s, ds) = slater_overlap(*ti, *tj, dist);
                let value = -zi * (qj - zj) * slater_h(*tj, dist)
                    - zj * (qi - zi) * slater_h(*ti, dist)
                    - (qi - zi) * (qj - zj) * s;
                let gradient = -zi * (qj - zj) * slater_h_gradient(*tj, dist)
                    - zj * (qi - zi) * slater_h_gradient(*ti, dist)
                    - (qi - zi) * (qj - zj) * ds;
                (value, gradient)
            }
            (Some((ti, zi, _)), None) => (
                -qj * (qi - zi) * slater_h(*ti, dist),
                -qj * (qi - zi) * slater_h_gradient(*ti, dist),
            ),
            (None, Some((tj, zj, _))) => (
                -qi * (qj - zj) * slater_h(*tj, dist),
                -qi * (qj - zj) * slater_h_gradient(*tj, dist),
            ),
            (None, None) => (0.0, 0.0),
        }
    }

    /// ∂/∂qᵢ of the pair correction (divided by kₑ)
    fn correction_charge_gradient(a: &SlaterAtom, b: &SlaterAtom, qj: f64, dist: f64) -> f64 {
        match (a, b) {
            (Some((ti, _, _)), Some((tj, zj, _))) => {
                let (s, _) = slater_overlap(*ti, *tj, dist);
                -zj * slater_h(*ti, dist) - (qj - zj) * s
            }
            (Some((ti, _, _)), None) => -qj * slater_h(*ti, dist),
            (None, Some((tj, zj, _))) => -(qj - zj) * slater_h(*tj, dist),
            (None, None) => 0.0,
        }
    }
}

impl Cutoff for SlaterCharges {
    fn cutoff(&self) -> f64 {
        self.cutoff
    }
}

impl Info for SlaterCharges {
    fn short_name(&self) -> Option<&'static str> {
        Some("slater-charges")
    }
    fn long_name(&self) -> Option<&'static str> {
        Some("Coulomb interaction between Slater charge clouds")
    }
    fn citation(&self) -> Option<&'static str> {
        Some("doi:10.1103/PhysRevB.58.7260")
    }
}

impl InteractionModel for SlaterCharges {
    fn energy(&self, system: &AtomicConfiguration) -> f64 {
        let q = system.charges();
        let params = self.atom_params(system);
        let onsite: f64 = q
            .iter()
            .zip(&params)
            .map(|(q, par)| 0.5 * par.map_or(0.0, |(.., u)| u) * q * q)
            .sum();
        let pairwise: f64 = image_pairs(system, self.cutoff)
            .iter()
            .map(|p| {
                let (corr, _) =
                    Self::correction(&params[p.i], &params[p.j], q[p.i], q[p.j], p.dist);
                COULOMB_PREFACTOR * (q[p.i] * q[p.j] / p.dist + corr)
            })
            .sum();
        onsite + pairwise
    }

    fn forces(&self, system: &AtomicConfiguration) -> Vec<Vector3> {
        self.gradients(system).forces
    }

    fn stress(&self, system: &AtomicConfiguration) -> Matrix3 {
        self.gradients(system).virial / system.volume()
    }

    fn charge_gradient(&self, system: &AtomicConfiguration) -> Option<Vec<f64>> {
        let q = system.charges();
        let params = self.atom_params(system);
        let mut grad: Vec<f64> = q
            .iter()
            .zip(&params)
            .map(|(q, par)| par.map_or(0.0, |(.., u)| u) * q)
            .collect();
        for p in image_pairs(system, self.cutoff) {
            grad[p.i] += COULOMB_PREFACTOR
                * (q[p.j] / p.dist
                    + Self::correction_charge_gradient(&params[p.i], &params[p.j], q[p.j], p.dist));
            grad[p.j] += COULOMB_PREFACTOR
                * (q[p.i] / p.dist
                    + Self::correction_charge_gradient(&params[p.j], &params[p.i], q[p.i], p.dist));
        }
        Some(grad)
    }
}

impl SlaterCharges {
    fn gradients(&self, system: &AtomicConfiguration) -> PairGradients {
        let q = system.charges();
        let params = self.atom_params(system);
        let mut grads = PairGradients::new(system.len());
        for p in image_pairs(system, self.cutoff) {
            let (_, dcorr) = Self::correction(&params[p.i], &params[p.j], q[p.i], q[p.j], p.dist);
            let de_dr = COULOMB_PREFACTOR * (-q[p.i] * q[p.j] / p.dist.powi(2) + dcorr);
            grads.add(p.i, p.j, &p.delta, p.dist, de_dr);
        }
        grads
    }
}

/// Potential correction of a Slater cloud seen by a point charge,
/// −(1/r + τ/2)e^(−τr), with sign folded into the caller
fn slater_h(tau: f64, dist: f64) -> f64 {
    (-tau * dist).exp() * (1.0 / dist + tau / 2.0)
}

fn slater_h_gradient(tau: f64, dist: f64) -> f64 {
    (-tau * dist).exp() * (-tau / dist - tau * tau / 2.0 - 1.0 / dist.powi(2))
}

/// Two-center Slater overlap term s(τₐ,τᵦ,r) and its radial derivative;
/// the cloud-cloud interaction is 1/r − s. Follows Elstner et al.,
/// Phys. Rev. B 58, 7260 (1998), appendix.
fn slater_overlap(tau_a: f64, tau_b: f64, dist: f64) -> (f64, f64) {
    if (tau_a - tau_b).abs() < 1e-6 * (tau_a + tau_b) {
        let tau = 0.5 * (tau_a + tau_b);
        let poly = 1.0 / dist
            + 11.0 * tau / 16.0
            + 3.0 * tau.powi(2) * dist / 16.0
            + tau.powi(3) * dist.powi(2) / 48.0;
        let poly_gradient =
            -1.0 / dist.powi(2) + 3.0 * tau.powi(2) / 16.0 + tau.powi(3) * dist / 24.0;
        let damp = (-tau * dist).exp();
        (damp * poly, damp * (poly_gradient - tau * poly))
    } else {
        let half = |ta: f64, tb: f64| {
            let denom = ta * ta - tb * tb;
            let constant = ta * tb.powi(4) / (2.0 * denom * denom);
            let over_r = (tb.powi(6) - 3.0 * ta * ta * tb.powi(4)) / denom.powi(3);
            let damp = (-ta * dist).exp();
            let value = damp * (constant - over_r / dist);
            let gradient = damp * (-ta * (constant - over_r / dist) + over_r / dist.powi(2));
            (value, gradient)
        };
        let (va, ga) = half(tau_a, tau_b);
        let (vb, gb) = half(tau_b, tau_a);
        (va + vb, ga + gb)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn slater_h_gradient_matches_finite_difference() {
        let h = 1e-6;
        for &(tau, r) in &[(0.22, 2.5), (0.5, 1.0), (1.3, 4.0)] {
            let fd = (slater_h(tau, r + h) - slater_h(tau, r - h)) / (2.0 * h);
            assert_relative_eq!(slater_h_gradient(tau, r), fd, epsilon = 1e-8, max_relative = 1e-6);
        }
    }

    #[test]
    fn slater_overlap_gradient_matches_finite_difference() {
        let h = 1e-6;
        for &(ta, tb, r) in &[
            (0.22, 0.22, 2.5), // equal branch
            (0.22, 0.11, 2.5), // unequal branch
            (0.9, 0.3, 1.2),
            (0.3, 0.9, 4.8),
        ] {
            let (_, gradient) = slater_overlap(ta, tb, r);
            let above = slater_overlap(ta, tb, r + h).0;
            let below = slater_overlap(ta, tb, r - h).0;
            let fd = (above - below) / (2.0 * h);
            assert_relative_eq!(gradient, fd, epsilon = 1e-8, max_relative = 1e-5);
        }
    }

    #[test]
    fn slater_overlap_branches_are_continuous() {
        let tau = 0.3;
        let (equal, _) = slater_overlap(tau, tau, 2.0);
        let (near, _) = slater_overlap(tau, tau * (1.0 + 1e-4), 2.0);
        assert_relative_eq!(equal, near, max_relative = 1e-3);
    }

    #[test]
    fn slater_onsite_limit() {
        // 1/r − s(τ,τ,r) → 5τ/16 as r → 0
        let tau = 0.5;
        let r = 1e-4;
        let (s, _) = slater_overlap(tau, tau, r);
        assert_relative_eq!(1.0 / r - s, 5.0 * tau / 16.0, max_relative = 1e-3);
    }

    #[test]
    fn gaussian_kernel_reduces_to_coulomb_for_points() {
        let (v, dv) = GaussianCharges::kernel(None, 3.0);
        assert_relative_eq!(v, 1.0 / 3.0);
        assert_relative_eq!(dv, -1.0 / 9.0);
        // wide separation: smeared kernel approaches the bare one
        let (v, _) = GaussianCharges::kernel(Some(2.0), 5.0);
        assert_relative_eq!(v, 1.0 / 5.0, max_relative = 1e-10);
    }

    #[test]
    fn gaussian_kernel_uses_the_error_function() {
        // erf(0.5) = 0.5204998778...
        let (v, _) = GaussianCharges::kernel(Some(1.0), 0.5);
        assert_relative_eq!(v, 0.5204998778130465 / 0.5, epsilon = 1e-12);
        // derivative at the origin side: 2γ/√π e^(-γ²r²)/r - erf(γr)/r²
        let gamma = 0.8;
        let r = 1.25;
        let (_, dv) = GaussianCharges::kernel(Some(gamma), r);
        let gauss = 2.0 * gamma / PI.sqrt() * (-(gamma * r).powi(2)).exp();
        assert_relative_eq!(dv, gauss / r - erf(gamma * r) / (r * r), epsilon = 1e-14);
    }

    #[test]
    fn gaussian_kernel_gradient_matches_finite_difference() {
        let h = 1e-6;
        for &(gamma, r) in &[(0.05, 2.0), (0.4, 3.0), (1.5, 1.0)] {
            let (_, dv) = GaussianCharges::kernel(Some(gamma), r);
            let fd = (GaussianCharges::kernel(Some(gamma), r + h).0
                - GaussianCharges::kernel(Some(gamma), r - h).0)
                / (2.0 * h);
            assert_relative_eq!(dv, fd, epsilon = 1e-8, max_relative = 1e-6);
        }
    }

    #[test]
    fn opposite_charges_attract() {
        let mut dimer = AtomicConfiguration::new(
            vec!["Na".into(), "Cl".into()],
            vec![Vector3::zeros(), Vector3::new(3.0, 0.0, 0.0)],
            Matrix3::identity(),
            false,
        );
        dimer.set_charges(&[1.0, -1.0]);
        let model = DirectCoulomb::default();
        assert_relative_eq!(model.energy(&dimer), -COULOMB_PREFACTOR / 3.0);
        let forces = model.forces(&dimer);
        assert!(forces[0].x > 0.0); // pulled towards the anion
        let grad = model.charge_gradient(&dimer).unwrap();
        assert_relative_eq!(grad[0], -COULOMB_PREFACTOR / 3.0);
        assert_relative_eq!(grad[1], COULOMB_PREFACTOR / 3.0);
    }
}
