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

//! Second-moment tight-binding (Gupta) many-body model.
//!
//! The energy is a pairwise Born-Mayer repulsion plus an attractive
//! square-root embedding of a pairwise bond density,
//! $$ E = \sum_{i<j} A e^{-p(r_{ij}/r_0-1)} - \sum_i \sqrt{\rho_i}, \qquad
//!    \rho_i = \sum_j \chi_{ij}\, \xi^2 e^{-2q(r_{ij}/r_0-1)} $$
//! with a cosine taper to zero between `taper_start` and `cutoff`.
//!
//! The *screened* variant attenuates every bond's density contribution by an
//! environment factor χᵢⱼ = exp(−c Σₖ fᶜ(rᵢₖ) fᶜ(rⱼₖ)) built from the bond's
//! common neighbors, and is validated as a distinct model.

use super::neighbor::{adjacency, image_pairs, ImagePair};
use super::{InteractionModel, PairGradients};
use crate::structure::AtomicConfiguration;
use crate::{arithmetic_mean, geometric_mean, Cutoff, Info, Matrix3, Vector3};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Per-pair parameters of the second-moment model
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(Deserialize, Serialize),
    serde(deny_unknown_fields)
)]
pub struct GuptaParams {
    /// Repulsive prefactor (eV)
    pub a: f64,
    /// Hopping integral (eV)
    pub xi: f64,
    /// Repulsive decay
    pub p: f64,
    /// Attractive decay
    pub q: f64,
    /// First-neighbor distance (Å)
    pub r0: f64,
}

impl GuptaParams {
    /// Off-diagonal parameters: geometric mean on the energies, arithmetic
    /// mean on decays and distance
    fn mix(a: &Self, b: &Self) -> Self {
        Self {
            a: geometric_mean((a.a, b.a)),
            xi: geometric_mean((a.xi, b.xi)),
            p: arithmetic_mean((a.p, b.p)),
            q: arithmetic_mean((a.q, b.q)),
            r0: arithmetic_mean((a.r0, b.r0)),
        }
    }
}

/// Gupta/second-moment many-body potential, optionally bond-screened.
///
/// Atoms whose species are not in the parameterized set do not interact.
#[derive(Clone, Debug)]
pub struct Gupta {
    elements: Vec<String>,
    /// flattened symmetric pair-parameter matrix, row-major
    pairs: Vec<GuptaParams>,
    taper_start: f64,
    cutoff: f64,
    /// screening strength `c`; `None` for the plain model
    screening: Option<f64>,
    citation: Option<&'static str>,
}

impl Gupta {
    /// Build from per-element parameters; heteronuclear pairs are mixed
    /// with [`GuptaParams::mix`].
    pub fn new(elements: &[(&str, GuptaParams)], taper_start: f64, cutoff: f64) -> Self {
        assert!(taper_start < cutoff);
        let n = elements.len();
        let mut pairs = Vec::with_capacity(n * n);
        for i in 0..n {
            for j in 0..n {
                pairs.push(GuptaParams::mix(&elements[i].1, &elements[j].1));
            }
        }
        Self {
            elements: elements.iter().map(|(s, _)| s.to_string()).collect(),
            pairs,
            taper_start,
            cutoff,
            screening: None,
            citation: None,
        }
    }

    /// Enable the environment-dependent bond screening
    pub fn with_screening(mut self, strength: f64) -> Self {
        self.screening = Some(strength);
        self
    }

    pub fn with_citation(mut self, citation: &'static str) -> Self {
        self.citation = Some(citation);
        self
    }

    fn element_index(&self, symbol: &str) -> Option<usize> {
        self.elements.iter().position(|e| e == symbol)
    }

    fn params(&self, ei: usize, ej: usize) -> &GuptaParams {
        &self.pairs[ei * self.elements.len() + ej]
    }

    /// Cosine taper: 1 below `taper_start`, 0 above `cutoff`
    fn taper(&self, dist: f64) -> f64 {
        if dist < self.taper_start {
            1.0
        } else if dist >= self.cutoff {
            0.0
        } else {
            0.5 * (1.0 + (PI * (dist - self.taper_start) / (self.cutoff - self.taper_start)).cos())
        }
    }

    fn taper_gradient(&self, dist: f64) -> f64 {
        if dist < self.taper_start || dist >= self.cutoff {
            0.0
        } else {
            let width = self.cutoff - self.taper_start;
            -0.5 * PI / width * (PI * (dist - self.taper_start) / width).sin()
        }
    }

    fn repulsion(&self, par: &GuptaParams, dist: f64) -> f64 {
        par.a * (-par.p * (dist / par.r0 - 1.0)).exp() * self.taper(dist)
    }

    fn repulsion_gradient(&self, par: &GuptaParams, dist: f64) -> f64 {
        let bare = par.a * (-par.p * (dist / par.r0 - 1.0)).exp();
        bare * (self.taper_gradient(dist) - par.p / par.r0 * self.taper(dist))
    }

    fn bond_density(&self, par: &GuptaParams, dist: f64) -> f64 {
        par.xi.powi(2) * (-2.0 * par.q * (dist / par.r0 - 1.0)).exp() * self.taper(dist)
    }

    fn bond_density_gradient(&self, par: &GuptaParams, dist: f64) -> f64 {
        let bare = par.xi.powi(2) * (-2.0 * par.q * (dist / par.r0 - 1.0)).exp();
        bare * (self.taper_gradient(dist) - 2.0 * par.q / par.r0 * self.taper(dist))
    }

    fn workspace(&self, system: &AtomicConfiguration) -> Workspace {
        let elem: Vec<Option<usize>> = system
            .species()
            .iter()
            .map(|s| self.element_index(s))
            .collect();
        let all_pairs = image_pairs(system, self.cutoff);
        let pairs: Vec<ImagePair> = all_pairs
            .into_iter()
            .filter(|p| elem[p.i].is_some() && elem[p.j].is_some())
            .collect();
        let adj = adjacency(system, &pairs);

        let mut chi = vec![1.0; pairs.len()];
        if let Some(strength) = self.screening {
            for (chi, p) in chi.iter_mut().zip(&pairs) {
                let mut common = 0.0;
                for &(k, dk, rk) in &adj[p.i] {
                    if k == p.j && dk == p.delta {
                        continue; // the bond itself is not its own neighbor
                    }
                    let rjk = (dk - p.delta).norm();
                    common += self.taper(rk) * self.taper(rjk);
                }
                *chi = (-strength * common).exp();
            }
        }

        let mut e_rep = 0.0;
        let mut rho = vec![0.0; system.len()];
        for (p, &chi) in pairs.iter().zip(&chi) {
            let par = self.params(elem[p.i].unwrap(), elem[p.j].unwrap());
            e_rep += self.repulsion(par, p.dist);
            let phi = chi * self.bond_density(par, p.dist);
            rho[p.i] += phi;
            rho[p.j] += phi;
        }

        Workspace {
            pairs,
            elem,
            chi,
            rho,
            adj,
            e_rep,
        }
    }
}

struct Workspace {
    pairs: Vec<ImagePair>,
    elem: Vec<Option<usize>>,
    chi: Vec<f64>,
    rho: Vec<f64>,
    adj: Vec<Vec<(usize, Vector3, f64)>>,
    e_rep: f64,
}

impl Info for Gupta {
    fn short_name(&self) -> Option<&'static str> {
        match self.screening {
            Some(_) => Some("gupta-scr"),
            None => Some("gupta"),
        }
    }
    fn long_name(&self) -> Option<&'static str> {
        Some("Second-moment tight-binding potential")
    }
    fn citation(&self) -> Option<&'static str> {
        self.citation
    }
}

impl Cutoff for Gupta {
    fn cutoff(&self) -> f64 {
        self.cutoff
    }
}

impl InteractionModel for Gupta {
    fn energy(&self, system: &AtomicConfiguration) -> f64 {
        let ws = self.workspace(system);
        ws.e_rep - ws.rho.iter().map(|rho| rho.sqrt()).sum::<f64>()
    }

    fn forces(&self, system: &AtomicConfiguration) -> Vec<Vector3> {
        self.gradients(system).forces
    }

    fn stress(&self, system: &AtomicConfiguration) -> Matrix3 {
        self.gradients(system).virial / system.volume()
    }
}

impl Gupta {
    fn gradients(&self, system: &AtomicConfiguration) -> PairGradients {
        let ws = self.workspace(system);
        // dE/dρᵢ
        let g: Vec<f64> = ws
            .rho
            .iter()
            .map(|&rho| if rho > 0.0 { -0.5 / rho.sqrt() } else { 0.0 })
            .collect();

        let mut grads = PairGradients::new(system.len());
        for (p, &chi) in ws.pairs.iter().zip(&ws.chi) {
            let par = self.params(ws.elem[p.i].unwrap(), ws.elem[p.j].unwrap());
            let g_sum = g[p.i] + g[p.j];
            let de_dr = self.repulsion_gradient(par, p.dist)
                + g_sum * chi * self.bond_density_gradient(par, p.dist);
            grads.add(p.i, p.j, &p.delta, p.dist, de_dr);

            if let Some(strength) = self.screening {
                // dE/dmᵢⱼ where χ = exp(−c·m)
                let de_dm = -strength * chi * g_sum * self.bond_density(par, p.dist);
                for &(k, dk, rk) in &ws.adj[p.i] {
                    if k == p.j && dk == p.delta {
                        continue;
                    }
                    let djk = dk - p.delta;
                    let rjk = djk.norm();
                    let leg_ik = self.taper_gradient(rk) * self.taper(rjk);
                    if leg_ik != 0.0 {
                        grads.add(p.i, k, &dk, rk, de_dm * leg_ik);
                    }
                    let leg_jk = self.taper(rk) * self.taper_gradient(rjk);
                    if leg_jk != 0.0 {
                        grads.add(p.j, k, &djk, rjk, de_dm * leg_jk);
                    }
                }
            }
        }
        grads
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::structure::face_centered_cubic;
    use approx::assert_relative_eq;

    fn copper() -> Gupta {
        // Cleri & Rosato, Phys. Rev. B 48, 22 (1993)
        Gupta::new(
            &[(
                "Cu",
                GuptaParams {
                    a: 0.0855,
                    xi: 1.224,
                    p: 10.960,
                    q: 2.278,
                    r0: 2.556,
                },
            )],
            3.8,
            4.5,
        )
    }

    #[test]
    fn kernel_gradients_match_finite_differences() {
        let model = copper();
        let par = *model.params(0, 0);
        let h = 1e-6;
        for &r in &[2.2, 2.556, 3.9, 4.2] {
            let fd_rep = (model.repulsion(&par, r + h) - model.repulsion(&par, r - h)) / (2.0 * h);
            assert_relative_eq!(
                model.repulsion_gradient(&par, r),
                fd_rep,
                epsilon = 1e-7,
                max_relative = 1e-6
            );
            let fd_phi =
                (model.bond_density(&par, r + h) - model.bond_density(&par, r - h)) / (2.0 * h);
            assert_relative_eq!(
                model.bond_density_gradient(&par, r),
                fd_phi,
                epsilon = 1e-7,
                max_relative = 1e-6
            );
        }
    }

    #[test]
    fn fcc_copper_is_cohesive() {
        let model = copper();
        let crystal = face_centered_cubic("Cu", 3.615, [2, 2, 2]);
        let energy_per_atom = model.energy(&crystal) / crystal.len() as f64;
        // Cleri-Rosato copper cohesion is around -3.5 eV/atom
        assert!(energy_per_atom < -2.0 && energy_per_atom > -5.0);
    }

    #[test]
    fn perfect_lattice_has_no_net_forces() {
        let model = copper();
        let crystal = face_centered_cubic("Cu", 3.615, [2, 2, 2]);
        for f in model.forces(&crystal) {
            assert!(f.norm() < 1e-10);
        }
    }

    #[test]
    fn zero_strength_screening_matches_plain_model() {
        let plain = copper();
        let screened = copper().with_screening(0.0);
        let crystal = face_centered_cubic("Cu", 3.615, [2, 2, 2]);
        assert_relative_eq!(
            plain.energy(&crystal),
            screened.energy(&crystal),
            epsilon = 1e-12
        );
    }

    #[test]
    fn screening_weakens_bonds() {
        let plain = copper();
        let screened = copper().with_screening(0.3);
        let crystal = face_centered_cubic("Cu", 3.615, [2, 2, 2]);
        assert!(screened.energy(&crystal) > plain.energy(&crystal));
    }

    #[test]
    fn unknown_species_do_not_interact() {
        let model = copper();
        let crystal = face_centered_cubic("Xx", 3.615, [1, 1, 1]);
        assert_eq!(model.energy(&crystal), 0.0);
    }
}
