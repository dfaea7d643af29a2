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

//! Cubic crystal builders.
//!
//! Each builder replicates a conventional cubic unit cell `size` times along
//! each axis and returns a periodic [`AtomicConfiguration`] with lattice
//! vectors as cell columns. Two-species structures take their basis in
//! (A, B) order.

use super::AtomicConfiguration;
use crate::Vector3;
use itertools::iproduct;
use nalgebra::Matrix3;

/// Replicate a conventional cell given by per-site (species index, fractional position)
fn replicate(
    symbols: &[&str],
    basis: &[(usize, [f64; 3])],
    lattice_constant: f64,
    size: [usize; 3],
) -> AtomicConfiguration {
    let mut species = Vec::new();
    let mut positions = Vec::new();
    for (ix, iy, iz) in iproduct!(0..size[0], 0..size[1], 0..size[2]) {
        let origin = Vector3::new(ix as f64, iy as f64, iz as f64);
        for &(which, frac) in basis {
            species.push(symbols[which].to_string());
            positions.push(
                lattice_constant * (origin + Vector3::new(frac[0], frac[1], frac[2])),
            );
        }
    }
    let cell = Matrix3::from_diagonal(&Vector3::new(
        lattice_constant * size[0] as f64,
        lattice_constant * size[1] as f64,
        lattice_constant * size[2] as f64,
    ));
    AtomicConfiguration::new(species, positions, cell, true)
}

/// Simple cubic lattice, one atom per conventional cell
pub fn simple_cubic(symbol: &str, lattice_constant: f64, size: [usize; 3]) -> AtomicConfiguration {
    replicate(&[symbol], &[(0, [0.0, 0.0, 0.0])], lattice_constant, size)
}

/// Body-centered cubic lattice, two atoms per conventional cell
pub fn body_centered_cubic(
    symbol: &str,
    lattice_constant: f64,
    size: [usize; 3],
) -> AtomicConfiguration {
    replicate(
        &[symbol],
        &[(0, [0.0, 0.0, 0.0]), (0, [0.5, 0.5, 0.5])],
        lattice_constant,
        size,
    )
}

/// Face-centered cubic lattice, four atoms per conventional cell
pub fn face_centered_cubic(
    symbol: &str,
    lattice_constant: f64,
    size: [usize; 3],
) -> AtomicConfiguration {
    replicate(
        &[symbol],
        &[
            (0, [0.0, 0.0, 0.0]),
            (0, [0.0, 0.5, 0.5]),
            (0, [0.5, 0.0, 0.5]),
            (0, [0.5, 0.5, 0.0]),
        ],
        lattice_constant,
        size,
    )
}

/// Diamond structure (A4), eight atoms per conventional cell
pub fn diamond(symbol: &str, lattice_constant: f64, size: [usize; 3]) -> AtomicConfiguration {
    replicate(
        &[symbol],
        &[
            (0, [0.0, 0.0, 0.0]),
            (0, [0.0, 0.5, 0.5]),
            (0, [0.5, 0.0, 0.5]),
            (0, [0.5, 0.5, 0.0]),
            (0, [0.25, 0.25, 0.25]),
            (0, [0.25, 0.75, 0.75]),
            (0, [0.75, 0.25, 0.75]),
            (0, [0.75, 0.75, 0.25]),
        ],
        lattice_constant,
        size,
    )
}

/// Rock salt structure (B1), e.g. NaCl; two interpenetrating fcc lattices
pub fn rock_salt(
    symbols: [&str; 2],
    lattice_constant: f64,
    size: [usize; 3],
) -> AtomicConfiguration {
    replicate(
        &symbols,
        &[
            (0, [0.0, 0.0, 0.0]),
            (0, [0.0, 0.5, 0.5]),
            (0, [0.5, 0.0, 0.5]),
            (0, [0.5, 0.5, 0.0]),
            (1, [0.5, 0.0, 0.0]),
            (1, [0.0, 0.5, 0.0]),
            (1, [0.0, 0.0, 0.5]),
            (1, [0.5, 0.5, 0.5]),
        ],
        lattice_constant,
        size,
    )
}

/// Cesium chloride structure (B2); simple cubic A with B at the body center
pub fn cesium_chloride(
    symbols: [&str; 2],
    lattice_constant: f64,
    size: [usize; 3],
) -> AtomicConfiguration {
    replicate(
        &symbols,
        &[(0, [0.0, 0.0, 0.0]), (1, [0.5, 0.5, 0.5])],
        lattice_constant,
        size,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    /// Smallest interatomic distance using the minimum-image convention
    fn nearest_neighbor_distance(a: &AtomicConfiguration) -> f64 {
        let inv = a.cell().try_inverse().unwrap();
        let mut min = f64::INFINITY;
        for i in 0..a.len() {
            for j in (i + 1)..a.len() {
                let mut frac = inv * (a.positions()[j] - a.positions()[i]);
                frac.apply(|x| *x -= x.round());
                min = min.min((a.cell() * frac).norm());
            }
        }
        min
    }

    #[test]
    fn atom_counts() {
        assert_eq!(simple_cubic("Fe", 2.87, [2, 2, 2]).len(), 8);
        assert_eq!(body_centered_cubic("Fe", 2.87, [2, 2, 2]).len(), 16);
        assert_eq!(face_centered_cubic("Cu", 3.615, [2, 2, 2]).len(), 32);
        assert_eq!(diamond("Si", 5.43, [2, 2, 2]).len(), 64);
        assert_eq!(rock_salt(["Na", "Cl"], 5.64, [2, 2, 2]).len(), 64);
        assert_eq!(cesium_chloride(["Cu", "Ni"], 2.88, [2, 2, 2]).len(), 16);
    }

    #[test]
    fn nearest_neighbor_distances() {
        let a = face_centered_cubic("Cu", 3.615, [2, 2, 2]);
        assert_relative_eq!(
            nearest_neighbor_distance(&a),
            3.615 / 2.0_f64.sqrt(),
            epsilon = 1e-12
        );
        let a = body_centered_cubic("Fe", 2.87, [2, 2, 2]);
        assert_relative_eq!(
            nearest_neighbor_distance(&a),
            2.87 * 3.0_f64.sqrt() / 2.0,
            epsilon = 1e-12
        );
        let a = diamond("Si", 5.43, [1, 1, 1]);
        assert_relative_eq!(
            nearest_neighbor_distance(&a),
            5.43 * 3.0_f64.sqrt() / 4.0,
            epsilon = 1e-12
        );
        let a = rock_salt(["Na", "Cl"], 5.64, [2, 2, 2]);
        assert_relative_eq!(nearest_neighbor_distance(&a), 5.64 / 2.0, epsilon = 1e-12);
    }

    #[test]
    fn rock_salt_alternates_species() {
        let a = rock_salt(["Na", "Cl"], 5.64, [1, 1, 1]);
        assert_eq!(a.species().iter().filter(|s| *s == "Na").count(), 4);
        assert_eq!(a.species().iter().filter(|s| *s == "Cl").count(), 4);
    }
}
