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

//! Periodic-image pair enumeration.
//!
//! Every physical bond within a cutoff is listed exactly once, including
//! bonds between an atom and its own periodic images. Atoms need not be
//! wrapped into the cell; the image search is recentered per pair around the
//! nearest image.

use crate::structure::AtomicConfiguration;
use crate::Vector3;
use itertools::iproduct;

/// One bond between atom `i` and an image of atom `j`.
///
/// `delta` points from `i` to the image of `j` and `dist` is its length.
/// Canonical enumeration: `i < j` with any image shift, or `i == j` with a
/// lexicographically positive shift, so each physical bond appears once.
#[derive(Clone, Copy, Debug)]
pub struct ImagePair {
    pub i: usize,
    pub j: usize,
    pub delta: Vector3,
    pub dist: f64,
}

/// All bonds shorter than `cutoff`, each physical bond exactly once
pub fn image_pairs(system: &AtomicConfiguration, cutoff: f64) -> Vec<ImagePair> {
    let mut pairs = Vec::new();
    let positions = system.positions();

    if !system.periodic() {
        for i in 0..positions.len() {
            for j in (i + 1)..positions.len() {
                let delta = positions[j] - positions[i];
                let dist = delta.norm();
                if dist > 0.0 && dist < cutoff {
                    pairs.push(ImagePair { i, j, delta, dist });
                }
            }
        }
        return pairs;
    }

    let cell = system.cell();
    let inverse = cell
        .try_inverse()
        .expect("periodic cell must be invertible");
    let reach = image_reach(system, cutoff);

    for i in 0..positions.len() {
        for j in i..positions.len() {
            let raw = positions[j] - positions[i];
            // recenter the image search on the nearest image of j
            let frac = inverse * raw;
            let base = Vector3::new(-frac.x.round(), -frac.y.round(), -frac.z.round());
            for (sx, sy, sz) in iproduct!(
                -reach[0]..=reach[0],
                -reach[1]..=reach[1],
                -reach[2]..=reach[2]
            ) {
                let shift = base + Vector3::new(sx as f64, sy as f64, sz as f64);
                if i == j && !lexicographically_positive(&shift) {
                    continue;
                }
                let delta = raw + cell * shift;
                let dist = delta.norm();
                if dist > 0.0 && dist < cutoff {
                    pairs.push(ImagePair { i, j, delta, dist });
                }
            }
        }
    }
    pairs
}

/// Full per-atom adjacency, mirroring the canonical pair list.
///
/// Entry `(j, delta, dist)` on atom `i`'s list means an image of `j` sits at
/// `positions[i] + delta`. Self-image bonds appear twice on the owning
/// atom's list, once per direction.
pub fn adjacency(
    system: &AtomicConfiguration,
    pairs: &[ImagePair],
) -> Vec<Vec<(usize, Vector3, f64)>> {
    let mut lists = vec![Vec::new(); system.len()];
    for p in pairs {
        lists[p.i].push((p.j, p.delta, p.dist));
        lists[p.j].push((p.i, -p.delta, p.dist));
    }
    lists
}

/// Number of image cells to search along each axis, from the perpendicular
/// cell heights. One extra layer absorbs the per-pair recentering offset.
fn image_reach(system: &AtomicConfiguration, cutoff: f64) -> [i32; 3] {
    let cell = system.cell();
    let volume = system.volume();
    let mut reach = [0i32; 3];
    for (k, r) in reach.iter_mut().enumerate() {
        let cross = cell
            .column((k + 1) % 3)
            .into_owned()
            .cross(&cell.column((k + 2) % 3).into_owned());
        let height = volume / cross.norm();
        *r = (cutoff / height).ceil() as i32 + 1;
    }
    reach
}

fn lexicographically_positive(shift: &Vector3) -> bool {
    if shift.x != 0.0 {
        return shift.x > 0.0;
    }
    if shift.y != 0.0 {
        return shift.y > 0.0;
    }
    shift.z > 0.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::structure::{face_centered_cubic, simple_cubic};
    use approx::assert_relative_eq;

    #[test]
    fn fcc_coordination() {
        // 12 nearest neighbors in fcc; 32 atoms, each bond counted once
        let a = face_centered_cubic("Cu", 3.615, [2, 2, 2]);
        let nn = 3.615 / 2.0_f64.sqrt();
        let pairs = image_pairs(&a, nn * 1.1);
        assert_eq!(pairs.len(), 32 * 12 / 2);
        for p in &pairs {
            assert_relative_eq!(p.dist, nn, epsilon = 1e-12);
        }
    }

    #[test]
    fn single_atom_sees_its_own_images() {
        // one sc atom has 6 first-shell images; each bond once => 3 pairs
        let a = simple_cubic("Fe", 2.0, [1, 1, 1]);
        let pairs = image_pairs(&a, 2.1);
        assert_eq!(pairs.len(), 3);
        for p in &pairs {
            assert_eq!(p.i, p.j);
            assert_relative_eq!(p.dist, 2.0, epsilon = 1e-12);
        }
        // ...but the adjacency list shows all 6 directed entries
        let adj = adjacency(&a, &pairs);
        assert_eq!(adj[0].len(), 6);
    }

    #[test]
    fn unwrapped_positions_are_handled() {
        // translating one atom by a full lattice vector must not change the bond list
        let mut a = face_centered_cubic("Cu", 3.615, [2, 2, 2]);
        let n_before = image_pairs(&a, 4.0).len();
        a.positions_mut()[5] += Vector3::new(2.0 * 3.615, 0.0, 0.0);
        assert_eq!(image_pairs(&a, 4.0).len(), n_before);
    }

    #[test]
    fn cutoff_larger_than_cell() {
        // sc lattice, cutoff spanning two cells: shells at a, a√2, a√3, 2a...
        let a = simple_cubic("Fe", 2.0, [1, 1, 1]);
        let pairs = image_pairs(&a, 4.001);
        // 6 + 12 + 8 + 6 images, halved
        assert_eq!(pairs.len(), (6 + 12 + 8 + 6) / 2);
    }
}
