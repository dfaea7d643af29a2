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

//! Synthetic structure generators: random packed solids and charge
//! decoration of existing configurations.

use super::AtomicConfiguration;
use crate::{Error, Vector3};
use nalgebra::Matrix3;
use physical_constants::AVOGADRO_CONSTANT;
use rand::Rng;

/// cm³ → Å³
const CUBIC_CM_TO_CUBIC_ANGSTROM: f64 = 1.0e24;

/// Random solid with the given species multiset at a target mass density.
///
/// Atoms are placed at independent uniform-random fractional coordinates in
/// a periodic unit cube, then the cubic cell is stretched (atoms following
/// affinely) so that the mass density equals `density` in g/cm³. The
/// resulting density is exact to floating-point precision.
pub fn random_solid<R: Rng>(
    species_counts: &[(&str, usize)],
    density: f64,
    rng: &mut R,
) -> Result<AtomicConfiguration, Error> {
    let mut species = Vec::new();
    for &(symbol, count) in species_counts {
        species.extend(std::iter::repeat(symbol.to_string()).take(count));
    }
    if species.is_empty() {
        return Err(Error::EmptyStructure);
    }
    let positions = (0..species.len())
        .map(|_| Vector3::new(rng.gen::<f64>(), rng.gen::<f64>(), rng.gen::<f64>()))
        .collect();

    let mut solid = AtomicConfiguration::new(species, positions, Matrix3::identity(), true);
    let mass = solid.total_mass()?; // in u, i.e. g/mol
    let side = (CUBIC_CM_TO_CUBIC_ANGSTROM * mass / (density * AVOGADRO_CONSTANT)).cbrt();
    solid.set_cell(Matrix3::identity() * side, true);
    Ok(solid)
}

/// Charge-setting capability of a structure.
///
/// Richer structure types may override `set_initial_charges`; the provided
/// method forwards to the plain `set_charges`, so the generator works with
/// either capability.
pub trait AssignCharges {
    fn species(&self) -> &[String];
    fn set_charges(&mut self, charges: &[f64]);
    fn set_initial_charges(&mut self, charges: &[f64]) {
        self.set_charges(charges);
    }
}

impl AssignCharges for AtomicConfiguration {
    fn species(&self) -> &[String] {
        AtomicConfiguration::species(self)
    }
    fn set_charges(&mut self, charges: &[f64]) {
        AtomicConfiguration::set_charges(self, charges);
    }
}

/// Set every atom's charge from a species → charge mapping.
///
/// Species absent from the mapping default to zero charge.
pub fn assign_charges<C: AssignCharges + ?Sized>(structure: &mut C, charges: &[(&str, f64)]) {
    let per_atom: Vec<f64> = structure
        .species()
        .iter()
        .map(|symbol| {
            charges
                .iter()
                .find(|(s, _)| s == symbol)
                .map(|&(_, q)| q)
                .unwrap_or(0.0)
        })
        .collect();
    structure.set_initial_charges(&per_atom);
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn density_is_exact() {
        let mut rng = StdRng::seed_from_u64(42);
        for &(counts, density) in &[
            (&[("Na", 50), ("Cl", 50)][..], 2.16),
            (&[("Cu", 32), ("Ni", 32)][..], 8.9),
            (&[("He", 1)][..], 0.15),
        ] {
            let solid = random_solid(counts, density, &mut rng).unwrap();
            let mass = solid.total_mass().unwrap();
            let actual = mass / (solid.volume() * AVOGADRO_CONSTANT) * CUBIC_CM_TO_CUBIC_ANGSTROM;
            assert_relative_eq!(actual, density, epsilon = 1e-12);
        }
    }

    #[test]
    fn atom_multiset_is_respected() {
        let mut rng = StdRng::seed_from_u64(0);
        let solid = random_solid(&[("C", 50), ("H", 10)], 3.0, &mut rng).unwrap();
        assert_eq!(solid.len(), 60);
        assert_eq!(solid.species().iter().filter(|s| *s == "C").count(), 50);
        assert!(solid.periodic());
    }

    #[test]
    fn empty_structure_is_an_error() {
        let mut rng = StdRng::seed_from_u64(0);
        assert!(random_solid(&[], 1.0, &mut rng).is_err());
        assert!(random_solid(&[("C", 0)], 1.0, &mut rng).is_err());
    }

    #[test]
    fn charges_follow_species_and_default_to_zero() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut solid = random_solid(&[("Na", 3), ("Cl", 2), ("He", 1)], 1.0, &mut rng).unwrap();
        assign_charges(&mut solid, &[("Na", 1.0), ("Cl", -1.0)]);
        let charges = solid.charges().to_vec();
        for (symbol, q) in solid.species().iter().zip(&charges) {
            let expected = match symbol.as_str() {
                "Na" => 1.0,
                "Cl" => -1.0,
                _ => 0.0,
            };
            assert_relative_eq!(*q, expected);
        }
    }
}
