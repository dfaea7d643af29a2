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

//! The reference catalog: an explicit table of models and the materials to
//! validate them on. Every entry pairs one model with one or more prepared
//! configurations; the sweep runs the derivative checks on each pairing.

use crate::model::{
    DirectCoulomb, GaussianCharges, Gupta, GuptaParams, Harmonic, InteractionModel,
    LennardJonesCut, Pairwise, PowerSix, SlaterCharges,
};
use crate::structure::{
    assign_charges, cesium_chloride, diamond, face_centered_cubic, random_solid, rock_salt,
    AtomicConfiguration,
};
use crate::Error;
use rand::Rng;

/// One named configuration to run the checks on
#[derive(Clone, Debug)]
pub struct Material {
    pub name: String,
    pub configuration: AtomicConfiguration,
}

impl Material {
    fn new(name: &str, configuration: AtomicConfiguration) -> Self {
        Self {
            name: name.to_string(),
            configuration,
        }
    }
}

/// A model together with the materials it is validated against
#[derive(Clone, Debug)]
pub struct CatalogEntry {
    pub model: Box<dyn InteractionModel>,
    pub materials: Vec<Material>,
}

impl CatalogEntry {
    fn new(model: impl InteractionModel + 'static, materials: Vec<Material>) -> Self {
        Self {
            model: Box::new(model),
            materials,
        }
    }
}

/// Cleri & Rosato second-moment parameters for copper
fn gupta_cu() -> GuptaParams {
    GuptaParams {
        a: 0.0855,
        xi: 1.224,
        p: 10.960,
        q: 2.278,
        r0: 2.556,
    }
}

/// Cleri & Rosato second-moment parameters for nickel
fn gupta_ni() -> GuptaParams {
    GuptaParams {
        a: 0.0376,
        xi: 1.070,
        p: 16.999,
        q: 1.189,
        r0: 2.491,
    }
}

/// Cleri & Rosato second-moment parameters for silver
fn gupta_ag() -> GuptaParams {
    GuptaParams {
        a: 0.1028,
        xi: 1.178,
        p: 10.928,
        q: 3.139,
        r0: 2.889,
    }
}

/// Cleri & Rosato second-moment parameters for gold
fn gupta_au() -> GuptaParams {
    GuptaParams {
        a: 0.2061,
        xi: 1.790,
        p: 10.229,
        q: 4.036,
        r0: 2.884,
    }
}

const CLERI_ROSATO: &str = "Cleri & Rosato, Phys. Rev. B 48, 22 (1993)";

/// Rock-salt Na-Cl with unit formal charges
fn sodium_chloride() -> AtomicConfiguration {
    let mut salt = rock_salt(["Na", "Cl"], 5.64, [1, 1, 1]);
    assign_charges(&mut salt, &[("Na", 1.0), ("Cl", -1.0)]);
    salt
}

/// A disordered Na-Cl box at the experimental density, unit formal charges
fn molten_salt<R: Rng>(rng: &mut R) -> Result<AtomicConfiguration, Error> {
    let mut salt = random_solid(&[("Na", 8), ("Cl", 8)], 2.16, rng)?;
    assign_charges(&mut salt, &[("Na", 1.0), ("Cl", -1.0)]);
    Ok(salt)
}

fn ionic_materials<R: Rng>(rng: &mut R) -> Result<Vec<Material>, Error> {
    Ok(vec![
        Material::new("NaCl (rock salt)", sodium_chloride()),
        Material::new("NaCl (random)", molten_salt(rng)?),
    ])
}

/// Build the full model/material table.
///
/// Random materials are drawn from `rng`, so a seeded generator makes the
/// catalog reproducible. Fails only if a random solid cannot be constructed.
pub fn reference_catalog<R: Rng>(rng: &mut R) -> Result<Vec<CatalogEntry>, Error> {
    let metal_elements = [("Cu", gupta_cu()), ("Ni", gupta_ni())];
    let metals = vec![
        Material::new("fcc Cu", face_centered_cubic("Cu", 3.615, [2, 2, 2])),
        Material::new("fcc Ni", face_centered_cubic("Ni", 3.52, [2, 2, 2])),
        Material::new("B2 CuNi", cesium_chloride(["Cu", "Ni"], 2.87, [2, 2, 2])),
        Material::new(
            "CuNi (random)",
            random_solid(&[("Cu", 8), ("Ni", 8)], 8.9, rng)?,
        ),
    ];
    // screened variants run on elemental, ordered-binary, and random materials
    let screened_metals = vec![metals[0].clone(), metals[2].clone(), metals[3].clone()];

    let noble_elements = [("Ag", gupta_ag()), ("Au", gupta_au())];
    let nobles = vec![
        Material::new("fcc Ag", face_centered_cubic("Ag", 4.09, [2, 2, 2])),
        Material::new("fcc Au", face_centered_cubic("Au", 4.08, [2, 2, 2])),
        Material::new("B2 AgAu", cesium_chloride(["Ag", "Au"], 3.33, [2, 2, 2])),
        Material::new(
            "AgAu (random)",
            random_solid(&[("Ag", 8), ("Au", 8)], 13.0, rng)?,
        ),
    ];
    let screened_nobles = vec![nobles[1].clone(), nobles[2].clone(), nobles[3].clone()];

    Ok(vec![
        CatalogEntry::new(
            Pairwise::new(Harmonic::new(1.0, 1.0, 1.5)),
            vec![Material::new("fcc He", face_centered_cubic("He", 1.0, [2, 2, 2]))],
        ),
        CatalogEntry::new(
            Pairwise::new(PowerSix::new(1.0, 1.0, 5.0)),
            vec![Material::new("diamond Si", diamond("Si", 5.43, [1, 1, 1]))],
        ),
        CatalogEntry::new(
            Pairwise::new(LennardJonesCut::new(10.2, 2.28, 5.0, true)),
            vec![Material::new(
                "fcc He (expanded)",
                face_centered_cubic("He", 3.5, [2, 2, 2]),
            )],
        ),
        CatalogEntry::new(
            Gupta::new(&metal_elements, 3.8, 4.5).with_citation(CLERI_ROSATO),
            metals,
        ),
        CatalogEntry::new(
            Gupta::new(&metal_elements, 3.8, 4.5)
                .with_screening(0.3)
                .with_citation(CLERI_ROSATO),
            screened_metals,
        ),
        CatalogEntry::new(
            Gupta::new(&noble_elements, 3.8, 4.5).with_citation(CLERI_ROSATO),
            nobles,
        ),
        CatalogEntry::new(
            Gupta::new(&noble_elements, 3.8, 4.5)
                .with_screening(0.3)
                .with_citation(CLERI_ROSATO),
            screened_nobles,
        ),
        CatalogEntry::new(DirectCoulomb::default(), ionic_materials(rng)?),
        CatalogEntry::new(
            SlaterCharges::new(&[("Na", 1.0, 0.1), ("Cl", 0.5, -0.2)], 5.0),
            ionic_materials(rng)?,
        ),
        // same Hubbard U on both species exercises the equal-exponent branch
        CatalogEntry::new(
            SlaterCharges::new(&[("Na", 1.0, 0.1), ("Cl", 1.0, -0.2)], 5.0),
            ionic_materials(rng)?,
        ),
        CatalogEntry::new(
            GaussianCharges::new(&[("Na", 1.0), ("Cl", 0.5)], 5.0),
            ionic_materials(rng)?,
        ),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Info;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn catalog_is_reproducible_under_a_fixed_seed() {
        let first = reference_catalog(&mut StdRng::seed_from_u64(7)).unwrap();
        let second = reference_catalog(&mut StdRng::seed_from_u64(7)).unwrap();
        assert_eq!(first.len(), second.len());
        for (a, b) in first.iter().zip(&second) {
            for (ma, mb) in a.materials.iter().zip(&b.materials) {
                assert_eq!(ma.name, mb.name);
                assert_eq!(ma.configuration, mb.configuration);
            }
        }
    }

    #[test]
    fn gupta_family_spans_two_parameterizations_with_screening() {
        let catalog = reference_catalog(&mut StdRng::seed_from_u64(0)).unwrap();
        let named = |name: &str| {
            catalog
                .iter()
                .filter(|entry| entry.model.short_name() == Some(name))
                .collect::<Vec<_>>()
        };
        assert_eq!(named("gupta").len(), 2);
        let screened = named("gupta-scr");
        assert_eq!(screened.len(), 2);
        // each screened variant covers elemental, ordered-binary, and random materials
        for entry in screened {
            assert!(entry.materials.iter().any(|m| m.name.starts_with("fcc")));
            assert!(entry.materials.iter().any(|m| m.name.starts_with("B2")));
            assert!(entry.materials.iter().any(|m| m.name.contains("random")));
        }
    }

    #[test]
    fn every_entry_has_a_material_and_finite_energy() {
        let catalog = reference_catalog(&mut StdRng::seed_from_u64(0)).unwrap();
        assert!(catalog.len() >= 11);
        for entry in &catalog {
            assert!(!entry.materials.is_empty());
            for material in &entry.materials {
                let energy = entry.model.energy(&material.configuration);
                assert!(energy.is_finite(), "{}", material.name);
            }
        }
    }

    #[test]
    fn charge_models_see_nonzero_charges() {
        let catalog = reference_catalog(&mut StdRng::seed_from_u64(0)).unwrap();
        for entry in &catalog {
            for material in &entry.materials {
                if entry.model.charge_gradient(&material.configuration).is_some() {
                    assert!(material
                        .configuration
                        .charges()
                        .iter()
                        .any(|&q| q != 0.0));
                }
            }
        }
    }

    #[test]
    fn entries_can_be_cloned() {
        let catalog = reference_catalog(&mut StdRng::seed_from_u64(1)).unwrap();
        let copy = catalog.clone();
        assert_eq!(copy.len(), catalog.len());
    }
}
