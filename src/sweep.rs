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

//! Runs the derivative checks over a catalog of model/material pairings.
//!
//! Each material is checked twice: once translated away from the cell
//! origin ("equilibrium") and once after a bounded random rattle
//! ("distorted"), so both the symmetric and the low-symmetry code paths of
//! a model are exercised. Outcomes are delivered through a [`Reporter`],
//! which decides whether a failure prints diagnostics or aborts.

use crate::catalog::CatalogEntry;
use crate::fdcheck::FiniteDifference;
use crate::model::InteractionModel;
use crate::{Info, Matrix3, Vector3};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::fmt;

/// Which of the two perturbation passes a check belongs to
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Pass {
    Equilibrium,
    Distorted,
}

impl fmt::Display for Pass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Pass::Equilibrium => "equilibrium".fmt(f),
            Pass::Distorted => "distorted".fmt(f),
        }
    }
}

/// Which derivative a check compared
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Check {
    Forces,
    Stress,
    ChargeGradient,
}

impl fmt::Display for Check {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Check::Forces => "forces".fmt(f),
            Check::Stress => "virial".fmt(f),
            Check::ChargeGradient => "charge derivative".fmt(f),
        }
    }
}

/// Numeric and analytic sides of one finished check
#[derive(Clone, Debug)]
pub enum CheckValues {
    Forces {
        numeric: Vec<Vector3>,
        analytic: Vec<Vector3>,
    },
    Stress {
        numeric: Matrix3,
        analytic: Matrix3,
    },
    ChargeGradient {
        numeric: Vec<f64>,
        analytic: Vec<f64>,
    },
}

/// Everything a reporter needs to describe one check outcome
#[derive(Clone, Debug)]
pub struct CheckReport {
    pub potential: String,
    pub material: String,
    pub pass: Pass,
    pub check: Check,
    pub deviation: f64,
    pub tolerance: f64,
    /// Literature provenance of the parameter set; reported, never validated
    pub citation: Option<String>,
    pub values: CheckValues,
}

impl CheckReport {
    pub fn passed(&self) -> bool {
        self.deviation < self.tolerance
    }
}

/// Receives check outcomes; implementations choose how to react
pub trait Reporter {
    fn on_pass(&mut self, report: &CheckReport);
    fn on_fail(&mut self, report: &CheckReport);
}

/// Prints a line per check and full arrays on failure; never aborts
#[derive(Debug, Default)]
pub struct ConsoleReporter {
    failures: usize,
}

impl ConsoleReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failures(&self) -> usize {
        self.failures
    }
}

impl Reporter for ConsoleReporter {
    fn on_pass(&mut self, report: &CheckReport) {
        let provenance = report
            .citation
            .as_deref()
            .map(|citation| format!(" [{citation}]"))
            .unwrap_or_default();
        println!(
            "ok   {} / {} / {} / {}: deviation {:.3e}{}",
            report.potential,
            report.material,
            report.pass,
            report.check,
            report.deviation,
            provenance
        );
    }

    fn on_fail(&mut self, report: &CheckReport) {
        self.failures += 1;
        println!(
            "FAIL {} / {} / {} / {}: deviation {:.3e} exceeds {:.3e}",
            report.potential,
            report.material,
            report.pass,
            report.check,
            report.deviation,
            report.tolerance
        );
        if let Some(citation) = &report.citation {
            println!("  parameter set: {citation}");
        }
        match &report.values {
            CheckValues::Forces { numeric, analytic } => {
                for (index, (num, ana)) in numeric.iter().zip(analytic).enumerate() {
                    println!(
                        "  atom {index}: numeric [{:+.6e} {:+.6e} {:+.6e}]  \
                         analytic [{:+.6e} {:+.6e} {:+.6e}]",
                        num.x, num.y, num.z, ana.x, ana.y, ana.z
                    );
                }
            }
            CheckValues::Stress { numeric, analytic } => {
                println!("  numeric stress:\n{numeric:.6e}");
                println!("  analytic stress:\n{analytic:.6e}");
            }
            CheckValues::ChargeGradient { numeric, analytic } => {
                for (index, (num, ana)) in numeric.iter().zip(analytic).enumerate() {
                    println!("  atom {index}: numeric {num:+.6e}  analytic {ana:+.6e}");
                }
            }
        }
    }
}

/// Panics on the first failure; silent otherwise. This is the assertion-mode
/// reporter used by the integration tests.
#[derive(Clone, Copy, Debug, Default)]
pub struct PanickingReporter;

impl Reporter for PanickingReporter {
    fn on_pass(&mut self, _report: &CheckReport) {}

    fn on_fail(&mut self, report: &CheckReport) {
        panic!(
            "potential: {}; material: {}; {}; {}: deviation {:.3e} exceeds tolerance {:.3e}",
            report.potential,
            report.material,
            report.pass,
            report.check,
            report.deviation,
            report.tolerance
        );
    }
}

/// Name used in reports: the model's short name, or a generic fallback
pub fn resolved_name(model: &dyn InteractionModel) -> &str {
    model.short_name().unwrap_or("potential")
}

/// Case-insensitive substring match of any keyword against the model's
/// resolved name or citation. An empty keyword list matches everything.
pub fn matches_filter(keywords: &[String], model: &dyn InteractionModel) -> bool {
    if keywords.is_empty() {
        return true;
    }
    let name = resolved_name(model).to_lowercase();
    let citation = model.citation().unwrap_or("").to_lowercase();
    keywords
        .iter()
        .map(|keyword| keyword.to_lowercase())
        .any(|keyword| name.contains(&keyword) || citation.contains(&keyword))
}

/// Catalog-wide check driver
#[derive(Debug)]
pub struct Sweep {
    keywords: Vec<String>,
    tolerance: f64,
    rattle_amplitude: f64,
    steps: FiniteDifference,
    rng: StdRng,
}

impl Default for Sweep {
    fn default() -> Self {
        Self::new()
    }
}

impl Sweep {
    pub fn new() -> Self {
        Self {
            keywords: Vec::new(),
            tolerance: 1e-3,
            rattle_amplitude: 0.5,
            steps: FiniteDifference::default(),
            rng: StdRng::from_entropy(),
        }
    }

    pub fn with_keywords(mut self, keywords: &[String]) -> Self {
        self.keywords = keywords.to_vec();
        self
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    /// Run all matching catalog entries, reporting every check outcome.
    /// Returns the number of checks executed.
    pub fn run(&mut self, catalog: &[CatalogEntry], reporter: &mut dyn Reporter) -> usize {
        let mut executed = 0;
        for entry in catalog {
            let model = entry.model.as_ref();
            if !matches_filter(&self.keywords, model) {
                tracing::debug!(potential = resolved_name(model), "skipped by filter");
                continue;
            }
            for material in &entry.materials {
                tracing::info!(
                    potential = resolved_name(model),
                    material = %material.name,
                    citation = model.citation().unwrap_or(""),
                    "checking"
                );
                let mut configuration = material.configuration.clone();
                configuration.translate(&Vector3::new(0.1, 0.1, 0.1));
                executed += self.run_pass(
                    model,
                    &material.name,
                    Pass::Equilibrium,
                    &mut configuration,
                    reporter,
                );
                configuration.rattle(self.rattle_amplitude, &mut self.rng);
                executed += self.run_pass(
                    model,
                    &material.name,
                    Pass::Distorted,
                    &mut configuration,
                    reporter,
                );
            }
        }
        executed
    }

    fn run_pass(
        &self,
        model: &dyn InteractionModel,
        material: &str,
        pass: Pass,
        configuration: &mut crate::structure::AtomicConfiguration,
        reporter: &mut dyn Reporter,
    ) -> usize {
        let mut executed = 0;

        let forces = self.steps.check_forces(model, configuration);
        self.dispatch(
            reporter,
            model,
            material,
            pass,
            Check::Forces,
            forces.deviation,
            CheckValues::Forces {
                numeric: forces.numeric,
                analytic: forces.analytic,
            },
        );
        executed += 1;

        let stress = self.steps.check_stress(model, configuration);
        self.dispatch(
            reporter,
            model,
            material,
            pass,
            Check::Stress,
            stress.deviation,
            CheckValues::Stress {
                numeric: stress.numeric,
                analytic: stress.analytic,
            },
        );
        executed += 1;

        if let Some(charges) = self.steps.check_charge_gradient(model, configuration) {
            self.dispatch(
                reporter,
                model,
                material,
                pass,
                Check::ChargeGradient,
                charges.deviation,
                CheckValues::ChargeGradient {
                    numeric: charges.numeric,
                    analytic: charges.analytic,
                },
            );
            executed += 1;
        }
        executed
    }

    #[allow(clippy::too_many_arguments)]
    fn dispatch(
        &self,
        reporter: &mut dyn Reporter,
        model: &dyn InteractionModel,
        material: &str,
        pass: Pass,
        check: Check,
        deviation: f64,
        values: CheckValues,
    ) {
        let report = CheckReport {
            potential: resolved_name(model).to_string(),
            material: material.to_string(),
            pass,
            check,
            deviation,
            tolerance: self.tolerance,
            citation: model.citation().map(str::to_string),
            values,
        };
        tracing::debug!(
            potential = %report.potential,
            material = %report.material,
            pass = %report.pass,
            check = %report.check,
            deviation = report.deviation,
            "check finished"
        );
        if report.passed() {
            reporter.on_pass(&report);
        } else {
            reporter.on_fail(&report);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{reference_catalog, CatalogEntry, Material};
    use crate::model::{Harmonic, LennardJonesCut, Pairwise};
    use crate::structure::face_centered_cubic;

    /// Counts outcomes without reacting to them
    #[derive(Default)]
    struct CountingReporter {
        passed: usize,
        failed: usize,
    }

    impl Reporter for CountingReporter {
        fn on_pass(&mut self, _report: &CheckReport) {
            self.passed += 1;
        }
        fn on_fail(&mut self, _report: &CheckReport) {
            self.failed += 1;
        }
    }

    #[test]
    fn filter_matches_name_and_citation() {
        let harmonic = Pairwise::new(Harmonic::new(1.0, 1.0, 1.5));
        assert!(matches_filter(&[], &harmonic));
        assert!(matches_filter(&["HARM".to_string()], &harmonic));
        assert!(!matches_filter(&["lennard".to_string()], &harmonic));
        let catalog = reference_catalog(&mut rand::rngs::StdRng::seed_from_u64(0)).unwrap();
        let gupta = catalog
            .iter()
            .find(|entry| resolved_name(entry.model.as_ref()) == "gupta")
            .unwrap();
        assert!(matches_filter(&["cleri".to_string()], gupta.model.as_ref()));
    }

    #[test]
    fn harmonic_entry_passes_both_passes() {
        let catalog = reference_catalog(&mut rand::rngs::StdRng::seed_from_u64(3)).unwrap();
        let harmonic: Vec<_> = catalog
            .into_iter()
            .filter(|entry| resolved_name(entry.model.as_ref()) == "harmonic")
            .collect();
        let mut reporter = CountingReporter::default();
        let executed = Sweep::new().with_seed(3).run(&harmonic, &mut reporter);
        // force and stress checks, twice per material, no charge check
        assert_eq!(executed, 4);
        assert_eq!(reporter.passed, 4);
        assert_eq!(reporter.failed, 0);
    }

    #[test]
    fn reports_carry_the_parameter_provenance() {
        /// keeps every report for later inspection
        #[derive(Default)]
        struct RecordingReporter(Vec<CheckReport>);

        impl Reporter for RecordingReporter {
            fn on_pass(&mut self, report: &CheckReport) {
                self.0.push(report.clone());
            }
            fn on_fail(&mut self, report: &CheckReport) {
                self.0.push(report.clone());
            }
        }

        let entry = CatalogEntry {
            model: Box::new(Pairwise::new(LennardJonesCut::new(10.2, 2.28, 5.0, true))),
            materials: vec![Material {
                name: "fcc He".to_string(),
                configuration: face_centered_cubic("He", 3.5, [1, 1, 1]),
            }],
        };
        let mut reporter = RecordingReporter::default();
        Sweep::new().with_seed(5).run(&[entry], &mut reporter);
        assert!(!reporter.0.is_empty());
        for report in &reporter.0 {
            assert_eq!(report.citation.as_deref(), Some("doi:10/cqhgm7"));
        }
    }

    #[test]
    fn keyword_filter_limits_the_sweep() {
        let catalog = reference_catalog(&mut rand::rngs::StdRng::seed_from_u64(3)).unwrap();
        let mut reporter = CountingReporter::default();
        let executed = Sweep::new()
            .with_seed(3)
            .with_keywords(&["no-such-model".to_string()])
            .run(&catalog, &mut reporter);
        assert_eq!(executed, 0);
    }
}
