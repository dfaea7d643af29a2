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

//! Command-line front end: run the derivative checks over the reference
//! catalog and print a line per check, with full arrays on failure.

use anyhow::ensure;
use clap::Parser;
use forcecheck::catalog::reference_catalog;
use forcecheck::sweep::{ConsoleReporter, Sweep};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    version,
    about = "Finite-difference validation of analytic forces, virials, and charge derivatives"
)]
struct Cli {
    /// Keywords selecting potentials by name or citation; empty runs all
    keywords: Vec<String>,
    /// Largest accepted deviation between numeric and analytic derivatives
    #[arg(long, default_value_t = 1e-3)]
    tolerance: f64,
    /// Seed for the random materials and rattle displacements
    #[arg(long)]
    seed: Option<u64>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();
    let cli = Cli::parse();

    let seed = cli.seed.unwrap_or_else(rand::random);
    tracing::info!(seed, "building reference catalog");
    let catalog = reference_catalog(&mut StdRng::seed_from_u64(seed))?;

    let mut reporter = ConsoleReporter::new();
    let executed = Sweep::new()
        .with_seed(seed)
        .with_keywords(&cli.keywords)
        .with_tolerance(cli.tolerance)
        .run(&catalog, &mut reporter);

    println!(
        "{} checks, {} failed (seed {})",
        executed,
        reporter.failures(),
        seed
    );
    ensure!(reporter.failures() == 0, "{} checks failed", reporter.failures());
    Ok(())
}
