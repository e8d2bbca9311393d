//! Oil blending production planning as linear programs
//!
//! Given a set of commodities (refined oils), grouped into types that share
//! a production line, this library decides how much of each to buy, use and
//! store so the blended product is as profitable as possible while its
//! hardness stays within bounds.
//!
//! # Overview
//!
//! Two formulations are supported:
//!
//! 1. **Single-period** ([`model::single_period`]): one blend, no time
//!    dimension.
//! 2. **Multi-period** ([`model::multi_period`]): a horizon of periods with
//!    inventory carried between them at a storage cost, with fixed starting
//!    and closing stock.
//!
//! Data flows one way: a YAML data file is parsed into [`schema::RawData`],
//! validated into [`schema::BlendData`] or [`schema::PlanningData`], turned
//! into an immutable [`lp_solver::Formulation`], handed to the configured
//! solver, and finally mapped back onto labels by [`report::Report`].
//!
//! # Usage Example
//!
//! ```no_run
//! # fn main() -> anyhow::Result<()> {
//! use blendplan::config::RunConfig;
//! use blendplan::schema::ModelKind;
//! use blendplan::{model, read_data};
//! use std::path::Path;
//!
//! let raw = read_data(Path::new("data/multi_period.yaml"))?;
//! let model = model::build(&raw, ModelKind::MultiPeriod, None)?;
//!
//! let config = RunConfig::load(None)?.to_solver_config();
//! let report = model.solve(&config)?;
//! println!("{report}");
//! # Ok(())
//! # }
//! ```
//!
//! # Modules
//!
//! - **[`schema`]**: data file parsing and validation
//! - **[`model`]**: the two formulation builders
//! - **[`lp_solver`]**: linear programming kernel and solver backends
//! - **[`report`]**: mapping solutions back to labels, tables and CSV
//! - **[`config`]**: run configuration (which solver, where, how long)
//! - **[`error`]**: the error kinds and how they are told apart
//! - **[`solve`]**, **[`export`]**: the command-line front ends

use anyhow::{Context, Result};
use clap::Parser;
use std::{fs, path::Path};

pub mod config;
pub mod error;
pub mod export;
pub mod lp_solver;
pub mod model;
pub mod report;
pub mod schema;
pub mod solve;
pub mod telemetry;

pub use export::{ExportArgs, export_main};
pub use solve::{SolveArgs, solve_main};

use error::{ConfigurationError, SolveError, SolverError, SolverInvocationError, ValidationError};

/// Reads and parses a YAML data file.
///
/// Only the document structure is checked here; validation against the
/// selected model happens when the model is built.
pub fn read_data(path: &Path) -> Result<schema::RawData> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("cannot read data file {}", path.display()))?;
    schema::RawData::from_yaml(&text)
        .with_context(|| format!("invalid data in {}", path.display()))
}

/// Process exit status for a failed command.
///
/// | status | meaning |
/// |--------|---------|
/// | 1 | the solver finished without an optimum |
/// | 2 | invalid data |
/// | 3 | invalid run configuration |
/// | 4 | the solver could not be run, or timed out |
/// | 5 | anything else, e.g. unreadable or unwritable files |
pub fn exit_status(error: &anyhow::Error) -> u8 {
    for cause in error.chain() {
        if cause.downcast_ref::<SolveError>().is_some() {
            return 1;
        }
        if cause.downcast_ref::<ValidationError>().is_some() {
            return 2;
        }
        if cause.downcast_ref::<ConfigurationError>().is_some() {
            return 3;
        }
        if cause.downcast_ref::<SolverInvocationError>().is_some() {
            return 4;
        }
        // Transparent wrapper: its inner error is not part of the chain.
        match cause.downcast_ref::<SolverError>() {
            Some(SolverError::Configuration(_)) => return 3,
            Some(SolverError::Invocation(_)) => return 4,
            None => {}
        }
    }
    5
}

/// Command-line interface arguments for the blend planner.
#[derive(Debug, Parser)]
#[clap(
    name = "blendplan",
    about = "Oil blending production planning with linear programming"
)]
pub enum CLIArguments {
    /// Build the selected model, solve it and print the plan.
    Solve(SolveArgs),
    /// Build the selected model and write it as a CPLEX LP file without solving.
    Export(ExportArgs),
}
