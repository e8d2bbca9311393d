//! The `solve` command: validate, build, solve and report.
//!
//! ```no_run
//! # fn main() -> anyhow::Result<()> {
//! use blendplan::schema::ModelKind;
//! use blendplan::solve::{SolveArgs, solve_main};
//!
//! let args = SolveArgs {
//!     data: "data/multi_period.yaml".into(),
//!     model_type: ModelKind::MultiPeriod,
//!     config: Some("config.yaml".into()),
//!     period: None,
//!     time_limit: Some(60.0),
//!     csv: Some("plan.csv".into()),
//! };
//!
//! solve_main(args)?;
//! # Ok(())
//! # }
//! ```

use std::{
    env, fs,
    io::{BufWriter, Write},
    path::PathBuf,
};

use anyhow::*;
use clap::Parser;
use tracing::info;

use crate::config::{RunConfig, SOLVER_ENV_VAR};
use crate::{model, read_data, schema::ModelKind};

/// Command-line arguments for the solve command.
#[derive(Parser, Debug)]
pub struct SolveArgs {
    /// YAML data file
    #[clap(long, alias = "data-file", default_value = "data.yaml")]
    pub data: PathBuf,

    /// Formulation to build
    #[clap(long, value_enum, default_value_t = ModelKind::SinglePeriod)]
    pub model_type: ModelKind,

    /// Run configuration naming the LP solver (default: ./config.yaml if present)
    #[clap(long)]
    pub config: Option<PathBuf>,

    /// Solve a single-period blend over one period of per-period data
    #[clap(long)]
    pub period: Option<String>,

    /// Solver time limit in seconds, overriding the configuration
    #[clap(long)]
    pub time_limit: Option<f64>,

    /// Output CSV file with every variable value
    #[clap(long)]
    pub csv: Option<PathBuf>,
}

/// Solve the blending problem described by the data file and print the
/// report to stdout.
///
/// A solver that finishes without an optimum is not a crash: the report is
/// still printed (status only), then a
/// [`SolveError`](crate::error::SolveError) is returned so the process exits
/// with a non-zero status.
pub fn solve_main(args: SolveArgs) -> Result<()> {
    let SolveArgs {
        ref data,
        model_type,
        ref config,
        ref period,
        time_limit,
        ref csv,
    } = args;

    let raw = read_data(data)?;
    let model = model::build(&raw, model_type, period.as_deref())
        .with_context(|| format!("invalid data in {}", data.display()))?;
    info!(
        model = %model.kind(),
        variables = model.num_variables(),
        constraints = model.num_constraints(),
        "model built"
    );

    let run_config = RunConfig::load(config.as_deref())?
        .with_solver_override(env::var(SOLVER_ENV_VAR).ok())
        .with_time_limit(time_limit)?;

    let report = model.solve(&run_config.to_solver_config())?;
    print!("{report}");

    if let Some(path) = csv {
        let file = fs::File::create(path)
            .with_context(|| format!("cannot create {}", path.display()))?;
        let mut writer = BufWriter::new(file);
        report.write_csv(&mut writer)?;
        writer.flush()?;
    }

    report.ensure_optimal()?;
    Ok(())
}
