//! Blending model builders
//!
//! Two formulations are provided, each a pure function from validated data to
//! an immutable [`Formulation`](crate::lp_solver::Formulation):
//!
//! - [`single_period::build`]: one blend, no time dimension.
//! - [`multi_period::build`]: a horizon of periods coupled by storage.
//!
//! Each builder tags its variables with its own brand ([`SinglePeriod`],
//! [`MultiPeriod`]) so a solution can only be read back through the model
//! that produced it.
//!
//! [`build`] goes from raw data and a selected [`ModelKind`] to a
//! [`BuiltModel`], which is what the command-line front end drives.
//!
//! # Example
//!
//! ```rust
//! use blendplan::lp_solver::{SolverConfig, solve};
//! use blendplan::model::single_period;
//! use blendplan::schema::{BlendData, RawData};
//!
//! # fn main() -> anyhow::Result<()> {
//! let raw = RawData::from_yaml(
//!     r#"
//! sets:
//!   O: [A, B]
//!   OTYPE: [OIL]
//!   O_BY_TYPE: {OIL: [A, B]}
//! parameters:
//!   production_cap: {OIL: 100}
//!   cost: {A: 10, B: 20}
//!   price: 50
//!   hardness: {A: 5, B: 8}
//!   hardness_min: 6
//!   hardness_max: 7
//! "#,
//! )?;
//! let model = single_period::build(&BlendData::from_raw(&raw)?)?;
//!
//! let config = SolverConfig {
//!     name: Some("minilp".to_string()),
//!     ..SolverConfig::default()
//! };
//! let result = solve(model.formulation(), &config)?;
//! assert!((result.optimum()? - 3666.67).abs() < 0.01);
//! # Ok(())
//! # }
//! ```

use std::io;

use crate::error::{SolverError, ValidationError};
use crate::lp_solver::{Constraint, LinearExpression, SolverConfig, lp_format, solve};
use crate::report::Report;
use crate::schema::{BlendData, ModelKind, PlanningData, RawData};

pub mod multi_period;
pub mod single_period;

pub use multi_period::MultiPeriodModel;
pub use single_period::SinglePeriodModel;


/// Brand of single-period formulations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SinglePeriod;

/// Brand of multi-period formulations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MultiPeriod;

/// Reject NaN and infinite parameter values, which no solver handles
/// meaningfully.
fn check_finite(
    parameter: &str,
    values: impl IntoIterator<Item = f64>,
) -> Result<(), ValidationError> {
    match values.into_iter().find(|v| !v.is_finite()) {
        Some(value) => Err(ValidationError::Malformed(format!(
            "parameter `{parameter}` must be a finite number, got {value}"
        ))),
        None => Ok(()),
    }
}

/// Constant row that holds iff the hardness bounds admit some blend.
fn hardness_window<Brand>(hardness_min: f64, hardness_max: f64) -> Constraint<Brand> {
    Constraint::ge(
        "hardness_window",
        LinearExpression::new(hardness_max - hardness_min),
        0.0,
    )
}

/// A model of either kind, ready to solve or export.
#[derive(Debug, Clone, PartialEq)]
pub enum BuiltModel {
    SinglePeriod(SinglePeriodModel),
    MultiPeriod(MultiPeriodModel),
}

impl BuiltModel {
    pub fn kind(&self) -> ModelKind {
        match self {
            BuiltModel::SinglePeriod(_) => ModelKind::SinglePeriod,
            BuiltModel::MultiPeriod(_) => ModelKind::MultiPeriod,
        }
    }

    pub fn num_variables(&self) -> usize {
        match self {
            BuiltModel::SinglePeriod(model) => model.formulation().num_variables(),
            BuiltModel::MultiPeriod(model) => model.formulation().num_variables(),
        }
    }

    pub fn num_constraints(&self) -> usize {
        match self {
            BuiltModel::SinglePeriod(model) => model.formulation().num_constraints(),
            BuiltModel::MultiPeriod(model) => model.formulation().num_constraints(),
        }
    }

    /// Solve with the configured solver and map the result onto labels.
    pub fn solve(&self, config: &SolverConfig) -> Result<Report, SolverError> {
        Ok(match self {
            BuiltModel::SinglePeriod(model) => {
                Report::new(&solve(model.formulation(), config)?, model)
            }
            BuiltModel::MultiPeriod(model) => {
                Report::new(&solve(model.formulation(), config)?, model)
            }
        })
    }

    /// Write the formulation in CPLEX LP format.
    pub fn write_lp<W: io::Write>(&self, writer: W) -> io::Result<()> {
        match self {
            BuiltModel::SinglePeriod(model) => lp_format::write_lp(model.formulation(), writer),
            BuiltModel::MultiPeriod(model) => lp_format::write_lp(model.formulation(), writer),
        }
    }
}

/// Validate `raw` for the selected model and build it.
///
/// `period` selects one period of per-period data for a single-period run; it
/// is rejected for multi-period runs, which always span the whole horizon.
pub fn build(
    raw: &RawData,
    kind: ModelKind,
    period: Option<&str>,
) -> Result<BuiltModel, ValidationError> {
    match (kind, period) {
        (ModelKind::SinglePeriod, None) => {
            single_period::build(&BlendData::from_raw(raw)?).map(BuiltModel::SinglePeriod)
        }
        (ModelKind::SinglePeriod, Some(period)) => {
            single_period::build(&BlendData::from_raw_for_period(raw, period)?)
                .map(BuiltModel::SinglePeriod)
        }
        (ModelKind::MultiPeriod, None) => {
            multi_period::build(&PlanningData::from_raw(raw)?).map(BuiltModel::MultiPeriod)
        }
        (ModelKind::MultiPeriod, Some(_)) => Err(ValidationError::Malformed(
            "a period can only be selected for single-period models".to_string(),
        )),
    }
}
