//! The single-period blend.
//!
//! Variables `x[o]` (quantity of each commodity used) and `prod` (total
//! blended output), all non-negative. Maximises
//! `price * prod - Σ_o cost[o] * x[o]` subject to:
//!
//! - `production_cap[type]`: `Σ_{o in type} x[o] <= production_cap[type]`
//! - `balance`: `prod = Σ_o x[o]`
//! - `hardness_min`: `Σ_o hardness[o] * x[o] >= hardness_min * prod`
//! - `hardness_max`: `Σ_o hardness[o] * x[o] <= hardness_max * prod`
//! - `hardness_window`: `hardness_max - hardness_min >= 0` (no variables)

use tracing::debug;

use crate::constraint;
use crate::error::ValidationError;
use crate::lp_solver::{
    Formulation, LPModelBuilder, LinearExpression, OptimisationSense, VariableId,
};
use crate::report::{LabelledVariable, Reportable, VariableRole};
use crate::schema::{BlendData, ModelKind, TypePartition};

use super::{SinglePeriod, check_finite, hardness_window};

type Var = VariableId<SinglePeriod>;

/// A built single-period formulation and the variables needed to read its
/// solution back.
#[derive(Debug, Clone, PartialEq)]
pub struct SinglePeriodModel {
    formulation: Formulation<SinglePeriod>,
    partition: TypePartition,
    usage: Vec<Var>,
    production: Var,
}

impl SinglePeriodModel {
    pub fn formulation(&self) -> &Formulation<SinglePeriod> {
        &self.formulation
    }

    /// `x[o]` for the commodity labelled `commodity`.
    pub fn usage(&self, commodity: &str) -> Option<Var> {
        let o = self.partition.commodity_index(commodity)?;
        Some(self.usage[o])
    }

    pub fn production(&self) -> Var {
        self.production
    }
}

impl Reportable<SinglePeriod> for SinglePeriodModel {
    fn kind(&self) -> ModelKind {
        ModelKind::SinglePeriod
    }

    fn labelled_variables(&self) -> Vec<LabelledVariable<SinglePeriod>> {
        let mut variables: Vec<_> = self
            .usage
            .iter()
            .zip(self.partition.commodities())
            .enumerate()
            .map(|(o, (&id, commodity))| LabelledVariable {
                id,
                role: VariableRole::Used,
                period: None,
                commodity: Some(commodity.clone()),
                commodity_type: Some(self.partition.type_at(o).clone()),
            })
            .collect();
        variables.push(LabelledVariable {
            id: self.production,
            role: VariableRole::Production,
            period: None,
            commodity: None,
            commodity_type: None,
        });
        variables
    }
}

/// Build the single-period formulation.
pub fn build(data: &BlendData) -> Result<SinglePeriodModel, ValidationError> {
    check_finite("price", [data.price()])?;
    check_finite("hardness_min", [data.hardness_min()])?;
    check_finite("hardness_max", [data.hardness_max()])?;
    check_finite("cost", data.cost().iter().copied())?;
    check_finite("hardness", data.hardness().iter().copied())?;
    check_finite("production_cap", data.production_cap().iter().copied())?;

    let partition = data.partition();
    let mut builder = LPModelBuilder::<SinglePeriod>::new();

    let usage: Vec<Var> = partition
        .commodities()
        .iter()
        .map(|o| builder.add_variable(format!("x[{o}]"), 0.0, f64::INFINITY))
        .collect();
    let production = builder.add_variable("prod", 0.0, f64::INFINITY);

    let revenue = data.price() * production;
    let purchases = LinearExpression::weighted_sum(data.cost().iter().copied().zip(usage.iter().copied()));
    builder.set_objective(revenue - purchases, OptimisationSense::Maximise);

    for (t, commodity_type) in partition.types().iter().enumerate() {
        let used: LinearExpression<_> = partition.members(t).iter().map(|&o| usage[o]).sum();
        builder.add_constraint(constraint!(
            format!("production_cap[{commodity_type}]"),
            (used) <= data.production_cap()[t]
        ));
    }

    let total: LinearExpression<_> = usage.iter().copied().sum();
    builder.add_constraint(constraint!("balance", (production - total) == 0.0));

    let blend_hardness = || {
        LinearExpression::weighted_sum(data.hardness().iter().copied().zip(usage.iter().copied()))
    };
    builder.add_constraint(constraint!(
        "hardness_min",
        (blend_hardness() - data.hardness_min() * production) >= 0.0
    ));
    builder.add_constraint(constraint!(
        "hardness_max",
        (blend_hardness() - data.hardness_max() * production) <= 0.0
    ));
    builder.add_constraint(hardness_window(data.hardness_min(), data.hardness_max()));

    let formulation = builder.build();
    debug!(
        variables = formulation.num_variables(),
        constraints = formulation.num_constraints(),
        "built single-period model"
    );

    Ok(SinglePeriodModel {
        formulation,
        partition: partition.clone(),
        usage,
        production,
    })
}
