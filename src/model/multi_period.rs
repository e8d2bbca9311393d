//! The multi-period blend with storage.
//!
//! Per period `t` and commodity `o`: `u[t,o]` (used), `b[t,o]` (bought) and
//! `s[t,o]` (held in storage at the end of `t`); per period `prod[t]`. All
//! variables are non-negative. Maximises
//!
//! ```text
//! price * Σ_t prod[t] - Σ_{t,o} cost[t,o] * b[t,o] - Σ_{t,o} storage_cost[o] * s[t,o]
//! ```
//!
//! subject to:
//!
//! - `production_cap[t,type]`: `Σ_{o in type} u[t,o] <= production_cap[type]`
//! - `balance_periods[t,o]`: `b[t,o] + carried = u[t,o] + s[t,o]`, where
//!   `carried` is `start_inventory[o]` for the first period and
//!   `s[predecessor(t),o]` for every later one
//! - `balance_production[t]`: `prod[t] = Σ_o u[t,o]`
//! - `hardness_min[t]`, `hardness_max[t]`: as in the single-period blend,
//!   over `u[t,·]` and `prod[t]` of the same period
//! - `storage_cap[t,o]`: `s[t,o] <= storage_cap[o]`
//! - `end_inventory[o]`: `s[last,o] = end_inventory[o]`
//! - `hardness_window`: `hardness_max - hardness_min >= 0` (no variables)
//!
//! The predecessor relation comes from [`Periods`]; labels are never treated
//! as numbers.

use tracing::debug;

use crate::constraint;
use crate::error::ValidationError;
use crate::lp_solver::{
    Formulation, LPModelBuilder, LinearExpression, OptimisationSense, VariableId,
};
use crate::report::{LabelledVariable, Reportable, VariableRole};
use crate::schema::{ModelKind, Periods, PlanningData, TypePartition};

use super::{MultiPeriod, check_finite, hardness_window};

type Var = VariableId<MultiPeriod>;

/// A built multi-period formulation and the variables needed to read its
/// solution back. Per-period variables are indexed `[t][o]`.
#[derive(Debug, Clone, PartialEq)]
pub struct MultiPeriodModel {
    formulation: Formulation<MultiPeriod>,
    partition: TypePartition,
    periods: Periods,
    usage: Vec<Vec<Var>>,
    purchase: Vec<Vec<Var>>,
    storage: Vec<Vec<Var>>,
    production: Vec<Var>,
}

impl MultiPeriodModel {
    pub fn formulation(&self) -> &Formulation<MultiPeriod> {
        &self.formulation
    }

    pub fn periods(&self) -> &Periods {
        &self.periods
    }

    fn lookup(&self, table: &[Vec<Var>], period: &str, commodity: &str) -> Option<Var> {
        let t = self.periods.position(period)?;
        let o = self.partition.commodity_index(commodity)?;
        Some(table[t][o])
    }

    /// `u[t,o]`
    pub fn usage(&self, period: &str, commodity: &str) -> Option<Var> {
        self.lookup(&self.usage, period, commodity)
    }

    /// `b[t,o]`
    pub fn purchase(&self, period: &str, commodity: &str) -> Option<Var> {
        self.lookup(&self.purchase, period, commodity)
    }

    /// `s[t,o]`
    pub fn storage(&self, period: &str, commodity: &str) -> Option<Var> {
        self.lookup(&self.storage, period, commodity)
    }

    /// `prod[t]`
    pub fn production(&self, period: &str) -> Option<Var> {
        Some(self.production[self.periods.position(period)?])
    }
}

impl Reportable<MultiPeriod> for MultiPeriodModel {
    fn kind(&self) -> ModelKind {
        ModelKind::MultiPeriod
    }

    fn labelled_variables(&self) -> Vec<LabelledVariable<MultiPeriod>> {
        let mut variables = Vec::new();
        for (t, period) in self.periods.iter().enumerate() {
            for (o, commodity) in self.partition.commodities().iter().enumerate() {
                let roles = [
                    (VariableRole::Bought, self.purchase[t][o]),
                    (VariableRole::Used, self.usage[t][o]),
                    (VariableRole::Stored, self.storage[t][o]),
                ];
                variables.extend(roles.into_iter().map(|(role, id)| LabelledVariable {
                    id,
                    role,
                    period: Some(period.clone()),
                    commodity: Some(commodity.clone()),
                    commodity_type: Some(self.partition.type_at(o).clone()),
                }));
            }
        }
        variables.extend(self.periods.iter().zip(&self.production).map(|(period, &id)| {
            LabelledVariable {
                id,
                role: VariableRole::Production,
                period: Some(period.clone()),
                commodity: None,
                commodity_type: None,
            }
        }));
        variables
    }
}

/// Build the multi-period formulation.
pub fn build(data: &PlanningData) -> Result<MultiPeriodModel, ValidationError> {
    check_finite("price", [data.price()])?;
    check_finite("hardness_min", [data.hardness_min()])?;
    check_finite("hardness_max", [data.hardness_max()])?;
    check_finite("hardness", data.hardness().iter().copied())?;
    check_finite("production_cap", data.production_cap().iter().copied())?;
    check_finite("storage_cost", data.storage_cost().iter().copied())?;
    check_finite("storage_cap", data.storage_cap().iter().copied())?;
    check_finite("start_inventory", data.start_inventory().iter().copied())?;
    check_finite("end_inventory", data.end_inventory().iter().copied())?;
    for t in 0..data.periods().len() {
        check_finite("cost", data.cost(t).iter().copied())?;
    }

    let partition = data.partition();
    let periods = data.periods();
    let commodities = partition.commodities();
    let mut builder = LPModelBuilder::<MultiPeriod>::new();

    let mut per_period = |prefix: &str| -> Vec<Vec<Var>> {
        periods
            .iter()
            .map(|t| {
                commodities
                    .iter()
                    .map(|o| builder.add_variable(format!("{prefix}[{t},{o}]"), 0.0, f64::INFINITY))
                    .collect()
            })
            .collect()
    };
    let usage = per_period("u");
    let purchase = per_period("b");
    let storage = per_period("s");
    let production: Vec<Var> = periods
        .iter()
        .map(|t| builder.add_variable(format!("prod[{t}]"), 0.0, f64::INFINITY))
        .collect();

    let mut objective = data.price() * production.iter().copied().sum::<LinearExpression<_>>();
    for t in 0..periods.len() {
        objective += -LinearExpression::weighted_sum(
            data.cost(t).iter().copied().zip(purchase[t].iter().copied()),
        );
        objective += -LinearExpression::weighted_sum(
            data.storage_cost().iter().copied().zip(storage[t].iter().copied()),
        );
    }
    builder.set_objective(objective, OptimisationSense::Maximise);

    for (t, period) in periods.iter().enumerate() {
        for (k, commodity_type) in partition.types().iter().enumerate() {
            let used: LinearExpression<_> = partition.members(k).iter().map(|&o| usage[t][o]).sum();
            builder.add_constraint(constraint!(
                format!("production_cap[{period},{commodity_type}]"),
                (used) <= data.production_cap()[k]
            ));
        }
    }

    for (t, period) in periods.iter().enumerate() {
        let previous = periods
            .predecessor(period.as_str())
            .and_then(|previous| periods.position(previous.as_str()));
        for (o, commodity) in commodities.iter().enumerate() {
            let carried = match previous {
                None => LinearExpression::new(data.start_inventory()[o]),
                Some(previous) => LinearExpression::from_variable(storage[previous][o]),
            };
            builder.add_constraint(constraint!(
                format!("balance_periods[{period},{commodity}]"),
                (purchase[t][o] + carried - usage[t][o] - storage[t][o]) == 0.0
            ));
        }
    }

    for (t, period) in periods.iter().enumerate() {
        let total: LinearExpression<_> = usage[t].iter().copied().sum();
        builder.add_constraint(constraint!(
            format!("balance_production[{period}]"),
            (production[t] - total) == 0.0
        ));
    }

    for (t, period) in periods.iter().enumerate() {
        let blend_hardness = || {
            LinearExpression::weighted_sum(
                data.hardness().iter().copied().zip(usage[t].iter().copied()),
            )
        };
        builder.add_constraint(constraint!(
            format!("hardness_min[{period}]"),
            (blend_hardness() - data.hardness_min() * production[t]) >= 0.0
        ));
        builder.add_constraint(constraint!(
            format!("hardness_max[{period}]"),
            (blend_hardness() - data.hardness_max() * production[t]) <= 0.0
        ));
    }

    for (t, period) in periods.iter().enumerate() {
        for (o, commodity) in commodities.iter().enumerate() {
            builder.add_constraint(constraint!(
                format!("storage_cap[{period},{commodity}]"),
                (storage[t][o]) <= data.storage_cap()[o]
            ));
        }
    }

    if let Some(last) = periods.position(periods.last().as_str()) {
        for (o, commodity) in commodities.iter().enumerate() {
            builder.add_constraint(constraint!(
                format!("end_inventory[{commodity}]"),
                (storage[last][o]) == data.end_inventory()[o]
            ));
        }
    }

    builder.add_constraint(hardness_window(data.hardness_min(), data.hardness_max()));

    let formulation = builder.build();
    debug!(
        periods = periods.len(),
        first = %periods.first(),
        last = %periods.last(),
        variables = formulation.num_variables(),
        constraints = formulation.num_constraints(),
        "built multi-period model"
    );

    Ok(MultiPeriodModel {
        formulation,
        partition: partition.clone(),
        periods: periods.clone(),
        usage,
        purchase,
        storage,
        production,
    })
}
