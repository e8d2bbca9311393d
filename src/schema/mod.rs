//! Input data for the blending models
//!
//! Data files are YAML documents with two top-level sections, plus an optional
//! `schema:` tag naming the model the file is meant for:
//!
//! ```yaml
//! schema: multi-period        # optional: single-period | multi-period
//! sets:
//!   O: [VEG1, VEG2, OIL1]
//!   OTYPE: [VEG, OIL]
//!   O_BY_TYPE:
//!     VEG: [VEG1, VEG2]
//!     OIL: [OIL1]
//!   T: [Jan, Feb]             # multi-period only
//! parameters:
//!   production_cap: {VEG: 200, OIL: 250}
//!   cost:                     # flat {oil: value}, or {period: {oil: value}}
//!     Jan: {VEG1: 110, VEG2: 120, OIL1: 130}
//!     Feb: {VEG1: 130, VEG2: 130, OIL1: 110}
//!   price: 150
//!   hardness: {VEG1: 8.8, VEG2: 6.1, OIL1: 2.0}
//!   hardness_min: 3
//!   hardness_max: 6
//!   storage_cost: {VEG1: 5, VEG2: 5, OIL1: 5}        # multi-period only
//!   storage_cap: {VEG1: 1000, VEG2: 1000, OIL1: 1000}
//!   start_inventory: {VEG1: 500, VEG2: 500, OIL1: 500}
//!   end_inventory: {VEG1: 500, VEG2: 500, OIL1: 500}
//! ```
//!
//! Loading is two-staged. [`RawData`] mirrors the document and tolerates any
//! missing key; [`BlendData`] and [`PlanningData`] are the validated,
//! immutable forms the model builders consume. Validation reports the first
//! problem found as a [`ValidationError`] and never yields partial data.
//!
//! Labels (commodities, types, periods) may be written as strings or integers
//! and are compared as text. Validated parameter values are stored densely in
//! declaration order, aligned with [`TypePartition::commodities`],
//! [`TypePartition::types`] and [`Periods`].

use std::borrow::Borrow;
use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Deserializer};

use crate::error::ValidationError;

pub mod partition;
pub mod periods;

pub use partition::TypePartition;
pub use periods::Periods;

#[cfg(test)]
pub mod test_helpers;

#[cfg(test)]
mod tests;

/// Identifier of a commodity, commodity type or period.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Label(String);

impl Label {
    pub fn new(label: impl Into<String>) -> Self {
        Self(label.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for Label {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Label {
    fn from(label: &str) -> Self {
        Self(label.to_string())
    }
}

impl From<String> for Label {
    fn from(label: String) -> Self {
        Self(label)
    }
}

impl<'de> Deserialize<'de> for Label {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Text(String),
            Integer(i64),
        }

        Ok(match Repr::deserialize(deserializer)? {
            Repr::Text(text) => Label(text),
            Repr::Integer(number) => Label(number.to_string()),
        })
    }
}

/// Which formulation a run builds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum ModelKind {
    SinglePeriod,
    MultiPeriod,
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelKind::SinglePeriod => write!(f, "single-period"),
            ModelKind::MultiPeriod => write!(f, "multi-period"),
        }
    }
}

/// A parameter indexed by label.
pub type Table = BTreeMap<Label, f64>;

/// The `cost` parameter in either of its two shapes.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum CostTable {
    /// `{oil: value}`: the cost of a single period.
    Flat(Table),
    /// `{period: {oil: value}}`.
    ByPeriod(BTreeMap<Label, Table>),
}

impl CostTable {
    /// The model kind this shape belongs to.
    pub fn kind(&self) -> ModelKind {
        match self {
            CostTable::Flat(_) => ModelKind::SinglePeriod,
            CostTable::ByPeriod(_) => ModelKind::MultiPeriod,
        }
    }
}

/// The `sets` section as written.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawSets {
    #[serde(rename = "O")]
    pub commodities: Option<Vec<Label>>,
    #[serde(rename = "OTYPE")]
    pub types: Option<Vec<Label>>,
    #[serde(rename = "O_BY_TYPE")]
    pub by_type: Option<BTreeMap<Label, Vec<Label>>>,
    #[serde(rename = "T")]
    pub periods: Option<Vec<Label>>,
}

/// The `parameters` section as written.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawParameters {
    pub production_cap: Option<Table>,
    pub cost: Option<CostTable>,
    pub price: Option<f64>,
    pub hardness: Option<Table>,
    pub hardness_min: Option<f64>,
    pub hardness_max: Option<f64>,
    pub storage_cost: Option<Table>,
    pub storage_cap: Option<Table>,
    pub start_inventory: Option<Table>,
    pub end_inventory: Option<Table>,
}

/// A data file as written, before validation.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawData {
    pub schema: Option<ModelKind>,
    pub sets: Option<RawSets>,
    pub parameters: Option<RawParameters>,
}

impl RawData {
    pub fn from_yaml(text: &str) -> Result<Self, ValidationError> {
        // An empty document is an empty mapping, not a parse error.
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(text).map_err(|err| ValidationError::Malformed(err.to_string()))
    }

    /// The model kind suggested by the data itself: the `schema:` tag if
    /// present, otherwise the shape of the cost table.
    pub fn declared_kind(&self) -> Option<ModelKind> {
        self.schema.or_else(|| {
            self.parameters
                .as_ref()
                .and_then(|p| p.cost.as_ref())
                .map(CostTable::kind)
        })
    }

    fn sets(&self) -> Result<&RawSets, ValidationError> {
        required(self.sets.as_ref(), "sets")
    }

    fn parameters(&self) -> Result<&RawParameters, ValidationError> {
        required(self.parameters.as_ref(), "parameters")
    }

    fn check_schema(&self, selected: ModelKind) -> Result<(), ValidationError> {
        match self.schema {
            Some(declared) if declared != selected => {
                Err(ValidationError::SchemaMismatch { declared, selected })
            }
            _ => Ok(()),
        }
    }

    fn partition(&self) -> Result<TypePartition, ValidationError> {
        let sets = self.sets()?;
        TypePartition::new(
            required(sets.types.clone(), "sets.OTYPE")?,
            required(sets.commodities.clone(), "sets.O")?,
            required(sets.by_type.as_ref(), "sets.O_BY_TYPE")?,
        )
    }
}

fn required<T>(value: Option<T>, key: &str) -> Result<T, ValidationError> {
    value.ok_or_else(|| ValidationError::MissingData {
        key: key.to_string(),
    })
}

/// Resolve a table against its index set: every index needs an entry and
/// every entry needs a declared index. `path` is the dotted key used in errors.
fn dense(table: &Table, path: &str, index: &[Label]) -> Result<Vec<f64>, ValidationError> {
    let values = index
        .iter()
        .map(|label| {
            table
                .get(label)
                .copied()
                .ok_or_else(|| ValidationError::MissingData {
                    key: format!("{path}.{label}"),
                })
        })
        .collect::<Result<Vec<_>, _>>()?;

    if let Some(unknown) = table.keys().find(|key| !index.contains(key)) {
        return Err(ValidationError::UnknownKey {
            table: path.to_string(),
            key: unknown.clone(),
        });
    }
    Ok(values)
}

fn parameter_table(
    table: Option<&Table>,
    name: &str,
    index: &[Label],
) -> Result<Vec<f64>, ValidationError> {
    let path = format!("parameters.{name}");
    let table = required(table, &path)?;
    dense(table, &path, index)
}

/// Validated data for one single-period blend.
#[derive(Debug, Clone, PartialEq)]
pub struct BlendData {
    partition: TypePartition,
    production_cap: Vec<f64>,
    cost: Vec<f64>,
    price: f64,
    hardness: Vec<f64>,
    hardness_min: f64,
    hardness_max: f64,
}

impl BlendData {
    /// Validate single-period data: the cost table must be flat.
    pub fn from_raw(raw: &RawData) -> Result<Self, ValidationError> {
        raw.check_schema(ModelKind::SinglePeriod)?;
        let partition = raw.partition()?;
        let parameters = raw.parameters()?;

        let cost = match required(parameters.cost.as_ref(), "parameters.cost")? {
            CostTable::Flat(table) => dense(table, "parameters.cost", partition.commodities())?,
            CostTable::ByPeriod(_) => {
                return Err(ValidationError::CostShapeMismatch {
                    expected: ModelKind::SinglePeriod,
                    found: ModelKind::MultiPeriod,
                });
            }
        };

        Self::assemble(partition, parameters, cost)
    }

    /// Validate a single-period blend over one period of per-period data.
    ///
    /// The cost table must be nested by period. The period must be declared in
    /// `sets.T` when that set is present, otherwise it must be a key of the
    /// cost table. The `schema:` tag is not checked: the file describes a
    /// horizon and this run deliberately takes one slice of it.
    pub fn from_raw_for_period(raw: &RawData, period: &str) -> Result<Self, ValidationError> {
        let partition = raw.partition()?;
        let parameters = raw.parameters()?;

        let by_period = match required(parameters.cost.as_ref(), "parameters.cost")? {
            CostTable::ByPeriod(by_period) => by_period,
            CostTable::Flat(_) => {
                return Err(ValidationError::CostShapeMismatch {
                    expected: ModelKind::MultiPeriod,
                    found: ModelKind::SinglePeriod,
                });
            }
        };

        let declared = match raw.sets()?.periods.as_ref() {
            Some(periods) => periods.iter().any(|p| p.as_str() == period),
            None => by_period.contains_key(period),
        };
        if !declared {
            return Err(ValidationError::UnknownPeriod {
                period: Label::from(period),
            });
        }

        let path = format!("parameters.cost.{period}");
        let table = required(by_period.get(period), &path)?;
        let cost = dense(table, &path, partition.commodities())?;

        Self::assemble(partition, parameters, cost)
    }

    fn assemble(
        partition: TypePartition,
        parameters: &RawParameters,
        cost: Vec<f64>,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            production_cap: parameter_table(
                parameters.production_cap.as_ref(),
                "production_cap",
                partition.types(),
            )?,
            hardness: parameter_table(
                parameters.hardness.as_ref(),
                "hardness",
                partition.commodities(),
            )?,
            price: required(parameters.price, "parameters.price")?,
            hardness_min: required(parameters.hardness_min, "parameters.hardness_min")?,
            hardness_max: required(parameters.hardness_max, "parameters.hardness_max")?,
            cost,
            partition,
        })
    }

    pub fn partition(&self) -> &TypePartition {
        &self.partition
    }

    pub fn commodities(&self) -> &[Label] {
        self.partition.commodities()
    }

    /// Production cap per type, aligned with [`TypePartition::types`].
    pub fn production_cap(&self) -> &[f64] {
        &self.production_cap
    }

    /// Cost per commodity, aligned with [`TypePartition::commodities`].
    pub fn cost(&self) -> &[f64] {
        &self.cost
    }

    pub fn price(&self) -> f64 {
        self.price
    }

    /// Hardness per commodity, aligned with [`TypePartition::commodities`].
    pub fn hardness(&self) -> &[f64] {
        &self.hardness
    }

    pub fn hardness_min(&self) -> f64 {
        self.hardness_min
    }

    pub fn hardness_max(&self) -> f64 {
        self.hardness_max
    }
}

/// Validated data for a multi-period plan.
#[derive(Debug, Clone, PartialEq)]
pub struct PlanningData {
    partition: TypePartition,
    periods: Periods,
    production_cap: Vec<f64>,
    /// `cost[t][o]`
    cost: Vec<Vec<f64>>,
    price: f64,
    hardness: Vec<f64>,
    hardness_min: f64,
    hardness_max: f64,
    storage_cost: Vec<f64>,
    storage_cap: Vec<f64>,
    start_inventory: Vec<f64>,
    end_inventory: Vec<f64>,
}

impl PlanningData {
    /// Validate multi-period data: `sets.T` is required and the cost table
    /// must be nested by period.
    pub fn from_raw(raw: &RawData) -> Result<Self, ValidationError> {
        raw.check_schema(ModelKind::MultiPeriod)?;
        let partition = raw.partition()?;
        let parameters = raw.parameters()?;
        let periods = Periods::new(required(raw.sets()?.periods.clone(), "sets.T")?)?;

        let by_period = match required(parameters.cost.as_ref(), "parameters.cost")? {
            CostTable::ByPeriod(by_period) => by_period,
            CostTable::Flat(_) => {
                return Err(ValidationError::CostShapeMismatch {
                    expected: ModelKind::MultiPeriod,
                    found: ModelKind::SinglePeriod,
                });
            }
        };
        let cost = periods
            .iter()
            .map(|period| {
                let path = format!("parameters.cost.{period}");
                let table = required(by_period.get(period), &path)?;
                dense(table, &path, partition.commodities())
            })
            .collect::<Result<Vec<_>, _>>()?;
        if let Some(unknown) = by_period.keys().find(|key| !periods.contains(key.as_str())) {
            return Err(ValidationError::UnknownKey {
                table: "parameters.cost".to_string(),
                key: unknown.clone(),
            });
        }

        let commodities = partition.commodities();
        Ok(Self {
            production_cap: parameter_table(
                parameters.production_cap.as_ref(),
                "production_cap",
                partition.types(),
            )?,
            price: required(parameters.price, "parameters.price")?,
            hardness: parameter_table(parameters.hardness.as_ref(), "hardness", commodities)?,
            hardness_min: required(parameters.hardness_min, "parameters.hardness_min")?,
            hardness_max: required(parameters.hardness_max, "parameters.hardness_max")?,
            storage_cost: parameter_table(
                parameters.storage_cost.as_ref(),
                "storage_cost",
                commodities,
            )?,
            storage_cap: parameter_table(
                parameters.storage_cap.as_ref(),
                "storage_cap",
                commodities,
            )?,
            start_inventory: parameter_table(
                parameters.start_inventory.as_ref(),
                "start_inventory",
                commodities,
            )?,
            end_inventory: parameter_table(
                parameters.end_inventory.as_ref(),
                "end_inventory",
                commodities,
            )?,
            cost,
            periods,
            partition,
        })
    }

    /// The single-period data of one period of the horizon.
    ///
    /// Storage and inventory parameters have no single-period counterpart and
    /// are left out.
    pub fn period_slice(&self, period: &str) -> Result<BlendData, ValidationError> {
        let t = self
            .periods
            .position(period)
            .ok_or_else(|| ValidationError::UnknownPeriod {
                period: Label::from(period),
            })?;
        Ok(BlendData {
            partition: self.partition.clone(),
            production_cap: self.production_cap.clone(),
            cost: self.cost[t].clone(),
            price: self.price,
            hardness: self.hardness.clone(),
            hardness_min: self.hardness_min,
            hardness_max: self.hardness_max,
        })
    }

    pub fn partition(&self) -> &TypePartition {
        &self.partition
    }

    pub fn commodities(&self) -> &[Label] {
        self.partition.commodities()
    }

    pub fn periods(&self) -> &Periods {
        &self.periods
    }

    pub fn production_cap(&self) -> &[f64] {
        &self.production_cap
    }

    /// Cost per commodity in the period at position `t`.
    pub fn cost(&self, t: usize) -> &[f64] {
        &self.cost[t]
    }

    pub fn price(&self) -> f64 {
        self.price
    }

    pub fn hardness(&self) -> &[f64] {
        &self.hardness
    }

    pub fn hardness_min(&self) -> f64 {
        self.hardness_min
    }

    pub fn hardness_max(&self) -> f64 {
        self.hardness_max
    }

    pub fn storage_cost(&self) -> &[f64] {
        &self.storage_cost
    }

    pub fn storage_cap(&self) -> &[f64] {
        &self.storage_cap
    }

    pub fn start_inventory(&self) -> &[f64] {
        &self.start_inventory
    }

    pub fn end_inventory(&self) -> &[f64] {
        &self.end_inventory
    }
}
