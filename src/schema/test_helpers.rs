//! Shared data fixtures for unit tests.

use super::{BlendData, PlanningData, RawData};

/// Two commodities of one type; the optimum blends A:B = 2:1.
pub const TWO_OILS: &str = r#"
sets:
  O: [A, B]
  OTYPE: [OIL]
  O_BY_TYPE:
    OIL: [A, B]
parameters:
  production_cap: {OIL: 100}
  cost: {A: 10, B: 20}
  price: 50
  hardness: {A: 5, B: 8}
  hardness_min: 6
  hardness_max: 7
"#;

/// Optimal objective of [`TWO_OILS`].
pub const TWO_OILS_OPTIMUM: f64 = 11000.0 / 3.0;

/// The classic food manufacture blending problem over six months.
pub const FOOD_MANUFACTURE: &str = r#"
schema: multi-period
sets:
  O: [VEG1, VEG2, OIL1, OIL2, OIL3]
  OTYPE: [VEG, OIL]
  O_BY_TYPE:
    VEG: [VEG1, VEG2]
    OIL: [OIL1, OIL2, OIL3]
  T: [Jan, Feb, Mar, Apr, May, Jun]
parameters:
  production_cap: {VEG: 200, OIL: 250}
  cost:
    Jan: {VEG1: 110, VEG2: 120, OIL1: 130, OIL2: 110, OIL3: 115}
    Feb: {VEG1: 130, VEG2: 130, OIL1: 110, OIL2: 90, OIL3: 115}
    Mar: {VEG1: 110, VEG2: 140, OIL1: 130, OIL2: 100, OIL3: 95}
    Apr: {VEG1: 120, VEG2: 110, OIL1: 120, OIL2: 120, OIL3: 125}
    May: {VEG1: 100, VEG2: 120, OIL1: 150, OIL2: 110, OIL3: 105}
    Jun: {VEG1: 90, VEG2: 100, OIL1: 140, OIL2: 80, OIL3: 135}
  price: 150
  hardness: {VEG1: 8.8, VEG2: 6.1, OIL1: 2.0, OIL2: 4.2, OIL3: 5.0}
  hardness_min: 3
  hardness_max: 6
  storage_cost: {VEG1: 5, VEG2: 5, OIL1: 5, OIL2: 5, OIL3: 5}
  storage_cap: {VEG1: 1000, VEG2: 1000, OIL1: 1000, OIL2: 1000, OIL3: 1000}
  start_inventory: {VEG1: 500, VEG2: 500, OIL1: 500, OIL2: 500, OIL3: 500}
  end_inventory: {VEG1: 500, VEG2: 500, OIL1: 500, OIL2: 500, OIL3: 500}
"#;

/// Optimal profit of [`FOOD_MANUFACTURE`].
pub const FOOD_MANUFACTURE_OPTIMUM: f64 = 107842.59;

/// A one-period horizon with no inventory carried in or out, so it has the
/// same optimum as the single-period blend over January.
pub const ONE_MONTH: &str = r#"
sets:
  O: [VEG1, VEG2, OIL1, OIL2, OIL3]
  OTYPE: [VEG, OIL]
  O_BY_TYPE:
    VEG: [VEG1, VEG2]
    OIL: [OIL1, OIL2, OIL3]
  T: [Jan]
parameters:
  production_cap: {VEG: 200, OIL: 250}
  cost:
    Jan: {VEG1: 110, VEG2: 120, OIL1: 130, OIL2: 110, OIL3: 115}
  price: 150
  hardness: {VEG1: 8.8, VEG2: 6.1, OIL1: 2.0, OIL2: 4.2, OIL3: 5.0}
  hardness_min: 3
  hardness_max: 6
  storage_cost: {VEG1: 5, VEG2: 5, OIL1: 5, OIL2: 5, OIL3: 5}
  storage_cap: {VEG1: 1000, VEG2: 1000, OIL1: 1000, OIL2: 1000, OIL3: 1000}
  start_inventory: {VEG1: 0, VEG2: 0, OIL1: 0, OIL2: 0, OIL3: 0}
  end_inventory: {VEG1: 0, VEG2: 0, OIL1: 0, OIL2: 0, OIL3: 0}
"#;

pub fn raw(yaml: &str) -> RawData {
    RawData::from_yaml(yaml).expect("fixture should parse")
}

pub fn blend(yaml: &str) -> BlendData {
    BlendData::from_raw(&raw(yaml)).expect("fixture should validate")
}

pub fn planning(yaml: &str) -> PlanningData {
    PlanningData::from_raw(&raw(yaml)).expect("fixture should validate")
}

/// Apply a textual substitution to a fixture, panicking if it does not apply.
pub fn edit(yaml: &str, from: &str, to: &str) -> String {
    assert!(yaml.contains(from), "fixture does not contain `{from}`");
    yaml.replacen(from, to, 1)
}
