use super::test_helpers::*;
use super::*;

#[test]
fn test_blend_data_from_flat_costs() {
    let data = blend(TWO_OILS);
    assert_eq!(data.commodities(), &[Label::from("A"), Label::from("B")]);
    assert_eq!(data.cost(), &[10.0, 20.0]);
    assert_eq!(data.hardness(), &[5.0, 8.0]);
    assert_eq!(data.production_cap(), &[100.0]);
    assert_eq!(data.price(), 50.0);
    assert_eq!((data.hardness_min(), data.hardness_max()), (6.0, 7.0));
}

#[test]
fn test_integer_labels_are_text() {
    let yaml = r#"
sets:
  O: [1, 2]
  OTYPE: [10]
  O_BY_TYPE: {10: [2, 1]}
parameters:
  production_cap: {10: 5}
  cost: {1: 1, 2: 2}
  price: 3
  hardness: {1: 1, 2: 2}
  hardness_min: 1
  hardness_max: 2
"#;
    let data = blend(yaml);
    let partition = data.partition();
    let first = partition.commodity_index("1").unwrap();
    assert_eq!(partition.type_at(first).as_str(), "10");
    assert_eq!(data.cost(), &[1.0, 2.0]);
}

#[test]
fn test_planning_data_layout() {
    let data = planning(FOOD_MANUFACTURE);
    assert_eq!(data.periods().len(), 6);
    assert_eq!(data.periods().first().as_str(), "Jan");
    assert_eq!(data.periods().last().as_str(), "Jun");
    assert_eq!(data.cost(1), &[130.0, 130.0, 110.0, 90.0, 115.0]);
    assert_eq!(data.storage_cap(), &[1000.0; 5]);
    assert_eq!(data.start_inventory(), &[500.0; 5]);
}

#[test]
fn test_period_slice() {
    let data = planning(FOOD_MANUFACTURE);
    let march = data.period_slice("Mar").unwrap();
    assert_eq!(march.cost(), &[110.0, 140.0, 130.0, 100.0, 95.0]);
    assert_eq!(march.hardness(), data.hardness());

    assert_eq!(
        data.period_slice("Dec"),
        Err(ValidationError::UnknownPeriod {
            period: Label::from("Dec")
        })
    );
}

#[test]
fn test_fixed_period_run_matches_slice() {
    let raw = raw(FOOD_MANUFACTURE);
    let direct = BlendData::from_raw_for_period(&raw, "Apr").unwrap();
    let sliced = PlanningData::from_raw(&raw).unwrap().period_slice("Apr").unwrap();
    assert_eq!(direct, sliced);

    assert!(matches!(
        BlendData::from_raw_for_period(&raw, "Sep"),
        Err(ValidationError::UnknownPeriod { .. })
    ));
    assert!(matches!(
        BlendData::from_raw_for_period(&super::test_helpers::raw(TWO_OILS), "Jan"),
        Err(ValidationError::CostShapeMismatch { .. })
    ));
}

#[test]
fn test_missing_keys_name_their_path() {
    let cases = [
        (edit(TWO_OILS, "  price: 50\n", ""), "parameters.price"),
        (edit(TWO_OILS, ", B: 8}", "}"), "parameters.hardness.B"),
        (edit(TWO_OILS, "  OTYPE: [OIL]\n", ""), "sets.OTYPE"),
        (
            edit(FOOD_MANUFACTURE, "  T: [Jan, Feb, Mar, Apr, May, Jun]\n", ""),
            "sets.T",
        ),
        (
            edit(FOOD_MANUFACTURE, ", OIL3: 135}", "}"),
            "parameters.cost.Jun.OIL3",
        ),
        (
            edit(FOOD_MANUFACTURE, "  storage_cost: {VEG1: 5, VEG2: 5, OIL1: 5, OIL2: 5, OIL3: 5}\n", ""),
            "parameters.storage_cost",
        ),
    ];

    for (yaml, key) in cases {
        let raw = raw(&yaml);
        let err = match raw.declared_kind() {
            Some(ModelKind::MultiPeriod) => PlanningData::from_raw(&raw).unwrap_err(),
            _ => BlendData::from_raw(&raw).unwrap_err(),
        };
        assert_eq!(
            err,
            ValidationError::MissingData {
                key: key.to_string()
            },
            "while removing {key}"
        );
    }
}

#[test]
fn test_undeclared_type_is_rejected() {
    let yaml = edit(TWO_OILS, "OIL: [A, B]", "OIL: [A]\n    SEED: [B]");
    assert_eq!(
        BlendData::from_raw(&raw(&yaml)),
        Err(ValidationError::UndeclaredType {
            commodity_type: Label::from("SEED")
        })
    );
}

#[test]
fn test_unknown_parameter_key() {
    let yaml = edit(TWO_OILS, "hardness: {A: 5, B: 8}", "hardness: {A: 5, B: 8, C: 1}");
    assert_eq!(
        BlendData::from_raw(&raw(&yaml)),
        Err(ValidationError::UnknownKey {
            table: "parameters.hardness".to_string(),
            key: Label::from("C"),
        })
    );

    let yaml = edit(FOOD_MANUFACTURE, "    Jun:", "    Jul: {}\n    Jun:");
    assert!(matches!(
        PlanningData::from_raw(&raw(&yaml)),
        Err(ValidationError::UnknownKey { .. })
    ));
}

#[test]
fn test_cost_shape_must_match_model() {
    assert_eq!(
        PlanningData::from_raw(&raw(&edit(TWO_OILS, "sets:\n", "sets:\n  T: [Jan]\n"))),
        Err(ValidationError::CostShapeMismatch {
            expected: ModelKind::MultiPeriod,
            found: ModelKind::SinglePeriod,
        })
    );

    let untagged = edit(FOOD_MANUFACTURE, "schema: multi-period\n", "");
    assert_eq!(
        BlendData::from_raw(&raw(&untagged)),
        Err(ValidationError::CostShapeMismatch {
            expected: ModelKind::SinglePeriod,
            found: ModelKind::MultiPeriod,
        })
    );
}

#[test]
fn test_schema_tag_must_match_model() {
    assert_eq!(
        BlendData::from_raw(&raw(FOOD_MANUFACTURE)),
        Err(ValidationError::SchemaMismatch {
            declared: ModelKind::MultiPeriod,
            selected: ModelKind::SinglePeriod,
        })
    );
}

#[test]
fn test_declared_kind() {
    assert_eq!(raw(TWO_OILS).declared_kind(), Some(ModelKind::SinglePeriod));
    assert_eq!(raw(ONE_MONTH).declared_kind(), Some(ModelKind::MultiPeriod));
    assert_eq!(raw(FOOD_MANUFACTURE).declared_kind(), Some(ModelKind::MultiPeriod));
    assert_eq!(RawData::default().declared_kind(), None);
}

#[test]
fn test_empty_period_sequence() {
    let yaml = edit(ONE_MONTH, "T: [Jan]", "T: []");
    assert_eq!(
        PlanningData::from_raw(&raw(&yaml)),
        Err(ValidationError::EmptyPeriods)
    );
}

#[test]
fn test_malformed_and_empty_documents() {
    assert!(matches!(
        RawData::from_yaml("sets: [unterminated"),
        Err(ValidationError::Malformed(_))
    ));
    assert!(matches!(
        RawData::from_yaml("parameters:\n  cost: cheap\n"),
        Err(ValidationError::Malformed(_))
    ));

    let empty = RawData::from_yaml("  \n").unwrap();
    assert_eq!(
        BlendData::from_raw(&empty),
        Err(ValidationError::MissingData {
            key: "sets".to_string()
        })
    );
}
