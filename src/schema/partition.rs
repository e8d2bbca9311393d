//! Assignment of commodities to commodity types.

use std::collections::{BTreeMap, HashMap};

use crate::error::ValidationError;

use super::Label;

/// Eagerly validated partition of the commodity set by type.
///
/// Every commodity belongs to exactly one declared type. Types keep their
/// declared order; members of a type keep the order they were listed in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypePartition {
    commodities: Vec<Label>,
    types: Vec<Label>,
    /// Member commodity indices per type index.
    members: Vec<Vec<usize>>,
    /// Type index per commodity index.
    owner: Vec<usize>,
    commodity_index: HashMap<Label, usize>,
}

fn index_labels(
    labels: &[Label],
    set: &'static str,
) -> Result<HashMap<Label, usize>, ValidationError> {
    let mut index = HashMap::with_capacity(labels.len());
    for (position, label) in labels.iter().enumerate() {
        if index.insert(label.clone(), position).is_some() {
            return Err(ValidationError::DuplicateLabel {
                set,
                label: label.clone(),
            });
        }
    }
    Ok(index)
}

impl TypePartition {
    pub fn new(
        types: Vec<Label>,
        commodities: Vec<Label>,
        by_type: &BTreeMap<Label, Vec<Label>>,
    ) -> Result<Self, ValidationError> {
        let commodity_index = index_labels(&commodities, "O")?;
        let type_index = index_labels(&types, "OTYPE")?;

        let mut members = vec![Vec::new(); types.len()];
        let mut owner: Vec<Option<usize>> = vec![None; commodities.len()];

        for (commodity_type, listed) in by_type {
            let &t = type_index
                .get(commodity_type)
                .ok_or_else(|| ValidationError::UndeclaredType {
                    commodity_type: commodity_type.clone(),
                })?;
            for commodity in listed {
                let &o = commodity_index.get(commodity).ok_or_else(|| {
                    ValidationError::UnknownCommodity {
                        commodity: commodity.clone(),
                        commodity_type: commodity_type.clone(),
                    }
                })?;
                if let Some(first) = owner[o] {
                    return Err(ValidationError::DuplicateAssignment {
                        commodity: commodity.clone(),
                        first: types[first].clone(),
                        second: commodity_type.clone(),
                    });
                }
                owner[o] = Some(t);
                members[t].push(o);
            }
        }

        let owner = owner
            .into_iter()
            .zip(&commodities)
            .map(|(t, commodity)| {
                t.ok_or_else(|| ValidationError::UnassignedCommodity {
                    commodity: commodity.clone(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            commodities,
            types,
            members,
            owner,
            commodity_index,
        })
    }

    pub fn commodities(&self) -> &[Label] {
        &self.commodities
    }

    pub fn types(&self) -> &[Label] {
        &self.types
    }

    /// Indices (into [`commodities`](Self::commodities)) of the members of
    /// the type at `type_index`.
    pub fn members(&self, type_index: usize) -> &[usize] {
        &self.members[type_index]
    }

    /// Type label of the commodity at `commodity_index`.
    pub fn type_at(&self, commodity_index: usize) -> &Label {
        &self.types[self.owner[commodity_index]]
    }

    pub fn commodity_index(&self, commodity: &str) -> Option<usize> {
        self.commodity_index.get(commodity).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(names: &[&str]) -> Vec<Label> {
        names.iter().copied().map(Label::from).collect()
    }

    fn by_type(entries: &[(&str, &[&str])]) -> BTreeMap<Label, Vec<Label>> {
        entries
            .iter()
            .map(|(t, members)| (Label::from(*t), labels(members)))
            .collect()
    }

    #[test]
    fn test_valid_partition() {
        let partition = TypePartition::new(
            labels(&["VEG", "OIL"]),
            labels(&["VEG1", "VEG2", "OIL1"]),
            &by_type(&[("VEG", &["VEG2", "VEG1"]), ("OIL", &["OIL1"])]),
        )
        .unwrap();

        let veg: Vec<_> = partition
            .members(0)
            .iter()
            .map(|&o| partition.commodities()[o].as_str())
            .collect();
        assert_eq!(veg, vec!["VEG2", "VEG1"]);
        let oil1 = partition.commodity_index("OIL1").unwrap();
        assert_eq!(partition.type_at(oil1).as_str(), "OIL");
        assert_eq!(partition.type_at(0).as_str(), "VEG");
        assert_eq!(partition.members(1), &[2]);
        assert_eq!(partition.commodity_index("SEED1"), None);
    }

    #[test]
    fn test_declared_type_without_members() {
        let partition = TypePartition::new(
            labels(&["VEG", "SEED"]),
            labels(&["VEG1"]),
            &by_type(&[("VEG", &["VEG1"])]),
        )
        .unwrap();
        assert_eq!(partition.types().len(), 2);
        assert!(partition.members(1).is_empty());
    }

    #[test]
    fn test_undeclared_type() {
        let err = TypePartition::new(
            labels(&["VEG"]),
            labels(&["VEG1", "OIL1"]),
            &by_type(&[("VEG", &["VEG1"]), ("OIL", &["OIL1"])]),
        )
        .unwrap_err();
        assert_eq!(
            err,
            ValidationError::UndeclaredType {
                commodity_type: Label::from("OIL")
            }
        );
    }

    #[test]
    fn test_unknown_commodity() {
        let err = TypePartition::new(
            labels(&["VEG"]),
            labels(&["VEG1"]),
            &by_type(&[("VEG", &["VEG1", "VEG9"])]),
        )
        .unwrap_err();
        assert!(matches!(err, ValidationError::UnknownCommodity { .. }));
    }

    #[test]
    fn test_commodity_in_two_types() {
        let err = TypePartition::new(
            labels(&["OIL", "VEG"]),
            labels(&["VEG1"]),
            &by_type(&[("VEG", &["VEG1"]), ("OIL", &["VEG1"])]),
        )
        .unwrap_err();
        // Types are visited in label order.
        assert_eq!(
            err,
            ValidationError::DuplicateAssignment {
                commodity: Label::from("VEG1"),
                first: Label::from("OIL"),
                second: Label::from("VEG"),
            }
        );
    }

    #[test]
    fn test_unassigned_commodity() {
        let err = TypePartition::new(
            labels(&["VEG"]),
            labels(&["VEG1", "VEG2"]),
            &by_type(&[("VEG", &["VEG1"])]),
        )
        .unwrap_err();
        assert_eq!(
            err,
            ValidationError::UnassignedCommodity {
                commodity: Label::from("VEG2")
            }
        );
    }

    #[test]
    fn test_duplicate_labels() {
        let err = TypePartition::new(
            labels(&["VEG"]),
            labels(&["VEG1", "VEG1"]),
            &by_type(&[("VEG", &["VEG1"])]),
        )
        .unwrap_err();
        assert!(matches!(err, ValidationError::DuplicateLabel { set: "O", .. }));
    }
}
