//! The ordered planning horizon.

use std::collections::HashMap;

use crate::error::ValidationError;

use super::Label;

/// A non-empty, duplicate-free, ordered sequence of period labels.
///
/// Order is the order the labels were declared in. Labels are opaque: the
/// predecessor of `Feb` is whatever was declared before it, never the result of
/// arithmetic on the label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Periods {
    labels: Vec<Label>,
    index: HashMap<Label, usize>,
}

impl Periods {
    pub fn new(labels: Vec<Label>) -> Result<Self, ValidationError> {
        if labels.is_empty() {
            return Err(ValidationError::EmptyPeriods);
        }
        let mut index = HashMap::with_capacity(labels.len());
        for (position, label) in labels.iter().enumerate() {
            if index.insert(label.clone(), position).is_some() {
                return Err(ValidationError::DuplicateLabel {
                    set: "T",
                    label: label.clone(),
                });
            }
        }
        Ok(Self { labels, index })
    }

    pub fn first(&self) -> &Label {
        &self.labels[0]
    }

    pub fn last(&self) -> &Label {
        &self.labels[self.labels.len() - 1]
    }

    /// The period declared immediately before `period`; `None` for the first
    /// period and for labels outside the horizon.
    pub fn predecessor(&self, period: &str) -> Option<&Label> {
        let position = self.position(period)?;
        position.checked_sub(1).map(|p| &self.labels[p])
    }

    pub fn position(&self, period: &str) -> Option<usize> {
        self.index.get(period).copied()
    }

    pub fn contains(&self, period: &str) -> bool {
        self.index.contains_key(period)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Label> {
        self.labels.iter()
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Always false; kept for symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        false
    }
}

impl<'a> IntoIterator for &'a Periods {
    type Item = &'a Label;
    type IntoIter = std::slice::Iter<'a, Label>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
