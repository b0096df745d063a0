//! Labelled example containers.
//!
//! Features are binary, so an example is just the list of features that fire plus its gold
//! label. `Dataset` keeps examples in insertion order; the training loop decides the visiting
//! order.

use crate::{Error, Result};

/// One labelled feature set.
#[derive(Debug, Clone, PartialEq)]
pub struct Example<F, L> {
    pub features: Vec<F>,
    pub label: L,
}

impl<F, L> Example<F, L> {
    pub fn new(features: Vec<F>, label: L) -> Self {
        Self { features, label }
    }
}

/// A collection of labelled examples.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset<F, L> {
    examples: Vec<Example<F, L>>,
}

impl<F, L> Default for Dataset<F, L> {
    fn default() -> Self {
        Self {
            examples: Vec::new(),
        }
    }
}

impl<F, L> Dataset<F, L> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a dataset from examples.
    pub fn from_examples(examples: Vec<Example<F, L>>) -> Self {
        Self { examples }
    }

    /// Build a dataset from parallel feature and label lists.
    pub fn from_pairs(features: Vec<Vec<F>>, labels: Vec<L>) -> Result<Self> {
        if features.len() != labels.len() {
            return Err(Error::InvalidData(format!(
                "features/labels length mismatch: {} vs {}",
                features.len(),
                labels.len()
            )));
        }
        let examples = features
            .into_iter()
            .zip(labels)
            .map(|(features, label)| Example { features, label })
            .collect();
        Ok(Self { examples })
    }

    pub fn push(&mut self, features: Vec<F>, label: L) {
        self.examples.push(Example { features, label });
    }

    #[inline]
    /// Returns the number of examples.
    pub fn len(&self) -> usize {
        self.examples.len()
    }

    #[inline]
    /// Returns true if there are no examples.
    pub fn is_empty(&self) -> bool {
        self.examples.is_empty()
    }

    #[inline]
    /// Returns the `idx`-th example.
    ///
    /// Panics if `idx >= len`.
    pub fn example(&self, idx: usize) -> &Example<F, L> {
        &self.examples[idx]
    }

    pub fn iter(&self) -> impl Iterator<Item = &Example<F, L>> {
        self.examples.iter()
    }
}
