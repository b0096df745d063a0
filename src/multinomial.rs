//! Multinomial perceptron models.
//!
//! [`MultinomialAveragedPerceptron`] is the trainable learner. It owns a table of
//! [`AveragedWeight`] cells and a training clock, and learns online with the standard
//! perceptron update. [`MultinomialAveragedPerceptron::freeze`] produces an independent
//! [`MultinomialPerceptron`] whose weights are the time-averaged values; that frozen model is
//! what gets scored, evaluated and written to disk.
//!
//! Features are binary: a feature set is the list of features that fire, and the score of a
//! label is the sum of that label's weight over those features. Features absent from a sparse
//! outer table contribute nothing and are never materialized by scoring.
//!
//! Argmax ties are broken deterministically: lowest label index for integer labels, and the
//! lexicographically smallest label for string labels.

use crate::table::{LabelTable, Table};
use crate::topology::{Dense, Sparse, SparseDense, Topology};
use crate::weight::{AveragedWeight, Cell, Weight};

pub type DenseMultinomialPerceptron = MultinomialPerceptron<Dense>;
pub type SparseDenseMultinomialPerceptron = MultinomialPerceptron<SparseDense>;
pub type SparseMultinomialPerceptron = MultinomialPerceptron<Sparse>;

pub type DenseMultinomialAveragedPerceptron = MultinomialAveragedPerceptron<Dense>;
pub type SparseDenseMultinomialAveragedPerceptron = MultinomialAveragedPerceptron<SparseDense>;
pub type SparseMultinomialAveragedPerceptron = MultinomialAveragedPerceptron<Sparse>;

fn new_table<T: Topology, C: Cell>(outer_size: usize, inner_size: usize) -> T::Outer<C> {
    let inner = <T::Inner<C> as LabelTable>::zero_row(inner_size);
    <T::Outer<C> as Table>::with_value(outer_size, inner)
}

fn accumulate<T: Topology, C: Cell>(
    table: &T::Outer<C>,
    inner_size: usize,
    features: &[T::Feature],
) -> <T::Inner<C> as LabelTable>::Scores {
    let mut scores = <T::Inner<C> as LabelTable>::scores(inner_size);
    for feature in features {
        if let Some(inner) = table.find(feature) {
            inner.accumulate(&mut scores);
        }
    }
    scores
}

/// A frozen multinomial perceptron.
///
/// There are no mutating operations; a new model is obtained from
/// [`MultinomialAveragedPerceptron::freeze`] or by reading a model file. Scoring takes `&self`,
/// so one instance can be shared across threads for inference.
#[derive(Debug, Clone, PartialEq)]
pub struct MultinomialPerceptron<T: Topology> {
    table: T::Outer<Weight>,
    inner_size: usize,
}

impl<T: Topology> MultinomialPerceptron<T> {
    /// An all-zero model.
    ///
    /// `outer_size` is the number of features for a dense outer table, and a capacity hint for
    /// a sparse one. `inner_size` is the number of labels.
    pub fn new(outer_size: usize, inner_size: usize) -> Self {
        Self {
            table: new_table::<T, Weight>(outer_size, inner_size),
            inner_size,
        }
    }

    pub(crate) fn from_table(table: T::Outer<Weight>, inner_size: usize) -> Self {
        Self { table, inner_size }
    }

    #[inline]
    pub(crate) fn table(&self) -> &T::Outer<Weight> {
        &self.table
    }

    #[inline]
    pub fn outer_size(&self) -> usize {
        self.table.size()
    }

    #[inline]
    pub fn inner_size(&self) -> usize {
        self.inner_size
    }

    /// The highest-scoring label for `features`.
    ///
    /// Returns `None` only for string-labelled models when no feature has any label weight.
    /// Dense feature indices must be `< outer_size()`; dense label tables never return `None`
    /// unless `inner_size() == 0`.
    pub fn predict(&self, features: &[T::Feature]) -> Option<T::Label> {
        let scores = accumulate::<T, Weight>(&self.table, self.inner_size, features);
        <T::Inner<Weight> as LabelTable>::best(&scores)
    }

    /// Per-label scores for `features`.
    pub fn score(&self, features: &[T::Feature]) -> Vec<(T::Label, f32)> {
        let scores = accumulate::<T, Weight>(&self.table, self.inner_size, features);
        <T::Inner<Weight> as LabelTable>::ranked(scores)
    }

    /// The weight of `(feature, label)`; zero if the cell is absent.
    pub fn weight(&self, feature: &T::Feature, label: &T::Label) -> f32 {
        self.table
            .find(feature)
            .and_then(|inner| inner.find(label))
            .map_or(0.0, |w| w.get())
    }
}

/// A trainable multinomial perceptron with lazily averaged weights.
///
/// Not safe for concurrent mutation: every update depends on the clock and weights left by the
/// previous one.
#[derive(Debug, Clone, PartialEq)]
pub struct MultinomialAveragedPerceptron<T: Topology> {
    table: T::Outer<AveragedWeight>,
    inner_size: usize,
    time: u64,
}

impl<T: Topology> MultinomialAveragedPerceptron<T> {
    /// An all-zero learner with its clock at 0.
    pub fn new(outer_size: usize, inner_size: usize) -> Self {
        Self {
            table: new_table::<T, AveragedWeight>(outer_size, inner_size),
            inner_size,
            time: 0,
        }
    }

    #[inline]
    pub fn outer_size(&self) -> usize {
        self.table.size()
    }

    #[inline]
    pub fn inner_size(&self) -> usize {
        self.inner_size
    }

    /// Number of examples seen so far.
    #[inline]
    pub fn time(&self) -> u64 {
        self.time
    }

    /// Predict with the current (unaveraged) weights.
    pub fn predict(&self, features: &[T::Feature]) -> Option<T::Label> {
        let scores = accumulate::<T, AveragedWeight>(&self.table, self.inner_size, features);
        <T::Inner<AveragedWeight> as LabelTable>::best(&scores)
    }

    /// Score with the current (unaveraged) weights.
    pub fn score(&self, features: &[T::Feature]) -> Vec<(T::Label, f32)> {
        let scores = accumulate::<T, AveragedWeight>(&self.table, self.inner_size, features);
        <T::Inner<AveragedWeight> as LabelTable>::ranked(scores)
    }

    /// Learn from one labelled example and return the prediction made before the update.
    ///
    /// On a mistake every feature's gold-label weight goes up by one and its predicted-label
    /// weight goes down by one. The clock advances whether or not a mistake was made.
    pub fn train_one(&mut self, features: &[T::Feature], gold: &T::Label) -> Option<T::Label> {
        let predicted = self.predict(features);
        if predicted.as_ref() != Some(gold) {
            let time = self.time;
            for feature in features {
                let inner = self.table.mutable(feature);
                inner.mutable(gold).update(1.0, time);
                if let Some(label) = &predicted {
                    inner.mutable(label).update(-1.0, time);
                }
            }
        }
        self.time += 1;
        predicted
    }

    /// The cell for `(feature, label)`, if it has been materialized.
    pub fn weight(&self, feature: &T::Feature, label: &T::Label) -> Option<&AveragedWeight> {
        self.table.find(feature).and_then(|inner| inner.find(label))
    }

    /// Build an independent frozen model from the averaged weights.
    ///
    /// The learner is left untouched and may keep training afterwards.
    pub fn freeze(&self) -> MultinomialPerceptron<T> {
        let mut table = new_table::<T, Weight>(self.table.size(), self.inner_size);
        for (feature, inner) in self.table.iter() {
            let frozen = table.mutable(&feature);
            for (label, cell) in inner.iter() {
                if <T::Inner<AveragedWeight> as LabelTable>::is_reserved(&label) {
                    continue;
                }
                frozen.mutable(&label).set(cell.average(self.time));
            }
        }
        MultinomialPerceptron::from_table(table, self.inner_size)
    }
}

impl<T: Topology> From<&MultinomialAveragedPerceptron<T>> for MultinomialPerceptron<T> {
    fn from(model: &MultinomialAveragedPerceptron<T>) -> Self {
        model.freeze()
    }
}
