//! Weight tables.
//!
//! A [`Table`] maps an index to a value. Two storage strategies implement it:
//!
//! - [`DenseTable`]: a fixed-size array indexed by `usize`. Every slot exists from
//!   construction. Indexing outside `[0, size)` is a caller bug and panics.
//! - [`SparseTable`]: a hash map that materializes entries on first write. Reads of absent
//!   indices see the table's zero value without creating anything.
//!
//! Tables nest: an outer table maps a feature to an inner table, and the inner table maps a
//! label to a weight cell. Inner tables additionally implement [`LabelTable`], which knows how
//! to accumulate per-label scores and pick the winning label.
//!
//! For string-keyed tables the empty string is reserved and must never be used as a feature
//! or label.

use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;

use crate::weight::Cell;

/// Uniform get/mutate/iterate interface over a table of values.
pub trait Table: Clone + PartialEq + fmt::Debug {
    type Index: Clone + PartialEq + fmt::Debug;
    type Value: Clone + PartialEq + fmt::Debug;

    /// Build a table of logical size `size` whose slots read as `value`.
    ///
    /// Dense tables allocate `size` copies. Sparse tables treat `size` as a capacity hint and
    /// keep `value` as the zero returned for absent entries.
    fn with_value(size: usize, value: Self::Value) -> Self;

    /// Dense: the fixed capacity. Sparse: the number of materialized entries.
    fn size(&self) -> usize;

    /// The value at `index`, or the zero value if a sparse entry is absent.
    fn get(&self, index: &Self::Index) -> &Self::Value;

    /// The value at `index` only if it is materialized.
    fn find(&self, index: &Self::Index) -> Option<&Self::Value>;

    /// Mutable access to `index`, creating a sparse entry if it is absent.
    fn mutable(&mut self, index: &Self::Index) -> &mut Self::Value;

    /// All present entries. Dense tables yield every slot in index order; sparse tables yield
    /// materialized entries in hash order.
    fn iter(&self) -> impl Iterator<Item = (Self::Index, &Self::Value)>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct DenseTable<V> {
    values: Vec<V>,
}

impl<V> DenseTable<V> {
    /// Wrap existing values; the table size is `values.len()`.
    pub fn from_values(values: Vec<V>) -> Self {
        Self { values }
    }

    #[inline]
    pub fn as_slice(&self) -> &[V] {
        &self.values
    }
}

impl<V: Clone + PartialEq + fmt::Debug> Table for DenseTable<V> {
    type Index = usize;
    type Value = V;

    fn with_value(size: usize, value: V) -> Self {
        Self {
            values: vec![value; size],
        }
    }

    #[inline]
    fn size(&self) -> usize {
        self.values.len()
    }

    #[inline]
    fn get(&self, index: &usize) -> &V {
        &self.values[*index]
    }

    #[inline]
    fn find(&self, index: &usize) -> Option<&V> {
        self.values.get(*index)
    }

    #[inline]
    fn mutable(&mut self, index: &usize) -> &mut V {
        &mut self.values[*index]
    }

    fn iter(&self) -> impl Iterator<Item = (usize, &V)> {
        self.values.iter().enumerate()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SparseTable<K: Eq + Hash, V> {
    values: HashMap<K, V>,
    zero: V,
}

impl<K, V> Table for SparseTable<K, V>
where
    K: Eq + Hash + Clone + fmt::Debug,
    V: Clone + PartialEq + fmt::Debug,
{
    type Index = K;
    type Value = V;

    fn with_value(size: usize, value: V) -> Self {
        Self {
            values: HashMap::with_capacity(size),
            zero: value,
        }
    }

    #[inline]
    fn size(&self) -> usize {
        self.values.len()
    }

    #[inline]
    fn get(&self, index: &K) -> &V {
        self.values.get(index).unwrap_or(&self.zero)
    }

    #[inline]
    fn find(&self, index: &K) -> Option<&V> {
        self.values.get(index)
    }

    fn mutable(&mut self, index: &K) -> &mut V {
        let zero = &self.zero;
        self.values
            .entry(index.clone())
            .or_insert_with(|| zero.clone())
    }

    fn iter(&self) -> impl Iterator<Item = (K, &V)> {
        self.values.iter().map(|(k, v)| (k.clone(), v))
    }
}

/// An inner table whose indices are labels.
///
/// `Scores` is the accumulator used while scoring one feature set: a per-label running sum.
pub trait LabelTable: Table {
    type Scores: fmt::Debug;

    /// The all-zero row cloned into every new feature of a model with `labels` labels.
    fn zero_row(labels: usize) -> Self;

    /// An empty accumulator for a table of `size` labels.
    fn scores(size: usize) -> Self::Scores;

    /// Add every present weight of this table to `scores`.
    fn accumulate(&self, scores: &mut Self::Scores);

    /// Highest-scoring label, or `None` if no label has been scored.
    fn best(scores: &Self::Scores) -> Option<Self::Index>;

    /// All scored labels with their totals, in a deterministic order.
    fn ranked(scores: Self::Scores) -> Vec<(Self::Index, f32)>;

    /// Whether `index` is the reserved key that must never reach a model file.
    fn is_reserved(_index: &Self::Index) -> bool {
        false
    }
}

/// Dense labels: every label in `[0, size)` is a candidate. Ties go to the lowest index.
impl<C: Cell> LabelTable for DenseTable<C> {
    type Scores = Vec<f32>;

    fn zero_row(labels: usize) -> Self {
        Self::with_value(labels, C::default())
    }

    fn scores(size: usize) -> Vec<f32> {
        vec![0.0; size]
    }

    #[inline]
    fn accumulate(&self, scores: &mut Vec<f32>) {
        for (total, cell) in scores.iter_mut().zip(&self.values) {
            *total += cell.get();
        }
    }

    fn best(scores: &Vec<f32>) -> Option<usize> {
        let mut best: Option<(usize, f32)> = None;
        for (label, &score) in scores.iter().enumerate() {
            match best {
                Some((_, top)) if score <= top => {}
                _ => best = Some((label, score)),
            }
        }
        best.map(|(label, _)| label)
    }

    fn ranked(scores: Vec<f32>) -> Vec<(usize, f32)> {
        scores.into_iter().enumerate().collect()
    }
}

/// Sparse labels: only labels present in some scored inner table are candidates. Ties go to
/// the lexicographically smallest label.
impl<C: Cell> LabelTable for SparseTable<String, C> {
    type Scores = HashMap<String, f32>;

    // `labels` is only a count; the row grows with the labels a feature actually sees.
    fn zero_row(_labels: usize) -> Self {
        Self::with_value(0, C::default())
    }

    fn scores(_size: usize) -> HashMap<String, f32> {
        HashMap::new()
    }

    fn accumulate(&self, scores: &mut HashMap<String, f32>) {
        for (label, cell) in &self.values {
            if let Some(total) = scores.get_mut(label) {
                *total += cell.get();
            } else {
                scores.insert(label.clone(), cell.get());
            }
        }
    }

    fn best(scores: &HashMap<String, f32>) -> Option<String> {
        let mut best: Option<(&String, f32)> = None;
        for (label, &score) in scores {
            match best {
                Some((top_label, top)) if score < top || (score == top && label > top_label) => {}
                _ => best = Some((label, score)),
            }
        }
        best.map(|(label, _)| label.clone())
    }

    fn ranked(scores: HashMap<String, f32>) -> Vec<(String, f32)> {
        let mut ranked: Vec<(String, f32)> = scores.into_iter().collect();
        ranked.sort_by(|a, b| a.0.cmp(&b.0));
        ranked
    }

    fn is_reserved(index: &String) -> bool {
        index.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::weight::Weight;

    #[test]
    fn dense_table_has_all_slots_from_construction() {
        let table = DenseTable::with_value(3, Weight::default());
        assert_eq!(table.size(), 3);
        let indices: Vec<usize> = table.iter().map(|(i, _)| i).collect();
        assert_eq!(indices, vec![0, 1, 2]);
        assert!(table.find(&3).is_none());
    }

    #[test]
    fn sparse_get_does_not_materialize() {
        let mut table: SparseTable<String, Weight> = SparseTable::with_value(4, Weight::default());
        assert_eq!(table.get(&"bias".to_owned()).get(), 0.0);
        assert_eq!(table.size(), 0);

        table.mutable(&"bias".to_owned()).set(2.0);
        assert_eq!(table.size(), 1);
        assert_eq!(table.get(&"bias".to_owned()).get(), 2.0);
        assert!(table.find(&"other".to_owned()).is_none());
    }

    #[test]
    fn sparse_outer_creates_inner_tables_lazily() {
        let inner = DenseTable::with_value(2, Weight::default());
        let mut outer: SparseTable<String, DenseTable<Weight>> = SparseTable::with_value(0, inner);
        outer.mutable(&"tok=foo".to_owned()).mutable(&1).set(1.0);

        let created = outer.get(&"tok=foo".to_owned());
        assert_eq!(created.size(), 2);
        assert_eq!(created.get(&0).get(), 0.0);
        assert_eq!(created.get(&1).get(), 1.0);
        assert_eq!(outer.get(&"missing".to_owned()).size(), 2);
    }

    #[test]
    fn dense_best_prefers_lowest_index_on_ties() {
        let scores = vec![1.0, 3.0, 3.0, -2.0];
        assert_eq!(<DenseTable<Weight> as LabelTable>::best(&scores), Some(1));
        let zeros = <DenseTable<Weight> as LabelTable>::scores(3);
        assert_eq!(<DenseTable<Weight> as LabelTable>::best(&zeros), Some(0));
        assert_eq!(<DenseTable<Weight> as LabelTable>::best(&Vec::new()), None);
    }

    #[test]
    fn sparse_best_prefers_smallest_label_on_ties() {
        type Labels = SparseTable<String, Weight>;
        let mut scores = Labels::scores(0);
        assert_eq!(Labels::best(&scores), None);

        scores.insert("VERB".to_owned(), 1.0);
        scores.insert("NOUN".to_owned(), 1.0);
        scores.insert("ADJ".to_owned(), -1.0);
        assert_eq!(Labels::best(&scores), Some("NOUN".to_owned()));

        let ranked = Labels::ranked(scores);
        let labels: Vec<&str> = ranked.iter().map(|(l, _)| l.as_str()).collect();
        assert_eq!(labels, vec!["ADJ", "NOUN", "VERB"]);
    }

    #[test]
    fn accumulate_sums_across_tables() {
        let mut a: SparseTable<String, Weight> = SparseTable::with_value(2, Weight::default());
        a.mutable(&"X".to_owned()).set(1.0);
        let mut b = a.clone();
        b.mutable(&"X".to_owned()).set(0.5);
        b.mutable(&"Y".to_owned()).set(2.0);

        let mut scores = SparseTable::<String, Weight>::scores(2);
        a.accumulate(&mut scores);
        b.accumulate(&mut scores);
        assert_eq!(scores["X"], 1.5);
        assert_eq!(scores["Y"], 2.0);
    }

    #[test]
    fn zero_rows_size_dense_labels_but_not_sparse_ones() {
        let dense = <DenseTable<Weight> as LabelTable>::zero_row(3);
        assert_eq!(dense.size(), 3);
        assert!(dense.iter().all(|(_, w)| w.get() == 0.0));

        let sparse = <SparseTable<String, Weight> as LabelTable>::zero_row(1_000_000);
        assert_eq!(sparse.size(), 0);
        assert_eq!(sparse.values.capacity(), 0);
    }
}
