//! Storage topologies.
//!
//! A model is an outer table from feature to inner table, and an inner table from label to
//! weight cell. Each [`Topology`] fixes which table strategy is used at each level and is
//! resolved at compile time, so scoring never goes through dynamic dispatch.
//!
//! | topology       | outer (feature)            | inner (label)              |
//! |----------------|----------------------------|----------------------------|
//! | [`Dense`]      | `DenseTable`, `usize`      | `DenseTable`, `usize`      |
//! | [`SparseDense`]| `SparseTable`, `String`    | `DenseTable`, `usize`      |
//! | [`Sparse`]     | `SparseTable`, `String`    | `SparseTable`, `String`    |

use std::fmt;

use crate::table::{DenseTable, LabelTable, SparseTable, Table};
use crate::weight::Cell;

pub trait Topology: Clone + PartialEq + fmt::Debug {
    type Feature: Clone + PartialEq + fmt::Debug;
    type Label: Clone + PartialEq + fmt::Debug;

    type Inner<C: Cell>: LabelTable<Index = Self::Label, Value = C>;
    type Outer<C: Cell>: Table<Index = Self::Feature, Value = Self::Inner<C>>;

    /// Stable name written into model files.
    const NAME: &'static str;

    /// Whether `feature` may be used with a model of `outer_size` features.
    fn valid_feature(feature: &Self::Feature, outer_size: usize) -> bool;

    /// Whether `label` may be used with a model of `inner_size` labels.
    fn valid_label(label: &Self::Label, inner_size: usize) -> bool;
}

/// Integer features in `[0, nfeats)`, integer labels in `[0, nlabels)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Dense;

/// String features, integer labels in `[0, nlabels)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SparseDense;

/// String features, string labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Sparse;

impl Topology for Dense {
    type Feature = usize;
    type Label = usize;
    type Inner<C: Cell> = DenseTable<C>;
    type Outer<C: Cell> = DenseTable<DenseTable<C>>;

    const NAME: &'static str = "dense";

    fn valid_feature(feature: &usize, outer_size: usize) -> bool {
        *feature < outer_size
    }

    fn valid_label(label: &usize, inner_size: usize) -> bool {
        *label < inner_size
    }
}

impl Topology for SparseDense {
    type Feature = String;
    type Label = usize;
    type Inner<C: Cell> = DenseTable<C>;
    type Outer<C: Cell> = SparseTable<String, DenseTable<C>>;

    const NAME: &'static str = "sparse_dense";

    fn valid_feature(feature: &String, _outer_size: usize) -> bool {
        !feature.is_empty()
    }

    fn valid_label(label: &usize, inner_size: usize) -> bool {
        *label < inner_size
    }
}

impl Topology for Sparse {
    type Feature = String;
    type Label = String;
    type Inner<C: Cell> = SparseTable<String, C>;
    type Outer<C: Cell> = SparseTable<String, SparseTable<String, C>>;

    const NAME: &'static str = "sparse";

    fn valid_feature(feature: &String, _outer_size: usize) -> bool {
        !feature.is_empty()
    }

    fn valid_label(label: &String, _inner_size: usize) -> bool {
        !label.is_empty()
    }
}
