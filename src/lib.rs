//! Averaged perceptron classifiers over binary feature spaces.
//!
//! `rust-perceptron` trains multiclass linear classifiers with the perceptron update rule and
//! keeps a lazily maintained running average of every weight. It targets NLP-style tagging
//! and classification, where each example is a small set of one-hot features drawn from a
//! large vocabulary.
//!
//! # Design goals
//!
//! - O(nonzero) scoring and updates: only the features that fire are touched, and averaging
//!   is lazy, so a training step never walks the whole table.
//! - Static storage selection: dense (integer-indexed) and sparse (string-keyed) tables are
//!   chosen per level through a [`Topology`] and resolved at compile time.
//! - Clear ownership: training happens on a [`MultinomialAveragedPerceptron`]; freezing builds
//!   an independent [`MultinomialPerceptron`] that is immutable, shareable and serializable.
//!
//! # Panics vs `Result`
//!
//! This crate exposes two layers of API:
//!
//! - Low-level hot path (no validation):
//!   - [`MultinomialAveragedPerceptron::train_one`], `predict`, `score`
//!     Dense indices outside the model panic; reserved empty-string keys are a caller bug.
//!
//! - High-level convenience APIs (validated, return [`Result`]):
//!   - [`MultinomialAveragedPerceptron::fit`], [`MultinomialPerceptron::evaluate`]
//!   - [`MultinomialPerceptron::read`], [`MultinomialPerceptron::write`] and friends
//!
//! # Topologies
//!
//! | alias prefix    | features          | labels            |
//! |-----------------|-------------------|-------------------|
//! | `Dense`         | `usize` (fixed)   | `usize` (fixed)   |
//! | `SparseDense`   | `String` (growing)| `usize` (fixed)   |
//! | `Sparse`        | `String` (growing)| `String`          |
//!
//! # Quick start
//!
//! ```rust
//! use rust_perceptron::{FitConfig, Shuffle, SparseMultinomialAveragedPerceptron};
//!
//! # fn main() -> rust_perceptron::Result<()> {
//! let feats = |xs: &[&str]| xs.iter().map(|s| s.to_string()).collect::<Vec<_>>();
//! let mut train = rust_perceptron::Dataset::new();
//! train.push(feats(&["bias", "w=dog"]), "NOUN".to_owned());
//! train.push(feats(&["bias", "w=runs"]), "VERB".to_owned());
//!
//! let mut learner = SparseMultinomialAveragedPerceptron::new(0, 2);
//! learner.fit(&train, FitConfig { epochs: 5, shuffle: Shuffle::Seeded(0) })?;
//!
//! let model = learner.freeze();
//! assert_eq!(model.predict(&feats(&["bias", "w=dog"])), Some("NOUN".to_owned()));
//!
//! let mut bytes = Vec::new();
//! model.write(&mut bytes, "toy tagger")?;
//! let loaded = rust_perceptron::SparseMultinomialPerceptron::read(bytes.as_slice())?;
//! assert_eq!(loaded, model);
//! # Ok(())
//! # }
//! ```

pub mod data;
pub mod error;
pub mod multinomial;
pub mod serde_model;
pub mod table;
pub mod topology;
pub mod train;
pub mod weight;

pub use data::{Dataset, Example};
pub use error::{Error, Result};
pub use multinomial::{
    DenseMultinomialAveragedPerceptron, DenseMultinomialPerceptron,
    MultinomialAveragedPerceptron, MultinomialPerceptron,
    SparseDenseMultinomialAveragedPerceptron, SparseDenseMultinomialPerceptron,
    SparseMultinomialAveragedPerceptron, SparseMultinomialPerceptron,
};
pub use serde_model::{
    Codec, MAX_INNER_SIZE, MAX_MODEL_BYTES, MODEL_FORMAT_VERSION, SerializedModel,
};
pub use table::{DenseTable, LabelTable, SparseTable, Table};
pub use topology::{Dense, Sparse, SparseDense, Topology};
pub use train::{EpochReport, EvalReport, FitConfig, FitReport, Shuffle};
pub use weight::{AveragedWeight, Cell, Weight};
