//! Model serialization/deserialization.
//!
//! Frozen models are written as a versioned [`SerializedModel`] record, one table schema per
//! topology, encoded with `bincode`. The same record can be rendered as JSON for inspection.
//!
//! Design notes:
//! - We do NOT directly serialize the in-memory tables, so the file format stays stable even if
//!   the table representation changes.
//! - Dense-outer tables are a sequence of rows; sparse-outer tables are a map from feature to
//!   row. A row is a sequence of `inner_size` weights (dense labels) or a map from label to
//!   weight (sparse labels), and absent sparse entries read back as zero.
//! - The reserved empty-string key is never written.
//! - Decoding validates the format version, the topology name, the label count, row lengths
//!   and that every weight is finite, and never returns a partially built model.
//! - Binary input is read with a byte budget of [`MAX_MODEL_BYTES`], so a corrupt length prefix
//!   fails with [`Error::InvalidData`] instead of driving a huge allocation.

use std::collections::HashMap;
use std::fmt;
use std::fs::File;
use std::io::{BufReader, BufWriter, ErrorKind, Read, Write};
use std::path::Path;

use bincode::Options;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::table::{DenseTable, LabelTable, SparseTable, Table};
use crate::topology::{Dense, Sparse, SparseDense, Topology};
use crate::weight::{Cell, Weight};
use crate::{Error, MultinomialPerceptron, Result};

pub const MODEL_FORMAT_VERSION: u32 = 1;

/// Largest binary model `read` accepts, and `write` produces (1 GiB).
pub const MAX_MODEL_BYTES: u64 = 1 << 30;

/// Largest `inner_size` a model record may declare.
///
/// Dense label rows and score buffers are allocated at this length. Models with more labels
/// can be built and written, but `read` rejects them.
pub const MAX_INNER_SIZE: usize = 1 << 20;

// Fixed-width little-endian integers, the same layout as `bincode::serialize`.
fn bincode_options() -> impl Options {
    bincode::DefaultOptions::new()
        .with_fixint_encoding()
        .allow_trailing_bytes()
        .with_limit(MAX_MODEL_BYTES)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SerializedModel<Tab> {
    pub format_version: u32,
    pub topology: String,
    pub metadata: String,
    pub inner_size: usize,
    pub table: Tab,
}

/// Per-topology conversion between in-memory tables and their serialized schema.
pub trait Codec: Topology {
    type Rows: Serialize + DeserializeOwned;

    fn encode(table: &Self::Outer<Weight>) -> Self::Rows;

    fn decode(rows: Self::Rows, inner_size: usize) -> Result<Self::Outer<Weight>>;
}

fn encode_row<C: Cell>(inner: &DenseTable<C>) -> Vec<f32> {
    inner.as_slice().iter().map(Cell::get).collect()
}

fn decode_row(
    feature: &dyn fmt::Debug,
    row: Vec<f32>,
    inner_size: usize,
) -> Result<DenseTable<Weight>> {
    if row.len() != inner_size {
        return Err(Error::InvalidData(format!(
            "row for feature {feature:?} has {} weights, expected inner_size {inner_size}",
            row.len()
        )));
    }
    if row.iter().any(|v| !v.is_finite()) {
        return Err(Error::InvalidData(format!(
            "row for feature {feature:?} must contain only finite weights"
        )));
    }
    Ok(DenseTable::from_values(row.into_iter().map(Weight::new).collect()))
}

fn check_key(kind: &str, key: &str) -> Result<()> {
    if key.is_empty() {
        return Err(Error::InvalidData(format!(
            "empty {kind} key is reserved and must not appear in a model"
        )));
    }
    Ok(())
}

impl Codec for Dense {
    type Rows = Vec<Vec<f32>>;

    fn encode(table: &Self::Outer<Weight>) -> Vec<Vec<f32>> {
        table.iter().map(|(_, inner)| encode_row(inner)).collect()
    }

    fn decode(rows: Vec<Vec<f32>>, inner_size: usize) -> Result<Self::Outer<Weight>> {
        let mut inners = Vec::with_capacity(rows.len());
        for (feature, row) in rows.into_iter().enumerate() {
            inners.push(decode_row(&feature, row, inner_size)?);
        }
        Ok(DenseTable::from_values(inners))
    }
}

impl Codec for SparseDense {
    type Rows = HashMap<String, Vec<f32>>;

    fn encode(table: &Self::Outer<Weight>) -> HashMap<String, Vec<f32>> {
        table
            .iter()
            .filter(|(feature, _)| !feature.is_empty())
            .map(|(feature, inner)| (feature, encode_row(inner)))
            .collect()
    }

    fn decode(rows: HashMap<String, Vec<f32>>, inner_size: usize) -> Result<Self::Outer<Weight>> {
        let zero = <DenseTable<Weight> as LabelTable>::zero_row(inner_size);
        let mut table = SparseTable::with_value(rows.len(), zero);
        for (feature, row) in rows {
            check_key("feature", &feature)?;
            *table.mutable(&feature) = decode_row(&feature, row, inner_size)?;
        }
        Ok(table)
    }
}

impl Codec for Sparse {
    type Rows = HashMap<String, HashMap<String, f32>>;

    fn encode(table: &Self::Outer<Weight>) -> HashMap<String, HashMap<String, f32>> {
        let mut rows = HashMap::with_capacity(table.size());
        for (feature, inner) in table.iter() {
            if feature.is_empty() {
                continue;
            }
            let row: HashMap<String, f32> = inner
                .iter()
                .filter(|(label, _)| !label.is_empty())
                .map(|(label, w)| (label, w.get()))
                .collect();
            rows.insert(feature, row);
        }
        rows
    }

    fn decode(
        rows: HashMap<String, HashMap<String, f32>>,
        inner_size: usize,
    ) -> Result<Self::Outer<Weight>> {
        let zero = <SparseTable<String, Weight> as LabelTable>::zero_row(inner_size);
        let mut table = SparseTable::with_value(rows.len(), zero);
        for (feature, row) in rows {
            check_key("feature", &feature)?;
            let inner = table.mutable(&feature);
            for (label, value) in row {
                check_key("label", &label)?;
                if !value.is_finite() {
                    return Err(Error::InvalidData(format!(
                        "weight for ({feature:?}, {label:?}) must be finite, got {value}"
                    )));
                }
                inner.mutable(&label).set(value);
            }
        }
        Ok(table)
    }
}

impl<Tab> SerializedModel<Tab> {
    pub fn validate<T: Topology>(&self) -> Result<()> {
        if self.format_version != MODEL_FORMAT_VERSION {
            return Err(Error::InvalidData(format!(
                "unsupported model format_version {}; expected {}",
                self.format_version, MODEL_FORMAT_VERSION
            )));
        }
        if self.topology != T::NAME {
            return Err(Error::InvalidData(format!(
                "model topology {:?} does not match expected {:?}",
                self.topology,
                T::NAME
            )));
        }
        if self.inner_size > MAX_INNER_SIZE {
            return Err(Error::InvalidData(format!(
                "model inner_size {} exceeds the maximum of {MAX_INNER_SIZE}",
                self.inner_size
            )));
        }
        Ok(())
    }
}

impl<T: Codec> MultinomialPerceptron<T> {
    fn to_record(&self, metadata: &str) -> SerializedModel<T::Rows> {
        SerializedModel {
            format_version: MODEL_FORMAT_VERSION,
            topology: T::NAME.to_owned(),
            metadata: metadata.to_owned(),
            inner_size: self.inner_size(),
            table: T::encode(self.table()),
        }
    }

    fn from_record(record: SerializedModel<T::Rows>) -> Result<(Self, String)> {
        if let Err(e) = record.validate::<T>() {
            tracing::warn!(topology = T::NAME, error = %e, "rejected model record");
            return Err(e);
        }
        let table = T::decode(record.table, record.inner_size).inspect_err(|e| {
            tracing::warn!(topology = T::NAME, error = %e, "rejected model table");
        })?;
        let model = Self::from_table(table, record.inner_size);
        Ok((model, record.metadata))
    }

    /// Encode the model plus an opaque `metadata` string to `writer`.
    pub fn write<W: Write>(&self, mut writer: W, metadata: &str) -> Result<()> {
        let record = self.to_record(metadata);
        bincode_options()
            .serialize_into(&mut writer, &record)
            .map_err(|e| match *e {
                bincode::ErrorKind::Io(io) => Error::Io(format!("failed to write model: {io}")),
                bincode::ErrorKind::SizeLimit => Error::InvalidData(format!(
                    "model exceeds the maximum encoded size of {MAX_MODEL_BYTES} bytes"
                )),
                other => Error::InvalidData(format!("failed to serialize model: {other}")),
            })?;
        writer
            .flush()
            .map_err(|e| Error::Io(format!("failed to flush model: {e}")))?;
        tracing::debug!(
            topology = T::NAME,
            outer_size = self.outer_size(),
            inner_size = self.inner_size(),
            "wrote model"
        );
        Ok(())
    }

    /// Decode a model from `reader`, discarding its metadata.
    pub fn read<R: Read>(reader: R) -> Result<Self> {
        Self::read_with_metadata(reader).map(|(model, _)| model)
    }

    /// Decode a model and its metadata string from `reader`.
    pub fn read_with_metadata<R: Read>(reader: R) -> Result<(Self, String)> {
        let record: SerializedModel<T::Rows> = bincode_options()
            .deserialize_from(reader)
            .map_err(|e| match *e {
                bincode::ErrorKind::Io(io) if io.kind() != ErrorKind::UnexpectedEof => {
                    Error::Io(format!("failed to read model: {io}"))
                }
                bincode::ErrorKind::SizeLimit => Error::InvalidData(format!(
                    "model exceeds the maximum encoded size of {MAX_MODEL_BYTES} bytes"
                )),
                other => Error::InvalidData(format!("failed to parse model: {other}")),
            })?;
        let (model, metadata) = Self::from_record(record)?;
        tracing::debug!(
            topology = T::NAME,
            outer_size = model.outer_size(),
            inner_size = model.inner_size(),
            "read model"
        );
        Ok((model, metadata))
    }

    /// Write the model to a file.
    pub fn save<P: AsRef<Path>>(&self, path: P, metadata: &str) -> Result<()> {
        let p = path.as_ref();
        let file = File::create(p)
            .map_err(|e| Error::Io(format!("failed to create {}: {e}", p.display())))?;
        self.write(BufWriter::new(file), metadata)
    }

    /// Load a model from a file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let p = path.as_ref();
        let file = File::open(p)
            .map_err(|e| Error::Io(format!("failed to open {}: {e}", p.display())))?;
        Self::read(BufReader::new(file))
    }

    /// Serialize the model to a compact JSON string.
    pub fn to_json_string(&self, metadata: &str) -> Result<String> {
        serde_json::to_string(&self.to_record(metadata))
            .map_err(|e| Error::InvalidData(format!("failed to serialize model: {e}")))
    }

    /// Parse a model and its metadata from a JSON string.
    pub fn from_json_str(s: &str) -> Result<(Self, String)> {
        let record: SerializedModel<T::Rows> = serde_json::from_str(s)
            .map_err(|e| Error::InvalidData(format!("failed to parse model json: {e}")))?;
        Self::from_record(record)
    }
}
