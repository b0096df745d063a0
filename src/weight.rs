//! Scalar weight cells.
//!
//! Every table slot holds one cell. Frozen models store a plain [`Weight`]; trainable models
//! store an [`AveragedWeight`] that also tracks a lazily maintained running average.
//!
//! The training clock is never stored in a cell. Callers pass the current time explicitly to
//! every update and read, and the clock must be non-decreasing across calls on one cell.

use std::fmt;

/// Behavior shared by all weight cells.
///
/// Cells that depend on the training clock require it to be non-decreasing per cell. A clock
/// that moves backwards fails a debug assertion; release builds treat it as zero elapsed time.
pub trait Cell: Clone + Default + PartialEq + fmt::Debug {
    /// The weight used for scoring.
    ///
    /// For averaged cells this is the current (unaveraged) weight.
    fn get(&self) -> f32;
}

/// An unaveraged coefficient.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Weight(f32);

impl Weight {
    #[inline]
    pub fn new(value: f32) -> Self {
        Self(value)
    }

    #[inline]
    pub fn set(&mut self, value: f32) {
        self.0 = value;
    }
}

impl Cell for Weight {
    #[inline]
    fn get(&self) -> f32 {
        self.0
    }
}

/// A coefficient with a lazily computed time-weighted average.
///
/// `summed` holds the integral of `weight` over `[0, time)`. It is only correct as of `time`;
/// [`AveragedWeight::freshen`] carries it forward to a later clock value by adding
/// `(now - time) * weight`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AveragedWeight {
    weight: f32,
    summed: f64,
    time: u64,
}

impl AveragedWeight {
    /// Time of the last freshen or update.
    #[inline]
    pub fn last_update(&self) -> u64 {
        self.time
    }

    #[inline]
    fn elapsed(&self, time: u64) -> u64 {
        debug_assert!(
            time >= self.time,
            "clock moved backwards: {time} < {}",
            self.time
        );
        time.saturating_sub(self.time)
    }

    /// Carry the cached sum forward to `time`.
    ///
    /// Calling this with a time earlier than the last update is a contract violation.
    #[inline]
    pub fn freshen(&mut self, time: u64) {
        self.summed += self.elapsed(time) as f64 * f64::from(self.weight);
        self.time = self.time.max(time);
    }

    /// Add `delta` to the current weight at clock value `time`.
    ///
    /// The average is freshened with the old weight first, so the new weight counts from
    /// step `time` onwards.
    #[inline]
    pub fn update(&mut self, delta: f32, time: u64) {
        self.freshen(time);
        self.weight += delta;
    }

    /// Mean of the weight over `[0, time)`, without mutating the cell.
    ///
    /// Returns `0.0` when `time == 0`.
    pub fn average(&self, time: u64) -> f32 {
        if time == 0 {
            return 0.0;
        }
        let elapsed = self.elapsed(time) as f64;
        let summed = self.summed + elapsed * f64::from(self.weight);
        (summed / time as f64) as f32
    }

    /// Freshen to `time`, then return the average.
    pub fn get_average(&mut self, time: u64) -> f32 {
        self.freshen(time);
        self.average(time)
    }
}

impl Cell for AveragedWeight {
    #[inline]
    fn get(&self) -> f32 {
        self.weight
    }
}
