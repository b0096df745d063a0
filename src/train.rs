use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use crate::topology::Topology;
use crate::{Dataset, Error, MultinomialAveragedPerceptron, MultinomialPerceptron, Result};

/// Example order within each epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Shuffle {
    /// Visit examples in dataset order.
    #[default]
    None,
    /// Reshuffle every epoch with a deterministic seed.
    Seeded(u64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FitConfig {
    pub epochs: usize,
    pub shuffle: Shuffle,
}

impl Default for FitConfig {
    fn default() -> Self {
        Self {
            epochs: 10,
            shuffle: Shuffle::None,
        }
    }
}

impl FitConfig {
    pub fn validate(&self) -> Result<()> {
        if self.epochs == 0 {
            return Err(Error::InvalidConfig("epochs must be > 0".to_owned()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EpochReport {
    pub epoch: usize,
    pub mistakes: usize,
    pub examples: usize,
}

impl EpochReport {
    /// Fraction of examples predicted correctly before their update.
    pub fn accuracy(&self) -> f32 {
        if self.examples == 0 {
            return 0.0;
        }
        (self.examples - self.mistakes) as f32 / self.examples as f32
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FitReport {
    pub epochs: Vec<EpochReport>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EvalReport {
    pub correct: usize,
    pub total: usize,
}

impl EvalReport {
    pub fn accuracy(&self) -> f32 {
        if self.total == 0 {
            return 0.0;
        }
        self.correct as f32 / self.total as f32
    }
}

fn check_dataset<T: Topology>(
    data: &Dataset<T::Feature, T::Label>,
    outer_size: usize,
    inner_size: usize,
) -> Result<()> {
    if data.is_empty() {
        return Err(Error::InvalidData("dataset must not be empty".to_owned()));
    }
    for (i, example) in data.iter().enumerate() {
        if let Some(f) = example
            .features
            .iter()
            .find(|f| !T::valid_feature(f, outer_size))
        {
            return Err(Error::InvalidData(format!(
                "example {i} has feature {f:?} outside the model (outer_size {outer_size})"
            )));
        }
        if !T::valid_label(&example.label, inner_size) {
            return Err(Error::InvalidData(format!(
                "example {i} has label {:?} outside the model (inner_size {inner_size})",
                example.label
            )));
        }
    }
    Ok(())
}

impl<T: Topology> MultinomialAveragedPerceptron<T> {
    /// Train for `cfg.epochs` passes over `train`.
    ///
    /// Unlike [`MultinomialAveragedPerceptron::train_one`], this validates every example
    /// against the model up front and fails without training if any is out of range.
    pub fn fit(
        &mut self,
        train: &Dataset<T::Feature, T::Label>,
        cfg: FitConfig,
    ) -> Result<FitReport> {
        cfg.validate()?;
        check_dataset::<T>(train, self.outer_size(), self.inner_size())?;

        let mut order: Vec<usize> = (0..train.len()).collect();
        let mut rng = match cfg.shuffle {
            Shuffle::None => None,
            Shuffle::Seeded(seed) => Some(StdRng::seed_from_u64(seed)),
        };

        let mut epochs = Vec::with_capacity(cfg.epochs);
        for epoch in 0..cfg.epochs {
            if let Some(rng) = rng.as_mut() {
                order.shuffle(rng);
            }

            let mut mistakes = 0;
            for &idx in &order {
                let example = train.example(idx);
                let predicted = self.train_one(&example.features, &example.label);
                if predicted.as_ref() != Some(&example.label) {
                    mistakes += 1;
                }
            }

            tracing::debug!(
                epoch,
                mistakes,
                examples = order.len(),
                time = self.time(),
                "finished epoch"
            );
            epochs.push(EpochReport {
                epoch,
                mistakes,
                examples: order.len(),
            });
        }

        tracing::info!(
            epochs = cfg.epochs,
            examples = train.len(),
            time = self.time(),
            "training finished"
        );
        Ok(FitReport { epochs })
    }
}

impl<T: Topology> MultinomialPerceptron<T> {
    /// Accuracy of the model on `data`.
    pub fn evaluate(&self, data: &Dataset<T::Feature, T::Label>) -> Result<EvalReport> {
        check_dataset::<T>(data, self.outer_size(), self.inner_size())?;

        let correct = data
            .iter()
            .filter(|example| self.predict(&example.features).as_ref() == Some(&example.label))
            .count();
        Ok(EvalReport {
            correct,
            total: data.len(),
        })
    }
}
