//! Iterative threshold-seeking sample collection.
//!
//! The driver repeatedly generates a fresh stratified design, evaluates it,
//! and keeps every sample whose score clears the minimum, until the
//! accumulated count reaches the batch size or the trial budget runs out.
//! Running out with nothing (or too little) collected is a reported
//! outcome, not an error; the caller decides whether to relax the
//! threshold or retry with a larger batch.

use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info};
use uuid::Uuid;

use qs_design::{LatinHypercube, TransformSet};
use qs_types::{
    BatchResult, CollectOutcome, ParameterSet, QsResult, ThresholdCollection, ThresholdEntry,
};

use crate::evaluate::{Evaluator, Objective};

/// Configuration for one threshold-seeking run.
#[derive(Debug, Clone, PartialEq)]
pub struct ThresholdConfig {
    /// Samples per trial, and the accumulation target.
    pub batch_size: usize,
    /// Scores must strictly exceed this to be kept.
    pub min_objective: f64,
    /// Trial budget; the driver never samples more than this many batches.
    pub max_trials: usize,
    /// Worker-pool bound for each evaluation batch.
    pub workers: usize,
    /// Base seed for the per-trial design generators; `None` seeds each
    /// trial from entropy.
    pub seed: Option<u64>,
    /// Place stratified samples at stratum midpoints instead of jittering.
    pub midpoint: bool,
}

impl ThresholdConfig {
    pub fn new(batch_size: usize, min_objective: f64) -> Self {
        Self {
            batch_size,
            min_objective,
            max_trials: 10,
            workers: std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1),
            seed: None,
            midpoint: false,
        }
    }

    pub fn with_max_trials(mut self, n: usize) -> Self {
        self.max_trials = n;
        self
    }

    pub fn with_workers(mut self, n: usize) -> Self {
        self.workers = n;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_midpoint(mut self, midpoint: bool) -> Self {
        self.midpoint = midpoint;
        self
    }
}

/// Result of a threshold-seeking run.
#[derive(Debug, Clone)]
pub struct ThresholdRun {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub outcome: CollectOutcome,
    pub trials: usize,
    pub elapsed: Duration,
    pub collection: ThresholdCollection,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DriverState {
    Sampling,
    Checking,
    Done,
    Exhausted,
}

/// Collect samples scoring above the minimum, in raw unit coordinates.
pub fn collect_above_threshold<O: Objective>(
    objective: &O,
    dimensions: usize,
    config: &ThresholdConfig,
) -> QsResult<ThresholdRun> {
    drive(objective, dimensions, None, config)
}

/// Collect samples scoring above the minimum, mapped through a parameter
/// set. Transforms compile before the first batch, so configuration errors
/// surface before any concurrent work starts.
pub fn collect_mapped<O: Objective>(
    objective: &O,
    params: &ParameterSet,
    config: &ThresholdConfig,
) -> QsResult<ThresholdRun> {
    let transforms = TransformSet::for_params(params)?;
    drive(objective, params.dimension_count(), Some(&transforms), config)
}

fn drive<O: Objective>(
    objective: &O,
    dimensions: usize,
    transforms: Option<&TransformSet>,
    config: &ThresholdConfig,
) -> QsResult<ThresholdRun> {
    let started = Instant::now();
    let id = Uuid::new_v4();
    info!(
        "threshold run {}: collecting {} samples of {} parameters, min objective {}",
        id, config.batch_size, dimensions, config.min_objective
    );

    let evaluator = Evaluator::new(config.workers);
    let generator = LatinHypercube::new().with_midpoint(config.midpoint);
    let mut collection = ThresholdCollection::with_target(
        config.batch_size,
        config.batch_size * config.max_trials,
    );

    let mut trials = 0usize;
    let mut pending: Option<BatchResult> = None;
    let mut state = DriverState::Sampling;
    let outcome = loop {
        state = match state {
            DriverState::Sampling => {
                let mut rng = match config.seed {
                    Some(seed) => ChaCha8Rng::seed_from_u64(seed.wrapping_add(trials as u64)),
                    None => ChaCha8Rng::from_entropy(),
                };
                let design = generator.build(&mut rng, config.batch_size, dimensions);
                let batch = match transforms {
                    Some(t) => evaluator.evaluate_mapped(objective, &design, t)?,
                    None => evaluator.evaluate(objective, &design)?,
                };
                pending = Some(batch);
                DriverState::Checking
            }
            DriverState::Checking => {
                let batch = pending.take().expect("checking without a sampled batch");
                let before = collection.len();
                for i in 0..batch.sample_count() {
                    if batch.scores[i] > config.min_objective {
                        collection.push(ThresholdEntry {
                            score: batch.scores[i],
                            unit_coords: batch.unit_samples[i].clone(),
                            parameter_coords: batch
                                .mapped_samples
                                .as_ref()
                                .map(|m| m[i].clone()),
                        });
                    }
                }
                trials += 1;
                debug!(
                    "trial {}/{}: kept {} of {} samples ({} total)",
                    trials,
                    config.max_trials,
                    collection.len() - before,
                    batch.sample_count(),
                    collection.len()
                );
                if collection.reached_target() {
                    DriverState::Done
                } else if trials >= config.max_trials {
                    DriverState::Exhausted
                } else {
                    DriverState::Sampling
                }
            }
            DriverState::Done => break CollectOutcome::TargetReached { trials },
            DriverState::Exhausted => break CollectOutcome::Exhausted { trials },
        };
    };

    let elapsed = started.elapsed();
    match outcome {
        CollectOutcome::TargetReached { .. } => info!(
            "threshold run {}: {} samples in {} trials ({:.2?})",
            id,
            collection.len(),
            trials,
            elapsed
        ),
        CollectOutcome::Exhausted { .. } => info!(
            "threshold run {}: trial budget exhausted with {} samples ({:.2?})",
            id,
            collection.len(),
            elapsed
        ),
    }

    Ok(ThresholdRun {
        id,
        created_at: Utc::now(),
        outcome,
        trials,
        elapsed,
        collection,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use qs_types::ParamSpec;

    #[test]
    fn always_qualifying_objective_finishes_in_one_trial() {
        let config = ThresholdConfig::new(16, 0.0).with_workers(4).with_seed(1);
        let run = collect_above_threshold(&|_: &[f64], _: usize| 1.0, 3, &config).unwrap();
        assert_eq!(run.outcome, CollectOutcome::TargetReached { trials: 1 });
        assert_eq!(run.collection.len(), 16);
        assert_eq!(run.trials, 1);
    }

    #[test]
    fn never_qualifying_objective_exhausts_the_budget_empty() {
        let config = ThresholdConfig::new(8, 0.5)
            .with_workers(2)
            .with_max_trials(4)
            .with_seed(2);
        let run = collect_above_threshold(&|_: &[f64], _: usize| 0.0, 2, &config).unwrap();
        assert_eq!(run.outcome, CollectOutcome::Exhausted { trials: 4 });
        assert!(run.collection.is_empty());
        assert_eq!(run.trials, 4);
    }

    #[test]
    fn partial_accumulation_still_stops_at_the_budget() {
        // Only the top decile qualifies, so each 40-sample trial keeps
        // about 4 entries and the 40-entry target is unreachable in 3
        // trials; the driver must stop anyway and hand back what it found.
        let config = ThresholdConfig::new(40, 0.9)
            .with_workers(2)
            .with_max_trials(3)
            .with_seed(3);
        let run =
            collect_above_threshold(&|sample: &[f64], _: usize| sample[0], 1, &config).unwrap();
        assert_eq!(run.outcome, CollectOutcome::Exhausted { trials: 3 });
        assert!(run.collection.len() < 40);
        assert!(!run.collection.is_empty());
    }

    #[test]
    fn every_kept_entry_clears_the_minimum() {
        let config = ThresholdConfig::new(32, 0.7).with_workers(4).with_max_trials(10).with_seed(4);
        let run =
            collect_above_threshold(&|sample: &[f64], _: usize| sample[0], 1, &config).unwrap();
        for entry in run.collection.entries() {
            assert!(entry.score > 0.7);
            assert_eq!(entry.unit_coords.len(), 1);
            assert!(entry.parameter_coords.is_none());
        }
    }

    #[test]
    fn mapped_collection_carries_parameter_coordinates() {
        let params = ParameterSet::new()
            .with(ParamSpec::linear("x", 10.0, 20.0).unwrap())
            .with(ParamSpec::uniform("u"));
        let config = ThresholdConfig::new(8, 0.0).with_workers(2).with_seed(5);
        let run = collect_mapped(&|sample: &[f64], _: usize| sample[0], &params, &config).unwrap();
        assert_eq!(run.outcome, CollectOutcome::TargetReached { trials: 1 });
        for entry in run.collection.entries() {
            let mapped = entry.parameter_coords.as_ref().unwrap();
            assert!(mapped[0] >= 10.0 && mapped[0] < 20.0);
            assert!(entry.score >= 10.0);
            assert_eq!(entry.unit_coords.len(), 2);
        }
    }

    #[test]
    fn seeded_runs_reproduce() {
        let config = ThresholdConfig::new(12, 0.25).with_workers(3).with_seed(77);
        let objective = |sample: &[f64], _: usize| sample.iter().sum::<f64>();
        let a = collect_above_threshold(&objective, 2, &config).unwrap();
        let b = collect_above_threshold(&objective, 2, &config).unwrap();
        assert_eq!(a.collection, b.collection);
        assert_eq!(a.outcome, b.outcome);
    }
}
