//! Concurrent objective evaluation over a sampling design.
//!
//! A fixed pool of `min(workers, n)` threads pulls index-tagged sample
//! vectors from a shared task queue, invokes the objective once per sample,
//! and pushes tagged results back; a collector demultiplexes each result
//! into the output slot named by its carried index. Completion order is
//! fully decoupled from output order: `scores[i]` always belongs to sample
//! `i` of the input design, whichever worker finished it and whenever.
//!
//! Shutdown is deterministic: the task queue is drained and disconnected,
//! and every worker is joined before the call returns, on success and error
//! paths alike, so repeated invocations (the threshold driver runs this in a
//! loop) never leak threads. An objective panic tears down the whole batch
//! and resurfaces in the caller once the pool is down.

use std::thread;

use crossbeam_channel::unbounded;
use tracing::debug;

use qs_design::TransformSet;
use qs_types::{BatchResult, EvalError, QsResult, UnitDesign};

/// A scalar objective over one sample vector.
///
/// Implementations must be safe to call concurrently from multiple worker
/// threads; the engine offers no synchronization for caller-side state.
/// Deterministic objectives make rankings and threshold runs reproducible.
pub trait Objective: Sync {
    fn evaluate(&self, sample: &[f64], index: usize) -> f64;
}

impl<F> Objective for F
where
    F: Fn(&[f64], usize) -> f64 + Sync,
{
    fn evaluate(&self, sample: &[f64], index: usize) -> f64 {
        self(sample, index)
    }
}

struct Task {
    index: usize,
    unit: Vec<f64>,
}

struct Completed {
    index: usize,
    unit: Vec<f64>,
    mapped: Option<Vec<f64>>,
    score: f64,
}

/// Worker-pool evaluator for sampling designs.
#[derive(Debug, Clone, Copy)]
pub struct Evaluator {
    workers: usize,
}

impl Evaluator {
    /// Pool bound; clamped to at least one worker and to the batch size at
    /// evaluation time.
    pub fn new(workers: usize) -> Self {
        Self {
            workers: workers.max(1),
        }
    }

    /// Size the pool from the host's available parallelism.
    pub fn with_available_parallelism() -> Self {
        let workers = thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        Self::new(workers)
    }

    pub fn worker_count(&self) -> usize {
        self.workers
    }

    /// Evaluate the objective over raw unit coordinates.
    pub fn evaluate<O: Objective>(
        &self,
        objective: &O,
        design: &UnitDesign,
    ) -> QsResult<BatchResult> {
        self.run(objective, design, None)
    }

    /// Evaluate with a distribution transform applied first: workers map
    /// each unit vector into parameter space and the objective sees the
    /// mapped vector. The batch keeps both.
    pub fn evaluate_mapped<O: Objective>(
        &self,
        objective: &O,
        design: &UnitDesign,
        transforms: &TransformSet,
    ) -> QsResult<BatchResult> {
        if transforms.dimension_count() != design.dimension_count() {
            return Err(EvalError::DimensionMismatch {
                transforms: transforms.dimension_count(),
                design: design.dimension_count(),
            }
            .into());
        }
        self.run(objective, design, Some(transforms))
    }

    fn run<O: Objective>(
        &self,
        objective: &O,
        design: &UnitDesign,
        transforms: Option<&TransformSet>,
    ) -> QsResult<BatchResult> {
        let n = design.sample_count();
        if n == 0 {
            return Ok(BatchResult {
                unit_samples: Vec::new(),
                mapped_samples: transforms.map(|_| Vec::new()),
                scores: Vec::new(),
            });
        }

        let workers = self.workers.min(n);
        debug!("dispatching {} samples across {} workers", n, workers);

        let (task_tx, task_rx) = unbounded::<Task>();
        let (result_tx, result_rx) = unbounded::<Completed>();

        // Feed every task up front, then disconnect the queue: workers
        // drain it and exit on their own once it runs dry.
        for (index, unit) in design.iter_samples().enumerate() {
            task_tx
                .send(Task { index, unit })
                .expect("task queue closed before dispatch");
        }
        drop(task_tx);

        thread::scope(|scope| {
            for _ in 0..workers {
                let task_rx = task_rx.clone();
                let result_tx = result_tx.clone();
                scope.spawn(move || {
                    for task in task_rx.iter() {
                        let mapped = transforms.map(|t| t.map(&task.unit));
                        let score = match &mapped {
                            Some(vector) => objective.evaluate(vector, task.index),
                            None => objective.evaluate(&task.unit, task.index),
                        };
                        let done = Completed {
                            index: task.index,
                            unit: task.unit,
                            mapped,
                            score,
                        };
                        if result_tx.send(done).is_err() {
                            break;
                        }
                    }
                });
            }
            drop(result_tx);
            drop(task_rx);

            // Collect exactly n results, placing each by its carried index,
            // never by arrival order.
            let mut unit_samples = vec![Vec::new(); n];
            let mut mapped_samples = transforms.map(|_| vec![Vec::new(); n]);
            let mut scores = vec![0.0; n];
            let mut received = 0usize;
            while received < n {
                match result_rx.recv() {
                    Ok(done) => {
                        unit_samples[done.index] = done.unit;
                        if let (Some(all), Some(one)) = (mapped_samples.as_mut(), done.mapped) {
                            all[done.index] = one;
                        }
                        scores[done.index] = done.score;
                        received += 1;
                    }
                    // Every sender gone before n results: a worker died
                    // without reporting. The scope still joins (and
                    // re-raises any panic) before the caller sees this.
                    Err(_) => {
                        return Err(EvalError::ResultsLost {
                            expected: n,
                            received,
                        }
                        .into())
                    }
                }
            }
            Ok(BatchResult {
                unit_samples,
                mapped_samples,
                scores,
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qs_design::{LatinHypercube, TransformSet};
    use qs_types::{ParamSpec, ParameterSet};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn design(samples: usize, dimensions: usize) -> UnitDesign {
        let mut rng = ChaCha8Rng::seed_from_u64(31);
        LatinHypercube::new().build(&mut rng, samples, dimensions)
    }

    #[test]
    fn output_index_matches_input_for_every_worker_count() {
        // The objective returns the sample index itself, so any reordering
        // of results would be visible immediately.
        let n = 12;
        let d = design(n, 3);
        for workers in 1..=n {
            let batch = Evaluator::new(workers)
                .evaluate(&|_: &[f64], index: usize| index as f64, &d)
                .unwrap();
            for (i, &score) in batch.scores.iter().enumerate() {
                assert_eq!(score, i as f64, "workers = {workers}");
            }
        }
    }

    #[test]
    fn output_rows_match_input_samples() {
        let n = 20;
        let d = design(n, 4);
        let batch = Evaluator::new(6)
            .evaluate(&|sample: &[f64], _: usize| sample.iter().sum(), &d)
            .unwrap();
        for i in 0..n {
            assert_eq!(batch.unit_samples[i], d.sample_vector(i));
            let expected: f64 = d.sample_vector(i).iter().sum();
            assert_eq!(batch.scores[i], expected);
        }
        assert!(batch.mapped_samples.is_none());
    }

    #[test]
    fn mapped_evaluation_feeds_parameter_vectors_to_the_objective() {
        let set = ParameterSet::new()
            .with(ParamSpec::linear("x", 100.0, 200.0).unwrap())
            .with(ParamSpec::linear("y", -1.0, 1.0).unwrap());
        let transforms = TransformSet::for_params(&set).unwrap();
        let d = design(10, 2);

        let batch = Evaluator::new(4)
            .evaluate_mapped(&|sample: &[f64], _: usize| sample[0], &d, &transforms)
            .unwrap();

        let mapped = batch.mapped_samples.as_ref().unwrap();
        for i in 0..10 {
            assert!(mapped[i][0] >= 100.0 && mapped[i][0] < 200.0);
            assert_eq!(batch.scores[i], mapped[i][0]);
            assert_eq!(batch.unit_samples[i], d.sample_vector(i));
        }
    }

    #[test]
    fn mapped_evaluation_rejects_dimension_mismatch() {
        let set = ParameterSet::new().with(ParamSpec::uniform("u"));
        let transforms = TransformSet::for_params(&set).unwrap();
        let d = design(4, 2);
        let err = Evaluator::new(2)
            .evaluate_mapped(&|_: &[f64], _: usize| 0.0, &d, &transforms)
            .unwrap_err();
        assert!(err.to_string().contains("dimensions"));
    }

    #[test]
    fn empty_design_returns_empty_batch() {
        let d = UnitDesign::from_columns(0, vec![Vec::new(), Vec::new()]);
        let batch = Evaluator::new(8)
            .evaluate(&|_: &[f64], _: usize| 1.0, &d)
            .unwrap();
        assert!(batch.is_empty());
    }

    #[test]
    fn pool_is_clamped_to_sample_count() {
        // More workers than samples must still produce a complete batch.
        let d = design(3, 2);
        let batch = Evaluator::new(64)
            .evaluate(&|_: &[f64], index: usize| index as f64, &d)
            .unwrap();
        assert_eq!(batch.sample_count(), 3);
        assert_eq!(batch.scores, vec![0.0, 1.0, 2.0]);
    }

    #[test]
    fn repeated_invocations_reuse_cleanly() {
        // The threshold driver calls the engine in a loop; each batch must
        // start and shut down its own pool.
        let evaluator = Evaluator::new(4);
        for round in 0..20 {
            let d = design(8, 2);
            let batch = evaluator
                .evaluate(&|_: &[f64], index: usize| (round * 100 + index) as f64, &d)
                .unwrap();
            assert_eq!(batch.scores[7], (round * 100 + 7) as f64);
        }
    }

    #[test]
    #[should_panic(expected = "objective blew up")]
    fn objective_panic_propagates_after_shutdown() {
        let d = design(6, 2);
        let _ = Evaluator::new(2).evaluate(
            &|_: &[f64], index: usize| {
                if index == 3 {
                    panic!("objective blew up");
                }
                0.0
            },
            &d,
        );
    }
}
