//! Evaluation results: per-sample records, batch output, threshold collections.

use serde::{Deserialize, Serialize};

/// One evaluated sample, identified by its position in the source design.
///
/// The index is the stable identity that links a sample across design
/// generation, evaluation, and ranking; nothing mutates a record after the
/// collector builds it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleRecord {
    pub index: usize,
    pub unit_coords: Vec<f64>,
    pub parameter_coords: Option<Vec<f64>>,
    pub score: f64,
}

/// Output of one evaluation batch, ordered by original sample index.
///
/// `scores[i]` and `unit_samples[i]` always refer to sample `i` of the input
/// design regardless of worker completion order. `mapped_samples` is present
/// when the batch ran through a distribution transform set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchResult {
    pub unit_samples: Vec<Vec<f64>>,
    pub mapped_samples: Option<Vec<Vec<f64>>>,
    pub scores: Vec<f64>,
}

impl BatchResult {
    pub fn sample_count(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    /// Assemble the record for sample `i`.
    pub fn record(&self, index: usize) -> SampleRecord {
        SampleRecord {
            index,
            unit_coords: self.unit_samples[index].clone(),
            parameter_coords: self.mapped_samples.as_ref().map(|m| m[index].clone()),
            score: self.scores[index],
        }
    }
}

/// A sample retained by the threshold driver: its score exceeded the minimum.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThresholdEntry {
    pub score: f64,
    pub unit_coords: Vec<f64>,
    pub parameter_coords: Option<Vec<f64>>,
}

/// How a threshold-seeking run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CollectOutcome {
    /// The accumulated count reached the target batch size.
    TargetReached { trials: usize },
    /// The trial budget ran out first; the collection may be partial or empty.
    Exhausted { trials: usize },
}

/// Append-only accumulation of qualifying samples across driver iterations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThresholdCollection {
    entries: Vec<ThresholdEntry>,
    target: usize,
}

impl ThresholdCollection {
    /// `capacity_hint` is `batch_size * max_trials` in the driver; purely an
    /// allocation hint, not a bound.
    pub fn with_target(target: usize, capacity_hint: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity_hint),
            target,
        }
    }

    pub fn push(&mut self, entry: ThresholdEntry) {
        self.entries.push(entry);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn target(&self) -> usize {
        self.target
    }

    pub fn reached_target(&self) -> bool {
        self.entries.len() >= self.target
    }

    pub fn entries(&self) -> &[ThresholdEntry] {
        &self.entries
    }

    pub fn into_entries(self) -> Vec<ThresholdEntry> {
        self.entries
    }
}
