//! Concurrent sampling-and-evaluation engine: worker-pool objective
//! evaluation with index-preserving reassembly, ranking, threshold-seeking
//! collection, and persistence of the results.

pub mod evaluate;
pub mod glue;
pub mod rank;
pub mod report;
pub mod storage;
pub mod threshold;

pub use evaluate::{Evaluator, Objective};
pub use rank::rank_samples;
pub use storage::{load_collection, save_collection, CollectionRecord};
pub use threshold::{collect_above_threshold, collect_mapped, ThresholdConfig, ThresholdRun};
