//! Durable persistence for threshold collections.
//!
//! A finalized run is handed off as one self-describing record: the
//! parameter-space description that produced it plus every retained entry.
//! The on-disk encoding is JSON; the record round-trips exactly, which is
//! the contract the reporting side relies on.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use qs_types::{CollectOutcome, ParameterSet, QsResult, ThresholdEntry};

use crate::threshold::ThresholdRun;

/// A persisted threshold collection together with the configuration that
/// produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionRecord {
    pub run_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub parameters: ParameterSet,
    pub outcome: CollectOutcome,
    pub entries: Vec<ThresholdEntry>,
}

impl CollectionRecord {
    /// Pair a finished run with the parameter set it sampled.
    pub fn from_run(parameters: ParameterSet, run: ThresholdRun) -> Self {
        Self {
            run_id: run.id,
            created_at: run.created_at,
            parameters,
            outcome: run.outcome,
            entries: run.collection.into_entries(),
        }
    }
}

/// Write a collection record to disk, creating parent directories as needed.
pub fn save_collection<P: AsRef<Path>>(path: P, record: &CollectionRecord) -> QsResult<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let json = serde_json::to_string_pretty(record)?;
    std::fs::write(path, json)?;
    info!(
        "saved collection {} ({} entries) to {}",
        record.run_id,
        record.entries.len(),
        path.display()
    );
    Ok(())
}

/// Read a collection record back from disk.
pub fn load_collection<P: AsRef<Path>>(path: P) -> QsResult<CollectionRecord> {
    let file = File::open(path.as_ref())?;
    let record = serde_json::from_reader(BufReader::new(file))?;
    Ok(record)
}
