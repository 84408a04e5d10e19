//! Binned summaries of persisted collections.
//!
//! Each dimension's unit interval is split into equal-width bins; every
//! entry's score accumulates into the bin holding its unit coordinate, and
//! bin totals are normalized by `entries / bins` so a flat collection scores
//! 1.0 everywhere. Rows report the parameter value at the bin midpoint,
//! mapped through the dimension's transform, which is what downstream
//! posterior/percentile plots bin against.

use std::io::Write;
use std::path::Path;

use qs_design::TransformSet;
use qs_types::QsResult;

use crate::storage::CollectionRecord;

pub const DEFAULT_BINS: usize = 30;

/// One summary row: a dimension, a bin, and its normalized score weight.
#[derive(Debug, Clone, PartialEq)]
pub struct BinRow {
    pub parameter: String,
    pub bin: usize,
    /// Parameter value at the bin midpoint.
    pub value: f64,
    /// Score mass of the bin, normalized by `entries / bins`.
    pub score: f64,
}

/// Accumulate the score-weighted histogram of a collection record.
pub fn binned_summary(record: &CollectionRecord, bins: usize) -> QsResult<Vec<BinRow>> {
    let transforms = TransformSet::for_params(&record.parameters)?;
    let dimensions = record.parameters.dimension_count();

    let mut totals = vec![vec![0.0f64; bins]; dimensions];
    for entry in &record.entries {
        for j in 0..dimensions {
            // A coordinate arbitrarily close to 1 floors into the top bin.
            let index = ((entry.unit_coords[j] * bins as f64).floor() as usize).min(bins - 1);
            totals[j][index] += entry.score;
        }
    }
    let denom = record.entries.len() as f64 / bins as f64;

    let names = record.parameters.names();
    let mut rows = Vec::with_capacity(bins * dimensions);
    for bin in 0..bins {
        for j in 0..dimensions {
            let midpoint = (bin as f64 + 0.5) / bins as f64;
            rows.push(BinRow {
                parameter: names[j].to_string(),
                bin,
                value: transforms.get(j).sample(midpoint),
                score: if denom > 0.0 { totals[j][bin] / denom } else { 0.0 },
            });
        }
    }
    Ok(rows)
}

/// Emit summary rows as CSV.
pub fn write_csv_summary<W: Write>(writer: &mut W, rows: &[BinRow]) -> QsResult<()> {
    writeln!(writer, "parameter,bin,value,score")?;
    for row in rows {
        writeln!(
            writer,
            "{},{},{},{}",
            row.parameter, row.bin, row.value, row.score
        )?;
    }
    Ok(())
}

/// Summarize a record and write the CSV next to wherever the caller points.
pub fn save_csv_summary<P: AsRef<Path>>(
    path: P,
    record: &CollectionRecord,
    bins: usize,
) -> QsResult<()> {
    let rows = binned_summary(record, bins)?;
    let mut file = std::fs::File::create(path.as_ref())?;
    write_csv_summary(&mut file, &rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use qs_types::{CollectOutcome, ParamSpec, ParameterSet, ThresholdEntry};
    use uuid::Uuid;

    fn record_with(entries: Vec<ThresholdEntry>) -> CollectionRecord {
        CollectionRecord {
            run_id: Uuid::new_v4(),
            created_at: Utc::now(),
            parameters: ParameterSet::new().with(ParamSpec::linear("x", 0.0, 10.0).unwrap()),
            outcome: CollectOutcome::TargetReached { trials: 1 },
            entries,
        }
    }

    fn entry(u: f64, score: f64) -> ThresholdEntry {
        ThresholdEntry {
            score,
            unit_coords: vec![u],
            parameter_coords: None,
        }
    }

    #[test]
    fn scores_land_in_the_right_bins() {
        let record = record_with(vec![entry(0.05, 2.0), entry(0.07, 1.0), entry(0.95, 4.0)]);
        let rows = binned_summary(&record, 10).unwrap();
        assert_eq!(rows.len(), 10);

        // denom = 3 entries / 10 bins.
        let denom = 0.3;
        assert!((rows[0].score - 3.0 / denom).abs() < 1e-12);
        assert!((rows[9].score - 4.0 / denom).abs() < 1e-12);
        assert!(rows[1..9].iter().all(|r| r.score == 0.0));

        // Midpoint of bin 0 maps through the linear transform.
        assert!((rows[0].value - 0.5).abs() < 1e-12);
        assert!((rows[9].value - 9.5).abs() < 1e-12);
    }

    #[test]
    fn coordinate_at_upper_edge_stays_in_range() {
        let record = record_with(vec![entry(0.999_999_9, 1.0)]);
        let rows = binned_summary(&record, 30).unwrap();
        assert!(rows[29].score > 0.0);
    }

    #[test]
    fn empty_collection_summarizes_to_zeros() {
        let record = record_with(Vec::new());
        let rows = binned_summary(&record, 5).unwrap();
        assert!(rows.iter().all(|r| r.score == 0.0));
    }

    #[test]
    fn csv_has_header_and_one_row_per_bin() {
        let record = record_with(vec![entry(0.5, 1.0)]);
        let rows = binned_summary(&record, 4).unwrap();
        let mut out = Vec::new();
        write_csv_summary(&mut out, &rows).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "parameter,bin,value,score");
        assert_eq!(lines.len(), 5);
        assert!(lines[1].starts_with("x,0,"));
    }
}
