//! End-to-end demo: describe a parameter space, collect above-threshold
//! samples, rank them, persist the collection, and summarize it.
//!
//! Run with `cargo run --example collect_demo`; set `RUST_LOG=debug` to see
//! per-trial driver output.

use qs_engine::report::{save_csv_summary, DEFAULT_BINS};
use qs_engine::{collect_mapped, rank_samples, save_collection, CollectionRecord, ThresholdConfig};
use qs_types::{ParamSpec, ParameterSet};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    // A three-parameter space: one linear, one log-scaled decade range, one
    // peaked around 0.3 of its span.
    let params = ParameterSet::new()
        .with(ParamSpec::linear("storage", 0.0, 250.0)?)
        .with(ParamSpec::linear("conductivity", -6.0, -2.0)?.with_log_scale())
        .with(ParamSpec::triangle("porosity", 0.05, 0.45, 0.3)?);

    // Toy objective: closeness to a known-good point, scored in (0, 1].
    let objective = |sample: &[f64], _index: usize| {
        let miss = ((sample[0] - 120.0) / 250.0).powi(2)
            + (sample[1].log10() + 4.0).powi(2)
            + ((sample[2] - 0.2) / 0.4).powi(2);
        1.0 / (1.0 + miss)
    };

    let config = ThresholdConfig::new(200, 0.6).with_seed(2024);
    let run = collect_mapped(&objective, &params, &config)?;
    println!(
        "collected {} qualifying samples in {} trials ({:?})",
        run.collection.len(),
        run.trials,
        run.outcome
    );

    let scores: Vec<f64> = run.collection.entries().iter().map(|e| e.score).collect();
    let ranked = rank_samples(&scores, false);
    if let Some(&best) = ranked.first() {
        let entry = &run.collection.entries()[best];
        println!(
            "best score {:.4} at {:?}",
            entry.score,
            entry.parameter_coords.as_ref().unwrap()
        );
    }

    let record = CollectionRecord::from_run(params, run);
    let dir = std::env::temp_dir().join("qs-collect-demo");
    save_collection(dir.join("collection.json"), &record)?;
    save_csv_summary(dir.join("summary.csv"), &record, DEFAULT_BINS)?;
    println!("results written under {}", dir.display());

    Ok(())
}
