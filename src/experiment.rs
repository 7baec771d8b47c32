//! Synthetic experiment records
//!
//! Not tied to any real training run: id, accuracy and loss are drawn at
//! random each day.

use chrono::NaiveDate;
use rand::Rng;

use crate::types::ExperimentEntry;

pub const EXPERIMENT_NOTES: &str = "Automated daily experiment run.";

/// Generate one record for `date`.
///
/// - id suffix in [0, 10000)
/// - accuracy in [0.70, 0.95), 4 decimals
/// - loss in [0.10, 0.50), 4 decimals
pub fn generate_experiment<R: Rng + ?Sized>(rng: &mut R, date: NaiveDate) -> ExperimentEntry {
    let suffix: u32 = rng.random_range(0..10_000);
    let accuracy: f64 = rng.random_range(0.70..0.95);
    let loss: f64 = rng.random_range(0.10..0.50);

    ExperimentEntry {
        date: date.format("%Y-%m-%d").to_string(),
        experiment_id: format!("EXP-{}", suffix),
        accuracy: format!("{:.4}", accuracy),
        loss: format!("{:.4}", loss),
        notes: EXPERIMENT_NOTES.to_string(),
    }
}
