// ============================================================
// Layer 6: Loss History Logger
// ============================================================
// Records the critic and generator losses after every
// generator update, both in memory and as CSV rows.
//
// Output file: <output_dir>/loss_history.csv
//
// Example CSV output:
//   count,epoch,discriminator_loss,generator_loss
//   1,0,-0.000412,0.000215
//   2,0,-0.001873,0.000934
//   ...
//
// How to read the metrics:
//   - discriminator_loss = D(real) - D(fake). The critic
//     minimises it, so it drifts negative; its magnitude is an
//     estimate of the Wasserstein distance.
//   - generator_loss = D(G(z)), which the generator minimises.
//
// Reference: Rust Book §12 (I/O and File Handling)

use anyhow::{Context, Result};
use std::{
    fs::{self, OpenOptions},
    io::Write,
    path::{Path, PathBuf},
};
use serde::{Deserialize, Serialize};

const CSV_HEADER: &str = "count,epoch,discriminator_loss,generator_loss";

/// Losses recorded after one generator update
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StepMetrics {
    /// Running generator-step counter across all epochs (starts at 1)
    pub count: usize,

    /// Zero-based epoch the step belongs to
    pub epoch: usize,

    /// D(real) - D(fake) from the last critic update
    pub discriminator_loss: f64,

    /// D(G(z)) from the generator update
    pub generator_loss: f64,
}

impl StepMetrics {
    pub fn new(count: usize, epoch: usize, discriminator_loss: f64, generator_loss: f64) -> Self {
        Self { count, epoch, discriminator_loss, generator_loss }
    }
}

/// Aggregate view of a finished run
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LossSummary {
    pub steps: usize,
    pub last_discriminator_loss: f64,
    pub last_generator_loss: f64,
    pub mean_discriminator_loss: f64,
    pub mean_generator_loss: f64,
}

impl LossSummary {
    /// None for an empty history
    pub fn from_history(history: &[StepMetrics]) -> Option<Self> {
        let last  = history.last()?;
        let steps = history.len();
        let mean  = |f: fn(&StepMetrics) -> f64| history.iter().map(f).sum::<f64>() / steps as f64;

        Some(Self {
            steps,
            last_discriminator_loss: last.discriminator_loss,
            last_generator_loss:     last.generator_loss,
            mean_discriminator_loss: mean(|m| m.discriminator_loss),
            mean_generator_loss:     mean(|m| m.generator_loss),
        })
    }
}

/// Appends step metrics to a CSV file and keeps them in memory.
pub struct MetricsLogger {
    csv_path: PathBuf,
    history:  Vec<StepMetrics>,
}

impl MetricsLogger {
    /// Create a new MetricsLogger.
    /// Writes the CSV header if the file doesn't exist yet.
    pub fn new(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)
            .with_context(|| format!("Cannot create metrics directory '{}'", dir.display()))?;

        let csv_path = dir.join("loss_history.csv");
        if !csv_path.exists() {
            let mut f = fs::File::create(&csv_path)?;
            writeln!(f, "{CSV_HEADER}")?;
            tracing::debug!("Created loss history CSV: '{}'", csv_path.display());
        }

        Ok(Self { csv_path, history: Vec::new() })
    }

    /// Append one row and remember it.
    pub fn log(&mut self, m: StepMetrics) -> Result<()> {
        let mut f = OpenOptions::new()
            .append(true)
            .open(&self.csv_path)
            .with_context(|| format!("Cannot open '{}'", self.csv_path.display()))?;

        writeln!(
            f,
            "{},{},{:.6},{:.6}",
            m.count,
            m.epoch,
            m.discriminator_loss,
            m.generator_loss,
        )?;

        self.history.push(m);
        Ok(())
    }

    /// Everything logged by this instance, in order
    pub fn history(&self) -> &[StepMetrics] {
        &self.history
    }

    pub fn summary(&self) -> Option<LossSummary> {
        LossSummary::from_history(&self.history)
    }

    pub fn csv_path(&self) -> &Path {
        &self.csv_path
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_of_history() {
        let history = vec![
            StepMetrics::new(1, 0, -1.0, 0.5),
            StepMetrics::new(2, 0, -3.0, 1.5),
        ];
        let s = LossSummary::from_history(&history).unwrap();
        assert_eq!(s.steps, 2);
        assert_eq!(s.last_discriminator_loss, -3.0);
        assert_eq!(s.mean_discriminator_loss, -2.0);
        assert_eq!(s.mean_generator_loss, 1.0);
    }

    #[test]
    fn test_empty_history_has_no_summary() {
        assert!(LossSummary::from_history(&[]).is_none());
    }

    #[test]
    fn test_rows_are_appended_after_header() {
        let dir = tempfile::tempdir().unwrap();
        let mut logger = MetricsLogger::new(dir.path()).unwrap();
        logger.log(StepMetrics::new(1, 0, -0.25, 0.125)).unwrap();
        logger.log(StepMetrics::new(2, 1, -0.5, 0.25)).unwrap();

        let csv   = fs::read_to_string(logger.csv_path()).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], CSV_HEADER);
        assert_eq!(lines[1], "1,0,-0.250000,0.125000");
        assert_eq!(lines[2], "2,1,-0.500000,0.250000");
        assert_eq!(logger.history().len(), 2);
    }

    #[test]
    fn test_header_written_once() {
        let dir = tempfile::tempdir().unwrap();
        MetricsLogger::new(dir.path()).unwrap();
        let mut logger = MetricsLogger::new(dir.path()).unwrap();
        logger.log(StepMetrics::new(1, 0, 0.0, 0.0)).unwrap();

        let csv = fs::read_to_string(logger.csv_path()).unwrap();
        assert_eq!(csv.matches(CSV_HEADER).count(), 1);
    }
}
