//! CSV output of per-round means
//!
//! One header row, then `round,y_avg` for every round in order.

use crate::Result;
use anyhow::Context;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// CSV writer for the per-round mean series
pub struct CsvWriter<W: Write> {
    out: W,
}

impl CsvWriter<BufWriter<File>> {
    /// Create `path` and write the header row
    pub fn create(path: &Path) -> Result<Self> {
        let file = File::create(path)
            .with_context(|| format!("Failed to create CSV output: {}", path.display()))?;
        Self::new(BufWriter::new(file))
    }
}

impl<W: Write> CsvWriter<W> {
    pub fn new(mut out: W) -> Result<Self> {
        writeln!(out, "round,y_avg")?;
        Ok(Self { out })
    }

    pub fn append_round(&mut self, round: usize, y_avg: f64) -> Result<()> {
        writeln!(self.out, "{},{:.12}", round, y_avg)?;
        Ok(())
    }

    /// Flush and return the underlying writer
    pub fn finish(mut self) -> Result<W> {
        self.out.flush()?;
        Ok(self.out)
    }
}

/// Write every per-round mean to `path`
pub fn write_round_means(path: &Path, y_avgs: &[f64]) -> Result<()> {
    let mut writer = CsvWriter::create(path)?;
    for (round, &avg) in y_avgs.iter().enumerate() {
        writer.append_round(round, avg)?;
    }
    writer.finish()?;
    Ok(())
}
