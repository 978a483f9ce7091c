//! Throughput and correctness statistics for codec runs.
//!
//! Collects phase timings (encode, decode) and per-block verification
//! outcomes, and prints the summary reports shown at the end of a run.

use secded_common::units::payload_mib;
use std::time::Duration;

/// Timing of one pass over a block array.
pub struct PhaseTiming {
    pub label: &'static str,
    pub blocks: usize,
    pub elapsed: Duration,
}

impl PhaseTiming {
    pub fn new(label: &'static str, blocks: usize, elapsed: Duration) -> Self {
        Self {
            label,
            blocks,
            elapsed,
        }
    }

    pub fn millis(&self) -> f64 {
        self.elapsed.as_secs_f64() * 1000.0
    }

    /// Blocks per second, or 0.0 for an unmeasurably short pass.
    pub fn blocks_per_sec(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs == 0.0 {
            0.0
        } else {
            self.blocks as f64 / secs
        }
    }

    /// Payload MiB per second at 57 bits per block.
    pub fn mib_per_sec(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs == 0.0 {
            0.0
        } else {
            payload_mib(self.blocks) / secs
        }
    }

    pub fn print(&self) {
        println!(
            "{:<7} {:.3} MiB in {:.3} ms ({:.2} Mblocks/s, {:.2} MiB/s)",
            self.label,
            payload_mib(self.blocks),
            self.millis(),
            self.blocks_per_sec() / 1e6,
            self.mib_per_sec()
        );
    }
}

/// Per-block verification outcomes.
///
/// Blocks are bucketed by how many flips they received. Up to one flip the
/// decoder must return the original payload; with two it must refuse. Blocks
/// with three or more flips are counted but not judged, since a distance-4
/// code cannot classify them.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Verification {
    /// Zero or one flip, decoded to the original payload.
    pub recovered: usize,
    /// Two flips, reported uncorrectable.
    pub detected: usize,
    /// Zero or one flip, but decode failed or returned the wrong payload.
    pub lost: usize,
    /// Two flips, but decode claimed success.
    pub miscorrected: usize,
    /// Three or more flips.
    pub unjudged: usize,
}

impl Verification {
    pub fn passed(&self) -> usize {
        self.recovered + self.detected
    }

    pub fn failed(&self) -> usize {
        self.lost + self.miscorrected
    }

    pub fn is_clean(&self) -> bool {
        self.failed() == 0
    }

    pub fn merge(self, other: Self) -> Self {
        Self {
            recovered: self.recovered + other.recovered,
            detected: self.detected + other.detected,
            lost: self.lost + other.lost,
            miscorrected: self.miscorrected + other.miscorrected,
            unjudged: self.unjudged + other.unjudged,
        }
    }

    pub fn print_report(&self) {
        println!("\nVerification");
        println!("Pass:          {}", self.passed());
        println!("  recovered:   {}", self.recovered);
        println!("  detected:    {}", self.detected);
        println!("Fail:          {}", self.failed());
        if self.failed() > 0 {
            println!("  lost:        {}", self.lost);
            println!("  miscorrected:{}", self.miscorrected);
        }
        if self.unjudged > 0 {
            println!("Unjudged (3+ flips): {}", self.unjudged);
        }
    }
}
