//! Utilities for displaying how far through its input a pack/unpack run is.
//!
//! The bar belongs to a tracing span, so `tracing-indicatif` draws it and keeps
//! log lines from tearing through it. See <https://docs.rs/indicatif> for the
//! template keys.

use std::io::{Read, Seek, SeekFrom};
use std::time::{Duration, Instant};

use indicatif::{HumanBytes, HumanDuration, ProgressStyle};
use tracing::{info, Span};
use tracing_indicatif::span_ext::IndicatifSpanExt;

/// A wrapper around a reader that keeps track of how many bytes went through it.
///
/// Seeking is passed through without resetting the count, so a source that is
/// read twice should be given twice its size as `total`.
pub struct ProgressMonitor<R> {
    /// The total amount that is expected to be read
    pub total: u64,
    /// Amount read so far
    pub read: u64,
    reader: R,
    span: Span,
    started: Instant,
}

impl<R> ProgressMonitor<R> {
    pub fn new(reader: R, total: u64, span: Span) -> Self {
        span.pb_set_style(&bar_style());
        span.pb_set_length(total);
        Self {
            total,
            read: 0,
            reader,
            span,
            started: Instant::now(),
        }
    }

    /// Log a one line summary of the run.
    pub fn finish(&self) {
        let elapsed = self.started.elapsed();
        info!(
            "processed {} in {} ({}/s avg)",
            HumanBytes(self.read),
            HumanDuration(elapsed),
            HumanBytes(bytes_per_second(self.read, elapsed))
        );
    }
}

fn bar_style() -> ProgressStyle {
    ProgressStyle::with_template(
        "{wide_bar} {binary_bytes}/{binary_total_bytes} [est. {eta} remaining]",
    )
    .unwrap_or_else(|_| ProgressStyle::default_bar())
}

fn bytes_per_second(bytes: u64, elapsed: Duration) -> u64 {
    let secs = elapsed.as_secs_f64();
    if secs > 0.0 {
        (bytes as f64 / secs) as u64
    } else {
        bytes
    }
}

impl<R: Read> Read for ProgressMonitor<R> {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        let out = self.reader.read(buf)?;
        self.read += out as u64;
        self.span.pb_inc(out as u64);
        Ok(out)
    }
}

impl<R: Seek> Seek for ProgressMonitor<R> {
    fn seek(&mut self, pos: SeekFrom) -> std::io::Result<u64> {
        self.reader.seek(pos)
    }
}
