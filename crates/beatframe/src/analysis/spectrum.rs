//! Coarse spectrum snapshot.
//!
//! Reduces a fixed-length byte magnitude array (0..255 per bin) to a small
//! number of contiguous buckets. The top of the spectrum is dropped according
//! to the coverage fraction since it rarely carries visible energy.

/// Largest supported bucket count
pub const MAX_BUCKETS: usize = 128;

pub struct SpectrumBucketizer {
    buckets: usize,
    coverage: f64,
    /// Bin range of each bucket, computed for `ranges_for` input bins
    ranges: Vec<(usize, usize)>,
    ranges_for: usize,
}

impl SpectrumBucketizer {
    /// `buckets` is clamped to `0..=MAX_BUCKETS` (0 disables the feature) and
    /// `coverage` to `0..=1`.
    pub fn new(buckets: usize, coverage: f64) -> Self {
        let coverage = if coverage.is_finite() {
            coverage.clamp(0.0, 1.0)
        } else {
            0.0
        };
        Self {
            buckets: buckets.min(MAX_BUCKETS),
            coverage,
            ranges: Vec::new(),
            ranges_for: 0,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.buckets > 0
    }

    pub fn buckets(&self) -> usize {
        self.buckets
    }

    /// Write one value in 0..1 per bucket into `out`, replacing its contents.
    /// A bucket whose bin range is empty reads as 0.
    pub fn bucketize(&mut self, raw: &[u8], out: &mut Vec<f32>) {
        out.clear();
        if !self.is_enabled() {
            return;
        }
        if self.ranges_for != raw.len() || self.ranges.is_empty() {
            self.ranges = bucket_ranges(self.buckets, raw.len(), self.coverage);
            self.ranges_for = raw.len();
        }

        out.extend(self.ranges.iter().map(|&(start, end)| {
            if end > start {
                let sum: u32 = raw[start..end].iter().map(|&b| b as u32).sum();
                sum as f32 / (end - start) as f32 / 255.0
            } else {
                0.0
            }
        }));
    }
}

/// Contiguous bin ranges for `buckets` buckets over the first
/// `coverage * bins` bins. Bucket `i` ends at `floor((i + 1) / buckets * bins * coverage)`.
pub fn bucket_ranges(buckets: usize, bins: usize, coverage: f64) -> Vec<(usize, usize)> {
    let mut ranges = Vec::with_capacity(buckets);
    let mut start = 0;
    for i in 0..buckets {
        let end = ((i + 1) as f64 / buckets as f64 * bins as f64 * coverage) as usize;
        let end = end.clamp(start, bins);
        ranges.push((start, end));
        start = end;
    }
    ranges
}
