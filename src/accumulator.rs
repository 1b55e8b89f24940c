//! Additive sample buffer for a single output channel.
//!
//! Ray arrivals that land on the same sample superpose, so every write adds to
//! what is already there. The buffer grows lazily to the highest index written
//! and reads past its end yield silence.

/// Growable, additively written buffer of `f32` samples.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SampleAccumulator {
    samples: Vec<f32>,
    has_samples: bool,
}

impl SampleAccumulator {
    /// Creates an empty accumulator
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps already rendered audio, e.g. the output of a post-processing stage.
    pub fn from_samples(samples: Vec<f32>) -> Self {
        let has_samples = !samples.is_empty();
        Self {
            samples,
            has_samples,
        }
    }

    /// Adds `value` to the sample at `index`, zero-extending the buffer as needed.
    ///
    /// Negative indices, and indices the buffer cannot grow to, are ignored.
    #[inline]
    pub fn add(&mut self, index: i64, value: f32) {
        let Ok(index) = usize::try_from(index) else {
            return;
        };
        if index >= self.samples.len() {
            let additional = index - self.samples.len() + 1;
            if self.samples.try_reserve_exact(additional).is_err() {
                log::warn!("Dropping write at sample {}: buffer cannot grow", index);
                return;
            }
            self.samples.resize(index + 1, 0.0);
        }
        self.samples[index] += value;
        self.has_samples = true;
    }

    /// Returns the sample at `index`, or 0.0 outside the written extent.
    pub fn read(&self, index: i64) -> f32 {
        if index < 0 {
            return 0.0;
        }
        self.samples.get(index as usize).copied().unwrap_or(0.0)
    }

    /// Number of materialized samples
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Whether any write has been accepted
    pub fn has_samples(&self) -> bool {
        self.has_samples
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.samples
    }

    /// Adds every sample of `other` into this buffer.
    pub fn merge(&mut self, other: &SampleAccumulator) {
        if other.samples.len() > self.samples.len() {
            self.samples.resize(other.samples.len(), 0.0);
        }
        for (dst, src) in self.samples.iter_mut().zip(&other.samples) {
            *dst += *src;
        }
        self.has_samples |= other.has_samples;
    }

    /// Drops all samples at or beyond `len`.
    pub fn truncate(&mut self, len: usize) {
        self.samples.truncate(len);
    }

    /// Largest absolute sample value, 0.0 when empty.
    pub fn peak(&self) -> f32 {
        self.samples.iter().fold(0.0f32, |peak, s| peak.max(s.abs()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_grows_and_zero_fills() {
        let mut acc = SampleAccumulator::new();
        assert!(acc.is_empty());
        assert!(!acc.has_samples());

        acc.add(3, 0.5);
        assert_eq!(acc.len(), 4);
        assert_eq!(acc.as_slice(), &[0.0, 0.0, 0.0, 0.5]);
        assert!(acc.has_samples());
    }

    #[test]
    fn test_add_is_additive() {
        let mut acc = SampleAccumulator::new();
        acc.add(1, 0.25);
        acc.add(1, 0.5);
        acc.add(0, -1.0);
        assert_eq!(acc.read(1), 0.75);
        assert_eq!(acc.read(0), -1.0);
        assert_eq!(acc.len(), 2);
    }

    #[test]
    fn test_negative_index_is_ignored() {
        let mut acc = SampleAccumulator::new();
        acc.add(-1, 1.0);
        acc.add(i64::MIN, 1.0);
        assert_eq!(acc.len(), 0);
        assert!(!acc.has_samples());
    }

    #[test]
    fn test_unreachable_index_is_dropped() {
        let mut acc = SampleAccumulator::new();
        acc.add(2, 1.0);
        acc.add(i64::MAX, 1.0);
        assert_eq!(acc.len(), 3);
        assert_eq!(acc.read(i64::MAX), 0.0);
    }

    #[test]
    fn test_read_past_end_is_silence() {
        let mut acc = SampleAccumulator::new();
        acc.add(0, 1.0);
        assert_eq!(acc.read(1), 0.0);
        assert_eq!(acc.read(10_000), 0.0);
        assert_eq!(acc.read(-5), 0.0);
    }

    #[test]
    fn test_merge_extends_shorter_buffer() {
        let mut a = SampleAccumulator::from_samples(vec![1.0, 2.0]);
        let b = SampleAccumulator::from_samples(vec![0.5, 0.5, 0.5, 0.5]);
        a.merge(&b);
        assert_eq!(a.as_slice(), &[1.5, 2.5, 0.5, 0.5]);

        let mut empty = SampleAccumulator::new();
        empty.merge(&SampleAccumulator::new());
        assert!(!empty.has_samples());
    }

    #[test]
    fn test_truncate_and_peak() {
        let mut acc = SampleAccumulator::from_samples(vec![0.1, -0.9, 0.4, 0.2]);
        assert_eq!(acc.peak(), 0.9);
        acc.truncate(1);
        assert_eq!(acc.as_slice(), &[0.1]);
        assert_eq!(acc.peak(), 0.1);
    }
}
