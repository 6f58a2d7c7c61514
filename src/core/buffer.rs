//! Bounded sample store for streaming sessions.
//!
//! Samples are kept oldest-first. Appending beyond [`MAX_SAMPLES`] drops the
//! oldest entries so the buffer never holds more than the capacity.

use crate::core::constants::MAX_SAMPLES;
use crate::core::sample::Sample;
use std::collections::VecDeque;

/// Fixed-capacity FIFO of samples.
#[derive(Debug, Clone)]
pub struct SampleBuffer {
    samples: VecDeque<Sample>,
    capacity: usize,
}

impl SampleBuffer {
    /// Create an empty buffer holding at most [`MAX_SAMPLES`] samples.
    pub fn new() -> Self {
        Self::with_capacity(MAX_SAMPLES)
    }

    /// Create an empty buffer with a custom capacity (at least one sample).
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            samples: VecDeque::with_capacity(capacity.min(1024)),
            capacity,
        }
    }

    /// Append a sample, evicting from the front if over capacity.
    ///
    /// Returns the number of samples evicted.
    pub fn append(&mut self, sample: Sample) -> usize {
        self.samples.push_back(sample);

        let excess = self.samples.len().saturating_sub(self.capacity);
        if excess > 0 {
            self.samples.drain(..excess);
        }
        excess
    }

    /// Remove all samples.
    pub fn clear(&mut self) {
        self.samples.clear();
    }

    /// Borrow the current contents, oldest first.
    ///
    /// The view is tied to this borrow and cannot outlive the next mutation.
    pub fn snapshot(&self) -> SampleSnapshot<'_> {
        let (head, tail) = self.samples.as_slices();
        SampleSnapshot { head, tail }
    }

    /// Number of samples currently held.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Check if the buffer holds no samples.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Maximum number of samples retained.
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for SampleBuffer {
    fn default() -> Self {
        Self::new()
    }
}

/// Read-only, ordered view of a [`SampleBuffer`].
#[derive(Debug, Clone, Copy)]
pub struct SampleSnapshot<'a> {
    head: &'a [Sample],
    tail: &'a [Sample],
}

impl<'a> SampleSnapshot<'a> {
    /// Iterate over the samples, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &'a Sample> + Clone {
        self.head.iter().chain(self.tail.iter())
    }

    pub fn len(&self) -> usize {
        self.head.len() + self.tail.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Oldest sample in the view.
    pub fn first(&self) -> Option<&'a Sample> {
        self.head.first().or_else(|| self.tail.first())
    }

    /// Newest sample in the view.
    pub fn last(&self) -> Option<&'a Sample> {
        self.tail.last().or_else(|| self.head.last())
    }

    /// Copy the view into an owned vector.
    pub fn to_vec(&self) -> Vec<Sample> {
        self.iter().copied().collect()
    }
}
