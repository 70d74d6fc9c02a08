//! Sparse per-channel event lists.

use num_traits::Float;

use super::core::DenseChannel;

/// One detected event: arrival coordinate, statistical weight and the
/// squared uncertainty of that weight.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Event<T> {
    pub tof: T,
    pub weight: T,
    pub error_squared: T,
}

impl<T: Float> Event<T> {
    /// A counts event: unit weight, unit squared error.
    pub fn counts(tof: T) -> Self {
        Self {
            tof,
            weight: T::one(),
            error_squared: T::one(),
        }
    }

    pub fn weighted(tof: T, weight: T, error_squared: T) -> Self {
        Self {
            tof,
            weight,
            error_squared,
        }
    }
}

/// An unsorted event list with the bin grid used for its dense view.
///
/// The list itself has no fixed per-channel sample count; the sample count
/// reported to the compatibility checker is the number of bins of the grid
/// (one bin when no usable grid is set).
#[derive(Debug, Clone, PartialEq)]
pub struct EventChannel<T> {
    pub bin_edges: Vec<T>,
    pub events: Vec<Event<T>>,
}

impl<T: Float> EventChannel<T> {
    pub fn new(bin_edges: Vec<T>) -> Self {
        Self {
            bin_edges,
            events: Vec::new(),
        }
    }

    pub fn with_events(bin_edges: Vec<T>, events: Vec<Event<T>>) -> Self {
        Self { bin_edges, events }
    }

    pub fn push(&mut self, event: Event<T>) {
        self.events.push(event);
    }

    /// Number of bins in the dense view of this channel.
    pub fn sample_count(&self) -> usize {
        self.bin_edges.len().saturating_sub(1).max(1)
    }

    /// Sum of event weights.
    pub fn total_weight(&self) -> T {
        self.events
            .iter()
            .fold(T::zero(), |acc, event| acc + event.weight)
    }

    /// Integrated value and uncertainty of the whole list.
    pub fn integrated(&self) -> (T, T) {
        let error_squared = self
            .events
            .iter()
            .fold(T::zero(), |acc, event| acc + event.error_squared);
        (self.total_weight(), error_squared.sqrt())
    }

    /// Bin the events onto the channel's grid. Events outside the grid are
    /// dropped; without a usable grid everything lands in a single bin.
    pub fn to_dense(&self) -> DenseChannel<T> {
        if self.bin_edges.len() < 2 {
            let (value, error) = self.integrated();
            return DenseChannel {
                y: vec![value],
                e: vec![error],
            };
        }
        let bins = self.bin_edges.len() - 1;
        let mut y = vec![T::zero(); bins];
        let mut error_squared = vec![T::zero(); bins];
        for event in &self.events {
            if let Some(bin) = self.bin_index(event.tof) {
                y[bin] = y[bin] + event.weight;
                error_squared[bin] = error_squared[bin] + event.error_squared;
            }
        }
        let e = error_squared.into_iter().map(Float::sqrt).collect();
        DenseChannel { y, e }
    }

    /// Index of the bin containing `tof`, with edges sorted ascending and
    /// bins half-open on the right.
    fn bin_index(&self, tof: T) -> Option<usize> {
        let below = self.bin_edges.partition_point(|edge| *edge <= tof);
        if below == 0 || below == self.bin_edges.len() {
            None
        } else {
            Some(below - 1)
        }
    }
}
