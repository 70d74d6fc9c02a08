//! Workspace construction helpers.
//!
//! Small factories covering the shapes the engine and its tests need:
//! uniform dense workspaces, single values, and grouped event workspaces
//! where each channel aggregates an explicit list of element IDs.

use std::collections::BTreeSet;

use num_traits::Float;

use crate::error::{Result, SpectroError};
use crate::parallel::StorageMode;

use super::core::{DenseChannel, ElementId, Workspace, WorkspaceData};
use super::events::{Event, EventChannel};

/// Unit-spaced bin edges starting at zero, built without numeric casts.
fn unit_edges<T: Float>(bins: usize) -> Vec<T> {
    let mut edges = Vec::with_capacity(bins + 1);
    let mut x = T::zero();
    for _ in 0..=bins {
        edges.push(x);
        x = x + T::one();
    }
    edges
}

impl<T: Float> Workspace<T> {
    /// A dense workspace with every sample set to `value`/`error` and one
    /// element ID per channel (channel `i` owns ID `i`).
    pub fn dense(channels: usize, samples: usize, value: T, error: T) -> Self {
        let channel = DenseChannel {
            y: vec![value; samples],
            e: vec![error; samples],
        };
        Self {
            data: WorkspaceData::Dense(vec![channel; channels]),
            element_ids: default_element_ids(channels),
            storage_mode: StorageMode::Cloned,
        }
    }

    /// A dense workspace from explicit channels, one element ID per channel.
    pub fn dense_from_channels(channels: Vec<DenseChannel<T>>) -> Result<Self> {
        let ids = default_element_ids(channels.len());
        Self::new(WorkspaceData::Dense(channels), ids, StorageMode::Cloned)
    }

    /// A single-value workspace. Scalars aggregate no detection elements, so
    /// the one channel carries an empty element-ID set.
    pub fn single_value(value: T, error: T) -> Self {
        Self {
            data: WorkspaceData::Scalar { value, error },
            element_ids: vec![BTreeSet::new()],
            storage_mode: StorageMode::Cloned,
        }
    }

    /// An event workspace with one channel per element-ID group, a
    /// unit-spaced grid of `samples` bins, and one counts event per bin.
    pub fn grouped_events(groups: Vec<Vec<ElementId>>, samples: usize) -> Self {
        let edges = unit_edges::<T>(samples);
        let channels: Vec<EventChannel<T>> = groups
            .iter()
            .map(|_| {
                let mut channel = EventChannel::new(edges.clone());
                let half = T::one() / (T::one() + T::one());
                let mut x = half;
                for _ in 0..samples {
                    channel.push(Event::counts(x));
                    x = x + T::one();
                }
                channel
            })
            .collect();
        let element_ids = groups
            .into_iter()
            .map(|group| group.into_iter().collect())
            .collect();
        Self {
            data: WorkspaceData::Events(channels),
            element_ids,
            storage_mode: StorageMode::Cloned,
        }
    }

    /// Replace the per-channel element-ID sets.
    pub fn with_element_ids(mut self, element_ids: Vec<BTreeSet<ElementId>>) -> Result<Self> {
        if element_ids.len() != self.channel_count() {
            return Err(SpectroError::invalid_shape(
                "with_element_ids",
                format!(
                    "{} element-id sets for {} channels",
                    element_ids.len(),
                    self.channel_count()
                ),
            ));
        }
        self.element_ids = element_ids;
        Ok(self)
    }

    /// Replace the element-ID sets from plain ID groups, one per channel.
    pub fn with_element_groups(self, groups: Vec<Vec<ElementId>>) -> Result<Self> {
        self.with_element_ids(
            groups
                .into_iter()
                .map(|group| group.into_iter().collect())
                .collect(),
        )
    }

    pub fn with_storage_mode(mut self, mode: StorageMode) -> Self {
        self.storage_mode = mode;
        self
    }
}

fn default_element_ids(channels: usize) -> Vec<BTreeSet<ElementId>> {
    (0..channels)
        .map(|i| std::iter::once(i as ElementId).collect())
        .collect()
}
