//! The `Workspace` container and its channel data variants.

use std::collections::BTreeSet;

use num_traits::Float;

use crate::error::{Result, SpectroError};
use crate::parallel::StorageMode;
use crate::shape::{ContainerShape, Representation};

use super::events::EventChannel;

/// Identifier of one underlying detection element. Element IDs are unique
/// within a workspace; the same ID may appear in differently sized groupings
/// across two workspaces being combined.
pub type ElementId = u64;

/// One channel of sampled values with per-sample uncertainties.
#[derive(Debug, Clone, PartialEq)]
pub struct DenseChannel<T> {
    pub y: Vec<T>,
    pub e: Vec<T>,
}

impl<T: Float> DenseChannel<T> {
    pub fn new(y: Vec<T>, e: Vec<T>) -> Result<Self> {
        if y.len() != e.len() {
            return Err(SpectroError::invalid_shape(
                "dense_channel",
                format!(
                    "value and uncertainty rows differ in length: {} vs {}",
                    y.len(),
                    e.len()
                ),
            ));
        }
        Ok(Self { y, e })
    }

    pub fn zeros(samples: usize) -> Self {
        Self {
            y: vec![T::zero(); samples],
            e: vec![T::zero(); samples],
        }
    }

    pub fn len(&self) -> usize {
        self.y.len()
    }

    pub fn is_empty(&self) -> bool {
        self.y.is_empty()
    }

    /// Sum of the samples with uncertainties added in quadrature.
    pub fn integrated(&self) -> (T, T) {
        let value = self.y.iter().fold(T::zero(), |acc, v| acc + *v);
        let error_squared = self.e.iter().fold(T::zero(), |acc, v| acc + *v * *v);
        (value, error_squared.sqrt())
    }
}

/// Channel data of a workspace. Closed set of representations; consumers
/// match exhaustively, so a workspace can never retain a stale
/// representation from a previous operation.
#[derive(Debug, Clone, PartialEq)]
pub enum WorkspaceData<T> {
    Dense(Vec<DenseChannel<T>>),
    Events(Vec<EventChannel<T>>),
    Scalar { value: T, error: T },
}

impl<T: Float> WorkspaceData<T> {
    pub fn representation(&self) -> Representation {
        match self {
            WorkspaceData::Dense(_) => Representation::Dense,
            WorkspaceData::Events(_) => Representation::SparseEvents,
            WorkspaceData::Scalar { .. } => Representation::Scalar,
        }
    }

    pub fn channel_count(&self) -> usize {
        match self {
            WorkspaceData::Dense(channels) => channels.len(),
            WorkspaceData::Events(channels) => channels.len(),
            WorkspaceData::Scalar { .. } => 1,
        }
    }

    pub fn sample_count(&self) -> usize {
        match self {
            WorkspaceData::Dense(channels) => channels.first().map_or(0, DenseChannel::len),
            WorkspaceData::Events(channels) => {
                channels.first().map_or(0, EventChannel::sample_count)
            }
            WorkspaceData::Scalar { .. } => 1,
        }
    }
}

/// A multichannel measurement container.
///
/// Every channel has an associated, possibly empty set of element IDs; the
/// sets partition the workspace's ID universe disjointly. The storage mode
/// describes the workspace's layout across cooperating processes.
#[derive(Debug, Clone, PartialEq)]
pub struct Workspace<T> {
    pub(crate) data: WorkspaceData<T>,
    pub(crate) element_ids: Vec<BTreeSet<ElementId>>,
    pub(crate) storage_mode: StorageMode,
}

impl<T: Float> Workspace<T> {
    /// Assemble a workspace, validating the cross-field invariants: one
    /// element-ID set per channel and a uniform sample count across dense
    /// channels.
    pub fn new(
        data: WorkspaceData<T>,
        element_ids: Vec<BTreeSet<ElementId>>,
        storage_mode: StorageMode,
    ) -> Result<Self> {
        if element_ids.len() != data.channel_count() {
            return Err(SpectroError::invalid_shape(
                "workspace",
                format!(
                    "{} element-id sets for {} channels",
                    element_ids.len(),
                    data.channel_count()
                ),
            ));
        }
        if let WorkspaceData::Dense(channels) = &data {
            let samples = channels.first().map_or(0, DenseChannel::len);
            if channels.iter().any(|channel| channel.len() != samples) {
                return Err(SpectroError::invalid_shape(
                    "workspace",
                    "dense channels must share one sample count",
                ));
            }
        }
        Ok(Self {
            data,
            element_ids,
            storage_mode,
        })
    }

    pub fn data(&self) -> &WorkspaceData<T> {
        &self.data
    }

    pub fn representation(&self) -> Representation {
        self.data.representation()
    }

    pub fn channel_count(&self) -> usize {
        self.data.channel_count()
    }

    pub fn sample_count(&self) -> usize {
        self.data.sample_count()
    }

    pub fn shape(&self) -> ContainerShape {
        ContainerShape::new(
            self.channel_count(),
            self.sample_count(),
            self.representation(),
        )
    }

    pub fn storage_mode(&self) -> StorageMode {
        self.storage_mode
    }

    pub fn set_storage_mode(&mut self, mode: StorageMode) {
        self.storage_mode = mode;
    }

    /// Element-ID set of one channel.
    ///
    /// # Panics
    /// Panics if `channel` is out of range.
    pub fn element_id_set(&self, channel: usize) -> &BTreeSet<ElementId> {
        &self.element_ids[channel]
    }

    pub fn element_id_sets(&self) -> &[BTreeSet<ElementId>] {
        &self.element_ids
    }

    /// True for `Scalar` workspaces and 1-channel, 1-sample workspaces.
    pub fn is_single_value(&self) -> bool {
        self.shape().is_single_value()
    }

    /// The broadcastable value/uncertainty pair of a single-value workspace,
    /// whatever its representation.
    pub fn scalar_value(&self) -> Option<(T, T)> {
        match &self.data {
            WorkspaceData::Scalar { value, error } => Some((*value, *error)),
            WorkspaceData::Dense(channels) if channels.len() == 1 && channels[0].len() == 1 => {
                Some((channels[0].y[0], channels[0].e[0]))
            }
            WorkspaceData::Events(channels)
                if channels.len() == 1 && channels[0].sample_count() == 1 =>
            {
                let (value, error) = channels[0].integrated();
                Some((value, error))
            }
            _ => None,
        }
    }

    /// A dense view of one channel: a clone for dense workspaces, the binned
    /// histogram for event workspaces, the value itself for scalars.
    pub fn dense_channel(&self, channel: usize) -> Result<DenseChannel<T>> {
        let out_of_range = || {
            SpectroError::invalid_argument(
                "dense_channel",
                format!(
                    "channel {channel} out of range for {} channels",
                    self.channel_count()
                ),
            )
        };
        match &self.data {
            WorkspaceData::Dense(channels) => channels.get(channel).cloned().ok_or_else(out_of_range),
            WorkspaceData::Events(channels) => channels
                .get(channel)
                .map(EventChannel::to_dense)
                .ok_or_else(out_of_range),
            WorkspaceData::Scalar { value, error } => {
                if channel == 0 {
                    Ok(DenseChannel {
                        y: vec![*value],
                        e: vec![*error],
                    })
                } else {
                    Err(out_of_range())
                }
            }
        }
    }
}
