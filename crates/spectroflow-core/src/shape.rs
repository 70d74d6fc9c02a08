#[cfg(feature = "serialize")]
use serde::{Deserialize, Serialize};

/// How a workspace stores its per-channel data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub enum Representation {
    /// Fixed-length sampled values with uncertainties, one row per channel.
    Dense,
    /// Per-channel event lists with no fixed sample count.
    SparseEvents,
    /// A single value with a single uncertainty.
    Scalar,
}

impl std::fmt::Display for Representation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Representation::Dense => "dense",
            Representation::SparseEvents => "event",
            Representation::Scalar => "single value",
        };
        write!(f, "{name}")
    }
}

/// Channel count, per-channel sample count and storage representation of a
/// workspace. A `Scalar` shape always has one channel and one sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct ContainerShape {
    channels: usize,
    samples: usize,
    representation: Representation,
}

impl ContainerShape {
    pub fn new(channels: usize, samples: usize, representation: Representation) -> Self {
        debug_assert!(
            representation != Representation::Scalar || (channels == 1 && samples == 1),
            "a scalar shape must be 1 channel by 1 sample"
        );
        Self {
            channels,
            samples,
            representation,
        }
    }

    /// The shape of a single-value workspace.
    pub fn scalar() -> Self {
        Self::new(1, 1, Representation::Scalar)
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    pub fn samples(&self) -> usize {
        self.samples
    }

    pub fn representation(&self) -> Representation {
        self.representation
    }

    /// True for `Scalar` shapes and for any 1-channel, 1-sample workspace,
    /// which broadcasts exactly like one.
    pub fn is_single_value(&self) -> bool {
        self.representation == Representation::Scalar || (self.channels == 1 && self.samples == 1)
    }
}

impl std::fmt::Display for ContainerShape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[{} x {}, {}]",
            self.channels, self.samples, self.representation
        )
    }
}
