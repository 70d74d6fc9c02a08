//! Size compatibility rules for binary operations.
//!
//! Pure shape-level decision: may an elementwise operation between two
//! workspaces proceed at all, and if so, does the right-hand side broadcast?
//! Nothing here inspects channel data or element IDs.

use crate::shape::{ContainerShape, Representation};

/// Outcome of a size check. `reason` is user-facing diagnostic text and is
/// never used for control flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SizeCompatibility {
    pub compatible: bool,
    /// The RHS is a single value combined with every LHS sample.
    pub scalar_broadcast: bool,
    /// The RHS has one channel whose samples line up with every LHS channel.
    pub single_channel_broadcast: bool,
    pub reason: String,
}

impl SizeCompatibility {
    fn compatible() -> Self {
        Self {
            compatible: true,
            scalar_broadcast: false,
            single_channel_broadcast: false,
            reason: String::new(),
        }
    }

    fn scalar_broadcast() -> Self {
        Self {
            scalar_broadcast: true,
            ..Self::compatible()
        }
    }

    fn single_channel_broadcast() -> Self {
        Self {
            single_channel_broadcast: true,
            ..Self::compatible()
        }
    }

    fn incompatible(reason: String) -> Self {
        Self {
            compatible: false,
            scalar_broadcast: false,
            single_channel_broadcast: false,
            reason,
        }
    }
}

/// Decide whether an elementwise binary operation between the two shapes may
/// proceed. Rules, evaluated in order:
///
/// 1. a single-value RHS always broadcasts;
/// 2. with equal channel counts, equal sample counts combine sample for
///    sample, and an event-list operand on either side lifts the sample
///    count requirement entirely (event lists have no fixed sample count);
/// 3. a one-channel RHS whose sample count matches broadcasts across all
///    LHS channels;
/// 4. differing channel counts pass only under explicit relaxation, with
///    channel correspondence resolved later from element-ID groupings.
pub fn check_size_compatibility(
    lhs: &ContainerShape,
    rhs: &ContainerShape,
    allow_different_channel_count: bool,
) -> SizeCompatibility {
    if rhs.is_single_value() {
        return SizeCompatibility::scalar_broadcast();
    }

    if lhs.channels() == rhs.channels() {
        if lhs.samples() == rhs.samples() {
            return SizeCompatibility::compatible();
        }
        if lhs.representation() == Representation::SparseEvents
            || rhs.representation() == Representation::SparseEvents
        {
            return SizeCompatibility::compatible();
        }
        return SizeCompatibility::incompatible(format!(
            "sample counts differ: left-hand workspace has {} samples per channel, \
             right-hand workspace has {}",
            lhs.samples(),
            rhs.samples()
        ));
    }

    if rhs.channels() == 1 && rhs.samples() == lhs.samples() {
        return SizeCompatibility::single_channel_broadcast();
    }

    if allow_different_channel_count {
        return SizeCompatibility::compatible();
    }

    SizeCompatibility::incompatible(format!(
        "channel counts differ: left-hand workspace has {} channels, \
         right-hand workspace has {}",
        lhs.channels(),
        rhs.channels()
    ))
}
