//! Multi-process execution support.
//!
//! Workspaces taking part in a multi-process run carry a [`StorageMode`]
//! describing how their channels are partitioned across the cooperating
//! processes. The engine itself never communicates; it only validates that
//! the operand modes form a combination whose result is well defined on
//! every rank. The process context arrives as an explicit [`Communicator`]
//! argument, never as ambient global state.

use crate::error::{Result, SpectroError};

#[cfg(feature = "serialize")]
use serde::{Deserialize, Serialize};

/// How a workspace's channels are laid out across cooperating processes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub enum StorageMode {
    /// Each process holds a disjoint shard of the channels.
    Distributed,
    /// Every process holds a full identical replica.
    Cloned,
    /// Only the master process holds real data.
    MasterOnly,
}

impl std::fmt::Display for StorageMode {
    /// Renders the bare variant name. The storage-mode mismatch message
    /// embeds this text, so the rendering is part of the error contract.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            StorageMode::Distributed => "Distributed",
            StorageMode::Cloned => "Cloned",
            StorageMode::MasterOnly => "MasterOnly",
        };
        write!(f, "{name}")
    }
}

/// Opaque process-count/rank context for one cooperating process group.
///
/// The engine treats this as read-only input: it never blocks on it, never
/// owns it beyond one invocation, and only ever inspects [`size`] and
/// [`rank`].
///
/// [`size`]: Communicator::size
/// [`rank`]: Communicator::rank
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Communicator {
    rank: usize,
    size: usize,
}

impl Communicator {
    pub fn new(rank: usize, size: usize) -> Self {
        debug_assert!(size >= 1, "a process group has at least one process");
        debug_assert!(rank < size.max(1), "rank must be within the group");
        Self { rank, size }
    }

    /// A single-process context, the default for non-MPI runs.
    pub fn single() -> Self {
        Self { rank: 0, size: 1 }
    }

    pub fn rank(&self) -> usize {
        self.rank
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn is_parallel(&self) -> bool {
        self.size > 1
    }
}

impl Default for Communicator {
    fn default() -> Self {
        Self::single()
    }
}

/// The storage-mode-relevant view of one operand: its mode plus whether it
/// is a single-value (scalar-like) workspace, which is broadcastable and
/// therefore mode-agnostic when cloned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperandMode {
    pub mode: StorageMode,
    pub single_value: bool,
}

impl OperandMode {
    pub fn new(mode: StorageMode, single_value: bool) -> Self {
        Self { mode, single_value }
    }
}

/// Build the fixed-structure mismatch message: operand label and mode, one
/// per line in LHS-then-RHS order, trailing newline before the terminal
/// period. Callers pattern-match this text.
fn mode_mismatch_error(lhs: StorageMode, rhs: StorageMode) -> SpectroError {
    let mut message = String::from(
        "Algorithm does not support execution with input workspaces of the following storage types: \n",
    );
    for (name, mode) in [("LHSWorkspace", lhs), ("RHSWorkspace", rhs)] {
        message.push_str(&format!("{name} {mode}\n"));
    }
    message.push('.');
    SpectroError::StorageModeIncompatible { message }
}

/// Decide the output storage mode for a binary operation, or fail if the
/// operand modes cannot be reconciled.
///
/// Legal combinations under multi-process execution:
/// - equal modes, which the output inherits;
/// - a single-value operand in `Cloned` mode against anything, in which case
///   the output takes the other operand's mode.
///
/// Channel-count relaxation (`allow_different_channel_count`) never relaxes
/// mode rules; on the contrary, grouped correspondence cannot be resolved
/// across shards, so the flag makes any multi-process run illegal.
///
/// With a single process every combination is compatible and the output
/// takes the LHS mode: there is no cross-process divergence to reconcile.
pub fn validate_storage_modes(
    comm: &Communicator,
    lhs: OperandMode,
    rhs: OperandMode,
    allow_different_channel_count: bool,
) -> Result<StorageMode> {
    if !comm.is_parallel() {
        return Ok(lhs.mode);
    }
    if allow_different_channel_count {
        return Err(mode_mismatch_error(lhs.mode, rhs.mode));
    }
    if lhs.mode == rhs.mode {
        return Ok(lhs.mode);
    }
    if rhs.single_value && rhs.mode == StorageMode::Cloned {
        return Ok(lhs.mode);
    }
    if lhs.single_value && lhs.mode == StorageMode::Cloned {
        return Ok(rhs.mode);
    }
    Err(mode_mismatch_error(lhs.mode, rhs.mode))
}
