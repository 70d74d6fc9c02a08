//! Workspace containers.
//!
//! A [`Workspace`] holds many channels of measured data. Each channel
//! aggregates one or more underlying detection elements, identified by
//! [`ElementId`]s; the per-channel element sets are what the grouping
//! correspondence machinery in [`crate::ops::binary`] matches against.
//! Channel data lives in a closed [`WorkspaceData`] tagged variant (dense
//! samples, sparse event lists, or a single scalar), so every consumer
//! matches exhaustively instead of downcasting at runtime.

pub mod core;
pub mod creation;
pub mod events;

pub use core::{DenseChannel, ElementId, Workspace, WorkspaceData};
pub use events::{Event, EventChannel};
