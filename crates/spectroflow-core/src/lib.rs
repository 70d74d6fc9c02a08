//! Core engine deciding whether, and how, elementwise binary operations
//! apply across two multichannel measurement workspaces.
//!
//! The operands may store their data densely, as sparse per-channel event
//! lists, or as a single scalar; they may group the underlying detection
//! elements into different channels; and in a multi-process run each
//! carries a storage mode describing its layout across the cooperating
//! processes. The engine checks size compatibility (including broadcasts),
//! resolves channel correspondence between differing groupings, validates
//! storage-mode combinations, and dispatches the per-channel kernels.
//!
//! Everything is synchronous, in-memory and per-invocation: no state is
//! shared between calls, and the process context is an explicit
//! [`parallel::Communicator`] argument rather than ambient global state.

#![allow(clippy::result_large_err)]

pub mod container;
pub mod error;
pub mod ops;
pub mod parallel;
pub mod shape;

pub use container::{DenseChannel, ElementId, Event, EventChannel, Workspace, WorkspaceData};
pub use error::{Result, SpectroError};
pub use ops::binary::{
    build_correspondence_table, check_size_compatibility, AddKernel, BinaryKernel,
    BinaryOperation, BinaryOperationOptions, CorrespondenceTable, DivideKernel, MismatchPolicy,
    MultiplyKernel, SizeCompatibility, SubtractKernel, NO_MATCH,
};
pub use parallel::{validate_storage_modes, Communicator, OperandMode, StorageMode};
pub use shape::{ContainerShape, Representation};
