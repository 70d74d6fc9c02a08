//! Elementwise binary operations between workspaces.
//!
//! The machinery here decides whether an operation between two workspaces is
//! legal, how their channels correspond when the operands group their
//! detection elements differently, and whether the combination is valid
//! under multi-process execution. The module is split by concern:
//!
//! - **size_check**: shape-level compatibility and broadcast detection
//! - **correspondence**: element-ID grouping correspondence tables
//! - **kernels**: the `BinaryKernel` trait and the arithmetic kernels
//! - **dispatch**: the `BinaryOperation` orchestrator
//! - **tests**: kernel-level test suite
//!
//! ## Usage
//!
//! ```rust
//! use spectroflow_core::ops::binary::{AddKernel, BinaryOperation};
//! use spectroflow_core::parallel::Communicator;
//! use spectroflow_core::Workspace;
//!
//! # fn main() -> spectroflow_core::Result<()> {
//! let lhs = Workspace::dense(4, 10, 2.0, 0.5);
//! let rhs = Workspace::dense(4, 10, 3.0, 0.5);
//! let op = BinaryOperation::new(AddKernel);
//! let sum = op.execute(&Communicator::single(), &lhs, &rhs)?;
//! assert_eq!(sum.dense_channel(0)?.y[0], 5.0);
//! # Ok(())
//! # }
//! ```

pub mod correspondence;
pub mod dispatch;
pub mod kernels;
pub mod size_check;

pub use correspondence::{build_correspondence_table, CorrespondenceTable, NO_MATCH};
pub use dispatch::{BinaryOperation, BinaryOperationOptions, MismatchPolicy};
pub use kernels::{AddKernel, BinaryKernel, DivideKernel, MultiplyKernel, SubtractKernel};
pub use size_check::{check_size_compatibility, SizeCompatibility};
