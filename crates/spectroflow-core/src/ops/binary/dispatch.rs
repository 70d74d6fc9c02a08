//! Binary operation dispatch.
//!
//! One [`BinaryOperation`] invocation runs the full pipeline: size
//! compatibility, grouping correspondence when the operands group their
//! elements differently, storage-mode validation for multi-process runs,
//! output representation selection, and finally the per-channel kernel
//! application. Every stage is re-evaluated on every invocation; nothing is
//! cached across calls, so consecutive invocations mixing representations
//! can safely reuse one output workspace.

use log::debug;
use num_traits::Float;

use crate::container::{DenseChannel, EventChannel, Workspace, WorkspaceData};
use crate::error::{Result, SpectroError};
use crate::parallel::{validate_storage_modes, Communicator, OperandMode};
use crate::shape::Representation;

use super::correspondence::{build_correspondence_table, CorrespondenceTable};
use super::kernels::BinaryKernel;
use super::size_check::{check_size_compatibility, SizeCompatibility};

/// What to do with a left-hand channel whose correspondence entry is
/// unmatched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MismatchPolicy {
    /// Zero the output channel (dense) or clear its events.
    #[default]
    Zero,
    /// Keep the left-hand channel untouched.
    Skip,
}

/// Per-dispatcher configuration.
#[derive(Debug, Clone, Default)]
pub struct BinaryOperationOptions {
    /// Relax the channel-count equality requirement; channel correspondence
    /// is then resolved from the element-ID groupings.
    pub allow_different_channel_count: bool,
    pub mismatch_policy: MismatchPolicy,
}

/// Orchestrates one elementwise binary operation between two workspaces.
///
/// The dispatcher holds no per-invocation state: [`execute`] and friends may
/// be called any number of times, with any mix of representations.
///
/// [`execute`]: BinaryOperation::execute
pub struct BinaryOperation<K> {
    kernel: K,
    options: BinaryOperationOptions,
}

impl<K> BinaryOperation<K> {
    pub fn new(kernel: K) -> Self {
        Self {
            kernel,
            options: BinaryOperationOptions::default(),
        }
    }

    pub fn with_options(kernel: K, options: BinaryOperationOptions) -> Self {
        Self { kernel, options }
    }

    pub fn allow_different_channel_count(mut self, allow: bool) -> Self {
        self.options.allow_different_channel_count = allow;
        self
    }

    pub fn mismatch_policy(mut self, policy: MismatchPolicy) -> Self {
        self.options.mismatch_policy = policy;
        self
    }

    pub fn kernel(&self) -> &K {
        &self.kernel
    }

    pub fn options(&self) -> &BinaryOperationOptions {
        &self.options
    }
}

impl<K> BinaryOperation<K> {
    /// Run the operation and return a fresh output workspace.
    ///
    /// The output takes the left-hand operand's element-ID sets and the
    /// storage mode decided by mode validation. On failure nothing is
    /// produced; the inputs are never mutated.
    pub fn execute<T>(
        &self,
        comm: &Communicator,
        lhs: &Workspace<T>,
        rhs: &Workspace<T>,
    ) -> Result<Workspace<T>>
    where
        T: Float,
        K: BinaryKernel<T>,
    {
        let size = check_size_compatibility(
            &lhs.shape(),
            &rhs.shape(),
            self.options.allow_different_channel_count,
        );
        if !size.compatible {
            return Err(SpectroError::size_incompatible(
                self.kernel.name(),
                size.reason.clone(),
            ));
        }

        // Grouping resolution, only when channel counts genuinely differ and
        // no broadcast short-circuit applies.
        let table = if !size.scalar_broadcast
            && !size.single_channel_broadcast
            && lhs.channel_count() != rhs.channel_count()
        {
            Some(build_correspondence_table(
                lhs.element_id_sets(),
                rhs.element_id_sets(),
            )?)
        } else {
            None
        };
        if let Some(table) = &table {
            debug!(
                "{}: correspondence table matched {} of {} channels",
                self.kernel.name(),
                table.matched_count(),
                table.len()
            );
        }

        let output_mode = validate_storage_modes(
            comm,
            OperandMode::new(lhs.storage_mode(), lhs.is_single_value()),
            OperandMode::new(rhs.storage_mode(), rhs.is_single_value()),
            self.options.allow_different_channel_count,
        )?;

        // Output representation, re-evaluated on every invocation.
        let keep_events = lhs.representation() == Representation::SparseEvents
            && self.kernel.keeps_events(rhs.representation());
        debug!(
            "{}: {} ({}) against {} ({}), output {}",
            self.kernel.name(),
            lhs.shape(),
            lhs.storage_mode(),
            rhs.shape(),
            rhs.storage_mode(),
            if keep_events { "event" } else { "dense" },
        );

        let data = if keep_events {
            self.apply_events(lhs, rhs, &size, table.as_ref())?
        } else {
            self.apply_dense(lhs, rhs, &size, table.as_ref())?
        };

        Workspace::new(data, lhs.element_id_sets().to_vec(), output_mode)
    }

    /// Run the operation into an existing output workspace.
    ///
    /// The result is computed in full before `out` is touched, so a failed
    /// invocation leaves `out` exactly as it was, and a successful one
    /// replaces its representation wholesale.
    pub fn execute_into<T>(
        &self,
        comm: &Communicator,
        lhs: &Workspace<T>,
        rhs: &Workspace<T>,
        out: &mut Workspace<T>,
    ) -> Result<()>
    where
        T: Float,
        K: BinaryKernel<T>,
    {
        *out = self.execute(comm, lhs, rhs)?;
        Ok(())
    }

    /// Run the operation with the output aliased to the left-hand operand
    /// (in-place accumulation).
    pub fn execute_in_place<T>(
        &self,
        comm: &Communicator,
        lhs: &mut Workspace<T>,
        rhs: &Workspace<T>,
    ) -> Result<()>
    where
        T: Float,
        K: BinaryKernel<T>,
    {
        *lhs = self.execute(comm, lhs, rhs)?;
        Ok(())
    }

    /// Dense (or scalar) output path.
    fn apply_dense<T>(
        &self,
        lhs: &Workspace<T>,
        rhs: &Workspace<T>,
        size: &SizeCompatibility,
        table: Option<&CorrespondenceTable>,
    ) -> Result<WorkspaceData<T>>
    where
        T: Float,
        K: BinaryKernel<T>,
    {
        // Scalar against a single value stays scalar.
        if let WorkspaceData::Scalar { value, error } = lhs.data() {
            if let Some((rhs_value, rhs_error)) = rhs.scalar_value() {
                return Ok(WorkspaceData::Scalar {
                    value: self.kernel.apply(*value, rhs_value),
                    error: self
                        .kernel
                        .propagate_error(*value, *error, rhs_value, rhs_error),
                });
            }
        }

        let rhs_scalar = if size.scalar_broadcast {
            rhs.scalar_value()
        } else {
            None
        };

        let mut channels = Vec::with_capacity(lhs.channel_count());
        for i in 0..lhs.channel_count() {
            let lhs_channel = lhs.dense_channel(i)?;
            let mut out = DenseChannel::zeros(lhs_channel.len());
            if let Some((value, error)) = rhs_scalar {
                self.kernel
                    .apply_dense_scalar(&lhs_channel, value, error, &mut out)?;
            } else if size.single_channel_broadcast {
                self.apply_dense_pair(&lhs_channel, rhs, 0, &mut out)?;
            } else if let Some(table) = table {
                match table.rhs_channel(i) {
                    Some(rhs_index) => {
                        self.apply_dense_pair(&lhs_channel, rhs, rhs_index, &mut out)?;
                    }
                    None => match self.options.mismatch_policy {
                        MismatchPolicy::Zero => {}
                        MismatchPolicy::Skip => out = lhs_channel,
                    },
                }
            } else {
                self.apply_dense_pair(&lhs_channel, rhs, i, &mut out)?;
            }
            channels.push(out);
        }
        Ok(WorkspaceData::Dense(channels))
    }

    /// Apply the kernel between one dense left-hand channel and the
    /// right-hand channel `rhs_index`, reconciling sample grids: equal
    /// lengths combine sample for sample, a one-sample channel broadcasts,
    /// and a mismatched event-list channel collapses to its integrated
    /// value. A mismatched dense grid cannot be reconciled.
    fn apply_dense_pair<T>(
        &self,
        lhs_channel: &DenseChannel<T>,
        rhs: &Workspace<T>,
        rhs_index: usize,
        out: &mut DenseChannel<T>,
    ) -> Result<()>
    where
        T: Float,
        K: BinaryKernel<T>,
    {
        let rhs_channel = rhs.dense_channel(rhs_index)?;
        if rhs_channel.len() == lhs_channel.len() {
            self.kernel.apply_dense(lhs_channel, &rhs_channel, out)
        } else if rhs_channel.len() == 1 {
            self.kernel
                .apply_dense_scalar(lhs_channel, rhs_channel.y[0], rhs_channel.e[0], out)
        } else if rhs.representation() == Representation::SparseEvents {
            let (value, error) = rhs_channel.integrated();
            self.kernel.apply_dense_scalar(lhs_channel, value, error, out)
        } else {
            Err(SpectroError::size_incompatible(
                self.kernel.name(),
                format!(
                    "channel sample grids cannot be reconciled: {} samples against {}",
                    lhs_channel.len(),
                    rhs_channel.len()
                ),
            ))
        }
    }

    /// Event-preserving output path; only entered when the kernel declared
    /// event support for the right-hand representation.
    fn apply_events<T>(
        &self,
        lhs: &Workspace<T>,
        rhs: &Workspace<T>,
        size: &SizeCompatibility,
        table: Option<&CorrespondenceTable>,
    ) -> Result<WorkspaceData<T>>
    where
        T: Float,
        K: BinaryKernel<T>,
    {
        let lhs_channels = match lhs.data() {
            WorkspaceData::Events(channels) => channels,
            _ => {
                return Err(SpectroError::invalid_argument(
                    self.kernel.name(),
                    "event output requires an event left-hand operand",
                ))
            }
        };

        // A single-value event RHS broadcasts event-by-event through the
        // pair path; only non-event single values take the scalar path.
        let rhs_scalar = if size.scalar_broadcast
            && rhs.representation() != Representation::SparseEvents
        {
            rhs.scalar_value()
        } else {
            None
        };

        let mut channels = lhs_channels.clone();
        for (i, channel) in channels.iter_mut().enumerate() {
            if let Some((value, error)) = rhs_scalar {
                self.kernel.apply_events_scalar(channel, value, error)?;
                continue;
            }
            let rhs_index = if size.scalar_broadcast || size.single_channel_broadcast {
                Some(0)
            } else if let Some(table) = table {
                table.rhs_channel(i)
            } else {
                Some(i)
            };
            match rhs_index {
                Some(rhs_index) => {
                    self.apply_events_pair(channel, rhs, rhs_index)?;
                }
                None => match self.options.mismatch_policy {
                    MismatchPolicy::Zero => channel.events.clear(),
                    MismatchPolicy::Skip => {}
                },
            }
        }
        Ok(WorkspaceData::Events(channels))
    }

    fn apply_events_pair<T>(
        &self,
        lhs_channel: &mut EventChannel<T>,
        rhs: &Workspace<T>,
        rhs_index: usize,
    ) -> Result<()>
    where
        T: Float,
        K: BinaryKernel<T>,
    {
        match rhs.data() {
            WorkspaceData::Events(rhs_channels) => {
                self.kernel.apply_events(lhs_channel, &rhs_channels[rhs_index])
            }
            WorkspaceData::Dense(_) | WorkspaceData::Scalar { .. } => {
                Err(SpectroError::unsupported_operation(
                    self.kernel.name(),
                    "event output requires an event or single-value right-hand operand",
                ))
            }
        }
    }
}
