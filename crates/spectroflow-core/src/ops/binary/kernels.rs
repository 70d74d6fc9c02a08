//! Elementwise kernels for binary workspace operations.
//!
//! A kernel supplies the sample-for-sample arithmetic and its uncertainty
//! propagation; the dispatcher decides where and how often to apply it. The
//! default dense implementations cover any kernel; the event-list methods
//! are only called when [`BinaryKernel::keeps_events`] declared support for
//! the operand combination at hand.

use num_traits::Float;

use crate::container::{DenseChannel, EventChannel};
use crate::error::{Result, SpectroError};
use crate::shape::Representation;

/// One elementwise binary operation.
pub trait BinaryKernel<T: Float> {
    fn name(&self) -> &str;

    /// Combine two values.
    fn apply(&self, a: T, b: T) -> T;

    /// Propagate the uncertainties of `a` and `b` through [`apply`].
    ///
    /// [`apply`]: BinaryKernel::apply
    fn propagate_error(&self, a: T, ea: T, b: T, eb: T) -> T;

    /// Whether the output may stay event-typed when the left-hand operand is
    /// an event workspace and the right-hand operand has the given
    /// representation. The dispatcher re-evaluates this on every invocation.
    fn keeps_events(&self, _rhs: Representation) -> bool {
        false
    }

    /// Sample-for-sample application onto a preallocated output channel.
    fn apply_dense(
        &self,
        lhs: &DenseChannel<T>,
        rhs: &DenseChannel<T>,
        out: &mut DenseChannel<T>,
    ) -> Result<()> {
        if lhs.len() != rhs.len() || lhs.len() != out.len() {
            return Err(SpectroError::invalid_argument(
                self.name(),
                "channel length mismatch in dense application",
            ));
        }
        for i in 0..lhs.len() {
            out.y[i] = self.apply(lhs.y[i], rhs.y[i]);
            out.e[i] = self.propagate_error(lhs.y[i], lhs.e[i], rhs.y[i], rhs.e[i]);
        }
        Ok(())
    }

    /// Application of a single broadcast value to every sample.
    fn apply_dense_scalar(
        &self,
        lhs: &DenseChannel<T>,
        value: T,
        error: T,
        out: &mut DenseChannel<T>,
    ) -> Result<()> {
        if lhs.len() != out.len() {
            return Err(SpectroError::invalid_argument(
                self.name(),
                "channel length mismatch in scalar application",
            ));
        }
        for i in 0..lhs.len() {
            out.y[i] = self.apply(lhs.y[i], value);
            out.e[i] = self.propagate_error(lhs.y[i], lhs.e[i], value, error);
        }
        Ok(())
    }

    /// In-place application of an event-list right-hand operand.
    fn apply_events(&self, _lhs: &mut EventChannel<T>, _rhs: &EventChannel<T>) -> Result<()> {
        Err(SpectroError::unsupported_operation(
            self.name(),
            "event-by-event application is not available for this kernel",
        ))
    }

    /// In-place application of a broadcast value to an event list.
    fn apply_events_scalar(&self, _lhs: &mut EventChannel<T>, _value: T, _error: T) -> Result<()> {
        Err(SpectroError::unsupported_operation(
            self.name(),
            "scalar event application is not available for this kernel",
        ))
    }
}

/// Addition with quadrature uncertainty propagation. Keeps events against an
/// event right-hand operand by list concatenation.
#[derive(Debug, Clone, Copy, Default)]
pub struct AddKernel;

impl<T: Float> BinaryKernel<T> for AddKernel {
    #[inline]
    fn name(&self) -> &str {
        "Add"
    }

    #[inline]
    fn apply(&self, a: T, b: T) -> T {
        a + b
    }

    #[inline]
    fn propagate_error(&self, _a: T, ea: T, _b: T, eb: T) -> T {
        (ea * ea + eb * eb).sqrt()
    }

    fn keeps_events(&self, rhs: Representation) -> bool {
        rhs == Representation::SparseEvents
    }

    fn apply_events(&self, lhs: &mut EventChannel<T>, rhs: &EventChannel<T>) -> Result<()> {
        lhs.events.extend(rhs.events.iter().copied());
        Ok(())
    }
}

/// Subtraction with quadrature uncertainty propagation. Keeps events against
/// an event right-hand operand by concatenating with negated weights.
#[derive(Debug, Clone, Copy, Default)]
pub struct SubtractKernel;

impl<T: Float> BinaryKernel<T> for SubtractKernel {
    #[inline]
    fn name(&self) -> &str {
        "Subtract"
    }

    #[inline]
    fn apply(&self, a: T, b: T) -> T {
        a - b
    }

    #[inline]
    fn propagate_error(&self, _a: T, ea: T, _b: T, eb: T) -> T {
        (ea * ea + eb * eb).sqrt()
    }

    fn keeps_events(&self, rhs: Representation) -> bool {
        rhs == Representation::SparseEvents
    }

    fn apply_events(&self, lhs: &mut EventChannel<T>, rhs: &EventChannel<T>) -> Result<()> {
        lhs.events.extend(rhs.events.iter().map(|event| {
            let mut negated = *event;
            negated.weight = -negated.weight;
            negated
        }));
        Ok(())
    }
}

/// Multiplication. Keeps events against a single-value right-hand operand by
/// scaling the event weights.
#[derive(Debug, Clone, Copy, Default)]
pub struct MultiplyKernel;

impl<T: Float> BinaryKernel<T> for MultiplyKernel {
    #[inline]
    fn name(&self) -> &str {
        "Multiply"
    }

    #[inline]
    fn apply(&self, a: T, b: T) -> T {
        a * b
    }

    #[inline]
    fn propagate_error(&self, a: T, ea: T, b: T, eb: T) -> T {
        ((ea * b) * (ea * b) + (eb * a) * (eb * a)).sqrt()
    }

    fn keeps_events(&self, rhs: Representation) -> bool {
        rhs == Representation::Scalar
    }

    fn apply_events_scalar(&self, lhs: &mut EventChannel<T>, value: T, error: T) -> Result<()> {
        scale_events(lhs, value, error);
        Ok(())
    }
}

/// Division. Keeps events against a single-value right-hand operand by
/// scaling the event weights with the reciprocal.
#[derive(Debug, Clone, Copy, Default)]
pub struct DivideKernel;

impl<T: Float> BinaryKernel<T> for DivideKernel {
    #[inline]
    fn name(&self) -> &str {
        "Divide"
    }

    #[inline]
    fn apply(&self, a: T, b: T) -> T {
        a / b
    }

    #[inline]
    fn propagate_error(&self, a: T, ea: T, b: T, eb: T) -> T {
        let db = ea / b;
        let da = a * eb / (b * b);
        (db * db + da * da).sqrt()
    }

    fn keeps_events(&self, rhs: Representation) -> bool {
        rhs == Representation::Scalar
    }

    fn apply_events_scalar(&self, lhs: &mut EventChannel<T>, value: T, error: T) -> Result<()> {
        let inverse = T::one() / value;
        let inverse_error = error / (value * value);
        scale_events(lhs, inverse, inverse_error);
        Ok(())
    }
}

/// Scale every event weight by `value` (with uncertainty `error`),
/// propagating into the squared weight errors before touching the weights.
fn scale_events<T: Float>(channel: &mut EventChannel<T>, value: T, error: T) {
    for event in &mut channel.events {
        event.error_squared = event.error_squared * value * value
            + event.weight * event.weight * error * error;
        event.weight = event.weight * value;
    }
}
