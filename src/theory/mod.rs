/*!
The theory side: linear real arithmetic over conjunctions of literals.

A backend is a capability set mirroring an incremental assertion stack:
push and pop frames, assert a constraint, check the conjunction, and read
either an unsat core or a model of the most recent check. The driver opens
one frame per refinement iteration and closes it on every exit path.

[linear] linearizes formula atoms into constraints; [lra] decides
conjunctions of them.
*/

pub mod linear;
pub mod lra;

use num_rational::BigRational;

use crate::{formula::SymbolId, types::err::BackendError};

use linear::Constraint;

/// A handle to an asserted constraint, dense from zero in assertion order.
pub type AssertionId = usize;

/// A rational witness: a value for each symbol of the checked conjunction,
/// in symbol order.
pub type TheoryModel = Vec<(SymbolId, BigRational)>;

/// The capability set of a theory backend.
pub trait TheoryBackend {
    /// Opens an assertion frame.
    fn push(&mut self);

    /// Closes the most recent frame, dropping its assertions.
    fn pop(&mut self);

    /// Asserts a constraint within the current frame.
    fn assert(&mut self, constraint: Constraint) -> AssertionId;

    /// Decides the conjunction of all asserted constraints.
    fn check(&mut self) -> Result<bool, BackendError>;

    /// The unsat core of the most recent failed check: a subset of the
    /// asserted constraints, by handle, itself inconsistent.
    fn unsat_core(&self) -> &[AssertionId];

    /// The model of the most recent successful check.
    fn model(&self) -> Option<&TheoryModel>;
}
