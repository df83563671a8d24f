use thiserror::Error;

#[cfg(doc)]
use crate::state::State;

/// Errors related to adding constraints to the [`State`].
#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum ConstraintOperationError {
    /// Constraints can only be added permanently when no checkpoint is active.
    #[error("Adding the constraint failed because the state is not at the root")]
    NotAtRoot,
    /// A constraint was added while the [`State`] was already infeasible at the root.
    #[error("Adding the constraint failed because the state is in an infeasible state")]
    InfeasibleState,
    /// Propagating the new constraint at the root led to a contradiction.
    #[error("Adding the constraint failed because it is infeasible at the root")]
    InfeasiblePropagator,
}
