use thiserror::Error;

use super::Cause;
#[cfg(doc)]
use crate::propagation::PropagationContextMut;

/// The result of invoking a propagator.
pub type PropagationStatus = Result<(), Contradiction>;

/// The reason why propagation stopped. After a contradiction the only meaningful operation on the
/// state is restoring to an earlier checkpoint.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Contradiction {
    /// A domain operation would have left a domain without any values.
    #[error("a domain became empty due to {cause}")]
    EmptyDomain { cause: Cause },
    /// A propagator detected that the current domains cannot be extended to a solution.
    #[error("{cause} detected a conflict: {message}")]
    Conflict { cause: Cause, message: &'static str },
}

impl Contradiction {
    pub fn cause(&self) -> Cause {
        match self {
            Contradiction::EmptyDomain { cause } | Contradiction::Conflict { cause, .. } => *cause,
        }
    }
}

/// Returned by domain operations which would empty a domain. The operation is refused, so the
/// domain is left as it was.
///
/// At the propagation boundary ([`PropagationContextMut`]) it is turned into a [`Contradiction`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmptyDomain;
