use std::fmt::Display;

use crate::propagation::PropagatorId;

/// Identifies who requested a domain change.
///
/// A propagator never needs to inspect the cause of a change; the engine uses it to attribute
/// contradictions and, depending on the options, to avoid waking a propagator for its own changes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Cause {
    /// The change was made from outside of propagation, e.g. by the search.
    Decision,
    /// The change was made by the propagator with the given id.
    Propagator(PropagatorId),
}

impl Cause {
    pub(crate) fn propagator(self) -> Option<PropagatorId> {
        match self {
            Cause::Decision => None,
            Cause::Propagator(propagator_id) => Some(propagator_id),
        }
    }
}

impl Display for Cause {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Cause::Decision => write!(f, "decision"),
            Cause::Propagator(propagator_id) => write!(f, "{propagator_id}"),
        }
    }
}
