use enumset::EnumSet;

use super::DomainEvent;
#[cfg(doc)]
use crate::engine::variables::IntegerVariable;

/// The [`DomainEvent`]s that happened on the domain underlying a variable.
///
/// Obtain the events from the perspective of a variable through
/// [`IntegerVariable::unpack_event`].
#[derive(Clone, Debug, Copy, PartialEq, Eq)]
pub struct OpaqueDomainEvent(EnumSet<DomainEvent>);

impl From<EnumSet<DomainEvent>> for OpaqueDomainEvent {
    fn from(events: EnumSet<DomainEvent>) -> Self {
        OpaqueDomainEvent(events)
    }
}

impl From<DomainEvent> for OpaqueDomainEvent {
    fn from(event: DomainEvent) -> Self {
        OpaqueDomainEvent(EnumSet::only(event))
    }
}

impl OpaqueDomainEvent {
    pub(crate) fn unwrap(self) -> EnumSet<DomainEvent> {
        self.0
    }
}
