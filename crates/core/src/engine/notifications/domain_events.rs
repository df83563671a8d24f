use std::fmt::Display;

use enumset::enum_set;
use enumset::EnumSet;
use enumset::EnumSetType;

/// A description of the kinds of events that can happen on a domain variable.
#[derive(Debug, EnumSetType, Hash)]
pub enum DomainEvent {
    /// The domain collapsed to a single value.
    Assign,
    /// The lower bound was tightened.
    LowerBound,
    /// The upper bound was tightened.
    UpperBound,
    /// A value strictly between the bounds was removed.
    Removal,
}

impl Display for DomainEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DomainEvent::Assign => write!(f, "[Event:Assign]"),
            DomainEvent::LowerBound => write!(f, "[Event:LB]"),
            DomainEvent::UpperBound => write!(f, "[Event:UB]"),
            DomainEvent::Removal => write!(f, "[Event:Remove]"),
        }
    }
}

/// A set of [`DomainEvent`]s a propagator subscribes to for one of its variables.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct DomainEvents {
    events: EnumSet<DomainEvent>,
}

impl DomainEvents {
    /// Both lower and upper bound tightening, but not other value removal.
    pub const BOUNDS: DomainEvents =
        DomainEvents::new(enum_set!(DomainEvent::LowerBound | DomainEvent::UpperBound));
    /// Bound tightening and assignment.
    pub const ASSIGN_AND_BOUNDS: DomainEvents = DomainEvents::new(enum_set!(
        DomainEvent::Assign | DomainEvent::LowerBound | DomainEvent::UpperBound
    ));
    /// Every change to the domain.
    pub const ANY_INT: DomainEvents = DomainEvents::new(enum_set!(
        DomainEvent::Assign
            | DomainEvent::LowerBound
            | DomainEvent::UpperBound
            | DomainEvent::Removal
    ));
    pub const LOWER_BOUND: DomainEvents = DomainEvents::new(enum_set!(DomainEvent::LowerBound));
    pub const UPPER_BOUND: DomainEvents = DomainEvents::new(enum_set!(DomainEvent::UpperBound));
    pub const ASSIGN: DomainEvents = DomainEvents::new(enum_set!(DomainEvent::Assign));

    pub const fn new(events: EnumSet<DomainEvent>) -> DomainEvents {
        DomainEvents { events }
    }

    pub fn events(&self) -> EnumSet<DomainEvent> {
        self.events
    }
}
