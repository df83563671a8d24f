#[cfg(doc)]
use crate::engine::State;
#[cfg(doc)]
use crate::propagation::Propagator;

/// Options which determine how the [`State`] schedules propagators.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EngineOptions {
    /// Whether a [`Propagator`] is notified of the domain events it caused itself.
    pub self_notification: SelfNotification,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum SelfNotification {
    /// Every watcher of a domain is notified, including the propagator which changed it.
    #[default]
    Deliver,
    /// The propagator which changed a domain is not notified of that change.
    Skip,
}
