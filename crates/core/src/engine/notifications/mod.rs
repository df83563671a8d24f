mod domain_events;
mod notification_engine;
mod opaque_domain_event;

pub use domain_events::DomainEvent;
pub use domain_events::DomainEvents;
pub(crate) use notification_engine::NotificationEngine;
pub use notification_engine::Watchers;
pub use opaque_domain_event::OpaqueDomainEvent;
