//! Integer variables and views over them.
mod abs_view;
mod delta_monitor;
mod domain_id;
mod integer_variable;
mod transformable_variable;

pub use abs_view::AbsView;
pub use delta_monitor::DeltaMonitor;
pub use domain_id::DomainId;
pub use integer_variable::IntegerVariable;
pub use transformable_variable::TransformableVariable;
