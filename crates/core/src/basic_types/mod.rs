mod cause;
mod constraint_operation_error;
mod propagation_status;
mod trail;

pub use cause::Cause;
pub use constraint_operation_error::ConstraintOperationError;
pub use propagation_status::*;
pub(crate) use trail::Trail;
