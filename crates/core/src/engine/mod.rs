mod assignments;
pub(crate) mod notifications;
mod options;
mod propagator_queue;
mod state;
pub(crate) mod test_solver;
mod trailed;
pub mod variables;

pub use assignments::Assignments;
pub use options::*;
pub(crate) use propagator_queue::PropagatorQueue;
pub use state::State;
pub use trailed::*;
