#![cfg(test)]
//! This module exposes helpers that aid testing of propagators. The [`TestSolver`] allows
//! setting up specific scenarios under which to test the various operations of a propagator.
use crate::basic_types::Contradiction;
use crate::basic_types::PropagationStatus;
use crate::engine::variables::DomainId;
use crate::engine::variables::IntegerVariable;
use crate::engine::State;
use crate::propagation::PropagatorConstructor;
use crate::propagation::PropagatorHandle;

/// A [`State`] with shorthands for setting up and checking test scenarios.
#[derive(Debug, Default)]
pub(crate) struct TestSolver {
    pub(crate) state: State,
}

impl TestSolver {
    pub(crate) fn new_variable(&mut self, lb: i32, ub: i32) -> DomainId {
        self.state.new_interval_variable(lb, ub)
    }

    pub(crate) fn new_sparse_variable(&mut self, values: Vec<i32>) -> DomainId {
        self.state.new_sparse_variable(values)
    }

    /// Add the propagator and propagate to a fixed point.
    pub(crate) fn new_propagator<Constructor>(
        &mut self,
        constructor: Constructor,
    ) -> Result<PropagatorHandle<Constructor::PropagatorImpl>, Contradiction>
    where
        Constructor: PropagatorConstructor,
        Constructor::PropagatorImpl: 'static,
    {
        let handle = self.state.add_propagator(constructor);
        self.state.propagate_to_fixed_point()?;
        Ok(handle)
    }

    pub(crate) fn propagate(&mut self) -> PropagationStatus {
        self.state.propagate_to_fixed_point()
    }

    pub(crate) fn lower_bound(&self, var: impl IntegerVariable) -> i32 {
        self.state.lower_bound(var)
    }

    pub(crate) fn upper_bound(&self, var: impl IntegerVariable) -> i32 {
        self.state.upper_bound(var)
    }

    pub(crate) fn values(&self, var: impl IntegerVariable) -> Vec<i32> {
        self.state.values(var)
    }

    pub(crate) fn assert_bounds(&self, var: impl IntegerVariable, lb: i32, ub: i32) {
        let actual_lb = self.lower_bound(var.clone());
        let actual_ub = self.upper_bound(var.clone());

        assert_eq!(
            (lb, ub),
            (actual_lb, actual_ub),
            "The expected bounds [{lb}..{ub}] did not match the actual bounds [{actual_lb}..{actual_ub}] of {var}"
        );
    }

    pub(crate) fn set_lower_bound(&mut self, var: impl IntegerVariable, bound: i32) {
        let _ = self
            .state
            .set_lower_bound(var, bound)
            .expect("the lower bound does not empty the domain");
    }

    pub(crate) fn set_upper_bound(&mut self, var: impl IntegerVariable, bound: i32) {
        let _ = self
            .state
            .set_upper_bound(var, bound)
            .expect("the upper bound does not empty the domain");
    }

    pub(crate) fn remove(&mut self, var: impl IntegerVariable, value: i32) {
        let _ = self
            .state
            .remove(var, value)
            .expect("the removal does not empty the domain");
    }

    pub(crate) fn instantiate(&mut self, var: impl IntegerVariable, value: i32) {
        let _ = self
            .state
            .instantiate(var, value)
            .expect("the value is in the domain");
    }

    pub(crate) fn new_checkpoint(&mut self) {
        self.state.new_checkpoint();
    }

    pub(crate) fn restore_to(&mut self, checkpoint: usize) {
        self.state.restore_to(checkpoint);
    }
}
