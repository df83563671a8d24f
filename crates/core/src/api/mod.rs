pub mod state {
    //! Contains the [`State`], which owns the domains of all variables and the propagators
    //! posted over them.
    //!
    //! Domains are modified either as decisions, through the methods on [`State`], or by
    //! propagators. Every modification can be undone by restoring the [`State`] to an earlier
    //! checkpoint.
    pub use crate::basic_types::Cause;
    pub use crate::basic_types::ConstraintOperationError;
    pub use crate::basic_types::Contradiction;
    pub use crate::basic_types::EmptyDomain;
    pub use crate::basic_types::PropagationStatus;
    pub use crate::engine::Assignments;
    pub use crate::engine::State;
    pub use crate::propagation::PropagatorHandle;
    pub use crate::propagation::PropagatorId;
}

pub mod variables {
    //! Contains the variables which are used by the [`State`].
    //!
    //! A variable is a view onto a domain. It may forward domain information unaltered, or apply
    //! a transformation which can be performed without the need of a propagator:
    //! - A [`DomainId`] is the handle of a domain, created using
    //!   [`State::new_interval_variable`], [`State::new_enumerated_variable`] or
    //!   [`State::new_sparse_variable`].
    //! - An [`AbsView`] exposes the absolute value of another variable, and can be created
    //!   through [`TransformableVariable::absolute`].
    //!
    //! The values which are removed from a variable can be observed with a [`DeltaMonitor`].
    pub use crate::engine::notifications::Watchers;
    pub use crate::engine::variables::AbsView;
    pub use crate::engine::variables::DeltaMonitor;
    pub use crate::engine::variables::DomainId;
    pub use crate::engine::variables::IntegerVariable;
    pub use crate::engine::variables::TransformableVariable;
    #[cfg(doc)]
    use crate::state::State;
}

pub mod options {
    //! Contains the options which influence propagation.
    pub use crate::engine::EngineOptions;
    pub use crate::engine::SelfNotification;
    pub use crate::propagators::AmongBackPropagation;
    pub use crate::propagators::AmongOptions;
}

pub mod trailed {
    //! Contains values which are restored automatically when the [`State`] backtracks.
    //!
    //! The [`TrailedValues`] can also be used on their own; checkpoints are then managed
    //! explicitly through [`TrailedValues::new_checkpoint`] and [`TrailedValues::synchronise`].
    pub use crate::engine::TrailedInteger;
    pub use crate::engine::TrailedSet;
    pub use crate::engine::TrailedValues;
    #[cfg(doc)]
    use crate::state::State;
}
