#[cfg(doc)]
use super::AmongPropagator;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct AmongOptions {
    /// Whether the [`AmongPropagator`] filters the domains of the variables once the counter is
    /// fixed to its smallest or largest achievable value. When disabled, only the counter is
    /// filtered.
    pub back_propagation: AmongBackPropagation,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum AmongBackPropagation {
    #[default]
    Enabled,
    Disabled,
}
