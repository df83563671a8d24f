mod trailed_change;
mod trailed_integer;
mod trailed_set;
mod trailed_values;

pub(crate) use trailed_change::TrailedChange;
pub use trailed_integer::TrailedInteger;
pub use trailed_set::TrailedSet;
pub use trailed_values::TrailedValues;
