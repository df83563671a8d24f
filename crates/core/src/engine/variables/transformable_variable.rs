#[cfg(doc)]
use super::AbsView;
#[cfg(doc)]
use super::IntegerVariable;

/// Creates views on top of an [`IntegerVariable`].
pub trait TransformableVariable<View> {
    /// A view whose domain is `{ |v| : v in dom(self) }`; see [`AbsView`].
    fn absolute(&self) -> View;
}
