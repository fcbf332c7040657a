use super::Error;
use std::iter::FusedIterator;

/// Walks a wrapped scan error from the outermost context down to the root cause.
///
/// The first item is the error [`chain()`](Error::chain) was called on,
/// so kind checks see every context added by [`wrap()`](Error::wrap).
#[derive(Debug, Clone)]
pub struct Chain<'a> {
    current: Option<&'a Error>,
}

impl<'a> Chain<'a> {
    #[inline]
    pub(super) fn new(error: &'a Error) -> Self {
        Self {
            current: Some(error),
        }
    }
}

impl<'a> Iterator for Chain<'a> {
    type Item = &'a Error;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        let error = self.current.take()?;
        self.current = error.source();
        Some(error)
    }
}

impl FusedIterator for Chain<'_> {}
