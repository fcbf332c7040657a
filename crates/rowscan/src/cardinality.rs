use rowscan_core::error::Error;

/// Tracks the number of rows seen by a scalar scan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) enum Cardinality {
    /// No rows have been seen.
    #[default]
    Empty,
    /// Exactly one row has been seen.
    HaveOne,
    /// More than one row has been seen.
    Violated,
}

impl Cardinality {
    /// Records a new row, failing once it is the second one.
    pub(crate) fn observe(&mut self) -> Result<(), Error> {
        match self {
            Self::Empty => {
                *self = Self::HaveOne;
                Ok(())
            }
            Self::HaveOne | Self::Violated => {
                *self = Self::Violated;
                Err(Self::violation())
            }
        }
    }

    /// Checks that exactly one row has been seen.
    pub(crate) fn finish(self) -> Result<(), Error> {
        match self {
            Self::Empty => Err(Error::not_found()),
            Self::HaveOne => Ok(()),
            Self::Violated => Err(Self::violation()),
        }
    }

    #[inline]
    fn violation() -> Error {
        Error::cardinality("expected 1 row, got > 1")
    }
}
