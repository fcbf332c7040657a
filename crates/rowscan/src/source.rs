use futures::{Stream, TryStreamExt};
use rowscan_core::error::{Error, ErrorKind};

/// A streaming cursor over the rows produced by a query.
///
/// A row source has a single consumer. The scanner calls [`stop()`](RowSource::stop)
/// exactly once when it is done with the source, whether the scan succeeded,
/// failed, or was cancelled by dropping it.
pub trait RowSource {
    /// A type for the database row.
    type Row;

    /// Fetches the next row, returning `None` once the source is exhausted.
    async fn next_row(&mut self) -> Result<Option<Self::Row>, Error>;

    /// Releases the underlying cursor.
    fn stop(&mut self);
}

/// A row source backed by a fallible stream of rows.
pub struct StreamSource<S> {
    /// Underlying stream. It is dropped on `stop()`.
    stream: Option<S>,
}

impl<S> StreamSource<S> {
    /// Creates a new instance.
    #[inline]
    pub fn new(stream: S) -> Self {
        Self {
            stream: Some(stream),
        }
    }

    /// Returns `true` if the source has been stopped.
    #[inline]
    pub fn is_stopped(&self) -> bool {
        self.stream.is_none()
    }
}

impl<S, R, E> RowSource for StreamSource<S>
where
    S: Stream<Item = Result<R, E>> + Unpin,
    E: Into<Error>,
{
    type Row = R;

    async fn next_row(&mut self) -> Result<Option<Self::Row>, Error> {
        match self.stream.as_mut() {
            Some(stream) => stream.try_next().await.map_err(Into::into),
            None => Ok(None),
        }
    }

    #[inline]
    fn stop(&mut self) {
        self.stream = None;
    }
}

/// Owns a row source for the duration of a scan and stops it on drop.
pub(crate) struct SourceGuard<S: RowSource> {
    source: S,
    num_rows: usize,
}

impl<S: RowSource> SourceGuard<S> {
    /// Creates a new instance.
    #[inline]
    pub(crate) fn new(source: S) -> Self {
        Self {
            source,
            num_rows: 0,
        }
    }

    /// Fetches the next row, tagging failures as source errors
    /// unless the source failed to decode the row.
    pub(crate) async fn next_row(&mut self) -> Result<Option<S::Row>, Error> {
        match self.source.next_row().await {
            Ok(Some(row)) => {
                self.num_rows += 1;
                Ok(Some(row))
            }
            Ok(None) => Ok(None),
            Err(err) => {
                tracing::warn!(num_rows = self.num_rows, "fail to fetch the next row: {err}");
                let kind = match err.kind() {
                    ErrorKind::Decode => ErrorKind::Decode,
                    _ => ErrorKind::Source,
                };
                Err(err.wrap_as(kind, "fail to fetch the next row"))
            }
        }
    }
}

impl<S: RowSource> Drop for SourceGuard<S> {
    fn drop(&mut self) {
        self.source.stop();
        tracing::debug!(num_rows = self.num_rows, "row source released");
    }
}
