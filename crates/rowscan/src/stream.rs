use super::{
    DecodeRow, Querier, RowSource, Scanner, Statement, decode::decode_row, source::SourceGuard,
};
use futures::{Stream, StreamExt, stream};
use rowscan_core::error::Error;

impl Scanner {
    /// Returns a lazy stream that decodes the rows of the source one at a time.
    ///
    /// The stream ends when the source is exhausted or after the first error.
    /// Dropping the stream early stops the source.
    pub fn scan_stream<T, S>(&self, source: S) -> impl Stream<Item = Result<T, Error>> + use<T, S>
    where
        T: DecodeRow<S::Row>,
        S: RowSource,
    {
        let mode = self.options().decode_mode();
        stream::unfold(Some(SourceGuard::new(source)), move |state| async move {
            let mut source = state?;
            let item = match source.next_row().await {
                Ok(Some(row)) => decode_row::<T, _>(&row, mode),
                Ok(None) => return None,
                Err(err) => Err(err),
            };
            match item {
                Ok(value) => Some((Ok(value), Some(source))),
                Err(err) => Some((Err(err), None)),
            }
        })
        .fuse()
    }

    /// Runs the statement and returns a lazy stream of decoded rows.
    /// See [`scan_stream`](Self::scan_stream) for details.
    pub fn stream_all<'a, T, Q>(
        &self,
        querier: &'a mut Q,
        statement: &'a Statement,
    ) -> impl Stream<Item = Result<T, Error>> + use<'a, T, Q>
    where
        T: DecodeRow<Q::Row>,
        Q: Querier,
    {
        self.scan_stream(querier.query(statement))
    }
}

#[cfg(test)]
mod tests {
    use crate::{Record, Scanner, mock::MockSource};
    use futures::StreamExt;
    use serde_json::json;
    use std::pin::pin;

    fn id_row(id: i64) -> Record {
        Record::from_iter([("id", json!(id))])
    }

    #[tokio::test]
    async fn it_streams_rows_lazily() {
        let source = MockSource::new(vec![id_row(1), id_row(2), id_row(3)]);
        let stats = source.stats();
        let mut ids = pin!(Scanner::default().scan_stream::<i64, _>(source));
        assert_eq!(stats.pulls(), 0);

        assert_eq!(ids.next().await.unwrap().unwrap(), 1);
        assert_eq!(stats.pulls(), 1);
        assert_eq!(ids.next().await.unwrap().unwrap(), 2);
        assert_eq!(ids.next().await.unwrap().unwrap(), 3);
        assert!(ids.next().await.is_none());
        assert_eq!(stats.stops(), 1);
        assert!(ids.next().await.is_none());
        assert_eq!(stats.stops(), 1);
    }

    #[tokio::test]
    async fn it_stops_the_source_on_early_cancellation() {
        let source = MockSource::new(vec![id_row(1), id_row(2), id_row(3)]);
        let stats = source.stats();
        let ids = Scanner::default()
            .scan_stream::<i64, _>(source)
            .take(1)
            .collect::<Vec<_>>()
            .await;
        assert_eq!(ids.len(), 1);
        assert_eq!(stats.pulls(), 1);
        assert_eq!(stats.stops(), 1);
    }

    #[tokio::test]
    async fn it_ends_after_the_first_error() {
        let rows = vec![id_row(1), Record::from_iter([("id", json!("x"))]), id_row(3)];
        let source = MockSource::new(rows);
        let stats = source.stats();
        let items = Scanner::default()
            .scan_stream::<i64, _>(source)
            .collect::<Vec<_>>()
            .await;
        assert_eq!(items.len(), 2);
        assert_eq!(*items[0].as_ref().unwrap(), 1);
        assert!(items[1].as_ref().unwrap_err().is_decode());
        assert_eq!(stats.pulls(), 2);
        assert_eq!(stats.stops(), 1);

        let source = MockSource::failing(vec![id_row(1)], "deadline exceeded");
        let stats = source.stats();
        let items = Scanner::default()
            .scan_stream::<i64, _>(source)
            .collect::<Vec<_>>()
            .await;
        assert_eq!(items.len(), 2);
        assert!(items[1].as_ref().unwrap_err().is_source());
        assert_eq!(stats.stops(), 1);
    }
}
