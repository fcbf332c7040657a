use super::{
    ByReference, DecodeRow, Destination, ElementMode, Querier, Scanner, SequenceDestination,
    Statement,
};
use chrono::{DateTime, Utc};
use rowscan_core::error::{Error, ErrorKind};

/// Metadata of a committed transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommitInfo {
    /// Commit timestamp.
    commit_timestamp: DateTime<Utc>,
}

impl CommitInfo {
    /// Creates a new instance with the commit timestamp.
    #[inline]
    pub fn new(commit_timestamp: DateTime<Utc>) -> Self {
        Self { commit_timestamp }
    }

    /// Creates a new instance committed at the current time.
    #[inline]
    pub fn now() -> Self {
        Self::new(Utc::now())
    }

    /// Returns the commit timestamp.
    #[inline]
    pub fn commit_timestamp(&self) -> DateTime<Utc> {
        self.commit_timestamp
    }
}

/// Running operations inside of a read-write transaction.
pub trait TxnRunner {
    /// A type for the in-progress transaction.
    type Transaction: Querier;

    /// Executes the operations inside of a read-write transaction.
    /// If the operations return an error, the transaction will be rolled back;
    /// if not, the transaction will be committed.
    async fn run_read_write<F, T>(&self, f: F) -> Result<(CommitInfo, T), Error>
    where
        F: AsyncFnOnce(&mut Self::Transaction) -> Result<T, Error>;
}

/// A type for the rows of the transactions created by `R`.
type TxnRow<R> = <<R as TxnRunner>::Transaction as Querier>::Row;

impl Scanner {
    /// Runs the statement inside of a read-write transaction,
    /// and scans exactly one row into the destination.
    ///
    /// This should be used to read data returned by an update statement,
    /// for example with a `RETURNING` clause. The commit metadata is discarded.
    pub async fn fetch_one_in_txn<'a, T, D, R>(
        &self,
        runner: &R,
        dst: D,
        statement: &Statement,
    ) -> Result<(), Error>
    where
        R: TxnRunner,
        D: Destination<'a, T>,
        T: DecodeRow<TxnRow<R>>,
    {
        let result = runner
            .run_read_write(async move |txn: &mut R::Transaction| {
                self.fetch_one(txn, dst, statement)
                    .await
                    .map_err(|err| err.wrap("fail to fetch one row in the transaction"))
            })
            .await;
        discard_commit_info(result)
    }

    /// Runs the statement inside of a read-write transaction,
    /// and scans all rows into the destination.
    pub async fn fetch_all_in_txn<'a, C, D, R>(
        &self,
        runner: &R,
        dst: D,
        statement: &Statement,
    ) -> Result<(), Error>
    where
        R: TxnRunner,
        D: Destination<'a, C>,
        C: SequenceDestination,
        C::Element: DecodeRow<TxnRow<R>>,
    {
        let result = runner
            .run_read_write(async move |txn: &mut R::Transaction| {
                self.fetch_all(txn, dst, statement)
                    .await
                    .map_err(|err| err.wrap("fail to fetch all rows in the transaction"))
            })
            .await;
        discard_commit_info(result)
    }

    /// Runs the statement inside of a read-write transaction,
    /// and scans all rows into the destination behind indirections.
    pub async fn fetch_all_by_ref_in_txn<'a, C, D, R>(
        &self,
        runner: &R,
        dst: D,
        statement: &Statement,
    ) -> Result<(), Error>
    where
        R: TxnRunner,
        D: Destination<'a, C>,
        C: SequenceDestination,
        ByReference: ElementMode<C::Element>,
        <ByReference as ElementMode<C::Element>>::Base: DecodeRow<TxnRow<R>>,
    {
        let result = runner
            .run_read_write(async move |txn: &mut R::Transaction| {
                self.fetch_all_by_ref(txn, dst, statement)
                    .await
                    .map_err(|err| err.wrap("fail to fetch all rows in the transaction"))
            })
            .await;
        discard_commit_info(result)
    }
}

/// Drops the commit metadata and tags failures as transaction errors.
fn discard_commit_info(result: Result<(CommitInfo, ()), Error>) -> Result<(), Error> {
    match result {
        Ok((commit_info, ())) => {
            tracing::debug!(
                commit_timestamp = %commit_info.commit_timestamp(),
                "read-write transaction committed"
            );
            Ok(())
        }
        Err(err) => {
            tracing::error!("fail to run the read-write transaction: {err}");
            Err(err.wrap_as(
                ErrorKind::Transaction,
                "fail to run the read-write transaction",
            ))
        }
    }
}
