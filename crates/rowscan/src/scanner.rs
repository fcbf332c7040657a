use super::{
    ByReference, ByValue, DecodeRow, Destination, DestinationMeta, ElementMode, Querier,
    RowSource, ScanOptions, SequenceDestination, Statement, cardinality::Cardinality,
    decode::decode_row, source::SourceGuard,
};
use rowscan_core::error::Error;
use toml::Table;

/// Scanning rows into destinations.
///
/// A scanner holds the [`ScanOptions`] for every call made through it.
/// It is cheap to copy and can be shared freely across tasks.
#[derive(Debug, Clone, Copy, Default)]
pub struct Scanner {
    /// Scan options.
    options: ScanOptions,
}

impl Scanner {
    /// Creates a new instance with the options.
    #[inline]
    pub fn new(options: ScanOptions) -> Self {
        Self { options }
    }

    /// Creates a new instance with the options read from the config.
    #[inline]
    pub fn from_config(config: &Table) -> Self {
        Self::new(ScanOptions::from_config(config))
    }

    /// Sets whether decoding should be lenient.
    #[inline]
    pub fn with_lenient(mut self, lenient: bool) -> Self {
        self.options.lenient = lenient;
        self
    }

    /// Returns the options.
    #[inline]
    pub fn options(&self) -> &ScanOptions {
        &self.options
    }

    /// Makes sure that there is exactly one row, and decodes it into the destination.
    ///
    /// Returns a [`NotFound`](rowscan_core::error::ErrorKind::NotFound) error
    /// if there are no rows, and a
    /// [`Cardinality`](rowscan_core::error::ErrorKind::Cardinality) error
    /// as soon as a second row is fetched; the second row is not decoded.
    /// The source is stopped before returning.
    pub async fn scan_one<'a, T, D, S>(&self, dst: D, source: S) -> Result<(), Error>
    where
        D: Destination<'a, T>,
        T: DecodeRow<S::Row>,
        S: RowSource,
    {
        let mut source = SourceGuard::new(source);
        let mut dst = dst
            .acquire()
            .map_err(|err| err.wrap("parsing scalar destination"))?;
        let meta = DestinationMeta::scalar::<T>();
        tracing::debug!(destination = ?meta, "scanning one row");

        let mode = self.options.decode_mode();
        let mut cardinality = Cardinality::default();
        while let Some(row) = source.next_row().await? {
            cardinality.observe()?;
            *dst = decode_row(&row, mode)?;
        }
        cardinality.finish()
    }

    /// Iterates all rows to the end, and appends each decoded row to the destination.
    ///
    /// The destination is reset before the first row is fetched,
    /// so any existing elements are discarded. Elements are stored by value;
    /// this also covers primitives and pointers to primitives.
    pub async fn scan_all<'a, C, D, S>(&self, dst: D, source: S) -> Result<(), Error>
    where
        D: Destination<'a, C>,
        C: SequenceDestination,
        C::Element: DecodeRow<S::Row>,
        S: RowSource,
    {
        self.scan_sequence::<ByValue, C, D, S>(dst, source).await
    }

    /// Iterates all rows to the end, and appends each decoded row
    /// to the destination behind an indirection such as `Box<T>` or `Arc<T>`.
    ///
    /// The destination is reset before the first row is fetched.
    pub async fn scan_all_by_ref<'a, C, D, S>(&self, dst: D, source: S) -> Result<(), Error>
    where
        D: Destination<'a, C>,
        C: SequenceDestination,
        ByReference: ElementMode<C::Element>,
        <ByReference as ElementMode<C::Element>>::Base: DecodeRow<S::Row>,
        S: RowSource,
    {
        self.scan_sequence::<ByReference, C, D, S>(dst, source).await
    }

    async fn scan_sequence<'a, M, C, D, S>(&self, dst: D, source: S) -> Result<(), Error>
    where
        M: ElementMode<C::Element>,
        M::Base: DecodeRow<S::Row>,
        D: Destination<'a, C>,
        C: SequenceDestination,
        S: RowSource,
    {
        let mut source = SourceGuard::new(source);
        let mut dst = dst
            .acquire()
            .map_err(|err| err.wrap("parsing sequence destination"))?;
        let meta = DestinationMeta::sequence::<C, M>();
        tracing::debug!(destination = ?meta, "scanning all rows");

        let mode = self.options.decode_mode();
        dst.reset();
        while let Some(row) = source.next_row().await? {
            let base = decode_row::<M::Base, _>(&row, mode)?;
            dst.push_element(M::place(base));
        }
        tracing::debug!(num_rows = dst.len(), "all rows scanned");
        Ok(())
    }

    /// Runs the statement and scans exactly one row into the destination.
    /// See [`scan_one`](Self::scan_one) for details.
    pub async fn fetch_one<'a, T, D, Q>(
        &self,
        querier: &mut Q,
        dst: D,
        statement: &Statement,
    ) -> Result<(), Error>
    where
        Q: Querier,
        D: Destination<'a, T>,
        T: DecodeRow<Q::Row>,
    {
        let source = querier.query(statement);
        self.scan_one(dst, source)
            .await
            .map_err(|err| err.wrap("scanning one"))
    }

    /// Runs the statement and scans all rows into the destination.
    /// See [`scan_all`](Self::scan_all) for details.
    pub async fn fetch_all<'a, C, D, Q>(
        &self,
        querier: &mut Q,
        dst: D,
        statement: &Statement,
    ) -> Result<(), Error>
    where
        Q: Querier,
        D: Destination<'a, C>,
        C: SequenceDestination,
        C::Element: DecodeRow<Q::Row>,
    {
        let source = querier.query(statement);
        self.scan_all(dst, source)
            .await
            .map_err(|err| err.wrap("scanning all"))
    }

    /// Runs the statement and scans all rows into the destination behind indirections.
    /// See [`scan_all_by_ref`](Self::scan_all_by_ref) for details.
    pub async fn fetch_all_by_ref<'a, C, D, Q>(
        &self,
        querier: &mut Q,
        dst: D,
        statement: &Statement,
    ) -> Result<(), Error>
    where
        Q: Querier,
        D: Destination<'a, C>,
        C: SequenceDestination,
        ByReference: ElementMode<C::Element>,
        <ByReference as ElementMode<C::Element>>::Base: DecodeRow<Q::Row>,
    {
        let source = querier.query(statement);
        self.scan_all_by_ref(dst, source)
            .await
            .map_err(|err| err.wrap("scanning all"))
    }
}
