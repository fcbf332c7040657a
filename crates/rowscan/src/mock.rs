use super::{Querier, Record, RowSource, Statement};
use rowscan_core::error::{Error, ErrorKind};
use std::{
    collections::VecDeque,
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering::Relaxed},
    },
};

/// Counters shared with a mock source.
#[derive(Debug, Clone, Default)]
pub(crate) struct MockStats {
    pulls: Arc<AtomicUsize>,
    stops: Arc<AtomicUsize>,
}

impl MockStats {
    /// Number of times the next row was requested.
    pub(crate) fn pulls(&self) -> usize {
        self.pulls.load(Relaxed)
    }

    /// Number of times the source was stopped.
    pub(crate) fn stops(&self) -> usize {
        self.stops.load(Relaxed)
    }
}

/// An in-memory row source.
#[derive(Debug)]
pub(crate) struct MockSource {
    rows: VecDeque<Record>,
    failure: Option<&'static str>,
    stats: MockStats,
}

impl MockSource {
    /// Yields the rows and then ends.
    pub(crate) fn new(rows: Vec<Record>) -> Self {
        Self {
            rows: rows.into(),
            failure: None,
            stats: MockStats::default(),
        }
    }

    /// Yields the rows and then fails once with the message.
    pub(crate) fn failing(rows: Vec<Record>, message: &'static str) -> Self {
        Self {
            failure: Some(message),
            ..Self::new(rows)
        }
    }

    pub(crate) fn stats(&self) -> MockStats {
        self.stats.clone()
    }
}

impl RowSource for MockSource {
    type Row = Record;

    async fn next_row(&mut self) -> Result<Option<Record>, Error> {
        self.stats.pulls.fetch_add(1, Relaxed);
        match self.rows.pop_front() {
            Some(row) => Ok(Some(row)),
            None => match self.failure.take() {
                Some(message) => Err(Error::new(ErrorKind::Source, message)),
                None => Ok(None),
            },
        }
    }

    fn stop(&mut self) {
        self.stats.stops.fetch_add(1, Relaxed);
    }
}

/// A querier returning the same rows for every statement.
#[derive(Debug, Default)]
pub(crate) struct MockQuerier {
    rows: Vec<Record>,
    statements: Vec<String>,
}

impl MockQuerier {
    pub(crate) fn new(rows: Vec<Record>) -> Self {
        Self {
            rows,
            statements: Vec::new(),
        }
    }

    /// SQL text of the statements run so far.
    pub(crate) fn statements(&self) -> &[String] {
        &self.statements
    }
}

impl Querier for MockQuerier {
    type Row = Record;
    type Source<'a> = MockSource;

    fn query<'a>(&'a mut self, statement: &'a Statement) -> Self::Source<'a> {
        self.statements.push(statement.sql().to_owned());
        MockSource::new(self.rows.clone())
    }
}
