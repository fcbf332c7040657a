#![cfg_attr(docsrs, feature(doc_auto_cfg))]
#![doc = include_str!("../README.md")]
#![allow(async_fn_in_trait)]

mod cardinality;
mod decode;
mod destination;
mod fields;
mod options;
mod querier;
mod record;
mod scanner;
mod source;
mod stream;
mod transaction;

#[cfg(feature = "orm-sqlx")]
mod sqlite;

#[cfg(test)]
mod mock;

pub use decode::{DecodeMode, DecodeRow};
pub use destination::{
    ByReference, ByValue, Destination, DestinationKind, DestinationMeta, ElementMode,
    Indirection, SequenceDestination,
};
pub use options::ScanOptions;
pub use querier::{Querier, Statement};
pub use record::Record;
pub use rowscan_core::error::{Error, ErrorKind};
pub use scanner::Scanner;
pub use source::{RowSource, StreamSource};
pub use transaction::{CommitInfo, TxnRunner};

#[cfg(feature = "orm-sqlx")]
pub use sqlite::{DatabaseDriver, DatabasePool, DatabaseRow, SqliteSource};

/// Returns `true` if the error, or any error in its source chain,
/// reports that no row was found.
#[inline]
pub fn is_not_found(err: &Error) -> bool {
    err.is_not_found()
}
