//! Scanning rows from SQLite through [`sqlx`].

use super::{CommitInfo, Querier, Record, Statement, StreamSource, TxnRunner};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use futures::{StreamExt, stream::BoxStream};
use rowscan_core::error::Error;
use serde_json::Value as JsonValue;
use sqlx::{Column as _, Database, Decode, Row, TypeInfo, ValueRef};

/// Driver for the SQLite database.
pub type DatabaseDriver = sqlx::Sqlite;

/// A pool of SQLite connections.
pub type DatabasePool = sqlx::SqlitePool;

/// A row returned by SQLite.
pub type DatabaseRow = sqlx::sqlite::SqliteRow;

/// A row source over the records of a SQLite query.
pub type SqliteSource<'a> = StreamSource<BoxStream<'a, Result<Record, Error>>>;

impl TryFrom<&DatabaseRow> for Record {
    type Error = Error;

    fn try_from(row: &DatabaseRow) -> Result<Self, Self::Error> {
        let columns = row.columns();
        let mut record = Record::with_capacity(columns.len());
        for col in columns {
            let field = col.name();
            let raw_value = row.try_get_raw(col.ordinal())?;
            let value = if raw_value.is_null() {
                JsonValue::Null
            } else {
                let type_info = col.type_info();
                let column_type = if type_info.is_null() {
                    raw_value.type_info().name().to_owned()
                } else {
                    type_info.name().to_owned()
                };
                match column_type.as_str() {
                    "BOOLEAN" => decode_raw::<bool>(field, raw_value)?.into(),
                    "INTEGER" => decode_raw::<i64>(field, raw_value)?.into(),
                    "REAL" => decode_raw::<f64>(field, raw_value)?.into(),
                    "TEXT" => decode_raw::<String>(field, raw_value)?.into(),
                    "DATETIME" => decode_raw::<DateTime<Utc>>(field, raw_value)?
                        .to_rfc3339()
                        .into(),
                    "DATE" => decode_raw::<NaiveDate>(field, raw_value)?.to_string().into(),
                    "TIME" => decode_raw::<NaiveTime>(field, raw_value)?.to_string().into(),
                    "BLOB" => decode_raw::<Vec<u8>>(field, raw_value)?.into(),
                    _ => decode_raw::<String>(field, raw_value)?.into(),
                }
            };
            record.push(field, value);
        }
        Ok(record)
    }
}

/// Decodes a raw value of the column.
fn decode_raw<'r, T>(
    field: &str,
    value: <DatabaseDriver as Database>::ValueRef<'r>,
) -> Result<T, Error>
where
    T: Decode<'r, DatabaseDriver>,
{
    T::decode(value).map_err(|err| {
        tracing::error!("fail to decode the `{field}` column");
        Error::decode(format!("fail to decode the `{field}` column: {err}"))
    })
}

/// Runs the statement with the executor and streams its rows as records.
fn fetch_records<'a, E>(executor: E, statement: &'a Statement) -> SqliteSource<'a>
where
    E: sqlx::Executor<'a, Database = DatabaseDriver> + 'a,
{
    let mut query = sqlx::query(statement.sql());
    for argument in statement.arguments() {
        query = query.bind(argument.as_str());
    }
    let stream = query
        .fetch(executor)
        .map(|result| match result {
            Ok(row) => Record::try_from(&row),
            Err(err) => Err(err.into()),
        })
        .boxed();
    StreamSource::new(stream)
}

impl Querier for DatabasePool {
    type Row = Record;
    type Source<'a> = SqliteSource<'a>;

    #[inline]
    fn query<'a>(&'a mut self, statement: &'a Statement) -> Self::Source<'a> {
        fetch_records(&*self, statement)
    }
}

impl<'c> Querier for sqlx::Transaction<'c, DatabaseDriver> {
    type Row = Record;
    type Source<'a>
        = SqliteSource<'a>
    where
        Self: 'a;

    #[inline]
    fn query<'a>(&'a mut self, statement: &'a Statement) -> Self::Source<'a> {
        fetch_records(&mut **self, statement)
    }
}

impl TxnRunner for DatabasePool {
    type Transaction = sqlx::Transaction<'static, DatabaseDriver>;

    async fn run_read_write<F, T>(&self, f: F) -> Result<(CommitInfo, T), Error>
    where
        F: AsyncFnOnce(&mut Self::Transaction) -> Result<T, Error>,
    {
        let mut transaction = self
            .begin()
            .await
            .map_err(|err| Error::from(err).wrap("fail to begin the transaction"))?;
        match f(&mut transaction).await {
            Ok(data) => {
                transaction
                    .commit()
                    .await
                    .map_err(|err| Error::from(err).wrap("fail to commit the transaction"))?;
                Ok((CommitInfo::now(), data))
            }
            Err(err) => {
                if let Err(rollback_err) = transaction.rollback().await {
                    tracing::warn!("fail to roll back the transaction: {rollback_err}");
                }
                Err(err)
            }
        }
    }
}
