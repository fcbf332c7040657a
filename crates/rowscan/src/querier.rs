use super::RowSource;

/// A SQL statement with positional arguments.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Statement {
    /// SQL text.
    sql: String,
    /// Arguments bound in order.
    arguments: Vec<String>,
}

impl Statement {
    /// Creates a new instance without arguments.
    #[inline]
    pub fn new(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            arguments: Vec::new(),
        }
    }

    /// Binds the next positional argument.
    #[inline]
    pub fn bind(mut self, argument: impl ToString) -> Self {
        self.arguments.push(argument.to_string());
        self
    }

    /// Returns the SQL text.
    #[inline]
    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// Returns the arguments.
    #[inline]
    pub fn arguments(&self) -> &[String] {
        &self.arguments
    }
}

impl From<&str> for Statement {
    #[inline]
    fn from(sql: &str) -> Self {
        Self::new(sql)
    }
}

impl From<String> for Statement {
    #[inline]
    fn from(sql: String) -> Self {
        Self::new(sql)
    }
}

/// Running queries that stream their rows.
pub trait Querier {
    /// A type for the database row.
    type Row;

    /// A type for the row source of a query.
    type Source<'a>: RowSource<Row = Self::Row>
    where
        Self: 'a;

    /// Starts the query and returns a source of its rows.
    /// Errors are reported by the source when the first row is fetched.
    fn query<'a>(&'a mut self, statement: &'a Statement) -> Self::Source<'a>;
}
