use tracing::debug;

use crate::dialect::Dialect;
use crate::error::{ConnectionError, Error, Result};
use crate::objects::{CatalogRow, ObjectKind, SchemaRef};

/// One result row, columns in select order.
pub type Row = Vec<String>;

/// The host's database session. Acquiring it and deciding on transaction
/// boundaries happen outside this crate.
pub trait Connection {
    fn query(&mut self, sql: &str, params: &[&str]) -> Result<Vec<Row>, ConnectionError>;

    fn update(&mut self, sql: &str) -> Result<(), ConnectionError>;

    fn query_int(&mut self, sql: &str, params: &[&str]) -> Result<i64> {
        let value = self.query_scalar(sql, params)?;
        value.trim().parse().map_err(|_| Error::UnexpectedResult {
            query: sql.to_string(),
            detail: format!("expected an integer, got {value:?}"),
        })
    }

    fn query_bool(&mut self, sql: &str, params: &[&str]) -> Result<bool> {
        let value = self.query_scalar(sql, params)?;
        parse_bool(&value).ok_or_else(|| Error::UnexpectedResult {
            query: sql.to_string(),
            detail: format!("expected a boolean, got {value:?}"),
        })
    }

    /// First column of every row.
    fn query_strings(&mut self, sql: &str, params: &[&str]) -> Result<Vec<String>> {
        let rows = self.query(sql, params)?;
        rows.into_iter()
            .map(|row| first_column(sql, row))
            .collect()
    }

    #[doc(hidden)]
    fn query_scalar(&mut self, sql: &str, params: &[&str]) -> Result<String> {
        let mut rows = self.query(sql, params)?.into_iter();
        match rows.next() {
            Some(row) => first_column(sql, row),
            None => Err(Error::UnexpectedResult {
                query: sql.to_string(),
                detail: "no rows".to_string(),
            }),
        }
    }
}

impl<C: Connection + ?Sized> Connection for &mut C {
    fn query(&mut self, sql: &str, params: &[&str]) -> Result<Vec<Row>, ConnectionError> {
        (**self).query(sql, params)
    }

    fn update(&mut self, sql: &str) -> Result<(), ConnectionError> {
        (**self).update(sql)
    }
}

fn first_column(sql: &str, row: Row) -> Result<String> {
    row.into_iter().next().ok_or_else(|| Error::UnexpectedResult {
        query: sql.to_string(),
        detail: "row has no columns".to_string(),
    })
}

/// Drivers render booleans differently; accept the usual spellings.
pub(crate) fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "t" | "true" | "1" | "y" | "yes" => Some(true),
        "f" | "false" | "0" | "n" | "no" => Some(false),
        _ => None,
    }
}

/// Supplies the objects a schema currently holds.
///
/// Implementations return everything or fail with
/// [`Error::CatalogUnavailable`]; a partial listing would let a clean
/// silently leave objects behind.
pub trait CatalogReader {
    fn fetch_objects(&mut self, schema: &SchemaRef) -> Result<Vec<CatalogRow>>;
}

/// Reads the catalog through a live connection using a dialect's queries.
pub struct ConnectionCatalog<C> {
    conn: C,
    dialect: Dialect,
}

impl<C: Connection> ConnectionCatalog<C> {
    pub fn new(conn: C, dialect: Dialect) -> Self {
        Self { conn, dialect }
    }

    fn list(&mut self, schema: &SchemaRef) -> Result<Vec<CatalogRow>> {
        let name = schema.name();
        let mut rows = Vec::new();

        for row in self.conn.query(self.dialect.views, &[name])? {
            rows.push(relation_row(self.dialect.views, ObjectKind::View, row)?);
        }
        for row in self.conn.query(self.dialect.tables, &[name])? {
            rows.push(relation_row(self.dialect.tables, ObjectKind::Table, row)?);
        }
        for kind in [
            ObjectKind::AggregateFunction,
            ObjectKind::ScalarFunction,
            ObjectKind::Procedure,
        ] {
            for row in self.conn.query(self.dialect.routines, &[kind.code(), name])? {
                rows.push(routine_row(self.dialect.routines, kind, row)?);
            }
        }
        Ok(rows)
    }
}

impl<C: Connection> CatalogReader for ConnectionCatalog<C> {
    fn fetch_objects(&mut self, schema: &SchemaRef) -> Result<Vec<CatalogRow>> {
        let rows = self
            .list(schema)
            .map_err(|err| Error::catalog_unavailable(schema.name(), err))?;
        debug!(schema = %schema, dialect = self.dialect.name, objects = rows.len(), "read catalog");
        Ok(rows)
    }
}

fn relation_row(sql: &str, kind: ObjectKind, row: Row) -> Result<CatalogRow> {
    match <[String; 2]>::try_from(row) {
        Ok([name, owned]) => Ok(CatalogRow::new(name, kind.code()).extension_owned(owned_flag(sql, &owned)?)),
        Err(row) => Err(column_count(sql, 2, row.len())),
    }
}

fn routine_row(sql: &str, kind: ObjectKind, row: Row) -> Result<CatalogRow> {
    match <[String; 3]>::try_from(row) {
        Ok([name, args, owned]) => Ok(CatalogRow::new(name, kind.code())
            .with_args(args)
            .extension_owned(owned_flag(sql, &owned)?)),
        Err(row) => Err(column_count(sql, 3, row.len())),
    }
}

fn owned_flag(sql: &str, value: &str) -> Result<bool> {
    parse_bool(value).ok_or_else(|| Error::UnexpectedResult {
        query: sql.to_string(),
        detail: format!("expected a boolean extension flag, got {value:?}"),
    })
}

fn column_count(sql: &str, expected: usize, got: usize) -> Error {
    Error::UnexpectedResult {
        query: sql.to_string(),
        detail: format!("expected {expected} columns, got {got}"),
    }
}


#[cfg(test)]
mod tests {
    use super::testutil::FakeConnection;
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn scalar_helpers() {
        let mut conn = FakeConnection::default();
        conn.respond("count", vec![vec!["3"]]);
        conn.respond("flag", vec![vec!["t"]]);
        conn.respond("names", vec![vec!["a"], vec!["b"]]);
        assert_eq!(3, conn.query_int("count", &[]).unwrap());
        assert!(conn.query_bool("flag", &[]).unwrap());
        assert_eq!(vec!["a", "b"], conn.query_strings("names", &[]).unwrap());
    }

    #[test]
    fn scalar_without_rows() {
        let mut conn = FakeConnection::default();
        let err = conn.query_int("count", &[]).unwrap_err();
        assert!(matches!(err, Error::UnexpectedResult { .. }));
    }

    #[test]
    fn reads_every_kind() {
        let dialect = Dialect::REDSHIFT;
        let mut conn = FakeConnection::default();
        conn.respond(dialect.views, vec![vec!["v1", "f"], vec!["pg_view", "t"]]);
        conn.respond(dialect.tables, vec![vec!["t1", "false"]]);
        conn.respond(dialect.routines, vec![vec!["agg", "numeric", "f"]]);
        conn.respond(dialect.routines, vec![vec!["f1", "integer, text", "f"]]);
        conn.respond(dialect.routines, vec![vec!["p1", "", "f"]]);

        let mut catalog = ConnectionCatalog::new(&mut conn, dialect);
        let rows = catalog.fetch_objects(&SchemaRef::new("sch")).unwrap();
        assert_eq!(
            vec![
                CatalogRow::new("v1", "v"),
                CatalogRow::new("pg_view", "v").extension_owned(true),
                CatalogRow::new("t1", "r"),
                CatalogRow::new("agg", "a").with_args("numeric"),
                CatalogRow::new("f1", "f").with_args("integer, text"),
                CatalogRow::new("p1", "p"),
            ],
            rows
        );

        let routine_params: Vec<Vec<String>> = conn
            .queries
            .iter()
            .filter(|(sql, _)| sql == dialect.routines)
            .map(|(_, params)| params.clone())
            .collect();
        assert_eq!(
            vec![
                vec!["a".to_string(), "sch".to_string()],
                vec!["f".to_string(), "sch".to_string()],
                vec!["p".to_string(), "sch".to_string()],
            ],
            routine_params
        );
    }

    #[test]
    fn query_failure_is_catalog_unavailable() {
        let dialect = Dialect::POSTGRES;
        let mut conn = FakeConnection::default();
        conn.respond(dialect.views, vec![vec!["v1", "f"]]);
        conn.respond_err(dialect.tables, "connection reset");

        let mut catalog = ConnectionCatalog::new(&mut conn, dialect);
        let err = catalog.fetch_objects(&SchemaRef::new("sch")).unwrap_err();
        match err {
            Error::CatalogUnavailable { schema, source } => {
                assert_eq!("sch", schema);
                assert!(source.to_string().contains("connection reset"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn malformed_row_is_catalog_unavailable() {
        let dialect = Dialect::REDSHIFT;
        let mut conn = FakeConnection::default();
        conn.respond(dialect.views, vec![vec!["v1"]]);

        let mut catalog = ConnectionCatalog::new(&mut conn, dialect);
        let err = catalog.fetch_objects(&SchemaRef::new("sch")).unwrap_err();
        assert!(matches!(err, Error::CatalogUnavailable { .. }));
    }
}
