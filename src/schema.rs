//! Schema lifecycle: existence checks, create, drop and clean.
//!
//! Each engine gets the same [`SchemaResource`] behaviour; what differs is
//! the [`Dialect`] handed to [`Schema`].

use tracing::{debug, info, warn};

use crate::catalog::{CatalogReader, Connection, ConnectionCatalog};
use crate::dialect::Dialect;
use crate::error::{ConnectionError, Error, Result};
use crate::objects::{DropStatement, SchemaRef};
use crate::planner::{CascadeTableDropper, CleanupPlanner, TableDropper};
use crate::quote::{DoubleQuote, NameQuoter};

pub trait SchemaResource {
    fn exists(&mut self) -> Result<bool>;

    /// True when the schema holds no relations.
    fn is_empty(&mut self) -> Result<bool>;

    fn create(&mut self) -> Result<()>;

    /// Drops the schema and everything in it.
    fn drop(&mut self) -> Result<()>;

    /// Drops every object in the schema that no extension owns, leaving the
    /// schema itself in place.
    fn clean(&mut self) -> Result<CleanReport>;
}

/// Runs planned statements.
pub trait StatementExecutor {
    fn execute(&mut self, statement: &DropStatement) -> Result<(), ConnectionError>;
}

impl<C: Connection + ?Sized> StatementExecutor for C {
    fn execute(&mut self, statement: &DropStatement) -> Result<(), ConnectionError> {
        self.update(statement.sql())
    }
}

/// Statements a clean executed, in order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CleanReport {
    pub executed: Vec<DropStatement>,
}

/// Executes `plan` in order and stops at the first statement the engine
/// rejects. Statements already executed are not undone.
pub fn execute_plan<E>(executor: &mut E, plan: Vec<DropStatement>) -> Result<CleanReport>
where
    E: StatementExecutor + ?Sized,
{
    let mut report = CleanReport::default();
    for (index, statement) in plan.into_iter().enumerate() {
        debug!(index, sql = %statement, "executing");
        if let Err(source) = executor.execute(&statement) {
            warn!(index, sql = %statement, error = %source, "statement failed, aborting clean");
            return Err(Error::Execution {
                index,
                statement: statement.sql().to_string(),
                source,
            });
        }
        report.executed.push(statement);
    }
    Ok(report)
}

/// A schema on a live connection.
///
/// The connection is borrowed mutably for the lifetime of the value, so one
/// `Schema` never runs two operations at once. Running two cleans of the same
/// schema through different connections is still unsafe and must be prevented
/// by the caller.
pub struct Schema<'a, C: ?Sized, Q = DoubleQuote, T = CascadeTableDropper> {
    conn: &'a mut C,
    dialect: Dialect,
    planner: CleanupPlanner<Q, T>,
    schema: SchemaRef,
}

impl<'a, C: Connection + ?Sized> Schema<'a, C> {
    pub fn new(conn: &'a mut C, dialect: Dialect, schema: SchemaRef) -> Self {
        Self::with_planner(conn, dialect, CleanupPlanner::redshift(), schema)
    }
}

impl<'a, C, Q, T> Schema<'a, C, Q, T>
where
    C: Connection + ?Sized,
    Q: NameQuoter,
    T: TableDropper,
{
    pub fn with_planner(
        conn: &'a mut C,
        dialect: Dialect,
        planner: CleanupPlanner<Q, T>,
        schema: SchemaRef,
    ) -> Self {
        Self {
            conn,
            dialect,
            planner: planner.with_aggregate_keyword(dialect.drop_aggregate),
            schema,
        }
    }

    pub fn schema(&self) -> &SchemaRef {
        &self.schema
    }

    /// Reads the catalog and returns what a clean would execute, without
    /// executing anything.
    pub fn plan_clean(&mut self) -> Result<Vec<DropStatement>> {
        let mut catalog = ConnectionCatalog::new(&mut *self.conn, self.dialect);
        let rows = catalog.fetch_objects(&self.schema)?;
        self.planner.plan(&self.schema, rows)
    }
}

impl<'a, C, Q, T> SchemaResource for Schema<'a, C, Q, T>
where
    C: Connection + ?Sized,
    Q: NameQuoter,
    T: TableDropper,
{
    fn exists(&mut self) -> Result<bool> {
        let count = self
            .conn
            .query_int(self.dialect.schema_exists, &[self.schema.name()])?;
        Ok(count > 0)
    }

    fn is_empty(&mut self) -> Result<bool> {
        let has_objects = self
            .conn
            .query_bool(self.dialect.schema_has_objects, &[self.schema.name()])?;
        Ok(!has_objects)
    }

    fn create(&mut self) -> Result<()> {
        info!(schema = %self.schema, "creating schema");
        self.conn.update(&self.dialect.create_schema(&self.schema))?;
        Ok(())
    }

    fn drop(&mut self) -> Result<()> {
        info!(schema = %self.schema, "dropping schema");
        self.conn.update(&self.dialect.drop_schema(&self.schema))?;
        Ok(())
    }

    fn clean(&mut self) -> Result<CleanReport> {
        let plan = self.plan_clean()?;
        info!(schema = %self.schema, statements = plan.len(), "cleaning schema");
        execute_plan(&mut *self.conn, plan)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::testutil::FakeConnection;
    use pretty_assertions::assert_eq;

    fn fixture(dialect: Dialect) -> FakeConnection {
        let mut conn = FakeConnection::default();
        conn.respond(dialect.views, vec![vec!["v1", "f"]]);
        conn.respond(dialect.tables, vec![vec!["t1", "f"], vec!["spatial_ref_sys", "t"]]);
        conn.respond(dialect.routines, vec![]);
        conn.respond(dialect.routines, vec![vec!["f1", "integer", "f"]]);
        conn.respond(dialect.routines, vec![vec!["p1", "", "f"]]);
        conn
    }

    #[test]
    fn exists_and_empty() {
        let dialect = Dialect::REDSHIFT;
        let mut conn = FakeConnection::default();
        conn.respond(dialect.schema_exists, vec![vec!["1"]]);
        conn.respond(dialect.schema_has_objects, vec![vec!["false"]]);

        let mut schema = Schema::new(&mut conn, dialect, SchemaRef::new("app"));
        assert!(schema.exists().unwrap());
        assert!(schema.is_empty().unwrap());
        assert_eq!(vec!["app".to_string()], conn.queries[0].1);
    }

    #[test]
    fn missing_schema() {
        let dialect = Dialect::REDSHIFT;
        let mut conn = FakeConnection::default();
        conn.respond(dialect.schema_exists, vec![vec!["0"]]);
        let mut schema = Schema::new(&mut conn, dialect, SchemaRef::new("app"));
        assert!(!schema.exists().unwrap());
    }

    #[test]
    fn create_and_drop() {
        let mut conn = FakeConnection::default();
        let mut schema = Schema::new(&mut conn, Dialect::REDSHIFT, SchemaRef::new("app"));
        schema.create().unwrap();
        SchemaResource::drop(&mut schema).unwrap();
        assert_eq!(
            vec![r#"CREATE SCHEMA "app""#, r#"DROP SCHEMA "app" CASCADE"#],
            conn.executed
        );
    }

    #[test]
    fn clean_executes_plan_in_order() {
        let dialect = Dialect::REDSHIFT;
        let mut conn = fixture(dialect);
        let mut schema = Schema::new(&mut conn, dialect, SchemaRef::new("sch"));
        let report = schema.clean().unwrap();
        let expected = vec![
            r#"DROP VIEW IF EXISTS "sch"."v1" CASCADE"#,
            r#"DROP TABLE "sch"."t1" CASCADE"#,
            r#"DROP FUNCTION "sch"."f1"(integer) CASCADE"#,
            r#"DROP PROCEDURE "sch"."p1"()"#,
        ];
        assert_eq!(expected, conn.executed);
        assert_eq!(4, report.executed.len());
    }

    #[test]
    fn plan_clean_executes_nothing() {
        let dialect = Dialect::POSTGRES;
        let mut conn = fixture(dialect);
        let mut schema = Schema::new(&mut conn, dialect, SchemaRef::new("sch"));
        let plan = schema.plan_clean().unwrap();
        assert_eq!(4, plan.len());
        assert!(conn.executed.is_empty());
    }

    #[test]
    fn clean_stops_at_first_failure() {
        let dialect = Dialect::REDSHIFT;
        let mut conn = fixture(dialect);
        conn.fail_on = Some(r#"DROP TABLE "sch"."t1" CASCADE"#.to_string());
        let mut schema = Schema::new(&mut conn, dialect, SchemaRef::new("sch"));
        let err = schema.clean().unwrap_err();
        match err {
            Error::Execution { index, statement, .. } => {
                assert_eq!(1, index);
                assert_eq!(r#"DROP TABLE "sch"."t1" CASCADE"#, statement);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(vec![r#"DROP VIEW IF EXISTS "sch"."v1" CASCADE"#], conn.executed);
    }

    #[test]
    fn clean_without_catalog_runs_nothing() {
        let dialect = Dialect::REDSHIFT;
        let mut conn = FakeConnection::default();
        conn.respond_err(dialect.views, "permission denied for pg_depend");
        let mut schema = Schema::new(&mut conn, dialect, SchemaRef::new("sch"));
        let err = schema.clean().unwrap_err();
        assert!(matches!(err, Error::CatalogUnavailable { .. }));
        assert!(conn.executed.is_empty());
    }

    #[test]
    fn clean_of_empty_schema_is_noop() {
        let mut conn = FakeConnection::default();
        let mut schema = Schema::new(&mut conn, Dialect::REDSHIFT, SchemaRef::new("sch"));
        assert_eq!(CleanReport::default(), schema.clean().unwrap());
    }

    #[test]
    fn aggregates_follow_dialect() {
        for (dialect, expected) in [
            (Dialect::REDSHIFT, r#"DROP FUNCTION "sch"."mysum"(integer) CASCADE"#),
            (Dialect::POSTGRES, r#"DROP AGGREGATE "sch"."mysum"(integer) CASCADE"#),
        ] {
            let mut conn = FakeConnection::default();
            conn.respond(dialect.routines, vec![vec!["mysum", "integer", "f"]]);
            let mut schema = Schema::new(&mut conn, dialect, SchemaRef::new("sch"));
            schema.clean().unwrap();
            assert_eq!(vec![expected], conn.executed, "{}", dialect.name);
        }
    }
}
