//! Cleanup planning: turns catalog metadata for one schema into the ordered
//! DROP statements that empty it.
//!
//! Objects are dropped in tiers, views first, then tables, aggregate
//! functions, scalar functions and finally procedures. `CASCADE` alone does
//! not always resolve references across object kinds (a view over a function,
//! say), so the tiers are applied even though most statements cascade.
//! Objects owned by an extension are never dropped.
//!
//! Planning is pure. Executing the plan, in order and stopping at the first
//! failure, is up to the caller (see [`crate::schema::execute_plan`]).

use regex::Regex;
use tracing::debug;

use crate::dialect::Dialect;
use crate::error::Result;
use crate::objects::{CatalogObject, CatalogRow, DropStatement, Entity, ObjectKind, SchemaRef};
use crate::quote::{DoubleQuote, NameQuoter};

/// Renders the statement that drops one table.
///
/// Implementations may know more about tables than the planner does, e.g.
/// how child tables go away with their parent.
pub trait TableDropper {
    fn drop_statement(&self, schema: &SchemaRef, table: &CatalogObject) -> DropStatement;
}

/// `DROP TABLE ... CASCADE`. Inheriting child tables are removed along with
/// the parent.
#[derive(Debug, Default, Clone, Copy)]
pub struct CascadeTableDropper<Q = DoubleQuote> {
    quoter: Q,
}

impl<Q: NameQuoter> CascadeTableDropper<Q> {
    pub fn new(quoter: Q) -> Self {
        Self { quoter }
    }
}

impl<Q: NameQuoter> TableDropper for CascadeTableDropper<Q> {
    fn drop_statement(&self, schema: &SchemaRef, table: &CatalogObject) -> DropStatement {
        DropStatement::new(
            ObjectKind::Table,
            format!(
                "DROP TABLE {} CASCADE",
                self.quoter.quote(schema.name(), Some(&table.name))
            ),
        )
    }
}

pub struct CleanupPlanner<Q = DoubleQuote, T = CascadeTableDropper<DoubleQuote>> {
    quoter: Q,
    tables: T,
    retain: Option<Regex>,
    aggregate_keyword: &'static str,
}

impl CleanupPlanner {
    /// Double-quoted identifiers, cascading table drops, and aggregates
    /// dropped with `DROP FUNCTION` as Redshift expects.
    pub fn redshift() -> Self {
        Self::new(DoubleQuote, CascadeTableDropper::new(DoubleQuote))
    }

    pub fn for_dialect(dialect: &Dialect) -> Self {
        Self::redshift().with_aggregate_keyword(dialect.drop_aggregate)
    }
}

impl Default for CleanupPlanner {
    fn default() -> Self {
        Self::redshift()
    }
}

impl<Q: NameQuoter, T: TableDropper> CleanupPlanner<Q, T> {
    pub fn new(quoter: Q, tables: T) -> Self {
        Self {
            quoter,
            tables,
            retain: None,
            aggregate_keyword: "FUNCTION",
        }
    }

    /// Object type named in aggregate drops: `FUNCTION` on Redshift,
    /// `AGGREGATE` on PostgreSQL.
    pub fn with_aggregate_keyword(mut self, keyword: &'static str) -> Self {
        self.aggregate_keyword = keyword;
        self
    }

    /// Objects whose name matches `pattern` are left in place.
    pub fn with_retain(mut self, pattern: Regex) -> Self {
        self.retain = Some(pattern);
        self
    }

    /// Validates `rows` and plans the drops.
    ///
    /// A single row with an unrecognized kind fails the whole plan; no
    /// statements are returned for the rows that were fine.
    pub fn plan<I>(&self, schema: &SchemaRef, rows: I) -> Result<Vec<DropStatement>>
    where
        I: IntoIterator<Item = CatalogRow>,
    {
        let objects = rows
            .into_iter()
            .map(CatalogObject::try_from)
            .collect::<Result<Vec<_>>>()?;
        Ok(self.plan_objects(schema, &objects))
    }

    pub fn plan_objects(&self, schema: &SchemaRef, objects: &[CatalogObject]) -> Vec<DropStatement> {
        let mut targets: Vec<&CatalogObject> = objects
            .iter()
            .filter(|object| self.should_drop(schema, object))
            .collect();
        // Stable, so enumeration order survives within a tier.
        targets.sort_by_key(|object| object.kind());

        let statements: Vec<DropStatement> = targets
            .into_iter()
            .map(|object| self.render(schema, object))
            .collect();
        debug!(schema = %schema, statements = statements.len(), "planned cleanup");
        statements
    }

    fn should_drop(&self, schema: &SchemaRef, object: &CatalogObject) -> bool {
        if object.extension_owned {
            debug!(schema = %schema, name = %object.name, kind = %object.kind(), "skipping extension-owned object");
            return false;
        }
        if let Some(retain) = &self.retain {
            if retain.is_match(&object.name) {
                debug!(schema = %schema, name = %object.name, kind = %object.kind(), "retaining object");
                return false;
            }
        }
        true
    }

    fn render(&self, schema: &SchemaRef, object: &CatalogObject) -> DropStatement {
        let name = || self.quoter.quote(schema.name(), Some(&object.name));
        match &object.entity {
            Entity::View => DropStatement::new(
                ObjectKind::View,
                format!("DROP VIEW IF EXISTS {} CASCADE", name()),
            ),
            // Tier follows the planner's ordering, whatever the dropper says.
            Entity::Table => DropStatement::new(
                ObjectKind::Table,
                self.tables.drop_statement(schema, object).into_sql(),
            ),
            Entity::AggregateFunction { args } => DropStatement::new(
                ObjectKind::AggregateFunction,
                format!("DROP {} {}({}) CASCADE", self.aggregate_keyword, name(), args),
            ),
            Entity::ScalarFunction { args } => DropStatement::new(
                ObjectKind::ScalarFunction,
                format!("DROP FUNCTION {}({}) CASCADE", name(), args),
            ),
            Entity::Procedure { args } => DropStatement::new(
                ObjectKind::Procedure,
                format!("DROP PROCEDURE {}({})", name(), args),
            ),
        }
    }
}

/// Plans with [`CleanupPlanner::redshift`].
pub fn plan_cleanup<I>(schema: &SchemaRef, rows: I) -> Result<Vec<DropStatement>>
where
    I: IntoIterator<Item = CatalogRow>,
{
    CleanupPlanner::redshift().plan(schema, rows)
}
