use crate::objects::SchemaRef;
use crate::quote::{DoubleQuote, NameQuoter};

/// The SQL one engine needs to inspect and manage a schema.
///
/// Queries take positional `$n` parameters. Listing queries return the
/// object name, the routine argument signature where there is one, and
/// whether an extension owns the object (`pg_depend.deptype = 'e'`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dialect {
    pub name: &'static str,
    /// `$1` schema name; one row, one count column.
    pub schema_exists: &'static str,
    /// `$1` schema name; one row, one boolean column.
    pub schema_has_objects: &'static str,
    /// `$1` schema name; rows of `(relname, extension_owned)`.
    pub views: &'static str,
    /// `$1` schema name; rows of `(table_name, extension_owned)`.
    pub tables: &'static str,
    /// `$1` kind code (`a`, `f` or `p`), `$2` schema name; rows of
    /// `(proname, args, extension_owned)`.
    pub routines: &'static str,
    /// Object type an aggregate is dropped as.
    pub drop_aggregate: &'static str,
}

impl Dialect {
    pub const REDSHIFT: Dialect = Dialect {
        name: "redshift",
        schema_exists: "SELECT COUNT(*) FROM pg_namespace WHERE nspname = $1",
        schema_has_objects: "SELECT EXISTS (SELECT 1 \
             FROM pg_catalog.pg_class c \
             JOIN pg_catalog.pg_namespace n ON n.oid = c.relnamespace \
             WHERE n.nspname = $1)",
        views: "SELECT c.relname, dep.objid IS NOT NULL \
             FROM pg_catalog.pg_class c \
             JOIN pg_namespace n ON n.oid = c.relnamespace \
             LEFT JOIN pg_depend dep ON dep.objid = c.oid AND dep.deptype = 'e' \
             WHERE c.relkind = 'v' AND n.nspname = $1",
        // Child tables are left out, they go with their parent.
        tables: "SELECT t.table_name, EXISTS (SELECT 1 \
             FROM pg_catalog.pg_class c \
             JOIN pg_namespace n ON n.oid = c.relnamespace \
             JOIN pg_depend dep ON dep.objid = c.oid AND dep.deptype = 'e' \
             WHERE n.nspname = t.table_schema AND c.relname = t.table_name) \
             FROM information_schema.tables t \
             WHERE t.table_schema = $1 AND t.table_type = 'BASE TABLE'",
        routines: "SELECT proname, oidvectortypes(proargtypes), dep.objid IS NOT NULL \
             FROM pg_proc_info \
             INNER JOIN pg_namespace ns ON (pg_proc_info.pronamespace = ns.oid) \
             LEFT JOIN pg_depend dep ON dep.objid = pg_proc_info.prooid AND dep.deptype = 'e' \
             WHERE pg_proc_info.prokind = $1 AND ns.nspname = $2",
        drop_aggregate: "FUNCTION",
    };

    /// Plain PostgreSQL 11+, where routines live in `pg_proc`.
    pub const POSTGRES: Dialect = Dialect {
        name: "postgres",
        routines: "SELECT p.proname, oidvectortypes(p.proargtypes), dep.objid IS NOT NULL \
             FROM pg_proc p \
             INNER JOIN pg_namespace ns ON (p.pronamespace = ns.oid) \
             LEFT JOIN pg_depend dep ON dep.objid = p.oid AND dep.deptype = 'e' \
             WHERE p.prokind = $1 AND ns.nspname = $2",
        // PostgreSQL refuses DROP FUNCTION on an aggregate.
        drop_aggregate: "AGGREGATE",
        ..Dialect::REDSHIFT
    };

    pub fn create_schema(&self, schema: &SchemaRef) -> String {
        format!("CREATE SCHEMA {}", self.quote(schema.name(), None))
    }

    pub fn drop_schema(&self, schema: &SchemaRef) -> String {
        format!("DROP SCHEMA {} CASCADE", self.quote(schema.name(), None))
    }
}

impl NameQuoter for Dialect {
    fn quote_identifier(&self, identifier: &str) -> String {
        DoubleQuote.quote_identifier(identifier)
    }
}
