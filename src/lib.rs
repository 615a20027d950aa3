//! Schema cleaning for Redshift-flavoured PostgreSQL engines.
//!
//! The core is [`planner`], which turns catalog metadata into an ordered list
//! of DROP statements. [`schema`] wires it to a host-provided
//! [`Connection`](catalog::Connection) together with the rest of the schema
//! lifecycle, and [`snapshot`] plans from JSON catalog captures instead of a
//! live database.

pub mod catalog;
pub mod dialect;
pub mod error;
pub mod logging;
pub mod objects;
pub mod planner;
pub mod quote;
pub mod schema;
pub mod snapshot;

pub use catalog::{CatalogReader, Connection, ConnectionCatalog, Row};
pub use dialect::Dialect;
pub use error::{ConnectionError, Error, Result};
pub use objects::{CatalogObject, CatalogRow, DropStatement, Entity, ObjectKind, SchemaRef};
pub use planner::{plan_cleanup, CascadeTableDropper, CleanupPlanner, TableDropper};
pub use quote::{DoubleQuote, NameQuoter};
pub use schema::{execute_plan, CleanReport, Schema, SchemaResource, StatementExecutor};
pub use snapshot::{load_snapshots, write_plans, SchemaSnapshot, SnapshotCatalog};
