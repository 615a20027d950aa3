use std::fmt;

use enum_kinds::EnumKind;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// The schema a planning or lifecycle operation targets.
///
/// Holds the raw name; quoting is left to a [`NameQuoter`](crate::quote::NameQuoter).
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Clone, Hash)]
pub struct SchemaRef {
    name: String,
}

impl SchemaRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for SchemaRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// A catalog row as a reader or snapshot hands it over, before validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogRow {
    pub name: String,
    pub kind: String,
    #[serde(default)]
    pub args: String,
    #[serde(default)]
    pub extension_owned: bool,
}

impl CatalogRow {
    pub fn new(name: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: kind.into(),
            args: String::new(),
            extension_owned: false,
        }
    }

    pub fn with_args(mut self, args: impl Into<String>) -> Self {
        self.args = args.into();
        self
    }

    pub fn extension_owned(mut self, owned: bool) -> Self {
        self.extension_owned = owned;
        self
    }
}

/// What a catalog object is. Routines carry their argument signature as the
/// catalog prints it (`oidvectortypes`), e.g. `integer, text`.
///
/// The variant order of the derived [`ObjectKind`] is the drop order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, EnumKind)]
#[enum_kind(ObjectKind, derive(PartialOrd, Ord, Hash))]
pub enum Entity {
    View,
    Table,
    AggregateFunction { args: String },
    ScalarFunction { args: String },
    Procedure { args: String },
}

impl ObjectKind {
    pub const ALL: [ObjectKind; 5] = [
        ObjectKind::View,
        ObjectKind::Table,
        ObjectKind::AggregateFunction,
        ObjectKind::ScalarFunction,
        ObjectKind::Procedure,
    ];

    /// Accepts the single-letter catalog codes (`relkind`, `prokind`) as well
    /// as spelled-out names.
    pub fn parse(kind: &str) -> Option<ObjectKind> {
        let kind = kind.trim();
        let parsed = match kind {
            "v" => ObjectKind::View,
            "r" => ObjectKind::Table,
            "a" => ObjectKind::AggregateFunction,
            "f" => ObjectKind::ScalarFunction,
            "p" => ObjectKind::Procedure,
            _ => match kind.to_ascii_lowercase().as_str() {
                "view" => ObjectKind::View,
                "table" => ObjectKind::Table,
                "aggregate" | "aggregate_function" => ObjectKind::AggregateFunction,
                "function" | "scalar_function" => ObjectKind::ScalarFunction,
                "procedure" => ObjectKind::Procedure,
                _ => return None,
            },
        };
        Some(parsed)
    }

    /// Catalog code used by the catalog queries for this kind.
    pub fn code(self) -> &'static str {
        match self {
            ObjectKind::View => "v",
            ObjectKind::Table => "r",
            ObjectKind::AggregateFunction => "a",
            ObjectKind::ScalarFunction => "f",
            ObjectKind::Procedure => "p",
        }
    }

    pub fn is_routine(self) -> bool {
        matches!(
            self,
            ObjectKind::AggregateFunction | ObjectKind::ScalarFunction | ObjectKind::Procedure
        )
    }
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ObjectKind::View => "view",
            ObjectKind::Table => "table",
            ObjectKind::AggregateFunction => "aggregate function",
            ObjectKind::ScalarFunction => "function",
            ObjectKind::Procedure => "procedure",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CatalogObject {
    pub name: String,
    pub entity: Entity,
    pub extension_owned: bool,
}

impl CatalogObject {
    pub fn new(name: impl Into<String>, entity: Entity) -> Self {
        Self {
            name: name.into(),
            entity,
            extension_owned: false,
        }
    }

    pub fn view(name: impl Into<String>) -> Self {
        Self::new(name, Entity::View)
    }

    pub fn table(name: impl Into<String>) -> Self {
        Self::new(name, Entity::Table)
    }

    pub fn aggregate(name: impl Into<String>, args: impl Into<String>) -> Self {
        Self::new(name, Entity::AggregateFunction { args: args.into() })
    }

    pub fn function(name: impl Into<String>, args: impl Into<String>) -> Self {
        Self::new(name, Entity::ScalarFunction { args: args.into() })
    }

    pub fn procedure(name: impl Into<String>, args: impl Into<String>) -> Self {
        Self::new(name, Entity::Procedure { args: args.into() })
    }

    pub fn extension_owned(mut self, owned: bool) -> Self {
        self.extension_owned = owned;
        self
    }

    pub fn kind(&self) -> ObjectKind {
        ObjectKind::from(&self.entity)
    }

    /// Empty for views and tables.
    pub fn argument_signature(&self) -> &str {
        match &self.entity {
            Entity::View | Entity::Table => "",
            Entity::AggregateFunction { args }
            | Entity::ScalarFunction { args }
            | Entity::Procedure { args } => args,
        }
    }
}

impl TryFrom<CatalogRow> for CatalogObject {
    type Error = Error;

    fn try_from(row: CatalogRow) -> Result<Self> {
        let kind = match ObjectKind::parse(&row.kind) {
            Some(kind) => kind,
            None => {
                return Err(Error::InvalidObjectKind {
                    name: row.name,
                    kind: row.kind,
                })
            }
        };
        let args = row.args;
        let entity = match kind {
            ObjectKind::View => Entity::View,
            ObjectKind::Table => Entity::Table,
            ObjectKind::AggregateFunction => Entity::AggregateFunction { args },
            ObjectKind::ScalarFunction => Entity::ScalarFunction { args },
            ObjectKind::Procedure => Entity::Procedure { args },
        };
        Ok(CatalogObject {
            name: row.name,
            entity,
            extension_owned: row.extension_owned,
        })
    }
}

/// A rendered DDL statement and the tier it was planned in.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DropStatement {
    tier: ObjectKind,
    sql: String,
}

impl DropStatement {
    pub fn new(tier: ObjectKind, sql: impl Into<String>) -> Self {
        Self {
            tier,
            sql: sql.into(),
        }
    }

    pub fn tier(&self) -> ObjectKind {
        self.tier
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn into_sql(self) -> String {
        self.sql
    }
}

impl fmt::Display for DropStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.sql)
    }
}
