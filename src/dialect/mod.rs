//! # Dialect Renderers
//!
//! Stateless renderers that turn a [`CompiledQuery`] plus a [`PageWindow`]
//! into a backend's [`NativeQuery`]. Renderers never reorder predicates, so
//! placeholder order always matches the compiled parameter order.

mod dynamodb;
mod elasticsearch;
mod errors;
mod firestore;
mod mongo;
mod native;
mod placeholder;
mod sql;

use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};
use tracing::warn;

use crate::compiler::CompiledQuery;
use crate::config::CountMode;
use crate::paging::{CountStrategy, PageWindow};

pub use dynamodb::DynamoDbRenderer;
pub use elasticsearch::ElasticsearchRenderer;
pub use errors::{DialectError, DialectResult};
pub use firestore::FirestoreRenderer;
pub use mongo::MongoRenderer;
pub use native::{
    DocumentOperation, DocumentQuery, ExpressionQuery, NativeQuery, SearchRequest, SqlStatement,
    StructuredQuery,
};
pub use placeholder::{PlaceholderStyle, Placeholders};
pub use sql::SqlRenderer;

/// Supported backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dialect {
    Postgres,
    MySql,
    Sqlite,
    Oracle,
    MsSql,
    Hive,
    Cassandra,
    Mongo,
    DynamoDb,
    Elasticsearch,
    Firestore,
    GenericSql,
}

impl Dialect {
    pub const ALL: [Dialect; 12] = [
        Dialect::Postgres,
        Dialect::MySql,
        Dialect::Sqlite,
        Dialect::Oracle,
        Dialect::MsSql,
        Dialect::Hive,
        Dialect::Cassandra,
        Dialect::Mongo,
        Dialect::DynamoDb,
        Dialect::Elasticsearch,
        Dialect::Firestore,
        Dialect::GenericSql,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Dialect::Postgres => "postgres",
            Dialect::MySql => "mysql",
            Dialect::Sqlite => "sqlite",
            Dialect::Oracle => "oracle",
            Dialect::MsSql => "mssql",
            Dialect::Hive => "hive",
            Dialect::Cassandra => "cassandra",
            Dialect::Mongo => "mongo",
            Dialect::DynamoDb => "dynamodb",
            Dialect::Elasticsearch => "elasticsearch",
            Dialect::Firestore => "firestore",
            Dialect::GenericSql => "generic",
        }
    }

    /// Match a dialect name or a common alias, ignoring case.
    pub fn from_name(name: &str) -> Option<Dialect> {
        let dialect = match name.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" | "pg" => Dialect::Postgres,
            "mysql" | "mariadb" => Dialect::MySql,
            "sqlite" | "sqlite3" => Dialect::Sqlite,
            "oracle" | "godror" => Dialect::Oracle,
            "mssql" | "sqlserver" => Dialect::MsSql,
            "hive" => Dialect::Hive,
            "cassandra" | "cql" => Dialect::Cassandra,
            "mongo" | "mongodb" => Dialect::Mongo,
            "dynamodb" | "dynamo" => Dialect::DynamoDb,
            "elasticsearch" | "elastic" | "es" => Dialect::Elasticsearch,
            "firestore" | "firebase" => Dialect::Firestore,
            "generic" | "sql" => Dialect::GenericSql,
            _ => return None,
        };
        Some(dialect)
    }

    /// Resolve a name, falling back to generic SQL when allowed.
    pub fn resolve(name: &str, fallback_to_generic_sql: bool) -> DialectResult<Dialect> {
        match Dialect::from_name(name) {
            Some(dialect) => Ok(dialect),
            None if fallback_to_generic_sql => {
                warn!(dialect = name, "no renderer for dialect, using generic SQL");
                Ok(Dialect::GenericSql)
            }
            None => Err(DialectError::Unsupported(name.to_string())),
        }
    }

    pub fn placeholder_style(&self) -> PlaceholderStyle {
        match self {
            Dialect::Postgres => PlaceholderStyle::Dollar,
            Dialect::Oracle => PlaceholderStyle::Named,
            Dialect::MsSql => PlaceholderStyle::At,
            _ => PlaceholderStyle::Positional,
        }
    }

    /// Renders to SQL or CQL text.
    pub fn is_textual(&self) -> bool {
        !matches!(
            self,
            Dialect::Mongo | Dialect::DynamoDb | Dialect::Elasticsearch | Dialect::Firestore
        )
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Serialize for Dialect {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

impl FromStr for Dialect {
    type Err = DialectError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Dialect::from_name(s).ok_or_else(|| DialectError::Unsupported(s.to_string()))
    }
}

/// Renderer settings taken from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    pub case_insensitive: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            case_insensitive: true,
        }
    }
}

/// A backend's renderer.
pub trait QueryRenderer: Send + Sync + fmt::Debug {
    fn dialect(&self) -> Dialect;

    /// How this backend obtains totals under `mode`.
    fn count_strategy(&self, mode: CountMode) -> CountStrategy;

    /// Render the page query.
    fn render(
        &self,
        query: &CompiledQuery,
        window: &PageWindow,
        strategy: CountStrategy,
    ) -> DialectResult<NativeQuery>;

    /// Render the separate count query.
    fn render_count(&self, query: &CompiledQuery) -> DialectResult<NativeQuery>;
}

/// The renderer for `dialect`.
pub fn renderer_for(dialect: Dialect, options: RenderOptions) -> Box<dyn QueryRenderer> {
    match dialect {
        Dialect::Mongo => Box::new(MongoRenderer::new(options)),
        Dialect::DynamoDb => Box::new(DynamoDbRenderer::new()),
        Dialect::Elasticsearch => Box::new(ElasticsearchRenderer::new(options)),
        Dialect::Firestore => Box::new(FirestoreRenderer::new()),
        textual => Box::new(SqlRenderer::new(textual, options)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_round_trip() {
        for dialect in Dialect::ALL {
            assert_eq!(Dialect::from_name(dialect.name()), Some(dialect));
        }
        assert_eq!(Dialect::from_name("PostgreSQL"), Some(Dialect::Postgres));
        assert_eq!("es".parse::<Dialect>().unwrap(), Dialect::Elasticsearch);
    }

    #[test]
    fn test_resolve_fallback() {
        assert_eq!(
            Dialect::resolve("firebird", true).unwrap(),
            Dialect::GenericSql
        );
        let err = Dialect::resolve("firebird", false).unwrap_err();
        assert_eq!(err, DialectError::Unsupported("firebird".into()));
        assert_eq!(err.code(), "SIFT_DIALECT_UNSUPPORTED");
    }

    #[test]
    fn test_renderer_for_every_dialect() {
        for dialect in Dialect::ALL {
            assert_eq!(renderer_for(dialect, RenderOptions::default()).dialect(), dialect);
        }
    }
}
