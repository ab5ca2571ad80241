//! SQL and CQL text rendering.
//!
//! One renderer covers every textual dialect; they differ only in
//! placeholder style, pattern operator, and paging syntax:
//!
//! | dialect   | paging                                   | pattern       |
//! |-----------|------------------------------------------|---------------|
//! | postgres  | `LIMIT n OFFSET m`                       | `ILIKE`       |
//! | oracle    | `OFFSET m ROWS FETCH NEXT n ROWS ONLY`   | `LIKE`        |
//! | mssql     | `OFFSET m ROWS FETCH NEXT n ROWS ONLY`   | `LIKE`        |
//! | hive      | `limit n offset m`                       | `LIKE`        |
//! | cassandra | driver page size and page state          | `LIKE`        |
//! | others    | `LIMIT n OFFSET m`                       | `LIKE`        |

use super::errors::DialectResult;
use super::native::{NativeQuery, SqlStatement};
use super::placeholder::Placeholders;
use super::{Dialect, QueryRenderer, RenderOptions};
use crate::compiler::{Comparison, CompiledQuery, Operator, Predicate, Projection};
use crate::config::CountMode;
use crate::paging::{count_sql_as, decode_token, CountStrategy, PageWindow, TOTAL_COLUMN};

#[derive(Debug, Clone)]
pub struct SqlRenderer {
    dialect: Dialect,
    options: RenderOptions,
}

/// Name that qualifies the source's columns: its alias when it has one.
fn qualifier(source: &str) -> &str {
    source.split_whitespace().last().unwrap_or(source)
}

impl SqlRenderer {
    pub fn new(dialect: Dialect, options: RenderOptions) -> Self {
        Self { dialect, options }
    }

    fn like(&self) -> &'static str {
        if self.dialect == Dialect::Postgres && self.options.case_insensitive {
            "ILIKE"
        } else {
            "LIKE"
        }
    }

    fn comparison(&self, c: &Comparison, ph: &mut Placeholders) -> String {
        match c.op {
            Operator::Eq => format!("{} = {}", c.field, ph.next()),
            Operator::Gt => format!("{} > {}", c.field, ph.next()),
            Operator::Gte => format!("{} >= {}", c.field, ph.next()),
            Operator::Lt => format!("{} < {}", c.field, ph.next()),
            Operator::Lte => format!("{} <= {}", c.field, ph.next()),
            Operator::In => format!("{} IN ({})", c.field, ph.list(c.values.len())),
            Operator::NotIn => format!("{} NOT IN ({})", c.field, ph.list(c.values.len())),
            Operator::Like(_) => format!("{} {} {}", c.field, self.like(), ph.next()),
        }
    }

    fn predicate(&self, p: &Predicate, ph: &mut Placeholders) -> String {
        match p {
            Predicate::Compare(c) => self.comparison(c, ph),
            Predicate::AnyOf(group) => {
                let parts: Vec<String> = group.iter().map(|c| self.comparison(c, ph)).collect();
                format!("({})", parts.join(" OR "))
            }
        }
    }

    /// `SELECT … FROM … WHERE … ORDER BY …` without paging.
    fn select(&self, query: &CompiledQuery, windowed: bool, ph: &mut Placeholders) -> String {
        let mut sql = String::from("SELECT ");
        if query.distinct {
            sql.push_str("DISTINCT ");
        }
        if windowed {
            sql.push_str(&format!("count(*) over() AS {}, ", TOTAL_COLUMN));
        }
        match &query.projection {
            Projection::All if windowed => sql.push_str(&format!("{}.*", qualifier(&query.source))),
            Projection::All => sql.push('*'),
            Projection::Columns(columns) => sql.push_str(&columns.join(", ")),
        }
        sql.push_str(" FROM ");
        sql.push_str(&query.source);
        for join in &query.joins {
            sql.push(' ');
            sql.push_str(join);
        }

        if query.has_predicates() {
            let conditions: Vec<String> = query
                .predicates
                .iter()
                .map(|p| self.predicate(p, ph))
                .collect();
            sql.push_str(" WHERE ");
            sql.push_str(&conditions.join(" AND "));
        }

        if !query.sort.is_empty() {
            let keys: Vec<String> = query
                .sort
                .iter()
                .map(|k| format!("{} {}", k.column, k.direction.as_str().to_uppercase()))
                .collect();
            sql.push_str(" ORDER BY ");
            sql.push_str(&keys.join(", "));
        }
        sql
    }

    fn paging(&self, sql: &mut String, query: &CompiledQuery, offset: u64, limit: u64) {
        match self.dialect {
            Dialect::Oracle | Dialect::MsSql => {
                if self.dialect == Dialect::MsSql && query.sort.is_empty() {
                    sql.push_str(" ORDER BY (SELECT NULL)");
                }
                sql.push_str(&format!(" OFFSET {} ROWS FETCH NEXT {} ROWS ONLY", offset, limit));
            }
            Dialect::Hive => sql.push_str(&format!(" limit {} offset {}", limit, offset)),
            _ => sql.push_str(&format!(" LIMIT {} OFFSET {}", limit, offset)),
        }
    }

    /// Alias clause for a wrapped count subquery.
    fn derived_alias(&self) -> &'static str {
        match self.dialect {
            Dialect::Oracle => "main",
            _ => "AS main",
        }
    }

    fn allow_filtering(&self, sql: &mut String, query: &CompiledQuery) {
        if self.dialect == Dialect::Cassandra && query.has_predicates() {
            sql.push_str(" ALLOW FILTERING");
        }
    }
}

impl QueryRenderer for SqlRenderer {
    fn dialect(&self) -> Dialect {
        self.dialect
    }

    fn count_strategy(&self, mode: CountMode) -> CountStrategy {
        match (self.dialect, mode) {
            (Dialect::Cassandra, _) => CountStrategy::Cursor,
            (_, CountMode::Separate) => CountStrategy::Separate,
            (_, CountMode::Windowed) => CountStrategy::Windowed,
            (Dialect::Oracle, CountMode::Auto) => CountStrategy::Windowed,
            (_, CountMode::Auto) => CountStrategy::Separate,
        }
    }

    fn render(
        &self,
        query: &CompiledQuery,
        window: &PageWindow,
        strategy: CountStrategy,
    ) -> DialectResult<NativeQuery> {
        let mut ph = Placeholders::new(self.dialect.placeholder_style());
        let windowed = strategy == CountStrategy::Windowed;
        let mut text = self.select(query, windowed, &mut ph);
        let mut statement = SqlStatement::new(String::new(), query.parameters.clone());

        match window {
            PageWindow::All => {}
            PageWindow::Offset { offset, limit } => self.paging(&mut text, query, *offset, *limit),
            PageWindow::Cursor { limit, token } => {
                statement.page_size = *limit;
                statement.page_state = decode_token(token.as_deref())?;
            }
        }
        self.allow_filtering(&mut text, query);

        statement.text = text;
        Ok(NativeQuery::Sql(statement))
    }

    fn render_count(&self, query: &CompiledQuery) -> DialectResult<NativeQuery> {
        let mut ph = Placeholders::new(self.dialect.placeholder_style());
        let mut text = count_sql_as(&self.select(query, false, &mut ph), self.derived_alias());
        self.allow_filtering(&mut text, query);
        Ok(NativeQuery::Sql(SqlStatement::new(
            text,
            query.parameters.clone(),
        )))
    }
}
