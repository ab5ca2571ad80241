//! Search pipeline: compile, render, execute, materialize, page.

use std::marker::PhantomData;
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, warn};

use super::errors::{CountError, SearchError, SearchResult};
use super::executor::{Executor, RowSet};
use crate::compiler::{CompiledQuery, Compiler};
use crate::config::SearchConfig;
use crate::descriptor::{DescriptorCache, DescriptorSet};
use crate::dialect::{renderer_for, Dialect, NativeQuery, QueryRenderer, RenderOptions};
use crate::filter::{FilterEnvelope, SearchFilter};
use crate::materialize::{materialize, ColumnIndex, SearchRecord};
use crate::paging::{encode_token, CountStrategy, PageRequest};

/// One page of results.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageResult<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub is_last_page: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_page_token: Option<String>,
}

type Mapper<T> = Arc<dyn Fn(T) -> T + Send + Sync>;

/// Runs filter envelopes of type `F` against one source, producing `T`s.
pub struct Searcher<F, T, E> {
    executor: E,
    source: String,
    config: SearchConfig,
    renderer: Box<dyn QueryRenderer>,
    filter: Arc<DescriptorSet>,
    result: Arc<DescriptorSet>,
    columns: ColumnIndex,
    distinct: bool,
    mapper: Option<Mapper<T>>,
    _filter: PhantomData<fn(&F)>,
}

impl<F, T, E> Searcher<F, T, E>
where
    F: SearchFilter,
    T: SearchRecord,
    E: Executor,
{
    pub fn new(
        executor: E,
        source: impl Into<String>,
        config: SearchConfig,
        cache: &DescriptorCache,
    ) -> SearchResult<Self> {
        config.validate()?;
        let dialect = Dialect::resolve(&config.dialect, config.fallback_to_generic_sql)?;
        let filter = cache.resolve::<F>()?;
        let result = cache.resolve::<T>()?;

        // Search hits carry their id outside the document body.
        if dialect == Dialect::Elasticsearch {
            result.require_primary_key()?;
        }

        let renderer = renderer_for(
            dialect,
            RenderOptions {
                case_insensitive: config.case_insensitive,
            },
        );
        let columns = ColumnIndex::build(&result, dialect == Dialect::Oracle);

        Ok(Self {
            executor,
            source: source.into(),
            config,
            renderer,
            filter,
            result,
            columns,
            distinct: false,
            mapper: None,
            _filter: PhantomData,
        })
    }

    /// Post-process every materialized item.
    pub fn with_mapper(mut self, mapper: impl Fn(T) -> T + Send + Sync + 'static) -> Self {
        self.mapper = Some(Arc::new(mapper));
        self
    }

    /// Select distinct rows. Distinct queries are counted separately.
    pub fn distinct(mut self, distinct: bool) -> Self {
        self.distinct = distinct;
        self
    }

    pub fn dialect(&self) -> Dialect {
        self.renderer.dialect()
    }

    /// Storage name of the result type's primary key, if any.
    pub fn id_column(&self) -> Option<&str> {
        self.result.primary_key().map(|f| f.storage_name.as_str())
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }

    /// Compile an envelope without executing it.
    pub fn compile(&self, envelope: &FilterEnvelope<F>) -> SearchResult<CompiledQuery> {
        let query = Compiler::new(&self.filter)
            .with_result(&self.result)
            .compile_envelope(envelope, &self.source)?;
        Ok(query.with_distinct(self.distinct))
    }

    fn strategy(&self, page: &PageRequest) -> CountStrategy {
        match self.renderer.count_strategy(self.config.count_mode) {
            CountStrategy::Windowed if self.distinct || page.is_unbounded() => CountStrategy::Separate,
            strategy => strategy,
        }
    }

    /// Run one search.
    pub async fn search(&self, envelope: &FilterEnvelope<F>) -> SearchResult<PageResult<T>> {
        let compiler = Compiler::new(&self.filter).with_result(&self.result);
        let values = envelope.filter.values();
        let controls = compiler.effective_controls(&values, &envelope.controls);
        let query = compiler
            .compile(&values, &envelope.controls, &self.source)?
            .with_distinct(self.distinct);

        let page = PageRequest::from_controls(
            &controls,
            self.config.default_page_size,
            self.config.max_page_size,
        );
        let strategy = self.strategy(&page);
        let window = page.window(strategy, controls.next_page_token.clone());
        let native = self.renderer.render(&query, &window, strategy)?;

        debug!(
            dialect = %self.dialect(),
            source = %self.source,
            predicates = query.predicates.len(),
            parameters = query.parameters.len(),
            page_index = page.page_index,
            page_size = page.page_size,
            strategy = ?strategy,
            "executing search"
        );

        let (rows, counted) = if strategy == CountStrategy::Separate && !page.is_unbounded() {
            let count_query = self.renderer.render_count(&query)?;
            self.fetch_and_count(&native, &count_query).await?
        } else {
            let rows = self
                .executor
                .fetch(&native)
                .await
                .map_err(SearchError::Execution)?;
            (rows, None)
        };

        let RowSet {
            rows,
            total: reported,
            next_cursor,
        } = rows;
        let materialized = materialize::<T>(rows, &self.columns, strategy == CountStrategy::Windowed)?;
        let items: Vec<T> = match &self.mapper {
            Some(mapper) => materialized.items.into_iter().map(|item| mapper(item)).collect(),
            None => materialized.items,
        };
        let received = items.len() as u64;

        let result = match strategy {
            CountStrategy::Cursor => PageResult {
                total: received,
                is_last_page: next_cursor.is_none(),
                next_page_token: next_cursor.as_deref().map(encode_token),
                items,
            },
            _ if page.is_unbounded() => {
                // A store that caps unbounded reads still reports the full total.
                let total = match strategy {
                    CountStrategy::Inline => reported.map_or(received, |t| t.max(received)),
                    _ => received,
                };
                if total > received {
                    warn!(
                        dialect = %self.dialect(),
                        received,
                        total,
                        "unbounded search truncated by the store"
                    );
                }
                PageResult {
                    is_last_page: received >= total,
                    total,
                    next_page_token: None,
                    items,
                }
            }
            _ => {
                let total = match strategy {
                    CountStrategy::Windowed => materialized.total.unwrap_or(0),
                    CountStrategy::Inline => reported.unwrap_or(0),
                    _ => counted.unwrap_or(0),
                };
                PageResult {
                    is_last_page: page.is_last_page(total, received),
                    total,
                    next_page_token: None,
                    items,
                }
            }
        };

        debug!(
            items = result.items.len(),
            total = result.total,
            is_last_page = result.is_last_page,
            "search complete"
        );
        Ok(result)
    }

    /// Issue the page and count queries together. A count failure is
    /// recovered as a total of 0.
    async fn fetch_and_count(
        &self,
        native: &NativeQuery,
        count_query: &NativeQuery,
    ) -> SearchResult<(RowSet, Option<u64>)> {
        let (fetched, counted) = futures_util::join!(
            self.executor.fetch(native),
            self.executor.count(count_query)
        );
        let rows = fetched.map_err(SearchError::Execution)?;

        let total = match counted {
            Ok(total) => total,
            Err(source) => {
                let err = CountError { source };
                warn!(code = err.code(), error = %err, "count failed, reporting total 0");
                0
            }
        };
        Ok((rows, Some(total)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_result_serialization() {
        let page = PageResult {
            items: vec![1, 2],
            total: 7,
            is_last_page: false,
            next_page_token: None,
        };
        assert_eq!(
            serde_json::to_value(&page).unwrap(),
            serde_json::json!({"items": [1, 2], "total": 7, "isLastPage": false})
        );
    }
}
