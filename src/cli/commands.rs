//! CLI command implementations
//!
//! Every command prints exactly one JSON envelope on stdout. Errors are
//! printed as an error envelope and returned so the process exits non-zero.

use std::path::Path;

use serde_json::{json, Value as Json};
use tracing::debug;

use super::args::Command;
use super::errors::CliResult;
use super::io::{read_request, write_error, write_response};
use super::schema::{decode_envelope, Schema};
use crate::compiler::Compiler;
use crate::config::SearchConfig;
use crate::dialect::{renderer_for, Dialect, RenderOptions};
use crate::paging::{CountStrategy, PageRequest};

/// Parse arguments and run the command
pub fn run() -> CliResult<()> {
    let cli = super::args::Cli::parse_args();
    run_command(cli.command)
}

/// Run the appropriate command based on CLI args
pub fn run_command(cmd: Command) -> CliResult<()> {
    let result = match cmd {
        Command::Render {
            schema,
            dialect,
            config,
        } => read_request()
            .and_then(|envelope| render(&schema, &dialect, config.as_deref(), &envelope)),
        Command::Paging {
            page,
            size,
            first,
            total,
            received,
        } => Ok(paging(page, size, first, total.zip(received))),
    };

    match result {
        Ok(data) => write_response(data),
        Err(err) => {
            write_error(err.code_str(), err.message())?;
            Err(err)
        }
    }
}

/// Compile `envelope` against the schema and render it for `dialect`.
pub fn render(
    schema_path: &Path,
    dialect: &str,
    config_path: Option<&Path>,
    envelope: &Json,
) -> CliResult<Json> {
    let config = match config_path {
        Some(path) => SearchConfig::load(path)?,
        None => SearchConfig::default(),
    };
    let schema = Schema::load(schema_path)?;
    render_with(&schema, dialect, &config, envelope)
}

pub(crate) fn render_with(
    schema: &Schema,
    dialect: &str,
    config: &SearchConfig,
    envelope: &Json,
) -> CliResult<Json> {
    let filter = schema.descriptors()?;
    let result = schema.result_descriptors()?;
    let result = result.as_ref().unwrap_or(&filter);

    let (values, controls) = decode_envelope(&filter, envelope)?;
    let compiler = Compiler::new(&filter).with_result(result);
    let effective = compiler.effective_controls(&values, &controls);
    let query = compiler.compile(&values, &controls, &schema.source)?;

    let dialect = Dialect::resolve(dialect, config.fallback_to_generic_sql)?;
    let renderer = renderer_for(
        dialect,
        RenderOptions {
            case_insensitive: config.case_insensitive,
        },
    );

    let page = PageRequest::from_controls(&effective, config.default_page_size, config.max_page_size);
    let strategy = match renderer.count_strategy(config.count_mode) {
        CountStrategy::Windowed if page.is_unbounded() => CountStrategy::Separate,
        strategy => strategy,
    };
    let window = page.window(strategy, effective.next_page_token.clone());
    let native = renderer.render(&query, &window, strategy)?;
    let count = if strategy == CountStrategy::Separate && !page.is_unbounded() {
        Some(renderer.render_count(&query)?)
    } else {
        None
    };

    debug!(
        dialect = %dialect,
        predicates = query.predicates.len(),
        parameters = query.parameters.len(),
        "rendered"
    );

    Ok(json!({
        "dialect": dialect.name(),
        "page": page,
        "window": window,
        "countStrategy": strategy,
        "query": native,
        "count": count
    }))
}

/// Offset/limit for a page; with `(total, received)` also whether it is
/// the last page.
pub fn paging(page_index: u64, page_size: u64, first: Option<u64>, totals: Option<(u64, u64)>) -> Json {
    let page = PageRequest::new(page_index, page_size).with_first_page_size(first.unwrap_or(0));
    let mut data = json!({
        "pageIndex": page.page_index,
        "offset": page.offset(),
        "limit": page.limit()
    });
    if let Some((total, received)) = totals {
        data["receivedItems"] = json!(page.received_items(received));
        data["isLastPage"] = json!(page.is_last_page(total, received));
    }
    data
}
