//! Table renderer
//!
//! A pure derivation from configuration, query, fetch state and expansion
//! state to a [`TableView`]. Nothing here mutates state or performs I/O.

use super::column::Alignment;
use super::config::TableConfig;
use super::expansion::ExpansionManager;
use super::expansion::ExpansionSource;
use super::fetcher::FetchState;
use super::pagination::PaginationView;
use super::query::QueryState;
use crate::model::Row;

/// The kind of a header column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderKind {
    /// The narrow leading column holding expand toggles.
    Toggle,
    /// A data column.
    Data,
    /// The trailing actions column.
    Actions,
}

/// One header cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderCell {
    pub kind: HeaderKind,
    pub label: String,
    pub align: Alignment,
    pub width: Option<String>,
}

/// One rendered data cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedCell {
    /// Key of the column this cell belongs to.
    pub key: String,
    pub content: String,
    pub align: Alignment,
}

/// The nested region of an expanded row.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpansionView<S> {
    pub sub_data: Option<S>,
    pub loading: bool,
    pub error: Option<String>,
    /// Columns spanned by the region (data columns plus actions).
    pub column_span: usize,
}

/// One rendered table line with its optional expanded region.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedRow<S> {
    /// Row key used for identity and expansion.
    pub key: String,
    /// Position on the current page.
    pub index: usize,
    /// Whether the row gets the striped background.
    pub striped: bool,
    /// Expand toggle state. `None` when the row has no toggle.
    pub toggle: Option<bool>,
    pub cells: Vec<RenderedCell>,
    /// Action button labels.
    pub actions: Vec<String>,
    /// The expanded region, present only while the row is expanded.
    pub expansion: Option<ExpansionView<S>>,
}

/// The table body. The variants are checked in declaration order.
#[derive(Debug, Clone, PartialEq)]
pub enum TableBody<S> {
    /// Skeleton placeholder while a request is in flight.
    Loading {
        rows: usize,
        columns: usize,
        has_expandable: bool,
    },
    /// The last request failed; one row spanning all columns.
    Error(String),
    /// The result set is empty; one row spanning all columns.
    Empty(String),
    /// The rows of the current page.
    Rows(Vec<RenderedRow<S>>),
}

/// The search box.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchView {
    pub placeholder: Option<String>,
    /// The raw, possibly uncommitted, text.
    pub value: String,
}

/// Everything needed to draw a table.
#[derive(Debug, Clone, PartialEq)]
pub struct TableView<S> {
    pub title: Option<String>,
    pub search: Option<SearchView>,
    pub header: Vec<HeaderCell>,
    pub body: TableBody<S>,
    /// Total grid columns, including toggle and actions.
    pub column_span: usize,
    pub pagination: Option<PaginationView>,
}

/// Derives the visible grid.
pub fn render_table<R, S>(
    config: &TableConfig<R, S>,
    query: &QueryState,
    fetch: &FetchState<R>,
    expansion: &ExpansionManager<S>,
) -> TableView<S>
where
    R: Row,
    S: Clone + Send + Sync + 'static,
{
    TableView {
        title: config.title.clone(),
        search: config.search.enabled.then(|| SearchView {
            placeholder: config.search.placeholder.clone(),
            value: query.pending_search().to_string(),
        }),
        header: render_header(config),
        body: render_body(config, fetch, expansion),
        column_span: config.column_span(),
        pagination: PaginationView::derive(&config.pagination, query, fetch.meta.as_ref()),
    }
}

fn render_header<R: Row, S>(config: &TableConfig<R, S>) -> Vec<HeaderCell> {
    let mut header = Vec::with_capacity(config.column_span());

    if config.expandable.is_some() {
        header.push(HeaderCell {
            kind: HeaderKind::Toggle,
            label: String::new(),
            align: Alignment::Left,
            width: Some("40px".to_string()),
        });
    }

    header.extend(config.columns.iter().map(|column| HeaderCell {
        kind: HeaderKind::Data,
        label: column.label.clone(),
        align: column.resolved_align(config.default_align),
        width: column.width.clone(),
    }));

    if config.actions.is_some() {
        header.push(HeaderCell {
            kind: HeaderKind::Actions,
            label: "Actions".to_string(),
            align: Alignment::Right,
            width: Some("100px".to_string()),
        });
    }

    header
}

fn render_body<R, S>(
    config: &TableConfig<R, S>,
    fetch: &FetchState<R>,
    expansion: &ExpansionManager<S>,
) -> TableBody<S>
where
    R: Row,
    S: Clone + Send + Sync + 'static,
{
    if fetch.is_loading {
        return TableBody::Loading {
            rows: config.loading_rows,
            columns: config.columns.len(),
            has_expandable: config.expandable.is_some(),
        };
    }
    if let Some(error) = &fetch.error {
        return TableBody::Error(error.clone());
    }
    if fetch.data.is_empty() {
        return TableBody::Empty(config.empty_message.clone());
    }

    let rows = fetch
        .data
        .iter()
        .enumerate()
        .map(|(index, row)| render_row(config, expansion, row, index))
        .collect();
    TableBody::Rows(rows)
}

fn render_row<R, S>(
    config: &TableConfig<R, S>,
    expansion: &ExpansionManager<S>,
    row: &R,
    index: usize,
) -> RenderedRow<S>
where
    R: Row,
    S: Clone + Send + Sync + 'static,
{
    let key = config.row_key(row, index);

    let cells = config
        .columns
        .iter()
        .map(|column| RenderedCell {
            key: column.key.clone(),
            content: column.render_cell(row),
            align: column.resolved_align(config.default_align),
        })
        .collect();

    let actions = config
        .actions
        .as_ref()
        .map(|actions| actions(row))
        .unwrap_or_default();

    let mut toggle = None;
    let mut region = None;

    if let Some(expandable) = config.expandable.as_ref().filter(|e| e.can_expand(row)) {
        let expanded = expansion.is_expanded(&key);
        toggle = Some(expanded);

        if expanded {
            let column_span = config.columns.len() + usize::from(config.actions.is_some());
            region = Some(match expandable.source() {
                ExpansionSource::Preloaded(extract) => ExpansionView {
                    sub_data: extract(row),
                    loading: false,
                    error: None,
                    column_span,
                },
                ExpansionSource::OnDemand { .. } => {
                    let entry = expansion.entry(&key);
                    ExpansionView {
                        sub_data: entry.sub_data,
                        loading: entry.loading,
                        error: entry.error,
                        column_span,
                    }
                }
            });
        }
    }

    RenderedRow {
        key,
        index,
        striped: config.striped && index % 2 == 0,
        toggle,
        cells,
        actions,
        expansion: region,
    }
}
