//! crates/fieldtest_core/src/table.rs
//!
//! The generic data table: a column schema plus either a local list
//! (paged here) or a server page, reduced to a view model the web layer renders.

use crate::domain::{Page, PageQuery};
use crate::store::RemoteSlice;

//=========================================================================================
// Schema
//=========================================================================================

/// One table column: a label, a plain-text accessor and an optional custom cell renderer.
pub struct Column<T> {
    pub label: &'static str,
    pub accessor: fn(&T) -> String,
    /// Produces trusted HTML for the cell instead of the escaped accessor text.
    pub render: Option<fn(&T) -> String>,
}

impl<T> Column<T> {
    pub const fn text(label: &'static str, accessor: fn(&T) -> String) -> Self {
        Self {
            label,
            accessor,
            render: None,
        }
    }

    pub const fn custom(
        label: &'static str,
        accessor: fn(&T) -> String,
        render: fn(&T) -> String,
    ) -> Self {
        Self {
            label,
            accessor,
            render: Some(render),
        }
    }

    fn cell(&self, row: &T) -> Cell {
        match self.render {
            Some(render) => Cell::Html(render(row)),
            None => Cell::Text((self.accessor)(row)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cell {
    /// Escaped on output.
    Text(String),
    Html(String),
}

//=========================================================================================
// Links
//=========================================================================================

/// The fetch a table was built from. Following it re-issues exactly that fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryTarget {
    pub path: String,
    pub query: Option<PageQuery>,
}

impl RetryTarget {
    pub fn new(path: impl Into<String>, query: Option<PageQuery>) -> Self {
        Self {
            path: path.into(),
            query,
        }
    }

    /// The retry link. `retry=1` makes the handler bypass the loaded-entity check.
    pub fn href(&self) -> String {
        match self.query {
            Some(q) => format!("{}?page={}&size={}&retry=1", self.path, q.page, q.size),
            None => format!("{}?retry=1", self.path),
        }
    }

    fn page_href(&self, page: u32, size: u32) -> String {
        format!("{}?page={}&size={}", self.path, page, size)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallToAction {
    pub label: String,
    pub href: String,
}

impl CallToAction {
    pub fn new(label: impl Into<String>, href: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            href: href.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pager {
    /// 1-based, for display.
    pub current: u32,
    pub total_pages: u32,
    pub total_elements: u64,
    pub prev: Option<String>,
    pub next: Option<String>,
}

//=========================================================================================
// Sources
//=========================================================================================

pub enum TableSource<'a, T> {
    /// Client-side paging over a full list.
    Local {
        items: &'a [T],
        query: PageQuery,
    },
    /// A page the server already cut.
    Remote(&'a Page<T>),
}

struct Window<'a, T> {
    rows: &'a [T],
    current: u32,
    total_pages: u32,
    total_elements: u64,
    size: u32,
}

impl<'a, T> TableSource<'a, T> {
    fn window(&self) -> Window<'a, T> {
        match *self {
            TableSource::Local { items, query } => {
                let size = query.size.max(1);
                let total_pages = (items.len() as u32).div_ceil(size);
                let current = query.page.min(total_pages.saturating_sub(1));
                let start = (current * size) as usize;
                let end = (start + size as usize).min(items.len());
                Window {
                    rows: &items[start.min(items.len())..end],
                    current,
                    total_pages,
                    total_elements: items.len() as u64,
                    size,
                }
            }
            TableSource::Remote(page) => Window {
                rows: &page.content,
                current: page.pageable.page_number,
                total_pages: page.total_pages,
                total_elements: page.total_elements,
                size: page.pageable.page_size.max(1),
            },
        }
    }
}

//=========================================================================================
// View Model
//=========================================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableView {
    Loading,
    Error {
        retry: String,
    },
    Empty {
        call_to_action: Option<CallToAction>,
    },
    Populated {
        headers: Vec<&'static str>,
        rows: Vec<Vec<Cell>>,
        pager: Pager,
    },
}

impl TableView {
    /// Reduces the fetch flags and whatever data is at hand to a single render state.
    /// Error beats loading, loading beats data, and an empty list shows the call to action.
    pub fn build<T>(
        columns: &[Column<T>],
        loading: bool,
        error: bool,
        source: Option<TableSource<'_, T>>,
        retry: &RetryTarget,
        empty: Option<CallToAction>,
    ) -> TableView {
        if error {
            return TableView::Error {
                retry: retry.href(),
            };
        }
        if loading {
            return TableView::Loading;
        }
        let Some(source) = source else {
            return TableView::Loading;
        };

        let window = source.window();
        if window.rows.is_empty() {
            return TableView::Empty {
                call_to_action: empty,
            };
        }

        let headers = columns.iter().map(|c| c.label).collect();
        let rows = window
            .rows
            .iter()
            .map(|row| columns.iter().map(|c| c.cell(row)).collect())
            .collect();
        let prev = (window.current > 0).then(|| retry.page_href(window.current - 1, window.size));
        let next = (window.current + 1 < window.total_pages)
            .then(|| retry.page_href(window.current + 1, window.size));

        TableView::Populated {
            headers,
            rows,
            pager: Pager {
                current: window.current + 1,
                total_pages: window.total_pages,
                total_elements: window.total_elements,
                prev,
                next,
            },
        }
    }

    /// A table over a server-paginated slice.
    pub fn from_paged<T>(
        columns: &[Column<T>],
        slice: &RemoteSlice<Page<T>>,
        retry: &RetryTarget,
        empty: Option<CallToAction>,
    ) -> TableView {
        let source = slice.entity.as_ref().map(TableSource::Remote);
        Self::build(columns, slice.loading, slice.error, source, retry, empty)
    }

    /// A table over a plain list slice, paged locally.
    pub fn from_list<T>(
        columns: &[Column<T>],
        slice: &RemoteSlice<Vec<T>>,
        query: PageQuery,
        retry: &RetryTarget,
        empty: Option<CallToAction>,
    ) -> TableView {
        let source = slice
            .entity
            .as_deref()
            .map(|items| TableSource::Local { items, query });
        Self::build(columns, slice.loading, slice.error, source, retry, empty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Pageable;

    #[derive(Debug)]
    struct Row {
        id: i64,
        name: &'static str,
    }

    fn columns() -> Vec<Column<Row>> {
        vec![
            Column::text("ID", |r: &Row| r.id.to_string()),
            Column::custom(
                "Name",
                |r: &Row| r.name.to_string(),
                |r: &Row| format!("<strong>{}</strong>", r.name),
            ),
        ]
    }

    fn rows(n: i64) -> Vec<Row> {
        (1..=n).map(|id| Row { id, name: "unit" }).collect()
    }

    #[test]
    fn empty_list_renders_call_to_action() {
        let mut slice: RemoteSlice<Vec<Row>> = RemoteSlice::default();
        slice.succeed(Vec::new());
        let cta = CallToAction::new("Add company", "/companies?tab=create");
        let view = TableView::from_list(
            &columns(),
            &slice,
            PageQuery::first(10),
            &RetryTarget::new("/companies", None),
            Some(cta.clone()),
        );
        assert_eq!(
            view,
            TableView::Empty {
                call_to_action: Some(cta)
            }
        );
    }

    #[test]
    fn error_renders_retry_for_the_same_fetch() {
        let mut slice: RemoteSlice<Page<Row>> = RemoteSlice::default();
        slice.begin();
        slice.fail();
        let retry = RetryTarget::new("/reports/oil", Some(PageQuery::new(2, 10)));
        let view = TableView::from_paged(&columns(), &slice, &retry, None);
        assert_eq!(
            view,
            TableView::Error {
                retry: "/reports/oil?page=2&size=10&retry=1".to_string()
            }
        );
    }

    #[test]
    fn error_wins_over_stale_rows() {
        let data = rows(3);
        let view = TableView::build(
            &columns(),
            false,
            true,
            Some(TableSource::Local {
                items: &data,
                query: PageQuery::first(10),
            }),
            &RetryTarget::new("/admins", None),
            None,
        );
        assert!(matches!(view, TableView::Error { .. }));
    }

    #[test]
    fn nothing_loaded_yet_is_loading() {
        let slice: RemoteSlice<Vec<Row>> = RemoteSlice::default();
        let view = TableView::from_list(
            &columns(),
            &slice,
            PageQuery::first(10),
            &RetryTarget::new("/admins", None),
            None,
        );
        assert_eq!(view, TableView::Loading);
    }

    #[test]
    fn local_paging_cuts_the_requested_window() {
        let data = rows(23);
        let view = TableView::build(
            &columns(),
            false,
            false,
            Some(TableSource::Local {
                items: &data,
                query: PageQuery::new(2, 10),
            }),
            &RetryTarget::new("/contact-us", None),
            None,
        );
        let TableView::Populated { rows, pager, headers } = view else {
            panic!("expected populated table");
        };
        assert_eq!(headers, vec!["ID", "Name"]);
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0][0], Cell::Text("21".into()));
        assert_eq!(rows[0][1], Cell::Html("<strong>unit</strong>".into()));
        assert_eq!(pager.current, 3);
        assert_eq!(pager.total_pages, 3);
        assert_eq!(pager.prev.as_deref(), Some("/contact-us?page=1&size=10"));
        assert_eq!(pager.next, None);
    }

    #[test]
    fn local_paging_clamps_past_the_end() {
        let data = rows(5);
        let view = TableView::build(
            &columns(),
            false,
            false,
            Some(TableSource::Local {
                items: &data,
                query: PageQuery::new(9, 10),
            }),
            &RetryTarget::new("/admins", None),
            None,
        );
        let TableView::Populated { rows, pager, .. } = view else {
            panic!("expected populated table");
        };
        assert_eq!(rows.len(), 5);
        assert_eq!(pager.current, 1);
    }

    #[test]
    fn remote_page_links_carry_page_and_size() {
        let page = Page {
            content: rows(10),
            pageable: Pageable {
                page_number: 1,
                page_size: 10,
                offset: 10,
            },
            total_pages: 4,
            total_elements: 37,
            number_of_elements: 10,
            first: false,
            last: false,
        };
        let mut slice = RemoteSlice::default();
        slice.succeed(page);
        let view = TableView::from_paged(
            &columns(),
            &slice,
            &RetryTarget::new("/companies", Some(PageQuery::new(1, 10))),
            None,
        );
        let TableView::Populated { pager, .. } = view else {
            panic!("expected populated table");
        };
        assert_eq!(pager.current, 2);
        assert_eq!(pager.total_elements, 37);
        assert_eq!(pager.prev.as_deref(), Some("/companies?page=0&size=10"));
        assert_eq!(pager.next.as_deref(), Some("/companies?page=2&size=10"));
    }
}
