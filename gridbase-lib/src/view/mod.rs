//! Virtualized view state over paginated fetches
//!
//! Pure client-side state, free of I/O: the UI feeds in scroll positions
//! and completed pages, and polls for the page requests it should issue.
//! Two pagination sequences are kept alive at once, the unfiltered rows
//! and the rows matching the current search query, so toggling search off
//! and back on never refetches what is already loaded. The trigger rule in
//! [`TableView::poll_fetch`] is the sole serialization mechanism: per
//! list, at most one fetch is ever in flight.

mod list;
mod window;

pub use list::LoadedList;
pub use window::VirtualWindow;
pub use window::DEFAULT_OVERSCAN;

use std::ops::Range;

use log::debug;
use uuid::Uuid;

use crate::api::query::DEFAULT_PAGE_LIMIT;
use crate::api::Page;
use crate::api::PageRequest;
use crate::model::RowData;

use list::FetchKind;

/// Which pagination sequence the view is presenting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewMode {
    /// The whole table.
    Unfiltered,
    /// Rows with a cell value containing the query.
    Filtered(String),
}

/// A claimed fetch: the request to execute, plus the routing the view
/// needs to apply the outcome to the right list.
///
/// Obtained from [`TableView::poll_fetch`]; resolve it with exactly one of
/// [`TableView::apply_page`] or [`TableView::apply_error`].
#[derive(Debug, Clone)]
pub struct FetchTicket {
    request: PageRequest,
    kind: FetchKind,
}

impl FetchTicket {
    /// The page request to execute.
    pub fn request(&self) -> &PageRequest {
        &self.request
    }
}

/// Scroll-driven view state for one table.
///
/// # Example
///
/// ```ignore
/// let mut view = TableView::new(table_id, VirtualWindow::new(600, 36));
///
/// view.on_scroll(scroll_offset);
/// if let Some(ticket) = view.poll_fetch() {
///     match client.fetch_page(ticket.request()).await {
///         Ok(response) => view.apply_page(&ticket, response.into_inner()),
///         Err(_) => view.apply_error(&ticket),
///     }
/// }
/// let visible = &view.rows()[view.visible_range()];
/// ```
#[derive(Debug, Clone)]
pub struct TableView {
    table_id: Uuid,
    page_limit: usize,
    window: VirtualWindow,
    unfiltered: LoadedList,
    filtered: LoadedList,
    /// The query the filtered list holds, surviving switches back to the
    /// unfiltered mode.
    filtered_query: Option<String>,
    /// The active mode: `None` presents the unfiltered list.
    active_filter: Option<String>,
}

impl TableView {
    /// Creates view state for the table.
    pub fn new(table_id: Uuid, window: VirtualWindow) -> Self {
        Self {
            table_id,
            page_limit: DEFAULT_PAGE_LIMIT,
            window,
            unfiltered: LoadedList::new(),
            filtered: LoadedList::new(),
            filtered_query: None,
            active_filter: None,
        }
    }

    /// Sets the page size used for fetch requests.
    pub fn with_page_limit(mut self, limit: usize) -> Self {
        self.page_limit = limit;
        self
    }

    /// Returns the active mode.
    pub fn mode(&self) -> ViewMode {
        match &self.active_filter {
            Some(query) => ViewMode::Filtered(query.clone()),
            None => ViewMode::Unfiltered,
        }
    }

    /// Switches the search query.
    ///
    /// The empty query presents the unfiltered list. A query equal to the
    /// one the filtered list already holds reuses its loaded pages; a new
    /// query starts the filtered sequence over.
    pub fn set_query(&mut self, query: impl Into<String>) {
        let query = query.into();
        if query.is_empty() {
            self.active_filter = None;
            return;
        }
        if self.filtered_query.as_deref() != Some(query.as_str()) {
            self.filtered = LoadedList::new();
            self.filtered_query = Some(query.clone());
        }
        self.active_filter = Some(query);
    }

    /// Feeds in the current scroll offset, in pixels from the top.
    pub fn on_scroll(&mut self, offset: u32) {
        self.window.set_scroll_offset(offset);
    }

    /// Feeds in the viewport height, in pixels.
    pub fn set_viewport_height(&mut self, height: u32) {
        self.window.set_viewport_height(height);
    }

    /// Returns the active list's loaded rows.
    pub fn rows(&self) -> &[RowData] {
        self.active_list().rows()
    }

    /// Returns the active list.
    pub fn active_list(&self) -> &LoadedList {
        match &self.active_filter {
            Some(_) => &self.filtered,
            None => &self.unfiltered,
        }
    }

    /// The row indices of the active list to materialize right now.
    pub fn visible_range(&self) -> Range<usize> {
        self.window.visible_range(self.active_list().len())
    }

    /// The total scrollable height for the active list.
    pub fn total_height(&self) -> u64 {
        let list = self.active_list();
        self.window.total_height(list.len(), list.has_more())
    }

    /// Decides whether a page request should be issued right now.
    ///
    /// At most one fetch per list is ever handed out: a ticket is returned
    /// only when no fetch for the active list is in flight AND either the
    /// list is stale (a mutation invalidated it) or the scroll window is
    /// within one row of the end of the loaded list while more pages are
    /// known to exist.
    pub fn poll_fetch(&mut self) -> Option<FetchTicket> {
        let list = self.active_list();
        if list.is_fetch_in_flight() {
            return None;
        }
        let triggered =
            list.is_stale() || (self.window.wants_next_page(list.len()) && list.has_more());
        if !triggered {
            return None;
        }

        let query = self.active_filter.clone();
        let (cursor, kind) = self.active_list_mut().begin_fetch()?;
        let request = PageRequest {
            table_id: self.table_id,
            cursor,
            query,
            limit: self.page_limit,
        };
        debug!(
            "view fetch: table={} cursor={:?} filtered={}",
            self.table_id,
            request.cursor,
            request.is_filtered()
        );
        Some(FetchTicket { request, kind })
    }

    /// Applies a fetched page to the list its ticket was issued for.
    ///
    /// A page for a search query the view has since moved away from is
    /// dropped: its list was reset when the query changed.
    pub fn apply_page(&mut self, ticket: &FetchTicket, page: Page) {
        match ticket.request.query() {
            None => self.unfiltered.apply_page(ticket.kind, page),
            Some(query) => {
                if self.filtered_query.as_deref() == Some(query) {
                    self.filtered.apply_page(ticket.kind, page);
                }
            }
        }
    }

    /// Records a failed fetch. Previously loaded rows stay visible.
    pub fn apply_error(&mut self, ticket: &FetchTicket) {
        match ticket.request.query() {
            None => self.unfiltered.fetch_failed(),
            Some(query) => {
                if self.filtered_query.as_deref() == Some(query) {
                    self.filtered.fetch_failed();
                }
            }
        }
    }

    /// Flags both lists for a replacing refetch after a mutation
    /// invalidated the table's cached pages. Loaded rows stay visible
    /// until the refetch lands.
    pub fn mark_stale(&mut self) {
        self.unfiltered.mark_stale();
        self.filtered.mark_stale();
    }

    fn active_list_mut(&mut self) -> &mut LoadedList {
        match &self.active_filter {
            Some(_) => &mut self.filtered,
            None => &mut self.unfiltered,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Row;

    fn page_of(table_id: Uuid, rows: usize, more: bool) -> Page {
        let rows: Vec<RowData> = (0..rows)
            .map(|_| RowData::new(Row::new(table_id)))
            .collect();
        let page = Page::new(rows);
        if more {
            page.with_next_cursor(Uuid::new_v4())
        } else {
            page
        }
    }

    fn view() -> TableView {
        let window = VirtualWindow::new(100, 10).with_overscan(5);
        TableView::new(Uuid::new_v4(), window).with_page_limit(50)
    }

    #[test]
    fn first_poll_fetches_and_guards_against_duplicates() {
        let mut view = view();

        let ticket = view.poll_fetch().expect("empty view must fetch");
        assert_eq!(ticket.request().cursor, None);
        assert!(view.poll_fetch().is_none(), "fetch already in flight");

        view.apply_page(&ticket, page_of(view.table_id, 50, true));
        assert_eq!(view.rows().len(), 50);
    }

    #[test]
    fn next_page_waits_for_the_scroll_boundary() {
        let mut view = view();
        let ticket = view.poll_fetch().unwrap();
        view.apply_page(&ticket, page_of(view.table_id, 50, true));

        view.on_scroll(0);
        assert!(view.poll_fetch().is_none(), "far from the boundary");

        view.on_scroll(340);
        let ticket = view.poll_fetch().expect("near the boundary");
        assert!(ticket.request().cursor.is_some(), "resumes from the cursor");
    }

    #[test]
    fn exhausted_list_never_refetches() {
        let mut view = view();
        let ticket = view.poll_fetch().unwrap();
        view.apply_page(&ticket, page_of(view.table_id, 10, false));

        view.on_scroll(1000);
        assert!(view.poll_fetch().is_none(), "no pages beyond the end");
    }

    #[test]
    fn switching_modes_retains_both_lists() {
        let mut view = view();
        let ticket = view.poll_fetch().unwrap();
        view.apply_page(&ticket, page_of(view.table_id, 10, false));

        view.set_query("needle");
        assert_eq!(view.mode(), ViewMode::Filtered("needle".to_string()));
        assert!(view.rows().is_empty());

        let ticket = view.poll_fetch().expect("fresh filtered list must fetch");
        assert!(ticket.request().is_filtered());
        view.apply_page(&ticket, page_of(view.table_id, 3, false));
        assert_eq!(view.rows().len(), 3);

        view.set_query("");
        assert_eq!(view.rows().len(), 10, "unfiltered list was retained");
        assert!(view.poll_fetch().is_none(), "nothing to refetch");

        view.set_query("needle");
        assert_eq!(view.rows().len(), 3, "filtered list was retained");
        assert!(view.poll_fetch().is_none());
    }

    #[test]
    fn a_new_query_restarts_the_filtered_sequence() {
        let mut view = view();
        view.set_query("first");
        let ticket = view.poll_fetch().unwrap();
        view.apply_page(&ticket, page_of(view.table_id, 3, false));

        view.set_query("second");
        assert!(view.rows().is_empty());
        let ticket = view.poll_fetch().expect("new query fetches from the start");
        assert_eq!(ticket.request().cursor, None);
    }

    #[test]
    fn late_page_for_an_abandoned_query_is_dropped() {
        let mut view = view();
        view.set_query("first");
        let ticket = view.poll_fetch().unwrap();

        view.set_query("second");
        view.apply_page(&ticket, page_of(view.table_id, 3, false));
        assert!(view.rows().is_empty(), "stale response must not apply");
    }

    #[test]
    fn failed_fetch_keeps_loaded_rows_visible() {
        let mut view = view();
        let ticket = view.poll_fetch().unwrap();
        view.apply_page(&ticket, page_of(view.table_id, 50, true));

        view.on_scroll(340);
        let ticket = view.poll_fetch().unwrap();
        view.apply_error(&ticket);

        assert_eq!(view.rows().len(), 50, "no destructive clear on error");
        assert!(view.poll_fetch().is_some(), "fetch can be retried");
    }

    #[test]
    fn mark_stale_replaces_from_the_start() {
        let mut view = view();
        let ticket = view.poll_fetch().unwrap();
        view.apply_page(&ticket, page_of(view.table_id, 50, true));
        let ticket = view.poll_fetch();
        // Not at the boundary: no append fetch pending.
        assert!(ticket.is_none());

        view.mark_stale();
        assert_eq!(view.rows().len(), 50, "rows stay visible while stale");

        let ticket = view.poll_fetch().expect("stale list must refetch");
        assert_eq!(ticket.request().cursor, None);
        view.apply_page(&ticket, page_of(view.table_id, 50, true));
        assert_eq!(view.rows().len(), 50, "replaced, not appended");
        assert!(!view.active_list().is_stale());
    }
}
