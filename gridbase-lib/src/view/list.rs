//! Loaded-list state for one pagination sequence.

use uuid::Uuid;

use crate::api::Page;
use crate::model::RowData;

/// What a fetch should do when it completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum FetchKind {
    /// Append the page to the loaded rows.
    Append,
    /// Replace the loaded rows from the start (stale refresh).
    Replace,
}

/// The rows loaded so far for one pagination sequence (unfiltered, or one
/// search query), with the bookkeeping that serializes its fetches.
///
/// At most one fetch per list is in flight at a time; `begin_fetch` is the
/// only place a fetch can start and it refuses while one is pending. A
/// failed fetch leaves the loaded rows untouched, and a stale list keeps
/// its rows visible until the replacing refetch lands.
#[derive(Debug, Clone, Default)]
pub struct LoadedList {
    rows: Vec<RowData>,
    next_cursor: Option<Uuid>,
    /// Whether any page has been applied yet; before that, more data must
    /// be assumed to exist.
    started: bool,
    fetch_in_flight: bool,
    stale: bool,
}

impl LoadedList {
    /// Creates an empty list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the loaded rows.
    pub fn rows(&self) -> &[RowData] {
        &self.rows
    }

    /// Returns the number of loaded rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns `true` if nothing is loaded.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Returns `true` while more pages may exist: either no page has been
    /// fetched yet, or the last page carried a next cursor.
    pub fn has_more(&self) -> bool {
        !self.started || self.next_cursor.is_some()
    }

    /// Returns `true` while a fetch for this list is pending.
    pub fn is_fetch_in_flight(&self) -> bool {
        self.fetch_in_flight
    }

    /// Returns `true` if the list needs a replacing refetch.
    pub fn is_stale(&self) -> bool {
        self.stale
    }

    /// Flags the list for a replacing refetch while keeping its rows
    /// visible in the meantime.
    pub fn mark_stale(&mut self) {
        self.stale = true;
    }

    /// Claims the next fetch for this list, returning the cursor to fetch
    /// from and what to do with the result.
    ///
    /// Returns `None` while a fetch is already in flight, and for an
    /// up-to-date list with no further pages.
    pub(super) fn begin_fetch(&mut self) -> Option<(Option<Uuid>, FetchKind)> {
        if self.fetch_in_flight {
            return None;
        }
        if self.stale {
            self.fetch_in_flight = true;
            return Some((None, FetchKind::Replace));
        }
        if self.has_more() {
            self.fetch_in_flight = true;
            return Some((self.next_cursor, FetchKind::Append));
        }
        None
    }

    /// Applies a completed fetch.
    pub(super) fn apply_page(&mut self, kind: FetchKind, page: Page) {
        self.fetch_in_flight = false;
        self.started = true;
        self.next_cursor = page.next_cursor();
        match kind {
            FetchKind::Append => self.rows.extend(page.into_rows()),
            FetchKind::Replace => {
                self.rows = page.into_rows();
                self.stale = false;
            }
        }
    }

    /// Records a failed fetch. The loaded rows stay visible.
    pub(super) fn fetch_failed(&mut self) {
        self.fetch_in_flight = false;
    }
}
