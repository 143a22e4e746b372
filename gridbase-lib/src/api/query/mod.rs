//! Paginated row queries
//!
//! A page fetch asks for `limit + 1` rows strictly after the cursor in the
//! table's `(created_at, id)` total order. A full over-fetch means another
//! page exists: the extra row is popped and its id becomes the next cursor.
//! Search composes as a substring predicate over the same scan; the empty
//! query means "no filter" and always takes the unfiltered path.

mod pages;
mod stream;

pub use pages::*;

use log::debug;
use log::warn;
use uuid::Uuid;

use crate::api::Page;
use crate::cache::CacheProvider;
use crate::cache::CachedValue;
use crate::error::Error;
use crate::error::Resource;
use crate::error::ValidationError;
use crate::model::RowData;
use crate::response::Response;
use crate::store::RowCursor;
use crate::store::TableStore;
use crate::GridClient;

/// The largest page a single fetch may request.
pub const MAX_PAGE_LIMIT: usize = 1000;

/// Page size used when the caller doesn't specify one.
pub const DEFAULT_PAGE_LIMIT: usize = 100;

/// The longest accepted search query, in bytes.
pub const MAX_QUERY_LEN: usize = 256;

/// A validated page-fetch request.
///
/// This is the request shape the view layer produces and the client
/// consumes; [`PageQuery`] is the builder sugar over it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    /// The table to read.
    pub table_id: Uuid,
    /// Resume strictly after this row; `None` starts at the top.
    pub cursor: Option<Uuid>,
    /// Substring filter over cell values; `None` or empty means unfiltered.
    pub query: Option<String>,
    /// Maximum rows to return.
    pub limit: usize,
}

impl PageRequest {
    /// Creates an unfiltered request for the start of the table with the
    /// default limit.
    pub fn new(table_id: Uuid) -> Self {
        Self {
            table_id,
            cursor: None,
            query: None,
            limit: DEFAULT_PAGE_LIMIT,
        }
    }

    /// Returns the effective filter query.
    ///
    /// The empty query is defined to mean "no filter", so it never reaches
    /// the filtered path: both `None` and `Some("")` read back as `None`.
    pub fn query(&self) -> Option<&str> {
        self.query.as_deref().filter(|q| !q.is_empty())
    }

    /// Returns `true` if this request takes the filtered path.
    pub fn is_filtered(&self) -> bool {
        self.query().is_some()
    }

    /// Checks the request bounds.
    ///
    /// Out-of-range values are rejected, never clamped.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.limit < 1 {
            return Err(ValidationError::new("limit", "must be at least 1"));
        }
        if self.limit > MAX_PAGE_LIMIT {
            return Err(ValidationError::new(
                "limit",
                format!("must be at most {MAX_PAGE_LIMIT}"),
            ));
        }
        if let Some(query) = &self.query {
            if query.len() > MAX_QUERY_LEN {
                return Err(ValidationError::new(
                    "query",
                    format!("must be at most {MAX_QUERY_LEN} bytes"),
                ));
            }
        }
        Ok(())
    }

    pub(crate) fn cache_key(&self) -> String {
        let mode = match self.query() {
            Some(query) => format!("q={query}"),
            None => "all".to_string(),
        };
        let cursor = self
            .cursor
            .map(|c| c.to_string())
            .unwrap_or_else(|| "start".to_string());
        format!("pages:{}:{}:{}:{}", self.table_id, mode, self.limit, cursor)
    }
}

/// Cache key prefix shared by all of a table's cached pages.
///
/// Removing this prefix is the invalidate-everything-for-the-table policy
/// mutations rely on.
pub(crate) fn page_cache_prefix(table_id: Uuid) -> String {
    format!("pages:{table_id}:")
}

/// Builder for a paginated row fetch.
///
/// # Example
///
/// ```ignore
/// // One page
/// let response = client.pages(table_id).limit(50).fetch().await?;
///
/// // All pages, filtered
/// let mut pages = client.pages(table_id).search("smith").into_pages();
/// while let Some(page) = pages.next().await {
///     let page = page?;
///     // ...
/// }
/// ```
#[derive(Clone)]
pub struct PageQuery<'a> {
    client: &'a GridClient,
    request: PageRequest,
    bypass_cache: bool,
}

impl<'a> PageQuery<'a> {
    pub(crate) fn new(client: &'a GridClient, table_id: Uuid) -> Self {
        Self {
            client,
            request: PageRequest::new(table_id),
            bypass_cache: false,
        }
    }

    /// Sets the page size.
    pub fn limit(mut self, limit: usize) -> Self {
        self.request.limit = limit;
        self
    }

    /// Resumes strictly after the given row.
    pub fn cursor(mut self, cursor: Uuid) -> Self {
        self.request.cursor = Some(cursor);
        self
    }

    /// Restricts the scan to rows with a cell value containing `query`
    /// (case-sensitively). The empty string means "no filter".
    pub fn search(mut self, query: impl Into<String>) -> Self {
        self.request.query = Some(query.into());
        self
    }

    /// Skips the page cache for this fetch (neither reads nor writes it).
    pub fn bypass_cache(mut self) -> Self {
        self.bypass_cache = true;
        self
    }

    /// Returns the underlying request.
    pub fn request(&self) -> &PageRequest {
        &self.request
    }

    /// Fetches a single page.
    pub async fn fetch(self) -> Result<Response<Page>, Error> {
        self.client
            .fetch_page_inner(&self.request, self.bypass_cache)
            .await
    }

    /// Converts into an iterator over all remaining pages.
    pub fn into_pages(self) -> TablePages<'a> {
        TablePages::new(self)
    }
}

impl GridClient {
    /// Starts a paginated read of the table's rows.
    pub fn pages(&self, table_id: Uuid) -> PageQuery<'_> {
        PageQuery::new(self, table_id)
    }

    /// Fetches one page for a pre-built request.
    ///
    /// This is the entry point the view layer drives; [`GridClient::pages`]
    /// is the builder-style equivalent.
    pub async fn fetch_page(&self, request: &PageRequest) -> Result<Response<Page>, Error> {
        self.fetch_page_inner(request, false).await
    }

    pub(crate) async fn fetch_page_inner(
        &self,
        request: &PageRequest,
        bypass_cache: bool,
    ) -> Result<Response<Page>, Error> {
        request.validate()?;

        let table_id = request.table_id;
        self.store()
            .get_table(table_id)
            .await?
            .ok_or_else(|| Error::not_found(Resource::Table, table_id))?;

        let key = request.cache_key();
        if !bypass_cache {
            if let Some(cached) = self.cache().get(&key).await {
                match bincode::deserialize::<Page>(&cached.data) {
                    Ok(page) => {
                        debug!("page cache hit for {key}");
                        return Ok(Response::cache_hit(page, cached.created_at));
                    }
                    Err(e) => {
                        warn!("dropping undecodable cached page {key}: {e}");
                        self.cache().remove(&key).await;
                    }
                }
            }
        }

        let after = self.resolve_cursor(request).await?;

        // Over-fetch one row past the limit; a full result means another
        // page exists and the extra row's id is the cursor to it.
        let mut rows: Vec<RowData> = self
            .store()
            .list_rows(table_id, after, request.limit + 1, request.query())
            .await?;

        let next_cursor = if rows.len() > request.limit {
            rows.pop().map(|extra| extra.id())
        } else {
            None
        };

        let mut page = Page::new(rows);
        if let Some(id) = next_cursor {
            page = page.with_next_cursor(id);
        }

        debug!(
            "fetched page table={table_id} rows={} next_cursor={:?}",
            page.len(),
            page.next_cursor()
        );

        if bypass_cache {
            return Ok(Response::new(page));
        }

        match bincode::serialize(&page) {
            Ok(data) => {
                let value = CachedValue::with_ttl(data, self.cache_config().page_ttl);
                let cached_at = value.created_at;
                self.cache().set(&key, value).await;
                Ok(Response::cache_miss(page, cached_at))
            }
            Err(e) => {
                warn!("failed to encode page for caching: {e}");
                Ok(Response::new(page))
            }
        }
    }

    /// Resolves the request's cursor row to its position in the total
    /// order. A cursor naming a row from another table does not resolve.
    async fn resolve_cursor(&self, request: &PageRequest) -> Result<Option<RowCursor>, Error> {
        let Some(cursor_id) = request.cursor else {
            return Ok(None);
        };
        let row = self
            .store()
            .get_row(cursor_id)
            .await?
            .ok_or_else(|| Error::not_found(Resource::Row, cursor_id))?;
        if row.table_id != request.table_id {
            return Err(Error::not_found(Resource::Row, cursor_id));
        }
        Ok(Some(RowCursor::from(&row)))
    }
}
