//! Async iterator over a table's pages.

use crate::api::Page;
use crate::error::Error;
use crate::GridClient;

use super::PageQuery;
use super::PageRequest;

/// Async iterator that yields pages, following each page's cursor.
///
/// The iterator stops after the first page without a next cursor, or after
/// the first error. There is no isolation across pages: rows inserted
/// between two `next()` calls before the not-yet-fetched cursor position
/// will appear in later pages.
///
/// # Example
///
/// ```ignore
/// let mut pages = client.pages(table_id).limit(100).into_pages();
///
/// while let Some(page) = pages.next().await {
///     let page = page?;
///     for row in page.rows() {
///         println!("{}", row.id());
///     }
/// }
/// ```
pub struct TablePages<'a> {
    client: &'a GridClient,
    request: PageRequest,
    bypass_cache: bool,
    /// Whether we've exhausted all pages.
    done: bool,
}

impl<'a> TablePages<'a> {
    pub(crate) fn new(query: PageQuery<'a>) -> Self {
        Self {
            client: query.client,
            request: query.request,
            bypass_cache: query.bypass_cache,
            done: false,
        }
    }

    /// Fetches the next page of results.
    ///
    /// Returns `None` when all pages have been consumed.
    pub async fn next(&mut self) -> Option<Result<Page, Error>> {
        if self.done {
            return None;
        }

        let response = match self
            .client
            .fetch_page_inner(&self.request, self.bypass_cache)
            .await
        {
            Ok(response) => response,
            Err(e) => {
                self.done = true;
                return Some(Err(e));
            }
        };

        let page = response.into_inner();
        match page.next_cursor() {
            Some(cursor) => self.request.cursor = Some(cursor),
            None => self.done = true,
        }

        Some(Ok(page))
    }
}
