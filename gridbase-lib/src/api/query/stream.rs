//! Row stream over paginated fetches.

use async_stream::try_stream;
use futures::Stream;

use crate::error::Error;
use crate::model::RowData;

use super::PageQuery;

impl<'a> PageQuery<'a> {
    /// Converts into a stream of rows, flattening the page iterator.
    ///
    /// Pages are fetched lazily as the stream is polled, so dropping the
    /// stream early stops fetching.
    ///
    /// # Example
    ///
    /// ```ignore
    /// use futures::StreamExt;
    ///
    /// let stream = client.pages(table_id).limit(500).into_row_stream();
    /// futures::pin_mut!(stream);
    /// while let Some(row) = stream.next().await {
    ///     let row = row?;
    ///     // ...
    /// }
    /// ```
    pub fn into_row_stream(self) -> impl Stream<Item = Result<RowData, Error>> + 'a {
        try_stream! {
            let mut pages = self.into_pages();
            while let Some(page) = pages.next().await {
                let page = page?;
                for row in page.into_rows() {
                    yield row;
                }
            }
        }
    }
}
