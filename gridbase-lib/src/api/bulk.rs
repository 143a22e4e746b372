//! Bulk row generation.
//!
//! Population happens in three phases, none of which scales a single store
//! call with the requested count: one batched bare-row insert, one
//! readback of the new row ids, then the full cell set built in memory and
//! written in fixed-size chunks issued sequentially. A failure or
//! cancellation partway through the chunked writes leaves the earlier
//! chunks committed; the affected rows read their missing cells as empty
//! until repopulated, which is an expected consistency gap.

use log::debug;
use log::info;
use log::warn;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::api::synth::synthesize_value;
use crate::error::Error;
use crate::error::Resource;
use crate::error::ValidationError;
use crate::model::Cell;
use crate::store::TableStore;
use crate::GridClient;

/// The largest row count a single bulk insert may request.
pub const MAX_BULK_ROWS: usize = 100_000;

/// Cells written per chunk unless overridden on the client builder.
pub const DEFAULT_CELL_CHUNK_SIZE: usize = 10_000;

impl GridClient {
    /// Creates `count` rows in the table, each with one synthesized cell
    /// per column that exists at call time, and returns the created count.
    ///
    /// Columns added concurrently with this call are not backfilled.
    ///
    /// # Errors
    ///
    /// Fails validation before any write when `count` is zero or exceeds
    /// [`MAX_BULK_ROWS`].
    pub async fn add_rows(&self, table_id: Uuid, count: usize) -> Result<usize, Error> {
        self.add_rows_inner(table_id, count, None).await
    }

    /// Like [`GridClient::add_rows`], aborting between chunk writes once
    /// `cancel` is cancelled.
    ///
    /// Chunks written before the cancellation point remain committed.
    pub async fn add_rows_with_cancel(
        &self,
        table_id: Uuid,
        count: usize,
        cancel: CancellationToken,
    ) -> Result<usize, Error> {
        self.add_rows_inner(table_id, count, Some(cancel)).await
    }

    async fn add_rows_inner(
        &self,
        table_id: Uuid,
        count: usize,
        cancel: Option<CancellationToken>,
    ) -> Result<usize, Error> {
        if count < 1 {
            return Err(ValidationError::new("count", "must be at least 1").into());
        }
        if count > MAX_BULK_ROWS {
            return Err(
                ValidationError::new("count", format!("must be at most {MAX_BULK_ROWS}")).into(),
            );
        }

        self.store()
            .get_table(table_id)
            .await?
            .ok_or_else(|| Error::not_found(Resource::Table, table_id))?;
        let columns = self.store().list_columns(table_id).await?;

        info!(
            "bulk insert: {count} rows x {} columns into table {table_id}",
            columns.len()
        );

        self.store().insert_rows(table_id, count).await?;

        // The batched insert doesn't return ids, so read the new rows back.
        let row_ids = self.store().recent_row_ids(table_id, count).await?;

        // Build the entire cell set up front; only the writes are chunked.
        let cells = {
            let mut rng = rand::rng();
            let mut cells = Vec::with_capacity(count * columns.len());
            for row_id in &row_ids {
                for column in &columns {
                    cells.push(Cell::new(*row_id, column.id, synthesize_value(&mut rng, column)));
                }
            }
            cells
        };

        let chunk_size = self.cell_chunk_size();
        let total_chunks = cells.len().div_ceil(chunk_size);
        for (index, chunk) in cells.chunks(chunk_size).enumerate() {
            let write = self.store().insert_cells(chunk.to_vec());
            let result = match &cancel {
                Some(cancel) => {
                    tokio::select! {
                        biased;
                        _ = cancel.cancelled() => {
                            warn!(
                                "bulk insert cancelled after {index}/{total_chunks} chunks; \
                                 committed chunks remain"
                            );
                            return Err(Error::Cancelled);
                        }
                        result = write => result,
                    }
                }
                None => write.await,
            };
            if let Err(e) = result {
                warn!(
                    "cell chunk {}/{total_chunks} failed; earlier chunks remain committed",
                    index + 1
                );
                return Err(e.into());
            }
            debug!(
                "wrote cell chunk {}/{total_chunks} ({} cells)",
                index + 1,
                chunk.len()
            );
        }

        self.invalidate_pages(table_id).await;
        info!("bulk insert: created {count} rows in table {table_id}");
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    /// Chunk sizes come from the flattened cell list, not from row counts.
    #[test]
    fn chunking_applies_to_the_flattened_cell_list() {
        let cells: Vec<u32> = (0..750).collect();
        let sizes: Vec<usize> = cells.chunks(100).map(|c| c.len()).collect();
        assert_eq!(sizes.len(), 750usize.div_ceil(100));
        assert_eq!(sizes, vec![100, 100, 100, 100, 100, 100, 100, 50]);
    }
}
