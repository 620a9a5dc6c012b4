//! Chunked persistence of validated records inside one transaction.

use crate::ingest::error::ImportError;
use crate::ingest::record::{FlatRecord, HouseRecord};
use sqlx::{Postgres, QueryBuilder, Transaction};
use tracing::debug;

/// Buffers validated records and flushes them in multi-row INSERTs once the
/// buffer reaches the configured chunk size. All flushes go through the same
/// transaction, so a later failure discards every row written so far.
pub struct ChunkedFlatWriter {
    chunk_size: usize,
    owner: String,
    buffer: Vec<FlatRecord>,
    written: i64,
    flushes: u32,
}

impl ChunkedFlatWriter {
    pub fn new(chunk_size: usize, owner: impl Into<String>) -> Self {
        Self {
            chunk_size: chunk_size.max(1),
            owner: owner.into(),
            buffer: Vec::with_capacity(chunk_size.max(1)),
            written: 0,
            flushes: 0,
        }
    }

    /// Records flushed to the transaction so far. Buffered records are not
    /// counted until `flush` runs.
    pub fn written(&self) -> i64 {
        self.written
    }

    /// Number of non-empty INSERT statements issued so far.
    pub fn flushes(&self) -> u32 {
        self.flushes
    }

    /// Buffer one record, flushing if the chunk is full.
    pub async fn push(
        &mut self,
        tx: &mut Transaction<'_, Postgres>,
        record: FlatRecord,
    ) -> Result<(), ImportError> {
        self.buffer.push(record);
        if self.buffer.len() >= self.chunk_size {
            self.flush(tx).await?;
        }
        Ok(())
    }

    /// Write all buffered records. Call once more after the final record to
    /// drain the tail chunk.
    pub async fn flush(&mut self, tx: &mut Transaction<'_, Postgres>) -> Result<(), ImportError> {
        if self.buffer.is_empty() {
            return Ok(());
        }

        let count = self.buffer.len();
        debug!(count, "Flushing flat chunk");

        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(
            "INSERT INTO flats (name, coord_x, coord_y, area, price, balcony, \
             time_to_metro_on_foot, number_of_rooms, number_of_bathrooms, \
             time_to_metro_by_transport, view, house_id, created_by) ",
        );

        builder.push_values(self.buffer.drain(..), |mut b, record| {
            b.push_bind(record.name)
                .push_bind(record.coord_x)
                .push_bind(record.coord_y)
                .push_bind(record.area)
                .push_bind(record.price)
                .push_bind(record.balcony)
                .push_bind(record.time_to_metro_on_foot)
                .push_bind(record.number_of_rooms)
                .push_bind(record.number_of_bathrooms)
                .push_bind(record.time_to_metro_by_transport)
                .push_bind(record.view.as_str())
                .push_bind(record.house_id)
                .push_bind(self.owner.clone());
        });

        builder.build().execute(&mut **tx).await?;

        self.written += count as i64;
        self.flushes += 1;
        Ok(())
    }
}

/// House counterpart of [`ChunkedFlatWriter`].
pub struct ChunkedHouseWriter {
    chunk_size: usize,
    owner: String,
    buffer: Vec<HouseRecord>,
    written: i64,
    flushes: u32,
}

impl ChunkedHouseWriter {
    pub fn new(chunk_size: usize, owner: impl Into<String>) -> Self {
        Self {
            chunk_size: chunk_size.max(1),
            owner: owner.into(),
            buffer: Vec::with_capacity(chunk_size.max(1)),
            written: 0,
            flushes: 0,
        }
    }

    pub fn written(&self) -> i64 {
        self.written
    }

    pub fn flushes(&self) -> u32 {
        self.flushes
    }

    pub async fn push(
        &mut self,
        tx: &mut Transaction<'_, Postgres>,
        record: HouseRecord,
    ) -> Result<(), ImportError> {
        self.buffer.push(record);
        if self.buffer.len() >= self.chunk_size {
            self.flush(tx).await?;
        }
        Ok(())
    }

    pub async fn flush(&mut self, tx: &mut Transaction<'_, Postgres>) -> Result<(), ImportError> {
        if self.buffer.is_empty() {
            return Ok(());
        }

        let count = self.buffer.len();
        debug!(count, "Flushing house chunk");

        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(
            "INSERT INTO houses (name, year, number_of_flats_on_floor, created_by) ",
        );

        builder.push_values(self.buffer.drain(..), |mut b, record| {
            b.push_bind(record.name)
                .push_bind(record.year)
                .push_bind(record.number_of_flats_on_floor)
                .push_bind(self.owner.clone());
        });

        builder.build().execute(&mut **tx).await?;

        self.written += count as i64;
        self.flushes += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_chunk_size_clamped() {
        let writer = ChunkedFlatWriter::new(0, "alice");
        assert_eq!(writer.chunk_size, 1);
    }

    #[test]
    fn test_written_starts_at_zero() {
        let writer = ChunkedFlatWriter::new(1000, "alice");
        assert_eq!(writer.written(), 0);
    }
}
