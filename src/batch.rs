// nc_loader/src/batch.rs
// Buffered bulk writer: accumulates documents and flushes them in unordered batches.

use mongodb::bson::Document;
use tracing::debug;

use crate::error::{LoaderError, Result};
use crate::sink::DocumentSink;

pub struct BatchWriter<'a, S: DocumentSink + ?Sized,> {
    sink:       &'a S,
    buffer:     Vec<Document,>,
    batch_size: usize,
    batches:    u64,
    written:    u64,
}

impl<'a, S: DocumentSink + ?Sized,> BatchWriter<'a, S,> {
    pub fn new(sink: &'a S, batch_size: usize,) -> Result<Self,> {
        if batch_size == 0 {
            return Err(LoaderError::ConfigurationError(
                "batch size must be greater than zero".to_string(),
            ),);
        }
        Ok(Self {
            sink,
            buffer: Vec::with_capacity(batch_size,),
            batch_size,
            batches: 0,
            written: 0,
        },)
    }

    /// Buffers a document, writing the whole buffer once it reaches the batch size.
    pub async fn add(&mut self, document: Document,) -> Result<(),> {
        self.buffer.push(document,);
        if self.buffer.len() >= self.batch_size {
            self.write_buffer().await?;
        }
        Ok((),)
    }

    /// Writes whatever is still buffered. A no-op when the buffer is empty.
    pub async fn flush(&mut self,) -> Result<(),> {
        if self.buffer.is_empty() {
            return Ok((),);
        }
        self.write_buffer().await
    }

    pub fn pending(&self,) -> usize {
        self.buffer.len()
    }

    pub fn batches_written(&self,) -> u64 {
        self.batches
    }

    pub fn documents_written(&self,) -> u64 {
        self.written
    }

    async fn write_buffer(&mut self,) -> Result<(),> {
        // The buffer is handed over even if the insert fails; nothing is re-queued.
        let batch = std::mem::replace(&mut self.buffer, Vec::with_capacity(self.batch_size,),);
        let attempted = batch.len();
        let inserted = self.sink.insert_unordered(batch,).await?;

        self.batches += 1;
        self.written += inserted;
        debug!(
            "Flushed batch {} to '{}': {} of {} documents inserted",
            self.batches,
            self.sink.name(),
            inserted,
            attempted
        );
        Ok((),)
    }
}
