// nc_loader/src/sink.rs
// The bulk-write seam between the pipeline and a document database.

use std::sync::Arc;

use async_trait::async_trait;
use mongodb::bson::Document;

use crate::error::Result;

/// A target collection that accepts unordered bulk inserts.
#[async_trait]
pub trait DocumentSink: Send + Sync {
    /// Name used in logs and error messages.
    fn name(&self,) -> &str;

    /// Inserts every document without ordering guarantees. A failure of one
    /// document does not stop the others; the overall failure is returned
    /// after all of them were attempted. Returns the number inserted.
    async fn insert_unordered(&self, documents: Vec<Document,>,) -> Result<u64,>;

    /// Drops or empties the collection.
    async fn clear(&self,) -> Result<(),>;
}

#[async_trait]
impl<T: DocumentSink + ?Sized,> DocumentSink for Arc<T,> {
    fn name(&self,) -> &str {
        (**self).name()
    }

    async fn insert_unordered(&self, documents: Vec<Document,>,) -> Result<u64,> {
        (**self).insert_unordered(documents,).await
    }

    async fn clear(&self,) -> Result<(),> {
        (**self).clear().await
    }
}
