// nc_loader/tests/common/mod.rs
// Shared helpers: an in-memory sink that records every bulk insert.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use mongodb::bson::Document;
use nc_loader::error::{LoaderError, Result};
use nc_loader::registry::CollectionRegistry;
use nc_loader::sink::DocumentSink;

#[derive(Default,)]
pub struct RecordingSink {
    name:          String,
    batches:       Mutex<Vec<Vec<Document,>,>,>,
    clears:        AtomicUsize,
    /// 1-based index of the insert call that should fail.
    fail_on_batch: Option<usize,>,
    fail_clear:    bool,
}

impl RecordingSink {
    pub fn new(name: &str,) -> Self {
        Self {
            name: name.to_string(),
            ..Self::default()
        }
    }

    pub fn failing_on(name: &str, batch: usize,) -> Self {
        Self {
            name: name.to_string(),
            fail_on_batch: Some(batch,),
            ..Self::default()
        }
    }

    pub fn failing_clear(name: &str,) -> Self {
        Self {
            name: name.to_string(),
            fail_clear: true,
            ..Self::default()
        }
    }

    /// Seeds the sink with a document, as if left over from an earlier load.
    pub fn preload(&self, document: Document,) {
        self.batches.lock().unwrap().push(vec![document],);
    }

    pub fn batches(&self,) -> Vec<Vec<Document,>,> {
        self.batches.lock().unwrap().clone()
    }

    pub fn batch_sizes(&self,) -> Vec<usize,> {
        self.batches.lock().unwrap().iter().map(Vec::len,).collect()
    }

    pub fn documents(&self,) -> Vec<Document,> {
        self.batches.lock().unwrap().iter().flatten().cloned().collect()
    }

    pub fn clears(&self,) -> usize {
        self.clears.load(Ordering::SeqCst,)
    }
}

#[async_trait]
impl DocumentSink for RecordingSink {
    fn name(&self,) -> &str {
        &self.name
    }

    async fn insert_unordered(&self, documents: Vec<Document,>,) -> Result<u64,> {
        let mut batches = self.batches.lock().unwrap();
        if self.fail_on_batch == Some(batches.len() + 1,) {
            return Err(LoaderError::WriteError {
                collection: self.name.clone(),
                attempted:  documents.len(),
                failed:     documents.len(),
                cause:      "simulated outage".to_string(),
            },);
        }
        let inserted = documents.len() as u64;
        batches.push(documents,);
        Ok(inserted,)
    }

    async fn clear(&self,) -> Result<(),> {
        if self.fail_clear {
            return Err(LoaderError::ClearError {
                collection: self.name.clone(),
                cause:      "simulated outage".to_string(),
            },);
        }
        self.clears.fetch_add(1, Ordering::SeqCst,);
        self.batches.lock().unwrap().clear();
        Ok((),)
    }
}

pub fn write_source(dir: &Path, file_name: &str, contents: &[u8],) -> PathBuf {
    let path = dir.join(file_name,);
    std::fs::write(&path, contents,).expect("Failed to write source file",);
    path
}

pub fn registry_with(
    name: &str,
    sink: RecordingSink,
    path: &Path,
) -> CollectionRegistry<RecordingSink,> {
    let mut registry = CollectionRegistry::new();
    registry
        .register(name, sink, path,)
        .expect("Failed to register collection",);
    registry
}

pub fn sink_of<'a,>(registry: &'a CollectionRegistry<RecordingSink,>, name: &str,) -> &'a RecordingSink {
    registry.resolve(name,).expect("collection should be registered",).0
}
