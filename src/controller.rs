// nc_loader/src/controller.rs
// Drives one collection's ingestion: target, optional clear, header, projection, streaming, flush.

use std::fmt;
use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::{debug, error, info};

use crate::batch::BatchWriter;
use crate::config::RunOptions;
use crate::error::{LoaderError, Result};
use crate::registry::CollectionRegistry;
use crate::sink::DocumentSink;
use crate::source::DelimitedSource;
use crate::transform::transform_with_plan;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize,)]
pub enum RunState {
    Idle,
    TargetSelected,
    Cleared,
    HeaderRead,
    ProjectionResolved,
    Streaming,
    Completed,
    Failed,
}

impl RunState {
    pub fn is_terminal(self,) -> bool {
        matches!(self, RunState::Completed | RunState::Failed)
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_,>,) -> fmt::Result {
        fmt::Debug::fmt(self, f,)
    }
}

/// Counters reported at the end of a successful run.
#[derive(Debug, Clone, PartialEq, Serialize,)]
pub struct IngestionStats {
    pub collection: String,
    pub rows:       u64,
    pub batches:    u64,
    pub fields:     Vec<String,>,
    #[serde(serialize_with = "serialize_secs")]
    pub elapsed:    Duration,
}

impl IngestionStats {
    pub fn elapsed_secs(&self,) -> f64 {
        self.elapsed.as_secs_f64()
    }
}

fn serialize_secs<S: serde::Serializer,>(
    elapsed: &Duration,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error,> {
    serializer.serialize_f64(elapsed.as_secs_f64(),)
}

/// A single-use ingestion run for one registered collection.
///
/// All per-run state (projection plan, buffer, counters) lives inside the run,
/// so running several collections one after another shares nothing.
#[derive(Debug,)]
pub struct IngestionRun {
    collection: String,
    options:    RunOptions,
    state:      RunState,
}

impl IngestionRun {
    pub fn new(collection: impl Into<String,>, options: RunOptions,) -> Self {
        Self {
            collection: collection.into(),
            options,
            state: RunState::Idle,
        }
    }

    pub fn state(&self,) -> RunState {
        self.state
    }

    pub async fn run<S: DocumentSink,>(
        &mut self,
        registry: &CollectionRegistry<S,>,
    ) -> Result<IngestionStats,> {
        if self.state != RunState::Idle {
            return Err(LoaderError::Other(format!(
                "run for '{}' was already started (state {})",
                self.collection, self.state
            ),),);
        }

        let started = Instant::now();
        match self.execute(registry, started,).await {
            Ok(stats,) => {
                self.advance(RunState::Completed,);
                info!(
                    "Finished ingestion of '{}': {} rows in {} batches, {:.3}s",
                    stats.collection,
                    stats.rows,
                    stats.batches,
                    stats.elapsed_secs()
                );
                Ok(stats,)
            },
            Err(e,) => {
                error!(
                    "Ingestion of '{}' failed during {} (state {}): {}",
                    self.collection,
                    e.stage(),
                    self.state,
                    e
                );
                self.advance(RunState::Failed,);
                Err(e,)
            },
        }
    }

    async fn execute<S: DocumentSink,>(
        &mut self,
        registry: &CollectionRegistry<S,>,
        started: Instant,
    ) -> Result<IngestionStats,> {
        let (handle, path,) = registry.resolve(&self.collection,)?;
        self.advance(RunState::TargetSelected,);
        info!(
            "Starting ingestion of '{}' from {}",
            self.collection,
            path.display()
        );

        if self.options.clear_before_insert {
            handle.clear().await?;
            self.advance(RunState::Cleared,);
            info!("Cleared collection '{}'", self.collection);
        }

        let mut source = DelimitedSource::open(path, &self.options.reader,)?;
        let header = source.read_header()?;
        self.advance(RunState::HeaderRead,);

        let plan = self.options.projection.resolve(&header,)?;
        self.advance(RunState::ProjectionResolved,);
        info!(
            "Retaining {} of {} fields for '{}': {:?}",
            plan.names.len(),
            header.len(),
            self.collection,
            plan.names
        );

        let mut writer = BatchWriter::new(handle, self.options.batch_size,)?;
        self.advance(RunState::Streaming,);

        let mut rows = 0u64;
        while let Some(row,) = source.next_row()? {
            let row_number = source.rows_read();
            if row.len() != header.len() {
                return Err(LoaderError::RowShape {
                    row:      row_number,
                    expected: header.len(),
                    actual:   row.len(),
                },);
            }
            let document = transform_with_plan(&row, &plan, row_number,)?;
            writer.add(document,).await?;
            rows += 1;
        }
        drop(source,);

        writer.flush().await?;

        Ok(IngestionStats {
            collection: self.collection.clone(),
            rows,
            batches: writer.batches_written(),
            fields: plan.names,
            elapsed: started.elapsed(),
        },)
    }

    fn advance(&mut self, next: RunState,) {
        debug!("Run '{}': {} -> {}", self.collection, self.state, next);
        self.state = next;
    }
}
