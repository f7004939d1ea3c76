use std::time::{Duration, Instant};

use log::{debug, error, info};
use uuid::Uuid;

use crate::error::ExportError;

use super::{
    build_name,
    item::{ItemReader, ItemWriter},
};

#[derive(Debug, PartialEq, Clone, Copy)]
pub enum ChunkStatus {
    /// The chunk reached its configured size, more items may follow.
    Full,
    /// The reader is exhausted.
    Finished,
}

#[derive(Debug, PartialEq, Clone, Copy)]
pub enum StepStatus {
    Starting,
    Success,
    ReadError,
    WriteError,
}

/// Outcome of a step run.
#[derive(Debug)]
pub struct StepExecution {
    /// Unique identifier for this run
    pub id: Uuid,
    /// Human-readable name for the step
    pub name: String,
    pub status: StepStatus,
    pub start_time: Instant,
    pub end_time: Instant,
    pub duration: Duration,
    /// Number of items successfully read
    pub read_count: usize,
    /// Number of items successfully written
    pub write_count: usize,
}

impl StepExecution {
    fn new(name: &str) -> Self {
        let now = Instant::now();
        Self {
            id: Uuid::new_v4(),
            name: name.to_string(),
            status: StepStatus::Starting,
            start_time: now,
            end_time: now,
            duration: Duration::ZERO,
            read_count: 0,
            write_count: 0,
        }
    }
}

/// Reads items and hands them to a writer in chunks.
///
/// There is no skip policy: the first read or write error stops the step and
/// is returned to the caller. The writer is flushed in that case but not
/// closed, so a document writer never appends its footer to a truncated
/// export.
///
/// # Examples
///
/// ```
/// use std::io::Cursor;
///
/// use wxr_export::{
///     core::step::StepBuilder,
///     item::wxr::{PostItemReader, WxrItemWriterBuilder},
///     wxr::{MemoryExport, WxrFormatterBuilder},
/// };
///
/// let export = MemoryExport::from_json_str(r#"{
///     "posts": [ { "id": 1 }, { "id": 2 }, { "id": 3 } ]
/// }"#).unwrap();
/// let formatter = WxrFormatterBuilder::new().source(&export).build().unwrap();
///
/// let reader = PostItemReader::new(&export);
/// let writer = WxrItemWriterBuilder::new()
///     .formatter(&formatter)
///     .from_writer(Cursor::new(Vec::new()))
///     .unwrap();
///
/// let step = StepBuilder::new()
///     .name("export".to_string())
///     .reader(&reader)
///     .writer(&writer)
///     .chunk(2)
///     .build()
///     .unwrap();
///
/// let execution = step.execute().unwrap();
/// assert_eq!(execution.read_count, 3);
/// assert_eq!(execution.write_count, 3);
/// ```
pub struct ExportStep<'a, I> {
    name: String,
    /// Component responsible for reading items from the source
    reader: &'a dyn ItemReader<I>,
    /// Component responsible for writing items to the destination
    writer: &'a dyn ItemWriter<I>,
    /// Number of items to write in each chunk
    chunk_size: u16,
}

impl<'a, I> ExportStep<'a, I> {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Runs the step until the reader is exhausted or an error occurs.
    pub fn execute(&self) -> Result<StepExecution, ExportError> {
        let start_time = Instant::now();
        let mut execution = StepExecution::new(&self.name);

        info!("Start of step: {}, id: {}", execution.name, execution.id);

        let result = self
            .writer
            .open()
            .and_then(|()| self.run_chunks(&mut execution))
            .and_then(|()| self.writer.close());

        execution.start_time = start_time;
        execution.end_time = Instant::now();
        execution.duration = start_time.elapsed();

        match result {
            Ok(()) => {
                execution.status = StepStatus::Success;
                info!(
                    "End of step: {}, id: {}, read: {}, written: {}",
                    execution.name, execution.id, execution.read_count, execution.write_count
                );
                Ok(execution)
            }
            Err(err) => {
                if execution.status == StepStatus::Starting {
                    execution.status = StepStatus::WriteError;
                }
                if let Err(flush_err) = self.writer.flush() {
                    error!("Failed to flush after error: {}", flush_err);
                }
                error!(
                    "Step {} aborted with status {:?}: {}",
                    execution.name, execution.status, err
                );
                Err(err)
            }
        }
    }

    fn run_chunks(&self, execution: &mut StepExecution) -> Result<(), ExportError> {
        loop {
            let (items, status) = self.read_chunk(execution)?;

            if !items.is_empty() {
                self.write_chunk(execution, &items)?;
            }

            if status == ChunkStatus::Finished {
                return Ok(());
            }
        }
    }

    /// Reads up to `chunk_size` items.
    fn read_chunk(
        &self,
        execution: &mut StepExecution,
    ) -> Result<(Vec<I>, ChunkStatus), ExportError> {
        debug!("Start reading chunk");

        let mut read_items = Vec::with_capacity(self.chunk_size as usize);

        loop {
            match self.reader.read() {
                Ok(Some(item)) => {
                    read_items.push(item);
                    execution.read_count += 1;

                    if read_items.len() >= self.chunk_size as usize {
                        debug!("End reading chunk: FULL");
                        return Ok((read_items, ChunkStatus::Full));
                    }
                }
                Ok(None) => {
                    debug!("End reading chunk: FINISHED");
                    return Ok((read_items, ChunkStatus::Finished));
                }
                Err(err) => {
                    execution.status = StepStatus::ReadError;
                    return Err(err);
                }
            }
        }
    }

    fn write_chunk(&self, execution: &mut StepExecution, items: &[I]) -> Result<(), ExportError> {
        debug!("Writing chunk of {} items", items.len());

        match self.writer.write(items).and_then(|()| self.writer.flush()) {
            Ok(()) => {
                execution.write_count += items.len();
                Ok(())
            }
            Err(err) => {
                execution.status = StepStatus::WriteError;
                Err(err)
            }
        }
    }
}

/// Builder for [`ExportStep`].
///
/// Reader and writer are required; the chunk size defaults to 10 and the name
/// to a random identifier.
pub struct StepBuilder<'a, I> {
    name: Option<String>,
    reader: Option<&'a dyn ItemReader<I>>,
    writer: Option<&'a dyn ItemWriter<I>>,
    chunk_size: u16,
}

impl<'a, I> Default for StepBuilder<'a, I> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, I> StepBuilder<'a, I> {
    pub fn new() -> Self {
        Self {
            name: None,
            reader: None,
            writer: None,
            chunk_size: 10,
        }
    }

    pub fn name(mut self, name: String) -> Self {
        self.name = Some(name);
        self
    }

    pub fn reader(mut self, reader: &'a impl ItemReader<I>) -> Self {
        self.reader = Some(reader);
        self
    }

    pub fn writer(mut self, writer: &'a impl ItemWriter<I>) -> Self {
        self.writer = Some(writer);
        self
    }

    /// Number of items written per chunk. Zero is treated as one.
    pub fn chunk(mut self, chunk_size: u16) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    pub fn build(self) -> Result<ExportStep<'a, I>, ExportError> {
        let reader = self
            .reader
            .ok_or_else(|| ExportError::Configuration("a reader is required".to_string()))?;
        let writer = self
            .writer
            .ok_or_else(|| ExportError::Configuration("a writer is required".to_string()))?;

        Ok(ExportStep {
            name: self.name.unwrap_or_else(build_name),
            reader,
            writer,
            chunk_size: self.chunk_size,
        })
    }
}
