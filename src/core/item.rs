use crate::error::ExportError;

/// Result of a single read: `Ok(None)` once the reader is exhausted.
pub type ItemReaderResult<I> = Result<Option<I>, ExportError>;

/// Result of a writer operation.
pub type ItemWriterResult = Result<(), ExportError>;

/// Produces the items of a step one at a time.
pub trait ItemReader<I> {
    fn read(&self) -> ItemReaderResult<I>;
}

/// Consumes the items of a step, one chunk at a time.
///
/// `open` is called once before the first chunk and `close` once after the
/// last one. A writer that fails mid-way is flushed but not closed.
pub trait ItemWriter<O> {
    fn write(&self, items: &[O]) -> ItemWriterResult;

    fn flush(&self) -> ItemWriterResult {
        Ok(())
    }

    fn open(&self) -> ItemWriterResult {
        Ok(())
    }

    fn close(&self) -> ItemWriterResult {
        Ok(())
    }
}
