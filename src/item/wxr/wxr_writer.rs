use std::{
    cell::RefCell,
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

use log::{debug, info};

use crate::{
    core::item::{ItemWriter, ItemWriterResult},
    error::ExportError,
    wxr::{formatter::WxrFormatter, model::Post},
};

/// Streams a WXR document to any [`Write`] destination.
///
/// `open` writes everything up to the first item, each `write` call appends
/// one `<item>` per post and `close` writes the closing channel and rss tags.
/// Nothing is buffered beyond the underlying [`BufWriter`].
pub struct WxrItemWriter<'a, W: Write = File> {
    formatter: &'a WxrFormatter<'a>,
    stream: RefCell<BufWriter<W>>,
}

impl<'a, W: Write> WxrItemWriter<'a, W> {
    fn write_str(&self, xml: &str) -> ItemWriterResult {
        self.stream
            .borrow_mut()
            .write_all(xml.as_bytes())
            .map_err(|e| ExportError::ItemWriter(format!("Failed to write WXR document: {}", e)))
    }

    /// Flushes and returns the destination.
    pub fn into_inner(self) -> Result<W, ExportError> {
        self.stream.into_inner().into_inner().map_err(|e| {
            ExportError::ItemWriter(format!("Failed to flush WXR document: {}", e.error()))
        })
    }
}

impl<W: Write> ItemWriter<Post> for WxrItemWriter<'_, W> {
    fn write(&self, items: &[Post]) -> ItemWriterResult {
        for post in items {
            let xml = self.formatter.post(post)?;
            self.write_str(&xml)?;
            debug!("Wrote item for post {}", post.id);
        }
        Ok(())
    }

    fn flush(&self) -> ItemWriterResult {
        self.stream
            .borrow_mut()
            .flush()
            .map_err(|e| ExportError::ItemWriter(format!("Failed to flush WXR document: {}", e)))
    }

    fn open(&self) -> ItemWriterResult {
        info!(
            "Writing WXR {} document header",
            self.formatter.wxr_version()
        );
        let head = self.formatter.before_posts()?;
        self.write_str(&head)
    }

    fn close(&self) -> ItemWriterResult {
        let footer = self.formatter.after_posts()?;
        self.write_str(&footer)?;
        self.flush()
    }
}

/// Builder for [`WxrItemWriter`]. A formatter is required.
#[derive(Default)]
pub struct WxrItemWriterBuilder<'a> {
    formatter: Option<&'a WxrFormatter<'a>>,
}

impl<'a> WxrItemWriterBuilder<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn formatter(mut self, formatter: &'a WxrFormatter<'a>) -> Self {
        self.formatter = Some(formatter);
        self
    }

    fn require_formatter(&self) -> Result<&'a WxrFormatter<'a>, ExportError> {
        self.formatter
            .ok_or_else(|| ExportError::Configuration("a WXR formatter is required".to_string()))
    }

    /// Creates (or truncates) the file at `path`.
    pub fn from_path<P: AsRef<Path>>(self, path: P) -> Result<WxrItemWriter<'a>, ExportError> {
        let formatter = self.require_formatter()?;
        let file = File::create(path)
            .map_err(|e| ExportError::ItemWriter(format!("Failed to create WXR file: {}", e)))?;

        Ok(WxrItemWriter {
            formatter,
            stream: RefCell::new(BufWriter::new(file)),
        })
    }

    pub fn from_writer<W: Write>(self, wtr: W) -> Result<WxrItemWriter<'a, W>, ExportError> {
        let formatter = self.require_formatter()?;

        Ok(WxrItemWriter {
            formatter,
            stream: RefCell::new(BufWriter::new(wtr)),
        })
    }
}
