//! WXR document assembly.
//!
//! [`formatter::WxrFormatter`] walks an export dataset exposed through
//! [`source::ExportSource`] and produces the document section by section:
//! header, site metadata, authors, terms, one `<item>` per post and footer.

/// Version of the export format, embedded in the namespaces and in
/// `wp:wxr_version`.
pub const WXR_VERSION: &str = "1.2";

/// Section formatters.
pub mod formatter;

/// Export records.
pub mod model;

/// Data source and hook traits, plus an in-memory dataset.
pub mod source;

pub use formatter::{WxrFormatter, WxrFormatterBuilder};
pub use source::{CommentMetaStore, DefaultHooks, ExportHooks, ExportSource, MemoryExport};
