//! Reader and writer adapting the WXR formatter to [`ExportStep`](crate::core::step::ExportStep).

pub mod post_reader;
pub mod wxr_writer;

pub use post_reader::PostItemReader;
pub use wxr_writer::{WxrItemWriter, WxrItemWriterBuilder};
