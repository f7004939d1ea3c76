/// Streaming WXR reader and writer
pub mod wxr;
