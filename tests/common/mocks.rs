//! Mocks for the output destination and the comment metadata store.
use std::{
    collections::BTreeMap,
    io::{self, Write},
};

use mockall::mock;
use wxr_export::{
    error::ExportError,
    wxr::{CommentMetaStore, model::CommentMeta},
};

mock! {
    pub File {}
    impl Write for File {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize>;
        fn flush(&mut self) -> io::Result<()>;
    }
}

mock! {
    pub MetaStore {}
    impl CommentMetaStore for MetaStore {
        fn comment_meta(&self, comment_id: u64) -> Result<Vec<CommentMeta>, ExportError>;
        fn comment_meta_batch(
            &self,
            comment_ids: &[u64],
        ) -> Result<BTreeMap<u64, Vec<CommentMeta>>, ExportError>;
    }
}
