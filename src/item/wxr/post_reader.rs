use std::cell::RefCell;

use log::debug;

use crate::{
    core::item::{ItemReader, ItemReaderResult},
    wxr::{model::Post, source::ExportSource, source::PostStream},
};

/// Pulls posts from an [`ExportSource`] one at a time.
///
/// The underlying stream is created once, when the reader is built. An error
/// yielded by the stream is returned as is and ends the step.
pub struct PostItemReader<'a> {
    posts: RefCell<PostStream<'a>>,
}

impl<'a> PostItemReader<'a> {
    pub fn new(source: &'a dyn ExportSource) -> Self {
        Self {
            posts: RefCell::new(source.posts()),
        }
    }
}

impl ItemReader<Post> for PostItemReader<'_> {
    fn read(&self) -> ItemReaderResult<Post> {
        let post = self.posts.borrow_mut().next().transpose()?;
        if let Some(post) = &post {
            debug!("Read post {}", post.id);
        }
        Ok(post)
    }
}
