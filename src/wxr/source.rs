use std::{collections::BTreeMap, io::Read};

use serde::{Deserialize, Serialize};

use crate::{
    error::ExportError,
    wxr::model::{Author, CommentMeta, Post, SiteMetadata, Term},
    xml::encoding::{Utf8Policy, coerce_utf8},
};

/// Lazy sequence of posts produced by an [`ExportSource`].
pub type PostStream<'a> = Box<dyn Iterator<Item = Result<Post, ExportError>> + 'a>;

/// The dataset being exported.
///
/// Implementations wrap whatever query layer holds the content. Term
/// collections are returned in export order; a term's `parent` refers to the
/// `term_id` of another term of the same collection.
///
/// Any error returned here aborts the export.
pub trait ExportSource {
    fn site_metadata(&self) -> Result<SiteMetadata, ExportError>;

    fn authors(&self) -> Result<Vec<Author>, ExportError>;

    fn categories(&self) -> Result<Vec<Term>, ExportError>;

    fn tags(&self) -> Result<Vec<Term>, ExportError>;

    fn nav_menu_terms(&self) -> Result<Vec<Term>, ExportError>;

    fn custom_taxonomies_terms(&self) -> Result<Vec<Term>, ExportError>;

    /// Posts are pulled one at a time so the document can be streamed.
    fn posts(&self) -> PostStream<'_>;

    /// Trusted markup identifying the generating software, usually a comment.
    fn generator_tag(&self) -> String;

    /// Encoding label written in the XML declaration.
    fn charset(&self) -> String;
}

/// Read access to comment metadata.
pub trait CommentMetaStore {
    /// Metadata rows of a single comment.
    fn comment_meta(&self, comment_id: u64) -> Result<Vec<CommentMeta>, ExportError>;

    /// Metadata rows of several comments at once, keyed by comment id.
    ///
    /// The formatter calls this once per post. The default implementation
    /// falls back to one [`comment_meta`](Self::comment_meta) call per id;
    /// stores backed by a database should override it with a single query.
    fn comment_meta_batch(
        &self,
        comment_ids: &[u64],
    ) -> Result<BTreeMap<u64, Vec<CommentMeta>>, ExportError> {
        comment_ids
            .iter()
            .map(|&id| self.comment_meta(id).map(|metas| (id, metas)))
            .collect()
    }
}

/// Store for exports without comment metadata.
pub struct NoCommentMeta;

impl CommentMetaStore for NoCommentMeta {
    fn comment_meta(&self, _comment_id: u64) -> Result<Vec<CommentMeta>, ExportError> {
        Ok(Vec::new())
    }
}

/// Per-field rendering hooks applied while formatting posts.
///
/// Every hook defaults to passing the record value through. Override them to
/// filter titles, rewrite URLs or resolve attachment locations.
pub trait ExportHooks {
    fn title(&self, post: &Post) -> String {
        post.post_title.clone()
    }

    fn permalink(&self, post: &Post) -> String {
        post.permalink.clone()
    }

    fn guid(&self, post: &Post) -> String {
        post.guid.clone()
    }

    fn attachment_url(&self, post: &Post) -> Option<String> {
        post.attachment_url.clone()
    }

    fn comment_author_url(&self, url: &str) -> String {
        url.to_string()
    }

    /// Extra trusted markup written at the end of the channel head.
    fn rss2_head(&self) -> Option<String> {
        None
    }
}

/// Hooks that leave every value untouched.
pub struct DefaultHooks;

impl ExportHooks for DefaultHooks {}

/// A whole export held in memory.
///
/// Implements both [`ExportSource`] and [`CommentMetaStore`]. Mostly useful to
/// export a JSON dump of a site.
///
/// # Examples
///
/// ```
/// use wxr_export::wxr::source::{ExportSource, MemoryExport};
///
/// let json = r#"{
///     "site": { "name": "My blog", "url": "https://example.com" },
///     "posts": [ { "id": 1, "post_title": "Hello" } ]
/// }"#;
///
/// let export = MemoryExport::from_json_str(json).unwrap();
/// assert_eq!(export.site_metadata().unwrap().name, "My blog");
/// assert_eq!(export.posts().count(), 1);
/// assert_eq!(export.charset(), "UTF-8");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MemoryExport {
    pub site: SiteMetadata,
    pub authors: Vec<Author>,
    pub categories: Vec<Term>,
    pub tags: Vec<Term>,
    pub nav_menu_terms: Vec<Term>,
    pub custom_taxonomies_terms: Vec<Term>,
    pub posts: Vec<Post>,
    pub comment_meta: BTreeMap<u64, Vec<CommentMeta>>,
    pub generator: String,
    pub charset: String,
}

impl Default for MemoryExport {
    fn default() -> Self {
        Self {
            site: SiteMetadata::default(),
            authors: Vec::new(),
            categories: Vec::new(),
            tags: Vec::new(),
            nav_menu_terms: Vec::new(),
            custom_taxonomies_terms: Vec::new(),
            posts: Vec::new(),
            comment_meta: BTreeMap::new(),
            generator: String::new(),
            charset: "UTF-8".to_string(),
        }
    }
}

impl MemoryExport {
    pub fn from_json_str(json: &str) -> Result<Self, ExportError> {
        serde_json::from_str(json)
            .map_err(|e| ExportError::DataSource(format!("Failed to parse export JSON: {}", e)))
    }

    /// Reads a JSON dump, converting bytes that are not UTF-8 as Latin-1.
    pub fn from_reader<R: Read>(rdr: R) -> Result<Self, ExportError> {
        Self::from_reader_with_policy(rdr, Utf8Policy::default())
    }

    /// Reads a JSON dump, applying `policy` to bytes that are not UTF-8.
    pub fn from_reader_with_policy<R: Read>(
        mut rdr: R,
        policy: Utf8Policy,
    ) -> Result<Self, ExportError> {
        let mut bytes = Vec::new();
        rdr.read_to_end(&mut bytes)
            .map_err(|e| ExportError::DataSource(format!("Failed to read export JSON: {}", e)))?;
        Self::from_json_str(&coerce_utf8(&bytes, policy)?)
    }
}

impl ExportSource for MemoryExport {
    fn site_metadata(&self) -> Result<SiteMetadata, ExportError> {
        Ok(self.site.clone())
    }

    fn authors(&self) -> Result<Vec<Author>, ExportError> {
        Ok(self.authors.clone())
    }

    fn categories(&self) -> Result<Vec<Term>, ExportError> {
        Ok(self.categories.clone())
    }

    fn tags(&self) -> Result<Vec<Term>, ExportError> {
        Ok(self.tags.clone())
    }

    fn nav_menu_terms(&self) -> Result<Vec<Term>, ExportError> {
        Ok(self.nav_menu_terms.clone())
    }

    fn custom_taxonomies_terms(&self) -> Result<Vec<Term>, ExportError> {
        Ok(self.custom_taxonomies_terms.clone())
    }

    fn posts(&self) -> PostStream<'_> {
        Box::new(self.posts.iter().cloned().map(Ok))
    }

    fn generator_tag(&self) -> String {
        self.generator.clone()
    }

    fn charset(&self) -> String {
        self.charset.clone()
    }
}

impl CommentMetaStore for MemoryExport {
    fn comment_meta(&self, comment_id: u64) -> Result<Vec<CommentMeta>, ExportError> {
        Ok(self
            .comment_meta
            .get(&comment_id)
            .cloned()
            .unwrap_or_default())
    }
}
