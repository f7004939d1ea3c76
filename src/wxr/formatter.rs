use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDateTime;
use log::{debug, warn};

use crate::{
    error::ExportError,
    wxr::{
        WXR_VERSION,
        model::{CommentMeta, Post, Term},
        source::{CommentMetaStore, DefaultHooks, ExportHooks, ExportSource, NoCommentMeta},
    },
    xml::XmlBuilder,
};

const IMPORT_INSTRUCTIONS: &str = r#"
 This is a WordPress eXtended RSS file generated by WordPress as an export of your site.
 It contains information about your site's posts, pages, comments, categories, and other content.
 You may use this file to transfer that content from one site to another.
 This file is not intended to serve as a complete backup of your site.

 To import this information into a WordPress site follow these steps:
 1. Log in to that site as an administrator.
 2. Go to Tools: Import in the WordPress admin panel.
 3. Install the "WordPress" importer from the list.
 4. Activate & Run Importer.
 5. Upload this file using the form provided on that page.
 6. You will first be asked to map the authors in this export file to users
    on the site. For each author, you may choose to map to an
    existing user on the site or to create a new user.
 7. WordPress will then import each of the posts, pages, comments, categories, etc.
    contained in this file into your site.
"#;

const NAV_MENU_TAXONOMY: &str = "nav_menu";

/// The document is always written as UTF-8.
const DOCUMENT_ENCODING: &str = "UTF-8";

static NO_COMMENT_META: NoCommentMeta = NoCommentMeta;
static DEFAULT_HOOKS: DefaultHooks = DefaultHooks;

/// Formats an export dataset as a WXR document.
///
/// The document is produced in independent sections so it can be streamed:
/// [`before_posts`](Self::before_posts), then one `<item>` per post from
/// [`posts`](Self::posts), then [`after_posts`](Self::after_posts).
///
/// # Examples
///
/// ```
/// use wxr_export::wxr::{formatter::WxrFormatterBuilder, source::MemoryExport};
///
/// let export = MemoryExport::from_json_str(r#"{
///     "site": { "name": "Notes", "url": "https://example.com" },
///     "posts": [ { "id": 1, "post_title": "First", "post_type": "post" } ]
/// }"#).unwrap();
///
/// let formatter = WxrFormatterBuilder::new()
///     .source(&export)
///     .comment_meta(&export)
///     .build()
///     .unwrap();
///
/// let mut document = formatter.before_posts().unwrap();
/// for item in formatter.posts() {
///     document.push_str(&item.unwrap());
/// }
/// document.push_str(&formatter.after_posts().unwrap());
///
/// assert!(document.contains("<title>Notes</title>"));
/// assert!(document.contains("<item><title>First</title>"));
/// assert!(document.ends_with("</channel></rss>"));
/// ```
pub struct WxrFormatter<'a> {
    source: &'a dyn ExportSource,
    comment_meta: &'a dyn CommentMetaStore,
    hooks: &'a dyn ExportHooks,
    wxr_version: String,
    author_logins: HashMap<u64, String>,
}

impl<'a> WxrFormatter<'a> {
    pub fn wxr_version(&self) -> &str {
        &self.wxr_version
    }

    /// Everything that precedes the first `<item>`.
    pub fn before_posts(&self) -> Result<String, ExportError> {
        let mut xml = String::new();
        xml.push_str(&self.header()?);
        xml.push_str(&self.site_metadata()?);
        xml.push_str(&self.authors()?);
        xml.push_str(&self.categories()?);
        xml.push_str(&self.tags()?);
        xml.push_str(&self.nav_menu_terms()?);
        xml.push_str(&self.custom_taxonomies_terms()?);
        xml.push_str(&self.rss2_head()?);
        Ok(xml)
    }

    /// One formatted `<item>` per post, pulled lazily from the source.
    pub fn posts(&self) -> impl Iterator<Item = Result<String, ExportError>> + '_ {
        self.source
            .posts()
            .map(move |post| post.and_then(|post| self.post(&post)))
    }

    pub fn after_posts(&self) -> Result<String, ExportError> {
        self.footer()
    }

    /// XML declaration, import instructions, generator marker and the opening
    /// `<rss>` and `<channel>` tags.
    ///
    /// The declaration always names UTF-8, the encoding the document is
    /// written in, whatever charset the source reports.
    pub fn header(&self) -> Result<String, ExportError> {
        let excerpt_ns = format!("http://wordpress.org/export/{}/excerpt/", self.wxr_version);
        let wp_ns = format!("http://wordpress.org/export/{}/", self.wxr_version);
        let generator = self.source.generator_tag();

        let charset = self.source.charset();
        if !charset.eq_ignore_ascii_case(DOCUMENT_ENCODING) && !charset.eq_ignore_ascii_case("utf8")
        {
            warn!(
                "Source charset {} ignored, the document is written as {}",
                charset, DOCUMENT_ENCODING
            );
        }

        let mut xml = XmlBuilder::new();
        xml.declaration(DOCUMENT_ENCODING)
            .comment(IMPORT_INSTRUCTIONS);
        if !generator.is_empty() {
            xml.raw(&generator);
        }
        xml.open_tag(
            "rss",
            &[
                ("version", "2.0"),
                ("xmlns:excerpt", excerpt_ns.as_str()),
                ("xmlns:content", "http://purl.org/rss/1.0/modules/content/"),
                ("xmlns:wfw", "http://wellformedweb.org/CommentAPI/"),
                ("xmlns:dc", "http://purl.org/dc/elements/1.1/"),
                ("xmlns:wp", wp_ns.as_str()),
            ],
        )
        .open_tag("channel", &[]);

        xml.to_xml()
    }

    pub fn site_metadata(&self) -> Result<String, ExportError> {
        let metadata = self.source.site_metadata()?;

        let mut xml = XmlBuilder::new();
        xml.title(&metadata.name)
            .link(&metadata.url)
            .description(&metadata.description)
            .pub_date(&metadata.pub_date)
            .language(&metadata.language)
            .tag("wp:wxr_version", &self.wxr_version)
            .tag("wp:base_site_url", &metadata.site_url)
            .tag("wp:base_blog_url", &metadata.blog_url);

        xml.to_xml_strict()
    }

    pub fn authors(&self) -> Result<String, ExportError> {
        let authors = self.source.authors()?;
        debug!("Formatting {} authors", authors.len());

        let mut xml = XmlBuilder::new();
        for author in &authors {
            xml.open_tag("wp:author", &[])
                .tag("wp:author_id", author.id)
                .tag("wp:author_login", &author.user_login)
                .tag("wp:author_email", &author.user_email)
                .cdata_tag("wp:author_display_name", &author.display_name)
                .cdata_tag("wp:author_first_name", &author.user_firstname)
                .cdata_tag("wp:author_last_name", &author.user_lastname)
                .close_tag();
        }

        xml.to_xml_strict()
    }

    pub fn categories(&self) -> Result<String, ExportError> {
        let categories = self.source.categories()?;
        debug!("Formatting {} categories", categories.len());
        let slugs = slug_index(&categories);

        let mut xml = XmlBuilder::new();
        for category in &categories {
            xml.open_tag("wp:category", &[])
                .tag("wp:term_id", category.term_id)
                .tag("wp:category_nicename", &category.slug)
                .tag("wp:category_parent", parent_slug(&slugs, category))
                .optional_cdata_tag("wp:cat_name", &category.name)
                .optional_cdata_tag("wp:category_description", &category.description)
                .close_tag();
        }

        xml.to_xml_strict()
    }

    pub fn tags(&self) -> Result<String, ExportError> {
        let tags = self.source.tags()?;
        debug!("Formatting {} tags", tags.len());

        let mut xml = XmlBuilder::new();
        for tag in &tags {
            xml.open_tag("wp:tag", &[])
                .tag("wp:term_id", tag.term_id)
                .tag("wp:tag_slug", &tag.slug)
                .optional_cdata_tag("wp:tag_name", &tag.name)
                .optional_cdata_tag("wp:tag_description", &tag.description)
                .close_tag();
        }

        xml.to_xml_strict()
    }

    pub fn nav_menu_terms(&self) -> Result<String, ExportError> {
        self.terms(&self.source.nav_menu_terms()?)
    }

    pub fn custom_taxonomies_terms(&self) -> Result<String, ExportError> {
        self.terms(&self.source.custom_taxonomies_terms()?)
    }

    /// Markup contributed by [`ExportHooks::rss2_head`].
    pub fn rss2_head(&self) -> Result<String, ExportError> {
        let mut xml = XmlBuilder::new();
        if let Some(markup) = self.hooks.rss2_head() {
            xml.raw(&markup);
        }
        xml.to_xml()
    }

    /// Formats a single post as an `<item>`.
    ///
    /// Comment metadata for all comments of the post is fetched with one
    /// batched call; a failure there fails the post.
    pub fn post(&self, post: &Post) -> Result<String, ExportError> {
        debug!("Formatting post {} ({})", post.id, post.post_type);

        let comment_ids: Vec<u64> = post.comments.iter().map(|c| c.comment_id).collect();
        let mut comment_meta = if comment_ids.is_empty() {
            BTreeMap::new()
        } else {
            self.comment_meta.comment_meta_batch(&comment_ids)?
        };

        let mut xml = XmlBuilder::new();
        xml.open_tag("item", &[])
            .title(&self.hooks.title(post))
            .link(&self.hooks.permalink(post))
            .pub_date(&format_pub_date(&post.post_date_gmt).unwrap_or_default())
            .tag("dc:creator", self.author_login(post.post_author))
            .guid(&self.hooks.guid(post), &[("isPermaLink", "false")])
            .description("")
            .cdata_tag("content:encoded", &post.post_content)
            .cdata_tag("excerpt:encoded", &post.post_excerpt)
            .tag("wp:post_id", post.id)
            .tag("wp:post_date", &post.post_date)
            .tag("wp:post_date_gmt", &post.post_date_gmt)
            .tag("wp:comment_status", &post.comment_status)
            .tag("wp:ping_status", &post.ping_status)
            .tag("wp:post_name", &post.post_name)
            .tag("wp:status", &post.post_status)
            .tag("wp:post_parent", post.post_parent)
            .tag("wp:menu_order", post.menu_order)
            .tag("wp:post_type", &post.post_type)
            .tag("wp:post_password", &post.post_password)
            .tag("wp:is_sticky", u8::from(post.is_sticky))
            .optional_tag("wp:attachment_url", self.hooks.attachment_url(post));

        for term in &post.terms {
            xml.category(
                &[
                    ("domain", term.taxonomy.as_str()),
                    ("nicename", term.slug.as_str()),
                ],
                &term.name,
            );
        }

        for meta in &post.meta {
            xml.open_tag("wp:postmeta", &[])
                .tag("wp:meta_key", &meta.meta_key)
                .cdata_tag("wp:meta_value", &meta.meta_value)
                .close_tag();
        }

        for comment in &post.comments {
            let metas = comment_meta
                .remove(&comment.comment_id)
                .unwrap_or_default();

            xml.open_tag("wp:comment", &[])
                .tag("wp:comment_id", comment.comment_id)
                .cdata_tag("wp:comment_author", &comment.comment_author)
                .tag("wp:comment_author_email", &comment.comment_author_email)
                .tag(
                    "wp:comment_author_url",
                    self.hooks.comment_author_url(&comment.comment_author_url),
                )
                .tag("wp:comment_author_IP", &comment.comment_author_ip)
                .tag("wp:comment_date", &comment.comment_date)
                .tag("wp:comment_date_gmt", &comment.comment_date_gmt)
                .cdata_tag("wp:comment_content", &comment.comment_content)
                .tag("wp:comment_approved", &comment.comment_approved)
                .tag("wp:comment_type", &comment.comment_type)
                .tag("wp:comment_parent", comment.comment_parent)
                .tag("wp:comment_user_id", comment.user_id)
                .append(comment_meta_block(&metas))
                .close_tag();
        }

        xml.close_tag();
        xml.to_xml_strict()
    }

    pub fn footer(&self) -> Result<String, ExportError> {
        let mut xml = XmlBuilder::new();
        xml.end_fragment("channel").end_fragment("rss");
        xml.to_xml()
    }

    fn terms(&self, terms: &[Term]) -> Result<String, ExportError> {
        debug!("Formatting {} terms", terms.len());
        let slugs = slug_index(terms);

        let mut xml = XmlBuilder::new();
        for term in terms {
            xml.open_tag("wp:term", &[])
                .tag("wp:term_id", term.term_id)
                .tag("wp:term_taxonomy", &term.taxonomy)
                .tag("wp:term_slug", &term.slug);
            if term.taxonomy != NAV_MENU_TAXONOMY {
                xml.tag("wp:term_parent", parent_slug(&slugs, term));
            }
            xml.optional_cdata_tag("wp:term_name", &term.name)
                .optional_cdata_tag("wp:term_description", &term.description)
                .close_tag();
        }

        xml.to_xml_strict()
    }

    fn author_login(&self, author_id: u64) -> &str {
        match self.author_logins.get(&author_id) {
            Some(login) => login.as_str(),
            None => {
                debug!("No author with id {}", author_id);
                ""
            }
        }
    }
}

fn comment_meta_block(metas: &[CommentMeta]) -> XmlBuilder {
    let mut xml = XmlBuilder::new();
    for meta in metas {
        xml.open_tag("wp:commentmeta", &[])
            .tag("wp:meta_key", &meta.meta_key)
            .cdata_tag("wp:meta_value", &meta.meta_value)
            .close_tag();
    }
    xml
}

fn slug_index(terms: &[Term]) -> HashMap<u64, &str> {
    terms
        .iter()
        .map(|term| (term.term_id, term.slug.as_str()))
        .collect()
}

/// Slug of the term's parent, empty for a top-level term.
fn parent_slug<'t>(slugs: &HashMap<u64, &'t str>, term: &Term) -> &'t str {
    if term.parent == 0 {
        return "";
    }
    match slugs.get(&term.parent) {
        Some(slug) => *slug,
        None => {
            warn!(
                "Parent {} of term {} ({}) is not part of the export",
                term.parent, term.term_id, term.taxonomy
            );
            ""
        }
    }
}

/// Formats a GMT database date as an RSS date, always with a `+0000` offset.
///
/// Returns `None` for the zero date or any value that is not a valid
/// `YYYY-MM-DD HH:MM:SS` timestamp.
///
/// # Examples
///
/// ```
/// use wxr_export::wxr::formatter::format_pub_date;
///
/// assert_eq!(
///     format_pub_date("2024-03-05 14:07:09").as_deref(),
///     Some("Tue, 05 Mar 2024 14:07:09 +0000")
/// );
/// assert_eq!(format_pub_date("0000-00-00 00:00:00"), None);
/// ```
pub fn format_pub_date(gmt: &str) -> Option<String> {
    NaiveDateTime::parse_from_str(gmt, "%Y-%m-%d %H:%M:%S")
        .map(|date| date.format("%a, %d %b %Y %H:%M:%S +0000").to_string())
        .ok()
}

/// Builder for [`WxrFormatter`].
///
/// Only the source is required. Comment metadata defaults to an empty store,
/// hooks default to [`DefaultHooks`] and the format version to
/// [`WXR_VERSION`].
#[derive(Default)]
pub struct WxrFormatterBuilder<'a> {
    source: Option<&'a dyn ExportSource>,
    comment_meta: Option<&'a dyn CommentMetaStore>,
    hooks: Option<&'a dyn ExportHooks>,
    wxr_version: Option<String>,
}

impl<'a> WxrFormatterBuilder<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn source(mut self, source: &'a dyn ExportSource) -> Self {
        self.source = Some(source);
        self
    }

    pub fn comment_meta(mut self, comment_meta: &'a dyn CommentMetaStore) -> Self {
        self.comment_meta = Some(comment_meta);
        self
    }

    pub fn hooks(mut self, hooks: &'a dyn ExportHooks) -> Self {
        self.hooks = Some(hooks);
        self
    }

    /// Overrides the format version written in the namespaces and
    /// `wp:wxr_version`.
    pub fn wxr_version(mut self, wxr_version: &str) -> Self {
        self.wxr_version = Some(wxr_version.to_string());
        self
    }

    /// Builds the formatter, loading the author list to resolve post authors.
    pub fn build(self) -> Result<WxrFormatter<'a>, ExportError> {
        let source = self.source.ok_or_else(|| {
            ExportError::Configuration("an export source is required".to_string())
        })?;

        let author_logins = source
            .authors()?
            .into_iter()
            .map(|author| (author.id, author.user_login))
            .collect();

        Ok(WxrFormatter {
            source,
            comment_meta: self.comment_meta.unwrap_or(&NO_COMMENT_META),
            hooks: self.hooks.unwrap_or(&DEFAULT_HOOKS),
            wxr_version: self
                .wxr_version
                .unwrap_or_else(|| WXR_VERSION.to_string()),
            author_logins,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wxr::{
        model::{Author, Comment, PostMeta, PostTerm, SiteMetadata},
        source::MemoryExport,
    };

    fn term(term_id: u64, taxonomy: &str, slug: &str, parent: u64) -> Term {
        Term {
            term_id,
            taxonomy: taxonomy.to_string(),
            slug: slug.to_string(),
            parent,
            name: slug.to_uppercase(),
            description: String::new(),
        }
    }

    fn formatter(export: &MemoryExport) -> WxrFormatter<'_> {
        WxrFormatterBuilder::new()
            .source(export)
            .comment_meta(export)
            .build()
            .unwrap()
    }

    #[test]
    fn pub_date_is_always_utc() {
        assert_eq!(
            format_pub_date("1999-12-31 23:59:59").as_deref(),
            Some("Fri, 31 Dec 1999 23:59:59 +0000")
        );
        assert_eq!(format_pub_date(""), None);
        assert_eq!(format_pub_date(crate::wxr::model::ZERO_DATE), None);
        assert_eq!(format_pub_date("2024-02-30 10:00:00"), None);
    }

    #[test]
    fn header_declares_the_namespaces() {
        let export = MemoryExport {
            generator: "<!-- generator=\"wxr-export/0.1\" -->".to_string(),
            ..MemoryExport::default()
        };
        let header = formatter(&export).header().unwrap();

        assert!(header.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
        assert!(header.contains("<!-- generator=\"wxr-export/0.1\" -->"));
        assert!(header.contains("xmlns:wp=\"http://wordpress.org/export/1.2/\""));
        assert!(header.contains("xmlns:excerpt=\"http://wordpress.org/export/1.2/excerpt/\""));
        assert!(header.contains("xmlns:dc=\"http://purl.org/dc/elements/1.1/\""));
        assert!(header.ends_with("<channel>"));
    }

    #[test]
    fn header_always_declares_utf8() {
        let export = MemoryExport {
            site: SiteMetadata {
                name: "café".to_string(),
                ..SiteMetadata::default()
            },
            charset: "ISO-8859-1".to_string(),
            ..MemoryExport::default()
        };
        let formatter = formatter(&export);

        let header = formatter.header().unwrap();
        let metadata = formatter.site_metadata().unwrap();

        assert!(header.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
        assert!(!header.contains("ISO-8859-1"));
        assert!(metadata.as_bytes().windows(2).any(|w| w == [0xc3, 0xa9]));
    }

    #[test]
    fn version_is_configurable() {
        let export = MemoryExport::default();
        let formatter = WxrFormatterBuilder::new()
            .source(&export)
            .wxr_version("1.1")
            .build()
            .unwrap();

        assert_eq!(formatter.wxr_version(), "1.1");
        assert!(formatter.header().unwrap().contains("http://wordpress.org/export/1.1/"));
        assert!(
            formatter
                .site_metadata()
                .unwrap()
                .contains("<wp:wxr_version>1.1</wp:wxr_version>")
        );
    }

    #[test]
    fn builder_requires_a_source() {
        let result = WxrFormatterBuilder::new().build();
        assert!(matches!(result, Err(ExportError::Configuration(_))));
    }

    #[test]
    fn site_metadata_copies_fields() {
        let export = MemoryExport {
            site: SiteMetadata {
                name: "Cats & Dogs".to_string(),
                url: "https://example.com".to_string(),
                description: "Pets".to_string(),
                pub_date: "Mon, 01 Jan 2024 00:00:00 +0000".to_string(),
                language: "en-US".to_string(),
                site_url: "https://example.com".to_string(),
                blog_url: "https://example.com/blog".to_string(),
            },
            ..MemoryExport::default()
        };

        assert_eq!(
            formatter(&export).site_metadata().unwrap(),
            "<title>Cats &amp; Dogs</title><link>https://example.com</link>\
             <description>Pets</description><pubDate>Mon, 01 Jan 2024 00:00:00 +0000</pubDate>\
             <language>en-US</language><wp:wxr_version>1.2</wp:wxr_version>\
             <wp:base_site_url>https://example.com</wp:base_site_url>\
             <wp:base_blog_url>https://example.com/blog</wp:base_blog_url>"
        );
    }

    #[test]
    fn authors_wrap_names_in_cdata() {
        let export = MemoryExport {
            authors: vec![Author {
                id: 2,
                user_login: "editor".to_string(),
                user_email: "ed@example.com".to_string(),
                display_name: "Ed <the editor>".to_string(),
                user_firstname: "Ed".to_string(),
                user_lastname: String::new(),
            }],
            ..MemoryExport::default()
        };

        assert_eq!(
            formatter(&export).authors().unwrap(),
            "<wp:author><wp:author_id>2</wp:author_id><wp:author_login>editor</wp:author_login>\
             <wp:author_email>ed@example.com</wp:author_email>\
             <wp:author_display_name><![CDATA[Ed <the editor>]]></wp:author_display_name>\
             <wp:author_first_name><![CDATA[Ed]]></wp:author_first_name>\
             <wp:author_last_name><![CDATA[]]></wp:author_last_name></wp:author>"
        );
    }

    #[test]
    fn category_parent_is_the_parent_slug() {
        let export = MemoryExport {
            categories: vec![term(1, "category", "a", 0), term(2, "category", "b", 1)],
            ..MemoryExport::default()
        };
        let out = formatter(&export).categories().unwrap();

        assert!(out.contains(
            "<wp:term_id>1</wp:term_id><wp:category_nicename>a</wp:category_nicename>\
             <wp:category_parent></wp:category_parent>"
        ));
        assert!(out.contains(
            "<wp:term_id>2</wp:term_id><wp:category_nicename>b</wp:category_nicename>\
             <wp:category_parent>a</wp:category_parent>"
        ));
    }

    #[test]
    fn category_description_is_optional() {
        let mut described = term(3, "category", "c", 0);
        described.description = "abc".to_string();
        let export = MemoryExport {
            categories: vec![term(1, "category", "a", 0), described],
            ..MemoryExport::default()
        };
        let out = formatter(&export).categories().unwrap();

        assert_eq!(out.matches("<wp:category_description>").count(), 1);
        assert!(out.contains(
            "<wp:category_description><![CDATA[abc]]></wp:category_description>"
        ));
    }

    #[test]
    fn unknown_parent_resolves_to_empty_slug() {
        let export = MemoryExport {
            custom_taxonomies_terms: vec![term(5, "genre", "jazz", 99)],
            ..MemoryExport::default()
        };
        let out = formatter(&export).custom_taxonomies_terms().unwrap();

        assert!(out.contains("<wp:term_parent></wp:term_parent>"));
    }

    #[test]
    fn tags_have_no_parent() {
        let export = MemoryExport {
            tags: vec![term(7, "post_tag", "rust", 0)],
            ..MemoryExport::default()
        };

        assert_eq!(
            formatter(&export).tags().unwrap(),
            "<wp:tag><wp:term_id>7</wp:term_id><wp:tag_slug>rust</wp:tag_slug>\
             <wp:tag_name><![CDATA[RUST]]></wp:tag_name></wp:tag>"
        );
    }

    #[test]
    fn nav_menu_terms_never_have_a_parent() {
        let export = MemoryExport {
            nav_menu_terms: vec![
                term(10, NAV_MENU_TAXONOMY, "main", 0),
                term(11, NAV_MENU_TAXONOMY, "footer", 10),
            ],
            custom_taxonomies_terms: vec![term(20, "genre", "rock", 0)],
            ..MemoryExport::default()
        };
        let formatter = formatter(&export);

        let menus = formatter.nav_menu_terms().unwrap();
        assert_eq!(menus.matches("<wp:term>").count(), 2);
        assert!(!menus.contains("wp:term_parent"));

        let custom = formatter.custom_taxonomies_terms().unwrap();
        assert!(custom.contains("<wp:term_parent></wp:term_parent>"));
        assert!(custom.contains("<wp:term_taxonomy>genre</wp:term_taxonomy>"));
    }

    #[test]
    fn post_fields_are_emitted_in_order() {
        let export = MemoryExport {
            authors: vec![Author {
                id: 1,
                user_login: "admin".to_string(),
                ..Author::default()
            }],
            ..MemoryExport::default()
        };
        let post = Post {
            id: 42,
            post_title: "Hello & goodbye".to_string(),
            permalink: "https://example.com/hello/".to_string(),
            guid: "https://example.com/?p=42".to_string(),
            post_author: 1,
            post_date: "2024-03-05 15:07:09".to_string(),
            post_date_gmt: "2024-03-05 14:07:09".to_string(),
            post_content: "<p>Body with ]]> inside</p>".to_string(),
            post_excerpt: String::new(),
            comment_status: "open".to_string(),
            ping_status: "closed".to_string(),
            post_name: "hello".to_string(),
            post_status: "publish".to_string(),
            post_parent: 0,
            menu_order: 0,
            post_type: "post".to_string(),
            post_password: String::new(),
            is_sticky: true,
            attachment_url: None,
            terms: vec![PostTerm {
                taxonomy: "category".to_string(),
                slug: "news".to_string(),
                name: "News".to_string(),
            }],
            meta: vec![PostMeta {
                meta_key: "_thumbnail_id".to_string(),
                meta_value: "12".to_string(),
            }],
            comments: Vec::new(),
        };

        let out = formatter(&export).post(&post).unwrap();

        assert!(out.starts_with(
            "<item><title>Hello &amp; goodbye</title><link>https://example.com/hello/</link>\
             <pubDate>Tue, 05 Mar 2024 14:07:09 +0000</pubDate><dc:creator>admin</dc:creator>\
             <guid isPermaLink=\"false\">https://example.com/?p=42</guid>\
             <description></description>"
        ));
        assert!(out.contains(
            "<content:encoded><![CDATA[<p>Body with ]]]]><![CDATA[> inside</p>]]></content:encoded>"
        ));
        assert!(out.contains("<excerpt:encoded><![CDATA[]]></excerpt:encoded>"));
        assert!(out.contains(
            "<wp:post_id>42</wp:post_id><wp:post_date>2024-03-05 15:07:09</wp:post_date>"
        ));
        assert!(out.contains("<wp:post_parent>0</wp:post_parent><wp:menu_order>0</wp:menu_order>"));
        assert!(out.contains("<wp:post_password></wp:post_password><wp:is_sticky>1</wp:is_sticky>"));
        assert!(!out.contains("wp:attachment_url"));
        assert!(out.contains(
            "<category domain=\"category\" nicename=\"news\"><![CDATA[News]]></category>"
        ));
        assert!(out.contains(
            "<wp:postmeta><wp:meta_key>_thumbnail_id</wp:meta_key>\
             <wp:meta_value><![CDATA[12]]></wp:meta_value></wp:postmeta>"
        ));
        assert!(out.ends_with("</item>"));
    }

    #[test]
    fn attachment_url_is_emitted_when_resolvable() {
        let export = MemoryExport::default();
        let post = Post {
            id: 9,
            post_type: "attachment".to_string(),
            attachment_url: Some("https://example.com/cat.jpg".to_string()),
            ..Post::default()
        };

        let out = formatter(&export).post(&post).unwrap();

        assert!(out.contains(
            "<wp:is_sticky>0</wp:is_sticky>\
             <wp:attachment_url>https://example.com/cat.jpg</wp:attachment_url>"
        ));
    }

    #[test]
    fn comments_carry_their_meta() {
        let mut export = MemoryExport::default();
        export.comment_meta.insert(
            5,
            vec![CommentMeta {
                meta_key: "rating".to_string(),
                meta_value: "5".to_string(),
            }],
        );
        let post = Post {
            id: 1,
            comments: vec![
                Comment {
                    comment_id: 5,
                    comment_author: "Bob".to_string(),
                    comment_author_url: "https://bob.example".to_string(),
                    comment_author_ip: "127.0.0.1".to_string(),
                    comment_content: "Nice <b>post</b>".to_string(),
                    comment_approved: "1".to_string(),
                    ..Comment::default()
                },
                Comment {
                    comment_id: 6,
                    comment_parent: 5,
                    ..Comment::default()
                },
            ],
            ..Post::default()
        };

        let out = formatter(&export).post(&post).unwrap();

        assert_eq!(out.matches("<wp:comment>").count(), 2);
        assert_eq!(out.matches("<wp:commentmeta>").count(), 1);
        assert!(out.contains("<wp:comment_author><![CDATA[Bob]]></wp:comment_author>"));
        assert!(out.contains("<wp:comment_author_IP>127.0.0.1</wp:comment_author_IP>"));
        assert!(out.contains(
            "<wp:comment_user_id>0</wp:comment_user_id><wp:commentmeta>\
             <wp:meta_key>rating</wp:meta_key><wp:meta_value><![CDATA[5]]></wp:meta_value>\
             </wp:commentmeta></wp:comment>"
        ));
        assert!(out.contains("<wp:comment_parent>5</wp:comment_parent>"));
    }

    struct ShoutingHooks;

    impl ExportHooks for ShoutingHooks {
        fn title(&self, post: &Post) -> String {
            post.post_title.to_uppercase()
        }

        fn comment_author_url(&self, url: &str) -> String {
            url.replace("http://", "https://")
        }

        fn rss2_head(&self) -> Option<String> {
            Some("<cloud domain=\"example.com\"/>".to_string())
        }
    }

    #[test]
    fn hooks_filter_fields() {
        let export = MemoryExport::default();
        let formatter = WxrFormatterBuilder::new()
            .source(&export)
            .hooks(&ShoutingHooks)
            .build()
            .unwrap();
        let post = Post {
            post_title: "quiet".to_string(),
            comments: vec![Comment {
                comment_id: 1,
                comment_author_url: "http://bob.example".to_string(),
                ..Comment::default()
            }],
            ..Post::default()
        };

        let out = formatter.post(&post).unwrap();

        assert!(out.contains("<title>QUIET</title>"));
        assert!(out.contains(
            "<wp:comment_author_url>https://bob.example</wp:comment_author_url>"
        ));
        assert_eq!(formatter.rss2_head().unwrap(), "<cloud domain=\"example.com\"/>");
    }

    #[test]
    fn unknown_author_gives_an_empty_creator() {
        let export = MemoryExport::default();
        let post = Post {
            post_author: 77,
            ..Post::default()
        };

        let out = formatter(&export).post(&post).unwrap();

        assert!(out.contains("<dc:creator></dc:creator>"));
    }

    #[test]
    fn footer_closes_channel_and_rss() {
        let export = MemoryExport::default();
        assert_eq!(formatter(&export).footer().unwrap(), "</channel></rss>");
    }
}
