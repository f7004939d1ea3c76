#![allow(dead_code)]

pub mod mocks;

pub use mocks::*;

use quick_xml::{Reader, events::Event};
use wxr_export::{
    error::ExportError,
    wxr::{
        ExportSource, MemoryExport, WxrFormatter,
        model::{
            Author, Comment, CommentMeta, Post, PostMeta, PostTerm, SiteMetadata, Term,
        },
        source::PostStream,
    },
};

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// One author, two categories (one nested), one post with one comment carrying
/// one metadata row.
pub fn small_site() -> MemoryExport {
    let mut export = MemoryExport {
        site: SiteMetadata {
            name: "Tom & Jerry's <blog>".to_string(),
            url: "https://example.com".to_string(),
            description: "Cats & mice".to_string(),
            pub_date: "Tue, 05 Mar 2024 14:07:09 +0000".to_string(),
            language: "en-US".to_string(),
            site_url: "https://example.com".to_string(),
            blog_url: "https://example.com".to_string(),
        },
        authors: vec![Author {
            id: 1,
            user_login: "tom".to_string(),
            user_email: "tom@example.com".to_string(),
            display_name: "Tom".to_string(),
            user_firstname: "Thomas".to_string(),
            user_lastname: "Cat".to_string(),
        }],
        categories: vec![
            Term {
                term_id: 2,
                taxonomy: "category".to_string(),
                slug: "animals".to_string(),
                parent: 0,
                name: "Animals".to_string(),
                description: String::new(),
            },
            Term {
                term_id: 3,
                taxonomy: "category".to_string(),
                slug: "cats".to_string(),
                parent: 2,
                name: "Cats".to_string(),
                description: "Felines only".to_string(),
            },
        ],
        generator: "<!-- generator=\"wxr-export/0.1.0\" created=\"2024-03-05 14:07\" -->"
            .to_string(),
        ..MemoryExport::default()
    };

    export.posts.push(Post {
        id: 10,
        post_title: "Chasing <mice> & more".to_string(),
        permalink: "https://example.com/chasing/".to_string(),
        guid: "https://example.com/?p=10".to_string(),
        post_author: 1,
        post_date: "2024-03-05 15:07:09".to_string(),
        post_date_gmt: "2024-03-05 14:07:09".to_string(),
        post_content: "<p>Never write ]]> in a post</p>".to_string(),
        post_excerpt: String::new(),
        comment_status: "open".to_string(),
        ping_status: "open".to_string(),
        post_name: "chasing".to_string(),
        post_status: "publish".to_string(),
        post_type: "post".to_string(),
        terms: vec![PostTerm {
            taxonomy: "category".to_string(),
            slug: "cats".to_string(),
            name: "Cats".to_string(),
        }],
        meta: vec![PostMeta {
            meta_key: "_edit_last".to_string(),
            meta_value: "1".to_string(),
        }],
        comments: vec![Comment {
            comment_id: 7,
            comment_author: "Jerry".to_string(),
            comment_author_email: "jerry@example.com".to_string(),
            comment_author_url: "https://example.com/?a=1&b=2".to_string(),
            comment_author_ip: "127.0.0.1".to_string(),
            comment_date: "2024-03-06 10:00:00".to_string(),
            comment_date_gmt: "2024-03-06 09:00:00".to_string(),
            comment_content: "Nice try".to_string(),
            comment_approved: "1".to_string(),
            comment_parent: 0,
            ..Comment::default()
        }],
        ..Post::default()
    });

    export.comment_meta.insert(
        7,
        vec![CommentMeta {
            meta_key: "akismet_result".to_string(),
            meta_value: "false".to_string(),
        }],
    );

    export
}

/// Renders a whole document in memory.
pub fn render(formatter: &WxrFormatter) -> Result<String, ExportError> {
    let mut document = formatter.before_posts()?;
    for item in formatter.posts() {
        document.push_str(&item?);
    }
    document.push_str(&formatter.after_posts()?);
    Ok(document)
}

/// Parses `xml` to the end and counts the start tags named `name`.
///
/// Panics when the document is not well-formed.
pub fn count_elements(xml: &str, name: &str) -> usize {
    let mut reader = Reader::from_str(xml);
    let mut depth = 0usize;
    let mut count = 0;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                depth += 1;
                if e.name().as_ref() == name.as_bytes() {
                    count += 1;
                }
            }
            Ok(Event::Empty(e)) => {
                if e.name().as_ref() == name.as_bytes() {
                    count += 1;
                }
            }
            Ok(Event::End(_)) => depth -= 1,
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => panic!(
                "document is not well-formed at {}: {}",
                reader.buffer_position(),
                e
            ),
        }
    }

    assert_eq!(depth, 0, "document ends with open elements");
    count
}

/// Wraps a dataset and makes one of its queries fail.
pub struct FailingSource {
    pub inner: MemoryExport,
    pub fail_categories: bool,
    pub fail_after_posts: Option<usize>,
}

impl ExportSource for FailingSource {
    fn site_metadata(&self) -> Result<SiteMetadata, ExportError> {
        self.inner.site_metadata()
    }

    fn authors(&self) -> Result<Vec<Author>, ExportError> {
        self.inner.authors()
    }

    fn categories(&self) -> Result<Vec<Term>, ExportError> {
        if self.fail_categories {
            return Err(ExportError::DataSource(
                "term query failed: table wp_terms is locked".to_string(),
            ));
        }
        self.inner.categories()
    }

    fn tags(&self) -> Result<Vec<Term>, ExportError> {
        self.inner.tags()
    }

    fn nav_menu_terms(&self) -> Result<Vec<Term>, ExportError> {
        self.inner.nav_menu_terms()
    }

    fn custom_taxonomies_terms(&self) -> Result<Vec<Term>, ExportError> {
        self.inner.custom_taxonomies_terms()
    }

    fn posts(&self) -> PostStream<'_> {
        match self.fail_after_posts {
            None => self.inner.posts(),
            Some(limit) => Box::new(self.inner.posts().take(limit).chain(std::iter::once(
                Err(ExportError::DataSource("post query failed".to_string())),
            ))),
        }
    }

    fn generator_tag(&self) -> String {
        self.inner.generator_tag()
    }

    fn charset(&self) -> String {
        self.inner.charset()
    }
}
