//! Records read from the export data source.
//!
//! Field names follow the columns of the content database so a JSON dump of
//! the tables deserializes without renaming. All records are read-only input
//! for the formatter.

use serde::{Deserialize, Serialize};

/// Date value used by the database for "never set".
pub const ZERO_DATE: &str = "0000-00-00 00:00:00";

/// Channel level information about the exported site.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteMetadata {
    pub name: String,
    pub url: String,
    pub description: String,
    #[serde(rename = "pubDate")]
    pub pub_date: String,
    pub language: String,
    pub site_url: String,
    pub blog_url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Author {
    pub id: u64,
    pub user_login: String,
    pub user_email: String,
    pub display_name: String,
    pub user_firstname: String,
    pub user_lastname: String,
}

/// A taxonomy entry: category, tag, nav menu or custom taxonomy term.
///
/// `parent` is the term id of the parent within the same collection, `0` for
/// a top-level term.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Term {
    pub term_id: u64,
    pub taxonomy: String,
    pub slug: String,
    pub parent: u64,
    pub name: String,
    pub description: String,
}

/// A term attached to a post.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PostTerm {
    pub taxonomy: String,
    pub slug: String,
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PostMeta {
    pub meta_key: String,
    pub meta_value: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommentMeta {
    pub meta_key: String,
    pub meta_value: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Comment {
    pub comment_id: u64,
    pub comment_author: String,
    pub comment_author_email: String,
    pub comment_author_url: String,
    #[serde(rename = "comment_author_IP")]
    pub comment_author_ip: String,
    pub comment_date: String,
    pub comment_date_gmt: String,
    pub comment_content: String,
    pub comment_approved: String,
    pub comment_type: String,
    pub comment_parent: u64,
    pub user_id: u64,
}

/// A post of any type (post, page, attachment, nav menu item...) with its
/// resolved terms, metadata and comments.
///
/// Comment metadata is not part of the record, it is fetched through
/// [`CommentMetaStore`](crate::wxr::source::CommentMetaStore) when the post is
/// formatted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Post {
    pub id: u64,
    pub post_title: String,
    pub permalink: String,
    pub guid: String,
    pub post_author: u64,
    pub post_date: String,
    pub post_date_gmt: String,
    pub post_content: String,
    pub post_excerpt: String,
    pub comment_status: String,
    pub ping_status: String,
    pub post_name: String,
    pub post_status: String,
    pub post_parent: u64,
    pub menu_order: i64,
    pub post_type: String,
    pub post_password: String,
    pub is_sticky: bool,
    pub attachment_url: Option<String>,
    pub terms: Vec<PostTerm>,
    pub meta: Vec<PostMeta>,
    pub comments: Vec<Comment>,
}
