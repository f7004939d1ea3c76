#![cfg_attr(docsrs, feature(doc_cfg))]

/*!
 # WXR export

 Builds WordPress eXtended RSS (WXR) documents: the RSS 2.0 dialect used to
 move the content of a WordPress site (authors, terms, posts, comments and
 their metadata) from one installation to another.

 The crate is made of two layers:

 - [`xml`]: an escaping-safe hierarchical builder. Elements are opened and
   closed explicitly, text and attribute values are escaped on output and
   content that may contain markup goes into CDATA sections split around
   `]]>`.
 - [`wxr`]: the document assembler. A [`WxrFormatter`](wxr::WxrFormatter)
   pulls records from an [`ExportSource`](wxr::ExportSource) and renders each
   document section with the builder.

 Large sites are written as a stream with an
 [`ExportStep`](core::step::ExportStep): posts are read one at a time by a
 [`PostItemReader`](item::wxr::PostItemReader) and appended to the output by a
 [`WxrItemWriter`](item::wxr::WxrItemWriter), chunk after chunk.

 ## Getting Started

```rust
# use std::env::temp_dir;
# use wxr_export::{
#     core::step::{StepBuilder, StepStatus},
#     error::ExportError,
#     item::wxr::{PostItemReader, WxrItemWriterBuilder},
#     wxr::{MemoryExport, WxrFormatterBuilder},
# };
fn main() -> Result<(), ExportError> {
    let export = MemoryExport::from_json_str(
        r#"{
            "site": { "name": "Notes", "url": "https://example.com", "language": "en-US" },
            "authors": [ { "id": 1, "user_login": "admin", "display_name": "Admin" } ],
            "categories": [ { "term_id": 3, "taxonomy": "category", "slug": "news", "name": "News" } ],
            "posts": [
                {
                    "id": 10,
                    "post_title": "Hello <world>",
                    "post_author": 1,
                    "post_date_gmt": "2024-03-05 14:07:09",
                    "post_content": "<p>First post</p>",
                    "post_type": "post",
                    "post_status": "publish"
                }
            ]
        }"#,
    )?;

    let formatter = WxrFormatterBuilder::new()
        .source(&export)
        .comment_meta(&export)
        .build()?;

    let reader = PostItemReader::new(&export);
    let writer = WxrItemWriterBuilder::new()
        .formatter(&formatter)
        .from_path(temp_dir().join("notes.wxr.xml"))?;

    let step = StepBuilder::new()
        .name("export notes".to_string())
        .reader(&reader)
        .writer(&writer)
        .chunk(50)
        .build()?;

    let execution = step.execute()?;
    assert_eq!(execution.status, StepStatus::Success);
    assert_eq!(execution.write_count, 1);

    Ok(())
}
```
 */

/// Streaming step and item traits
pub mod core;

/// Error types
pub mod error;

pub use error::*;

/// Readers and writers plugged into a step
pub mod item;

/// WXR document assembly
pub mod wxr;

/// Escaping-safe XML builder
pub mod xml;
