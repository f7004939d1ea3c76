//! Hierarchical XML builder.
//!
//! Escaping-safe construction of XML fragments from nested calls. Elements are
//! opened and closed through an explicit cursor, text and attribute values are
//! escaped on output and CDATA sections are split around `]]>`. The tree is
//! written out with `quick-xml`.
//!
//! # Examples
//!
//! ```
//! use wxr_export::xml::XmlBuilder;
//!
//! let mut xml = XmlBuilder::new();
//! xml.open_tag("wp:author", &[])
//!     .tag("wp:author_login", "admin")
//!     .cdata_tag("wp:author_display_name", "Ada <Lovelace>")
//!     .close_tag();
//!
//! let out = xml.to_xml_strict().unwrap();
//! assert!(out.contains("<![CDATA[Ada <Lovelace>]]>"));
//! ```

/// Tree builder and serializer.
pub mod builder;

/// UTF-8 coercion policy for byte input.
pub mod encoding;

pub use builder::{Element, FieldValue, Node, XmlBuilder};
pub use encoding::Utf8Policy;
