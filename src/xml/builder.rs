use std::{borrow::Cow, fmt::Display};

use quick_xml::{
    Writer,
    events::{BytesCData, BytesDecl, BytesEnd, BytesStart, BytesText, Event},
};

use crate::{
    error::ExportError,
    xml::encoding::{Utf8Policy, coerce_utf8},
};

/// A single piece of the document tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// An element with its attributes and children.
    Element(Element),
    /// Character data, escaped when written.
    Text(String),
    /// Character data wrapped in one or more CDATA sections when written.
    CData(String),
    /// A comment, written verbatim.
    Comment(String),
    /// Trusted markup, written verbatim.
    Raw(String),
    /// The `<?xml ...?>` declaration with its encoding label.
    Declaration(String),
    /// A closing tag for an element opened in another, separately written, fragment.
    EndFragment(String),
}

/// An XML element.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<Node>,
}

impl Element {
    fn new(name: &str, attributes: &[(&str, &str)]) -> Self {
        assert_valid_name(name);
        Self {
            name: name.to_string(),
            attributes: attributes
                .iter()
                .map(|(key, value)| {
                    assert_valid_name(key);
                    (key.to_string(), value.to_string())
                })
                .collect(),
            children: Vec::new(),
        }
    }
}

/// A value that may be absent from the output.
///
/// Used by [`XmlBuilder::optional_tag`] and [`XmlBuilder::optional_cdata_tag`].
/// `None`, the empty string, the string `"0"` and numeric zero are all absent:
/// a field that is set but empty produces no element at all. Database columns
/// come out as strings, so `"0"` stands for a zero value.
///
/// # Examples
///
/// ```
/// use wxr_export::xml::FieldValue;
///
/// assert!("".field_text().is_none());
/// assert!("0".field_text().is_none());
/// assert!(0u64.field_text().is_none());
/// assert!(None::<String>.field_text().is_none());
/// assert_eq!("abc".field_text().unwrap(), "abc");
/// assert_eq!(Some(42i64).field_text().unwrap(), "42");
/// ```
pub trait FieldValue {
    /// Text to emit, or `None` when the value is absent.
    fn field_text(&self) -> Option<Cow<'_, str>>;
}

impl FieldValue for str {
    fn field_text(&self) -> Option<Cow<'_, str>> {
        if self.is_empty() || self == "0" {
            None
        } else {
            Some(Cow::Borrowed(self))
        }
    }
}

impl FieldValue for String {
    fn field_text(&self) -> Option<Cow<'_, str>> {
        self.as_str().field_text()
    }
}

impl FieldValue for bool {
    fn field_text(&self) -> Option<Cow<'_, str>> {
        self.then_some(Cow::Borrowed("1"))
    }
}

impl<T: FieldValue + ?Sized> FieldValue for &T {
    fn field_text(&self) -> Option<Cow<'_, str>> {
        (**self).field_text()
    }
}

impl<T: FieldValue> FieldValue for Option<T> {
    fn field_text(&self) -> Option<Cow<'_, str>> {
        self.as_ref().and_then(FieldValue::field_text)
    }
}

macro_rules! numeric_field_value {
    ($($ty:ty),*) => {
        $(
            impl FieldValue for $ty {
                fn field_text(&self) -> Option<Cow<'_, str>> {
                    if *self == 0 {
                        None
                    } else {
                        Some(Cow::Owned(self.to_string()))
                    }
                }
            }
        )*
    };
}

numeric_field_value!(i8, i16, i32, i64, u8, u16, u32, u64, usize);

/// Builds an XML fragment or document from nested calls.
///
/// The builder keeps a cursor: [`open_tag`](Self::open_tag) descends into a
/// new element and [`close_tag`](Self::close_tag) ascends back to its parent.
/// Everything else appends to the element under the cursor, or to the root
/// when no element is open. Text and attribute values are escaped when the
/// tree is written out, CDATA is split so that `]]>` in the content can never
/// end a section early.
///
/// Closing past the root is a programming error and panics.
///
/// # Examples
///
/// ```
/// use wxr_export::xml::XmlBuilder;
///
/// let mut xml = XmlBuilder::new();
/// xml.open_tag("wp:category", &[])
///     .tag("wp:term_id", 3)
///     .tag("wp:category_nicename", "news & views")
///     .optional_cdata_tag("wp:category_description", "")
///     .close_tag();
///
/// assert_eq!(
///     xml.to_xml_strict().unwrap(),
///     "<wp:category><wp:term_id>3</wp:term_id>\
///      <wp:category_nicename>news &amp; views</wp:category_nicename></wp:category>"
/// );
/// ```
///
/// A fragment that leaves elements open can still be written with
/// [`to_xml`](Self::to_xml), which is how a document header is produced:
///
/// ```
/// use wxr_export::xml::XmlBuilder;
///
/// let mut xml = XmlBuilder::new();
/// xml.open_tag("rss", &[("version", "2.0")]).open_tag("channel", &[]);
///
/// assert_eq!(xml.to_xml().unwrap(), r#"<rss version="2.0"><channel>"#);
/// assert!(xml.to_xml_strict().is_err());
/// ```
#[derive(Debug, Default, Clone)]
pub struct XmlBuilder {
    root: Vec<Node>,
    open: Vec<Element>,
    policy: Utf8Policy,
}

impl XmlBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a builder applying `policy` to [`cdata_bytes`](Self::cdata_bytes).
    pub fn with_policy(policy: Utf8Policy) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }

    /// Number of currently open elements.
    pub fn depth(&self) -> usize {
        self.open.len()
    }

    /// Opens an element under the cursor and moves the cursor into it.
    ///
    /// # Panics
    ///
    /// If `name` or an attribute name is not a valid XML name.
    pub fn open_tag(&mut self, name: &str, attributes: &[(&str, &str)]) -> &mut Self {
        self.open.push(Element::new(name, attributes));
        self
    }

    /// Closes the element under the cursor.
    ///
    /// # Panics
    ///
    /// If no element is open.
    pub fn close_tag(&mut self) -> &mut Self {
        match self.open.pop() {
            Some(element) => self.push(Node::Element(element)),
            None => panic!("close_tag called with no open element"),
        }
    }

    pub fn text(&mut self, value: impl Display) -> &mut Self {
        self.push(Node::Text(value.to_string()))
    }

    pub fn cdata(&mut self, value: &str) -> &mut Self {
        self.push(Node::CData(value.to_string()))
    }

    /// Appends a CDATA section from raw bytes, coerced to UTF-8 with the
    /// builder's [`Utf8Policy`].
    pub fn cdata_bytes(&mut self, value: &[u8]) -> Result<&mut Self, ExportError> {
        let text = coerce_utf8(value, self.policy)?.into_owned();
        Ok(self.push(Node::CData(text)))
    }

    /// Appends a comment. The caller must not pass text containing `--`.
    pub fn comment(&mut self, text: &str) -> &mut Self {
        self.push(Node::Comment(text.to_string()))
    }

    /// Appends trusted markup without any escaping.
    ///
    /// Only pass constants or markup that is already known to be well formed.
    pub fn raw(&mut self, markup: &str) -> &mut Self {
        self.push(Node::Raw(markup.to_string()))
    }

    /// Appends `<?xml version="1.0" encoding="..."?>`.
    pub fn declaration(&mut self, encoding: &str) -> &mut Self {
        self.push(Node::Declaration(encoding.to_string()))
    }

    /// Appends a bare closing tag, for an element opened by an earlier fragment.
    pub fn end_fragment(&mut self, name: &str) -> &mut Self {
        assert_valid_name(name);
        self.push(Node::EndFragment(name.to_string()))
    }

    /// Moves the content of `other` under the cursor.
    ///
    /// Elements still open in `other` are closed first.
    pub fn append(&mut self, other: XmlBuilder) -> &mut Self {
        for node in other.into_nodes() {
            self.push(node);
        }
        self
    }

    /// `<name>value</name>`
    pub fn tag(&mut self, name: &str, value: impl Display) -> &mut Self {
        self.tag_with(name, &[], value)
    }

    /// `<name attr="..">value</name>`
    pub fn tag_with(
        &mut self,
        name: &str,
        attributes: &[(&str, &str)],
        value: impl Display,
    ) -> &mut Self {
        self.open_tag(name, attributes).text(value).close_tag()
    }

    /// `<name><![CDATA[value]]></name>`
    pub fn cdata_tag(&mut self, name: &str, value: &str) -> &mut Self {
        self.open_tag(name, &[]).cdata(value).close_tag()
    }

    /// Emits [`tag`](Self::tag) only when `value` is present.
    pub fn optional_tag<V: FieldValue>(&mut self, name: &str, value: V) -> &mut Self {
        if let Some(text) = value.field_text() {
            self.tag(name, text);
        }
        self
    }

    /// Emits [`cdata_tag`](Self::cdata_tag) only when `value` is present.
    pub fn optional_cdata_tag<V: FieldValue>(&mut self, name: &str, value: V) -> &mut Self {
        if let Some(text) = value.field_text() {
            self.cdata_tag(name, &text);
        }
        self
    }

    pub fn title(&mut self, value: &str) -> &mut Self {
        self.tag("title", value)
    }

    pub fn link(&mut self, value: &str) -> &mut Self {
        self.tag("link", value)
    }

    pub fn description(&mut self, value: &str) -> &mut Self {
        self.tag("description", value)
    }

    pub fn pub_date(&mut self, value: &str) -> &mut Self {
        self.tag("pubDate", value)
    }

    pub fn language(&mut self, value: &str) -> &mut Self {
        self.tag("language", value)
    }

    pub fn guid(&mut self, value: &str, attributes: &[(&str, &str)]) -> &mut Self {
        self.tag_with("guid", attributes, value)
    }

    pub fn category(&mut self, attributes: &[(&str, &str)], name: &str) -> &mut Self {
        self.open_tag("category", attributes).cdata(name).close_tag()
    }

    /// Writes the whole tree, whatever the cursor position.
    ///
    /// Elements that are still open are written without their closing tag.
    pub fn to_xml(&self) -> Result<String, ExportError> {
        let mut writer = Writer::new(Vec::new());

        for node in &self.root {
            write_node(&mut writer, node)?;
        }

        for element in &self.open {
            write_start(&mut writer, element)?;
            for child in &element.children {
                write_node(&mut writer, child)?;
            }
        }

        String::from_utf8(writer.into_inner()).map_err(|e| ExportError::Xml(e.to_string()))
    }

    /// Same as [`to_xml`](Self::to_xml) but fails when an element is still open.
    pub fn to_xml_strict(&self) -> Result<String, ExportError> {
        if !self.open.is_empty() {
            return Err(ExportError::Unbalanced {
                open: self.open.iter().map(|e| e.name.clone()).collect(),
            });
        }
        self.to_xml()
    }

    fn push(&mut self, node: Node) -> &mut Self {
        match self.open.last_mut() {
            Some(parent) => parent.children.push(node),
            None => self.root.push(node),
        }
        self
    }

    fn into_nodes(mut self) -> Vec<Node> {
        while !self.open.is_empty() {
            self.close_tag();
        }
        self.root
    }
}

fn assert_valid_name(name: &str) {
    let mut chars = name.chars();
    let valid = match chars.next() {
        Some(first) => {
            (first.is_alphabetic() || first == '_' || first == ':')
                && chars.all(|c| c.is_alphanumeric() || matches!(c, '_' | ':' | '-' | '.'))
        }
        None => false,
    };
    assert!(valid, "invalid XML name: {:?}", name);
}

/// Splits `value` so that every `]]>` straddles two sections.
fn cdata_sections(value: &str) -> Vec<String> {
    let parts: Vec<&str> = value.split("]]>").collect();
    let last = parts.len() - 1;

    parts
        .iter()
        .enumerate()
        .map(|(index, part)| {
            let mut section = String::with_capacity(part.len() + 3);
            if index > 0 {
                section.push('>');
            }
            section.push_str(part);
            if index < last {
                section.push_str("]]");
            }
            section
        })
        .collect()
}

fn write_event<'a>(writer: &mut Writer<Vec<u8>>, event: Event<'a>) -> Result<(), ExportError> {
    writer
        .write_event(event)
        .map_err(|e| ExportError::Xml(format!("Failed to write XML event: {}", e)))
}

fn write_start(writer: &mut Writer<Vec<u8>>, element: &Element) -> Result<(), ExportError> {
    let mut start = BytesStart::new(element.name.as_str());
    for (key, value) in &element.attributes {
        start.push_attribute((key.as_str(), value.as_str()));
    }
    write_event(writer, Event::Start(start))
}

fn write_node(writer: &mut Writer<Vec<u8>>, node: &Node) -> Result<(), ExportError> {
    match node {
        Node::Element(element) => {
            write_start(writer, element)?;
            for child in &element.children {
                write_node(writer, child)?;
            }
            write_event(writer, Event::End(BytesEnd::new(element.name.as_str())))
        }
        Node::Text(text) => write_event(writer, Event::Text(BytesText::new(text.as_str()))),
        Node::CData(text) => {
            for section in cdata_sections(text) {
                write_event(writer, Event::CData(BytesCData::new(section)))?;
            }
            Ok(())
        }
        Node::Comment(text) => write_event(writer, Event::Comment(BytesText::from_escaped(text.as_str()))),
        Node::Raw(markup) => write_event(writer, Event::Text(BytesText::from_escaped(markup.as_str()))),
        Node::Declaration(encoding) => write_event(
            writer,
            Event::Decl(BytesDecl::new("1.0", Some(encoding.as_str()), None)),
        ),
        Node::EndFragment(name) => write_event(writer, Event::End(BytesEnd::new(name.as_str()))),
    }
}
