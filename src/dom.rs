//! Markup parser – converts the editor's serialized rich text into a small
//! node tree.
//!
//! The editing surface emits a controlled subset of HTML:
//! - Blocks: div, p, h1-h3, ul, ol, li, blockquote, pre
//! - Inline: span, a, strong/b, em/i, u, s, code, br
//! - Void: img (data-URI sources), br
//!
//! The pipeline never interprets this structurally beyond what the offscreen
//! layout needs; unknown tags are kept and treated as divs so nothing the
//! user typed is dropped.

use std::collections::HashMap;

// ---------------------------------------------------------------------------
// Node types
// ---------------------------------------------------------------------------

/// Tag of a supported element.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Tag {
    Div,
    P,
    H1,
    H2,
    H3,
    Ul,
    Ol,
    Li,
    Blockquote,
    Pre,
    Span,
    A,
    Strong,
    Em,
    U,
    S,
    Code,
    Br,
    Img,
    Body,
    Html,
    Head,
    /// Unknown tags are kept and laid out as divs.
    Unknown(String),
}

impl Tag {
    pub fn parse(s: &str) -> Self {
        match s.to_ascii_lowercase().as_str() {
            "div" => Tag::Div,
            "p" => Tag::P,
            "h1" => Tag::H1,
            "h2" => Tag::H2,
            "h3" => Tag::H3,
            "ul" => Tag::Ul,
            "ol" => Tag::Ol,
            "li" => Tag::Li,
            "blockquote" => Tag::Blockquote,
            "pre" => Tag::Pre,
            "span" => Tag::Span,
            "a" => Tag::A,
            "strong" | "b" => Tag::Strong,
            "em" | "i" => Tag::Em,
            "u" => Tag::U,
            "s" | "strike" | "del" => Tag::S,
            "code" => Tag::Code,
            "br" => Tag::Br,
            "img" => Tag::Img,
            "body" => Tag::Body,
            "html" => Tag::Html,
            "head" => Tag::Head,
            _ => Tag::Unknown(s.to_string()),
        }
    }

    pub fn is_block(&self) -> bool {
        matches!(
            self,
            Tag::Div
                | Tag::P
                | Tag::H1
                | Tag::H2
                | Tag::H3
                | Tag::Ul
                | Tag::Ol
                | Tag::Li
                | Tag::Blockquote
                | Tag::Pre
                | Tag::Body
                | Tag::Html
                | Tag::Unknown(_)
        )
    }

    pub fn is_void(&self) -> bool {
        matches!(self, Tag::Img | Tag::Br)
    }
}

/// A node in the markup tree.
#[derive(Debug, Clone)]
pub enum Node {
    Element(Element),
    Text(String),
}

/// An element carrying tag, attributes, and children.
#[derive(Debug, Clone)]
pub struct Element {
    pub tag: Tag,
    pub attributes: HashMap<String, String>,
    pub children: Vec<Node>,
}

impl Element {
    pub fn new(tag: Tag) -> Self {
        Self {
            tag,
            attributes: HashMap::new(),
            children: Vec::new(),
        }
    }

    /// The `style` attribute, if any.
    pub fn inline_style(&self) -> Option<&str> {
        self.attributes.get("style").map(|s| s.as_str())
    }

    /// The `src` attribute (images).
    pub fn src(&self) -> Option<&str> {
        self.attributes.get("src").map(|s| s.as_str())
    }

    /// Flattened text of this element and all descendants, with `<br>`
    /// rendered as a newline.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        collect_text(&self.children, &mut out);
        out
    }

    /// Value of a single property in the inline `style` attribute,
    /// e.g. `style_value("text-align") == Some("center")`.
    pub fn style_value(&self, property: &str) -> Option<String> {
        let style = self.inline_style()?;
        for decl in style.split(';') {
            let (name, value) = decl.split_once(':')?;
            if name.trim().eq_ignore_ascii_case(property) {
                return Some(value.trim().to_string());
            }
        }
        None
    }
}

fn collect_text(nodes: &[Node], out: &mut String) {
    for node in nodes {
        match node {
            Node::Text(t) => out.push_str(t),
            Node::Element(e) if e.tag == Tag::Br => out.push('\n'),
            Node::Element(e) => collect_text(&e.children, out),
        }
    }
}

// ---------------------------------------------------------------------------
// Parser – recursive descent over the markup string
// ---------------------------------------------------------------------------

/// Parse a markup string into a list of nodes.
///
/// Hand-written for the controlled subset the editor emits; tolerant of
/// mismatched closing tags and stray text so a partially edited document still
/// exports rather than erroring.
pub fn parse_markup(markup: &str) -> Vec<Node> {
    let mut parser = Parser {
        input: markup,
        pos: 0,
    };
    parser.parse_nodes()
}

struct Parser<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn parse_nodes(&mut self) -> Vec<Node> {
        let mut nodes = Vec::new();
        loop {
            self.skip_inter_element_whitespace();
            if self.eof() || self.starts_with("</") {
                break;
            }
            if let Some(node) = self.parse_node() {
                nodes.push(node);
            }
        }
        nodes
    }

    fn parse_node(&mut self) -> Option<Node> {
        if self.starts_with("<!--") {
            self.skip_comment();
            return None;
        }
        if self.starts_with("<!") || self.starts_with("<?") {
            // Doctype / processing instruction
            self.skip_past('>');
            return None;
        }
        if self.starts_with("<") {
            Some(self.parse_element())
        } else {
            Some(self.parse_text())
        }
    }

    fn parse_text(&mut self) -> Node {
        let start = self.pos;
        while !self.eof() && !self.starts_with("<") {
            self.advance();
        }
        Node::Text(decode_entities(&self.input[start..self.pos]))
    }

    fn parse_element(&mut self) -> Node {
        self.advance(); // consume '<'
        let tag = Tag::parse(&self.take_name());
        let mut elem = Element::new(tag.clone());

        loop {
            self.skip_whitespace();
            if self.eof() || self.starts_with(">") || self.starts_with("/>") {
                break;
            }
            let (key, value) = self.parse_attribute();
            elem.attributes.insert(key, value);
        }

        if self.starts_with("/>") {
            self.advance();
            self.advance();
            return Node::Element(elem);
        }
        if self.starts_with(">") {
            self.advance();
        }
        if tag.is_void() {
            return Node::Element(elem);
        }

        elem.children = self.parse_nodes();

        // Closing tag – consumed without matching strictly; a mismatch ends
        // the innermost open element, which is the forgiving choice.
        if self.starts_with("</") {
            self.advance();
            self.advance();
            self.take_name();
            self.skip_past('>');
        }

        Node::Element(elem)
    }

    fn take_name(&mut self) -> String {
        let start = self.pos;
        while !self.eof() {
            let c = self.current_char();
            if c.is_alphanumeric() || c == '-' || c == '_' {
                self.advance();
            } else {
                break;
            }
        }
        self.input[start..self.pos].to_string()
    }

    fn parse_attribute(&mut self) -> (String, String) {
        let key = self.take_name();
        self.skip_whitespace();
        if !self.starts_with("=") {
            return (key, String::new());
        }
        self.advance();
        self.skip_whitespace();
        (key, self.parse_attr_value())
    }

    fn parse_attr_value(&mut self) -> String {
        for quote in ['"', '\''] {
            if self.current_char_is(quote) {
                self.advance();
                let start = self.pos;
                while !self.eof() && !self.current_char_is(quote) {
                    self.advance();
                }
                let value = self.input[start..self.pos].to_string();
                if !self.eof() {
                    self.advance();
                }
                return decode_entities(&value);
            }
        }
        // Unquoted value
        let start = self.pos;
        while !self.eof() {
            let c = self.current_char();
            if c.is_whitespace() || c == '>' || c == '/' {
                break;
            }
            self.advance();
        }
        self.input[start..self.pos].to_string()
    }

    fn skip_whitespace(&mut self) {
        while !self.eof() && self.current_char().is_whitespace() {
            self.advance();
        }
    }

    /// Skip whitespace runs between elements; revert if the run ended in
    /// text so leading spaces inside mixed content survive.
    fn skip_inter_element_whitespace(&mut self) {
        let saved = self.pos;
        self.skip_whitespace();
        if !self.eof() && !self.starts_with("<") {
            self.pos = saved;
        }
    }

    fn skip_comment(&mut self) {
        self.pos += 4; // "<!--"
        while !self.eof() && !self.starts_with("-->") {
            self.advance();
        }
        self.pos = (self.pos + 3).min(self.input.len());
    }

    fn skip_past(&mut self, terminator: char) {
        while !self.eof() && !self.current_char_is(terminator) {
            self.advance();
        }
        if !self.eof() {
            self.advance();
        }
    }

    fn starts_with(&self, s: &str) -> bool {
        self.input[self.pos..].starts_with(s)
    }

    fn eof(&self) -> bool {
        self.pos >= self.input.len()
    }

    fn current_char(&self) -> char {
        self.input[self.pos..].chars().next().unwrap_or('\0')
    }

    fn current_char_is(&self, c: char) -> bool {
        !self.eof() && self.current_char() == c
    }

    fn advance(&mut self) {
        if let Some(c) = self.input[self.pos..].chars().next() {
            self.pos += c.len_utf8();
        }
    }
}

fn decode_entities(s: &str) -> String {
    s.replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&apos;", "'")
        .replace("&nbsp;", "\u{00A0}")
}

/// Return the `<body>` children if the markup is a full document, otherwise
/// the nodes as-is. Editors usually hand us a fragment.
pub fn body_children(nodes: &[Node]) -> Vec<Node> {
    for node in nodes {
        if let Node::Element(e) = node {
            if e.tag == Tag::Body {
                return e.children.clone();
            }
            if e.tag == Tag::Html {
                let inner = body_children(&e.children);
                if !inner.is_empty() {
                    return inner;
                }
            }
        }
    }
    nodes.to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_heading_with_style() {
        let nodes = parse_markup(r#"<h2 style="text-align:center;">Notice</h2>"#);
        assert_eq!(nodes.len(), 1);
        let Node::Element(e) = &nodes[0] else {
            panic!("expected element");
        };
        assert_eq!(e.tag, Tag::H2);
        assert_eq!(e.style_value("text-align").as_deref(), Some("center"));
        assert_eq!(e.text_content(), "Notice");
    }

    #[test]
    fn parse_list_items() {
        let nodes = parse_markup("<ul><li>one</li><li>two</li></ul>");
        let Node::Element(ul) = &nodes[0] else {
            panic!("expected <ul>");
        };
        assert_eq!(ul.tag, Tag::Ul);
        assert_eq!(ul.children.len(), 2);
    }

    #[test]
    fn br_becomes_newline_in_text_content() {
        let nodes = parse_markup("<p>line one<br>line two</p>");
        let Node::Element(p) = &nodes[0] else {
            panic!("expected <p>");
        };
        assert_eq!(p.text_content(), "line one\nline two");
    }

    #[test]
    fn self_closing_img_keeps_src() {
        let nodes = parse_markup(r#"<img src="data:image/png;base64,AAAA" />"#);
        let Node::Element(img) = &nodes[0] else {
            panic!("expected <img>");
        };
        assert_eq!(img.tag, Tag::Img);
        assert_eq!(img.src(), Some("data:image/png;base64,AAAA"));
    }

    #[test]
    fn inline_markup_flattens() {
        let nodes = parse_markup("<p>Hello <strong>bold</strong> and <em>italic</em>.</p>");
        let Node::Element(p) = &nodes[0] else {
            panic!("expected <p>");
        };
        assert_eq!(p.text_content(), "Hello bold and italic.");
    }

    #[test]
    fn body_fragment_unwrap() {
        let nodes = parse_markup("<html><head></head><body><p>x</p></body></html>");
        let inner = body_children(&nodes);
        assert_eq!(inner.len(), 1);
        let Node::Element(p) = &inner[0] else {
            panic!("expected <p>");
        };
        assert_eq!(p.tag, Tag::P);
    }
}
