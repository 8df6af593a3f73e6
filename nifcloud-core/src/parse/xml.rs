//! Minimal XML tree used by the response parsers.
//!
//! Namespace prefixes are stripped; the shape walk only ever matches on
//! local element names.

use quick_xml::events::Event;
use quick_xml::Reader;

use crate::error::Error;

#[derive(Debug, Clone, Default)]
pub(crate) struct XmlNode {
    pub name: String,
    pub text: String,
    pub children: Vec<XmlNode>,
}

impl XmlNode {
    /// Parse a document and return its root element.
    pub fn parse(body: &[u8]) -> Result<XmlNode, Error> {
        let text = std::str::from_utf8(body)
            .map_err(|_| Error::ResponseParse("response body is not valid UTF-8".to_string()))?;
        let mut reader = Reader::from_str(text);
        reader.config_mut().trim_text(true);

        let mut stack: Vec<XmlNode> = Vec::new();
        let mut root: Option<XmlNode> = None;

        loop {
            match reader.read_event() {
                Ok(Event::Start(ref e)) => {
                    stack.push(XmlNode {
                        name: local_name(e.name().as_ref())?,
                        ..XmlNode::default()
                    });
                }
                Ok(Event::Empty(ref e)) => {
                    let node = XmlNode {
                        name: local_name(e.name().as_ref())?,
                        ..XmlNode::default()
                    };
                    attach(&mut stack, &mut root, node);
                }
                Ok(Event::Text(ref e)) => {
                    if let Some(top) = stack.last_mut() {
                        let text = e
                            .unescape()
                            .map_err(|err| Error::ResponseParse(err.to_string()))?;
                        top.text.push_str(&text);
                    }
                }
                Ok(Event::CData(ref e)) => {
                    if let Some(top) = stack.last_mut() {
                        top.text.push_str(&String::from_utf8_lossy(e));
                    }
                }
                Ok(Event::End(_)) => {
                    if let Some(node) = stack.pop() {
                        attach(&mut stack, &mut root, node);
                    }
                }
                Ok(Event::Eof) => break,
                Ok(_) => {}
                Err(e) => {
                    return Err(Error::ResponseParse(format!(
                        "xml error at position {}: {e}",
                        reader.buffer_position()
                    )))
                }
            }
        }

        root.ok_or_else(|| Error::ResponseParse("empty response document".to_string()))
    }

    pub fn child(&self, name: &str) -> Option<&XmlNode> {
        self.children.iter().find(|c| c.name == name)
    }

    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a XmlNode> {
        self.children.iter().filter(move |c| c.name == name)
    }

    /// Depth-first search for the first element with the given name.
    pub fn find(&self, name: &str) -> Option<&XmlNode> {
        if self.name == name {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find(name))
    }
}

fn attach(stack: &mut [XmlNode], root: &mut Option<XmlNode>, node: XmlNode) {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(node);
    } else if root.is_none() {
        *root = Some(node);
    }
}

fn local_name(raw: &[u8]) -> Result<String, Error> {
    let full = std::str::from_utf8(raw)
        .map_err(|_| Error::ResponseParse("invalid UTF-8 in element name".to_string()))?;
    Ok(full.rsplit(':').next().unwrap_or(full).to_string())
}
