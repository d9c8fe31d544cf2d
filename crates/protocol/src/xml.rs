//! Minimal XML tree used to decode SOAP responses.
//!
//! Responses are small, so the whole body is read into an owned element tree
//! with `quick-xml` and then walked by local element name. Namespace prefixes
//! are dropped from element names; attribute keys keep their prefix so that
//! `type` (a reference type) and `xsi:type` stay distinct.

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use crate::envelope::DecodeError;

/// An owned XML element.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Element {
	/// Local name, without namespace prefix.
	pub name: String,
	/// Attributes as `(qualified key, unescaped value)`.
	pub attrs: Vec<(String, String)>,
	/// Concatenated, trimmed text content.
	pub text: String,
	pub children: Vec<Element>,
}

impl Element {
	/// Returns an attribute value by its qualified key.
	pub fn attr(&self, key: &str) -> Option<&str> {
		self.attrs.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
	}

	/// First child with local name `name`.
	pub fn child(&self, name: &str) -> Option<&Element> {
		self.children.iter().find(|c| c.name == name)
	}

	/// All children with local name `name`.
	pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
		self.children.iter().filter(move |c| c.name == name)
	}

	/// Text of the first child named `name`.
	pub fn child_text(&self, name: &str) -> Option<&str> {
		self.child(name).map(|c| c.text.as_str())
	}
}

/// Parses a complete document and returns its root element.
pub fn parse(xml: &str) -> Result<Element, DecodeError> {
	let mut reader = Reader::from_str(xml);
	reader.trim_text(true);

	let mut stack: Vec<Element> = Vec::new();
	let mut root: Option<Element> = None;

	loop {
		match reader.read_event() {
			Ok(Event::Start(start)) => stack.push(open_element(&start)?),
			Ok(Event::Empty(start)) => {
				let element = open_element(&start)?;
				attach(&mut stack, &mut root, element);
			}
			Ok(Event::End(_)) => {
				let element = stack.pop().ok_or_else(|| DecodeError::Xml("unbalanced closing tag".to_string()))?;
				attach(&mut stack, &mut root, element);
			}
			Ok(Event::Text(text)) => {
				let text = text.unescape().map_err(|e| DecodeError::Xml(e.to_string()))?;
				if let Some(current) = stack.last_mut() {
					current.text.push_str(text.trim());
				}
			}
			Ok(Event::CData(data)) => {
				if let Some(current) = stack.last_mut() {
					current.text.push_str(&String::from_utf8_lossy(&data.into_inner()));
				}
			}
			Ok(Event::Eof) => break,
			Ok(_) => {}
			Err(e) => return Err(DecodeError::Xml(format!("at position {}: {e}", reader.buffer_position()))),
		}
	}

	if !stack.is_empty() {
		return Err(DecodeError::Xml("unexpected end of document".to_string()));
	}
	root.ok_or_else(|| DecodeError::Xml("empty document".to_string()))
}

fn open_element(start: &BytesStart<'_>) -> Result<Element, DecodeError> {
	let name = String::from_utf8_lossy(start.local_name().as_ref()).into_owned();
	let mut attrs = Vec::new();
	for attr in start.attributes() {
		let attr = attr.map_err(|e| DecodeError::Xml(e.to_string()))?;
		let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
		let value = attr.unescape_value().map_err(|e| DecodeError::Xml(e.to_string()))?.into_owned();
		attrs.push((key, value));
	}
	Ok(Element {
		name,
		attrs,
		..Default::default()
	})
}

fn attach(stack: &mut [Element], root: &mut Option<Element>, element: Element) {
	match stack.last_mut() {
		Some(parent) => parent.children.push(element),
		None => {
			if root.is_none() {
				*root = Some(element);
			}
		}
	}
}

/// Escape special characters for XML content and attribute values.
pub fn escape(s: &str) -> String {
	s.replace('&', "&amp;")
		.replace('<', "&lt;")
		.replace('>', "&gt;")
		.replace('"', "&quot;")
		.replace('\'', "&apos;")
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn escape_covers_markup_characters() {
		assert_eq!(escape("a & <b> \"c\" 'd'"), "a &amp; &lt;b&gt; &quot;c&quot; &apos;d&apos;");
	}

	#[test]
	fn parse_strips_prefixes_from_element_names() {
		let root = parse(r#"<s:Envelope xmlns:s="urn:x"><s:Body><Foo>bar</Foo></s:Body></s:Envelope>"#).unwrap();
		assert_eq!(root.name, "Envelope");
		let body = root.child("Body").unwrap();
		assert_eq!(body.child_text("Foo"), Some("bar"));
	}

	#[test]
	fn parse_keeps_qualified_attribute_keys() {
		let root = parse(r#"<val xmlns:xsi="urn:xsi" xsi:type="xsd:string" type="Datacenter">DC1</val>"#).unwrap();
		assert_eq!(root.attr("type"), Some("Datacenter"));
		assert_eq!(root.attr("xsi:type"), Some("xsd:string"));
		assert_eq!(root.text, "DC1");
	}

	#[test]
	fn parse_unescapes_text_and_handles_empty_elements() {
		let root = parse("<a><b>x &amp; y</b><c/></a>").unwrap();
		assert_eq!(root.child_text("b"), Some("x & y"));
		assert_eq!(root.child_text("c"), Some(""));
	}

	#[test]
	fn parse_rejects_truncated_document() {
		assert!(parse("<a><b>").is_err());
		assert!(parse("").is_err());
	}
}
