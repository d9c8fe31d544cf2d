//! SOAP envelope encoding and response decoding.
//!
//! Every call is a SOAP 1.1 document whose body holds a single element named
//! after the method, in the `urn:vim25` namespace. The reply body holds either
//! `<{Method}Response>` with an optional `<returnval>` child or a `<Fault>`.

use thiserror::Error;

use crate::fault::SoapFault;
use crate::types::ManagedObjectReference;
use crate::xml::{self, Element, escape};

/// Namespace of every vim25 method element.
pub const VIM25_NS: &str = "urn:vim25";

const NS_SOAPENV: &str = "http://schemas.xmlsoap.org/soap/envelope/";
const NS_XSD: &str = "http://www.w3.org/2001/XMLSchema";
const NS_XSI: &str = "http://www.w3.org/2001/XMLSchema-instance";

/// Errors decoding a response document.
#[derive(Debug, Error)]
pub enum DecodeError {
	#[error("malformed XML: {0}")]
	Xml(String),

	#[error("response has no SOAP body")]
	MissingBody,

	#[error("expected <{expected}> in response body, found <{found}>")]
	UnexpectedElement { expected: String, found: String },

	#[error("response is missing `{0}`")]
	MissingField(&'static str),

	#[error("SOAP fault {0}")]
	Fault(SoapFault),
}

/// A vim25 method: how to encode the request and decode its `returnval`.
pub trait VimMethod {
	/// Decoded `returnval`.
	type Output;

	/// Method element name, e.g. `FindByIp`.
	const NAME: &'static str;

	/// Serializes the method parameters, in WSDL order, as XML child elements.
	fn write_params(&self, out: &mut String);

	/// Decodes the `returnval` element, which is absent for void methods and
	/// for optional results that were not found.
	fn decode(returnval: Option<&Element>) -> Result<Self::Output, DecodeError>;
}

/// Value of the `SOAPAction` HTTP header for `api_version`.
pub fn soap_action(api_version: &str) -> String {
	format!("{VIM25_NS}/{api_version}")
}

/// Builds the complete request document for `method`.
pub fn envelope<M: VimMethod>(method: &M) -> String {
	let mut params = String::new();
	method.write_params(&mut params);
	format!(
		r#"<?xml version="1.0" encoding="UTF-8"?><soapenv:Envelope xmlns:soapenv="{NS_SOAPENV}" xmlns:xsd="{NS_XSD}" xmlns:xsi="{NS_XSI}"><soapenv:Body><{name} xmlns="{VIM25_NS}">{params}</{name}></soapenv:Body></soapenv:Envelope>"#,
		name = M::NAME,
	)
}

/// Decodes a response document for `M`.
///
/// A `<Fault>` body is returned as [`DecodeError::Fault`] regardless of the
/// HTTP status it arrived with.
pub fn decode_response<M: VimMethod>(document: &str) -> Result<M::Output, DecodeError> {
	let root = xml::parse(document)?;
	let body = root.child("Body").ok_or(DecodeError::MissingBody)?;
	let payload = body.children.first().ok_or(DecodeError::MissingBody)?;

	if payload.name == "Fault" {
		return Err(DecodeError::Fault(SoapFault::from_element(payload)));
	}

	let expected = format!("{}Response", M::NAME);
	if payload.name != expected {
		return Err(DecodeError::UnexpectedElement {
			expected,
			found: payload.name.clone(),
		});
	}

	M::decode(payload.child("returnval"))
}

/// Writes `<name type="Kind">value</name>`.
pub fn write_reference(out: &mut String, name: &str, mor: &ManagedObjectReference) {
	out.push_str(&format!(r#"<{name} type="{}">{}</{name}>"#, escape(&mor.kind), escape(&mor.value)));
}

/// Writes `<name>value</name>`.
pub fn write_text(out: &mut String, name: &str, value: &str) {
	out.push_str(&format!("<{name}>{}</{name}>", escape(value)));
}

/// Writes `<name>true|false</name>`.
pub fn write_bool(out: &mut String, name: &str, value: bool) {
	out.push_str(&format!("<{name}>{value}</{name}>"));
}

/// Reads a reference from an element with a `type` attribute.
pub fn read_reference(element: &Element) -> Result<ManagedObjectReference, DecodeError> {
	let kind = element.attr("type").ok_or(DecodeError::MissingField("type"))?;
	Ok(ManagedObjectReference::new(kind, element.text.clone()))
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::methods::FindByInventoryPath;

	#[test]
	fn soap_action_includes_version() {
		assert_eq!(soap_action("6.0"), "urn:vim25/6.0");
	}

	#[test]
	fn decode_reports_unexpected_body_element() {
		let document = r#"<Envelope><Body><LoginResponse/></Body></Envelope>"#;
		let err = decode_response::<FindByInventoryPath>(document).unwrap_err();
		assert!(matches!(err, DecodeError::UnexpectedElement { ref found, .. } if found == "LoginResponse"));
	}

	#[test]
	fn decode_reports_missing_body() {
		let err = decode_response::<FindByInventoryPath>("<Envelope/>").unwrap_err();
		assert!(matches!(err, DecodeError::MissingBody));
	}
}
