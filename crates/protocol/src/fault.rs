//! SOAP fault decoding.

use std::fmt;

use serde::Serialize;

use crate::xml::Element;

/// A structured fault returned in place of a method response.
///
/// ```xml
/// <soapenv:Fault>
///   <faultcode>ServerFaultCode</faultcode>
///   <faultstring>A specified parameter was not correct: datacenter</faultstring>
///   <detail>
///     <InvalidArgumentFault xmlns="urn:vim25" xsi:type="InvalidArgument">...</InvalidArgumentFault>
///   </detail>
/// </soapenv:Fault>
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SoapFault {
	pub code: String,
	pub message: String,
	/// Local name of the first element inside `<detail>`, e.g. `InvalidArgumentFault`.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub detail_kind: Option<String>,
}

impl SoapFault {
	/// Decodes a `<Fault>` element.
	pub fn from_element(fault: &Element) -> Self {
		Self {
			code: fault.child_text("faultcode").unwrap_or_default().to_string(),
			message: fault.child_text("faultstring").unwrap_or_default().to_string(),
			detail_kind: fault.child("detail").and_then(|d| d.children.first()).map(|first| first.name.clone()),
		}
	}

	/// The most specific fault classification available.
	pub fn kind(&self) -> &str {
		self.detail_kind.as_deref().unwrap_or(&self.code)
	}
}

impl fmt::Display for SoapFault {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}: {}", self.kind(), self.message)
	}
}
