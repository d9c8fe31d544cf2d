//! Wire types for the vim25 SOAP protocol.
//!
//! This crate contains the request shapes, response types, and the XML codec
//! used to talk to a vSphere management endpoint. These types represent the
//! "protocol layer" - the shapes of data as they appear on the wire.
//!
//! # Design Philosophy
//!
//! Types in this crate are:
//! * Pure data: No I/O, only envelope encoding and response decoding
//! * 1:1 with protocol: Element names and order match the vim25 WSDL
//! * Narrow: Only the methods a search index client needs
//!
//! Session handling and HTTP transport are built on top of these types in
//! `searchidx-rs`.

pub mod envelope;
pub mod fault;
pub mod methods;
pub mod types;
pub mod xml;

pub use envelope::*;
pub use fault::*;
pub use methods::*;
pub use types::*;
