//! Session facade over the vSphere vim25 SOAP API.
//!
//! `searchidx` owns everything between a validated connection config and the
//! typed results of search index calls: the HTTP client, login and logout,
//! inventory enumeration, and the mapping of SOAP faults into [`Error`].
//!
//! Wire shapes live in `searchidx-protocol` and are re-exported here as
//! [`protocol`].

pub mod client;
pub mod config;
pub mod error;
pub mod facade;
pub mod session;

pub use config::ConnectionConfig;
pub use error::{Error, Result};
pub use facade::SessionFacade;
pub use searchidx_protocol as protocol;
pub use searchidx_protocol::ManagedObjectReference;
pub use session::VimSession;
