//! `search-index`: resolve a datacenter and look up virtual machines and
//! hosts through the vSphere search index.

pub mod app;
pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod output;
pub mod runner;
