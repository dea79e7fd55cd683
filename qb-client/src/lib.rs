//! Blocking client for the Quick Base JSON API and the parts of the XML API
//! that have no JSON counterpart (pages, variables, app listing).
//!
//! Record payloads go through [`qbcli_core`], so queries come back as typed
//! values and inserts are encoded from them.

// Miette's derive macro generates code that triggers these warnings
#![allow(unused_assignments)]

mod client;
pub mod config;
mod error;
pub mod query;
pub mod resources;
pub mod security;
pub mod transport;
pub mod xml;

pub use client::{Client, DEFAULT_BASE_URL};
pub use config::{ConfigToml, DEFAULT_PROFILE, Profile};
pub use error::{Error, Result, status_for_errcode};
pub use transport::{DumpTransport, HttpTransport, Method, Request, Response, Transport};
