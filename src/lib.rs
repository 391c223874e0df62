// Allow unused for tests
#![cfg_attr(test, allow(dead_code))]

//! # pdfsig
//!
//! Signature workflows for PDF documents: list signing identities, report on and
//! dump existing signatures, sign an existing signature field, or add and sign a
//! new one.
//!
//! ## Architecture
//!
//! - **Request**: the command line becomes one immutable [`OperationRequest`]
//!   whose [`Mode`] names exactly one operation
//! - **Dispatch**: [`SigningDispatcher`] checks the mode's preconditions in order
//!   and drives the operation
//! - **Pluggable backends**: documents come from a [`DocumentOpener`] and signing
//!   identities from a [`CredentialStore`]; parsing and cryptography stay in the
//!   backends
//! - **Built-in backends**: [`ScanOpener`] reads signature dictionaries straight
//!   from the file bytes, [`DirectoryStore`] lists identity files in a directory
//!
//! ## Quick Start
//!
//! ```no_run
//! use pdfsig::cli::{parse_args, Invocation};
//! use pdfsig::{DirectoryStore, ScanOpener, SigningDispatcher};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! if let Invocation::Run(request) = parse_args(["-nocert", "signed.pdf"])? {
//!     let mut store = DirectoryStore::new(request.config.store.directory.as_deref());
//!     let mut out = std::io::stdout();
//!     SigningDispatcher::new(&ScanOpener, &mut store).run(&request, &mut out)?;
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## License
//!
//! Licensed under either of:
//!
//! * Apache License, Version 2.0 ([LICENSE-APACHE](LICENSE-APACHE) or <http://www.apache.org/licenses/LICENSE-2.0>)
//! * MIT license ([LICENSE-MIT](LICENSE-MIT) or <http://opensource.org/licenses/MIT>)
//!
//! at your option.

#![warn(missing_docs)]

// Error handling
pub mod error;

// Configuration and command line
pub mod cli;
pub mod config;
pub mod request;

// Backend interfaces
pub mod document;

// Workflow
pub mod dispatch;
pub mod signatures;

// Built-in backends
pub mod scanner;
pub mod store;

pub use config::SigConfig;
pub use dispatch::SigningDispatcher;
pub use document::{DocumentOpener, SignatureDocument, SignatureField};
pub use error::{Error, Result};
pub use request::{Mode, OperationRequest};
pub use scanner::{ScanOpener, ScannedDocument};
pub use signatures::CredentialStore;
pub use store::DirectoryStore;

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
