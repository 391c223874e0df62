//! The validated operation request.

use crate::config::SigConfig;
use std::num::NonZeroUsize;
use std::path::PathBuf;

/// The single operation a run performs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    /// List the nicknames of the signing identities in the credential store
    ListIdentities,
    /// Validate every signature and print a report
    Report {
        /// Document to inspect
        document: PathBuf,
    },
    /// Write every raw signature value to a file
    Dump {
        /// Document to inspect
        document: PathBuf,
    },
    /// Sign an existing, unsigned signature field
    SignExisting {
        /// Document to sign
        document: PathBuf,
        /// Where the signed document is written
        output: PathBuf,
        /// 1-based number of the field to sign
        field_number: NonZeroUsize,
    },
    /// Add a new signature field and sign it
    SignNew {
        /// Document to sign
        document: PathBuf,
        /// Where the signed document is written
        output: PathBuf,
    },
}

/// A command intent: the mode plus the configuration every component reads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationRequest {
    /// Selected mode
    pub mode: Mode,
    /// Configuration shared by all components
    pub config: SigConfig,
}

impl OperationRequest {
    /// Create a request.
    pub fn new(mode: Mode, config: SigConfig) -> Self {
        Self { mode, config }
    }
}
