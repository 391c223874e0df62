//! Error types for the signature tool.
//!
//! Every error is terminal for the process. Each variant carries the message shown
//! to the user, and [`Error::exit_code`] maps it to the process exit status.

use std::path::PathBuf;

/// Result type alias for signature tool operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while running a signature operation.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Malformed invocation (unknown flag, missing value, bad positional count)
    #[error("{0}")]
    Usage(String),

    /// The document could not be opened or parsed
    #[error("Error opening document '{path}': {reason}")]
    DocumentOpen {
        /// Path that was being opened
        path: PathBuf,
        /// Reason reported by the document backend
        reason: String,
    },

    /// A signing mode was requested without an output file
    #[error("An output filename for the signed document must be given")]
    MissingOutputPath,

    /// The output file of a new signature would overwrite the input
    #[error("The output filename must differ from the input filename '{0}'")]
    OutputSameAsInput(PathBuf),

    /// No signing certificate nickname was given
    #[error("A nickname of the signing certificate must be given")]
    MissingNickname,

    /// CAdES was requested together with a new signature field
    #[error("-etsi is not supported yet with -add-signature\nPlease file a bug report if this is important for you")]
    CadesNotSupportedForNewField,

    /// A digest other than SHA256 was requested for a new signature field
    #[error("Only digest SHA256 is supported at the moment with -add-signature\nPlease file a bug report if this is important for you")]
    UnsupportedDigest(String),

    /// The document has no first page to attach a new signature to
    #[error("Error getting first page of the document.")]
    NoFirstPage,

    /// The requested signature field number does not exist
    #[error("File '{path}' does not contain a signature with number {number}")]
    FieldOutOfRange {
        /// Document path
        path: PathBuf,
        /// Requested 1-based field number
        number: usize,
    },

    /// The requested signature field already holds a signature
    #[error("Signature number {0} is already signed")]
    FieldAlreadySigned(usize),

    /// The requested signature field does not resolve to exactly one widget
    #[error("Unexpected number of widgets for the signature: {0}")]
    UnexpectedWidgetCount(usize),

    /// The document has no signature fields to report on or dump
    #[error("File '{0}' does not contain any signatures")]
    NoSignatures(PathBuf),

    /// The credential store asked for a password and none was configured
    #[error("Password is needed to access the NSS database.\n\tPlease provide one with -nss-pwd.")]
    StorePasswordNeeded,

    /// The credential store rejected the configured password
    #[error("Password was not accepted to open the NSS database.\n\tPlease provide the correct one with -nss-pwd.")]
    StorePasswordRejected,

    /// The external signing call reported failure
    #[error("Signing the document into '{0}' failed")]
    SigningFailed(PathBuf),

    /// A signature field had no extractable signature to dump
    #[error("Cannot dump signature #{0}")]
    DumpFailed(usize),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Process exit code for this error.
    ///
    /// | Code | Meaning |
    /// |------|---------|
    /// | 1    | document failed to open |
    /// | 2    | precondition or credential-store failure |
    /// | 3    | signing or dumping failed |
    /// | 99   | malformed invocation |
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::Usage(_) => 99,
            Error::DocumentOpen { .. } => 1,
            Error::MissingOutputPath
            | Error::OutputSameAsInput(_)
            | Error::MissingNickname
            | Error::CadesNotSupportedForNewField
            | Error::UnsupportedDigest(_)
            | Error::NoFirstPage
            | Error::FieldOutOfRange { .. }
            | Error::FieldAlreadySigned(_)
            | Error::UnexpectedWidgetCount(_)
            | Error::NoSignatures(_)
            | Error::StorePasswordNeeded
            | Error::StorePasswordRejected => 2,
            Error::SigningFailed(_) | Error::DumpFailed(_) | Error::Io(_) => 3,
        }
    }

    /// Whether the usage text should accompany this error.
    pub fn wants_usage(&self) -> bool {
        matches!(self, Error::Usage(_))
    }
}
