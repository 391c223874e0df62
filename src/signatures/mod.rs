//! PDF digital signature workflow building blocks.
//!
//! ## Components
//!
//! - **Credentials**: password negotiation with the credential store
//! - **Field names**: random names for newly added signature fields
//! - **Byte ranges**: whether a signature covers the whole document
//! - **Report**: human-readable validation report
//! - **Dump**: raw signature values written to files
//!
//! ## Signature Types
//!
//! - PKCS#7 detached signatures (adbe.pkcs7.detached)
//! - PKCS#7 SHA-1 signatures (adbe.pkcs7.sha1)
//! - PAdES signatures (ETSI.CAdES.detached)
//!
//! ## PDF Specification Reference
//!
//! - ISO 32000-1:2008 Section 12.8 - Digital Signatures
//! - ETSI TS 102 778 - PAdES

mod byterange;
mod credentials;
mod dump;
mod field_name;
mod report;
mod types;

pub use byterange::{RangeCoverage, SignedRangeAnalyzer, SignedRanges};
pub use credentials::{
    ChallengeOutcome, ChallengeResponse, CredentialAccessor, CredentialStore, PasswordChallenge,
};
pub use dump::{dump_file_name, SignatureDumper};
pub use field_name::{FieldNameGenerator, FIELD_NAME_LEN};
pub use report::{readable_time, ValidationReporter, SIGNING_TIME_FORMAT};
pub use types::{
    CertificateStatus, CheckedSignature, HashAlgorithm, NewSignatureRequest, SignatureAppearance,
    SignatureStatus, SignatureType, SigningIdentity, SigningRequest, ValidationResult,
    ValidationTime,
};
