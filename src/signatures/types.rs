//! Digital signature types and data structures.
//!
//! This module defines the values exchanged between the workflow and the external
//! document and credential-store backends.

use std::path::PathBuf;

/// Digest algorithm reported for an existing signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HashAlgorithm {
    /// MD2
    Md2,
    /// MD5
    Md5,
    /// SHA-1
    Sha1,
    /// SHA-224
    Sha224,
    /// SHA-256
    Sha256,
    /// SHA-384
    Sha384,
    /// SHA-512
    Sha512,
    /// Not recognised or not reported
    #[default]
    Unknown,
}

impl HashAlgorithm {
    /// Label used in the validation report.
    pub fn label(&self) -> &'static str {
        match self {
            HashAlgorithm::Md2 => "MD2",
            HashAlgorithm::Md5 => "MD5",
            HashAlgorithm::Sha1 => "SHA1",
            HashAlgorithm::Sha224 => "SHA-224",
            HashAlgorithm::Sha256 => "SHA-256",
            HashAlgorithm::Sha384 => "SHA-384",
            HashAlgorithm::Sha512 => "SHA-512",
            HashAlgorithm::Unknown => "unknown",
        }
    }
}

/// Signature type (the PDF `/SubFilter` of the signature dictionary).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SignatureType {
    /// adbe.pkcs7.sha1
    Pkcs7Sha1,
    /// adbe.pkcs7.detached
    Pkcs7Detached,
    /// ETSI.CAdES.detached
    CadesDetached,
    /// Anything else, or no `/SubFilter` at all
    #[default]
    Unknown,
}

impl SignatureType {
    /// Label used in the validation report.
    pub fn label(&self) -> &'static str {
        match self {
            SignatureType::Pkcs7Sha1 => "adbe.pkcs7.sha1",
            SignatureType::Pkcs7Detached => "adbe.pkcs7.detached",
            SignatureType::CadesDetached => "ETSI.CAdES.detached",
            SignatureType::Unknown => "unknown",
        }
    }

    /// Parse a PDF name into a signature type.
    pub fn from_pdf_name(name: &str) -> Self {
        match name {
            "adbe.pkcs7.sha1" => SignatureType::Pkcs7Sha1,
            "adbe.pkcs7.detached" => SignatureType::Pkcs7Detached,
            "ETSI.CAdES.detached" => SignatureType::CadesDetached,
            _ => SignatureType::Unknown,
        }
    }
}

/// Cryptographic validity of a signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SignatureStatus {
    /// Signature is valid
    Valid,
    /// Signature is invalid
    Invalid,
    /// Signed digest does not match the document bytes
    DigestMismatch,
    /// Signature could not be decoded
    DecodingError,
    /// Validation was not performed
    NotVerified,
    /// Any other failure
    #[default]
    Unknown,
}

impl SignatureStatus {
    /// Sentence used in the validation report.
    pub fn readable(&self) -> &'static str {
        match self {
            SignatureStatus::Valid => "Signature is Valid.",
            SignatureStatus::Invalid => "Signature is Invalid.",
            SignatureStatus::DigestMismatch => "Digest Mismatch.",
            SignatureStatus::DecodingError => "Document isn't signed or corrupted data.",
            SignatureStatus::NotVerified => "Signature has not yet been verified.",
            SignatureStatus::Unknown => "Unknown Validation Failure.",
        }
    }

    /// Check if the status indicates a valid signature.
    pub fn is_valid(&self) -> bool {
        matches!(self, SignatureStatus::Valid)
    }
}

/// Trust status of the signer certificate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CertificateStatus {
    /// Certificate chains to a trusted root
    Trusted,
    /// Issuer is known but not trusted
    UntrustedIssuer,
    /// Issuer could not be found
    UnknownIssuer,
    /// Certificate was revoked
    Revoked,
    /// Certificate has expired
    Expired,
    /// Validation was not performed
    NotVerified,
    /// Any other failure
    #[default]
    Unknown,
}

impl CertificateStatus {
    /// Sentence used in the validation report.
    pub fn readable(&self) -> &'static str {
        match self {
            CertificateStatus::Trusted => "Certificate is Trusted.",
            CertificateStatus::UntrustedIssuer => "Certificate issuer isn't Trusted.",
            CertificateStatus::UnknownIssuer => "Certificate issuer is unknown.",
            CertificateStatus::Revoked => "Certificate has been Revoked.",
            CertificateStatus::Expired => "Certificate has Expired",
            CertificateStatus::NotVerified => "Certificate has not yet been verified.",
            CertificateStatus::Unknown => "Unknown issue with Certificate or corrupted data.",
        }
    }
}

/// Moment a signature is validated against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValidationTime {
    /// The current time
    #[default]
    Now,
    /// A fixed Unix timestamp
    At(i64),
}

/// Outcome of validating one signature field.
///
/// Produced fresh by every validation call. Missing data stays `None` and
/// degrades the corresponding report line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationResult {
    /// Signer certificate common name
    pub signer_name: Option<String>,
    /// Signer certificate full distinguished name
    pub subject_dn: Option<String>,
    /// Signing time as a Unix timestamp
    pub signing_time: Option<i64>,
    /// Digest algorithm of the signature
    pub hash_algorithm: HashAlgorithm,
    /// Cryptographic validity
    pub signature_status: SignatureStatus,
    /// Certificate trust status
    pub certificate_status: CertificateStatus,
}

/// A signature extracted and checked against the document bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckedSignature {
    /// DER-encoded signature
    pub bytes: Vec<u8>,
    /// File size as measured independently while extracting
    pub checked_file_size: i64,
}

/// A signing identity available in the credential store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SigningIdentity {
    /// Human-readable nickname
    pub nickname: String,
    /// Backend-specific handle, opaque to the workflow
    pub handle: Vec<u8>,
}

impl SigningIdentity {
    /// Create an identity with an empty handle.
    pub fn new(nickname: impl Into<String>) -> Self {
        Self {
            nickname: nickname.into(),
            handle: Vec::new(),
        }
    }

    /// Attach a backend handle.
    pub fn with_handle(mut self, handle: Vec<u8>) -> Self {
        self.handle = handle;
        self
    }
}

/// Arguments of an external signing call.
#[derive(Clone, PartialEq, Eq)]
pub struct SigningRequest {
    /// Where the signed document is written
    pub output: PathBuf,
    /// Signing certificate nickname
    pub nickname: String,
    /// Signing key password
    pub key_password: Option<String>,
    /// Digest algorithm name
    pub digest: String,
    /// Reason as a PDF text string
    pub reason: Option<Vec<u8>>,
    /// Overrides the target field's signature type before signing
    pub signature_type: Option<SignatureType>,
}

impl std::fmt::Debug for SigningRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SigningRequest")
            .field("output", &self.output)
            .field("nickname", &self.nickname)
            .field("key_password", &self.key_password.as_ref().map(|_| "[REDACTED]"))
            .field("digest", &self.digest)
            .field("reason", &self.reason.as_ref().map(|r| format!("{} bytes", r.len())))
            .field("signature_type", &self.signature_type)
            .finish()
    }
}

/// Arguments of an external call that adds a new signature field and signs it.
#[derive(Debug, Clone, PartialEq)]
pub struct NewSignatureRequest {
    /// Common signing arguments
    pub signing: SigningRequest,
    /// Fully qualified name of the new field
    pub field_name: String,
    /// Page the widget is placed on (1-based)
    pub page: usize,
    /// Visual appearance of the widget
    pub appearance: SignatureAppearance,
    /// Signing location
    pub location: Option<String>,
    /// Owner password of the input document
    pub owner_password: Option<String>,
    /// User password of the input document
    pub user_password: Option<String>,
}

/// Visible signature appearance configuration.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SignatureAppearance {
    /// Widget rectangle `[x1, y1, x2, y2]`
    pub rect: [f64; 4],
    /// Text drawn in the widget
    pub text: String,
    /// Text drawn on the left half of the widget
    pub text_left: String,
    /// Font size of the text
    pub font_size: f64,
    /// Font color (RGB)
    pub font_color: Option<[f64; 3]>,
    /// Border width
    pub border_width: f64,
    /// Border color (RGB)
    pub border_color: Option<[f64; 3]>,
    /// Background color (RGB)
    pub background_color: Option<[f64; 3]>,
    /// Background image
    pub image_path: Option<PathBuf>,
}

impl SignatureAppearance {
    /// An appearance with a zero rectangle and nothing drawn.
    pub fn invisible() -> Self {
        Self::default()
    }

    /// Whether the widget has no visible area.
    pub fn is_invisible(&self) -> bool {
        self.rect == [0.0; 4]
    }
}
