//! Configuration for signature operations.
//!
//! A [`SigConfig`] is built once from the command line and passed by reference to
//! every component. Nothing mutates it after construction.

use std::path::PathBuf;

/// Digest algorithm used when none is requested.
pub const DEFAULT_DIGEST: &str = "SHA256";

/// Signature tool configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SigConfig {
    /// Credential store location and password.
    pub store: StoreSettings,

    /// Passwords for encrypted documents.
    pub document: DocumentPasswords,

    /// Options forwarded to signature validation.
    pub validation: ValidationOptions,

    /// Options used by both signing modes.
    pub signing: SigningSettings,
}

impl SigConfig {
    /// Create new configuration with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the credential store settings.
    pub fn with_store(mut self, store: StoreSettings) -> Self {
        self.store = store;
        self
    }

    /// Set the document passwords.
    pub fn with_document(mut self, document: DocumentPasswords) -> Self {
        self.document = document;
        self
    }

    /// Set the validation options.
    pub fn with_validation(mut self, validation: ValidationOptions) -> Self {
        self.validation = validation;
        self
    }

    /// Set the signing settings.
    pub fn with_signing(mut self, signing: SigningSettings) -> Self {
        self.signing = signing;
        self
    }
}

/// Credential store settings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreSettings {
    /// Store directory; the backend default is used when unset.
    pub directory: Option<PathBuf>,
    /// Store password; an empty password counts as none.
    pub password: Option<String>,
}

impl StoreSettings {
    /// The configured password, if it is non-empty.
    pub fn password(&self) -> Option<&str> {
        self.password.as_deref().filter(|pw| !pw.is_empty())
    }
}

/// Owner and user passwords for encrypted documents.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentPasswords {
    /// Owner password
    pub owner: Option<String>,
    /// User password
    pub user: Option<String>,
}

/// Options forwarded to the external signature validation service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidationOptions {
    /// Validate the signer certificate (`-nocert` clears it).
    pub verify_certificate: bool,
    /// Check certificate revocation online (`-no-ocsp` clears it).
    pub check_ocsp: bool,
    /// Fetch missing issuer certificates through the AIA extension.
    pub use_aia: bool,
}

impl Default for ValidationOptions {
    fn default() -> Self {
        Self {
            verify_certificate: true,
            check_ocsp: true,
            use_aia: false,
        }
    }
}

/// Settings shared by the two signing modes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SigningSettings {
    /// Nickname of the signing certificate in the credential store.
    pub nickname: String,
    /// Password of the signing key; empty means the key is unprotected.
    pub key_password: String,
    /// Digest algorithm name as given on the command line.
    pub digest: String,
    /// Reason for signing; empty means no reason.
    pub reason: String,
    /// Produce ETSI.CAdES.detached instead of adbe.pkcs7.detached.
    pub cades: bool,
    /// Name of a newly added signature field; generated when unset.
    pub new_field_name: Option<String>,
}

impl Default for SigningSettings {
    fn default() -> Self {
        Self {
            nickname: String::new(),
            key_password: String::new(),
            digest: DEFAULT_DIGEST.to_string(),
            reason: String::new(),
            cades: false,
            new_field_name: None,
        }
    }
}

impl SigningSettings {
    /// Key password to hand to the signer, `None` when the key is unprotected.
    pub fn key_password(&self) -> Option<&str> {
        if self.key_password.is_empty() {
            None
        } else {
            Some(&self.key_password)
        }
    }

    /// Signing reason encoded as a PDF text string (UTF-16BE with byte-order mark).
    ///
    /// Returns `None` for an empty reason.
    pub fn reason_text(&self) -> Option<Vec<u8>> {
        if self.reason.is_empty() {
            return None;
        }
        let mut encoded = vec![0xFE, 0xFF];
        for unit in self.reason.encode_utf16() {
            encoded.extend_from_slice(&unit.to_be_bytes());
        }
        Some(encoded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SigConfig::new();
        assert!(config.validation.verify_certificate);
        assert!(config.validation.check_ocsp);
        assert!(!config.validation.use_aia);
        assert_eq!(config.signing.digest, "SHA256");
        assert!(!config.signing.cades);
        assert_eq!(config.store.password(), None);
    }

    #[test]
    fn test_empty_store_password_counts_as_none() {
        let store = StoreSettings {
            directory: None,
            password: Some(String::new()),
        };
        assert_eq!(store.password(), None);
    }

    #[test]
    fn test_key_password() {
        let mut signing = SigningSettings::default();
        assert_eq!(signing.key_password(), None);
        signing.key_password = "secret".to_string();
        assert_eq!(signing.key_password(), Some("secret"));
    }

    #[test]
    fn test_reason_text_is_utf16_with_bom() {
        let signing = SigningSettings {
            reason: "Ok é".to_string(),
            ..Default::default()
        };
        let text = signing.reason_text().unwrap();
        assert_eq!(&text[..2], &[0xFE, 0xFF]);
        assert_eq!(&text[2..], &[0x00, b'O', 0x00, b'k', 0x00, b' ', 0x00, 0xE9]);
    }

    #[test]
    fn test_empty_reason_is_absent() {
        assert_eq!(SigningSettings::default().reason_text(), None);
    }

    #[test]
    fn test_builder() {
        let config = SigConfig::new().with_validation(ValidationOptions {
            verify_certificate: false,
            check_ocsp: false,
            use_aia: true,
        });
        assert!(!config.validation.verify_certificate);
        assert!(config.validation.use_aia);
    }
}
