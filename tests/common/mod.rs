//! In-memory document and credential-store backends for integration tests.

#![allow(dead_code)]

use pdfsig::config::{DocumentPasswords, ValidationOptions};
use pdfsig::document::{DocumentOpener, SignatureDocument, SignatureField};
use pdfsig::error::{Error, Result};
use pdfsig::signatures::{
    CertificateStatus, CheckedSignature, CredentialStore, HashAlgorithm, NewSignatureRequest,
    PasswordChallenge, SignatureStatus, SignatureType, SigningIdentity, SigningRequest,
    ValidationResult, ValidationTime,
};
use std::cell::{Cell, RefCell};
use std::path::{Path, PathBuf};
use std::rc::Rc;

/// A signature field with canned answers.
#[derive(Debug, Clone, Default)]
pub struct FakeField {
    pub signature_type: SignatureType,
    pub widgets: usize,
    pub signature: Option<Vec<u8>>,
    pub checked: Option<CheckedSignature>,
    pub bounds: Vec<i64>,
    pub result: ValidationResult,
    pub validations: Rc<RefCell<Vec<(ValidationOptions, ValidationTime)>>>,
}

impl FakeField {
    /// An empty field with one widget.
    pub fn unsigned() -> Self {
        Self {
            widgets: 1,
            ..Self::default()
        }
    }

    /// A field signed over `[0, 10) [20, size)` of a `size`-byte file.
    pub fn signed(size: i64) -> Self {
        let blob = vec![0x30, 0x03, 0x02, 0x01, 0x01];
        Self {
            signature_type: SignatureType::Pkcs7Detached,
            widgets: 1,
            signature: Some(blob.clone()),
            checked: Some(CheckedSignature {
                bytes: blob,
                checked_file_size: size,
            }),
            bounds: vec![0, 10, 20, size],
            result: ValidationResult {
                signer_name: Some("Jane Doe".to_string()),
                subject_dn: Some("CN=Jane Doe,O=Example".to_string()),
                signing_time: Some(1_700_000_000),
                hash_algorithm: HashAlgorithm::Sha256,
                signature_status: SignatureStatus::Valid,
                certificate_status: CertificateStatus::Trusted,
            },
            validations: Rc::default(),
        }
    }

    pub fn with_status(mut self, signature: SignatureStatus, certificate: CertificateStatus) -> Self {
        self.result.signature_status = signature;
        self.result.certificate_status = certificate;
        self
    }
}

impl SignatureField for FakeField {
    fn signature_type(&self) -> SignatureType {
        self.signature_type
    }

    fn widget_count(&self) -> usize {
        self.widgets
    }

    fn signature(&self) -> Option<Vec<u8>> {
        self.signature.clone()
    }

    fn checked_signature(&self) -> Option<CheckedSignature> {
        self.checked.clone()
    }

    fn signed_range_bounds(&self) -> Vec<i64> {
        self.bounds.clone()
    }

    fn validate(&self, options: &ValidationOptions, at: ValidationTime) -> ValidationResult {
        self.validations.borrow_mut().push((*options, at));
        self.result.clone()
    }
}

/// A signing call received by [`FakeDocument`].
#[derive(Debug, Clone, PartialEq)]
pub enum SignCall {
    Existing(usize, SigningRequest),
    New(NewSignatureRequest),
}

/// A document with canned fields that records signing calls.
#[derive(Debug, Clone)]
pub struct FakeDocument {
    pub path: PathBuf,
    pub pages: usize,
    pub fields: Vec<FakeField>,
    pub sign_succeeds: bool,
    pub sign_calls: Rc<RefCell<Vec<SignCall>>>,
}

impl FakeDocument {
    pub fn new(path: &str, fields: Vec<FakeField>) -> Self {
        Self {
            path: PathBuf::from(path),
            pages: 1,
            fields,
            sign_succeeds: true,
            sign_calls: Rc::default(),
        }
    }
}

impl SignatureDocument for FakeDocument {
    type Field = FakeField;

    fn path(&self) -> &Path {
        &self.path
    }

    fn signature_fields(&self) -> &[FakeField] {
        &self.fields
    }

    fn has_page(&self, number: usize) -> bool {
        number >= 1 && number <= self.pages
    }

    fn sign_field(&mut self, index: usize, request: &SigningRequest) -> bool {
        self.sign_calls
            .borrow_mut()
            .push(SignCall::Existing(index, request.clone()));
        self.sign_succeeds
    }

    fn sign_new_field(&mut self, request: &NewSignatureRequest) -> bool {
        self.sign_calls.borrow_mut().push(SignCall::New(request.clone()));
        self.sign_succeeds
    }
}

/// Hands out clones of one document, or fails to open.
pub struct FakeOpener {
    pub document: Option<FakeDocument>,
    pub opened: Cell<usize>,
    pub passwords: RefCell<Option<DocumentPasswords>>,
}

impl FakeOpener {
    pub fn new(document: FakeDocument) -> Self {
        Self {
            document: Some(document),
            opened: Cell::new(0),
            passwords: RefCell::new(None),
        }
    }

    pub fn broken() -> Self {
        Self {
            document: None,
            opened: Cell::new(0),
            passwords: RefCell::new(None),
        }
    }

    /// Signing calls recorded by the served document.
    pub fn sign_calls(&self) -> Vec<SignCall> {
        self.document
            .as_ref()
            .map(|doc| doc.sign_calls.borrow().clone())
            .unwrap_or_default()
    }
}

impl DocumentOpener for FakeOpener {
    type Document = FakeDocument;

    fn open(&self, path: &Path, passwords: &DocumentPasswords) -> Result<FakeDocument> {
        self.opened.set(self.opened.get() + 1);
        *self.passwords.borrow_mut() = Some(passwords.clone());
        match &self.document {
            Some(doc) => {
                let mut doc = doc.clone();
                doc.path = path.to_path_buf();
                Ok(doc)
            },
            None => Err(Error::DocumentOpen {
                path: path.to_path_buf(),
                reason: "damaged".to_string(),
            }),
        }
    }
}

/// Credential store that optionally requires a password.
#[derive(Debug, Default)]
pub struct FakeStore {
    pub identities: Vec<SigningIdentity>,
    pub required_password: Option<String>,
    pub sessions: usize,
}

impl FakeStore {
    pub fn open(nicknames: &[&str]) -> Self {
        Self {
            identities: nicknames.iter().map(|n| SigningIdentity::new(*n)).collect(),
            ..Self::default()
        }
    }

    pub fn locked(password: &str, nicknames: &[&str]) -> Self {
        Self {
            required_password: Some(password.to_string()),
            ..Self::open(nicknames)
        }
    }
}

impl CredentialStore for FakeStore {
    fn signing_identities(&mut self, challenge: &mut PasswordChallenge<'_>) -> Vec<SigningIdentity> {
        self.sessions += 1;
        let Some(required) = self.required_password.clone() else {
            return self.identities.clone();
        };
        // Ask until the right password arrives or the challenge gives up.
        for _ in 0..3 {
            match challenge.respond("Fake DB").password() {
                Some(pw) if pw == required => return self.identities.clone(),
                Some(_) => continue,
                None => break,
            }
        }
        Vec::new()
    }
}

/// Hex value of the signature embedded by [`signed_pdf`], zero padded.
pub const EMBEDDED_SIGNATURE_HEX: &str = "30030102030000000000";

/// Build a one-page PDF with a signed field and, optionally, an unsigned one.
///
/// `appended` is written after the signed ranges, as an incremental update would.
/// Returns the file bytes and the `/ByteRange` written into the signature.
pub fn signed_pdf(with_unsigned_field: bool, appended: &[u8]) -> (Vec<u8>, [i64; 4]) {
    const PLACEHOLDER: &str = "0000000000 0000000000 0000000000 0000000000";

    let mut head = String::from("%PDF-1.7\n");
    let fields = if with_unsigned_field { "4 0 R 6 0 R" } else { "4 0 R" };
    head.push_str(&format!(
        "1 0 obj\n<< /Type /Catalog /Pages 2 0 R /AcroForm << /Fields [{}] >> >>\nendobj\n",
        fields
    ));
    head.push_str("2 0 obj\n<< /Type /Pages /Kids [3 0 R] /Count 1 >>\nendobj\n");
    head.push_str("3 0 obj\n<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] >>\nendobj\n");
    head.push_str("4 0 obj\n<< /FT /Sig /Type /Annot /Subtype /Widget /T (Signature1) /V 5 0 R /Rect [0 0 0 0] >>\nendobj\n");
    head.push_str("5 0 obj\n<< /Type /Sig /Filter /Adobe.PPKLite /SubFilter /adbe.pkcs7.detached ");
    head.push_str("/Name (Jane Doe) /M (D:20231114221320Z) ");
    head.push_str(&format!("/ByteRange [{}] /Contents ", PLACEHOLDER));

    let contents = format!("<{}>", EMBEDDED_SIGNATURE_HEX);

    let mut tail = String::from(" >>\nendobj\n");
    if with_unsigned_field {
        tail.push_str("6 0 obj\n<< /FT /Sig /Type /Annot /Subtype /Widget /T (Signature2) /Rect [0 0 0 0] >>\nendobj\n");
    }
    tail.push_str("trailer\n<< /Root 1 0 R >>\n%%EOF\n");

    let gap_start = head.len() as i64;
    let gap_end = gap_start + contents.len() as i64;
    let total = gap_end + tail.len() as i64;
    let byte_range = [0, gap_start, gap_end, total - gap_end];

    let filled = format!(
        "{:>10} {:>10} {:>10} {:>10}",
        byte_range[0], byte_range[1], byte_range[2], byte_range[3]
    );
    assert_eq!(filled.len(), PLACEHOLDER.len());
    let head = head.replace(PLACEHOLDER, &filled);

    let mut data = Vec::new();
    data.extend_from_slice(head.as_bytes());
    data.extend_from_slice(contents.as_bytes());
    data.extend_from_slice(tail.as_bytes());
    data.extend_from_slice(appended);
    (data, byte_range)
}

/// A one-page PDF without any signature field.
pub fn plain_pdf() -> Vec<u8> {
    b"%PDF-1.7\n\
      1 0 obj\n<< /Type /Catalog /Pages 2 0 R >>\nendobj\n\
      2 0 obj\n<< /Type /Pages /Kids [3 0 R] /Count 1 >>\nendobj\n\
      3 0 obj\n<< /Type /Page /Parent 2 0 R >>\nendobj\n\
      trailer\n<< /Root 1 0 R >>\n%%EOF\n"
        .to_vec()
}
