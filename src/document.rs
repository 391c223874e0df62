//! Document backend interfaces.
//!
//! The workflow never parses documents or touches signature cryptography itself.
//! A backend opens the document, exposes its signature fields, validates them, and
//! performs the actual signing. The `pdfsig` binary uses
//! [`ScannedDocument`](crate::scanner::ScannedDocument); tests use in-memory fakes.

use crate::config::{DocumentPasswords, ValidationOptions};
use crate::error::Result;
use crate::signatures::{
    CheckedSignature, NewSignatureRequest, SignatureType, SigningRequest, ValidationResult,
    ValidationTime,
};
use std::path::Path;

/// A signature field of an opened document.
pub trait SignatureField {
    /// Signature type declared by the field.
    fn signature_type(&self) -> SignatureType;

    /// Number of interactive widgets attached to the field.
    fn widget_count(&self) -> usize;

    /// Raw signature value stored in the field, if any.
    fn signature(&self) -> Option<Vec<u8>>;

    /// Signature re-extracted from the file bytes named by the signed ranges,
    /// together with the file size measured while doing so.
    fn checked_signature(&self) -> Option<CheckedSignature>;

    /// Signed range bounds `[b0, b1, b2, b3]`; empty when the field is unsigned.
    fn signed_range_bounds(&self) -> Vec<i64>;

    /// Validate the signature.
    fn validate(&self, options: &ValidationOptions, at: ValidationTime) -> ValidationResult;
}

/// An opened document.
pub trait SignatureDocument {
    /// Field type exposed by the backend.
    type Field: SignatureField;

    /// Path the document was opened from.
    fn path(&self) -> &Path;

    /// Signature fields in document order.
    fn signature_fields(&self) -> &[Self::Field];

    /// Whether the 1-based page `number` exists.
    fn has_page(&self, number: usize) -> bool;

    /// Sign the existing field at 0-based `index` through its only widget.
    ///
    /// Returns `false` when the backend failed to produce the signed document.
    fn sign_field(&mut self, index: usize, request: &SigningRequest) -> bool;

    /// Add a new signature field and sign it.
    fn sign_new_field(&mut self, request: &NewSignatureRequest) -> bool;
}

/// Opens documents by path.
pub trait DocumentOpener {
    /// Document type produced by this opener.
    type Document: SignatureDocument;

    /// Open `path`, using `passwords` for encrypted documents.
    fn open(&self, path: &Path, passwords: &DocumentPasswords) -> Result<Self::Document>;
}
