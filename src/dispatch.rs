//! Mode dispatch.
//!
//! [`SigningDispatcher`] runs one [`OperationRequest`]: it opens the document when
//! the mode needs one, checks the mode's preconditions in a fixed order, talks to
//! the credential store, and hands off to the reporter, the dumper, or the
//! document backend's signing calls.

use crate::config::{SigConfig, DEFAULT_DIGEST};
use crate::document::{DocumentOpener, SignatureDocument, SignatureField};
use crate::error::{Error, Result};
use crate::request::{Mode, OperationRequest};
use crate::signatures::{
    CredentialAccessor, CredentialStore, FieldNameGenerator, NewSignatureRequest,
    SignatureAppearance, SignatureDumper, SignatureType, SigningRequest, ValidationReporter,
};
use std::fs;
use std::io::Write;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

/// Page a new signature widget is placed on.
const NEW_SIGNATURE_PAGE: usize = 1;

/// Runs operation requests against a document opener and a credential store.
pub struct SigningDispatcher<'a, O: DocumentOpener, S: CredentialStore> {
    opener: &'a O,
    store: &'a mut S,
    dump_dir: PathBuf,
}

impl<'a, O: DocumentOpener, S: CredentialStore> SigningDispatcher<'a, O, S> {
    /// Create a dispatcher. Dumps go to the current directory.
    pub fn new(opener: &'a O, store: &'a mut S) -> Self {
        Self {
            opener,
            store,
            dump_dir: PathBuf::from("."),
        }
    }

    /// Write dumped signatures into `dir` instead of the current directory.
    pub fn with_dump_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.dump_dir = dir.into();
        self
    }

    /// Run `request`, writing user-facing output to `out`.
    pub fn run<W: Write>(&mut self, request: &OperationRequest, out: &mut W) -> Result<()> {
        let config = &request.config;
        match &request.mode {
            Mode::ListIdentities => self.list_identities(config, out),
            Mode::Report { document } => {
                let doc = self.open(document, config)?;
                ValidationReporter::new(&config.validation).report(
                    doc.path(),
                    doc.signature_fields(),
                    out,
                )
            },
            Mode::Dump { document } => {
                let doc = self.open(document, config)?;
                let written = SignatureDumper::new(&self.dump_dir).dump(
                    doc.path(),
                    doc.signature_fields(),
                    out,
                )?;
                log::info!("Dumped {} signatures", written.len());
                Ok(())
            },
            Mode::SignExisting {
                document,
                output,
                field_number,
            } => self.sign_existing(document, output, *field_number, config),
            Mode::SignNew { document, output } => self.sign_new(document, output, config),
        }
    }

    fn open(&self, document: &Path, config: &SigConfig) -> Result<O::Document> {
        log::debug!("Opening {}", document.display());
        self.opener.open(document, &config.document)
    }

    fn list_identities<W: Write>(&mut self, config: &SigConfig, out: &mut W) -> Result<()> {
        let identities = CredentialAccessor::new(self.store, &config.store).list_signing_identities()?;
        if identities.is_empty() {
            writeln!(out, "There are no certificates available.")?;
            return Ok(());
        }
        writeln!(out, "Certificate nicknames available:")?;
        for identity in &identities {
            writeln!(out, "{}", identity.nickname)?;
        }
        Ok(())
    }

    fn sign_existing(
        &mut self,
        document: &Path,
        output: &Path,
        field_number: NonZeroUsize,
        config: &SigConfig,
    ) -> Result<()> {
        let mut doc = self.open(document, config)?;
        let number = field_number.get();
        if number > doc.signature_fields().len() {
            return Err(Error::FieldOutOfRange {
                path: document.to_path_buf(),
                number,
            });
        }
        if config.signing.nickname.is_empty() {
            return Err(Error::MissingNickname);
        }

        // The identities are not needed, but the store must be opened before signing.
        CredentialAccessor::new(self.store, &config.store).list_signing_identities()?;

        let index = number - 1;
        let field = &doc.signature_fields()[index];
        if field.checked_signature().is_some() {
            return Err(Error::FieldAlreadySigned(number));
        }
        let widgets = field.widget_count();
        if widgets != 1 {
            return Err(Error::UnexpectedWidgetCount(widgets));
        }

        let signature_type = config.signing.cades.then_some(SignatureType::CadesDetached);
        let request = signing_request(output, config, signature_type);
        log::info!("Signing field #{} of {} into {}", number, document.display(), output.display());
        if doc.sign_field(index, &request) {
            Ok(())
        } else {
            Err(Error::SigningFailed(output.to_path_buf()))
        }
    }

    fn sign_new(&mut self, document: &Path, output: &Path, config: &SigConfig) -> Result<()> {
        let mut doc = self.open(document, config)?;
        if same_file(document, output) {
            return Err(Error::OutputSameAsInput(document.to_path_buf()));
        }
        let signing = &config.signing;
        if signing.nickname.is_empty() {
            return Err(Error::MissingNickname);
        }
        if signing.cades {
            return Err(Error::CadesNotSupportedForNewField);
        }
        if signing.digest != DEFAULT_DIGEST {
            return Err(Error::UnsupportedDigest(signing.digest.clone()));
        }
        if !doc.has_page(NEW_SIGNATURE_PAGE) {
            return Err(Error::NoFirstPage);
        }

        // The identities are not needed, but the store must be opened before signing.
        CredentialAccessor::new(self.store, &config.store).list_signing_identities()?;

        let field_name = match &signing.new_field_name {
            Some(name) => name.clone(),
            None => FieldNameGenerator::new().generate(),
        };
        let request = NewSignatureRequest {
            signing: signing_request(output, config, None),
            field_name,
            page: NEW_SIGNATURE_PAGE,
            appearance: SignatureAppearance::invisible(),
            location: None,
            owner_password: config.document.owner.clone(),
            user_password: config.document.user.clone(),
        };
        log::info!(
            "Adding signature field '{}' to {} into {}",
            request.field_name,
            document.display(),
            output.display()
        );
        if doc.sign_new_field(&request) {
            Ok(())
        } else {
            Err(Error::SigningFailed(output.to_path_buf()))
        }
    }
}

/// Whether `a` and `b` name the same file. Paths that cannot be resolved
/// (typically a not yet written output) are compared as given.
fn same_file(a: &Path, b: &Path) -> bool {
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}

fn signing_request(
    output: &Path,
    config: &SigConfig,
    signature_type: Option<SignatureType>,
) -> SigningRequest {
    let signing = &config.signing;
    SigningRequest {
        output: output.to_path_buf(),
        nickname: signing.nickname.clone(),
        key_password: signing.key_password().map(str::to_string),
        digest: signing.digest.clone(),
        reason: signing.reason_text(),
        signature_type,
    }
}
