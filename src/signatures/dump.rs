//! Dump raw signature values to files.

use crate::document::SignatureField;
use crate::error::{Error, Result};
use std::ffi::OsStr;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Writes each signature value to `<basename>.sig<i>` in an output directory.
#[derive(Debug, Clone)]
pub struct SignatureDumper {
    output_dir: PathBuf,
}

impl SignatureDumper {
    /// Create a dumper writing into `output_dir`.
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    /// Dump all `fields` of the document at `document_path`.
    ///
    /// Stops at the first field without a signature value. Returns the written
    /// paths on success.
    pub fn dump<F: SignatureField, W: Write>(
        &self,
        document_path: &Path,
        fields: &[F],
        out: &mut W,
    ) -> Result<Vec<PathBuf>> {
        if fields.is_empty() {
            return Err(Error::NoSignatures(document_path.to_path_buf()));
        }

        writeln!(out, "Dumping Signatures: {}", fields.len())?;
        let base = base_name(document_path);
        let mut written = Vec::with_capacity(fields.len());
        for (index, field) in fields.iter().enumerate() {
            let Some(signature) = field.signature() else {
                log::warn!("Signature field #{} has no signature value", index);
                return Err(Error::DumpFailed(index));
            };
            let file_name = dump_file_name(&base, index, fields.len());
            writeln!(out, "Signature #{} ({} bytes) => {}", index, signature.len(), file_name)?;
            let path = self.output_dir.join(&file_name);
            fs::write(&path, &signature)?;
            written.push(path);
        }
        Ok(written)
    }
}

/// File name for signature `index` out of `count`: `<base>.sig<index>`, with the
/// index zero-padded to the number of decimal digits of `count`.
pub fn dump_file_name(base: &str, index: usize, count: usize) -> String {
    let width = count.to_string().len();
    format!("{}.sig{:0width$}", base, index, width = width)
}

fn base_name(path: &Path) -> String {
    path.file_name()
        .map(OsStr::to_string_lossy)
        .map(|name| name.into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}
