//! Credential store backed by a plain directory.
//!
//! Every certificate or key file in the directory is one signing identity, named
//! after the file stem. The directory is not encrypted, so the store never asks
//! for a password.

use crate::signatures::{CredentialStore, PasswordChallenge, SigningIdentity};
use std::fs;
use std::path::{Path, PathBuf};

/// File extensions recognised as signing identities.
const IDENTITY_EXTENSIONS: &[&str] = &["p12", "pfx", "pem", "crt", "cer", "der"];

/// Lists signing identities from the files of a directory.
#[derive(Debug, Clone)]
pub struct DirectoryStore {
    directory: PathBuf,
}

impl DirectoryStore {
    /// Use `directory`, or the default location when `None`.
    pub fn new(directory: Option<&Path>) -> Self {
        let directory = directory
            .map(Path::to_path_buf)
            .unwrap_or_else(Self::default_directory);
        Self { directory }
    }

    /// `~/.pki/nssdb`, or `.pki/nssdb` relative to the working directory when
    /// there is no home directory.
    pub fn default_directory() -> PathBuf {
        dirs::home_dir().unwrap_or_default().join(".pki").join("nssdb")
    }

    /// Directory the store reads.
    pub fn directory(&self) -> &Path {
        &self.directory
    }
}

impl CredentialStore for DirectoryStore {
    fn signing_identities(&mut self, _challenge: &mut PasswordChallenge<'_>) -> Vec<SigningIdentity> {
        let entries = match fs::read_dir(&self.directory) {
            Ok(entries) => entries,
            Err(e) => {
                log::warn!("Cannot read credential store {}: {}", self.directory.display(), e);
                return Vec::new();
            },
        };

        let mut identities: Vec<SigningIdentity> = entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.is_file() && is_identity_file(path))
            .filter_map(|path| {
                let nickname = path.file_stem()?.to_string_lossy().into_owned();
                let handle = path.to_string_lossy().into_owned().into_bytes();
                Some(SigningIdentity::new(nickname).with_handle(handle))
            })
            .collect();
        identities.sort_by(|a, b| a.nickname.cmp(&b.nickname));
        identities.dedup_by(|a, b| a.nickname == b.nickname);
        identities
    }
}

fn is_identity_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| IDENTITY_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}
