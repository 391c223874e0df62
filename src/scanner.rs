//! Read-only document backend that scans raw PDF bytes.
//!
//! The scanner walks the file for `N G obj ... endobj` blocks, keeps the last
//! definition of every object (so incremental updates win), and picks out
//! signature fields, their signature dictionaries, and page objects with a few
//! byte-level patterns. Objects stored inside object streams are not visible to
//! it.
//!
//! It performs no cryptography: validation reports what the signature dictionary
//! states and marks the signature as not verified, and signing always fails.

use crate::config::{DocumentPasswords, ValidationOptions};
use crate::document::{DocumentOpener, SignatureDocument, SignatureField};
use crate::error::{Error, Result};
use crate::signatures::{
    CertificateStatus, CheckedSignature, HashAlgorithm, NewSignatureRequest, SignatureStatus,
    SignatureType, SignedRanges, SigningRequest, ValidationResult, ValidationTime,
};
use chrono::{FixedOffset, NaiveDate, TimeZone};
use lazy_static::lazy_static;
use regex::bytes::Regex;
use std::collections::{HashMap, HashSet};
use std::fs;
use std::ops::Range;
use std::path::{Path, PathBuf};

lazy_static! {
    static ref RE_OBJ_HEADER: Regex = Regex::new(r"(?-u)(\d+)\s+(\d+)\s+obj\b").unwrap();
    static ref RE_ENDOBJ: Regex = Regex::new(r"(?-u)\bendobj\b").unwrap();
    static ref RE_SIG_FIELD: Regex = Regex::new(r"(?-u)/FT\s*/Sig\b").unwrap();
    static ref RE_PAGE: Regex = Regex::new(r"(?-u)/Type\s*/Page\b").unwrap();
    static ref RE_WIDGET: Regex = Regex::new(r"(?-u)/Subtype\s*/Widget\b").unwrap();
    static ref RE_KIDS: Regex = Regex::new(r"(?-u)/Kids\s*\[([^\]]*)\]").unwrap();
    static ref RE_REF: Regex = Regex::new(r"(?-u)(\d+)\s+(\d+)\s+R\b").unwrap();
    static ref RE_VALUE_REF: Regex = Regex::new(r"(?-u)/V\s*(\d+)\s+(\d+)\s+R\b").unwrap();
    static ref RE_BYTE_RANGE: Regex = Regex::new(r"(?-u)/ByteRange\s*\[([^\]]*)\]").unwrap();
    static ref RE_CONTENTS: Regex = Regex::new(r"(?-u)/Contents\s*<([0-9A-Fa-f\s]*)>").unwrap();
    static ref RE_SUB_FILTER: Regex = Regex::new(r"(?-u)/SubFilter\s*/([^\s/<>\[\]()]+)").unwrap();
    static ref RE_NAME: Regex = Regex::new(r"(?-u)/Name\s*\(((?:[^()\\]|\\.)*)\)").unwrap();
    static ref RE_SIGNING_TIME: Regex = Regex::new(r"(?-u)/M\s*\(([^)]*)\)").unwrap();
    static ref RE_CATALOG: Regex = Regex::new(r"(?-u)/Type\s*/Catalog\b").unwrap();
    static ref RE_ACROFORM_REF: Regex = Regex::new(r"(?-u)/AcroForm\s*(\d+)\s+(\d+)\s+R\b").unwrap();
    static ref RE_FIELDS: Regex = Regex::new(r"(?-u)/Fields\s*\[([^\]]*)\]").unwrap();
}

/// How deep the form field tree is followed through `/Kids`.
const MAX_FIELD_DEPTH: usize = 32;

/// How far into the file the `%PDF-` header may start.
const HEADER_SEARCH_LIMIT: usize = 1024;

type ObjectId = (u32, u16);

/// Opens documents with the byte scanner.
#[derive(Debug, Default, Clone, Copy)]
pub struct ScanOpener;

impl DocumentOpener for ScanOpener {
    type Document = ScannedDocument;

    fn open(&self, path: &Path, passwords: &DocumentPasswords) -> Result<ScannedDocument> {
        let data = fs::read(path).map_err(|e| Error::DocumentOpen {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        if passwords.owner.is_some() || passwords.user.is_some() {
            log::debug!("Document passwords are not needed to read signature dictionaries");
        }
        ScannedDocument::from_bytes(path, &data)
    }
}

/// A document whose signature fields were found by scanning its bytes.
#[derive(Debug, Clone)]
pub struct ScannedDocument {
    path: PathBuf,
    page_count: usize,
    fields: Vec<ScannedField>,
}

impl ScannedDocument {
    /// Scan `data`, the full contents of the file at `path`.
    pub fn from_bytes(path: &Path, data: &[u8]) -> Result<Self> {
        let header_window = &data[..data.len().min(HEADER_SEARCH_LIMIT)];
        if !header_window.windows(5).any(|w| w == b"%PDF-") {
            return Err(Error::DocumentOpen {
                path: path.to_path_buf(),
                reason: "not a PDF file".to_string(),
            });
        }

        let objects = index_objects(data);
        log::debug!("Found {} objects in {}", objects.len(), path.display());

        let page_count = objects
            .values()
            .filter(|body| RE_PAGE.is_match(&data[(*body).clone()]))
            .count();

        let field_ids = match form_field_roots(data, &objects) {
            Some(roots) => {
                let mut ids = Vec::new();
                let mut visited = HashSet::new();
                collect_signature_fields(data, &objects, &roots, 0, &mut visited, &mut ids);
                ids
            },
            None => {
                log::debug!("No /AcroForm /Fields in {}, using object order", path.display());
                let mut ids: Vec<ObjectId> = objects
                    .iter()
                    .filter(|(_, body)| RE_SIG_FIELD.is_match(&data[(*body).clone()]))
                    .map(|(id, _)| *id)
                    .collect();
                ids.sort_unstable();
                ids
            },
        };

        let fields = field_ids
            .into_iter()
            .map(|id| ScannedField::scan(data, &objects, id))
            .collect::<Vec<_>>();
        log::info!(
            "{}: {} pages, {} signature fields",
            path.display(),
            page_count,
            fields.len()
        );

        Ok(Self {
            path: path.to_path_buf(),
            page_count,
            fields,
        })
    }

    /// Number of page objects found.
    pub fn page_count(&self) -> usize {
        self.page_count
    }
}

impl SignatureDocument for ScannedDocument {
    type Field = ScannedField;

    fn path(&self) -> &Path {
        &self.path
    }

    fn signature_fields(&self) -> &[ScannedField] {
        &self.fields
    }

    fn has_page(&self, number: usize) -> bool {
        number >= 1 && number <= self.page_count
    }

    fn sign_field(&mut self, index: usize, request: &SigningRequest) -> bool {
        log::error!(
            "Cannot sign field #{} into {}: no signing backend is available",
            index + 1,
            request.output.display()
        );
        false
    }

    fn sign_new_field(&mut self, request: &NewSignatureRequest) -> bool {
        log::error!(
            "Cannot add signature field '{}' into {}: no signing backend is available",
            request.field_name,
            request.signing.output.display()
        );
        false
    }
}

/// A signature field found by the scanner.
#[derive(Debug, Clone, Default)]
pub struct ScannedField {
    signature_type: SignatureType,
    widget_count: usize,
    signature: Option<Vec<u8>>,
    bounds: Vec<i64>,
    checked: Option<CheckedSignature>,
    signer_name: Option<String>,
    signing_time: Option<i64>,
}

impl ScannedField {
    fn scan(data: &[u8], objects: &HashMap<ObjectId, Range<usize>>, id: ObjectId) -> Self {
        let field = &data[objects[&id].clone()];

        let widget_count = if RE_WIDGET.is_match(field) {
            1
        } else {
            RE_KIDS
                .captures(field)
                .map(|kids| RE_REF.find_iter(&kids[1]).count())
                .unwrap_or(0)
        };

        // The signature dictionary is either referenced from /V or inlined in the field.
        let sig_dict = match RE_VALUE_REF.captures(field).and_then(|c| object_id(&c[1], &c[2])) {
            Some(value_id) => objects.get(&value_id).map(|body| &data[body.clone()]),
            None if RE_BYTE_RANGE.is_match(field) => Some(field),
            None => None,
        };
        let Some(sig_dict) = sig_dict else {
            log::debug!("Signature field {} {} R is unsigned", id.0, id.1);
            return Self {
                widget_count,
                ..Self::default()
            };
        };

        let byte_range = RE_BYTE_RANGE
            .captures(sig_dict)
            .map(|c| parse_integers(&c[1]))
            .unwrap_or_default();
        let bounds = range_bounds(&byte_range).unwrap_or_else(|| {
            log::warn!("Signature field {} {} R has an overflowing /ByteRange", id.0, id.1);
            Vec::new()
        });

        Self {
            signature_type: RE_SUB_FILTER
                .captures(sig_dict)
                .map(|c| SignatureType::from_pdf_name(&String::from_utf8_lossy(&c[1])))
                .unwrap_or_default(),
            widget_count,
            signature: RE_CONTENTS
                .captures(sig_dict)
                .and_then(|c| decode_signature_hex(&c[1])),
            bounds,
            checked: SignedRanges::from_byte_range(&byte_range)
                .and_then(|ranges| checked_signature(data, &ranges)),
            signer_name: RE_NAME
                .captures(sig_dict)
                .map(|c| decode_pdf_string(&c[1])),
            signing_time: RE_SIGNING_TIME
                .captures(sig_dict)
                .and_then(|c| parse_pdf_date(&String::from_utf8_lossy(&c[1]))),
        }
    }
}

impl SignatureField for ScannedField {
    fn signature_type(&self) -> SignatureType {
        self.signature_type
    }

    fn widget_count(&self) -> usize {
        self.widget_count
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
        log::debug!(
            "No cryptographic backend: skipping validation ({:?}, {:?})",
            options,
            at
        );
        let signature_status = if self.signature.is_some() {
            SignatureStatus::NotVerified
        } else {
            SignatureStatus::DecodingError
        };
        ValidationResult {
            signer_name: self.signer_name.clone(),
            subject_dn: None,
            signing_time: self.signing_time,
            hash_algorithm: HashAlgorithm::Unknown,
            signature_status,
            certificate_status: CertificateStatus::NotVerified,
        }
    }
}

/// Map every object id to the byte span of its body, last definition wins.
fn index_objects(data: &[u8]) -> HashMap<ObjectId, Range<usize>> {
    let mut objects = HashMap::new();
    let mut pos = 0;
    while let Some(header) = RE_OBJ_HEADER.captures_at(data, pos) {
        let whole = header.get(0).map(|m| m.range()).unwrap_or(pos..pos + 1);
        let Some(end) = RE_ENDOBJ.find_at(data, whole.end) else {
            log::warn!("Object at offset {} has no endobj", whole.start);
            break;
        };
        match object_id(&header[1], &header[2]) {
            Some(id) => {
                objects.insert(id, whole.end..end.start());
            },
            None => log::warn!("Failed to parse object header at offset {}", whole.start),
        }
        pos = end.end();
    }
    objects
}

/// The `/Fields` array of the catalog's interactive form, in array order.
fn form_field_roots(data: &[u8], objects: &HashMap<ObjectId, Range<usize>>) -> Option<Vec<ObjectId>> {
    // With several catalogs around, the highest object number is the newest.
    let (_, catalog) = objects
        .iter()
        .filter(|(_, body)| RE_CATALOG.is_match(&data[(*body).clone()]))
        .max_by_key(|(id, _)| **id)?;
    let catalog = &data[catalog.clone()];

    let form = match RE_ACROFORM_REF.captures(catalog).and_then(|c| object_id(&c[1], &c[2])) {
        Some(form_id) => &data[objects.get(&form_id)?.clone()],
        None => catalog,
    };
    let fields = RE_FIELDS.captures(form)?;
    Some(references(&fields[1]))
}

/// Walk the form field tree in order, collecting signature fields.
///
/// A signature field's `/Kids` are its widgets; any other field's `/Kids` are
/// child fields.
fn collect_signature_fields(
    data: &[u8],
    objects: &HashMap<ObjectId, Range<usize>>,
    ids: &[ObjectId],
    depth: usize,
    visited: &mut HashSet<ObjectId>,
    out: &mut Vec<ObjectId>,
) {
    if depth > MAX_FIELD_DEPTH {
        log::warn!("Form field tree deeper than {}, ignoring the rest", MAX_FIELD_DEPTH);
        return;
    }
    for &id in ids {
        if !visited.insert(id) {
            continue;
        }
        let Some(body) = objects.get(&id) else {
            log::debug!("Form field {} {} R is not defined", id.0, id.1);
            continue;
        };
        let body = &data[body.clone()];
        if RE_SIG_FIELD.is_match(body) {
            out.push(id);
        } else if let Some(kids) = RE_KIDS.captures(body) {
            let kids = references(&kids[1]);
            collect_signature_fields(data, objects, &kids, depth + 1, visited, out);
        }
    }
}

fn references(text: &[u8]) -> Vec<ObjectId> {
    RE_REF
        .captures_iter(text)
        .filter_map(|c| object_id(&c[1], &c[2]))
        .collect()
}

fn object_id(number: &[u8], generation: &[u8]) -> Option<ObjectId> {
    let number = std::str::from_utf8(number).ok()?.parse().ok()?;
    let generation = std::str::from_utf8(generation).ok()?.parse().ok()?;
    Some((number, generation))
}

fn parse_integers(text: &[u8]) -> Vec<i64> {
    String::from_utf8_lossy(text)
        .split_ascii_whitespace()
        .filter_map(|token| token.parse().ok())
        .collect()
}

/// Turn `/ByteRange` offset/length pairs into range bounds, `None` on overflow.
fn range_bounds(byte_range: &[i64]) -> Option<Vec<i64>> {
    byte_range
        .chunks_exact(2)
        .flat_map(|pair| [Some(pair[0]), pair[0].checked_add(pair[1])])
        .collect()
}

/// Re-extract the signature from the gap between the signed ranges.
fn checked_signature(data: &[u8], ranges: &SignedRanges) -> Option<CheckedSignature> {
    let gap = ranges.signature_gap()?;
    let value = data.get(gap)?;
    let hex = value.strip_prefix(b"<")?.strip_suffix(b">")?;
    let bytes = decode_signature_hex(hex)?;
    Some(CheckedSignature {
        bytes,
        checked_file_size: i64::try_from(data.len()).ok()?,
    })
}

/// Decode a `/Contents` hex string and cut the zero padding after the DER value.
///
/// Returns `None` for an empty or all-zero placeholder.
fn decode_signature_hex(hex_digits: &[u8]) -> Option<Vec<u8>> {
    let mut digits: Vec<u8> = hex_digits
        .iter()
        .copied()
        .filter(|b| !b.is_ascii_whitespace())
        .collect();
    if digits.len() % 2 == 1 {
        digits.push(b'0');
    }
    let mut bytes = hex::decode(&digits).ok()?;
    if bytes.iter().all(|&b| b == 0) {
        return None;
    }
    if let Some(len) = der_length(&bytes) {
        if len <= bytes.len() {
            bytes.truncate(len);
        }
    }
    Some(bytes)
}

/// Total length of the DER SEQUENCE at the start of `bytes`.
fn der_length(bytes: &[u8]) -> Option<usize> {
    if bytes.first() != Some(&0x30) {
        return None;
    }
    let first = *bytes.get(1)? as usize;
    if first < 0x80 {
        return Some(2 + first);
    }
    let count = first & 0x7F;
    if count == 0 || count > 4 {
        return None;
    }
    let len = bytes
        .get(2..2 + count)?
        .iter()
        .fold(0usize, |acc, &b| (acc << 8) | b as usize);
    Some(2 + count + len)
}

/// Decode the contents of a PDF literal string.
fn decode_pdf_string(raw: &[u8]) -> String {
    let mut bytes = Vec::with_capacity(raw.len());
    let mut iter = raw.iter().copied().peekable();
    while let Some(b) = iter.next() {
        if b != b'\\' {
            bytes.push(b);
            continue;
        }
        match iter.next() {
            Some(b'n') => bytes.push(b'\n'),
            Some(b'r') => bytes.push(b'\r'),
            Some(b't') => bytes.push(b'\t'),
            Some(b'b') => bytes.push(0x08),
            Some(b'f') => bytes.push(0x0C),
            Some(d @ b'0'..=b'7') => {
                let mut value = u32::from(d - b'0');
                for _ in 0..2 {
                    match iter.peek() {
                        Some(&o) if (b'0'..=b'7').contains(&o) => {
                            value = value * 8 + u32::from(o - b'0');
                            iter.next();
                        },
                        _ => break,
                    }
                }
                bytes.push((value & 0xFF) as u8);
            },
            // Line continuation
            Some(b'\n') => {},
            Some(b'\r') => {
                if iter.peek() == Some(&b'\n') {
                    iter.next();
                }
            },
            Some(other) => bytes.push(other),
            None => {},
        }
    }

    if let Some(utf16) = bytes.strip_prefix(&[0xFE, 0xFF]) {
        let units: Vec<u16> = utf16
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect();
        String::from_utf16_lossy(&units)
    } else {
        match String::from_utf8(bytes) {
            Ok(text) => text,
            // PDFDocEncoding agrees with Latin-1 for printable characters
            Err(e) => e.into_bytes().iter().map(|&b| char::from(b)).collect(),
        }
    }
}

/// Parse a PDF date (`D:YYYYMMDDHHmmSSOHH'mm'`) into a Unix timestamp.
fn parse_pdf_date(text: &str) -> Option<i64> {
    let text = text.trim();
    let text = text.strip_prefix("D:").unwrap_or(text);
    let digit_count = text.bytes().take_while(u8::is_ascii_digit).count();
    if digit_count < 4 {
        return None;
    }
    let (digits, zone) = text.split_at(digit_count);
    let field = |range: Range<usize>, default: u32| -> Option<u32> {
        match digits.get(range) {
            Some(s) => s.parse().ok(),
            None => Some(default),
        }
    };

    let year: i32 = digits[..4].parse().ok()?;
    let month = field(4..6, 1)?;
    let day = field(6..8, 1)?;
    let hour = field(8..10, 0)?;
    let minute = field(10..12, 0)?;
    let second = field(12..14, 0)?;
    let naive = NaiveDate::from_ymd_opt(year, month, day)?.and_hms_opt(hour, minute, second)?;

    let offset = match zone.as_bytes().first() {
        Some(&sign @ (b'+' | b'-')) => {
            let parts: Vec<i32> = zone[1..]
                .split(|c: char| !c.is_ascii_digit())
                .filter(|s| !s.is_empty())
                .filter_map(|s| s.parse().ok())
                .collect();
            let hours = parts.first().copied().unwrap_or(0);
            let minutes = parts.get(1).copied().unwrap_or(0);
            let seconds = hours.checked_mul(3600)?.checked_add(minutes.checked_mul(60)?)?;
            if sign == b'-' {
                -seconds
            } else {
                seconds
            }
        },
        _ => 0,
    };

    let time = FixedOffset::east_opt(offset)?.from_local_datetime(&naive).single()?;
    Some(time.timestamp())
}
