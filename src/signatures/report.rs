//! Human-readable validation report.

use super::byterange::{SignedRangeAnalyzer, SignedRanges};
use super::types::ValidationTime;
use crate::config::ValidationOptions;
use crate::document::SignatureField;
use crate::error::{Error, Result};
use chrono::{Local, TimeZone};
use std::io::Write;
use std::path::Path;

/// Format used for signing times.
pub const SIGNING_TIME_FORMAT: &str = "%b %d %Y %H:%M:%S";

/// Validates every signature field and writes a report.
#[derive(Debug, Clone, Copy)]
pub struct ValidationReporter<'a> {
    options: &'a ValidationOptions,
    time: ValidationTime,
}

impl<'a> ValidationReporter<'a> {
    /// Create a reporter with the validation options to pass through.
    pub fn new(options: &'a ValidationOptions) -> Self {
        Self {
            options,
            time: ValidationTime::Now,
        }
    }

    /// Validate against `time` instead of the current time.
    pub fn at(mut self, time: ValidationTime) -> Self {
        self.time = time;
        self
    }

    /// Write the report for `fields` of the document at `path`.
    ///
    /// Fails with [`Error::NoSignatures`] before writing anything when there are
    /// no fields.
    pub fn report<F: SignatureField, W: Write>(
        &self,
        path: &Path,
        fields: &[F],
        out: &mut W,
    ) -> Result<()> {
        if fields.is_empty() {
            return Err(Error::NoSignatures(path.to_path_buf()));
        }

        writeln!(out, "Digital Signature Info of: {}", path.display())?;
        for (i, field) in fields.iter().enumerate() {
            self.report_field(i + 1, field, out)?;
        }
        Ok(())
    }

    fn report_field<F: SignatureField, W: Write>(
        &self,
        number: usize,
        field: &F,
        out: &mut W,
    ) -> Result<()> {
        let result = field.validate(self.options, self.time);
        log::debug!("Signature #{} validated: {:?}", number, result.signature_status);

        writeln!(out, "Signature #{}:", number)?;
        writeln!(
            out,
            "  - Signer Certificate Common Name: {}",
            result.signer_name.as_deref().unwrap_or_default()
        )?;
        writeln!(
            out,
            "  - Signer full Distinguished Name: {}",
            result.subject_dn.as_deref().unwrap_or_default()
        )?;
        let signing_time = result
            .signing_time
            .map(|t| readable_time(t, &Local))
            .unwrap_or_else(|| "unknown".to_string());
        writeln!(out, "  - Signing Time: {}", signing_time)?;
        writeln!(out, "  - Signing Hash Algorithm: {}", result.hash_algorithm.label())?;
        writeln!(out, "  - Signature Type: {}", field.signature_type().label())?;

        let bounds = field.signed_range_bounds();
        if let Some(ranges) = SignedRanges::from_bounds(&bounds) {
            writeln!(out, "  - Signed Ranges: {}", ranges.format())?;
            let checked = field.checked_signature();
            if let Some(verdict) = SignedRangeAnalyzer::coverage(&bounds, checked.as_ref()).readable() {
                writeln!(out, "  - {}", verdict)?;
            }
        }

        writeln!(out, "  - Signature Validation: {}", result.signature_status.readable())?;
        if !result.signature_status.is_valid() || !self.options.verify_certificate {
            return Ok(());
        }
        writeln!(out, "  - Certificate Validation: {}", result.certificate_status.readable())?;
        Ok(())
    }
}

/// Format a Unix timestamp in `tz` for the report.
pub fn readable_time<Tz: TimeZone>(unix_time: i64, tz: &Tz) -> String
where
    Tz::Offset: std::fmt::Display,
{
    match tz.timestamp_opt(unix_time, 0).earliest() {
        Some(time) => time.format(SIGNING_TIME_FORMAT).to_string(),
        None => "unknown".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_readable_time_utc() {
        assert_eq!(readable_time(0, &Utc), "Jan 01 1970 00:00:00");
        assert_eq!(readable_time(1_700_000_000, &Utc), "Nov 14 2023 22:13:20");
    }

    #[test]
    fn test_readable_time_out_of_range() {
        assert_eq!(readable_time(i64::MAX, &Utc), "unknown");
    }
}
