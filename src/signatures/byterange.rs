//! Signed byte-range analysis.
//!
//! A PDF signature covers the document bytes named by its `/ByteRange` array,
//! `[offset1, length1, offset2, length2]`. The signature value itself sits in the
//! gap between the two ranges as a hex string inside `<` and `>`.
//!
//! The workflow works with range *bounds*: two half-open ranges
//! `[b0, b1)` and `[b2, b3)`. A document is fully signed when a signature could be
//! re-extracted from the file and the second range ends exactly at the file size
//! measured during that extraction.

use super::types::CheckedSignature;
use std::ops::Range;

/// Whether a signature covers the whole document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeCoverage {
    /// The bounds do not describe exactly two ranges
    NotApplicable,
    /// The signature covers the whole document
    WholeDocument,
    /// Bytes were appended after signing, or the signature could not be re-extracted
    Partial,
}

impl RangeCoverage {
    /// Line used in the validation report, `None` when not applicable.
    pub fn readable(&self) -> Option<&'static str> {
        match self {
            RangeCoverage::NotApplicable => None,
            RangeCoverage::WholeDocument => Some("Total document signed"),
            RangeCoverage::Partial => Some("Not total document signed"),
        }
    }
}

/// Two half-open signed ranges.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignedRanges {
    bounds: [i64; 4],
}

impl SignedRanges {
    /// Build from range bounds; `None` unless there are exactly four.
    pub fn from_bounds(bounds: &[i64]) -> Option<Self> {
        let bounds: [i64; 4] = bounds.try_into().ok()?;
        Some(Self { bounds })
    }

    /// Build from a PDF `/ByteRange` array (`[offset1, length1, offset2, length2]`).
    ///
    /// `None` unless there are exactly four values and both range ends fit in `i64`.
    pub fn from_byte_range(byte_range: &[i64]) -> Option<Self> {
        let [offset1, length1, offset2, length2]: [i64; 4] = byte_range.try_into().ok()?;
        Some(Self {
            bounds: [
                offset1,
                offset1.checked_add(length1)?,
                offset2,
                offset2.checked_add(length2)?,
            ],
        })
    }

    /// The four bounds `[b0, b1, b2, b3]`.
    pub fn bounds(&self) -> [i64; 4] {
        self.bounds
    }

    /// End of the second range.
    pub fn end(&self) -> i64 {
        self.bounds[3]
    }

    /// Byte span between the two ranges, where the signature value lives.
    ///
    /// Returns `None` for negative or inverted bounds.
    pub fn signature_gap(&self) -> Option<Range<usize>> {
        let start = usize::try_from(self.bounds[1]).ok()?;
        let end = usize::try_from(self.bounds[2]).ok()?;
        (start < end).then_some(start..end)
    }

    /// Format for the validation report: `[b0 - b1], [b2 - b3]`.
    pub fn format(&self) -> String {
        let [b0, b1, b2, b3] = self.bounds;
        format!("[{} - {}], [{} - {}]", b0, b1, b2, b3)
    }
}

/// Decides whether a signature covers the whole document.
#[derive(Debug, Default, Clone, Copy)]
pub struct SignedRangeAnalyzer;

impl SignedRangeAnalyzer {
    /// Classify the coverage of `bounds` given the re-extracted signature, if any.
    pub fn coverage(bounds: &[i64], checked: Option<&CheckedSignature>) -> RangeCoverage {
        let Some(ranges) = SignedRanges::from_bounds(bounds) else {
            return RangeCoverage::NotApplicable;
        };
        match checked {
            Some(sig) if sig.checked_file_size == ranges.end() => RangeCoverage::WholeDocument,
            _ => RangeCoverage::Partial,
        }
    }
}
