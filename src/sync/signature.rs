//! Signature-delimited framing
//!
//! Locates a frame via fixed marker byte sequences: the earliest of a set of
//! known header signatures, then the footer scanned forward from there. The
//! frame is the inclusive range between the two markers. Used when the
//! discovery tooling has established reliable markers for a firmware
//! revision; the content scan remains the fallback when it has not.

use super::{FrameSpan, FrameSync};
use crate::error::{Error, Result};

/// Header/footer marker synchronizer
pub struct SignatureSync {
    headers: Vec<Vec<u8>>,
    footer: Vec<u8>,
}

impl SignatureSync {
    /// Create a synchronizer from known marker byte sequences
    pub fn new(headers: Vec<Vec<u8>>, footer: Vec<u8>) -> Result<Self> {
        if headers.is_empty() || headers.iter().any(|h| h.is_empty()) {
            return Err(Error::InvalidConfig(
                "signature framing needs at least one non-empty header".to_string(),
            ));
        }
        if footer.is_empty() {
            return Err(Error::InvalidConfig(
                "signature framing needs a non-empty footer".to_string(),
            ));
        }
        Ok(Self { headers, footer })
    }
}

impl FrameSync for SignatureSync {
    fn find_frame(&self, buf: &[u8]) -> Option<FrameSpan> {
        // Earliest header of any known variant
        let start = self
            .headers
            .iter()
            .filter_map(|h| find_subsequence(buf, h))
            .min()?;

        // Footer scanned forward from the header position
        let footer_pos = find_subsequence(&buf[start..], &self.footer)? + start;
        let end = footer_pos + self.footer.len();

        Some(FrameSpan {
            start,
            len: end - start,
        })
    }
}

/// First occurrence of `needle` in `haystack`
fn find_subsequence(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() || haystack.len() < needle.len() {
        return None;
    }
    haystack.windows(needle.len()).position(|w| w == needle)
}

#[cfg(test)]
mod tests {
    use super::*;

    const HDR_A: &[u8] = &[0x28, 0x36, 0x00, 0x00, 0x00, 0x80];
    const HDR_B: &[u8] = &[0x27, 0x36, 0x00, 0x00, 0x00, 0x80];
    const FOOTER: &[u8] = &[0xDB, 0x34, 0xB6, 0xD7];

    fn sync() -> SignatureSync {
        SignatureSync::new(vec![HDR_A.to_vec(), HDR_B.to_vec()], FOOTER.to_vec()).unwrap()
    }

    #[test]
    fn test_frame_between_markers() {
        let mut buf = vec![0x11, 0x22];
        buf.extend_from_slice(HDR_A);
        buf.extend_from_slice(&[1, 2, 3, 4]);
        buf.extend_from_slice(FOOTER);
        buf.extend_from_slice(&[0x99]);

        let span = sync().find_frame(&buf).unwrap();
        assert_eq!(span.start, 2);
        // Inclusive of both markers
        assert_eq!(span.len, HDR_A.len() + 4 + FOOTER.len());
        assert_eq!(span.end(), buf.len() - 1);
    }

    #[test]
    fn test_earliest_header_variant_wins() {
        let mut buf = Vec::new();
        buf.extend_from_slice(HDR_B);
        buf.extend_from_slice(&[0xAA; 8]);
        buf.extend_from_slice(HDR_A);
        buf.extend_from_slice(FOOTER);

        let span = sync().find_frame(&buf).unwrap();
        assert_eq!(span.start, 0);
    }

    #[test]
    fn test_missing_footer_waits() {
        let mut buf = HDR_A.to_vec();
        buf.extend_from_slice(&[1, 2, 3]);
        assert!(sync().find_frame(&buf).is_none());
    }

    #[test]
    fn test_missing_header_waits() {
        let mut buf = vec![0u8; 32];
        buf.extend_from_slice(FOOTER);
        assert!(sync().find_frame(&buf).is_none());
    }

    #[test]
    fn test_empty_markers_rejected() {
        assert!(SignatureSync::new(vec![], FOOTER.to_vec()).is_err());
        assert!(SignatureSync::new(vec![HDR_A.to_vec()], vec![]).is_err());
    }
}
