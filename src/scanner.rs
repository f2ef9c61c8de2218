use std::io::{self, Read};

use log::{trace, warn};

use crate::error::Result;
use crate::protocol::{PACKET_HEADER_LEN, PACKET_START};

/// How strictly the scanner vets a candidate frame start.
///
/// Some captures carry frames whose reserved third byte is not 0x00; it is
/// unclear whether those are corruption or an undocumented header variant,
/// so both behaviors are supported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Strictness {
    /// Require the reserved byte after the length to equal 0x00.
    #[default]
    Strict,
    /// Consume the reserved byte without checking it.
    Lenient,
}

/// Locates candidate frames in a raw byte stream and extracts them.
///
/// The stream may contain arbitrary noise between frames: the scanner hunts
/// for the start marker byte-by-byte and vets each candidate before
/// committing to read its body. Rejecting a candidate consumes only the
/// bytes already read for it, so a marker in the remaining stream is still
/// found.
pub struct FrameScanner<R> {
    reader: R,
    strictness: Strictness,
}

impl<R: Read> FrameScanner<R> {
    /// Create a scanner with the default (strict) header vetting.
    pub fn new(reader: R) -> Self {
        Self::with_strictness(reader, Strictness::default())
    }

    pub fn with_strictness(reader: R, strictness: Strictness) -> Self {
        Self { reader, strictness }
    }

    /// Read a single byte, mapping end of stream to `None`.
    fn read_byte(&mut self) -> Result<Option<u8>> {
        let mut buf = [0u8; 1];
        match self.reader.read_exact(&mut buf) {
            Ok(()) => Ok(Some(buf[0])),
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Scan forward to the next plausible frame and return its raw bytes.
    ///
    /// Returns `Ok(None)` once the stream is exhausted. Candidates failing
    /// the header vetting are dropped and scanning resumes at the following
    /// byte. A frame truncated by end of stream is discarded, never
    /// returned short.
    pub fn next_frame(&mut self) -> Result<Option<Vec<u8>>> {
        loop {
            // Hunt for the start marker.
            match self.read_byte()? {
                Some(PACKET_START) => {}
                Some(b) => {
                    trace!("skipping byte {:#04x}", b);
                    continue;
                }
                None => return Ok(None),
            }

            let Some(len) = self.read_byte()? else {
                return Ok(None);
            };
            if (len as usize) < PACKET_HEADER_LEN {
                warn!("packet length is too small ({}), packet corrupted", len);
                continue;
            }

            let Some(reserved) = self.read_byte()? else {
                return Ok(None);
            };
            if self.strictness == Strictness::Strict && reserved != 0x00 {
                warn!(
                    "corrupted packet header: byte 2 is not 0x00: {:#04x}",
                    reserved
                );
                continue;
            }

            // Marker, length and reserved byte are already consumed; the
            // rest of the frame is read verbatim.
            let mut frame = Vec::with_capacity(len as usize);
            frame.push(PACKET_START);
            frame.push(len);
            frame.push(reserved);
            for _ in 3..len as usize {
                match self.read_byte()? {
                    Some(b) => frame.push(b),
                    None => {
                        warn!(
                            "stream ended mid-frame after {} of {} bytes, dropping it",
                            frame.len(),
                            len
                        );
                        return Ok(None);
                    }
                }
            }

            return Ok(Some(frame));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    /// A minimal 10-byte frame with the given packet type bytes.
    fn minimal_frame(type_lo: u8, type_hi: u8) -> Vec<u8> {
        vec![0x55, 0x0a, 0x00, type_lo, type_hi, 0x00, 0x01, 0x00, 0x00, 0x00]
    }

    fn scan_all(bytes: &[u8], strictness: Strictness) -> Vec<Vec<u8>> {
        let mut scanner = FrameScanner::with_strictness(Cursor::new(bytes), strictness);
        let mut frames = Vec::new();
        while let Some(frame) = scanner.next_frame().unwrap() {
            frames.push(frame);
        }
        frames
    }

    #[test]
    fn test_no_marker_no_frames() {
        let bytes = [0x00, 0x11, 0x22, 0xfe, 0xff, 0x54, 0x56];
        assert!(scan_all(&bytes, Strictness::Strict).is_empty());
    }

    #[test]
    fn test_empty_stream() {
        assert!(scan_all(&[], Strictness::Strict).is_empty());
    }

    #[test]
    fn test_extracts_frame_after_noise() {
        let mut bytes = vec![0x01, 0xab, 0x00];
        let frame = minimal_frame(0x6c, 0x5c);
        bytes.extend_from_slice(&frame);
        let frames = scan_all(&bytes, Strictness::Strict);
        assert_eq!(frames, vec![frame]);
    }

    #[test]
    fn test_extracts_consecutive_frames_in_order() {
        let first = minimal_frame(0x6c, 0x5c);
        let second = minimal_frame(0xcf, 0x01);
        let mut bytes = first.clone();
        bytes.extend_from_slice(&second);
        let frames = scan_all(&bytes, Strictness::Strict);
        assert_eq!(frames, vec![first, second]);
    }

    #[test]
    fn test_rejects_small_length_and_resumes() {
        // Marker followed by a bogus length, then a genuine frame.
        let mut bytes = vec![0x55, 0x05];
        let frame = minimal_frame(0x6c, 0x5c);
        bytes.extend_from_slice(&frame);
        let frames = scan_all(&bytes, Strictness::Strict);
        assert_eq!(frames, vec![frame]);
    }

    #[test]
    fn test_strict_rejects_nonzero_reserved_byte() {
        let mut bad = minimal_frame(0x6c, 0x5c);
        bad[2] = 0x07;
        let mut bytes = bad;
        let good = minimal_frame(0xcf, 0x01);
        bytes.extend_from_slice(&good);
        let frames = scan_all(&bytes, Strictness::Strict);
        assert_eq!(frames, vec![good]);
    }

    #[test]
    fn test_lenient_accepts_nonzero_reserved_byte() {
        let mut frame = minimal_frame(0x6c, 0x5c);
        frame[2] = 0x07;
        let frames = scan_all(&frame, Strictness::Lenient);
        assert_eq!(frames, vec![frame]);
    }

    #[test]
    fn test_truncated_frame_is_dropped() {
        // Declares 40 bytes but the stream ends after 12.
        let bytes = [
            0x55, 0x28, 0x00, 0x6c, 0x5c, 0x00, 0x70, 0xf7, 0x01, 0x00, 0x70, 0x70,
        ];
        assert!(scan_all(&bytes, Strictness::Strict).is_empty());
    }

    #[test]
    fn test_truncated_frame_does_not_hide_earlier_frame() {
        let frame = minimal_frame(0x6c, 0x5c);
        let mut bytes = frame.clone();
        bytes.extend_from_slice(&[0x55, 0x28, 0x00, 0x01]);
        let frames = scan_all(&bytes, Strictness::Strict);
        assert_eq!(frames, vec![frame]);
    }

    #[test]
    fn test_length_exceeding_remaining_stream() {
        // Length byte says 200 but only a handful of bytes follow.
        let bytes = [0x55, 0xc8, 0x00, 0x01, 0x02, 0x03];
        assert!(scan_all(&bytes, Strictness::Strict).is_empty());
    }
}
