use crate::error::{DatError, Result};

/// Frame start marker byte.
pub const PACKET_START: u8 = 0x55;
/// Fixed header length: start marker through message id.
pub const PACKET_HEADER_LEN: usize = 10;

/// Known packet type discriminators (bytes 3-4, little-endian).
///
/// Many packets of different types can belong to one message (grouped by
/// the message id in bytes 6-9); a packet of one type always has the same
/// size. Most type values are still unidentified.
pub mod packet_type {
    /// GPS-candidate packet. Carries coordinates when byte 6 is 0x00.
    pub const GPS: u16 = 0x01CF;
    /// Always the first packet of a message group.
    pub const MESSAGE_START: u16 = 0x5C6C;
}

/// A decoded fixed-layout packet header.
///
/// Frame wire format:
/// `55 <len> 00 <type_lo> <type_hi> <flag> <id0> <id1> <id2> <id3> <payload...>`
///
/// Byte 1 declares the total frame length including the marker itself.
/// Byte 5 is almost always 0x00 and is left unvalidated (0xFF has been
/// observed and probably flags an error condition).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PacketHeader {
    /// Declared frame length from byte 1.
    pub declared_len: u8,
    /// Packet type from bytes 3-4.
    pub packet_type: u16,
    /// Message id from bytes 6-9.
    pub msg_id: u32,
}

impl PacketHeader {
    /// Validate and decode the header of a captured frame.
    ///
    /// The declared length must equal the number of bytes actually
    /// captured; a mismatch is the primary corruption check.
    pub fn parse(raw: &[u8]) -> Result<Self> {
        if raw.len() < PACKET_HEADER_LEN {
            return Err(DatError::TooShort { len: raw.len() });
        }

        let declared_len = raw[1];
        if declared_len as usize != raw.len() {
            return Err(DatError::LengthMismatch {
                declared: declared_len,
                actual: raw.len(),
            });
        }

        let packet_type = u16::from_le_bytes([raw[3], raw[4]]);
        let msg_id = u32::from_le_bytes([raw[6], raw[7], raw[8], raw[9]]);

        Ok(Self {
            declared_len,
            packet_type,
            msg_id,
        })
    }
}

/// Reinterpret the 8 bytes at `pos` as a little-endian f64.
///
/// Returns `None` when the range runs past the end of the frame.
pub fn read_f64_le(raw: &[u8], pos: usize) -> Option<f64> {
    let bytes: [u8; 8] = raw.get(pos..pos + 8)?.try_into().ok()?;
    Some(f64::from_le_bytes(bytes))
}

/// Reinterpret the 4 bytes at `pos` as a little-endian f32.
pub fn read_f32_le(raw: &[u8], pos: usize) -> Option<f32> {
    let bytes: [u8; 4] = raw.get(pos..pos + 4)?.try_into().ok()?;
    Some(f32::from_le_bytes(bytes))
}

/// Reinterpret the 4 bytes at `pos` as a little-endian u32.
pub fn read_u32_le(raw: &[u8], pos: usize) -> Option<u32> {
    let bytes: [u8; 4] = raw.get(pos..pos + 4)?.try_into().ok()?;
    Some(u32::from_le_bytes(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 40-byte message-start frame captured from a real flight log.
    const EXAMPLE_FRAME: [u8; 40] = [
        0x55, 0x28, 0x00, 0x6c, 0x5c, 0x00, 0x70, 0xf7, 0x01, 0x00, 0x70, 0x70, 0x6e, 0x70, 0x71,
        0x70, 0x10, 0x70, 0x78, 0x70, 0x62, 0x88, 0x70, 0x70, 0x70, 0x70, 0x70, 0x70, 0x70, 0x70,
        0x70, 0x70, 0x70, 0x70, 0x4e, 0x9d, 0x71, 0x70, 0x60, 0xa7,
    ];

    #[test]
    fn test_parse_example_frame() {
        let header = PacketHeader::parse(&EXAMPLE_FRAME).unwrap();
        assert_eq!(header.declared_len, 40);
        assert_eq!(header.packet_type, packet_type::MESSAGE_START);
        assert_eq!(header.msg_id, 128_880);
    }

    #[test]
    fn test_parse_too_short() {
        let raw = [0x55, 0x09, 0x00, 0xcf, 0x01, 0x00, 0x00, 0x00, 0x00];
        assert!(matches!(
            PacketHeader::parse(&raw),
            Err(DatError::TooShort { len: 9 })
        ));
    }

    #[test]
    fn test_parse_empty() {
        assert!(matches!(
            PacketHeader::parse(&[]),
            Err(DatError::TooShort { len: 0 })
        ));
    }

    #[test]
    fn test_parse_length_mismatch() {
        // Truncate the example frame by one byte: declared 40, captured 39.
        let raw = &EXAMPLE_FRAME[..39];
        assert!(matches!(
            PacketHeader::parse(raw),
            Err(DatError::LengthMismatch {
                declared: 40,
                actual: 39
            })
        ));
    }

    #[test]
    fn test_read_f64_le() {
        let mut raw = vec![0u8; 10];
        raw.extend_from_slice(&1.5f64.to_le_bytes());
        assert_eq!(read_f64_le(&raw, 10), Some(1.5));
        assert_eq!(read_f64_le(&raw, 11), None);
    }

    #[test]
    fn test_read_f32_le() {
        let mut raw = vec![0u8; 4];
        raw.extend_from_slice(&(-2.25f32).to_le_bytes());
        assert_eq!(read_f32_le(&raw, 4), Some(-2.25));
        assert_eq!(read_f32_le(&raw, 5), None);
    }

    #[test]
    fn test_read_u32_le() {
        let raw = [0x78, 0x56, 0x34, 0x12];
        assert_eq!(read_u32_le(&raw, 0), Some(0x1234_5678));
        assert_eq!(read_u32_le(&raw, 1), None);
    }
}
