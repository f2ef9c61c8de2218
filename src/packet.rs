use std::fmt;

use log::debug;

use crate::error::Result;
use crate::gps::GpsFields;
use crate::protocol::{self, PACKET_HEADER_LEN, PacketHeader, packet_type};

/// Payload interpretation, selected by the packet type.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// Unrecognized packet type. The payload bytes stay opaque; the
    /// stride-1 double scan is the only interpretation offered.
    Generic,
    /// Decoded GPS fields (packet type 0x01CF, byte 6 zero).
    Gps(GpsFields),
}

/// A captured frame with its decoded header and typed payload.
///
/// Owns its raw bytes exclusively; once parsed it is immutable.
#[derive(Debug, Clone, PartialEq)]
pub struct Packet {
    pub header: PacketHeader,
    raw: Vec<u8>,
    /// Single authoritative validity flag for the whole packet.
    pub valid: bool,
    pub payload: Payload,
}

impl Packet {
    /// Decode a raw frame into a typed packet.
    ///
    /// Header validation failures are returned as errors and the frame
    /// should be discarded. A GPS-type frame whose payload fails its
    /// extra checks decodes into an invalid packet with a generic
    /// payload and no fields.
    pub fn parse(raw: Vec<u8>) -> Result<Self> {
        let header = PacketHeader::parse(&raw)?;

        let (valid, payload) = if header.packet_type == packet_type::GPS {
            match GpsFields::parse(&header, &raw) {
                Ok(fields) => (true, Payload::Gps(fields)),
                Err(e) => {
                    debug!("GPS-type packet failed payload checks: {}", e);
                    (false, Payload::Generic)
                }
            }
        } else {
            (true, Payload::Generic)
        };

        Ok(Self {
            header,
            raw,
            valid,
            payload,
        })
    }

    /// The raw frame bytes.
    pub fn raw(&self) -> &[u8] {
        &self.raw
    }

    /// Brute-force diagnostic scan of the payload: every 8-byte window
    /// from the payload start reinterpreted as a little-endian f64.
    ///
    /// Windows overlap (stride 1). This hunts for plausible values at
    /// unknown offsets; it is not a field decode. Empty for frames too
    /// short to hold a single window.
    pub fn data_doubles(&self) -> Vec<f64> {
        if self.raw.len() < PACKET_HEADER_LEN + 8 {
            return Vec::new();
        }
        (PACKET_HEADER_LEN..=self.raw.len() - 8)
            .filter_map(|pos| protocol::read_f64_le(&self.raw, pos))
            .collect()
    }
}

impl fmt::Display for Packet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "MsgID: {}, len: {}, type: {:04x}",
            self.header.msg_id, self.header.declared_len, self.header.packet_type
        )?;
        for byte in &self.raw {
            write!(f, "{:02x} ", byte)?;
        }
        Ok(())
    }
}
