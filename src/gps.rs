use crate::error::{DatError, Result};
use crate::protocol::{self, PacketHeader, packet_type};

/// Byte offset of the longitude field (f64) within the frame.
pub const LON_OFFSET: usize = 10;
/// Byte offset of the latitude field (f64).
pub const LAT_OFFSET: usize = 18;
/// Byte offset of the altitude field (f32, meters, no conversion).
pub const ALT_OFFSET: usize = 26;
/// Byte offset of the first auxiliary f32 field; the rest follow at a
/// 4-byte stride.
pub const AUX_OFFSET: usize = 30;
/// Number of auxiliary f32 fields.
pub const AUX_COUNT: usize = 8;
/// Minimum frame length covering the full GPS layout (offsets 10-61).
pub const GPS_FRAME_LEN: usize = AUX_OFFSET + AUX_COUNT * 4;

/// Scale factor from the radians-like wire encoding to decimal degrees.
pub const RAD_TO_DEG: f64 = 180.0 / 3.141592653589793;

/// Values closer to zero than this are decoding noise, never coordinates.
pub const GPS_EPSILON: f64 = 0.01;

/// CSV column header matching [`GpsFields::to_csv_row`].
pub const CSV_HEADER: &str = "Latitude,Longitude,Altitude,_bytes30_33_f,_bytes34_37_f,\
_bytes38_41_f,_bytes42_45_f,_bytes46_49_f,_bytes50_53_f,_bytes54_57_f,_bytes58_61_f";

/// Apply the coordinate unit rule: radians-like raw value to degrees.
pub fn convert_to_degrees(raw: f64) -> f64 {
    raw * RAD_TO_DEG
}

/// Plausibility interval for the GPS-likeness heuristic.
///
/// The right interval is not known: it depends on where the log was
/// recorded and on how much decoding noise the caller tolerates. Two
/// observed choices are provided as constants; neither is authoritative.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GpsBounds {
    pub min: f64,
    pub max: f64,
}

impl GpsBounds {
    /// Wide sanity range accepting anything a flight log could contain.
    pub const WIDE: Self = Self {
        min: -1000.0,
        max: 3000.0,
    };

    /// Bounding box of the capture region the layout was decoded from.
    pub const TIGHT: Self = Self {
        min: 13.0,
        max: 102.0,
    };

    /// True when `value` lies inside the interval and far enough from
    /// zero to rule out decoding noise.
    pub fn is_gps_like(&self, value: f64) -> bool {
        value > self.min && value < self.max && value.abs() > GPS_EPSILON
    }
}

impl Default for GpsBounds {
    fn default() -> Self {
        Self::WIDE
    }
}

/// Geographic fields decoded from a GPS-candidate packet.
#[derive(Debug, Clone, PartialEq)]
pub struct GpsFields {
    /// Longitude in decimal degrees.
    pub longitude: f64,
    /// Latitude in decimal degrees.
    pub latitude: f64,
    /// Altitude in meters.
    pub altitude: f32,
    /// Auxiliary fields at offsets 30-61; their meaning is not decoded
    /// yet, so the bytes are kept as plain f32 readings.
    pub aux: [f32; AUX_COUNT],
}

impl GpsFields {
    /// Decode the fixed GPS layout from a frame.
    ///
    /// Requires packet type 0x01CF and byte 6 equal to 0x00; byte 6
    /// separates genuine GPS fixes from the other 0x01CF packets.
    pub fn parse(header: &PacketHeader, raw: &[u8]) -> Result<Self> {
        if header.packet_type != packet_type::GPS {
            return Err(DatError::WrongPacketType(header.packet_type));
        }
        match raw.get(6) {
            Some(&0x00) => {}
            Some(&b) => return Err(DatError::WrongReservedByte(b)),
            None => return Err(DatError::TooShort { len: raw.len() }),
        }

        let too_short = || DatError::TooShort { len: raw.len() };

        let longitude =
            convert_to_degrees(protocol::read_f64_le(raw, LON_OFFSET).ok_or_else(too_short)?);
        let latitude =
            convert_to_degrees(protocol::read_f64_le(raw, LAT_OFFSET).ok_or_else(too_short)?);
        let altitude = protocol::read_f32_le(raw, ALT_OFFSET).ok_or_else(too_short)?;

        let mut aux = [0f32; AUX_COUNT];
        for (k, slot) in aux.iter_mut().enumerate() {
            *slot =
                protocol::read_f32_le(raw, AUX_OFFSET + 4 * k).ok_or_else(too_short)?;
        }

        Ok(Self {
            longitude,
            latitude,
            altitude,
            aux,
        })
    }

    /// Render one CSV row in [`CSV_HEADER`] column order.
    pub fn to_csv_row(&self) -> String {
        let mut row = format!("{},{},{}", self.latitude, self.longitude, self.altitude);
        for value in &self.aux {
            row.push(',');
            row.push_str(&value.to_string());
        }
        row
    }
}
