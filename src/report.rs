use std::io::{self, Write};

use crate::datetime::PackedDateTime;
use crate::gps::{self, GpsBounds};
use crate::packet::{Packet, Payload};
use crate::protocol::{self, packet_type};

/// Counters accumulated over one scan.
#[derive(Debug, Default, Clone, Copy)]
pub struct ScanStats {
    /// Frames extracted from the stream, including ones that failed to
    /// decode.
    pub total: usize,
    /// Packets that decoded with a valid header and payload.
    pub valid: usize,
    /// Packets carrying the GPS-candidate type (0x01CF).
    pub gps_candidates: usize,
}

impl ScanStats {
    /// Count one frame pulled out of the stream.
    pub fn record_frame(&mut self) {
        self.total += 1;
    }

    /// Count one decoded packet.
    pub fn record_packet(&mut self, packet: &Packet) {
        if packet.valid {
            self.valid += 1;
        }
        if packet.header.packet_type == packet_type::GPS {
            self.gps_candidates += 1;
        }
    }
}

/// Write the text report for one packet.
///
/// Only GPS-candidate packets produce output: a decoded-fields block when
/// the fix decoded, the diagnostic double-scan hits, and the hex dump.
/// Packets of other types are counted but not printed.
pub fn report_packet<W: Write>(out: &mut W, packet: &Packet, bounds: &GpsBounds) -> io::Result<()> {
    if packet.header.packet_type != packet_type::GPS {
        return Ok(());
    }

    let mut printed = false;

    if let Payload::Gps(fields) = &packet.payload {
        writeln!(
            out,
            "GPS fix: lat {}, lon {}, alt {} m",
            fields.latitude, fields.longitude, fields.altitude
        )?;
        for (k, value) in fields.aux.iter().enumerate() {
            let offset = gps::AUX_OFFSET + 4 * k;
            write!(out, "  bytes {}-{}: {}", offset, offset + 3, value)?;
            // The same four bytes reread as a packed timestamp word. The
            // layout is unverified, so the reading is diagnostic only.
            if let Some(word) = protocol::read_u32_le(packet.raw(), offset) {
                write!(
                    out,
                    " (as datetime: {}, speculative)",
                    PackedDateTime::decode(word)
                )?;
            }
            writeln!(out)?;
        }
        printed = true;
    }

    // Stride-1 scan for plausible coordinates at unknown offsets.
    let hits: Vec<(usize, f64)> = packet
        .data_doubles()
        .iter()
        .map(|&value| gps::convert_to_degrees(value))
        .enumerate()
        .filter(|&(_, converted)| bounds.is_gps_like(converted))
        .collect();
    if hits.len() > 1 {
        for (pos, converted) in &hits {
            writeln!(
                out,
                "Converted double found at position [{}] {:.6}",
                pos, converted
            )?;
        }
        printed = true;
    }

    if printed {
        writeln!(out, "{}", packet)?;
    }
    Ok(())
}

/// Write the CSV report: pinned column header plus one row per decoded
/// GPS fix, in stream order.
pub fn write_csv<'a, W, I>(out: &mut W, packets: I) -> io::Result<()>
where
    W: Write,
    I: IntoIterator<Item = &'a Packet>,
{
    writeln!(out, "{}", gps::CSV_HEADER)?;
    for packet in packets {
        if let Payload::Gps(fields) = &packet.payload {
            writeln!(out, "{}", fields.to_csv_row())?;
        }
    }
    Ok(())
}

/// Write the end-of-run counters.
pub fn report_summary<W: Write>(out: &mut W, stats: &ScanStats) -> io::Result<()> {
    writeln!(out, "Number of packets found: {}", stats.total)?;
    writeln!(out, "Number of valid packets: {}", stats.valid)?;
    writeln!(
        out,
        "Number of packets of type 01cf: {}",
        stats.gps_candidates
    )?;
    Ok(())
}
