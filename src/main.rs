use std::fs::File;
use std::io::{self, BufReader, Write};
use std::process;

use log::warn;

use phantom_dat::report::{self, ScanStats};
use phantom_dat::{DatError, FrameScanner, GpsBounds, Packet, Payload, Result};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let mut args = std::env::args().skip(1);
    let Some(path) = args.next() else {
        println!("You should provide a filename as an argument");
        println!("Usage: phantom-dat <capture.DAT> [--csv]");
        process::exit(1);
    };
    let csv = match args.next().as_deref() {
        Some("--csv") => true,
        Some(other) => {
            println!("Unknown argument: {other}");
            println!("Usage: phantom-dat <capture.DAT> [--csv]");
            process::exit(1);
        }
        None => false,
    };

    // Every multi-byte field is read verbatim as little-endian; there is
    // no byte-swap path for big-endian hosts.
    if cfg!(target_endian = "big") {
        println!("Big-endian host is not supported: capture files are little-endian");
        process::exit(1);
    }

    println!("Reading file {path}");
    let file = match File::open(&path) {
        Ok(f) => f,
        Err(e) => {
            println!("Cannot open file {path}: {e}");
            process::exit(1);
        }
    };

    if let Err(e) = run(file, csv) {
        println!("{e}");
        process::exit(1);
    }
}

fn run(file: File, csv: bool) -> Result<()> {
    let mut scanner = FrameScanner::new(BufReader::new(file));
    let bounds = GpsBounds::default();
    let mut stats = ScanStats::default();
    let mut gps_packets = Vec::new();

    let stdout = io::stdout();
    let mut out = stdout.lock();

    while let Some(frame) = scanner.next_frame()? {
        stats.record_frame();

        let packet = match Packet::parse(frame) {
            Ok(p) => p,
            Err(e) => {
                warn!("discarding corrupted frame: {}", e);
                continue;
            }
        };
        stats.record_packet(&packet);

        if csv {
            if matches!(packet.payload, Payload::Gps(_)) {
                gps_packets.push(packet);
            }
        } else {
            report::report_packet(&mut out, &packet, &bounds)?;
        }
    }

    if stats.valid == 0 {
        return Err(DatError::NoPacketsFound);
    }

    if csv {
        report::write_csv(&mut out, &gps_packets)?;
    }
    report::report_summary(&mut out, &stats)?;
    out.flush()?;

    Ok(())
}
