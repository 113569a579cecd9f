//! Summary text, JSON and nav CSV writers for a normalized result

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use flate2::write::GzEncoder;
use flate2::Compression;

use crate::error::Result;
use crate::result::NormalizedResult;
use crate::types::NavState;
use crate::units::R2D;

pub const IMU_SUMMARY: &str = "imu-0.txt";
pub const GPS_SUMMARY: &str = "gps-0.txt";
pub const FILTER_SUMMARY: &str = "filter-0.txt";

/// Header of `filter-post.csv` style files
pub const FILTER_CSV_HEADER: [&str; 17] = [
    "timestamp",
    "latitude_deg",
    "longitude_deg",
    "altitude_m",
    "vn_ms",
    "ve_ms",
    "vd_ms",
    "roll_deg",
    "pitch_deg",
    "heading_deg",
    "p_bias",
    "q_bias",
    "r_bias",
    "ax_bias",
    "ay_bias",
    "az_bias",
    "status",
];

fn write_lines(path: &Path, lines: impl Iterator<Item = String>) -> Result<()> {
    let mut out = BufWriter::new(File::create(path)?);
    for line in lines {
        writeln!(out, "{}", line)?;
    }
    out.flush()?;
    Ok(())
}

/// Write headerless comma-separated summaries of the imu, gps and filter
/// streams into `dir`. Positions and angles are written in degrees.
///
/// `imu-0.txt` and `gps-0.txt` are always written (empty when the stream is
/// absent); `filter-0.txt` only when a filter stream exists.
pub fn write_summaries(result: &NormalizedResult, dir: &Path) -> Result<Vec<PathBuf>> {
    let mut written = Vec::new();

    let path = dir.join(IMU_SUMMARY);
    let imu = result.imu().unwrap_or(&[]);
    write_lines(
        &path,
        imu.iter().map(|s| {
            format!(
                "{:.5},{:.4},{:.4},{:.4},{:.4},{:.4},{:.4},{:.4},{:.4},{:.4},{:.4},0",
                s.time, s.p, s.q, s.r, s.ax, s.ay, s.az, s.hx, s.hy, s.hz, s.temp
            )
        }),
    )?;
    written.push(path);

    let path = dir.join(GPS_SUMMARY);
    let gps = result.gps().unwrap_or(&[]);
    write_lines(
        &path,
        gps.iter().map(|g| {
            format!(
                "{:.5},{:.10},{:.10},{:.4},{:.4},{:.4},{:.4},{:.4},{},0",
                g.time,
                g.lat * R2D,
                g.lon * R2D,
                g.alt,
                g.vn,
                g.ve,
                g.vd,
                g.unix_sec,
                g.sats
            )
        }),
    )?;
    written.push(path);

    if let Some(filter) = result.filter() {
        let path = dir.join(FILTER_SUMMARY);
        write_lines(
            &path,
            filter.iter().map(|n| {
                format!(
                    "{:.5},{:.10},{:.10},{:.4},{:.4},{:.4},{:.4},{:.4},{:.4},{:.4},0",
                    n.time,
                    n.lat * R2D,
                    n.lon * R2D,
                    n.alt,
                    n.vn,
                    n.ve,
                    n.vd,
                    n.phi * R2D,
                    n.the * R2D,
                    n.psi * R2D
                )
            }),
        )?;
        written.push(path);
    }

    for path in &written {
        log::info!("wrote {}", path.display());
    }
    Ok(written)
}

/// Serialize all streams as one JSON object keyed by stream name
pub fn to_json(result: &NormalizedResult) -> Result<String> {
    Ok(serde_json::to_string_pretty(result)?)
}

/// Write `to_json` output to `path`, gzip-compressed when it ends in `.gz`
pub fn write_json(result: &NormalizedResult, path: &Path) -> Result<()> {
    let file = File::create(path)?;
    if path.extension().map(|e| e == "gz").unwrap_or(false) {
        let mut encoder = GzEncoder::new(BufWriter::new(file), Compression::default());
        serde_json::to_writer(&mut encoder, result)?;
        encoder.finish()?.flush()?;
    } else {
        let mut out = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut out, result)?;
        out.flush()?;
    }
    log::info!("wrote {}", path.display());
    Ok(())
}

/// Write nav estimates in the `filter-post.csv` layout (degrees) with a
/// trailing `status` column, readable by the delimited adapter
pub fn write_filter_csv(path: &Path, nav: &[NavState]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(FILTER_CSV_HEADER)?;
    for n in nav {
        writer.write_record(&[
            format!("{:.4}", n.time),
            format!("{:.10}", n.lat * R2D),
            format!("{:.10}", n.lon * R2D),
            format!("{:.2}", n.alt),
            format!("{:.4}", n.vn),
            format!("{:.4}", n.ve),
            format!("{:.4}", n.vd),
            format!("{:.2}", n.phi * R2D),
            format!("{:.2}", n.the * R2D),
            format!("{:.2}", n.psi * R2D),
            format!("{:.4}", n.p_bias),
            format!("{:.4}", n.q_bias),
            format!("{:.4}", n.r_bias),
            format!("{:.3}", n.ax_bias),
            format!("{:.3}", n.ay_bias),
            format!("{:.3}", n.az_bias),
            "0".to_string(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}
