//! Capture scanning.
//!
//! A capture is read fully into memory, every `BR` marker becomes a candidate,
//! and each candidate is decoded independently of its neighbours. Candidates
//! that fail are reported with their offset but never stop the scan; the
//! result is always the best-effort list of valid packets in offset order.

mod markers;

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::ping::error::{DecodeError, DecodeErrorKind};
use crate::ping::packet::{Packet, decode_packet_at};
use crate::ping::registry::MessageRegistry;

pub use markers::marker_offsets;

/// Caller-supplied filters.
///
/// An empty `include_ids` admits every id. `max_packets` caps the number of
/// accepted packets and ends the scan once reached.
///
/// # Examples
/// ```
/// use sonarlog_core::ScanOptions;
///
/// let options = ScanOptions {
///     exclude_ids: [10].into(),
///     ..ScanOptions::default()
/// };
/// assert!(options.admits(2198));
/// assert!(!options.admits(10));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanOptions {
    pub include_ids: BTreeSet<u16>,
    pub exclude_ids: BTreeSet<u16>,
    pub max_packets: Option<usize>,
}

impl ScanOptions {
    pub fn admits(&self, message_id: u16) -> bool {
        (self.include_ids.is_empty() || self.include_ids.contains(&message_id))
            && !self.exclude_ids.contains(&message_id)
    }
}

/// Candidate that was dropped for a reportable reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Rejection {
    pub offset: usize,
    pub kind: DecodeErrorKind,
    pub message: String,
}

impl Rejection {
    fn new(offset: usize, err: &DecodeError) -> Self {
        Self {
            offset,
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

/// Per-scan counters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScanSummary {
    pub bytes: usize,
    /// Marker offsets visited (all of them unless the cap stopped the scan).
    pub candidates: u64,
    pub accepted: u64,
    pub corrupted: u64,
    pub malformed: u64,
    pub unknown_skipped: u64,
    pub filtered: u64,
}

/// Outcome of a scan: accepted packets and everything that was rejected.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ScanReport {
    pub summary: ScanSummary,
    /// Corrupted and undecodable candidates, ascending offset.
    pub rejections: Vec<Rejection>,
    /// Accepted packets, ascending offset.
    pub packets: Vec<Packet>,
}

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("failed to read capture {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Scan a capture buffer for packets.
///
/// Unregistered ids are skipped silently (counted in `unknown_skipped`).
/// Truncated, malformed and corrupted candidates are logged and listed in
/// `rejections`. Candidates are evaluated at every marker offset, including
/// offsets inside an already accepted packet.
///
/// # Examples
/// ```
/// use sonarlog_core::{ScanOptions, default_registry, scan_buffer};
///
/// let mut frame = vec![0x42, 0x52, 0x04, 0x00, 0x0a, 0x00, 0x01, 0x00];
/// frame.extend_from_slice(b"a\0\0\0");
/// let sum: u16 = frame.iter().map(|&b| u16::from(b)).sum();
/// frame.extend_from_slice(&sum.to_le_bytes());
///
/// let report = scan_buffer(&frame, default_registry(), &ScanOptions::default());
/// assert_eq!(report.packets.len(), 1);
/// assert!(report.rejections.is_empty());
/// ```
pub fn scan_buffer(data: &[u8], registry: &MessageRegistry, options: &ScanOptions) -> ScanReport {
    let mut report = ScanReport {
        summary: ScanSummary {
            bytes: data.len(),
            ..ScanSummary::default()
        },
        ..ScanReport::default()
    };
    if options.max_packets == Some(0) {
        return report;
    }

    for offset in marker_offsets(data) {
        report.summary.candidates += 1;
        let packet = match decode_packet_at(data, offset, registry) {
            Ok(packet) => packet,
            Err(DecodeError::UnknownMessageType { id }) => {
                report.summary.unknown_skipped += 1;
                debug!(offset, id, "skipping unknown message type");
                continue;
            }
            Err(err) => {
                report.summary.malformed += 1;
                warn!(offset, reason = %err, "error parsing packet");
                report.rejections.push(Rejection::new(offset, &err));
                continue;
            }
        };

        if !options.admits(packet.message_id()) {
            report.summary.filtered += 1;
            debug!(offset, id = packet.message_id(), "packet filtered out");
            continue;
        }

        if let Some(err) = packet.checksum_error() {
            report.summary.corrupted += 1;
            warn!(offset, reason = %err, "invalid checksum");
            report.rejections.push(Rejection::new(offset, &err));
            continue;
        }

        report.packets.push(packet);
        report.summary.accepted += 1;
        if options
            .max_packets
            .is_some_and(|max| report.packets.len() >= max)
        {
            debug!(offset, "packet cap reached");
            break;
        }
    }

    info!(
        bytes = report.summary.bytes,
        candidates = report.summary.candidates,
        accepted = report.summary.accepted,
        corrupted = report.summary.corrupted,
        malformed = report.summary.malformed,
        unknown = report.summary.unknown_skipped,
        "scan complete"
    );
    report
}

/// Read `path` into memory and scan it.
///
/// # Errors
/// Returns `ScanError::Io` if the file cannot be read. Per-packet problems
/// never fail the scan.
pub fn scan_file(
    path: &Path,
    registry: &MessageRegistry,
    options: &ScanOptions,
) -> Result<ScanReport, ScanError> {
    let data = fs::read(path).map_err(|source| ScanError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(path = %path.display(), bytes = data.len(), "capture loaded");
    Ok(scan_buffer(&data, registry, options))
}
