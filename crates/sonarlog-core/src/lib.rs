//! sonarlog core library for offline decoding of sonar telemetry captures.
//!
//! Captures are raw byte streams of Ping Protocol frames (`BR` marker,
//! little-endian header, payload, 16-bit sum checksum) as logged by
//! side-scan sonars. The scanner visits every marker in the buffer, decodes
//! each candidate with the declarative layouts held in the message registry,
//! and returns the valid packets in offset order together with a report of
//! the rejected ones. Decoding is byte-oriented and side-effect free; the only
//! I/O is loading the capture in `scan_file` and the `export` writers.
//!
//! Invariants:
//! - Accepted packets are in ascending offset order and never corrupted.
//! - A layout must account for every payload byte, or decoding fails.
//! - Per-candidate failures never abort a scan.
//!
//! Version française (résumé):
//! Cette crate décode les captures Ping Protocol hors ligne : recherche des
//! marqueurs `BR`, en-tête, somme de contrôle, puis charge utile selon le
//! registre des types de messages. Les paquets valides sont rendus dans
//! l'ordre des positions; les rejets sont signalés sans interrompre l'analyse.
//!
//! # Examples
//! ```no_run
//! use std::path::Path;
//!
//! use sonarlog_core::{ScanOptions, default_registry, scan_file};
//!
//! let report = scan_file(Path::new("capture.svlog"), default_registry(), &ScanOptions::default())?;
//! println!("packets: {}", report.packets.len());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod export;
mod ping;
mod scan;

pub use export::{
    ExportError, PACKET_COLUMNS, write_message_log, write_packets_csv, write_profiles_csv,
};
pub use ping::checksum::{ChecksumCheck, compute_checksum, verify_checksum};
pub use ping::decoder::{Record, Value, decode_layout};
pub use ping::error::{DecodeError, DecodeErrorKind, LayoutError, RegistryError};
pub use ping::header::{Header, decode_header};
pub use ping::layout::{
    CHECKSUM_LEN, FRAME_OVERHEAD, HEADER_LEN, JSON_HEADER_ID, MARKER, MONO_PROFILE_FIXED_LEN,
    MONO_PROFILE_ID, NACK_ID, UNKNOWN_LABEL,
};
pub use ping::packet::{Packet, decode_frame, decode_packet_at};
pub use ping::payload::{JsonHeader, MessageBody, MonoProfile, Nack, Payload, decode_payload};
pub use ping::registry::{MessageRegistry, MessageType, default_registry};
pub use ping::schema::{ElementType, FieldSpec, FieldType, LayoutDescriptor, ScalarType};
pub use scan::{
    Rejection, ScanError, ScanOptions, ScanReport, ScanSummary, marker_offsets, scan_buffer,
    scan_file,
};
