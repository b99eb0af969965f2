//! Ping Protocol frame decoding.
//!
//! Frames are `BR` marker, 8-byte little-endian header, payload, then a
//! 16-bit truncated-sum checksum. The module follows a layered structure:
//! - `layout`: wire constants and the built-in field tables (source of truth)
//! - `schema`: layout descriptor types and their validation
//! - `reader`: cursor-based primitive reads
//! - `decoder`: descriptor-driven field decoding into records
//! - `header`, `checksum`, `payload`, `packet`: domain-level decoding
//! - `registry`: message id to layout and typed body
//! - `error`: explicit, actionable errors
//!
//! Everything here is pure and works on borrowed byte slices; file access
//! lives in `scan`.

pub mod checksum;
pub mod decoder;
pub mod error;
pub mod header;
pub mod layout;
pub mod packet;
pub mod payload;
pub mod reader;
pub mod registry;
pub mod schema;
