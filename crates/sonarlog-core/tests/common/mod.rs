#![allow(dead_code)]

use sonarlog_core::{MARKER, MONO_PROFILE_FIXED_LEN, compute_checksum};

/// Build a well-formed frame with a correct checksum.
pub fn frame(message_id: u16, sender_id: u8, payload: &[u8]) -> Vec<u8> {
    let mut bytes = MARKER.to_vec();
    bytes.extend_from_slice(&(payload.len() as u16).to_le_bytes());
    bytes.extend_from_slice(&message_id.to_le_bytes());
    bytes.push(sender_id);
    bytes.push(0);
    bytes.extend_from_slice(payload);
    let sum = compute_checksum(&bytes);
    bytes.extend_from_slice(&sum.to_le_bytes());
    bytes
}

pub fn json_header(text: &str) -> Vec<u8> {
    frame(10, 1, text.as_bytes())
}

pub fn nack(nacked_id: u16, message: &str) -> Vec<u8> {
    let mut payload = nacked_id.to_le_bytes().to_vec();
    payload.extend_from_slice(message.as_bytes());
    frame(2, 1, &payload)
}

pub struct Profile {
    pub ping_number: u32,
    pub sender_id: u8,
    pub pwr_results: Vec<u16>,
}

pub fn mono_profile(profile: &Profile) -> Vec<u8> {
    let mut payload = Vec::with_capacity(MONO_PROFILE_FIXED_LEN + profile.pwr_results.len() * 2);
    for v in [profile.ping_number, 500, 20_000, 1_000 + profile.ping_number, 450_000] {
        payload.extend_from_slice(&v.to_le_bytes());
    }
    for v in [2u16, profile.pwr_results.len() as u16, 14_900] {
        payload.extend_from_slice(&v.to_le_bytes());
    }
    payload.extend_from_slice(&[profile.sender_id, 0]);
    for v in [0.0001f32, 12.5, 0.0, -100.0, 180.0, 0.0] {
        payload.extend_from_slice(&v.to_le_bytes());
    }
    for v in &profile.pwr_results {
        payload.extend_from_slice(&v.to_le_bytes());
    }
    frame(2198, profile.sender_id, &payload)
}
