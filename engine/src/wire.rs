//! Constants for the small set of non-data bytes the wire protocols exchange.

use rand::Rng;

pub const CONNECTION_ID_LEN: usize = 4;

/// `"DONE"` in ASCII, sent once by the data sender after all tracked bytes.
pub const COMPLETION_MESSAGE: [u8; 4] = *b"DONE";

/// Derives an opaque 4-byte connection identifier. The original leaves the
/// exact encoding implementation-defined ("e.g., 8 hex chars truncated"); we
/// take the first 4 ASCII hex digits of a random `u32`, which keeps the
/// value printable in logs without claiming any meaning beyond uniqueness.
pub fn connection_id(rng: &mut impl Rng) -> [u8; CONNECTION_ID_LEN] {
	let hex = format!("{:08x}", rng.gen::<u32>());
	let bytes = hex.as_bytes();
	[bytes[0], bytes[1], bytes[2], bytes[3]]
}

/// Datagram-class flag for the UDP MediaStream header (§6.2). The spec
/// leaves the exact flag encoding an open question for implementers to
/// confirm against a known-good peer; these values are this engine's own
/// choice, kept internally consistent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum DatagramClass {
	Data = 0,
	Start = 1,
}

/// Length of a MediaStream data datagram's header: 2-byte flag + 4-byte
/// little-endian frame sequence number.
pub const MEDIA_HEADER_LEN: usize = 6;

pub fn encode_data_header(frame_index: u32) -> [u8; MEDIA_HEADER_LEN] {
	let mut header = [0u8; MEDIA_HEADER_LEN];
	header[0..2].copy_from_slice(&(DatagramClass::Data as u16).to_le_bytes());
	header[2..6].copy_from_slice(&frame_index.to_le_bytes());
	header
}

pub fn encode_start_header() -> [u8; 2] {
	(DatagramClass::Start as u16).to_le_bytes()
}
