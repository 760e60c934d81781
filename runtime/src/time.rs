use std::time::{SystemTime, UNIX_EPOCH};

/// Get the UNIX time in milliseconds.
pub fn unix_millis() -> u64 {
	SystemTime::now()
		.duration_since(UNIX_EPOCH)
		.expect("the current time should be after the UNIX epoch")
		.as_millis()
		.try_into()
		.expect("64-bit UNIX millisecond time should not overflow")
}
