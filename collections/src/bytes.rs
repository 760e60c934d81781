use std::sync::Arc;

/// An immutable byte region built by tiling a fixed-size pattern until it
/// covers `pattern_len + tail_len` bytes.
///
/// Any contiguous window of length `<= tail_len` starting at an offset in
/// `[0, pattern_len)` can be read out without copying, since the tiling
/// guarantees the pattern repeats past the nominal end of the buffer.
#[derive(Clone)]
pub struct PatternPool {
	bytes: Arc<[u8]>,
	pattern_len: usize,
}

impl PatternPool {
	/// Builds a pool of length `pattern.len() + tail_len` by repeating `pattern`.
	pub fn tile(pattern: &[u8], tail_len: usize) -> Self {
		let pattern_len = pattern.len();
		let mut bytes = Vec::with_capacity(pattern_len + tail_len);

		while bytes.len() < pattern_len + tail_len {
			let remaining = pattern_len + tail_len - bytes.len();
			bytes.extend_from_slice(&pattern[..remaining.min(pattern_len)]);
		}

		Self { bytes: bytes.into(), pattern_len }
	}

	/// The length of the base pattern before tiling.
	pub fn pattern_len(&self) -> usize {
		self.pattern_len
	}

	/// Returns the `len` bytes starting at `offset`.
	///
	/// # Panics
	/// Panics if `offset >= pattern_len()` or `offset + len` runs past the
	/// tiled buffer -- both are caller invariants, not runtime conditions.
	pub fn region(&self, offset: usize, len: usize) -> &[u8] {
		assert!(offset < self.pattern_len, "offset {offset} is not within one pattern period");
		&self.bytes[offset..offset + len]
	}
}
