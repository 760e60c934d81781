//! The process-wide validation buffer (§4.1).

use std::sync::OnceLock;

use collections::bytes::PatternPool;

/// Length of the canonical repeating pattern.
pub const PATTERN_LEN: usize = 65_536;

/// The byte offset of the first divergence found by [`ValidationBuffer::verify_at`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MismatchAt(pub usize);

/// A process-wide, read-only, 64KiB-repeating byte pattern: the canonical
/// send payload and the comparand for every verified recv.
///
/// Built once behind [`ValidationBuffer::get`]'s call-once barrier; later
/// calls with a different `max_buffer_size` are ignored, per the design
/// note that configuration must never re-initialise process-wide state.
pub struct ValidationBuffer {
	pool: PatternPool,
}

static INSTANCE: OnceLock<ValidationBuffer> = OnceLock::new();

impl ValidationBuffer {
	/// Returns the process-wide instance, building it on first call so its
	/// send pool covers buffers up to `max_buffer_size` bytes.
	pub fn get(max_buffer_size: usize) -> &'static ValidationBuffer {
		INSTANCE.get_or_init(|| Self::build(max_buffer_size))
	}

	fn build(max_buffer_size: usize) -> Self {
		let mut pattern = vec![0u8; PATTERN_LEN];
		for k in 0..(PATTERN_LEN / 2) {
			let word = (k as u16).to_le_bytes();
			pattern[2 * k] = word[0];
			pattern[2 * k + 1] = word[1];
		}
		Self { pool: PatternPool::tile(&pattern, max_buffer_size) }
	}

	/// Returns the slice `[offset, offset+length)` of the send pool.
	///
	/// # Panics
	/// Panics if `offset >= 65,536` or `length` runs past the pool built by
	/// `get` -- both are caller invariants (`offset` comes from a
	/// `recvPatternOffset`/`sendPatternOffset` the engine itself maintains
	/// mod 65,536, and `length` is bounded by the configured buffer size).
	pub fn sender_region(&self, offset: usize, length: usize) -> &[u8] {
		self.pool.region(offset, length)
	}

	/// Whether `buf` equals the canonical pattern at `offset mod 65,536`.
	pub fn matches(&self, offset: usize, buf: &[u8]) -> bool {
		self.verify_at(offset % PATTERN_LEN, buf).is_ok()
	}

	/// Compares `buf` against the canonical pattern at `offset mod 65,536`,
	/// reporting the index of the first mismatch if any.
	pub fn verify_at(&self, offset: usize, buf: &[u8]) -> Result<(), MismatchAt> {
		let offset = offset % PATTERN_LEN;
		let expected = self.pool.region(offset, buf.len());
		for (i, (a, b)) in expected.iter().zip(buf.iter()).enumerate() {
			if a != b {
				return Err(MismatchAt(i));
			}
		}
		Ok(())
	}

	/// Exposes the whole send pool, for `AccessSharedBuffer`.
	pub fn shared(&self) -> &[u8] {
		self.pool.region(0, self.pool.pattern_len())
	}
}
