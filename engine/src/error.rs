use core::fmt;

/// The three protocol-level errors the engine can latch, distinguished from
/// an OS-level transport error. The original engine reserves a numeric band
/// near `MAXINT` for these; a plain enum carries the same distinction
/// without asking callers to compare against magic constants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternError {
	/// The connection ended with `bytes_transferred < transfer_size`.
	NotAllDataTransferred,
	/// A data-phase or FIN completion carried more bytes than expected.
	TooMuchDataTransferred,
	/// A verified Recv observed bytes differing from the canonical pattern.
	DataDidNotMatchBitPattern,
}

impl fmt::Display for PatternError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let s = match self {
			Self::NotAllDataTransferred => "not all data was transferred before the connection ended",
			Self::TooMuchDataTransferred => "more data was transferred than the connection's transfer size allows",
			Self::DataDidNotMatchBitPattern => "received data did not match the validation bit pattern",
		};
		f.write_str(s)
	}
}

/// The latched terminal error for a connection: either an OS error code
/// reported verbatim by the executor, or one of the three protocol errors
/// raised internally by the state machine. The first one latched wins; see
/// [`crate::pattern::Pattern::last_pattern_error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LatchedError {
	/// A nonzero status code reported by the executor for a Send/Recv.
	Os(u32),
	/// An error raised by the pattern engine itself.
	Protocol(PatternError),
}

impl fmt::Display for LatchedError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Os(code) => write!(f, "OS error {code}"),
			Self::Protocol(err) => write!(f, "{err}"),
		}
	}
}

/// Startup-only configuration validation failures. Never raised once a
/// [`crate::pattern::Pattern`] has been constructed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
	/// `should_verify_buffers` and `use_shared_buffer` were both set.
	VerifyBuffersWithSharedBuffer,
	/// Both a rate limit and a burst/delay policy were configured.
	RateAndBurstBothConfigured,
	/// A `[low, high]` range had `high < low`.
	InvalidRange { low: u64, high: u64 },
	/// A configured buffer size was zero.
	ZeroBufferSize,
	/// `bytes_per_second * period_ms / 1000` rounded down to zero.
	BytesPerQuantumTooSmall,
}

impl fmt::Display for ConfigError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::VerifyBuffersWithSharedBuffer => f.write_str("shouldVerifyBuffers cannot be combined with useSharedBuffer"),
			Self::RateAndBurstBothConfigured => f.write_str("rate limiting and burst pacing are mutually exclusive"),
			Self::InvalidRange { low, high } => write!(f, "range has high ({high}) < low ({low})"),
			Self::ZeroBufferSize => f.write_str("buffer size must be at least 1 byte"),
			Self::BytesPerQuantumTooSmall => f.write_str("bytesPerSecond * period / 1000 must be at least 1"),
		}
	}
}

impl std::error::Error for ConfigError {}
