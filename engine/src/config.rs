//! Engine-facing configuration (§6.3) and its startup-only validation.

use rand::Rng;

use crate::error::ConfigError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Protocol {
	Tcp,
	Udp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IoPattern {
	Pull,
	Push,
	PushPull,
	Duplex,
	MediaStream,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shutdown {
	Graceful,
	Hard,
	/// Resolved to `Graceful` or `Hard` once per connection, from `Config::rng_seed`.
	Random,
}

/// A fixed size, or a `[low, high]` range sampled uniformly per connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeSpec<T> {
	Fixed(T),
	Range(T, T),
}

impl SizeSpec<u32> {
	fn validate(self) -> Result<(), ConfigError> {
		let (low, high) = match self {
			Self::Fixed(v) => (v, v),
			Self::Range(low, high) => (low, high),
		};
		if high < low {
			return Err(ConfigError::InvalidRange { low: low as u64, high: high as u64 });
		}
		if low == 0 {
			return Err(ConfigError::ZeroBufferSize);
		}
		Ok(())
	}

	pub fn max(self) -> u32 {
		match self {
			Self::Fixed(v) => v,
			Self::Range(_, high) => high,
		}
	}

	pub fn sample(self, rng: &mut impl Rng) -> u32 {
		match self {
			Self::Fixed(v) => v,
			Self::Range(low, high) => rng.gen_range(low..=high),
		}
	}
}

impl SizeSpec<u64> {
	fn validate(self) -> Result<(), ConfigError> {
		let (low, high) = match self {
			Self::Fixed(v) => (v, v),
			Self::Range(low, high) => (low, high),
		};
		if high < low {
			return Err(ConfigError::InvalidRange { low, high });
		}
		Ok(())
	}

	pub fn sample(self, rng: &mut impl Rng) -> u64 {
		match self {
			Self::Fixed(v) => v,
			Self::Range(low, high) => rng.gen_range(low..=high),
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BurstConfig {
	pub count: u32,
	pub delay_ms: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateConfig {
	pub bytes_per_second: u64,
	pub period_ms: u64,
}

impl Default for RateConfig {
	fn default() -> Self {
		Self { bytes_per_second: 0, period_ms: 100 }
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PacingConfig {
	pub burst: Option<BurstConfig>,
	pub rate: Option<RateConfig>,
}

impl PacingConfig {
	fn validate(&self) -> Result<(), ConfigError> {
		if self.burst.is_some() && self.rate.is_some() {
			return Err(ConfigError::RateAndBurstBothConfigured);
		}
		if let Some(rate) = self.rate {
			let bytes_per_quantum = rate.bytes_per_second * rate.period_ms / 1000;
			if bytes_per_quantum < 1 {
				return Err(ConfigError::BytesPerQuantumTooSmall);
			}
		}
		Ok(())
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MediaStreamConfig {
	pub frames_per_second: u32,
	pub frame_size_bytes: u32,
	pub stream_length_seconds: u32,
	pub buffer_depth_seconds: u32,
}

#[derive(Debug, Clone, Copy)]
pub struct Config {
	pub protocol: Protocol,
	pub io_pattern: IoPattern,
	pub is_listening: bool,
	pub buffer_size: SizeSpec<u32>,
	pub transfer_size: SizeSpec<u64>,
	pub pre_post_recvs: Option<u32>,
	pub ideal_send_backlog: u64,
	pub push_bytes: u32,
	pub pull_bytes: u32,
	pub pacing: PacingConfig,
	pub should_verify_buffers: bool,
	pub use_shared_buffer: bool,
	pub shutdown: Shutdown,
	pub media: Option<MediaStreamConfig>,
	pub rng_seed: Option<u64>,
}

impl Default for Config {
	fn default() -> Self {
		Self {
			protocol: Protocol::Tcp,
			io_pattern: IoPattern::Pull,
			is_listening: false,
			buffer_size: SizeSpec::Fixed(65_536),
			transfer_size: SizeSpec::Fixed(1_048_576),
			pre_post_recvs: None,
			ideal_send_backlog: 0,
			push_bytes: 0,
			pull_bytes: 0,
			pacing: PacingConfig::default(),
			should_verify_buffers: false,
			use_shared_buffer: false,
			shutdown: Shutdown::Graceful,
			media: None,
			rng_seed: None,
		}
	}
}

impl Config {
	/// Rejects invalid configuration combinations at startup. Never called
	/// after a `Pattern` is constructed.
	pub fn validate(self) -> Result<Self, ConfigError> {
		if self.should_verify_buffers && self.use_shared_buffer {
			return Err(ConfigError::VerifyBuffersWithSharedBuffer);
		}
		self.buffer_size.validate()?;
		self.transfer_size.validate()?;
		self.pacing.validate()?;
		Ok(self)
	}

	/// Concurrent receives to keep outstanding: the configured value, or the
	/// protocol default (1 TCP, 2 UDP) when unset.
	pub fn pre_post_recvs(&self) -> u32 {
		self.pre_post_recvs.unwrap_or(match self.protocol {
			Protocol::Tcp => 1,
			Protocol::Udp => 2,
		})
	}

	pub fn max_buffer_size(&self) -> usize {
		self.buffer_size.max() as usize
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn rejects_verify_with_shared_buffer() {
		let config = Config { should_verify_buffers: true, use_shared_buffer: true, ..Config::default() };
		assert_eq!(config.validate().unwrap_err(), ConfigError::VerifyBuffersWithSharedBuffer);
	}

	#[test]
	fn rejects_rate_and_burst_together() {
		let config = Config {
			pacing: PacingConfig {
				burst: Some(BurstConfig { count: 4, delay_ms: 10 }),
				rate: Some(RateConfig { bytes_per_second: 1000, period_ms: 100 }),
			},
			..Config::default()
		};
		assert_eq!(config.validate().unwrap_err(), ConfigError::RateAndBurstBothConfigured);
	}

	#[test]
	fn rejects_inverted_range() {
		let config = Config { buffer_size: SizeSpec::Range(100, 10), ..Config::default() };
		assert_eq!(config.validate().unwrap_err(), ConfigError::InvalidRange { low: 100, high: 10 });
	}

	#[test]
	fn rejects_zero_buffer_size() {
		let config = Config { buffer_size: SizeSpec::Fixed(0), ..Config::default() };
		assert_eq!(config.validate().unwrap_err(), ConfigError::ZeroBufferSize);
	}

	#[test]
	fn rejects_undersized_quantum() {
		let config = Config {
			pacing: PacingConfig { rate: Some(RateConfig { bytes_per_second: 5, period_ms: 100 }), burst: None },
			..Config::default()
		};
		assert_eq!(config.validate().unwrap_err(), ConfigError::BytesPerQuantumTooSmall);
	}

	#[test]
	fn default_pre_post_recvs_differs_by_protocol() {
		let tcp = Config { protocol: Protocol::Tcp, ..Config::default() };
		let udp = Config { protocol: Protocol::Udp, ..Config::default() };
		assert_eq!(tcp.pre_post_recvs(), 1);
		assert_eq!(udp.pre_post_recvs(), 2);
	}
}
