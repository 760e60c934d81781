//! Rate & Burst Pacer (§4.4): computes `timeOffsetMs` for Send tasks.

use crate::config::{BurstConfig, PacingConfig, RateConfig};

/// Fixed-duration quantum byte-rate limiter.
pub struct RateLimiter {
	bytes_per_quantum: u64,
	period_ms: u64,
	bytes_sending_this_quantum: u64,
	quantum_start_ms: u64,
}

impl RateLimiter {
	pub fn new(config: RateConfig, now_ms: u64) -> Self {
		Self {
			bytes_per_quantum: config.bytes_per_second * config.period_ms / 1000,
			period_ms: config.period_ms,
			bytes_sending_this_quantum: 0,
			quantum_start_ms: now_ms,
		}
	}

	/// Returns the delay, in milliseconds, before a send of `buffer_len`
	/// bytes starting at `now_ms` may be issued.
	pub fn next_offset_ms(&mut self, now_ms: u64, buffer_len: u64) -> u64 {
		if self.bytes_sending_this_quantum < self.bytes_per_quantum {
			self.bytes_sending_this_quantum += buffer_len;

			if now_ms > self.quantum_start_ms + self.period_ms {
				let quantums_skipped = (now_ms - self.quantum_start_ms) / self.period_ms;
				self.quantum_start_ms += quantums_skipped * self.period_ms;
				let bytes_to_adjust = self.bytes_per_quantum * quantums_skipped;
				self.bytes_sending_this_quantum = self.bytes_sending_this_quantum.saturating_sub(bytes_to_adjust);
			}

			0
		} else {
			let quantums_ahead = self.bytes_sending_this_quantum / self.bytes_per_quantum;
			let remaining_in_current_quantum = (self.quantum_start_ms + self.period_ms).saturating_sub(now_ms);
			let offset = (quantums_ahead - 1) * self.period_ms + remaining_in_current_quantum;

			self.quantum_start_ms += quantums_ahead * self.period_ms;
			self.bytes_sending_this_quantum -= self.bytes_per_quantum * quantums_ahead;
			self.bytes_sending_this_quantum += buffer_len;

			offset
		}
	}
}

/// Burst-count / burst-delay pacer: admits `count` consecutive sends with no
/// delay, then delays the one that exhausts the burst before resetting.
pub struct BurstPacer {
	count: u32,
	delay_ms: u32,
	remaining: u32,
}

impl BurstPacer {
	pub fn new(config: BurstConfig) -> Self {
		Self { count: config.count, delay_ms: config.delay_ms, remaining: config.count }
	}

	pub fn next_offset_ms(&mut self) -> u64 {
		if self.remaining == 0 {
			self.remaining = self.count;
		}
		self.remaining -= 1;
		if self.remaining == 0 {
			self.delay_ms as u64
		} else {
			0
		}
	}
}

/// The pacing policy in effect for a connection: at most one of rate
/// limiting or burst pacing, never both (§8 invariant 4).
pub enum Pacer {
	None,
	Rate(RateLimiter),
	Burst(BurstPacer),
}

impl Pacer {
	pub fn new(pacing: PacingConfig, now_ms: u64) -> Self {
		match (pacing.rate, pacing.burst) {
			(Some(rate), None) => Pacer::Rate(RateLimiter::new(rate, now_ms)),
			(None, Some(burst)) => Pacer::Burst(BurstPacer::new(burst)),
			(None, None) => Pacer::None,
			(Some(_), Some(_)) => unreachable!("Config::validate rejects rate and burst together"),
		}
	}

	pub fn next_offset_ms(&mut self, now_ms: u64, buffer_len: u64) -> u64 {
		match self {
			Pacer::None => 0,
			Pacer::Rate(limiter) => limiter.next_offset_ms(now_ms, buffer_len),
			Pacer::Burst(burst) => burst.next_offset_ms(),
		}
	}
}
