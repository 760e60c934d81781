//! Lock-free statistics counters (§3 "Statistics Counters", §4.5).

use std::sync::atomic::{AtomicI64, Ordering};

/// A single atomic 64-bit counter, sequentially consistent between writers
/// and the one reader of a snapshot.
#[derive(Default)]
pub struct Counter(AtomicI64);

impl Counter {
	pub const fn new() -> Self {
		Self(AtomicI64::new(0))
	}

	pub fn add(&self, delta: i64) {
		self.0.fetch_add(delta, Ordering::SeqCst);
	}

	pub fn increment(&self) {
		self.add(1);
	}

	pub fn get(&self) -> i64 {
		self.0.load(Ordering::SeqCst)
	}

	/// Sets the counter to `value` only if it currently reads zero. Returns
	/// `true` if this call performed the write, so the caller can detect
	/// "first writer wins" without a separate flag.
	pub fn set_if_zero(&self, value: i64) -> bool {
		self.0.compare_exchange(0, value, Ordering::SeqCst, Ordering::SeqCst).is_ok()
	}

	/// Reads the counter, optionally zeroing it atomically in the same step.
	pub fn snap(&self, clear: bool) -> i64 {
		if clear {
			self.0.swap(0, Ordering::SeqCst)
		} else {
			self.get()
		}
	}
}

/// Per-connection TCP counters.
pub struct TcpConnectionStats {
	pub bytes_sent: Counter,
	pub bytes_recv: Counter,
	pub start_time: Counter,
	pub end_time: Counter,
	pub connection_id: [u8; 4],
	published: Counter,
}

impl TcpConnectionStats {
	pub fn new(connection_id: [u8; 4]) -> Self {
		Self {
			bytes_sent: Counter::new(),
			bytes_recv: Counter::new(),
			start_time: Counter::new(),
			end_time: Counter::new(),
			connection_id,
			published: Counter::new(),
		}
	}

	pub fn mark_started(&self, now_ms: u64) {
		self.start_time.set_if_zero(now_ms as i64);
	}

	/// Sets `end_time` once, and on that first write merges this
	/// connection's counters into the process-wide aggregate.
	pub fn mark_ended(&self, now_ms: u64) {
		if self.end_time.set_if_zero(now_ms as i64) && self.published.set_if_zero(1) {
			tcp_status().bytes_sent.add(self.bytes_sent.get());
			tcp_status().bytes_recv.add(self.bytes_recv.get());
		}
	}
}

/// Per-connection UDP MediaStream counters.
pub struct UdpConnectionStats {
	pub bits_received: Counter,
	pub successful_frames: Counter,
	pub dropped_frames: Counter,
	pub duplicate_frames: Counter,
	pub error_frames: Counter,
	pub start_time: Counter,
	pub end_time: Counter,
	pub connection_id: [u8; 4],
	published: Counter,
}

impl UdpConnectionStats {
	pub fn new(connection_id: [u8; 4]) -> Self {
		Self {
			bits_received: Counter::new(),
			successful_frames: Counter::new(),
			dropped_frames: Counter::new(),
			duplicate_frames: Counter::new(),
			error_frames: Counter::new(),
			start_time: Counter::new(),
			end_time: Counter::new(),
			connection_id,
			published: Counter::new(),
		}
	}

	pub fn mark_started(&self, now_ms: u64) {
		self.start_time.set_if_zero(now_ms as i64);
	}

	pub fn mark_ended(&self, now_ms: u64) {
		if self.end_time.set_if_zero(now_ms as i64) && self.published.set_if_zero(1) {
			udp_status().bits_received.add(self.bits_received.get());
			udp_status().successful_frames.add(self.successful_frames.get());
			udp_status().dropped_frames.add(self.dropped_frames.get());
			udp_status().duplicate_frames.add(self.duplicate_frames.get());
			udp_status().error_frames.add(self.error_frames.get());
		}
	}
}

/// A point-in-time read of [`TcpStatusDetails`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TcpStatusSnapshot {
	pub bytes_sent: i64,
	pub bytes_recv: i64,
}

/// Process-wide TCP byte aggregate.
#[derive(Default)]
pub struct TcpStatusDetails {
	pub bytes_sent: Counter,
	pub bytes_recv: Counter,
}

impl TcpStatusDetails {
	/// Reads every counter, optionally zeroing each in the same step: the
	/// window since the last snap.
	pub fn snap(&self, clear: bool) -> TcpStatusSnapshot {
		TcpStatusSnapshot { bytes_sent: self.bytes_sent.snap(clear), bytes_recv: self.bytes_recv.snap(clear) }
	}
}

/// A point-in-time read of [`UdpStatusDetails`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UdpStatusSnapshot {
	pub bits_received: i64,
	pub successful_frames: i64,
	pub dropped_frames: i64,
	pub duplicate_frames: i64,
	pub error_frames: i64,
}

/// Process-wide UDP frame-classification aggregate.
#[derive(Default)]
pub struct UdpStatusDetails {
	pub bits_received: Counter,
	pub successful_frames: Counter,
	pub dropped_frames: Counter,
	pub duplicate_frames: Counter,
	pub error_frames: Counter,
}

impl UdpStatusDetails {
	pub fn snap(&self, clear: bool) -> UdpStatusSnapshot {
		UdpStatusSnapshot {
			bits_received: self.bits_received.snap(clear),
			successful_frames: self.successful_frames.snap(clear),
			dropped_frames: self.dropped_frames.snap(clear),
			duplicate_frames: self.duplicate_frames.snap(clear),
			error_frames: self.error_frames.snap(clear),
		}
	}
}

/// A point-in-time read of [`ConnectionStatusDetails`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConnectionStatusSnapshot {
	pub connections_attempted: i64,
	pub connections_completed: i64,
	pub connections_failed: i64,
	pub protocol_errors: i64,
}

/// Process-wide connection lifecycle / completion-outcome aggregate.
#[derive(Default)]
pub struct ConnectionStatusDetails {
	pub connections_attempted: Counter,
	pub connections_completed: Counter,
	pub connections_failed: Counter,
	pub protocol_errors: Counter,
}

impl ConnectionStatusDetails {
	pub fn snap(&self, clear: bool) -> ConnectionStatusSnapshot {
		ConnectionStatusSnapshot {
			connections_attempted: self.connections_attempted.snap(clear),
			connections_completed: self.connections_completed.snap(clear),
			connections_failed: self.connections_failed.snap(clear),
			protocol_errors: self.protocol_errors.snap(clear),
		}
	}
}

static TCP_STATUS: TcpStatusDetails = TcpStatusDetails { bytes_sent: Counter::new(), bytes_recv: Counter::new() };
static UDP_STATUS: UdpStatusDetails = UdpStatusDetails {
	bits_received: Counter::new(),
	successful_frames: Counter::new(),
	dropped_frames: Counter::new(),
	duplicate_frames: Counter::new(),
	error_frames: Counter::new(),
};
static CONNECTION_STATUS: ConnectionStatusDetails = ConnectionStatusDetails {
	connections_attempted: Counter::new(),
	connections_completed: Counter::new(),
	connections_failed: Counter::new(),
	protocol_errors: Counter::new(),
};

pub fn tcp_status() -> &'static TcpStatusDetails {
	&TCP_STATUS
}

pub fn udp_status() -> &'static UdpStatusDetails {
	&UDP_STATUS
}

pub fn connection_status() -> &'static ConnectionStatusDetails {
	&CONNECTION_STATUS
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn snap_without_clear_does_not_change_counter() {
		let counter = Counter::new();
		counter.add(42);
		assert_eq!(counter.snap(false), 42);
		assert_eq!(counter.get(), 42);
	}

	#[test]
	fn two_consecutive_clearing_snaps_second_is_zero_delta() {
		let counter = Counter::new();
		counter.add(7);
		assert_eq!(counter.snap(true), 7);
		assert_eq!(counter.snap(true), 0);
	}

	#[test]
	fn set_if_zero_only_writes_once() {
		let counter = Counter::new();
		assert!(counter.set_if_zero(100));
		assert!(!counter.set_if_zero(200));
		assert_eq!(counter.get(), 100);
	}

	#[test]
	fn mark_ended_publishes_to_process_aggregate_exactly_once() {
		let before = tcp_status().bytes_sent.get();
		let stats = TcpConnectionStats::new(*b"abcd");
		stats.bytes_sent.add(10);
		stats.mark_ended(1000);
		stats.mark_ended(2000);
		assert_eq!(tcp_status().bytes_sent.get(), before + 10);
	}

	#[test]
	fn tcp_status_snap_clears_both_fields_together() {
		let details = TcpStatusDetails::default();
		details.bytes_sent.add(10);
		details.bytes_recv.add(3);
		assert_eq!(details.snap(true), TcpStatusSnapshot { bytes_sent: 10, bytes_recv: 3 });
		assert_eq!(details.snap(true), TcpStatusSnapshot::default());
	}

	#[test]
	fn udp_status_snap_without_clear_leaves_counters_readable_again() {
		let details = UdpStatusDetails::default();
		details.successful_frames.add(5);
		details.dropped_frames.add(1);
		let first = details.snap(false);
		let second = details.snap(false);
		assert_eq!(first, second);
		assert_eq!(first.successful_frames, 5);
		assert_eq!(first.dropped_frames, 1);
	}

	#[test]
	fn connection_status_snap_reports_the_window_since_the_last_snap() {
		let details = ConnectionStatusDetails::default();
		details.connections_attempted.add(4);
		details.connections_completed.add(2);
		assert_eq!(details.snap(true).connections_attempted, 4);
		details.connections_attempted.add(1);
		assert_eq!(details.snap(true).connections_attempted, 1);
	}
}
