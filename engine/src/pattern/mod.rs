//! The public dispatcher contract (§4.6): one [`Pattern`] per connection,
//! wrapping whichever variant the connection's [`Config`] selects behind a
//! single per-connection lock (§5 "Locking discipline").

mod tcp;
mod udp;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use crate::config::{Config, Protocol};
use crate::error::{ConfigError, LatchedError};
use crate::stats::connection_status;
use crate::task::{IoStatus, Task};

pub use tcp::TcpPattern;
pub use udp::UdpPattern;

/// Which end of the connection this pattern instance drives, derived once
/// from `Config::is_listening` at construction (§6.1, §6.2).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
	Server,
	Client,
}

impl Role {
	pub fn from_config(config: &Config) -> Self {
		if config.is_listening {
			Role::Server
		} else {
			Role::Client
		}
	}
}

enum Inner {
	Tcp(TcpPattern),
	Udp(UdpPattern),
}

impl Inner {
	fn initiate_io(&mut self) -> Task {
		match self {
			Inner::Tcp(p) => p.initiate_io(),
			Inner::Udp(p) => p.initiate_io(),
		}
	}

	fn complete_io(&mut self, task: Task, actual_bytes: u32, os_status: u32, data: &[u8]) -> IoStatus {
		match self {
			Inner::Tcp(p) => p.complete_io(task, actual_bytes, os_status, data),
			Inner::Udp(p) => p.complete_io(task, actual_bytes, os_status, data),
		}
	}

	fn set_ideal_send_backlog(&mut self, bytes: u64) {
		match self {
			Inner::Tcp(p) => p.set_ideal_send_backlog(bytes),
			Inner::Udp(p) => p.set_ideal_send_backlog(bytes),
		}
	}

	fn last_error(&self) -> Option<LatchedError> {
		match self {
			Inner::Tcp(p) => p.last_error(),
			Inner::Udp(p) => p.last_error(),
		}
	}
}

/// One connection's pattern state machine, safe to drive from whichever
/// thread an executor's completion callback lands on (§5).
pub struct Pattern {
	inner: Mutex<Inner>,
	/// Guards the one-time publish into `connection_status()` on the first
	/// `complete_io` call that reaches a terminal `IoStatus`.
	outcome_recorded: AtomicBool,
}

impl Pattern {
	/// Validates `config` and builds the variant it selects, dispatching on
	/// `(Protocol, IoPattern)` the way a `(IoPatternType, IsListening)`
	/// factory would.
	pub fn new(config: Config) -> Result<Self, ConfigError> {
		let config = config.validate()?;
		connection_status().connections_attempted.increment();

		let inner = match config.protocol {
			Protocol::Tcp => Inner::Tcp(TcpPattern::new(&config)),
			Protocol::Udp => Inner::Udp(UdpPattern::new(&config)),
		};

		Ok(Self { inner: Mutex::new(inner), outcome_recorded: AtomicBool::new(false) })
	}

	/// Returns the next task for this connection; never blocks.
	pub fn initiate_io(&self) -> Task {
		self.inner.lock().unwrap().initiate_io()
	}

	/// Accepts the outcome of a previously issued task. `data` is the bytes
	/// actually read for a Recv (ignored for a Send); this engine never
	/// touches sockets itself, so it has no other source for "what arrived".
	pub fn complete_io(&self, task: Task, actual_bytes: u32, os_status: u32, data: &[u8]) -> IoStatus {
		let status = self.inner.lock().unwrap().complete_io(task, actual_bytes, os_status, data);

		if status != IoStatus::ContinueIo && !self.outcome_recorded.swap(true, Ordering::SeqCst) {
			match status {
				IoStatus::CompletedIo => connection_status().connections_completed.increment(),
				IoStatus::FailedIo => {
					connection_status().connections_failed.increment();
					if let Some(LatchedError::Protocol(_)) = self.last_pattern_error() {
						connection_status().protocol_errors.increment();
					}
				}
				IoStatus::ContinueIo => unreachable!(),
			}
		}

		status
	}

	/// Updates the credit Pull/Push/Duplex Send scheduling uses; a no-op for
	/// MediaStream, whose Sends are scheduled by frame rate instead (§4.6).
	pub fn set_ideal_send_backlog(&self, bytes: u64) {
		self.inner.lock().unwrap().set_ideal_send_backlog(bytes);
	}

	/// The latched terminal error, if any: an OS error code or one of the
	/// three protocol errors (§4.6 `GetLastPatternError`).
	pub fn last_pattern_error(&self) -> Option<LatchedError> {
		self.inner.lock().unwrap().last_error()
	}

	/// Exposes the process-wide validation buffer's send pool (§4.6
	/// `AccessSharedBuffer`).
	pub fn access_shared_buffer(&self) -> &'static [u8] {
		crate::buffer::ValidationBuffer::get(0).shared()
	}
}
