//! TCP variants: Pull, Push, PushPull, Duplex (§4.2, §4.3).

use std::time::Instant;

use collections::pool::SlotPool;
use rand::{Rng, SeedableRng};
use rand::rngs::StdRng;

use crate::budget::Budget;
use crate::buffer::{ValidationBuffer, PATTERN_LEN};
use crate::config::{Config, IoPattern, Shutdown};
use crate::error::{LatchedError, PatternError};
use crate::pacer::Pacer;
use crate::pattern::Role;
use crate::stats::TcpConnectionStats;
use crate::task::{Action, BufferRef, BufferType, IoStatus, Task};
use crate::wire::{self, CONNECTION_ID_LEN};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
	ConnectionId,
	DataTransfer,
	Completion,
	/// Client only: the explicit Graceful/Hard shutdown task has been (or is
	/// about to be) issued; its completion decides whether a FIN wait follows.
	ClientShutdown,
	AwaitFin,
	Done,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ShutdownKind {
	Graceful,
	Hard,
}

enum DataIntent {
	Send(u32),
	Recv(u32),
}

struct SimplexVariant {
	is_sender: bool,
	budget: Budget,
}

struct PushPullVariant {
	push_bytes: u32,
	pull_bytes: u32,
	sending: bool,
	intra_segment: u32,
	outstanding: bool,
}

struct DuplexVariant {
	send: Budget,
	recv: Budget,
}

enum Variant {
	Simplex(SimplexVariant),
	PushPull(PushPullVariant),
	Duplex(DuplexVariant),
}

impl Variant {
	/// Builds the variant's bookkeeping, returning the (possibly adjusted)
	/// total transfer size the engine should count against. Only Duplex
	/// adjusts it, rounding up to an even number before splitting in half.
	fn new(config: &Config, role: Role, transfer_size: u64) -> (Self, u64) {
		match config.io_pattern {
			IoPattern::Pull => {
				let is_sender = role == Role::Server;
				(Variant::Simplex(SimplexVariant { is_sender, budget: Budget::new(transfer_size) }), transfer_size)
			}
			IoPattern::Push => {
				let is_sender = role == Role::Client;
				(Variant::Simplex(SimplexVariant { is_sender, budget: Budget::new(transfer_size) }), transfer_size)
			}
			IoPattern::PushPull => {
				let sending = role == Role::Client;
				(
					Variant::PushPull(PushPullVariant {
						push_bytes: config.push_bytes,
						pull_bytes: config.pull_bytes,
						sending,
						intra_segment: 0,
						outstanding: false,
					}),
					transfer_size,
				)
			}
			IoPattern::Duplex => {
				let effective = if transfer_size % 2 != 0 { transfer_size + 1 } else { transfer_size };
				let half = effective / 2;
				(Variant::Duplex(DuplexVariant { send: Budget::new(half), recv: Budget::new(half) }), effective)
			}
			IoPattern::MediaStream => unreachable!("MediaStream connections are built as UdpPattern"),
		}
	}

	fn next_intent(&mut self, buffer_size: u32, recv_slot_available: bool, send_credit: u64) -> Option<DataIntent> {
		let credit_cap = || send_credit.min(u32::MAX as u64) as u32;
		match self {
			Variant::Simplex(s) if s.is_sender => {
				if send_credit == 0 {
					return None;
				}
				match s.budget.claim(buffer_size, credit_cap()) {
					0 => None,
					n => Some(DataIntent::Send(n)),
				}
			}
			Variant::Simplex(s) => {
				if !recv_slot_available {
					return None;
				}
				match s.budget.claim(buffer_size, buffer_size) {
					0 => None,
					n => Some(DataIntent::Recv(n)),
				}
			}
			Variant::PushPull(p) => {
				if p.outstanding {
					return None;
				}
				let segment = if p.sending { p.push_bytes } else { p.pull_bytes };
				let remaining = segment.saturating_sub(p.intra_segment).min(buffer_size);
				if remaining == 0 {
					return None;
				}
				if p.sending {
					if send_credit == 0 {
						return None;
					}
					let len = remaining.min(credit_cap());
					if len == 0 {
						return None;
					}
					p.outstanding = true;
					Some(DataIntent::Send(len))
				} else {
					if !recv_slot_available {
						return None;
					}
					p.outstanding = true;
					Some(DataIntent::Recv(remaining))
				}
			}
			Variant::Duplex(d) => {
				if recv_slot_available && d.recv.remaining() > 0 {
					if let n @ 1.. = d.recv.claim(buffer_size, buffer_size) {
						return Some(DataIntent::Recv(n));
					}
				}
				if send_credit > 0 && d.send.remaining() > 0 {
					if let n @ 1.. = d.send.claim(buffer_size, credit_cap()) {
						return Some(DataIntent::Send(n));
					}
				}
				None
			}
		}
	}

	fn settle(&mut self, was_send: bool, claimed: u32, actual: u32) {
		match self {
			Variant::Simplex(s) => s.budget.settle(claimed, actual),
			Variant::PushPull(p) => {
				p.outstanding = false;
				p.intra_segment += actual;
				let segment = if p.sending { p.push_bytes } else { p.pull_bytes };
				if p.intra_segment >= segment {
					p.sending = !p.sending;
					p.intra_segment = 0;
				}
			}
			Variant::Duplex(d) => {
				if was_send {
					d.send.settle(claimed, actual)
				} else {
					d.recv.settle(claimed, actual)
				}
			}
		}
	}
}

pub struct TcpPattern {
	role: Role,
	phase: Phase,
	variant: Variant,
	shutdown_kind: ShutdownKind,
	transfer_size: u64,
	bytes_transferred: u64,
	buffer_size: u32,
	should_verify_buffers: bool,
	use_shared_buffer: bool,
	shared_recv_in_use: bool,
	send_pattern_offset: usize,
	recv_pattern_offset: usize,
	recv_pool: SlotPool<Vec<u8>>,
	pacer: Pacer,
	send_bytes_in_flight: u64,
	ideal_send_backlog: u64,
	connection_id: [u8; CONNECTION_ID_LEN],
	awaiting_control_completion: bool,
	last_error: Option<LatchedError>,
	validation: &'static ValidationBuffer,
	stats: TcpConnectionStats,
	created_at: Instant,
	started: bool,
}

impl TcpPattern {
	pub fn new(config: &Config) -> Self {
		let role = Role::from_config(config);
		let mut rng = match config.rng_seed {
			Some(seed) => StdRng::seed_from_u64(seed),
			None => StdRng::from_entropy(),
		};

		let buffer_size = config.buffer_size.sample(&mut rng);
		let transfer_size = config.transfer_size.sample(&mut rng);
		let (variant, transfer_size) = Variant::new(config, role, transfer_size);

		let shutdown_kind = match config.shutdown {
			Shutdown::Graceful => ShutdownKind::Graceful,
			Shutdown::Hard => ShutdownKind::Hard,
			Shutdown::Random => {
				if rng.gen_bool(0.5) {
					ShutdownKind::Graceful
				} else {
					ShutdownKind::Hard
				}
			}
		};

		let pre_post_recvs = config.pre_post_recvs() as usize;
		let recv_pool = SlotPool::new(pre_post_recvs, || vec![0u8; buffer_size as usize]);
		let connection_id = wire::connection_id(&mut rng);

		Self {
			role,
			phase: Phase::ConnectionId,
			variant,
			shutdown_kind,
			transfer_size,
			bytes_transferred: 0,
			buffer_size,
			should_verify_buffers: config.should_verify_buffers,
			use_shared_buffer: config.use_shared_buffer,
			shared_recv_in_use: false,
			send_pattern_offset: 0,
			recv_pattern_offset: 0,
			recv_pool,
			pacer: Pacer::new(config.pacing, 0),
			send_bytes_in_flight: 0,
			ideal_send_backlog: config.ideal_send_backlog,
			connection_id,
			awaiting_control_completion: false,
			last_error: None,
			validation: ValidationBuffer::get(buffer_size as usize),
			stats: TcpConnectionStats::new(connection_id),
			created_at: Instant::now(),
			started: false,
		}
	}

	pub fn last_error(&self) -> Option<LatchedError> {
		self.last_error
	}

	pub fn set_ideal_send_backlog(&mut self, bytes: u64) {
		// If draining below the new cap would take time, withhold new sends
		// rather than cancel what is already in flight (design note, Open
		// Questions: behaviour on a mid-connection backlog update).
		self.ideal_send_backlog = bytes;
	}

	fn now_ms(&self) -> u64 {
		self.created_at.elapsed().as_millis() as u64
	}

	fn send_credit(&self) -> u64 {
		let cap = if self.ideal_send_backlog == 0 { self.buffer_size as u64 } else { self.ideal_send_backlog };
		cap.saturating_sub(self.send_bytes_in_flight)
	}

	fn latch(&mut self, error: LatchedError) {
		if self.last_error.is_none() {
			log::warn!(
				"connection {:02x?} failed after {} bytes: {error}",
				self.connection_id,
				self.bytes_transferred
			);
			self.last_error = Some(error);
		}
	}

	fn finish(&mut self, now_ms: u64) -> IoStatus {
		self.phase = Phase::Done;
		self.stats.mark_ended(now_ms);
		if self.last_error.is_some() {
			IoStatus::FailedIo
		} else {
			IoStatus::CompletedIo
		}
	}

	pub fn initiate_io(&mut self) -> Task {
		if !self.started {
			self.stats.mark_started(self.now_ms());
			self.started = true;
		}

		match self.phase {
			Phase::ConnectionId => {
				let payload = self.connection_id_for_role();
				self.next_control_task(BufferType::TcpConnectionId, CONNECTION_ID_LEN, payload)
			}
			Phase::DataTransfer => self.next_data_task(),
			Phase::Completion => {
				let payload = self.completion_for_role();
				self.next_control_task(BufferType::CompletionMessage, CONNECTION_ID_LEN, payload)
			}
			Phase::ClientShutdown => self.next_shutdown_task(),
			Phase::AwaitFin => self.next_fin_task(),
			Phase::Done => Task::none(),
		}
	}

	fn connection_id_for_role(&self) -> Option<[u8; 4]> {
		matches!(self.role, Role::Server).then_some(self.connection_id)
	}

	fn completion_for_role(&self) -> Option<[u8; 4]> {
		matches!(self.role, Role::Server).then_some(wire::COMPLETION_MESSAGE)
	}

	/// Builds the one outstanding control-plane task (connection id or
	/// completion message): a Send carrying `payload` for the role that
	/// originates it, a Recv of `len` bytes for the role that awaits it.
	fn next_control_task(&mut self, buffer_type: BufferType, len: usize, payload: Option<[u8; 4]>) -> Task {
		if self.awaiting_control_completion {
			return Task::none();
		}
		self.awaiting_control_completion = true;
		Task {
			action: if payload.is_some() { Action::Send } else { Action::Recv },
			buffer_ref: BufferRef::Control,
			buffer_offset: 0,
			buffer_length: len,
			expected_pattern_offset: 0,
			buffer_type,
			time_offset_ms: 0,
			track_io: false,
			control_bytes: payload,
		}
	}

	fn next_shutdown_task(&mut self) -> Task {
		if self.awaiting_control_completion {
			return Task::none();
		}
		self.awaiting_control_completion = true;
		let action = match self.shutdown_kind {
			ShutdownKind::Graceful => Action::GracefulShutdown,
			ShutdownKind::Hard => Action::HardShutdown,
		};
		Task {
			action,
			buffer_ref: BufferRef::Control,
			buffer_offset: 0,
			buffer_length: 0,
			expected_pattern_offset: 0,
			buffer_type: BufferType::Dynamic,
			time_offset_ms: 0,
			track_io: false,
			control_bytes: None,
		}
	}

	fn next_fin_task(&mut self) -> Task {
		if self.awaiting_control_completion {
			return Task::none();
		}
		self.awaiting_control_completion = true;
		Task {
			action: Action::Recv,
			buffer_ref: BufferRef::Control,
			buffer_offset: 0,
			buffer_length: 0,
			expected_pattern_offset: 0,
			buffer_type: BufferType::Dynamic,
			time_offset_ms: 0,
			track_io: false,
			control_bytes: None,
		}
	}

	fn next_data_task(&mut self) -> Task {
		let recv_slot_available =
			if self.use_shared_buffer { !self.shared_recv_in_use } else { self.recv_pool.has_available() };
		let credit = self.send_credit();
		match self.variant.next_intent(self.buffer_size, recv_slot_available, credit) {
			None => Task::none(),
			Some(DataIntent::Send(len)) => {
				let offset = self.send_pattern_offset;
				self.send_pattern_offset = (self.send_pattern_offset + len as usize) % PATTERN_LEN;
				self.send_bytes_in_flight += len as u64;
				let now_ms = self.now_ms();
				let time_offset_ms = self.pacer.next_offset_ms(now_ms, len as u64);
				Task {
					action: Action::Send,
					buffer_ref: BufferRef::Shared,
					buffer_offset: offset,
					buffer_length: len as usize,
					expected_pattern_offset: 0,
					buffer_type: BufferType::Static,
					time_offset_ms,
					track_io: true,
					control_bytes: None,
				}
			}
			Some(DataIntent::Recv(len)) => {
				let buffer_ref = if self.use_shared_buffer {
					self.shared_recv_in_use = true;
					BufferRef::SharedRecv
				} else {
					let key = self.recv_pool.borrow().expect("recv_slot_available checked a free slot");
					BufferRef::Slot(key)
				};
				// Reserved in issue order, the same way `send_pattern_offset` is
				// advanced eagerly above: with `prePostRecvs > 1`, a second Recv
				// can be issued before the first completes, and each must get a
				// distinct window rather than both comparing against the same offset.
				let offset = self.recv_pattern_offset;
				self.recv_pattern_offset = (self.recv_pattern_offset + len as usize) % PATTERN_LEN;
				Task {
					action: Action::Recv,
					buffer_ref,
					buffer_offset: 0,
					buffer_length: len as usize,
					expected_pattern_offset: offset,
					buffer_type: BufferType::Dynamic,
					time_offset_ms: 0,
					track_io: true,
					control_bytes: None,
				}
			}
		}
	}

	pub fn complete_io(&mut self, task: Task, actual_bytes: u32, os_status: u32, data: &[u8]) -> IoStatus {
		let now_ms = self.now_ms();

		match task.buffer_ref {
			BufferRef::Slot(key) => self.recv_pool.release(key),
			BufferRef::SharedRecv => self.shared_recv_in_use = false,
			_ => {}
		}

		if os_status != 0 {
			if task.action == Action::Recv && self.phase == Phase::Done {
				return IoStatus::CompletedIo; // benign cancellation after Done
			}
			self.latch(LatchedError::Os(os_status));
			return self.finish(now_ms);
		}

		match self.phase {
			Phase::ConnectionId => {
				self.awaiting_control_completion = false;
				if actual_bytes as usize != CONNECTION_ID_LEN {
					self.latch(LatchedError::Protocol(PatternError::NotAllDataTransferred));
					return self.finish(now_ms);
				}
				self.record_bytes(task.action, actual_bytes);
				self.phase = Phase::DataTransfer;
				IoStatus::ContinueIo
			}
			Phase::DataTransfer => self.handle_data_completion(task, actual_bytes, data),
			Phase::Completion => {
				self.awaiting_control_completion = false;
				if actual_bytes as usize != CONNECTION_ID_LEN {
					self.latch(LatchedError::Protocol(PatternError::NotAllDataTransferred));
					return self.finish(now_ms);
				}
				if task.action == Action::Recv {
					if let Err(err) = verify_completion_message(data, actual_bytes) {
						self.latch(LatchedError::Protocol(err));
						return self.finish(now_ms);
					}
				}
				self.record_bytes(task.action, actual_bytes);
				self.advance_past_completion()
			}
			Phase::ClientShutdown => {
				self.awaiting_control_completion = false;
				match self.shutdown_kind {
					ShutdownKind::Hard => self.finish(now_ms),
					ShutdownKind::Graceful => {
						self.phase = Phase::AwaitFin;
						IoStatus::ContinueIo
					}
				}
			}
			Phase::AwaitFin => {
				self.awaiting_control_completion = false;
				if actual_bytes > 0 {
					self.latch(LatchedError::Protocol(PatternError::TooMuchDataTransferred));
				}
				self.finish(now_ms)
			}
			Phase::Done => IoStatus::CompletedIo,
		}
	}

	/// Folds `actual_bytes` of any completed Send/Recv -- control or tracked
	/// data alike -- into this connection's byte counters (§8 invariant 2:
	/// `bytesSent + 8 == bytesRecv + 8 == transferSize + 8` across a
	/// completed connection, the 8 being the id and completion messages).
	fn record_bytes(&self, action: Action, actual_bytes: u32) {
		match action {
			Action::Send => self.stats.bytes_sent.add(actual_bytes as i64),
			Action::Recv => self.stats.bytes_recv.add(actual_bytes as i64),
			_ => {}
		}
	}

	fn handle_data_completion(&mut self, task: Task, actual_bytes: u32, data: &[u8]) -> IoStatus {
		let now_ms = self.now_ms();
		let was_send = task.action == Action::Send;

		self.record_bytes(task.action, actual_bytes);

		if was_send {
			self.send_bytes_in_flight -= task.buffer_length as u64;
		} else if self.should_verify_buffers {
			let received = &data[..(actual_bytes as usize).min(data.len())];
			if self.validation.verify_at(task.expected_pattern_offset, received).is_err() {
				self.latch(LatchedError::Protocol(PatternError::DataDidNotMatchBitPattern));
				self.variant.settle(was_send, task.buffer_length as u32, actual_bytes);
				return self.finish(now_ms);
			}
		}

		self.variant.settle(was_send, task.buffer_length as u32, actual_bytes);
		self.bytes_transferred += actual_bytes as u64;

		if self.bytes_transferred > self.transfer_size {
			self.latch(LatchedError::Protocol(PatternError::TooMuchDataTransferred));
			return self.finish(now_ms);
		}

		if self.bytes_transferred == self.transfer_size {
			self.phase = Phase::Completion;
		}

		IoStatus::ContinueIo
	}

	fn advance_past_completion(&mut self) -> IoStatus {
		self.phase = match self.role {
			Role::Server => Phase::AwaitFin,
			Role::Client => Phase::ClientShutdown,
		};
		IoStatus::ContinueIo
	}
}

/// Checks a received completion message against `"DONE"`, logging the
/// mismatch at the point of failure and letting the caller fold the result
/// into a latched [`LatchedError`].
fn verify_completion_message(data: &[u8], actual_bytes: u32) -> utils::error::Result<(), PatternError> {
	let actual = &data[..actual_bytes as usize];
	if actual != wire::COMPLETION_MESSAGE {
		log::warn!("completion message mismatch: expected {:02x?}, got {actual:02x?}", wire::COMPLETION_MESSAGE);
		return Err(PatternError::DataDidNotMatchBitPattern);
	}
	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::config::{Config, IoPattern, Shutdown, SizeSpec};

	fn push_config(is_listening: bool, shutdown: Shutdown) -> Config {
		Config {
			io_pattern: IoPattern::Push,
			is_listening,
			buffer_size: SizeSpec::Fixed(10),
			transfer_size: SizeSpec::Fixed(10),
			shutdown,
			..Config::default()
		}
	}

	/// Drives a client/server pair through one full Push connection and
	/// returns the client's trace of `(action, actual_bytes)` pairs alongside
	/// its final `IoStatus`.
	fn run_push(shutdown: Shutdown, corrupt_completion: bool, fin_extra_byte: bool) -> (Vec<(Action, u32)>, IoStatus) {
		let mut server = TcpPattern::new(&push_config(true, shutdown));
		let mut client = TcpPattern::new(&push_config(false, shutdown));
		let mut trace = Vec::new();

		let send_id = server.initiate_io();
		let id = send_id.control_bytes.unwrap();
		server.complete_io(send_id, 4, 0, &[]);
		let recv_id = client.initiate_io();
		trace.push((recv_id.action, 4));
		client.complete_io(recv_id, 4, 0, &id);

		let send_data = client.initiate_io();
		trace.push((send_data.action, 10));
		let region = ValidationBuffer::get(10).sender_region(send_data.buffer_offset, 10).to_vec();
		client.complete_io(send_data, 10, 0, &[]);
		let recv_data = server.initiate_io();
		server.complete_io(recv_data, 10, 0, &region);

		let send_done = server.initiate_io();
		let done = send_done.control_bytes.unwrap();
		server.complete_io(send_done, 4, 0, &[]);
		let recv_done = client.initiate_io();
		trace.push((recv_done.action, 4));
		let mut done_bytes = done;
		if corrupt_completion {
			done_bytes[0] ^= 0xff;
		}
		let status = client.complete_io(recv_done, 4, 0, &done_bytes);
		if corrupt_completion {
			return (trace, status);
		}

		let shutdown_task = client.initiate_io();
		trace.push((shutdown_task.action, 0));
		let status = client.complete_io(shutdown_task, 0, 0, &[]);
		if shutdown == Shutdown::Hard {
			return (trace, status);
		}

		let fin = client.initiate_io();
		let fin_bytes = if fin_extra_byte { 1 } else { 0 };
		trace.push((fin.action, fin_bytes));
		let status = client.complete_io(fin, fin_bytes, 0, &[]);
		(trace, status)
	}

	#[test]
	fn scenario_1_graceful_push_completes() {
		let (_, status) = run_push(Shutdown::Graceful, false, false);
		assert_eq!(status, IoStatus::CompletedIo);
	}

	#[test]
	fn scenario_2_hard_push_completes_without_fin_wait() {
		let (trace, status) = run_push(Shutdown::Hard, false, false);
		assert_eq!(trace.last(), Some(&(Action::HardShutdown, 0)));
		assert_eq!(status, IoStatus::CompletedIo);
	}

	#[test]
	fn scenario_3_server_abort_at_completion_fails_with_not_all_data() {
		let mut server = TcpPattern::new(&push_config(true, Shutdown::Graceful));
		let mut client = TcpPattern::new(&push_config(false, Shutdown::Graceful));

		let send_id = server.initiate_io();
		let id = send_id.control_bytes.unwrap();
		server.complete_io(send_id, 4, 0, &[]);
		let recv_id = client.initiate_io();
		client.complete_io(recv_id, 4, 0, &id);

		let send_data = client.initiate_io();
		client.complete_io(send_data, 10, 0, &[]);

		let recv_done = client.initiate_io();
		let status = client.complete_io(recv_done, 0, 0, &[]);
		assert_eq!(status, IoStatus::FailedIo);
		assert_eq!(client.last_error(), Some(LatchedError::Protocol(PatternError::NotAllDataTransferred)));
	}

	#[test]
	fn scenario_4_fin_with_extra_byte_fails_with_too_much_data() {
		let (_, status) = run_push(Shutdown::Graceful, false, true);
		assert_eq!(status, IoStatus::FailedIo);
	}

	#[test]
	fn scenario_5_corrupt_completion_message_fails_pattern_match() {
		let (_, status) = run_push(Shutdown::Graceful, true, false);
		assert_eq!(status, IoStatus::FailedIo);
	}

	#[test]
	fn scenario_6_pull_verify_advances_pattern_offset_by_segment() {
		let config = Config {
			io_pattern: IoPattern::Pull,
			buffer_size: SizeSpec::Fixed(1024),
			transfer_size: SizeSpec::Fixed(10_240),
			should_verify_buffers: true,
			..Config::default()
		};
		let mut server = TcpPattern::new(&Config { is_listening: true, ..config });
		let mut client = TcpPattern::new(&Config { is_listening: false, ..config });

		let send_id = server.initiate_io();
		let id = send_id.control_bytes.unwrap();
		server.complete_io(send_id, 4, 0, &[]);
		let recv_id = client.initiate_io();
		client.complete_io(recv_id, 4, 0, &id);

		for i in 0..10 {
			let recv = client.initiate_io();
			assert_eq!(recv.expected_pattern_offset, i * 1024);
			let send = server.initiate_io();
			let region = ValidationBuffer::get(1024).sender_region(send.buffer_offset, 1024).to_vec();
			server.complete_io(send, 1024, 0, &[]);
			let status = client.complete_io(recv, 1024, 0, &region);
			assert_eq!(status, IoStatus::ContinueIo);
		}

		assert_eq!(client.recv_pattern_offset, 10 * 1024 % PATTERN_LEN);
	}

	#[test]
	fn boundary_buffer_larger_than_transfer_size_yields_one_task() {
		let config = Config {
			io_pattern: IoPattern::Push,
			is_listening: false,
			buffer_size: SizeSpec::Fixed(4096),
			transfer_size: SizeSpec::Fixed(1),
			..Config::default()
		};
		let mut client = TcpPattern::new(&config);
		client.phase = Phase::DataTransfer;
		let task = client.initiate_io();
		assert_eq!(task.action, Action::Send);
		assert_eq!(task.buffer_length, 1);
	}

	#[test]
	fn duplex_splits_transfer_size_in_half_rounded_up_to_even() {
		let config = Config { io_pattern: IoPattern::Duplex, transfer_size: SizeSpec::Fixed(9), ..Config::default() };
		let (variant, effective) = Variant::new(&config, Role::Client, 9);
		assert_eq!(effective, 10);
		match variant {
			Variant::Duplex(d) => {
				assert_eq!(d.send.remaining(), 5);
				assert_eq!(d.recv.remaining(), 5);
			}
			_ => panic!("expected Duplex variant"),
		}
	}

	#[test]
	fn push_pull_toggles_direction_once_a_segment_completes() {
		let variant = PushPullVariant { push_bytes: 4, pull_bytes: 4, sending: true, intra_segment: 0, outstanding: false };
		let mut v = Variant::PushPull(variant);
		assert!(matches!(v.next_intent(8, true, 8), Some(DataIntent::Send(4))));

		v.settle(true, 4, 4);
		match v {
			Variant::PushPull(p) => {
				assert!(!p.sending);
				assert_eq!(p.intra_segment, 0);
			}
			_ => unreachable!(),
		}
	}
}
