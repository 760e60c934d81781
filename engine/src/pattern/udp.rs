//! UDP MediaStream (§4.3, §6.2). Only the server half is fully driven; the
//! client half is an explicit out-of-scope stub, kept just coherent enough
//! to satisfy the dispatcher contract's state-machine invariants.

use std::time::Instant;

use rand::{Rng, SeedableRng};
use rand::rngs::StdRng;

use crate::buffer::{ValidationBuffer, PATTERN_LEN};
use crate::config::Config;
use crate::error::{LatchedError, PatternError};
use crate::pattern::Role;
use crate::stats::UdpConnectionStats;
use crate::task::{Action, BufferRef, BufferType, IoStatus, Task};
use crate::wire::{self, CONNECTION_ID_LEN};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
	/// Server: awaiting the client's START message. Client: about to send it.
	AwaitStart,
	IoStarted,
	Done,
}

pub struct UdpPattern {
	role: Role,
	phase: Phase,
	connection_id: [u8; CONNECTION_ID_LEN],
	awaiting_control_completion: bool,

	frames_per_second: u32,
	frame_size_bytes: u32,
	total_frames: u32,
	max_frames_in_flight: u32,
	frames_issued: u32,
	frames_in_flight: u32,
	frames_completed: u32,
	base_time_ms: u64,
	send_pattern_offset: usize,

	last_error: Option<LatchedError>,
	validation: &'static ValidationBuffer,
	stats: UdpConnectionStats,
	created_at: Instant,
	started: bool,
}

impl UdpPattern {
	pub fn new(config: &Config) -> Self {
		let role = Role::from_config(config);
		let mut rng = match config.rng_seed {
			Some(seed) => StdRng::seed_from_u64(seed),
			None => StdRng::from_entropy(),
		};
		let connection_id = wire::connection_id(&mut rng);

		let media = config.media.unwrap_or(crate::config::MediaStreamConfig {
			frames_per_second: 30,
			frame_size_bytes: config.buffer_size.max(),
			stream_length_seconds: 10,
			buffer_depth_seconds: 1,
		});
		let total_frames = media.frames_per_second * media.stream_length_seconds;
		let max_frames_in_flight = (media.frames_per_second * media.buffer_depth_seconds).max(1);

		Self {
			role,
			phase: Phase::AwaitStart,
			connection_id,
			awaiting_control_completion: false,
			frames_per_second: media.frames_per_second,
			frame_size_bytes: media.frame_size_bytes,
			total_frames,
			max_frames_in_flight,
			frames_issued: 0,
			frames_in_flight: 0,
			frames_completed: 0,
			base_time_ms: 0,
			send_pattern_offset: 0,
			last_error: None,
			validation: ValidationBuffer::get(media.frame_size_bytes as usize),
			stats: UdpConnectionStats::new(connection_id),
			created_at: Instant::now(),
			started: false,
		}
	}

	pub fn last_error(&self) -> Option<LatchedError> {
		self.last_error
	}

	/// MediaStream scheduling is driven by `baseTimeMs` and the configured
	/// frame rate, not a send-credit window; this exists only so `Pattern`'s
	/// dispatch is uniform across variants.
	pub fn set_ideal_send_backlog(&mut self, _bytes: u64) {}

	fn now_ms(&self) -> u64 {
		self.created_at.elapsed().as_millis() as u64
	}

	fn latch(&mut self, error: LatchedError) {
		if self.last_error.is_none() {
			log::warn!(
				"connection {:02x?} failed after {} frames: {error}",
				self.connection_id,
				self.frames_completed
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

		match self.role {
			Role::Server => self.server_initiate_io(),
			Role::Client => self.client_initiate_io(),
		}
	}

	fn server_initiate_io(&mut self) -> Task {
		match self.phase {
			Phase::AwaitStart => {
				if self.awaiting_control_completion {
					return Task::none();
				}
				self.awaiting_control_completion = true;
				Task {
					action: Action::Recv,
					buffer_ref: BufferRef::Control,
					buffer_offset: 0,
					buffer_length: CONNECTION_ID_LEN + wire::MEDIA_HEADER_LEN - 4,
					expected_pattern_offset: 0,
					buffer_type: BufferType::UdpConnectionId,
					time_offset_ms: 0,
					track_io: false,
					control_bytes: None,
				}
			}
			Phase::IoStarted => self.next_frame_task(),
			Phase::Done => Task::none(),
		}
	}

	fn client_initiate_io(&mut self) -> Task {
		match self.phase {
			Phase::AwaitStart => {
				if self.awaiting_control_completion {
					return Task::none();
				}
				self.awaiting_control_completion = true;
				Task {
					action: Action::Send,
					buffer_ref: BufferRef::Control,
					buffer_offset: 0,
					buffer_length: CONNECTION_ID_LEN,
					expected_pattern_offset: 0,
					buffer_type: BufferType::UdpConnectionId,
					time_offset_ms: 0,
					track_io: false,
					control_bytes: Some(self.connection_id),
				}
			}
			Phase::IoStarted | Phase::Done => Task::none(),
		}
	}

	fn next_frame_task(&mut self) -> Task {
		if self.frames_issued >= self.total_frames {
			return Task::none();
		}
		if self.frames_in_flight >= self.max_frames_in_flight {
			return Task::none();
		}

		let frame_index = self.frames_issued;
		let scheduled_ms = self.base_time_ms + (frame_index as u64 * 1000 / self.frames_per_second as u64);
		let now_ms = self.now_ms();
		let time_offset_ms = scheduled_ms.saturating_sub(now_ms);

		let offset = self.send_pattern_offset;
		self.send_pattern_offset = (offset + self.frame_size_bytes as usize) % PATTERN_LEN;
		self.frames_issued += 1;
		self.frames_in_flight += 1;

		Task {
			action: Action::Send,
			buffer_ref: BufferRef::Shared,
			buffer_offset: offset,
			buffer_length: self.frame_size_bytes as usize,
			// Reused (Sends never carry a pattern-compare offset elsewhere) to
			// hand the executor this datagram's sequence number, so it can
			// build the header with `wire::encode_data_header`.
			expected_pattern_offset: frame_index as usize,
			buffer_type: BufferType::Dynamic,
			time_offset_ms,
			track_io: true,
			control_bytes: None,
		}
	}

	pub fn complete_io(&mut self, task: Task, actual_bytes: u32, os_status: u32, data: &[u8]) -> IoStatus {
		let now_ms = self.now_ms();

		if os_status != 0 {
			if task.action == Action::Recv && self.phase == Phase::Done {
				return IoStatus::CompletedIo;
			}
			self.latch(LatchedError::Os(os_status));
			return self.finish(now_ms);
		}

		match self.role {
			Role::Server => self.server_complete_io(task, actual_bytes, data, now_ms),
			Role::Client => self.client_complete_io(now_ms),
		}
	}

	fn server_complete_io(&mut self, task: Task, actual_bytes: u32, data: &[u8], now_ms: u64) -> IoStatus {
		match self.phase {
			Phase::AwaitStart => {
				self.awaiting_control_completion = false;
				let expected_len = CONNECTION_ID_LEN + wire::MEDIA_HEADER_LEN - 4;
				match parse_start_message(data, actual_bytes, expected_len) {
					Ok(id) => {
						self.connection_id = id;
						self.base_time_ms = now_ms;
						self.phase = Phase::IoStarted;
						IoStatus::ContinueIo
					}
					Err(err) => {
						self.latch(LatchedError::Protocol(err));
						self.finish(now_ms)
					}
				}
			}
			Phase::IoStarted => {
				if task.action != Action::Send {
					return IoStatus::ContinueIo;
				}
				self.frames_in_flight -= 1;
				self.frames_completed += 1;

				if self.frames_completed == self.total_frames {
					return self.finish(now_ms);
				}
				IoStatus::ContinueIo
			}
			Phase::Done => IoStatus::CompletedIo,
		}
	}

	fn client_complete_io(&mut self, now_ms: u64) -> IoStatus {
		match self.phase {
			Phase::AwaitStart => {
				self.awaiting_control_completion = false;
				// Out of scope: the full frame-classifying MediaStream client
				// never gets built here. The one-shot connection-id send
				// completing successfully is as far as this role's state
				// machine goes.
				self.finish(now_ms)
			}
			Phase::IoStarted | Phase::Done => IoStatus::CompletedIo,
		}
	}
}

/// Parses the client's one-shot START message (connection id + START flag),
/// logging the diagnostic at the point of failure.
fn parse_start_message(
	data: &[u8],
	actual_bytes: u32,
	expected_len: usize,
) -> utils::error::Result<[u8; CONNECTION_ID_LEN], PatternError> {
	if actual_bytes as usize != expected_len || data.len() < expected_len {
		log::warn!("START message wrong length: expected {expected_len}, got {actual_bytes}");
		return Err(PatternError::NotAllDataTransferred);
	}
	let flag = u16::from_le_bytes([data[expected_len - 2], data[expected_len - 1]]);
	if flag != wire::DatagramClass::Start as u16 {
		log::warn!("START message missing START flag (got {flag:#06x})");
		return Err(PatternError::DataDidNotMatchBitPattern);
	}
	let mut id = [0u8; CONNECTION_ID_LEN];
	id.copy_from_slice(&data[..CONNECTION_ID_LEN]);
	Ok(id)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::config::{MediaStreamConfig, Protocol, IoPattern};

	fn server_config() -> Config {
		Config {
			protocol: Protocol::Udp,
			io_pattern: IoPattern::MediaStream,
			is_listening: true,
			media: Some(MediaStreamConfig {
				frames_per_second: 10,
				frame_size_bytes: 100,
				stream_length_seconds: 1,
				buffer_depth_seconds: 1,
			}),
			..Config::default()
		}
	}

	#[test]
	fn server_awaits_start_before_streaming_frames() {
		let mut pattern = UdpPattern::new(&server_config());
		let task = pattern.initiate_io();
		assert_eq!(task.action, Action::Recv);
		assert_eq!(pattern.phase, Phase::AwaitStart);

		let mut payload = [0u8; 6];
		payload[4..6].copy_from_slice(&wire::encode_start_header());
		let status = pattern.complete_io(task, 6, 0, &payload);
		assert_eq!(status, IoStatus::ContinueIo);
		assert_eq!(pattern.phase, Phase::IoStarted);
	}

	#[test]
	fn server_completes_after_all_frames_acknowledged() {
		let mut pattern = UdpPattern::new(&server_config());
		let task = pattern.initiate_io();
		let mut payload = [0u8; 6];
		payload[4..6].copy_from_slice(&wire::encode_start_header());
		pattern.complete_io(task, 6, 0, &payload);

		let mut status = IoStatus::ContinueIo;
		for _ in 0..10 {
			let frame = pattern.initiate_io();
			assert_eq!(frame.action, Action::Send);
			status = pattern.complete_io(frame, frame.buffer_length as u32, 0, &[]);
		}
		assert_eq!(status, IoStatus::CompletedIo);
	}

	#[test]
	fn client_stub_completes_after_sending_start() {
		let config = Config {
			protocol: Protocol::Udp,
			io_pattern: IoPattern::MediaStream,
			is_listening: false,
			media: Some(MediaStreamConfig {
				frames_per_second: 10,
				frame_size_bytes: 100,
				stream_length_seconds: 1,
				buffer_depth_seconds: 1,
			}),
			..Config::default()
		};
		let mut pattern = UdpPattern::new(&config);
		let task = pattern.initiate_io();
		assert_eq!(task.action, Action::Send);
		let status = pattern.complete_io(task, CONNECTION_ID_LEN as u32, 0, &[]);
		assert_eq!(status, IoStatus::CompletedIo);
	}
}
