//! The unit of work the dispatcher contract hands to an executor.

/// What kind of network operation a [`Task`] describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
	/// Nothing to issue right now; call `InitiateIo` again after a completion.
	None,
	Send,
	Recv,
	GracefulShutdown,
	HardShutdown,
	Abort,
	FatalAbort,
}

/// Which memory region a [`Task`]'s `buffer_offset`/`buffer_length` index into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferType {
	/// The shared, process-wide send pattern.
	Static,
	/// A per-connection receive slot, or a per-send registration.
	Dynamic,
	/// The 4-byte connection identifier exchanged once at connection start.
	TcpConnectionId,
	/// The 4-byte ASCII `"DONE"` token.
	CompletionMessage,
	/// The UDP media-stream connection identifier carried in a START message.
	UdpConnectionId,
}

/// A reference to the byte region a [`Task`] sends from or receives into.
///
/// `Shared` indexes the process-wide validation buffer's send pool.
/// `Slot` indexes a key borrowed from this connection's receive-slot pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferRef {
	Shared,
	Slot(usize),
	/// The single reusable buffer used when `useSharedBuffer` is configured.
	SharedRecv,
	/// A control-plane message (connection id, completion message, FIN probe)
	/// too small to warrant a pool slot; see `Task::control_bytes`.
	Control,
}

/// One unit of work: a send or recv, or a shutdown/abort directive.
#[derive(Debug, Clone, Copy)]
pub struct Task {
	pub action: Action,
	pub buffer_ref: BufferRef,
	pub buffer_offset: usize,
	pub buffer_length: usize,
	/// For a tracked Recv, the offset into the canonical pattern the bytes
	/// must compare against. Meaningless (and left at 0) for control tasks.
	pub expected_pattern_offset: usize,
	pub buffer_type: BufferType,
	/// Non-negative delay, in milliseconds, before the executor may issue this task.
	pub time_offset_ms: u64,
	/// Whether this task's bytes count toward the connection's transfer budget.
	pub track_io: bool,
	/// The literal bytes to put on the wire for a `BufferRef::Control` Send
	/// (connection id or completion message). `None` for every other task,
	/// including Recv: this crate never touches sockets, so a control Recv's
	/// bytes are reported back through `Pattern::complete_io`'s `data` slice.
	pub control_bytes: Option<[u8; 4]>,
}

impl Task {
	/// The task returned when there is nothing to issue right now.
	pub fn none() -> Self {
		Self {
			action: Action::None,
			buffer_ref: BufferRef::Shared,
			buffer_offset: 0,
			buffer_length: 0,
			expected_pattern_offset: 0,
			buffer_type: BufferType::Static,
			time_offset_ms: 0,
			track_io: false,
			control_bytes: None,
		}
	}
}

/// Outcome handed back by `CompleteIo`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IoStatus {
	/// The engine wants more tasks.
	ContinueIo,
	/// The state machine reached `Done` successfully.
	CompletedIo,
	/// A terminal error has been latched; see `GetLastPatternError`.
	FailedIo,
}
