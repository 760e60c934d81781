//! A per-connection traffic-generation state machine: given a [`config::Config`],
//! it produces the sequence of Send/Recv/shutdown [`task::Task`]s a TCP or UDP
//! MediaStream connection should issue, and accounts for their completions.
//!
//! This crate never touches a socket. It is handed completions by whatever
//! executor owns the real transport, and hands back the next task to issue;
//! see [`pattern::Pattern`] for the full dispatcher contract.

pub mod budget;
pub mod buffer;
pub mod config;
pub mod error;
pub mod pacer;
pub mod pattern;
pub mod stats;
pub mod task;
pub mod wire;

pub use config::Config;
pub use error::{ConfigError, LatchedError, PatternError};
pub use pattern::{Pattern, Role};
pub use task::{Action, BufferRef, BufferType, IoStatus, Task};
