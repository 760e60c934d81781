/// The repeating byte pool backing the validation buffer.
pub mod bytes;
/// A slab-backed pool of reusable, pre-allocated buffers.
pub mod pool;
