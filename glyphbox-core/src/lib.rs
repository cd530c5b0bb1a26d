//! # glyphbox-core
//!
//! Low-level building blocks shared by the glyphbox crates: an owning
//! byte buffer, typed offset-addressed access with optional byte
//! swapping, and the common error taxonomy.
//!
//! ## Architecture
//!
//! ```text
//! BinaryBlob ──► Access (trait) ◄── StreamAccess<File>
//!                   │
//!                   ▼
//!        read::<T> / write::<T> / read_range
//!                   │
//!                   ▼
//!          glyphbox-text codec
//! ```
//!
//! - **`blob`**: move-only owning buffer with a null state.
//! - **`access`**: bounds-checked typed reads and writes.
//! - **`error`**: `Error`, `AccessError` and integer result codes.

pub mod access;
pub mod blob;
pub mod error;

// Re-exports for ergonomic use.
pub use access::{Access, StreamAccess, SwapBytes};
pub use blob::BinaryBlob;
pub use error::{AccessError, Error, Result};
