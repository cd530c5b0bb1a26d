//! # glyphbox-text
//!
//! Bitmap font storage: per-character metrics and A8 images, a two-tier
//! lookup (dense ASCII table plus sparse map), and the binary glyph-store
//! format used to ship fonts as a single buffer.
//!
//! ## Architecture
//!
//! ```text
//! bytes ──► Font::decode ──► Font { lut[128] + BTreeMap + max } ──► Font::store ──► bytes
//!                                   │
//!                                   ▼
//!                      get_glyph(c) ──► &Glyph { Descriptor, BinaryBlob }
//! ```
//!
//! - **`glyph`**: `Descriptor` (32-byte metrics record) and `Glyph`.
//! - **`font`**: glyph ownership, lookup with fallback, metric envelope.
//! - **`codec`**: decode/encode of the binary format.

pub mod codec;
pub mod font;
pub mod glyph;

// Re-exports for ergonomic use.
pub use codec::{CodecConfig, FontHeader};
pub use font::{Character, Font, LUT_SIZE};
pub use glyph::{Descriptor, Glyph};
