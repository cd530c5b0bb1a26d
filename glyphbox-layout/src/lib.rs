//! # glyphbox-layout
//!
//! Greedy placement of a code-point run into a list of target boxes,
//! driven by the metrics of a `glyphbox_text::Font`.
//!
//! ## Architecture
//!
//! ```text
//! &Font + &[TextBox] + &[Character]
//!          │
//!          ▼
//!     init_layout ──► Layout { GlyphPosition { &Glyph, &TextBox, x, y } }
//!          │
//!          └─► LayoutError::NotEnoughSpace { partial Layout }
//!
//! ffi: opaque GlyphboxFont / GlyphboxLayout handles + i32 result codes
//! ```

pub mod engine;
pub mod ffi;

// Re-exports for ergonomic use.
pub use engine::{init_layout, release_layout, GlyphPosition, Layout, LayoutError, TextBox};
