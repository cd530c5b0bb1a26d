//! Greedy box-fitting text layout.
//!
//! Places a run of code points into a sequence of caller-owned boxes,
//! left to right and line by line, using the glyph metrics of a [`Font`].
//! When a box cannot take the next character the run continues in the
//! following box with that same character.
//!
//! ```text
//!  box.top ─┬──────────────────────────────┐
//!           │ pen.y = top - max.top        │
//!           │ ▶A▶B▶C▶      (x += h_adv)    │   line advance:
//!           │ ▶D▶E         (y += max.v_adv)│     x = left, y += v_adv
//!  box.bottom ─────────────────────────────┘
//! ```
//!
//! Coordinates are plain `i32`; y decreases going down (vertical
//! advances are negative in a typical font).

use glyphbox_core::error::NOT_ENOUGH_SPACE;
use glyphbox_core::Error;
use glyphbox_text::{Character, Descriptor, Font, Glyph};
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ── Boxes and positions ─────────────────────────────────────────────

/// Axis-aligned target rectangle.
///
/// `#[repr(C)]` so that foreign callers can pass arrays of boxes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(C)]
pub struct TextBox {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl TextBox {
    pub const fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }
}

/// One placed character.
#[derive(Clone, Copy, Debug)]
pub struct GlyphPosition<'a> {
    /// Glyph used (the fallback glyph for unknown code points).
    pub glyph: &'a Glyph,
    /// Box the glyph was placed in.
    pub text_box: &'a TextBox,
    pub box_index: usize,
    /// Index of the character in the input text.
    pub char_index: usize,
    pub character: Character,
    /// Pen position at placement.
    pub x: i32,
    pub y: i32,
}

/// Result of [`init_layout`]: placements in text order.
///
/// Borrows the font's glyphs and the caller's boxes; owns only the
/// placement records.
#[derive(Debug, Default)]
pub struct Layout<'a> {
    positions: Vec<GlyphPosition<'a>>,
}

impl<'a> Layout<'a> {
    #[inline]
    pub fn positions(&self) -> &[GlyphPosition<'a>] {
        &self.positions
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, GlyphPosition<'a>> {
        self.positions.iter()
    }

    /// Drop every placement record.
    pub fn release(&mut self) {
        self.positions = Vec::new();
    }
}

impl<'a, 'l> IntoIterator for &'l Layout<'a> {
    type Item = &'l GlyphPosition<'a>;
    type IntoIter = std::slice::Iter<'l, GlyphPosition<'a>>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

// ── Errors ──────────────────────────────────────────────────────────

#[derive(Error, Debug)]
pub enum LayoutError<'a> {
    #[error(transparent)]
    Font(#[from] Error),

    /// Boxes ran out first. `layout` holds what was placed.
    #[error("not enough space: placed {placed} of {requested} characters")]
    NotEnoughSpace {
        layout: Layout<'a>,
        placed: usize,
        requested: usize,
    },
}

impl<'a> LayoutError<'a> {
    /// Stable integer code, see [`glyphbox_core::error`].
    pub fn code(&self) -> i32 {
        match self {
            LayoutError::Font(e) => e.code(),
            LayoutError::NotEnoughSpace { .. } => NOT_ENOUGH_SPACE,
        }
    }

    /// The partial layout carried by [`LayoutError::NotEnoughSpace`].
    pub fn into_partial(self) -> Option<Layout<'a>> {
        match self {
            LayoutError::NotEnoughSpace { layout, .. } => Some(layout),
            LayoutError::Font(_) => None,
        }
    }
}

// ── Pen ─────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug)]
struct Pen {
    x: i32,
    y: i32,
}

impl Pen {
    /// Top-left of `text_box`, lowered by the font's tallest ascent.
    fn origin(text_box: &TextBox, max: &Descriptor) -> Self {
        Self {
            x: text_box.left,
            y: text_box.top.saturating_sub(max.top),
        }
    }

    fn new_line(&mut self, text_box: &TextBox, max: &Descriptor) {
        self.x = text_box.left;
        self.y = self.y.saturating_add(max.vertical_advance);
    }

    #[inline]
    fn fits_vertically(&self, text_box: &TextBox, desc: &Descriptor) -> bool {
        i64::from(self.y) - i64::from(text_box.bottom) >= -i64::from(desc.bottom)
    }

    #[inline]
    fn fits_horizontally(&self, text_box: &TextBox, desc: &Descriptor) -> bool {
        i64::from(text_box.right) - i64::from(self.x) >= i64::from(desc.right)
    }
}

// ── Layout computation ──────────────────────────────────────────────

/// Lay `text` out across `boxes`.
///
/// Returns [`LayoutError::NotEnoughSpace`] with the partial layout when
/// the boxes fill up before the text ends.
///
/// A new line must pass the vertical fit check again, so a line that
/// would drop below `bottom` moves the run to the next box instead.
pub fn init_layout<'a>(
    font: &'a Font,
    boxes: &'a [TextBox],
    text: &[Character],
) -> Result<Layout<'a>, LayoutError<'a>> {
    if boxes.is_empty() {
        return Err(Error::InvalidParameter("no boxes to lay text out in").into());
    }
    if text.is_empty() {
        return Err(Error::InvalidParameter("no characters to lay out").into());
    }
    let max = font.get_max().ok_or(Error::InvalidObject)?;

    let mut positions: Vec<GlyphPosition<'a>> = Vec::new();
    positions.try_reserve_exact(text.len()).map_err(|_| {
        log::error!("Memory allocation failure");
        Error::AllocationFailure {
            bytes: text.len().saturating_mul(std::mem::size_of::<GlyphPosition>()),
        }
    })?;

    let mut next = 0usize;

    'boxes: for (box_index, text_box) in boxes.iter().enumerate() {
        let mut pen = Pen::origin(text_box, max);

        while let Some(&character) = text.get(next) {
            let glyph = font.get_glyph(character).ok_or(Error::InvalidObject)?;
            let desc = glyph.descriptor();

            if !pen.fits_vertically(text_box, desc) {
                continue 'boxes;
            }
            if !pen.fits_horizontally(text_box, desc) {
                if pen.x == text_box.left {
                    // Too wide even for an empty line.
                    continue 'boxes;
                }
                pen.new_line(text_box, max);
                continue;
            }

            positions.push(GlyphPosition {
                glyph,
                text_box,
                box_index,
                char_index: next,
                character,
                x: pen.x,
                y: pen.y,
            });
            pen.x = pen.x.saturating_add(desc.horizontal_advance);
            next += 1;
        }

        break;
    }

    positions.shrink_to_fit();
    let layout = Layout { positions };

    if next < text.len() {
        log::debug!(
            "Layout ran out of space: {} of {} characters in {} boxes",
            next,
            text.len(),
            boxes.len()
        );
        return Err(LayoutError::NotEnoughSpace {
            layout,
            placed: next,
            requested: text.len(),
        });
    }

    Ok(layout)
}

/// Drop a layout's placement records.
pub fn release_layout(layout: &mut Layout<'_>) {
    layout.release();
}

// ===================================================================
// Tests
// ===================================================================
