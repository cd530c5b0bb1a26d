//! C ABI for embedding the font loader and layout in non-Rust hosts.
//!
//! Fonts and layouts cross the boundary as opaque handles. Every
//! fallible call returns one of the integer codes in
//! [`glyphbox_core::error`]. A layout handle copies its placements into
//! flat records, so it stays valid after the font handle and the boxes
//! passed to [`glyphbox_layout_new`] are gone.

use glyphbox_core::error::{INVALID_PARAMETER, NOT_ENOUGH_SPACE, SUCCESS};
use glyphbox_core::BinaryBlob;
use glyphbox_text::Font;

use crate::engine::{init_layout, GlyphPosition, LayoutError, TextBox};

/// Opaque font handle.
#[repr(C)]
pub struct GlyphboxFont {
    _private: [u8; 0],
}

/// Opaque layout handle.
#[repr(C)]
pub struct GlyphboxLayout {
    _private: [u8; 0],
}

/// Flat placement record handed to foreign callers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[repr(C)]
pub struct GlyphboxPosition {
    pub box_index: u32,
    pub char_index: u32,
    pub character: u32,
    pub x: i32,
    pub y: i32,
    pub horizontal_advance: i32,
}

impl TryFrom<&GlyphPosition<'_>> for GlyphboxPosition {
    type Error = std::num::TryFromIntError;

    /// Fails when an index does not fit the 32-bit record fields.
    fn try_from(p: &GlyphPosition<'_>) -> Result<Self, Self::Error> {
        Ok(Self {
            box_index: u32::try_from(p.box_index)?,
            char_index: u32::try_from(p.char_index)?,
            character: p.character,
            x: p.x,
            y: p.y,
            horizontal_advance: p.glyph.descriptor().horizontal_advance,
        })
    }
}

fn into_layout_handle(positions: Vec<GlyphboxPosition>) -> *mut GlyphboxLayout {
    Box::into_raw(Box::new(positions)) as *mut GlyphboxLayout
}

/// SAFETY: `ptr` must be null or come from `into_layout_handle`.
unsafe fn layout_ref<'h>(ptr: *const GlyphboxLayout) -> Option<&'h Vec<GlyphboxPosition>> {
    (ptr as *const Vec<GlyphboxPosition>).as_ref()
}

/// SAFETY: `ptr` must be null or come from `glyphbox_font_from_bytes`.
unsafe fn font_ref<'h>(ptr: *const GlyphboxFont) -> Option<&'h Font> {
    (ptr as *const Font).as_ref()
}

/// Decode a glyph store from `len` bytes at `data`.
///
/// The bytes are copied; the caller keeps ownership of `data`. On
/// success `*out_font` receives a handle to release with
/// [`glyphbox_font_free`].
#[no_mangle]
pub extern "C" fn glyphbox_font_from_bytes(
    data: *const u8,
    len: usize,
    swap_bytes: bool,
    out_font: *mut *mut GlyphboxFont,
) -> i32 {
    if data.is_null() || len == 0 || out_font.is_null() {
        return INVALID_PARAMETER;
    }

    let bytes = unsafe { std::slice::from_raw_parts(data, len) };
    match Font::from_blob(BinaryBlob::from(bytes), swap_bytes) {
        Ok(font) => {
            unsafe { *out_font = Box::into_raw(Box::new(font)) as *mut GlyphboxFont };
            SUCCESS
        }
        Err(e) => {
            log::warn!("Font decode failed: {e}");
            unsafe { *out_font = std::ptr::null_mut() };
            e.code()
        }
    }
}

#[no_mangle]
pub extern "C" fn glyphbox_font_free(font: *mut GlyphboxFont) {
    if !font.is_null() {
        unsafe {
            let _ = Box::from_raw(font as *mut Font);
        }
    }
}

/// Lay `char_count` code points out across `box_count` boxes.
///
/// Returns [`SUCCESS`] or [`NOT_ENOUGH_SPACE`] with a handle in
/// `*out_layout`; in the second case the handle holds the partial
/// placement. Any other code leaves `*out_layout` null, including
/// [`INVALID_PARAMETER`] for null or empty `boxes`/`text` and for
/// indices that do not fit a `u32`.
#[no_mangle]
pub extern "C" fn glyphbox_layout_new(
    font: *const GlyphboxFont,
    boxes: *const TextBox,
    box_count: usize,
    text: *const u32,
    char_count: usize,
    out_layout: *mut *mut GlyphboxLayout,
) -> i32 {
    if out_layout.is_null() {
        return INVALID_PARAMETER;
    }
    unsafe { *out_layout = std::ptr::null_mut() };

    if boxes.is_null() || box_count == 0 || text.is_null() || char_count == 0 {
        return INVALID_PARAMETER;
    }
    let Some(font) = (unsafe { font_ref(font) }) else {
        return INVALID_PARAMETER;
    };
    let boxes = unsafe { std::slice::from_raw_parts(boxes, box_count) };
    let text = unsafe { std::slice::from_raw_parts(text, char_count) };

    let (layout, code) = match init_layout(font, boxes, text) {
        Ok(layout) => (layout, SUCCESS),
        Err(LayoutError::NotEnoughSpace { layout, .. }) => (layout, NOT_ENOUGH_SPACE),
        Err(LayoutError::Font(e)) => return e.code(),
    };

    let positions = match layout
        .iter()
        .map(GlyphboxPosition::try_from)
        .collect::<Result<Vec<_>, _>>()
    {
        Ok(positions) => positions,
        Err(e) => {
            log::warn!("Layout index does not fit the C record: {e}");
            return INVALID_PARAMETER;
        }
    };
    unsafe { *out_layout = into_layout_handle(positions) };
    code
}

/// Number of placements in `layout`; 0 for a null handle.
#[no_mangle]
pub extern "C" fn glyphbox_layout_count(layout: *const GlyphboxLayout) -> usize {
    unsafe { layout_ref(layout) }.map_or(0, Vec::len)
}

/// Copy placement `index` into `*out`.
#[no_mangle]
pub extern "C" fn glyphbox_layout_get(
    layout: *const GlyphboxLayout,
    index: usize,
    out: *mut GlyphboxPosition,
) -> i32 {
    let Some(positions) = (unsafe { layout_ref(layout) }) else {
        return INVALID_PARAMETER;
    };
    match positions.get(index) {
        Some(p) if !out.is_null() => {
            unsafe { *out = *p };
            SUCCESS
        }
        _ => INVALID_PARAMETER,
    }
}

#[no_mangle]
pub extern "C" fn glyphbox_layout_free(layout: *mut GlyphboxLayout) {
    if !layout.is_null() {
        unsafe {
            let _ = Box::from_raw(layout as *mut Vec<GlyphboxPosition>);
        }
    }
}
