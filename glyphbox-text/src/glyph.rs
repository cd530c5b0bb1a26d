//! Glyph: metrics and A8 image of a single character.
//!
//! The image is `width × height` alpha bytes, row-major, owned by the
//! glyph. Glyphs without a visible image (space, for instance) carry a
//! null [`BinaryBlob`].

use bytemuck::{Pod, Zeroable};
use glyphbox_core::{BinaryBlob, SwapBytes};
use serde::{Deserialize, Serialize};

// ── Descriptor ──────────────────────────────────────────────────────

/// Bitmap size plus pen-relative bounding box and advances.
///
/// `#[repr(C)]` with eight 4-byte fields: this is also the 32-byte
/// on-disk record of the font format.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Pod, Zeroable, Serialize, Deserialize)]
#[repr(C)]
pub struct Descriptor {
    pub width: u32,
    pub height: u32,
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
    pub horizontal_advance: i32,
    pub vertical_advance: i32,
}

impl Descriptor {
    /// Size of the on-disk record.
    pub const SIZE: usize = std::mem::size_of::<Descriptor>();

    /// Byte count of the image this descriptor describes.
    #[inline]
    pub fn pixel_len(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }

    /// Fold `other` into the running envelope.
    ///
    /// Width, height, top, right and horizontal advance take the
    /// maximum; left, bottom and vertical advance take the minimum.
    pub fn envelope(&self, other: &Descriptor) -> Descriptor {
        Descriptor {
            width: self.width.max(other.width),
            height: self.height.max(other.height),
            left: self.left.min(other.left),
            top: self.top.max(other.top),
            right: self.right.max(other.right),
            bottom: self.bottom.min(other.bottom),
            horizontal_advance: self.horizontal_advance.max(other.horizontal_advance),
            vertical_advance: self.vertical_advance.min(other.vertical_advance),
        }
    }
}

impl SwapBytes for Descriptor {
    fn swap_bytes(self) -> Self {
        Descriptor {
            width: self.width.swap_bytes(),
            height: self.height.swap_bytes(),
            left: self.left.swap_bytes(),
            top: self.top.swap_bytes(),
            right: self.right.swap_bytes(),
            bottom: self.bottom.swap_bytes(),
            horizontal_advance: self.horizontal_advance.swap_bytes(),
            vertical_advance: self.vertical_advance.swap_bytes(),
        }
    }
}

// ── Glyph ───────────────────────────────────────────────────────────

/// Single character: descriptor plus owned pixel data.
///
/// `Default` is the released state: null data, all-zero descriptor.
/// `Clone` duplicates the pixel bytes.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Glyph {
    data: BinaryBlob,
    descriptor: Descriptor,
}

impl Glyph {
    pub fn new(data: BinaryBlob, descriptor: Descriptor) -> Self {
        Self { data, descriptor }
    }

    /// Replace the contents, releasing whatever was held before.
    ///
    /// The descriptor is not checked against the data length.
    pub fn init(&mut self, data: BinaryBlob, descriptor: Descriptor) {
        self.release();
        self.data = data;
        self.descriptor = descriptor;
    }

    /// Free pixel memory and zero the descriptor. Idempotent.
    pub fn release(&mut self) {
        self.data.release();
        self.descriptor = Descriptor::default();
    }

    /// Move the glyph out, leaving `self` released.
    pub fn take(&mut self) -> Glyph {
        std::mem::take(self)
    }

    #[inline]
    pub fn data(&self) -> &BinaryBlob {
        &self.data
    }

    #[inline]
    pub fn descriptor(&self) -> &Descriptor {
        &self.descriptor
    }

    /// `true` when the glyph has no image.
    #[inline]
    pub fn is_null(&self) -> bool {
        self.data.is_null()
    }

    #[inline]
    pub fn pixel_len(&self) -> usize {
        self.data.len()
    }
}

// ===================================================================
// Tests
// ===================================================================
