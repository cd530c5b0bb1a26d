//! Binary glyph-store format.
//!
//! ```text
//! offset                       content
//! ─────────────────────────    ───────────────────────────────────────
//! 0                            u32        NOG (number of glyphs)
//! 4                            NOG × u32  code points
//! 4 + 4·NOG                    NOG × 32   descriptors (8 × 4-byte fields)
//! 4 + 36·NOG                   NOG × u64  absolute offset of each image
//! 4 + 44·NOG                   images, glyph after glyph
//! ```
//!
//! Integers are written in native byte order. The reader and the writer
//! are told out-of-band whether to swap; the buffer does not say.

use glyphbox_core::access::{self, Access};
use glyphbox_core::{AccessError, BinaryBlob, Error, Result};

use crate::font::{Character, Font};
use crate::glyph::{Descriptor, Glyph};

const COUNT_SIZE: u64 = std::mem::size_of::<u32>() as u64;
const CHARACTER_SIZE: u64 = std::mem::size_of::<Character>() as u64;
const DESCRIPTOR_SIZE: u64 = Descriptor::SIZE as u64;
const IMAGE_OFFSET_SIZE: u64 = std::mem::size_of::<u64>() as u64;

// ── Configuration ───────────────────────────────────────────────────

/// Codec settings.
#[derive(Debug, Clone)]
pub struct CodecConfig {
    /// Byte-swap every multi-byte field on read and write.
    pub swap_bytes: bool,
    /// Largest glyph count a decoded buffer may declare. Default: one
    /// slot per Unicode scalar value (0x110000).
    pub max_glyphs: u32,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            swap_bytes: false,
            max_glyphs: 0x11_0000,
        }
    }
}

impl CodecConfig {
    /// Default limits with the given byte order flag.
    pub fn swapped(swap_bytes: bool) -> Self {
        Self {
            swap_bytes,
            ..Self::default()
        }
    }

    /// Config for testing (tiny glyph limit).
    pub fn for_testing() -> Self {
        Self {
            swap_bytes: false,
            max_glyphs: 256,
        }
    }
}

// ── Header arithmetic ───────────────────────────────────────────────

/// Section offsets for a buffer holding `glyph_count` glyphs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FontHeader {
    pub glyph_count: u32,
    pub characters_offset: u64,
    pub descriptors_offset: u64,
    pub image_offsets_offset: u64,
    /// First byte after the fixed-stride sections.
    pub images_offset: u64,
}

impl FontHeader {
    pub fn for_count(glyph_count: u32) -> Self {
        let n = u64::from(glyph_count);
        let characters_offset = COUNT_SIZE;
        let descriptors_offset = characters_offset + n * CHARACTER_SIZE;
        let image_offsets_offset = descriptors_offset + n * DESCRIPTOR_SIZE;
        let images_offset = image_offsets_offset + n * IMAGE_OFFSET_SIZE;
        Self {
            glyph_count,
            characters_offset,
            descriptors_offset,
            image_offsets_offset,
            images_offset,
        }
    }

    #[inline]
    pub fn character_at(&self, index: u32) -> u64 {
        self.characters_offset + u64::from(index) * CHARACTER_SIZE
    }

    #[inline]
    pub fn descriptor_at(&self, index: u32) -> u64 {
        self.descriptors_offset + u64::from(index) * DESCRIPTOR_SIZE
    }

    #[inline]
    pub fn image_offset_at(&self, index: u32) -> u64 {
        self.image_offsets_offset + u64::from(index) * IMAGE_OFFSET_SIZE
    }
}

// ── Decode ──────────────────────────────────────────────────────────

impl Font {
    /// Decode a font out of an owned buffer.
    pub fn from_blob(mut data: BinaryBlob, swap_bytes: bool) -> Result<Font> {
        let mut font = Font::new();
        font.decode(&mut data, swap_bytes)?;
        Ok(font)
    }

    /// Replace this font's contents with the glyphs stored in `source`.
    pub fn decode<A: Access + ?Sized>(&mut self, source: &mut A, swap_bytes: bool) -> Result<()> {
        self.decode_with(source, &CodecConfig::swapped(swap_bytes))
    }

    /// Like [`Font::decode`] with explicit limits.
    ///
    /// On failure the font is left released: no partially decoded glyph
    /// remains reachable.
    pub fn decode_with<A: Access + ?Sized>(
        &mut self,
        source: &mut A,
        config: &CodecConfig,
    ) -> Result<()> {
        self.init();

        let result = self.decode_glyphs(source, config);
        if let Err(e) = &result {
            log::error!("Corrupted resource: {e}");
            self.release();
        }
        result
    }

    fn decode_glyphs<A: Access + ?Sized>(&mut self, source: &mut A, config: &CodecConfig) -> Result<()> {
        let swap = config.swap_bytes;
        let size = source.size().map_err(Error::CorruptResource)?;

        let count: u32 = access::read(source, 0, swap).map_err(Error::CorruptResource)?;
        if count > config.max_glyphs {
            return Err(Error::CorruptResource(AccessError::LimitExceeded {
                what: "glyph count",
                value: u64::from(count),
                limit: u64::from(config.max_glyphs),
            }));
        }

        let header = FontHeader::for_count(count);
        if header.images_offset > size {
            return Err(Error::corrupt(0, header.images_offset as usize, size));
        }

        log::debug!("Decoding {count} glyphs from {size} bytes (swap: {swap})");

        for index in 0..count {
            let character: Character = access::read(source, header.character_at(index), swap)
                .map_err(Error::CorruptResource)?;
            let descriptor: Descriptor = access::read(source, header.descriptor_at(index), swap)
                .map_err(Error::CorruptResource)?;
            let image_offset: u64 = access::read(source, header.image_offset_at(index), swap)
                .map_err(Error::CorruptResource)?;

            let image_len = image_size(&descriptor)?;
            let in_bounds = image_offset
                .checked_add(image_len as u64)
                .is_some_and(|end| end <= size);
            if !in_bounds {
                return Err(Error::corrupt(image_offset, image_len, size));
            }

            let image = access::read_range(source, image_offset, image_len)
                .map_err(|e| match e {
                    Error::Access(inner) => Error::CorruptResource(inner),
                    other => other,
                })?;

            self.insert_glyph(character, Glyph::new(image, descriptor))?;
        }

        Ok(())
    }
}

/// Image byte count of `descriptor` as an in-memory length.
///
/// Fails on targets whose address space cannot hold the image.
fn image_size(descriptor: &Descriptor) -> Result<usize> {
    let len = descriptor.pixel_len();
    usize::try_from(len).map_err(|_| {
        Error::CorruptResource(AccessError::LimitExceeded {
            what: "image size",
            value: len,
            limit: usize::MAX as u64,
        })
    })
}

// ── Encode ──────────────────────────────────────────────────────────

impl Font {
    /// Serialize into a freshly allocated buffer.
    pub fn store(&self, swap_bytes: bool) -> Result<BinaryBlob> {
        self.store_with(&CodecConfig::swapped(swap_bytes))
    }

    /// Like [`Font::store`] with an explicit config.
    pub fn store_with(&self, config: &CodecConfig) -> Result<BinaryBlob> {
        if !self.is_initialized() {
            return Err(Error::InvalidObject);
        }

        let total = self.encoded_len()?;
        let total = usize::try_from(total).map_err(|_| Error::AllocationFailure { bytes: usize::MAX })?;
        let mut out = BinaryBlob::zeroed(total)?;
        self.store_into_with(&mut out, config)?;
        Ok(out)
    }

    /// Serialize into an existing backend (a file, for instance).
    ///
    /// Returns the number of bytes the encoded font occupies.
    pub fn store_into<A: Access + ?Sized>(&self, target: &mut A, swap_bytes: bool) -> Result<u64> {
        self.store_into_with(target, &CodecConfig::swapped(swap_bytes))
    }

    /// Like [`Font::store_into`] with an explicit config.
    pub fn store_into_with<A: Access + ?Sized>(
        &self,
        target: &mut A,
        config: &CodecConfig,
    ) -> Result<u64> {
        if !self.is_initialized() {
            return Err(Error::InvalidObject);
        }

        let result = self.write_glyphs(target, config.swap_bytes);
        if let Err(e) = &result {
            log::error!("Failed to store font: {e}");
        }
        result
    }

    /// Size in bytes of the encoded form.
    pub fn encoded_len(&self) -> Result<u64> {
        let header = FontHeader::for_count(self.stored_count()?);
        let images: u64 = self.stored_glyphs().map(|(_, g)| g.pixel_len() as u64).sum();
        Ok(header.images_offset + images)
    }

    /// Glyphs that take part in serialization.
    ///
    /// Fast-table glyphs without an image are skipped; map glyphs are
    /// always written.
    fn stored_glyphs(&self) -> impl Iterator<Item = (Character, &Glyph)> + '_ {
        self.iter()
            .filter(|(c, g)| (*c as usize) >= crate::font::LUT_SIZE || !g.is_null())
    }

    fn stored_count(&self) -> Result<u32> {
        u32::try_from(self.stored_glyphs().count())
            .map_err(|_| Error::InvalidParameter("glyph count does not fit in u32"))
    }

    fn write_glyphs<A: Access + ?Sized>(&self, target: &mut A, swap: bool) -> Result<u64> {
        let count = self.stored_count()?;
        let header = FontHeader::for_count(count);

        log::debug!("Storing {count} glyphs (swap: {swap})");

        access::write(target, 0, &count, swap)?;

        let mut image_offset = header.images_offset;
        for (index, (character, glyph)) in self.stored_glyphs().enumerate() {
            let index = index as u32;
            access::write(target, header.character_at(index), &character, swap)?;
            access::write(target, header.descriptor_at(index), glyph.descriptor(), swap)?;
            access::write(target, header.image_offset_at(index), &image_offset, swap)?;

            let image = glyph.data().as_slice();
            if !image.is_empty() {
                target.write_bytes(image_offset, image)?;
            }
            image_offset += image.len() as u64;
        }

        Ok(image_offset)
    }
}

// ===================================================================
// Tests
// ===================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const DESC_0: Descriptor = Descriptor {
        width: 4,
        height: 4,
        left: 0,
        top: 2,
        right: 4,
        bottom: -2,
        horizontal_advance: 4,
        vertical_advance: -6,
    };
    const DESC_1: Descriptor = Descriptor {
        width: 6,
        height: 4,
        left: 2,
        top: 4,
        right: 8,
        bottom: 0,
        horizontal_advance: 8,
        vertical_advance: -6,
    };

    /// Hand-built buffer with two glyphs at code points 0 and 1.
    fn two_glyph_buffer() -> Vec<u8> {
        let header = FontHeader::for_count(2);
        let img_0 = DESC_0.pixel_len() as usize;
        let img_1 = DESC_1.pixel_len() as usize;
        let total = header.images_offset as usize + img_0 + img_1;
        let mut buf = vec![0u8; total];

        access::write(&mut buf, 0, &2u32, false).unwrap();
        access::write(&mut buf, header.character_at(0), &0u32, false).unwrap();
        access::write(&mut buf, header.character_at(1), &1u32, false).unwrap();
        access::write(&mut buf, header.descriptor_at(0), &DESC_0, false).unwrap();
        access::write(&mut buf, header.descriptor_at(1), &DESC_1, false).unwrap();
        access::write(&mut buf, header.image_offset_at(0), &header.images_offset, false).unwrap();
        access::write(
            &mut buf,
            header.image_offset_at(1),
            &(header.images_offset + img_0 as u64),
            false,
        )
        .unwrap();

        let start = header.images_offset as usize;
        buf[start..start + img_0].fill(0);
        buf[start + img_0..].fill(1);
        buf
    }

    #[test]
    fn test_header_offsets() {
        let header = FontHeader::for_count(3);
        assert_eq!(header.characters_offset, 4);
        assert_eq!(header.descriptors_offset, 16);
        assert_eq!(header.image_offsets_offset, 16 + 96);
        assert_eq!(header.images_offset, 16 + 96 + 24);
        assert_eq!(header.descriptor_at(2), 16 + 64);
        assert_eq!(header.image_offset_at(1), 120);
    }

    #[test]
    fn test_header_does_not_overflow() {
        let header = FontHeader::for_count(u32::MAX);
        assert_eq!(header.images_offset, 4 + 44 * u64::from(u32::MAX));
    }

    #[test]
    fn test_decode_hand_built_buffer() {
        let mut buf = two_glyph_buffer();
        let mut font = Font::new();
        font.decode(&mut buf, false).unwrap();

        assert_eq!(font.glyph_count(), 2);

        let g0 = font.get_glyph(0).unwrap();
        assert_eq!(*g0.descriptor(), DESC_0);
        assert_eq!(g0.pixel_len(), 16);
        assert!(g0.data().as_slice().iter().all(|&b| b == 0));

        let g1 = font.get_glyph(1).unwrap();
        assert_eq!(*g1.descriptor(), DESC_1);
        assert_eq!(g1.pixel_len(), 24);
        assert!(g1.data().as_slice().iter().all(|&b| b == 1));

        let max = font.get_max().unwrap();
        assert_eq!(
            *max,
            Descriptor {
                width: 6,
                height: 4,
                left: 0,
                top: 4,
                right: 8,
                bottom: -2,
                horizontal_advance: 8,
                vertical_advance: -6,
            }
        );

        assert!(font.get_glyph_raw(2).is_none());
    }

    #[test]
    fn test_decode_swapped_buffer() {
        let mut font = Font::empty();
        font.add_glyph(0, DESC_0, BinaryBlob::from_vec(vec![7; 16])).unwrap();
        let mut swapped = font.store(true).unwrap();

        // Reading with the wrong flag yields a nonsense count.
        let raw: u32 = access::read(&mut swapped, 0, false).unwrap();
        assert_eq!(raw, 1u32.swap_bytes());

        let back = Font::from_blob(swapped, true).unwrap();
        assert_eq!(*back.get_glyph(0).unwrap().descriptor(), DESC_0);
    }

    #[test]
    fn test_decode_empty_buffer_fails() {
        let mut font = Font::new();
        let err = font.decode(&mut Vec::<u8>::new(), false).unwrap_err();
        assert!(matches!(err, Error::CorruptResource(_)));
        assert!(!font.is_initialized());
    }

    #[test]
    fn test_decode_zero_glyphs() {
        let mut buf = 0u32.to_ne_bytes().to_vec();
        let mut font = Font::new();
        font.decode(&mut buf, false).unwrap();
        assert!(font.is_initialized());
        assert_eq!(font.glyph_count(), 0);
    }

    #[test]
    fn test_decode_truncated_releases_font() {
        let full = two_glyph_buffer();
        let mut font = Font::empty();
        font.add_glyph(9, DESC_0, BinaryBlob::from_vec(vec![1; 16])).unwrap();

        let mut truncated = full[..30].to_vec();
        let err = font.decode(&mut truncated, false).unwrap_err();
        assert!(matches!(err, Error::CorruptResource(_)));
        assert!(!font.is_initialized());
        assert!(font.get_glyph(9).is_none());
    }

    #[test]
    fn test_decode_image_out_of_bounds() {
        let full = two_glyph_buffer();
        let mut short = full[..full.len() - 1].to_vec();
        let mut font = Font::new();
        assert!(matches!(
            font.decode(&mut short, false),
            Err(Error::CorruptResource(_))
        ));
        assert!(font.get_max().is_none());
    }

    #[test]
    fn test_image_size_fits_address_space() {
        let max = Descriptor {
            width: u32::MAX,
            height: u32::MAX,
            ..Descriptor::default()
        };
        let expected = u64::from(u32::MAX) * u64::from(u32::MAX);
        match usize::try_from(expected) {
            Ok(len) => assert_eq!(image_size(&max).unwrap(), len),
            Err(_) => assert!(matches!(
                image_size(&max),
                Err(Error::CorruptResource(AccessError::LimitExceeded { what: "image size", .. }))
            )),
        }
        assert_eq!(image_size(&DESC_1).unwrap(), 24);
    }

    #[test]
    fn test_decode_respects_glyph_limit() {
        let mut buf = two_glyph_buffer();
        let config = CodecConfig {
            max_glyphs: 1,
            ..CodecConfig::for_testing()
        };
        let mut font = Font::new();
        let err = font.decode_with(&mut buf, &config).unwrap_err();
        assert!(matches!(
            err,
            Error::CorruptResource(AccessError::LimitExceeded { value: 2, limit: 1, .. })
        ));
    }

    #[test]
    fn test_store_uninitialized_fails() {
        let font = Font::new();
        assert!(matches!(font.store(false), Err(Error::InvalidObject)));
    }

    #[test]
    fn test_store_matches_hand_built_layout() {
        let mut font = Font::empty();
        font.add_glyph(0, DESC_0, BinaryBlob::from_vec(vec![0; 16])).unwrap();
        font.add_glyph(1, DESC_1, BinaryBlob::from_vec(vec![1; 24])).unwrap();

        let stored = font.store(false).unwrap();
        assert_eq!(stored.as_slice(), two_glyph_buffer().as_slice());
    }

    #[test]
    fn test_store_skips_imageless_fast_glyphs() {
        let mut font = Font::empty();
        let space = Descriptor {
            horizontal_advance: 3,
            ..Descriptor::default()
        };
        font.add_glyph(32, space, BinaryBlob::new()).unwrap();
        font.add_glyph(65, DESC_0, BinaryBlob::from_vec(vec![5; 16])).unwrap();
        // Map glyphs are kept even without an image.
        font.add_glyph(0x3000, space, BinaryBlob::new()).unwrap();

        let mut stored = font.store(false).unwrap();
        let count: u32 = access::read(&mut stored, 0, false).unwrap();
        assert_eq!(count, 2);

        let header = FontHeader::for_count(2);
        let first: u32 = access::read(&mut stored, header.character_at(0), false).unwrap();
        let second: u32 = access::read(&mut stored, header.character_at(1), false).unwrap();
        assert_eq!((first, second), (65, 0x3000));

        // The imageless map glyph points at the end of the image section.
        let offset: u64 = access::read(&mut stored, header.image_offset_at(1), false).unwrap();
        assert_eq!(offset, header.images_offset + 16);
        assert_eq!(stored.len() as u64, offset);
    }

    #[test]
    fn test_store_into_short_buffer_fails() {
        let mut font = Font::empty();
        font.add_glyph(0, DESC_0, BinaryBlob::from_vec(vec![0; 16])).unwrap();
        let mut short = vec![0u8; 8];
        assert!(matches!(
            font.store_into(&mut short, false),
            Err(Error::Access(AccessError::OutOfBounds { .. }))
        ));
    }
}
