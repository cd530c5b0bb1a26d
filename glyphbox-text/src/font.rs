//! Font: a face's glyph collection with a two-tier lookup.
//!
//! ## Architecture
//!
//! ```text
//! Font
//!   └── tables: Option<FontTables>          (None = uninitialized)
//!         ├── lut: [Glyph; 128]             dense, indexed by code point
//!         ├── occupied: u128                one bit per lut slot
//!         ├── map: BTreeMap<u32, Glyph>     everything >= 128
//!         └── max: Descriptor               running envelope
//! ```
//!
//! ASCII-heavy text resolves through the dense table without hashing or
//! tree walks. The map is ordered so that serialization visits code
//! points in ascending order.

use std::collections::BTreeMap;

use glyphbox_core::{BinaryBlob, Error, Result};

use crate::glyph::{Descriptor, Glyph};

/// Code point type used throughout the font.
pub type Character = u32;

/// Number of dense fast-path slots.
pub const LUT_SIZE: usize = 128;

/// Glyph storage of an initialized font.
#[derive(Debug)]
struct FontTables {
    lut: Box<[Glyph]>,
    occupied: u128,
    map: BTreeMap<Character, Glyph>,
    max: Descriptor,
    /// Glyphs folded into `max` so far.
    folded: usize,
}

impl FontTables {
    fn new() -> Self {
        Self {
            lut: (0..LUT_SIZE).map(|_| Glyph::default()).collect(),
            occupied: 0,
            map: BTreeMap::new(),
            max: Descriptor::default(),
            folded: 0,
        }
    }

    #[inline]
    fn lut_index(character: Character) -> Option<usize> {
        let index = character as usize;
        (index < LUT_SIZE).then_some(index)
    }

    fn insert(&mut self, character: Character, glyph: Glyph) {
        self.max = if self.folded == 0 {
            *glyph.descriptor()
        } else {
            self.max.envelope(glyph.descriptor())
        };
        self.folded += 1;

        match Self::lut_index(character) {
            Some(index) => {
                self.lut[index] = glyph;
                self.occupied |= 1u128 << index;
            }
            None => {
                self.map.insert(character, glyph);
            }
        }
    }

    fn get(&self, character: Character) -> Option<&Glyph> {
        match Self::lut_index(character) {
            Some(index) if self.occupied & (1u128 << index) != 0 => Some(&self.lut[index]),
            Some(_) => None,
            None => self.map.get(&character),
        }
    }
}

/// A single font face.
///
/// Not `Clone`: a font exclusively owns its glyph images. Use
/// [`Font::take`] to move the whole face out of a binding.
#[derive(Debug, Default)]
pub struct Font {
    tables: Option<FontTables>,
}

impl Font {
    /// Uninitialized font. Owns nothing; every accessor reports `None`.
    pub const fn new() -> Self {
        Self { tables: None }
    }

    /// Initialized font without glyphs.
    pub fn empty() -> Self {
        let mut font = Self::new();
        font.init();
        font
    }

    /// Drop any current state and allocate empty storage.
    pub fn init(&mut self) {
        self.tables = Some(FontTables::new());
    }

    /// Free every glyph and return to the uninitialized state.
    pub fn release(&mut self) {
        self.tables = None;
    }

    /// Move the font out, leaving `self` uninitialized.
    pub fn take(&mut self) -> Font {
        std::mem::take(self)
    }

    #[inline]
    pub fn is_initialized(&self) -> bool {
        self.tables.is_some()
    }

    /// Store a glyph for `character`, replacing any previous one.
    ///
    /// The glyph's descriptor is folded into [`Font::get_max`].
    pub fn add_glyph(
        &mut self,
        character: Character,
        descriptor: Descriptor,
        image: BinaryBlob,
    ) -> Result<()> {
        let tables = self.tables.as_mut().ok_or(Error::InvalidObject)?;
        tables.insert(character, Glyph::new(image, descriptor));
        Ok(())
    }

    /// Used by the decoder, which has already initialized the tables.
    pub(crate) fn insert_glyph(&mut self, character: Character, glyph: Glyph) -> Result<()> {
        let tables = self.tables.as_mut().ok_or(Error::InvalidObject)?;
        tables.insert(character, glyph);
        Ok(())
    }

    /// Glyph for `character`, falling back to the slot of code point 0.
    ///
    /// Returns `None` only when the font is uninitialized; the fallback
    /// glyph may itself be released (null data, zero metrics).
    pub fn get_glyph(&self, character: Character) -> Option<&Glyph> {
        let tables = self.tables.as_ref()?;
        tables.get(character).or(Some(&tables.lut[0]))
    }

    /// Glyph for `character` without fallback.
    pub fn get_glyph_raw(&self, character: Character) -> Option<&Glyph> {
        self.tables.as_ref()?.get(character)
    }

    /// Envelope of every descriptor added so far.
    ///
    /// All zeros for an initialized font with no glyphs, `None` when
    /// uninitialized.
    pub fn get_max(&self) -> Option<&Descriptor> {
        self.tables.as_ref().map(|t| &t.max)
    }

    /// Number of stored glyphs (fast-table slots plus map entries).
    pub fn glyph_count(&self) -> usize {
        self.tables
            .as_ref()
            .map_or(0, |t| t.occupied.count_ones() as usize + t.map.len())
    }

    /// Stored glyphs in storage order: fast table ascending, then the map
    /// ascending. Empty when uninitialized.
    pub fn iter(&self) -> impl Iterator<Item = (Character, &Glyph)> + '_ {
        let tables = self.tables.as_ref();
        let dense = tables.into_iter().flat_map(|t| {
            t.lut
                .iter()
                .enumerate()
                .filter(move |&(i, _)| t.occupied & (1u128 << i) != 0)
                .map(|(i, g)| (i as Character, g))
        });
        let sparse = tables
            .into_iter()
            .flat_map(|t| t.map.iter().map(|(&c, g)| (c, g)));
        dense.chain(sparse)
    }
}

// ===================================================================
// Tests
// ===================================================================
