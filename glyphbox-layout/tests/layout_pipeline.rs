//! End-to-end: build a font, ship it through the binary format, lay text
//! out with the decoded copy.
//!
//! Verifies:
//! - a decoded font lays text out exactly like the font it was stored from
//! - every placement stays inside its box
//! - placements follow text order and advance left to right within a line
//! - overflow keeps the partial layout

use glyphbox_core::BinaryBlob;
use glyphbox_layout::{init_layout, Layout, LayoutError, TextBox};
use glyphbox_text::{Character, Descriptor, Font};

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn glyph_desc(width: u32, advance: i32, descent: i32) -> Descriptor {
    Descriptor {
        width,
        height: 8,
        left: 0,
        top: 8,
        right: width as i32,
        bottom: descent,
        horizontal_advance: advance,
        vertical_advance: -12,
    }
}

fn sample_font() -> Font {
    let mut font = Font::empty();
    font.add_glyph(0, glyph_desc(4, 5, 0), BinaryBlob::from_vec(vec![1; 32]))
        .unwrap();
    for c in "abcdefghijklmnopqrstuvwxyz".chars() {
        let width = 3 + (c as u32 % 4);
        let descent = if "gjpqy".contains(c) { -3 } else { 0 };
        let d = glyph_desc(width, width as i32 + 1, descent);
        font.add_glyph(c as Character, d, BinaryBlob::from_vec(vec![c as u8; d.pixel_len() as usize]))
            .unwrap();
    }
    font.add_glyph(' ' as Character, glyph_desc(0, 4, 0), BinaryBlob::new())
        .unwrap();
    font
}

fn text(s: &str) -> Vec<Character> {
    s.chars().map(|c| c as Character).collect()
}

fn summary(layout: &Layout<'_>) -> Vec<(usize, usize, i32, i32)> {
    layout
        .iter()
        .map(|p| (p.box_index, p.char_index, p.x, p.y))
        .collect()
}

fn assert_well_formed(layout: &Layout<'_>, boxes: &[TextBox]) {
    for (i, p) in layout.iter().enumerate() {
        let d = p.glyph.descriptor();
        let b = &boxes[p.box_index];
        assert_eq!(p.char_index, i);
        assert!(std::ptr::eq(p.text_box, b));
        assert!(p.x >= b.left);
        assert!(p.x + d.right <= b.right, "glyph {i} crosses the right edge");
        assert!(p.y + d.bottom >= b.bottom, "glyph {i} crosses the bottom edge");
    }
    for pair in layout.positions().windows(2) {
        let (a, b) = (&pair[0], &pair[1]);
        assert!(b.box_index >= a.box_index);
        if a.box_index == b.box_index && a.y == b.y {
            assert_eq!(b.x, a.x + a.glyph.descriptor().horizontal_advance);
        }
    }
}

// ─── Decoded fonts ───────────────────────────────────────────────────

#[test]
fn test_decoded_font_lays_out_identically() {
    init_logger();
    let font = sample_font();
    let boxes = [TextBox::new(0, 0, 60, -40), TextBox::new(100, 0, 140, -60)];
    let input = text("sphinxofblackquartzjudgemyvow");

    for swap in [false, true] {
        let blob = font.store(swap).unwrap();
        let decoded = Font::from_blob(blob, swap).unwrap();

        let expected = init_layout(&font, &boxes, &input).unwrap();
        let actual = init_layout(&decoded, &boxes, &input).unwrap();
        assert_eq!(summary(&actual), summary(&expected));
        assert_well_formed(&actual, &boxes);
    }
}

#[test]
fn test_imageless_space_falls_back_after_store() {
    // The space glyph has no image and is not shipped; after decoding it
    // resolves to the fallback glyph.
    let font = sample_font();
    let decoded = Font::from_blob(font.store(false).unwrap(), false).unwrap();
    let boxes = [TextBox::new(0, 0, 100, -20)];
    let input = text("a b");

    let a = font.get_glyph('a' as Character).unwrap().descriptor().horizontal_advance;

    let before = init_layout(&font, &boxes, &input).unwrap();
    let after = init_layout(&decoded, &boxes, &input).unwrap();
    assert_eq!(before.positions()[2].x, a + 4);
    assert_eq!(after.positions()[2].x, a + 5);
}

// ─── Overflow ────────────────────────────────────────────────────────

#[test]
fn test_overflow_returns_partial_layout() {
    init_logger();
    let font = sample_font();
    let boxes = [TextBox::new(0, 0, 30, -14), TextBox::new(0, -20, 30, -34)];
    let input = text("the quick brown fox jumps over the lazy dog");

    let err = init_layout(&font, &boxes, &input).unwrap_err();
    let (placed, requested) = match &err {
        LayoutError::NotEnoughSpace { placed, requested, .. } => (*placed, *requested),
        other => panic!("unexpected error: {other}"),
    };
    assert_eq!(requested, input.len());
    assert!(placed > 0 && placed < requested);

    let layout = err.into_partial().unwrap();
    assert_eq!(layout.len(), placed);
    assert_well_formed(&layout, &boxes);
    assert!(layout.iter().any(|p| p.box_index == 1));
}
