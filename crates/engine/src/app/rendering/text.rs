use super::canvas::Canvas;

const GLYPH_WIDTH: i32 = 3;
const GLYPH_HEIGHT: i32 = 5;
pub(crate) const TEXT_SCALE: i32 = 2;
pub(crate) const GLYPH_ADVANCE: i32 = (GLYPH_WIDTH + 1) * TEXT_SCALE;
pub(crate) const LINE_ADVANCE: i32 = (GLYPH_HEIGHT + 2) * TEXT_SCALE;

const FIRST_GLYPH: u8 = b' ';
const FALLBACK_GLYPH: u16 = 0x72c2;

/// 3x5 glyphs for printable ASCII starting at `' '`. Each entry packs five
/// 3-bit rows, top row in the highest bits.
const GLYPHS: [u16; 95] = [
    0x0000, 0x2482, 0x5a00, 0x5f7d, 0x7ddf, 0x52a5, 0x2aab, 0x2400, //
    0x1491, 0x4494, 0x0aa8, 0x05d0, 0x0014, 0x01c0, 0x0002, 0x12a4, //
    0x7b6f, 0x2c97, 0x73e7, 0x73cf, 0x5bc9, 0x79cf, 0x79ef, 0x7292, //
    0x7bef, 0x7bcf, 0x0410, 0x0414, 0x1511, 0x0e38, 0x4454, 0x72c2, //
    0x7be7, 0x2bed, 0x6bae, 0x7927, 0x6b6e, 0x79a7, 0x79a4, 0x796f, //
    0x5bed, 0x7497, 0x726f, 0x5bad, 0x4927, 0x5fed, 0x5ffd, 0x7b6f, //
    0x6ba4, 0x7b79, 0x6bad, 0x79cf, 0x7492, 0x5b6f, 0x5b6a, 0x5bfd, //
    0x5aad, 0x5a92, 0x72a7, 0x6926, 0x4889, 0x324b, 0x2a00, 0x0007, //
    0x4400, 0x0e7f, 0x49ae, 0x0f27, 0x13ef, 0x0fa7, 0x39a4, 0x0f79, //
    0x49ad, 0x2092, 0x106a, 0x4bad, 0x4927, 0x0ded, 0x0d6d, 0x0f6f, //
    0x0d74, 0x0f79, 0x0d64, 0x0f8f, 0x2e93, 0x0b6f, 0x0b6a, 0x0b7a, //
    0x0a95, 0x0b79, 0x0e57, 0x3593, 0x2492, 0x64d6, 0x0780,
];

/// Non-ASCII characters render as `?`.
fn glyph_bits(ch: char) -> u16 {
    u8::try_from(ch)
        .ok()
        .and_then(|byte| byte.checked_sub(FIRST_GLYPH))
        .and_then(|index| GLYPHS.get(index as usize).copied())
        .unwrap_or(FALLBACK_GLYPH)
}

fn draw_glyph(canvas: &mut Canvas<'_>, x: i32, y: i32, bits: u16, color: [u8; 4]) {
    for row in 0..GLYPH_HEIGHT {
        let row_bits = (bits >> ((GLYPH_HEIGHT - 1 - row) * GLYPH_WIDTH)) & 0b111;
        for col in 0..GLYPH_WIDTH {
            if row_bits & (1 << (GLYPH_WIDTH - 1 - col)) == 0 {
                continue;
            }
            canvas.fill_rect(
                x + col * TEXT_SCALE,
                y + row * TEXT_SCALE,
                TEXT_SCALE,
                TEXT_SCALE,
                color,
            );
        }
    }
}

pub(crate) fn draw_text(canvas: &mut Canvas<'_>, mut x: i32, y: i32, text: &str, color: [u8; 4]) {
    for ch in text.chars() {
        draw_glyph(canvas, x, y, glyph_bits(ch), color);
        x += GLYPH_ADVANCE;
    }
}

pub(crate) fn text_width(text: &str) -> i32 {
    text.chars().count() as i32 * GLYPH_ADVANCE
}

/// Longest suffix of `text` that fits in `max_width` pixels, so the end of a
/// long path stays visible.
pub(crate) fn fit_tail(text: &str, max_width: i32) -> &str {
    let max_chars = (max_width / GLYPH_ADVANCE).max(0) as usize;
    let count = text.chars().count();
    if count <= max_chars {
        return text;
    }
    let skip = count - max_chars;
    match text.char_indices().nth(skip) {
        Some((index, _)) => &text[index..],
        None => "",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn printable_ascii_has_glyphs_except_space() {
        assert_eq!(glyph_bits(' '), 0);
        for code in 33u8..=126u8 {
            assert_ne!(glyph_bits(char::from(code)), 0, "char={}", char::from(code));
        }
    }

    #[test]
    fn unknown_characters_use_the_question_mark() {
        assert_eq!(glyph_bits('é'), glyph_bits('?'));
        assert_eq!(glyph_bits('\n'), glyph_bits('?'));
    }

    #[test]
    fn glyph_rows_decode_top_down() {
        let mut frame = vec![0u8; 8 * 12 * 4];
        let mut canvas = Canvas::new(&mut frame, 8, 12);
        draw_text(&mut canvas, 0, 0, "L", [255, 255, 255, 255]);

        let lit = |x: usize, y: usize| frame[(y * 8 + x) * 4] == 255;
        assert!(lit(0, 0));
        assert!(!lit(2, 0));
        assert!(lit(4, 8));
    }

    #[test]
    fn drawing_past_the_edges_is_safe() {
        let mut frame = vec![0u8; 4 * 4 * 4];
        let mut canvas = Canvas::new(&mut frame, 4, 4);
        draw_text(&mut canvas, -5, -3, "Speed: 100%", [255, 255, 255, 255]);
        draw_text(&mut canvas, 3, 3, "box1", [255, 255, 255, 255]);
        let mut empty: Vec<u8> = Vec::new();
        draw_text(&mut Canvas::new(&mut empty, 0, 0), 0, 0, "x", [1, 1, 1, 1]);
    }

    #[test]
    fn fit_tail_keeps_the_end_of_the_text() {
        let width = GLYPH_ADVANCE * 4;
        assert_eq!(fit_tail("/anims/walk", width), "walk");
        assert_eq!(fit_tail("run", width), "run");
        assert_eq!(fit_tail("run", 0), "");
        assert_eq!(text_width("walk"), width);
    }
}
